use json_session::{
    JsonParseError, JsonParseResult, JsonPrimitiveValue, JsonSession, JsonSessionEvent, Location,
    TokenizerOptions,
};

/// What an observer wants the parser to do after it has handled an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep going.
    Continue,
    /// The event was of no interest to the observer. Keep going.
    NotInterested,
    /// The observer has what it needs. No further events will be delivered.
    Stop,
}

impl Flow {
    pub fn is_stop(self) -> bool {
        self == Flow::Stop
    }
}

/// How a call to [`JsonSessionParser::parse`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// The whole document was consumed and is well-formed.
    Completed,
    /// An observer callback returned [`Flow::Stop`]. The rest of the document was not looked at.
    Stopped,
}

/// Receives the events of a document in order.
///
/// Container callbacks default to [`Flow::Continue`] so that observers only need to
/// implement what they care about.
pub trait JsonSessionObserver<'a> {
    fn begin_object(&mut self, _location_at_obj_start: Location) -> Flow {
        Flow::Continue
    }

    fn end_object(&mut self, _location_after_obj_end: Location) -> Flow {
        Flow::Continue
    }

    fn begin_array(&mut self, _location_at_array_start: Location) -> Flow {
        Flow::Continue
    }

    fn end_array(&mut self, _location_after_array_end: Location) -> Flow {
        Flow::Continue
    }

    fn object_property(&mut self, location: Location, property_key: &[u8]) -> Flow;

    fn primitive_value(
        &mut self,
        value: JsonPrimitiveValue<'a>,
        location_at_value_start: Location,
        location_after_value_end: Location,
    ) -> Flow;

    /// Called once, right before the error is returned from [`JsonSessionParser::parse`].
    fn parse_error(&mut self, _error: &JsonParseError) {}
}

/// Drives a [`JsonSession`] and pushes its events into a [`JsonSessionObserver`].
pub struct JsonSessionParser<'a> {
    session: JsonSession<'a>,
}

impl<'a> JsonSessionParser<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self::with_options(bytes, TokenizerOptions::default())
    }

    pub fn with_options(bytes: &'a [u8], options: TokenizerOptions) -> Self {
        JsonSessionParser {
            session: JsonSession::with_options(bytes, options),
        }
    }

    pub fn parse<O: JsonSessionObserver<'a>>(
        mut self,
        observer: &mut O,
    ) -> JsonParseResult<ParseOutcome> {
        loop {
            let event = match self.session.next() {
                Ok(Some(event)) => event,
                Ok(None) => return Ok(ParseOutcome::Completed),
                Err(err) => {
                    observer.parse_error(&err);
                    return Err(err);
                }
            };
            let flow = match event {
                JsonSessionEvent::BeginObject {
                    location_at_obj_start,
                } => observer.begin_object(location_at_obj_start),
                JsonSessionEvent::ObjectProperty {
                    property_key,
                    location_at_prop_key_start,
                } => observer.object_property(location_at_prop_key_start, &property_key),
                JsonSessionEvent::EndObject {
                    location_after_obj_end,
                } => observer.end_object(location_after_obj_end),
                JsonSessionEvent::BeginArray {
                    location_at_array_start,
                } => observer.begin_array(location_at_array_start),
                JsonSessionEvent::EndArray {
                    location_after_array_end,
                } => observer.end_array(location_after_array_end),
                JsonSessionEvent::PrimitiveValue {
                    value,
                    location_at_value_start,
                    location_after_value_end,
                } => observer.primitive_value(
                    value,
                    location_at_value_start,
                    location_after_value_end,
                ),
            };
            if flow.is_stop() {
                return Ok(ParseOutcome::Stopped);
            }
        }
    }
}
