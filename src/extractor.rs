use std::borrow::Cow;

use json_session::{JsonParseError, JsonPrimitiveValue, Location, TokenizerOptions};
use json_session_parser::{Flow, JsonSessionObserver, JsonSessionParser};
use smallvec::SmallVec;

use crate::error::ExtractError;

/// Strings shorter than this many bytes are captured inline, without a heap allocation.
pub const SHORT_STRING_LIMIT: usize = 255;

/// Keys are only matched at object depth 0 and 1: the top level, or directly inside one
/// top-level container.
pub const MAX_KEY_DEPTH: u32 = 2;

/// Inline storage for a [`ScalarValue::ShortString`].
pub type InlineBytes = SmallVec<[u8; SHORT_STRING_LIMIT - 1]>;

/// The scalar bound to the target key.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Null,
    Bool(bool),
    Integer(i64),
    Double(f64),
    ShortString(InlineBytes),
    LongString(Vec<u8>),
}

impl ScalarValue {
    /// Copies string bytes out of the document. Short strings stay inline, long strings get
    /// an exactly sized heap buffer. If that buffer cannot be allocated the value degrades
    /// to `Null`.
    pub fn from_string_bytes(bytes: &[u8]) -> ScalarValue {
        Self::capture_string(bytes, try_copy_to_heap)
    }

    fn capture_string(
        bytes: &[u8],
        alloc: impl FnOnce(&[u8]) -> Option<Vec<u8>>,
    ) -> ScalarValue {
        if bytes.len() < SHORT_STRING_LIMIT {
            return ScalarValue::ShortString(SmallVec::from_slice(bytes));
        }
        match alloc(bytes) {
            Some(buf) => ScalarValue::LongString(buf),
            None => ScalarValue::Null,
        }
    }

    /// The string contents, for either string variant.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ScalarValue::ShortString(s) => Some(s.as_slice()),
            ScalarValue::LongString(s) => Some(s.as_slice()),
            _ => None,
        }
    }
}

fn try_copy_to_heap(bytes: &[u8]) -> Option<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(bytes.len()).ok()?;
    buf.extend_from_slice(bytes);
    Some(buf)
}

/// The answer to one [`extract`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Found(ScalarValue),
    /// The key does not occur within the first two object levels, or it is bound to an
    /// object or array.
    NotFound,
}

impl Extraction {
    /// Whether a host would render this as its null indicator. A key bound to JSON `null`
    /// and a missing key look the same.
    pub fn is_null(&self) -> bool {
        matches!(self, Extraction::NotFound | Extraction::Found(ScalarValue::Null))
    }

    pub fn into_found(self) -> Option<ScalarValue> {
        match self {
            Extraction::Found(value) => Some(value),
            Extraction::NotFound => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The key has not been seen yet.
    Seeking,
    /// The key was just seen; the next value is the answer.
    Armed,
    /// The answer is known.
    Done,
}

/// Per-call extraction state. Receives the events of one document and remembers the first
/// value that follows the target key.
#[derive(Debug)]
pub struct ParseSession<'k> {
    target_key: &'k [u8],
    depth: u32,
    phase: Phase,
    captured: Option<ScalarValue>,
}

impl<'k> ParseSession<'k> {
    pub fn new(target_key: &'k [u8]) -> Self {
        ParseSession {
            target_key,
            depth: 0,
            phase: Phase::Seeking,
            captured: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn captured(&self) -> Option<&ScalarValue> {
        self.captured.as_ref()
    }

    pub fn into_extraction(self) -> Extraction {
        match self.captured {
            Some(value) => Extraction::Found(value),
            None => Extraction::NotFound,
        }
    }

    fn finish(&mut self, captured: Option<ScalarValue>) -> Flow {
        self.captured = captured;
        self.phase = Phase::Done;
        Flow::Stop
    }

    /// An object or array where the answer should be. Composite values are not returned,
    /// so the search ends without a result.
    fn container_opened(&mut self) -> Flow {
        match self.phase {
            Phase::Seeking => Flow::Continue,
            Phase::Armed => self.finish(None),
            Phase::Done => Flow::Stop,
        }
    }
}

impl<'a, 'k> JsonSessionObserver<'a> for ParseSession<'k> {
    fn begin_object(&mut self, _location: Location) -> Flow {
        self.depth += 1;
        self.container_opened()
    }

    fn end_object(&mut self, _location: Location) -> Flow {
        self.depth = self.depth.saturating_sub(1);
        match self.phase {
            Phase::Done => Flow::Stop,
            _ => Flow::Continue,
        }
    }

    fn begin_array(&mut self, _location: Location) -> Flow {
        self.container_opened()
    }

    fn end_array(&mut self, _location: Location) -> Flow {
        match self.phase {
            Phase::Done => Flow::Stop,
            _ => Flow::Continue,
        }
    }

    fn object_property(&mut self, _location: Location, property_key: &[u8]) -> Flow {
        if self.phase == Phase::Seeking
            && self.depth < MAX_KEY_DEPTH
            && property_key == self.target_key
        {
            self.phase = Phase::Armed;
        }
        Flow::Continue
    }

    fn primitive_value(
        &mut self,
        value: JsonPrimitiveValue<'a>,
        _location_at_value_start: Location,
        _location_after_value_end: Location,
    ) -> Flow {
        match self.phase {
            Phase::Seeking => return Flow::NotInterested,
            Phase::Done => return Flow::Stop,
            Phase::Armed => {}
        }
        let captured = match value {
            JsonPrimitiveValue::Null => ScalarValue::Null,
            JsonPrimitiveValue::Boolean(b) => ScalarValue::Bool(b),
            JsonPrimitiveValue::Integer(n) => ScalarValue::Integer(n),
            JsonPrimitiveValue::Double(d) => ScalarValue::Double(d),
            JsonPrimitiveValue::String(Cow::Borrowed(s)) => ScalarValue::from_string_bytes(s),
            JsonPrimitiveValue::String(Cow::Owned(s)) => ScalarValue::from_string_bytes(&s),
        };
        self.finish(Some(captured))
    }

    fn parse_error(&mut self, _error: &JsonParseError) {
        self.captured = None;
    }
}

/// Finds the scalar bound to `target_key` in `document`.
///
/// Parsing stops at the first match; anything after it is never tokenized, so a document
/// that is malformed only past the answer still succeeds. String contents are not checked
/// for valid UTF-8.
pub fn extract(document: &[u8], target_key: &[u8]) -> Result<Extraction, ExtractError> {
    let mut session = ParseSession::new(target_key);
    JsonSessionParser::with_options(document, TokenizerOptions::unchecked_strings())
        .parse(&mut session)?;
    Ok(session.into_extraction())
}
