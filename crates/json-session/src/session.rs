use std::borrow::Cow;

use smallvec::SmallVec;

use crate::JsonParseError;

use super::tokenizer::{JsonParseResult, JsonToken, JsonTokenizer, Location, TokenizerOptions};

#[derive(Debug, Clone, PartialEq)]
pub enum JsonSessionEvent<'a> {
    BeginObject {
        location_at_obj_start: Location,
    },
    ObjectProperty {
        property_key: Cow<'a, [u8]>,
        location_at_prop_key_start: Location,
    },
    EndObject {
        location_after_obj_end: Location,
    },
    BeginArray {
        location_at_array_start: Location,
    },
    EndArray {
        location_after_array_end: Location,
    },
    PrimitiveValue {
        value: JsonPrimitiveValue<'a>,
        location_at_value_start: Location,
        location_after_value_end: Location,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsonPrimitiveValue<'a> {
    Integer(i64),
    Double(f64),
    Boolean(bool),
    String(Cow<'a, [u8]>),
    Null,
}

/// Most documents nest only a few levels deep, so the state stack stays inline.
const INLINE_STATE_DEPTH: usize = 8;

pub struct JsonSession<'a> {
    tokenizer: JsonTokenizer<'a>,
    state_stack: SmallVec<[StateStackEntry<'a>; INLINE_STATE_DEPTH]>,
}

#[derive(Debug)]
enum StateStackEntry<'a> {
    BeforeAnyValue,
    BeforeAnyValueWithToken {
        location: Location,
        token: JsonToken<'a>,
    },
    AfterObjectOpen,
    BeforeObjectPropertyKeyWithToken {
        location: Location,
        token: JsonToken<'a>,
    },
    AfterObjectPropertyValue,
    ArrayAfterOpen,
    ArrayAfterItem,
}

impl<'a> JsonSession<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self::with_options(bytes, TokenizerOptions::default())
    }

    pub fn with_options(bytes: &'a [u8], options: TokenizerOptions) -> Self {
        let mut state_stack = SmallVec::new();
        state_stack.push(StateStackEntry::BeforeAnyValue);
        JsonSession {
            tokenizer: JsonTokenizer::with_options(bytes, options),
            state_stack,
        }
    }

    /// Returns the next event, `Ok(None)` once the root value and the trailing
    /// whitespace have been consumed.
    pub fn next(&mut self) -> JsonParseResult<Option<JsonSessionEvent<'a>>> {
        while let Some(entry) = self.state_stack.pop() {
            match entry {
                StateStackEntry::BeforeAnyValue => {
                    let location = self.tokenizer.location();
                    let token = self.tokenizer.next_token()?;
                    self.state_stack
                        .push(StateStackEntry::BeforeAnyValueWithToken { token, location });
                }
                StateStackEntry::BeforeAnyValueWithToken { location, token } => {
                    let value = match token {
                        JsonToken::Integer(num) => JsonPrimitiveValue::Integer(num),
                        JsonToken::Double(num) => JsonPrimitiveValue::Double(num),
                        JsonToken::True => JsonPrimitiveValue::Boolean(true),
                        JsonToken::False => JsonPrimitiveValue::Boolean(false),
                        JsonToken::String(s) => JsonPrimitiveValue::String(s),
                        JsonToken::Null => JsonPrimitiveValue::Null,
                        JsonToken::ArrayOpen => {
                            self.state_stack.push(StateStackEntry::ArrayAfterOpen);
                            return Ok(Some(JsonSessionEvent::BeginArray {
                                location_at_array_start: location,
                            }));
                        }
                        JsonToken::ObjOpen => {
                            self.state_stack.push(StateStackEntry::AfterObjectOpen);
                            return Ok(Some(JsonSessionEvent::BeginObject {
                                location_at_obj_start: location,
                            }));
                        }
                        t @ JsonToken::Comma
                        | t @ JsonToken::ArrayClose
                        | t @ JsonToken::Colon
                        | t @ JsonToken::ObjClose => {
                            return Err(JsonParseError::new(
                                format!("Unexpected token {t:?}"),
                                location,
                            ));
                        }
                    };
                    let location_after = self.tokenizer.location();
                    return Ok(Some(JsonSessionEvent::PrimitiveValue {
                        value,
                        location_at_value_start: location,
                        location_after_value_end: location_after,
                    }));
                }
                StateStackEntry::AfterObjectOpen => {
                    let location = self.tokenizer.location();
                    let token = self.tokenizer.next_token()?;
                    if matches!(token, JsonToken::ObjClose) {
                        let location_after_obj_end = self.tokenizer.location();
                        return Ok(Some(JsonSessionEvent::EndObject {
                            location_after_obj_end,
                        }));
                    }

                    self.state_stack
                        .push(StateStackEntry::BeforeObjectPropertyKeyWithToken { location, token });
                }
                StateStackEntry::BeforeObjectPropertyKeyWithToken { location, token } => {
                    let key = match token {
                        JsonToken::String(s) => s,
                        other_token => {
                            return Err(JsonParseError::new(
                                format!("Key of object must be string but found {other_token:?}"),
                                location,
                            ))
                        }
                    };

                    let colon_location = self.tokenizer.location();
                    let token = self.tokenizer.next_token()?;
                    if token != JsonToken::Colon {
                        return Err(JsonParseError::new(
                            format!(
                                "':' is expected after key of object but actually found '{token:?}'",
                            ),
                            colon_location,
                        ));
                    }

                    self.state_stack.push(StateStackEntry::AfterObjectPropertyValue);
                    self.state_stack.push(StateStackEntry::BeforeAnyValue);
                    return Ok(Some(JsonSessionEvent::ObjectProperty {
                        property_key: key,
                        location_at_prop_key_start: location,
                    }));
                }
                StateStackEntry::AfterObjectPropertyValue => {
                    let location = self.tokenizer.location();
                    match self.tokenizer.next_token()? {
                        JsonToken::Comma => {}
                        JsonToken::ObjClose => {
                            let location_after_obj_end = self.tokenizer.location();
                            return Ok(Some(JsonSessionEvent::EndObject {
                                location_after_obj_end,
                            }));
                        }
                        token => {
                            return Err(JsonParseError::new(
                                format!(
                                "',' or '}}' is expected for object but actually found '{token:?}'",
                            ),
                                location,
                            ))
                        }
                    }

                    let location = self.tokenizer.location();
                    let token = self.tokenizer.next_token()?;
                    self.state_stack
                        .push(StateStackEntry::BeforeObjectPropertyKeyWithToken { location, token });
                }
                StateStackEntry::ArrayAfterOpen => {
                    let location = self.tokenizer.location();
                    let token = self.tokenizer.next_token()?;

                    if token == JsonToken::ArrayClose {
                        let location_after_array_end = self.tokenizer.location();
                        return Ok(Some(JsonSessionEvent::EndArray {
                            location_after_array_end,
                        }));
                    }

                    self.state_stack.push(StateStackEntry::ArrayAfterItem);
                    self.state_stack
                        .push(StateStackEntry::BeforeAnyValueWithToken { token, location });
                }
                StateStackEntry::ArrayAfterItem => {
                    let location = self.tokenizer.location();
                    match self.tokenizer.next_token()? {
                        JsonToken::Comma => {}
                        JsonToken::ArrayClose => {
                            let location_after_array_end = self.tokenizer.location();
                            return Ok(Some(JsonSessionEvent::EndArray {
                                location_after_array_end,
                            }));
                        }
                        token => {
                            return Err(JsonParseError::new(
                                format!(
                                "',' or ']' is expected for array but actually found '{token:?}'",
                            ),
                                location,
                            ))
                        }
                    }

                    self.state_stack.push(StateStackEntry::ArrayAfterItem);
                    self.state_stack.push(StateStackEntry::BeforeAnyValue);
                }
            }
        }

        self.tokenizer.expect_eof()?;

        Ok(None)
    }
}

#[cfg(feature = "fallible-iterator")]
impl<'a> fallible_iterator::FallibleIterator for JsonSession<'a> {
    type Item = JsonSessionEvent<'a>;
    type Error = JsonParseError;

    fn next(&mut self) -> Result<Option<Self::Item>, Self::Error> {
        JsonSession::next(self)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn get(s: &str) -> (Vec<JsonSessionEvent<'_>>, Option<JsonParseError>) {
        let mut session = JsonSession::new(s.as_bytes());
        let mut v = Vec::new();
        loop {
            match session.next() {
                Ok(Some(ev)) => v.push(ev),
                Ok(None) => return (v, None),
                Err(e) => return (v, Some(e)),
            }
        }
    }

    #[test]
    fn test_basic() {
        let s =
            r#"{"propertyKey": 1234, "arr": [], "obj": {}, "arr2": [null, false, true, -0.54e2] }"#;
        let (v, e) = get(s);
        assert!(e.is_none());
        assert_eq!(v.len(), 17);
        assert!(matches!(
            &v[2],
            JsonSessionEvent::PrimitiveValue {
                value: JsonPrimitiveValue::Integer(1234),
                ..
            }
        ));
        assert!(matches!(
            &v[14],
            JsonSessionEvent::PrimitiveValue {
                value: JsonPrimitiveValue::Double(d),
                ..
            } if *d == -54.0
        ));
    }

    #[test]
    fn test_property_keys() {
        let (v, e) = get(r#"{"a": {"b": "c"}}"#);
        assert!(e.is_none());
        let keys: Vec<&[u8]> = v
            .iter()
            .filter_map(|ev| match ev {
                JsonSessionEvent::ObjectProperty { property_key, .. } => Some(&**property_key),
                _ => None,
            })
            .collect();
        assert_eq!(keys, vec![&b"a"[..], &b"b"[..]]);
    }

    #[test]
    fn test_deep_nesting_spills() {
        let s = format!("{}{}", "[".repeat(40), "]".repeat(40));
        let (v, e) = get(&s);
        assert!(e.is_none());
        assert_eq!(v.len(), 80);
    }

    #[test]
    fn test_errors() {
        let (v, e) = get(r#"{"a": "#);
        assert_eq!(v.len(), 2);
        assert!(e.is_some());

        let (_, e) = get(r#"{"a" 1}"#);
        assert!(e.unwrap().msg().contains("':' is expected"));

        let (_, e) = get(r#"[1 2]"#);
        assert!(e.is_some());

        let (_, e) = get(r#"{1: 2}"#);
        assert!(e.unwrap().msg().starts_with("Key of object must be string"));

        let (v, e) = get(r#"{} x"#);
        assert_eq!(v.len(), 2);
        assert!(e.unwrap().msg().starts_with("Expected EOF"));

        let (_, e) = get("");
        assert_eq!(e.unwrap().msg(), "Unexpected EOF");
    }

    #[cfg(feature = "fallible-iterator")]
    #[test]
    fn test_fallible_iterator() {
        use fallible_iterator::FallibleIterator;

        let session = JsonSession::new(br#"[1, 2, 3]"#);
        assert_eq!(session.count().unwrap(), 5);
    }
}
