//! Streaming parser for JSON. [`JsonSession`] yields values of the following enum variants:
//! `BeginObject`, `ObjectProperty`, `EndObject`, `BeginArray`, `EndArray`, and `PrimitiveValue`.
//!
//! The session works on an in-memory byte slice and never builds a tree. String values and
//! property keys borrow from the input unless they contain escape sequences, so a consumer
//! that stops early only pays for the bytes it actually looked at.
//!
//! Every `JsonSessionEvent` has location information attached to it, saying at which byte offset
//! (and at which line and column) the relevant fragment began and ended.
//!
//! ```
//! use json_session::{JsonPrimitiveValue, JsonSession, JsonSessionEvent};
//!
//! # fn main() {
//!     let s = r#"{"key1": 1234, "key2": [true], "key3": "value" }"#;
//!     let mut session = JsonSession::new(s.as_bytes());
//!     session.next().unwrap().unwrap(); // JsonSessionEvent::BeginObject
//!     session.next().unwrap().unwrap(); // JsonSessionEvent::ObjectProperty(b"key1")
//!     match session.next().unwrap().unwrap() {
//!         JsonSessionEvent::PrimitiveValue { value, .. } => {
//!             assert_eq!(value, JsonPrimitiveValue::Integer(1234));
//!         }
//!         other => panic!("unexpected {other:?}"),
//!     }
//!     session.next().unwrap().unwrap(); // JsonSessionEvent::ObjectProperty(b"key2")
//!     session.next().unwrap().unwrap(); // JsonSessionEvent::BeginArray
//!     session.next().unwrap().unwrap(); // JsonSessionEvent::PrimitiveValue(Boolean(true))
//!     session.next().unwrap().unwrap(); // JsonSessionEvent::EndArray
//!     session.next().unwrap().unwrap(); // JsonSessionEvent::ObjectProperty(b"key3")
//!     session.next().unwrap().unwrap(); // JsonSessionEvent::PrimitiveValue(String(b"value"))
//!     session.next().unwrap().unwrap(); // JsonSessionEvent::EndObject
//!     assert!(session.next().unwrap().is_none());
//! # }
//!
//! ```

mod session;
mod tokenizer;

pub use session::*;
pub use tokenizer::*;
