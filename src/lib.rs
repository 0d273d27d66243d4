//! Pulls a single scalar out of a JSON document by key, without building a tree.
//!
//! The key is matched at the top level of the document, or one object level below it
//! (which includes objects directly inside a top-level array). Parsing stops as soon as
//! the value has been seen.
//!
//! ```
//! use json_get::{extract, Extraction, ScalarValue};
//!
//! let doc = br#"{"id": 7, "tags": ["a"], "user": {"name": "ann"}}"#;
//! assert_eq!(extract(doc, b"id").unwrap(), Extraction::Found(ScalarValue::Integer(7)));
//! assert_eq!(
//!     extract(doc, b"name").unwrap().into_found().and_then(|v| v.as_bytes().map(<[u8]>::to_vec)),
//!     Some(b"ann".to_vec())
//! );
//! // Arrays and objects are not returned.
//! assert_eq!(extract(doc, b"tags").unwrap(), Extraction::NotFound);
//! ```

mod encode;
mod error;
mod extractor;
mod function;

pub use encode::{EncodedValue, ResultBuffer, RESULT_BUFFER_LEN};
pub use error::ExtractError;
pub use extractor::{
    extract, Extraction, InlineBytes, ParseSession, Phase, ScalarValue, MAX_KEY_DEPTH,
    SHORT_STRING_LIMIT,
};
pub use function::JsonGet;
pub use json_session::JsonParseError;
pub use json_session_parser::{Flow, JsonSessionObserver, JsonSessionParser, ParseOutcome};
