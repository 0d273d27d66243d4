use json_session::JsonParseError;
use thiserror::Error;

/// Hard errors. A missing key is not one of them.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("malformed JSON document: {0}")]
    Malformed(#[from] JsonParseError),

    #[error("json_get takes exactly {expected} arguments (key, document), got {actual}")]
    ArgumentCount { expected: usize, actual: usize },
}
