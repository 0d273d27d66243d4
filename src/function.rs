use crate::encode::{EncodedValue, ResultBuffer};
use crate::error::ExtractError;
use crate::extractor::{extract, Extraction};

/// `json_get(key, document)` as a host calls it: initialized once, called once per row,
/// released at the end.
///
/// Results of up to [`crate::RESULT_BUFFER_LEN`] bytes live in a fixed buffer owned by
/// this object. Longer strings are parked here until the next call or [`JsonGet::release`].
pub struct JsonGet {
    result: ResultBuffer,
    long_result: Option<Vec<u8>>,
}

impl JsonGet {
    pub const ARG_COUNT: usize = 2;

    /// Upper bound on the result length a host should reserve for.
    pub const MAX_LENGTH: usize = 0xFFFF;

    /// A missing key and a JSON `null` both produce the null indicator.
    pub const MAYBE_NULL: bool = true;

    /// Checks the call shape and sets up the per-statement state.
    pub fn init(arg_count: usize) -> Result<Self, ExtractError> {
        if arg_count != Self::ARG_COUNT {
            return Err(ExtractError::ArgumentCount {
                expected: Self::ARG_COUNT,
                actual: arg_count,
            });
        }
        Ok(JsonGet {
            result: ResultBuffer::new(),
            long_result: None,
        })
    }

    /// Evaluates one row. `Ok(None)` is the null indicator.
    pub fn call(&mut self, key: &[u8], document: &[u8]) -> Result<Option<&[u8]>, ExtractError> {
        self.release();
        let value = match extract(document, key)? {
            Extraction::Found(value) => value,
            Extraction::NotFound => return Ok(None),
        };
        match value.encode_into(&mut self.result) {
            EncodedValue::Null => Ok(None),
            EncodedValue::Inline(bytes) => Ok(Some(bytes)),
            EncodedValue::Heap(bytes) => Ok(Some(self.long_result.insert(bytes).as_slice())),
        }
    }

    /// Whether the previous call left a heap buffer behind.
    pub fn holds_long_result(&self) -> bool {
        self.long_result.is_some()
    }

    /// Frees the heap buffer of the previous call, if any.
    pub fn release(&mut self) {
        self.long_result = None;
    }
}
