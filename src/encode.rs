use std::fmt;
use std::io::Write;

use crate::extractor::ScalarValue;

/// Size of the fixed result buffer a host hands to each call.
pub const RESULT_BUFFER_LEN: usize = 255;

/// Caller-owned scratch space for encoded results that fit without an allocation.
pub struct ResultBuffer {
    bytes: [u8; RESULT_BUFFER_LEN],
}

impl ResultBuffer {
    pub fn new() -> Self {
        ResultBuffer {
            bytes: [0; RESULT_BUFFER_LEN],
        }
    }

    fn fill(&mut self, bytes: &[u8]) -> Option<&[u8]> {
        let dest = self.bytes.get_mut(..bytes.len())?;
        dest.copy_from_slice(bytes);
        Some(&*dest)
    }

    fn write_args(&mut self, args: fmt::Arguments<'_>) -> Option<&[u8]> {
        let mut cursor: &mut [u8] = &mut self.bytes;
        cursor.write_fmt(args).ok()?;
        let len = RESULT_BUFFER_LEN - cursor.len();
        Some(&self.bytes[..len])
    }
}

impl Default for ResultBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// The serialized form of a [`ScalarValue`].
#[derive(Debug, PartialEq, Eq)]
pub enum EncodedValue<'b> {
    /// The host's null indicator.
    Null,
    /// Bytes written into the caller's [`ResultBuffer`].
    Inline(&'b [u8]),
    /// A heap buffer that now belongs to the caller.
    Heap(Vec<u8>),
}

impl EncodedValue<'_> {
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            EncodedValue::Null => None,
            EncodedValue::Inline(bytes) => Some(*bytes),
            EncodedValue::Heap(bytes) => Some(bytes.as_slice()),
        }
    }
}

impl ScalarValue {
    /// Renders the value the way a host expects it: booleans as `0`/`1`, integers in
    /// decimal, doubles in fixed notation with six fractional digits, strings as their raw
    /// bytes. Long strings hand their buffer over instead of copying.
    pub fn encode_into(self, buf: &mut ResultBuffer) -> EncodedValue<'_> {
        match self {
            ScalarValue::Null => EncodedValue::Null,
            ScalarValue::Bool(b) => match buf.fill(if b { b"1" } else { b"0" }) {
                Some(bytes) => EncodedValue::Inline(bytes),
                None => EncodedValue::Null,
            },
            ScalarValue::Integer(n) => match buf.write_args(format_args!("{n}")) {
                Some(bytes) => EncodedValue::Inline(bytes),
                None => EncodedValue::Heap(n.to_string().into_bytes()),
            },
            // Huge doubles print hundreds of digits in fixed notation.
            ScalarValue::Double(d) => match buf.write_args(format_args!("{d:.6}")) {
                Some(bytes) => EncodedValue::Inline(bytes),
                None => EncodedValue::Heap(format!("{d:.6}").into_bytes()),
            },
            ScalarValue::ShortString(s) => match buf.fill(&s) {
                Some(bytes) => EncodedValue::Inline(bytes),
                None => EncodedValue::Heap(s.into_vec()),
            },
            ScalarValue::LongString(s) => EncodedValue::Heap(s),
        }
    }
}
