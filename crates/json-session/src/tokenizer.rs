use std::borrow::Cow;
use std::fmt;

/// A JSON token.
///
/// Strings are byte strings: without escapes they borrow from the input, otherwise they
/// own the decoded bytes.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub enum JsonToken<'a> {
    Integer(i64),
    Double(f64),
    True,
    False,
    String(Cow<'a, [u8]>),
    Null,
    ArrayOpen,
    Comma,
    ArrayClose,
    ObjOpen,
    Colon,
    ObjClose,
}

/// A byte offset and the corresponding line and column number.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    pub byte_offset: u64,
    pub line: u64,
    pub col: u64,
}

impl Location {
    fn advance_by_byte(&mut self, c: u8) {
        if c == b'\n' {
            self.col = 0;
            self.line += 1;
        } else {
            self.col += 1;
        }
        self.byte_offset += 1;
    }
}

/// The error type used in this crate. Comes with Location information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonParseError {
    msg: String,
    location: Location,
}

impl JsonParseError {
    /// Creates a new [`JsonParseError`].
    pub fn new(msg: String, location: Location) -> JsonParseError {
        JsonParseError { msg, location }
    }

    /// The error message.
    pub fn msg(&self) -> &str {
        &self.msg
    }

    /// The location in the source document at which the parse error was encountered.
    pub fn location(&self) -> Location {
        self.location
    }
}

impl fmt::Display for JsonParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parse error at line:{}, col:{}: {}",
            self.location.line, self.location.col, &self.msg,
        )
    }
}

impl std::error::Error for JsonParseError {}

/// A type alias for `Result<T, JsonParseError>`.
pub type JsonParseResult<T> = Result<T, JsonParseError>;

/// How strictly the contents of string literals are checked.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum StringValidation {
    /// Decoded string bytes must be valid UTF-8.
    #[default]
    Strict,
    /// Escapes are still decoded, but the bytes are passed through without a UTF-8 check.
    Unchecked,
}

/// Knobs for [`JsonTokenizer`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TokenizerOptions {
    pub string_validation: StringValidation,
}

impl TokenizerOptions {
    /// Options for callers who only copy string bytes around and never interpret them.
    pub fn unchecked_strings() -> Self {
        TokenizerOptions {
            string_validation: StringValidation::Unchecked,
        }
    }
}

// Note: char::is_ascii_whitespace is not available because some characters are not defined as
// whitespace character in JSON spec. For example, U+000C FORM FEED is whitespace in Rust but
// it isn't in JSON.
fn is_whitespace(c: u8) -> bool {
    matches!(c, 0x20 | 0xa | 0xd | 0x9)
}

/// A pull-based tokenizer which takes an in-memory byte slice and emits [`JsonToken`]s.
pub struct JsonTokenizer<'a> {
    bytes: &'a [u8],
    pos: usize,
    location: Location,
    options: TokenizerOptions,
}

impl<'a> JsonTokenizer<'a> {
    /// Create a new [`JsonTokenizer`] with default (strict) options.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self::with_options(bytes, TokenizerOptions::default())
    }

    /// Create a new [`JsonTokenizer`].
    pub fn with_options(bytes: &'a [u8], options: TokenizerOptions) -> Self {
        JsonTokenizer {
            bytes,
            pos: 0,
            location: Location::default(),
            options,
        }
    }

    /// The location of the token that will be returned by the next call to `next_token()`.
    ///
    /// Well that's not entirely true if there is whitespace before the next token. In that
    /// case, this would be the location of that white space.
    pub fn location(&self) -> Location {
        self.location
    }

    /// Returns an error if there is more than just white space in the remaining bytes.
    pub fn expect_eof(&mut self) -> Result<(), JsonParseError> {
        match self.peek_byte_skip_whitespace() {
            Some(b) => self.err(format!("Expected EOF but found byte {b:#x}")),
            None => Ok(()),
        }
    }

    fn err<T>(&self, msg: String) -> Result<T, JsonParseError> {
        Err(JsonParseError::new(msg, self.location))
    }

    fn eof_err(&self) -> JsonParseError {
        JsonParseError::new(String::from("Unexpected EOF"), self.location)
    }

    fn peek_byte(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_byte_skip_whitespace(&mut self) -> Option<u8> {
        while let Some(c) = self.peek_byte() {
            if is_whitespace(c) {
                self.advance(c);
                continue;
            }
            return Some(c);
        }
        None
    }

    fn advance(&mut self, b: u8) {
        self.pos += 1;
        self.location.advance_by_byte(b);
    }

    fn consume_byte(&mut self) -> Result<u8, JsonParseError> {
        match self.peek_byte() {
            Some(b) => {
                self.advance(b);
                Ok(b)
            }
            None => Err(self.eof_err()),
        }
    }

    fn consume_hex_u16(&mut self) -> JsonParseResult<u16> {
        let mut u = 0u16;
        for _ in 0..4 {
            let b = self.consume_byte()?;
            match ascii_byte_to_hex_digit(b) {
                Some(h) => u = u * 0x10 + h as u16,
                None => return self.err(format!("Unicode character must be \\uXXXX (X is hex character) format but found byte {b:#x}")),
            }
        }
        Ok(u)
    }

    fn consume_unicode_escape(&mut self) -> JsonParseResult<char> {
        let u = self.consume_hex_u16()?;
        let c = match u {
            0xD800..=0xDBFF => {
                // First surrogate. The second one must be directly following.
                if self.consume_byte()? != b'\\' || self.consume_byte()? != b'u' {
                    return self.err(format!("First UTF-16 surrogate {u:#x} must be directly followed by a second \\uXXXX surrogate."));
                }
                let u2 = self.consume_hex_u16()?;
                if !matches!(u2, 0xDC00..=0xDFFF) {
                    return self.err(format!("First UTF-16 surrogate {u:#x} must be directly followed by a second \\uXXXX surrogate, but found something that's not a second surrogate: {u2:#x}."));
                }
                // Assemble both surrogates into a char, the same way that char::decode_utf16 does it.
                (((u & 0x3ff) as u32) << 10 | (u2 & 0x3ff) as u32) + 0x1_0000
            }
            0xDC00..=0xDFFF => {
                return self.err(format!("Unpaired UTF-16 second surrogate: {u:#x}"));
            }
            _ => u as u32,
        };
        match char::from_u32(c) {
            Some(c) => Ok(c),
            None => self.err(format!("Invalid code point {c:#x} in \\u escape")),
        }
    }

    fn consume_string(&mut self) -> JsonParseResult<JsonToken<'a>> {
        // The caller has peeked the opening quote.
        self.consume_byte()?;
        let start = self.pos;

        // Fast path: scan for the closing quote. If no escape shows up, the token
        // borrows straight from the input.
        loop {
            match self.consume_byte()? {
                b'"' => {
                    let bytes = self.bytes;
                    let s = &bytes[start..self.pos - 1];
                    self.check_utf8(s)?;
                    return Ok(JsonToken::String(Cow::Borrowed(s)));
                }
                b'\\' => break,
                // Note: c.is_control() is not available here because JSON accepts 0x7f (DEL) in
                // string literals but 0x7f is control character.
                b if b < 0x20 => {
                    return self.err(format!("Unexpected control character {b:#x} in string"));
                }
                _ => {}
            }
        }

        // Slow path: decode escapes into an owned buffer. The backslash we just
        // consumed is handled on the first iteration.
        let mut s = self.bytes[start..self.pos - 1].to_vec();
        let mut pending_escape = true;
        loop {
            let b = if pending_escape {
                pending_escape = false;
                b'\\'
            } else {
                self.consume_byte()?
            };
            let b = match b {
                b'\\' => match self.consume_byte()? {
                    b'\\' => b'\\',
                    b'/' => b'/',
                    b'"' => b'"',
                    b'b' => 0x8,
                    b'f' => 0xc,
                    b'n' => b'\n',
                    b'r' => b'\r',
                    b't' => b'\t',
                    b'u' => {
                        let c = self.consume_unicode_escape()?;
                        s.extend_from_slice(c.encode_utf8(&mut [0; 4]).as_bytes());
                        continue;
                    }
                    b => return self.err(format!("{b:#x} is invalid escaped character")),
                },
                b'"' => {
                    self.check_utf8(&s)?;
                    return Ok(JsonToken::String(Cow::Owned(s)));
                }
                b if b < 0x20 => {
                    return self.err(format!("Unexpected control character {b:#x} in string"));
                }
                b => b,
            };

            s.push(b);
        }
    }

    fn check_utf8(&self, s: &[u8]) -> JsonParseResult<()> {
        match self.options.string_validation {
            StringValidation::Unchecked => Ok(()),
            StringValidation::Strict => match std::str::from_utf8(s) {
                Ok(_) => Ok(()),
                Err(_) => self.err("Invalid UTF-8 in string".into()),
            },
        }
    }

    fn consume_constant(&mut self, s: &'static str) -> Result<(), JsonParseError> {
        for expected_byte in s.as_bytes() {
            let b = self.consume_byte()?;
            if b != *expected_byte {
                return Err(JsonParseError::new(
                    format!("Unexpected byte {b:#x} while parsing '{s}'",),
                    self.location,
                ));
            }
        }
        Ok(())
    }

    fn consume_null(&mut self) -> JsonParseResult<JsonToken<'a>> {
        self.consume_constant("null")?;
        Ok(JsonToken::Null)
    }

    fn consume_true(&mut self) -> JsonParseResult<JsonToken<'a>> {
        self.consume_constant("true")?;
        Ok(JsonToken::True)
    }

    fn consume_false(&mut self) -> JsonParseResult<JsonToken<'a>> {
        self.consume_constant("false")?;
        Ok(JsonToken::False)
    }

    fn consume_digits(&mut self) -> usize {
        let mut count = 0;
        while let Some(d @ b'0'..=b'9') = self.peek_byte() {
            self.advance(d);
            count += 1;
        }
        count
    }

    fn consume_number(&mut self) -> JsonParseResult<JsonToken<'a>> {
        let start = self.pos;
        if self.peek_byte() == Some(b'-') {
            self.advance(b'-');
        }

        let int_start = self.pos;
        let int_len = self.consume_digits();
        if int_len == 0 {
            return self.err("Integer part must not be empty in number literal".to_string());
        }
        if self.bytes[int_start] == b'0' && int_len > 1 {
            return self
                .err("Integer part of number must not start with 0 except for '0'".to_string());
        }

        let mut is_integer = true;
        if self.peek_byte() == Some(b'.') {
            is_integer = false;
            self.advance(b'.');
            if self.consume_digits() == 0 {
                return self.err("Fraction part of number must not be empty".to_string());
            }
        }

        if let Some(e @ (b'e' | b'E')) = self.peek_byte() {
            is_integer = false;
            self.advance(e);
            if let Some(sign @ (b'+' | b'-')) = self.peek_byte() {
                self.advance(sign);
            }
            if self.consume_digits() == 0 {
                return self.err("Exponent part must not be empty in number literal".to_string());
            }
        }

        // Only ASCII digits, signs, '.' and 'e' were consumed above.
        let s = match std::str::from_utf8(&self.bytes[start..self.pos]) {
            Ok(s) => s,
            Err(err) => return self.err(format!("Invalid number literal: {err}")),
        };

        if is_integer {
            return match s.parse::<i64>() {
                Ok(n) => Ok(JsonToken::Integer(n)),
                Err(_) => self.err(format!("Integer overflow in number literal '{s}'")),
            };
        }

        match s.parse::<f64>() {
            Ok(n) if n.is_infinite() => {
                self.err(format!("Numeric overflow in number literal '{s}'"))
            }
            Ok(n) => Ok(JsonToken::Double(n)),
            Err(err) => self.err(format!("Invalid number literal '{}': {}", s, err)),
        }
    }

    /// Parses a token and returns it, or an error.
    pub fn next_token(&mut self) -> JsonParseResult<JsonToken<'a>> {
        let b = self
            .peek_byte_skip_whitespace()
            .ok_or_else(|| self.eof_err())?;
        let token = match b {
            b'[' => JsonToken::ArrayOpen,
            b']' => JsonToken::ArrayClose,
            b'{' => JsonToken::ObjOpen,
            b'}' => JsonToken::ObjClose,
            b':' => JsonToken::Colon,
            b',' => JsonToken::Comma,
            b'0'..=b'9' | b'-' => return self.consume_number(),
            b'"' => return self.consume_string(),
            b't' => return self.consume_true(),
            b'f' => return self.consume_false(),
            b'n' => return self.consume_null(),
            c => return self.err(format!("Invalid byte: {c:#x}")),
        };
        self.consume_byte()?;
        Ok(token)
    }
}

fn ascii_byte_to_hex_digit(c: u8) -> Option<u8> {
    if c.is_ascii_digit() {
        Some(c - b'0')
    } else if (b'a'..=b'f').contains(&c) {
        Some(10 + (c - b'a'))
    } else if (b'A'..=b'F').contains(&c) {
        Some(10 + (c - b'A'))
    } else {
        None
    }
}
