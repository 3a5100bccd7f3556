use std::fmt::{self, Debug, Display};

#[cfg(test)]
#[path = "./error_tests.rs"]
mod tests;

/// Stable machine-readable codes for everything that can go wrong during a
/// parse. Lexical codes come from the tokenizer, structural codes from the
/// parser driver, and `DupeKeys` from the key resolver.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum ErrorCode {
    /// EOF inside a string literal.
    UnterminatedString,
    /// EOF or an unexpected token inside a `[table.key]` header.
    UnterminatedTableKey,
    /// EOF inside an array value.
    UnterminatedArray,
    /// EOF inside an inline table.
    UnterminatedInlineTable,
    /// `[]` or `[[]]` table header with no key.
    MissingKey,
    /// Two statements on one line.
    MissingNewline,
    /// A key with no `=` after it.
    MissingEqualsSign,
    /// EOF where a value was required.
    MissingValue,
    /// Two array values or inline-table pairs with no `,` between them.
    MissingComma,
    /// The same key path was defined more than once.
    DupeKeys,
    /// A character the grammar does not allow here.
    UnexpectedChar,
    /// A token the grammar does not allow here.
    UnexpectedToken,
    /// A control character outside a place that permits one.
    InvalidControlCharacter,
    /// Key, `=` and value split across lines.
    InvalidKeyValueNewline,
    /// A raw newline inside an inline table (TOML 1.0).
    InvalidInlineTableNewline,
    /// An underscore not strictly between two digits.
    InvalidUnderscore,
    /// Whitespace between the brackets of `[[` or `]]`.
    InvalidSpace,
    /// A run of six or more quotes inside a multi-line string.
    InvalidThreeQuotes,
    /// A calendar-impossible date.
    InvalidDate,
    /// A clock-impossible time.
    InvalidTime,
    /// A decimal integer starting with `0`.
    InvalidLeadingZero,
    /// A trailing comma inside `{ ... }` (TOML 1.0).
    InvalidTrailingCommaInInlineTable,
    /// A malformed escape sequence in a basic string.
    InvalidCharInEscapeSequence,
    /// A `\uHHHH`/`\UHHHHHHHH`/`\xHH` escape naming a non-scalar value.
    InvalidCodePoint,
}

impl ErrorCode {
    /// The stable kebab-case identifier for this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnterminatedString => "unterminated-string",
            Self::UnterminatedTableKey => "unterminated-table-key",
            Self::UnterminatedArray => "unterminated-array",
            Self::UnterminatedInlineTable => "unterminated-inline-table",
            Self::MissingKey => "missing-key",
            Self::MissingNewline => "missing-newline",
            Self::MissingEqualsSign => "missing-equals-sign",
            Self::MissingValue => "missing-value",
            Self::MissingComma => "missing-comma",
            Self::DupeKeys => "dupe-keys",
            Self::UnexpectedChar => "unexpected-char",
            Self::UnexpectedToken => "unexpected-token",
            Self::InvalidControlCharacter => "invalid-control-character",
            Self::InvalidKeyValueNewline => "invalid-key-value-newline",
            Self::InvalidInlineTableNewline => "invalid-inline-table-newline",
            Self::InvalidUnderscore => "invalid-underscore",
            Self::InvalidSpace => "invalid-space",
            Self::InvalidThreeQuotes => "invalid-three-quotes",
            Self::InvalidDate => "invalid-date",
            Self::InvalidTime => "invalid-time",
            Self::InvalidLeadingZero => "invalid-leading-zero",
            Self::InvalidTrailingCommaInInlineTable => "invalid-trailing-comma-in-inline-table",
            Self::InvalidCharInEscapeSequence => "invalid-char-in-escape-sequence",
            Self::InvalidCodePoint => "invalid-code-point",
        }
    }

    /// The fixed human-readable message for this code.
    pub fn message(&self) -> &'static str {
        match self {
            Self::UnterminatedString => "Unterminated string constant",
            Self::UnterminatedTableKey => "Unterminated table-key",
            Self::UnterminatedArray => "Unterminated array",
            Self::UnterminatedInlineTable => "Unterminated inline table",
            Self::MissingKey => "Empty bare keys are not allowed",
            Self::MissingNewline => "Must be a newline",
            Self::MissingEqualsSign => "Expected equal (=) token",
            Self::MissingValue => "Unspecified values are invalid",
            Self::MissingComma => "Expected comma (,) token",
            Self::DupeKeys => "Defining a key multiple times is invalid",
            Self::UnexpectedChar => "Unexpected character",
            Self::UnexpectedToken => "Unexpected token",
            Self::InvalidControlCharacter => {
                "Control characters (codes < 0x1f and 0x7f) are not allowed"
            }
            Self::InvalidKeyValueNewline => {
                "The key, equals sign, and value must be on the same line"
            }
            Self::InvalidInlineTableNewline => {
                "No newlines are allowed between the curly braces unless they are valid within a value."
            }
            Self::InvalidUnderscore => "Underscores are allowed between digits",
            Self::InvalidSpace => "Unexpected spaces",
            Self::InvalidThreeQuotes => "Three or more quotes are not permitted",
            Self::InvalidDate => "Unexpected invalid date",
            Self::InvalidTime => "Unexpected invalid time",
            Self::InvalidLeadingZero => "Leading zeros are not allowed",
            Self::InvalidTrailingCommaInInlineTable => {
                "Trailing comma is not permitted in an inline table."
            }
            Self::InvalidCharInEscapeSequence => "Invalid character in unicode sequence.",
            Self::InvalidCodePoint => "Invalid code point in unicode sequence.",
        }
    }
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A TOML parse error.
///
/// The first error terminates the parse; there is no partial AST and no
/// recovery. The position is exact: `index` is the byte offset of the
/// offending character or token, with the matching 1-based `line` and
/// 0-based `column`.
#[derive(Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The stable error code.
    pub code: ErrorCode,
    /// Byte offset of the error.
    pub index: usize,
    /// 1-based line number of the error.
    pub line: usize,
    /// 0-based column of the error.
    pub column: usize,
}

impl ParseError {
    pub(crate) fn new(code: ErrorCode, index: usize, line: usize, column: usize) -> Self {
        Self {
            code,
            index,
            line,
            column,
        }
    }

    /// The fixed human-readable message for this error's code.
    pub fn message(&self) -> &'static str {
        self.code.message()
    }
}

impl std::error::Error for ParseError {}

impl Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}:{})",
            self.code.message(),
            self.line,
            self.column
        )
    }
}

impl Debug for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseError")
            .field("code", &self.code)
            .field("index", &self.index)
            .field("line", &self.line)
            .field("column", &self.column)
            .finish()
    }
}
