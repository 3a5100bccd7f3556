//! Lexical tokens and comments.

use crate::span::{Loc, Span};

/// A calendar date.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Date {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

/// A clock time.
///
/// `second` is already leap-second normalized: a literal `:60` is stored as
/// `59`. The raw text of the literal is preserved on the token.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Time {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub nanosecond: u32,
    /// `false` when the literal omitted the seconds (TOML 1.1 `HH:MM`).
    pub has_seconds: bool,
}

/// A UTC offset suffix of an offset date-time.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TimeOffset {
    /// The `Z`/`z` suffix (UTC).
    Z,
    /// A numeric `±HH:MM` offset, in signed minutes from UTC.
    Custom { minutes: i16 },
}

/// The parsed components of a date-time literal.
///
/// Which parts are populated follows the token kind: offset date-times have
/// all three, local date-times a date and a time, and so on.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct DateTime {
    pub date: Option<Date>,
    pub time: Option<Time>,
    pub offset: Option<TimeOffset>,
}

/// The exact representation of an integer literal.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct IntegerRepr {
    /// 2, 8, 10 or 16.
    pub radix: u32,
    /// The digits with underscores stripped; decimal values keep a leading
    /// `-` sign. This is exact even when the value overflows `i64`.
    pub digits: Box<str>,
    /// The numeric value, when it fits in an `i64`.
    pub value: Option<i64>,
}

impl IntegerRepr {
    pub(crate) fn new(radix: u32, digits: Box<str>) -> Self {
        let value = i64::from_str_radix(&digits, radix).ok();
        Self {
            radix,
            digits,
            value,
        }
    }
}

/// The kind of a [`Token`], with a typed payload where one exists.
///
/// String payloads are the decoded contents (escapes applied, delimiters and
/// the trimmed leading newline of multi-line strings removed); the raw text
/// is on the token itself.
#[derive(Clone, PartialEq, Debug)]
pub enum TokenKind {
    Punctuator(char),
    Bare,
    BasicString(Box<str>),
    LiteralString(Box<str>),
    MultiLineBasicString(Box<str>),
    MultiLineLiteralString(Box<str>),
    Integer(IntegerRepr),
    Float(f64),
    Boolean(bool),
    OffsetDateTime(DateTime),
    LocalDateTime(DateTime),
    LocalDate(DateTime),
    LocalTime(DateTime),
}

impl TokenKind {
    /// The lint-AST type name of this token kind.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Punctuator(_) => "Punctuator",
            Self::Bare => "Bare",
            Self::BasicString(_) => "BasicString",
            Self::LiteralString(_) => "LiteralString",
            Self::MultiLineBasicString(_) => "MultiLineBasicString",
            Self::MultiLineLiteralString(_) => "MultiLineLiteralString",
            Self::Integer(_) => "Integer",
            Self::Float(_) => "Float",
            Self::Boolean(_) => "Boolean",
            Self::OffsetDateTime(_) => "OffsetDateTime",
            Self::LocalDateTime(_) => "LocalDateTime",
            Self::LocalDate(_) => "LocalDate",
            Self::LocalTime(_) => "LocalTime",
        }
    }
}

/// One lexical token.
#[derive(Clone, PartialEq, Debug)]
pub struct Token<'t> {
    pub kind: TokenKind,
    /// The raw source text covered by [`range`](Self::range).
    pub value: &'t str,
    pub range: Span,
    pub loc: Loc,
}

impl Token<'_> {
    /// Returns `true` if this token is the punctuator `c`.
    #[inline]
    pub fn is_punct(&self, c: char) -> bool {
        matches!(self.kind, TokenKind::Punctuator(p) if p == c)
    }

    /// The decoded string contents, for the four string token kinds.
    pub fn decoded_str(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::BasicString(s)
            | TokenKind::LiteralString(s)
            | TokenKind::MultiLineBasicString(s)
            | TokenKind::MultiLineLiteralString(s) => Some(s),
            _ => None,
        }
    }
}

/// A `# ...` comment.
///
/// Collected separately from tokens; `range` covers the `#` while `value`
/// excludes it.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Comment<'t> {
    /// The comment text without the leading `#`.
    pub value: &'t str,
    pub range: Span,
    pub loc: Loc,
}
