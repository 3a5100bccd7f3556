//! Character-level finite state machine producing TOML tokens.

use crate::cursor::{CodePointIterator, Pos};
use crate::error::{ErrorCode, ParseError};
use crate::options::TomlVersion;
use crate::span::{LineCol, Loc, Span};
use crate::token::{Comment, Date, DateTime, IntegerRepr, Time, TimeOffset, Token, TokenKind};

#[cfg(test)]
#[path = "./tokenizer_tests.rs"]
mod tests;

/// One lexical item: a real token or a comment.
#[derive(Clone, PartialEq, Debug)]
pub(crate) enum TokenOrComment<'t> {
    Token(Token<'t>),
    Comment(Comment<'t>),
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum State {
    Data,
    Comment,
    Bare,
    BasicString,
    MultiLineBasicString,
    LiteralString,
    MultiLineLiteralString,
    Sign,
    Number,
    Hex,
    Octal,
    Binary,
    FractionalRight,
    ExponentRight,
    NanOrInf,
    Boolean,
    DateYear,
    DateMonth,
    DateDay,
    TimeHour,
    TimeMinute,
    TimeSecond,
    TimeSecFrac,
    TimeOffset,
}

/// Carry-over data between number and date-time states.
enum NumData {
    None,
    /// Mantissa text (sign included, underscores stripped) awaiting the
    /// exponent digits.
    Exponent { mantissa: String },
    /// Integer part text (sign included) awaiting the fractional digits.
    Fraction { int_part: String },
    DateTime(DateTimeData),
}

#[derive(Default)]
struct DateTimeData {
    has_date: bool,
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
    has_seconds: bool,
    nanosecond: u32,
    offset_minus: bool,
}

impl DateTimeData {
    fn time(&self) -> Time {
        Time {
            hour: self.hour,
            minute: self.minute,
            // A leap second is folded down so the components always name a
            // representable instant.
            second: if self.second == 60 { 59 } else { self.second },
            nanosecond: self.nanosecond,
            has_seconds: self.has_seconds,
        }
    }

    fn date(&self) -> Date {
        Date {
            year: self.year,
            month: self.month,
            day: self.day,
        }
    }
}

/// Where a committed token ends relative to the cursor.
#[derive(Copy, Clone)]
enum At {
    /// At the start of the most recently consumed character (the character
    /// is being replayed into the next state).
    Start,
    /// One past the most recently consumed character.
    End,
}

/// The tokenizer.
///
/// Pull-based: [`next`](Self::next) runs the state machine until one token or
/// comment is committed. The [`values_enabled`](Self::values_enabled) flag
/// switches between key position (bare keys, no value literals) and value
/// position (numbers, booleans, date-times, no bare keys); the parse context
/// flips it as containers open and close.
pub(crate) struct Tokenizer<'t> {
    text: &'t str,
    version: TomlVersion,
    iter: CodePointIterator<'t>,
    back_code: bool,
    last_cp: Option<char>,
    state: State,
    token: Option<TokenOrComment<'t>>,
    token_start: Pos,
    data: NumData,
    pub(crate) values_enabled: bool,
}

impl<'t> Tokenizer<'t> {
    pub(crate) fn new(text: &'t str, version: TomlVersion) -> Self {
        Self {
            text,
            version,
            iter: CodePointIterator::new(text),
            back_code: false,
            // Sentinel distinct from end-of-input so the first pump runs.
            last_cp: Some('\0'),
            state: State::Data,
            token: None,
            token_start: Pos::origin(),
            data: NumData::None,
            values_enabled: false,
        }
    }

    /// The position of the most recently consumed character.
    pub(crate) fn start_pos(&self) -> Pos {
        self.iter.start
    }

    /// The position just past the most recently consumed character.
    pub(crate) fn end_pos(&self) -> Pos {
        self.iter.end
    }

    /// Pumps the state machine until it commits a token, a comment, or hits
    /// the end of input.
    pub(crate) fn next(&mut self) -> Result<Option<TokenOrComment<'t>>, ParseError> {
        if let Some(item) = self.token.take() {
            return Ok(Some(item));
        }
        let mut cp = self.last_cp;
        while cp.is_some() && self.token.is_none() {
            cp = self.next_code();
            self.state = self.step(self.state, cp)?;
        }
        Ok(self.token.take())
    }

    fn next_code(&mut self) -> Option<char> {
        self.last_cp?;
        if self.back_code {
            self.back_code = false;
            return self.last_cp;
        }
        self.last_cp = self.iter.next();
        self.last_cp
    }

    /// Consumes `count` characters already seen through lookahead.
    fn skip(&mut self, mut count: usize) {
        if self.back_code && count > 0 {
            self.back_code = false;
            count -= 1;
        }
        if count == 0 {
            return;
        }
        count -= 1;
        for _ in 0..count {
            self.iter.next();
        }
        self.last_cp = self.iter.next();
    }

    /// Replays the current character into `state`.
    fn back(&mut self, state: State) -> State {
        self.back_code = true;
        state
    }

    fn report(&self, code: ErrorCode) -> ParseError {
        let pos = self.iter.start;
        ParseError::new(code, pos.offset, pos.line, pos.column)
    }

    fn report_at_end(&self, code: ErrorCode) -> ParseError {
        let pos = self.iter.end;
        ParseError::new(code, pos.offset, pos.line, pos.column)
    }

    fn start_token(&mut self) {
        self.token_start = self.iter.start;
    }

    fn end_token(&mut self, kind: TokenKind, at: At) {
        let end = match at {
            At::Start => self.iter.start,
            At::End => self.iter.end,
        };
        let range = Span::new(self.token_start.offset, end.offset);
        let loc = Loc::new(
            LineCol::new(self.token_start.line, self.token_start.column),
            LineCol::new(end.line, end.column),
        );
        self.token = Some(TokenOrComment::Token(Token {
            kind,
            value: &self.text[range.start..range.end],
            range,
            loc,
        }));
    }

    /// Commits a comment, excluding the `#` from its value.
    fn end_comment(&mut self) {
        let end = self.iter.start;
        let range = Span::new(self.token_start.offset, end.offset);
        let loc = Loc::new(
            LineCol::new(self.token_start.line, self.token_start.column),
            LineCol::new(end.line, end.column),
        );
        self.token = Some(TokenOrComment::Comment(Comment {
            value: &self.text[range.start + 1..range.end],
            range,
            loc,
        }));
    }

    fn punctuator(&mut self, cp: char) {
        self.start_token();
        self.end_token(TokenKind::Punctuator(cp), At::End);
    }

    fn step(&mut self, state: State, cp: Option<char>) -> Result<State, ParseError> {
        match state {
            State::Data => self.data_state(cp),
            State::Comment => self.comment(cp),
            State::Bare => self.bare(cp),
            State::BasicString => self.basic_string(cp),
            State::MultiLineBasicString => self.multi_line_basic_string(cp),
            State::LiteralString => self.literal_string(cp),
            State::MultiLineLiteralString => self.multi_line_literal_string(cp),
            State::Sign => self.sign(cp),
            State::Number => self.number(cp),
            State::Hex => self.radix_digits(cp, 16),
            State::Octal => self.radix_digits(cp, 8),
            State::Binary => self.radix_digits(cp, 2),
            State::FractionalRight => self.fractional_right(cp),
            State::ExponentRight => self.exponent_right(cp),
            State::NanOrInf => self.nan_or_inf(cp),
            State::Boolean => self.boolean(cp),
            State::DateYear => self.date_year(cp),
            State::DateMonth => self.date_month(cp),
            State::DateDay => self.date_day(cp),
            State::TimeHour => self.time_hour(cp),
            State::TimeMinute => self.time_minute(cp),
            State::TimeSecond => self.time_second(cp),
            State::TimeSecFrac => self.time_sec_frac(cp),
            State::TimeOffset => self.time_offset(cp),
        }
    }

    fn data_state(&mut self, mut cp: Option<char>) -> Result<State, ParseError> {
        while matches!(cp, Some(c) if is_whitespace(c) || c == '\n') {
            cp = self.next_code();
        }
        let Some(c) = cp else {
            return Ok(State::Data);
        };
        match c {
            '#' => {
                self.start_token();
                return Ok(State::Comment);
            }
            '"' => {
                self.start_token();
                return Ok(State::BasicString);
            }
            '\'' => {
                self.start_token();
                return Ok(State::LiteralString);
            }
            '.' | '=' | '[' | ']' | '{' | '}' | ',' => {
                self.punctuator(c);
                return Ok(State::Data);
            }
            _ => {}
        }
        if self.values_enabled {
            if c == '-' || c == '+' {
                self.start_token();
                return Ok(State::Sign);
            }
            if c == 'n' || c == 'i' {
                self.start_token();
                return Ok(self.back(State::NanOrInf));
            }
            if c.is_ascii_digit() {
                self.start_token();
                return Ok(self.back(State::Number));
            }
            if c == 't' || c == 'f' {
                self.start_token();
                return Ok(self.back(State::Boolean));
            }
        } else if self.version.is_bare_key_char(c) {
            self.start_token();
            return Ok(State::Bare);
        }
        Err(self.report(ErrorCode::UnexpectedChar))
    }

    fn comment(&mut self, mut cp: Option<char>) -> Result<State, ParseError> {
        let check_control = !self.version.allows_control_chars_in_comments();
        while let Some(c) = cp {
            if c == '\n' {
                break;
            }
            if check_control && is_control_other_than_tab(c) {
                return Err(self.report(ErrorCode::InvalidControlCharacter));
            }
            cp = self.next_code();
        }
        self.end_comment();
        Ok(State::Data)
    }

    fn bare(&mut self, mut cp: Option<char>) -> Result<State, ParseError> {
        while matches!(cp, Some(c) if self.version.is_bare_key_char(c)) {
            cp = self.next_code();
        }
        self.end_token(TokenKind::Bare, At::Start);
        Ok(self.back(State::Data))
    }

    fn basic_string(&mut self, mut cp: Option<char>) -> Result<State, ParseError> {
        if cp == Some('"') {
            cp = self.next_code();
            if cp == Some('"') {
                return Ok(State::MultiLineBasicString);
            }
            self.end_token(TokenKind::BasicString(Box::from("")), At::Start);
            return Ok(self.back(State::Data));
        }
        let mut out = String::new();
        while let Some(c) = cp {
            if c == '"' || c == '\n' {
                break;
            }
            if is_control_other_than_tab(c) {
                return Err(self.report(ErrorCode::InvalidControlCharacter));
            }
            if c == '\\' {
                cp = self.next_code();
                out.push(self.escape(cp)?);
                cp = self.next_code();
                continue;
            }
            out.push(c);
            cp = self.next_code();
        }
        if cp != Some('"') {
            return Err(self.report(ErrorCode::UnterminatedString));
        }
        self.end_token(TokenKind::BasicString(out.into()), At::End);
        Ok(State::Data)
    }

    fn multi_line_basic_string(&mut self, mut cp: Option<char>) -> Result<State, ParseError> {
        let mut out = String::new();
        if cp == Some('\n') {
            // A newline right after the opening delimiter is trimmed.
            cp = self.next_code();
        }
        while let Some(c) = cp {
            if c != '\n' && is_control_other_than_tab(c) {
                return Err(self.report(ErrorCode::InvalidControlCharacter));
            }
            if c == '"' {
                if let Some(count) = self.closing_quotes('"', &mut out)? {
                    self.skip(count - 1);
                    self.end_token(TokenKind::MultiLineBasicString(out.into()), At::End);
                    return Ok(State::Data);
                }
            }
            if c == '\\' {
                cp = self.next_code();
                match cp {
                    Some('\n') => {
                        // Line continuation.
                        cp = self.next_code();
                        while matches!(cp, Some(w) if is_whitespace(w) || w == '\n') {
                            cp = self.next_code();
                        }
                        continue;
                    }
                    Some(w) if is_whitespace(w) => {
                        // Only valid when nothing but whitespace remains on
                        // the line.
                        let mut valid = true;
                        let mut sub = self.iter.sub_code_points();
                        while let Some(n) = sub.next() {
                            if n == '\n' {
                                break;
                            }
                            if !is_whitespace(n) {
                                valid = false;
                                break;
                            }
                        }
                        if valid {
                            cp = self.next_code();
                            while matches!(cp, Some(w) if is_whitespace(w) || w == '\n') {
                                cp = self.next_code();
                            }
                            continue;
                        }
                        return Err(self.report(ErrorCode::InvalidCharInEscapeSequence));
                    }
                    _ => {
                        out.push(self.escape(cp)?);
                        cp = self.next_code();
                        continue;
                    }
                }
            }
            out.push(c);
            cp = self.next_code();
        }
        Err(self.report(ErrorCode::UnterminatedString))
    }

    fn literal_string(&mut self, mut cp: Option<char>) -> Result<State, ParseError> {
        if cp == Some('\'') {
            cp = self.next_code();
            if cp == Some('\'') {
                return Ok(State::MultiLineLiteralString);
            }
            self.end_token(TokenKind::LiteralString(Box::from("")), At::Start);
            return Ok(self.back(State::Data));
        }
        let mut out = String::new();
        while let Some(c) = cp {
            if c == '\'' || c == '\n' {
                break;
            }
            if is_control_other_than_tab(c) {
                return Err(self.report(ErrorCode::InvalidControlCharacter));
            }
            out.push(c);
            cp = self.next_code();
        }
        if cp != Some('\'') {
            return Err(self.report(ErrorCode::UnterminatedString));
        }
        self.end_token(TokenKind::LiteralString(out.into()), At::End);
        Ok(State::Data)
    }

    fn multi_line_literal_string(&mut self, mut cp: Option<char>) -> Result<State, ParseError> {
        let mut out = String::new();
        if cp == Some('\n') {
            cp = self.next_code();
        }
        while let Some(c) = cp {
            if c != '\n' && is_control_other_than_tab(c) {
                return Err(self.report(ErrorCode::InvalidControlCharacter));
            }
            if c == '\'' {
                if let Some(count) = self.closing_quotes('\'', &mut out)? {
                    self.skip(count - 1);
                    self.end_token(TokenKind::MultiLineLiteralString(out.into()), At::End);
                    return Ok(State::Data);
                }
            }
            out.push(c);
            cp = self.next_code();
        }
        Err(self.report(ErrorCode::UnterminatedString))
    }

    /// Looks past a quote character for a multi-line closing delimiter.
    ///
    /// Returns the number of characters seen through the lookahead when the
    /// delimiter is there; a quote run of four or five embeds the extra
    /// quotes in `out`, six or more is an error.
    fn closing_quotes(&mut self, quote: char, out: &mut String) -> Result<Option<usize>, ParseError> {
        let mut sub = self.iter.sub_code_points();
        if sub.next() != Some(quote) || sub.next() != Some(quote) {
            return Ok(None);
        }
        if sub.next() == Some(quote) {
            out.push(quote);
            if sub.next() == Some(quote) {
                out.push(quote);
                if sub.next() == Some(quote) {
                    return Err(self.report(ErrorCode::InvalidThreeQuotes));
                }
            }
        }
        Ok(Some(sub.count))
    }

    /// Decodes the character after a backslash in a basic string.
    fn escape(&mut self, cp: Option<char>) -> Result<char, ParseError> {
        match cp {
            Some('b') => Ok('\u{8}'),
            Some('t') => Ok('\t'),
            Some('n') => Ok('\n'),
            Some('f') => Ok('\u{c}'),
            Some('r') => Ok('\r'),
            Some('"') => Ok('"'),
            Some('\\') => Ok('\\'),
            Some('u') => self.parse_unicode(4),
            Some('U') => self.parse_unicode(8),
            Some('e') if self.version.allows_extended_escapes() => Ok('\u{1b}'),
            Some('x') if self.version.allows_extended_escapes() => self.parse_unicode(2),
            _ => Err(self.report(ErrorCode::InvalidCharInEscapeSequence)),
        }
    }

    /// Parses `count` hex digits of a `\u`/`\U`/`\x` escape into a scalar
    /// value.
    fn parse_unicode(&mut self, count: usize) -> Result<char, ParseError> {
        let mut sub = self.iter.sub_code_points();
        let mut value: u32 = 0;
        let mut read = 0;
        while read < count {
            let Some(c) = sub.next() else {
                // Let the caller see the end of input and report the
                // unterminated string.
                break;
            };
            let Some(digit) = c.to_digit(16) else {
                return Err(self.report(ErrorCode::InvalidCharInEscapeSequence));
            };
            value = value * 16 + digit;
            read += 1;
        }
        self.skip(read);
        char::from_u32(value).ok_or_else(|| self.report(ErrorCode::InvalidCodePoint))
    }

    fn sign(&mut self, cp: Option<char>) -> Result<State, ParseError> {
        match cp {
            Some('n') | Some('i') => Ok(self.back(State::NanOrInf)),
            Some(c) if c.is_ascii_digit() => Ok(self.back(State::Number)),
            _ => Err(self.report(ErrorCode::UnexpectedChar)),
        }
    }

    fn nan_or_inf(&mut self, cp: Option<char>) -> Result<State, ParseError> {
        if cp == Some('n') {
            let mut sub = self.iter.sub_code_points();
            if sub.next() == Some('a') && sub.next() == Some('n') {
                self.skip(2);
                self.end_token(TokenKind::Float(f64::NAN), At::End);
                return Ok(State::Data);
            }
        } else if cp == Some('i') {
            let mut sub = self.iter.sub_code_points();
            if sub.next() == Some('n') && sub.next() == Some('f') {
                self.skip(2);
                let value = if self.text.as_bytes()[self.token_start.offset] == b'-' {
                    f64::NEG_INFINITY
                } else {
                    f64::INFINITY
                };
                self.end_token(TokenKind::Float(value), At::End);
                return Ok(State::Data);
            }
        }
        Err(self.report(ErrorCode::UnexpectedChar))
    }

    fn number(&mut self, cp: Option<char>) -> Result<State, ParseError> {
        let sign = match self.text.as_bytes()[self.token_start.offset] {
            b'+' => Some('+'),
            b'-' => Some('-'),
            _ => None,
        };
        if cp == Some('0') {
            if sign.is_none() {
                let mut sub = self.iter.sub_code_points();
                let next = sub.next();
                if matches!(next, Some(c) if c.is_ascii_digit()) {
                    let next_next = sub.next();
                    let is_date = matches!(next_next, Some(c) if c.is_ascii_digit())
                        && matches!(sub.next(), Some(c) if c.is_ascii_digit())
                        && sub.next() == Some('-');
                    if is_date || next_next == Some(':') {
                        self.data = NumData::DateTime(DateTimeData {
                            has_date: is_date,
                            has_seconds: true,
                            ..DateTimeData::default()
                        });
                        return Ok(self.back(if is_date {
                            State::DateYear
                        } else {
                            State::TimeHour
                        }));
                    }
                    return Err(self.report_at_end(ErrorCode::InvalidLeadingZero));
                }
            }

            let cp = self.next_code();
            match cp {
                Some('x') | Some('o') | Some('b') => {
                    if sign.is_some() {
                        return Err(self.report(ErrorCode::UnexpectedChar));
                    }
                    return Ok(match cp {
                        Some('x') => State::Hex,
                        Some('o') => State::Octal,
                        _ => State::Binary,
                    });
                }
                Some('e') | Some('E') => {
                    // -0.0 and +0.0 are valid and keep their sign.
                    let mantissa = if sign == Some('-') { "-0" } else { "0" };
                    self.data = NumData::Exponent {
                        mantissa: mantissa.to_owned(),
                    };
                    return Ok(State::ExponentRight);
                }
                Some('.') => {
                    let int_part = if sign == Some('-') { "-0" } else { "0" };
                    self.data = NumData::Fraction {
                        int_part: int_part.to_owned(),
                    };
                    return Ok(State::FractionalRight);
                }
                _ => {}
            }
            // -0 and +0 are identical to an unprefixed zero.
            self.end_token(TokenKind::Integer(IntegerRepr::new(10, Box::from("0"))), At::Start);
            return Ok(self.back(State::Data));
        }

        let parsed = self.parse_digits(cp, |c| c.is_ascii_digit())?;
        if parsed.next_cp == Some('-')
            && sign.is_none()
            && !parsed.has_underscore
            && parsed.digits.len() == 4
        {
            self.data = NumData::DateTime(DateTimeData {
                has_date: true,
                year: digits_value(&parsed.digits) as u16,
                has_seconds: true,
                ..DateTimeData::default()
            });
            return Ok(State::DateMonth);
        }
        if parsed.next_cp == Some(':')
            && sign.is_none()
            && !parsed.has_underscore
            && parsed.digits.len() == 2
        {
            self.data = NumData::DateTime(DateTimeData {
                has_date: false,
                hour: digits_value(&parsed.digits) as u8,
                has_seconds: true,
                ..DateTimeData::default()
            });
            return Ok(State::TimeMinute);
        }
        let mut text = String::new();
        if sign == Some('-') {
            text.push('-');
        }
        text.push_str(&parsed.digits);
        if matches!(parsed.next_cp, Some('e') | Some('E')) {
            self.data = NumData::Exponent { mantissa: text };
            return Ok(State::ExponentRight);
        }
        if parsed.next_cp == Some('.') {
            self.data = NumData::Fraction { int_part: text };
            return Ok(State::FractionalRight);
        }
        self.end_token(TokenKind::Integer(IntegerRepr::new(10, text.into())), At::Start);
        Ok(self.back(State::Data))
    }

    fn radix_digits(&mut self, cp: Option<char>, radix: u32) -> Result<State, ParseError> {
        let parsed = self.parse_digits(cp, match radix {
            16 => |c: char| c.is_ascii_hexdigit(),
            8 => |c: char| ('0'..='7').contains(&c),
            _ => |c: char| c == '0' || c == '1',
        })?;
        self.end_token(
            TokenKind::Integer(IntegerRepr::new(radix, parsed.digits.into())),
            At::Start,
        );
        Ok(self.back(State::Data))
    }

    fn fractional_right(&mut self, cp: Option<char>) -> Result<State, ParseError> {
        let NumData::Fraction { int_part } = std::mem::replace(&mut self.data, NumData::None)
        else {
            unreachable!("fractional state without an integer part");
        };
        let parsed = self.parse_digits(cp, |c| c.is_ascii_digit())?;
        let mut text = int_part;
        text.push('.');
        text.push_str(&parsed.digits);
        if matches!(parsed.next_cp, Some('e') | Some('E')) {
            self.data = NumData::Exponent { mantissa: text };
            return Ok(State::ExponentRight);
        }
        self.end_token(TokenKind::Float(parse_float(&text)), At::Start);
        Ok(self.back(State::Data))
    }

    fn exponent_right(&mut self, mut cp: Option<char>) -> Result<State, ParseError> {
        let NumData::Exponent { mantissa } = std::mem::replace(&mut self.data, NumData::None)
        else {
            unreachable!("exponent state without a mantissa");
        };
        let mut text = mantissa;
        text.push('e');
        if cp == Some('-') || cp == Some('+') {
            if cp == Some('-') {
                text.push('-');
            }
            cp = self.next_code();
        }
        let parsed = self.parse_digits(cp, |c| c.is_ascii_digit())?;
        text.push_str(&parsed.digits);
        self.end_token(TokenKind::Float(parse_float(&text)), At::Start);
        Ok(self.back(State::Data))
    }

    fn boolean(&mut self, cp: Option<char>) -> Result<State, ParseError> {
        if cp == Some('t') {
            let mut sub = self.iter.sub_code_points();
            if sub.next() == Some('r') && sub.next() == Some('u') && sub.next() == Some('e') {
                self.skip(sub.count);
                self.end_token(TokenKind::Boolean(true), At::End);
                return Ok(State::Data);
            }
        } else if cp == Some('f') {
            let mut sub = self.iter.sub_code_points();
            if sub.next() == Some('a')
                && sub.next() == Some('l')
                && sub.next() == Some('s')
                && sub.next() == Some('e')
            {
                self.skip(sub.count);
                self.end_token(TokenKind::Boolean(false), At::End);
                return Ok(State::Data);
            }
        }
        Err(self.report(ErrorCode::UnexpectedChar))
    }

    fn date_time_data(&mut self) -> &mut DateTimeData {
        match &mut self.data {
            NumData::DateTime(data) => data,
            // The date-time states are only ever entered with the data set.
            _ => unreachable!("date-time state without date-time data"),
        }
    }

    /// Reads a two-digit field, the first digit already in hand.
    fn two_digits(&mut self, cp: Option<char>) -> Result<u8, ParseError> {
        let Some(hi) = cp.and_then(|c| c.to_digit(10)) else {
            return Err(self.report(ErrorCode::UnexpectedChar));
        };
        let Some(lo) = self.next_code().and_then(|c| c.to_digit(10)) else {
            return Err(self.report(ErrorCode::UnexpectedChar));
        };
        Ok((hi * 10 + lo) as u8)
    }

    fn date_year(&mut self, cp: Option<char>) -> Result<State, ParseError> {
        // The zero-lookahead already established four digits and a hyphen.
        let mut year = 0u16;
        let mut cp = cp;
        for i in 0..4 {
            let Some(d) = cp.and_then(|c| c.to_digit(10)) else {
                return Err(self.report(ErrorCode::UnexpectedChar));
            };
            year = year * 10 + d as u16;
            if i < 3 {
                cp = self.next_code();
            }
        }
        self.iter.eat('-');
        self.date_time_data().year = year;
        Ok(State::DateMonth)
    }

    fn date_month(&mut self, cp: Option<char>) -> Result<State, ParseError> {
        let month = self.two_digits(cp)?;
        if self.next_code() != Some('-') {
            return Err(self.report(ErrorCode::UnexpectedChar));
        }
        self.date_time_data().month = month;
        Ok(State::DateDay)
    }

    fn date_day(&mut self, cp: Option<char>) -> Result<State, ParseError> {
        let day = self.two_digits(cp)?;
        let data = self.date_time_data();
        data.day = day;
        if !is_valid_date(data.year, data.month, data.day) {
            return Err(self.report(ErrorCode::InvalidDate));
        }

        let cp = self.next_code();
        if cp == Some('T') || cp == Some('t') {
            return Ok(State::TimeHour);
        }
        if cp == Some(' ') {
            let mut sub = self.iter.sub_code_points();
            if matches!(sub.next(), Some(c) if c.is_ascii_digit())
                && matches!(sub.next(), Some(c) if c.is_ascii_digit())
            {
                return Ok(State::TimeHour);
            }
        }
        let dt = DateTime {
            date: Some(self.date_time_data().date()),
            time: None,
            offset: None,
        };
        self.end_token(TokenKind::LocalDate(dt), At::Start);
        Ok(self.back(State::Data))
    }

    fn time_hour(&mut self, cp: Option<char>) -> Result<State, ParseError> {
        let hour = self.two_digits(cp)?;
        if self.next_code() != Some(':') {
            return Err(self.report(ErrorCode::UnexpectedChar));
        }
        self.date_time_data().hour = hour;
        Ok(State::TimeMinute)
    }

    fn time_minute(&mut self, cp: Option<char>) -> Result<State, ParseError> {
        let minute = self.two_digits(cp)?;
        self.date_time_data().minute = minute;
        let cp = self.next_code();
        if cp == Some(':') {
            return Ok(State::TimeSecond);
        }
        if self.version.allows_omitted_seconds() {
            let data = self.date_time_data();
            data.second = 0;
            data.has_seconds = false;
            if !is_valid_time(data.hour, data.minute, 0) {
                return Err(self.report(ErrorCode::InvalidTime));
            }
            return self.end_time(cp);
        }
        Err(self.report(ErrorCode::UnexpectedChar))
    }

    fn time_second(&mut self, cp: Option<char>) -> Result<State, ParseError> {
        let second = self.two_digits(cp)?;
        let data = self.date_time_data();
        data.second = second;
        if !is_valid_time(data.hour, data.minute, data.second) {
            return Err(self.report(ErrorCode::InvalidTime));
        }

        let cp = self.next_code();
        if cp == Some('.') {
            return Ok(State::TimeSecFrac);
        }
        self.end_time(cp)
    }

    fn time_sec_frac(&mut self, mut cp: Option<char>) -> Result<State, ParseError> {
        if !matches!(cp, Some(c) if c.is_ascii_digit()) {
            return Err(self.report(ErrorCode::UnexpectedChar));
        }
        let mut nanos = 0u32;
        let mut digits = 0u32;
        while let Some(d) = cp.and_then(|c| c.to_digit(10)) {
            // Precision past nanoseconds is kept in the raw text only.
            if digits < 9 {
                nanos = nanos * 10 + d;
                digits += 1;
            }
            cp = self.next_code();
        }
        while digits < 9 {
            nanos *= 10;
            digits += 1;
        }
        self.date_time_data().nanosecond = nanos;
        self.end_time(cp)
    }

    /// Ends a time-bearing literal at `cp`, which is the first character
    /// after the clock fields.
    fn end_time(&mut self, cp: Option<char>) -> Result<State, ParseError> {
        let data = self.date_time_data();
        if data.has_date {
            if cp == Some('-') || cp == Some('+') {
                data.offset_minus = cp == Some('-');
                return Ok(State::TimeOffset);
            }
            if cp == Some('Z') || cp == Some('z') {
                let dt = DateTime {
                    date: Some(data.date()),
                    time: Some(data.time()),
                    offset: Some(TimeOffset::Z),
                };
                self.end_token(TokenKind::OffsetDateTime(dt), At::End);
                return Ok(State::Data);
            }
            let dt = DateTime {
                date: Some(data.date()),
                time: Some(data.time()),
                offset: None,
            };
            self.end_token(TokenKind::LocalDateTime(dt), At::Start);
            return Ok(self.back(State::Data));
        }
        let dt = DateTime {
            date: None,
            time: Some(data.time()),
            offset: None,
        };
        self.end_token(TokenKind::LocalTime(dt), At::Start);
        Ok(self.back(State::Data))
    }

    fn time_offset(&mut self, cp: Option<char>) -> Result<State, ParseError> {
        let hour = self.two_digits(cp)?;
        if self.next_code() != Some(':') {
            return Err(self.report(ErrorCode::UnexpectedChar));
        }
        let cp = self.next_code();
        let minute = self.two_digits(cp)?;
        if !is_valid_time(hour, minute, 0) {
            return Err(self.report(ErrorCode::InvalidTime));
        }
        let data = self.date_time_data();
        let mut minutes = hour as i16 * 60 + minute as i16;
        if data.offset_minus {
            minutes = -minutes;
        }
        let dt = DateTime {
            date: Some(data.date()),
            time: Some(data.time()),
            offset: Some(TimeOffset::Custom { minutes }),
        };
        self.end_token(TokenKind::OffsetDateTime(dt), At::End);
        Ok(State::Data)
    }

    /// Reads a run of digits with TOML's underscore rule: every underscore
    /// must sit between two digits.
    fn parse_digits(
        &mut self,
        mut cp: Option<char>,
        check: fn(char) -> bool,
    ) -> Result<Digits, ParseError> {
        if cp == Some('_') {
            return Err(self.report(ErrorCode::InvalidUnderscore));
        }
        if !matches!(cp, Some(c) if check(c)) {
            return Err(self.report(ErrorCode::UnexpectedChar));
        }
        let mut digits = String::new();
        let mut before = '\0';
        let mut has_underscore = false;
        while let Some(c) = cp {
            if !check(c) && c != '_' {
                break;
            }
            if c == '_' {
                has_underscore = true;
                if before == '_' {
                    return Err(self.report(ErrorCode::InvalidUnderscore));
                }
            } else {
                digits.push(c);
            }
            before = c;
            cp = self.next_code();
        }
        if before == '_' {
            return Err(self.report(ErrorCode::InvalidUnderscore));
        }
        Ok(Digits {
            digits,
            next_cp: cp,
            has_underscore,
        })
    }
}

struct Digits {
    digits: String,
    next_cp: Option<char>,
    has_underscore: bool,
}

fn digits_value(digits: &str) -> u32 {
    digits.chars().fold(0, |acc, c| {
        acc * 10 + c.to_digit(10).unwrap_or(0)
    })
}

/// The normalized text is always a valid float literal by construction, and
/// out-of-range magnitudes round to infinity like any other float overflow.
fn parse_float(text: &str) -> f64 {
    text.parse().unwrap_or(f64::NAN)
}

fn is_whitespace(cp: char) -> bool {
    cp == ' ' || cp == '\t'
}

/// C0 controls and DEL. C1 characters (U+0080..U+009F) are ordinary content.
fn is_control_other_than_tab(cp: char) -> bool {
    (matches!(cp, '\0'..='\u{1f}') && cp != '\t') || cp == '\u{7f}'
}

fn is_valid_date(year: u16, month: u8, day: u8) -> bool {
    if year == 0 || month == 0 || month > 12 || day == 0 {
        return false;
    }
    let leap = year % 4 == 0 && (year % 100 != 0 || year % 400 == 0);
    let max_day = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ => {
            if leap {
                29
            } else {
                28
            }
        }
    };
    day <= max_day
}

fn is_valid_time(hour: u8, minute: u8, second: u8) -> bool {
    hour < 24 && minute < 60 && second <= 60
}
