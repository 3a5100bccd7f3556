use super::*;

fn lex(
    text: &str,
    version: TomlVersion,
    values: bool,
) -> Result<Vec<TokenOrComment<'_>>, ParseError> {
    let mut tokenizer = Tokenizer::new(text, version);
    tokenizer.values_enabled = values;
    let mut out = Vec::new();
    while let Some(item) = tokenizer.next()? {
        out.push(item);
    }
    Ok(out)
}

fn tokens(text: &str, version: TomlVersion, values: bool) -> Vec<Token<'_>> {
    lex(text, version, values)
        .unwrap()
        .into_iter()
        .map(|item| match item {
            TokenOrComment::Token(token) => token,
            TokenOrComment::Comment(comment) => panic!("unexpected comment: {comment:?}"),
        })
        .collect()
}

fn value_token(text: &str) -> Token<'_> {
    let mut all = tokens(text, TomlVersion::V1_1, true);
    assert_eq!(all.len(), 1, "expected one token in {text:?}, got {all:?}");
    all.remove(0)
}

fn lex_err(text: &str, version: TomlVersion, values: bool) -> ParseError {
    lex(text, version, values).unwrap_err()
}

fn integer(text: &str) -> IntegerRepr {
    match value_token(text).kind {
        TokenKind::Integer(repr) => repr,
        kind => panic!("expected an integer, got {kind:?}"),
    }
}

fn float(text: &str) -> f64 {
    match value_token(text).kind {
        TokenKind::Float(value) => value,
        kind => panic!("expected a float, got {kind:?}"),
    }
}

#[test]
fn bare_keys() {
    let all = tokens("abc def", TomlVersion::V1_1, false);
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].kind, TokenKind::Bare);
    assert_eq!(all[0].value, "abc");
    assert_eq!(all[0].range, Span::new(0, 3));
    assert_eq!(all[1].value, "def");
    assert_eq!(all[1].range, Span::new(4, 7));
}

#[test]
fn punctuators() {
    let all = tokens("[ ] = . , { }", TomlVersion::V1_1, false);
    let chars: Vec<char> = all
        .iter()
        .map(|t| match t.kind {
            TokenKind::Punctuator(c) => c,
            _ => panic!("expected a punctuator"),
        })
        .collect();
    assert_eq!(chars, vec!['[', ']', '=', '.', ',', '{', '}']);
}

#[test]
fn unicode_bare_key_is_1_1_only() {
    let all = tokens("café", TomlVersion::V1_1, false);
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].value, "café");
    assert_eq!(all[0].range, Span::new(0, 5));

    let err = lex_err("café", TomlVersion::V1_0, false);
    assert_eq!(err.code, ErrorCode::UnexpectedChar);
    assert_eq!(err.index, 3);
}

#[test]
fn basic_strings() {
    let token = value_token(r#""hi""#);
    assert_eq!(token.decoded_str(), Some("hi"));
    assert_eq!(token.range, Span::new(0, 4));
    assert_eq!(token.value, r#""hi""#);

    assert_eq!(value_token(r#""""#).decoded_str(), Some(""));
    assert_eq!(value_token(r#""""#).range, Span::new(0, 2));
    assert_eq!(value_token(r#""a\tb""#).decoded_str(), Some("a\tb"));
    assert_eq!(value_token(r#""say \"hi\"""#).decoded_str(), Some("say \"hi\""));
    assert_eq!(value_token("\"\\u0041\"").decoded_str(), Some("A"));
    assert_eq!(value_token(r#""\U0001F600""#).decoded_str(), Some("😀"));
}

#[test]
fn unterminated_basic_string() {
    assert_eq!(
        lex_err("\"abc", TomlVersion::V1_1, true).code,
        ErrorCode::UnterminatedString
    );
    assert_eq!(
        lex_err("\"abc\ndef\"", TomlVersion::V1_1, true).code,
        ErrorCode::UnterminatedString
    );
}

#[test]
fn extended_escapes_are_1_1_only() {
    assert_eq!(value_token(r#""\e""#).decoded_str(), Some("\u{1b}"));
    assert_eq!(value_token(r#""\x41""#).decoded_str(), Some("A"));
    assert_eq!(
        lex_err(r#""\e""#, TomlVersion::V1_0, true).code,
        ErrorCode::InvalidCharInEscapeSequence
    );
    assert_eq!(
        lex_err(r#""\x41""#, TomlVersion::V1_0, true).code,
        ErrorCode::InvalidCharInEscapeSequence
    );
}

#[test]
fn surrogate_escape_is_rejected() {
    assert_eq!(
        lex_err(r#""\uD800""#, TomlVersion::V1_1, true).code,
        ErrorCode::InvalidCodePoint
    );
}

#[test]
fn literal_strings_keep_backslashes() {
    let token = value_token(r"'a\tb'");
    assert_eq!(token.decoded_str(), Some(r"a\tb"));
    assert_eq!(value_token("''").decoded_str(), Some(""));
}

#[test]
fn multiline_basic_strings() {
    let token = value_token("\"\"\"\nabc\n\"\"\"");
    assert_eq!(token.kind.type_name(), "MultiLineBasicString");
    assert_eq!(token.decoded_str(), Some("abc\n"));
    assert_eq!(token.range, Span::new(0, 11));

    // Only the newline right after the opening delimiter is trimmed.
    assert_eq!(value_token("\"\"\"a\"\"\"").decoded_str(), Some("a"));
    assert_eq!(value_token("\"\"\"\"\"\"").decoded_str(), Some(""));
}

#[test]
fn multiline_quote_runs() {
    // Four and five closing quotes embed the extras in the content.
    assert_eq!(value_token("\"\"\"a\"\"\"\"").decoded_str(), Some("a\""));
    assert_eq!(value_token("\"\"\"a\"\"\"\"\"").decoded_str(), Some("a\"\""));
    assert_eq!(
        lex_err("\"\"\"a\"\"\"\"\"\"", TomlVersion::V1_1, true).code,
        ErrorCode::InvalidThreeQuotes
    );
    // Lone quotes inside are plain content.
    assert_eq!(value_token("\"\"\"a\"b\"\"\"").decoded_str(), Some("a\"b"));
}

#[test]
fn multiline_line_continuation() {
    assert_eq!(
        value_token("\"\"\"a\\\n   b\"\"\"").decoded_str(),
        Some("ab")
    );
    // Backslash-space is a continuation only when the rest of the line is
    // whitespace.
    assert_eq!(
        value_token("\"\"\"a\\ \t\nb\"\"\"").decoded_str(),
        Some("ab")
    );
    assert_eq!(
        lex_err("\"\"\"a\\ x\"\"\"", TomlVersion::V1_1, true).code,
        ErrorCode::InvalidCharInEscapeSequence
    );
}

#[test]
fn multiline_literal_strings() {
    assert_eq!(value_token("'''\nlit'''").decoded_str(), Some("lit"));
    assert_eq!(value_token("'''a''b'''").decoded_str(), Some("a''b"));
    assert_eq!(
        lex_err("'''abc", TomlVersion::V1_1, true).code,
        ErrorCode::UnterminatedString
    );
}

#[test]
fn decimal_integers() {
    let repr = integer("42");
    assert_eq!(repr.radix, 10);
    assert_eq!(&*repr.digits, "42");
    assert_eq!(repr.value, Some(42));

    assert_eq!(&*integer("1_000").digits, "1000");
    assert_eq!(integer("1_000").value, Some(1000));
    assert_eq!(integer("-17").value, Some(-17));
    assert_eq!(&*integer("-17").digits, "-17");
    assert_eq!(integer("+99").value, Some(99));
    assert_eq!(&*integer("+99").digits, "99");
    assert_eq!(integer("0").value, Some(0));
    assert_eq!(&*integer("-0").digits, "0");
}

#[test]
fn radix_integers() {
    let hex = integer("0x1A");
    assert_eq!(hex.radix, 16);
    assert_eq!(&*hex.digits, "1A");
    assert_eq!(hex.value, Some(26));

    assert_eq!(integer("0o777").value, Some(511));
    assert_eq!(integer("0b1011").value, Some(11));
    assert_eq!(&*integer("0xdead_beef").digits, "deadbeef");
}

#[test]
fn overflowing_integer_keeps_its_text() {
    let repr = integer("9223372036854775808");
    assert_eq!(repr.value, None);
    assert_eq!(&*repr.digits, "9223372036854775808");
    assert_eq!(
        integer("9223372036854775807").value,
        Some(i64::MAX)
    );
}

#[test]
fn leading_zero_is_reported_at_the_second_digit() {
    let err = lex_err("0123", TomlVersion::V1_1, true);
    assert_eq!(err.code, ErrorCode::InvalidLeadingZero);
    assert_eq!(err.index, 1);
    assert_eq!(lex_err("0123", TomlVersion::V1_0, true).code, ErrorCode::InvalidLeadingZero);
}

#[test]
fn underscore_rules() {
    assert_eq!(
        lex_err("1__2", TomlVersion::V1_1, true).code,
        ErrorCode::InvalidUnderscore
    );
    assert_eq!(
        lex_err("1_", TomlVersion::V1_1, true).code,
        ErrorCode::InvalidUnderscore
    );
    assert_eq!(
        lex_err("0x_1", TomlVersion::V1_1, true).code,
        ErrorCode::InvalidUnderscore
    );
}

#[test]
fn floats() {
    assert_eq!(float("3.14"), 3.14);
    assert_eq!(float("-0.01"), -0.01);
    assert_eq!(float("1e2"), 100.0);
    assert_eq!(float("1E2"), 100.0);
    assert_eq!(float("1e-2"), 0.01);
    assert_eq!(float("2.5e+2"), 250.0);
    assert_eq!(float("5_0.0"), 50.0);
    assert!(float("-0.0").is_sign_negative());
}

#[test]
fn float_specials() {
    assert_eq!(float("inf"), f64::INFINITY);
    assert_eq!(float("+inf"), f64::INFINITY);
    assert_eq!(float("-inf"), f64::NEG_INFINITY);
    assert!(float("nan").is_nan());
    assert!(float("-nan").is_nan());
    assert_eq!(
        lex_err("in", TomlVersion::V1_1, true).code,
        ErrorCode::UnexpectedChar
    );
}

#[test]
fn booleans() {
    let all = tokens("true false", TomlVersion::V1_1, true);
    assert_eq!(all[0].kind, TokenKind::Boolean(true));
    assert_eq!(all[0].range, Span::new(0, 4));
    assert_eq!(all[1].kind, TokenKind::Boolean(false));
    assert_eq!(all[1].range, Span::new(5, 10));
    assert_eq!(
        lex_err("tru", TomlVersion::V1_1, true).code,
        ErrorCode::UnexpectedChar
    );
}

#[test]
fn local_dates() {
    let token = value_token("1979-05-27");
    let TokenKind::LocalDate(dt) = token.kind else {
        panic!("expected a local date");
    };
    assert_eq!(token.range, Span::new(0, 10));
    assert_eq!(
        dt.date,
        Some(Date {
            year: 1979,
            month: 5,
            day: 27
        })
    );
    assert_eq!(dt.time, None);

    // Years with leading zeros go through the zero-lookahead path.
    let TokenKind::LocalDate(dt) = value_token("0001-01-01").kind else {
        panic!("expected a local date");
    };
    assert_eq!(dt.date.unwrap().year, 1);
}

#[test]
fn local_times() {
    let TokenKind::LocalTime(dt) = value_token("07:32:00").kind else {
        panic!("expected a local time");
    };
    let time = dt.time.unwrap();
    assert_eq!((time.hour, time.minute, time.second), (7, 32, 0));
    assert!(time.has_seconds);
    assert_eq!(time.nanosecond, 0);
}

#[test]
fn fractional_seconds() {
    let TokenKind::LocalTime(dt) = value_token("00:00:00.9").kind else {
        panic!("expected a local time");
    };
    assert_eq!(dt.time.unwrap().nanosecond, 900_000_000);

    let TokenKind::LocalTime(dt) = value_token("00:00:00.999999999").kind else {
        panic!("expected a local time");
    };
    assert_eq!(dt.time.unwrap().nanosecond, 999_999_999);

    // Digits past nanosecond precision survive only in the raw text.
    let token = value_token("00:00:00.1234567891");
    assert_eq!(token.value, "00:00:00.1234567891");
    let TokenKind::LocalTime(dt) = token.kind else {
        panic!("expected a local time");
    };
    assert_eq!(dt.time.unwrap().nanosecond, 123_456_789);
}

#[test]
fn offset_date_times() {
    let token = value_token("1979-05-27T07:32:00Z");
    assert_eq!(token.range, Span::new(0, 20));
    let TokenKind::OffsetDateTime(dt) = token.kind else {
        panic!("expected an offset date-time");
    };
    assert_eq!(dt.offset, Some(TimeOffset::Z));

    let TokenKind::OffsetDateTime(dt) = value_token("1979-05-27T00:32:00-07:00").kind else {
        panic!("expected an offset date-time");
    };
    assert_eq!(dt.offset, Some(TimeOffset::Custom { minutes: -420 }));

    let TokenKind::OffsetDateTime(dt) = value_token("1979-05-27T00:32:00+01:30").kind else {
        panic!("expected an offset date-time");
    };
    assert_eq!(dt.offset, Some(TimeOffset::Custom { minutes: 90 }));

    // Lowercase separators are accepted.
    let TokenKind::OffsetDateTime(dt) = value_token("1979-05-27t07:32:00z").kind else {
        panic!("expected an offset date-time");
    };
    assert_eq!(dt.offset, Some(TimeOffset::Z));
}

#[test]
fn space_separated_date_time() {
    let token = value_token("1979-05-27 07:32:00");
    assert_eq!(token.kind.type_name(), "LocalDateTime");
    assert_eq!(token.range, Span::new(0, 19));

    // The space joins date and time only when two digits follow.
    let all = tokens("1979-05-27 true", TomlVersion::V1_1, true);
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].kind.type_name(), "LocalDate");
    assert_eq!(all[1].kind, TokenKind::Boolean(true));
}

#[test]
fn leap_second_folds_to_59() {
    let TokenKind::LocalTime(dt) = value_token("23:59:60").kind else {
        panic!("expected a local time");
    };
    assert_eq!(dt.time.unwrap().second, 59);
    assert_eq!(
        lex_err("23:59:61", TomlVersion::V1_1, true).code,
        ErrorCode::InvalidTime
    );
}

#[test]
fn calendar_validation() {
    assert_eq!(
        lex_err("2021-02-29", TomlVersion::V1_1, true).code,
        ErrorCode::InvalidDate
    );
    assert_eq!(
        lex_err("2100-02-29", TomlVersion::V1_1, true).code,
        ErrorCode::InvalidDate
    );
    assert_eq!(value_token("2020-02-29").kind.type_name(), "LocalDate");
    assert_eq!(value_token("2000-02-29").kind.type_name(), "LocalDate");
    assert_eq!(
        lex_err("24:00:00", TomlVersion::V1_1, true).code,
        ErrorCode::InvalidTime
    );
}

#[test]
fn omitted_seconds_are_1_1_only() {
    let TokenKind::LocalTime(dt) = value_token("07:32").kind else {
        panic!("expected a local time");
    };
    let time = dt.time.unwrap();
    assert!(!time.has_seconds);
    assert_eq!(time.second, 0);
    assert!(lex("07:32", TomlVersion::V1_0, true).is_err());

    let token = value_token("1979-05-27T07:32");
    assert_eq!(token.kind.type_name(), "LocalDateTime");
    assert!(lex("1979-05-27T07:32", TomlVersion::V1_0, true).is_err());
}

#[test]
fn date_followed_by_punctuation() {
    let all = tokens("2021-01-02,", TomlVersion::V1_1, true);
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].kind.type_name(), "LocalDate");
    assert_eq!(all[0].range, Span::new(0, 10));
    assert!(all[1].is_punct(','));
}

#[test]
fn comments() {
    let items = lex("# hi", TomlVersion::V1_1, false).unwrap();
    assert_eq!(items.len(), 1);
    let TokenOrComment::Comment(comment) = &items[0] else {
        panic!("expected a comment");
    };
    assert_eq!(comment.value, " hi");
    assert_eq!(comment.range, Span::new(0, 4));
}

#[test]
fn control_chars_in_comments_are_1_1_only() {
    assert_eq!(
        lex_err("# a\u{7}", TomlVersion::V1_0, false).code,
        ErrorCode::InvalidControlCharacter
    );
    let items = lex("# a\u{7}", TomlVersion::V1_1, false).unwrap();
    assert_eq!(items.len(), 1);
}

#[test]
fn digits_are_bare_keys_when_values_are_disabled() {
    let all = tokens("123", TomlVersion::V1_1, false);
    assert_eq!(all[0].kind, TokenKind::Bare);
    assert_eq!(all[0].value, "123");
}

#[test]
fn c1_characters_are_ordinary_content() {
    // Only C0 controls and DEL are restricted; U+0085 (NEL) and friends
    // pass through strings and comments under both versions.
    assert_eq!(
        value_token("\"x\u{85}y\"").decoded_str(),
        Some("x\u{85}y")
    );
    assert_eq!(value_token("'x\u{85}y'").decoded_str(), Some("x\u{85}y"));
    for version in [TomlVersion::V1_0, TomlVersion::V1_1] {
        let items = lex("# a\u{85}b", version, false).unwrap();
        assert_eq!(items.len(), 1);
    }
}

#[test]
fn control_chars_in_strings_are_rejected() {
    assert_eq!(
        lex_err("\"a\u{1}b\"", TomlVersion::V1_1, true).code,
        ErrorCode::InvalidControlCharacter
    );
    assert_eq!(
        lex_err("'a\u{1}b'", TomlVersion::V1_1, true).code,
        ErrorCode::InvalidControlCharacter
    );
}
