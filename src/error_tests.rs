use super::*;

#[test]
fn codes_are_stable_kebab_case() {
    assert_eq!(ErrorCode::UnterminatedString.as_str(), "unterminated-string");
    assert_eq!(ErrorCode::DupeKeys.as_str(), "dupe-keys");
    assert_eq!(ErrorCode::MissingEqualsSign.as_str(), "missing-equals-sign");
    assert_eq!(
        ErrorCode::InvalidTrailingCommaInInlineTable.as_str(),
        "invalid-trailing-comma-in-inline-table"
    );
    assert_eq!(
        ErrorCode::InvalidLeadingZero.as_str(),
        "invalid-leading-zero"
    );
}

#[test]
fn each_code_has_a_fixed_message() {
    assert_eq!(
        ErrorCode::DupeKeys.message(),
        "Defining a key multiple times is invalid"
    );
    assert_eq!(ErrorCode::MissingKey.message(), "Empty bare keys are not allowed");
    assert_eq!(
        ErrorCode::InvalidLeadingZero.message(),
        "Leading zeros are not allowed"
    );
}

#[test]
fn display_includes_position() {
    let err = ParseError::new(ErrorCode::InvalidLeadingZero, 7, 3, 8);
    assert_eq!(err.to_string(), "Leading zeros are not allowed (3:8)");
    assert_eq!(err.message(), "Leading zeros are not allowed");
    assert_eq!(err.index, 7);
}

#[test]
fn error_code_displays_as_identifier() {
    assert_eq!(ErrorCode::MissingComma.to_string(), "missing-comma");
}

#[test]
fn is_a_std_error() {
    let err = ParseError::new(ErrorCode::MissingValue, 0, 1, 0);
    let dyn_err: &dyn std::error::Error = &err;
    assert!(dyn_err.to_string().contains("Unspecified values"));
}
