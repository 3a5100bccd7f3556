use super::*;

#[test]
fn span_basics() {
    let span = Span::new(3, 8);
    assert_eq!(span.start, 3);
    assert_eq!(span.end, 8);
    assert!(!span.is_empty());
    assert!(Span::new(5, 5).is_empty());
    assert!(Span::default().is_empty());
}

#[test]
fn span_contains() {
    let outer = Span::new(2, 10);
    assert!(outer.contains(Span::new(2, 10)));
    assert!(outer.contains(Span::new(4, 7)));
    assert!(outer.contains(Span::new(5, 5)));
    assert!(!outer.contains(Span::new(1, 3)));
    assert!(!outer.contains(Span::new(8, 11)));
}

#[test]
fn span_range_conversions() {
    let span: Span = (2..9).into();
    assert_eq!(span, Span::new(2, 9));
    let range: std::ops::Range<usize> = span.into();
    assert_eq!(range, 2..9);
}

#[test]
fn line_col_ordering() {
    assert!(LineCol::new(1, 5) < LineCol::new(2, 0));
    assert!(LineCol::new(3, 1) < LineCol::new(3, 2));
    assert_eq!(LineCol::new(4, 4), LineCol::new(4, 4));
    assert_eq!(LineCol::default(), LineCol::new(1, 0));
}

#[test]
fn loc_default_is_document_start() {
    let loc = Loc::default();
    assert_eq!(loc.start, LineCol::new(1, 0));
    assert_eq!(loc.end, LineCol::new(1, 0));
}
