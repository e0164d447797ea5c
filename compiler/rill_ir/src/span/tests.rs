use super::*;
use pretty_assertions::assert_eq;

#[test]
fn merge_covers_both() {
    let a = Span::new(4, 8);
    let b = Span::new(2, 6);
    assert_eq!(a.merge(b), Span::new(2, 8));
}

#[test]
fn line_col_first_line() {
    let span = Span::new(3, 4);
    assert_eq!(span.line_col("abc def"), (1, 3));
}

#[test]
fn line_col_after_newlines() {
    let src = "x <- 1\ny <- 2\nz +";
    let offset = src.find('z').unwrap_or_default();
    let span = Span::from_range(offset..offset + 1);
    assert_eq!(span.line_col(src), (3, 0));
}

#[test]
fn dummy_is_empty() {
    assert!(Span::DUMMY.is_empty());
    assert_eq!(Span::new(1, 5).len(), 4);
}
