use super::InputEdit;

#[test]
fn constructors() {
    assert_eq!(InputEdit::insert(2, 1), InputEdit::new(2, 2, 3));
    assert_eq!(InputEdit::delete(2..5), InputEdit::new(2, 5, 2));
    assert_eq!(InputEdit::replace(2..5, 1), InputEdit::new(2, 5, 3));
    assert!(InputEdit::insert(4, 0).is_noop());
    assert!(InputEdit::insert(4, 2).is_insertion());
    assert!(!InputEdit::delete(0..1).is_insertion());
}

#[test]
fn diff_finds_minimal_span() {
    assert_eq!(InputEdit::diff(b"aabb", b"aabbb"), InputEdit::new(4, 4, 5));
    assert_eq!(InputEdit::diff(b"abc", b"axc"), InputEdit::new(1, 2, 2));
    assert_eq!(InputEdit::diff(b"abc", b"abc"), InputEdit::new(3, 3, 3));
    assert_eq!(InputEdit::diff(b"", b"xy"), InputEdit::new(0, 0, 2));
    assert_eq!(InputEdit::diff(b"xy", b""), InputEdit::new(0, 2, 0));
}

#[test]
fn map_offset() {
    let edit = InputEdit::replace(2..5, 1);
    assert_eq!(edit.map_offset(1), 1);
    assert_eq!(edit.map_offset(2), 2);
    assert_eq!(edit.map_offset(3), 3);
    assert_eq!(edit.map_offset(5), 3);
    assert_eq!(edit.map_offset(9), 7);
}
