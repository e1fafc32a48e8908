use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_render_message_only() {
    let diagnostic = Diagnostic::error(ErrorCode::E2001).with_message("variable x not found");
    assert_eq!(diagnostic.to_string(), "error[E2001]: variable x not found");
    assert!(diagnostic.is_error());
}

#[test]
fn test_render_with_line_and_notes() {
    let diagnostic = Diagnostic::error(ErrorCode::E6004)
        .with_message("var z is immutable")
        .at(Line::new(3))
        .with_note("stack backtrace:\n  0: main-0");
    assert_eq!(
        diagnostic.to_string(),
        "error[E6004]: var z is immutable\n  --> line 3\n  = note: stack backtrace:\n  0: main-0"
    );
}

#[test]
fn test_synthetic_line_is_dropped() {
    let diagnostic = Diagnostic::warning(ErrorCode::E6010).at(Line::SYNTHETIC);
    assert_eq!(diagnostic.line, None);
    assert!(!diagnostic.is_error());
}

#[test]
fn test_code_phases() {
    assert!(ErrorCode::E2005.is_compile_error());
    assert!(!ErrorCode::E2005.is_runtime_error());
    assert!(ErrorCode::E6001.is_runtime_error());
    assert!(!ErrorCode::E9001.is_compile_error());
}
