//! Console input helpers for `SCAN`.

use std::io::BufRead;

use crate::ast::DeclaredType;
use crate::interpreter::value::Value;

/// Read one line from a [`BufRead`] source, stripping the trailing
/// newline (`\n` or `\r\n`).
///
/// Returns `None` at EOF or on an I/O error.
pub fn read_line_from<R: BufRead + ?Sized>(reader: &mut R) -> Option<String> {
    let mut buf = String::new();
    match reader.read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => {
            if buf.ends_with('\n') {
                buf.pop();
                if buf.ends_with('\r') {
                    buf.pop();
                }
            }
            Some(buf)
        }
    }
}

/// Decode one comma-separated `SCAN` field for a variable of `declared` type.
///
/// INT, FLOAT and BOOL fields are trimmed first; BOOL is a case-insensitive
/// `true`/`false`. CHAR takes the first character as typed, STRING keeps the
/// whole field.
pub fn decode_field(declared: DeclaredType, field: &str) -> Option<Value> {
    match declared {
        DeclaredType::Int => field.trim().parse().ok().map(Value::Int),
        DeclaredType::Float => field.trim().parse().ok().map(Value::Float),
        DeclaredType::Bool => {
            let word = field.trim();
            if word.eq_ignore_ascii_case("true") {
                Some(Value::Bool(true))
            } else if word.eq_ignore_ascii_case("false") {
                Some(Value::Bool(false))
            } else {
                None
            }
        }
        DeclaredType::Char => field.chars().next().map(Value::Char),
        DeclaredType::String => Some(Value::Str(field.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Cursor;

    #[test]
    fn read_lines_until_eof() {
        let mut reader = Cursor::new("3,4\r\nhello\nlast");
        assert_eq!(read_line_from(&mut reader).as_deref(), Some("3,4"));
        assert_eq!(read_line_from(&mut reader).as_deref(), Some("hello"));
        assert_eq!(read_line_from(&mut reader).as_deref(), Some("last"));
        assert_eq!(read_line_from(&mut reader), None);
    }

    #[test]
    fn empty_line_is_not_eof() {
        let mut reader = Cursor::new("\n");
        assert_eq!(read_line_from(&mut reader).as_deref(), Some(""));
        assert_eq!(read_line_from(&mut reader), None);
    }

    #[rstest]
    #[case(DeclaredType::Int, " 42 ", Some(Value::Int(42)))]
    #[case(DeclaredType::Int, "-7", Some(Value::Int(-7)))]
    #[case(DeclaredType::Int, "4.5", None)]
    #[case(DeclaredType::Int, "99999999999", None)]
    #[case(DeclaredType::Float, "2.5", Some(Value::Float(2.5)))]
    #[case(DeclaredType::Float, " 3", Some(Value::Float(3.0)))]
    #[case(DeclaredType::Float, "abc", None)]
    #[case(DeclaredType::Bool, "TRUE", Some(Value::Bool(true)))]
    #[case(DeclaredType::Bool, " false", Some(Value::Bool(false)))]
    #[case(DeclaredType::Bool, "yes", None)]
    #[case(DeclaredType::Char, "xyz", Some(Value::Char('x')))]
    #[case(DeclaredType::Char, " x", Some(Value::Char(' ')))]
    #[case(DeclaredType::Char, "", None)]
    #[case(DeclaredType::String, " two words ", Some(Value::Str(" two words ".to_string())))]
    #[case(DeclaredType::String, "", Some(Value::Str(String::new())))]
    fn decode(#[case] declared: DeclaredType, #[case] field: &str, #[case] expected: Option<Value>) {
        assert_eq!(decode_field(declared, field), expected);
    }
}
