use code_lang::parser::Parser;
use code_lang::scanner;

fn parse_errors(source: &str) -> Vec<(usize, String)> {
    let tokens = scanner::scan(source).expect("scan should succeed");
    Parser::new(tokens)
        .parse()
        .unwrap_err()
        .into_iter()
        .map(|e| (e.line(), e.message().to_string()))
        .collect()
}

#[test]
fn missing_end_code_reports_single_error() {
    let source = include_str!("../fixtures/error_missing_end_code.code");
    let errors = parse_errors(source);
    assert_eq!(
        errors.len(),
        1,
        "expected 1 error but got {}: {errors:?}",
        errors.len()
    );
    assert!(
        errors[0].1.contains("'END CODE'"),
        "error should name the missing delimiter: {}",
        errors[0].1
    );
}

#[test]
fn each_malformed_statement_reports_one_error() {
    let source = include_str!("../fixtures/error_recovery.code");
    let errors = parse_errors(source);
    let lines: Vec<usize> = errors.iter().map(|(line, _)| *line).collect();
    assert_eq!(lines, vec![2, 3, 5], "{errors:?}");
    assert!(errors[0].1.starts_with("type mismatch"), "{}", errors[0].1);
    assert!(errors[1].1.contains("':' after 'DISPLAY'"), "{}", errors[1].1);
    assert!(errors[2].1.contains("':' after 'SCAN'"), "{}", errors[2].1);
}

#[test]
fn program_must_start_with_begin_code() {
    let errors = parse_errors("INT x = 1\nEND CODE\n");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].0, 1);
    assert!(errors[0].1.contains("'BEGIN CODE'"), "{}", errors[0].1);
}

#[test]
fn unclosed_while_block_reports_missing_end_while() {
    let errors = parse_errors("BEGIN CODE\nWHILE (TRUE) BEGIN WHILE\nDISPLAY: 1\nEND CODE\n");
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(errors[0].1.contains("'END WHILE'"), "{}", errors[0].1);
}

#[test]
fn scan_errors_are_collected_before_parsing() {
    let errors = scanner::scan("BEGIN CODE\nDISPLAY: 1 @ 2\nDISPLAY: \"open\nEND CODE\n")
        .unwrap_err();
    let lines: Vec<usize> = errors.iter().map(|e| e.line()).collect();
    assert_eq!(lines, vec![2, 3]);
}
