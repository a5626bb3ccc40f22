//! Bracket and quote balancing over one file's token stream.
//!
//! Keeps a stack of open delimiters and reports three families of problems:
//! closing brackets with nothing open, closing brackets that don't match
//! the innermost open one, and delimiters still open at end of file. Errors
//! point at the opening line wherever one exists, not at end-of-file.
//!
//! Each file is balanced independently; a malformed file cannot disturb
//! the diagnostics of any other file.

use crate::diagnostic::Diagnostic;
use crate::lexer::{Token, TokenKind};

/// One open delimiter on the stack.
struct Open {
    ch: char,
    line: usize,
}

fn opener_for(close: char) -> char {
    match close {
        '}' => '{',
        ']' => '[',
        _ => '(',
    }
}

/// Check delimiter nesting for one token stream.
///
/// `reached_eof` is false when the lexer truncated the stream (unterminated
/// multiline block); in that case the end-of-stream drain is skipped, since
/// a construct may well have closed inside the unread tail.
pub fn check_balance(path: &str, tokens: &[Token], reached_eof: bool) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    let mut stack: Vec<Open> = Vec::new();

    for tok in tokens {
        match tok.kind {
            TokenKind::LBrace => stack.push(Open { ch: '{', line: tok.line }),
            TokenKind::LBracket => stack.push(Open { ch: '[', line: tok.line }),
            TokenKind::LParen => stack.push(Open { ch: '(', line: tok.line }),
            TokenKind::RBrace | TokenKind::RBracket | TokenKind::RParen => {
                let close = match tok.kind {
                    TokenKind::RBrace => '}',
                    TokenKind::RBracket => ']',
                    _ => ')',
                };
                match stack.pop() {
                    None => {
                        diags.push(Diagnostic::error(
                            path,
                            tok.line,
                            format!("unmatched closing bracket '{close}'"),
                        ));
                    }
                    Some(open) if open.ch != opener_for(close) => {
                        diags.push(Diagnostic::error(
                            path,
                            tok.line,
                            format!(
                                "mismatched bracket '{close}', expected '{}' from line {}",
                                opener_for(close),
                                open.line
                            ),
                        ));
                    }
                    Some(_) => {}
                }
            }
            TokenKind::Str { terminated: false } => {
                // Brace depth decides the wording; inside a definition body
                // the richer message names the enclosing construct.
                let in_body = stack.iter().any(|o| o.ch == '{');
                let message = if in_body {
                    "unbalanced quotes in object definition"
                } else {
                    "unbalanced quotes"
                };
                diags.push(Diagnostic::error(path, tok.line, message));
            }
            TokenKind::UnclosedComment => {
                diags.push(Diagnostic::error(path, tok.line, "unclosed comment"));
            }
            _ => {}
        }
    }

    if reached_eof {
        for open in stack {
            diags.push(Diagnostic::error(
                path,
                open.line,
                format!("unclosed bracket '{}'", open.ch),
            ));
        }
    }

    diags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn balance(source: &str) -> Vec<Diagnostic> {
        let lexed = tokenize(source);
        check_balance("test.conf", &lexed.tokens, lexed.reached_eof())
    }

    #[test]
    fn balanced_input_is_clean() {
        assert!(balance("object Host \"h\" {\n  a = [1, 2]\n}\n").is_empty());
    }

    #[test]
    fn unclosed_brace_points_at_opening_line() {
        let diags = balance("a = 1\nobject Host \"h\" {\n  b = 2\n");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].line, 2);
        assert_eq!(diags[0].message, "unclosed bracket '{'");
    }

    #[test]
    fn one_diagnostic_per_leftover_open() {
        let diags = balance("{\n{\n[\n");
        assert_eq!(diags.len(), 3);
        assert_eq!(
            diags.iter().map(|d| d.line).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn unmatched_close_at_its_own_line() {
        let diags = balance("a = 1\n}\n");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].line, 2);
        assert_eq!(diags[0].message, "unmatched closing bracket '}'");
    }

    #[test]
    fn mismatched_close_names_the_expected_opener() {
        let diags = balance("a = [1, 2)\n]\n");
        assert_eq!(diags[0].message, "mismatched bracket ')', expected '(' from line 1");
    }

    #[test]
    fn unterminated_quote_at_top_level() {
        let diags = balance("include \"oops\n");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "unbalanced quotes");
        assert_eq!(diags[0].line, 1);
    }

    #[test]
    fn unterminated_quote_inside_body_mentions_object_definition() {
        let diags = balance("object Host \"h\" {\n  address = \"1.2.3.4\n}\n");
        assert!(diags.iter().any(|d| d.message == "unbalanced quotes in object definition"
            && d.line == 2));
    }

    #[test]
    fn unclosed_comment_reported_once() {
        let diags = balance("a = 1\n/* drifting off\n");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "unclosed comment");
        assert_eq!(diags[0].line, 2);
    }

    #[test]
    fn truncated_stream_skips_the_eof_drain() {
        // the unterminated multiline block swallows the closing brace, but
        // the opening brace must not be reported
        let lexed = tokenize("object Host \"h\" {\n  notes = {{{\n");
        assert!(lexed.error.is_some());
        let diags = check_balance("test.conf", &lexed.tokens, lexed.reached_eof());
        assert!(diags.is_empty());
    }
}
