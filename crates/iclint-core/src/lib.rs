//! iclint-core: the scanning and validation engine behind iclint.
//!
//! This crate provides:
//!
//! - **Lexer**: tokenizes the Icinga 2 configuration DSL using logos
//! - **Balancer**: bracket/quote nesting checks over the token stream
//! - **Validator**: object/apply structural validation with error recovery
//! - **Registry**: cross-file duplicate detection for unique object names
//!
//! The single entry point is [`lint`]: feed it the discovered files, get
//! back one ordered list of diagnostics. Directory walking and report
//! rendering live in the CLI crate; the core is pure with respect to its
//! inputs and holds no state between calls.

pub mod balance;
pub mod diagnostic;
pub mod lexer;
pub mod registry;
pub mod validator;

pub use diagnostic::{Diagnostic, Severity};
pub use lexer::{LexError, Lexed, Token, TokenKind};
pub use registry::{ObjectRecord, Registry};

/// One configuration file to lint. The caller owns path and text; `lint`
/// only borrows them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub path: String,
    pub text: String,
}

impl ConfigFile {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

/// Lint a set of configuration files.
///
/// Files are processed in sorted-path order regardless of the order they
/// arrive in, so diagnostics (duplicate-name reports included) are
/// byte-identical across runs on the same input set. Within one file,
/// diagnostics are ordered by line.
///
/// Nothing here fails: every problem becomes a [`Diagnostic`]. A file
/// whose tokenization is truncated by an unterminated multiline block
/// still contributes the diagnostics found before the failure point, and
/// never affects any other file.
pub fn lint(files: &[ConfigFile]) -> Vec<Diagnostic> {
    let mut ordered: Vec<&ConfigFile> = files.iter().collect();
    ordered.sort_by(|a, b| a.path.cmp(&b.path));

    let mut registry = Registry::new();
    let mut all = Vec::new();

    for file in ordered {
        let _span = tracing::debug_span!("lint_file", path = %file.path).entered();
        let lexed = lexer::tokenize(&file.text);

        let mut diags = balance::check_balance(&file.path, &lexed.tokens, lexed.reached_eof());

        let (structural, records) = validator::validate(&file.path, &lexed.tokens);
        diags.extend(structural);

        for record in &records {
            if let Some(dup) = registry.record(record) {
                diags.push(dup);
            }
        }

        if let Some(err) = &lexed.error {
            diags.push(Diagnostic::error(
                &file.path,
                err.line,
                "unbalanced quotes in multiline structure",
            ));
        }

        diags.sort_by_key(|d| d.line);
        tracing::debug!(count = diags.len(), "file linted");
        all.extend(diags);
    }

    all
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_tree_yields_no_diagnostics() {
        let files = [ConfigFile::new(
            "hosts.conf",
            "object Host \"h\" { address = \"1.2.3.4\" }\n",
        )];
        assert!(lint(&files).is_empty());
    }

    #[test]
    fn files_are_processed_in_sorted_path_order() {
        let a = ConfigFile::new("a.conf", "object TimePeriod \"9to5\" {}\n");
        let b = ConfigFile::new("b.conf", "object TimePeriod \"9to5\" {}\n");

        // the duplicate must land on b.conf no matter the input order
        for files in [vec![a.clone(), b.clone()], vec![b.clone(), a.clone()]] {
            let diags = lint(&files);
            assert_eq!(diags.len(), 1);
            assert_eq!(diags[0].file, "b.conf");
            assert!(diags[0].message.contains("previously defined at a.conf:1"));
        }
    }

    #[test]
    fn lex_failure_in_one_file_does_not_disturb_others() {
        let files = [
            ConfigFile::new("bad.conf", "object Host \"h\" {\n  notes = {{{\n"),
            ConfigFile::new("good.conf", "object Ost \"x\" {}\n"),
        ];
        let diags = lint(&files);
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].file, "bad.conf");
        assert_eq!(diags[0].line, 2);
        assert_eq!(diags[0].message, "unbalanced quotes in multiline structure");
        assert_eq!(diags[1].file, "good.conf");
        assert_eq!(diags[1].message, "'Ost' is not a valid object type.");
    }

    #[test]
    fn per_file_diagnostics_are_line_ordered() {
        let files = [ConfigFile::new(
            "m.conf",
            concat!(
                "object Ost \"a\" {}\n",
                "object Host \"b\" {\n",
                "  address \"1.2.3.4\"\n",
                "}\n",
                "}\n",
            ),
        )];
        let diags = lint(&files);
        let lines: Vec<usize> = diags.iter().map(|d| d.line).collect();
        let mut sorted = lines.clone();
        sorted.sort_unstable();
        assert_eq!(lines, sorted);
    }
}
