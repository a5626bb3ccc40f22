//! Structural validation of object and apply definitions.
//!
//! Walks one file's token stream looking for the DSL's top-level forms:
//!
//! ```text
//! object TYPE "name" { ... }
//! template TYPE "name" { ... }
//! apply TYPE ["name"] [for (...)] [to Host|Service] { ... }
//! ```
//!
//! and validates bodies against the attribute grammar (`import "x"`,
//! dotted/indexed assignments, `assign where` / `ignore where` filters,
//! nested dictionary blocks). Structural errors are local: the walker
//! reports the offending token and resynchronizes at the next statement
//! boundary at the current nesting depth, so one bad line never hides the
//! rest of a file.
//!
//! Named `object` definitions with a valid type keyword are reported as
//! [`ObjectRecord`]s for the cross-file registry.

use crate::diagnostic::Diagnostic;
use crate::lexer::{Token, TokenKind};
use crate::registry::ObjectRecord;

/// Object-type keywords the daemon accepts, sorted for binary search.
const VALID_OBJECT_TYPES: &[&str] = &[
    "ApiListener",
    "ApiUser",
    "CheckCommand",
    "CheckerComponent",
    "Comment",
    "CompatLogger",
    "Dependency",
    "Downtime",
    "ElasticsearchWriter",
    "Endpoint",
    "EventCommand",
    "ExternalCommandListener",
    "FileLogger",
    "GelfWriter",
    "GraphiteWriter",
    "Host",
    "HostGroup",
    "IcingaApplication",
    "IcingaDB",
    "IdoMySqlConnection",
    "IdoPgsqlConnection",
    "Influxdb2Writer",
    "InfluxdbWriter",
    "JournaldLogger",
    "LiveStatusListener",
    "Notification",
    "NotificationCommand",
    "NotificationComponent",
    "OpenTsdbWriter",
    "PerfdataWriter",
    "ScheduledDowntime",
    "Service",
    "ServiceGroup",
    "SyslogLogger",
    "TimePeriod",
    "User",
    "UserGroup",
    "WindowseventlogLogger",
    "Zone",
];

/// Whether a type keyword is known to the daemon.
pub fn is_valid_object_type(name: &str) -> bool {
    VALID_OBJECT_TYPES.binary_search(&name).is_ok()
}

/// Apply types that must name a parent via `to Host` or `to Service`.
const TARGET_REQUIRED: &[&str] = &["Dependency", "Notification"];

/// The parent type an apply rule attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Host,
    Service,
}

/// A recognized apply-rule header, tracked while its body is walked.
#[derive(Debug)]
struct ApplyRule {
    object_type: String,
    name: Option<String>,
    has_for_clause: bool,
    target_clause: Option<Target>,
}

/// Validate one file's token stream.
///
/// Returns the structural diagnostics plus the named-object records to
/// feed the cross-file registry. Never fails; malformed input only ever
/// produces more diagnostics.
pub fn validate(path: &str, tokens: &[Token]) -> (Vec<Diagnostic>, Vec<ObjectRecord>) {
    let mut walker = Walker {
        path,
        tokens,
        pos: 0,
        diags: Vec::new(),
        records: Vec::new(),
    };

    walker.check_trailing_semicolons();
    walker.walk();

    (walker.diags, walker.records)
}

struct Walker<'a> {
    path: &'a str,
    tokens: &'a [Token],
    pos: usize,
    diags: Vec<Diagnostic>,
    records: Vec<ObjectRecord>,
}

impl<'a> Walker<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek2(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos + 1)
    }

    fn skip_newlines(&mut self) {
        while matches!(self.peek().map(|t| t.kind), Some(TokenKind::Newline)) {
            self.pos += 1;
        }
    }

    fn error(&mut self, line: usize, message: impl Into<String>) {
        self.diags.push(Diagnostic::error(self.path, line, message));
    }

    fn invalid_attribute(&mut self, line: usize, text: &str) {
        self.error(line, format!("invalid attribute syntax: '{text}'"));
    }

    /// The token a malformed statement should be blamed on: the next token
    /// on the same statement, or `fallback` when the statement just ends.
    fn statement_offender(&self, fallback: &Token) -> (usize, String) {
        match self.peek() {
            Some(t) if !matches!(t.kind, TokenKind::Newline | TokenKind::RBrace) => {
                (t.line, t.text.clone())
            }
            _ => (fallback.line, fallback.text.clone()),
        }
    }

    /// Attributes must not end with a semicolon. A stream-level rule, so it
    /// fires at any nesting depth, like the original line-based check.
    fn check_trailing_semicolons(&mut self) {
        for (i, tok) in self.tokens.iter().enumerate() {
            if tok.kind != TokenKind::Semicolon {
                continue;
            }
            let next = self.tokens.get(i + 1).map(|t| t.kind);
            if next.is_none() || next == Some(TokenKind::Newline) {
                self.error(tok.line, "attributes must not end with a semicolon");
            }
        }
    }

    /// Top-level loop. Unknown top-level statements (global constants,
    /// include directives, stray expressions) are skipped without comment;
    /// bracket problems are the balancer's department.
    fn walk(&mut self) {
        loop {
            self.skip_newlines();
            let Some(tok) = self.peek() else { return };
            match tok.kind {
                TokenKind::Ident => match tok.text.as_str() {
                    "object" | "template" => self.parse_definition(),
                    "apply" => self.parse_apply(),
                    _ => self.consume_statement_tail(),
                },
                TokenKind::RBrace | TokenKind::RBracket | TokenKind::RParen => {
                    self.pos += 1;
                }
                TokenKind::Semicolon => {
                    self.pos += 1;
                }
                _ => self.consume_statement_tail(),
            }
        }
    }

    /// `object TYPE "name" { ... }` or `template TYPE "name" { ... }`.
    fn parse_definition(&mut self) {
        let kw = &self.tokens[self.pos];
        let header_line = kw.line;
        let is_object = kw.text == "object";
        self.pos += 1;

        let Some(ty) = self.parse_type_keyword() else {
            return;
        };
        let type_valid = is_valid_object_type(&ty);

        let name = self.parse_optional_name();
        if name.is_none() {
            let (line, text) = self.statement_offender(kw);
            self.invalid_attribute(line, &text);
        }

        if !self.expect_open_brace(header_line) {
            return;
        }

        if is_object && type_valid {
            if let Some(name) = &name {
                tracing::debug!(ty = %ty, name = %name, line = header_line, "object definition");
                self.records.push(ObjectRecord {
                    object_type: ty,
                    name: name.clone(),
                    file: self.path.to_string(),
                    line: header_line,
                });
            }
        }

        self.parse_body(None);
    }

    /// `apply TYPE ["name"] [for (...)] [to Host|Service] { ... }`.
    fn parse_apply(&mut self) {
        let header_line = self.tokens[self.pos].line;
        self.pos += 1;

        let Some(ty) = self.parse_type_keyword() else {
            return;
        };

        let mut rule = ApplyRule {
            object_type: ty,
            name: self.parse_optional_name(),
            has_for_clause: false,
            target_clause: None,
        };

        if matches!(self.peek(), Some(t) if t.kind == TokenKind::Ident && t.text == "for") {
            self.pos += 1;
            rule.has_for_clause = true;
            if matches!(self.peek().map(|t| t.kind), Some(TokenKind::LParen)) {
                self.skip_parens();
            } else if let Some(t) = self.peek() {
                let (line, text) = (t.line, t.text.clone());
                self.invalid_attribute(line, &text);
            }
        }

        if matches!(self.peek(), Some(t) if t.kind == TokenKind::Ident && t.text == "to") {
            self.pos += 1;
            if let Some(t) = self.peek() {
                if t.kind == TokenKind::Ident {
                    rule.target_clause = match t.text.as_str() {
                        "Host" => Some(Target::Host),
                        "Service" => Some(Target::Service),
                        _ => None,
                    };
                    self.pos += 1;
                }
            }
        }

        tracing::debug!(
            ty = %rule.object_type,
            name = rule.name.as_deref().unwrap_or("<anonymous>"),
            has_for = rule.has_for_clause,
            line = header_line,
            "apply rule"
        );

        let mut target_seen = rule.target_clause.is_some();
        if self.expect_open_brace(header_line) {
            self.parse_body(Some(&mut target_seen));
        }

        if TARGET_REQUIRED.contains(&rule.object_type.as_str()) && !target_seen {
            let message = match &rule.name {
                Some(name) => format!(
                    "'apply {} \"{}\"' must be followed by 'to Service' or 'to Host'",
                    rule.object_type, name
                ),
                None => format!(
                    "'apply {}' must be followed by 'to Service' or 'to Host'",
                    rule.object_type
                ),
            };
            self.error(header_line, message);
        }
    }

    /// The TYPE keyword after `object`/`apply`/`template`. Reports unknown
    /// or non-identifier types; returns None only when the header is too
    /// broken to continue.
    fn parse_type_keyword(&mut self) -> Option<String> {
        match self.peek() {
            Some(t) if t.kind == TokenKind::Ident => {
                let ty = t.text.clone();
                if !is_valid_object_type(&ty) {
                    let line = t.line;
                    self.error(line, format!("'{ty}' is not a valid object type."));
                }
                self.pos += 1;
                Some(ty)
            }
            Some(t) => {
                let (line, text) = (t.line, t.text.clone());
                self.error(line, format!("'{text}' is not a valid object type."));
                self.consume_statement_tail();
                None
            }
            None => None,
        }
    }

    fn parse_optional_name(&mut self) -> Option<String> {
        match self.peek() {
            Some(t) if matches!(t.kind, TokenKind::Str { .. }) => {
                let name = t.string_value().to_string();
                self.pos += 1;
                Some(name)
            }
            _ => None,
        }
    }

    /// Consume up to and including the body's `{`.
    ///
    /// Junk between header and brace on the same line is reported token by
    /// token. The brace may open on a later line with only blanks between;
    /// any other statement first means the brace is missing, and that
    /// statement is left for the caller to re-parse.
    fn expect_open_brace(&mut self, header_line: usize) -> bool {
        while let Some(t) = self.peek() {
            match t.kind {
                TokenKind::LBrace => {
                    self.pos += 1;
                    return true;
                }
                TokenKind::Newline => break,
                _ => {
                    let (line, text) = (t.line, t.text.clone());
                    self.invalid_attribute(line, &text);
                    self.pos += 1;
                }
            }
        }

        self.skip_newlines();
        if matches!(self.peek().map(|t| t.kind), Some(TokenKind::LBrace)) {
            self.pos += 1;
            return true;
        }
        self.error(header_line, "missing opening '{' after keyword declaration");
        false
    }

    /// Validate a `{ ... }` body. Consumes the closing brace. `target`
    /// collects body-level `to Host`/`to Service` statements when walking
    /// an apply-rule body.
    fn parse_body(&mut self, mut target: Option<&mut bool>) {
        loop {
            self.skip_newlines();
            let Some(tok) = self.peek() else { return };
            match tok.kind {
                TokenKind::RBrace => {
                    self.pos += 1;
                    return;
                }
                TokenKind::Semicolon => {
                    // flagged by check_trailing_semicolons when line-ending
                    self.pos += 1;
                }
                TokenKind::LBrace => {
                    // anonymous nested dictionary block
                    self.pos += 1;
                    self.parse_body(None);
                }
                TokenKind::Ident => match tok.text.as_str() {
                    // a new definition here means the body never closed;
                    // hand it back instead of chewing through it
                    "object" | "apply" | "template" => return,
                    "import" => self.parse_import(),
                    "assign" | "ignore" => self.parse_filter(),
                    "to" if target.is_some() && self.peek2_is_target() => {
                        self.pos += 2;
                        if let Some(seen) = target.as_deref_mut() {
                            *seen = true;
                        }
                        self.consume_statement_tail();
                    }
                    _ => self.parse_attribute(),
                },
                _ => {
                    let (line, text) = (tok.line, tok.text.clone());
                    self.invalid_attribute(line, &text);
                    self.consume_statement_tail();
                }
            }
        }
    }

    fn peek2_is_target(&self) -> bool {
        matches!(
            self.peek2(),
            Some(t) if t.kind == TokenKind::Ident && (t.text == "Host" || t.text == "Service")
        )
    }

    /// `import "template-name"`.
    fn parse_import(&mut self) {
        let kw = &self.tokens[self.pos];
        self.pos += 1;
        match self.peek() {
            Some(t) if matches!(t.kind, TokenKind::Str { .. }) => {
                self.pos += 1;
                self.consume_statement_tail();
            }
            _ => {
                let (line, text) = self.statement_offender(kw);
                self.invalid_attribute(line, &text);
                self.consume_statement_tail();
            }
        }
    }

    /// `assign where EXPR` / `ignore where EXPR`. The expression itself is
    /// not modeled; it runs to end of line.
    fn parse_filter(&mut self) {
        let kw = &self.tokens[self.pos];
        self.pos += 1;
        match self.peek() {
            Some(t) if t.kind == TokenKind::Ident && t.text == "where" => {
                self.pos += 1;
                self.consume_statement_tail();
            }
            _ => {
                let (line, text) = self.statement_offender(kw);
                self.invalid_attribute(line, &text);
                self.consume_statement_tail();
            }
        }
    }

    /// A dotted/indexed attribute path followed by an assignment:
    /// `vars.disks["disk /"] += { ... }`.
    fn parse_attribute(&mut self) {
        let first = &self.tokens[self.pos];
        self.pos += 1;

        loop {
            match self.peek().map(|t| t.kind) {
                Some(TokenKind::Dot) => {
                    self.pos += 1;
                    match self.peek() {
                        Some(t) if t.kind == TokenKind::Ident => self.pos += 1,
                        _ => {
                            let (line, text) = self.statement_offender(first);
                            self.invalid_attribute(line, &text);
                            self.consume_statement_tail();
                            return;
                        }
                    }
                }
                Some(TokenKind::LBracket) => self.skip_index(),
                _ => break,
            }
        }

        match self.peek() {
            Some(t) if matches!(t.kind, TokenKind::Assign | TokenKind::CompoundAssign) => {
                self.pos += 1;
                self.consume_statement_tail();
            }
            _ => {
                let (line, text) = self.statement_offender(first);
                self.invalid_attribute(line, &text);
                self.consume_statement_tail();
            }
        }
    }

    /// Skip a `[...]` index expression. Contents are arbitrary; stops at
    /// end of line so an unclosed index can't eat the file (the balancer
    /// reports the bracket itself).
    fn skip_index(&mut self) {
        self.pos += 1; // '['
        let mut depth = 1usize;
        while let Some(tok) = self.peek() {
            match tok.kind {
                TokenKind::LBracket => depth += 1,
                TokenKind::RBracket => {
                    depth -= 1;
                    if depth == 0 {
                        self.pos += 1;
                        return;
                    }
                }
                TokenKind::Newline => return,
                _ => {}
            }
            self.pos += 1;
        }
    }

    /// Skip a `(...)` group (apply `for` clauses). Stops at end of line or
    /// at a body brace when the closing paren is missing.
    fn skip_parens(&mut self) {
        self.pos += 1; // '('
        let mut depth = 1usize;
        while let Some(tok) = self.peek() {
            match tok.kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        self.pos += 1;
                        return;
                    }
                }
                TokenKind::Newline | TokenKind::LBrace => return,
                _ => {}
            }
            self.pos += 1;
        }
    }

    /// Consume the rest of the current statement: everything up to a
    /// newline at the current nesting depth. A single `{` opening a
    /// dictionary value recurses into body validation; a `{{` function
    /// block is skipped opaquely, since its contents are scripting rather
    /// than attributes. The body's own closing `}` is left in place, as is
    /// a definition keyword surfacing at depth 0 after an unclosed value.
    fn consume_statement_tail(&mut self) {
        let mut depth = 0usize;
        while let Some(tok) = self.peek() {
            match tok.kind {
                TokenKind::Newline if depth == 0 => {
                    self.pos += 1;
                    return;
                }
                TokenKind::RBrace if depth == 0 => return,
                TokenKind::Ident
                    if depth == 0
                        && matches!(tok.text.as_str(), "object" | "apply" | "template") =>
                {
                    return;
                }
                TokenKind::LBrace if depth == 0 => {
                    if matches!(self.peek2().map(|t| t.kind), Some(TokenKind::LBrace)) {
                        self.pos += 2;
                        depth += 2;
                    } else {
                        self.pos += 1;
                        self.parse_body(None);
                    }
                }
                TokenKind::LBrace | TokenKind::LBracket | TokenKind::LParen => {
                    depth += 1;
                    self.pos += 1;
                }
                TokenKind::RBrace | TokenKind::RBracket | TokenKind::RParen => {
                    depth = depth.saturating_sub(1);
                    self.pos += 1;
                }
                _ => self.pos += 1,
            }
        }
    }
}
