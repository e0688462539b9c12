//! # Statement Tree
//!
//! The generic form of a YANG file: every statement is a keyword, an
//! optional argument, and a block of substatements (RFC 7950 §6.3). The
//! schema builder interprets this tree; nothing here knows what a
//! `container` is.

use crate::error::{ParserError, ParserResult};
use crate::lexer::{tokenize, Token, TokenKind};

/// One YANG statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// Keyword. Extension keywords keep their prefix (`ext:foo`).
    pub keyword: String,
    /// Argument, if any.
    pub argument: Option<String>,
    /// Substatements in source order.
    pub substatements: Vec<Statement>,
    /// Line of the keyword.
    pub line: usize,
}

impl Statement {
    /// Argument or the empty string.
    pub fn arg(&self) -> &str {
        self.argument.as_deref().unwrap_or("")
    }

    /// Whether the keyword is an extension usage (`prefix:name`).
    pub fn is_extension(&self) -> bool {
        self.keyword.contains(':')
    }

    /// First substatement with `keyword`.
    pub fn child(&self, keyword: &str) -> Option<&Statement> {
        self.substatements.iter().find(|s| s.keyword == keyword)
    }

    /// Argument of the first substatement with `keyword`.
    pub fn child_arg(&self, keyword: &str) -> Option<&str> {
        self.child(keyword).map(Statement::arg)
    }

    /// All substatements with `keyword`.
    pub fn children<'a>(&'a self, keyword: &'a str) -> impl Iterator<Item = &'a Statement> + 'a {
        self.substatements.iter().filter(move |s| s.keyword == keyword)
    }
}

/// Parse a whole file into its single top-level `module` or `submodule`.
pub fn parse_statements(source_name: &str, text: &str) -> ParserResult<Statement> {
    let tokens = tokenize(source_name, text)?;
    let mut parser = StatementReader {
        source_name,
        tokens: &tokens,
        pos: 0,
    };
    let root = parser.statement()?;
    if root.keyword != "module" && root.keyword != "submodule" {
        return Err(ParserError::Syntax {
            source_name: source_name.to_string(),
            line: root.line,
            column: 1,
            message: format!("expected 'module' or 'submodule', found '{}'", root.keyword),
        });
    }
    if let Some(extra) = parser.tokens.get(parser.pos) {
        return Err(parser.error(extra, "unexpected content after the top-level statement"));
    }
    Ok(root)
}

struct StatementReader<'a> {
    source_name: &'a str,
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> StatementReader<'a> {
    fn error(&self, at: &Token, message: impl Into<String>) -> ParserError {
        ParserError::Syntax {
            source_name: self.source_name.to_string(),
            line: at.line,
            column: at.column,
            message: message.into(),
        }
    }

    fn eof_error(&self) -> ParserError {
        let (line, column) = self
            .tokens
            .last()
            .map(|t| (t.line, t.column))
            .unwrap_or((1, 1));
        ParserError::Syntax {
            source_name: self.source_name.to_string(),
            line,
            column,
            message: "unexpected end of input".to_string(),
        }
    }

    fn next(&mut self) -> ParserResult<&'a Token> {
        let token = self.tokens.get(self.pos).ok_or_else(|| self.eof_error())?;
        self.pos += 1;
        Ok(token)
    }

    fn statement(&mut self) -> ParserResult<Statement> {
        let head = self.next()?;
        let keyword = match &head.kind {
            TokenKind::Word(w) => w.clone(),
            other => return Err(self.error(head, format!("expected a keyword, found {}", describe(other)))),
        };
        let mut argument = None;
        let mut after = self.next()?;
        match &after.kind {
            TokenKind::Word(w) | TokenKind::Quoted(w) => {
                argument = Some(w.clone());
                after = self.next()?;
            }
            _ => {}
        }
        let mut substatements = Vec::new();
        match after.kind {
            TokenKind::Semicolon => {}
            TokenKind::OpenBrace => loop {
                match self.tokens.get(self.pos) {
                    None => return Err(self.eof_error()),
                    Some(Token {
                        kind: TokenKind::CloseBrace,
                        ..
                    }) => {
                        self.pos += 1;
                        break;
                    }
                    Some(_) => substatements.push(self.statement()?),
                }
            },
            ref other => {
                return Err(self.error(
                    after,
                    format!("expected ';' or '{{' after '{keyword}', found {}", describe(other)),
                ))
            }
        }
        Ok(Statement {
            keyword,
            argument,
            substatements,
            line: head.line,
        })
    }
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Word(w) => format!("'{w}'"),
        TokenKind::Quoted(s) => format!("string \"{s}\""),
        TokenKind::Semicolon => "';'".to_string(),
        TokenKind::OpenBrace => "'{'".to_string(),
        TokenKind::CloseBrace => "'}'".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_module() {
        let text = r#"
            module example {
              namespace "urn:example";
              prefix ex;
              container cont {
                leaf foo { type string; }
              }
            }
        "#;
        let root = parse_statements("example.yang", text).unwrap();
        assert_eq!(root.keyword, "module");
        assert_eq!(root.arg(), "example");
        assert_eq!(root.child_arg("namespace"), Some("urn:example"));
        let cont = root.child("container").unwrap();
        assert_eq!(cont.line, 5);
        let foo = cont.child("leaf").unwrap();
        assert_eq!(foo.child("type").unwrap().arg(), "string");
        assert!(foo.child("type").unwrap().substatements.is_empty());
    }

    #[test]
    fn test_statement_without_argument() {
        let root = parse_statements("m", "module m { rpc r { input { leaf a { type string; } } } }").unwrap();
        let input = root.child("rpc").unwrap().child("input").unwrap();
        assert!(input.argument.is_none());
        assert_eq!(input.children("leaf").count(), 1);
    }

    #[test]
    fn test_extension_keyword_is_kept() {
        let root = parse_statements("m", "module m { md:annotation last-modified; }").unwrap();
        let ext = &root.substatements[0];
        assert!(ext.is_extension());
        assert_eq!(ext.keyword, "md:annotation");
    }

    #[test]
    fn test_rejects_non_module_root() {
        let err = parse_statements("m", "container c;").unwrap_err();
        assert!(err.to_string().contains("expected 'module' or 'submodule'"));
    }

    #[test]
    fn test_rejects_trailing_content() {
        assert!(parse_statements("m", "module m { } module n { }").is_err());
    }

    #[test]
    fn test_rejects_missing_terminator() {
        let err = parse_statements("m", "module m { prefix p }").unwrap_err();
        match err {
            ParserError::Syntax { message, .. } => assert!(message.contains("expected ';' or '{'")),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_rejects_unclosed_block() {
        assert!(parse_statements("m", "module m { container c {").is_err());
    }
}
