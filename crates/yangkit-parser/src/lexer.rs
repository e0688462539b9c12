//! # YANG Lexer
//!
//! Tokenizes YANG text per RFC 7950 §6.1: comments, unquoted strings,
//! single- and double-quoted strings, `+` concatenation, and the three
//! punctuation tokens `;`, `{`, `}`.
//!
//! Double-quoted strings get the RFC's layout treatment: trailing
//! whitespace before a line break is removed, and leading indentation on
//! continuation lines is removed up to the column just after the opening
//! quote (tabs count as 8 columns). Escapes `\n`, `\t`, `\"`, `\\` are then
//! expanded.

use crate::error::{ParserError, ParserResult};

/// Token kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Unquoted string: keyword or bare argument.
    Word(String),
    /// Quoted string, with concatenation and escapes already applied.
    Quoted(String),
    /// `;`
    Semicolon,
    /// `{`
    OpenBrace,
    /// `}`
    CloseBrace,
}

/// A token with its 1-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token kind.
    pub kind: TokenKind,
    /// Line.
    pub line: usize,
    /// Column.
    pub column: usize,
}

const TAB_WIDTH: usize = 8;

struct Lexer<'a> {
    source_name: &'a str,
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

/// Tokenize `text`.
pub fn tokenize(source_name: &str, text: &str) -> ParserResult<Vec<Token>> {
    let mut lexer = Lexer {
        source_name,
        chars: text.chars().collect(),
        pos: 0,
        line: 1,
        column: 1,
    };
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}

impl<'a> Lexer<'a> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn error(&self, line: usize, column: usize, message: impl Into<String>) -> ParserError {
        ParserError::Syntax {
            source_name: self.source_name.to_string(),
            line,
            column,
            message: message.into(),
        }
    }

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) -> ParserResult<()> {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                }
                (Some('/'), Some('/')) => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                (Some('/'), Some('*')) => {
                    let (line, column) = (self.line, self.column);
                    self.bump();
                    self.bump();
                    loop {
                        match (self.peek(), self.peek_at(1)) {
                            (Some('*'), Some('/')) => {
                                self.bump();
                                self.bump();
                                break;
                            }
                            (Some(_), _) => {
                                self.bump();
                            }
                            (None, _) => return Err(self.error(line, column, "unterminated block comment")),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn next_token(&mut self) -> ParserResult<Option<Token>> {
        self.skip_trivia()?;
        let (line, column) = (self.line, self.column);
        let Some(c) = self.peek() else {
            return Ok(None);
        };
        let kind = match c {
            ';' => {
                self.bump();
                TokenKind::Semicolon
            }
            '{' => {
                self.bump();
                TokenKind::OpenBrace
            }
            '}' => {
                self.bump();
                TokenKind::CloseBrace
            }
            '"' | '\'' => TokenKind::Quoted(self.quoted_with_concatenation()?),
            _ => TokenKind::Word(self.unquoted()),
        };
        Ok(Some(Token { kind, line, column }))
    }

    fn unquoted(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            let comment_start = c == '/' && matches!(self.peek_at(1), Some('/' | '*'));
            if c.is_whitespace() || matches!(c, ';' | '{' | '}' | '"' | '\'') || comment_start {
                break;
            }
            out.push(c);
            self.bump();
        }
        out
    }

    /// Read one quoted string, then any `+ "..."` continuations.
    fn quoted_with_concatenation(&mut self) -> ParserResult<String> {
        let mut out = self.quoted()?;
        loop {
            let save = (self.pos, self.line, self.column);
            self.skip_trivia()?;
            if self.peek() == Some('+') {
                self.bump();
                self.skip_trivia()?;
                match self.peek() {
                    Some('"' | '\'') => out.push_str(&self.quoted()?),
                    _ => return Err(self.error(self.line, self.column, "expected quoted string after '+'")),
                }
            } else {
                (self.pos, self.line, self.column) = save;
                return Ok(out);
            }
        }
    }

    fn quoted(&mut self) -> ParserResult<String> {
        let (line, column) = (self.line, self.column);
        let quote = self.bump().unwrap_or('"');
        let mut raw = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error(line, column, "unterminated quoted string")),
                Some('\\') if quote == '"' => {
                    // Keep escapes raw until layout trimming is done.
                    raw.push('\\');
                    match self.bump() {
                        Some(c) => raw.push(c),
                        None => return Err(self.error(line, column, "unterminated quoted string")),
                    }
                }
                Some(c) if c == quote => break,
                Some(c) => raw.push(c),
            }
        }
        if quote == '\'' {
            return Ok(raw);
        }
        let trimmed = trim_layout(&raw, column);
        unescape(&trimmed).map_err(|m| self.error(line, column, m))
    }
}

/// Apply double-quoted string layout rules. `quote_column` is the 1-based
/// column of the opening quote.
fn trim_layout(raw: &str, quote_column: usize) -> String {
    let indent_limit = quote_column;
    let lines: Vec<&str> = raw.split('\n').collect();
    let last = lines.len() - 1;
    let mut out = String::with_capacity(raw.len());
    for (i, line) in lines.iter().enumerate() {
        let mut line: &str = line;
        if i < last {
            line = line.trim_end_matches([' ', '\t', '\r']);
        }
        if i > 0 {
            out.push('\n');
            out.push_str(&strip_indent(line, indent_limit));
        } else {
            out.push_str(line);
        }
    }
    out
}

/// Remove up to `limit` columns of leading whitespace.
fn strip_indent(line: &str, limit: usize) -> String {
    let mut col = 0usize;
    for (idx, c) in line.char_indices() {
        if col >= limit {
            return line[idx..].to_string();
        }
        match c {
            ' ' => col += 1,
            '\t' => {
                col += TAB_WIDTH;
                if col > limit {
                    // A tab that crosses the limit leaves its excess as spaces.
                    return format!("{}{}", " ".repeat(col - limit), &line[idx + 1..]);
                }
            }
            _ => return line[idx..].to_string(),
        }
    }
    String::new()
}

fn unescape(s: &str) -> Result<String, String> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                // YANG 1.0 tolerated unknown escapes; keep them verbatim.
                out.push('\\');
                out.push(other);
            }
            None => return Err("dangling backslash in quoted string".to_string()),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn kinds(text: &str) -> Vec<TokenKind> {
        tokenize("test", text).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_simple_statement() {
        assert_eq!(
            kinds("leaf foo { type string; }"),
            vec![
                TokenKind::Word("leaf".into()),
                TokenKind::Word("foo".into()),
                TokenKind::OpenBrace,
                TokenKind::Word("type".into()),
                TokenKind::Word("string".into()),
                TokenKind::Semicolon,
                TokenKind::CloseBrace,
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            kinds("// line\nprefix /* block\n comment */ nw;"),
            vec![
                TokenKind::Word("prefix".into()),
                TokenKind::Word("nw".into()),
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn test_concatenation() {
        assert_eq!(
            kinds("pattern '[0-9]' \n  + '[a-z]';"),
            vec![
                TokenKind::Word("pattern".into()),
                TokenKind::Quoted("[0-9][a-z]".into()),
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn test_single_quotes_are_literal() {
        assert_eq!(kinds(r"'a\nb'"), vec![TokenKind::Quoted(r"a\nb".into())]);
    }

    #[test]
    fn test_double_quote_escapes() {
        assert_eq!(kinds(r#""a\tb\"c\\""#), vec![TokenKind::Quoted("a\tb\"c\\".into())]);
    }

    #[test]
    fn test_double_quote_layout_trimming() {
        let text = "description\n    \"first line   \n     second line\n       indented\";";
        let tokens = kinds(text);
        assert_eq!(tokens[1], TokenKind::Quoted("first line\nsecond line\n  indented".into()));
    }

    #[test]
    fn test_unterminated_string_reports_position() {
        let err = tokenize("src.yang", "module m {\n  description \"oops").unwrap_err();
        match err {
            ParserError::Syntax { line, column, .. } => {
                assert_eq!(line, 2);
                assert_eq!(column, 15);
            }
            other => panic!("expected syntax error, got {other}"),
        }
    }

    #[test]
    fn test_unterminated_comment() {
        assert!(tokenize("t", "/* never closed").is_err());
    }

    #[test]
    fn test_plus_without_string_is_error() {
        assert!(tokenize("t", "x \"a\" + ;").is_err());
    }

    #[test]
    fn test_unquoted_may_contain_slashes() {
        assert_eq!(
            kinds("augment /nw:networks/nw:network {"),
            vec![
                TokenKind::Word("augment".into()),
                TokenKind::Word("/nw:networks/nw:network".into()),
                TokenKind::OpenBrace,
            ]
        );
    }

    proptest! {
        #[test]
        fn prop_single_quoted_content_is_preserved(s in "[a-zA-Z0-9 .,:;{}\"/-]{0,40}") {
            let text = format!("'{s}'");
            let tokens = tokenize("p", &text).unwrap();
            prop_assert_eq!(tokens.len(), 1);
            prop_assert_eq!(&tokens[0].kind, &TokenKind::Quoted(s));
        }
    }
}
