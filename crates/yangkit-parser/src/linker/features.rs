//! `feature` support and `if-feature` expressions.
//!
//! YANG 1.1 allows boolean expressions over feature names
//! (`not`, `and`, `or`, parentheses); YANG 1.0 allows a single name, which
//! is a special case of the same grammar. A feature is supported when the
//! parser was told to support it (or no restriction was configured) and
//! its own `if-feature` conditions hold.

use super::{split_prefix, Linker};
use crate::error::ParserResult;
use crate::statement::Statement;

const MAX_FEATURE_DEPTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
enum IfFeatureExpr {
    Feature(String),
    Not(Box<IfFeatureExpr>),
    And(Box<IfFeatureExpr>, Box<IfFeatureExpr>),
    Or(Box<IfFeatureExpr>, Box<IfFeatureExpr>),
}

impl<'a> Linker<'a> {
    /// Whether every `if-feature` on `stmt` holds.
    pub(super) fn if_features_satisfied(&self, stmt: &Statement, file: usize) -> ParserResult<bool> {
        self.conditions_hold(stmt, file, 0)
    }

    fn conditions_hold(&self, stmt: &Statement, file: usize, depth: usize) -> ParserResult<bool> {
        for condition in stmt.children("if-feature") {
            let expr = parse_if_feature(condition.arg()).map_err(|m| {
                self.semantic(file, condition.line, format!("invalid if-feature '{}': {m}", condition.arg()))
            })?;
            if !self.eval(&expr, file, condition.line, depth)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn eval(&self, expr: &IfFeatureExpr, file: usize, line: usize, depth: usize) -> ParserResult<bool> {
        Ok(match expr {
            IfFeatureExpr::Feature(text) => {
                let (prefix, name) = split_prefix(text);
                let module = self.resolve_module(file, prefix, line)?;
                self.feature_supported(module, name, file, line, depth)?
            }
            IfFeatureExpr::Not(inner) => !self.eval(inner, file, line, depth)?,
            IfFeatureExpr::And(a, b) => {
                let left = self.eval(a, file, line, depth)?;
                let right = self.eval(b, file, line, depth)?;
                left && right
            }
            IfFeatureExpr::Or(a, b) => {
                let left = self.eval(a, file, line, depth)?;
                let right = self.eval(b, file, line, depth)?;
                left || right
            }
        })
    }

    /// Whether feature `name` of module `module` is supported. `file` and
    /// `line` locate the reference for error messages.
    pub(super) fn feature_supported(
        &self,
        module: usize,
        name: &str,
        file: usize,
        line: usize,
        depth: usize,
    ) -> ParserResult<bool> {
        let (stmt, def_file) = self.modules[module]
            .features
            .iter()
            .find(|(s, _)| s.arg() == name)
            .copied()
            .ok_or_else(|| self.unresolved(file, line, "feature", name))?;
        if depth >= MAX_FEATURE_DEPTH {
            return Err(self.semantic(file, line, format!("feature '{name}' depends on itself")));
        }
        let enabled = match self.supported_features {
            None => true,
            Some(set) => set.contains(&format!("{}:{}", self.modules[module].name, name)),
        };
        if !enabled {
            return Ok(false);
        }
        self.conditions_hold(stmt, def_file, depth + 1)
    }
}

fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        if c == '(' || c == ')' || c.is_whitespace() {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            if !c.is_whitespace() {
                tokens.push(c.to_string());
            }
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn parse_if_feature(text: &str) -> Result<IfFeatureExpr, String> {
    let tokens = tokenize(text);
    let mut pos = 0;
    let expr = parse_or(&tokens, &mut pos)?;
    if pos != tokens.len() {
        return Err(format!("unexpected '{}'", tokens[pos]));
    }
    Ok(expr)
}

fn parse_or(tokens: &[String], pos: &mut usize) -> Result<IfFeatureExpr, String> {
    let mut left = parse_and(tokens, pos)?;
    while tokens.get(*pos).map(String::as_str) == Some("or") {
        *pos += 1;
        let right = parse_and(tokens, pos)?;
        left = IfFeatureExpr::Or(Box::new(left), Box::new(right));
    }
    Ok(left)
}

fn parse_and(tokens: &[String], pos: &mut usize) -> Result<IfFeatureExpr, String> {
    let mut left = parse_not(tokens, pos)?;
    while tokens.get(*pos).map(String::as_str) == Some("and") {
        *pos += 1;
        let right = parse_not(tokens, pos)?;
        left = IfFeatureExpr::And(Box::new(left), Box::new(right));
    }
    Ok(left)
}

fn parse_not(tokens: &[String], pos: &mut usize) -> Result<IfFeatureExpr, String> {
    let token = tokens.get(*pos).ok_or("expression ends early")?;
    *pos += 1;
    match token.as_str() {
        "not" => Ok(IfFeatureExpr::Not(Box::new(parse_not(tokens, pos)?))),
        "(" => {
            let inner = parse_or(tokens, pos)?;
            if tokens.get(*pos).map(String::as_str) != Some(")") {
                return Err("missing ')'".to_string());
            }
            *pos += 1;
            Ok(inner)
        }
        ")" | "and" | "or" => Err(format!("unexpected '{token}'")),
        name => Ok(IfFeatureExpr::Feature(name.to_string())),
    }
}
