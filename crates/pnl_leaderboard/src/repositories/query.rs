//! Annotation predicates, e.g. `type = "daily_leaderboard" && total_traders > 10`.
//!
//! ```text
//! expr := and ('||' and)*
//! and  := term ('&&' term)*
//! term := '(' expr ')' | ident op literal
//! op   := '=' | '!=' | '<' | '<=' | '>' | '>='
//! literal := "string" | integer
//! ```

use std::{cmp::Ordering, fmt::Display};

use super::entity_store::EntityRecord;
use crate::utils::errors::app_error::AppError;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Num(i64),
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Num(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    fn holds(&self, ordering: Ordering) -> bool {
        match self {
            CmpOp::Eq => ordering == Ordering::Equal,
            CmpOp::Ne => ordering != Ordering::Equal,
            CmpOp::Lt => ordering == Ordering::Less,
            CmpOp::Le => ordering != Ordering::Greater,
            CmpOp::Gt => ordering == Ordering::Greater,
            CmpOp::Ge => ordering != Ordering::Less,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Cmp { key: String, op: CmpOp, value: Value },
    And(Box<Query>, Box<Query>),
    Or(Box<Query>, Box<Query>),
}

impl Query {
    pub fn cmp(key: &str, op: CmpOp, value: impl Into<Value>) -> Self {
        Query::Cmp {
            key: key.to_string(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(key: &str, value: impl Into<Value>) -> Self {
        Self::cmp(key, CmpOp::Eq, value)
    }

    pub fn and(self, other: Query) -> Self {
        Query::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Query) -> Self {
        Query::Or(Box::new(self), Box::new(other))
    }

    pub fn parse(input: &str) -> Result<Self, AppError> {
        let tokens = tokenize(input)?;
        let mut parser = Parser { tokens, pos: 0 };
        let query = parser.parse_or()?;
        match parser.peek() {
            None => Ok(query),
            Some(token) => Err(AppError::InvalidQuery(format!(
                "unexpected {:?} at token {}",
                token, parser.pos
            ))),
        }
    }

    /// A comparison against an absent annotation, or across value types,
    /// is false.
    pub fn matches(&self, record: &EntityRecord) -> bool {
        match self {
            Query::And(left, right) => left.matches(record) && right.matches(record),
            Query::Or(left, right) => left.matches(record) || right.matches(record),
            Query::Cmp { key, op, value } => {
                let ordering = match value {
                    Value::Str(expected) => record
                        .string_annotation(key)
                        .map(|actual| actual.cmp(expected.as_str())),
                    Value::Num(expected) => record
                        .numeric_annotation(key)
                        .map(|actual| actual.cmp(expected)),
                };
                ordering.map(|o| op.holds(o)).unwrap_or(false)
            }
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Str(s) => write!(f, "\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
            Value::Num(n) => write!(f, "{}", n),
        }
    }
}

impl Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Query::Cmp { key, op, value } => write!(f, "{} {} {}", key, op.as_str(), value),
            Query::Or(left, right) => write!(f, "{} || {}", left, right),
            Query::And(left, right) => {
                for (i, side) in [left, right].into_iter().enumerate() {
                    if i > 0 {
                        write!(f, " && ")?;
                    }
                    match **side {
                        Query::Or(..) => write!(f, "({})", side)?,
                        _ => write!(f, "{}", side)?,
                    }
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Num(i64),
    Op(CmpOp),
    And,
    Or,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, AppError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match c {
            c if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '&' if next == Some('&') => {
                tokens.push(Token::And);
                i += 2;
            }
            '|' if next == Some('|') => {
                tokens.push(Token::Or);
                i += 2;
            }
            '=' => {
                tokens.push(Token::Op(CmpOp::Eq));
                i += 1;
            }
            '!' if next == Some('=') => {
                tokens.push(Token::Op(CmpOp::Ne));
                i += 2;
            }
            '<' | '>' => {
                let op = match (c, next == Some('=')) {
                    ('<', true) => CmpOp::Le,
                    ('<', false) => CmpOp::Lt,
                    ('>', true) => CmpOp::Ge,
                    _ => CmpOp::Gt,
                };
                tokens.push(Token::Op(op));
                i += if next == Some('=') { 2 } else { 1 };
            }
            '"' => {
                let mut value = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        None => {
                            return Err(AppError::InvalidQuery("unterminated string".into()));
                        }
                        Some('"') => {
                            i += 1;
                            break;
                        }
                        Some('\\') => {
                            let escaped = chars.get(i + 1).ok_or_else(|| {
                                AppError::InvalidQuery("unterminated escape".into())
                            })?;
                            value.push(*escaped);
                            i += 2;
                        }
                        Some(ch) => {
                            value.push(*ch);
                            i += 1;
                        }
                    }
                }
                tokens.push(Token::Str(value));
            }
            c if c.is_ascii_digit() || c == '-' => {
                let start = i;
                i += 1;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let number = text
                    .parse::<i64>()
                    .map_err(|_| AppError::InvalidQuery(format!("invalid number {:?}", text)))?;
                tokens.push(Token::Num(number));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            other => {
                return Err(AppError::InvalidQuery(format!(
                    "unexpected character {:?} at {}",
                    other, i
                )));
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn parse_or(&mut self) -> Result<Query, AppError> {
        let mut query = self.parse_and()?;
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            query = query.or(self.parse_and()?);
        }
        Ok(query)
    }

    fn parse_and(&mut self) -> Result<Query, AppError> {
        let mut query = self.parse_term()?;
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            query = query.and(self.parse_term()?);
        }
        Ok(query)
    }

    fn parse_term(&mut self) -> Result<Query, AppError> {
        match self.next() {
            Some(Token::LParen) => {
                let query = self.parse_or()?;
                match self.next() {
                    Some(Token::RParen) => Ok(query),
                    other => Err(AppError::InvalidQuery(format!("expected ')', got {:?}", other))),
                }
            }
            Some(Token::Ident(key)) => {
                let op = match self.next() {
                    Some(Token::Op(op)) => op,
                    other => {
                        return Err(AppError::InvalidQuery(format!(
                            "expected operator after {}, got {:?}",
                            key, other
                        )))
                    }
                };
                let value = match self.next() {
                    Some(Token::Str(s)) => Value::Str(s),
                    Some(Token::Num(n)) => Value::Num(n),
                    other => {
                        return Err(AppError::InvalidQuery(format!(
                            "expected literal after {} {}, got {:?}",
                            key,
                            op.as_str(),
                            other
                        )))
                    }
                };
                Ok(Query::Cmp { key, op, value })
            }
            other => Err(AppError::InvalidQuery(format!(
                "expected annotation or '(', got {:?}",
                other
            ))),
        }
    }
}
