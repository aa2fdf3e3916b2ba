//! Expression language of `formula_readable`.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! implies := or ( ("→" | "->" | "implies") implies )?
//! or      := and ( ("∨" | "||" | "or") and )*
//! and     := unary ( ("∧" | "&&" | "and") unary )*
//! unary   := ("¬" | "!" | "not") unary | compare
//! compare := atom ( ("≤" | "<=" | "≥" | ">=" | "<" | ">" | "=" | "==" | "≠" | "!=") atom )?
//! atom    := number | "true" | "false" | identifier | "(" implies ")"
//! ```

use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl CmpOp {
    fn apply(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Self::Lt => lhs < rhs,
            Self::Le => lhs <= rhs,
            Self::Gt => lhs > rhs,
            Self::Ge => lhs >= rhs,
            Self::Eq => (lhs - rhs).abs() < f64::EPSILON,
            Self::Ne => (lhs - rhs).abs() >= f64::EPSILON,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Bool(bool),
    Num(f64),
    Var(String),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Implies(Box<Expr>, Box<Expr>),
    Cmp(CmpOp, Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Value {
    Bool(bool),
    Num(f64),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Num(value) => write!(f, "{value}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Ident(String),
    LParen,
    RParen,
    Not,
    And,
    Or,
    Implies,
    Cmp(CmpOp),
}

impl Expr {
    /// Variable names referenced by the expression, sorted.
    pub(crate) fn variables(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables(&self, out: &mut BTreeSet<String>) {
        match self {
            Self::Bool(_) | Self::Num(_) => {}
            Self::Var(name) => {
                out.insert(name.clone());
            }
            Self::Not(inner) => inner.collect_variables(out),
            Self::And(lhs, rhs) | Self::Or(lhs, rhs) | Self::Implies(lhs, rhs) => {
                lhs.collect_variables(out);
                rhs.collect_variables(out);
            }
            Self::Cmp(_, lhs, rhs) => {
                lhs.collect_variables(out);
                rhs.collect_variables(out);
            }
        }
    }

    pub(crate) fn eval(&self, lookup: &dyn Fn(&str) -> Option<Value>) -> Result<bool, String> {
        match self.value(lookup)? {
            Value::Bool(result) => Ok(result),
            Value::Num(value) => Err(format!(
                "formula evaluates to a number ({value}), not a truth value"
            )),
        }
    }

    fn value(&self, lookup: &dyn Fn(&str) -> Option<Value>) -> Result<Value, String> {
        Ok(match self {
            Self::Bool(value) => Value::Bool(*value),
            Self::Num(value) => Value::Num(*value),
            Self::Var(name) => lookup(name).ok_or_else(|| format!("unbound variable `{name}`"))?,
            Self::Not(inner) => Value::Bool(!inner.truth(lookup)?),
            Self::And(lhs, rhs) => Value::Bool(lhs.truth(lookup)? && rhs.truth(lookup)?),
            Self::Or(lhs, rhs) => Value::Bool(lhs.truth(lookup)? || rhs.truth(lookup)?),
            Self::Implies(lhs, rhs) => Value::Bool(!lhs.truth(lookup)? || rhs.truth(lookup)?),
            Self::Cmp(op, lhs, rhs) => match (lhs.value(lookup)?, rhs.value(lookup)?) {
                (Value::Num(lhs), Value::Num(rhs)) => Value::Bool(op.apply(lhs, rhs)),
                (Value::Bool(lhs), Value::Bool(rhs)) if *op == CmpOp::Eq => Value::Bool(lhs == rhs),
                (Value::Bool(lhs), Value::Bool(rhs)) if *op == CmpOp::Ne => Value::Bool(lhs != rhs),
                (lhs, rhs) => {
                    return Err(format!("cannot compare {lhs} with {rhs} using {op:?}"));
                }
            },
        })
    }

    fn truth(&self, lookup: &dyn Fn(&str) -> Option<Value>) -> Result<bool, String> {
        match self.value(lookup)? {
            Value::Bool(value) => Ok(value),
            Value::Num(value) => Err(format!("expected a truth value, found number {value}")),
        }
    }
}

/// Deepest operator nesting a formula may reach before parsing gives up.
const MAX_NESTING: usize = 256;

pub(crate) fn parse_formula(source: &str) -> Result<Expr, String> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.implies()?;
    if let Some(token) = parser.peek() {
        return Err(format!("unexpected trailing token {token:?}"));
    }
    Ok(expr)
}

fn tokenize(source: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();
    while let Some(&(start, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }
        if ch.is_ascii_digit() || ch == '.' {
            let mut end = start;
            while let Some(&(idx, digit)) = chars.peek() {
                if !(digit.is_ascii_digit() || digit == '.') {
                    break;
                }
                end = idx + digit.len_utf8();
                chars.next();
            }
            let literal = &source[start..end];
            let value = literal
                .parse::<f64>()
                .map_err(|_| format!("invalid number `{literal}`"))?;
            tokens.push(Token::Num(value));
            continue;
        }
        if ch.is_alphabetic() || ch == '_' {
            let mut end = start;
            while let Some(&(idx, part)) = chars.peek() {
                if !(part.is_alphanumeric() || part == '_') {
                    break;
                }
                end = idx + part.len_utf8();
                chars.next();
            }
            tokens.push(keyword_or_ident(&source[start..end]));
            continue;
        }

        chars.next();
        let next = chars.peek().map(|&(_, next)| next);
        let (token, wide) = match (ch, next) {
            ('(', _) => (Token::LParen, false),
            (')', _) => (Token::RParen, false),
            ('¬', _) => (Token::Not, false),
            ('∧', _) => (Token::And, false),
            ('∨', _) => (Token::Or, false),
            ('→' | '⇒', _) => (Token::Implies, false),
            ('≤', _) => (Token::Cmp(CmpOp::Le), false),
            ('≥', _) => (Token::Cmp(CmpOp::Ge), false),
            ('≠', _) => (Token::Cmp(CmpOp::Ne), false),
            ('<', Some('=')) => (Token::Cmp(CmpOp::Le), true),
            ('>', Some('=')) => (Token::Cmp(CmpOp::Ge), true),
            ('!', Some('=')) => (Token::Cmp(CmpOp::Ne), true),
            ('=', Some('=')) => (Token::Cmp(CmpOp::Eq), true),
            ('-', Some('>')) => (Token::Implies, true),
            ('&', Some('&')) => (Token::And, true),
            ('|', Some('|')) => (Token::Or, true),
            ('<', _) => (Token::Cmp(CmpOp::Lt), false),
            ('>', _) => (Token::Cmp(CmpOp::Gt), false),
            ('=', _) => (Token::Cmp(CmpOp::Eq), false),
            ('!', _) => (Token::Not, false),
            (other, _) => return Err(format!("unexpected character `{other}` at {start}")),
        };
        if wide {
            chars.next();
        }
        tokens.push(token);
    }
    Ok(tokens)
}

fn keyword_or_ident(word: &str) -> Token {
    match word.to_ascii_lowercase().as_str() {
        "and" => Token::And,
        "or" => Token::Or,
        "not" => Token::Not,
        "implies" => Token::Implies,
        _ => Token::Ident(word.to_string()),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn enter(&mut self) -> Result<(), String> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(format!("formula nests deeper than {MAX_NESTING} levels"));
        }
        Ok(())
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn implies(&mut self) -> Result<Expr, String> {
        let lhs = self.or()?;
        if self.eat(&Token::Implies) {
            self.enter()?;
            let rhs = self.implies()?;
            self.depth -= 1;
            return Ok(Expr::Implies(Box::new(lhs), Box::new(rhs)));
        }
        Ok(lhs)
    }

    fn or(&mut self) -> Result<Expr, String> {
        let mut lhs = self.and()?;
        let mut links = 0;
        while self.eat(&Token::Or) {
            self.enter()?;
            links += 1;
            let rhs = self.and()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        self.depth -= links;
        Ok(lhs)
    }

    fn and(&mut self) -> Result<Expr, String> {
        let mut lhs = self.unary()?;
        let mut links = 0;
        while self.eat(&Token::And) {
            self.enter()?;
            links += 1;
            let rhs = self.unary()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        self.depth -= links;
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, String> {
        if self.eat(&Token::Not) {
            self.enter()?;
            let inner = self.unary()?;
            self.depth -= 1;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.compare()
    }

    fn compare(&mut self) -> Result<Expr, String> {
        let lhs = self.atom()?;
        if let Some(Token::Cmp(op)) = self.peek() {
            let op = *op;
            self.pos += 1;
            let rhs = self.atom()?;
            return Ok(Expr::Cmp(op, Box::new(lhs), Box::new(rhs)));
        }
        Ok(lhs)
    }

    fn atom(&mut self) -> Result<Expr, String> {
        match self.advance() {
            Some(Token::Num(value)) => Ok(Expr::Num(value)),
            Some(Token::Ident(name)) => Ok(match name.to_ascii_lowercase().as_str() {
                "true" => Expr::Bool(true),
                "false" => Expr::Bool(false),
                _ => Expr::Var(name),
            }),
            Some(Token::LParen) => {
                self.enter()?;
                let inner = self.implies()?;
                self.depth -= 1;
                if !self.eat(&Token::RParen) {
                    return Err("missing closing parenthesis".to_string());
                }
                Ok(inner)
            }
            Some(token) => Err(format!("unexpected token {token:?}")),
            None => Err("unexpected end of formula".to_string()),
        }
    }
}
