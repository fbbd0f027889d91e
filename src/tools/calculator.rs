//! Calculator Tool
//!
//! Arithmetic with `+ - * / % **`, parentheses, unary signs and the
//! `"N% of M"` shorthand. Input is reduced to `[0-9+\-*/().%\s]` before
//! evaluation, so nothing but arithmetic ever reaches the evaluator.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Number, Value};
use thiserror::Error;

use super::{str_param, Params, Tool, ToolCategory, ToolContext, ToolId, ToolResult, ToolSchema};

static PERCENT_OF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*%\s*of\s*(\d+(?:\.\d+)?)").expect("valid percent regex")
});

/// Nesting bound for parentheses, signs and exponent chains
const MAX_DEPTH: usize = 64;

static DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9+\-*/().%\s]").expect("valid sanitizer regex"));

/// Evaluation errors
#[derive(Debug, Error, PartialEq)]
pub enum EvalError {
    #[error("Unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("Invalid number '{0}'")]
    InvalidNumber(String),
    #[error("Unexpected end of expression")]
    UnexpectedEnd,
    #[error("Unexpected token at position {0}")]
    UnexpectedToken(usize),
    #[error("Missing closing parenthesis")]
    UnclosedParen,
    #[error("Expression nested deeper than {0} levels")]
    TooDeep(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    Percent,
    LParen,
    RParen,
}

fn lex(input: &str) -> Result<Vec<Token>, EvalError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&ch) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            '0'..='9' | '.' => {
                let mut literal = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' {
                        literal.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| EvalError::InvalidNumber(literal.clone()))?;
                tokens.push(Token::Number(value));
            }
            '+' => { tokens.push(Token::Plus); chars.next(); }
            '-' => { tokens.push(Token::Minus); chars.next(); }
            '*' => {
                chars.next();
                if chars.peek() == Some(&'*') {
                    chars.next();
                    tokens.push(Token::StarStar);
                } else {
                    tokens.push(Token::Star);
                }
            }
            '/' => { tokens.push(Token::Slash); chars.next(); }
            '%' => { tokens.push(Token::Percent); chars.next(); }
            '(' => { tokens.push(Token::LParen); chars.next(); }
            ')' => { tokens.push(Token::RParen); chars.next(); }
            other => return Err(EvalError::UnexpectedChar(other)),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.peek();
        self.pos += 1;
        token
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<f64, EvalError> {
        let mut value = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == Token::Plus { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    // term := unary (('*' | '/' | '%') unary)*
    fn term(&mut self) -> Result<f64, EvalError> {
        let mut value = self.unary()?;
        while let Some(op @ (Token::Star | Token::Slash | Token::Percent)) = self.peek() {
            self.pos += 1;
            let rhs = self.unary()?;
            value = match op {
                Token::Star => value * rhs,
                Token::Slash => value / rhs,
                _ => value % rhs,
            };
        }
        Ok(value)
    }

    // Every recursive cycle passes through here, so this is the depth guard
    fn unary(&mut self) -> Result<f64, EvalError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(EvalError::TooDeep(MAX_DEPTH));
        }

        let value = match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                self.unary().map(|v| -v)
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        };

        self.depth -= 1;
        value
    }

    // power := primary ('**' unary)?   (right-associative, binds tighter than a sign)
    fn power(&mut self) -> Result<f64, EvalError> {
        let base = self.primary()?;
        if self.peek() == Some(Token::StarStar) {
            self.pos += 1;
            let exponent = self.unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<f64, EvalError> {
        let at = self.pos;
        match self.next() {
            Some(Token::Number(n)) => Ok(n),
            Some(Token::LParen) => {
                let value = self.expr()?;
                match self.next() {
                    Some(Token::RParen) => Ok(value),
                    _ => Err(EvalError::UnclosedParen),
                }
            }
            Some(_) => Err(EvalError::UnexpectedToken(at)),
            None => Err(EvalError::UnexpectedEnd),
        }
    }
}

/// Evaluate a sanitized arithmetic expression
pub fn evaluate(input: &str) -> Result<f64, EvalError> {
    let tokens = lex(input)?;
    if tokens.is_empty() {
        return Err(EvalError::UnexpectedEnd);
    }

    let mut parser = Parser { tokens, pos: 0, depth: 0 };
    let value = parser.expr()?;
    if parser.pos != parser.tokens.len() {
        return Err(EvalError::UnexpectedToken(parser.pos));
    }
    Ok(value)
}

/// Rewrite `N% of M` to `(N / 100) * M`
fn rewrite_percent_of(expression: &str) -> String {
    PERCENT_OF.replace(expression, "($1 / 100) * $2").into_owned()
}

/// Round half up to 6 decimal places
fn round6(value: f64) -> f64 {
    (value * 1_000_000.0 + 0.5).floor() / 1_000_000.0
}

/// Integral values become JSON integers
fn to_json_number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        json!(value as i64)
    } else {
        Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
    }
}

pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn id(&self) -> ToolId {
        ToolId::Calculator
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Safe
    }

    fn describe(&self) -> ToolSchema {
        ToolSchema::new(
            "calculator",
            "Perform mathematical calculations. Supports basic arithmetic and percentages.",
            ToolCategory::Safe,
        )
        .with_string_param(
            "expression",
            "Mathematical expression to evaluate (e.g., \"25 * 17\" or \"15% of 200\")",
            true,
        )
    }

    async fn execute(&self, params: &Params, _context: &ToolContext) -> anyhow::Result<ToolResult> {
        let Some(expression) = str_param(params, "expression") else {
            return Ok(ToolResult::error("Expression required"));
        };

        let rewritten = rewrite_percent_of(expression);
        let sanitized = DISALLOWED.replace_all(&rewritten, "");
        if sanitized.trim().is_empty() {
            return Ok(ToolResult::error("Invalid expression"));
        }

        let value = match evaluate(&sanitized) {
            Ok(v) => v,
            Err(e) => return Ok(ToolResult::error(format!("Calculation failed: {}", e))),
        };

        if !value.is_finite() {
            return Ok(ToolResult::error("Invalid calculation result"));
        }

        let result = to_json_number(round6(value));
        Ok(ToolResult::ok(json!({
            "expression": expression,
            "formatted": format!("{} = {}", expression, result),
            "result": result,
        })))
    }
}
