//! Calculator Tool - restricted arithmetic evaluator
//!
//! Grammar (no names, no calls, numbers and operators only):
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := unary (('*' | '/' | '//' | '%') unary)*
//! unary  := ('+' | '-') unary | power
//! power  := atom ('**' unary)?
//! atom   := NUMBER | '(' expr ')'
//! ```
//!
//! Integers stay integers until `/` or a float operand turns them into
//! floats; `%` and `//` floor toward negative infinity.

use crate::mcp::McpToolResult;
use crate::server::tool::{parse_input, ServerTool};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;
use toolrelay_foundation::Result;

/// Nesting limit for parentheses, unary chains and `**` chains
const MAX_DEPTH: usize = 64;

#[derive(Debug, Deserialize)]
struct CalculateInput {
    expression: String,
}

pub struct CalculateTool;

impl CalculateTool {
    pub const NAME: &'static str = "calculate";
}

#[async_trait]
impl ServerTool for CalculateTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn doc(&self) -> Option<&str> {
        Some("Simple calculator tool that evaluates mathematical expressions.\n\nexpression: A mathematical expression to evaluate (e.g., \"2 + 3 * 4\")")
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "A mathematical expression to evaluate (e.g., '2 + 3 * 4')"
                }
            },
            "required": ["expression"]
        })
    }

    async fn execute(&self, input: Value) -> Result<McpToolResult> {
        let input: CalculateInput = parse_input(Self::NAME, input)?;

        // Evaluation failures are a normal answer, not a tool error
        let text = match evaluate(&input.expression) {
            Ok(value) => format!("Result: {}", value),
            Err(reason) => format!("Error: {}", reason),
        };
        Ok(McpToolResult::text(text))
    }
}

// ============================================================================
// Number
// ============================================================================

/// Calculator value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    fn is_zero(self) -> bool {
        match self {
            Number::Int(i) => i == 0,
            Number::Float(f) => f == 0.0,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(v) if v.is_nan() => f.write_str("nan"),
            Number::Float(v) if v.is_infinite() => {
                f.write_str(if v > 0.0 { "inf" } else { "-inf" })
            }
            Number::Float(v) => {
                let scientific = format!("{:e}", v);
                let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
                let exponent: i32 = exponent.parse().unwrap_or(0);

                if !(-4..16).contains(&exponent) {
                    // 1e+16, 1.5e-05
                    let sign = if exponent < 0 { '-' } else { '+' };
                    write!(f, "{}e{}{:02}", mantissa, sign, exponent.abs())
                } else if v.fract() == 0.0 {
                    // Whole floats keep a trailing ".0"
                    write!(f, "{:.1}", v)
                } else {
                    write!(f, "{}", v)
                }
            }
        }
    }
}

// ============================================================================
// Tokenizer
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Num(Number),
    Plus,
    Minus,
    Star,
    Slash,
    DoubleSlash,
    Percent,
    Power,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> std::result::Result<Vec<Token>, String> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                // Exponent: 1e5, 2.5E-3
                if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                    let mut j = i + 1;
                    if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        i = j;
                        while i < chars.len() && chars[i].is_ascii_digit() {
                            i += 1;
                        }
                    }
                }
                let literal: String = chars[start..i].iter().collect();
                tokens.push(Token::Num(parse_number(&literal)?));
            }
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' if chars.get(i + 1) == Some(&'*') => {
                tokens.push(Token::Power);
                i += 2;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' if chars.get(i + 1) == Some(&'/') => {
                tokens.push(Token::DoubleSlash);
                i += 2;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '%' => {
                tokens.push(Token::Percent);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            other => return Err(format!("unsupported character '{}'", other)),
        }
    }

    Ok(tokens)
}

fn parse_number(literal: &str) -> std::result::Result<Number, String> {
    let is_float = literal.contains(['.', 'e', 'E']);
    if is_float {
        literal
            .parse::<f64>()
            .map(Number::Float)
            .map_err(|_| format!("invalid number '{}'", literal))
    } else {
        literal
            .parse::<i64>()
            .map(Number::Int)
            .map_err(|_| format!("integer out of range '{}'", literal))
    }
}

// ============================================================================
// Parser / evaluator
// ============================================================================

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek();
        self.pos += 1;
        token
    }

    fn descend(&mut self) -> std::result::Result<(), String> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err("expression is nested too deeply".to_string());
        }
        Ok(())
    }

    fn expr(&mut self) -> std::result::Result<Number, String> {
        let mut value = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = apply(op, value, rhs)?;
        }
        Ok(value)
    }

    fn term(&mut self) -> std::result::Result<Number, String> {
        let mut value = self.unary()?;
        while let Some(op @ (Token::Star | Token::Slash | Token::DoubleSlash | Token::Percent)) =
            self.peek()
        {
            self.pos += 1;
            let rhs = self.unary()?;
            value = apply(op, value, rhs)?;
        }
        Ok(value)
    }

    fn unary(&mut self) -> std::result::Result<Number, String> {
        match self.peek() {
            Some(Token::Plus) => {
                self.pos += 1;
                self.descend()?;
                let value = self.unary();
                self.depth -= 1;
                value
            }
            Some(Token::Minus) => {
                self.pos += 1;
                self.descend()?;
                let value = self.unary()?;
                self.depth -= 1;
                negate(value)
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> std::result::Result<Number, String> {
        let base = self.atom()?;
        if self.peek() == Some(Token::Power) {
            self.pos += 1;
            self.descend()?;
            let exponent = self.unary()?;
            self.depth -= 1;
            return pow(base, exponent);
        }
        Ok(base)
    }

    fn atom(&mut self) -> std::result::Result<Number, String> {
        match self.advance() {
            Some(Token::Num(n)) => Ok(n),
            Some(Token::LParen) => {
                self.descend()?;
                let value = self.expr()?;
                self.depth -= 1;
                match self.advance() {
                    Some(Token::RParen) => Ok(value),
                    _ => Err("missing closing parenthesis".to_string()),
                }
            }
            Some(token) => Err(format!("unexpected token {:?}", token)),
            None => Err("unexpected end of expression".to_string()),
        }
    }
}

fn negate(value: Number) -> std::result::Result<Number, String> {
    match value {
        Number::Int(i) => i
            .checked_neg()
            .map(Number::Int)
            .ok_or_else(|| "integer overflow".to_string()),
        Number::Float(f) => Ok(Number::Float(-f)),
    }
}

fn apply(op: Token, lhs: Number, rhs: Number) -> std::result::Result<Number, String> {
    use Number::{Float, Int};

    if matches!(op, Token::Slash | Token::DoubleSlash | Token::Percent) && rhs.is_zero() {
        return Err("division by zero".to_string());
    }

    let overflow = || "integer overflow".to_string();

    match (op, lhs, rhs) {
        (Token::Slash, l, r) => Ok(Float(l.as_f64() / r.as_f64())),
        (Token::Plus, Int(l), Int(r)) => l.checked_add(r).map(Int).ok_or_else(overflow),
        (Token::Minus, Int(l), Int(r)) => l.checked_sub(r).map(Int).ok_or_else(overflow),
        (Token::Star, Int(l), Int(r)) => l.checked_mul(r).map(Int).ok_or_else(overflow),
        (Token::DoubleSlash, Int(l), Int(r)) => {
            let q = l.checked_div(r).ok_or_else(overflow)?;
            // Floor toward negative infinity
            Ok(Int(if (l % r != 0) && ((l < 0) != (r < 0)) { q - 1 } else { q }))
        }
        (Token::Percent, Int(l), Int(r)) => {
            let m = l.checked_rem(r).ok_or_else(overflow)?;
            Ok(Int(if m != 0 && ((m < 0) != (r < 0)) { m + r } else { m }))
        }
        (op, l, r) => {
            let (l, r) = (l.as_f64(), r.as_f64());
            let value = match op {
                Token::Plus => l + r,
                Token::Minus => l - r,
                Token::Star => l * r,
                Token::DoubleSlash => (l / r).floor(),
                Token::Percent => l - r * (l / r).floor(),
                _ => return Err(format!("unsupported operator {:?}", op)),
            };
            Ok(Float(value))
        }
    }
}

fn pow(base: Number, exponent: Number) -> std::result::Result<Number, String> {
    match (base, exponent) {
        (Number::Int(b), Number::Int(e)) if e >= 0 => {
            let e = u32::try_from(e).map_err(|_| "integer overflow".to_string())?;
            b.checked_pow(e)
                .map(Number::Int)
                .ok_or_else(|| "integer overflow".to_string())
        }
        (b, e) => {
            if b.is_zero() && e.as_f64() < 0.0 {
                return Err("zero cannot be raised to a negative power".to_string());
            }
            let value = b.as_f64().powf(e.as_f64());
            if value.is_nan() {
                return Err("result is not a real number".to_string());
            }
            Ok(Number::Float(value))
        }
    }
}

/// Evaluate an arithmetic expression
pub fn evaluate(expression: &str) -> std::result::Result<Number, String> {
    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err("empty expression".to_string());
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;

    match parser.peek() {
        None => Ok(value),
        Some(token) => Err(format!("unexpected token {:?}", token)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(expr: &str) -> String {
        evaluate(expr).unwrap().to_string()
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval("2 + 3 * 4"), "14");
        assert_eq!(eval("(2 + 3) * 4"), "20");
        assert_eq!(eval("2 ** 3 ** 2"), "512");
        assert_eq!(eval("-2 ** 2"), "-4");
        assert_eq!(eval("2 ** -1"), "0.5");
    }

    #[test]
    fn test_division_semantics() {
        assert_eq!(eval("7 / 2"), "3.5");
        assert_eq!(eval("4 / 2"), "2.0");
        assert_eq!(eval("-7 // 2"), "-4");
        assert_eq!(eval("-7 % 3"), "2");
        assert_eq!(eval("7.5 % 2"), "1.5");
    }

    #[test]
    fn test_floats() {
        assert_eq!(eval("0.1 + 0.2"), "0.30000000000000004");
        assert_eq!(eval("1e3"), "1000.0");
    }

    #[test]
    fn test_errors() {
        assert_eq!(evaluate("1 / 0").unwrap_err(), "division by zero");
        assert_eq!(evaluate("").unwrap_err(), "empty expression");
        assert!(evaluate("2 +").is_err());
        assert!(evaluate("(1 + 2").is_err());
        assert!(evaluate("1 2").is_err());
        assert!(evaluate("9223372036854775807 + 1").is_err());
    }

    #[test]
    fn test_rejects_code() {
        let err = evaluate("__import__('os').system('ls')").unwrap_err();
        assert!(err.starts_with("unsupported character"), "{}", err);
    }

    #[test]
    fn test_exponent_form_outside_fixed_range() {
        assert_eq!(eval("1e16"), "1e+16");
        assert_eq!(eval("1e-5"), "1e-05");
        assert_eq!(eval("2.5e300"), "2.5e+300");
        assert_eq!(eval("2.0 ** 60"), "1.152921504606847e+18");
        assert_eq!(eval("10.0 ** 15"), "1000000000000000.0");
        assert_eq!(eval("0.0001"), "0.0001");
        assert_eq!(eval("0.0"), "0.0");
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let deep = format!("{}1{}", "(".repeat(200), ")".repeat(200));
        assert!(evaluate(&deep).is_err());
    }

    #[test]
    fn test_long_power_chain_is_rejected() {
        let chain = format!("{}1", "1**".repeat(200_000));
        assert_eq!(
            evaluate(&chain).unwrap_err(),
            "expression is nested too deeply"
        );

        let signs = format!("{}1", "-".repeat(200_000));
        assert!(evaluate(&signs).is_err());

        // Short chains still evaluate
        assert_eq!(eval(&format!("{}2", "1**".repeat(10))), "1");
    }

    #[tokio::test]
    async fn test_tool_output() {
        let ok = CalculateTool
            .execute(json!({"expression": "2 + 3 * 4"}))
            .await
            .unwrap();
        assert_eq!(ok, McpToolResult::text("Result: 14"));

        let err = CalculateTool
            .execute(json!({"expression": "1 / 0"}))
            .await
            .unwrap();
        assert_eq!(err, McpToolResult::text("Error: division by zero"));
    }
}
