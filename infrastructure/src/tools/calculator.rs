//! Arithmetic calculator tool
//!
//! A small recursive-descent evaluator over `+ - * / % ^`, parentheses and
//! unary minus. No variables, no functions. Syntax errors and division by
//! zero come back as execution failures so the model can see what went
//! wrong and correct the expression.

use agora_application::ports::tool_executor::ToolContext;
use agora_domain::tool::{ToolCall, ToolDefinition, ToolError, ToolParameter};

use super::registry::DebateTool;

pub const CALCULATOR: &str = "calculator";

/// Tool definition for the calculator
pub fn calculator_definition() -> ToolDefinition {
    ToolDefinition::new(
        CALCULATOR,
        "Evaluate an arithmetic expression. Supports + - * / % ^, parentheses and unary minus.",
    )
    .with_parameter(ToolParameter::new(
        "expression",
        "The expression to evaluate, e.g. \"(120*12)/4\"",
        true,
    ))
}

pub struct Calculator;

impl DebateTool for Calculator {
    fn definition(&self) -> ToolDefinition {
        calculator_definition()
    }

    fn execute(&self, call: &ToolCall, _context: &ToolContext) -> Result<String, ToolError> {
        let expression = call
            .require_str("expression")
            .map_err(ToolError::invalid_argument)?;
        let value = evaluate(expression).map_err(ToolError::execution_failed)?;
        Ok(format_number(value))
    }
}

/// Evaluate an expression to a finite number.
///
/// Grammar, loosest binding first:
///
/// ```text
/// expression := term (('+' | '-') term)*
/// term       := unary (('*' | '/' | '%') unary)*
/// unary      := '-' unary | power
/// power      := atom ('^' unary)?          right-associative
/// atom       := number | '(' expression ')'
/// ```
pub fn evaluate(input: &str) -> Result<f64, String> {
    let mut parser = Parser {
        input: input.as_bytes(),
        pos: 0,
    };
    let value = parser.expression()?;
    parser.skip_whitespace();
    if parser.pos < parser.input.len() {
        return Err(format!(
            "Unexpected character '{}' at position {}",
            parser.input[parser.pos] as char, parser.pos
        ));
    }
    if !value.is_finite() {
        return Err("result is not a finite number".to_string());
    }
    Ok(value)
}

/// Whole numbers render without a decimal point; everything else is
/// rounded to six places with trailing zeros stripped.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let rendered = format!("{value:.6}");
        rendered
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn skip_whitespace(&mut self) {
        while self.pos < self.input.len() && self.input[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    /// Next non-whitespace byte without consuming it
    fn peek(&mut self) -> Option<u8> {
        self.skip_whitespace();
        self.input.get(self.pos).copied()
    }

    fn expression(&mut self) -> Result<f64, String> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(b'+') => {
                    self.pos += 1;
                    value += self.term()?;
                }
                Some(b'-') => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> Result<f64, String> {
        let mut value = self.unary()?;
        loop {
            match self.peek() {
                Some(b'*') => {
                    self.pos += 1;
                    value *= self.unary()?;
                }
                Some(b'/') => {
                    self.pos += 1;
                    let divisor = self.unary()?;
                    if divisor == 0.0 {
                        return Err("division by zero".to_string());
                    }
                    value /= divisor;
                }
                Some(b'%') => {
                    self.pos += 1;
                    let divisor = self.unary()?;
                    if divisor == 0.0 {
                        return Err("division by zero".to_string());
                    }
                    value %= divisor;
                }
                _ => return Ok(value),
            }
        }
    }

    // Unary minus binds tighter than '*' but looser than '^',
    // so -2^2 is -(2^2) and 2^-3 parses.
    fn unary(&mut self) -> Result<f64, String> {
        if self.peek() == Some(b'-') {
            self.pos += 1;
            return Ok(-self.unary()?);
        }
        self.power()
    }

    fn power(&mut self) -> Result<f64, String> {
        let base = self.atom()?;
        if self.peek() == Some(b'^') {
            self.pos += 1;
            let exponent = self.unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<f64, String> {
        match self.peek() {
            Some(b'(') => {
                self.pos += 1;
                let value = self.expression()?;
                if self.peek() == Some(b')') {
                    self.pos += 1;
                    Ok(value)
                } else {
                    Err("missing closing parenthesis".to_string())
                }
            }
            Some(c) if c.is_ascii_digit() || c == b'.' => self.number(),
            Some(c) => Err(format!(
                "Unexpected character '{}' at position {}",
                c as char, self.pos
            )),
            None => Err("unexpected end of expression".to_string()),
        }
    }

    fn number(&mut self) -> Result<f64, String> {
        let start = self.pos;
        while self.pos < self.input.len()
            && (self.input[self.pos].is_ascii_digit() || self.input[self.pos] == b'.')
        {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| "invalid number".to_string())?;
        text.parse::<f64>()
            .map_err(|_| format!("invalid number \"{text}\""))
    }
}

// ==================== Calculator Tests ====================
