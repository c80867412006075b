use std::iter::Peekable;
use std::str::Chars;

use async_trait::async_trait;

use crate::domain::Tool;

/// Local arithmetic evaluator, no network
///
/// Supports + - * / % ^, parentheses and unary minus.
#[derive(Debug, Default)]
pub struct CalculatorTool;

impl CalculatorTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &'static str {
        "calculator"
    }

    fn description(&self) -> &'static str {
        "Useful for getting the result of a math expression. The input to this tool \
         should be a valid mathematical expression that could be executed by a simple calculator."
    }

    async fn invoke(&self, input: &str) -> String {
        match evaluate(input) {
            Some(value) if value.is_finite() => format!("{}", value),
            _ => "I don't know how to do that.".to_string(),
        }
    }
}

fn evaluate(input: &str) -> Option<f64> {
    let mut parser = Parser {
        chars: input.chars().peekable(),
    };

    let value = parser.expression()?;
    parser.skip_whitespace();

    // Trailing garbage means the expression was not fully understood
    if parser.chars.peek().is_some() {
        return None;
    }

    Some(value)
}

struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
}

impl Parser<'_> {
    fn skip_whitespace(&mut self) {
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn expression(&mut self) -> Option<f64> {
        let mut value = self.term()?;

        loop {
            self.skip_whitespace();
            match self.chars.peek() {
                Some('+') => {
                    self.chars.next();
                    value += self.term()?;
                }
                Some('-') => {
                    self.chars.next();
                    value -= self.term()?;
                }
                _ => return Some(value),
            }
        }
    }

    fn term(&mut self) -> Option<f64> {
        let mut value = self.power()?;

        loop {
            self.skip_whitespace();
            match self.chars.peek() {
                Some('*') => {
                    self.chars.next();
                    value *= self.power()?;
                }
                Some('/') => {
                    self.chars.next();
                    value /= self.power()?;
                }
                Some('%') => {
                    self.chars.next();
                    value %= self.power()?;
                }
                _ => return Some(value),
            }
        }
    }

    fn power(&mut self) -> Option<f64> {
        let base = self.unary()?;

        self.skip_whitespace();
        if self.chars.peek() == Some(&'^') {
            self.chars.next();
            // Right-associative
            let exponent = self.power()?;
            return Some(base.powf(exponent));
        }

        Some(base)
    }

    fn unary(&mut self) -> Option<f64> {
        self.skip_whitespace();
        if self.chars.peek() == Some(&'-') {
            self.chars.next();
            return Some(-self.unary()?);
        }

        self.primary()
    }

    fn primary(&mut self) -> Option<f64> {
        self.skip_whitespace();

        if self.chars.peek() == Some(&'(') {
            self.chars.next();
            let value = self.expression()?;
            self.skip_whitespace();
            if self.chars.next() != Some(')') {
                return None;
            }
            return Some(value);
        }

        let mut number = String::new();
        while self
            .chars
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || *c == '.')
        {
            number.push(self.chars.next()?);
        }

        number.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_basic_arithmetic() {
        let tool = CalculatorTool::new();
        assert_eq!(tool.invoke("2 + 2").await, "4");
        assert_eq!(tool.invoke("10 - 3 * 2").await, "4");
        assert_eq!(tool.invoke("(10 - 3) * 2").await, "14");
        assert_eq!(tool.invoke("7 / 2").await, "3.5");
        assert_eq!(tool.invoke("10 % 3").await, "1");
    }

    #[tokio::test]
    async fn test_powers_and_unary() {
        let tool = CalculatorTool::new();
        assert_eq!(tool.invoke("2 ^ 10").await, "1024");
        assert_eq!(tool.invoke("2 ^ 3 ^ 2").await, "512");
        assert_eq!(tool.invoke("-4 + 6").await, "2");
    }

    #[tokio::test]
    async fn test_invalid_input_never_fails() {
        let tool = CalculatorTool::new();
        assert_eq!(tool.invoke("what is love").await, "I don't know how to do that.");
        assert_eq!(tool.invoke("2 +").await, "I don't know how to do that.");
        assert_eq!(tool.invoke("(1 + 2").await, "I don't know how to do that.");
        assert_eq!(tool.invoke("1 / 0").await, "I don't know how to do that.");
    }
}
