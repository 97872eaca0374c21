//! Turns a normalized expression string into a symbolic [`Expr`].
//!
//! This is a recursive-descent parser over a fixed grammar: numbers,
//! variables, `+ - * / ^`, parentheses, and a closed allowlist of function
//! names (`sin`, `cos`, `tan`/`tg`, `exp`, `log`/`ln`, `sqrt`) plus the
//! constants `pi` and `e`. Nothing outside the grammar is reachable from a
//! user-entered string, so there is no dynamic-evaluation surface to guard.
//!
//! `^` is right-associative; unary minus binds looser than `^`, so `-x^2`
//! parses as `-(x^2)`.
//!
//! # Example
//! ```
//! use diffsolve::symbolic::parse_expr::parse_expression;
//! let f = parse_expression("x^2 + sin(x)*y").unwrap();
//! let func = f.lambdify_xy();
//! assert!((func(2.0, 3.0) - (4.0 + 2.0_f64.sin() * 3.0)).abs() < 1e-12);
//! ```

use crate::symbolic::symbolic_engine::Expr;
use std::f64::consts::{E, PI};

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '^' => {
                tokens.push(Token::Caret);
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
            _ if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let value = text
                    .parse::<f64>()
                    .map_err(|_| format!("invalid number '{}'", text))?;
                tokens.push(Token::Number(value));
            }
            _ if c.is_ascii_alphabetic() => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_alphanumeric() {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            _ => return Err(format!("unexpected character '{}'", c)),
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
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, expected: Token) -> Result<(), String> {
        match self.next() {
            Some(tok) if tok == expected => Ok(()),
            Some(tok) => Err(format!("expected {:?}, found {:?}", expected, tok)),
            None => Err(format!("expected {:?}, found end of input", expected)),
        }
    }

    // expr := term (('+' | '-') term)*
    fn parse_expr(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_term()?;
        while let Some(op) = self.peek().cloned() {
            match op {
                Token::Plus => {
                    self.next();
                    let rhs = self.parse_term()?;
                    lhs = Expr::Add(lhs.boxed(), rhs.boxed());
                }
                Token::Minus => {
                    self.next();
                    let rhs = self.parse_term()?;
                    lhs = Expr::Sub(lhs.boxed(), rhs.boxed());
                }
                _ => break,
            }
        }
        Ok(lhs)
    }

    // term := unary (('*' | '/') unary)*
    fn parse_term(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_unary()?;
        while let Some(op) = self.peek().cloned() {
            match op {
                Token::Star => {
                    self.next();
                    let rhs = self.parse_unary()?;
                    lhs = Expr::Mul(lhs.boxed(), rhs.boxed());
                }
                Token::Slash => {
                    self.next();
                    let rhs = self.parse_unary()?;
                    lhs = Expr::Div(lhs.boxed(), rhs.boxed());
                }
                _ => break,
            }
        }
        Ok(lhs)
    }

    // unary := '-' unary | power
    fn parse_unary(&mut self) -> Result<Expr, String> {
        if self.peek() == Some(&Token::Minus) {
            self.next();
            let inner = self.parse_unary()?;
            return Ok(Expr::Mul(
                Box::new(Expr::Const(-1.0)),
                Box::new(inner),
            ));
        }
        self.parse_power()
    }

    // power := atom ('^' unary)?   right-associative through recursion
    fn parse_power(&mut self) -> Result<Expr, String> {
        let base = self.parse_atom()?;
        if self.peek() == Some(&Token::Caret) {
            self.next();
            let exponent = self.parse_unary_power()?;
            return Ok(Expr::Pow(base.boxed(), exponent.boxed()));
        }
        Ok(base)
    }

    // exponent position: allow a leading sign without consuming a whole term
    fn parse_unary_power(&mut self) -> Result<Expr, String> {
        if self.peek() == Some(&Token::Minus) {
            self.next();
            let inner = self.parse_power()?;
            return Ok(Expr::Mul(
                Box::new(Expr::Const(-1.0)),
                Box::new(inner),
            ));
        }
        self.parse_power()
    }

    fn parse_atom(&mut self) -> Result<Expr, String> {
        match self.next() {
            Some(Token::Number(value)) => Ok(Expr::Const(value)),
            Some(Token::LParen) => {
                let inner = self.parse_expr()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => {
                if self.peek() == Some(&Token::LParen) {
                    self.next();
                    let arg = self.parse_expr()?;
                    self.expect(Token::RParen)?;
                    return match name.as_str() {
                        "sin" => Ok(Expr::sin(arg.boxed())),
                        "cos" => Ok(Expr::cos(arg.boxed())),
                        "tan" | "tg" => Ok(Expr::tg(arg.boxed())),
                        "exp" => Ok(Expr::Exp(arg.boxed())),
                        "log" | "ln" => Ok(Expr::Ln(arg.boxed())),
                        "sqrt" => Ok(Expr::Pow(
                            arg.boxed(),
                            Box::new(Expr::Div(
                                Box::new(Expr::Const(1.0)),
                                Box::new(Expr::Const(2.0)),
                            )),
                        )),
                        _ => Err(format!("unknown function '{}'", name)),
                    };
                }
                match name.as_str() {
                    "pi" => Ok(Expr::Const(PI)),
                    "e" => Ok(Expr::Const(E)),
                    _ => Ok(Expr::Var(name)),
                }
            }
            Some(tok) => Err(format!("unexpected token {:?}", tok)),
            None => Err("unexpected end of input".to_string()),
        }
    }
}

/// Parses a normalized expression string into a symbolic expression.
pub fn parse_expression(input: &str) -> Result<Expr, String> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err("empty expression".to_string());
    }
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_expr()?;
    if parser.pos != parser.tokens.len() {
        return Err(format!(
            "trailing input after position {}",
            parser.pos
        ));
    }
    Ok(expr)
}

impl Expr {
    /// Parses an expression string, panicking on malformed input.
    /// Convenience for tests and examples; solver code goes through
    /// [`parse_expression`] and keeps the error.
    pub fn parse_expression_unchecked(input: &str) -> Expr {
        parse_expression(input).expect("malformed expression")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_constant() {
        let expr = parse_expression("42").unwrap();
        assert_eq!(expr, Expr::Const(42.0));
    }

    #[test]
    fn test_parse_variable() {
        let expr = parse_expression("x").unwrap();
        assert_eq!(expr, Expr::Var("x".to_string()));
    }

    #[test]
    fn test_parse_addition() {
        let expr = parse_expression("x + 2").unwrap();
        assert_eq!(
            expr,
            Expr::Add(
                Box::new(Expr::Var("x".to_string())),
                Box::new(Expr::Const(2.0))
            )
        );
    }

    #[test]
    fn test_parse_power() {
        let expr = parse_expression("x^2").unwrap();
        assert_eq!(
            expr,
            Expr::Pow(
                Box::new(Expr::Var("x".to_string())),
                Box::new(Expr::Const(2.0))
            )
        );
    }

    #[test]
    fn test_power_right_associative() {
        // 2^3^2 = 2^(3^2) = 512
        let expr = parse_expression("2^3^2").unwrap();
        assert_eq!(expr.as_constant(), Some(512.0));
    }

    #[test]
    fn test_precedence_mul_over_add() {
        let expr = parse_expression("1 + 2*3").unwrap();
        assert_eq!(expr.as_constant(), Some(7.0));
    }

    #[test]
    fn test_unary_minus() {
        let expr = parse_expression("-x^2").unwrap();
        let f = expr.lambdify1D();
        assert_eq!(f(3.0), -9.0);
    }

    #[test]
    fn test_parse_sqrt_as_rational_power() {
        let expr = parse_expression("sqrt(y)").unwrap();
        assert_eq!(
            expr,
            Expr::Pow(
                Box::new(Expr::Var("y".to_string())),
                Box::new(Expr::Div(
                    Box::new(Expr::Const(1.0)),
                    Box::new(Expr::Const(2.0))
                ))
            )
        );
    }

    #[test]
    fn test_parse_named_constants() {
        let expr = parse_expression("2*pi + e").unwrap();
        let value = expr.as_constant().unwrap();
        assert!((value - (2.0 * std::f64::consts::PI + std::f64::consts::E)).abs() < 1e-12);
    }

    #[test]
    fn test_function_allowlist_enforced() {
        assert!(parse_expression("system(x)").is_err());
        assert!(parse_expression("eval(x)").is_err());
    }

    #[test]
    fn test_tan_alias() {
        let expr = parse_expression("tan(x)").unwrap();
        assert_eq!(expr, Expr::tg(Box::new(Expr::Var("x".to_string()))));
    }

    #[test]
    fn test_unmatched_brackets() {
        assert!(parse_expression("(x + y").is_err());
    }

    #[test]
    fn test_trailing_garbage() {
        assert!(parse_expression("x + 2 3").is_err());
    }

    #[test]
    fn test_parse_nested_functions() {
        let expr = parse_expression("sin(cos(x))").unwrap();
        assert_eq!(
            expr,
            Expr::sin(Box::new(Expr::cos(Box::new(Expr::Var("x".to_string())))))
        );
    }
}
