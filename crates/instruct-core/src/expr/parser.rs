//! Precedence-climbing parser producing [`Expr`] and [`Stmt`] trees.

use serde_json::Value;

use super::lexer::{Spanned, Token, tokenize};
use super::{BinaryOp, Expr, ExprError, FieldPath, Stmt, UnaryOp};
use crate::value::number_value;

/// Deepest nesting of parentheses, prefix operators and chained infix
/// operators a fragment may use.
pub const MAX_DEPTH: usize = 256;

/// Parse a condition fragment into a single expression.
///
/// Line breaks are insignificant inside an expression.
pub fn parse_expression(source: &str) -> Result<Expr, ExprError> {
    let tokens: Vec<Spanned> = tokenize(source)?
        .into_iter()
        .filter(|t| t.token != Token::Newline)
        .collect();
    if tokens.is_empty() {
        return Err(ExprError::Empty);
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.expression()?;
    parser.expect_end()?;
    Ok(expr)
}

/// Parse a consequence fragment into statements separated by `;` or line
/// breaks. A blank fragment yields no statements.
pub fn parse_statements(source: &str) -> Result<Vec<Stmt>, ExprError> {
    let mut parser = Parser {
        tokens: tokenize(source)?,
        pos: 0,
        depth: 0,
    };
    let mut statements = Vec::new();
    loop {
        parser.skip_separators();
        if parser.at_end() {
            break;
        }
        statements.push(parser.statement()?);
        match parser.peek() {
            None | Some(Token::Semi) | Some(Token::Newline) => {}
            Some(_) => return Err(parser.unexpected("';' or end of statement")),
        }
    }
    Ok(statements)
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(0, |t| t.offset)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|t| t.token.clone());
        self.pos += 1;
        token
    }

    fn skip_separators(&mut self) {
        while matches!(self.peek(), Some(Token::Semi) | Some(Token::Newline)) {
            self.pos += 1;
        }
    }

    fn unexpected(&self, expected: &'static str) -> ExprError {
        match self.tokens.get(self.pos) {
            Some(spanned) => ExprError::Unexpected {
                found: spanned.token.to_string(),
                expected,
                offset: spanned.offset,
            },
            None => ExprError::UnexpectedEnd { expected },
        }
    }

    /// Enters one nesting level. Callers leave it with `self.depth -= 1`.
    fn descend(&mut self) -> Result<(), ExprError> {
        if self.depth >= MAX_DEPTH {
            return Err(ExprError::TooDeep {
                offset: self.offset(),
                limit: MAX_DEPTH,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn expect_end(&self) -> Result<(), ExprError> {
        if self.at_end() {
            Ok(())
        } else {
            Err(self.unexpected("end of expression"))
        }
    }

    fn statement(&mut self) -> Result<Stmt, ExprError> {
        let start = self.offset();
        let expr = self.expression()?;
        if self.peek() != Some(&Token::Assign) {
            return Ok(Stmt::Expr(expr));
        }
        let Expr::Field(target) = expr else {
            return Err(ExprError::InvalidTarget { offset: start });
        };
        self.pos += 1;
        let value = self.expression()?;
        Ok(Stmt::Assign { target, value })
    }

    fn expression(&mut self) -> Result<Expr, ExprError> {
        self.descend()?;
        let expr = self.binary(1)?;
        self.depth -= 1;
        Ok(expr)
    }

    fn binary(&mut self, min_precedence: u8) -> Result<Expr, ExprError> {
        let mut lhs = self.unary()?;
        // Each fold deepens the left spine of the tree.
        let mut folds = 0;
        loop {
            let op = match self.peek() {
                Some(Token::Symbol(symbol)) => match BinaryOp::from_symbol(symbol) {
                    Some(op) => op,
                    None => break,
                },
                _ => break,
            };
            if op.precedence() < min_precedence {
                break;
            }
            self.descend()?;
            folds += 1;
            self.pos += 1;
            let rhs = self.binary(op.precedence() + 1)?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        self.depth -= folds;
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, ExprError> {
        let op = match self.peek() {
            Some(Token::Symbol("!")) => UnaryOp::Not,
            Some(Token::Symbol("-")) => UnaryOp::Neg,
            _ => return self.primary(),
        };
        self.descend()?;
        self.pos += 1;
        let operand = self.unary()?;
        self.depth -= 1;
        // Fold negative number literals so `-3` stays a literal.
        if let (UnaryOp::Neg, Expr::Literal(Value::Number(n))) = (op, &operand) {
            if let Some(f) = n.as_f64() {
                return Ok(Expr::Literal(number_value(-f)));
            }
        }
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn primary(&mut self) -> Result<Expr, ExprError> {
        let offset = self.offset();
        let Some(token) = self.advance() else {
            return Err(ExprError::UnexpectedEnd {
                expected: "an expression",
            });
        };
        match token {
            Token::Number(n) => Ok(Expr::Literal(number_value(n))),
            Token::Str(s) => Ok(Expr::Literal(Value::String(s))),
            Token::LParen => {
                let inner = self.expression()?;
                if self.peek() != Some(&Token::RParen) {
                    return Err(self.unexpected("')'"));
                }
                self.pos += 1;
                Ok(inner)
            }
            Token::Ident(ident) => match ident.as_str() {
                "true" => Ok(Expr::Literal(Value::Bool(true))),
                "false" => Ok(Expr::Literal(Value::Bool(false))),
                "null" | "undefined" => Ok(Expr::Literal(Value::Null)),
                "this" => {
                    let segments = self.members()?;
                    if segments.is_empty() {
                        return Err(self.unexpected("'.' after 'this'"));
                    }
                    Ok(Expr::Field(FieldPath::new(segments)))
                }
                _ => {
                    let mut segments = vec![ident];
                    segments.extend(self.members()?);
                    Ok(Expr::Field(FieldPath::new(segments)))
                }
            },
            other => {
                self.pos -= 1;
                Err(ExprError::Unexpected {
                    found: other.to_string(),
                    expected: "an expression",
                    offset,
                })
            }
        }
    }

    /// Member accesses following a path head: `.name` or `['name']`.
    fn members(&mut self) -> Result<Vec<String>, ExprError> {
        let mut segments = Vec::new();
        loop {
            match self.peek() {
                Some(Token::Dot) => {
                    self.pos += 1;
                    match self.advance() {
                        Some(Token::Ident(name)) => segments.push(name),
                        _ => {
                            self.pos -= 1;
                            return Err(self.unexpected("a field name after '.'"));
                        }
                    }
                }
                Some(Token::LBracket) => {
                    self.pos += 1;
                    let key = match self.advance() {
                        Some(Token::Str(key)) => key,
                        Some(Token::Number(n)) if n.fract() == 0.0 && n >= 0.0 => {
                            format!("{}", n as u64)
                        }
                        _ => {
                            self.pos -= 1;
                            return Err(self.unexpected("a string or index inside '[]'"));
                        }
                    };
                    if self.peek() != Some(&Token::RBracket) {
                        return Err(self.unexpected("']'"));
                    }
                    self.pos += 1;
                    segments.push(key);
                }
                _ => return Ok(segments),
            }
        }
    }
}
