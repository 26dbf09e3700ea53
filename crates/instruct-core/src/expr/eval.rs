use serde_json::Value;

use super::{BinaryOp, Expr, FieldPath, Stmt, UnaryOp};
use crate::value::{
    Fact, compare, is_truthy, loose_equals, number_value, render, strict_equals, to_number,
};

static NULL: Value = Value::Null;

/// Errors raised while evaluating a compiled rule against a fact.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    /// A member was read from (or assigned through) a `null` or absent value.
    #[error("missing '{path}'")]
    MissingField { path: String },

    /// An assignment tried to descend into a value that is not an object.
    #[error("cannot assign through non-object '{path}'")]
    InvalidTarget { path: String },
}

impl FieldPath {
    fn prefix(&self, len: usize) -> String {
        self.segments[..len].join(".")
    }

    /// Reads the value at this path. A missing top-level field is `null`.
    pub fn read(&self, fact: &Fact) -> Result<Value, EvalError> {
        let mut current = fact.get(&self.segments[0]).unwrap_or(&NULL);
        for (i, segment) in self.segments.iter().enumerate().skip(1) {
            current = match current {
                Value::Null => {
                    return Err(EvalError::MissingField {
                        path: self.prefix(i),
                    });
                }
                Value::Object(map) => map.get(segment).unwrap_or(&NULL),
                Value::Array(items) => segment
                    .parse::<usize>()
                    .ok()
                    .and_then(|idx| items.get(idx))
                    .unwrap_or(&NULL),
                _ => &NULL,
            };
        }
        Ok(current.clone())
    }

    /// Stores `value` at this path, creating or overwriting the last segment.
    /// Every intermediate segment must already hold an object.
    pub fn assign(&self, fact: &mut Fact, value: Value) -> Result<(), EvalError> {
        let (last, parents) = self
            .segments
            .split_last()
            .ok_or_else(|| EvalError::InvalidTarget {
                path: String::new(),
            })?;
        let mut target: &mut Fact = fact;
        for (i, segment) in parents.iter().enumerate() {
            target = match target.get_mut(segment) {
                Some(Value::Object(inner)) => inner,
                None | Some(Value::Null) => {
                    return Err(EvalError::MissingField {
                        path: self.prefix(i + 1),
                    });
                }
                Some(_) => {
                    return Err(EvalError::InvalidTarget {
                        path: self.prefix(i + 1),
                    });
                }
            };
        }
        target.insert(last.clone(), value);
        Ok(())
    }
}

impl Expr {
    /// Evaluates the expression against a fact.
    pub fn evaluate(&self, fact: &Fact) -> Result<Value, EvalError> {
        match self {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Field(path) => path.read(fact),
            Expr::Unary { op, operand } => {
                let value = operand.evaluate(fact)?;
                Ok(match op {
                    UnaryOp::Not => Value::Bool(!is_truthy(&value)),
                    UnaryOp::Neg => number_value(-arith(&value)),
                })
            }
            Expr::Binary { op, lhs, rhs } => {
                let left = lhs.evaluate(fact)?;
                // && and || short-circuit and yield an operand, not a bool.
                match op {
                    BinaryOp::And if !is_truthy(&left) => return Ok(left),
                    BinaryOp::Or if is_truthy(&left) => return Ok(left),
                    BinaryOp::And | BinaryOp::Or => return rhs.evaluate(fact),
                    _ => {}
                }
                let right = rhs.evaluate(fact)?;
                Ok(apply(*op, &left, &right))
            }
        }
    }

    /// Evaluates the expression and reduces it to a truth value.
    pub fn holds(&self, fact: &Fact) -> Result<bool, EvalError> {
        self.evaluate(fact).map(|v| is_truthy(&v))
    }
}

impl Stmt {
    /// Runs the statement, mutating the fact for assignments.
    pub fn execute(&self, fact: &mut Fact) -> Result<(), EvalError> {
        match self {
            Stmt::Assign { target, value } => {
                let value = value.evaluate(fact)?;
                target.assign(fact, value)
            }
            Stmt::Expr(expr) => expr.evaluate(fact).map(|_| ()),
        }
    }
}

/// Numeric operand for arithmetic. `null` counts as zero; values without a
/// numeric view poison the result.
fn arith(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        other => to_number(other).unwrap_or(f64::NAN),
    }
}

fn apply(op: BinaryOp, left: &Value, right: &Value) -> Value {
    use std::cmp::Ordering::{Equal, Greater, Less};

    match op {
        BinaryOp::Eq => Value::Bool(loose_equals(left, right)),
        BinaryOp::NotEq => Value::Bool(!loose_equals(left, right)),
        BinaryOp::StrictEq => Value::Bool(strict_equals(left, right)),
        BinaryOp::StrictNotEq => Value::Bool(!strict_equals(left, right)),
        BinaryOp::Lt => Value::Bool(matches!(compare(left, right), Some(Less))),
        BinaryOp::LtEq => Value::Bool(matches!(compare(left, right), Some(Less | Equal))),
        BinaryOp::Gt => Value::Bool(matches!(compare(left, right), Some(Greater))),
        BinaryOp::GtEq => Value::Bool(matches!(compare(left, right), Some(Greater | Equal))),
        BinaryOp::Add => {
            if left.is_string() || right.is_string() {
                Value::String(format!("{}{}", render(left), render(right)))
            } else {
                number_value(arith(left) + arith(right))
            }
        }
        BinaryOp::Sub => number_value(arith(left) - arith(right)),
        BinaryOp::Mul => number_value(arith(left) * arith(right)),
        BinaryOp::Div => number_value(arith(left) / arith(right)),
        BinaryOp::Rem => number_value(arith(left) % arith(right)),
        BinaryOp::And | BinaryOp::Or => unreachable!("logical operators short-circuit"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{parse_expression, parse_statements};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fact(value: Value) -> Fact {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    fn eval(source: &str, fact: &Fact) -> Result<Value, EvalError> {
        parse_expression(source).unwrap().evaluate(fact)
    }

    #[test]
    fn literal_condition_from_table() {
        let empty = Fact::new();
        assert_eq!(eval("150 > 100 && 'US' === 'US'", &empty), Ok(json!(true)));
        assert_eq!(eval("50 > 100 && 'US' === 'US'", &empty), Ok(json!(false)));
    }

    #[test]
    fn reads_fact_fields() {
        let f = fact(json!({"amount": 150, "customer": {"country": "US"}}));
        assert_eq!(
            eval("this.amount > 100 && this.customer.country == 'US'", &f),
            Ok(json!(true))
        );
        assert_eq!(eval("amount * 2", &f), Ok(json!(300)));
    }

    #[test]
    fn missing_top_level_field_is_null() {
        let f = Fact::new();
        assert_eq!(eval("this.limit", &f), Ok(json!(null)));
        assert_eq!(eval("this.limit > 1", &f), Ok(json!(false)));
    }

    #[test]
    fn member_of_missing_field_fails() {
        let f = Fact::new();
        assert_eq!(
            eval("this.customer.country", &f),
            Err(EvalError::MissingField {
                path: "customer".into()
            })
        );
    }

    #[test]
    fn logical_operators_return_operands() {
        let f = fact(json!({"name": "ann"}));
        assert_eq!(eval("this.nick || this.name", &f), Ok(json!("ann")));
        assert_eq!(eval("0 && this.missing.deep", &f), Ok(json!(0)));
        assert_eq!(eval("!this.nick", &f), Ok(json!(true)));
    }

    #[test]
    fn arithmetic_and_concatenation() {
        let f = Fact::new();
        assert_eq!(eval("'id-' + 7", &f), Ok(json!("id-7")));
        assert_eq!(eval("7 % 4 + 0.5", &f), Ok(json!(3.5)));
        assert_eq!(eval("1 / 0", &f), Ok(json!(null)));
        assert_eq!(eval("-(2 - 5)", &f), Ok(json!(3)));
    }

    #[test]
    fn statements_assign_into_fact() {
        let mut f = fact(json!({"order": {"total": 20}}));
        for stmt in parse_statements("this.approved = true; this.order.fee = this.order.total / 10")
            .unwrap()
        {
            stmt.execute(&mut f).unwrap();
        }
        assert_eq!(
            Value::Object(f),
            json!({"order": {"total": 20, "fee": 2}, "approved": true})
        );
    }

    #[test]
    fn assignment_through_missing_or_scalar_fails() {
        let mut f = fact(json!({"name": "ann"}));
        let missing = parse_statements("this.order.fee = 1").unwrap();
        assert_eq!(
            missing[0].execute(&mut f),
            Err(EvalError::MissingField {
                path: "order".into()
            })
        );
        let scalar = parse_statements("this.name.first = 'a'").unwrap();
        assert_eq!(
            scalar[0].execute(&mut f),
            Err(EvalError::InvalidTarget {
                path: "name".into()
            })
        );
    }
}
