//! Fact values and the loose comparison rules used by table expressions.
//!
//! Decision tables are written by people used to spreadsheet and scripting
//! semantics, so comparisons coerce between numbers, numeric strings and
//! booleans the way those tools do. Strict equality (`===`) opts out of
//! coercion.

use std::cmp::Ordering;

use serde_json::{Map, Number, Value};

/// A fact is the JSON object a rule set is evaluated against.
pub type Fact = Map<String, Value>;

/// Largest magnitude at which an integral `f64` is still rendered without a
/// fractional part.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Returns whether a value counts as true in a condition.
///
/// `false`, `null`, `0`, `NaN` and the empty string are falsy; everything
/// else (including empty arrays and objects) is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Numeric view of a value used by relational operators.
///
/// Booleans count as 0/1 and numeric strings are parsed. `null`, arrays,
/// objects and non-numeric strings have no numeric view.
pub fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Parses a numeric string. An empty (or blank) string is zero.
fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Formats a number the way a table author wrote it: integral values have no
/// fractional part (`150`, not `150.0`).
pub fn format_number(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() <= MAX_EXACT_INTEGER {
        format!("{}", f as i64)
    } else {
        format!("{}", f)
    }
}

/// Converts an arithmetic result back into a value. Integral results become
/// JSON integers and non-finite results become `null`.
pub fn number_value(f: f64) -> Value {
    if f.fract() == 0.0 && f.abs() <= MAX_EXACT_INTEGER {
        return Value::from(f as i64);
    }
    Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
}

/// Renders a value as text for string concatenation.
pub fn render(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.as_f64().map(format_number).unwrap_or_else(|| n.to_string()),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Strict equality (`===`): same type and same value. Numbers compare by
/// magnitude, so `1 === 1.0`.
pub fn strict_equals(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => lhs == rhs,
    }
}

/// Loose equality (`==`): booleans are compared as numbers and a number
/// compared against a string parses the string first.
pub fn loose_equals(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Bool(_), _) | (_, Value::Bool(_))
            if std::mem::discriminant(lhs) != std::mem::discriminant(rhs) =>
        {
            match (to_number(lhs), to_number(rhs)) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            }
        }
        (Value::Number(_), Value::String(_)) | (Value::String(_), Value::Number(_)) => {
            match (to_number(lhs), to_number(rhs)) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            }
        }
        _ => strict_equals(lhs, rhs),
    }
}

/// Orders two values for `<`, `<=`, `>` and `>=`.
///
/// Two strings compare lexicographically; anything else compares
/// numerically. Returns `None` when the values are not comparable, which
/// makes every relational operator false.
pub fn compare(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    if let (Value::String(a), Value::String(b)) = (lhs, rhs) {
        return Some(a.cmp(b));
    }
    let a = to_number(lhs)?;
    let b = to_number(rhs)?;
    a.partial_cmp(&b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!(-1)));
        assert!(is_truthy(&json!([])));
    }

    #[test]
    fn numbers_render_without_trailing_zero() {
        assert_eq!(format_number(150.0), "150");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(number_value(4.0), json!(4));
        assert_eq!(number_value(f64::INFINITY), json!(null));
    }

    #[test]
    fn loose_equality_coerces() {
        assert!(loose_equals(&json!(1), &json!("1")));
        assert!(loose_equals(&json!(true), &json!(1)));
        assert!(loose_equals(&json!("US"), &json!("US")));
        assert!(!loose_equals(&json!(null), &json!(0)));
        assert!(!loose_equals(&json!("abc"), &json!(0)));
    }

    #[test]
    fn strict_equality_does_not_coerce() {
        assert!(strict_equals(&json!(1), &json!(1.0)));
        assert!(!strict_equals(&json!(1), &json!("1")));
        assert!(!strict_equals(&json!(true), &json!(1)));
    }

    #[test]
    fn compare_strings_and_numbers() {
        assert_eq!(compare(&json!("a"), &json!("b")), Some(Ordering::Less));
        assert_eq!(compare(&json!("150"), &json!(100)), Some(Ordering::Greater));
        assert_eq!(compare(&json!(null), &json!(1)), None);
        assert_eq!(compare(&json!("x"), &json!(1)), None);
    }
}
