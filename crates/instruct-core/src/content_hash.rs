//! Deterministic content hashing for compiled rules.
//!
//! Produces a SHA-256 hex digest over each rule's name and the source of its
//! condition and consequence, in registration order. Loading the same sheets
//! twice yields the same digest, which callers expose as an etag.

use sha2::{Digest, Sha256};

use crate::rule::CompiledRule;

/// Separator byte written between fields.
const SEP: u8 = 0;

/// Computes the content hash of a sequence of rules.
pub fn compute_rules_hash<'a>(rules: impl IntoIterator<Item = &'a CompiledRule>) -> String {
    let mut h = Sha256::new();
    for rule in rules {
        write_str(&mut h, &rule.name);
        write_str(&mut h, &rule.condition.source);
        write_str(&mut h, &rule.consequence.source);
    }
    format!("{:x}", h.finalize())
}

fn write_str(h: &mut Sha256, s: &str) {
    h.update(s.as_bytes());
    h.update([SEP]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{Condition, Consequence};

    fn rule(name: &str, condition: &str, consequence: &str) -> CompiledRule {
        CompiledRule::new(
            name,
            Condition::parse(&[condition.to_string()]).unwrap(),
            Consequence::parse(&[consequence.to_string()]).unwrap(),
        )
    }

    #[test]
    fn identical_rules_hash_identically() {
        let a = [rule("r1", "1 > 0", "this.ok = true")];
        let b = [rule("r1", "1 > 0", "this.ok = true")];
        assert_eq!(compute_rules_hash(&a), compute_rules_hash(&b));
        assert_eq!(compute_rules_hash(&a).len(), 64);
    }

    #[test]
    fn field_boundaries_matter() {
        let a = [rule("r1", "1 > 0", "true")];
        let b = [rule("r", "11 > 0", "true")];
        assert_ne!(compute_rules_hash(&a), compute_rules_hash(&b));
    }

    #[test]
    fn order_matters() {
        let x = rule("x", "true", "true");
        let y = rule("y", "true", "true");
        assert_ne!(
            compute_rules_hash([&x, &y]),
            compute_rules_hash([&y, &x])
        );
    }
}
