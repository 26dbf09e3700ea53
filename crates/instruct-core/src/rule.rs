//! Compiled rules and rule sets.
//!
//! A [`CompiledRule`] is the immutable output of compiling one row of a
//! decision table. Rule sets share their rules through [`Arc`], so cloning a
//! set to hand it to another engine or thread is cheap.

use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::content_hash::compute_rules_hash;
use crate::expr::{EvalError, Expr, ExprError, Stmt, parse_expression, parse_statements};
use crate::session::Session;
use crate::value::Fact;

/// Capability interface for anything an engine can run.
///
/// `condition` must report its outcome through [`Session::gate`]; a rule that
/// never calls it is treated as not matching. `consequence` mutates the fact
/// and signals how execution continues.
pub trait Rule: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;
    fn condition(&self, session: &mut dyn Session) -> Result<(), EvalError>;
    fn consequence(&self, session: &mut dyn Session) -> Result<(), EvalError>;
}

/// A fragment that failed to parse, by its index in the input slice.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("fragment {index}: {source}")]
pub struct FragmentError {
    pub index: usize,
    pub source: ExprError,
}

fn parse_each<T>(
    fragments: &[String],
    parse: impl Fn(&str) -> Result<T, ExprError>,
) -> Result<Vec<T>, FragmentError> {
    fragments
        .iter()
        .enumerate()
        .map(|(index, f)| parse(f).map_err(|source| FragmentError { index, source }))
        .collect()
}

/// Conjunction of one term per condition column.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Terms joined with ` && `, as the table author would read them.
    pub source: String,
    pub terms: Vec<Expr>,
}

impl Condition {
    /// Parses each fragment as one term. No fragments means the condition
    /// always holds.
    pub fn parse(fragments: &[String]) -> Result<Self, FragmentError> {
        let terms = parse_each(fragments, parse_expression)?;
        Ok(Self {
            source: fragments.join(" && "),
            terms,
        })
    }

    /// True when every term is truthy. Stops at the first falsy term.
    pub fn evaluate(&self, fact: &Fact) -> Result<bool, EvalError> {
        for term in &self.terms {
            if !term.holds(fact)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

/// Statements from every consequence column, run in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Consequence {
    /// Fragments joined with newlines.
    pub source: String,
    pub statements: Vec<Stmt>,
}

impl Consequence {
    /// Parses every fragment's statements, in fragment order.
    pub fn parse(fragments: &[String]) -> Result<Self, FragmentError> {
        let statements = parse_each(fragments, parse_statements)?
            .into_iter()
            .flatten()
            .collect();
        Ok(Self {
            source: fragments.join("\n"),
            statements,
        })
    }

    pub fn apply(&self, fact: &mut Fact) -> Result<(), EvalError> {
        for stmt in &self.statements {
            stmt.execute(fact)?;
        }
        Ok(())
    }
}

impl Serialize for Consequence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

/// One decision-table row compiled into a rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledRule {
    pub name: String,
    pub condition: Condition,
    pub consequence: Consequence,
}

impl CompiledRule {
    pub fn new(name: impl Into<String>, condition: Condition, consequence: Consequence) -> Self {
        Self {
            name: name.into(),
            condition,
            consequence,
        }
    }
}

impl Rule for CompiledRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn condition(&self, session: &mut dyn Session) -> Result<(), EvalError> {
        let open = self.condition.evaluate(session.fact())?;
        session.gate(open);
        Ok(())
    }

    fn consequence(&self, session: &mut dyn Session) -> Result<(), EvalError> {
        self.consequence.apply(session.fact_mut())?;
        session.stop();
        Ok(())
    }
}

/// An ordered, immutable set of compiled rules.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: Vec<Arc<CompiledRule>>,
}

impl RuleSet {
    pub fn new(rules: Vec<CompiledRule>) -> Self {
        rules.into_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<CompiledRule>> {
        self.rules.iter()
    }

    /// Looks up a rule by name.
    pub fn get(&self, name: &str) -> Option<&Arc<CompiledRule>> {
        self.rules.iter().find(|r| r.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name.as_str()).collect()
    }

    /// SHA-256 hex digest over every rule, see [`compute_rules_hash`].
    pub fn content_hash(&self) -> String {
        compute_rules_hash(self.rules.iter().map(Arc::as_ref))
    }
}

impl FromIterator<CompiledRule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = CompiledRule>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().map(Arc::new).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Arc<CompiledRule>;
    type IntoIter = std::slice::Iter<'a, Arc<CompiledRule>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

impl Serialize for RuleSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.rules.iter().map(Arc::as_ref))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[derive(Default)]
    struct Recorder {
        fact: Fact,
        gate: Option<bool>,
        stopped: bool,
    }

    impl Session for Recorder {
        fn fact(&self) -> &Fact {
            &self.fact
        }
        fn fact_mut(&mut self) -> &mut Fact {
            &mut self.fact
        }
        fn gate(&mut self, open: bool) {
            self.gate = Some(open);
        }
        fn stop(&mut self) {
            self.stopped = true;
        }
        fn next(&mut self) {}
        fn restart(&mut self) {}
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn domestic() -> CompiledRule {
        CompiledRule::new(
            "domestic",
            Condition::parse(&strings(&["this.amount > 100", "this.country === 'US'"])).unwrap(),
            Consequence::parse(&strings(&["this.approved = true", "this.tier = 'gold'"])).unwrap(),
        )
    }

    #[test]
    fn condition_source_joins_terms() {
        let rule = domestic();
        assert_eq!(
            rule.condition.source,
            "this.amount > 100 && this.country === 'US'"
        );
        assert_eq!(rule.condition.terms.len(), 2);
        assert_eq!(rule.consequence.source, "this.approved = true\nthis.tier = 'gold'");
        assert_eq!(rule.consequence.statements.len(), 2);
    }

    #[test]
    fn empty_condition_always_holds() {
        let condition = Condition::parse(&[]).unwrap();
        assert!(condition.evaluate(&Fact::new()).unwrap());
    }

    #[test]
    fn parse_error_reports_the_fragment_index() {
        let err = Consequence::parse(&strings(&["this.a = 1", "this.b = 'open"])).unwrap_err();
        assert_eq!(err.index, 1);
        assert!(matches!(err.source, ExprError::UnterminatedString { .. }));
    }

    #[test]
    fn condition_opens_gate() {
        let rule = domestic();
        let mut session = Recorder::default();
        session.fact.insert("amount".into(), json!(150));
        session.fact.insert("country".into(), json!("US"));
        rule.condition(&mut session).unwrap();
        assert_eq!(session.gate, Some(true));

        session.fact.insert("country".into(), json!("CA"));
        rule.condition(&mut session).unwrap();
        assert_eq!(session.gate, Some(false));
    }

    #[test]
    fn consequence_mutates_then_stops() {
        let rule = domestic();
        let mut session = Recorder::default();
        rule.consequence(&mut session).unwrap();
        assert!(session.stopped);
        assert_eq!(
            serde_json::Value::Object(session.fact),
            json!({"approved": true, "tier": "gold"})
        );
    }

    #[test]
    fn rule_set_serializes_sources() {
        let set = RuleSet::new(vec![domestic()]);
        assert_eq!(
            serde_json::to_value(&set).unwrap(),
            json!([{
                "name": "domestic",
                "condition": "this.amount > 100 && this.country === 'US'",
                "consequence": "this.approved = true\nthis.tier = 'gold'",
            }])
        );
        assert_eq!(set.names(), vec!["domestic"]);
        assert!(set.get("domestic").is_some());
        assert_eq!(set.content_hash(), set.clone().content_hash());
    }
}
