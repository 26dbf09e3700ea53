//! [`ForwardChainEngine`] -- runs rules in registration order.

use std::sync::Arc;

use instruct_core::{Fact, Rule, RuleSet, Session};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{EngineError, Result};
use crate::traits::{Execution, RuleEngine};

/// Tuning knobs for [`ForwardChainEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct EngineSettings {
    /// When `false`, a consequence that changes the fact restarts execution
    /// from the first rule.
    pub ignore_fact_changes: bool,
    /// Upper bound on restarts within one execution.
    pub max_restarts: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            ignore_fact_changes: true,
            max_restarts: 64,
        }
    }
}

/// How execution continues after a consequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Next,
    Stop,
    Restart,
}

/// The session handed to each rule during one execution.
struct ExecutionSession {
    fact: Fact,
    gate: Option<bool>,
    flow: Flow,
}

impl Session for ExecutionSession {
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
        self.flow = Flow::Stop;
    }

    fn next(&mut self) {
        self.flow = Flow::Next;
    }

    fn restart(&mut self) {
        self.flow = Flow::Restart;
    }
}

/// Evaluates each rule's condition in order; a matching rule's consequence
/// decides whether execution stops, continues or restarts.
#[derive(Debug, Clone, Default)]
pub struct ForwardChainEngine {
    rules: Vec<Arc<dyn Rule>>,
    settings: EngineSettings,
}

impl ForwardChainEngine {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            rules: Vec::new(),
            settings,
        }
    }

    /// Appends a single rule.
    pub fn register_rule(&mut self, rule: Arc<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn settings(&self) -> EngineSettings {
        self.settings
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl RuleEngine for ForwardChainEngine {
    fn register(&mut self, rules: RuleSet) {
        for rule in &rules {
            self.rules.push(rule.clone());
        }
    }

    fn execute(&self, fact: Fact) -> Result<Execution> {
        let mut session = ExecutionSession {
            fact,
            gate: None,
            flow: Flow::Next,
        };
        let mut match_path = Vec::new();
        let mut restarts = 0u32;
        let mut index = 0;

        while let Some(rule) = self.rules.get(index) {
            session.gate = None;
            rule.condition(&mut session)
                .map_err(|e| EngineError::eval(rule.name(), e))?;
            if session.gate != Some(true) {
                trace!(rule = rule.name(), "condition closed");
                index += 1;
                continue;
            }

            debug!(rule = rule.name(), "rule matched");
            match_path.push(rule.name().to_string());
            let before = (!self.settings.ignore_fact_changes).then(|| session.fact.clone());
            session.flow = Flow::Next;
            rule.consequence(&mut session)
                .map_err(|e| EngineError::eval(rule.name(), e))?;

            let restart = match session.flow {
                Flow::Stop => break,
                Flow::Restart => true,
                Flow::Next => before.is_some_and(|b| b != session.fact),
            };
            if restart {
                restarts += 1;
                if restarts > self.settings.max_restarts {
                    return Err(EngineError::RestartLimit {
                        limit: self.settings.max_restarts,
                    });
                }
                index = 0;
            } else {
                index += 1;
            }
        }

        Ok(Execution {
            fact: session.fact,
            match_path,
        })
    }
}
