//! [`RuleBook`] -- the set of loaded sheets and the engine built from them.
//!
//! A new sheet is decoded and compiled completely before the book is
//! touched. Only then is the current snapshot (sheets, engine and etag)
//! replaced under the write lock, so an evaluation in flight always sees
//! one whole rule set and a sheet that fails to compile never replaces the
//! one being served.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use instruct_core::content_hash::compute_rules_hash;
use instruct_core::{Fact, RuleSet};
use instruct_table::{SheetFormat, TableSyntax, compile_table, decode_sheet, sheet_id};
use serde::Serialize;
use tracing::info;

use crate::error::{EngineError, Result};
use crate::forward::{EngineSettings, ForwardChainEngine};
use crate::traits::RuleEngine;

/// A compiled sheet as registered in a [`RuleBook`].
#[derive(Debug, Clone, Serialize)]
pub struct Sheet {
    pub id: String,
    /// The raw file contents the rules were compiled from.
    #[serde(skip)]
    pub data: Arc<[u8]>,
    pub format: SheetFormat,
    pub modified: DateTime<Utc>,
    pub rules: RuleSet,
}

/// Keys [`Decision`] writes next to the fact's own fields.
const RULES_EXECUTED_KEY: &str = "rulesExecuted";
const RULES_ETAG_KEY: &str = "rulesETag";

/// The result of [`RuleBook::decide`]: the final fact with the matched rule
/// names and the etag of the rules that produced it. Any copy of those two
/// keys already in the fact is dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    #[serde(flatten)]
    pub fact: Fact,
    pub rules_executed: Vec<String>,
    #[serde(rename = "rulesETag")]
    pub rules_etag: String,
}

/// One consistent view of the book.
#[derive(Debug)]
struct Shelf {
    sheets: BTreeMap<String, Arc<Sheet>>,
    engine: ForwardChainEngine,
    etag: String,
}

impl Shelf {
    /// Registers every sheet's rules, in sheet id order.
    fn build(sheets: BTreeMap<String, Arc<Sheet>>, settings: EngineSettings) -> Self {
        let mut engine = ForwardChainEngine::new(settings);
        for sheet in sheets.values() {
            engine.register(sheet.rules.clone());
        }
        let etag = compute_rules_hash(
            sheets
                .values()
                .flat_map(|s| s.rules.iter().map(|r| r.as_ref())),
        );
        Self {
            sheets,
            engine,
            etag,
        }
    }
}

/// Registry of compiled sheets with atomic rule-set handover.
#[derive(Debug)]
pub struct RuleBook {
    syntax: TableSyntax,
    settings: EngineSettings,
    shelf: RwLock<Arc<Shelf>>,
}

impl Default for RuleBook {
    fn default() -> Self {
        Self::new(TableSyntax::default(), EngineSettings::default())
    }
}

impl RuleBook {
    pub fn new(syntax: TableSyntax, settings: EngineSettings) -> Self {
        Self {
            syntax,
            settings,
            shelf: RwLock::new(Arc::new(Shelf::build(BTreeMap::new(), settings))),
        }
    }

    /// The current snapshot. Swaps are a single assignment, so a poisoned
    /// lock still guards a complete snapshot.
    fn snapshot(&self) -> Arc<Shelf> {
        self.shelf
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn swap(&self, update: impl FnOnce(&mut BTreeMap<String, Arc<Sheet>>)) {
        let mut guard = self.shelf.write().unwrap_or_else(PoisonError::into_inner);
        let mut sheets = guard.sheets.clone();
        update(&mut sheets);
        *guard = Arc::new(Shelf::build(sheets, self.settings));
    }

    /// Compiles `data` and registers it as sheet `id`, replacing any sheet
    /// with the same id. On error the book is left unchanged.
    pub fn load(&self, id: &str, data: Vec<u8>, format: SheetFormat) -> Result<Arc<Sheet>> {
        self.load_at(id, data, format, Utc::now())
    }

    /// Reads a sheet file and registers it under its file stem.
    pub fn load_file(&self, path: &Path) -> Result<Arc<Sheet>> {
        let format = SheetFormat::from_path(path)?;
        let data = std::fs::read(path).map_err(instruct_table::TableError::from)?;
        let modified = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());
        self.load_at(&sheet_id(path), data, format, modified)
    }

    fn load_at(
        &self,
        id: &str,
        data: Vec<u8>,
        format: SheetFormat,
        modified: DateTime<Utc>,
    ) -> Result<Arc<Sheet>> {
        let grid = decode_sheet(&data, format)?;
        let rules = compile_table(&grid, &self.syntax)?;
        let sheet = Arc::new(Sheet {
            id: id.to_string(),
            data: data.into(),
            format,
            modified,
            rules,
        });

        let registered = Arc::clone(&sheet);
        self.swap(move |sheets| {
            sheets.insert(registered.id.clone(), registered);
        });
        info!(sheet = id, rules = sheet.rules.len(), "sheet loaded");
        Ok(sheet)
    }

    /// Unregisters a sheet. Returns `false` if it was not loaded.
    pub fn remove(&self, id: &str) -> bool {
        if !self.snapshot().sheets.contains_key(id) {
            return false;
        }
        self.swap(|sheets| {
            sheets.remove(id);
        });
        true
    }

    pub fn sheet_ids(&self) -> Vec<String> {
        self.snapshot().sheets.keys().cloned().collect()
    }

    pub fn sheet(&self, id: &str) -> Option<Arc<Sheet>> {
        self.snapshot().sheets.get(id).cloned()
    }

    /// SHA-256 hex digest over every registered rule.
    pub fn etag(&self) -> String {
        self.snapshot().etag.clone()
    }

    pub fn rule_count(&self) -> usize {
        self.snapshot().engine.len()
    }

    /// Runs `fact` through every registered rule.
    pub fn decide(&self, fact: Fact) -> Result<Decision> {
        let shelf = self.snapshot();
        let mut execution = shelf.engine.execute(fact)?;
        execution.fact.shift_remove(RULES_EXECUTED_KEY);
        execution.fact.shift_remove(RULES_ETAG_KEY);
        Ok(Decision {
            fact: execution.fact,
            rules_executed: execution.match_path,
            rules_etag: shelf.etag.clone(),
        })
    }

    /// Like [`RuleBook::decide`] for an arbitrary JSON value, which must be an
    /// object.
    pub fn decide_value(&self, fact: serde_json::Value) -> Result<Decision> {
        match fact {
            serde_json::Value::Object(map) => self.decide(map),
            other => Err(EngineError::InvalidFact {
                found: json_type(&other),
            }),
        }
    }
}

fn json_type(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use instruct_table::ErrorKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const LOAN: &str = "\
,amount,country,,approved
BINDING,this.amount > $value,this.country === $value,,this.approved = $value
domestic,100,'US',,TRUE
fallback,,,,FALSE
";

    const BROKEN: &str = "\
,amount,country
BINDING,this.amount > $value
";

    fn book() -> RuleBook {
        let book = RuleBook::default();
        book.load("loan", LOAN.as_bytes().to_vec(), SheetFormat::Csv)
            .unwrap();
        book
    }

    #[test]
    fn decide_merges_path_and_etag() {
        let book = book();
        let decision = book
            .decide_value(json!({"amount": 150, "country": "US"}))
            .unwrap();
        assert_eq!(decision.rules_executed, ["domestic"]);
        assert_eq!(decision.rules_etag, book.etag());
        assert_eq!(
            serde_json::to_value(&decision).unwrap(),
            json!({
                "amount": 150,
                "country": "US",
                "approved": true,
                "rulesExecuted": ["domestic"],
                "rulesETag": book.etag(),
            })
        );
    }

    #[test]
    fn stale_decision_keys_in_the_fact_are_replaced() {
        let book = book();
        let decision = book
            .decide_value(json!({
                "amount": 150,
                "rulesExecuted": ["stale"],
                "rulesETag": "old",
                "country": "US",
            }))
            .unwrap();
        let text = serde_json::to_string(&decision).unwrap();
        assert_eq!(text.matches("\"rulesExecuted\"").count(), 1, "{text}");
        assert_eq!(text.matches("\"rulesETag\"").count(), 1, "{text}");
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&text).unwrap(),
            json!({
                "amount": 150,
                "country": "US",
                "approved": true,
                "rulesExecuted": ["domestic"],
                "rulesETag": book.etag(),
            })
        );
    }

    #[test]
    fn deeply_nested_cell_fails_the_load_only() {
        let book = book();
        let etag = book.etag();
        let depth = 100_000;
        let nested = format!(
            ",amount,,approved\nBINDING,this.amount > $value,,this.approved = $value\ndeep,{}1{},,TRUE\n",
            "(".repeat(depth),
            ")".repeat(depth)
        );
        let err = book
            .load("loan", nested.into_bytes(), SheetFormat::Csv)
            .unwrap_err();
        assert_eq!(err.table_kind(), Some(ErrorKind::Expression));
        assert_eq!(book.etag(), etag);
        assert_eq!(book.sheet("loan").unwrap().rules.len(), 2);
    }

    #[test]
    fn fallback_rule_applies() {
        let decision = book().decide_value(json!({"amount": 10})).unwrap();
        assert_eq!(decision.rules_executed, ["fallback"]);
        assert_eq!(decision.fact["approved"], json!(false));
    }

    #[test]
    fn failed_load_keeps_previous_rules() {
        let book = book();
        let etag = book.etag();
        let err = book
            .load("loan", BROKEN.as_bytes().to_vec(), SheetFormat::Csv)
            .unwrap_err();
        assert_eq!(err.table_kind(), Some(ErrorKind::Layout));
        assert_eq!(book.etag(), etag);
        assert_eq!(book.sheet("loan").unwrap().rules.len(), 2);
    }

    #[test]
    fn etag_is_stable_across_identical_loads() {
        let a = book();
        let b = book();
        assert_eq!(a.etag(), b.etag());
        b.load("loan", LOAN.as_bytes().to_vec(), SheetFormat::Csv)
            .unwrap();
        assert_eq!(a.etag(), b.etag());
        assert_ne!(a.etag(), RuleBook::default().etag());
    }

    #[test]
    fn sheets_register_in_id_order_and_can_be_removed() {
        let book = book();
        book.load("aaa", LOAN.replace("domestic", "early").into_bytes(), SheetFormat::Csv)
            .unwrap();
        assert_eq!(book.sheet_ids(), ["aaa", "loan"]);
        assert_eq!(book.rule_count(), 4);

        let decision = book
            .decide_value(json!({"amount": 150, "country": "US"}))
            .unwrap();
        assert_eq!(decision.rules_executed, ["early"]);

        assert!(book.remove("aaa"));
        assert!(!book.remove("aaa"));
        assert_eq!(book.sheet_ids(), ["loan"]);
    }

    #[test]
    fn non_object_fact_is_rejected() {
        let err = book().decide_value(json!([1, 2])).unwrap_err();
        assert!(matches!(err, EngineError::InvalidFact { found: "array" }));
    }

    #[test]
    fn load_file_uses_stem_as_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pricing.csv");
        std::fs::write(&path, LOAN).unwrap();
        let book = RuleBook::default();
        let sheet = book.load_file(&path).unwrap();
        assert_eq!(sheet.id, "pricing");
        assert_eq!(sheet.format, SheetFormat::Csv);
        assert_eq!(&*sheet.data, LOAN.as_bytes());
    }

    #[test]
    fn concurrent_decisions_see_whole_rule_sets() {
        let book = Arc::new(book());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let book = Arc::clone(&book);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        let d = book
                            .decide_value(json!({"amount": 150, "country": "US"}))
                            .unwrap();
                        assert_eq!(d.rules_executed.len(), 1);
                    }
                })
            })
            .collect();
        for _ in 0..10 {
            book.load("loan", LOAN.as_bytes().to_vec(), SheetFormat::Csv)
                .unwrap();
        }
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
