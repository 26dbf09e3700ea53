//! Compile rule records into executable rules.
//!
//! For each record, every cell value is substituted into its column's
//! binding template and the resulting fragment is parsed. Condition
//! fragments become the terms of a conjunction; consequence fragments
//! become statements run in column order.

use std::collections::BTreeMap;
use std::path::Path;

use instruct_core::{CompiledRule, Condition, Consequence, FragmentError, RuleSet};
use tracing::{debug, info};

use crate::grid::Grid;
use crate::layout::detect_layout;
use crate::rows::{RuleRecord, extract_rules};
use crate::sheet::load_sheet;
use crate::types::{Result, TableError, TableSyntax};

/// Replaces the first occurrence of `placeholder` in `template` with `value`.
/// Later occurrences are left untouched.
pub fn substitute(template: &str, placeholder: &str, value: &str) -> String {
    template.replacen(placeholder, value, 1)
}

/// Substitutes every cell of one side of a record, in ascending column order.
fn fragments(
    rule: &str,
    cells: &BTreeMap<u32, String>,
    bindings: &BTreeMap<u32, String>,
    placeholder: &str,
) -> Result<Vec<(u32, String)>> {
    cells
        .iter()
        .map(|(&column, value)| -> Result<(u32, String)> {
            let template = bindings
                .get(&column)
                .ok_or_else(|| TableError::missing_binding(rule, column))?;
            Ok((column, substitute(template, placeholder, value)))
        })
        .collect()
}

/// Substitutes one side of a record and parses it with `parse`, naming the
/// offending column when a fragment is malformed.
fn build<T>(
    rule: &str,
    cells: &BTreeMap<u32, String>,
    bindings: &BTreeMap<u32, String>,
    placeholder: &str,
    parse: impl FnOnce(&[String]) -> std::result::Result<T, FragmentError>,
) -> Result<T> {
    let (columns, texts): (Vec<u32>, Vec<String>) =
        fragments(rule, cells, bindings, placeholder)?.into_iter().unzip();
    parse(&texts).map_err(|e| TableError::Expression {
        rule: rule.to_string(),
        column: columns[e.index],
        fragment: texts[e.index].clone(),
        source: e.source,
    })
}

fn compile_record(
    name: &str,
    record: &RuleRecord,
    bindings: &BTreeMap<u32, String>,
    syntax: &TableSyntax,
) -> Result<CompiledRule> {
    let placeholder = &syntax.placeholder;
    let condition = build(name, &record.conditions, bindings, placeholder, Condition::parse)?;
    let consequence = build(name, &record.consequences, bindings, placeholder, Consequence::parse)?;
    debug!(rule = name, condition = %condition.source, "compiled rule");
    Ok(CompiledRule::new(name, condition, consequence))
}

/// Compiles rule records against the binding templates, preserving record
/// order. Any missing binding or malformed fragment fails the whole set.
pub fn compile_rules<'a>(
    bindings: &BTreeMap<u32, String>,
    records: impl IntoIterator<Item = (&'a str, &'a RuleRecord)>,
    syntax: &TableSyntax,
) -> Result<RuleSet> {
    records
        .into_iter()
        .map(|(name, record)| compile_record(name, record, bindings, syntax))
        .collect::<Result<Vec<_>>>()
        .map(RuleSet::new)
}

/// Detects the layout of a grid, extracts its rule rows and compiles them.
pub fn compile_table(grid: &Grid, syntax: &TableSyntax) -> Result<RuleSet> {
    let (head, rest) = detect_layout(grid, syntax)?;
    let records = extract_rules(rest, &head.layout);
    let rules = compile_rules(&head.bindings, records.iter(), syntax)?;
    info!(
        gap_column = head.layout.gap_column,
        rules = rules.len(),
        "compiled decision table"
    );
    Ok(rules)
}

/// Reads a sheet file and compiles it.
pub fn compile_sheet(path: &Path, syntax: &TableSyntax) -> Result<RuleSet> {
    let grid = load_sheet(path)?;
    compile_table(&grid, syntax)
}
