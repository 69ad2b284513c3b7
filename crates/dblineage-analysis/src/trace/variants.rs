//! Column name variant index, built once per trace run.

use dblineage_core::config::TraceConfig;
use dblineage_core::naming::{column_variants, table_variants};
use dblineage_core::types::collections::FxHashMap;
use dblineage_core::types::ColumnRef;
use smallvec::SmallVec;

use super::matcher::{contains_word, TermMatcher};

/// A column the index can resolve a hit to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnTarget {
    pub column_id: i64,
    pub name: String,
    pub table: String,
    table_slot: usize,
}

/// Lowercased variant terms mapped to the columns they may denote.
///
/// Every variant of at least `min_variant_len` characters is indexed; only
/// those of at least `min_match_len` characters are searched for in code.
#[derive(Debug, Clone)]
pub struct VariantIndex {
    columns: Vec<ColumnTarget>,
    variants: Vec<String>,
    targets: Vec<SmallVec<[usize; 2]>>,
    /// Matcher term id to variant id.
    searchable: Vec<usize>,
    matcher: TermMatcher,
    table_terms: Vec<Vec<String>>,
    by_name: FxHashMap<String, SmallVec<[usize; 2]>>,
}

impl VariantIndex {
    pub fn build(columns: &[ColumnRef], config: &TraceConfig) -> Self {
        let min_variant_len = config.effective_min_variant_len();
        let min_match_len = config.effective_min_match_len();

        let mut targets_out = Vec::with_capacity(columns.len());
        let mut table_slots: FxHashMap<String, usize> = FxHashMap::default();
        let mut table_terms: Vec<Vec<String>> = Vec::new();
        let mut variant_ids: FxHashMap<String, usize> = FxHashMap::default();
        let mut variants: Vec<String> = Vec::new();
        let mut targets: Vec<SmallVec<[usize; 2]>> = Vec::new();
        let mut by_name: FxHashMap<String, SmallVec<[usize; 2]>> = FxHashMap::default();

        for column in columns {
            let name_lower = column.name.to_lowercase();
            let table_lower = column.table.to_lowercase();
            let table_slot = *table_slots.entry(table_lower.clone()).or_insert_with(|| {
                let mut terms: Vec<String> = Vec::new();
                for term in table_variants(&table_lower) {
                    let term = term.to_lowercase();
                    if !terms.contains(&term) {
                        terms.push(term);
                    }
                }
                table_terms.push(terms);
                table_terms.len() - 1
            });

            let idx = targets_out.len();
            targets_out.push(ColumnTarget {
                column_id: column.id,
                name: column.name.clone(),
                table: column.table.clone(),
                table_slot,
            });
            by_name.entry(name_lower.clone()).or_default().push(idx);

            for variant in column_variants(&name_lower, &table_lower, min_variant_len) {
                let key = variant.to_lowercase();
                let vid = *variant_ids.entry(key.clone()).or_insert_with(|| {
                    variants.push(key);
                    targets.push(SmallVec::new());
                    variants.len() - 1
                });
                if !targets[vid].contains(&idx) {
                    targets[vid].push(idx);
                }
            }
        }

        let searchable: Vec<usize> = variants
            .iter()
            .enumerate()
            .filter(|(_, v)| v.chars().count() >= min_match_len)
            .map(|(i, _)| i)
            .collect();
        let matcher = TermMatcher::new(searchable.iter().map(|&i| variants[i].as_str()));

        tracing::debug!(
            columns = targets_out.len(),
            variants = variants.len(),
            searchable = searchable.len(),
            "built column variant index"
        );

        Self {
            columns: targets_out,
            variants,
            targets,
            searchable,
            matcher,
            table_terms,
            by_name,
        }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// All indexed variant terms, lowercased.
    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    pub fn column(&self, idx: usize) -> &ColumnTarget {
        &self.columns[idx]
    }

    /// Column indexes whose variants occur in `line` as whole identifiers.
    pub fn find_columns(&self, line: &str) -> SmallVec<[usize; 8]> {
        let mut hits: SmallVec<[usize; 8]> = SmallVec::new();
        for term in self.matcher.find_terms(line) {
            for &col in &self.targets[self.searchable[term]] {
                if !hits.contains(&col) {
                    hits.push(col);
                }
            }
        }
        hits
    }

    /// Column indexes whose name equals `name`, ignoring case.
    pub fn columns_named(&self, name: &str) -> &[usize] {
        self.by_name
            .get(&name.to_lowercase())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Whether any form of the column's table occurs in already-lowercased
    /// `context_lower`.
    pub fn table_mentioned(&self, target: &ColumnTarget, context_lower: &str) -> bool {
        self.table_terms[target.table_slot]
            .iter()
            .any(|term| context_lower.contains(term.as_str()))
    }

    /// Whether `field` occurs in already-lowercased `line_lower` as a whole word.
    pub fn field_in_line(field: &str, line_lower: &str) -> bool {
        contains_word(line_lower, field)
    }
}
