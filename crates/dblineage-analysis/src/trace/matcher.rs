//! Multi-term, case-insensitive matching with identifier boundaries.

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use smallvec::SmallVec;

/// Finds which of a fixed set of terms occur in a line as whole
/// identifiers: the byte before and after a hit must not be `[A-Za-z0-9_]`.
/// Quotes, brackets, dots and whitespace all count as delimiters.
#[derive(Debug, Clone)]
pub struct TermMatcher {
    automaton: Option<AhoCorasick>,
    term_count: usize,
}

impl TermMatcher {
    pub fn new<I, T>(terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let terms: Vec<T> = terms.into_iter().collect();
        let term_count = terms.len();
        if terms.is_empty() {
            return Self {
                automaton: None,
                term_count,
            };
        }
        let automaton = AhoCorasickBuilder::new()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::Standard)
            .build(&terms);
        match automaton {
            Ok(automaton) => Self {
                automaton: Some(automaton),
                term_count,
            },
            Err(e) => {
                tracing::error!(error = %e, terms = term_count, "failed to build term matcher");
                Self {
                    automaton: None,
                    term_count: 0,
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.term_count
    }

    pub fn is_empty(&self) -> bool {
        self.term_count == 0
    }

    /// Distinct term ids found in `line`, in order of first occurrence.
    pub fn find_terms(&self, line: &str) -> SmallVec<[usize; 8]> {
        let mut found = SmallVec::new();
        let Some(automaton) = &self.automaton else {
            return found;
        };
        let bytes = line.as_bytes();
        for m in automaton.find_overlapping_iter(line) {
            let id = m.pattern().as_usize();
            if found.contains(&id) {
                continue;
            }
            if is_bounded(bytes, m.start(), m.end()) {
                found.push(id);
            }
        }
        found
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Whether `bytes[start..end]` is not glued to identifier characters.
pub fn is_bounded(bytes: &[u8], start: usize, end: usize) -> bool {
    let before = start == 0 || !is_ident_byte(bytes[start - 1]);
    let after = end >= bytes.len() || !is_ident_byte(bytes[end]);
    before && after
}

/// Whether `needle` (already lowercase) occurs in `haystack_lower` as a whole
/// word.
pub fn contains_word(haystack_lower: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let bytes = haystack_lower.as_bytes();
    haystack_lower
        .match_indices(needle)
        .any(|(start, m)| is_bounded(bytes, start, start + m.len()))
}
