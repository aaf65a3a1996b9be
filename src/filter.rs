// Gender / Region equality-set filtering shared by the wide and long tables.
use crate::types::{AgentRecord, TrendRecord};
use serde::Serialize;

/// Rows that carry the two filterable attributes.
pub trait Segmented {
    fn gender(&self) -> Option<&str>;
    fn region(&self) -> Option<&str>;
}

impl Segmented for AgentRecord {
    fn gender(&self) -> Option<&str> {
        self.gender.as_deref()
    }
    fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }
}

impl Segmented for TrendRecord {
    fn gender(&self) -> Option<&str> {
        self.gender.as_deref()
    }
    fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }
}

/// Selected values per attribute. An empty list means "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Selection {
    pub genders: Vec<String>,
    pub regions: Vec<String>,
}

fn admits(selected: &[String], value: Option<&str>) -> bool {
    if selected.is_empty() {
        return true;
    }
    match value {
        Some(v) => selected.iter().any(|s| s == v),
        None => false,
    }
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.genders.is_empty() && self.regions.is_empty()
    }

    pub fn matches<T: Segmented>(&self, row: &T) -> bool {
        admits(&self.genders, row.gender()) && admits(&self.regions, row.region())
    }

    /// New table holding the rows this selection admits, in source order.
    pub fn apply<T: Segmented + Clone>(&self, rows: &[T]) -> Vec<T> {
        rows.iter().filter(|r| self.matches(*r)).cloned().collect()
    }
}

/// Distinct non-missing values in order of first appearance.
pub fn distinct_values<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut out: Vec<String> = Vec::new();
    for v in values.into_iter().flatten() {
        if !out.iter().any(|o| o == v) {
            out.push(v.to_string());
        }
    }
    out
}

/// Resolve a comma-separated pick list against the offered options.
///
/// Tokens may be 1-based option numbers or literal option values. Unknown
/// tokens are dropped and duplicates collapse; a blank line clears the pick.
pub fn parse_picks(input: &str, options: &[String]) -> Vec<String> {
    let mut picked: Vec<String> = Vec::new();
    for token in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let hit = match token.parse::<usize>() {
            Ok(n) if n >= 1 && n <= options.len() => Some(&options[n - 1]),
            _ => options.iter().find(|o| o.as_str() == token),
        };
        if let Some(value) = hit {
            if !picked.contains(value) {
                picked.push(value.clone());
            }
        }
    }
    picked
}
