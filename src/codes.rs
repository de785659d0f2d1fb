//! Primary ↔ secondary payment-code table.
//!
//! A secondary code (regional or northern allowance) must be folded into the
//! sum of exactly one primary code of the same period. Either side of a
//! mapping may name several alternative codes.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{ReconError, Result};

/// One code or several alternative codes, as written in a configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCodes {
    One(String),
    Many(Vec<String>),
}

/// Canonical ordered list of payment codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeSet(Vec<String>);

impl CodeSet {
    pub fn contains(&self, code: &str) -> bool {
        self.0.iter().any(|c| c == code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Human-readable alternatives, e.g. `18 or 48 or 87`.
    pub fn describe(&self) -> String {
        self.0.join(" or ")
    }
}

impl From<RawCodes> for CodeSet {
    fn from(raw: RawCodes) -> Self {
        match raw {
            RawCodes::One(code) => CodeSet(vec![code.trim().to_string()]),
            RawCodes::Many(codes) => CodeSet(codes.into_iter().map(|c| c.trim().to_string()).collect()),
        }
    }
}

impl From<&str> for CodeSet {
    fn from(code: &str) -> Self {
        RawCodes::One(code.to_string()).into()
    }
}

impl<const N: usize> From<[&str; N]> for CodeSet {
    fn from(codes: [&str; N]) -> Self {
        RawCodes::Many(codes.iter().map(|c| c.to_string()).collect()).into()
    }
}

/// Configuration-file shape of a mapping entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMapping {
    pub primary: RawCodes,
    pub secondary: RawCodes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CodeMapping {
    pub primary: CodeSet,
    pub secondary: CodeSet,
}

impl CodeMapping {
    pub fn new(primary: impl Into<CodeSet>, secondary: impl Into<CodeSet>) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.into(),
        }
    }
}

impl From<RawMapping> for CodeMapping {
    fn from(raw: RawMapping) -> Self {
        CodeMapping::new(raw.primary, raw.secondary)
    }
}

/// Secondary codes claimed more than once, each reported once.
pub fn validate_unique_secondary_codes(mappings: &[CodeMapping]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut duplicates: Vec<String> = Vec::new();
    for mapping in mappings {
        for code in mapping.secondary.iter() {
            if !seen.insert(code) && !duplicates.iter().any(|d| d == code) {
                duplicates.push(code.to_string());
            }
        }
    }
    duplicates
}

#[derive(Debug, Clone)]
pub struct CodeMap {
    mappings: Vec<CodeMapping>,
}

impl CodeMap {
    /// Build a validated table; duplicate secondary codes are a configuration error.
    pub fn new(mappings: Vec<CodeMapping>) -> Result<Self> {
        let duplicates = validate_unique_secondary_codes(&mappings);
        if !duplicates.is_empty() {
            return Err(ReconError::Configuration(duplicates));
        }
        Ok(Self { mappings })
    }

    /// RKSN table used by Galaktika payroll.
    pub fn builtin() -> Self {
        Self {
            mappings: vec![
                CodeMapping::new(["18", "48", "87", "204"], ["305", "306"]),
                CodeMapping::new("20", ["315", "316"]),
                CodeMapping::new("54", ["313", "314"]),
                CodeMapping::new("76", ["309", "310"]),
                CodeMapping::new("77", ["311", "312"]),
                CodeMapping::new(["106", "104", "110", "112"], ["303", "304"]),
                CodeMapping::new(["107", "111"], ["307", "308"]),
                CodeMapping::new(["108", "109"], ["318", "319"]),
            ],
        }
    }

    pub fn mappings(&self) -> &[CodeMapping] {
        &self.mappings
    }

    /// First mapping whose secondary side contains `code`.
    pub fn mapping_for_secondary(&self, code: &str) -> Option<&CodeMapping> {
        self.mappings.iter().find(|m| m.secondary.contains(code))
    }

    /// All primary codes, deduplicated, numeric codes first in numeric order.
    pub fn primary_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = Vec::new();
        for code in self.mappings.iter().flat_map(|m| m.primary.iter()) {
            if !codes.iter().any(|c| c == code) {
                codes.push(code.to_string());
            }
        }
        codes.sort_by(|a, b| match (a.parse::<u64>(), b.parse::<u64>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            (Ok(_), Err(_)) => std::cmp::Ordering::Less,
            (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
            (Err(_), Err(_)) => a.cmp(b),
        });
        codes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_is_valid() {
        assert!(validate_unique_secondary_codes(CodeMap::builtin().mappings()).is_empty());
    }

    #[test]
    fn test_duplicate_secondary_reported_once() {
        let broken = vec![
            CodeMapping::new("18", ["305", "306"]),
            CodeMapping::new("20", ["315", "316"]),
            CodeMapping::new("54", "305"),
            CodeMapping::new("76", ["305", "316"]),
        ];
        let dupes = validate_unique_secondary_codes(&broken);
        assert_eq!(dupes, vec!["305".to_string(), "316".to_string()]);
    }

    #[test]
    fn test_new_rejects_duplicates() {
        let err = CodeMap::new(vec![
            CodeMapping::new("18", "305"),
            CodeMapping::new("48", "305"),
        ])
        .unwrap_err();
        assert!(matches!(err, ReconError::Configuration(codes) if codes == vec!["305"]));
    }

    #[test]
    fn test_primary_may_repeat_across_mappings() {
        let map = CodeMap::new(vec![
            CodeMapping::new("18", "305"),
            CodeMapping::new("18", "306"),
        ]);
        assert!(map.is_ok());
    }

    #[test]
    fn test_scalar_and_list_normalize_the_same() {
        let scalar: CodeSet = RawCodes::One("20".into()).into();
        let list: CodeSet = RawCodes::Many(vec!["20".into()]).into();
        assert_eq!(scalar, list);
    }

    #[test]
    fn test_raw_mapping_from_json() {
        let json = r#"[{"primary": "20", "secondary": ["315", "316"]},
                       {"primary": ["18", "48"], "secondary": "305"}]"#;
        let raw: Vec<RawMapping> = serde_json::from_str(json).unwrap();
        let mappings: Vec<CodeMapping> = raw.into_iter().map(CodeMapping::from).collect();
        assert_eq!(mappings[0].primary, CodeSet::from("20"));
        assert_eq!(mappings[1].primary, CodeSet::from(["18", "48"]));
        assert!(mappings[1].secondary.contains("305"));
    }

    #[test]
    fn test_mapping_for_secondary() {
        let map = CodeMap::builtin();
        let m = map.mapping_for_secondary("306").unwrap();
        assert_eq!(m.primary.describe(), "18 or 48 or 87 or 204");
        assert!(map.mapping_for_secondary("18").is_none());
    }

    #[test]
    fn test_primary_codes_sorted_numerically() {
        let codes = CodeMap::builtin().primary_codes();
        assert_eq!(codes.first().map(String::as_str), Some("18"));
        assert_eq!(codes.last().map(String::as_str), Some("204"));
        assert_eq!(codes.len(), 16);
    }
}
