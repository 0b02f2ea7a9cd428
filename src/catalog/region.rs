use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{AppError, AppResult};

const BUNDLED_REGIONS: &str = include_str!("../../data/regions.json");

/// Two-digit region code → name. Iteration order puts `0x` codes first,
/// then the rest ascending.
#[derive(Debug, Clone)]
pub struct RegionTable {
    codes: BTreeMap<String, String>,
}

impl RegionTable {
    pub fn bundled() -> AppResult<Self> {
        RegionTable::from_json(BUNDLED_REGIONS)
    }

    pub fn from_json(raw: &str) -> AppResult<Self> {
        let codes: BTreeMap<String, String> = serde_json::from_str(raw)?;
        if let Some(bad) = codes.keys().find(|code| !is_region_code(code)) {
            return Err(AppError::Decode(format!("invalid region code in table: {}", bad)));
        }
        Ok(RegionTable { codes })
    }

    pub fn load(path: &Path) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        RegionTable::from_json(&raw)
    }

    pub fn name(&self, code: &str) -> Option<&str> {
        self.codes.get(code).map(String::as_str)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains_key(code)
    }

    pub fn sorted(&self) -> impl Iterator<Item = (&str, &str)> {
        self.codes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn validate(&self, code: &str) -> AppResult<()> {
        if self.contains(code) {
            Ok(())
        } else {
            Err(AppError::Validation(format!("unknown region code: {}", code)))
        }
    }
}

fn is_region_code(code: &str) -> bool {
    code.len() == 2 && code.bytes().all(|b| b.is_ascii_digit())
}
