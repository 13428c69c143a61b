//! Record listing filters

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::types::{MaterialType, RecordState};

/// Column used to order a record listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Id,
    Weight,
    RegisteredAt,
    MaterialType,
    RegisteredBy,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "id" => Ok(SortKey::Id),
            "weight" => Ok(SortKey::Weight),
            "date" | "registered_at" => Ok(SortKey::RegisteredAt),
            "type" | "material_type" => Ok(SortKey::MaterialType),
            "person" | "registered_by" => Ok(SortKey::RegisteredBy),
            _ => Err(format!("Unknown sort key: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(format!("Unknown sort order: {s}")),
        }
    }
}

/// Filters for listing records; every field is optional and unset fields match all
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordQuery {
    pub material_type: Option<MaterialType>,
    pub state: Option<RecordState>,
    /// Inclusive lower bound on the registration date
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on the registration date
    pub to: Option<NaiveDate>,
    /// Case-insensitive text search; ignored below two characters
    pub search: Option<String>,
    pub sort: Option<SortKey>,
    #[serde(default)]
    pub order: SortOrder,
}

impl RecordQuery {
    pub const MIN_SEARCH_LEN: usize = 2;
}
