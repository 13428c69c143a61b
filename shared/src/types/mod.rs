//! Core types used throughout the EcoTrak workspace

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::errors::{SharedError, SharedResult};

pub mod timestamp;

pub use timestamp::{format_timestamp, parse_timestamp};

/// Global process ID singleton - set once at startup
static PROCESS_ID: OnceLock<ProcessId> = OnceLock::new();

/// Process identifier for the front-end currently running
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessId {
    /// Command-line front-end
    Cli,
    /// HTTP API front-end
    WebServer,
}

impl ProcessId {
    /// Initialize the global process ID for the CLI
    pub fn init_cli() -> &'static ProcessId {
        PROCESS_ID.get_or_init(|| ProcessId::Cli)
    }

    /// Initialize the global process ID for the webserver
    pub fn init_webserver() -> &'static ProcessId {
        PROCESS_ID.get_or_init(|| ProcessId::WebServer)
    }

    /// Get the global process ID, falling back to `Cli` when nothing was initialized
    /// (library use and tests)
    pub fn current() -> &'static ProcessId {
        PROCESS_ID.get_or_init(|| ProcessId::Cli)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessId::Cli => write!(f, "ecotrak"),
            ProcessId::WebServer => write!(f, "webserver"),
        }
    }
}

/// Identifier of an intake record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl RecordId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for RecordId {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_id(s).map(RecordId)
    }
}

/// Identifier of a dispatch batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DispatchId(pub u64);

impl DispatchId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for DispatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for DispatchId {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_id(s).map(DispatchId)
    }
}

/// Sheet cells sometimes hold ids as floats ("3.0"); accept those when integral.
fn parse_id(s: &str) -> SharedResult<u64> {
    let trimmed = s.trim().trim_start_matches('#');
    if let Ok(value) = trimmed.parse::<u64>() {
        return Ok(value);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64 => Ok(value as u64),
        _ => Err(SharedError::InvalidId { input: s.to_string() }),
    }
}

/// Recyclable material categories
///
/// The five standard categories form a closed set; some front-ends allow free
/// text, which is kept verbatim in `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum MaterialType {
    Plastic,
    Cardboard,
    Glass,
    Metal,
    Other,
    Custom(String),
}

impl MaterialType {
    pub fn as_str(&self) -> &str {
        match self {
            MaterialType::Plastic => "Plastic",
            MaterialType::Cardboard => "Cardboard",
            MaterialType::Glass => "Glass",
            MaterialType::Metal => "Metal",
            MaterialType::Other => "Other",
            MaterialType::Custom(label) => label.as_str(),
        }
    }
}

impl fmt::Display for MaterialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for MaterialType {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(SharedError::InvalidMaterialType { input: s.to_string() });
        }

        // Legacy sheets carry the Spanish labels
        let material = match trimmed.to_lowercase().as_str() {
            "plastic" | "plástico" | "plastico" => MaterialType::Plastic,
            "cardboard" | "cartón" | "carton" => MaterialType::Cardboard,
            "glass" | "vidrio" => MaterialType::Glass,
            "metal" => MaterialType::Metal,
            "other" | "others" | "otros" | "otro" => MaterialType::Other,
            _ => MaterialType::Custom(trimmed.to_string()),
        };
        Ok(material)
    }
}

impl From<MaterialType> for String {
    fn from(value: MaterialType) -> Self {
        value.as_str().to_string()
    }
}

impl TryFrom<String> for MaterialType {
    type Error = SharedError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Lifecycle state of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum RecordState {
    #[default]
    Active,
    Dispatched,
}

impl RecordState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordState::Active => "Active",
            RecordState::Dispatched => "Dispatched",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, RecordState::Active)
    }
}

impl fmt::Display for RecordState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for RecordState {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" | "activo" => Ok(RecordState::Active),
            "dispatched" | "despachado" => Ok(RecordState::Dispatched),
            _ => Err(SharedError::InvalidRecordState { input: s.to_string() }),
        }
    }
}

impl From<RecordState> for String {
    fn from(value: RecordState) -> Self {
        value.as_str().to_string()
    }
}

impl TryFrom<String> for RecordState {
    type Error = SharedError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One intake event of recyclable material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub material_type: MaterialType,
    pub weight_kg: f64,
    #[serde(with = "timestamp::lenient")]
    pub registered_at: NaiveDateTime,
    pub registered_by: String,
    pub state: RecordState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Record {
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }
}

/// Input for registering a new record
///
/// Missing fields deserialize to empty values so validation can report all of
/// them together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewRecord {
    /// Free text, parsed into a `MaterialType` during validation
    #[serde(default)]
    pub material_type: String,
    #[serde(default)]
    pub weight_kg: f64,
    #[serde(default, with = "timestamp::lenient_option")]
    pub registered_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub registered_by: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Records of one material type folded together
///
/// Used both for the active groups offered for dispatch and for the groups
/// stored inside a dispatch batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialGroup {
    pub material_type: MaterialType,
    pub count: usize,
    pub total_weight_kg: f64,
    pub record_ids: Vec<RecordId>,
    /// Registering people, deduplicated in order of first occurrence
    pub people: Vec<String>,
}

impl MaterialGroup {
    pub fn new(material_type: MaterialType) -> Self {
        Self {
            material_type,
            count: 0,
            total_weight_kg: 0.0,
            record_ids: Vec::new(),
            people: Vec::new(),
        }
    }

    /// Fold one record into the group
    pub fn add(&mut self, record: &Record) {
        self.count += 1;
        self.total_weight_kg += record.weight_kg;
        self.record_ids.push(record.id);
        if !self.people.iter().any(|person| person == &record.registered_by) {
            self.people.push(record.registered_by.clone());
        }
    }
}

/// One outbound shipment event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchBatch {
    pub dispatch_id: DispatchId,
    #[serde(with = "timestamp::lenient")]
    pub dispatched_at: NaiveDateTime,
    pub authorized_by: String,
    pub record_count: usize,
    pub groups: Vec<MaterialGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl DispatchBatch {
    /// All record ids covered by the batch, in group order
    pub fn record_ids(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.groups.iter().flat_map(|group| group.record_ids.iter().copied())
    }

    pub fn total_weight_kg(&self) -> f64 {
        self.groups.iter().map(|group| group.total_weight_kg).sum()
    }

    /// Comma separated material types, as shown in history listings
    pub fn material_summary(&self) -> String {
        self.groups
            .iter()
            .map(|group| group.material_type.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One persisted dispatch row: a (batch, record) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchEntry {
    pub dispatch_id: DispatchId,
    pub record_id: RecordId,
    pub material_type: MaterialType,
    pub weight_kg: f64,
    #[serde(with = "timestamp::lenient")]
    pub dispatched_at: NaiveDateTime,
    pub authorized_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Normalize optional free text: blank becomes `None`
pub fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
