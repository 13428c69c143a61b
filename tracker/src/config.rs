//! Backend configuration
//!
//! ## Configuration Sources
//! Values are resolved in this order, first hit wins:
//! 1. command line flags (`BackendArgs`)
//! 2. environment variables
//! 3. a `.env` file in the current directory or its parents
//! 4. built-in defaults
//!
//! ## Variables
//! - `ECOTRAK_BACKEND`: `workbook` (default), `sheets` or `memory`
//! - `ECOTRAK_WORKBOOK_DIR`: workbook directory (default `./ecotrak_data`)
//! - `ECOTRAK_SHEETS_ID`, `ECOTRAK_SHEETS_API_KEY`: required for `sheets`
//! - `ECOTRAK_SHEETS_BASE_URL`: API root override
//! - `ECOTRAK_RECORDS_SHEET`, `ECOTRAK_DISPATCH_SHEET`: sheet names
//! - `ECOTRAK_WEIGHT_MODE`: `exact` (default) or `average`

use clap::Args;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::core::WeightMode;
use crate::error::{TrackerError, TrackerResult};
use crate::services::rows::{DEFAULT_DISPATCH_SHEET, DEFAULT_RECORDS_SHEET};
use crate::services::sheets_api::DEFAULT_BASE_URL;
use crate::services::{MemoryAdapter, SheetsApiAdapter, WorkbookAdapter};
use crate::traits::PersistenceAdapter;

pub const ENV_BACKEND: &str = "ECOTRAK_BACKEND";
pub const ENV_WORKBOOK_DIR: &str = "ECOTRAK_WORKBOOK_DIR";
pub const ENV_SHEETS_ID: &str = "ECOTRAK_SHEETS_ID";
pub const ENV_SHEETS_API_KEY: &str = "ECOTRAK_SHEETS_API_KEY";
pub const ENV_SHEETS_BASE_URL: &str = "ECOTRAK_SHEETS_BASE_URL";
pub const ENV_RECORDS_SHEET: &str = "ECOTRAK_RECORDS_SHEET";
pub const ENV_DISPATCH_SHEET: &str = "ECOTRAK_DISPATCH_SHEET";
pub const ENV_WEIGHT_MODE: &str = "ECOTRAK_WEIGHT_MODE";

pub const DEFAULT_WORKBOOK_DIR: &str = "./ecotrak_data";

/// Storage backend selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    #[default]
    Workbook,
    Sheets,
    Memory,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "workbook" | "excel" | "local" => Ok(BackendKind::Workbook),
            "sheets" | "google" | "google_sheets" => Ok(BackendKind::Sheets),
            "memory" => Ok(BackendKind::Memory),
            other => Err(format!("unknown backend '{other}'")),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Workbook => write!(f, "workbook"),
            BackendKind::Sheets => write!(f, "sheets"),
            BackendKind::Memory => write!(f, "memory"),
        }
    }
}

/// Storage flags shared by the CLI and the webserver
#[derive(Args, Debug, Clone, Default)]
pub struct BackendArgs {
    /// Storage backend (workbook, sheets, memory)
    #[arg(long)]
    pub backend: Option<BackendKind>,

    /// Workbook directory holding the CSV sheets
    #[arg(long)]
    pub workbook_dir: Option<PathBuf>,

    /// Spreadsheet id for the sheets backend
    #[arg(long)]
    pub sheets_id: Option<String>,

    /// API key for the sheets backend
    #[arg(long)]
    pub sheets_api_key: Option<String>,

    /// Sheets API root URL
    #[arg(long)]
    pub sheets_base_url: Option<String>,

    /// Name of the records sheet
    #[arg(long)]
    pub records_sheet: Option<String>,

    /// Name of the dispatch sheet
    #[arg(long)]
    pub dispatch_sheet: Option<String>,

    /// Weight written to dispatch rows (exact, average)
    #[arg(long)]
    pub weight_mode: Option<WeightMode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    Workbook {
        dir: PathBuf,
    },
    Sheets {
        spreadsheet_id: String,
        api_key: String,
        base_url: String,
    },
    Memory,
}

/// Fully resolved tracker configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    pub backend: BackendConfig,
    pub records_sheet: String,
    pub dispatch_sheet: String,
    pub weight_mode: WeightMode,
}

impl TrackerConfig {
    /// Resolve from flags, the process environment and `.env`
    pub fn from_env(args: &BackendArgs) -> TrackerResult<Self> {
        // A missing .env file is fine
        let _ = dotenv::dotenv();
        Self::resolve(args, |key| std::env::var(key).ok())
    }

    /// Resolve from flags and an arbitrary variable lookup
    pub fn resolve<F>(args: &BackendArgs, lookup: F) -> TrackerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|value| value.trim().to_string()).filter(|value| !value.is_empty());

        let kind = match args.backend {
            Some(kind) => kind,
            None => match var(ENV_BACKEND) {
                Some(text) => text
                    .parse::<BackendKind>()
                    .map_err(|e| TrackerError::config(format!("{ENV_BACKEND}: {e}")))?,
                None => BackendKind::default(),
            },
        };

        let weight_mode = match args.weight_mode {
            Some(mode) => mode,
            None => match var(ENV_WEIGHT_MODE) {
                Some(text) => text
                    .parse::<WeightMode>()
                    .map_err(|e| TrackerError::config(format!("{ENV_WEIGHT_MODE}: {e}")))?,
                None => WeightMode::default(),
            },
        };

        let backend = match kind {
            BackendKind::Workbook => BackendConfig::Workbook {
                dir: args
                    .workbook_dir
                    .clone()
                    .or_else(|| var(ENV_WORKBOOK_DIR).map(PathBuf::from))
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKBOOK_DIR)),
            },
            BackendKind::Sheets => BackendConfig::Sheets {
                spreadsheet_id: args
                    .sheets_id
                    .clone()
                    .or_else(|| var(ENV_SHEETS_ID))
                    .ok_or_else(|| TrackerError::config(ENV_SHEETS_ID))?,
                api_key: args
                    .sheets_api_key
                    .clone()
                    .or_else(|| var(ENV_SHEETS_API_KEY))
                    .ok_or_else(|| TrackerError::config(ENV_SHEETS_API_KEY))?,
                base_url: args
                    .sheets_base_url
                    .clone()
                    .or_else(|| var(ENV_SHEETS_BASE_URL))
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            },
            BackendKind::Memory => BackendConfig::Memory,
        };

        Ok(Self {
            backend,
            records_sheet: args
                .records_sheet
                .clone()
                .or_else(|| var(ENV_RECORDS_SHEET))
                .unwrap_or_else(|| DEFAULT_RECORDS_SHEET.to_string()),
            dispatch_sheet: args
                .dispatch_sheet
                .clone()
                .or_else(|| var(ENV_DISPATCH_SHEET))
                .unwrap_or_else(|| DEFAULT_DISPATCH_SHEET.to_string()),
            weight_mode,
        })
    }

    pub fn kind(&self) -> BackendKind {
        match self.backend {
            BackendConfig::Workbook { .. } => BackendKind::Workbook,
            BackendConfig::Sheets { .. } => BackendKind::Sheets,
            BackendConfig::Memory => BackendKind::Memory,
        }
    }

    /// The workbook adapter, when the workbook backend is configured
    pub fn workbook(&self) -> Option<WorkbookAdapter> {
        match &self.backend {
            BackendConfig::Workbook { dir } => {
                Some(WorkbookAdapter::new(dir.clone()).with_sheet_names(&self.records_sheet, &self.dispatch_sheet))
            }
            _ => None,
        }
    }

    /// Build the configured persistence adapter
    pub fn build_adapter(&self) -> Box<dyn PersistenceAdapter> {
        match &self.backend {
            BackendConfig::Workbook { dir } => Box::new(
                WorkbookAdapter::new(dir.clone()).with_sheet_names(&self.records_sheet, &self.dispatch_sheet),
            ),
            BackendConfig::Sheets {
                spreadsheet_id,
                api_key,
                base_url,
            } => Box::new(
                SheetsApiAdapter::new(spreadsheet_id, api_key)
                    .with_base_url(base_url)
                    .with_sheet_names(&self.records_sheet, &self.dispatch_sheet),
            ),
            BackendConfig::Memory => Box::new(MemoryAdapter::new()),
        }
    }
}
