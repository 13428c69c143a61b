//! Service implementations
//!
//! Real implementations of the persistence adapter plus the file exports that
//! only make sense against local storage.

pub mod export;
pub mod memory;
pub mod rows;
pub mod sheets_api;
pub mod workbook;

#[cfg(test)]
mod tests;

// Re-export all service implementations
pub use export::export_report;
pub use memory::MemoryAdapter;
pub use sheets_api::SheetsApiAdapter;
pub use workbook::WorkbookAdapter;
