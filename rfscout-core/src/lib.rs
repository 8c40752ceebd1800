//! Журнал сканирования rfscout
//!
//! Формат append-only CSV журнала: фиксированный порядок колонок, заголовок
//! пишется один раз при создании файла, одна строка на завершённый цикл.
//!
//! # Быстрый старт
//!
//! ```no_run
//! use rfscout_core::{CsvLogStore, LogReader};
//!
//! let store = CsvLogStore::open("rf_scan_log.csv")?;
//! println!("journal: {:?}", store.path());
//!
//! for record in LogReader::open("rf_scan_log.csv")?.records()? {
//!     println!("{} {} MHz {}", record.timestamp_str(), record.frequency_str(), record.modulation);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod format;
pub mod reader;
pub mod store;

pub use format::*;
pub use reader::*;
pub use store::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        assert_eq!(LOG_COLUMNS.len(), 9);
        assert_eq!(LOG_COLUMNS[0], "Timestamp");
    }
}
