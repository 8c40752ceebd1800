use std::{
    fs::{File, OpenOptions},
    io,
    path::{Path, PathBuf},
};

use log::debug;
use rfscout_types::{LogRecord, RfResult};

use crate::format::{record_fields, validate_header, LOG_COLUMNS};

/// Приёмник записей журнала. Пишет только цикл сканирования.
pub trait LogSink: Send {
    /// Добавляет одну запись. Записи никогда не меняются и не удаляются.
    fn append(
        &mut self,
        record: &LogRecord,
    ) -> RfResult<()>;
}

/// Append-only CSV журнал на диске.
pub struct CsvLogStore {
    path: PathBuf,
    writer: csv::Writer<File>,
    records_written: u64,
}

impl CsvLogStore {
    /// Открывает журнал на дозапись.
    ///
    /// Заголовок пишется только если файл новый или пустой. Непустой файл
    /// с чужим заголовком не трогаем: `RfError::MalformedRecord` на строке 1.
    pub fn open<P: AsRef<Path>>(path: P) -> RfResult<Self> {
        let path = path.as_ref().to_path_buf();
        let is_new = std::fs::metadata(&path)
            .map(|m| m.len() == 0)
            .unwrap_or(true);

        if !is_new {
            let mut reader = csv::ReaderBuilder::new()
                .has_headers(true)
                .flexible(true)
                .from_path(&path)
                .map_err(io::Error::from)?;
            validate_header(reader.headers().map_err(io::Error::from)?)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut writer = csv::Writer::from_writer(file);

        if is_new {
            writer
                .write_record(LOG_COLUMNS)
                .map_err(io::Error::from)?;
            writer.flush()?;
            debug!("Created log file {path:?}");
        }

        Ok(Self {
            path,
            writer,
            records_written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Кол-во записей, добавленных этим экземпляром.
    pub fn records_written(&self) -> u64 {
        self.records_written
    }
}

impl LogSink for CsvLogStore {
    fn append(
        &mut self,
        record: &LogRecord,
    ) -> RfResult<()> {
        self.writer
            .write_record(record_fields(record))
            .map_err(io::Error::from)?;
        // Каждая запись должна пережить падение процесса
        self.writer.flush()?;
        self.records_written += 1;
        Ok(())
    }
}

/// In-memory журнал (тесты, встраивание без диска).
impl LogSink for Vec<LogRecord> {
    fn append(
        &mut self,
        record: &LogRecord,
    ) -> RfResult<()> {
        self.push(record.clone());
        Ok(())
    }
}
