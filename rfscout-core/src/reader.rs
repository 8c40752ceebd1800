use std::{fs, io, path::Path};

use rfscout_types::{LogRecord, RfResult};

use crate::format::{decode_record, validate_header};

/// Читатель журнала: проверяет заголовок и восстанавливает записи.
pub struct LogReader {
    content: String,
}

impl LogReader {
    pub fn open<P: AsRef<Path>>(path: P) -> RfResult<Self> {
        Ok(Self {
            content: fs::read_to_string(path)?,
        })
    }

    pub fn from_string(content: String) -> Self {
        Self { content }
    }

    /// Все записи журнала в порядке добавления.
    pub fn records(&self) -> RfResult<Vec<LogRecord>> {
        // flexible: кол-во полей проверяет decode_record, с номером строки
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(self.content.as_bytes());

        let headers = reader.headers().map_err(io::Error::from)?;
        if headers.is_empty() {
            return Ok(Vec::new());
        }
        validate_header(headers)?;

        reader
            .records()
            .map(|row| {
                let row = row.map_err(io::Error::from)?;
                let line = row.position().map_or(0, |p| p.line() as usize);
                decode_record(line, &row)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rfscout_types::RfError;

    use super::*;

    #[test]
    fn test_empty_file_has_no_records() {
        let reader = LogReader::from_string(String::new());
        assert!(reader.records().unwrap().is_empty());
    }

    #[test]
    fn test_foreign_header_rejected() {
        let reader = LogReader::from_string("date,time,hz_low\n".to_string());
        assert!(matches!(
            reader.records(),
            Err(RfError::MalformedRecord { line: 1, .. })
        ));
    }

    #[test]
    fn test_bad_row_reports_its_line() {
        let content = format!(
            "{}\n2024-01-01 00:00:00,100.050,FM,16,20,false,d,s,x\nbroken,row\n",
            crate::LOG_COLUMNS.join(",")
        );
        let reader = LogReader::from_string(content);

        assert!(matches!(
            reader.records(),
            Err(RfError::MalformedRecord { line: 3, .. })
        ));
    }
}
