use thiserror::Error;

/// Результат для общих операций rfscout.
pub type RfResult<T> = std::result::Result<T, RfError>;

/// Ошибки модели данных и журнала.
#[derive(Debug, Error)]
pub enum RfError {
    /// Некорректные параметры сканирования
    #[error("Invalid scan config: {0}")]
    InvalidConfig(String),

    /// Строка журнала не соответствует формату колонок
    #[error("Malformed log record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    /// Ошибки ввода/вывода (автоконвертируются из std::io::Error)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RfError {
    /// Удобные конструкторы
    pub fn invalid_config<S: Into<String>>(s: S) -> Self {
        Self::InvalidConfig(s.into())
    }

    pub fn malformed<S: Into<String>>(
        line: usize,
        reason: S,
    ) -> Self {
        Self::MalformedRecord {
            line,
            reason: reason.into(),
        }
    }
}
