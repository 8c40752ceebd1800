use std::time::Duration;

use thiserror::Error;

pub type ScanResult<T> = std::result::Result<T, ScanError>;

pub type ModelResult<T> = std::result::Result<T, AnalysisError>;

/// Ошибки цикла сканирования.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Утилита sweep не найдена или не запускается. Останавливает весь цикл.
    #[error("Sweep tool '{command}' unavailable: {source}")]
    ToolUnavailable {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Утилита завершилась с ненулевым кодом. Цикл пропускается.
    #[error("Sweep failed ({status}): {stderr}")]
    SweepFailed { status: String, stderr: String },

    /// Некорректная конфигурация
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Ошибка журнала / модели данных
    #[error("Log store error: {0}")]
    LogStore(#[from] rfscout_types::RfError),

    /// Ошибка ввода/вывода
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Поток цикла завершился паникой
    #[error("Scan thread panicked")]
    ThreadPanicked,
}

impl ScanError {
    /// Фатальна только недоступность утилиты sweep.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ScanError::ToolUnavailable { .. })
    }
}

/// Ошибки обращения к языковой модели. Всегда восстановимы.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Модель не ответила за отведённое время
    #[error("Model request timed out after {0:?}")]
    Timeout(Duration),

    /// Сетевая ошибка / ошибка клиента
    #[error("Model transport error: {0}")]
    Transport(String),

    /// Сервер вернул код ошибки
    #[error("Model endpoint returned HTTP {0}")]
    Status(u16),

    /// Тело ответа не разобрать
    #[error("Malformed model response: {0}")]
    Decode(String),

    /// Поле `response` пустое или отсутствует
    #[error("Model returned an empty response")]
    EmptyResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_tool_unavailable_is_fatal() {
        let missing = ScanError::ToolUnavailable {
            command: "hackrf_sweep".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        let failed = ScanError::SweepFailed {
            status: "exit status: 1".to_string(),
            stderr: "hackrf_open() failed".to_string(),
        };

        assert!(missing.is_fatal());
        assert!(!failed.is_fatal());
        assert!(!ScanError::InvalidConfig("x".to_string()).is_fatal());
        assert!(failed.to_string().contains("hackrf_open() failed"));
    }
}
