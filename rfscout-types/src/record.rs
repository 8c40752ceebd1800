use chrono::NaiveDateTime;

use crate::{Modulation, ScanConfig, SignalObservation};

/// Заглушка вместо декодированных данных: демодуляция не реализуется.
pub const DECODE_PLACEHOLDER: &str = "DECODING_REQUIRES_SPECIFIC_TOOLING";

/// Формат метки времени в журнале и событиях.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Итог анализа одного наблюдения.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    /// Описание сигнала от модели (или fallback текст)
    pub description: String,
    /// Рекомендации по усилению (или fallback текст)
    pub suggestions: String,
    /// Модуляция, извлечённая из описания
    pub modulation: Modulation,
    /// Результат декодирования (пока всегда заглушка)
    pub decoded: String,
}

/// Одна запись журнала. Только добавляется, никогда не меняется.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub timestamp: NaiveDateTime,
    /// Центральная частота (МГц)
    pub frequency_mhz: f64,
    pub modulation: Modulation,
    /// Усиления, с которыми был сделан проход
    pub lna_gain: u32,
    pub vga_gain: u32,
    pub amp_enabled: bool,
    pub description: String,
    pub suggestions: String,
    pub decoded: String,
}

impl LogRecord {
    /// Собирает запись из результатов цикла.
    pub fn new(
        timestamp: NaiveDateTime,
        observation: &SignalObservation,
        analysis: &AnalysisResult,
        config: &ScanConfig,
    ) -> Self {
        Self {
            timestamp,
            frequency_mhz: observation.frequency_mhz,
            modulation: analysis.modulation,
            lna_gain: config.lna_gain,
            vga_gain: config.vga_gain,
            amp_enabled: config.amp_enabled,
            description: analysis.description.clone(),
            suggestions: analysis.suggestions.clone(),
            decoded: analysis.decoded.clone(),
        }
    }

    pub fn timestamp_str(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Частота с точностью до кГц, как в журнале.
    pub fn frequency_str(&self) -> String {
        format!("{:.3}", self.frequency_mhz)
    }
}
