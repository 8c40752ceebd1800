use std::{path::PathBuf, time::Duration};

use rfscout_types::ScanConfig;

/// Параметры обращения к языковой модели.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSettings {
    /// URL эндпоинта генерации (Ollama `/api/generate`)
    pub endpoint: String,
    /// Идентификатор модели
    pub model: String,
    /// Таймаут одного запроса
    pub timeout: Duration,
}

/// Полная конфигурация анализатора.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Стартовые параметры sweep (усиления потом меняет цикл)
    pub scan: ScanConfig,
    /// Путь к `hackrf_sweep`
    pub sweep_command: PathBuf,
    /// Языковая модель
    pub model: ModelSettings,
    /// CSV журнал
    pub log_path: PathBuf,
    /// Пауза между циклами
    pub cycle_interval: Duration,
    /// Ограничение по кол-ву циклов (None = до Ctrl+C)
    pub max_cycles: Option<u64>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434/api/generate".to_string(),
            model: "gemma3:1b".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            scan: ScanConfig::default(),
            sweep_command: PathBuf::from("hackrf_sweep"),
            model: ModelSettings::default(),
            log_path: PathBuf::from("rf_scan_log.csv"),
            cycle_interval: Duration::from_secs(10),
            max_cycles: None,
        }
    }
}

/// Парсит строку частоты в герцы.
///
/// Поддерживает суффиксы: `GHz`, `MHz`, `kHz`, `Hz` (регистронезависимо).
///
/// # Примеры
/// ```
/// use rfscout_scanner::config::parse_freq_hz;
/// assert_eq!(parse_freq_hz("100kHz").unwrap(), 100_000);
/// assert_eq!(parse_freq_hz("0.4GHz").unwrap(), 400_000_000);
/// assert_eq!(parse_freq_hz("2445").unwrap(), 2_445);
/// ```
pub fn parse_freq_hz(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let lower = s.to_lowercase();

    let (num_str, mult) = if let Some(v) = lower.strip_suffix("ghz") {
        (v.trim(), 1_000_000_000_f64)
    } else if let Some(v) = lower.strip_suffix("mhz") {
        (v.trim(), 1_000_000_f64)
    } else if let Some(v) = lower.strip_suffix("khz") {
        (v.trim(), 1_000_f64)
    } else if let Some(v) = lower.strip_suffix("hz") {
        (v.trim(), 1_f64)
    } else {
        // Без суффикса — число в герцах
        return s
            .parse::<u64>()
            .map_err(|e| format!("Invalid frequency '{s}': {e}"));
    };

    let n: f64 = num_str
        .parse()
        .map_err(|e| format!("Invalid frequency value '{num_str}': {e}"))?;

    if !n.is_finite() || n < 0.0 {
        return Err(format!("Invalid frequency value '{num_str}'"));
    }

    Ok((n * mult).round() as u64)
}

/// Парсит диапазон sweep `low:high` в целые МГц.
///
/// Голые числа считаются мегагерцами (как у `hackrf_sweep -f`), с суффиксом —
/// переводятся через [`parse_freq_hz`].
pub fn parse_scan_range(s: &str) -> Result<(u32, u32), String> {
    let (low, high) = s
        .split_once(':')
        .ok_or_else(|| format!("Invalid range '{s}': expected <low>:<high>"))?;

    let low = parse_mhz(low)?;
    let high = parse_mhz(high)?;

    if low >= high {
        return Err(format!("Invalid range '{s}': {low} MHz must be below {high} MHz"));
    }

    Ok((low, high))
}

fn parse_mhz(s: &str) -> Result<u32, String> {
    let s = s.trim();

    let hz = match s.parse::<f64>() {
        Ok(mhz) if mhz.is_finite() && mhz >= 0.0 => (mhz * 1_000_000.0).round() as u64,
        Ok(_) => return Err(format!("Invalid frequency '{s}'")),
        Err(_) => parse_freq_hz(s)?,
    };

    if hz % 1_000_000 != 0 {
        return Err(format!("Frequency '{s}' must be a whole number of MHz"));
    }

    u32::try_from(hz / 1_000_000).map_err(|_| format!("Frequency '{s}' is out of range"))
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
