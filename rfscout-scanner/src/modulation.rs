use std::sync::LazyLock;

use regex::Regex;
use rfscout_types::{Modulation, SignalObservation, DECODE_PLACEHOLDER};

static MODULATION_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(FM|NFM|WFM|AM|SSB|LSB|USB|FSK|PSK|QAM)\b").expect("valid modulation regex")
});

/// Первая модуляция, упомянутая в описании отдельным словом.
pub fn extract_modulation(description: &str) -> Modulation {
    MODULATION_TOKEN
        .captures(description)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(Modulation::Unknown)
}

/// Декодирование полезной нагрузки. Демодуляция не реализуется: всегда
/// возвращает [`DECODE_PLACEHOLDER`].
pub fn decode_payload(
    _observation: &SignalObservation,
    _modulation: Modulation,
) -> String {
    DECODE_PLACEHOLDER.to_string()
}
