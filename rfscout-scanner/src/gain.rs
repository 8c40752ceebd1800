use std::{num::IntErrorKind, sync::LazyLock};

use log::warn;
use regex::Regex;
use rfscout_types::{clamp_lna_gain, clamp_vga_gain, ScanConfig};

static LNA_SUGGESTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)LNA gain (\d+)").expect("valid LNA regex"));

static VGA_SUGGESTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)VGA gain (\d+)").expect("valid VGA regex"));

/// Усиления, извлечённые из рекомендаций модели (уже ограниченные).
///
/// `None` — модель не предложила значение, текущее остаётся.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GainSuggestion {
    pub lna_gain: Option<u32>,
    pub vga_gain: Option<u32>,
}

impl GainSuggestion {
    /// Ищет `LNA gain <n>` и `VGA gain <n>` независимо друг от друга.
    pub fn parse(suggestions: &str) -> Self {
        Self {
            lna_gain: find_gain(&LNA_SUGGESTION, suggestions, "LNA").map(clamp_lna_gain),
            vga_gain: find_gain(&VGA_SUGGESTION, suggestions, "VGA").map(clamp_vga_gain),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lna_gain.is_none() && self.vga_gain.is_none()
    }

    /// Новая конфигурация; поля без предложения не меняются.
    pub fn apply(
        &self,
        config: &ScanConfig,
    ) -> ScanConfig {
        ScanConfig {
            lna_gain: self.lna_gain.unwrap_or(config.lna_gain),
            vga_gain: self.vga_gain.unwrap_or(config.vga_gain),
            ..config.clone()
        }
    }
}

/// Чистая функция: (старая конфигурация, текст рекомендаций) -> новая.
pub fn adjust_gains(
    config: &ScanConfig,
    suggestions: &str,
) -> ScanConfig {
    GainSuggestion::parse(suggestions).apply(config)
}

fn find_gain(
    pattern: &Regex,
    text: &str,
    name: &str,
) -> Option<u32> {
    let digits = pattern.captures(text)?.get(1)?.as_str();

    match digits.parse::<u32>() {
        Ok(v) => Some(v),
        // Слишком большое число всё равно упрётся в верхнюю границу
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Some(u32::MAX),
        Err(e) => {
            warn!("Could not parse new {name} gain from suggestions ({digits:?}): {e}");
            None
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
