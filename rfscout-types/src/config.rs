use std::ops::RangeInclusive;

use crate::{RfError, RfResult};

/// Допустимый диапазон усиления LNA (дБ) у HackRF.
pub const LNA_GAIN_RANGE: RangeInclusive<u32> = 0..=40;

/// Допустимый диапазон усиления VGA (дБ) у HackRF.
pub const VGA_GAIN_RANGE: RangeInclusive<u32> = 0..=62;

/// Параметры одного прохода sweep.
///
/// Меняется между циклами: усиления правит только контроллер усиления,
/// остальное задаётся при старте.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Нижняя граница диапазона (МГц)
    pub freq_start_mhz: u32,
    /// Верхняя граница диапазона (МГц)
    pub freq_end_mhz: u32,
    /// Ширина бина FFT (Гц)
    pub bin_width_hz: u32,
    /// Кол-во выборок на шаг перестройки
    pub num_samples: u32,
    /// Усиление LNA (дБ)
    pub lna_gain: u32,
    /// Усиление VGA (дБ)
    pub vga_gain: u32,
    /// Входной усилитель RF
    pub amp_enabled: bool,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl ScanConfig {
    /// Проверяет параметры до запуска цикла.
    pub fn validate(&self) -> RfResult<()> {
        if self.freq_start_mhz >= self.freq_end_mhz {
            return Err(RfError::invalid_config(format!(
                "range start {} MHz must be below end {} MHz",
                self.freq_start_mhz, self.freq_end_mhz
            )));
        }

        if self.bin_width_hz == 0 {
            return Err(RfError::invalid_config("bin width must be > 0"));
        }

        if self.num_samples == 0 {
            return Err(RfError::invalid_config("sample count must be > 0"));
        }

        if !LNA_GAIN_RANGE.contains(&self.lna_gain) {
            return Err(RfError::invalid_config(format!(
                "LNA gain {} outside {}..={}",
                self.lna_gain,
                LNA_GAIN_RANGE.start(),
                LNA_GAIN_RANGE.end()
            )));
        }

        if !VGA_GAIN_RANGE.contains(&self.vga_gain) {
            return Err(RfError::invalid_config(format!(
                "VGA gain {} outside {}..={}",
                self.vga_gain,
                VGA_GAIN_RANGE.start(),
                VGA_GAIN_RANGE.end()
            )));
        }

        Ok(())
    }

    /// Диапазон в человекочитаемом виде: `100-400 MHz`.
    pub fn range_label(&self) -> String {
        format!("{}-{} MHz", self.freq_start_mhz, self.freq_end_mhz)
    }
}

/// Ограничивает усиление LNA допустимым диапазоном.
pub fn clamp_lna_gain(value: u32) -> u32 {
    value.clamp(*LNA_GAIN_RANGE.start(), *LNA_GAIN_RANGE.end())
}

/// Ограничивает усиление VGA допустимым диапазоном.
pub fn clamp_vga_gain(value: u32) -> u32 {
    value.clamp(*VGA_GAIN_RANGE.start(), *VGA_GAIN_RANGE.end())
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            freq_start_mhz: 100,
            freq_end_mhz: 400,
            bin_width_hz: 100_000,
            num_samples: 131_072,
            lna_gain: 16,
            vga_gain: 20,
            amp_enabled: false,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
