/// Герц в одном мегагерце: sweep отдаёт частоты в Гц, остальная система
/// работает в МГц.
pub const HZ_PER_MHZ: f64 = 1_000_000.0;

/// Одна строка вывода `hackrf_sweep`.
///
/// Формат: `date, time, hz_low, hz_high, hz_bin_width, num_samples, dB, dB, ...`
#[derive(Debug, Clone, PartialEq)]
pub struct SweepRow {
    /// Нижняя граница сегмента (Гц)
    pub hz_low: u64,
    /// Верхняя граница сегмента (Гц)
    pub hz_high: u64,
    /// Ширина бина (Гц)
    pub bin_width_hz: u64,
    /// Кол-во выборок (не все сборки sweep его заполняют)
    pub num_samples: Option<u64>,
    /// Мощность первого бина строки (дБ)
    pub power_db: f64,
}

/// Самый сильный сигнал, найденный за один проход.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalObservation {
    /// Центральная частота (МГц)
    pub frequency_mhz: f64,
    /// Мощность (дБ)
    pub power_db: f64,
    /// Ширина полосы (Гц) — ширина бина sweep
    pub bandwidth_hz: u64,
}

impl SignalObservation {
    /// Строит наблюдение из строки sweep: центр сегмента в МГц.
    pub fn from_row(row: &SweepRow) -> Self {
        let center_hz = (row.hz_low as f64 + row.hz_high as f64) / 2.0;

        Self {
            frequency_mhz: center_hz / HZ_PER_MHZ,
            power_db: row.power_db,
            bandwidth_hz: row.bin_width_hz,
        }
    }

    /// Ширина полосы в кГц (для промптов).
    pub fn bandwidth_khz(&self) -> f64 {
        self.bandwidth_hz as f64 / 1_000.0
    }
}
