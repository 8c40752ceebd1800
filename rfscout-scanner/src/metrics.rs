use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Instant,
};

/// Счётчики цикла сканирования, lock-free.
#[derive(Debug, Default)]
pub struct ScanMetrics {
    /// Завершённых циклов (включая пустые и неудачные)
    pub cycles: AtomicU64,
    pub signals_logged: AtomicU64,
    pub no_signal_cycles: AtomicU64,
    pub sweep_failures: AtomicU64,
    /// Неудачных запросов к модели (по одному на промпт)
    pub analysis_failures: AtomicU64,
    pub log_errors: AtomicU64,
}

/// Snapshot метрик для отображения / тестирования.
#[derive(Debug, Clone)]
pub struct MetricsSummary {
    pub duration_secs: f64,
    pub cycles: u64,
    pub signals_logged: u64,
    pub no_signal_cycles: u64,
    pub sweep_failures: u64,
    pub analysis_failures: u64,
    pub log_errors: u64,
    pub avg_cycle_secs: f64,
    pub signal_rate_pct: f64,
}

impl ScanMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Доля циклов, в которых найден и записан сигнал (0.0-100.0).
    pub fn signal_rate_pct(&self) -> f64 {
        let cycles = self.cycles.load(Ordering::Relaxed);

        if cycles == 0 {
            0.0
        } else {
            self.signals_logged.load(Ordering::Relaxed) as f64 / cycles as f64 * 100.0
        }
    }

    /// Средняя длительность цикла, включая ожидание.
    pub fn avg_cycle_secs(
        &self,
        elapsed: &Instant,
    ) -> f64 {
        let cycles = self.cycles.load(Ordering::Relaxed);

        if cycles == 0 {
            return 0.0;
        }

        elapsed.elapsed().as_secs_f64() / cycles as f64
    }

    /// Итоговая сводка для вывода в конце сессии.
    pub fn summary(
        &self,
        elapsed: &Instant,
    ) -> MetricsSummary {
        MetricsSummary {
            duration_secs: elapsed.elapsed().as_secs_f64(),
            cycles: self.cycles.load(Ordering::Relaxed),
            signals_logged: self.signals_logged.load(Ordering::Relaxed),
            no_signal_cycles: self.no_signal_cycles.load(Ordering::Relaxed),
            sweep_failures: self.sweep_failures.load(Ordering::Relaxed),
            analysis_failures: self.analysis_failures.load(Ordering::Relaxed),
            log_errors: self.log_errors.load(Ordering::Relaxed),
            avg_cycle_secs: self.avg_cycle_secs(elapsed),
            signal_rate_pct: self.signal_rate_pct(),
        }
    }
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(f, "  Duration      : {:.1}s", self.duration_secs)?;
        writeln!(f, "  Cycles        : {}", self.cycles)?;
        writeln!(
            f,
            "  Signals       : {} ({:.1}%)",
            self.signals_logged, self.signal_rate_pct
        )?;
        writeln!(f, "  Empty sweeps  : {}", self.no_signal_cycles)?;
        writeln!(f, "  Sweep errors  : {}", self.sweep_failures)?;
        writeln!(f, "  Model errors  : {}", self.analysis_failures)?;
        writeln!(f, "  Log errors    : {}", self.log_errors)?;
        writeln!(f, "  Avg cycle     : {:.1}s", self.avg_cycle_secs)?;
        write!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_initial_metrics_zero() {
        let metrics = ScanMetrics::new();
        let summary = metrics.summary(&Instant::now());

        assert_eq!(summary.cycles, 0);
        assert_eq!(summary.signals_logged, 0);
        assert_eq!(summary.analysis_failures, 0);
        assert_eq!(summary.avg_cycle_secs, 0.0);
        assert_eq!(summary.signal_rate_pct, 0.0);
    }

    #[test]
    fn test_signal_rate_and_avg_cycle() {
        let metrics = ScanMetrics::new();
        metrics.cycles.store(4, Ordering::Relaxed);
        metrics.signals_logged.store(3, Ordering::Relaxed);
        metrics.no_signal_cycles.store(1, Ordering::Relaxed);

        let start = Instant::now() - Duration::from_secs(40);
        let summary = metrics.summary(&start);

        assert!((summary.signal_rate_pct - 75.0).abs() < 1e-6);
        // 40s / 4 цикла ≈ 10s
        assert!((summary.avg_cycle_secs - 10.0).abs() < 0.5);

        let text = summary.to_string();
        assert!(text.contains("Signals       : 3 (75.0%)"));
    }
}
