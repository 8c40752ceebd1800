use std::{
    sync::{atomic::Ordering, Arc},
    thread::{self, JoinHandle},
    time::Duration,
};

use chrono::{Local, SubsecRound};
use log::debug;
use rfscout_core::LogSink;
use rfscout_types::{AnalysisResult, LogRecord, ScanConfig};

use crate::{
    decode_payload, extract_modulation, select_strongest, Event, EventBus, GainSuggestion,
    ScanError, ScanMetrics, ScanResult, SignalAnalyst, SignalEvent, StateSnapshot, StopSignal,
    SweepRunner,
};

/// Состояние цикла сканирования.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    Idle,
    Scanning,
    Selecting,
    Analyzing,
    Extracting,
    Logging,
    Adjusting,
    Waiting,
    Stopped,
}

/// Чем закончился один цикл.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Сигнал найден, проанализирован и отправлен в журнал
    Signal(LogRecord),
    /// Sweep не дал ни одной корректной строки
    NoSignal,
}

/// Автономный цикл: sweep -> выбор -> анализ -> журнал -> подстройка усиления.
///
/// Конфигурация принадлежит циклу целиком: усиления меняются только здесь,
/// между проходами. Один экземпляр — один цикл; `run` берёт `&mut self`,
/// `spawn` забирает цикл в отдельный поток.
pub struct ScanLoop {
    config: ScanConfig,
    cycle_interval: Duration,
    max_cycles: Option<u64>,
    sweeper: Box<dyn SweepRunner>,
    analyst: SignalAnalyst,
    sink: Box<dyn LogSink>,
    events: EventBus,
    stop: StopSignal,
    metrics: Arc<ScanMetrics>,
    phase: LoopPhase,
}

impl ScanLoop {
    /// Создаёт цикл, проверяя конфигурацию.
    pub fn new(
        config: ScanConfig,
        sweeper: Box<dyn SweepRunner>,
        analyst: SignalAnalyst,
        sink: Box<dyn LogSink>,
    ) -> ScanResult<Self> {
        config
            .validate()
            .map_err(|e| ScanError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            config,
            cycle_interval: Duration::from_secs(10),
            max_cycles: None,
            sweeper,
            analyst,
            sink,
            events: EventBus::new(),
            stop: StopSignal::new(),
            metrics: ScanMetrics::new(),
            phase: LoopPhase::Idle,
        })
    }

    pub fn with_interval(
        mut self,
        interval: Duration,
    ) -> Self {
        self.cycle_interval = interval;
        self
    }

    pub fn with_max_cycles(
        mut self,
        max_cycles: Option<u64>,
    ) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    pub fn with_events(
        mut self,
        events: EventBus,
    ) -> Self {
        self.events = events;
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    pub fn events(&self) -> EventBus {
        self.events.clone()
    }

    /// Сигнал остановки. `request_stop()` для graceful shutdown.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn metrics(&self) -> Arc<ScanMetrics> {
        self.metrics.clone()
    }

    /// Запускает цикл. Блокируется до остановки.
    ///
    /// `Ok` — остановка по запросу или по лимиту циклов, `Err` — только
    /// фатальная ошибка (утилита sweep недоступна).
    pub fn run(&mut self) -> ScanResult<()> {
        self.events.log("--- rfscout scan loop started ---");
        self.events.set_state(StateSnapshot::from(&self.config));

        let mut completed: u64 = 0;

        let result = loop {
            if self.stop.is_stop_requested() {
                break Ok(());
            }

            match self.run_cycle() {
                Ok(_) => {}
                Err(e) if e.is_fatal() => {
                    self.events.log(format!("Error: {e}. Stopping scan loop."));
                    self.stop.request_stop();
                    break Err(e);
                }
                Err(e) => self.events.log(format!("Error executing sweep: {e}")),
            }

            completed += 1;

            if let Some(max) = self.max_cycles {
                if completed >= max {
                    self.events.log(format!("Cycle limit reached ({max})."));
                    break Ok(());
                }
            }

            self.set_phase(LoopPhase::Waiting);
            self.events.log(format!(
                "--- Waiting for next scan cycle ({:?}) ---",
                self.cycle_interval
            ));

            if self.stop.wait(self.cycle_interval) {
                break Ok(());
            }
        };

        self.set_phase(LoopPhase::Stopped);
        self.events.log("--- rfscout scan loop stopped ---");

        result
    }

    /// Один проход: scan -> select -> analyze -> extract -> log -> adjust.
    pub fn run_cycle(&mut self) -> ScanResult<CycleOutcome> {
        self.metrics.cycles.fetch_add(1, Ordering::Relaxed);

        self.set_phase(LoopPhase::Scanning);
        self.events.log(format!(
            "Scanning from {} MHz to {} MHz... (LNA: {}, VGA: {}, AMP: {})",
            self.config.freq_start_mhz,
            self.config.freq_end_mhz,
            self.config.lna_gain,
            self.config.vga_gain,
            self.config.amp_enabled
        ));

        let raw = match self.sweeper.run_sweep(&self.config) {
            Ok(raw) => raw,
            Err(e) => {
                if !e.is_fatal() {
                    self.metrics.sweep_failures.fetch_add(1, Ordering::Relaxed);
                }
                return Err(e);
            }
        };

        self.set_phase(LoopPhase::Selecting);
        let Some(observation) = select_strongest(&raw) else {
            self.metrics.no_signal_cycles.fetch_add(1, Ordering::Relaxed);
            self.events.log("No significant signals found in this sweep.");
            return Ok(CycleOutcome::NoSignal);
        };

        self.events.log(format!(
            "Strongest signal found at {:.3} MHz with {:.2} dBm",
            observation.frequency_mhz, observation.power_db
        ));

        self.set_phase(LoopPhase::Analyzing);
        self.events.log(format!(
            "Analyzing signal at {:.3} MHz with language model...",
            observation.frequency_mhz
        ));

        let analysis = self.analyst.analyze(&observation, &self.config);

        for e in analysis.errors() {
            self.metrics.analysis_failures.fetch_add(1, Ordering::Relaxed);
            self.events.log(format!("Error communicating with language model: {e}"));
        }

        let description = analysis.description_text().to_string();
        let suggestions = analysis.suggestions_text().to_string();

        self.events.log(format!("Model description: {description}"));
        self.events.log(format!("Model suggestions: {suggestions}"));

        self.set_phase(LoopPhase::Extracting);
        let modulation = extract_modulation(&description);

        self.events.log(format!(
            "Decoding placeholder for signal at {:.3} MHz (Modulation: {modulation})",
            observation.frequency_mhz
        ));
        let decoded = decode_payload(&observation, modulation);

        let result = AnalysisResult {
            description,
            suggestions,
            modulation,
            decoded,
        };

        self.set_phase(LoopPhase::Logging);
        let timestamp = Local::now().naive_local().trunc_subsecs(0);
        let record = LogRecord::new(timestamp, &observation, &result, &self.config);

        match self.sink.append(&record) {
            Ok(()) => {
                self.metrics.signals_logged.fetch_add(1, Ordering::Relaxed);
                self.events
                    .log(format!("Data for {} MHz logged.", record.frequency_str()));
            }
            Err(e) => {
                // Не прерываем — запись следующего цикла может пройти
                self.metrics.log_errors.fetch_add(1, Ordering::Relaxed);
                self.events.log(format!("Failed to write log record: {e}"));
            }
        }

        self.events
            .publish(Event::NewSignal(SignalEvent::from(&record)));

        self.set_phase(LoopPhase::Adjusting);
        let suggestion = GainSuggestion::parse(&result.suggestions);

        if let Some(lna) = suggestion.lna_gain {
            self.events.log(format!("Adjusted LNA gain to {lna}"));
        }
        if let Some(vga) = suggestion.vga_gain {
            self.events.log(format!("Adjusted VGA gain to {vga}"));
        }

        if !suggestion.is_empty() {
            self.config = suggestion.apply(&self.config);
            self.events.set_state(StateSnapshot::from(&self.config));
        }

        Ok(CycleOutcome::Signal(record))
    }

    /// Переносит цикл в отдельный поток.
    pub fn spawn(self) -> ScanResult<LoopHandle> {
        let stop = self.stop.clone();
        let events = self.events.clone();
        let metrics = self.metrics.clone();

        let handle = thread::Builder::new()
            .name("rfscout-scan".to_string())
            .spawn(move || {
                let mut scan_loop = self;
                scan_loop.run().map(|()| scan_loop.config)
            })?;

        Ok(LoopHandle {
            stop,
            events,
            metrics,
            handle,
        })
    }

    fn set_phase(
        &mut self,
        phase: LoopPhase,
    ) {
        debug!("Loop phase: {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }
}

/// Управление циклом, запущенным через [`ScanLoop::spawn`].
pub struct LoopHandle {
    stop: StopSignal,
    events: EventBus,
    metrics: Arc<ScanMetrics>,
    handle: JoinHandle<ScanResult<ScanConfig>>,
}

impl LoopHandle {
    /// Запрашивает остановку; цикл выйдет на ближайшей точке проверки.
    pub fn stop(&self) {
        self.stop.request_stop();
    }

    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn events(&self) -> EventBus {
        self.events.clone()
    }

    pub fn metrics(&self) -> Arc<ScanMetrics> {
        self.metrics.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Дожидается завершения. Возвращает итоговую конфигурацию (с последними
    /// усилениями).
    pub fn join(self) -> ScanResult<ScanConfig> {
        self.handle.join().map_err(|_| ScanError::ThreadPanicked)?
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
