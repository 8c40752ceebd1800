//! Живой канал обновлений для внешних наблюдателей (UI, `--json-events`).
//!
//! Цикл публикует события, подписчики только читают. Публикация никогда не
//! блокирует цикл: каналы неограниченные, отключившиеся подписчики
//! удаляются при следующей публикации.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use log::info;
use parking_lot::Mutex;
use rfscout_types::{LogRecord, ScanConfig};
use serde::Serialize;

/// Первое сообщение каждому новому подписчику.
pub const WELCOME_MESSAGE: &str = "Connected to rfscout live feed";

/// Событие живого канала.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// Строка наблюдаемости
    Log { data: String },
    /// Новая запись журнала
    NewSignal(SignalEvent),
    /// Текущие усиления и диапазон
    StateUpdate(StateSnapshot),
}

/// Те же поля, что и у записи журнала.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalEvent {
    pub timestamp: String,
    pub frequency: String,
    pub modulation: String,
    pub lna_gain: u32,
    pub vga_gain: u32,
    pub amp_enabled: bool,
    pub description: String,
    pub suggestions: String,
    pub decoded: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateSnapshot {
    pub lna_gain: u32,
    pub vga_gain: u32,
    pub amp_enabled: bool,
    pub scan_range: String,
}

impl From<&LogRecord> for SignalEvent {
    fn from(r: &LogRecord) -> Self {
        Self {
            timestamp: r.timestamp_str(),
            frequency: r.frequency_str(),
            modulation: r.modulation.to_string(),
            lna_gain: r.lna_gain,
            vga_gain: r.vga_gain,
            amp_enabled: r.amp_enabled,
            description: r.description.clone(),
            suggestions: r.suggestions.clone(),
            decoded: r.decoded.clone(),
        }
    }
}

impl From<&ScanConfig> for StateSnapshot {
    fn from(c: &ScanConfig) -> Self {
        Self {
            lna_gain: c.lna_gain,
            vga_gain: c.vga_gain,
            amp_enabled: c.amp_enabled,
            scan_range: c.range_label(),
        }
    }
}

#[derive(Default)]
struct BusInner {
    subscribers: Vec<Sender<Event>>,
    state: Option<StateSnapshot>,
}

/// Рассылка событий всем подписчикам.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<Mutex<BusInner>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Новый подписчик сразу получает приветствие и последний снимок состояния.
    pub fn subscribe(&self) -> Receiver<Event> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut inner = self.inner.lock();

        let _ = tx.send(Event::Log {
            data: WELCOME_MESSAGE.to_string(),
        });

        if let Some(state) = &inner.state {
            let _ = tx.send(Event::StateUpdate(state.clone()));
        }

        inner.subscribers.push(tx);
        rx
    }

    pub fn publish(
        &self,
        event: Event,
    ) {
        self.inner
            .lock()
            .subscribers
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Строка наблюдаемости: в лог процесса и всем подписчикам.
    pub fn log<S: Into<String>>(
        &self,
        message: S,
    ) {
        let data = message.into();
        info!("{data}");
        self.publish(Event::Log { data });
    }

    /// Запоминает снимок состояния и рассылает его.
    pub fn set_state(
        &self,
        state: StateSnapshot,
    ) {
        self.inner.lock().state = Some(state.clone());
        self.publish(Event::StateUpdate(state));
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().subscribers.len()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
