use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use crossbeam_channel::{Receiver, Sender};

/// Кооперативный сигнал остановки.
///
/// Проверяется только в определённых точках: на границе цикла и в ожидании
/// между циклами. Запрос во время sweep или запроса к модели вступает в силу
/// после их завершения.
#[derive(Debug, Clone)]
pub struct StopSignal {
    flag: Arc<AtomicBool>,
    wake_tx: Sender<()>,
    wake_rx: Receiver<()>,
}

impl StopSignal {
    pub fn new() -> Self {
        let (wake_tx, wake_rx) = crossbeam_channel::bounded(1);

        Self {
            flag: Arc::new(AtomicBool::new(false)),
            wake_tx,
            wake_rx,
        }
    }

    /// Запрашивает остановку. Возвращает `true`, если она уже была запрошена.
    pub fn request_stop(&self) -> bool {
        let already = self.flag.swap(true, Ordering::SeqCst);
        let _ = self.wake_tx.try_send(());
        already
    }

    pub fn is_stop_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Прерываемое ожидание. `true` — остановка запрошена.
    pub fn wait(
        &self,
        timeout: Duration,
    ) -> bool {
        if self.is_stop_requested() {
            return true;
        }

        if self.wake_rx.recv_timeout(timeout).is_ok() {
            // Будим остальных ожидающих
            let _ = self.wake_tx.try_send(());
        }

        self.is_stop_requested()
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}
