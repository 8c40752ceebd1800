use std::{
    io::{BufRead, BufReader, Read, Write},
    net::{TcpListener, TcpStream},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

use rfscout_core::{CsvLogStore, LogReader};
use rfscout_scanner::{
    Event, HackRfSweep, ModelSettings, OllamaClient, ScanError, ScanLoop, SignalAnalyst,
};
use rfscout_types::{Modulation, ScanConfig, DECODE_PLACEHOLDER};
use tempfile::{tempdir, TempDir};

// ===========================================================================
// Helpers
// ===========================================================================

/// Фейковый Ollama: отвечает на каждый запрос и закрывает соединение.
///
/// Описание и рекомендации различаются по тексту промпта.
fn spawn_fake_ollama(
    description: &'static str,
    suggestions: &'static str,
) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/api/generate", listener.local_addr().unwrap());
    let served = Arc::new(AtomicUsize::new(0));
    let counter = served.clone();

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { break };
            let body = read_request_body(&stream);

            let text = if body.contains("configuring a receiver") {
                suggestions
            } else {
                description
            };
            let reply = serde_json::json!({ "model": "test", "response": text, "done": true })
                .to_string();

            let mut stream = stream;
            let _ = write!(
                stream,
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{reply}",
                reply.len()
            );
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });

    (url, served)
}

fn read_request_body(stream: &TcpStream) -> String {
    let mut reader = BufReader::new(stream);
    let mut content_length = 0usize;

    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }

    let mut body = vec![0u8; content_length];
    let _ = reader.read_exact(&mut body);
    String::from_utf8_lossy(&body).into_owned()
}

/// Скрипт-заменитель `hackrf_sweep`: печатает CSV и дописывает свои
/// аргументы в `args.log`.
fn fake_sweep(
    dir: &TempDir,
    csv: &str,
) -> HackRfSweep {
    let args_log = dir.path().join("args.log");
    let script = dir.path().join("hackrf_sweep.sh");

    std::fs::write(
        &script,
        format!(
            "echo \"$@\" >> '{}'\ncat <<'CSV'\n{csv}CSV\n",
            args_log.display()
        ),
    )
    .unwrap();

    // Через /bin/sh: без chmod и без ETXTBSY
    HackRfSweep::new("/bin/sh").with_prefix_args([script.to_string_lossy()])
}

fn sweep_invocations(dir: &TempDir) -> Vec<String> {
    std::fs::read_to_string(dir.path().join("args.log"))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

fn client(url: String) -> OllamaClient {
    OllamaClient::new(ModelSettings {
        endpoint: url,
        model: "gemma3:1b".to_string(),
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

const SWEEP_CSV: &str = "date, time, hz_low, hz_high, hz_bin_width, num_samples, dB\n\
                         2024-01-01, 00:00:00, 100000000, 100100000, 100000, 131072, -20.5\n\
                         2024-01-01, 00:00:00, 162500000, 162600000, 100000, 131072, -35.0\n";

// ===========================================================================
// End-to-end
// ===========================================================================

#[cfg(unix)]
#[test]
fn test_two_cycles_log_and_adapt_gains() {
    let dir = tempdir().unwrap();
    let log_path = dir.path().join("rf_scan_log.csv");
    let (url, served) = spawn_fake_ollama(
        "Likely a WFM broadcast station.",
        "New settings: LNA gain 8, VGA gain 26",
    );

    let mut scan_loop = ScanLoop::new(
        ScanConfig::default(),
        Box::new(fake_sweep(&dir, SWEEP_CSV)),
        SignalAnalyst::new(Box::new(client(url))),
        Box::new(CsvLogStore::open(&log_path).unwrap()),
    )
    .unwrap()
    .with_interval(Duration::from_millis(10))
    .with_max_cycles(Some(2));

    scan_loop.run().unwrap();

    // Два цикла, по два запроса к модели
    assert_eq!(served.load(Ordering::SeqCst), 4);

    let records = LogReader::open(&log_path).unwrap().records().unwrap();
    assert_eq!(records.len(), 2);

    let first = &records[0];
    assert_eq!(first.frequency_str(), "100.050");
    assert_eq!(first.modulation, Modulation::Wfm);
    assert_eq!((first.lna_gain, first.vga_gain), (16, 20));
    assert_eq!(first.description, "Likely a WFM broadcast station.");
    assert_eq!(first.decoded, DECODE_PLACEHOLDER);

    // Второй проход уже с подстроенными усилениями
    assert_eq!((records[1].lna_gain, records[1].vga_gain), (8, 26));

    let calls = sweep_invocations(&dir);
    assert_eq!(calls.len(), 2);
    assert!(calls[0].contains("-f 100:400 -l 16 -g 20 -w 100000 -n 131072"));
    assert!(calls[1].contains("-l 8 -g 26"));
    assert!(calls.iter().all(|c| c.ends_with("-1")));
}

#[cfg(unix)]
#[test]
fn test_unreachable_model_still_logs_record() {
    let dir = tempdir().unwrap();
    let log_path = dir.path().join("rf_scan_log.csv");

    // Порт занят и сразу освобождён — соединение будет отклонено
    let url = {
        let l = TcpListener::bind("127.0.0.1:0").unwrap();
        format!("http://{}/api/generate", l.local_addr().unwrap())
    };

    let mut scan_loop = ScanLoop::new(
        ScanConfig::default(),
        Box::new(fake_sweep(&dir, SWEEP_CSV)),
        SignalAnalyst::new(Box::new(client(url))),
        Box::new(CsvLogStore::open(&log_path).unwrap()),
    )
    .unwrap()
    .with_max_cycles(Some(1));
    let metrics = scan_loop.metrics();

    scan_loop.run().unwrap();

    let records = LogReader::open(&log_path).unwrap().records().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].description, "Analysis failed.");
    assert_eq!(records[0].suggestions, "No suggestions.");
    assert_eq!(records[0].modulation, Modulation::Unknown);
    assert_eq!((records[0].lna_gain, records[0].vga_gain), (16, 20));
    assert_eq!(scan_loop.config(), &ScanConfig::default());
    assert_eq!(metrics.analysis_failures.load(Ordering::Relaxed), 2);
}

#[cfg(unix)]
#[test]
fn test_empty_sweep_writes_nothing() {
    let dir = tempdir().unwrap();
    let log_path = dir.path().join("rf_scan_log.csv");
    let (url, served) = spawn_fake_ollama("unused", "unused");

    let mut scan_loop = ScanLoop::new(
        ScanConfig::default(),
        Box::new(fake_sweep(
            &dir,
            "date, time, hz_low, hz_high, hz_bin_width, num_samples, dB\n",
        )),
        SignalAnalyst::new(Box::new(client(url))),
        Box::new(CsvLogStore::open(&log_path).unwrap()),
    )
    .unwrap()
    .with_interval(Duration::from_millis(10))
    .with_max_cycles(Some(2));

    scan_loop.run().unwrap();

    assert_eq!(served.load(Ordering::SeqCst), 0, "модель не вызывается");
    assert!(LogReader::open(&log_path).unwrap().records().unwrap().is_empty());
    assert_eq!(sweep_invocations(&dir).len(), 2);
}

#[test]
fn test_missing_sweep_tool_is_fatal() {
    let dir = tempdir().unwrap();
    let log_path = dir.path().join("rf_scan_log.csv");
    let (url, served) = spawn_fake_ollama("unused", "unused");

    let scan_loop = ScanLoop::new(
        ScanConfig::default(),
        Box::new(HackRfSweep::new(dir.path().join("no_such_hackrf_sweep"))),
        SignalAnalyst::new(Box::new(client(url))),
        Box::new(CsvLogStore::open(&log_path).unwrap()),
    )
    .unwrap()
    .with_interval(Duration::from_secs(3600));

    // Без лимита циклов: остановка только из-за ошибки
    let handle = scan_loop.spawn().unwrap();

    let deadline = Instant::now() + Duration::from_secs(10);
    while !handle.is_finished() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    assert!(handle.is_finished(), "цикл завершается сам, без stop()");
    assert!(handle.stop_signal().is_stop_requested());

    match handle.join() {
        Err(ScanError::ToolUnavailable { command, .. }) => {
            assert!(command.ends_with("no_such_hackrf_sweep"))
        }
        other => panic!("expected ToolUnavailable, got {other:?}"),
    }
    assert_eq!(served.load(Ordering::SeqCst), 0);
}

#[cfg(unix)]
#[test]
fn test_live_feed_over_spawned_loop() {
    let dir = tempdir().unwrap();
    let log_path = dir.path().join("rf_scan_log.csv");
    let (url, _) = spawn_fake_ollama(
        "AM aviation voice",
        "New settings: LNA gain 24, VGA gain 62",
    );

    let scan_loop = ScanLoop::new(
        ScanConfig::default(),
        Box::new(fake_sweep(&dir, SWEEP_CSV)),
        SignalAnalyst::new(Box::new(client(url))),
        Box::new(CsvLogStore::open(&log_path).unwrap()),
    )
    .unwrap()
    .with_interval(Duration::from_secs(3600));

    let rx = scan_loop.events().subscribe();
    let handle = scan_loop.spawn().unwrap();

    // Ждём первую запись, затем останавливаем цикл из ожидания
    let signal = loop {
        match rx.recv_timeout(Duration::from_secs(20)).unwrap() {
            Event::NewSignal(s) => break s,
            _ => continue,
        }
    };
    assert_eq!(signal.frequency, "100.050");
    assert_eq!(signal.modulation, "AM");

    let state = loop {
        match rx.recv_timeout(Duration::from_secs(20)).unwrap() {
            Event::StateUpdate(s) => break s,
            _ => continue,
        }
    };
    assert_eq!((state.lna_gain, state.vga_gain), (24, 62));
    assert_eq!(state.scan_range, "100-400 MHz");

    let events = handle.events();
    handle.stop();
    let final_config = handle.join().unwrap();
    assert_eq!(final_config.vga_gain, 62);

    // Поздний подписчик сразу получает приветствие и актуальное состояние
    let late: Vec<Event> = events.subscribe().try_iter().collect();
    assert_eq!(late.len(), 2);
    assert!(matches!(&late[1], Event::StateUpdate(s) if s.vga_gain == 62));

    // После join шина отпущена: блокирующее чтение доходит до конца потока
    // событий (так завершается и печать --json-events)
    drop(events);
    let rest: Vec<Event> = rx.iter().collect();
    assert!(matches!(
        rest.last(),
        Some(Event::Log { data }) if data.contains("stopped")
    ));
}
