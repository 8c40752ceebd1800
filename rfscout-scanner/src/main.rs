use std::{
    path::PathBuf,
    thread,
    time::{Duration, Instant},
};

use clap::Parser;
use log::{error, info, warn};
use rfscout_core::CsvLogStore;
use rfscout_scanner::{
    parse_freq_hz, parse_scan_range, AnalyzerConfig, HackRfSweep, LoopHandle, ModelSettings,
    OllamaClient, ScanError, ScanLoop, SignalAnalyst,
};
use rfscout_types::ScanConfig;

#[derive(Parser, Debug)]
#[command(
    name = "rfscout",
    version = env!("CARGO_PKG_VERSION"),
    about = "Autonomous HackRF sweep analyzer: finds the strongest signal, asks a language model, adapts gains",
    long_about = None,
)]
struct Cli {
    /// Диапазон sweep, МГц (100:400, 100MHz:0.4GHz)
    #[arg(short, long, default_value = "100:400")]
    range: String,
    /// Ширина бина FFT (100kHz, 100000)
    #[arg(short = 'w', long, default_value = "100kHz")]
    bin_width: String,
    /// Выборок на бин
    #[arg(short = 'n', long, default_value = "131072")]
    samples: u32,
    /// Начальное усиление LNA, дБ (0-40)
    #[arg(short, long, default_value = "16")]
    lna: u32,
    /// Начальное усиление VGA, дБ (0-62)
    #[arg(short = 'g', long, default_value = "20")]
    vga: u32,
    /// Включить входной усилитель
    #[arg(short, long)]
    amp: bool,
    /// Путь к hackrf_sweep
    #[arg(long, default_value = "hackrf_sweep")]
    sweep_cmd: PathBuf,
    /// Эндпоинт языковой модели
    #[arg(long, default_value = "http://localhost:11434/api/generate")]
    model_url: String,
    /// Модель
    #[arg(short, long, default_value = "gemma3:1b")]
    model: String,
    /// Таймаут запроса к модели (секунды)
    #[arg(long, default_value = "30")]
    timeout: u64,
    /// Пауза между циклами (секунды)
    #[arg(short, long, default_value = "10")]
    interval: u64,
    /// CSV журнал
    #[arg(long, default_value = "rf_scan_log.csv")]
    log: PathBuf,
    /// Печатать события живого канала в stdout (JSON, по строке на событие)
    #[arg(long)]
    json_events: bool,
    /// Остановиться после N циклов. По умолчанию: до Ctrl+C
    #[arg(long)]
    max_cycles: Option<u64>,
    /// Тихий режим (только ошибки)
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
    /// Подробный лог (debug)
    #[arg(short, long)]
    verbose: bool,
}

fn build_config(cli: &Cli) -> Result<AnalyzerConfig, String> {
    let (freq_start_mhz, freq_end_mhz) =
        parse_scan_range(&cli.range).map_err(|e| format!("--range: {e}"))?;

    let bin_width_hz = match parse_freq_hz(&cli.bin_width) {
        Ok(w) if w <= u32::MAX as u64 => w as u32,
        Ok(w) => return Err(format!("--bin-width {w} Hz exceeds u32::MAX")),
        Err(e) => return Err(format!("--bin-width: {e}")),
    };

    let scan = ScanConfig {
        freq_start_mhz,
        freq_end_mhz,
        bin_width_hz,
        num_samples: cli.samples,
        lna_gain: cli.lna,
        vga_gain: cli.vga,
        amp_enabled: cli.amp,
    };

    scan.validate().map_err(|e| e.to_string())?;

    if cli.timeout == 0 {
        return Err("--timeout must be > 0".to_string());
    }

    if cli.interval == 0 {
        return Err("--interval must be > 0".to_string());
    }

    Ok(AnalyzerConfig {
        scan,
        sweep_command: cli.sweep_cmd.clone(),
        model: ModelSettings {
            endpoint: cli.model_url.clone(),
            model: cli.model.clone(),
            timeout: Duration::from_secs(cli.timeout),
        },
        log_path: cli.log.clone(),
        cycle_interval: Duration::from_secs(cli.interval),
        max_cycles: cli.max_cycles,
    })
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.quiet {
        log::LevelFilter::Error
    } else if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(level)
        .format_target(false)
        .format_timestamp_secs()
        .init();

    let config = match build_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let client = match OllamaClient::new(config.model.clone()) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to create model client: {e}");
            std::process::exit(1);
        }
    };

    let store = match CsvLogStore::open(&config.log_path) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to open log {:?}: {e}", config.log_path);
            std::process::exit(1);
        }
    };

    let scan_loop = match ScanLoop::new(
        config.scan.clone(),
        Box::new(HackRfSweep::new(&config.sweep_command)),
        SignalAnalyst::new(Box::new(client)),
        Box::new(store),
    ) {
        Ok(l) => l
            .with_interval(config.cycle_interval)
            .with_max_cycles(config.max_cycles),
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let stop = scan_loop.stop_signal();
    let metrics = scan_loop.metrics();

    if let Err(e) = ctrlc::set_handler(move || {
        if stop.request_stop() {
            // Второй Ctrl+C — принудительный выход
            warn!("Force exit");
            std::process::exit(130);
        }
        warn!("Ctrl+C received — finishing current cycle...");
    }) {
        warn!("Failed to set Ctrl+C handler: {e}");
    }

    // Поток завершается, когда цикл и его handle отпустят шину событий
    let printer = if cli.json_events {
        let rx = scan_loop.events().subscribe();

        let spawned = thread::Builder::new()
            .name("rfscout-events".to_string())
            .spawn(move || {
                for event in rx.iter() {
                    match serde_json::to_string(&event) {
                        Ok(line) => println!("{line}"),
                        Err(e) => warn!("Failed to encode event: {e}"),
                    }
                }
            });

        match spawned {
            Ok(h) => Some(h),
            Err(e) => {
                warn!("Failed to start event printer: {e}");
                None
            }
        }
    } else {
        None
    };

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("  Range         : {}", config.scan.range_label());
    info!("  Bin width     : {:.1} kHz", config.scan.bin_width_hz as f64 / 1e3);
    info!("  Samples       : {}", config.scan.num_samples);
    info!(
        "  Gains         : LNA {} dB, VGA {} dB, AMP {}",
        config.scan.lna_gain, config.scan.vga_gain, config.scan.amp_enabled
    );
    info!("  Sweep tool    : {:?}", config.sweep_command);
    info!("  Model         : {} @ {}", config.model.model, config.model.endpoint);
    info!("  Interval      : {:?}", config.cycle_interval);
    info!("  Log           : {:?}", config.log_path);
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let session_start = Instant::now();

    let result = scan_loop.spawn().and_then(LoopHandle::join);

    // Дописываем оставшиеся события до итоговой статистики
    if let Some(printer) = printer {
        if printer.join().is_err() {
            warn!("Event printer panicked");
        }
    }

    // --- Итоговая статистика ---
    info!("\n{}", metrics.summary(&session_start));

    match result {
        Ok(final_config) => info!(
            "✓ Scan loop finished (LNA {} dB, VGA {} dB). Log: {:?}",
            final_config.lna_gain, final_config.vga_gain, config.log_path
        ),
        Err(e @ ScanError::ToolUnavailable { .. }) => {
            error!("{e}. Is HackRF tools package installed?");
            std::process::exit(1);
        }
        Err(e) => {
            error!("Scan loop failed: {e}");
            std::process::exit(1);
        }
    }
}
