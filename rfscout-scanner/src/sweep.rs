use std::{
    path::PathBuf,
    process::{Command, Stdio},
};

use log::debug;
use rfscout_types::ScanConfig;

use crate::{ScanError, ScanResult};

/// Источник сырого вывода sweep.
// Реализация: [`HackRfSweep`]; в тестах — подставные раннеры.
pub trait SweepRunner: Send {
    /// Выполняет один проход и возвращает stdout целиком.
    fn run_sweep(
        &mut self,
        config: &ScanConfig,
    ) -> ScanResult<String>;
}

/// Запуск внешней утилиты `hackrf_sweep`.
#[derive(Debug, Clone)]
pub struct HackRfSweep {
    program: PathBuf,
    /// Аргументы перед параметрами sweep (обёртки вроде `sudo`, `ssh host`)
    prefix_args: Vec<String>,
}

impl HackRfSweep {
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
            prefix_args: Vec::new(),
        }
    }

    pub fn with_prefix_args<I, S>(
        mut self,
        args: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefix_args = args.into_iter().map(Into::into).collect();
        self
    }
}

/// Аргументы `hackrf_sweep` для текущей конфигурации.
///
/// Всегда с `-1`: один проход и выход, иначе утилита работает бесконечно.
pub fn sweep_args(config: &ScanConfig) -> Vec<String> {
    let mut args = vec![
        "-f".to_string(),
        format!("{}:{}", config.freq_start_mhz, config.freq_end_mhz),
        "-l".to_string(),
        config.lna_gain.to_string(),
        "-g".to_string(),
        config.vga_gain.to_string(),
        "-w".to_string(),
        config.bin_width_hz.to_string(),
        "-n".to_string(),
        config.num_samples.to_string(),
    ];

    if config.amp_enabled {
        args.push("-a".to_string());
        args.push("1".to_string());
    }

    args.push("-1".to_string());

    args
}

impl SweepRunner for HackRfSweep {
    fn run_sweep(
        &mut self,
        config: &ScanConfig,
    ) -> ScanResult<String> {
        let args = sweep_args(config);
        let command = self.program.display().to_string();

        debug!("Running: {command} {} {}", self.prefix_args.join(" "), args.join(" "));

        let output = Command::new(&self.program)
            .args(&self.prefix_args)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ScanError::ToolUnavailable { command, source })?;

        if !output.status.success() {
            return Err(ScanError::SweepFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
