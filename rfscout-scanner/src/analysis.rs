use log::debug;
use rfscout_types::{ScanConfig, SignalObservation, LNA_GAIN_RANGE, VGA_GAIN_RANGE};
use serde::{Deserialize, Serialize};

use crate::{AnalysisError, ModelResult, ModelSettings};

/// Подставляется, если описание от модели не получено.
pub const DESCRIPTION_FALLBACK: &str = "Analysis failed.";

/// Подставляется, если рекомендации от модели не получены.
pub const SUGGESTIONS_FALLBACK: &str = "No suggestions.";

/// Ниже этого уровня (дБ) сигнал считается слабым.
pub const WEAK_SIGNAL_DB: i32 = -40;

/// Выше этого уровня (дБ) сигнал считается сильным.
pub const STRONG_SIGNAL_DB: i32 = -15;

/// Форма ответа, которую разбирает контроллер усиления.
pub const SUGGESTION_FORMAT: &str = "New settings: LNA gain <value>, VGA gain <value>";

/// Текстовая языковая модель: промпт -> ответ.
pub trait LanguageModel: Send {
    fn generate(
        &self,
        prompt: &str,
    ) -> ModelResult<String>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Клиент Ollama `/api/generate` (без стриминга).
pub struct OllamaClient {
    http: reqwest::blocking::Client,
    settings: ModelSettings,
}

impl OllamaClient {
    pub fn new(settings: ModelSettings) -> ModelResult<Self> {
        // Эндпоинт обычно локальный: переменные окружения прокси игнорируем
        let http = reqwest::blocking::Client::builder()
            .timeout(settings.timeout)
            .no_proxy()
            .build()
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;

        Ok(Self { http, settings })
    }

    fn map_error(
        &self,
        e: reqwest::Error,
    ) -> AnalysisError {
        if e.is_timeout() {
            AnalysisError::Timeout(self.settings.timeout)
        } else if e.is_decode() {
            AnalysisError::Decode(e.to_string())
        } else {
            AnalysisError::Transport(e.to_string())
        }
    }
}

impl LanguageModel for OllamaClient {
    fn generate(
        &self,
        prompt: &str,
    ) -> ModelResult<String> {
        let request = GenerateRequest {
            model: &self.settings.model,
            prompt,
            stream: false,
        };

        debug!(
            "POST {} (model={}, {} chars)",
            self.settings.endpoint,
            self.settings.model,
            prompt.len()
        );

        let response = self
            .http
            .post(&self.settings.endpoint)
            .json(&request)
            .send()
            .map_err(|e| self.map_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::Status(status.as_u16()));
        }

        let body: GenerateResponse = response.json().map_err(|e| self.map_error(e))?;
        let text = body.response.trim();

        if text.is_empty() {
            return Err(AnalysisError::EmptyResponse);
        }

        Ok(text.to_string())
    }
}

/// Промпт для описания сигнала.
pub fn description_prompt(observation: &SignalObservation) -> String {
    format!(
        "You are an RF expert. A signal has been detected. \
         Frequency: {:.3} MHz, Power: {:.2} dBm, Bandwidth: {} kHz. \
         Based on this, what is the most likely type of signal, service, \
         and modulation (e.g., NFM, AM, FSK)? Be concise.",
        observation.frequency_mhz,
        observation.power_db,
        observation.bandwidth_khz()
    )
}

/// Промпт для рекомендаций по усилению. Всегда просит ответ в форме
/// [`SUGGESTION_FORMAT`].
pub fn suggestion_prompt(
    observation: &SignalObservation,
    config: &ScanConfig,
) -> String {
    format!(
        "You are an RF expert responsible for configuring a receiver. \
         A signal at {:.3} MHz has a power of {:.2} dBm. \
         Current gains are LNA: {}dB, VGA: {}dB. \
         Suggest new integer values for LNA gain ({}-{}) and VGA gain ({}-{}) \
         to optimize reception. The signal is weak if dBm is below {WEAK_SIGNAL_DB}, \
         strong if above {STRONG_SIGNAL_DB}. \
         Format your response as: '{SUGGESTION_FORMAT}' and nothing else.",
        observation.frequency_mhz,
        observation.power_db,
        config.lna_gain,
        config.vga_gain,
        LNA_GAIN_RANGE.start(),
        LNA_GAIN_RANGE.end(),
        VGA_GAIN_RANGE.start(),
        VGA_GAIN_RANGE.end(),
    )
}

/// Ответы модели на оба промпта. Ошибки не смешиваются: провал одного
/// запроса не влияет на другой.
#[derive(Debug)]
pub struct Analysis {
    pub description: ModelResult<String>,
    pub suggestions: ModelResult<String>,
}

impl Analysis {
    /// Описание или [`DESCRIPTION_FALLBACK`].
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or(DESCRIPTION_FALLBACK)
    }

    /// Рекомендации или [`SUGGESTIONS_FALLBACK`].
    pub fn suggestions_text(&self) -> &str {
        self.suggestions.as_deref().unwrap_or(SUGGESTIONS_FALLBACK)
    }

    /// Ошибки запросов, по порядку (описание, рекомендации).
    pub fn errors(&self) -> impl Iterator<Item = &AnalysisError> {
        self.description
            .as_ref()
            .err()
            .into_iter()
            .chain(self.suggestions.as_ref().err())
    }
}

/// Анализ наблюдения языковой моделью.
pub struct SignalAnalyst {
    model: Box<dyn LanguageModel>,
}

impl SignalAnalyst {
    pub fn new(model: Box<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Два независимых запроса, последовательно.
    pub fn analyze(
        &self,
        observation: &SignalObservation,
        config: &ScanConfig,
    ) -> Analysis {
        let description = self.model.generate(&description_prompt(observation));
        let suggestions = self
            .model
            .generate(&suggestion_prompt(observation, config));

        Analysis {
            description,
            suggestions,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
