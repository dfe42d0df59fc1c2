use std::env;

use crate::domain::ai::client::{GeminiConfig, HarmBlockThreshold, SafetySettings};

const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// 애플리케이션 설정
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,

    // Gemini
    pub gemini: GeminiConfig,
    pub safety: SafetySettings,

    /// 설정 시 `/api/ai/*` 요청에 `x-api-key` 헤더가 필요합니다.
    pub app_secret_key: Option<String>,

    /// IP당 분당 허용 요청 수
    pub rate_limit_per_minute: u32,

    /// 프록시가 붙인 `x-forwarded-for`를 클라이언트 주소로 사용할지 여부
    pub trust_forwarded_for: bool,
}

impl AppConfig {
    /// 환경 변수에서 설정 로드
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env::var("GOOGLE_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let timeout_secs = env::var("GEMINI_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidTimeout)?;

        let safety = match env::var("GEMINI_SAFETY_THRESHOLD") {
            Ok(raw) => {
                let threshold = raw
                    .parse::<HarmBlockThreshold>()
                    .map_err(|_| ConfigError::InvalidSafetyThreshold(raw))?;
                SafetySettings::uniform(threshold)
            }
            Err(_) => SafetySettings::default(),
        };

        let rate_limit_per_minute = env::var("RATE_LIMIT_PER_MINUTE")
            .unwrap_or_else(|_| "60".to_string())
            .parse::<u32>()
            .ok()
            .filter(|limit| *limit > 0)
            .ok_or(ConfigError::InvalidRateLimit)?;

        let trust_forwarded_for = match env::var("TRUST_FORWARDED_FOR") {
            Ok(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidFlag("TRUST_FORWARDED_FOR"))?,
            Err(_) => false,
        };

        let app_secret_key = env::var("APP_SECRET_KEY")
            .ok()
            .filter(|key| !key.is_empty());
        if app_secret_key.is_none() {
            tracing::warn!(
                "APP_SECRET_KEY 환경변수가 설정되지 않았습니다. AI API가 인증 없이 열려 있습니다."
            );
        }

        Ok(Self {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port,
            gemini: GeminiConfig {
                api_key,
                model: env::var("GEMINI_MODEL")
                    .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
                api_base: env::var("GEMINI_API_BASE")
                    .unwrap_or_else(|_| DEFAULT_GEMINI_API_BASE.to_string()),
                timeout_secs,
            },
            safety,
            app_secret_key,
            rate_limit_per_minute,
            trust_forwarded_for,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("GOOGLE_API_KEY environment variable is required")]
    MissingApiKey,
    #[error("Invalid port number")]
    InvalidPort,
    #[error("Invalid Gemini timeout")]
    InvalidTimeout,
    #[error("Invalid safety threshold: {0}")]
    InvalidSafetyThreshold(String),
    #[error("RATE_LIMIT_PER_MINUTE must be a positive integer")]
    InvalidRateLimit,
    #[error("{0} must be a boolean")]
    InvalidFlag(&'static str),
}
