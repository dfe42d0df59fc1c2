use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// API 키 전달 헤더 (URL에 키를 남기지 않음)
const API_KEY_HEADER: &str = "x-goog-api-key";

/// 헬스체크 프롬프트 (최소 응답 유도)
const HEALTH_CHECK_PROMPT: &str = "Respond with exactly 'ok'";

/// Gemini 클라이언트 설정
///
/// API 키는 생성자로만 전달되며, 클라이언트 내부에서 환경 변수를 읽지 않습니다.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub timeout_secs: u64,
}

/// 안전 필터 카테고리
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HarmCategory {
    #[serde(rename = "HARM_CATEGORY_HARASSMENT")]
    Harassment,
    #[serde(rename = "HARM_CATEGORY_HATE_SPEECH")]
    HateSpeech,
    #[serde(rename = "HARM_CATEGORY_SEXUALLY_EXPLICIT")]
    SexuallyExplicit,
    #[serde(rename = "HARM_CATEGORY_DANGEROUS_CONTENT")]
    DangerousContent,
}

/// 안전 필터 차단 기준
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmBlockThreshold {
    BlockNone,
    BlockOnlyHigh,
    BlockMediumAndAbove,
    BlockLowAndAbove,
}

impl HarmBlockThreshold {
    pub fn as_str(self) -> &'static str {
        match self {
            HarmBlockThreshold::BlockNone => "BLOCK_NONE",
            HarmBlockThreshold::BlockOnlyHigh => "BLOCK_ONLY_HIGH",
            HarmBlockThreshold::BlockMediumAndAbove => "BLOCK_MEDIUM_AND_ABOVE",
            HarmBlockThreshold::BlockLowAndAbove => "BLOCK_LOW_AND_ABOVE",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown harm block threshold: {0}")]
pub struct UnknownThreshold(String);

impl FromStr for HarmBlockThreshold {
    type Err = UnknownThreshold;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BLOCK_NONE" => Ok(HarmBlockThreshold::BlockNone),
            "BLOCK_ONLY_HIGH" => Ok(HarmBlockThreshold::BlockOnlyHigh),
            "BLOCK_MEDIUM_AND_ABOVE" => Ok(HarmBlockThreshold::BlockMediumAndAbove),
            "BLOCK_LOW_AND_ABOVE" => Ok(HarmBlockThreshold::BlockLowAndAbove),
            _ => Err(UnknownThreshold(s.to_string())),
        }
    }
}

/// 카테고리별 안전 필터 설정
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafetySettings {
    pub harassment: HarmBlockThreshold,
    pub hate_speech: HarmBlockThreshold,
    pub sexually_explicit: HarmBlockThreshold,
    pub dangerous_content: HarmBlockThreshold,
}

impl SafetySettings {
    /// 네 카테고리에 같은 기준 적용
    pub fn uniform(threshold: HarmBlockThreshold) -> Self {
        Self {
            harassment: threshold,
            hate_speech: threshold,
            sexually_explicit: threshold,
            dangerous_content: threshold,
        }
    }

    /// `generateContent` 요청의 `safetySettings` 항목으로 변환
    pub fn to_wire(&self) -> Vec<SafetySetting> {
        vec![
            SafetySetting::new(HarmCategory::Harassment, self.harassment),
            SafetySetting::new(HarmCategory::HateSpeech, self.hate_speech),
            SafetySetting::new(HarmCategory::SexuallyExplicit, self.sexually_explicit),
            SafetySetting::new(HarmCategory::DangerousContent, self.dangerous_content),
        ]
    }
}

impl Default for SafetySettings {
    fn default() -> Self {
        Self::uniform(HarmBlockThreshold::BlockNone)
    }
}

/// AI 클라이언트 인터페이스
///
/// Gemini 호출을 추상화하여 테스트에서 Mock 객체로 대체할 수 있습니다.
/// 재시도는 하지 않으며, 모든 호출 실패는 `UpstreamFailure`로 반환합니다.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AiClientTrait: Send + Sync {
    /// 프롬프트 하나로 텍스트 생성
    async fn generate(&self, prompt: &str, safety: &SafetySettings) -> Result<String, AppError>;

    /// 헬스체크용 최소 텍스트 생성
    async fn health_check(&self) -> Result<String, AppError>;
}

/// Arc로 래핑된 AiClient (Clone 지원)
pub type AiClient = Arc<dyn AiClientTrait>;

/// Gemini REST API 클라이언트 구현체
#[derive(Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::InternalError(format!("HTTP 클라이언트 생성 실패: {e}")))?;

        Ok(Self { config, http })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait::async_trait]
impl AiClientTrait for GeminiClient {
    async fn generate(&self, prompt: &str, safety: &SafetySettings) -> Result<String, AppError> {
        let request = GenerateContentRequest::single_turn(prompt, safety);

        tracing::debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            "Sending request to Gemini API"
        );

        let response = self
            .http
            .post(self.endpoint())
            .header(API_KEY_HEADER, self.config.api_key.as_str())
            .json(&request)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &detail));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AppError::UpstreamFailure(format!("Gemini 응답 디코딩 실패: {e}")))?;

        extract_text(body)
    }

    async fn health_check(&self) -> Result<String, AppError> {
        self.generate(HEALTH_CHECK_PROMPT, &SafetySettings::default())
            .await
    }
}

/// 전송 에러 분류
///
/// `reqwest::Error`의 Display에는 요청 URL이 포함되므로 URL을 제거한 뒤 기록합니다.
fn classify_transport_error(error: reqwest::Error) -> AppError {
    let error = error.without_url();
    if error.is_timeout() {
        AppError::UpstreamFailure("Gemini 요청 시간 초과".to_string())
    } else if error.is_connect() {
        AppError::UpstreamFailure(format!("Gemini 연결 실패: {error}"))
    } else {
        AppError::UpstreamFailure(error.to_string())
    }
}

/// HTTP 상태 코드 기반 에러 분류
fn classify_status(status: reqwest::StatusCode, detail: &str) -> AppError {
    let reason = match status.as_u16() {
        400 => "잘못된 요청",
        401 | 403 => "인증 실패",
        404 => "모델을 찾을 수 없음",
        429 => "쿼터 초과",
        500..=599 => "서비스 에러",
        _ => "알 수 없는 에러",
    };
    AppError::UpstreamFailure(format!("Gemini {reason} ({status}): {detail}"))
}

/// 응답에서 첫 번째 후보의 텍스트 추출
///
/// 프롬프트 차단, 후보 없음, 텍스트 없는 후보는 모두 호출 실패로 취급합니다.
fn extract_text(response: GenerateContentResponse) -> Result<String, AppError> {
    if let Some(reason) = response
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason)
    {
        return Err(AppError::UpstreamFailure(format!(
            "프롬프트가 안전 필터에 의해 차단되었습니다: {reason}"
        )));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| AppError::UpstreamFailure("Gemini 응답에 후보가 없습니다".to_string()))?;

    let texts: Vec<String> = candidate
        .content
        .map(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|part| part.text)
        .collect();

    if texts.is_empty() {
        let reason = candidate.finish_reason.as_deref().unwrap_or("UNKNOWN");
        return Err(AppError::UpstreamFailure(format!(
            "Gemini 응답에 텍스트가 없습니다 (finishReason: {reason})"
        )));
    }

    Ok(texts.concat())
}

// Gemini generateContent 요청/응답 형식

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    safety_settings: Vec<SafetySetting>,
}

impl<'a> GenerateContentRequest<'a> {
    fn single_turn(prompt: &'a str, safety: &SafetySettings) -> Self {
        Self {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            safety_settings: safety.to_wire(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SafetySetting {
    category: HarmCategory,
    threshold: HarmBlockThreshold,
}

impl SafetySetting {
    fn new(category: HarmCategory, threshold: HarmBlockThreshold) -> Self {
        Self {
            category,
            threshold,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}
