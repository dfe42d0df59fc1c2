use std::sync::Arc;

use super::client::{AiClient, AiClientTrait, SafetySettings};
use super::dto::{
    ComposeRequest, EmailDraft, GreetingRequest, GreetingResponse, ReplyRequest, ReplyResponse,
};
use super::parser::{parse_email_draft, parse_reply_text, EmailField};
use super::prompt::{build_email_composition, build_email_reply, build_greeting, present};
use crate::error::AppError;

/// AI 생성 서비스
///
/// 요청마다 프롬프트 생성 → 모델 호출 → 응답 검증을 수행하며 상태를 갖지 않습니다.
#[derive(Clone)]
pub struct AiService {
    client: AiClient,
    safety: SafetySettings,
}

impl AiService {
    pub fn new(client: impl AiClientTrait + 'static, safety: SafetySettings) -> Self {
        Self {
            client: Arc::new(client),
            safety,
        }
    }

    /// 인사말 생성
    pub async fn greet(&self, request: GreetingRequest) -> Result<GreetingResponse, AppError> {
        let result: Result<String, AppError> = async {
            let prompt = build_greeting(&request.message, request.name.as_deref());
            let raw = self.client.generate(&prompt, &self.safety).await?;
            parse_reply_text(&raw)
        }
        .await;
        record_outcome("greeting", &result);

        Ok(GreetingResponse {
            response: result?,
            name: normalized_name(request.name.as_deref()),
        })
    }

    /// 메시지를 이메일 초안으로 변환
    pub async fn compose(&self, request: ComposeRequest) -> Result<EmailDraft, AppError> {
        let ComposeRequest {
            message_type,
            user_message,
            email,
            name,
        } = request;

        let prompt = build_email_composition(
            message_type,
            &user_message,
            email.as_deref(),
            name.as_deref(),
        );
        tracing::debug!(
            message_type = message_type.as_str(),
            prompt_len = prompt.len(),
            "Email composition prompt built"
        );

        let result = match self.client.generate(&prompt, &self.safety).await {
            Ok(raw) => parse_email_draft(
                &raw,
                EmailField::Optional,
                email.as_deref(),
                normalized_name(name.as_deref()),
            ),
            Err(e) => Err(e),
        };
        record_outcome("compose", &result);

        result
    }

    /// 이메일 답장 생성
    pub async fn reply(&self, request: ReplyRequest) -> Result<ReplyResponse, AppError> {
        let result: Result<String, AppError> = async {
            let prompt = build_email_reply(
                request.message_type,
                &request.email,
                &request.prompt,
                request.name.as_deref(),
            );
            let raw = self.client.generate(&prompt, &self.safety).await?;
            parse_reply_text(&raw)
        }
        .await;
        record_outcome("reply", &result);

        Ok(ReplyResponse {
            response: result?,
            email: request.email_address,
            name: normalized_name(request.name.as_deref()),
        })
    }

    /// 헬스체크 (최소 텍스트 생성)
    pub async fn health_check(&self) -> Result<String, AppError> {
        self.client.health_check().await
    }
}

/// 프롬프트와 같은 기준으로 응답의 이름을 정리 (공백뿐이면 생략)
fn normalized_name(name: Option<&str>) -> Option<String> {
    present(name).map(str::to_string)
}

fn record_outcome<T>(operation: &'static str, result: &Result<T, AppError>) {
    let outcome = match result {
        Ok(_) => "success",
        Err(AppError::UpstreamFailure(_)) => "upstream_failure",
        Err(AppError::MalformedModelOutput(_)) => "malformed_output",
        Err(AppError::ValidationFailure(_)) => "validation_failure",
        Err(_) => "error",
    };

    metrics::counter!(
        "ai_generation_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);

    match result {
        Ok(_) => tracing::debug!(operation, "Generation succeeded"),
        Err(e) => tracing::debug!(operation, outcome, error = %e, "Generation failed"),
    }
}
