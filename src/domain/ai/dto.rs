use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::template::MessageType;

/// 발신자 주소가 없을 때 사용하는 자리표시 주소
pub const PLACEHOLDER_EMAIL: &str = "no-reply@example.com";

/// 인사말 기본 시드 메시지
pub const DEFAULT_GREETING_SEED: &str = "Hello";

fn default_greeting_seed() -> String {
    DEFAULT_GREETING_SEED.to_string()
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("공백만으로 이루어질 수 없습니다".into());
        return Err(error);
    }
    Ok(())
}

/// 인사말 요청 DTO
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GreetingRequest {
    /// 인사말의 시드 메시지 (기본값 "Hello")
    #[serde(default = "default_greeting_seed")]
    #[validate(
        length(min = 1, max = 5000, message = "메시지는 1자 이상 5000자 이하여야 합니다"),
        custom = "not_blank"
    )]
    #[schema(example = "Hello")]
    pub message: String,

    /// 받는 사람 이름 (없으면 이름 없는 인사말)
    #[validate(length(max = 100, message = "이름은 100자 이하여야 합니다"))]
    #[schema(example = "Ada")]
    pub name: Option<String>,
}

/// 인사말 응답 DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GreetingResponse {
    #[schema(example = "Hi Ada, it's great to hear from you!")]
    pub response: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// 메시지 → 이메일 변환 요청 DTO
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComposeRequest {
    /// 메시지 스타일 (formal / casual / custom, 그 외 값이나 누락 시 custom)
    #[serde(rename = "type", default)]
    #[schema(example = "formal")]
    pub message_type: MessageType,

    /// 이메일로 바꿀 메시지 (1 ~ 5000자)
    #[validate(
        length(min = 1, max = 5000, message = "메시지는 1자 이상 5000자 이하여야 합니다"),
        custom = "not_blank"
    )]
    #[schema(example = "Thank you for coming")]
    pub user_message: String,

    /// 발신자 이메일
    #[validate(email(message = "올바른 이메일 주소가 아닙니다"))]
    #[schema(example = "a@x.com")]
    pub email: Option<String>,

    /// 발신자 이름 (서명에 사용)
    #[validate(length(max = 100, message = "이름은 100자 이하여야 합니다"))]
    #[schema(example = "Ada")]
    pub name: Option<String>,
}

/// 검증된 이메일 초안 (변환 응답 DTO)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailDraft {
    #[schema(example = "a@x.com")]
    pub email: String,

    #[schema(example = "Thanks")]
    pub subject: String,

    #[schema(example = "Dear Friend,\n\nThank you for coming.\n\nBest, Ada")]
    pub body: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// 이메일 답장 요청 DTO
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest {
    /// 답장 받을 주소 (응답에 그대로 반환)
    #[validate(email(message = "올바른 이메일 주소가 아닙니다"))]
    #[schema(example = "sender@example.com")]
    pub email_address: String,

    /// 원본 이메일 본문
    #[validate(
        length(min = 1, max = 5000, message = "원본 이메일은 1자 이상 5000자 이하여야 합니다"),
        custom = "not_blank"
    )]
    #[schema(example = "Hi, can we meet on Tuesday?\n\nBob")]
    pub email: String,

    /// 답장 내용에 대한 지시
    #[validate(
        length(min = 1, max = 5000, message = "지시 내용은 1자 이상 5000자 이하여야 합니다"),
        custom = "not_blank"
    )]
    #[schema(example = "Respond politely and accept")]
    pub prompt: String,

    #[serde(rename = "type", default)]
    #[schema(example = "formal")]
    pub message_type: MessageType,

    /// 서명에 사용할 이름
    #[validate(length(max = 100, message = "이름은 100자 이하여야 합니다"))]
    pub name: Option<String>,
}

/// 이메일 답장 응답 DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplyResponse {
    #[schema(example = "Hi Bob,\n\nTuesday works for me.\n\nBest,\nTeam")]
    pub response: String,

    /// 요청의 `emailAddress`
    #[schema(example = "sender@example.com")]
    pub email: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}
