use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use validator::Validate;

use crate::error::AppError;
use crate::response::{BaseResponse, ErrorResponse};
use crate::AppState;

use super::dto::{
    ComposeRequest, EmailDraft, GreetingRequest, GreetingResponse, ReplyRequest, ReplyResponse,
};

/// 인사말 생성
///
/// 시드 메시지와 선택적인 이름으로 짧은 인사말을 생성합니다.
#[utoipa::path(
    post,
    path = "/api/ai/greeting",
    tag = "AI",
    request_body = GreetingRequest,
    responses(
        (status = 200, description = "인사말 생성 성공", body = BaseResponse<GreetingResponse>),
        (status = 400, description = "잘못된 요청", body = ErrorResponse),
        (status = 401, description = "인증 실패", body = ErrorResponse),
        (status = 422, description = "모델 응답 검증 실패", body = ErrorResponse),
        (status = 429, description = "요청 한도 초과", body = ErrorResponse),
        (status = 500, description = "모델 호출 실패", body = ErrorResponse)
    )
)]
pub async fn greet(
    State(state): State<AppState>,
    request: Result<Json<GreetingRequest>, JsonRejection>,
) -> Result<Json<BaseResponse<GreetingResponse>>, AppError> {
    let Json(request) = request.map_err(AppError::from)?;

    tracing::info!(
        message_length = request.message.len(),
        has_name = request.name.is_some(),
        "Greeting request received"
    );

    request.validate()?;

    let response = state.ai_service.greet(request).await?;

    tracing::info!(
        response_length = response.response.len(),
        "Greeting generated successfully"
    );

    Ok(Json(BaseResponse::success(response)))
}

/// 메시지 → 이메일 변환
///
/// 짧은 메시지를 제목과 본문을 가진 이메일 초안으로 바꿉니다.
/// 모델 응답이 JSON이 아니면 502, 필수 항목이 없으면 422를 반환합니다.
#[utoipa::path(
    post,
    path = "/api/ai/message",
    tag = "AI",
    request_body = ComposeRequest,
    responses(
        (status = 200, description = "이메일 변환 성공", body = BaseResponse<EmailDraft>),
        (status = 400, description = "잘못된 요청", body = ErrorResponse),
        (status = 401, description = "인증 실패", body = ErrorResponse),
        (status = 422, description = "모델 응답 검증 실패", body = ErrorResponse),
        (status = 429, description = "요청 한도 초과", body = ErrorResponse),
        (status = 500, description = "모델 호출 실패", body = ErrorResponse),
        (status = 502, description = "모델 응답 파싱 실패", body = ErrorResponse)
    )
)]
pub async fn compose_email(
    State(state): State<AppState>,
    request: Result<Json<ComposeRequest>, JsonRejection>,
) -> Result<Json<BaseResponse<EmailDraft>>, AppError> {
    let Json(request) = request.map_err(AppError::from)?;

    tracing::info!(
        message_type = request.message_type.as_str(),
        message_length = request.user_message.len(),
        "Compose request received"
    );

    request.validate()?;
    tracing::debug!("Request validation passed");

    let draft = state.ai_service.compose(request).await?;

    tracing::info!(
        subject_length = draft.subject.len(),
        body_length = draft.body.len(),
        "Email composed successfully"
    );

    Ok(Json(BaseResponse::success(draft)))
}

/// 이메일 답장 생성
///
/// 원본 이메일과 지시 내용을 바탕으로 제목 없는 답장 본문을 생성합니다.
#[utoipa::path(
    post,
    path = "/api/ai/reply",
    tag = "AI",
    request_body = ReplyRequest,
    responses(
        (status = 200, description = "답장 생성 성공", body = BaseResponse<ReplyResponse>),
        (status = 400, description = "잘못된 요청", body = ErrorResponse),
        (status = 401, description = "인증 실패", body = ErrorResponse),
        (status = 422, description = "모델 응답 검증 실패", body = ErrorResponse),
        (status = 429, description = "요청 한도 초과", body = ErrorResponse),
        (status = 500, description = "모델 호출 실패", body = ErrorResponse)
    )
)]
pub async fn reply_email(
    State(state): State<AppState>,
    request: Result<Json<ReplyRequest>, JsonRejection>,
) -> Result<Json<BaseResponse<ReplyResponse>>, AppError> {
    let Json(request) = request.map_err(AppError::from)?;

    tracing::info!(
        message_type = request.message_type.as_str(),
        email_length = request.email.len(),
        "Reply request received"
    );

    request.validate()?;

    let response = state.ai_service.reply(request).await?;

    tracing::info!(
        response_length = response.response.len(),
        "Reply generated successfully"
    );

    Ok(Json(BaseResponse::success(response)))
}
