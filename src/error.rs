use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::response::ErrorResponse;

/// 애플리케이션 전역 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 요청 본문 검증 실패
    #[error("잘못된 요청입니다: {0}")]
    ValidationError(String),

    /// 요청 JSON 파싱 실패
    #[error("잘못된 요청 형식입니다: {0}")]
    JsonParseFailed(String),

    #[error("유효하지 않은 API 키입니다.")]
    InvalidSecretKey,

    /// 요청 한도 초과 (재시도 가능 시각까지 남은 초)
    #[error("요청이 너무 많습니다. 잠시 후 다시 시도해주세요.")]
    RateLimitExceeded(Option<u64>),

    /// Gemini 호출 자체가 실패 (네트워크, 쿼터, 서비스 에러, 안전 필터 차단)
    #[error("AI 모델 호출에 실패했습니다: {0}")]
    UpstreamFailure(String),

    /// 모델이 응답했지만 구조화된 데이터로 파싱할 수 없음
    #[error("AI 모델 응답을 해석할 수 없습니다: {0}")]
    MalformedModelOutput(String),

    /// 파싱은 성공했지만 필수 필드가 없거나 비어 있음
    #[error("AI 모델 응답에 필수 항목이 없습니다: {0}")]
    ValidationFailure(String),

    #[error("서버 내부 에러: {0}")]
    InternalError(String),
}

impl AppError {
    /// 에러 코드 반환
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) | AppError::JsonParseFailed(_) => "COMMON400",
            AppError::InvalidSecretKey => "AI_001",
            AppError::RateLimitExceeded(_) => "COMMON429",
            AppError::UpstreamFailure(_) => "AI_002",
            AppError::MalformedModelOutput(_) => "AI_003",
            AppError::ValidationFailure(_) => "AI_004",
            AppError::InternalError(_) => "COMMON500",
        }
    }

    /// HTTP 상태 코드 반환
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::JsonParseFailed(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidSecretKey => StatusCode::UNAUTHORIZED,
            AppError::RateLimitExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::UpstreamFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::MalformedModelOutput(_) => StatusCode::BAD_GATEWAY,
            AppError::ValidationFailure(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 클라이언트에 노출할 메시지
    ///
    /// 업스트림/내부 에러의 상세 내용은 로그에만 남깁니다.
    pub fn client_message(&self) -> String {
        match self {
            AppError::UpstreamFailure(_) => "AI 모델 호출에 실패했습니다.".to_string(),
            AppError::InternalError(_) => "서버 에러, 관리자에게 문의 바랍니다.".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        match &self {
            AppError::UpstreamFailure(_) | AppError::InternalError(_) => {
                tracing::error!(code, error = %self, "Request failed");
            }
            AppError::MalformedModelOutput(_) | AppError::ValidationFailure(_) => {
                tracing::warn!(code, error = %self, "Unusable model output");
            }
            _ => {
                tracing::info!(code, error = %self, "Request rejected");
            }
        }

        let mut response =
            (status, Json(ErrorResponse::new(code, self.client_message()))).into_response();

        if let AppError::RateLimitExceeded(Some(retry_after)) = self {
            if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}

/// JsonRejection을 AppError로 변환
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::JsonParseFailed(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::ValidationError(errors.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_failures_should_map_to_distinct_statuses() {
        // Arrange
        let upstream = AppError::UpstreamFailure("quota".to_string());
        let malformed = AppError::MalformedModelOutput("expected value".to_string());
        let invalid = AppError::ValidationFailure("subject".to_string());

        // Assert
        assert_eq!(upstream.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(malformed.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(invalid.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(upstream.error_code(), "AI_002");
        assert_eq!(malformed.error_code(), "AI_003");
        assert_eq!(invalid.error_code(), "AI_004");
    }

    #[test]
    fn upstream_failure_should_hide_details_from_client() {
        let error = AppError::UpstreamFailure("api key AIza... rejected".to_string());

        let message = error.client_message();

        assert!(!message.contains("AIza"));
    }

    #[test]
    fn rate_limit_response_should_include_retry_after_header() {
        let response = AppError::RateLimitExceeded(Some(30)).into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let retry_after = response.headers().get(header::RETRY_AFTER).unwrap();
        assert_eq!(retry_after.to_str().unwrap(), "30");
    }

    #[test]
    fn rate_limit_response_without_retry_after_should_work() {
        let response = AppError::RateLimitExceeded(None).into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().get(header::RETRY_AFTER).is_none());
    }
}
