use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

use crate::error::AppError;

/// API 키 헤더 이름
pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Clone)]
pub struct SecretKeyValidator {
    expected_key: String,
}

impl SecretKeyValidator {
    pub fn new(expected_key: String) -> Self {
        Self { expected_key }
    }

    /// 상수 시간 비교로 키 검증
    pub fn validate(&self, provided_key: &str) -> Result<(), AppError> {
        let expected = self.expected_key.as_bytes();
        let provided = provided_key.as_bytes();

        let length_matches = expected.len() == provided.len();
        let min_len = std::cmp::min(expected.len(), provided.len());
        let content_matches = expected[..min_len].ct_eq(&provided[..min_len]).unwrap_u8() == 1;

        if !length_matches || !content_matches {
            tracing::warn!(
                event = "invalid_api_key_attempt",
                "Invalid API key attempt detected"
            );
            return Err(AppError::InvalidSecretKey);
        }

        Ok(())
    }
}

/// `x-api-key` 헤더 검증 미들웨어
///
/// 검증기가 없으면 (키 미설정) 모든 요청을 통과시킵니다.
pub async fn require_api_key(
    State(validator): State<Option<SecretKeyValidator>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(validator) = validator {
        let provided = request
            .headers()
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        validator.validate(provided)?;
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_pass_with_correct_key() {
        let validator = SecretKeyValidator::new("correct-key".to_string());

        assert!(validator.validate("correct-key").is_ok());
    }

    #[test]
    fn should_fail_with_incorrect_key() {
        let validator = SecretKeyValidator::new("correct-key".to_string());

        let result = validator.validate("wrong-key");

        assert!(matches!(result, Err(AppError::InvalidSecretKey)));
    }

    #[test]
    fn should_fail_with_empty_key() {
        let validator = SecretKeyValidator::new("correct-key".to_string());

        assert!(matches!(validator.validate(""), Err(AppError::InvalidSecretKey)));
    }

    #[test]
    fn should_fail_with_prefix_or_extension_of_key() {
        let validator = SecretKeyValidator::new("secret123".to_string());

        assert!(validator.validate("secret").is_err());
        assert!(validator.validate("secret123456").is_err());
    }
}
