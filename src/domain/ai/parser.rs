//! 모델 응답 파싱 및 검증
//!
//! 모델 출력은 JSON을 요청해도 코드 펜스로 감싸져 오거나 키 대소문자가 섞여 오는 경우가 있어,
//! 문자열 단위로 펜스를 제거한 뒤 파싱하고 키를 소문자로 정규화합니다.

use serde_json::{Map, Value};

use super::dto::{EmailDraft, PLACEHOLDER_EMAIL};
use crate::error::AppError;

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// 인사말/답장 응답 검증 (공백 제거 후 비어 있으면 실패)
pub fn parse_reply_text(raw: &str) -> Result<String, AppError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(AppError::ValidationFailure(
            "모델이 빈 응답을 반환했습니다".to_string(),
        ));
    }
    Ok(text.to_string())
}

/// 앞뒤 코드 펜스 제거
///
/// 마크다운 파서가 아니라 알려진 펜스 문자열만 잘라냅니다.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix(JSON_FENCE) {
        text = rest;
    } else if let Some(rest) = text.strip_prefix(FENCE) {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix(FENCE) {
        text = rest;
    }

    text.trim()
}

/// 펜스 제거 → JSON 객체 파싱 → 키 소문자 정규화
pub fn parse_structured(raw: &str) -> Result<Map<String, Value>, AppError> {
    let cleaned = strip_code_fences(raw);

    let value: Value = serde_json::from_str(cleaned).map_err(|e| {
        tracing::debug!(error = %e, output = cleaned, "Model output is not valid JSON");
        AppError::MalformedModelOutput(e.to_string())
    })?;

    match value {
        Value::Object(fields) => Ok(fields
            .into_iter()
            .map(|(key, value)| (key.to_lowercase(), value))
            .collect()),
        other => Err(AppError::MalformedModelOutput(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

/// 필수 필드가 비어 있지 않은 문자열로 존재하는지 확인
pub fn require_fields(fields: &Map<String, Value>, required: &[&str]) -> Result<(), AppError> {
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|key| non_empty_str(fields, key).is_none())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::ValidationFailure(format!(
            "missing required field: {}",
            missing.join(", ")
        )))
    }
}

/// 이메일 초안 요구 필드 정책
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailField {
    /// 모델 응답에 `email`이 반드시 있어야 함
    Required,
    /// 없으면 요청 주소 또는 자리표시 주소 사용
    Optional,
}

/// 모델 출력으로부터 이메일 초안 생성
///
/// 주소 우선순위: 요청 주소 → 모델의 `email` → 자리표시 주소
pub fn parse_email_draft(
    raw: &str,
    email_field: EmailField,
    sender_email: Option<&str>,
    name: Option<String>,
) -> Result<EmailDraft, AppError> {
    let fields = parse_structured(raw)?;

    let required: &[&str] = match email_field {
        EmailField::Required => &["email", "subject", "body"],
        EmailField::Optional => &["subject", "body"],
    };
    require_fields(&fields, required)?;

    let email = sender_email
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .or_else(|| non_empty_str(&fields, "email"))
        .unwrap_or(PLACEHOLDER_EMAIL)
        .to_string();

    // require_fields가 통과했으므로 subject/body는 항상 존재
    let subject = non_empty_str(&fields, "subject").unwrap_or_default().to_string();
    let body = non_empty_str(&fields, "body").unwrap_or_default().to_string();

    Ok(EmailDraft {
        email,
        subject,
        body,
        name,
    })
}

fn non_empty_str<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{"email": "a@x.com", "subject": "Thanks", "body": "Dear Friend,...Best, Ada"}"#;

    #[test]
    fn should_parse_valid_json() {
        // Act
        let draft = parse_email_draft(VALID, EmailField::Required, None, None).unwrap();

        // Assert
        assert_eq!(draft.email, "a@x.com");
        assert_eq!(draft.subject, "Thanks");
        assert_eq!(draft.body, "Dear Friend,...Best, Ada");
        assert_eq!(draft.name, None);
    }

    #[test]
    fn fenced_output_should_parse_like_unfenced() {
        let fenced_json = format!("```json\n{VALID}\n```");
        let fenced_plain = format!("  ```\n{VALID}```  \n");

        let expected = parse_email_draft(VALID, EmailField::Required, None, None).unwrap();

        assert_eq!(
            parse_email_draft(&fenced_json, EmailField::Required, None, None).unwrap(),
            expected
        );
        assert_eq!(
            parse_email_draft(&fenced_plain, EmailField::Required, None, None).unwrap(),
            expected
        );
    }

    #[test]
    fn should_normalize_key_case() {
        let raw = r#"{"EMAIL": "a@x.com", "Subject": "Hi", "BODY": "Hello there"}"#;

        let draft = parse_email_draft(raw, EmailField::Required, None, None).unwrap();

        assert_eq!(draft.subject, "Hi");
        assert_eq!(draft.body, "Hello there");
        assert_eq!(draft.email, "a@x.com");
    }

    #[test]
    fn non_json_should_be_malformed() {
        let result = parse_email_draft(
            "Sure! Here is your email: Dear Friend...",
            EmailField::Optional,
            None,
            None,
        );

        assert!(matches!(result, Err(AppError::MalformedModelOutput(_))));
    }

    #[test]
    fn non_object_json_should_be_malformed() {
        for raw in [r#"["subject", "body"]"#, r#""just text""#, "42", "null"] {
            let result = parse_structured(raw);
            assert!(
                matches!(result, Err(AppError::MalformedModelOutput(_))),
                "raw: {raw}"
            );
        }
    }

    #[test]
    fn missing_subject_should_fail_validation() {
        let raw = r#"{"email": "a@x.com", "body": "Hello"}"#;

        let result = parse_email_draft(raw, EmailField::Optional, None, None);

        match result {
            Err(AppError::ValidationFailure(msg)) => assert!(msg.contains("subject")),
            other => panic!("expected ValidationFailure, got {other:?}"),
        }
    }

    #[test]
    fn empty_or_non_string_body_should_fail_validation() {
        for raw in [
            r#"{"subject": "Hi", "body": "   "}"#,
            r#"{"subject": "Hi", "body": 12}"#,
            r#"{"subject": "Hi", "body": null}"#,
        ] {
            let result = parse_email_draft(raw, EmailField::Optional, None, None);
            assert!(matches!(result, Err(AppError::ValidationFailure(_))), "raw: {raw}");
        }
    }

    #[test]
    fn required_email_field_should_be_enforced() {
        let raw = r#"{"subject": "Hi", "body": "Hello"}"#;

        let strict = parse_email_draft(raw, EmailField::Required, None, None);
        let lenient = parse_email_draft(raw, EmailField::Optional, None, None);

        assert!(matches!(strict, Err(AppError::ValidationFailure(_))));
        assert_eq!(lenient.unwrap().email, PLACEHOLDER_EMAIL);
    }

    #[test]
    fn sender_email_should_take_precedence() {
        let draft = parse_email_draft(
            VALID,
            EmailField::Optional,
            Some("ada@lovelace.dev"),
            Some("Ada".to_string()),
        )
        .unwrap();

        assert_eq!(draft.email, "ada@lovelace.dev");
        assert_eq!(draft.name.as_deref(), Some("Ada"));
    }

    #[test]
    fn model_email_should_be_used_without_sender_email() {
        let draft = parse_email_draft(VALID, EmailField::Optional, Some("  "), None).unwrap();

        assert_eq!(draft.email, "a@x.com");
    }

    #[test]
    fn extra_keys_should_be_ignored() {
        let raw = r#"{"subject": "Hi", "body": "Hello", "cc": ["b@x.com"]}"#;

        let draft = parse_email_draft(raw, EmailField::Optional, None, None).unwrap();

        assert_eq!(draft.subject, "Hi");
    }

    #[test]
    fn reply_text_should_be_trimmed() {
        assert_eq!(parse_reply_text("  Hi Ada!\n").unwrap(), "Hi Ada!");
    }

    #[test]
    fn empty_reply_text_should_fail_validation() {
        let result = parse_reply_text(" \n\t ");

        assert!(matches!(result, Err(AppError::ValidationFailure(_))));
    }

    #[test]
    fn strip_code_fences_should_leave_plain_text_alone() {
        assert_eq!(strip_code_fences("{\"a\": 1}"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```json{\"a\": 1}```"), "{\"a\": 1}");
    }
}
