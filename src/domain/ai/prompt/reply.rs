//! 이메일 답장 프롬프트

use super::present;
use crate::domain::ai::template::MessageType;

/// 이메일 답장 프롬프트
///
/// 서명 이름 추론은 모델에게 지시만 하며, 코드에서 원문을 분석하지 않습니다.
pub fn build_email_reply(
    message_type: MessageType,
    original_email_body: &str,
    directive: &str,
    name: Option<&str>,
) -> String {
    let directive = message_type.template().render(directive.trim());

    let sign_off = match present(name) {
        Some(name) => format!("Sign the reply with the name \"{name}\" only."),
        None => "Sign the reply with the recipient's name if the original email makes it clear; otherwise sign it as \"Team\".".to_string(),
    };

    format!(
        r#"You are a helpful assistant that drafts email replies matching the tone of the sender.
Write a reply to the original email below.

Requirements:
- Do not include a subject line.
- Open with a greeting that addresses the original sender by name if it can be found in the email; otherwise use a neutral greeting.
- Follow this instruction for the content and tone of the reply: {directive}
- {sign_off}
- Respond with the reply text only.

Original email:
{original_email_body}"#,
        original_email_body = original_email_body.trim(),
    )
}
