//! 인사말 프롬프트

use super::present;

/// 인사말 생성 프롬프트
///
/// 이름이 있으면 그 이름으로만 부르고, 없으면 이름 없는 일반 인사말을 요청합니다.
/// 모델이 이름을 추측하지 않도록 지시합니다.
pub fn build_greeting(seed_message: &str, name: Option<&str>) -> String {
    let seed_message = seed_message.trim();

    match present(name) {
        Some(name) => format!(
            r#"Write a short, warm greeting in reply to the message below.
Address the recipient by the name "{name}" and by no other name.
Keep it concise: one or two sentences.
Respond with the greeting text only.

Message: {seed_message}"#
        ),
        None => format!(
            r#"Write a short, warm greeting in reply to the message below.
The recipient's name is unknown, so do not address anyone by name and do not guess one.
Do not include bracketed placeholders or stand-in names; the greeting must read naturally as it is.
Keep it concise: one or two sentences.
Respond with the greeting text only.

Message: {seed_message}"#
        ),
    }
}
