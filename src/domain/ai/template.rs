//! 메시지 타입별 프롬프트 템플릿
//!
//! 알 수 없는 타입은 항상 `custom`으로 처리합니다 (에러가 아닌 기본값).

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// 템플릿의 유일한 치환 슬롯
const SLOT: &str = "{custom_message}";

const FORMAL_TEMPLATE: &str =
    "You are a helpful AI assistant. Generate a formal response based on this message: {custom_message}";

const CASUAL_TEMPLATE: &str = "You are a helpful AI assistant that communicates casually. Generate a response based on this message: {custom_message}";

const CUSTOM_TEMPLATE: &str = "{custom_message}";

/// 메시지 스타일
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// 격식 있는 문체
    Formal,
    /// 캐주얼한 문체
    Casual,
    /// 사용자 메시지를 그대로 사용
    #[default]
    Custom,
}

impl MessageType {
    /// 태그 문자열을 메시지 타입으로 변환
    ///
    /// 대소문자와 앞뒤 공백은 무시하며, 그 외의 값은 모두 `Custom`입니다.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "formal" => MessageType::Formal,
            "casual" => MessageType::Casual,
            _ => MessageType::Custom,
        }
    }

    pub fn template(self) -> PromptTemplate {
        match self {
            MessageType::Formal => PromptTemplate(FORMAL_TEMPLATE),
            MessageType::Casual => PromptTemplate(CASUAL_TEMPLATE),
            MessageType::Custom => PromptTemplate(CUSTOM_TEMPLATE),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MessageType::Formal => "formal",
            MessageType::Casual => "casual",
            MessageType::Custom => "custom",
        }
    }
}

impl<'de> Deserialize<'de> for MessageType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        Ok(MessageType::from_tag(&tag))
    }
}

/// `{custom_message}` 슬롯 하나를 가진 불변 프롬프트 템플릿
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptTemplate(&'static str);

impl PromptTemplate {
    #[cfg(test)]
    fn pattern(&self) -> &'static str {
        self.0
    }

    /// 슬롯을 사용자 메시지로 한 번만 치환합니다.
    ///
    /// 사용자 메시지 안의 중괄호는 다시 해석하지 않습니다.
    pub fn render(&self, custom_message: &str) -> String {
        match self.0.split_once(SLOT) {
            Some((before, after)) => {
                let mut rendered =
                    String::with_capacity(before.len() + custom_message.len() + after.len());
                rendered.push_str(before);
                rendered.push_str(custom_message);
                rendered.push_str(after);
                rendered
            }
            None => self.0.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(tag: &str) -> PromptTemplate {
        MessageType::from_tag(tag).template()
    }

    #[test]
    fn should_resolve_known_tags() {
        assert_eq!(resolve("formal").pattern(), FORMAL_TEMPLATE);
        assert_eq!(resolve("casual").pattern(), CASUAL_TEMPLATE);
        assert_eq!(resolve("custom").pattern(), CUSTOM_TEMPLATE);
    }

    #[test]
    fn should_fall_back_to_custom_for_unknown_tags() {
        for tag in ["", "friendly", "FORMALLY", "null", "🙂"] {
            assert_eq!(resolve(tag), MessageType::Custom.template(), "tag: {tag:?}");
        }
    }

    #[test]
    fn should_ignore_case_and_surrounding_whitespace() {
        assert_eq!(MessageType::from_tag(" Formal "), MessageType::Formal);
        assert_eq!(MessageType::from_tag("CASUAL"), MessageType::Casual);
    }

    #[test]
    fn resolve_should_be_idempotent() {
        assert_eq!(resolve("casual"), resolve("casual"));
        assert_eq!(resolve("whatever"), resolve("whatever"));
    }

    #[test]
    fn every_template_should_have_exactly_one_slot() {
        for message_type in [MessageType::Formal, MessageType::Casual, MessageType::Custom] {
            let pattern = message_type.template().pattern();
            assert_eq!(pattern.matches(SLOT).count(), 1, "{message_type:?}");
        }
    }

    #[test]
    fn render_should_substitute_slot() {
        // Act
        let rendered = MessageType::Formal.template().render("Schedule a meeting");

        // Assert
        assert_eq!(
            rendered,
            "You are a helpful AI assistant. Generate a formal response based on this message: Schedule a meeting"
        );
    }

    #[test]
    fn render_should_not_reinterpret_braces_in_user_text() {
        let rendered = MessageType::Custom.template().render("{custom_message} {name}");

        assert_eq!(rendered, "{custom_message} {name}");
    }

    #[test]
    fn should_deserialize_unknown_type_as_custom() {
        let known: MessageType = serde_json::from_str(r#""casual""#).unwrap();
        let unknown: MessageType = serde_json::from_str(r#""shouting""#).unwrap();

        assert_eq!(known, MessageType::Casual);
        assert_eq!(unknown, MessageType::Custom);
    }

    #[test]
    fn should_serialize_as_lowercase() {
        let json = serde_json::to_string(&MessageType::Formal).unwrap();

        assert_eq!(json, "\"formal\"");
    }
}
