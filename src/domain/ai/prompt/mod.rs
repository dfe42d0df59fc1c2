//! AI 프롬프트 모듈
//!
//! 인사말, 이메일 작성, 이메일 답장에 사용되는 프롬프트를 관리합니다.
//!
//! ## 구조
//! - `greeting`: 인사말 프롬프트
//! - `compose`: 메시지 → 이메일(JSON) 변환 프롬프트
//! - `reply`: 이메일 답장 프롬프트
//! - `examples`: 이메일 변환 Few-shot 예제

mod compose;
mod examples;
mod greeting;
mod reply;

pub use compose::build_email_composition;
pub use greeting::build_greeting;
pub use reply::build_email_reply;

/// 비어 있거나 공백뿐인 선택 값은 없는 것으로 취급
pub(crate) fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
