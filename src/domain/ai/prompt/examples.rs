//! 이메일 변환 Few-Shot 예제
//!
//! 모델이 JSON 형식을 지키도록 입력/출력 쌍을 고정으로 제공합니다.

pub const EMAIL_COMPOSITION: &str = r#"# Example 1
Input message: "Need help with my project deadline, it's next Friday and I'm behind"
Sender email: jordan@example.com
Sender name: Jordan
Output:
{"email": "jordan@example.com", "subject": "Request for Assistance with Project Deadline", "body": "Dear Team,\n\nI am writing to ask for help with my project, which is due next Friday. I have fallen behind schedule and would appreciate any support you can offer to get it back on track.\n\nThank you for your time.\n\nBest regards,\nJordan"}

# Example 2
Input message: "can't make it to the meeting tmrw, can we move it?"
Sender email: (not provided)
Sender name: (not provided)
Output:
{"email": "no-reply@example.com", "subject": "Request to Reschedule Tomorrow's Meeting", "body": "Hello,\n\nUnfortunately, I will not be able to attend tomorrow's meeting. Would it be possible to move it to another time that works for everyone?\n\nApologies for the inconvenience.\n\nBest regards"}"#;
