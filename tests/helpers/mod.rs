//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use telegramable::{ErrorEvent, Frame, NotifierConfig};

pub const TELEGRAM_OK: &str = r#"{"ok":true,"result":{"message_id":1}}"#;
pub const TELEGRAM_CHAT_NOT_FOUND: &str =
    r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#;

/// A config pointing at the given mock server with credentials `T` / `U`.
pub fn test_config(server_url: &str) -> NotifierConfig {
    NotifierConfig {
        enabled: true,
        exceptions_only: vec![],
        exceptions_except: vec![],
        include_trace: true,
        trace_depth: 2,
        bot_token: "T".to_string(),
        chat_id: "U".to_string(),
        app_name: "App".to_string(),
        timeout_seconds: 5,
        api_base_url: server_url.to_string(),
    }
}

pub fn frame(n: usize) -> Frame {
    Frame::new()
        .with("function", format!("frame{}", n))
        .with("file", format!("/src/frame{}.go", n))
        .with("line", n + 1)
}

/// `RuntimeError: boom` at `/a.go:42` with three frames.
pub fn runtime_error() -> ErrorEvent {
    ErrorEvent::new("RuntimeError", "boom", "/a.go", 42).with_trace((0..3).map(frame).collect())
}
