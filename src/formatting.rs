// src/formatting.rs

use crate::config::NotifierConfig;
use crate::core::{ErrorEvent, Frame};

/// A trait for rendering an error event into the text of a notification.
pub trait MessageFormatter: Send + Sync {
    fn format(&self, event: &ErrorEvent, config: &NotifierConfig) -> String;
}

/// A formatter producing Telegram HTML (`parse_mode=HTML`).
pub struct HtmlFormatter;

impl HtmlFormatter {
    fn format_header(&self, event: &ErrorEvent, config: &NotifierConfig) -> String {
        format!(
            "⛔️<b>WARNING ({})</b>\r\n<b>Error:</b> <code>{}</code>\n<b>File:</b> <code>{}</code>\n<b>Line:</b> <code>{}</code>\r\n",
            escape_html(&config.app_name),
            escape_html(&event.message),
            escape_html(&event.source_file),
            event.source_line
        )
    }

    fn format_frame(&self, index: usize, frame: &Frame) -> String {
        let mut text = format!("\r\n[{}]\r\n", index);
        for (key, value) in frame.fields() {
            text.push_str(&format!("{} : {}\r\n", escape_html(key), escape_html(value)));
        }
        text
    }

    /// Renders at most `trace_depth` frames, or nothing when none are selected.
    fn format_trace(&self, trace: &[Frame], trace_depth: usize) -> Option<String> {
        let frames: Vec<String> = trace
            .iter()
            .take(trace_depth)
            .enumerate()
            .map(|(i, frame)| self.format_frame(i, frame))
            .collect();

        if frames.is_empty() {
            return None;
        }

        Some(format!("<pre>{}</pre>", frames.concat()))
    }
}

impl MessageFormatter for HtmlFormatter {
    fn format(&self, event: &ErrorEvent, config: &NotifierConfig) -> String {
        let mut text = self.format_header(event, config);

        if config.include_trace {
            if let Some(trace) = self.format_trace(&event.trace, config.trace_depth) {
                text.push_str(&trace);
            }
        }

        text
    }
}

/// Escapes the characters Telegram's HTML parse mode treats as markup.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
