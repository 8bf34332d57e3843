use crate::core::{AgentPlatform, Message, Thread};
use crate::utils::error::{Result, TutorError};
use chrono::{DateTime, Utc};
use serde_json::Value;

pub const NO_THREADS: &str = "Did not find threads";

/// Characters of a tool response kept in a summary.
pub const TOOL_RESPONSE_PREVIEW: usize = 100;

/// Summary of the most recently updated thread of `assistant_id`.
pub async fn latest_thread_summary<P: AgentPlatform + ?Sized>(
    platform: &P,
    assistant_id: &str,
) -> Result<String> {
    let threads = platform.list_threads().await?;

    // 同時間時保留第一個
    let mut latest: Option<(Thread, DateTime<Utc>)> = None;
    for thread in threads.into_iter().filter(|thread| thread.belongs_to(assistant_id)) {
        let updated_at = thread.last_update().ok_or_else(|| {
            TutorError::validation(format!(
                "Thread {} has an unreadable updated_at: {}",
                thread.thread_id, thread.updated_at
            ))
        })?;
        if latest.as_ref().map_or(true, |(_, best)| updated_at > *best) {
            latest = Some((thread, updated_at));
        }
    }

    let Some((latest, _)) = latest else {
        tracing::info!("No threads for assistant {}", assistant_id);
        return Ok(NO_THREADS.to_string());
    };

    tracing::info!("🧵 Thread we are looking at is: {}", latest.thread_id);
    let history = platform.thread_history(&latest.thread_id).await?;

    let messages = history
        .into_iter()
        .next()
        .map(|state| state.values.messages)
        .unwrap_or_default();
    tracing::debug!("Thread {} has {} messages", latest.thread_id, messages.len());

    Ok(summarize_messages(&messages))
}

/// Human turns, final AI answers and truncated tool responses, separated by
/// blank lines. AI turns that only request tool calls are left out.
pub fn summarize_messages(messages: &[Message]) -> String {
    let summary: Vec<String> = messages
        .iter()
        .filter_map(|message| match message {
            Message::Ai {
                content,
                tool_calls,
            } if tool_calls.as_ref().map_or(true, Vec::is_empty) => {
                Some(format!("AI: {}", content_text(content)))
            }
            Message::Human { content } => Some(format!("Human: {}", content_text(content))),
            Message::Tool { name, content } => {
                let preview: String = content_text(content)
                    .chars()
                    .take(TOOL_RESPONSE_PREVIEW)
                    .collect();
                Some(format!(
                    "Tool: {}\n  Response: {}",
                    name.as_deref().unwrap_or("None"),
                    preview
                ))
            }
            _ => None,
        })
        .collect();

    summary.join("\n\n")
}

fn content_text(content: &Value) -> String {
    match content {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
