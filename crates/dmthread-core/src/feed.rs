//! Feed loading: reads raw message records from a JSON export and
//! tolerates malformed entries by skipping them with a warning.

use std::fs;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use crate::model::{RawMessage, RawReaction};

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("read feed: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse feed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("feed must be a message array or an object with a \"messages\" array")]
    Shape,
}

/// Read and parse a feed file. See [`parse_feed`] for the accepted shapes.
pub fn load_feed(path: &Path) -> Result<Vec<RawMessage>, FeedError> {
    let body = fs::read_to_string(path)?;
    parse_feed(&body)
}

/// Parse a feed document. Accepts either a bare array of message records
/// or an object carrying the array under `messages`. Records that fail to
/// deserialize are skipped, not fatal; the rest of the feed still loads.
pub fn parse_feed(body: &str) -> Result<Vec<RawMessage>, FeedError> {
    let doc: Value = serde_json::from_str(body)?;
    let records = match doc {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("messages") {
            Some(Value::Array(items)) => items,
            _ => return Err(FeedError::Shape),
        },
        _ => return Err(FeedError::Shape),
    };

    let mut messages = Vec::with_capacity(records.len());
    for (idx, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<RawMessage>(record) {
            Ok(message) => messages.push(message),
            Err(err) => log::warn!("skipping malformed feed record {idx}: {err}"),
        }
    }
    Ok(messages)
}

/// Built-in sample used when no feed file is available, anchored to the
/// supplied wall-clock time in epoch milliseconds.
#[must_use]
pub fn demo_conversation(now_ms: i64) -> Vec<RawMessage> {
    let base = now_ms - 2 * 60 * 60 * 1000;
    let mut third = RawMessage::text_record("other", base + 70_000, "내일 7시에 거기서 봐요!");
    third.reactions = Some(vec![RawReaction {
        emoji: Some("👍".to_owned()),
        ..RawReaction::default()
    }]);
    vec![
        RawMessage::text_record("other", base, "안녕하세요, 어제 보낸 릴스 봤어요?"),
        RawMessage::text_record("me", base + 40_000, "네 방금 봤어요 ㅋㅋ 진짜 웃기네요"),
        third,
    ]
}
