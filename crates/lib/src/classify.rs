//! # Document Classification
//!
//! Text preparation, the single call to the classification service and the
//! interpretation of its free-form reply. A failed call or an unusable reply
//! never surfaces as an error: it degrades to a fixed fallback result.

use crate::{
    prompts::{
        build_classification_prompt, FALLBACK_CATEGORY, FALLBACK_TAG, MAX_CLASSIFICATION_CHARS,
        MAX_TOKENS, TEMPERATURE,
    },
    providers::ai::{ChatMessage, ClassificationProvider, ClassificationRequest},
    types::ClassificationResult,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

/// Confidence stored when the classification call itself fails.
pub const CALL_FAILURE_CONFIDENCE: f64 = 0.0;
/// Confidence stored when the reply contains no JSON object.
pub const UNPARSEABLE_CONFIDENCE: f64 = 0.5;

const UNPARSEABLE_REASONING: &str = "AI分類に失敗しました";

/// The outcome of one classification call.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// The typed values written back to the record.
    pub result: ClassificationResult,
    /// The JSON object exactly as the service returned it, or the fallback
    /// result when there was none.
    pub payload: Value,
}

/// Returns at most the first `max_chars` characters of `text`.
pub fn truncate_text(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Maps a stored PDF object key onto the key of its extracted text.
///
/// `fax/pdf/2024/doc.pdf` becomes `fax/text/2024/doc.txt`.
pub fn derive_text_key(s3_key: &str) -> String {
    let key = s3_key.replace("/pdf/", "/text/");
    let file_start = key.rfind('/').map_or(0, |i| i + 1);
    match key[file_start..].rfind('.') {
        Some(dot) if dot > 0 => format!("{}.txt", &key[..file_start + dot]),
        _ => key,
    }
}

/// Finds the JSON object embedded in a free-form reply.
///
/// Scans for balanced `{...}` spans, honouring JSON strings and escapes, and
/// returns the first one that parses as an object. If none does, the widest
/// span from the first `{` to the last `}` is returned so the caller can
/// report why it failed to parse.
pub fn extract_json_object(reply: &str) -> Option<&str> {
    let mut search_from = 0;
    while let Some(offset) = reply[search_from..].find('{') {
        let start = search_from + offset;
        if let Some(end) = balanced_object_end(&reply[start..]) {
            let candidate = &reply[start..start + end];
            if matches!(serde_json::from_str::<Value>(candidate), Ok(Value::Object(_))) {
                return Some(candidate);
            }
        }
        search_from = start + 1;
    }

    let first = reply.find('{')?;
    let last = reply.rfind('}')?;
    (last > first).then(|| &reply[first..=last])
}

/// Returns the byte length of the object starting at `text[0] == '{'`, if it closes.
fn balanced_object_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Interprets the reply text of the classification service.
///
/// `Ok(None)` means the reply holds no JSON object at all; `Err` means one was
/// found but it is not a valid classification. On success the raw object is
/// returned next to the typed result, unknown keys included.
pub fn parse_classification_reply(
    reply: &str,
) -> Result<Option<Classification>, serde_json::Error> {
    let Some(span) = extract_json_object(reply) else {
        return Ok(None);
    };
    let payload: Value = serde_json::from_str(span)?;
    let result = ClassificationResult::deserialize(&payload)?;
    Ok(Some(Classification { result, payload }))
}

fn fallback(confidence: f64, reasoning: String) -> Classification {
    let payload = json!({
        "tags": [FALLBACK_TAG],
        "category": FALLBACK_CATEGORY,
        "confidence": confidence,
        "reasoning": reasoning,
    });
    Classification {
        result: ClassificationResult {
            tags: vec![FALLBACK_TAG.to_string()],
            category: FALLBACK_CATEGORY.to_string(),
            confidence,
            reasoning,
        },
        payload,
    }
}

/// Builds the one request sent for `text`.
pub fn build_classification_request(text: &str) -> ClassificationRequest {
    let text_sample = truncate_text(text, MAX_CLASSIFICATION_CHARS);
    ClassificationRequest {
        max_tokens: MAX_TOKENS,
        messages: vec![ChatMessage::user(build_classification_prompt(text_sample))],
        temperature: TEMPERATURE,
    }
}

/// Classifies `text` with exactly one call to `provider`. Never retries.
pub async fn classify_text(provider: &dyn ClassificationProvider, text: &str) -> Classification {
    let request = build_classification_request(text);

    let reply = match provider.invoke(&request).await {
        Ok(reply) => reply,
        Err(e) => {
            error!("Classification call failed: {e}");
            return fallback(CALL_FAILURE_CONFIDENCE, format!("エラー: {e}"));
        }
    };

    match parse_classification_reply(&reply) {
        Ok(Some(classification)) => {
            info!(
                category = %classification.result.category,
                confidence = classification.result.confidence,
                "Classification reply parsed."
            );
            classification
        }
        Ok(None) => {
            warn!("No JSON object found in classification reply: {reply}");
            fallback(UNPARSEABLE_CONFIDENCE, UNPARSEABLE_REASONING.to_string())
        }
        Err(e) => {
            error!("Classification reply is not a valid classification: {e}");
            fallback(CALL_FAILURE_CONFIDENCE, format!("エラー: {e}"))
        }
    }
}
