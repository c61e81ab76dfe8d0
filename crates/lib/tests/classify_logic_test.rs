//! # Classification Logic Tests
//!
//! Verifies the single classification call and the two fallback paths of
//! `classify_text`, using a mock provider that records every request.

use doctag::classify::{classify_text, CALL_FAILURE_CONFIDENCE, UNPARSEABLE_CONFIDENCE};
use doctag::prompts::{MAX_TOKENS, TEMPERATURE};
use doctag_test_utils::{classification_reply, MockClassifier};
use serde_json::json;

#[tokio::test]
async fn test_classify_text_parses_embedded_json() {
    let provider = MockClassifier::replying(&classification_reply(
        &["invoice", "financial"],
        "invoice",
        0.9,
    ));

    let result = classify_text(&provider, "請求書 合計10000円").await.result;

    assert_eq!(result.tags, vec!["invoice", "financial"]);
    assert_eq!(result.category, "invoice");
    assert_eq!(result.confidence, 0.9);
    assert_eq!(result.reasoning, "テスト");

    let calls = provider.get_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].max_tokens, MAX_TOKENS);
    assert_eq!(calls[0].temperature, TEMPERATURE);
    assert_eq!(calls[0].messages.len(), 1);
    assert_eq!(calls[0].messages[0].role, "user");
    assert!(calls[0].messages[0].content.contains("請求書 合計10000円"));
}

#[tokio::test]
async fn test_classify_text_accepts_labels_outside_vocabulary() {
    let provider = MockClassifier::replying(&classification_reply(&["memo"], "letter", 0.7));

    let result = classify_text(&provider, "社内メモ").await.result;

    assert_eq!(result.tags, vec!["memo"]);
    assert_eq!(result.category, "letter");
}

#[tokio::test]
async fn test_reply_without_json_falls_back_once() {
    let provider = MockClassifier::replying("申し訳ありませんが分類できません。");

    let result = classify_text(&provider, "some text").await.result;

    assert_eq!(result.tags, vec!["other"]);
    assert_eq!(result.category, "other");
    assert_eq!(result.confidence, UNPARSEABLE_CONFIDENCE);
    assert_eq!(result.reasoning, "AI分類に失敗しました");
    assert_eq!(provider.get_calls().len(), 1, "the call must not be retried");
}

#[tokio::test]
async fn test_failed_call_falls_back_to_zero_confidence() {
    let provider = MockClassifier::failing("throttled");

    let result = classify_text(&provider, "some text").await.result;

    assert_eq!(result.tags, vec!["other"]);
    assert_eq!(result.category, "other");
    assert_eq!(result.confidence, CALL_FAILURE_CONFIDENCE);
    assert!(result.reasoning.starts_with("エラー: "));
    assert!(result.reasoning.contains("throttled"));
    assert_eq!(provider.get_calls().len(), 1);
}

#[tokio::test]
async fn test_malformed_json_is_treated_as_a_failure() {
    let provider = MockClassifier::replying(r#"{"tags": ["invoice"], "category": }"#);

    let result = classify_text(&provider, "some text").await.result;

    assert_eq!(result.confidence, CALL_FAILURE_CONFIDENCE);
    assert_eq!(result.category, "other");
}

#[tokio::test]
async fn test_only_the_first_3000_characters_are_sent() {
    let provider = MockClassifier::replying(&classification_reply(&["report"], "report", 0.8));
    let head = "あ".repeat(3000);
    let text = format!("{head}SHOULD_NOT_BE_SENT");

    classify_text(&provider, &text).await;

    let prompt = &provider.get_calls()[0].messages[0].content;
    assert!(prompt.contains(&head));
    assert!(!prompt.contains("SHOULD_NOT_BE_SENT"));
}

#[tokio::test]
async fn test_payload_keeps_keys_the_result_does_not_model() {
    let provider = MockClassifier::replying(
        r#"結果: {"tags": ["invoice"], "category": "invoice", "confidence": 0.9, "reasoning": "請求書", "language": "ja"}"#,
    );

    let classification = classify_text(&provider, "請求書").await;

    assert_eq!(classification.result.category, "invoice");
    assert_eq!(
        classification.payload,
        json!({
            "tags": ["invoice"],
            "category": "invoice",
            "confidence": 0.9,
            "reasoning": "請求書",
            "language": "ja"
        })
    );
}

#[tokio::test]
async fn test_fallback_payload_mirrors_the_fallback_result() {
    let provider = MockClassifier::replying("分類できません");

    let classification = classify_text(&provider, "some text").await;

    assert_eq!(
        classification.payload,
        json!({
            "tags": ["other"],
            "category": "other",
            "confidence": 0.5,
            "reasoning": "AI分類に失敗しました"
        })
    );
}
