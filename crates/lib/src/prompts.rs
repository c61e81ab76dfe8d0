//! # Classification Prompt
//!
//! The fixed instruction sent to the classification service, together with the
//! closed tag and category vocabularies it offers as selectable labels.

/// Tags offered to the classification service (any number may be chosen).
pub const TAG_VOCABULARY: [(&str, &str); 10] = [
    ("important", "重要"),
    ("urgent", "緊急"),
    ("invoice", "請求書"),
    ("contract", "契約書"),
    ("report", "報告書"),
    ("meeting", "議事録"),
    ("personal", "個人文書"),
    ("financial", "財務関連"),
    ("legal", "法務関連"),
    ("administrative", "管理文書"),
];

/// Categories offered to the classification service (exactly one is chosen).
pub const CATEGORY_VOCABULARY: [(&str, &str); 8] = [
    ("invoice", "請求書"),
    ("order", "発注書"),
    ("contract", "契約書"),
    ("report", "報告書"),
    ("notice", "通知書"),
    ("receipt", "領収書"),
    ("estimate", "見積書"),
    ("other", "その他"),
];

/// The tag stored when classification cannot produce a result.
pub const FALLBACK_TAG: &str = "other";
/// The category stored when classification cannot produce a result.
pub const FALLBACK_CATEGORY: &str = "other";

/// Upper bound on the number of characters of document text sent for classification.
pub const MAX_CLASSIFICATION_CHARS: usize = 3000;
/// Token budget for the classification reply.
pub const MAX_TOKENS: u32 = 1000;
/// Low temperature so the same text classifies the same way.
pub const TEMPERATURE: f32 = 0.3;

const CLASSIFICATION_PROMPT_HEADER: &str =
    "以下の文書を分析し、適切なタグとカテゴリを日本語で提案してください。";

const CLASSIFICATION_REPLY_FORMAT: &str = r#"以下のJSON形式で回答してください（必ずこの形式で）:
{
  "tags": ["tag1", "tag2"],
  "category": "category_name",
  "confidence": 0.85,
  "reasoning": "分類理由の簡潔な説明"
}"#;

fn render_vocabulary(entries: &[(&str, &str)]) -> String {
    entries
        .iter()
        .map(|(label, description)| format!("- {label}: {description}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Builds the classification instruction around an already truncated text sample.
pub fn build_classification_prompt(text_sample: &str) -> String {
    format!(
        "{CLASSIFICATION_PROMPT_HEADER}\n\n\
         利用可能なタグ（複数選択可）:\n{tags}\n\n\
         利用可能なカテゴリ（1つ選択）:\n{categories}\n\n\
         文書内容:\n{text_sample}\n\n\
         {CLASSIFICATION_REPLY_FORMAT}",
        tags = render_vocabulary(&TAG_VOCABULARY),
        categories = render_vocabulary(&CATEGORY_VOCABULARY),
    )
}
