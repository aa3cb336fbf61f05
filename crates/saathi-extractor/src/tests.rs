//! Integration tests for the Extractor

use crate::{merge, ExtractionRequest, Extractor, ExtractorConfig, ExtractorError};
use async_trait::async_trait;
use saathi_domain::traits::LlmProvider;
use saathi_domain::{FieldSchema, Record, TurnLog};
use saathi_llm::{LlmError, MockProvider};
use std::sync::Arc;
use std::time::Duration;

fn schema() -> FieldSchema {
    FieldSchema::from_json(
        r#"{
            "required_fields": {"complainant_name": "Name", "incident_date": "Date"},
            "optional_fields": {"district": "District"}
        }"#,
    )
    .unwrap()
}

/// Provider that never answers in time
struct SlowProvider;

#[async_trait]
impl LlmProvider for SlowProvider {
    type Error = LlmError;

    async fn generate(&self, _prompt: &str) -> Result<String, Self::Error> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok("too late".to_string())
    }

    fn model_name(&self) -> &str {
        "slow"
    }
}

#[tokio::test]
async fn test_full_extraction_flow() {
    let schema = schema();
    let mut record = Record::new();
    let log = TurnLog::new();

    let llm = MockProvider::new(
        "I'm sorry to hear that. When did it happen?\n---JSON---\n\
         {\"complainant_name\": \"Rohan Sharma\", \"incident_date\": null, \"district\": null}",
    );
    let extractor = Extractor::new(llm, ExtractorConfig::default());

    let reply = extractor
        .extract(ExtractionRequest {
            schema: &schema,
            record: &record,
            history: log.turns(),
            message: "I am Rohan Sharma and my wallet was stolen",
        })
        .await
        .unwrap();

    let outcome = merge(&reply, &schema, &mut record);
    assert_eq!(outcome.display_text, "I'm sorry to hear that. When did it happen?");
    assert_eq!(record.get("complainant_name"), Some("Rohan Sharma"));
    assert_eq!(outcome.report.updated, vec!["complainant_name".to_string()]);
}

#[tokio::test]
async fn test_history_is_windowed() {
    let schema = schema();
    let record = Record::new();
    let mut log = TurnLog::new();
    for i in 0..10 {
        log.append_user(format!("old message {}", i));
    }

    let llm = Arc::new(MockProvider::new("ok ---JSON--- {}"));
    let config = ExtractorConfig {
        history_window: 3,
        ..ExtractorConfig::default()
    };
    let extractor = Extractor::from_shared(llm.clone(), config);

    extractor
        .extract(ExtractionRequest {
            schema: &schema,
            record: &record,
            history: log.turns(),
            message: "latest",
        })
        .await
        .unwrap();

    let prompt = llm.last_prompt().unwrap();
    assert!(prompt.contains("old message 9"));
    assert!(prompt.contains("old message 7"));
    assert!(!prompt.contains("old message 6"));
    assert!(prompt.contains("latest"));
}

#[tokio::test]
async fn test_provider_error_is_extraction_failure() {
    let schema = schema();
    let record = Record::new();
    let llm = MockProvider::default();
    llm.push_error("service unavailable");
    let extractor = Extractor::new(llm, ExtractorConfig::default());

    let result = extractor
        .extract(ExtractionRequest {
            schema: &schema,
            record: &record,
            history: &[],
            message: "hello",
        })
        .await;

    assert!(matches!(result, Err(ExtractorError::Llm(msg)) if msg.contains("service unavailable")));
}

#[tokio::test]
async fn test_empty_reply_is_extraction_failure() {
    let schema = schema();
    let record = Record::new();
    let extractor = Extractor::new(MockProvider::new("   \n"), ExtractorConfig::default());

    let result = extractor
        .extract(ExtractionRequest {
            schema: &schema,
            record: &record,
            history: &[],
            message: "hello",
        })
        .await;

    assert!(matches!(result, Err(ExtractorError::EmptyReply)));
}

#[tokio::test]
async fn test_extraction_timeout() {
    let schema = schema();
    let record = Record::new();
    let config = ExtractorConfig {
        extraction_timeout_secs: 1,
        ..ExtractorConfig::default()
    };
    let extractor = Extractor::new(SlowProvider, config);

    let result = extractor
        .extract(ExtractionRequest {
            schema: &schema,
            record: &record,
            history: &[],
            message: "hello",
        })
        .await;

    assert!(matches!(result, Err(ExtractorError::Timeout(1))));
}

#[tokio::test]
async fn test_message_validation() {
    let schema = schema();
    let record = Record::new();
    let llm = Arc::new(MockProvider::default());
    let config = ExtractorConfig {
        max_message_length: 10,
        ..ExtractorConfig::default()
    };
    let extractor = Extractor::from_shared(llm.clone(), config);

    let blank = extractor
        .extract(ExtractionRequest {
            schema: &schema,
            record: &record,
            history: &[],
            message: "   ",
        })
        .await;
    assert!(matches!(blank, Err(ExtractorError::EmptyMessage)));

    let long = extractor
        .extract(ExtractionRequest {
            schema: &schema,
            record: &record,
            history: &[],
            message: "this message is too long",
        })
        .await;
    assert!(matches!(long, Err(ExtractorError::MessageTooLong(24, 10))));

    // Rejected before the model is called
    assert_eq!(llm.call_count(), 0);
}
