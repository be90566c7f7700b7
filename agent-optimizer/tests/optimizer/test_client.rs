//! HTTP client against a mock analysis service

use std::time::Duration;

use super::common::*;
use agent_optimizer::client::HttpBackend;
use agent_optimizer_sdk::{
    AnalysisBackend, AnswerPayload, AnswerSet, ChatMessage, ChatRequest, ChatRole,
    FlowchartRequest, TransportError, QUESTIONS,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(server: &MockServer) -> HttpBackend {
    let out = std::env::temp_dir();
    HttpBackend::new(test_config(&server.uri(), &out)).unwrap()
}

fn five_answer_payload() -> AnswerPayload {
    let mut answers = AnswerSet::new();
    for (question, answer) in QUESTIONS.iter().zip(FIVE_ANSWERS) {
        answers.insert(question.key, answer);
    }
    AnswerPayload::from_answers(&answers)
}

// ============================================================================
// /generate_deck/
// ============================================================================

#[tokio::test]
async fn test_generate_deck_sends_multipart_answers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate_deck/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_deck_response(2)))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = backend_for(&server)
        .generate_deck(&five_answer_payload())
        .await
        .unwrap();

    assert_eq!(outcome.artifact.as_deref(), Some("deck_123.pptx"));
    assert_eq!(outcome.report, sample_report(2));
    assert_eq!(outcome.kpi_raw, sample_kpi_values(2));

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body).to_string();
    for (question, answer) in QUESTIONS.iter().zip(FIVE_ANSWERS) {
        assert!(body.contains(&format!("name=\"{}\"", question.key)));
        assert!(body.contains(answer));
    }
}

#[tokio::test]
async fn test_generate_deck_surfaces_backend_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate_deck/"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "LLM quota exceeded"})))
        .mount(&server)
        .await;

    let err = backend_for(&server)
        .generate_deck(&five_answer_payload())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        TransportError::Api {
            status: 500,
            message: "LLM quota exceeded".to_string()
        }
    );
    assert_eq!(err.to_string(), "LLM quota exceeded");
}

#[tokio::test]
async fn test_generate_deck_falls_back_to_generic_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate_deck/"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let err = backend_for(&server)
        .generate_deck(&five_answer_payload())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Failed to generate deck");
}

#[tokio::test]
async fn test_generate_deck_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate_deck/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(sample_deck_response(1))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let mut config = test_config(&server.uri(), &std::env::temp_dir());
    config.request_timeout = Duration::from_secs(1);
    let backend = HttpBackend::new(config).unwrap();

    let err = backend
        .generate_deck(&five_answer_payload())
        .await
        .unwrap_err();
    assert_eq!(err, TransportError::Timeout(1));
}

#[tokio::test]
async fn test_generate_deck_rejects_non_json_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate_deck/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = backend_for(&server)
        .generate_deck(&five_answer_payload())
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_service_is_a_network_error() {
    // Nothing listens on the discard port
    let backend =
        HttpBackend::new(test_config("http://127.0.0.1:9", &std::env::temp_dir())).unwrap();

    let err = backend
        .generate_deck(&five_answer_payload())
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Network(_)));
}

// ============================================================================
// /chat
// ============================================================================

#[tokio::test]
async fn test_chat_posts_context_kpi_and_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_partial_json(json!({
            "context": "Q? A",
            "kpi": {"agents": []},
            "messages": [
                {"role": "system", "content": "You are a helpful assistant."},
                {"role": "user", "content": "Which agent is cheapest?"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reply": "Agent A."})))
        .expect(1)
        .mount(&server)
        .await;

    let request = ChatRequest {
        context: "Q? A".to_string(),
        kpi: json!({"agents": []}),
        messages: vec![
            ChatMessage::new(ChatRole::System, "You are a helpful assistant."),
            ChatMessage::new(ChatRole::User, "Which agent is cheapest?"),
        ],
    };

    let reply = backend_for(&server).chat(&request).await.unwrap();
    assert_eq!(reply, "Agent A.");
}

#[tokio::test]
async fn test_chat_without_reply_field_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"answer": "wrong key"})))
        .mount(&server)
        .await;

    let request = ChatRequest {
        context: String::new(),
        kpi: json!({}),
        messages: vec![ChatMessage::new(ChatRole::User, "hi")],
    };
    let err = backend_for(&server).chat(&request).await.unwrap_err();
    assert!(matches!(err, TransportError::Decode(_)));
}

// ============================================================================
// Binary endpoints
// ============================================================================

#[tokio::test]
async fn test_download_passes_artifact_name_as_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download_pptx/"))
        .and(query_param("pptx_file", "deck_123.pptx"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK-deck".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let bytes = backend_for(&server)
        .download_artifact("deck_123.pptx")
        .await
        .unwrap();
    assert_eq!(bytes, b"PK-deck");
}

#[tokio::test]
async fn test_download_missing_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download_pptx/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = backend_for(&server)
        .download_artifact("gone.pptx")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Failed to download PPTX file");
}

#[tokio::test]
async fn test_flowchart_drops_blank_points() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate_flowchart"))
        .and(body_partial_json(json!({
            "role": "Support lead",
            "goal": "Faster triage",
            "points": ["classify", "route"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"\x89PNG".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let request = FlowchartRequest::new(
        "Support lead",
        "Faster triage",
        vec!["classify".to_string(), "  ".to_string(), "route".to_string()],
    );
    let bytes = backend_for(&server)
        .generate_flowchart(&request)
        .await
        .unwrap();
    assert_eq!(bytes, b"\x89PNG");
}
