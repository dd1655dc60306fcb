// tests/scorer_http.rs
//
// Chat completions provider against a mock endpoint, then wired into a Ranker.

mod common;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use common::{ids, liked, pool};
use swap_recommender::config::{RankingLimits, ScorerConfig};
use swap_recommender::prompt::SYSTEM_INSTRUCTION;
use swap_recommender::scorer::{ChatCompletionsScorer, Scorer, ScoringError, ScoringPrompt};
use swap_recommender::{Ranker, RankingSource};

fn cfg(server: &MockServer) -> ScorerConfig {
    ScorerConfig {
        enabled: true,
        api_key: "sk-test".into(),
        endpoint: format!("{}/v1/chat/completions", server.uri()),
        model: "test-model".into(),
        ..ScorerConfig::default()
    }
}

fn limits() -> RankingLimits {
    RankingLimits {
        scoring_timeout: Duration::from_secs(5),
        ..RankingLimits::default()
    }
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
    })
}

#[tokio::test]
async fn sends_system_and_user_messages_with_bearer_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({"model": "test-model"})))
        .respond_with(|req: &Request| {
            let body: serde_json::Value = serde_json::from_slice(&req.body).unwrap();
            let msgs = body["messages"].as_array().unwrap();
            assert_eq!(msgs[0]["role"], "system");
            assert_eq!(msgs[1]["role"], "user");
            ResponseTemplate::new(200).set_body_json(completion(&format!(
                "echo:{}",
                msgs[1]["content"].as_str().unwrap()
            )))
        })
        .expect(1)
        .mount(&server)
        .await;

    let scorer = ChatCompletionsScorer::new(&cfg(&server)).unwrap();
    let prompt = ScoringPrompt {
        system: "sys".into(),
        user: "hello".into(),
    };
    assert_eq!(scorer.complete(&prompt).await.unwrap(), "echo:hello");
}

#[tokio::test]
async fn error_status_and_empty_choices_are_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let scorer = ChatCompletionsScorer::new(&cfg(&server)).unwrap();
    let prompt = ScoringPrompt {
        system: "s".into(),
        user: "u".into(),
    };

    match scorer.complete(&prompt).await {
        Err(ScoringError::Status { status, body }) => {
            assert_eq!(status, 429);
            assert_eq!(body, "rate limited");
        }
        other => panic!("expected status error, got {other:?}"),
    }
    assert!(matches!(
        scorer.complete(&prompt).await,
        Err(ScoringError::EmptyReply)
    ));
}

#[tokio::test]
async fn missing_key_never_calls_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("[]")))
        .expect(0)
        .mount(&server)
        .await;

    let mut c = cfg(&server);
    c.api_key.clear();
    let scorer = ChatCompletionsScorer::new(&c).unwrap();
    let prompt = ScoringPrompt {
        system: "s".into(),
        user: "u".into(),
    };
    assert!(matches!(
        scorer.complete(&prompt).await,
        Err(ScoringError::Disabled)
    ));
}

#[tokio::test]
async fn ranker_over_http_uses_fenced_reply() {
    let server = MockServer::start().await;
    let reply = "```json\n[{\"id\": \"item-3\", \"score\": 9.5, \"reason\": \"books again\"},\n {\"id\": \"item-1\", \"score\": 6}]\n```";
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(move |req: &Request| {
            let body: serde_json::Value = serde_json::from_slice(&req.body).unwrap();
            assert_eq!(body["messages"][0]["content"], SYSTEM_INSTRUCTION);
            ResponseTemplate::new(200).set_body_json(completion(reply))
        })
        .expect(1)
        .mount(&server)
        .await;

    let scorer = Arc::new(ChatCompletionsScorer::new(&cfg(&server)).unwrap());
    let ranker = Ranker::new(scorer, limits());
    let out = ranker.rank(pool(5), &liked(2)).await;

    assert_eq!(out.source, RankingSource::Scored);
    assert_eq!(
        ids(&out.items),
        vec!["item-3", "item-1", "item-0", "item-2", "item-4"]
    );
}

#[tokio::test]
async fn ranker_over_http_falls_back_on_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let scorer = Arc::new(ChatCompletionsScorer::new(&cfg(&server)).unwrap());
    let out = Ranker::new(scorer, limits())
        .rank(pool(4), &liked(1))
        .await;

    assert_eq!(out.source, RankingSource::Fallback);
    assert_eq!(ids(&out.items), vec!["item-0", "item-1", "item-2", "item-3"]);
}
