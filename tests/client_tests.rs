//! HTTP tests for the generation client against a mock backend

#![cfg(feature = "client")]

use jam::config::ServerConfig;
use jam::{GenerationClient, GenerationRequest, JamError, Progression, TransportMode};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BODY: &str = r#"{"chord_melodies": {"G": "NjcgNTAwIDAgMTAw", "C": "NjAgNTAwIDAgMTAw"}, "raw_outputs": {}}"#;

fn client(server: &MockServer, mode: TransportMode) -> GenerationClient {
    GenerationClient::new(&ServerConfig {
        base_url: server.uri(),
        mode,
        variation: 3,
    })
    .unwrap()
}

#[tokio::test]
async fn test_direct_generation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .and(body_json(serde_json::json!({
            "chord_progression": "G - C",
            "style": "POP",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string(BODY))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server, TransportMode::Direct)
        .generate(&GenerationRequest::new("G - C", "POP"))
        .await
        .unwrap();

    let labels: Vec<&str> = response.chord_melodies.iter().map(|(l, _)| l.as_str()).collect();
    assert_eq!(labels, vec!["G", "C"]);
}

#[tokio::test]
async fn test_cached_generation() {
    let server = MockServer::start().await;
    // md5 of the canonical descriptor "G - C"
    assert_eq!(Progression::parse("G-C").unwrap().cache_key(), "f196d33b93c4ee52d54f987f515f57ca");
    Mock::given(method("GET"))
        .and(path("/f196d33b93c4ee52d54f987f515f57ca/JAZZ/3.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(BODY))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server, TransportMode::Cached)
        .generate(&GenerationRequest::new("G-C", "JAZZ"))
        .await
        .unwrap();
    assert_eq!(response.chord_melodies.len(), 2);
}

#[tokio::test]
async fn test_server_error_is_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = client(&server, TransportMode::Direct)
        .generate(&GenerationRequest::new("C", "POP"))
        .await;
    assert_eq!(
        result,
        Err(JamError::NetworkError("HTTP error! status: 500".to_string()))
    );
}

#[tokio::test]
async fn test_missing_cache_entry() {
    let server = MockServer::start().await;

    let result = client(&server, TransportMode::Cached)
        .generate(&GenerationRequest::new("C - F", "POP"))
        .await;
    assert_eq!(
        result,
        Err(JamError::NetworkError("HTTP error! status: 404".to_string()))
    );
}

#[tokio::test]
async fn test_unexpected_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"midi_data": "NjA="}"#))
        .mount(&server)
        .await;

    let result = client(&server, TransportMode::Direct)
        .generate(&GenerationRequest::new("C", "POP"))
        .await;
    assert!(matches!(result, Err(JamError::ResponseError(_))));
}

#[tokio::test]
async fn test_unreachable_server() {
    let client = GenerationClient::new(&ServerConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        mode: TransportMode::Direct,
        variation: 1,
    })
    .unwrap();

    let result = client.generate(&GenerationRequest::new("C", "POP")).await;
    assert!(matches!(result, Err(JamError::NetworkError(_))));
}
