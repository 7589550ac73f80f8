use std::time::Duration;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use consultai::speech::{GoogleTts, SpeechSynthesizer, SynthesisError};

fn tts(server: &MockServer) -> GoogleTts {
    GoogleTts::new(
        format!("{}/translate_tts", server.uri()),
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn test_single_chunk_request_shape() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/translate_tts"))
        .and(query_param("client", "tw-ob"))
        .and(query_param("ie", "UTF-8"))
        .and(query_param("tl", "en"))
        .and(query_param("q", "Hello there"))
        .and(query_param("total", "1"))
        .and(query_param("idx", "0"))
        .and(query_param("textlen", "11"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3audio".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let audio = assert_ok!(tts(&server).synthesize("Hello there", "en").await);
    assert_eq!(audio, b"ID3audio");
}

#[tokio::test]
async fn test_long_text_is_chunked_and_concatenated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/translate_tts"))
        .and(query_param("idx", "0"))
        .and(query_param("total", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"AAA".to_vec()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/translate_tts"))
        .and(query_param("idx", "1"))
        .and(query_param("total", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"BBB".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let text = vec!["word"; 30].join(" ");
    let audio = assert_ok!(tts(&server).synthesize(&text, "es").await);
    assert_eq!(audio, b"AAABBB");
}

#[tokio::test]
async fn test_language_is_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/translate_tts"))
        .and(query_param("tl", "de"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    assert_ok!(tts(&server).synthesize("Guten Tag", "de").await);
}

#[tokio::test]
async fn test_rejected_request_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/translate_tts"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = assert_err!(tts(&server).synthesize("Hello", "en").await);
    assert_eq!(err, SynthesisError::Status(503));
}

#[tokio::test]
async fn test_empty_audio_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/translate_tts"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let err = assert_err!(tts(&server).synthesize("Hello", "en").await);
    assert_eq!(err, SynthesisError::EmptyAudio);
}

#[tokio::test]
async fn test_blank_text_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = assert_err!(tts(&server).synthesize("   ", "en").await);
    assert_eq!(err, SynthesisError::EmptyText);
}
