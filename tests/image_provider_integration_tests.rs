use fable::images::{
    ImageCache, ImageError, ImageProvider, ImageSettings, OpenAiImageProvider,
};
use wiremock::{
    matchers::{body_partial_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

// ============================================================================
// Helper Functions
// ============================================================================

fn provider_for(server: &MockServer) -> OpenAiImageProvider {
    OpenAiImageProvider::new(
        "test-key".to_string(),
        Some(server.uri()),
        ImageSettings::default(),
    )
}

fn generation_body(url: &str) -> serde_json::Value {
    serde_json::json!({
        "created": 1700000000,
        "data": [{ "url": url, "revised_prompt": "a small sailing boat at dusk" }]
    })
}

// ============================================================================
// OpenAI Provider Tests
// ============================================================================

#[tokio::test]
async fn test_openai_returns_first_image_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({
            "model": "dall-e-3",
            "prompt": "Shahar went sailing",
            "n": 1,
            "size": "1024x1024"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(generation_body("https://img.example/boat.png")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server);
    let url = provider.resolve("Shahar went sailing").await.unwrap();

    assert_eq!(url, "https://img.example/boat.png");
}

#[tokio::test]
async fn test_openai_custom_settings_are_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .and(body_partial_json(serde_json::json!({
            "model": "dall-e-2",
            "size": "512x512",
            "quality": "hd"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(generation_body("https://img.example/2.png")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = OpenAiImageProvider::new(
        "test-key".to_string(),
        Some(mock_server.uri()),
        ImageSettings {
            model: "dall-e-2".to_string(),
            size: "512x512".to_string(),
            quality: "hd".to_string(),
        },
    );

    assert!(provider.resolve("a storm").await.is_ok());
}

#[tokio::test]
async fn test_openai_api_error_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server);
    let result = provider.resolve("a boat").await;

    assert!(matches!(result, Err(ImageError::Api { status: 401, .. })));
}

#[tokio::test]
async fn test_openai_empty_data_is_parse_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": [] })))
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server);
    let result = provider.resolve("a boat").await;

    assert!(matches!(result, Err(ImageError::Parse(_))));
}

#[tokio::test]
async fn test_openai_malformed_body_is_parse_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server);
    let result = provider.resolve("a boat").await;

    assert!(matches!(result, Err(ImageError::Parse(_))));
}

#[tokio::test]
async fn test_openai_unreachable_is_network_error() {
    // Nothing listens on port 9 (discard) in the test environment.
    let provider = OpenAiImageProvider::new(
        "test-key".to_string(),
        Some("http://127.0.0.1:9".to_string()),
        ImageSettings::default(),
    );
    let result = provider.resolve("a boat").await;

    assert!(matches!(result, Err(ImageError::Network(_))));
}

#[tokio::test]
async fn test_cache_in_front_of_openai_calls_api_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(generation_body("https://img.example/boat.png")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server);
    let mut cache = ImageCache::new();

    for _ in 0..3 {
        let resolution = cache.resolve(&provider, "Shahar went sailing").await.unwrap();
        assert_eq!(resolution.url, "https://img.example/boat.png");
    }
    // `expect(1)` is verified when the mock server drops.
}
