//! Google Cloud Vision `TEXT_DETECTION` backend.

use serde::Deserialize;

use crate::error::OcrError;

use super::TextFragment;

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    #[serde(default)]
    text_annotations: Vec<EntityAnnotation>,
    error: Option<RpcStatus>,
}

#[derive(Debug, Deserialize)]
struct EntityAnnotation {
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RpcStatus {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

/// Decode an `images:annotate` response body into ordered fragments.
///
/// Only the first image response is read. Annotations without a
/// description are skipped; a response without annotations yields no
/// fragments.
pub fn parse_annotate_response(body: &str) -> Result<Vec<TextFragment>, OcrError> {
    let response: AnnotateResponse =
        serde_json::from_str(body).map_err(|e| OcrError::MalformedResponse(e.to_string()))?;

    let first = response
        .responses
        .into_iter()
        .next()
        .ok_or_else(|| OcrError::MalformedResponse("empty responses list".to_string()))?;

    if let Some(status) = first.error {
        return Err(OcrError::Backend {
            code: status.code,
            message: status.message,
        });
    }

    Ok(first
        .text_annotations
        .into_iter()
        .filter_map(|annotation| annotation.description)
        .map(TextFragment::from)
        .collect())
}

#[cfg(feature = "vision")]
pub use client::GoogleVisionClient;

#[cfg(feature = "vision")]
mod client {
    use std::time::Duration;

    use base64::{engine::general_purpose::STANDARD, Engine};
    use tracing::{debug, info};

    use crate::error::OcrError;
    use crate::models::config::VisionConfig;
    use crate::ocr::{TextDetector, TextFragment};

    use super::parse_annotate_response;

    /// HTTP client for Google Cloud Vision text detection.
    pub struct GoogleVisionClient {
        http: reqwest::Client,
        endpoint: String,
        api_key: String,
    }

    impl GoogleVisionClient {
        /// Create a client from configuration, taking the key from
        /// `GOOGLE_VISION_API_KEY` or `config.api_key`.
        pub fn new(config: &VisionConfig) -> Result<Self, OcrError> {
            Self::with_api_key(config, config.resolve_api_key())
        }

        /// Create a client with an explicitly resolved key.
        pub fn with_api_key(
            config: &VisionConfig,
            api_key: Option<String>,
        ) -> Result<Self, OcrError> {
            let api_key = api_key.ok_or(OcrError::MissingApiKey)?;
            let http = reqwest::Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .map_err(|e| OcrError::Request(e.to_string()))?;

            Ok(Self {
                http,
                endpoint: config.endpoint.clone(),
                api_key,
            })
        }

        fn request_body(image: &[u8]) -> serde_json::Value {
            serde_json::json!({
                "requests": [{
                    "image": { "content": STANDARD.encode(image) },
                    "features": [{ "type": "TEXT_DETECTION" }]
                }]
            })
        }
    }

    impl TextDetector for GoogleVisionClient {
        async fn detect(&self, image: &[u8]) -> Result<Vec<TextFragment>, OcrError> {
            info!("[Vision] Detecting text in {} byte image", image.len());

            // The key travels in the query string, so it is stripped from
            // every error before that error can be logged.
            let response = self
                .http
                .post(&self.endpoint)
                .query(&[("key", self.api_key.as_str())])
                .json(&Self::request_body(image))
                .send()
                .await
                .map_err(|e| OcrError::Request(e.without_url().to_string()))?;

            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| OcrError::Request(e.without_url().to_string()))?;

            if !status.is_success() {
                return Err(OcrError::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            let fragments = parse_annotate_response(&body)?;
            debug!("[Vision] {} text annotations", fragments.len());
            Ok(fragments)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_request_body_shape() {
            let body = GoogleVisionClient::request_body(b"abc");
            assert_eq!(body["requests"][0]["image"]["content"], "YWJj");
            assert_eq!(body["requests"][0]["features"][0]["type"], "TEXT_DETECTION");
        }

        #[test]
        fn test_missing_api_key() {
            let config = VisionConfig::default();
            assert!(matches!(
                GoogleVisionClient::with_api_key(&config, None),
                Err(OcrError::MissingApiKey)
            ));
        }

        fn client_for(server: &mockito::ServerGuard) -> GoogleVisionClient {
            let config = VisionConfig {
                endpoint: format!("{}/v1/images:annotate", server.url()),
                api_key: None,
                timeout_secs: 5,
            };
            GoogleVisionClient::with_api_key(&config, Some("test-key".to_string())).unwrap()
        }

        #[tokio::test]
        async fn test_detect_returns_ordered_fragments() {
            let mut server = mockito::Server::new_async().await;
            let mock = server
                .mock("POST", "/v1/images:annotate")
                .match_query(mockito::Matcher::UrlEncoded(
                    "key".to_string(),
                    "test-key".to_string(),
                ))
                .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                    "requests": [{
                        "image": { "content": "YWJj" },
                        "features": [{ "type": "TEXT_DETECTION" }]
                    }]
                })))
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(
                    r#"{"responses": [{"textAnnotations": [
                        {"description": "SN\n1111111111222222222222"},
                        {"description": "SN"},
                        {"description": "1111111111222222222222"}
                    ]}]}"#,
                )
                .create_async()
                .await;

            let client = client_for(&server);
            let fragments = client.detect(b"abc").await.unwrap();

            mock.assert_async().await;
            let texts: Vec<&str> = fragments.iter().map(|f| f.text.as_str()).collect();
            assert_eq!(
                texts,
                vec!["SN\n1111111111222222222222", "SN", "1111111111222222222222"]
            );
        }

        #[tokio::test]
        async fn test_detect_maps_error_status() {
            let mut server = mockito::Server::new_async().await;
            let mock = server
                .mock("POST", "/v1/images:annotate")
                .match_query(mockito::Matcher::UrlEncoded(
                    "key".to_string(),
                    "test-key".to_string(),
                ))
                .with_status(403)
                .with_body(r#"{"error": {"code": 403, "message": "API key not valid."}}"#)
                .create_async()
                .await;

            let client = client_for(&server);
            let result = client.detect(b"abc").await;

            mock.assert_async().await;
            match result {
                Err(OcrError::Status { status, body }) => {
                    assert_eq!(status, 403);
                    assert!(body.contains("API key not valid."));
                }
                other => panic!("unexpected result: {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_detect_unreachable_backend_hides_key() {
            let config = VisionConfig {
                endpoint: "http://127.0.0.1:9/v1/images:annotate".to_string(),
                api_key: None,
                timeout_secs: 2,
            };
            let client =
                GoogleVisionClient::with_api_key(&config, Some("secret-key".to_string())).unwrap();

            match client.detect(b"abc").await {
                Err(OcrError::Request(message)) => assert!(!message.contains("secret-key")),
                other => panic!("unexpected result: {other:?}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_keeps_annotation_order() {
        let body = r#"{
            "responses": [{
                "textAnnotations": [
                    {"locale": "en", "description": "MODEL A\n1111111111222222222222"},
                    {"description": "MODEL"},
                    {"description": "A"},
                    {"description": "1111111111222222222222"}
                ],
                "fullTextAnnotation": {"text": "MODEL A\n1111111111222222222222"}
            }]
        }"#;

        let fragments = parse_annotate_response(body).unwrap();
        let texts: Vec<&str> = fragments.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["MODEL A\n1111111111222222222222", "MODEL", "A", "1111111111222222222222"]
        );
    }

    #[test]
    fn test_parse_skips_missing_description() {
        let body = r#"{"responses": [{"textAnnotations": [{"score": 0.9}, {"description": "x"}]}]}"#;
        assert_eq!(parse_annotate_response(body).unwrap(), vec![TextFragment::new("x")]);
    }

    #[test]
    fn test_parse_no_text() {
        assert!(parse_annotate_response(r#"{"responses": [{}]}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_backend_error() {
        let body = r#"{"responses": [{"error": {"code": 3, "message": "Bad image data."}}]}"#;
        match parse_annotate_response(body) {
            Err(OcrError::Backend { code, message }) => {
                assert_eq!(code, 3);
                assert_eq!(message, "Bad image data.");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            parse_annotate_response("not json"),
            Err(OcrError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_annotate_response(r#"{"responses": []}"#),
            Err(OcrError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_annotate_response(r#"{"error": {"code": 403}}"#),
            Err(OcrError::MalformedResponse(_))
        ));
    }
}
