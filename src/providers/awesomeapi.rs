use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::rate::{FetchError, Quote, RateProvider};

/// Quote provider backed by the economia.awesomeapi.com.br `json/last` API.
pub struct AwesomeApiProvider {
    url: String,
    quote_key: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl AwesomeApiProvider {
    /// `timeout` bounds each fetch from request start to the last body byte.
    pub fn new(url: &str, quote_key: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent("cotacao/0.1")
            .build()
            .map_err(FetchError::Request)?;

        Ok(AwesomeApiProvider {
            url: url.to_string(),
            quote_key: quote_key.to_string(),
            timeout,
            client,
        })
    }
}

#[async_trait]
impl RateProvider for AwesomeApiProvider {
    #[instrument(name = "AwesomeApiFetch", skip(self), fields(url = %self.url))]
    async fn fetch_quote(&self) -> Result<Quote, FetchError> {
        let request = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .build()
            .map_err(FetchError::Request)?;

        let response = self
            .client
            .execute(request)
            .await
            .map_err(FetchError::Transport)?;

        debug!(status = %response.status(), "Received upstream response");
        if response.status() != StatusCode::OK {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let text = response
            .text()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        let mut quotes: HashMap<String, Quote> =
            serde_json::from_str(&text).map_err(|e| FetchError::Decode(e.to_string()))?;

        let quote = quotes
            .remove(&self.quote_key)
            .ok_or_else(|| FetchError::MissingQuote(self.quote_key.clone()))?;

        debug!(
            code = ?quote.code,
            codein = ?quote.codein,
            name = ?quote.name,
            bid = %quote.bid,
            ask = ?quote.ask,
            high = ?quote.high,
            low = ?quote.low,
            create_date = ?quote.create_date,
            "Decoded upstream quote"
        );
        Ok(quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const QUOTE_PATH: &str = "/json/last/USD-BRL";
    const MOCK_JSON: &str = r#"{
        "USDBRL": {
            "code": "USD",
            "codein": "BRL",
            "name": "Dólar Americano/Real Brasileiro",
            "high": "5.4512",
            "low": "5.4021",
            "bid": "5.4321",
            "ask": "5.4331",
            "create_date": "2026-10-16 17:59:59"
        }
    }"#;

    async fn create_mock_server(response: ResponseTemplate) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(QUOTE_PATH))
            .respond_with(response)
            .mount(&mock_server)
            .await;

        mock_server
    }

    fn provider_for(server: &MockServer, timeout_ms: u64) -> AwesomeApiProvider {
        let url = format!("{}{}", server.uri(), QUOTE_PATH);
        AwesomeApiProvider::new(&url, "USDBRL", Duration::from_millis(timeout_ms)).unwrap()
    }

    #[tokio::test]
    async fn test_successful_quote_fetch() {
        let server = create_mock_server(ResponseTemplate::new(200).set_body_string(MOCK_JSON)).await;
        let provider = provider_for(&server, 200);

        let quote = provider.fetch_quote().await.unwrap();
        assert_eq!(quote.bid, "5.4321");
        assert_eq!(quote.code.as_deref(), Some("USD"));
        assert_eq!(quote.codein.as_deref(), Some("BRL"));
        assert_eq!(quote.ask.as_deref(), Some("5.4331"));
    }

    #[tokio::test]
    async fn test_minimal_quote_only_needs_bid() {
        let body = r#"{"USDBRL": {"bid": "5.25"}}"#;
        let server = create_mock_server(ResponseTemplate::new(200).set_body_string(body)).await;
        let provider = provider_for(&server, 200);

        let quote = provider.fetch_quote().await.unwrap();
        assert_eq!(quote.bid, "5.25");
        assert!(quote.name.is_none());
    }

    #[tokio::test]
    async fn test_slow_upstream_times_out() {
        let server = create_mock_server(
            ResponseTemplate::new(200)
                .set_body_string(MOCK_JSON)
                .set_delay(Duration::from_millis(500)),
        )
        .await;
        let provider = provider_for(&server, 200);

        match provider.fetch_quote().await {
            Err(FetchError::Transport(e)) => assert!(e.is_timeout()),
            other => panic!("expected transport timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_transport_error() {
        // Reserve a port and release it so nothing listens there
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let url = format!("http://127.0.0.1:{port}{QUOTE_PATH}");

        let provider =
            AwesomeApiProvider::new(&url, "USDBRL", Duration::from_millis(200)).unwrap();
        assert!(matches!(
            provider.fetch_quote().await,
            Err(FetchError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_non_200_status() {
        let server = create_mock_server(ResponseTemplate::new(503)).await;
        let provider = provider_for(&server, 200);

        assert!(matches!(
            provider.fetch_quote().await,
            Err(FetchError::Status(503))
        ));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server =
            create_mock_server(ResponseTemplate::new(200).set_body_string("not json")).await;
        let provider = provider_for(&server, 200);

        assert!(matches!(
            provider.fetch_quote().await,
            Err(FetchError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_bid_is_decode_error() {
        let body = r#"{"USDBRL": {"ask": "5.4331"}}"#;
        let server = create_mock_server(ResponseTemplate::new(200).set_body_string(body)).await;
        let provider = provider_for(&server, 200);

        assert!(matches!(
            provider.fetch_quote().await,
            Err(FetchError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_quote_key() {
        let body = r#"{"EURBRL": {"bid": "6.01"}}"#;
        let server = create_mock_server(ResponseTemplate::new(200).set_body_string(body)).await;
        let provider = provider_for(&server, 200);

        match provider.fetch_quote().await {
            Err(FetchError::MissingQuote(key)) => assert_eq!(key, "USDBRL"),
            other => panic!("expected missing quote, got {other:?}"),
        }
    }
}
