//! OpenWeatherMap current-conditions client.

use crate::{Location, Result, RetrievalError, WeatherProvider, WeatherReport};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            base_url: OPENWEATHER_BASE_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

pub struct OpenWeatherClient {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenWeatherClient {
    /// Fails only when the HTTP client cannot be built, which is a startup
    /// fault rather than a lookup failure.
    pub fn new(
        settings: &WeatherSettings,
        api_key: impl Into<String>,
    ) -> std::result::Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            endpoint: format!("{}/weather", settings.base_url.trim_end_matches('/')),
            api_key: api_key.into(),
            client,
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current(&self, location: &Location) -> Result<WeatherReport> {
        let query = location.query();
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            // without_url keeps the appid out of the message
            .map_err(|e| RetrievalError::Network(e.without_url().to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RetrievalError::Status(status.as_u16()));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| RetrievalError::Network(e.without_url().to_string()))?;
        let report = parse_current_weather(&body)?;
        tracing::debug!(
            location = %query,
            temp = report.temperature_celsius,
            "weather lookup succeeded"
        );
        Ok(report)
    }

    fn name(&self) -> &str {
        "openweathermap"
    }
}

/// Extract `main.temp` and `weather[0].description` from a current-weather body.
pub fn parse_current_weather(body: &str) -> Result<WeatherReport> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| RetrievalError::Malformed(format!("not JSON: {e}")))?;

    let temperature_celsius = value
        .pointer("/main/temp")
        .and_then(serde_json::Value::as_f64)
        .ok_or_else(|| RetrievalError::Malformed("missing main.temp".into()))?;
    let description = value
        .pointer("/weather/0/description")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| RetrievalError::Malformed("missing weather[0].description".into()))?;

    Ok(WeatherReport {
        temperature_celsius,
        description: description.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// One-shot HTTP server: returns its base URL and the request head it saw.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 2048];
            while !String::from_utf8_lossy(&buf).contains("\r\n\r\n") {
                let n = sock.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            let resp = format!(
                "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            sock.write_all(resp.as_bytes()).await.unwrap();
            sock.shutdown().await.ok();
            String::from_utf8_lossy(&buf).to_string()
        });
        (format!("http://{addr}/data/2.5"), handle)
    }

    fn settings(base_url: String) -> WeatherSettings {
        WeatherSettings {
            base_url,
            timeout_secs: 5,
        }
    }

    #[test]
    fn client_build_error_is_not_a_retrieval_error() {
        let built: std::result::Result<OpenWeatherClient, reqwest::Error> =
            OpenWeatherClient::new(&WeatherSettings::default(), "k");
        let client = built.unwrap();
        assert_eq!(client.endpoint, "https://api.openweathermap.org/data/2.5/weather");
    }

    #[test]
    fn parses_expected_fields() {
        let report =
            parse_current_weather(r#"{"main":{"temp":5.0},"weather":[{"description":"light rain"}]}"#)
                .unwrap();
        assert_eq!(report.temperature_celsius, 5.0);
        assert_eq!(report.description, "light rain");
    }

    #[test]
    fn integer_temperature_is_accepted() {
        let report =
            parse_current_weather(r#"{"main":{"temp":-2},"weather":[{"description":"snow"}]}"#)
                .unwrap();
        assert_eq!(report.temperature_celsius, -2.0);
        assert_eq!(
            report.sentence(&Location::default()),
            "The current weather in Toronto is -2.0 degrees Celsius with snow."
        );
    }

    #[test]
    fn missing_fields_are_malformed() {
        for body in [
            r#"{"main":{},"weather":[{"description":"light rain"}]}"#,
            r#"{"main":{"temp":"warm"},"weather":[{"description":"light rain"}]}"#,
            r#"{"main":{"temp":5.0},"weather":[]}"#,
            r#"{"main":{"temp":5.0}}"#,
            "<html>gateway timeout</html>",
        ] {
            let err = parse_current_weather(body).unwrap_err();
            assert!(matches!(err, RetrievalError::Malformed(_)), "{body}");
        }
    }

    #[tokio::test]
    async fn requests_city_key_and_metric_units() {
        let (base, server) = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"main":{"temp":5.0},"weather":[{"description":"light rain"}]}"#,
        )
        .await;
        let client = OpenWeatherClient::new(&settings(base), "abc123").unwrap();
        let report = client.current(&Location::default()).await.unwrap();
        assert_eq!(
            report.sentence(&Location::default()),
            "The current weather in Toronto is 5.0 degrees Celsius with light rain."
        );

        let request = server.await.unwrap();
        let request_line = request.lines().next().unwrap();
        assert!(request_line.starts_with("GET /data/2.5/weather?"));
        assert!(request_line.contains("q=Toronto%2CCA"));
        assert!(request_line.contains("appid=abc123"));
        assert!(request_line.contains("units=metric"));
    }

    #[tokio::test]
    async fn unauthorized_maps_to_status_error() {
        let (base, _server) =
            serve_once("HTTP/1.1 401 Unauthorized", r#"{"cod":401,"message":"Invalid API key"}"#).await;
        let client = OpenWeatherClient::new(&settings(base), "bad").unwrap();
        let err = client.current(&Location::default()).await.unwrap_err();
        assert!(matches!(err, RetrievalError::Status(401)));
    }

    #[tokio::test]
    async fn malformed_body_maps_to_malformed_error() {
        let (base, _server) = serve_once("HTTP/1.1 200 OK", r#"{"main":{}}"#).await;
        let client = OpenWeatherClient::new(&settings(base), "k").unwrap();
        let err = client.current(&Location::default()).await.unwrap_err();
        assert!(matches!(err, RetrievalError::Malformed(_)));
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = OpenWeatherClient::new(&settings(format!("http://{addr}")), "k").unwrap();
        let err = client.current(&Location::default()).await.unwrap_err();
        assert!(matches!(err, RetrievalError::Network(_)));
    }
}
