//! HTTP client for the price prediction backend.
//!
//! Endpoints:
//! - `GET  {base}/get_location_names`  -> `{ "locations": [..] }`
//! - `GET  {base}/get_property_types`  -> `{ "property_types": [..] }`
//! - `POST {base}/predict_home_price`  (form-encoded) -> `{ "estimated_price": n }`
//! - `GET  {base}/health`              -> `{ "status": "ok" }`
//!
//! Every request is a single attempt with an explicit timeout; retries are the
//! caller's decision.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::domain::{ListKind, PredictionInput, RawEstimate};
use crate::error::AppError;

/// Anything that can produce one of the option lists.
pub trait ListSource: Send + Sync {
    fn fetch_list(&self, kind: ListKind) -> Result<Vec<String>, AppError>;
}

/// Anything that can turn validated inputs into a raw estimate.
pub trait Predictor: Send + Sync {
    fn predict(&self, input: &PredictionInput) -> Result<RawEstimate, AppError>;
}

pub struct PriceApiClient {
    client: Client,
    base_url: String,
}

impl PriceApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::config(format!("Failed to build HTTP client: {e}")))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Self::new(config.api_base.clone(), config.request_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Backend liveness check; returns the reported status string.
    pub fn health(&self) -> Result<String, AppError> {
        #[derive(Deserialize)]
        struct Health {
            status: String,
        }

        let resp = self.send(self.client.get(self.url("/health")))?;
        let (status, body) = read_body(resp)?;
        let health: Health = decode_response(status, &body)?;
        Ok(health.status)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn send(&self, req: reqwest::blocking::RequestBuilder) -> Result<Response, AppError> {
        req.send()
            .map_err(|e| AppError::network(format!("Request to {} failed: {e}", self.base_url)))
    }
}

impl ListSource for PriceApiClient {
    fn fetch_list(&self, kind: ListKind) -> Result<Vec<String>, AppError> {
        let url = self.url(kind.endpoint());
        debug!(%url, ?kind, "fetching option list");
        let resp = self.send(self.client.get(&url))?;
        let (status, body) = read_body(resp)?;
        decode_list(kind, status, &body)
    }
}

impl Predictor for PriceApiClient {
    fn predict(&self, input: &PredictionInput) -> Result<RawEstimate, AppError> {
        let url = self.url("/predict_home_price");
        info!(
            locality = %input.locality,
            property_type = %input.property_type,
            area_sqft = input.area_sqft,
            "requesting estimate"
        );
        let resp = self.send(self.client.post(&url).form(&input.form_fields()))?;
        let (status, body) = read_body(resp)?;
        let estimate: RawEstimate = decode_response(status, &body)?;
        if !estimate.estimated_price.is_finite() {
            return Err(AppError::decode(format!(
                "Backend returned a non-finite estimate ({status}): {body}"
            )));
        }
        Ok(estimate)
    }
}

fn read_body(resp: Response) -> Result<(u16, String), AppError> {
    let status = resp.status().as_u16();
    let body = resp
        .text()
        .map_err(|e| AppError::network(format!("Failed to read response body ({status}): {e}")))?;
    Ok((status, body))
}

/// Map a status + raw body to a typed payload.
///
/// Non-2xx becomes an `Http` error carrying the body; an unparsable 2xx body
/// becomes a `Decode` error carrying the body.
pub fn decode_response<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, AppError> {
    if !(200..300).contains(&status) {
        return Err(AppError::http(status, body.trim()));
    }
    serde_json::from_str(body)
        .map_err(|e| AppError::decode(format!("Unparsable response ({status}): {e}: {}", body.trim())))
}

/// Decode a list response. A missing key is an empty list.
pub fn decode_list(kind: ListKind, status: u16, body: &str) -> Result<Vec<String>, AppError> {
    let value: serde_json::Value = decode_response(status, body)?;
    let Some(object) = value.as_object() else {
        return Err(AppError::decode(format!(
            "Expected a JSON object for {:?}, got: {}",
            kind,
            body.trim()
        )));
    };
    match object.get(kind.response_key()) {
        None | Some(serde_json::Value::Null) => Ok(Vec::new()),
        Some(list) => serde_json::from_value(list.clone()).map_err(|e| {
            AppError::decode(format!("Invalid '{}' list: {e}", kind.response_key()))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread;

    fn sample_input() -> PredictionInput {
        PredictionInput {
            locality: "Gachibowli".to_string(),
            property_type: "Apartment".to_string(),
            area_sqft: 1200.0,
            age_years: 5,
            bedrooms: 2,
        }
    }

    /// Serve exactly one HTTP response on a loopback port; the join handle
    /// yields the raw request that was received.
    fn serve_once(status_line: &str, body: &str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            stream.write_all(response.as_bytes()).unwrap();
            request
        });
        (format!("http://{addr}"), handle)
    }

    fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf).into_owned();
            if let Some(head_end) = text.find("\r\n\r\n") {
                let content_length = text[..head_end]
                    .lines()
                    .find_map(|line| {
                        let (k, v) = line.split_once(':')?;
                        if k.eq_ignore_ascii_case("content-length") {
                            v.trim().parse::<usize>().ok()
                        } else {
                            None
                        }
                    })
                    .unwrap_or(0);
                if buf.len() >= head_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    #[test]
    fn predict_posts_form_fields_and_parses_estimate() {
        let (base, server) = serve_once("200 OK", "{\"estimated_price\": 0.85}");
        let client = PriceApiClient::new(base, Duration::from_secs(5)).unwrap();

        let estimate = client.predict(&sample_input()).unwrap();
        assert_eq!(estimate.estimated_price, 0.85);

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /predict_home_price "));
        assert!(request.to_ascii_lowercase().contains("content-type: application/x-www-form-urlencoded"));
        assert!(request.ends_with(
            "locality=Gachibowli&property_type=Apartment&area_in_sqft=1200&age_of_property=5&bedrooms=2"
        ));
    }

    #[test]
    fn predict_surfaces_status_and_body_on_server_error() {
        let (base, server) = serve_once(
            "400 Bad Request",
            "{\"error\":\"locality and property_type are required\"}",
        );
        let client = PriceApiClient::new(base, Duration::from_secs(5)).unwrap();

        let err = client.predict(&sample_input()).unwrap_err();
        server.join().unwrap();
        assert_eq!(err.kind(), ErrorKind::Http { status: 400 });
        assert!(err.message().contains("locality and property_type are required"));
    }

    #[test]
    fn fetch_list_hits_the_kind_endpoint() {
        let (base, server) = serve_once("200 OK", "{\"property_types\": [\"APARTMENT\", \"villa\"]}");
        let client = PriceApiClient::new(format!("{base}/"), Duration::from_secs(5)).unwrap();

        let list = client.fetch_list(ListKind::PropertyTypes).unwrap();
        assert_eq!(list, vec!["APARTMENT".to_string(), "villa".to_string()]);
        assert!(server.join().unwrap().starts_with("GET /get_property_types "));
    }

    #[test]
    fn unreachable_backend_is_a_network_error() {
        // Bind then drop to get a port nothing listens on.
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let client = PriceApiClient::new(format!("http://127.0.0.1:{port}"), Duration::from_secs(2)).unwrap();
        let err = client.fetch_list(ListKind::Locations).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[test]
    fn decode_response_rejects_unparsable_success_body() {
        let err = decode_response::<RawEstimate>(200, "<html>oops</html>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert!(err.message().contains("<html>oops</html>"));
    }

    #[test]
    fn decode_list_treats_missing_key_as_empty() {
        assert!(decode_list(ListKind::Locations, 200, "{}").unwrap().is_empty());
        assert!(decode_list(ListKind::Locations, 200, "{\"locations\": null}").unwrap().is_empty());
    }

    #[test]
    fn decode_list_rejects_wrong_shapes() {
        let err = decode_list(ListKind::Locations, 200, "[\"a\"]").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        let err = decode_list(ListKind::Locations, 200, "{\"locations\": [1, 2]}").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }
}
