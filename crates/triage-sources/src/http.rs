//! HTTP source backed by the case-management REST API
//!
//! Each source kind has an ordered chain of routes (see
//! [`RouteTable`](crate::config::RouteTable)). Routes are tried one after the
//! other; the first 2xx answer whose body decodes wins. Bodies may be a bare
//! JSON value or wrapped in a `{"data": ...}` envelope. Record lists are
//! decoded element by element so one malformed record never costs the
//! whole list.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::error::SourceError;
use crate::records::{BeneficiaryRecord, CampaignInfo, ReceptionParticipantRecord, RecordId};
use crate::source_traits::{
    BeneficiarySource, CampaignSource, ReceptionSource, SourceKind, SourceResult,
};

fn decode_error(route: &str, message: impl ToString) -> SourceError {
    SourceError::Decode {
        route: route.to_string(),
        message: message.to_string(),
    }
}

/// Parse a body and strip the `{"data": ...}` envelope when present.
fn payload(route: &str, body: &str) -> SourceResult<Value> {
    let value: Value = serde_json::from_str(body).map_err(|e| decode_error(route, e))?;
    Ok(match value {
        Value::Object(mut map) => match map.remove("data") {
            Some(inner) => inner,
            None => Value::Object(map),
        },
        other => other,
    })
}

/// Decode a single value, accepting both bare and `data`-wrapped payloads.
pub fn decode_body<T: DeserializeOwned>(route: &str, body: &str) -> SourceResult<T> {
    serde_json::from_value(payload(route, body)?).map_err(|e| decode_error(route, e))
}

/// Decode a record list one element at a time.
///
/// The body must hold a JSON array (or `null`, read as empty). An element
/// that does not decode is logged and replaced by `T::default()`, which has
/// no identifier and is skipped downstream as an anomaly.
pub fn decode_records<T: DeserializeOwned + Default>(
    route: &str,
    body: &str,
) -> SourceResult<Vec<T>> {
    let items = match payload(route, body)? {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => {
            return Err(decode_error(
                route,
                format!("expected a list of records, got {}", json_type(&other)),
            ))
        }
    };

    Ok(items
        .into_iter()
        .enumerate()
        .map(|(position, item)| {
            serde_json::from_value(item).unwrap_or_else(|e| {
                warn!(route, position, error = %e, "undecodable record kept without identifier");
                T::default()
            })
        })
        .collect())
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// REST client implementing all three source traits
pub struct HttpSource {
    config: ApiConfig,
    http_client: reqwest::Client,
}

impl HttpSource {
    /// Create a new client
    pub fn new(config: ApiConfig) -> SourceResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("triage-sources/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SourceError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(HttpSource {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    async fn get_route(&self, url: &str) -> SourceResult<String> {
        let mut request = self.http_client.get(url);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| SourceError::Http {
            route: url.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                route: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| SourceError::Http {
            route: url.to_string(),
            message: e.to_string(),
        })
    }

    /// Walk the route chain for `kind` until one route yields a decodable body.
    async fn fetch_with_fallback<T>(
        &self,
        kind: SourceKind,
        campaign_id: &RecordId,
        decode: fn(&str, &str) -> SourceResult<T>,
    ) -> SourceResult<T> {
        let mut attempts = Vec::new();

        for template in self.config.routes.routes(kind) {
            let url = self.config.url_for(template, campaign_id)?;
            let outcome = match self.get_route(&url).await {
                Ok(body) => decode(&url, &body),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(value) => {
                    debug!(kind = %kind, route = %url, "route answered");
                    return Ok(value);
                }
                Err(e) => {
                    debug!(kind = %kind, route = %url, error = %e, "route failed, trying next");
                    attempts.push(e.to_string());
                }
            }
        }

        warn!(kind = %kind, campaign_id = %campaign_id, attempts = attempts.len(), "all routes failed");
        Err(SourceError::AllRoutesFailed { kind, attempts })
    }
}

#[async_trait]
impl BeneficiarySource for HttpSource {
    async fn fetch_beneficiaries(
        &self,
        campaign_id: &RecordId,
    ) -> SourceResult<Vec<BeneficiaryRecord>> {
        self.fetch_with_fallback(SourceKind::Beneficiary, campaign_id, decode_records)
            .await
    }
}

#[async_trait]
impl ReceptionSource for HttpSource {
    async fn fetch_reception(
        &self,
        campaign_id: &RecordId,
    ) -> SourceResult<Vec<ReceptionParticipantRecord>> {
        self.fetch_with_fallback(SourceKind::Reception, campaign_id, decode_records)
            .await
    }
}

#[async_trait]
impl CampaignSource for HttpSource {
    async fn fetch_campaign(&self, campaign_id: &RecordId) -> SourceResult<CampaignInfo> {
        self.fetch_with_fallback(SourceKind::Campaign, campaign_id, decode_body)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn decodes_bare_list() {
        let records: Vec<BeneficiaryRecord> =
            decode_records("/b", r#"[{"id": 1, "decision": "accepté"}, {"id": "2"}]"#).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].decision.as_deref(), Some("accepté"));
    }

    #[test]
    fn decodes_wrapped_list() {
        let records: Vec<ReceptionParticipantRecord> = decode_records(
            "/r",
            r#"{"data": [{"id": 4, "statut": "oui"}], "meta": {"total": 1}}"#,
        )
        .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].statut.as_deref(), Some("oui"));
    }

    #[test]
    fn decodes_empty_list() {
        let records: Vec<BeneficiaryRecord> = decode_records("/b", "[]").unwrap();
        assert!(records.is_empty());
        let null: Vec<BeneficiaryRecord> = decode_records("/b", r#"{"data": null}"#).unwrap();
        assert!(null.is_empty());
    }

    #[test]
    fn decodes_bare_and_wrapped_campaign() {
        let bare: CampaignInfo =
            decode_body("/c", r#"{"id": 3, "type_assistance": "auditif"}"#).unwrap();
        let wrapped: CampaignInfo =
            decode_body("/c", r#"{"data": {"id": 3, "type_assistance": "auditif"}}"#).unwrap();
        assert_eq!(bare, wrapped);
    }

    #[test]
    fn undecodable_body_reports_route() {
        let err = decode_records::<BeneficiaryRecord>("/campagnes/1", "<html>").unwrap_err();
        match err {
            SourceError::Decode { route, .. } => assert_eq!(route, "/campagnes/1"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn one_malformed_record_keeps_the_rest_of_the_list() {
        let records: Vec<BeneficiaryRecord> = decode_records(
            "/b",
            r#"{"data": [
                {"id": 1, "decision": "accepte"},
                {"id": 2, "decision": "refuse", "nom": 42, "campaign_id": 7, "campagne_id": 7},
                "garbage",
                {"id": 4, "decision": 3}
            ]}"#,
        )
        .unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].decision.as_deref(), Some("accepte"));
        assert_eq!(records[1].nom.as_deref(), Some("42"));
        assert_eq!(records[1].campaign_id, Some(RecordId::from(7)));
        assert_eq!(records[2], BeneficiaryRecord::default());
        assert_eq!(records[3].decision.as_deref(), Some("3"));
    }

    #[test]
    fn record_list_must_be_an_array() {
        let err = decode_records::<BeneficiaryRecord>("/b", r#"{"data": {"id": 1}}"#).unwrap_err();
        assert!(err.to_string().contains("expected a list of records, got an object"));
    }

    #[test]
    fn campaign_decode_error_names_the_missing_field() {
        let err = decode_body::<CampaignInfo>("/c", r#"{"data": {"nom": "x"}}"#).unwrap_err();
        assert!(err.to_string().contains("missing field `id`"), "{err}");
    }

    /// One-request-per-connection HTTP server answering from `answer`.
    /// Returns its base URL and the raw requests it received.
    async fn serve(answer: fn(&str) -> (u16, &'static str)) -> (String, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = stream.read(&mut buf).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                }
                let request = String::from_utf8_lossy(&request).into_owned();
                let path = request.split_whitespace().nth(1).unwrap_or("").to_string();
                let (status, body) = answer(&path);
                log.lock().unwrap().push(request);

                let response = format!(
                    "HTTP/1.1 {status} Answer\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(response.as_bytes()).await.unwrap();
                let _ = stream.shutdown().await;
            }
        });

        (format!("http://{addr}"), seen)
    }

    /// Primary routes are broken (404 or HTML), fallbacks answer.
    fn legacy_api(path: &str) -> (u16, &'static str) {
        match path {
            "/beneficiaires?campagne_id=7" => (
                200,
                r#"{"data": [{"id": 1, "decision": "accepte"}, {"id": 2, "nom": 42}]}"#,
            ),
            "/campagnes/7" => (200, "<html>maintenance</html>"),
            "/campagnes/show/7" => (200, r#"{"data": {"id": 7, "type_assistance": "auditive"}}"#),
            _ => (404, r#"{"message": "not found"}"#),
        }
    }

    fn request_lines(seen: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
        seen.lock()
            .unwrap()
            .iter()
            .map(|r| r.lines().next().unwrap_or("").to_string())
            .collect()
    }

    #[tokio::test]
    async fn second_route_answers_after_not_found() {
        let (base_url, seen) = serve(legacy_api).await;
        let source = HttpSource::new(ApiConfig::new(&base_url)).unwrap();

        let records = source.fetch_beneficiaries(&RecordId::from(7)).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].nom.as_deref(), Some("42"));
        assert_eq!(
            request_lines(&seen),
            [
                "GET /campagnes/7/beneficiaires HTTP/1.1",
                "GET /beneficiaires?campagne_id=7 HTTP/1.1"
            ]
        );
    }

    #[tokio::test]
    async fn undecodable_first_route_falls_through() {
        let (base_url, seen) = serve(legacy_api).await;
        let source = HttpSource::new(ApiConfig::new(&base_url)).unwrap();

        let campaign = source.fetch_campaign(&RecordId::from(7)).await.unwrap();
        assert_eq!(campaign.id, RecordId::from(7));
        assert_eq!(campaign.type_assistance.as_deref(), Some("auditive"));
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn every_route_failing_lists_each_attempt() {
        let (base_url, _) = serve(legacy_api).await;
        let source = HttpSource::new(ApiConfig::new(&base_url)).unwrap();

        let err = source.fetch_reception(&RecordId::from(7)).await.unwrap_err();
        match err {
            SourceError::AllRoutesFailed { kind, attempts } => {
                assert_eq!(kind, SourceKind::Reception);
                assert_eq!(attempts.len(), 2);
                assert!(attempts.iter().all(|a| a.contains("status 404")));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn bearer_token_is_sent_on_every_route() {
        let (base_url, seen) = serve(legacy_api).await;
        let source = HttpSource::new(ApiConfig::new(&base_url).with_token("tok-123")).unwrap();

        source.fetch_beneficiaries(&RecordId::from(7)).await.unwrap();
        let requests = seen.lock().unwrap().clone();
        assert_eq!(requests.len(), 2);
        for request in requests {
            assert!(
                request.to_ascii_lowercase().contains("authorization: bearer tok-123"),
                "{request}"
            );
        }
    }

    #[tokio::test]
    async fn no_token_sends_no_authorization_header() {
        let (base_url, seen) = serve(legacy_api).await;
        let source = HttpSource::new(ApiConfig::new(&base_url)).unwrap();

        source.fetch_campaign(&RecordId::from(7)).await.unwrap();
        for request in seen.lock().unwrap().iter() {
            assert!(!request.to_ascii_lowercase().contains("authorization:"));
        }
    }

    #[tokio::test]
    async fn reserved_characters_in_campaign_id_send_nothing() {
        let (base_url, seen) = serve(legacy_api).await;
        let source = HttpSource::new(ApiConfig::new(&base_url)).unwrap();

        let err = source
            .fetch_beneficiaries(&RecordId::from("7&campagne_id=8"))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Config(_)), "{err}");
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unreachable_server_exhausts_every_route() {
        let mut config = ApiConfig::new("http://127.0.0.1:9");
        config.timeout_secs = 1;
        let source = HttpSource::new(config).unwrap();

        let err = source
            .fetch_beneficiaries(&RecordId::from(1))
            .await
            .unwrap_err();
        match err {
            SourceError::AllRoutesFailed { kind, attempts } => {
                assert_eq!(kind, SourceKind::Beneficiary);
                assert_eq!(attempts.len(), 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
