//! API configuration
//!
//! Settings for [`HttpSource`](crate::http::HttpSource): base URL, bearer
//! token, timeout, and the ordered route templates tried for each source
//! kind. Loaded from environment variables or a TOML file.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::SourceError;
use crate::records::RecordId;
use crate::source_traits::{SourceKind, SourceResult};

/// Environment variable holding the API base URL.
pub const ENV_API_URL: &str = "TRIAGE_API_URL";
/// Environment variable holding the bearer token.
pub const ENV_API_TOKEN: &str = "TRIAGE_API_TOKEN";
/// Environment variable holding the request timeout in seconds.
pub const ENV_API_TIMEOUT: &str = "TRIAGE_API_TIMEOUT_SECS";

const CAMPAIGN_PLACEHOLDER: &str = "{campaign_id}";

/// Ordered route templates per source kind. `{campaign_id}` is substituted
/// at request time; the first route that answers wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteTable {
    pub beneficiaries: Vec<String>,
    pub reception: Vec<String>,
    pub campaign: Vec<String>,
}

impl Default for RouteTable {
    fn default() -> Self {
        RouteTable {
            beneficiaries: vec![
                "/campagnes/{campaign_id}/beneficiaires".to_string(),
                "/beneficiaires?campagne_id={campaign_id}".to_string(),
            ],
            reception: vec![
                "/campagnes/{campaign_id}/reception/participants".to_string(),
                "/reception/participants?campagne_id={campaign_id}".to_string(),
            ],
            campaign: vec![
                "/campagnes/{campaign_id}".to_string(),
                "/campagnes/show/{campaign_id}".to_string(),
            ],
        }
    }
}

impl RouteTable {
    /// Route templates for one source kind.
    pub fn routes(&self, kind: SourceKind) -> &[String] {
        match kind {
            SourceKind::Beneficiary => &self.beneficiaries,
            SourceKind::Reception => &self.reception,
            SourceKind::Campaign => &self.campaign,
        }
    }
}

/// HTTP API configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API base URL, without trailing slash
    pub base_url: String,
    /// Bearer token (optional for open deployments)
    pub token: Option<String>,
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Route fallback chains
    pub routes: RouteTable,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: "http://localhost:8000/api".to_string(),
            token: None,
            timeout_secs: 15,
            routes: RouteTable::default(),
        }
    }
}

impl ApiConfig {
    /// Create a config for a specific server
    pub fn new(base_url: &str) -> Self {
        ApiConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Set authentication token
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    /// Defaults overridden by `TRIAGE_API_*` environment variables
    pub fn from_env() -> SourceResult<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_vars<F>(lookup: F) -> SourceResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(url) = lookup(ENV_API_URL) {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(token) = lookup(ENV_API_TOKEN).filter(|t| !t.trim().is_empty()) {
            config.token = Some(token);
        }
        if let Some(raw) = lookup(ENV_API_TIMEOUT) {
            config.timeout_secs = raw.trim().parse().map_err(|_| {
                SourceError::Config(format!("{} must be a positive integer, got {:?}", ENV_API_TIMEOUT, raw))
            })?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(raw: &str) -> SourceResult<Self> {
        let mut config: ApiConfig = toml::from_str(raw)?;
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: &Path) -> SourceResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    fn validate(&self) -> SourceResult<()> {
        if self.base_url.is_empty() {
            return Err(SourceError::Config("base_url is empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(SourceError::Config("timeout_secs must be > 0".to_string()));
        }
        for kind in [SourceKind::Beneficiary, SourceKind::Reception, SourceKind::Campaign] {
            if self.routes.routes(kind).is_empty() {
                return Err(SourceError::Config(format!("no routes configured for {}", kind)));
            }
        }
        Ok(())
    }

    /// Absolute URL for a route template. Campaign ids holding anything but
    /// unreserved URL characters are refused rather than escaped.
    pub fn url_for(&self, template: &str, campaign_id: &RecordId) -> SourceResult<String> {
        let raw = campaign_id.as_str();
        if let Some(c) = raw.chars().find(|c| !is_unreserved(*c)) {
            return Err(SourceError::Config(format!(
                "campaign id {:?} contains {:?}, which cannot be placed in a route",
                raw, c
            )));
        }

        let path = template.replace(CAMPAIGN_PLACEHOLDER, raw);
        Ok(if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        })
    }
}

/// RFC 3986 unreserved characters; anything else would change the URL's meaning.
fn is_unreserved(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn env_overrides_defaults() {
        let config = ApiConfig::from_vars(vars(&[
            (ENV_API_URL, "https://api.example.org/v1/"),
            (ENV_API_TOKEN, "secret"),
            (ENV_API_TIMEOUT, "30"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://api.example.org/v1");
        assert_eq!(config.token.as_deref(), Some("secret"));
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.routes, RouteTable::default());
    }

    #[test]
    fn empty_env_keeps_defaults() {
        let config = ApiConfig::from_vars(vars(&[(ENV_API_TOKEN, "  ")])).unwrap();
        assert_eq!(config, ApiConfig::default());
    }

    #[test]
    fn bad_timeout_is_a_config_error() {
        let err = ApiConfig::from_vars(vars(&[(ENV_API_TIMEOUT, "soon")])).unwrap_err();
        assert!(matches!(err, SourceError::Config(_)));
        let zero = ApiConfig::from_vars(vars(&[(ENV_API_TIMEOUT, "0")])).unwrap_err();
        assert!(zero.to_string().contains("timeout_secs"));
    }

    #[test]
    fn toml_partial_document_keeps_default_routes() {
        let config = ApiConfig::from_toml_str(
            r#"
            base_url = "https://triage.local/api/"
            token = "abc"

            [routes]
            reception = ["/v2/reception/{campaign_id}"]
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url, "https://triage.local/api");
        assert_eq!(config.timeout_secs, 15);
        assert_eq!(config.routes.reception, vec!["/v2/reception/{campaign_id}"]);
        assert_eq!(config.routes.campaign, RouteTable::default().campaign);
    }

    #[test]
    fn toml_with_empty_route_list_is_rejected() {
        let err = ApiConfig::from_toml_str("[routes]\ncampaign = []\n").unwrap_err();
        assert!(err.to_string().contains("no routes configured for campaign"));
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("triage.toml");
        std::fs::write(&path, "timeout_secs = 5\n").unwrap();
        let config = ApiConfig::from_file(&path).unwrap();
        assert_eq!(config.timeout_secs, 5);

        let missing = ApiConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(missing, SourceError::Io(_)));
    }

    #[test]
    fn url_for_substitutes_campaign_id() {
        let config = ApiConfig::new("https://api.example.org/");
        let id = RecordId::from(42);
        assert_eq!(
            config
                .url_for("/campagnes/{campaign_id}/beneficiaires", &id)
                .unwrap(),
            "https://api.example.org/campagnes/42/beneficiaires"
        );
        assert_eq!(
            config
                .url_for("reception?campagne_id={campaign_id}", &id)
                .unwrap(),
            "https://api.example.org/reception?campagne_id=42"
        );
        let code = RecordId::from("CAMP-2024_a.1~x");
        assert!(config.url_for("/campagnes/{campaign_id}", &code).is_ok());
    }

    #[test]
    fn url_for_rejects_reserved_characters_in_campaign_id() {
        let config = ApiConfig::new("https://api.example.org");
        for raw in ["1&campagne_id=2", "../admin", "a/b", "7?x", "12 34", "%2F", "é"] {
            let err = config
                .url_for("/campagnes/{campaign_id}", &RecordId::from(raw))
                .unwrap_err();
            assert!(matches!(err, SourceError::Config(_)), "{raw}: {err}");
        }
    }
}
