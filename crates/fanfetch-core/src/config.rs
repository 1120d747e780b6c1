use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::endpoint::{Endpoint, EndpointPool};
use crate::error::ConfigurationError;
use crate::fetch::HttpFetcherOptions;
use crate::retry::{ClassifierPolicy, FailoverPolicy};
use crate::scheduler::RunOptions;
use crate::source::{Credentials, Source};

/// One entry of the `endpoints` list: a descriptor string (`""` = direct,
/// otherwise a URL prefix) or `{ proxy = "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EndpointConfig {
    Descriptor(String),
    Proxy { proxy: String },
}

/// One `[[sources]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub id: String,
    /// URL returning a JSON document with the identifiers.
    pub url: String,
    /// JSON pointer to the identifier array or map (default: document root).
    #[serde(default)]
    pub pointer: String,
    /// Field read from object entries (default `id`).
    #[serde(default)]
    pub id_field: Option<String>,
}

/// Global configuration loaded from `~/.config/fanfetch/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct FanfetchConfig {
    /// Retry "source unavailable" failures through the next endpoint.
    #[serde(default = "default_true")]
    pub retry_unavailable: bool,
    /// Cancel a single attempt after this many seconds (None = no limit besides curl's).
    #[serde(default)]
    pub attempt_timeout_secs: Option<f64>,
    /// Stop starting attempts for a source after this many seconds.
    #[serde(default)]
    pub source_deadline_secs: Option<f64>,
    /// Fetch at most this many sources at once (None = all at once).
    #[serde(default)]
    pub max_concurrent_sources: Option<usize>,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: f64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: f64,
    /// Endpoint pool, tried in order. The first entry is conventionally `""` (direct).
    pub endpoints: Vec<EndpointConfig>,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
    /// `[credentials.<source-id>]` tables of string fields, sent as request headers.
    #[serde(default)]
    pub credentials: BTreeMap<String, BTreeMap<String, toml::Value>>,
}

fn default_true() -> bool {
    true
}

fn default_connect_timeout() -> f64 {
    10.0
}

fn default_request_timeout() -> f64 {
    30.0
}

impl Default for FanfetchConfig {
    fn default() -> Self {
        Self {
            retry_unavailable: true,
            attempt_timeout_secs: None,
            source_deadline_secs: None,
            max_concurrent_sources: None,
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
            endpoints: vec![
                EndpointConfig::Descriptor(String::new()),
                EndpointConfig::Descriptor("https://crossorigin.me/".to_string()),
                EndpointConfig::Descriptor("https://cors-anywhere.herokuapp.com/".to_string()),
            ],
            sources: Vec::new(),
            credentials: BTreeMap::new(),
        }
    }
}

// Credential values never reach Debug output (and so never the log); only
// the field names per source are shown.
impl fmt::Debug for FanfetchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let credentials: BTreeMap<&str, Vec<&str>> = self
            .credentials
            .iter()
            .map(|(id, fields)| (id.as_str(), fields.keys().map(String::as_str).collect()))
            .collect();
        f.debug_struct("FanfetchConfig")
            .field("retry_unavailable", &self.retry_unavailable)
            .field("attempt_timeout_secs", &self.attempt_timeout_secs)
            .field("source_deadline_secs", &self.source_deadline_secs)
            .field("max_concurrent_sources", &self.max_concurrent_sources)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("endpoints", &self.endpoints)
            .field("sources", &self.sources)
            .field("credentials", &credentials)
            .finish()
    }
}

/// Validated, ready-to-run form of the configuration.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub pool: EndpointPool,
    /// Sources with credentials applied, in configuration order.
    pub sources: Vec<Source>,
    pub options: RunOptions,
    pub http: HttpFetcherOptions,
}

impl FanfetchConfig {
    /// Build the endpoint pool from the `endpoints` list.
    pub fn endpoint_pool(&self) -> Result<EndpointPool, ConfigurationError> {
        let endpoints = self
            .endpoints
            .iter()
            .enumerate()
            .map(|(i, e)| match e {
                EndpointConfig::Descriptor(d) => Endpoint::from_descriptor(i, d),
                EndpointConfig::Proxy { proxy } => Endpoint::proxy(i, proxy),
            })
            .collect::<Result<Vec<_>, _>>()?;
        EndpointPool::new(endpoints)
    }

    /// Validate everything and produce the run plan. Nothing is fetched here.
    pub fn plan(&self) -> Result<RunPlan, ConfigurationError> {
        let pool = self.endpoint_pool()?;

        let mut seen = HashSet::new();
        let mut sources = Vec::with_capacity(self.sources.len());
        for (index, sc) in self.sources.iter().enumerate() {
            let id = sc.id.trim();
            if id.is_empty() {
                return Err(ConfigurationError::EmptySourceId { index });
            }
            if !seen.insert(id.to_string()) {
                return Err(ConfigurationError::DuplicateSource(id.to_string()));
            }
            validate_source_url(id, &sc.url)?;
            let mut source = Source::new(id, sc.url.trim());
            source.identifiers_pointer = sc.pointer.clone();
            if let Some(field) = &sc.id_field {
                source.id_field = field.clone();
            }
            sources.push(source);
        }

        for (source_id, fields) in &self.credentials {
            let source = sources
                .iter_mut()
                .find(|s| s.id().as_str() == source_id.as_str())
                .ok_or_else(|| ConfigurationError::UnknownCredentialSource(source_id.clone()))?;
            let mut credentials = Credentials::new();
            for (field, value) in fields {
                let value = value.as_str().ok_or_else(|| ConfigurationError::InvalidCredential {
                    source_id: source_id.clone(),
                    field: field.clone(),
                })?;
                credentials.insert(field.as_str(), value);
            }
            source.apply_credentials(&credentials);
        }

        let options = RunOptions {
            failover: FailoverPolicy {
                classifier: ClassifierPolicy {
                    retry_unavailable: self.retry_unavailable,
                },
                attempt_timeout: optional_secs("attempt_timeout_secs", self.attempt_timeout_secs)?,
                source_deadline: optional_secs("source_deadline_secs", self.source_deadline_secs)?,
            },
            max_concurrent_sources: match self.max_concurrent_sources {
                Some(0) => {
                    return Err(ConfigurationError::NonPositive {
                        field: "max_concurrent_sources",
                    })
                }
                other => other,
            },
        };

        // A timed-out attempt drops its future but not the blocking curl
        // transfer, so curl itself must give up no later than the attempt.
        let mut request_timeout = secs("request_timeout_secs", self.request_timeout_secs)?;
        if let Some(attempt) = options.failover.attempt_timeout {
            request_timeout = request_timeout.min(attempt);
        }
        let http = HttpFetcherOptions {
            connect_timeout: secs("connect_timeout_secs", self.connect_timeout_secs)?,
            timeout: request_timeout,
            ..HttpFetcherOptions::default()
        };

        Ok(RunPlan {
            pool,
            sources,
            options,
            http,
        })
    }
}

fn validate_source_url(id: &str, raw: &str) -> Result<(), ConfigurationError> {
    let invalid = |reason: &str| ConfigurationError::InvalidSourceUrl {
        id: id.to_string(),
        url: raw.to_string(),
        reason: reason.to_string(),
    };
    let parsed = url::Url::parse(raw.trim()).map_err(|e| invalid(&e.to_string()))?;
    if parsed.host_str().is_none() {
        return Err(invalid("missing host"));
    }
    Ok(())
}

fn secs(field: &'static str, value: f64) -> Result<Duration, ConfigurationError> {
    if value.is_finite() && value > 0.0 {
        Ok(Duration::from_secs_f64(value))
    } else {
        Err(ConfigurationError::NonPositive { field })
    }
}

fn optional_secs(field: &'static str, value: Option<f64>) -> Result<Option<Duration>, ConfigurationError> {
    value.map(|v| secs(field, v)).transpose()
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("fanfetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FanfetchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = FanfetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load configuration from an explicit path.
pub fn load_from_path(path: &Path) -> Result<FanfetchConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let cfg: FanfetchConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        retry_unavailable = false
        attempt_timeout_secs = 2.5
        max_concurrent_sources = 4
        endpoints = ["", "https://crossorigin.me/", { proxy = "socks5h://127.0.0.1:9050" }]

        [[sources]]
        id = "kraken"
        url = "https://api.kraken.com/0/public/Assets"
        pointer = "/result"

        [[sources]]
        id = "bitstamp"
        url = "https://www.bitstamp.net/api/v2/trading-pairs-info/"
        id_field = "name"

        [credentials.kraken]
        apiKey = "k"
        secret = "s"
    "#;

    #[test]
    fn default_config_values() {
        let cfg = FanfetchConfig::default();
        assert!(cfg.retry_unavailable);
        assert_eq!(cfg.endpoints.len(), 3);
        assert!(cfg.sources.is_empty());
        let plan = cfg.plan().unwrap();
        assert!(plan.pool.endpoint_at(0).is_direct());
        assert_eq!(plan.options.max_concurrent_sources, None);
        assert_eq!(plan.http.timeout, Duration::from_secs(30));
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = FanfetchConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: FanfetchConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.endpoints, cfg.endpoints);
        assert_eq!(parsed.retry_unavailable, cfg.retry_unavailable);
    }

    #[test]
    fn sample_config_plans() {
        let cfg: FanfetchConfig = toml::from_str(SAMPLE).unwrap();
        let plan = cfg.plan().unwrap();
        assert_eq!(plan.pool.size(), 3);
        assert_eq!(
            plan.pool.endpoint_at(2),
            &Endpoint::Proxy("socks5h://127.0.0.1:9050".to_string())
        );
        assert!(!plan.options.failover.classifier.retry_unavailable);
        assert_eq!(
            plan.options.failover.attempt_timeout,
            Some(Duration::from_millis(2500))
        );
        assert_eq!(plan.options.max_concurrent_sources, Some(4));
        assert_eq!(plan.http.timeout, Duration::from_millis(2500));

        let kraken = &plan.sources[0];
        assert_eq!(kraken.id().as_str(), "kraken");
        assert_eq!(kraken.identifiers_pointer, "/result");
        assert_eq!(kraken.credentials().get("apiKey"), Some("k"));
        let bitstamp = &plan.sources[1];
        assert_eq!(bitstamp.id_field, "name");
        assert!(bitstamp.credentials().is_empty());
    }

    #[test]
    fn debug_output_hides_credential_values() {
        let toml = SAMPLE.replace(r#"secret = "s""#, r#"secret = "TOPSECRET123""#);
        let cfg: FanfetchConfig = toml::from_str(&toml).unwrap();
        let dbg = format!("{:?}", cfg);
        assert!(!dbg.contains("TOPSECRET123"));
        assert!(dbg.contains("secret"));
        assert!(dbg.contains("kraken"));
    }

    #[test]
    fn credentials_for_unknown_source_fail_fast() {
        let toml = r#"
            endpoints = [""]
            [[sources]]
            id = "a"
            url = "https://a.test/"
            [credentials.b]
            apiKey = "x"
        "#;
        let cfg: FanfetchConfig = toml::from_str(toml).unwrap();
        assert_eq!(
            cfg.plan().unwrap_err(),
            ConfigurationError::UnknownCredentialSource("b".into())
        );
    }

    #[test]
    fn non_string_credential_rejected() {
        let toml = r#"
            endpoints = [""]
            [[sources]]
            id = "a"
            url = "https://a.test/"
            [credentials.a]
            uid = 42
        "#;
        let cfg: FanfetchConfig = toml::from_str(toml).unwrap();
        assert!(matches!(
            cfg.plan().unwrap_err(),
            ConfigurationError::InvalidCredential { .. }
        ));
    }

    #[test]
    fn structural_errors() {
        let mut cfg = FanfetchConfig::default();
        cfg.endpoints.clear();
        assert_eq!(cfg.plan().unwrap_err(), ConfigurationError::EmptyEndpointPool);

        let mut cfg = FanfetchConfig::default();
        let s = SourceConfig {
            id: "a".into(),
            url: "https://a.test/".into(),
            pointer: String::new(),
            id_field: None,
        };
        cfg.sources = vec![s.clone(), s];
        assert_eq!(
            cfg.plan().unwrap_err(),
            ConfigurationError::DuplicateSource("a".into())
        );

        let mut cfg = FanfetchConfig::default();
        cfg.sources = vec![SourceConfig {
            id: "a".into(),
            url: "not a url".into(),
            pointer: String::new(),
            id_field: None,
        }];
        assert!(matches!(
            cfg.plan().unwrap_err(),
            ConfigurationError::InvalidSourceUrl { .. }
        ));

        let mut cfg = FanfetchConfig::default();
        cfg.request_timeout_secs = 0.0;
        assert_eq!(
            cfg.plan().unwrap_err(),
            ConfigurationError::NonPositive {
                field: "request_timeout_secs"
            }
        );
    }

    #[test]
    fn load_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, SAMPLE).unwrap();
        let cfg = load_from_path(&path).unwrap();
        assert_eq!(cfg.sources.len(), 2);
        assert!(load_from_path(&dir.path().join("missing.toml")).is_err());
    }
}
