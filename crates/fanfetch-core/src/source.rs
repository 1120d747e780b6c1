//! Sources, their credentials, and the datasets they produce.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Stable identifier of a source (e.g. `"kraken"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SourceId(String);

impl SourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Credential fields for one source (`apiKey`, `secret`, ...).
///
/// Values are never included in `Debug` output.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials(BTreeMap<String, String>);

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.keys()).finish()
    }
}

/// Identifiers loaded from a source (markets, currency codes, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Dataset {
    identifiers: Vec<String>,
}

impl Dataset {
    pub fn new(identifiers: Vec<String>) -> Self {
        Self { identifiers }
    }

    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.identifiers.iter().any(|i| i == identifier)
    }
}

impl FromIterator<String> for Dataset {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// One remote data provider.
///
/// Created at startup, configured once, then moved into exactly one retry
/// controller. The endpoint used for an attempt is not stored here; the
/// controller passes it to each fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    id: SourceId,
    url: String,
    credentials: Credentials,
    /// JSON pointer to the identifier array in the response (`""` = document root).
    pub identifiers_pointer: String,
    /// Field read from object entries of the identifier array.
    pub id_field: String,
    dataset: Option<Dataset>,
}

impl Source {
    pub fn new(id: impl Into<SourceId>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            credentials: Credentials::new(),
            identifiers_pointer: String::new(),
            id_field: "id".to_string(),
            dataset: None,
        }
    }

    pub fn id(&self) -> &SourceId {
        &self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Merge credential fields into this source; later fields win.
    pub fn apply_credentials(&mut self, credentials: &Credentials) {
        for (k, v) in credentials.iter() {
            self.credentials.insert(k, v);
        }
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    /// Store the dataset of a successful fetch. Replaces a previous run's dataset.
    pub(crate) fn set_dataset(&mut self, dataset: Dataset) {
        self.dataset = Some(dataset);
    }

    /// Drop any dataset from a previous run before a new one starts.
    pub(crate) fn clear_dataset(&mut self) {
        self.dataset = None;
    }
}

impl From<String> for SourceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}
