//! Fixed, ordered endpoint pool shared read-only by every retry controller.

use super::Endpoint;
use crate::error::ConfigurationError;

/// Ordered list of endpoints. Never empty; never mutated after construction.
/// Cursors live in the retry controllers, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointPool {
    endpoints: Vec<Endpoint>,
}

impl EndpointPool {
    pub fn new(endpoints: Vec<Endpoint>) -> Result<Self, ConfigurationError> {
        if endpoints.is_empty() {
            return Err(ConfigurationError::EmptyEndpointPool);
        }
        Ok(Self { endpoints })
    }

    /// Pool with a single direct endpoint.
    pub fn direct_only() -> Self {
        Self {
            endpoints: vec![Endpoint::Direct],
        }
    }

    /// Build from descriptor strings (`""` = direct, otherwise a URL prefix).
    pub fn from_descriptors<S: AsRef<str>>(descriptors: &[S]) -> Result<Self, ConfigurationError> {
        let endpoints = descriptors
            .iter()
            .enumerate()
            .map(|(i, d)| Endpoint::from_descriptor(i, d.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(endpoints)
    }

    /// Number of endpoints; also the per-source attempt budget.
    pub fn size(&self) -> usize {
        self.endpoints.len()
    }

    /// Endpoint at `index`, taken modulo `size()` so any cursor is valid.
    pub fn endpoint_at(&self, index: usize) -> &Endpoint {
        &self.endpoints[index % self.endpoints.len()]
    }

    /// Round-robin successor of `cursor`.
    pub fn next_cursor(&self, cursor: usize) -> usize {
        (cursor + 1) % self.endpoints.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.iter()
    }
}
