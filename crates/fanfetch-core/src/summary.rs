//! Aggregation helpers for renderers.
//!
//! Loaded sources contribute their identifiers; exhausted and aborted sources
//! still get a row, with nothing present.

use serde::Serialize;

use crate::scheduler::RunReport;

/// One row of an identifier presence check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresenceRow {
    pub source: String,
    /// `loaded`, `exhausted` or `aborted`.
    pub state: &'static str,
    /// Identifier count of the loaded dataset (0 otherwise).
    pub identifiers: usize,
    /// One flag per requested code, in request order.
    pub present: Vec<bool>,
}

impl PresenceRow {
    pub fn has_all(&self) -> bool {
        !self.present.is_empty() && self.present.iter().all(|p| *p)
    }
}

/// For every source in `report`, which of `codes` its dataset contains.
pub fn presence_matrix<S: AsRef<str>>(report: &RunReport, codes: &[S]) -> Vec<PresenceRow> {
    report
        .iter()
        .map(|r| {
            let dataset = r.result.dataset();
            PresenceRow {
                source: r.id().to_string(),
                state: r.result.label(),
                identifiers: dataset.map_or(0, |d| d.len()),
                present: codes
                    .iter()
                    .map(|c| dataset.is_some_and(|d| d.contains(c.as_ref())))
                    .collect(),
            }
        })
        .collect()
}

/// Ids of loaded sources whose dataset contains `code`.
pub fn sources_listing<'r>(report: &'r RunReport, code: &str) -> Vec<&'r str> {
    report
        .iter()
        .filter(|r| r.result.dataset().is_some_and(|d| d.contains(code)))
        .map(|r| r.id().as_str())
        .collect()
}
