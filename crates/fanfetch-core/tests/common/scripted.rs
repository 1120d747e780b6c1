//! In-memory fetchers with scripted, per-source behavior.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use fanfetch_core::fetch::FetchFuture;
use fanfetch_core::{Dataset, Endpoint, FetchError, Fetcher, Source};

/// What one scripted attempt does after its delay.
#[derive(Debug, Clone)]
pub enum Step {
    Load(Vec<String>),
    Network,
    Timeout,
    Ddos,
    Unavailable,
    Auth,
    Protocol,
    Unrecognized,
    Panic,
}

impl Step {
    pub fn load(ids: &[&str]) -> Self {
        Step::Load(ids.iter().map(|s| s.to_string()).collect())
    }

    fn into_result(self, source: &str) -> Result<Dataset, FetchError> {
        match self {
            Step::Load(ids) => Ok(Dataset::new(ids)),
            Step::Network => Err(FetchError::Network(format!("{}: read ECONNRESET", source))),
            Step::Timeout => Err(FetchError::Timeout(format!("{}: request timed out", source))),
            Step::Ddos => Err(FetchError::DdosProtection(format!("{}: cloudflare", source))),
            Step::Unavailable => Err(FetchError::SourceUnavailable(format!("{}: maintenance", source))),
            Step::Auth => Err(FetchError::Authentication(format!("{}: invalid api key", source))),
            Step::Protocol => Err(FetchError::Protocol(format!("{}: unexpected payload", source))),
            Step::Unrecognized => Err(FetchError::Other(anyhow::anyhow!("{}: internal bug", source))),
            Step::Panic => panic!("{}: fetcher panicked", source),
        }
    }
}

/// Replays per-source scripts of `(delay, step)`. A source with no steps left
/// fails with a network error. Records `(source, endpoint)` for every call.
#[derive(Default)]
pub struct ScriptedFetcher {
    scripts: Mutex<HashMap<String, VecDeque<(Duration, Step)>>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(self, source: &str, steps: Vec<Step>) -> Self {
        self.script_delayed(source, steps.into_iter().map(|s| (Duration::ZERO, s)).collect())
    }

    pub fn script_delayed(self, source: &str, steps: Vec<(Duration, Step)>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(source.to_string(), steps.into_iter().collect());
        self
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    /// Endpoint labels used for `source`, in call order.
    pub fn endpoints_for(&self, source: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|(s, _)| s == source)
            .map(|(_, e)| e)
            .collect()
    }
}

impl Fetcher for ScriptedFetcher {
    fn fetch<'a>(&'a self, source: &'a Source, endpoint: &'a Endpoint) -> FetchFuture<'a> {
        let id = source.id().to_string();
        self.calls
            .lock()
            .unwrap()
            .push((id.clone(), endpoint.to_string()));
        let next = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(&id)
            .and_then(|steps| steps.pop_front())
            .unwrap_or((Duration::ZERO, Step::Network));
        Box::pin(async move {
            let (delay, step) = next;
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            step.into_result(&id)
        })
    }
}

/// Succeeds only through the direct endpoint; every other endpoint resets.
pub struct DirectOnlyFetcher;

impl Fetcher for DirectOnlyFetcher {
    fn fetch<'a>(&'a self, source: &'a Source, endpoint: &'a Endpoint) -> FetchFuture<'a> {
        let result = if endpoint.is_direct() {
            Ok(Dataset::new(vec![
                format!("{}:BTC", source.id()),
                format!("{}:BCH", source.id()),
            ]))
        } else {
            Err(FetchError::Network("ECONNRESET".into()))
        };
        Box::pin(async move { result })
    }
}

/// Tracks how many fetches are in flight at once.
#[derive(Default)]
pub struct GaugeFetcher {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    hold: Duration,
}

impl GaugeFetcher {
    pub fn new(hold: Duration) -> Self {
        Self {
            hold,
            ..Self::default()
        }
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Fetcher for GaugeFetcher {
    fn fetch<'a>(&'a self, _source: &'a Source, _endpoint: &'a Endpoint) -> FetchFuture<'a> {
        Box::pin(async move {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.hold).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(Dataset::new(vec!["X".to_string()]))
        })
    }
}
