//! `fanfetch run` – fetch every source and print the summary.

use anyhow::{bail, Result};
use fanfetch_core::config::FanfetchConfig;
use fanfetch_core::summary::{presence_matrix, sources_listing};
use fanfetch_core::{run_all, FatalRun, Fetcher, HttpFetcher, RunReport, RunResult, Source};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub async fn run_fetch(
    cfg: &FanfetchConfig,
    checks: &[String],
    only: &[String],
    json: bool,
) -> Result<()> {
    let plan = cfg.plan()?;
    let sources = select_sources(plan.sources, only)?;
    if sources.is_empty() {
        println!("No sources configured.");
        return Ok(());
    }
    tracing::debug!(only = ?only, checks = ?checks, "run selection");

    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(plan.http));
    let started = Instant::now();
    let outcome = run_all(sources, Arc::new(plan.pool), fetcher, plan.options).await;
    let elapsed = started.elapsed();

    match outcome {
        Ok(report) => {
            print!("{}", render(&report, checks, json, elapsed)?);
            Ok(())
        }
        Err(fatal) => {
            // Everything else already finished; show it before failing.
            let FatalRun {
                source_id,
                error,
                report,
            } = fatal;
            print!("{}", render(&report, checks, json, elapsed)?);
            Err(anyhow::Error::new(error).context(format!("source {} aborted", source_id)))
        }
    }
}

/// Keep only the sources named in `only` (all of them when empty).
pub(crate) fn select_sources(sources: Vec<Source>, only: &[String]) -> Result<Vec<Source>> {
    if only.is_empty() {
        return Ok(sources);
    }
    for id in only {
        if !sources.iter().any(|s| s.id().as_str() == id) {
            bail!("unknown source {:?}", id);
        }
    }
    Ok(sources
        .into_iter()
        .filter(|s| only.iter().any(|id| id == s.id().as_str()))
        .collect())
}

fn render(report: &RunReport, checks: &[String], json: bool, elapsed: Duration) -> Result<String> {
    if json {
        Ok(render_json(report, checks)? + "\n")
    } else {
        Ok(render_table(report, checks, elapsed))
    }
}

pub(crate) fn render_table(report: &RunReport, checks: &[String], elapsed: Duration) -> String {
    let rows = presence_matrix(report, checks);
    let width = rows
        .iter()
        .map(|r| r.source.len())
        .max()
        .unwrap_or(0)
        .max("SOURCE".len());

    let mut out = format!("{:<width$} {:<10} {:>6} {:>8}", "SOURCE", "STATE", "IDS", "ATTEMPTS");
    for code in checks {
        out.push_str(&format!(" {:>5}", code));
    }
    out.push('\n');

    for (row, r) in rows.iter().zip(report.iter()) {
        out.push_str(&format!(
            "{:<width$} {:<10} {:>6} {:>8}",
            row.source,
            row.state,
            row.identifiers,
            r.attempts.len()
        ));
        for present in &row.present {
            out.push_str(&format!(" {:>5}", if *present { "yes" } else { "-" }));
        }
        out.push('\n');
    }

    for code in checks {
        let listed = sources_listing(report, code);
        let names = if listed.is_empty() {
            "(none)".to_string()
        } else {
            listed.join(", ")
        };
        out.push_str(&format!("{}: {}\n", code, names));
    }

    for r in report.iter() {
        if let RunResult::Aborted { category, message } = &r.result {
            out.push_str(&format!("aborted {}: [{}] {}\n", r.id(), category.label(), message));
        }
    }

    let counts = report.counts();
    out.push_str(&format!(
        "{} loaded, {} exhausted, {} aborted in {:.1}s\n",
        counts.loaded,
        counts.exhausted,
        counts.aborted,
        elapsed.as_secs_f64()
    ));
    out
}

pub(crate) fn render_json(report: &RunReport, checks: &[String]) -> Result<String> {
    let rows = presence_matrix(report, checks);
    let sources: Vec<serde_json::Value> = rows
        .iter()
        .zip(report.iter())
        .map(|(row, r)| {
            let present: serde_json::Map<String, serde_json::Value> = checks
                .iter()
                .cloned()
                .zip(row.present.iter().map(|p| serde_json::Value::Bool(*p)))
                .collect();
            serde_json::json!({
                "source": row.source,
                "result": r.result,
                "attempts": r.attempts,
                "present": present,
            })
        })
        .collect();
    let counts = report.counts();
    let doc = serde_json::json!({
        "sources": sources,
        "loaded": counts.loaded,
        "exhausted": counts.exhausted,
        "aborted": counts.aborted,
    });
    Ok(serde_json::to_string_pretty(&doc)?)
}
