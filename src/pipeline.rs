// src/pipeline.rs - Orchestrates adapters, normalization and dedup
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::config::ScrapingConfig;
use crate::dedupe::dedupe;
use crate::error::Result;
use crate::models::{
    Lead, LeadCollection, LeadKind, RunSummary, SourceBatch, SourceOutcome, SourceReport,
};
use crate::normalizer::normalize;
use crate::sources::SourceAdapter;

#[derive(Debug, Clone)]
pub struct LeadQuery {
    pub industry: String,
    pub location: String,
    pub kind: LeadKind,
    pub target_count: usize,
}

pub struct Pipeline {
    parallel: bool,
    max_retries: u32,
    retry_delay: Duration,
    max_parallel_sources: usize,
}

impl Pipeline {
    pub fn new(scraping: &ScrapingConfig, parallel: bool, retry_delay: Duration) -> Self {
        Self {
            parallel,
            max_retries: scraping.max_retries,
            retry_delay,
            max_parallel_sources: scraping.max_parallel_sources.max(1),
        }
    }

    /// Run every adapter, normalize as records arrive, then dedupe and trim.
    /// Adapter failures are never fatal; they end up flagged in the summary
    /// with an empty contribution. Each adapter receives the full target
    /// count and the final collection is trimmed after dedup.
    pub async fn collect(
        &self,
        query: &LeadQuery,
        adapters: &[Arc<dyn SourceAdapter>],
    ) -> (LeadCollection, RunSummary) {
        let started = Instant::now();

        let batches = if self.parallel {
            self.run_parallel(query, adapters).await
        } else {
            self.run_sequential(query, adapters).await
        };

        let mut reports = Vec::with_capacity(batches.len());
        let mut by_source = Vec::with_capacity(batches.len());
        let mut accumulated: Vec<Lead> = Vec::new();

        // Grouping key is the adapter identity; batches already come back in
        // registry order regardless of completion order.
        for (source_id, outcome, leads) in batches {
            accumulated.extend(leads.iter().cloned());
            by_source.push(SourceBatch {
                source_id: source_id.clone(),
                leads,
            });
            reports.push(SourceReport { source_id, outcome });
        }

        let total_collected = accumulated.len();
        let mut all = dedupe(accumulated);
        let total_after_dedup = all.len();
        if all.len() > query.target_count {
            all.truncate(query.target_count);
        }

        info!(
            "Collected {} leads ({} after dedup, {} exported) for {} in {}",
            total_collected,
            total_after_dedup,
            all.len(),
            query.industry,
            query.location
        );

        let summary = RunSummary {
            industry: query.industry.clone(),
            location: query.location.clone(),
            kind: query.kind,
            sources: reports,
            total_collected,
            total_after_dedup,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };

        (LeadCollection { by_source, all }, summary)
    }

    async fn run_sequential(
        &self,
        query: &LeadQuery,
        adapters: &[Arc<dyn SourceAdapter>],
    ) -> Vec<(String, SourceOutcome, Vec<Lead>)> {
        let mut batches = Vec::with_capacity(adapters.len());
        let mut collected = 0usize;

        for adapter in adapters {
            if collected >= query.target_count {
                info!("Target count reached, skipping {}", adapter.id());
                batches.push((adapter.id().to_string(), SourceOutcome::Skipped, Vec::new()));
                continue;
            }

            let (outcome, leads) = self.run_adapter(query, adapter.as_ref()).await;
            collected += leads.len();
            batches.push((adapter.id().to_string(), outcome, leads));
        }

        batches
    }

    async fn run_parallel(
        &self,
        query: &LeadQuery,
        adapters: &[Arc<dyn SourceAdapter>],
    ) -> Vec<(String, SourceOutcome, Vec<Lead>)> {
        let semaphore = Arc::new(Semaphore::new(self.max_parallel_sources));
        let counter = Arc::new(AtomicUsize::new(0));
        let mut set: JoinSet<(usize, String, SourceOutcome, Vec<Lead>)> = JoinSet::new();

        for (index, adapter) in adapters.iter().enumerate() {
            let adapter = adapter.clone();
            let query = query.clone();
            let semaphore = semaphore.clone();
            let counter = counter.clone();
            let max_retries = self.max_retries;
            let retry_delay = self.retry_delay;

            set.spawn(async move {
                // Permit acquisition bounds the worker pool; acquire cannot
                // fail while the semaphore is alive.
                let _permit = semaphore.acquire().await.expect("semaphore closed");

                if counter.load(Ordering::SeqCst) >= query.target_count {
                    info!("Target count reached, skipping {}", adapter.id());
                    return (index, adapter.id().to_string(), SourceOutcome::Skipped, Vec::new());
                }

                let (outcome, leads) =
                    run_adapter_once(&query, adapter.as_ref(), max_retries, retry_delay).await;
                counter.fetch_add(leads.len(), Ordering::SeqCst);
                (index, adapter.id().to_string(), outcome, leads)
            });
        }

        let mut indexed = Vec::with_capacity(adapters.len());
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(entry) => indexed.push(entry),
                Err(e) => warn!("Adapter task panicked: {}", e),
            }
        }

        // Restore registry order so grouping never depends on completion order
        indexed.sort_by_key(|(index, _, _, _)| *index);
        indexed
            .into_iter()
            .map(|(_, id, outcome, leads)| (id, outcome, leads))
            .collect()
    }

    async fn run_adapter(
        &self,
        query: &LeadQuery,
        adapter: &dyn SourceAdapter,
    ) -> (SourceOutcome, Vec<Lead>) {
        run_adapter_once(query, adapter, self.max_retries, self.retry_delay).await
    }
}

/// One adapter invocation: fetch with bounded retries, normalize record by
/// record. A bad record is logged and dropped; it never sinks the adapter's
/// whole contribution.
async fn run_adapter_once(
    query: &LeadQuery,
    adapter: &dyn SourceAdapter,
    max_retries: u32,
    retry_delay: Duration,
) -> (SourceOutcome, Vec<Lead>) {
    let raw = match fetch_with_retry(query, adapter, max_retries, retry_delay).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("{}: giving up after {} retries: {}", adapter.id(), max_retries, e);
            return (SourceOutcome::Failed(e.to_string()), Vec::new());
        }
    };

    let mut leads = Vec::with_capacity(raw.len());
    for raw_record in &raw {
        match normalize(raw_record, adapter.id(), query.kind) {
            Ok(lead) => leads.push(lead),
            Err(e) => warn!("{}: dropping record: {}", adapter.id(), e),
        }
    }

    info!("{}: {} raw records, {} normalized", adapter.id(), raw.len(), leads.len());
    (SourceOutcome::Collected(leads.len()), leads)
}

async fn fetch_with_retry(
    query: &LeadQuery,
    adapter: &dyn SourceAdapter,
    max_retries: u32,
    retry_delay: Duration,
) -> Result<Vec<crate::models::RawRecord>> {
    let mut attempt = 0u32;
    loop {
        match adapter
            .fetch(&query.industry, &query.location, query.target_count)
            .await
        {
            Ok(raw) => return Ok(raw),
            Err(e) if attempt < max_retries => {
                attempt += 1;
                let backoff = retry_delay * attempt;
                warn!(
                    "{}: attempt {}/{} failed ({}), retrying in {:?}",
                    adapter.id(),
                    attempt,
                    max_retries,
                    e,
                    backoff
                );
                tokio::time::sleep(backoff).await;
            }
            Err(e) => return Err(e),
        }
    }
}
