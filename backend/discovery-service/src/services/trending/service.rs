/// Trending Service
///
/// Runs one aggregation pass: recent public projects, summed play counters,
/// trend score, top-N.
use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::algorithm::{normalize_item, rank_items, score_items};
use crate::config::DiscoveryConfig;
use crate::db::CatalogSource;
use crate::error::Result;
use crate::metrics::discovery as metrics;
use crate::models::{ContentItem, RankedItem};
use crate::utils::run_with_timeout;

pub struct TrendingService {
    source: Arc<dyn CatalogSource>,
    config: DiscoveryConfig,
    timeout: Duration,
}

impl TrendingService {
    pub fn new(source: Arc<dyn CatalogSource>, config: DiscoveryConfig, timeout: Duration) -> Self {
        Self {
            source,
            config,
            timeout,
        }
    }

    /// Compute the trending list as of now
    pub async fn get_trending(&self) -> Result<Vec<RankedItem>> {
        self.get_trending_at(Utc::now()).await
    }

    /// Compute the trending list as of `now`.
    ///
    /// A failed project fetch is returned as an error. A failed counter
    /// fetch is logged and every play count is treated as zero.
    pub async fn get_trending_at(&self, now: DateTime<Utc>) -> Result<Vec<RankedItem>> {
        let started = Instant::now();

        let records = run_with_timeout(
            self.timeout,
            self.source.list_public_items(self.config.fetch_window),
        )
        .await?;

        let items: Vec<ContentItem> = records
            .into_iter()
            .filter(|record| record.is_public)
            .map(normalize_item)
            .collect();

        if items.is_empty() {
            debug!("No public projects found for trending");
            metrics::record_aggregation_duration(started.elapsed());
            return Ok(Vec::new());
        }

        let track_ids: HashSet<String> = items
            .iter()
            .flat_map(|item| item.tracks.iter().map(|track| track.id.clone()))
            .collect();

        let counts = self.fetch_counts(&track_ids).await;

        let jitter_max = self.config.views_jitter_max;
        let scored = {
            let mut rng = rand::thread_rng();
            score_items(items, &counts, now, || {
                if jitter_max == 0 {
                    0
                } else {
                    rng.gen_range(0..jitter_max)
                }
            })
        };
        let candidates = scored.len();
        let ranked = rank_items(scored, self.config.top_n);

        metrics::record_aggregation_duration(started.elapsed());
        info!(
            candidates,
            tracks = track_ids.len(),
            returned = ranked.len(),
            "Trending aggregation completed in {:?}",
            started.elapsed()
        );

        Ok(ranked)
    }

    async fn fetch_counts(&self, track_ids: &HashSet<String>) -> HashMap<String, u64> {
        if track_ids.is_empty() {
            return HashMap::new();
        }

        match run_with_timeout(self.timeout, self.source.sum_engagement_counters(track_ids)).await
        {
            Ok(counts) => counts,
            Err(e) => {
                warn!(
                    "Play counter lookup failed for {} tracks, scoring with zero plays: {}",
                    track_ids.len(),
                    e
                );
                metrics::record_counter_fallback();
                HashMap::new()
            }
        }
    }
}
