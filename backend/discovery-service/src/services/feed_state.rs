//! Feed state
//!
//! `FeedController` is the single owner of the latest trending list.
//! Every refresh takes a generation number; a result is stored only while
//! its generation is still the newest, so a slow superseded run can never
//! overwrite a fresher one. Changes are broadcast to subscribers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, error, info};

use super::trending::TrendingService;
use crate::metrics::discovery as metrics;
use crate::models::RankedItem;

/// Message shown to clients when the catalog could not be read
pub const FAILED_TO_LOAD: &str = "failed to load";

const EVENT_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FeedState {
    /// Nothing loaded yet, or invalidated
    Idle,
    Loading,
    Loaded { items: Vec<RankedItem> },
    /// Catalog answered but had no public projects
    Empty,
    Failed { error: String },
}

impl FeedState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Loaded { .. } => "loaded",
            Self::Empty => "empty",
            Self::Failed { .. } => "failed",
        }
    }

    pub fn items(&self) -> &[RankedItem] {
        match self {
            Self::Loaded { items } => items,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedSnapshot {
    pub generation: u64,
    pub state: FeedState,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Notification sent to subscribers whenever the stored state changes
pub type FeedEvent = FeedSnapshot;

pub struct FeedController {
    service: TrendingService,
    generation: AtomicU64,
    current: RwLock<FeedSnapshot>,
    events: broadcast::Sender<FeedEvent>,
}

impl FeedController {
    pub fn new(service: TrendingService) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            service,
            generation: AtomicU64::new(0),
            current: RwLock::new(FeedSnapshot {
                generation: 0,
                state: FeedState::Idle,
                updated_at: None,
            }),
            events,
        }
    }

    pub async fn snapshot(&self) -> FeedSnapshot {
        self.current.read().await.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.events.subscribe()
    }

    /// Load the list if nothing is stored yet.
    ///
    /// Only the first caller to find the controller idle starts a pass;
    /// callers arriving while that pass runs wait for its result.
    pub async fn ensure_loaded(&self) -> FeedSnapshot {
        let mut events = self.subscribe();

        let claimed = {
            let mut current = self.current.write().await;
            match current.state {
                FeedState::Idle => {
                    let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
                    self.apply(&mut current, generation, FeedState::Loading);
                    Some(generation)
                }
                FeedState::Loading => None,
                _ => return current.clone(),
            }
        };

        match claimed {
            Some(generation) => self.run(generation).await,
            None => self.wait_until_settled(&mut events).await,
        }
    }

    /// Run a new aggregation pass and return the state stored afterwards.
    pub async fn refresh(&self) -> FeedSnapshot {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.store(generation, FeedState::Loading).await;
        self.run(generation).await
    }

    /// Cancel in-flight refreshes and recompute the list.
    ///
    /// Called after catalog writes; subscribers see `Loading` and then the
    /// recomputed state.
    pub async fn invalidate(&self) -> FeedSnapshot {
        info!("Trending list invalidated");
        self.refresh().await
    }

    async fn run(&self, generation: u64) -> FeedSnapshot {
        let started = Instant::now();
        debug!(generation, "Trending refresh started");

        let state = match self.service.get_trending().await {
            Ok(items) if items.is_empty() => FeedState::Empty,
            Ok(items) => FeedState::Loaded { items },
            Err(e) => {
                error!(generation, "Trending aggregation failed: {}", e);
                FeedState::Failed {
                    error: FAILED_TO_LOAD.to_string(),
                }
            }
        };

        metrics::record_aggregation_run(state.as_str());
        info!(
            generation,
            status = state.as_str(),
            items = state.items().len(),
            "Trending refresh finished in {:?}",
            started.elapsed()
        );

        self.store(generation, state).await
    }

    async fn wait_until_settled(
        &self,
        events: &mut broadcast::Receiver<FeedEvent>,
    ) -> FeedSnapshot {
        loop {
            match events.recv().await {
                Ok(event) if event.state != FeedState::Loading => return event,
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {
                    let current = self.snapshot().await;
                    if current.state != FeedState::Loading {
                        return current;
                    }
                }
                Err(broadcast::error::RecvError::Closed) => return self.snapshot().await,
            }
        }
    }

    /// Store `state` unless a newer generation has started.
    async fn store(&self, generation: u64, state: FeedState) -> FeedSnapshot {
        let mut current = self.current.write().await;

        if generation != self.generation.load(Ordering::SeqCst) || generation < current.generation
        {
            debug!(
                generation,
                latest = current.generation,
                "Discarding stale trending result"
            );
            if !matches!(state, FeedState::Loading) {
                metrics::record_stale_result();
            }
            return current.clone();
        }

        self.apply(&mut current, generation, state);
        current.clone()
    }

    fn apply(&self, current: &mut FeedSnapshot, generation: u64, state: FeedState) {
        if let FeedState::Loaded { items } = &state {
            metrics::set_ranked_items(items.len());
        } else if matches!(state, FeedState::Empty) {
            metrics::set_ranked_items(0);
        }

        *current = FeedSnapshot {
            generation,
            state,
            updated_at: Some(Utc::now()),
        };

        // No subscribers is fine
        let _ = self.events.send(current.clone());
    }
}
