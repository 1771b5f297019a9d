//! Client-side daily inspiration cache.
//!
//! One poem per day is kept under two store keys. Each check runs the
//! [`RolloverPolicy`]: a fresh entry is served without touching the network, a
//! stale one is refetched, and a failed refetch falls back to whatever was
//! cached before.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::domain::{PoemRequest, PoemResult, PoemVariant};
use crate::error::StoreError;
use crate::generator::{PoemSource, DAILY_LINE_COUNT};
use crate::rollover::{Freshness, RolloverPolicy};
use crate::store::KeyValueStore;
use crate::validator::validate_lines;

pub const DAILY_POEM_KEY: &str = "dailyPoem";
pub const DAILY_TIMESTAMP_KEY: &str = "dailyPoemTimestamp";

/// How often a running watcher re-evaluates the cache.
pub const RECHECK_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyCacheEntry {
    pub poem: PoemResult,
    pub fetched_at: DateTime<Utc>,
}

/// Typed view over the two daily keys of a [`KeyValueStore`].
///
/// Unreadable or unparsable values are logged and treated as absent.
pub struct DailyCache<K> {
    store: K,
}

impl<K: KeyValueStore> DailyCache<K> {
    pub fn new(store: K) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    pub async fn poem(&self) -> Option<PoemResult> {
        let raw = self.read(DAILY_POEM_KEY).await?;
        match serde_json::from_str(&raw) {
            Ok(poem) => Some(poem),
            Err(e) => {
                warn!(error = %e, "Stored daily poem is not a JSON array, ignoring it");
                None
            }
        }
    }

    pub async fn fetched_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.read(DAILY_TIMESTAMP_KEY).await?;
        match DateTime::parse_from_rfc3339(&raw) {
            Ok(timestamp) => Some(timestamp.with_timezone(&Utc)),
            Err(e) => {
                warn!(value = %raw, error = %e, "Stored daily timestamp is invalid, ignoring it");
                None
            }
        }
    }

    pub async fn entry(&self) -> Option<DailyCacheEntry> {
        Some(DailyCacheEntry {
            poem: self.poem().await?,
            fetched_at: self.fetched_at().await?,
        })
    }

    /// Overwrites both keys in place.
    pub async fn write(&self, entry: &DailyCacheEntry) -> Result<(), StoreError> {
        let poem = serde_json::to_string(&entry.poem)?;
        self.store.set(DAILY_POEM_KEY, &poem).await?;
        let fetched_at = entry.fetched_at.to_rfc3339_opts(SecondsFormat::Millis, true);
        self.store.set(DAILY_TIMESTAMP_KEY, &fetched_at).await?;
        Ok(())
    }

    async fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Failed to read daily cache");
                None
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeSource {
    /// Cache was fresh, no network call made
    Cache,
    /// A new poem was fetched and stored
    Refreshed,
    /// A new poem was fetched but could not be stored
    Unsaved,
    /// Refetch failed, previous poem served
    Fallback,
    /// Refetch failed and nothing was cached
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyOutcome {
    pub poem: PoemResult,
    pub source: OutcomeSource,
}

impl DailyOutcome {
    pub fn is_refreshed(&self) -> bool {
        self.source == OutcomeSource::Refreshed
    }
}

/// Snapshot of the cache without fetching anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyStatus {
    pub freshness: Freshness,
    pub entry: Option<DailyCacheEntry>,
    pub next_boundary: DateTime<Utc>,
}

pub struct DailyInspiration<S, K, C> {
    source: S,
    cache: DailyCache<K>,
    policy: RolloverPolicy,
    clock: C,
}

impl<S, K, C> DailyInspiration<S, K, C>
where
    S: PoemSource,
    K: KeyValueStore,
    C: Clock,
{
    pub fn new(source: S, store: K, policy: RolloverPolicy, clock: C) -> Self {
        Self {
            source,
            cache: DailyCache::new(store),
            policy,
            clock,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn cache(&self) -> &DailyCache<K> {
        &self.cache
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub async fn status(&self) -> DailyStatus {
        let now = self.clock.now();
        let poem = self.cache.poem().await;
        let fetched_at = self.cache.fetched_at().await;

        DailyStatus {
            freshness: self.policy.evaluate(now, fetched_at, poem.is_some()),
            entry: poem.zip(fetched_at).map(|(poem, fetched_at)| DailyCacheEntry { poem, fetched_at }),
            next_boundary: self.policy.next_boundary(now),
        }
    }

    /// Serves today's poem, refetching when a rollover boundary has passed.
    ///
    /// Never fails: a fetch error degrades to the cached poem, or to an empty
    /// poem when there is none.
    pub async fn check(&self) -> DailyOutcome {
        let now = self.clock.now();
        let stored = self.cache.poem().await;
        let fetched_at = self.cache.fetched_at().await;

        let reason = match self.policy.evaluate(now, fetched_at, stored.is_some()) {
            Freshness::Fresh => {
                debug!(fetched_at = ?fetched_at, "Daily poem is fresh");
                return DailyOutcome {
                    poem: stored.unwrap_or_default(),
                    source: OutcomeSource::Cache,
                };
            }
            Freshness::Stale(reason) => reason,
        };

        info!(reason = reason.as_str(), "Daily poem is stale, fetching a new one");

        let fetched = self
            .source
            .fetch_poem(PoemVariant::Daily, &PoemRequest::daily())
            .await
            .and_then(|poem| validate_lines(poem.into_lines(), DAILY_LINE_COUNT));

        match fetched {
            Ok(poem) => {
                let entry = DailyCacheEntry {
                    poem,
                    fetched_at: now,
                };
                let source = match self.cache.write(&entry).await {
                    Ok(()) => OutcomeSource::Refreshed,
                    Err(e) => {
                        warn!(error = %e, "Failed to store daily poem");
                        OutcomeSource::Unsaved
                    }
                };
                DailyOutcome {
                    poem: entry.poem,
                    source,
                }
            }
            Err(e) => {
                warn!(kind = e.kind(), error = %e, "Error fetching daily inspiration");
                match stored {
                    Some(poem) => DailyOutcome {
                        poem,
                        source: OutcomeSource::Fallback,
                    },
                    None => DailyOutcome {
                        poem: PoemResult::empty(),
                        source: OutcomeSource::Empty,
                    },
                }
            }
        }
    }

    /// Checks immediately, then every `interval`, until `shutdown` resolves.
    pub async fn watch<F, Fut>(&self, interval: Duration, shutdown: Fut, mut on_check: F)
    where
        F: FnMut(&DailyOutcome),
        Fut: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    debug!("Daily watcher stopped");
                    return;
                }
                _ = ticker.tick() => {
                    let outcome = self.check().await;
                    on_check(&outcome);
                }
            }
        }
    }
}
