//! Core of Poem Studio
//!
//! Turns a word or phrase into a short generated poem and keeps one
//! "daily inspiration" poem per day.
//!
//! # Architecture
//!
//! - **Validator**: splits completion text into lines and enforces the line count
//! - **Generator**: builds prompts and calls a [`CompletionBackend`]
//! - **Rollover policy**: decides when the cached daily poem goes stale
//! - **Daily cache**: serves, refreshes and falls back over a [`KeyValueStore`]

pub mod clock;
pub mod daily;
pub mod domain;
pub mod error;
pub mod generator;
pub mod prompts;
pub mod rollover;
pub mod store;
pub mod validator;

pub use clock::{Clock, FixedClock, SystemClock};
pub use daily::{
    DailyCache, DailyCacheEntry, DailyInspiration, DailyOutcome, DailyStatus, OutcomeSource,
    RECHECK_INTERVAL,
};
pub use domain::{PoemRequest, PoemResult, PoemVariant, DAILY_SENTINEL_INPUT};
pub use error::{GenerationError, PoemError, StoreError};
pub use generator::{CompletionBackend, CompletionRequest, GeneratorConfig, PoemGenerator, PoemSource};
pub use rollover::{
    Freshness, ObserverDstHeuristic, RolloverPolicy, RolloverWindow, StaleReason,
    ZoneDatabaseRule, ZoneOffsetRule,
};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
pub use validator::{split_lines, validate_lines, validate_poem};
