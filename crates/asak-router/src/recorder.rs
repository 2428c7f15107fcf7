//! Quota tracker — per-model rolling request windows.
//!
//! Every model owns two event logs: requests in the last minute and requests in
//! the last day. A model is eligible only while both logs are below their
//! configured ceilings. Logs are compacted (expired timestamps dropped) before
//! any read or write that depends on current counts.
//!
//! Nothing is written to disk here. `get` / `replace` / `add` let callers
//! snapshot, restore, and merge usage across processes in whatever format they like;
//! [`UsageRecord`] serializes as `{"m": [..], "d": [..], "limit_m": n, "limit_d": n}`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::debug;

use asak_core::ModelSpec;

use crate::clock::Clock;
use crate::error::{Result, RouterError};

/// Width of the per-minute window.
pub const MINUTE_WINDOW_MS: i64 = 60_000;
/// Width of the per-day window.
pub const DAY_WINDOW_MS: i64 = 86_400_000;

// ─────────────────────────────────────────────
// UsageRecord
// ─────────────────────────────────────────────

/// Usage of one model: timestamps (epoch ms) inside each window plus the
/// limits they are measured against.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    #[serde(rename = "m", alias = "minute_events")]
    minute_events: Vec<i64>,
    #[serde(rename = "d", alias = "day_events")]
    day_events: Vec<i64>,
    limit_m: u32,
    limit_d: u32,
}

impl UsageRecord {
    /// An empty record for the given per-minute and per-day limits.
    pub fn new(limit_m: u32, limit_d: u32) -> Self {
        Self::with_events(Vec::new(), Vec::new(), limit_m, limit_d)
    }

    /// A record carrying existing events, e.g. usage seen by another process.
    pub fn with_events(
        minute_events: Vec<i64>,
        day_events: Vec<i64>,
        limit_m: u32,
        limit_d: u32,
    ) -> Self {
        Self {
            minute_events,
            day_events,
            limit_m,
            limit_d,
        }
    }

    pub fn minute_events(&self) -> &[i64] {
        &self.minute_events
    }

    pub fn day_events(&self) -> &[i64] {
        &self.day_events
    }

    pub fn limit_m(&self) -> u32 {
        self.limit_m
    }

    pub fn limit_d(&self) -> u32 {
        self.limit_d
    }

    /// Both windows still have room.
    pub fn is_available(&self) -> bool {
        self.minute_events.len() < self.limit_m as usize
            && self.day_events.len() < self.limit_d as usize
    }

    /// Remaining-capacity fraction, the tighter of the two windows.
    ///
    /// Can go negative when a merged snapshot pushes a window past its limit.
    pub fn availability(&self) -> f64 {
        let m = (self.limit_m as f64 - self.minute_events.len() as f64) / self.limit_m as f64;
        let d = (self.limit_d as f64 - self.day_events.len() as f64) / self.limit_d as f64;
        m.min(d)
    }

    fn compact(&mut self, now: i64) {
        self.minute_events.retain(|ts| now.saturating_sub(*ts) < MINUTE_WINDOW_MS);
        self.day_events.retain(|ts| now.saturating_sub(*ts) < DAY_WINDOW_MS);
    }

    fn push(&mut self, now: i64) {
        self.minute_events.push(now);
        self.day_events.push(now);
    }
}

/// Parse a JSON snapshot produced by [`QuotaTracker::get`].
///
/// Shape errors (not an array, `m`/`d` not arrays, missing limits) are `RecordsInvalid`.
pub fn parse_snapshot(json: &str) -> Result<Vec<UsageRecord>> {
    serde_json::from_str(json).map_err(|e| RouterError::RecordsInvalid(e.to_string()))
}

// ─────────────────────────────────────────────
// QuotaTracker
// ─────────────────────────────────────────────

/// Rolling-window usage for every configured model, index-aligned with the model list.
///
/// All state sits behind one mutex, so the selector's check-then-record
/// sequence is atomic with respect to other threads.
pub struct QuotaTracker {
    models: Vec<ModelSpec>,
    records: Mutex<Vec<UsageRecord>>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for QuotaTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuotaTracker")
            .field("models", &self.models.len())
            .finish()
    }
}

impl QuotaTracker {
    /// One empty record per model, in model order.
    pub fn new(models: Vec<ModelSpec>, clock: Arc<dyn Clock>) -> Self {
        let records = models
            .iter()
            .map(|m| UsageRecord::new(m.rate_limit.rpm, m.rate_limit.rpd))
            .collect();
        Self {
            models,
            records: Mutex::new(records),
            clock,
        }
    }

    /// Number of tracked models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<UsageRecord>> {
        // Records stay consistent even if a holder panicked: every mutation is a push or retain.
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn compact_locked(&self, records: &mut [UsageRecord]) {
        let now = self.clock.now_millis();
        for record in records.iter_mut() {
            record.compact(now);
        }
    }

    /// Drop expired events from every record.
    pub fn compact(&self) {
        let mut records = self.lock();
        self.compact_locked(&mut records);
    }

    /// Compacted copy of the full record set, in model order.
    pub fn get(&self) -> Vec<UsageRecord> {
        let mut records = self.lock();
        self.compact_locked(&mut records);
        records.clone()
    }

    /// Replace all state with `records`, then compact.
    pub fn replace(&self, records: Vec<UsageRecord>) -> Result<()> {
        self.validate(&records)?;
        let mut current = self.lock();
        *current = records;
        self.compact_locked(&mut current);
        debug!(models = current.len(), "Usage records replaced");
        Ok(())
    }

    /// Append the events of `records` onto the existing ones, then compact.
    pub fn add(&self, records: &[UsageRecord]) -> Result<()> {
        self.validate(records)?;
        let mut current = self.lock();
        for (mine, theirs) in current.iter_mut().zip(records) {
            mine.minute_events.extend_from_slice(&theirs.minute_events);
            mine.day_events.extend_from_slice(&theirs.day_events);
        }
        self.compact_locked(&mut current);
        debug!(models = current.len(), "Usage records merged");
        Ok(())
    }

    /// Whether model `index` has room in both windows right now.
    ///
    /// Unknown indices are never available.
    pub fn is_available(&self, index: usize) -> bool {
        let mut records = self.lock();
        self.compact_locked(&mut records);
        records.get(index).is_some_and(UsageRecord::is_available)
    }

    /// Headroom score of model `index` in `[0, 1]`; `0.0` for unknown indices.
    pub fn availability(&self, index: usize) -> f64 {
        let mut records = self.lock();
        self.compact_locked(&mut records);
        records.get(index).map_or(0.0, UsageRecord::availability)
    }

    /// Record one request against model `index` at the current time.
    pub fn record_use(&self, index: usize) -> Result<()> {
        let now = self.clock.now_millis();
        let mut records = self.lock();
        let len = records.len();
        let record = records.get_mut(index).ok_or_else(|| {
            RouterError::RecordsInvalid(format!("model index {index} out of range (0..{len})"))
        })?;
        record.push(now);
        self.compact_locked(&mut records);
        Ok(())
    }

    /// Caller-driven accounting for a request sent outside the selector.
    pub fn use_model(&self, index: usize) -> Result<()> {
        self.record_use(index)?;
        debug!(index, "Usage recorded by caller");
        Ok(())
    }

    /// Record one request against the first model accepted by `find`.
    ///
    /// Returns the index used, or `None` (and records nothing) when no model matches.
    pub fn use_matching<F>(&self, find: F) -> Option<usize>
    where
        F: Fn(usize, &ModelSpec) -> bool,
    {
        let index = self
            .models
            .iter()
            .enumerate()
            .position(|(i, spec)| find(i, spec))?;
        let now = self.clock.now_millis();
        let mut records = self.lock();
        records.get_mut(index)?.push(now);
        self.compact_locked(&mut records);
        Some(index)
    }

    /// Run `pick` on freshly compacted state and record a use of the index it returns,
    /// all under one lock acquisition.
    pub(crate) fn reserve<F>(&self, pick: F) -> Result<usize>
    where
        F: FnOnce(&[UsageRecord], &[ModelSpec]) -> Result<usize>,
    {
        let mut records = self.lock();
        self.compact_locked(&mut records);
        let index = pick(&records, &self.models)?;
        let now = self.clock.now_millis();
        let record = records.get_mut(index).ok_or_else(|| {
            RouterError::RecordsInvalid(format!("selected index {index} out of range"))
        })?;
        record.push(now);
        Ok(index)
    }

    fn validate(&self, records: &[UsageRecord]) -> Result<()> {
        if records.len() != self.models.len() {
            return Err(RouterError::RecordsInvalid(format!(
                "expected {} records, got {}",
                self.models.len(),
                records.len()
            )));
        }
        for (i, (record, spec)) in records.iter().zip(&self.models).enumerate() {
            if record.limit_m != spec.rate_limit.rpm || record.limit_d != spec.rate_limit.rpd {
                return Err(RouterError::RecordsInvalid(format!(
                    "record #{i} limits ({}/{}) do not match model '{}' rate_limit ({}/{})",
                    record.limit_m,
                    record.limit_d,
                    spec.model,
                    spec.rate_limit.rpm,
                    spec.rate_limit.rpd
                )));
            }
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
