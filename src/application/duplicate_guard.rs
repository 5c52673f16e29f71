use crate::domain::payment::{Amount, PaymentRequest};
use crate::domain::ports::ClockRef;
use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

/// Default length of the duplicate window.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60 * 60);

/// Registrations between two opportunistic sweeps of expired fingerprints.
const SWEEP_EVERY: u64 = 1024;

/// Digest of card number, expiry, currency and two-decimal amount.
///
/// Only the digest is kept, never the card number itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn of(request: &PaymentRequest, amount: &Amount) -> Self {
        let mut hasher = Sha256::new();
        for part in [
            request.card_number.as_str(),
            request.expiry_month.as_str(),
            request.expiry_year.as_str(),
            request.currency.as_str(),
            amount.canonical().as_str(),
        ] {
            hasher.update(part.as_bytes());
            hasher.update([0x1f]);
        }
        Self(hasher.finalize().into())
    }
}

/// Rejects replays of the same payment within a sliding window.
///
/// Lookup and registration of a fingerprint happen under the same shard
/// lock, so of two racing callers with the same key exactly one proceeds.
/// Callers with different keys only contend when they hash to the same shard.
pub struct DuplicateGuard {
    seen: DashMap<Fingerprint, DateTime<Utc>>,
    window: TimeDelta,
    clock: ClockRef,
    registrations: AtomicU64,
}

impl DuplicateGuard {
    pub fn new(window: Duration, clock: ClockRef) -> Self {
        Self {
            seen: DashMap::new(),
            window: TimeDelta::from_std(window).unwrap_or(TimeDelta::MAX),
            clock,
            registrations: AtomicU64::new(0),
        }
    }

    /// Returns `true` when `request` repeats one seen within the window.
    /// Otherwise records it as seen now and returns `false`.
    pub fn check_and_register(&self, request: &PaymentRequest, amount: &Amount) -> bool {
        let fingerprint = Fingerprint::of(request, amount);
        let now = self.clock.now();

        let duplicate = match self.seen.entry(fingerprint) {
            Entry::Occupied(mut seen) => {
                if self.is_live(*seen.get(), now) {
                    true
                } else {
                    seen.insert(now);
                    false
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(now);
                false
            }
        };

        // The entry guard is released above; sweeping while holding it would deadlock.
        if !duplicate {
            let registered = self.registrations.fetch_add(1, Ordering::Relaxed) + 1;
            if registered.is_multiple_of(SWEEP_EVERY) {
                self.evict_expired();
            }
        }
        duplicate
    }

    /// Drops every fingerprint whose window has passed.
    pub fn evict_expired(&self) {
        let now = self.clock.now();
        let before = self.seen.len();
        self.seen.retain(|_, first_seen| self.is_live(*first_seen, now));
        debug!(evicted = before.saturating_sub(self.seen.len()), "swept duplicate guard");
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    fn is_live(&self, first_seen: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(first_seen) < self.window
    }
}
