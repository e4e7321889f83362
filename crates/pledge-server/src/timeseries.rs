//! Daily time-series bucketing for the admin dashboard.
//!
//! [`bucketize`] is pure: given a lookback window and a list of timestamped
//! events it emits exactly one bucket per calendar day (UTC), zero-filled,
//! in ascending date order.  [`timeseries`] wires it to the store.

use std::collections::BTreeMap;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Serialize;

use pledge_store::{Database, StoreError};

use pledge_shared::InteractionKind;

/// Lookback window bounds, in days.
pub const MIN_DAYS: u32 = 1;
pub const MAX_DAYS: u32 = 365;

/// The event subtypes counted per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Like,
    Dislike,
    Share,
    Comment,
    Pledge,
}

impl From<InteractionKind> for EventKind {
    fn from(kind: InteractionKind) -> Self {
        match kind {
            InteractionKind::Like => EventKind::Like,
            InteractionKind::Dislike => EventKind::Dislike,
            InteractionKind::Share => EventKind::Share,
        }
    }
}

/// One calendar day's counts.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DayBucket {
    /// ISO date, `YYYY-MM-DD`.
    pub date: String,
    pub likes: u64,
    pub dislikes: u64,
    pub shares: u64,
    pub comments: u64,
    pub pledges: u64,
}

impl DayBucket {
    fn zero(date: NaiveDate) -> Self {
        Self {
            date: date.format("%Y-%m-%d").to_string(),
            likes: 0,
            dislikes: 0,
            shares: 0,
            comments: 0,
            pledges: 0,
        }
    }

    fn bump(&mut self, kind: EventKind) {
        match kind {
            EventKind::Like => self.likes += 1,
            EventKind::Dislike => self.dislikes += 1,
            EventKind::Share => self.shares += 1,
            EventKind::Comment => self.comments += 1,
            EventKind::Pledge => self.pledges += 1,
        }
    }

    /// Total events in this bucket, all subtypes.
    pub fn total(&self) -> u64 {
        self.likes + self.dislikes + self.shares + self.comments + self.pledges
    }
}

/// UTC midnight of the first day in a window ending at `now`.
pub fn window_start(days: u32, now: DateTime<Utc>) -> DateTime<Utc> {
    let days = days.clamp(MIN_DAYS, MAX_DAYS);
    let first_day = now
        .date_naive()
        .checked_sub_days(Days::new(u64::from(days) - 1))
        .unwrap_or(now.date_naive());
    first_day
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc()
}

/// Bucket events into one zero-filled entry per calendar day.
///
/// `days` is clamped to `[1, 365]`.  Events whose UTC date falls outside
/// the window (clock skew, stale rows) are silently dropped.  A zero-event
/// input still yields a full run of zero buckets ending at today.
pub fn bucketize(
    days: u32,
    now: DateTime<Utc>,
    events: impl IntoIterator<Item = (DateTime<Utc>, EventKind)>,
) -> Vec<DayBucket> {
    let days = days.clamp(MIN_DAYS, MAX_DAYS);
    let today = now.date_naive();

    // Pre-populate the whole window so gaps come out as zeros.
    let mut buckets: BTreeMap<NaiveDate, DayBucket> = BTreeMap::new();
    for offset in (0..days).rev() {
        if let Some(date) = today.checked_sub_days(Days::new(u64::from(offset))) {
            buckets.insert(date, DayBucket::zero(date));
        }
    }

    for (timestamp, kind) in events {
        if let Some(bucket) = buckets.get_mut(&timestamp.date_naive()) {
            bucket.bump(kind);
        }
        // Out-of-window events are dropped, never mis-binned.
    }

    buckets.into_values().collect()
}

/// Fetch the event streams for a scope and bucket them.
///
/// `campaign_id: None` means global.  A scoped campaign with no published
/// solutions produces zero interaction/comment counts; its pledges are
/// still counted (pledges attach to campaigns, not solutions).
pub fn timeseries(
    db: &Database,
    campaign_id: Option<&str>,
    days: u32,
    now: DateTime<Utc>,
) -> Result<Vec<DayBucket>, StoreError> {
    let days = days.clamp(MIN_DAYS, MAX_DAYS);
    // Store cursors are exclusive (`created_at > since`); back off one
    // nanosecond so an event exactly at the window's midnight is kept.
    let since = window_start(days, now) - chrono::Duration::nanoseconds(1);

    let solution_ids = campaign_id
        .map(|campaign| db.published_solution_ids(Some(campaign)))
        .transpose()?;
    let scope = solution_ids.as_deref();

    let mut events: Vec<(DateTime<Utc>, EventKind)> = Vec::new();

    for interaction in db.active_interactions(scope, Some(since), None)? {
        events.push((interaction.created_at, interaction.kind.into()));
    }
    for comment in db.active_comments(scope, Some(since), None)? {
        events.push((comment.created_at, EventKind::Comment));
    }
    for pledge in db.active_pledges(campaign_id, Some(since), None)? {
        events.push((pledge.created_at, EventKind::Pledge));
    }

    Ok(bucketize(days, now, events))
}
