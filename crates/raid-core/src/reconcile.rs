//! Channel reconciliation - target names, positions, and expiry for the
//! channels of an event category.
//!
//! Everything here is pure: callers gather the category's children with their
//! records, ask for a plan, and apply it through the platform.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::entities::{ChannelRef, EventRecord};
use crate::value_objects::Snowflake;

/// Name prefix of an event happening today
pub const TODAY_MARKER: &str = "⭐";
/// Name prefix of an event that already happened
pub const PAST_MARKER: &str = "❌";

/// A channel of the category, paired with its record when it has one
#[derive(Debug, Clone)]
pub struct Sibling {
    pub channel: ChannelRef,
    pub record: Option<EventRecord>,
}

impl Sibling {
    pub fn new(channel: ChannelRef, record: Option<EventRecord>) -> Self {
        Self { channel, record }
    }

    fn date(&self) -> Option<DateTime<FixedOffset>> {
        self.record.as_ref().map(|r| r.date)
    }

    fn is_expired(&self, now: DateTime<Utc>, expiry: Duration) -> bool {
        self.record
            .as_ref()
            .is_some_and(|r| r.is_expired(now, expiry))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMove {
    pub channel_id: Snowflake,
    pub from: i32,
    pub to: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRename {
    pub channel_id: Snowflake,
    pub from: String,
    pub to: String,
}

/// Changes that bring a category in line with its records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Channels whose event expired; delete channel and record
    pub expired: Vec<Snowflake>,
    pub renames: Vec<ChannelRename>,
    pub moves: Vec<ChannelMove>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.expired.is_empty() && self.renames.is_empty() && self.moves.is_empty()
    }
}

/// Where a new event channel goes and which siblings make room for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertionPlan {
    pub slot: i32,
    pub moves: Vec<ChannelMove>,
}

/// Inputs shared by every reconciliation
#[derive(Debug, Clone, Copy)]
pub struct ReconcileContext {
    /// Position right after the category
    pub anchor: i32,
    pub now: DateTime<Utc>,
    pub tz: Tz,
    pub expiry: Duration,
}

impl ReconcileContext {
    fn today(&self) -> NaiveDate {
        self.now.with_timezone(&self.tz).date_naive()
    }
}

/// Anchor for a category: one past its position, or 1 when the category is gone
pub fn anchor_for(category: Option<&ChannelRef>) -> i32 {
    category.map_or(0, |c| c.position) + 1
}

/// Channel name for an event: `{marker}{Mon-dd}-{name-with-hyphens}`
pub fn channel_name(record: &EventRecord, today: NaiveDate, tz: Tz) -> String {
    let local_date = record.date.with_timezone(&tz).date_naive();
    let marker = if local_date == today {
        TODAY_MARKER
    } else if local_date < today {
        PAST_MARKER
    } else {
        ""
    };
    format!(
        "{marker}{}-{}",
        local_date.format("%b-%d"),
        record.name.replace(' ', "-")
    )
}

/// Sort by (date, position) with dateless channels first. Stable.
fn sort_siblings(siblings: &mut [Sibling]) {
    siblings.sort_by_key(|s| (s.date(), s.channel.position));
}

fn moves_from(anchor: i32, ordered: &[Sibling]) -> Vec<ChannelMove> {
    ordered
        .iter()
        .zip(anchor..)
        .filter(|(s, target)| s.channel.position != *target)
        .map(|(s, target)| ChannelMove {
            channel_id: s.channel.id,
            from: s.channel.position,
            to: target,
        })
        .collect()
}

/// Full sweep: expire, rename, and reorder a category's children
pub fn plan(siblings: Vec<Sibling>, ctx: &ReconcileContext) -> ReconcilePlan {
    let (expired, mut live): (Vec<_>, Vec<_>) = siblings
        .into_iter()
        .partition(|s| s.is_expired(ctx.now, ctx.expiry));

    let today = ctx.today();
    let renames = live
        .iter()
        .filter_map(|s| {
            let record = s.record.as_ref()?;
            let target = channel_name(record, today, ctx.tz);
            (target != s.channel.name).then(|| ChannelRename {
                channel_id: s.channel.id,
                from: s.channel.name.clone(),
                to: target,
            })
        })
        .collect();

    sort_siblings(&mut live);

    ReconcilePlan {
        expired: expired.into_iter().map(|s| s.channel.id).collect(),
        renames,
        moves: moves_from(ctx.anchor, &live),
    }
}

/// Reordering only, without expiry or renames
pub fn plan_order(mut siblings: Vec<Sibling>, anchor: i32) -> Vec<ChannelMove> {
    sort_siblings(&mut siblings);
    moves_from(anchor, &siblings)
}

/// Slot for a new event starting at `date`.
///
/// The first sibling dated at or after `date` gives up its slot and it and
/// everything after it shift down by one. Expired siblings are ignored.
pub fn plan_insertion(
    siblings: Vec<Sibling>,
    date: DateTime<FixedOffset>,
    ctx: &ReconcileContext,
) -> InsertionPlan {
    let mut live: Vec<Sibling> = siblings
        .into_iter()
        .filter(|s| !s.is_expired(ctx.now, ctx.expiry))
        .collect();
    sort_siblings(&mut live);

    let mut index = ctx.anchor;
    let mut slot = None;
    let mut moves = Vec::new();

    for sibling in &live {
        if slot.is_none() && sibling.date().is_some_and(|d| d >= date) {
            slot = Some(index);
            index += 1;
        }
        if sibling.channel.position != index {
            moves.push(ChannelMove {
                channel_id: sibling.channel.id,
                from: sibling.channel.position,
                to: index,
            });
        }
        index += 1;
    }

    InsertionPlan {
        slot: slot.unwrap_or(index),
        moves,
    }
}
