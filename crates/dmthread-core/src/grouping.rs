//! Visual grouping of consecutive same-sender messages: adjacency flags
//! computed over the filtered, sorted sequence.

use chrono::{Datelike, Local, NaiveDate, TimeZone};

use crate::model::{CanonicalMessage, GroupFlags};

/// Two messages merge only when closer than this, in milliseconds.
pub const GROUP_WINDOW_MS: i64 = 30 * 60 * 1000;

/// Local calendar date for a millisecond timestamp. `None` for timestamps
/// outside chrono's representable range.
#[must_use]
pub fn local_date(ts: i64) -> Option<NaiveDate> {
    Local
        .timestamp_millis_opt(ts)
        .single()
        .map(|dt| dt.date_naive())
}

/// Whether two timestamps fall on the same local calendar day. Timestamps
/// without a representable local date never match.
#[must_use]
pub fn same_local_day(a: i64, b: i64) -> bool {
    match (local_date(a), local_date(b)) {
        (Some(da), Some(db)) => da == db,
        _ => false,
    }
}

/// Day-separator label, localized "Y년 M월 D일" from local date components.
#[must_use]
pub fn day_label(date: NaiveDate) -> String {
    format!("{}년 {}월 {}일", date.year(), date.month(), date.day())
}

fn merges(cur: &CanonicalMessage, other: &CanonicalMessage) -> bool {
    // abs_diff keeps extreme feed timestamps from overflowing the gap.
    other.sender == cur.sender
        && cur.ts.abs_diff(other.ts) < GROUP_WINDOW_MS as u64
        && same_local_day(cur.ts, other.ts)
}

/// Adjacency flags for the message at `idx`. Neighbors are the immediate
/// entries of the post-filter, post-sort sequence, so a removed noise
/// message never breaks the merge between its former neighbors.
#[must_use]
pub fn group_flags(msgs: &[CanonicalMessage], idx: usize) -> GroupFlags {
    let Some(cur) = msgs.get(idx) else {
        return GroupFlags::default();
    };
    GroupFlags {
        same_prev: idx
            .checked_sub(1)
            .and_then(|i| msgs.get(i))
            .is_some_and(|prev| merges(cur, prev)),
        same_next: msgs.get(idx + 1).is_some_and(|next| merges(cur, next)),
    }
}
