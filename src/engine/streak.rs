// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Consecutive-day activity streak calculation.

use chrono::NaiveDate;
use std::collections::HashSet;

/// Number of consecutive calendar days, counting back from `today`, on
/// which at least one activity was logged.
///
/// The walk starts at `today`, not at the most recent activity: a user
/// with no activity today has a streak of 0 even if yesterday was active.
/// Duplicate dates count once. O(n) over the history.
pub fn current_streak<I>(dates: I, today: NaiveDate) -> u32
where
    I: IntoIterator<Item = NaiveDate>,
{
    let active_days: HashSet<NaiveDate> = dates.into_iter().collect();

    let mut streak = 0;
    let mut cursor = today;

    while active_days.contains(&cursor) {
        streak += 1;
        match cursor.pred_opt() {
            Some(previous) => cursor = previous,
            None => break,
        }
    }

    streak
}
