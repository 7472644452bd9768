use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;

use crate::types::Period;

/// Current calendar date in the given timezone.
///
/// # Example
///```
/// use shared::time::today_in;
/// use chrono_tz::Asia::Tokyo;
/// let today = today_in(Tokyo);
/// ```
pub fn today_in(timezone: Tz) -> NaiveDate {
    Utc::now().with_timezone(&timezone).date_naive()
}

/// The scheduling period that follows today in the given timezone.
pub fn next_period_in(timezone: Tz) -> Option<Period> {
    Period::following(today_in(timezone))
}
