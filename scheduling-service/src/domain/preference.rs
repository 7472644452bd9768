use std::collections::{BTreeMap, HashMap};

use shared::types::{DayOffRequest, ShiftCode, StaffStats};
use thiserror::Error;
use uuid::Uuid;

/// Staff id to zero-based day index to requested day off.
pub type PreferenceMap = HashMap<Uuid, BTreeMap<usize, DayOffRequest>>;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Staff {staff_id} requested day {day}, outside a {days}-day period")]
pub struct RequestOutOfPeriod {
    pub staff_id: Uuid,
    pub day: u32,
    pub days: u32,
}

/// Converts one-based day-of-month requests into a [`PreferenceMap`].
pub fn from_calendar_days(
    requests: &HashMap<Uuid, BTreeMap<u32, DayOffRequest>>,
    days: u32,
) -> Result<PreferenceMap, RequestOutOfPeriod> {
    let mut preferences = PreferenceMap::with_capacity(requests.len());
    for (&staff_id, by_day) in requests {
        let mut converted = BTreeMap::new();
        for (&day, &request) in by_day {
            if day == 0 || day > days {
                return Err(RequestOutOfPeriod { staff_id, day, days });
            }
            converted.insert((day - 1) as usize, request);
        }
        preferences.insert(staff_id, converted);
    }
    Ok(preferences)
}

/// Copies day-off requests into cells that are still empty.
///
/// Cells already fixed by carryover are left untouched. Returns the number
/// of requests applied.
pub fn overlay(
    cells: &mut [Option<ShiftCode>],
    stats: &mut StaffStats,
    requests: &BTreeMap<usize, DayOffRequest>,
) -> usize {
    let mut applied = 0;
    for (&day, &request) in requests {
        let Some(cell) = cells.get_mut(day) else {
            continue;
        };
        if let Some(fixed) = cell {
            tracing::trace!(day, %fixed, "Day-off request overridden by carryover");
            continue;
        }
        *cell = Some(request.into());
        stats.rest_days += 1;
        applied += 1;
    }
    applied
}
