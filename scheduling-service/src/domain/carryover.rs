use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use shared::types::ShiftCode;
use utoipa::ToSchema;
use uuid::Uuid;

/// Number of prior-period days inspected.
pub const TAIL_WINDOW: usize = 7;
/// Number of opening days that can be forced.
pub const CONSTRAINED_DAYS: usize = 3;
/// A trailing working streak this long forces rest on day 0.
const CARRIED_STREAK_LIMIT: usize = 4;

/// Forced shifts for the first days of a period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CarryoverConstraints {
    #[schema(value_type = Vec<Option<ShiftCode>>)]
    days: [Option<ShiftCode>; CONSTRAINED_DAYS],
}

pub type CarryoverConstraintMap = HashMap<Uuid, CarryoverConstraints>;

impl CarryoverConstraints {
    pub fn new(days: [Option<ShiftCode>; CONSTRAINED_DAYS]) -> Self {
        Self { days }
    }

    pub fn get(&self, day: usize) -> Option<ShiftCode> {
        self.days.get(day).copied().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.days.iter().all(Option::is_none)
    }

    /// Forced entries as `(day, shift)` in day order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, ShiftCode)> + '_ {
        self.days
            .iter()
            .enumerate()
            .filter_map(|(day, shift)| shift.map(|s| (day, s)))
    }

    /// First entry that resolution never forces, i.e. anything but REST or
    /// POST_NIGHT.
    pub fn unsupported(&self) -> Option<(usize, ShiftCode)> {
        self.iter()
            .find(|(_, shift)| !matches!(shift, ShiftCode::Rest | ShiftCode::PostNight))
    }

    fn force(&mut self, day: usize, shift: ShiftCode) {
        self.days[day] = Some(shift);
    }
}

/// Derives the opening-day constraints implied by one prior-period tail.
///
/// Only the last [`TAIL_WINDOW`] entries are read, oldest first. An empty
/// tail yields no constraint.
pub fn resolve_tail(tail: &[ShiftCode]) -> CarryoverConstraints {
    let tail = &tail[tail.len().saturating_sub(TAIL_WINDOW)..];
    let mut constraints = CarryoverConstraints::default();

    // back(1) is the final day of the prior period
    let back = |k: usize| tail.len().checked_sub(k).map(|i| tail[i]);

    match back(1) {
        Some(ShiftCode::Night) => {
            constraints.force(0, ShiftCode::PostNight);
            constraints.force(1, ShiftCode::Rest);
            if back(3) == Some(ShiftCode::Night) && back(2) == Some(ShiftCode::PostNight) {
                constraints.force(2, ShiftCode::Rest);
            }
        }
        Some(ShiftCode::PostNight) => {
            constraints.force(0, ShiftCode::Rest);
            if back(2) == Some(ShiftCode::Night)
                && back(4) == Some(ShiftCode::Night)
                && back(3) == Some(ShiftCode::PostNight)
            {
                constraints.force(1, ShiftCode::Rest);
            }
        }
        _ => {}
    }

    let streak = tail
        .iter()
        .rev()
        .take_while(|shift| shift.is_working())
        .count();
    if streak >= CARRIED_STREAK_LIMIT && constraints.get(0).is_none() {
        constraints.force(0, ShiftCode::Rest);
    }

    constraints
}

/// Resolves every staff member's tail. Members without constraints are omitted.
#[tracing::instrument(skip(tails), fields(staff_count = tails.len()))]
pub fn resolve_constraints(tails: &HashMap<Uuid, Vec<ShiftCode>>) -> CarryoverConstraintMap {
    let constraints: CarryoverConstraintMap = tails
        .iter()
        .map(|(staff_id, tail)| (*staff_id, resolve_tail(tail)))
        .filter(|(_, constraints)| !constraints.is_empty())
        .collect();

    tracing::debug!(constrained = constraints.len(), "Resolved carryover constraints");
    constraints
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::types::ShiftCode::{Day, Night, PaidLeave, PostNight, Rest};

    #[test]
    fn ending_on_night_forces_post_night_then_rest() {
        let c = resolve_tail(&[Rest, Day, Day, Rest, Day, Day, Night]);
        assert_eq!(c.get(0), Some(PostNight));
        assert_eq!(c.get(1), Some(Rest));
        assert_eq!(c.get(2), None);
    }

    #[test]
    fn back_to_back_nights_across_boundary_force_third_day() {
        let c = resolve_tail(&[Day, Rest, Day, Day, Night, PostNight, Night]);
        assert_eq!(c.get(0), Some(PostNight));
        assert_eq!(c.get(1), Some(Rest));
        assert_eq!(c.get(2), Some(Rest));
    }

    #[test]
    fn ending_on_post_night_forces_rest() {
        let c = resolve_tail(&[Day, Day, Rest, Day, Day, Night, PostNight]);
        assert_eq!(c.get(0), Some(Rest));
        assert_eq!(c.get(1), None);
    }

    #[test]
    fn double_night_pair_before_post_night_forces_second_rest() {
        let c = resolve_tail(&[Day, Rest, Day, Night, PostNight, Night, PostNight]);
        assert_eq!(c.get(0), Some(Rest));
        assert_eq!(c.get(1), Some(Rest));
        assert_eq!(c.get(2), None);
    }

    #[test]
    fn long_working_streak_forces_rest() {
        let c = resolve_tail(&[Rest, Rest, Rest, Day, Day, Day, Day]);
        assert_eq!(c.get(0), Some(Rest));
        assert_eq!(c.iter().count(), 1);
    }

    #[test]
    fn short_streak_leaves_opening_free() {
        let c = resolve_tail(&[Rest, Day, Day, PaidLeave, Day, Day, Day]);
        assert!(c.is_empty());
    }

    #[test]
    fn streak_does_not_override_night_rule() {
        let c = resolve_tail(&[Rest, Day, Day, Day, Day, Day, Night]);
        assert_eq!(c.get(0), Some(PostNight));
    }

    #[test]
    fn only_last_seven_entries_count() {
        let mut tail = vec![Night, PostNight];
        tail.extend([Rest, Day, Rest, Day, Day, Rest, Day]);
        assert!(resolve_tail(&tail).is_empty());
    }

    #[test]
    fn short_and_empty_tails_degrade_gracefully() {
        assert!(resolve_tail(&[]).is_empty());
        assert_eq!(resolve_tail(&[Night]).get(0), Some(PostNight));
        assert_eq!(resolve_tail(&[PostNight]).get(1), None);
    }

    #[test]
    fn resolution_is_deterministic() {
        let tail = [Day, Night, PostNight, Day, Day, Day, Day];
        assert_eq!(resolve_tail(&tail), resolve_tail(&tail));
    }

    #[test]
    fn resolve_constraints_omits_unconstrained_staff() {
        let constrained = Uuid::new_v4();
        let free = Uuid::new_v4();
        let mut tails = HashMap::new();
        tails.insert(constrained, vec![Day, Night]);
        tails.insert(free, vec![Rest, Day]);

        let map = resolve_constraints(&tails);
        assert_eq!(map.len(), 1);
        assert_eq!(map[&constrained].get(0), Some(PostNight));
    }

    #[test]
    fn only_rest_and_post_night_are_supported() {
        assert_eq!(resolve_tail(&[Day, Day, Night, PostNight, Night]).unsupported(), None);
        let forced_day = CarryoverConstraints::new([Some(Rest), Some(Day), None]);
        assert_eq!(forced_day.unsupported(), Some((1, Day)));
        let forced_night = CarryoverConstraints::new([Some(Night), None, Some(PaidLeave)]);
        assert_eq!(forced_night.unsupported(), Some((0, Night)));
    }

    #[test]
    fn constraints_serialize_as_three_slots() {
        let c = resolve_tail(&[Day, Night]);
        let json = serde_json::to_value(c).unwrap();
        assert_eq!(json["days"], serde_json::json!(["POST_NIGHT", "REST", null]));
    }
}
