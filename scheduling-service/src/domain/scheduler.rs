use shared::types::{
    CoverageKind, CoverageShortfall, Period, RestDeficit, RosterRow, Schedule, ShiftCode, Staff,
};
use thiserror::Error;

use crate::domain::candidate::BuildContext;
use crate::domain::carryover::CarryoverConstraintMap;
use crate::domain::config::GenerateConfig;
use crate::domain::preference::PreferenceMap;
use crate::domain::requirement::RequirementCalculator;
use crate::domain::selector::select_best;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulingError {
    #[error("No active staff to schedule")]
    InsufficientStaff,

    #[error("Invalid period: year {year}, month index {month}")]
    InvalidPeriod { year: i32, month: u32 },

    #[error("No candidate roster could be built")]
    NoCandidate,
}

/// Everything the engine reads for one generation run.
#[derive(Debug, Clone, Default)]
pub struct RosterSnapshot {
    /// May include inactive staff; they are filtered out.
    pub staff: Vec<Staff>,
    pub year: i32,
    /// Zero-based.
    pub month: u32,
    /// One-based days of month.
    pub holidays: Vec<u32>,
    pub preferences: PreferenceMap,
    pub carryover: CarryoverConstraintMap,
}

/// Builds the roster for one period.
///
/// Active staff are ordered by position priority before building, so the
/// rows of the returned [`Schedule`] follow that order. The result depends
/// only on the arguments.
#[tracing::instrument(skip(snapshot, config), fields(year = snapshot.year, month = snapshot.month))]
pub fn generate_schedule(
    snapshot: &RosterSnapshot,
    config: &GenerateConfig,
    base_seed: u64,
) -> Result<Schedule, SchedulingError> {
    let period = Period::new(snapshot.year, snapshot.month).ok_or(
        SchedulingError::InvalidPeriod {
            year: snapshot.year,
            month: snapshot.month,
        },
    )?;

    let mut staff: Vec<Staff> = snapshot
        .staff
        .iter()
        .filter(|s| s.is_active())
        .cloned()
        .collect();
    if staff.is_empty() {
        return Err(SchedulingError::InsufficientStaff);
    }
    staff.sort_by_key(|s| s.position.priority());

    let requirements = RequirementCalculator::new(period, config, &snapshot.holidays);
    let ctx = BuildContext {
        staff: &staff,
        requirements: &requirements,
        config,
        preferences: &snapshot.preferences,
        carryover: &snapshot.carryover,
    };

    let best = select_best(&ctx, base_seed).ok_or(SchedulingError::NoCandidate)?;
    let shortfalls = coverage_shortfalls(&best.candidate.rows, &requirements);
    let rest_deficits = rest_deficits(&best.candidate.rows, config.min_days_off);

    if !shortfalls.is_empty() {
        tracing::warn!(days = shortfalls.len(), "Roster is under-covered");
    }
    tracing::info!(
        period = %period.key(),
        seed = best.candidate.seed,
        score = best.score,
        staff_count = staff.len(),
        "Schedule generated"
    );

    Ok(Schedule {
        period_key: period.key(),
        period,
        seed: best.candidate.seed,
        score: best.score,
        rows: best.candidate.rows,
        shortfalls,
        rest_deficits,
    })
}

/// Days where assigned night or day staff fall short of the requirement.
pub fn coverage_shortfalls(
    rows: &[RosterRow],
    requirements: &RequirementCalculator,
) -> Vec<CoverageShortfall> {
    let mut shortfalls = Vec::new();
    for day in 0..requirements.day_count() {
        let assigned = |is_kind: fn(ShiftCode) -> bool| {
            rows.iter()
                .filter(|row| row.shifts.get(day).is_some_and(|&s| is_kind(s)))
                .count() as u32
        };
        let checks = [
            (
                CoverageKind::Night,
                requirements.night_requirement(day),
                assigned(|s| s == ShiftCode::Night),
            ),
            (
                CoverageKind::Day,
                requirements.day_staff_requirement(day),
                assigned(ShiftCode::is_day_work),
            ),
        ];

        for (kind, required, assigned) in checks {
            if assigned < required {
                shortfalls.push(CoverageShortfall {
                    day: day as u32 + 1,
                    kind,
                    required,
                    assigned,
                });
            }
        }
    }
    shortfalls
}

pub fn rest_deficits(rows: &[RosterRow], min_days_off: u32) -> Vec<RestDeficit> {
    rows.iter()
        .filter(|row| row.stats.rest_days < min_days_off)
        .map(|row| RestDeficit {
            staff_id: row.staff_id,
            rest_days: row.stats.rest_days,
            minimum: min_days_off,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use shared::types::{DayOffRequest, Position, StaffStatus};
    use uuid::Uuid;

    use super::*;
    use crate::domain::carryover::resolve_tail;

    fn member(name: &str, position: Position) -> Staff {
        Staff {
            id: Uuid::new_v4(),
            name: name.to_string(),
            position,
            status: StaffStatus::Active,
        }
    }

    fn ward() -> Vec<Staff> {
        let mut staff: Vec<Staff> = (0..18)
            .map(|i| member(&format!("Nurse {i}"), Position::General))
            .collect();
        staff.push(member("Deputy", Position::Deputy));
        staff.push(member("Head", Position::Head));
        staff.push(member("Chief", Position::Chief));
        staff
    }

    fn snapshot() -> RosterSnapshot {
        RosterSnapshot {
            staff: ward(),
            year: 2025,
            month: 11,
            ..RosterSnapshot::default()
        }
    }

    #[test]
    fn no_active_staff_fails_fast() {
        let mut snapshot = snapshot();
        for s in &mut snapshot.staff {
            s.status = StaffStatus::Inactive;
        }
        let err = generate_schedule(&snapshot, &GenerateConfig::default(), 1).unwrap_err();
        assert_eq!(err, SchedulingError::InsufficientStaff);
    }

    #[test]
    fn invalid_month_is_rejected() {
        let snapshot = RosterSnapshot {
            month: 12,
            ..snapshot()
        };
        let err = generate_schedule(&snapshot, &GenerateConfig::default(), 1).unwrap_err();
        assert_eq!(
            err,
            SchedulingError::InvalidPeriod {
                year: 2025,
                month: 12
            }
        );
    }

    #[test]
    fn rows_follow_position_priority_and_skip_inactive() {
        let mut snapshot = snapshot();
        let retired = snapshot.staff[0].id;
        snapshot.staff[0].status = StaffStatus::Inactive;

        let schedule = generate_schedule(&snapshot, &GenerateConfig::default(), 7).unwrap();

        assert_eq!(schedule.rows.len(), 20);
        assert!(schedule.shifts_for(retired).is_none());
        let head = snapshot.staff.iter().find(|s| s.position == Position::Head).unwrap();
        let chief = snapshot.staff.iter().find(|s| s.position == Position::Chief).unwrap();
        assert_eq!(schedule.rows[0].staff_id, head.id);
        assert_eq!(schedule.rows[1].staff_id, chief.id);
        assert_eq!(schedule.period_key, "2025-12");
        assert!(schedule.rows.iter().all(|r| r.shifts.len() == 31));
    }

    #[test]
    fn generation_is_reproducible_for_a_seed() {
        let mut snapshot = snapshot();
        let first_id = snapshot.staff[0].id;
        snapshot.carryover.insert(
            first_id,
            resolve_tail(&[ShiftCode::Day, ShiftCode::Night]),
        );
        snapshot
            .preferences
            .insert(first_id, BTreeMap::from([(14, DayOffRequest::PaidLeave)]));
        let config = GenerateConfig::default();

        let first = generate_schedule(&snapshot, &config, 2024).unwrap();
        let second = generate_schedule(&snapshot, &config, 2024).unwrap();

        assert_eq!(first, second);
        let shifts = first.shifts_for(first_id).unwrap();
        assert_eq!(shifts[0], ShiftCode::PostNight);
        assert_eq!(shifts[1], ShiftCode::Rest);
        assert_eq!(shifts[14], ShiftCode::PaidLeave);
    }

    #[test]
    fn final_roster_holds_invariants() {
        let snapshot = snapshot();
        let config = GenerateConfig::default();
        let schedule = generate_schedule(&snapshot, &config, 31).unwrap();
        let requirements = RequirementCalculator::new(schedule.period, &config, &[]);
        let head = snapshot.staff.iter().find(|s| s.position == Position::Head).unwrap();

        for row in &schedule.rows {
            let nights = row.shifts.iter().filter(|&&s| s == ShiftCode::Night).count();
            assert!(nights as u32 <= config.max_night_shifts);
            for pair in row.shifts.windows(2) {
                if pair[0] == ShiftCode::Night {
                    assert_eq!(pair[1], ShiftCode::PostNight);
                }
            }
        }
        let head_row = schedule.shifts_for(head.id).unwrap();
        for day in 0..31 {
            if requirements.is_sunday(day) {
                assert!(!head_row[day].is_working());
            }
        }
    }

    #[test]
    fn tiny_ward_reports_shortfalls_instead_of_failing() {
        let snapshot = RosterSnapshot {
            staff: vec![member("Only", Position::General)],
            ..snapshot()
        };
        let schedule = generate_schedule(&snapshot, &GenerateConfig::default(), 5).unwrap();

        assert!(!schedule.shortfalls.is_empty());
        let first = &schedule.shortfalls[0];
        assert_eq!(first.day, 1);
        assert_eq!(first.kind, CoverageKind::Night);
        assert_eq!(first.required, 3);
    }

    #[test]
    fn coverage_audit_counts_each_kind() {
        let config = GenerateConfig {
            night_shift_pattern: [1, 1],
            weekday_day_staff: 2,
            weekend_day_staff: 2,
            year_end_day_staff: 2,
            ..GenerateConfig::default()
        };
        let requirements =
            RequirementCalculator::new(Period::new(2025, 11).unwrap(), &config, &[]);
        let row = |shifts: Vec<ShiftCode>| RosterRow {
            staff_id: Uuid::new_v4(),
            shifts,
            stats: Default::default(),
        };
        let mut a = vec![ShiftCode::Day; 31];
        let mut b = vec![ShiftCode::Early; 31];
        a[0] = ShiftCode::Night;
        b[1] = ShiftCode::Night;
        let rows = vec![row(a), row(b)];

        let shortfalls = coverage_shortfalls(&rows, &requirements);

        // days 1 and 2 lack a day worker, every later day lacks a night
        assert_eq!(shortfalls.len(), 31);
        assert!(shortfalls.iter().any(|s| s.day == 1 && s.kind == CoverageKind::Day));
        assert!(!shortfalls.iter().any(|s| s.day == 1 && s.kind == CoverageKind::Night));
        assert!(shortfalls.iter().any(|s| s.day == 3 && s.kind == CoverageKind::Night));
        assert!(!shortfalls.iter().any(|s| s.day == 3 && s.kind == CoverageKind::Day));
    }

    #[test]
    fn rest_deficit_flags_only_short_rows() {
        let mut short = RosterRow {
            staff_id: Uuid::new_v4(),
            shifts: Vec::new(),
            stats: Default::default(),
        };
        short.stats.rest_days = 6;
        let mut fine = short.clone();
        fine.staff_id = Uuid::new_v4();
        fine.stats.rest_days = 8;

        let deficits = rest_deficits(&[short.clone(), fine], 8);

        assert_eq!(
            deficits,
            vec![RestDeficit {
                staff_id: short.staff_id,
                rest_days: 6,
                minimum: 8
            }]
        );
    }
}
