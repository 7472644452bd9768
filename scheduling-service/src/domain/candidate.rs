use std::collections::BTreeSet;

use rand::{Rng, SeedableRng, rngs::StdRng};
use shared::types::{Position, RosterRow, ShiftCode, Staff, StaffStats};

use crate::domain::carryover::{CONSTRAINED_DAYS, CarryoverConstraintMap};
use crate::domain::config::GenerateConfig;
use crate::domain::preference::{self, PreferenceMap};
use crate::domain::requirement::RequirementCalculator;

/// Days off each staff member is steered towards.
pub const TARGET_REST_DAYS: u32 = 9;
/// Working days each staff member is steered towards.
pub const TARGET_WORK_DAYS: u32 = 21;

const OFF_DAY_ATTEMPTS: usize = 100;
/// How far below a target a balance must fall before it becomes urgent.
const URGENCY_MARGIN: u32 = 2;
const GAP_FORCED_REST_STREAK: u32 = 4;
const GAP_RELAXED_REST_STREAK: u32 = 3;
const GAP_BIASED_REST_STREAK: u32 = 2;
/// Above this draw an unforced gap becomes a rest day.
const GAP_REST_THRESHOLD: f64 = 0.6;

/// Read-only inputs shared by every candidate build.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    /// Active staff in roster order.
    pub staff: &'a [Staff],
    pub requirements: &'a RequirementCalculator,
    pub config: &'a GenerateConfig,
    pub preferences: &'a PreferenceMap,
    pub carryover: &'a CarryoverConstraintMap,
}

/// One complete trial roster.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub seed: u64,
    pub rows: Vec<RosterRow>,
}

/// Builds one candidate roster. The result depends only on `ctx` and `seed`.
pub fn build_candidate(ctx: &BuildContext<'_>, seed: u64) -> Candidate {
    let mut builder = CandidateBuilder::new(*ctx, seed);
    builder.seed_fixed();
    builder.seed_off_days();
    for day in 0..builder.days {
        builder.assign_day(day);
    }
    builder.fill_gaps();
    builder.finish()
}

struct CandidateBuilder<'a> {
    ctx: BuildContext<'a>,
    seed: u64,
    days: usize,
    cells: Vec<Vec<Option<ShiftCode>>>,
    stats: Vec<StaffStats>,
    rng: StdRng,
    head: Option<usize>,
    management: Vec<usize>,
}

impl<'a> CandidateBuilder<'a> {
    fn new(ctx: BuildContext<'a>, seed: u64) -> Self {
        let days = ctx.requirements.day_count();
        let staff_count = ctx.staff.len();
        let head = ctx
            .staff
            .iter()
            .position(|s| s.position == Position::Head);
        let management = ctx
            .staff
            .iter()
            .enumerate()
            .filter(|(_, s)| s.position.is_management())
            .map(|(i, _)| i)
            .collect();

        Self {
            ctx,
            seed,
            days,
            cells: vec![vec![None; days]; staff_count],
            stats: vec![StaffStats::default(); staff_count],
            rng: StdRng::seed_from_u64(seed),
            head,
            management,
        }
    }

    /// No Head works on a Sunday.
    fn sunday_off(&self, staff: usize, sunday: bool) -> bool {
        sunday && self.ctx.staff[staff].position == Position::Head
    }

    /// Carryover constraints first, then day-off preferences.
    fn seed_fixed(&mut self) {
        for (i, member) in self.ctx.staff.iter().enumerate() {
            if let Some(constraints) = self.ctx.carryover.get(&member.id) {
                for (day, shift) in constraints.iter() {
                    if day < self.days {
                        self.cells[i][day] = Some(shift);
                        tally(&mut self.stats[i], shift);
                    }
                }
            }
            if let Some(requests) = self.ctx.preferences.get(&member.id) {
                preference::overlay(&mut self.cells[i], &mut self.stats[i], requests);
            }
        }
    }

    /// Tops every staff member up towards [`TARGET_REST_DAYS`] at random.
    ///
    /// When any carryover constraint is in play the opening days are left
    /// alone.
    fn seed_off_days(&mut self) {
        let has_carryover = self.ctx.staff.iter().any(|member| {
            self.ctx
                .carryover
                .get(&member.id)
                .is_some_and(|c| !c.is_empty())
        });
        let min_day = if has_carryover { CONSTRAINED_DAYS } else { 0 };
        if min_day >= self.days {
            return;
        }

        for i in 0..self.cells.len() {
            let current = self.stats[i].rest_days;
            if current >= TARGET_REST_DAYS {
                continue;
            }
            let needed = (TARGET_REST_DAYS - current) as usize;

            let mut chosen = BTreeSet::new();
            let mut attempts = 0;
            while chosen.len() < needed && attempts < OFF_DAY_ATTEMPTS {
                let day = self.rng.random_range(min_day..self.days);
                if self.cells[i][day].is_none() {
                    chosen.insert(day);
                }
                attempts += 1;
            }

            for day in chosen {
                self.cells[i][day] = Some(ShiftCode::Rest);
                self.stats[i].rest_days += 1;
            }
        }
    }

    fn assign_day(&mut self, day: usize) {
        let special = self.ctx.requirements.is_weekend_or_holiday(day);
        let sunday = self.ctx.requirements.is_sunday(day);

        self.assign_nights(day, special, sunday);
        self.assign_day_shifts(day, special, sunday);
        self.ensure_management_cover(day, special);

        for i in 0..self.cells.len() {
            if self.cells[i][day].is_some_and(ShiftCode::is_day_off) {
                self.stats[i].consecutive_days = 0;
            }
        }
    }

    fn can_take_night(&self, i: usize, day: usize, sunday: bool) -> bool {
        let row = &self.cells[i];
        let stats = &self.stats[i];
        let next_free = row.get(day + 1).is_none_or(Option::is_none);
        let completes_double = day >= 2
            && row[day - 1] == Some(ShiftCode::Night)
            && row[day - 2] == Some(ShiftCode::Night);

        row[day].is_none()
            && stats.night_count < self.ctx.config.max_night_shifts
            && next_free
            && !completes_double
            && stats.consecutive_days < self.ctx.config.max_consecutive_days
            && !self.sunday_off(i, sunday)
    }

    fn can_take_day(&self, i: usize, day: usize, sunday: bool) -> bool {
        self.cells[i][day].is_none()
            && self.stats[i].consecutive_days < self.ctx.config.max_consecutive_days
            && !self.sunday_off(i, sunday)
    }

    fn assign_nights(&mut self, day: usize, special: bool, sunday: bool) {
        let required = self.ctx.requirements.night_requirement(day) as usize;
        let mut eligible: Vec<usize> = (0..self.cells.len())
            .filter(|&i| self.can_take_night(i, day, sunday))
            .collect();
        eligible.sort_by_key(|&i| {
            let stats = &self.stats[i];
            let workload = if special {
                stats.weekend_work
            } else {
                stats.total_work
            };
            (stats.night_count, workload)
        });
        if eligible.len() < required {
            tracing::trace!(day, required, eligible = eligible.len(), "Night cover short");
        }

        for i in eligible.into_iter().take(required) {
            self.place_night(i, day, special);
        }
    }

    fn place_night(&mut self, i: usize, day: usize, special: bool) {
        let stats = &mut self.stats[i];
        self.cells[i][day] = Some(ShiftCode::Night);
        stats.night_count += 1;
        stats.total_work += 1;
        stats.consecutive_days += 1;
        if special {
            stats.weekend_work += 1;
        }

        if day + 1 < self.days && self.cells[i][day + 1].is_none() {
            self.cells[i][day + 1] = Some(ShiftCode::PostNight);
            stats.consecutive_days = 0;

            if day + 2 < self.days && self.cells[i][day + 2].is_none() {
                self.cells[i][day + 2] = Some(ShiftCode::Rest);
                stats.rest_days += 1;
            }
        }
    }

    fn assign_day_shifts(&mut self, day: usize, special: bool, sunday: bool) {
        let required = self.ctx.requirements.day_staff_requirement(day) as usize;
        let mut eligible: Vec<usize> = (0..self.cells.len())
            .filter(|&i| self.can_take_day(i, day, sunday))
            .collect();
        eligible.sort_by_key(|&i| {
            let stats = &self.stats[i];
            if special {
                (stats.weekend_work, stats.total_work)
            } else {
                (stats.total_work, 0)
            }
        });
        if eligible.len() < required {
            tracing::trace!(day, required, eligible = eligible.len(), "Day cover short");
        }

        for i in eligible.into_iter().take(required) {
            self.place_day(i, day, special);
        }
    }

    fn place_day(&mut self, i: usize, day: usize, special: bool) {
        let stats = &mut self.stats[i];
        self.cells[i][day] = Some(ShiftCode::Day);
        stats.day_work_count += 1;
        stats.total_work += 1;
        stats.consecutive_days += 1;
        if special {
            stats.weekend_work += 1;
        }
    }

    /// With the Head off, at least one Chief or Deputy works a day shift.
    fn ensure_management_cover(&mut self, day: usize, special: bool) {
        let Some(head) = self.head else {
            return;
        };
        if !self.cells[head][day].is_some_and(ShiftCode::is_day_off) {
            return;
        }
        let covered = self
            .management
            .iter()
            .any(|&m| self.cells[m][day].is_some_and(ShiftCode::is_day_work));
        if covered {
            return;
        }

        let max_consecutive = self.ctx.config.max_consecutive_days;
        let available = self.management.iter().copied().find(|&m| {
            self.cells[m][day].is_none() && self.stats[m].consecutive_days < max_consecutive
        });
        match available {
            Some(m) => self.place_day(m, day, special),
            None => tracing::trace!(day, "No manager available to cover for the Head"),
        }
    }

    /// Fills every remaining cell with DAY or REST.
    fn fill_gaps(&mut self) {
        for i in 0..self.cells.len() {
            let mut streak = 0;
            for day in 0..self.days {
                if let Some(shift) = self.cells[i][day] {
                    streak = if shift.is_working() { streak + 1 } else { 0 };
                    continue;
                }

                let shift = self.choose_gap_shift(i, day, streak);
                self.cells[i][day] = Some(shift);
                let stats = &mut self.stats[i];
                if shift == ShiftCode::Day {
                    stats.day_work_count += 1;
                    stats.total_work += 1;
                    if self.ctx.requirements.is_weekend_or_holiday(day) {
                        stats.weekend_work += 1;
                    }
                    streak += 1;
                } else {
                    stats.rest_days += 1;
                    streak = 0;
                }
            }
            self.stats[i].consecutive_days = streak;
        }
    }

    fn choose_gap_shift(&mut self, i: usize, day: usize, streak: u32) -> ShiftCode {
        let stats = &self.stats[i];
        let needs_work = stats.total_work < TARGET_WORK_DAYS - URGENCY_MARGIN;
        let needs_rest = stats.rest_days < TARGET_REST_DAYS - URGENCY_MARGIN;
        let can_work = !self.sunday_off(i, self.ctx.requirements.is_sunday(day));

        if streak >= self.ctx.config.max_consecutive_days || streak >= GAP_FORCED_REST_STREAK {
            ShiftCode::Rest
        } else if !needs_work && (needs_rest || streak >= GAP_RELAXED_REST_STREAK) {
            ShiftCode::Rest
        } else if needs_work && can_work {
            ShiftCode::Day
        } else if !can_work {
            ShiftCode::Rest
        } else if streak >= GAP_BIASED_REST_STREAK
            || self.rng.random::<f64>() > GAP_REST_THRESHOLD
        {
            ShiftCode::Rest
        } else {
            ShiftCode::Day
        }
    }

    fn finish(self) -> Candidate {
        let rows = self
            .ctx
            .staff
            .iter()
            .zip(self.cells)
            .zip(self.stats)
            .map(|((member, cells), mut stats)| {
                // fill_gaps leaves no empty cell
                let shifts: Vec<ShiftCode> = cells
                    .into_iter()
                    .map(|cell| cell.unwrap_or(ShiftCode::Rest))
                    .collect();
                stats.hours = shifts.iter().map(|s| s.hours()).sum();
                RosterRow {
                    staff_id: member.id,
                    shifts,
                    stats,
                }
            })
            .collect();

        Candidate {
            seed: self.seed,
            rows,
        }
    }
}

/// Counts a shift fixed before the main pass.
fn tally(stats: &mut StaffStats, shift: ShiftCode) {
    if shift.is_day_off() {
        stats.rest_days += 1;
    } else if shift.is_working() {
        stats.total_work += 1;
        match shift {
            ShiftCode::Night => stats.night_count += 1,
            s if s.is_day_work() => stats.day_work_count += 1,
            _ => {}
        }
    }
}
