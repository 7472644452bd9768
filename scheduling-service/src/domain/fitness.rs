use shared::types::{RosterRow, ShiftCode};

use crate::domain::candidate::{Candidate, TARGET_REST_DAYS, TARGET_WORK_DAYS};

pub const BASE_SCORE: i64 = 1000;
const TARGET_NIGHTS: i64 = 5;

const WORK_WEIGHT: i64 = 3;
const REST_WEIGHT: i64 = 3;
const STREAK_WEIGHT: i64 = 100;
const NIGHT_WEIGHT: i64 = 4;
const UNPAIRED_NIGHT_PENALTY: i64 = 50;

/// Scores a candidate. Higher is better; the score may go negative.
pub fn score(candidate: &Candidate, max_consecutive_days: u32) -> i64 {
    BASE_SCORE
        - candidate
            .rows
            .iter()
            .map(|row| row_penalty(row, max_consecutive_days))
            .sum::<i64>()
}

fn row_penalty(row: &RosterRow, max_consecutive_days: u32) -> i64 {
    let squared = |actual: u32, target: i64| {
        let delta = i64::from(actual) - target;
        delta * delta
    };

    let mut penalty = WORK_WEIGHT * squared(row.stats.total_work, i64::from(TARGET_WORK_DAYS))
        + REST_WEIGHT * squared(row.stats.rest_days, i64::from(TARGET_REST_DAYS))
        + NIGHT_WEIGHT * squared(row.stats.night_count, TARGET_NIGHTS);

    let longest = row.longest_streak();
    if longest > max_consecutive_days {
        penalty += STREAK_WEIGHT * squared(longest - max_consecutive_days, 0);
    }

    // the final day has no successor to check
    let unpaired = row
        .shifts
        .windows(2)
        .filter(|pair| pair[0] == ShiftCode::Night && pair[1] != ShiftCode::PostNight)
        .count() as i64;
    penalty + UNPAIRED_NIGHT_PENALTY * unpaired
}
