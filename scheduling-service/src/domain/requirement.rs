use std::collections::BTreeSet;

use chrono::{Datelike, Weekday};
use shared::types::Period;

use crate::domain::config::GenerateConfig;

/// Used when a day falls outside every computed span.
const FALLBACK_NIGHT_REQUIREMENT: u32 = 3;

/// Inclusive one-based day range sharing a night-shift headcount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NightSpan {
    pub start_day: u32,
    pub end_day: u32,
    pub required: u32,
}

impl NightSpan {
    fn contains(&self, day_of_month: u32) -> bool {
        (self.start_day..=self.end_day).contains(&day_of_month)
    }
}

/// Per-day staffing targets for one period.
///
/// All day arguments are zero-based indices into the period.
#[derive(Debug, Clone)]
pub struct RequirementCalculator {
    period: Period,
    weekdays: Vec<Weekday>,
    holidays: BTreeSet<u32>,
    night_spans: Vec<NightSpan>,
    weekday_staff: u32,
    weekend_staff: u32,
    year_end_staff: u32,
    new_year_staff: u32,
}

impl RequirementCalculator {
    /// `holidays` are one-based days of month treated like weekends.
    pub fn new(period: Period, config: &GenerateConfig, holidays: &[u32]) -> Self {
        let weekdays: Vec<Weekday> = (0..period.day_count())
            .filter_map(|day| period.date(day))
            .map(|date| date.weekday())
            .collect();
        let night_spans = weekly_night_spans(&period, &weekdays, config);

        Self {
            period,
            weekdays,
            holidays: holidays.iter().copied().collect(),
            night_spans,
            weekday_staff: config.weekday_day_staff,
            weekend_staff: config.weekend_day_staff,
            year_end_staff: config.year_end_day_staff,
            new_year_staff: config.new_year_day_staff,
        }
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn day_count(&self) -> usize {
        self.period.day_count()
    }

    pub fn night_spans(&self) -> &[NightSpan] {
        &self.night_spans
    }

    pub fn night_requirement(&self, day: usize) -> u32 {
        let day_of_month = day as u32 + 1;
        self.night_spans
            .iter()
            .find(|span| span.contains(day_of_month))
            .map_or(FALLBACK_NIGHT_REQUIREMENT, |span| span.required)
    }

    /// Year-end, then new-year, then weekend-or-holiday, then weekday.
    pub fn day_staff_requirement(&self, day: usize) -> u32 {
        if self.is_year_end(day) {
            self.year_end_staff
        } else if self.is_new_year(day) {
            self.new_year_staff
        } else if self.is_weekend_or_holiday(day) {
            self.weekend_staff
        } else {
            self.weekday_staff
        }
    }

    pub fn is_sunday(&self, day: usize) -> bool {
        self.weekdays.get(day) == Some(&Weekday::Sun)
    }

    pub fn is_weekend_or_holiday(&self, day: usize) -> bool {
        matches!(self.weekdays.get(day), Some(Weekday::Sat | Weekday::Sun))
            || self.holidays.contains(&(day as u32 + 1))
    }

    /// December 30th and 31st.
    pub fn is_year_end(&self, day: usize) -> bool {
        self.period.month == 11 && (day == 29 || day == 30)
    }

    /// January 1st to 3rd.
    pub fn is_new_year(&self, day: usize) -> bool {
        self.period.month == 0 && day < 3
    }
}

/// Splits the period into weekly spans.
///
/// The opening span runs from the 1st to the first Sunday. A month that
/// begins on a Sunday has no partial opening span and starts with a full
/// seven-day chunk instead. Headcounts alternate between the two pattern
/// values, starting with the one `start_with_three` selects.
fn weekly_night_spans(
    period: &Period,
    weekdays: &[Weekday],
    config: &GenerateConfig,
) -> Vec<NightSpan> {
    let days = period.days;
    let Some(first_weekday) = weekdays.first() else {
        return Vec::new();
    };

    let mut spans = Vec::new();
    let mut start = 1;
    let mut end = match first_weekday {
        Weekday::Sun => 7,
        other => 7 - other.num_days_from_monday(),
    };
    let mut week_index = 0;

    while start <= days {
        let pattern_index = if config.start_with_three {
            week_index % 2
        } else {
            (week_index + 1) % 2
        };
        let end_day = end.min(days);
        spans.push(NightSpan {
            start_day: start,
            end_day,
            required: config.night_shift_pattern[pattern_index],
        });
        start = end_day + 1;
        end = start + 6;
        week_index += 1;
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GenerateConfig {
        GenerateConfig {
            weekday_day_staff: 10,
            weekend_day_staff: 8,
            year_end_day_staff: 5,
            new_year_day_staff: 6,
            ..GenerateConfig::default()
        }
    }

    fn calculator(year: i32, month: u32) -> RequirementCalculator {
        RequirementCalculator::new(Period::new(year, month).unwrap(), &config(), &[])
    }

    #[test]
    fn month_starting_monday_splits_into_full_weeks() {
        // 2025-12-01 is a Monday
        let calc = calculator(2025, 11);
        let spans: Vec<_> = calc
            .night_spans()
            .iter()
            .map(|s| (s.start_day, s.end_day, s.required))
            .collect();
        assert_eq!(
            spans,
            vec![(1, 7, 3), (8, 14, 4), (15, 21, 3), (22, 28, 4), (29, 31, 3)]
        );
    }

    #[test]
    fn month_starting_sunday_opens_with_full_week() {
        // 2026-02-01 is a Sunday
        let calc = calculator(2026, 1);
        let spans: Vec<_> = calc
            .night_spans()
            .iter()
            .map(|s| (s.start_day, s.end_day, s.required))
            .collect();
        assert_eq!(spans, vec![(1, 7, 3), (8, 14, 4), (15, 21, 3), (22, 28, 4)]);
        assert_eq!(calc.night_requirement(0), 3);
        assert_eq!(calc.night_requirement(7), 4);
    }

    #[test]
    fn month_starting_saturday_opens_with_two_days() {
        // 2025-11-01 is a Saturday
        let calc = calculator(2025, 10);
        let spans = calc.night_spans();
        assert_eq!((spans[0].start_day, spans[0].end_day, spans[0].required), (1, 2, 3));
        assert_eq!((spans[1].start_day, spans[1].end_day, spans[1].required), (3, 9, 4));
    }

    #[test]
    fn spans_cover_every_day_without_gaps() {
        for month in 0..12 {
            let calc = calculator(2027, month);
            let spans = calc.night_spans();
            assert_eq!(spans[0].start_day, 1);
            for pair in spans.windows(2) {
                assert_eq!(pair[1].start_day, pair[0].end_day + 1);
            }
            assert_eq!(spans.last().unwrap().end_day, calc.period().days);
        }
    }

    #[test]
    fn start_with_three_false_swaps_pattern() {
        let config = GenerateConfig {
            start_with_three: false,
            ..config()
        };
        let calc = RequirementCalculator::new(Period::new(2025, 11).unwrap(), &config, &[]);
        assert_eq!(calc.night_requirement(0), 4);
        assert_eq!(calc.night_requirement(7), 3);
    }

    #[test]
    fn night_requirement_looks_up_span() {
        let calc = calculator(2025, 11);
        assert_eq!(calc.night_requirement(0), 3);
        assert_eq!(calc.night_requirement(6), 3);
        assert_eq!(calc.night_requirement(7), 4);
        assert_eq!(calc.night_requirement(30), 3);
    }

    #[test]
    fn night_requirement_falls_back_outside_period() {
        let calc = calculator(2025, 11);
        assert_eq!(calc.night_requirement(99), FALLBACK_NIGHT_REQUIREMENT);
    }

    #[test]
    fn year_end_overrides_weekday_classification() {
        // 2025-12-30 and 31 are Tuesday and Wednesday
        let calc = calculator(2025, 11);
        assert_eq!(calc.day_staff_requirement(28), 10);
        assert_eq!(calc.day_staff_requirement(29), 5);
        assert_eq!(calc.day_staff_requirement(30), 5);
    }

    #[test]
    fn year_end_overrides_weekend_classification() {
        // 2028-12-30 and 31 are Saturday and Sunday
        let calc = calculator(2028, 11);
        assert!(calc.is_weekend_or_holiday(29));
        assert!(calc.is_sunday(30));
        assert_eq!(calc.day_staff_requirement(29), 5);
        assert_eq!(calc.day_staff_requirement(30), 5);
    }

    #[test]
    fn new_year_covers_first_three_days() {
        // 2026-01-04 is a Sunday
        let calc = calculator(2026, 0);
        assert_eq!(calc.day_staff_requirement(0), 6);
        assert_eq!(calc.day_staff_requirement(2), 6);
        assert_eq!(calc.day_staff_requirement(3), 8);
        assert_eq!(calc.day_staff_requirement(4), 10);
    }

    #[test]
    fn holidays_count_as_weekend() {
        // 2025-11-03 is a Monday
        let period = Period::new(2025, 10).unwrap();
        let calc = RequirementCalculator::new(period, &config(), &[3]);
        assert!(!calc.is_sunday(2));
        assert!(calc.is_weekend_or_holiday(2));
        assert_eq!(calc.day_staff_requirement(2), 8);
        assert_eq!(calc.day_staff_requirement(3), 10);
    }
}
