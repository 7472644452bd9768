use std::fmt;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// region: Staff Types

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StaffStatus {
    Active,
    Inactive,
}

/// Ward position. Declaration order is the roster order.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Position {
    Head,
    Chief,
    Deputy,
    General,
}

impl Position {
    /// Fixed priority rank, 1 (Head) to 4 (General).
    pub fn priority(self) -> u8 {
        match self {
            Self::Head => 1,
            Self::Chief => 2,
            Self::Deputy => 3,
            Self::General => 4,
        }
    }

    /// Chief and Deputy cover supervision when the Head is off.
    pub fn is_management(self) -> bool {
        matches!(self, Self::Chief | Self::Deputy)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Staff {
    pub id: Uuid,
    pub name: String,
    pub position: Position,
    pub status: StaffStatus,
}

impl Staff {
    pub fn is_active(&self) -> bool {
        self.status == StaffStatus::Active
    }
}

// endregion: Staff Types

// region: Shift Types

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftCode {
    Day,
    Early,
    Late,
    Night,
    PostNight,
    Rest,
    PaidLeave,
}

impl ShiftCode {
    pub const ALL: [ShiftCode; 7] = [
        Self::Day,
        Self::Early,
        Self::Late,
        Self::Night,
        Self::PostNight,
        Self::Rest,
        Self::PaidLeave,
    ];

    /// Hours credited for one occurrence of this shift.
    pub fn hours(self) -> f64 {
        match self {
            Self::Day | Self::Early | Self::Late => 7.5,
            Self::Night => 14.5,
            Self::PostNight | Self::Rest | Self::PaidLeave => 0.0,
        }
    }

    /// Everything except REST, PAID_LEAVE and POST_NIGHT.
    pub fn is_working(self) -> bool {
        !matches!(self, Self::Rest | Self::PaidLeave | Self::PostNight)
    }

    pub fn is_day_work(self) -> bool {
        matches!(self, Self::Day | Self::Early | Self::Late)
    }

    /// REST or PAID_LEAVE. POST_NIGHT is deliberately excluded.
    pub fn is_day_off(self) -> bool {
        matches!(self, Self::Rest | Self::PaidLeave)
    }

    /// Single-letter interchange symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Day => "D",
            Self::Early => "E",
            Self::Late => "L",
            Self::Night => "N",
            Self::PostNight => "A",
            Self::Rest => "O",
            Self::PaidLeave => "Y",
        }
    }

    /// Normalises an imported cell onto the alphabet.
    ///
    /// Accepts the interchange symbols, the canonical names, and the ward's
    /// native spellings. Spreadsheet `nan` cells read as REST. Returns `None`
    /// for blank or unknown cells.
    pub fn from_symbol(raw: &str) -> Option<Self> {
        let s = raw.trim();
        let code = match s {
            "" => return None,
            "日" | "日勤" | "D" => Self::Day,
            "早" | "早出" | "E" => Self::Early,
            "遅" | "遅出" | "L" => Self::Late,
            "夜" | "夜勤" | "N" => Self::Night,
            "明" | "夜明" | "夜勤明" | "A" => Self::PostNight,
            "休" | "公休" | "公" | "O" | "nan" | "NaN" => Self::Rest,
            "有" | "有休" | "有給" | "Y" => Self::PaidLeave,
            other => match other.to_ascii_uppercase().as_str() {
                "DAY" => Self::Day,
                "EARLY" => Self::Early,
                "LATE" => Self::Late,
                "NIGHT" => Self::Night,
                "POST_NIGHT" => Self::PostNight,
                "REST" => Self::Rest,
                "PAID_LEAVE" => Self::PaidLeave,
                _ => return None,
            },
        };
        Some(code)
    }
}

impl fmt::Display for ShiftCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A day-off preference submitted by a staff member.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayOffRequest {
    Rest,
    PaidLeave,
}

impl From<DayOffRequest> for ShiftCode {
    fn from(request: DayOffRequest) -> Self {
        match request {
            DayOffRequest::Rest => ShiftCode::Rest,
            DayOffRequest::PaidLeave => ShiftCode::PaidLeave,
        }
    }
}

// endregion: Shift Types

// region: Period

/// One calendar month. `month` is zero-based (0 = January).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Period {
    pub year: i32,
    pub month: u32,
    pub days: u32,
}

impl Period {
    /// Returns `None` when `month` is outside `0..=11` or the year is unrepresentable.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if month > 11 {
            return None;
        }
        let first = NaiveDate::from_ymd_opt(year, month + 1, 1)?;
        let next = first.checked_add_months(Months::new(1))?;
        let days = next.signed_duration_since(first).num_days() as u32;
        Some(Self { year, month, days })
    }

    /// The month following the one containing `date`.
    pub fn following(date: NaiveDate) -> Option<Self> {
        let next = date.with_day(1)?.checked_add_months(Months::new(1))?;
        Self::new(next.year(), next.month0())
    }

    /// `YYYY-MM` with a one-based month.
    pub fn key(&self) -> String {
        let year = self.year;
        let month = self.month + 1;
        format!("{year:04}-{month:02}")
    }

    pub fn day_count(&self) -> usize {
        self.days as usize
    }

    /// Calendar date for a zero-based day index.
    pub fn date(&self, day: usize) -> Option<NaiveDate> {
        if day >= self.day_count() {
            return None;
        }
        NaiveDate::from_ymd_opt(self.year, self.month + 1, day as u32 + 1)
    }
}

// endregion: Period

// region: Schedule Types

/// Running per-staff counters kept while a roster is built.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct StaffStats {
    pub night_count: u32,
    pub day_work_count: u32,
    /// REST and PAID_LEAVE days. POST_NIGHT is not a rest day.
    pub rest_days: u32,
    pub total_work: u32,
    pub weekend_work: u32,
    pub consecutive_days: u32,
    pub hours: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct RosterRow {
    pub staff_id: Uuid,
    pub shifts: Vec<ShiftCode>,
    pub stats: StaffStats,
}

impl RosterRow {
    /// Longest run of consecutive working shifts.
    pub fn longest_streak(&self) -> u32 {
        let mut longest = 0;
        let mut current = 0;
        for shift in &self.shifts {
            if shift.is_working() {
                current += 1;
                longest = longest.max(current);
            } else {
                current = 0;
            }
        }
        longest
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoverageKind {
    Night,
    Day,
}

/// A day on which fewer staff were assigned than required.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct CoverageShortfall {
    /// One-based day of month.
    pub day: u32,
    pub kind: CoverageKind,
    pub required: u32,
    pub assigned: u32,
}

/// A staff member left with fewer days off than the configured minimum.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct RestDeficit {
    pub staff_id: Uuid,
    pub rest_days: u32,
    pub minimum: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Schedule {
    pub period_key: String,
    pub period: Period,
    pub seed: u64,
    pub score: i64,
    pub rows: Vec<RosterRow>,
    pub shortfalls: Vec<CoverageShortfall>,
    pub rest_deficits: Vec<RestDeficit>,
}

impl Schedule {
    pub fn shifts_for(&self, staff_id: Uuid) -> Option<&[ShiftCode]> {
        self.rows
            .iter()
            .find(|row| row.staff_id == staff_id)
            .map(|row| row.shifts.as_slice())
    }
}

// endregion: Schedule Types

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_priority_follows_rank() {
        assert_eq!(Position::Head.priority(), 1);
        assert_eq!(Position::General.priority(), 4);
        assert!(Position::Chief < Position::Deputy);
        assert!(Position::Deputy.is_management());
        assert!(!Position::Head.is_management());
    }

    #[test]
    fn shift_hours_table() {
        assert_eq!(ShiftCode::Day.hours(), 7.5);
        assert_eq!(ShiftCode::Late.hours(), 7.5);
        assert_eq!(ShiftCode::Night.hours(), 14.5);
        assert_eq!(ShiftCode::PostNight.hours(), 0.0);
        assert_eq!(ShiftCode::PaidLeave.hours(), 0.0);
    }

    #[test]
    fn post_night_is_neither_working_nor_day_off() {
        assert!(!ShiftCode::PostNight.is_working());
        assert!(!ShiftCode::PostNight.is_day_off());
        assert!(ShiftCode::Night.is_working());
        assert!(ShiftCode::PaidLeave.is_day_off());
    }

    #[test]
    fn from_symbol_accepts_native_spellings() {
        assert_eq!(ShiftCode::from_symbol("夜勤"), Some(ShiftCode::Night));
        assert_eq!(ShiftCode::from_symbol(" 明 "), Some(ShiftCode::PostNight));
        assert_eq!(ShiftCode::from_symbol("有給"), Some(ShiftCode::PaidLeave));
        assert_eq!(ShiftCode::from_symbol("nan"), Some(ShiftCode::Rest));
        assert_eq!(ShiftCode::from_symbol("post_night"), Some(ShiftCode::PostNight));
        assert_eq!(ShiftCode::from_symbol(""), None);
        assert_eq!(ShiftCode::from_symbol("??"), None);
    }

    #[test]
    fn symbols_parse_back_to_the_same_code() {
        for code in ShiftCode::ALL {
            assert_eq!(ShiftCode::from_symbol(code.symbol()), Some(code));
        }
    }

    #[test]
    fn shift_code_serializes_screaming_snake() {
        let json = serde_json::to_string(&ShiftCode::PostNight).unwrap();
        assert_eq!(json, "\"POST_NIGHT\"");
    }

    #[test]
    fn period_derives_day_count() {
        assert_eq!(Period::new(2025, 11).unwrap().days, 31);
        assert_eq!(Period::new(2024, 1).unwrap().days, 29);
        assert_eq!(Period::new(2025, 1).unwrap().days, 28);
        assert!(Period::new(2025, 12).is_none());
    }

    #[test]
    fn period_key_is_one_based() {
        assert_eq!(Period::new(2025, 0).unwrap().key(), "2025-01");
        assert_eq!(Period::new(2025, 11).unwrap().key(), "2025-12");
    }

    #[test]
    fn following_rolls_over_year() {
        let date = NaiveDate::from_ymd_opt(2025, 12, 15).unwrap();
        let period = Period::following(date).unwrap();
        assert_eq!((period.year, period.month), (2026, 0));
    }

    #[test]
    fn longest_streak_ignores_post_night() {
        let row = RosterRow {
            staff_id: Uuid::new_v4(),
            shifts: vec![
                ShiftCode::Day,
                ShiftCode::Night,
                ShiftCode::PostNight,
                ShiftCode::Day,
                ShiftCode::Day,
                ShiftCode::Day,
                ShiftCode::Rest,
            ],
            stats: StaffStats::default(),
        };
        assert_eq!(row.longest_streak(), 3);
    }
}
