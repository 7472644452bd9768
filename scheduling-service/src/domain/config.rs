use std::path::Path;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Knobs for one roster generation run.
///
/// The engine does not cross-check these values. A configuration where, for
/// example, `min_days_off` cannot be met under `max_consecutive_days` for the
/// period length is accepted as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(default)]
pub struct GenerateConfig {
    /// Night counts alternated week on week.
    #[schema(value_type = Vec<u32>)]
    pub night_shift_pattern: [u32; 2],
    /// When true the first week takes `night_shift_pattern[0]`.
    pub start_with_three: bool,
    pub max_night_shifts: u32,
    pub min_days_off: u32,
    pub max_consecutive_days: u32,
    pub weekday_day_staff: u32,
    pub weekend_day_staff: u32,
    pub year_end_day_staff: u32,
    pub new_year_day_staff: u32,
    pub candidate_count: usize,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            night_shift_pattern: [3, 4],
            start_with_three: true,
            max_night_shifts: 6,
            min_days_off: 8,
            max_consecutive_days: 5,
            weekday_day_staff: 10,
            weekend_day_staff: 8,
            year_end_day_staff: 7,
            new_year_day_staff: 7,
            candidate_count: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub timezone: String,
    pub generate: GenerateConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            timezone: "Asia/Tokyo".to_string(),
            generate: GenerateConfig::default(),
        }
    }
}

impl ServiceConfig {
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        if !Path::new(path).exists() {
            tracing::info!("Config file not found at {path}, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        tracing::info!(?config, "Loaded scheduling config from {path}");
        Ok(config)
    }

    pub fn timezone(&self) -> Tz {
        self.timezone.parse::<Tz>().unwrap_or_else(|_| {
            tracing::warn!(
                timezone = %self.timezone,
                "Invalid timezone, falling back to UTC"
            );
            Tz::UTC
        })
    }
}
