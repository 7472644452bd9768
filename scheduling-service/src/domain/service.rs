use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared::types::{DayOffRequest, Period, Schedule, Staff};
use tokio::sync::Mutex;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::carryover::{CarryoverConstraintMap, resolve_constraints};
use crate::domain::config::{GenerateConfig, ServiceConfig};
use crate::domain::preference;
use crate::domain::reconcile::{TailRow, auto_map, collect_tails};
use crate::domain::scheduler::{RosterSnapshot, SchedulingError, generate_schedule};
use crate::domain::seed::SeedSource;
use crate::error::SchedulingServiceError;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GenerateScheduleRequest {
    pub staff: Vec<Staff>,
    /// Defaults, together with `month`, to the month after today.
    pub year: Option<i32>,
    /// Zero-based month index.
    pub month: Option<u32>,
    /// One-based days of month treated like weekends.
    #[serde(default)]
    pub holidays: Vec<u32>,
    /// Staff id to one-based day of month to requested day off.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub preferences: HashMap<Uuid, BTreeMap<u32, DayOffRequest>>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub carryover: CarryoverConstraintMap,
    /// Pins the run for reproduction. Drawn fresh when absent.
    pub seed: Option<u64>,
    /// Replaces the configured generation settings for this call.
    pub config: Option<GenerateConfig>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ImportedRow {
    pub name: String,
    /// Raw cells from the prior period, oldest first.
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ResolveCarryoverRequest {
    pub staff: Vec<Staff>,
    pub rows: Vec<ImportedRow>,
    /// Staff id to row index, applied over the automatic mapping.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub overrides: HashMap<Uuid, usize>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CarryoverResolution {
    #[schema(value_type = Object)]
    pub mapping: HashMap<Uuid, usize>,
    #[schema(value_type = Object)]
    pub constraints: CarryoverConstraintMap,
}

/// Front door to the roster engine.
///
/// Generation runs on the blocking pool, one request at a time.
pub struct SchedulingService {
    config: ServiceConfig,
    seed_source: Arc<dyn SeedSource>,
    generation_lock: Mutex<()>,
}

impl SchedulingService {
    pub fn new(config: ServiceConfig, seed_source: Arc<dyn SeedSource>) -> Self {
        Self {
            config,
            seed_source,
            generation_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Validates the request, then builds the roster.
    #[tracing::instrument(skip(self, request), fields(staff_count = request.staff.len()))]
    pub async fn generate(
        &self,
        request: GenerateScheduleRequest,
    ) -> Result<Schedule, SchedulingServiceError> {
        let period = self.resolve_period(request.year, request.month)?;

        if let Some(&day) = request
            .holidays
            .iter()
            .find(|&&day| day == 0 || day > period.days)
        {
            return Err(SchedulingServiceError::BadRequest(format!(
                "Holiday {day} is outside {}",
                period.key()
            )));
        }
        let preferences = preference::from_calendar_days(&request.preferences, period.days)
            .map_err(|e| SchedulingServiceError::BadRequest(e.to_string()))?;
        for (staff_id, constraints) in &request.carryover {
            if let Some((day, shift)) = constraints.unsupported() {
                return Err(SchedulingServiceError::BadRequest(format!(
                    "Carryover for staff {staff_id} forces {shift} on day {}; only REST and POST_NIGHT can be carried over",
                    day + 1
                )));
            }
        }

        let seed = request
            .seed
            .unwrap_or_else(|| self.seed_source.next_seed());
        let config = request
            .config
            .unwrap_or_else(|| self.config.generate.clone());
        let snapshot = RosterSnapshot {
            staff: request.staff,
            year: period.year,
            month: period.month,
            holidays: request.holidays,
            preferences,
            carryover: request.carryover,
        };

        let _guard = self.generation_lock.lock().await;
        tracing::debug!(seed, period = %period.key(), "Generation started");

        let schedule = tokio::task::spawn_blocking(move || {
            generate_schedule(&snapshot, &config, seed)
        })
        .await
        .map_err(|e| SchedulingServiceError::Internal(format!("Generation task failed: {e}")))??;

        Ok(schedule)
    }

    /// Maps imported rows onto staff and derives the opening-day constraints.
    #[tracing::instrument(skip(self, request), fields(rows = request.rows.len()))]
    pub fn resolve_carryover(
        &self,
        request: ResolveCarryoverRequest,
    ) -> Result<CarryoverResolution, SchedulingServiceError> {
        let staff: Vec<Staff> = request
            .staff
            .into_iter()
            .filter(Staff::is_active)
            .collect();
        if staff.is_empty() {
            return Err(SchedulingServiceError::Unprocessable(
                "No active staff to map".into(),
            ));
        }

        let rows: Vec<TailRow> = request
            .rows
            .iter()
            .map(|row| TailRow::from_cells(&row.name, &row.cells))
            .collect();

        let mut mapping = auto_map(&staff, &rows);
        for (staff_id, index) in request.overrides {
            if !staff.iter().any(|s| s.id == staff_id) {
                return Err(SchedulingServiceError::BadRequest(format!(
                    "Override for unknown or inactive staff {staff_id}"
                )));
            }
            if index >= rows.len() {
                return Err(SchedulingServiceError::BadRequest(format!(
                    "Override row {index} is out of range"
                )));
            }
            mapping.insert(staff_id, index);
        }

        let constraints = resolve_constraints(&collect_tails(&mapping, &rows));
        Ok(CarryoverResolution {
            mapping,
            constraints,
        })
    }

    fn resolve_period(
        &self,
        year: Option<i32>,
        month: Option<u32>,
    ) -> Result<Period, SchedulingServiceError> {
        match (year, month) {
            (Some(year), Some(month)) => {
                Ok(Period::new(year, month).ok_or(SchedulingError::InvalidPeriod { year, month })?)
            }
            (None, None) => shared::time::next_period_in(self.config.timezone()).ok_or_else(|| {
                SchedulingServiceError::Internal("Could not determine the next period".into())
            }),
            _ => Err(SchedulingServiceError::BadRequest(
                "year and month must be given together".into(),
            )),
        }
    }
}
