//! Forecast engine
//!
//! Dispatches a forecast request to the backend named by the caller and
//! checks that whatever comes back has the normalized shape: exactly
//! `horizon` rows on strictly increasing dates starting the day after the
//! last observation.

use crate::data::StoreHistory;
use crate::error::{ForecastError, ModelFailure, Result};
use crate::models::{ForecastModel, ForecastTable, Horizon, HorizonProjector, ModelKind};
use chrono::{Days, NaiveDate};
use tracing::info;

/// Project `horizon` days past `last_known_date` with the model of `kind`.
///
/// `kind` is the caller's choice of backend; a handle of the other backend is
/// rejected with [`ForecastError::UnsupportedModelOperation`] rather than
/// silently used.
pub fn generate_forecast(
    kind: ModelKind,
    model: &ForecastModel,
    last_known_date: NaiveDate,
    horizon: Horizon,
) -> Result<ForecastTable> {
    let table = project_checked(kind, model, last_known_date, horizon)?;
    log_generated(None, kind, horizon, &table);
    Ok(table)
}

/// Forecast the days following a store's history
pub fn forecast_store(
    history: &StoreHistory,
    kind: ModelKind,
    model: &ForecastModel,
    horizon: Horizon,
) -> Result<ForecastTable> {
    let table = project_checked(kind, model, history.last_date(), horizon)?;
    log_generated(Some(history.store_id()), kind, horizon, &table);
    Ok(table)
}

fn project_checked(
    kind: ModelKind,
    model: &ForecastModel,
    last_known_date: NaiveDate,
    horizon: Horizon,
) -> Result<ForecastTable> {
    let projector = match (kind, model) {
        (ModelKind::Sarima, ForecastModel::Sarima(m)) => m as &dyn HorizonProjector,
        (ModelKind::Prophet, ForecastModel::Prophet(m)) => m as &dyn HorizonProjector,
        (requested, other) => {
            return Err(ForecastError::UnsupportedModelOperation {
                requested,
                actual: other.kind(),
            })
        }
    };

    let table = projector.project(horizon, last_known_date)?;
    check_shape(&table, last_known_date, horizon).map_err(|source| {
        ForecastError::ForecastGeneration {
            model: kind,
            horizon: horizon.days(),
            source,
        }
    })?;

    Ok(table)
}

fn log_generated(store: Option<u32>, kind: ModelKind, horizon: Horizon, table: &ForecastTable) {
    if let (Some(first), Some(last)) = (table.rows().first(), table.rows().last()) {
        info!(
            store = ?store,
            model = %kind,
            horizon = horizon.days(),
            first = %first.date,
            last = %last.date,
            "Forecast generated"
        );
    }
}

/// Verify length, start date and date ordering of a backend's output
fn check_shape(
    table: &ForecastTable,
    last_known_date: NaiveDate,
    horizon: Horizon,
) -> std::result::Result<(), ModelFailure> {
    if table.len() != horizon.days() {
        return Err(ModelFailure::MalformedOutput(format!(
            "backend returned {} rows for horizon={}",
            table.len(),
            horizon
        )));
    }

    let expected_start = last_known_date.checked_add_days(Days::new(1));
    let first = table.rows().first().map(|r| r.date);
    if first != expected_start {
        return Err(ModelFailure::MalformedOutput(format!(
            "forecast starts on {:?}, expected the day after last_known_date={}",
            first, last_known_date
        )));
    }

    if table.rows().windows(2).any(|w| w[0].date >= w[1].date) {
        return Err(ModelFailure::MalformedOutput(
            "forecast dates are not strictly increasing".to_string(),
        ));
    }

    Ok(())
}
