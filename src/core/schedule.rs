use serde::Serialize;

use super::error::{PlanError, PlanResult};
use super::types::{AssetPortfolio, PlanInputs, YearWindow};

/// Planned withdrawals aligned on one shared year axis. Streams outside
/// their own window are zero-padded so every series has the same length.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalSchedule {
    pub years: Vec<i32>,
    pub deferred: Vec<f64>,
    pub rsu: Vec<f64>,
    pub total: Vec<f64>,
}

impl WithdrawalSchedule {
    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}

/// Closed-form inflation-adjusted annuity: n annually-inflating withdrawals
/// that exactly exhaust the balance projected to the start year, when the
/// balance grows at `growth_rate` and withdrawals grow at `inflation_rate`.
pub fn single_asset_schedule(
    present_value: f64,
    window: YearWindow,
    current_year: i32,
    growth_rate: f64,
    inflation_rate: f64,
) -> PlanResult<Vec<f64>> {
    if window.start < current_year {
        return Err(PlanError::StartBeforeCurrentYear {
            start: window.start,
            current: current_year,
        });
    }
    if window.end < window.start {
        return Err(PlanError::EndBeforeStartYear {
            start: window.start,
            end: window.end,
        });
    }

    let years_to_grow = window.start - current_year;
    let projected_value = present_value * (1.0 + growth_rate).powi(years_to_grow);
    let n_years = window.end - window.start + 1;

    let first_withdrawal = if growth_rate == inflation_rate {
        projected_value / n_years as f64
    } else {
        projected_value * (growth_rate - inflation_rate)
            / (1.0 - ((1.0 + inflation_rate) / (1.0 + growth_rate)).powi(n_years))
    };

    Ok((0..n_years)
        .map(|k| first_withdrawal * (1.0 + inflation_rate).powi(k))
        .collect())
}

pub fn consolidated_schedule(
    inputs: &PlanInputs,
    assets: &AssetPortfolio,
    deferred_window: YearWindow,
    rsu_window: YearWindow,
) -> PlanResult<WithdrawalSchedule> {
    let deferred_schedule = if deferred_window.is_empty() {
        Vec::new()
    } else {
        single_asset_schedule(
            assets.deferred,
            deferred_window,
            inputs.current_year,
            inputs.growth_rate,
            inputs.inflation_rate,
        )?
    };
    let rsu_schedule = if rsu_window.is_empty() {
        Vec::new()
    } else {
        single_asset_schedule(
            assets.rsu,
            rsu_window,
            inputs.current_year,
            inputs.growth_rate,
            inputs.inflation_rate,
        )?
    };

    // Empty windows contribute zeros but never shape the year axis.
    let active = [deferred_window, rsu_window]
        .into_iter()
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>();
    let (Some(min_year), Some(max_year)) = (
        active.iter().map(|w| w.start).min(),
        active.iter().map(|w| w.end).max(),
    ) else {
        return Ok(WithdrawalSchedule {
            years: Vec::new(),
            deferred: Vec::new(),
            rsu: Vec::new(),
            total: Vec::new(),
        });
    };

    let deferred = pad_to_axis(deferred_schedule, deferred_window, min_year, max_year);
    let rsu = pad_to_axis(rsu_schedule, rsu_window, min_year, max_year);
    let total = deferred
        .iter()
        .zip(&rsu)
        .map(|(a, b)| a + b)
        .collect::<Vec<_>>();

    Ok(WithdrawalSchedule {
        years: (min_year..=max_year).collect(),
        deferred,
        rsu,
        total,
    })
}

fn pad_to_axis(schedule: Vec<f64>, window: YearWindow, min_year: i32, max_year: i32) -> Vec<f64> {
    let axis_len = (max_year - min_year + 1) as usize;
    if window.is_empty() {
        return vec![0.0; axis_len];
    }

    let mut padded = vec![0.0; (window.start - min_year) as usize];
    padded.extend(schedule);
    padded.resize(axis_len, 0.0);
    padded
}
