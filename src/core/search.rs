use serde::Serialize;

use super::error::{PlanError, PlanResult};
use super::schedule::consolidated_schedule;
use super::simulator::{simulate_post_schedule_phase, simulate_schedule_phase};
use super::types::{AssetPortfolio, PlanInputs, YearWindow};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyOutcome {
    pub deferred_window: YearWindow,
    pub rsu_window: YearWindow,
    pub net_wealth_impact: f64,
    pub tax_free_wealth: f64,
    pub gap_growth_penalty: f64,
    pub final_assets: AssetPortfolio,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchGrid {
    pub deferred_start_min: i32,
    pub deferred_start_max: i32,
    /// Number of candidate end years per deferred start year.
    pub deferred_span: i32,
    pub rsu_start: i32,
    /// Number of candidate RSU end years.
    pub rsu_span: i32,
    pub horizon_year: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchReport {
    /// Ranked best-first by net wealth impact.
    pub outcomes: Vec<StrategyOutcome>,
    /// Combinations rejected by the depletion guard.
    pub skipped: usize,
}

pub fn evaluate_strategy(
    inputs: &PlanInputs,
    assets: &AssetPortfolio,
    deferred_window: YearWindow,
    rsu_window: YearWindow,
    horizon_year: i32,
) -> PlanResult<StrategyOutcome> {
    let schedule = consolidated_schedule(inputs, assets, deferred_window, rsu_window)?;
    // Each evaluation runs on its own copy of the portfolio.
    let phase = simulate_schedule_phase(inputs, *assets, &schedule, None);
    let outcome = simulate_post_schedule_phase(inputs, &phase, horizon_year, None)?;

    Ok(StrategyOutcome {
        deferred_window,
        rsu_window,
        net_wealth_impact: outcome.net_wealth_impact,
        tax_free_wealth: outcome.tax_free_wealth,
        gap_growth_penalty: outcome.gap_growth_penalty,
        final_assets: outcome.final_assets,
    })
}

pub fn search_strategies(
    inputs: &PlanInputs,
    assets: &AssetPortfolio,
    grid: &SearchGrid,
) -> PlanResult<SearchReport> {
    let mut outcomes = Vec::new();
    let mut skipped = 0;

    for deferred_start in grid.deferred_start_min..=grid.deferred_start_max {
        for deferred_end in deferred_start..deferred_start + grid.deferred_span {
            for rsu_end in grid.rsu_start..grid.rsu_start + grid.rsu_span {
                let deferred_window = YearWindow::new(deferred_start, deferred_end);
                let rsu_window = YearWindow::new(grid.rsu_start, rsu_end);

                match evaluate_strategy(inputs, assets, deferred_window, rsu_window, grid.horizon_year)
                {
                    Ok(outcome) => outcomes.push(outcome),
                    // A combination that fails to deplete its streams is a bad
                    // candidate, not a bad grid.
                    Err(
                        PlanError::DeferredNotDepleted { .. } | PlanError::RsuNotDepleted { .. },
                    ) => skipped += 1,
                    Err(e) => return Err(e),
                }
            }
        }
    }

    outcomes.sort_by(|a, b| b.net_wealth_impact.total_cmp(&a.net_wealth_impact));
    Ok(SearchReport { outcomes, skipped })
}
