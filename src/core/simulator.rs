use std::collections::BTreeMap;

use serde::Serialize;

use super::error::{PlanError, PlanResult};
use super::schedule::WithdrawalSchedule;
use super::types::{AssetPortfolio, PlanInputs, YearRecord};
use crate::tax::{IncomeBreakdown, calculate_tax};

pub const DEFERRED_HEIR_EFFICIENCY: f64 = 0.65;
const ROTH_HEIR_EFFICIENCY: f64 = 1.0;
// Step-up of cost basis at death makes both taxable stock buckets pass tax-free.
const STEP_UP_HEIR_EFFICIENCY: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePhaseResult {
    pub end_year: i32,
    pub assets: AssetPortfolio,
    pub income_gaps: BTreeMap<i32, f64>,
    pub last_adjusted_need: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HorizonOutcome {
    pub final_assets: AssetPortfolio,
    pub tax_free_wealth: f64,
    pub income_gaps: BTreeMap<i32, f64>,
    pub gap_growth_penalty: f64,
    pub net_wealth_impact: f64,
}

/// Heir-adjusted value of the estate. Cost basis fields are bookkeeping,
/// not assets; non-positive balances contribute nothing.
pub fn tax_free_wealth(assets: &AssetPortfolio) -> f64 {
    let mut wealth = 0.0;
    if assets.deferred > 0.0 {
        wealth += assets.deferred * DEFERRED_HEIR_EFFICIENCY;
    }
    if assets.roth > 0.0 {
        wealth += assets.roth * ROTH_HEIR_EFFICIENCY;
    }
    if assets.rsu > 0.0 {
        wealth += assets.rsu * STEP_UP_HEIR_EFFICIENCY;
    }
    if assets.brokerage > 0.0 {
        wealth += assets.brokerage * STEP_UP_HEIR_EFFICIENCY;
    }
    wealth
}

fn grow_for_one_year(inputs: &PlanInputs, assets: &mut AssetPortfolio) {
    if assets.deferred > 0.0 {
        assets.deferred *= 1.0 + inputs.deferred_growth_rate;
    }
    if assets.roth > 0.0 {
        assets.roth *= 1.0 + inputs.roth_growth_rate;
    }
    if assets.rsu > 0.0 {
        assets.rsu *= 1.0 + inputs.rsu_growth_rate;
    }
    if assets.brokerage > 0.0 {
        assets.brokerage *= 1.0 + inputs.brokerage_growth_rate;
    }
}

pub fn simulate_schedule_phase(
    inputs: &PlanInputs,
    assets: AssetPortfolio,
    schedule: &WithdrawalSchedule,
    mut trace: Option<&mut Vec<YearRecord>>,
) -> SchedulePhaseResult {
    let mut assets = assets;
    let mut income_gaps = BTreeMap::new();
    let mut last_adjusted_need = inputs.annual_income_need;

    for (i, &year) in schedule.years.iter().enumerate() {
        let years_from_start = year - inputs.current_year;
        let adjusted_need =
            inputs.annual_income_need * (1.0 + inputs.inflation_rate).powi(years_from_start);
        last_adjusted_need = adjusted_need;

        let basis_ratio = if assets.rsu > 0.0 {
            assets.rsu_basis / assets.rsu
        } else {
            0.0
        };

        // Never withdraw more than the account holds.
        let deferred_withdrawal = schedule.deferred[i].min(assets.deferred);
        let rsu_withdrawal = schedule.rsu[i].min(assets.rsu);
        let rsu_gain = rsu_withdrawal * (1.0 - basis_ratio);

        let income = IncomeBreakdown {
            deferred_distribution: deferred_withdrawal,
            long_term_gain: rsu_gain,
            ordinary_dividend: inputs.base_ordinary_dividend,
            ..IncomeBreakdown::default()
        };
        let tax_paid = if income.is_zero() {
            0.0
        } else {
            calculate_tax(&income, inputs.filing_status, &inputs.tax_config).total_tax
        };

        assets.deferred -= deferred_withdrawal;
        assets.rsu -= rsu_withdrawal;
        // Basis tracks the post-sale balance at the prior ratio, not a
        // dollar-for-dollar reduction.
        assets.rsu_basis = assets.rsu * basis_ratio;

        let net_income = deferred_withdrawal + rsu_withdrawal - tax_paid;

        if net_income < adjusted_need {
            income_gaps.insert(year, adjusted_need - net_income);
        } else {
            let surplus = net_income - adjusted_need;
            if surplus > 0.0 {
                // Surplus up to the deferred withdrawal converts to Roth at no
                // further cost: its tax was already paid as an ordinary
                // distribution this year.
                let roth_conversion = surplus.min(deferred_withdrawal);
                assets.roth += roth_conversion;
                let brokerage_deposit = surplus - roth_conversion;
                if brokerage_deposit > 0.0 {
                    assets.brokerage += brokerage_deposit;
                    assets.brokerage_basis += brokerage_deposit;
                }
            }
        }

        if let Some(rows) = trace.as_deref_mut() {
            rows.push(YearRecord {
                year,
                adjusted_need,
                deferred_withdrawal,
                rsu_withdrawal,
                brokerage_withdrawal: 0.0,
                roth_withdrawal: 0.0,
                tax_paid,
                net_income,
                end_deferred: assets.deferred,
                end_roth: assets.roth,
                end_rsu: assets.rsu,
                end_brokerage: assets.brokerage,
            });
        }

        grow_for_one_year(inputs, &mut assets);
    }

    let end_year = schedule.years.last().copied().unwrap_or(inputs.current_year);
    SchedulePhaseResult {
        end_year,
        assets,
        income_gaps,
        last_adjusted_need,
    }
}

pub fn simulate_post_schedule_phase(
    inputs: &PlanInputs,
    phase: &SchedulePhaseResult,
    horizon_year: i32,
    mut trace: Option<&mut Vec<YearRecord>>,
) -> PlanResult<HorizonOutcome> {
    // The schedule was supposed to empty both depleting streams; a balance
    // above half the final need means the caller's windows did not.
    let guard = 0.5 * phase.last_adjusted_need;
    if phase.assets.deferred > guard {
        return Err(PlanError::DeferredNotDepleted {
            balance: phase.assets.deferred,
            guard,
        });
    }
    if phase.assets.rsu > guard {
        return Err(PlanError::RsuNotDepleted {
            balance: phase.assets.rsu,
            guard,
        });
    }

    let mut assets = phase.assets;
    let mut income_gaps = phase.income_gaps.clone();
    let mut adjusted_need = phase.last_adjusted_need;

    for year in (phase.end_year + 1)..=horizon_year {
        adjusted_need *= 1.0 + inputs.inflation_rate;

        let mut gap = adjusted_need;
        let mut brokerage_withdrawal = 0.0;
        let mut tax_paid = 0.0;
        let mut net_income = 0.0;

        if assets.brokerage > 0.0 {
            let basis_ratio = assets.brokerage_basis / assets.brokerage;
            let sale_needed =
                sale_for_net_need(adjusted_need, basis_ratio, inputs.capital_gains_rate);
            brokerage_withdrawal = sale_needed.min(assets.brokerage);
            assets.brokerage -= brokerage_withdrawal;
            assets.brokerage_basis -= brokerage_withdrawal * basis_ratio;

            let realized_gain = brokerage_withdrawal * (1.0 - basis_ratio);
            let income = IncomeBreakdown {
                long_term_gain: realized_gain,
                ordinary_dividend: inputs.base_ordinary_dividend,
                ..IncomeBreakdown::default()
            };
            tax_paid = calculate_tax(&income, inputs.filing_status, &inputs.tax_config).total_tax;
            net_income = brokerage_withdrawal - tax_paid;
            gap -= net_income;
        }

        let mut roth_withdrawal = 0.0;
        if gap > 0.0 {
            roth_withdrawal = gap.min(assets.roth);
            assets.roth -= roth_withdrawal;
            gap -= roth_withdrawal;
        }

        if gap > 0.0 {
            income_gaps.insert(year, gap);
        }

        if let Some(rows) = trace.as_deref_mut() {
            rows.push(YearRecord {
                year,
                adjusted_need,
                deferred_withdrawal: 0.0,
                rsu_withdrawal: 0.0,
                brokerage_withdrawal,
                roth_withdrawal,
                tax_paid,
                net_income,
                end_deferred: assets.deferred,
                end_roth: assets.roth,
                end_rsu: assets.rsu,
                end_brokerage: assets.brokerage,
            });
        }

        grow_for_one_year(inputs, &mut assets);
    }

    let wealth = tax_free_wealth(&assets);
    let gap_growth_penalty = compounded_gap_total(&income_gaps, horizon_year, inputs.growth_rate);

    Ok(HorizonOutcome {
        final_assets: assets,
        tax_free_wealth: wealth,
        income_gaps,
        gap_growth_penalty,
        net_wealth_impact: wealth - gap_growth_penalty,
    })
}

// Gross sale such that the proceeds net of capital-gains tax on the gain
// portion cover the need: sale * (1 - (1 - basisRatio) * rate) = need.
fn sale_for_net_need(net_need: f64, basis_ratio: f64, capital_gains_rate: f64) -> f64 {
    if basis_ratio >= 1.0 {
        return net_need;
    }
    net_need / (1.0 - (1.0 - basis_ratio) * capital_gains_rate)
}

// Each recorded gap is treated as a debt that would otherwise have grown at
// the portfolio rate until the horizon.
fn compounded_gap_total(gaps: &BTreeMap<i32, f64>, horizon_year: i32, growth_rate: f64) -> f64 {
    gaps.iter()
        .filter(|&(&year, _)| year <= horizon_year)
        .map(|(&year, &gap)| gap * (1.0 + growth_rate).powi(horizon_year - year))
        .sum()
}
