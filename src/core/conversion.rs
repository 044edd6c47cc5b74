use std::ops::RangeInclusive;

use serde::Serialize;

use super::simulator::tax_free_wealth;
use super::types::{AssetPortfolio, PlanInputs};
use crate::tax::{IncomeBreakdown, calculate_tax};

/// Move a tax-deferred balance into Roth over a fixed spread of years,
/// paying ordinary tax on each conversion as it happens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionPlan {
    pub deferred_balance: f64,
    pub start_year: i32,
    pub end_year: i32,
    pub spread_years: u32,
    pub social_security_start_year: i32,
    pub social_security_amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionOutcome {
    pub spread_years: u32,
    pub final_deferred: f64,
    pub final_roth: f64,
    pub total_tax_paid: f64,
    pub net_wealth: f64,
}

pub fn simulate_conversion_plan(inputs: &PlanInputs, plan: &ConversionPlan) -> ConversionOutcome {
    let mut deferred = plan.deferred_balance;
    let mut roth = 0.0;
    let mut total_tax_paid = 0.0;

    // Balances compound at the real rate so conversion amounts stay
    // comparable in today's dollars across the whole ladder.
    let real_growth = inputs.growth_rate - inputs.inflation_rate;
    let annual_conversion = plan.deferred_balance / plan.spread_years as f64;

    for year in plan.start_year..=plan.end_year {
        let ss_income = if year >= plan.social_security_start_year {
            plan.social_security_amount
        } else {
            0.0
        };

        // Social Security covers part of the income need, so the conversion
        // shrinks by that much once it starts.
        let withdrawal = if ss_income > 0.0 {
            (annual_conversion - ss_income).max(0.0)
        } else {
            annual_conversion
        };
        let withdrawal = withdrawal.min(deferred);

        let income = IncomeBreakdown {
            deferred_distribution: withdrawal,
            social_security: ss_income,
            ordinary_dividend: inputs.base_ordinary_dividend,
            ..IncomeBreakdown::default()
        };
        let tax_paid = calculate_tax(&income, inputs.filing_status, &inputs.tax_config).total_tax;
        total_tax_paid += tax_paid;

        deferred -= withdrawal;
        roth += withdrawal;
        deferred *= 1.0 + real_growth;
        roth *= 1.0 + real_growth;
    }

    let assets = AssetPortfolio {
        deferred,
        roth,
        rsu: 0.0,
        rsu_basis: 0.0,
        brokerage: 0.0,
        brokerage_basis: 0.0,
    };

    ConversionOutcome {
        spread_years: plan.spread_years,
        final_deferred: deferred,
        final_roth: roth,
        total_tax_paid,
        net_wealth: tax_free_wealth(&assets) - total_tax_paid,
    }
}

pub fn sweep_conversion_spreads(
    inputs: &PlanInputs,
    plan: &ConversionPlan,
    spreads: RangeInclusive<u32>,
) -> Vec<ConversionOutcome> {
    spreads
        .map(|spread_years| {
            simulate_conversion_plan(
                inputs,
                &ConversionPlan {
                    spread_years,
                    ..*plan
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::simulator::DEFERRED_HEIR_EFFICIENCY;
    use crate::core::test_fixtures::flat_inputs;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn base_plan() -> ConversionPlan {
        ConversionPlan {
            deferred_balance: 100_000.0,
            start_year: 2025,
            end_year: 2025,
            spread_years: 1,
            social_security_start_year: 2100,
            social_security_amount: 0.0,
        }
    }

    #[test]
    fn single_year_conversion_moves_the_whole_balance() {
        let inputs = flat_inputs();
        let outcome = simulate_conversion_plan(&inputs, &base_plan());

        let tax = calculate_tax(
            &IncomeBreakdown {
                deferred_distribution: 100_000.0,
                ..IncomeBreakdown::default()
            },
            inputs.filing_status,
            &inputs.tax_config,
        )
        .total_tax;

        assert_approx(outcome.final_deferred, 0.0, EPS);
        assert_approx(outcome.final_roth, 100_000.0, EPS);
        assert_approx(outcome.total_tax_paid, tax, EPS);
        assert_approx(outcome.net_wealth, 100_000.0 - tax, EPS);
    }

    #[test]
    fn social_security_offsets_the_conversion_once_it_starts() {
        let inputs = flat_inputs();
        let plan = ConversionPlan {
            end_year: 2026,
            spread_years: 2,
            social_security_start_year: 2026,
            social_security_amount: 20_000.0,
            ..base_plan()
        };
        let outcome = simulate_conversion_plan(&inputs, &plan);

        // 50k converted in 2025, 30k in 2026.
        assert_approx(outcome.final_roth, 80_000.0, EPS);
        assert_approx(outcome.final_deferred, 20_000.0, EPS);
        assert!(outcome.total_tax_paid > 0.0);
    }

    #[test]
    fn conversion_is_capped_at_the_remaining_balance() {
        let inputs = flat_inputs();
        let plan = ConversionPlan {
            end_year: 2026,
            spread_years: 1,
            ..base_plan()
        };
        let outcome = simulate_conversion_plan(&inputs, &plan);
        assert_approx(outcome.final_roth, 100_000.0, EPS);
        assert_approx(outcome.final_deferred, 0.0, EPS);
    }

    #[test]
    fn net_wealth_discounts_whatever_never_converted() {
        let inputs = flat_inputs();
        // A spread longer than the window leaves part of the balance behind.
        let plan = ConversionPlan {
            spread_years: 4,
            ..base_plan()
        };
        let outcome = simulate_conversion_plan(&inputs, &plan);

        assert_approx(outcome.final_roth, 25_000.0, EPS);
        assert_approx(outcome.final_deferred, 75_000.0, EPS);
        assert_approx(
            outcome.net_wealth,
            25_000.0 + 75_000.0 * DEFERRED_HEIR_EFFICIENCY - outcome.total_tax_paid,
            EPS,
        );
    }

    #[test]
    fn sweep_returns_one_outcome_per_spread() {
        let inputs = flat_inputs();
        let outcomes = sweep_conversion_spreads(&inputs, &base_plan(), 5..=10);
        assert_eq!(outcomes.len(), 6);
        for (outcome, spread) in outcomes.iter().zip(5u32..=10) {
            assert_eq!(outcome.spread_years, spread);
        }
    }
}
