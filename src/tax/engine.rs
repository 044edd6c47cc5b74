use serde::Serialize;

use super::config::{FilingStatus, TaxBracket, TaxYearConfig};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct IncomeBreakdown {
    pub salary: f64,
    pub rental_net_income: f64,
    /// Total ordinary dividends, inclusive of the qualified portion.
    pub ordinary_dividend: f64,
    pub qualified_dividend: f64,
    pub short_term_gain: f64,
    pub long_term_gain: f64,
    pub deferred_distribution: f64,
    pub social_security: f64,
    pub deferred_compensation: f64,
}

impl IncomeBreakdown {
    // Qualified dividends are already counted inside ordinary_dividend, and
    // Social Security enters separately through its taxability rule.
    pub fn gross_income_before_social_security(&self) -> f64 {
        self.salary
            + self.rental_net_income
            + self.ordinary_dividend
            + self.short_term_gain
            + self.long_term_gain
            + self.deferred_distribution
            + self.deferred_compensation
    }

    pub fn is_zero(&self) -> bool {
        self.gross_income_before_social_security() <= 0.0 && self.social_security <= 0.0
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxResult {
    pub federal_taxable_income: f64,
    pub federal_income_tax: f64,
    pub state_taxable_income: f64,
    pub state_tax: f64,
    pub taxable_social_security: f64,
    pub medicare_surtax: f64,
    pub net_investment_income_tax: f64,
    pub total_federal_tax: f64,
    pub total_tax: f64,
    pub effective_federal_rate: f64,
    pub effective_state_rate: f64,
    pub combined_effective_rate: f64,
    pub total_income: f64,
}

pub fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

fn bracket_walk(taxable_income: f64, brackets: &[TaxBracket]) -> f64 {
    let mut remaining = taxable_income;
    let mut tax = 0.0;
    for bracket in brackets {
        if remaining <= 0.0 {
            break;
        }
        let width = if bracket.upper.is_infinite() {
            f64::INFINITY
        } else {
            bracket.upper - bracket.lower + 1.0
        };
        let amount_in_bracket = remaining.min(width);
        tax += amount_in_bracket * bracket.rate;
        remaining -= amount_in_bracket;
    }
    tax
}

// The preferential rate is selected by where the total taxable income lands,
// then applied flat to the whole preferential pool. This deliberately skips
// stacking the pool across its own bracket boundaries.
fn preferential_rate(total_taxable_income: f64, brackets: &[TaxBracket]) -> f64 {
    for bracket in brackets {
        if bracket.lower <= total_taxable_income
            && (total_taxable_income <= bracket.upper || bracket.upper.is_infinite())
        {
            return bracket.rate;
        }
    }
    0.0
}

pub fn federal_income_tax(
    taxable_income: f64,
    status: FilingStatus,
    preferential_income: f64,
    config: &TaxYearConfig,
) -> f64 {
    let taxed_preferentially = preferential_income.min(taxable_income);
    let rate = preferential_rate(
        taxable_income,
        config.federal_preferential_brackets.get(status),
    );
    let preferential_tax = taxed_preferentially * rate;

    let ordinary_taxable = taxable_income - taxed_preferentially;
    let ordinary_tax = bracket_walk(ordinary_taxable, config.federal_ordinary_brackets.get(status));

    round_to_cents(ordinary_tax + preferential_tax)
}

pub fn state_income_tax(taxable_income: f64, status: FilingStatus, config: &TaxYearConfig) -> f64 {
    // California taxes capital gains and qualified dividends as ordinary
    // income, so there is no preferential carve-out here.
    round_to_cents(bracket_walk(taxable_income, config.state_brackets.get(status)))
}

pub fn additional_medicare_tax(wages: f64, status: FilingStatus, config: &TaxYearConfig) -> f64 {
    let threshold = *config.medicare_surtax_threshold.get(status);
    let excess_wages = (wages - threshold).max(0.0);
    round_to_cents(excess_wages * config.rates.medicare_additional)
}

pub fn net_investment_income_tax(
    income: &IncomeBreakdown,
    status: FilingStatus,
    federal_agi: f64,
    config: &TaxYearConfig,
) -> f64 {
    // Deferred-account distributions, deferred compensation, and Social
    // Security are not investment income.
    let net_investment_income = income.ordinary_dividend
        + income.short_term_gain
        + income.long_term_gain
        + income.rental_net_income;

    let excess_agi = (federal_agi - config.niit_threshold.get(status)).max(0.0);
    let base = net_investment_income.min(excess_agi);
    round_to_cents(base * config.rates.niit)
}

pub fn social_security_taxable_portion(
    ss_benefit: f64,
    gross_income_before_ss: f64,
    status: FilingStatus,
    config: &TaxYearConfig,
) -> f64 {
    if ss_benefit <= 0.0 {
        return 0.0;
    }

    let thresholds = config.social_security_thresholds.get(status);
    let lower_rate = config.rates.ss_inclusion_lower;
    let upper_rate = config.rates.ss_inclusion_upper;

    let combined_income = gross_income_before_ss + lower_rate * ss_benefit;

    let taxable = if combined_income <= thresholds.first {
        0.0
    } else if combined_income <= thresholds.second {
        (lower_rate * ss_benefit).min(lower_rate * (combined_income - thresholds.first))
    } else {
        (upper_rate * ss_benefit).min(
            upper_rate * (combined_income - thresholds.second)
                + lower_rate * (thresholds.second - thresholds.first),
        )
    };

    taxable.clamp(0.0, upper_rate * ss_benefit)
}

pub fn calculate_tax(
    income: &IncomeBreakdown,
    status: FilingStatus,
    config: &TaxYearConfig,
) -> TaxResult {
    let gross_before_ss = income.gross_income_before_social_security();

    let taxable_social_security =
        social_security_taxable_portion(income.social_security, gross_before_ss, status, config);

    let federal_agi = gross_before_ss + taxable_social_security;
    let federal_taxable_income =
        (federal_agi - config.federal_standard_deduction.get(status)).max(0.0);

    // Only the portion of the preferential pool that is actually part of the
    // year's income can reach the preferential rates.
    let preferential_pool = income.qualified_dividend + income.long_term_gain;
    let preferential_income = preferential_pool.min(federal_agi);

    let federal_income_tax =
        federal_income_tax(federal_taxable_income, status, preferential_income, config);
    let medicare_surtax = additional_medicare_tax(income.salary, status, config);
    let niit = net_investment_income_tax(income, status, federal_agi, config);
    let total_federal_tax = federal_income_tax + medicare_surtax + niit;

    // The state never taxes Social Security.
    let state_agi = gross_before_ss;
    let state_taxable_income = (state_agi - config.state_standard_deduction.get(status)).max(0.0);
    let state_tax = state_income_tax(state_taxable_income, status, config);

    let total_income = gross_before_ss + income.social_security;
    let total_tax = total_federal_tax + state_tax;

    let effective_rate = |tax: f64| {
        if total_income > 0.0 {
            tax / total_income * 100.0
        } else {
            0.0
        }
    };

    TaxResult {
        federal_taxable_income: round_to_cents(federal_taxable_income),
        federal_income_tax: round_to_cents(federal_income_tax),
        state_taxable_income: round_to_cents(state_taxable_income),
        state_tax: round_to_cents(state_tax),
        taxable_social_security: round_to_cents(taxable_social_security),
        medicare_surtax: round_to_cents(medicare_surtax),
        net_investment_income_tax: round_to_cents(niit),
        total_federal_tax: round_to_cents(total_federal_tax),
        total_tax: round_to_cents(total_tax),
        effective_federal_rate: round_to_cents(effective_rate(total_federal_tax)),
        effective_state_rate: round_to_cents(effective_rate(state_tax)),
        combined_effective_rate: round_to_cents(effective_rate(total_tax)),
        total_income: round_to_cents(total_income),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::config::config_for_year;
    use proptest::prelude::{prop_assert, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn zero_taxable_income_owes_zero_federal_tax() {
        let config = config_for_year(2024, None);
        for status in FilingStatus::ALL {
            assert_approx(federal_income_tax(0.0, status, 0.0, &config), 0.0);
            assert_approx(state_income_tax(0.0, status, &config), 0.0);
        }
    }

    #[test]
    fn federal_tax_walks_brackets_bottom_up() {
        let config = config_for_year(2024, None);
        // 30_000 for a single filer: 11_601 at 10%, the rest at 12%.
        let expected = 11_601.0 * 0.10 + (30_000.0 - 11_601.0) * 0.12;
        assert_approx(
            federal_income_tax(30_000.0, FilingStatus::Single, 0.0, &config),
            round_to_cents(expected),
        );
    }

    #[test]
    fn preferential_rate_is_selected_by_total_income() {
        let config = config_for_year(2024, None);
        // Total income in the 15% preferential bracket for a single filer,
        // even though the preferential amount alone would sit in the 0% one.
        let tax_with_pref = federal_income_tax(100_000.0, FilingStatus::Single, 20_000.0, &config);
        let ordinary_only = federal_income_tax(80_000.0, FilingStatus::Single, 0.0, &config);
        assert_approx(tax_with_pref, round_to_cents(ordinary_only + 20_000.0 * 0.15));
    }

    #[test]
    fn preferential_income_is_capped_at_taxable_income() {
        let config = config_for_year(2024, None);
        // Everything is preferential: no ordinary tax remains.
        let tax = federal_income_tax(50_000.0, FilingStatus::Single, 80_000.0, &config);
        assert_approx(tax, round_to_cents(50_000.0 * 0.15));
    }

    #[test]
    fn medicare_surtax_applies_above_the_wage_threshold() {
        let config = config_for_year(2024, None);
        assert_approx(
            additional_medicare_tax(300_000.0, FilingStatus::Single, &config),
            900.0,
        );
        assert_approx(
            additional_medicare_tax(150_000.0, FilingStatus::Single, &config),
            0.0,
        );
    }

    #[test]
    fn niit_taxes_the_lesser_of_investment_income_and_excess_agi() {
        let config = config_for_year(2024, None);
        let income = IncomeBreakdown {
            ordinary_dividend: 60_000.0,
            ..IncomeBreakdown::default()
        };
        let niit =
            net_investment_income_tax(&income, FilingStatus::MarriedJointly, 280_000.0, &config);
        assert_approx(niit, round_to_cents(30_000.0 * 0.038));

        let below =
            net_investment_income_tax(&income, FilingStatus::MarriedJointly, 200_000.0, &config);
        assert_approx(below, 0.0);
    }

    #[test]
    fn social_security_three_tier_rule() {
        let config = config_for_year(2024, None);
        let status = FilingStatus::MarriedJointly;

        // Combined income below the first threshold.
        assert_approx(
            social_security_taxable_portion(10_000.0, 20_000.0, status, &config),
            0.0,
        );

        // Middle tier: 50% of the excess over the first threshold.
        assert_approx(
            social_security_taxable_portion(20_000.0, 30_000.0, status, &config),
            4_000.0,
        );

        // Top tier clamps at 85% of the benefit.
        assert_approx(
            social_security_taxable_portion(80_000.0, 150_000.0, status, &config),
            68_000.0,
        );

        assert_approx(
            social_security_taxable_portion(0.0, 150_000.0, status, &config),
            0.0,
        );
    }

    #[test]
    fn retirement_income_regression_married_jointly_2024() {
        let config = config_for_year(2024, None);
        let income = IncomeBreakdown {
            deferred_distribution: 100_000.0,
            social_security: 80_000.0,
            ordinary_dividend: 50_000.0,
            ..IncomeBreakdown::default()
        };

        let result = calculate_tax(&income, FilingStatus::MarriedJointly, &config);

        assert_approx(result.taxable_social_security, 68_000.0);
        assert_approx(result.federal_taxable_income, 188_800.0);
        assert_approx(result.federal_income_tax, 31_641.88);
        assert_approx(result.medicare_surtax, 0.0);
        assert_approx(result.net_investment_income_tax, 0.0);
        assert_approx(result.total_federal_tax, 31_641.88);
        assert_approx(result.state_taxable_income, 138_920.0);
        assert_approx(result.state_tax, 6_034.01);
        assert_approx(result.total_tax, 37_675.89);
        assert_approx(result.total_income, 230_000.0);
        assert_approx(result.effective_federal_rate, 13.76);
        assert_approx(result.effective_state_rate, 2.62);
        assert_approx(result.combined_effective_rate, 16.38);
    }

    #[test]
    fn zero_income_has_zero_effective_rates() {
        let config = config_for_year(2024, None);
        let result = calculate_tax(
            &IncomeBreakdown::default(),
            FilingStatus::Single,
            &config,
        );
        assert_approx(result.total_tax, 0.0);
        assert_approx(result.combined_effective_rate, 0.0);
    }

    proptest! {
        #[test]
        fn prop_federal_and_state_tax_are_monotone_in_taxable_income(
            base in 0u32..1_500_000,
            bump in 1u32..250_000,
            status_index in 0usize..4
        ) {
            let config = config_for_year(2024, None);
            let status = FilingStatus::ALL[status_index];
            let lower = base as f64;
            let higher = (base + bump) as f64;

            prop_assert!(
                federal_income_tax(higher, status, 0.0, &config)
                    >= federal_income_tax(lower, status, 0.0, &config)
            );
            prop_assert!(
                state_income_tax(higher, status, &config)
                    >= state_income_tax(lower, status, &config)
            );
        }

        #[test]
        fn prop_social_security_portion_is_monotone_and_bounded(
            benefit in 0u32..200_000,
            benefit_bump in 0u32..50_000,
            gross in 0u32..500_000,
            gross_bump in 0u32..100_000,
            status_index in 0usize..4
        ) {
            let config = config_for_year(2024, None);
            let status = FilingStatus::ALL[status_index];
            let benefit = benefit as f64;
            let gross = gross as f64;

            let portion = social_security_taxable_portion(benefit, gross, status, &config);
            prop_assert!(portion >= 0.0);
            prop_assert!(portion <= 0.85 * benefit + 1e-9);

            let more_benefit = social_security_taxable_portion(
                benefit + benefit_bump as f64,
                gross,
                status,
                &config,
            );
            prop_assert!(more_benefit + 1e-9 >= portion);

            let more_gross = social_security_taxable_portion(
                benefit,
                gross + gross_bump as f64,
                status,
                &config,
            );
            prop_assert!(more_gross + 1e-9 >= portion);
        }
    }
}
