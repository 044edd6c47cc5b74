use log::warn;

pub const BASE_YEAR: i32 = 2024;
pub const DEFAULT_INFLATION_RATE: f64 = 0.03;

const UNBOUNDED: f64 = f64::INFINITY;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum FilingStatus {
    Single,
    MarriedJointly,
    MarriedSeparately,
    HeadOfHousehold,
}

impl FilingStatus {
    pub const ALL: [FilingStatus; 4] = [
        FilingStatus::Single,
        FilingStatus::MarriedJointly,
        FilingStatus::MarriedSeparately,
        FilingStatus::HeadOfHousehold,
    ];
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TaxBracket {
    pub lower: f64,
    pub upper: f64,
    pub rate: f64,
}

/// One value per filing status, so every table structurally covers all four.
#[derive(Clone, Debug, PartialEq)]
pub struct ByStatus<T> {
    pub single: T,
    pub married_jointly: T,
    pub married_separately: T,
    pub head_of_household: T,
}

impl<T> ByStatus<T> {
    pub fn get(&self, status: FilingStatus) -> &T {
        match status {
            FilingStatus::Single => &self.single,
            FilingStatus::MarriedJointly => &self.married_jointly,
            FilingStatus::MarriedSeparately => &self.married_separately,
            FilingStatus::HeadOfHousehold => &self.head_of_household,
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> ByStatus<U> {
        ByStatus {
            single: f(&self.single),
            married_jointly: f(&self.married_jointly),
            married_separately: f(&self.married_separately),
            head_of_household: f(&self.head_of_household),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SocialSecurityThresholds {
    pub first: f64,
    pub second: f64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FlatRates {
    pub medicare_additional: f64,
    pub niit: f64,
    pub ss_inclusion_lower: f64,
    pub ss_inclusion_upper: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TaxYearConfig {
    pub year: i32,
    pub federal_standard_deduction: ByStatus<f64>,
    pub state_standard_deduction: ByStatus<f64>,
    pub federal_ordinary_brackets: ByStatus<Vec<TaxBracket>>,
    pub federal_preferential_brackets: ByStatus<Vec<TaxBracket>>,
    pub state_brackets: ByStatus<Vec<TaxBracket>>,
    pub medicare_surtax_threshold: ByStatus<f64>,
    pub niit_threshold: ByStatus<f64>,
    pub social_security_thresholds: ByStatus<SocialSecurityThresholds>,
    pub rates: FlatRates,
}

pub fn hand_authored_years() -> Vec<i32> {
    vec![2023, 2024]
}

pub fn config_for_year(year: i32, inflation_override: Option<f64>) -> TaxYearConfig {
    if hand_authored_years().contains(&year) {
        // A zero-year inflation adjustment is the identity on these integer
        // tables, so an override on a hand-authored year returns it verbatim.
        return match year {
            2023 => config_2023(),
            _ => config_2024(),
        };
    }

    if year > BASE_YEAR {
        let rate = inflation_override.unwrap_or(DEFAULT_INFLATION_RATE);
        return synthesize_config(year, rate);
    }

    warn!("no tax configuration for year {year}; falling back to the {BASE_YEAR} tables");
    config_2024()
}

/// Dollar amounts compound at the inflation rate and round half-to-even to
/// the nearest dollar; at or before the base year they truncate instead.
pub fn adjust_for_inflation(amount: f64, years_from_base: i32, inflation_rate: f64) -> f64 {
    if years_from_base <= 0 {
        return amount.trunc();
    }
    (amount * (1.0 + inflation_rate).powi(years_from_base)).round_ties_even()
}

fn adjust_brackets(brackets: &[TaxBracket], years_from_base: i32, rate: f64) -> Vec<TaxBracket> {
    brackets
        .iter()
        .map(|b| TaxBracket {
            lower: adjust_for_inflation(b.lower, years_from_base, rate),
            upper: if b.upper.is_infinite() {
                b.upper
            } else {
                adjust_for_inflation(b.upper, years_from_base, rate)
            },
            rate: b.rate,
        })
        .collect()
}

fn synthesize_config(target_year: i32, rate: f64) -> TaxYearConfig {
    let base = config_2024();
    let years = target_year - BASE_YEAR;

    TaxYearConfig {
        year: target_year,
        federal_standard_deduction: base
            .federal_standard_deduction
            .map(|d| adjust_for_inflation(*d, years, rate)),
        state_standard_deduction: base
            .state_standard_deduction
            .map(|d| adjust_for_inflation(*d, years, rate)),
        federal_ordinary_brackets: base
            .federal_ordinary_brackets
            .map(|b| adjust_brackets(b, years, rate)),
        federal_preferential_brackets: base
            .federal_preferential_brackets
            .map(|b| adjust_brackets(b, years, rate)),
        state_brackets: base.state_brackets.map(|b| adjust_brackets(b, years, rate)),
        medicare_surtax_threshold: base
            .medicare_surtax_threshold
            .map(|t| adjust_for_inflation(*t, years, rate)),
        niit_threshold: base
            .niit_threshold
            .map(|t| adjust_for_inflation(*t, years, rate)),
        social_security_thresholds: base.social_security_thresholds.map(|t| {
            SocialSecurityThresholds {
                first: adjust_for_inflation(t.first, years, rate),
                second: adjust_for_inflation(t.second, years, rate),
            }
        }),
        rates: base.rates,
    }
}

fn table(rows: &[(f64, f64, f64)]) -> Vec<TaxBracket> {
    rows.iter()
        .map(|&(lower, upper, rate)| TaxBracket { lower, upper, rate })
        .collect()
}

// Bracket rows use inclusive integer dollar bounds; each lower bound is the
// previous upper bound plus one and the top bracket is unbounded.
fn config_2024() -> TaxYearConfig {
    TaxYearConfig {
        year: 2024,
        federal_standard_deduction: ByStatus {
            single: 14_600.0,
            married_jointly: 29_200.0,
            married_separately: 14_600.0,
            head_of_household: 21_900.0,
        },
        state_standard_deduction: ByStatus {
            single: 5_540.0,
            married_jointly: 11_080.0,
            married_separately: 5_540.0,
            head_of_household: 11_080.0,
        },
        federal_ordinary_brackets: ByStatus {
            single: table(&[
                (0.0, 11_600.0, 0.10),
                (11_601.0, 47_150.0, 0.12),
                (47_151.0, 100_525.0, 0.22),
                (100_526.0, 191_950.0, 0.24),
                (191_951.0, 243_725.0, 0.32),
                (243_726.0, 609_350.0, 0.35),
                (609_351.0, UNBOUNDED, 0.37),
            ]),
            married_jointly: table(&[
                (0.0, 23_200.0, 0.10),
                (23_201.0, 94_300.0, 0.12),
                (94_301.0, 201_050.0, 0.22),
                (201_051.0, 383_900.0, 0.24),
                (383_901.0, 487_450.0, 0.32),
                (487_451.0, 731_200.0, 0.35),
                (731_201.0, UNBOUNDED, 0.37),
            ]),
            married_separately: table(&[
                (0.0, 11_600.0, 0.10),
                (11_601.0, 47_150.0, 0.12),
                (47_151.0, 100_525.0, 0.22),
                (100_526.0, 191_950.0, 0.24),
                (191_951.0, 243_725.0, 0.32),
                (243_726.0, 365_600.0, 0.35),
                (365_601.0, UNBOUNDED, 0.37),
            ]),
            head_of_household: table(&[
                (0.0, 16_550.0, 0.10),
                (16_551.0, 63_100.0, 0.12),
                (63_101.0, 100_500.0, 0.22),
                (100_501.0, 191_950.0, 0.24),
                (191_951.0, 243_700.0, 0.32),
                (243_701.0, 609_350.0, 0.35),
                (609_351.0, UNBOUNDED, 0.37),
            ]),
        },
        federal_preferential_brackets: ByStatus {
            single: table(&[
                (0.0, 47_025.0, 0.00),
                (47_026.0, 518_900.0, 0.15),
                (518_901.0, UNBOUNDED, 0.20),
            ]),
            married_jointly: table(&[
                (0.0, 94_050.0, 0.00),
                (94_051.0, 583_750.0, 0.15),
                (583_751.0, UNBOUNDED, 0.20),
            ]),
            married_separately: table(&[
                (0.0, 47_025.0, 0.00),
                (47_026.0, 291_850.0, 0.15),
                (291_851.0, UNBOUNDED, 0.20),
            ]),
            head_of_household: table(&[
                (0.0, 63_100.0, 0.00),
                (63_101.0, 551_350.0, 0.15),
                (551_351.0, UNBOUNDED, 0.20),
            ]),
        },
        state_brackets: ByStatus {
            single: table(&[
                (0.0, 10_756.0, 0.01),
                (10_757.0, 25_499.0, 0.02),
                (25_500.0, 40_245.0, 0.04),
                (40_246.0, 55_866.0, 0.06),
                (55_867.0, 70_606.0, 0.08),
                (70_607.0, 360_659.0, 0.093),
                (360_660.0, 432_787.0, 0.103),
                (432_788.0, 721_314.0, 0.113),
                (721_315.0, UNBOUNDED, 0.123),
            ]),
            married_jointly: table(&[
                (0.0, 21_512.0, 0.01),
                (21_513.0, 50_998.0, 0.02),
                (50_999.0, 80_490.0, 0.04),
                (80_491.0, 111_732.0, 0.06),
                (111_733.0, 141_212.0, 0.08),
                (141_213.0, 721_318.0, 0.093),
                (721_319.0, 865_574.0, 0.103),
                (865_575.0, 1_442_628.0, 0.113),
                (1_442_629.0, UNBOUNDED, 0.123),
            ]),
            married_separately: table(&[
                (0.0, 10_756.0, 0.01),
                (10_757.0, 25_499.0, 0.02),
                (25_500.0, 40_245.0, 0.04),
                (40_246.0, 55_866.0, 0.06),
                (55_867.0, 70_606.0, 0.08),
                (70_607.0, 360_659.0, 0.093),
                (360_660.0, 432_787.0, 0.103),
                (432_788.0, 721_314.0, 0.113),
                (721_315.0, UNBOUNDED, 0.123),
            ]),
            head_of_household: table(&[
                (0.0, 21_512.0, 0.01),
                (21_513.0, 50_998.0, 0.02),
                (50_999.0, 80_490.0, 0.04),
                (80_491.0, 111_732.0, 0.06),
                (111_733.0, 141_212.0, 0.08),
                (141_213.0, 721_318.0, 0.093),
                (721_319.0, 865_574.0, 0.103),
                (865_575.0, 1_442_628.0, 0.113),
                (1_442_629.0, UNBOUNDED, 0.123),
            ]),
        },
        medicare_surtax_threshold: ByStatus {
            single: 200_000.0,
            married_jointly: 250_000.0,
            married_separately: 125_000.0,
            head_of_household: 200_000.0,
        },
        niit_threshold: ByStatus {
            single: 200_000.0,
            married_jointly: 250_000.0,
            married_separately: 125_000.0,
            head_of_household: 200_000.0,
        },
        social_security_thresholds: ByStatus {
            single: SocialSecurityThresholds {
                first: 25_000.0,
                second: 34_000.0,
            },
            married_jointly: SocialSecurityThresholds {
                first: 32_000.0,
                second: 44_000.0,
            },
            married_separately: SocialSecurityThresholds {
                first: 25_000.0,
                second: 34_000.0,
            },
            head_of_household: SocialSecurityThresholds {
                first: 25_000.0,
                second: 34_000.0,
            },
        },
        rates: FlatRates {
            medicare_additional: 0.009,
            niit: 0.038,
            ss_inclusion_lower: 0.50,
            ss_inclusion_upper: 0.85,
        },
    }
}

fn config_2023() -> TaxYearConfig {
    TaxYearConfig {
        year: 2023,
        federal_standard_deduction: ByStatus {
            single: 13_850.0,
            married_jointly: 27_700.0,
            married_separately: 13_850.0,
            head_of_household: 20_800.0,
        },
        state_standard_deduction: ByStatus {
            single: 5_202.0,
            married_jointly: 10_404.0,
            married_separately: 5_202.0,
            head_of_household: 10_404.0,
        },
        federal_ordinary_brackets: ByStatus {
            single: table(&[
                (0.0, 11_000.0, 0.10),
                (11_001.0, 44_725.0, 0.12),
                (44_726.0, 95_375.0, 0.22),
                (95_376.0, 182_100.0, 0.24),
                (182_101.0, 231_250.0, 0.32),
                (231_251.0, 578_125.0, 0.35),
                (578_126.0, UNBOUNDED, 0.37),
            ]),
            married_jointly: table(&[
                (0.0, 22_000.0, 0.10),
                (22_001.0, 89_450.0, 0.12),
                (89_451.0, 190_750.0, 0.22),
                (190_751.0, 364_200.0, 0.24),
                (364_201.0, 462_500.0, 0.32),
                (462_501.0, 693_750.0, 0.35),
                (693_751.0, UNBOUNDED, 0.37),
            ]),
            married_separately: table(&[
                (0.0, 11_000.0, 0.10),
                (11_001.0, 44_725.0, 0.12),
                (44_726.0, 95_375.0, 0.22),
                (95_376.0, 182_100.0, 0.24),
                (182_101.0, 231_250.0, 0.32),
                (231_251.0, 346_875.0, 0.35),
                (346_876.0, UNBOUNDED, 0.37),
            ]),
            head_of_household: table(&[
                (0.0, 15_700.0, 0.10),
                (15_701.0, 59_850.0, 0.12),
                (59_851.0, 95_350.0, 0.22),
                (95_351.0, 182_100.0, 0.24),
                (182_101.0, 231_250.0, 0.32),
                (231_251.0, 578_100.0, 0.35),
                (578_101.0, UNBOUNDED, 0.37),
            ]),
        },
        federal_preferential_brackets: ByStatus {
            single: table(&[
                (0.0, 44_625.0, 0.00),
                (44_626.0, 492_300.0, 0.15),
                (492_301.0, UNBOUNDED, 0.20),
            ]),
            married_jointly: table(&[
                (0.0, 89_250.0, 0.00),
                (89_251.0, 553_850.0, 0.15),
                (553_851.0, UNBOUNDED, 0.20),
            ]),
            married_separately: table(&[
                (0.0, 44_625.0, 0.00),
                (44_626.0, 276_900.0, 0.15),
                (276_901.0, UNBOUNDED, 0.20),
            ]),
            head_of_household: table(&[
                (0.0, 59_750.0, 0.00),
                (59_751.0, 523_050.0, 0.15),
                (523_051.0, UNBOUNDED, 0.20),
            ]),
        },
        state_brackets: ByStatus {
            single: table(&[
                (0.0, 10_099.0, 0.01),
                (10_100.0, 23_942.0, 0.02),
                (23_943.0, 37_788.0, 0.04),
                (37_789.0, 52_455.0, 0.06),
                (52_456.0, 66_295.0, 0.08),
                (66_296.0, 338_639.0, 0.093),
                (338_640.0, 406_364.0, 0.103),
                (406_365.0, 677_275.0, 0.113),
                (677_276.0, UNBOUNDED, 0.123),
            ]),
            married_jointly: table(&[
                (0.0, 20_198.0, 0.01),
                (20_199.0, 47_884.0, 0.02),
                (47_885.0, 75_576.0, 0.04),
                (75_577.0, 104_910.0, 0.06),
                (104_911.0, 132_590.0, 0.08),
                (132_591.0, 677_278.0, 0.093),
                (677_279.0, 812_728.0, 0.103),
                (812_729.0, 1_354_550.0, 0.113),
                (1_354_551.0, UNBOUNDED, 0.123),
            ]),
            married_separately: table(&[
                (0.0, 10_099.0, 0.01),
                (10_100.0, 23_942.0, 0.02),
                (23_943.0, 37_788.0, 0.04),
                (37_789.0, 52_455.0, 0.06),
                (52_456.0, 66_295.0, 0.08),
                (66_296.0, 338_639.0, 0.093),
                (338_640.0, 406_364.0, 0.103),
                (406_365.0, 677_275.0, 0.113),
                (677_276.0, UNBOUNDED, 0.123),
            ]),
            head_of_household: table(&[
                (0.0, 20_198.0, 0.01),
                (20_199.0, 47_884.0, 0.02),
                (47_885.0, 75_576.0, 0.04),
                (75_577.0, 104_910.0, 0.06),
                (104_911.0, 132_590.0, 0.08),
                (132_591.0, 677_278.0, 0.093),
                (677_279.0, 812_728.0, 0.103),
                (812_729.0, 1_354_550.0, 0.113),
                (1_354_551.0, UNBOUNDED, 0.123),
            ]),
        },
        medicare_surtax_threshold: ByStatus {
            single: 200_000.0,
            married_jointly: 250_000.0,
            married_separately: 125_000.0,
            head_of_household: 200_000.0,
        },
        niit_threshold: ByStatus {
            single: 200_000.0,
            married_jointly: 250_000.0,
            married_separately: 125_000.0,
            head_of_household: 200_000.0,
        },
        social_security_thresholds: ByStatus {
            single: SocialSecurityThresholds {
                first: 25_000.0,
                second: 34_000.0,
            },
            married_jointly: SocialSecurityThresholds {
                first: 32_000.0,
                second: 44_000.0,
            },
            married_separately: SocialSecurityThresholds {
                first: 25_000.0,
                second: 34_000.0,
            },
            head_of_household: SocialSecurityThresholds {
                first: 25_000.0,
                second: 34_000.0,
            },
        },
        rates: FlatRates {
            medicare_additional: 0.009,
            niit: 0.038,
            ss_inclusion_lower: 0.50,
            ss_inclusion_upper: 0.85,
        },
    }
}
