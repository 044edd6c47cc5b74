use serde::Serialize;

use crate::tax::{FilingStatus, TaxYearConfig};

/// Everything one plan evaluation needs, threaded explicitly so that
/// concurrent evaluations never share mutable state.
#[derive(Debug, Clone)]
pub struct PlanInputs {
    pub filing_status: FilingStatus,
    pub tax_config: TaxYearConfig,
    pub current_year: i32,
    pub growth_rate: f64,
    pub inflation_rate: f64,
    pub annual_income_need: f64,
    pub base_ordinary_dividend: f64,
    pub capital_gains_rate: f64,
    pub deferred_growth_rate: f64,
    pub roth_growth_rate: f64,
    pub rsu_growth_rate: f64,
    pub brokerage_growth_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPortfolio {
    pub deferred: f64,
    pub roth: f64,
    pub rsu: f64,
    pub rsu_basis: f64,
    pub brokerage: f64,
    pub brokerage_basis: f64,
}

impl AssetPortfolio {
    pub fn invested_total(&self) -> f64 {
        self.deferred + self.roth + self.rsu + self.brokerage
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearWindow {
    pub start: i32,
    pub end: i32,
}

impl YearWindow {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

/// One simulated year, captured when the caller supplies a trace sink.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearRecord {
    pub year: i32,
    pub adjusted_need: f64,
    pub deferred_withdrawal: f64,
    pub rsu_withdrawal: f64,
    pub brokerage_withdrawal: f64,
    pub roth_withdrawal: f64,
    pub tax_paid: f64,
    pub net_income: f64,
    pub end_deferred: f64,
    pub end_roth: f64,
    pub end_rsu: f64,
    pub end_brokerage: f64,
}
