mod conversion;
mod error;
mod schedule;
mod search;
mod simulator;
mod types;

pub use conversion::{
    ConversionOutcome, ConversionPlan, simulate_conversion_plan, sweep_conversion_spreads,
};
pub use error::{PlanError, PlanResult};
pub use schedule::{WithdrawalSchedule, consolidated_schedule, single_asset_schedule};
pub use search::{SearchGrid, SearchReport, StrategyOutcome, evaluate_strategy, search_strategies};
pub use simulator::{
    DEFERRED_HEIR_EFFICIENCY, HorizonOutcome, SchedulePhaseResult, simulate_post_schedule_phase,
    simulate_schedule_phase, tax_free_wealth,
};
pub use types::{AssetPortfolio, PlanInputs, YearRecord, YearWindow};

#[cfg(test)]
pub(crate) mod test_fixtures {
    use super::types::PlanInputs;
    use crate::tax::{FilingStatus, config_for_year};

    pub fn sample_inputs() -> PlanInputs {
        PlanInputs {
            filing_status: FilingStatus::MarriedJointly,
            tax_config: config_for_year(2024, None),
            current_year: 2025,
            growth_rate: 0.06,
            inflation_rate: 0.03,
            annual_income_need: 200_000.0,
            base_ordinary_dividend: 50_000.0,
            capital_gains_rate: 0.20,
            deferred_growth_rate: 0.06,
            roth_growth_rate: 0.06,
            rsu_growth_rate: 0.048,
            brokerage_growth_rate: 0.06,
        }
    }

    /// No growth, no inflation, no side income: every dollar of movement in
    /// a test is attributable to the rule under test.
    pub fn flat_inputs() -> PlanInputs {
        let mut inputs = sample_inputs();
        inputs.growth_rate = 0.0;
        inputs.inflation_rate = 0.0;
        inputs.base_ordinary_dividend = 0.0;
        inputs.deferred_growth_rate = 0.0;
        inputs.roth_growth_rate = 0.0;
        inputs.rsu_growth_rate = 0.0;
        inputs.brokerage_growth_rate = 0.0;
        inputs
    }
}
