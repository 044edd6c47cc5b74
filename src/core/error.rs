use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlanError {
    #[error("withdrawal start year {start} is before the current year {current}")]
    StartBeforeCurrentYear { start: i32, current: i32 },

    #[error("withdrawal end year {end} is before the start year {start}")]
    EndBeforeStartYear { start: i32, end: i32 },

    #[error(
        "tax-deferred account still holds {balance:.0} at the end of the schedule, above the {guard:.0} depletion guard"
    )]
    DeferredNotDepleted { balance: f64, guard: f64 },

    #[error(
        "restricted-stock account still holds {balance:.0} at the end of the schedule, above the {guard:.0} depletion guard"
    )]
    RsuNotDepleted { balance: f64, guard: f64 },
}

pub type PlanResult<T> = Result<T, PlanError>;
