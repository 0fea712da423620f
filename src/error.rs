use thiserror::Error;

// Every way a scheduling request can fail after it has parsed as JSON.
// The HTTP layer turns any of these into the {"err": "..."} envelope.
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("unknown time zone: {0}")]
    UnknownTimeZone(String),

    #[error("weeklyTaskBlocks must have 7 entries (Sunday through Saturday), got {0}")]
    MalformedWeeklyBlocks(usize),

    #[error("estimated hours must be positive for task: {0}")]
    InvalidEstimatedHours(String),

    #[error("deadline in the past for task: {0}")]
    DeadlineInPast(String),

    #[error("start on or after is past the end of the schedule for task: {0}")]
    StartBeyondHorizon(String),

    #[error("could not solve linear program: {0}")]
    Solver(String),

    #[error("linear program assigned hour {hour} of task {task} the fractional value {value}")]
    NonIntegralSolution {
        hour: usize,
        task: usize,
        value: f64,
    },
}
