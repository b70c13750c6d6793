use thiserror::Error;

/// Errors produced while configuring or driving a training run
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    #[error("action set must contain at least one action")]
    EmptyActionSet,

    #[error("action {action} appears more than once in the action set")]
    DuplicateAction { action: String },

    #[error("episode length must be a positive number of steps")]
    InvalidTotalSteps,

    #[error("invalid value for `{name}`: {value} is outside {}{min}, {max}]", lower_bracket(.min_inclusive))]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
        min_inclusive: bool,
    },

    #[error("unsupported action {action}")]
    InvalidAction { action: i64 },

    #[error("episode is finished, call `reset` before stepping again")]
    EpisodeFinished,
}

fn lower_bracket(inclusive: &bool) -> &'static str {
    if *inclusive {
        "["
    } else {
        "("
    }
}

pub type Result<T> = std::result::Result<T, Error>;
