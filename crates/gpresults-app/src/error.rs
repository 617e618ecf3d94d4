// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    #[error("unknown view kind {key:?} -- choose one of the listed result views")]
    UnknownViewKind { key: String },

    #[error("fetch for {key} failed: {message}")]
    FetchFailure { key: String, message: String },

    #[error("{key} returned no results")]
    EmptyResult { key: String },

    #[error("embedding into {target} failed: {message}")]
    Embed { target: String, message: String },

    #[error("{key} is a table view and takes no parameters")]
    NotAPlotView { key: String },

    #[error("{key} has no {filter} filter")]
    UnknownFilter { key: String, filter: String },

    #[error("invalid {filter} value {value:?}; expected a number")]
    InvalidFilterValue { filter: String, value: String },

    #[error("invalid scenario id {0:?}; expected a positive integer")]
    InvalidScenarioId(String),
}

pub type ViewResult<T> = Result<T, ViewError>;
