// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod backend;
pub mod binder;
pub mod catalog;
pub mod coordinator;
pub mod error;
pub mod forms;
pub mod ids;
pub mod model;
pub mod selection;
pub mod state;

pub use backend::*;
pub use binder::*;
pub use catalog::*;
pub use coordinator::*;
pub use error::*;
pub use forms::*;
pub use ids::*;
pub use model::*;
pub use selection::*;
pub use state::*;
