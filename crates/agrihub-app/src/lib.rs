// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod catalogue;
pub mod chart;
pub mod chat;
pub mod comparison;
pub mod forms;
pub mod ids;
pub mod model;
pub mod soil;
pub mod sort;
pub mod state;

pub use catalogue::*;
pub use chart::*;
pub use chat::*;
pub use comparison::*;
pub use forms::*;
pub use ids::*;
pub use model::*;
pub use soil::*;
pub use sort::*;
pub use state::*;
