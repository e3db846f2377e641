// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod ids;
pub mod model;
pub mod page;
pub mod state;
pub mod store;
pub mod view;

pub use ids::*;
pub use model::*;
pub use page::*;
pub use state::*;
pub use store::*;
pub use view::*;
