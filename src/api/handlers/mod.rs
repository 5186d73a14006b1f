// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

mod health;
mod routes;

pub use health::health_check;
pub use routes::{list_routes, route_data};
