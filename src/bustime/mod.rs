// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! CTA Bus Tracker (BusTime) API integration

mod client;
mod types;

pub use client::{BusTimeApi, BusTimeClient};
