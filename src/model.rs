// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Domain types for CTA bus route data
//!
//! These are the internal entities the service caches and serves. They are
//! deliberately separate from the wire structs in `bustime::types`, which map
//! the upstream's short JSON field names onto these at the client boundary.

use std::collections::HashMap;

use serde::Serialize;

/// One entry per known route, immutable after the startup load
#[derive(Debug, Clone, Serialize)]
pub struct RouteMetadata {
    pub id: String,
    pub name: String,
}

/// A single point along a route pattern, ordered by `sequence`
#[derive(Debug, Clone, Serialize)]
pub struct Point {
    pub sequence: u32,
    pub lat: f64,
    pub lon: f64,
    /// "S" for a stop, "W" for a waypoint
    pub kind: String,
    pub stop_id: Option<String>,
    pub stop_name: Option<String>,
    pub distance_along_pattern: u32,
}

/// The ordered geometry of one service pattern on a route
#[derive(Debug, Clone, Serialize)]
pub struct Pattern {
    pub pattern_id: u32,
    pub length: u32,
    pub direction_label: String,
    pub points: Vec<Point>,
}

/// A physical stop served by a route in one direction
#[derive(Debug, Clone, Serialize)]
pub struct Stop {
    pub stop_id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

/// An arrival/departure prediction, tied to exactly one vehicle by `vehicle_id`
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub timestamp: String,
    pub kind: String,
    pub stop_id: String,
    pub stop_name: String,
    pub vehicle_id: String,
    pub distance_to_stop: u32,
    pub route_id: String,
    pub direction: String,
    pub destination: String,
    pub predicted_time: String,
    pub delayed: bool,
    /// Minutes until arrival as reported upstream ("5", "DUE", "DLY")
    pub countdown: String,
    pub zone: String,
}

/// A tracked vehicle with its predictions attached.
///
/// Replaced wholesale on every refresh, never updated field by field.
/// Latitude/longitude stay strings because that is how the upstream
/// reports them for vehicles.
#[derive(Debug, Clone, Serialize)]
pub struct Vehicle {
    pub vehicle_id: String,
    pub timestamp: String,
    pub lat: String,
    pub lon: String,
    pub heading: String,
    pub pattern_id: u32,
    pub route_id: String,
    pub destination: String,
    pub distance_along_pattern: u32,
    pub delayed: bool,
    pub trip_id: String,
    pub orig_trip_no: String,
    pub block_id: String,
    pub zone: String,
    pub predictions: Vec<Prediction>,
}

/// Rarely-changing data for one route: directions, patterns, stops.
///
/// Created once per route and cached for the process lifetime; never
/// mutated after creation.
#[derive(Debug, Clone, Serialize)]
pub struct EvergreenRouteRecord {
    pub directions: Vec<String>,
    pub patterns: Vec<Pattern>,
    pub stops_by_direction: HashMap<String, Vec<Stop>>,
}

/// Fast-changing data for one route, rebuilt on every refresh cycle
#[derive(Debug, Clone, Serialize)]
pub struct RealTimeRouteRecord {
    pub route_id: String,
    pub name: String,
    pub vehicles: Vec<Vehicle>,
}

/// The caller-visible merge of a route's evergreen and real-time records.
///
/// Computed on every read, never stored. Real-time fields win on the
/// shared id/name keys.
#[derive(Debug, Clone, Serialize)]
pub struct MergedRouteView {
    pub id: String,
    pub name: String,
    pub directions: Vec<String>,
    pub patterns: Vec<Pattern>,
    pub stops_by_direction: HashMap<String, Vec<Stop>>,
    pub vehicles: Vec<Vehicle>,
}

impl MergedRouteView {
    /// Overlays a real-time record on an evergreen record
    pub fn merge(evergreen: &EvergreenRouteRecord, real_time: &RealTimeRouteRecord) -> Self {
        Self {
            id: real_time.route_id.clone(),
            name: real_time.name.clone(),
            directions: evergreen.directions.clone(),
            patterns: evergreen.patterns.clone(),
            stops_by_direction: evergreen.stops_by_direction.clone(),
            vehicles: real_time.vehicles.clone(),
        }
    }
}
