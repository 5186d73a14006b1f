// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Wire-format structs for the BusTime v2 JSON API
//!
//! Every payload arrives wrapped in a `bustime-response` envelope and uses
//! the upstream's abbreviated field names (`vid`, `rt`, `stpid`, ...). The
//! structs here own that contract; the rest of the crate only sees the
//! domain types in [`crate::model`], so upstream schema drift stays
//! contained at this boundary.

use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::model::{Pattern, Point, Prediction, RouteMetadata, Stop, Vehicle};

/// The `bustime-response` wrapper around every endpoint payload
#[derive(Debug, Deserialize)]
pub(super) struct Envelope<T> {
    #[serde(rename = "bustime-response")]
    pub inner: T,
}

/// An error element inside the envelope
#[derive(Debug, Deserialize)]
pub(super) struct ApiError {
    #[serde(default)]
    pub rt: Option<String>,
    pub msg: String,
}

/// Messages the upstream uses for "nothing matched", which are not faults
const NO_DATA_MESSAGES: [&str; 3] = [
    "No data found for parameter",
    "No arrival times",
    "No service scheduled",
];

fn is_no_data(msg: &str) -> bool {
    NO_DATA_MESSAGES.iter().any(|m| msg.starts_with(m))
}

/// Resolves an envelope body into data or an upstream error.
///
/// The upstream reports an empty result set as an `error` element rather
/// than an empty list; those decode to an empty `Vec`. Anything else in
/// the error list is a real failure.
fn data_or_error<T>(data: Vec<T>, errors: Vec<ApiError>) -> Result<Vec<T>> {
    if !data.is_empty() || errors.is_empty() {
        return Ok(data);
    }
    if errors.iter().all(|e| is_no_data(&e.msg)) {
        return Ok(Vec::new());
    }
    let detail = errors
        .iter()
        .map(|e| match &e.rt {
            Some(rt) => format!("{} (rt={rt})", e.msg),
            None => e.msg.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ");
    Err(AppError::Upstream(detail))
}

#[derive(Debug, Deserialize)]
pub(super) struct RoutesBody {
    #[serde(default)]
    routes: Vec<WireRoute>,
    #[serde(default)]
    error: Vec<ApiError>,
}

impl RoutesBody {
    pub(super) fn into_routes(self) -> Result<Vec<RouteMetadata>> {
        let routes = data_or_error(self.routes, self.error)?;
        Ok(routes.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct VehiclesBody {
    #[serde(default)]
    vehicle: Vec<WireVehicle>,
    #[serde(default)]
    error: Vec<ApiError>,
}

impl VehiclesBody {
    pub(super) fn into_vehicles(self) -> Result<Vec<Vehicle>> {
        let vehicles = data_or_error(self.vehicle, self.error)?;
        Ok(vehicles.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct PredictionsBody {
    #[serde(default)]
    prd: Vec<WirePrediction>,
    #[serde(default)]
    error: Vec<ApiError>,
}

impl PredictionsBody {
    pub(super) fn into_predictions(self) -> Result<Vec<Prediction>> {
        let predictions = data_or_error(self.prd, self.error)?;
        Ok(predictions.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct DirectionsBody {
    #[serde(default)]
    directions: Vec<WireDirection>,
    #[serde(default)]
    error: Vec<ApiError>,
}

impl DirectionsBody {
    pub(super) fn into_directions(self) -> Result<Vec<String>> {
        let directions = data_or_error(self.directions, self.error)?;
        Ok(directions.into_iter().map(|d| d.dir).collect())
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct PatternsBody {
    #[serde(default)]
    ptr: Vec<WirePattern>,
    #[serde(default)]
    error: Vec<ApiError>,
}

impl PatternsBody {
    pub(super) fn into_patterns(self) -> Result<Vec<Pattern>> {
        let patterns = data_or_error(self.ptr, self.error)?;
        Ok(patterns.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct StopsBody {
    #[serde(default)]
    stops: Vec<WireStop>,
    #[serde(default)]
    error: Vec<ApiError>,
}

impl StopsBody {
    pub(super) fn into_stops(self) -> Result<Vec<Stop>> {
        let stops = data_or_error(self.stops, self.error)?;
        Ok(stops.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Deserialize)]
struct WireRoute {
    rt: String,
    rtnm: String,
}

impl From<WireRoute> for RouteMetadata {
    fn from(w: WireRoute) -> Self {
        Self {
            id: w.rt,
            name: w.rtnm,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireDirection {
    dir: String,
}

#[derive(Debug, Deserialize)]
struct WireVehicle {
    vid: String,
    tmstmp: String,
    lat: String,
    lon: String,
    hdg: String,
    pid: u32,
    rt: String,
    des: String,
    #[serde(default)]
    pdist: u32,
    #[serde(default)]
    dly: bool,
    #[serde(default)]
    tatripid: String,
    #[serde(default)]
    origtatripno: String,
    #[serde(default)]
    tablockid: String,
    #[serde(default)]
    zone: String,
}

impl From<WireVehicle> for Vehicle {
    fn from(w: WireVehicle) -> Self {
        Self {
            vehicle_id: w.vid,
            timestamp: w.tmstmp,
            lat: w.lat,
            lon: w.lon,
            heading: w.hdg,
            pattern_id: w.pid,
            route_id: w.rt,
            destination: w.des,
            distance_along_pattern: w.pdist,
            delayed: w.dly,
            trip_id: w.tatripid,
            orig_trip_no: w.origtatripno,
            block_id: w.tablockid,
            zone: w.zone,
            predictions: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WirePrediction {
    tmstmp: String,
    typ: String,
    stpid: String,
    stpnm: String,
    vid: String,
    #[serde(default)]
    dstp: u32,
    rt: String,
    rtdir: String,
    des: String,
    prdtm: String,
    #[serde(default)]
    dly: bool,
    #[serde(default)]
    prdctdn: String,
    #[serde(default)]
    zone: String,
}

impl From<WirePrediction> for Prediction {
    fn from(w: WirePrediction) -> Self {
        Self {
            timestamp: w.tmstmp,
            kind: w.typ,
            stop_id: w.stpid,
            stop_name: w.stpnm,
            vehicle_id: w.vid,
            distance_to_stop: w.dstp,
            route_id: w.rt,
            direction: w.rtdir,
            destination: w.des,
            predicted_time: w.prdtm,
            delayed: w.dly,
            countdown: w.prdctdn,
            zone: w.zone,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WirePattern {
    pid: u32,
    ln: u32,
    rtdir: String,
    #[serde(default)]
    pt: Vec<WirePoint>,
}

impl From<WirePattern> for Pattern {
    fn from(w: WirePattern) -> Self {
        Self {
            pattern_id: w.pid,
            length: w.ln,
            direction_label: w.rtdir,
            points: w.pt.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WirePoint {
    seq: u32,
    lat: f64,
    lon: f64,
    typ: String,
    #[serde(default)]
    stpid: Option<String>,
    #[serde(default)]
    stpnm: Option<String>,
    #[serde(default)]
    pdist: u32,
}

impl From<WirePoint> for Point {
    fn from(w: WirePoint) -> Self {
        Self {
            sequence: w.seq,
            lat: w.lat,
            lon: w.lon,
            kind: w.typ,
            stop_id: w.stpid,
            stop_name: w.stpnm,
            distance_along_pattern: w.pdist,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireStop {
    stpid: String,
    stpnm: String,
    lat: f64,
    lon: f64,
}

impl From<WireStop> for Stop {
    fn from(w: WireStop) -> Self {
        Self {
            stop_id: w.stpid,
            name: w.stpnm,
            lat: w.lat,
            lon: w.lon,
        }
    }
}
