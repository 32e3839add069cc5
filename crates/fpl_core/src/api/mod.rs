//! JSON boundary: string-in, string-out entry points wrapping every
//! result in a versioned response envelope.
//!
//! Callers embedding the engine behind a service or FFI edge use these
//! instead of the typed API; nothing here can panic on bad input.

use crate::captain::{self, CaptainRanking};
use crate::error::OptimizerError;
use crate::models::{ConstraintSpec, PlayerId, PlayerRecord, SquadResult, TransferPlan};
use crate::optimizer::formation_search::FormationSearchResult;
use crate::optimizer::SquadOptimizer;
use crate::planner::{PlannerConfig, TransferPlanner};
use chrono::{DateTime, Utc};
use log::error;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Schema version stamped on every envelope.
pub const API_VERSION: &str = "v1";

/// Response envelope. Exactly one of `data` and `error` is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    pub schema_version: String,
    pub timestamp: DateTime<Utc>,
}

/// Machine-readable error payload. `code` is the stable kind tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
            schema_version: API_VERSION.to_string(),
            timestamp: Utc::now(),
        }
    }

    fn err(code: &str, message: String) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ApiError { code: code.to_string(), message }),
            schema_version: API_VERSION.to_string(),
            timestamp: Utc::now(),
        }
    }

    fn from_result(result: crate::error::Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::err(err.kind(), err.to_string()),
        }
    }

    fn into_json(self) -> String {
        serde_json::to_string(&self).unwrap_or_else(|err| {
            error!("response serialization failed: {}", err);
            format!(
                "{{\"success\":false,\"error\":{{\"code\":\"serialization\",\"message\":\"{}\"}},\"schema_version\":\"{}\"}}",
                err, API_VERSION
            )
        })
    }
}

#[derive(Debug, Deserialize)]
struct OptimizeRequest {
    players: Vec<PlayerRecord>,
    #[serde(default)]
    constraints: ConstraintSpec,
}

#[derive(Debug, Deserialize)]
struct CaptainRequest {
    players: Vec<PlayerRecord>,
    squad_ids: Vec<PlayerId>,
}

#[derive(Debug, Deserialize)]
struct PlanRequest {
    current_squad: Vec<PlayerRecord>,
    pool: Vec<PlayerRecord>,
    #[serde(default = "default_horizon")]
    horizon: usize,
    #[serde(default = "default_max_transfers")]
    max_transfers_per_week: usize,
    #[serde(default = "default_gameweek")]
    start_gameweek: u32,
    #[serde(default = "default_free_transfers")]
    initial_free_transfers: u32,
}

fn default_horizon() -> usize {
    PlannerConfig::default().horizon
}

fn default_max_transfers() -> usize {
    PlannerConfig::default().max_transfers_per_week
}

fn default_gameweek() -> u32 {
    PlannerConfig::default().start_gameweek
}

fn default_free_transfers() -> u32 {
    PlannerConfig::default().initial_free_transfers
}

fn parse<'a, T: Deserialize<'a>>(input: &'a str) -> Result<T, String> {
    serde_json::from_str(input).map_err(|err| err.to_string())
}

/// Solve one squad optimization from a JSON request.
pub fn optimize_squad_json(input: &str) -> String {
    let request: OptimizeRequest = match parse(input) {
        Ok(request) => request,
        Err(message) => return ApiResponse::<SquadResult>::err("bad_request", message).into_json(),
    };
    let result = SquadOptimizer::new().optimize(&request.players, &request.constraints);
    ApiResponse::from_result(result).into_json()
}

/// Sweep the formation catalog from a JSON request.
pub fn search_formation_json(input: &str) -> String {
    let request: OptimizeRequest = match parse(input) {
        Ok(request) => request,
        Err(message) => {
            return ApiResponse::<FormationSearchResult>::err("bad_request", message).into_json()
        }
    };
    let search = SquadOptimizer::new().search_best_formation(&request.players, &request.constraints);
    ApiResponse::ok(search).into_json()
}

/// Rank captain options from a JSON request.
pub fn select_captain_json(input: &str) -> String {
    let request: CaptainRequest = match parse(input) {
        Ok(request) => request,
        Err(message) => {
            return ApiResponse::<CaptainRanking>::err("bad_request", message).into_json()
        }
    };
    let squad_ids: FxHashSet<PlayerId> = request.squad_ids.into_iter().collect();
    ApiResponse::from_result(captain::select_captain(&request.players, &squad_ids)).into_json()
}

/// Plan transfers over a horizon from a JSON request.
pub fn plan_transfers_json(input: &str) -> String {
    let request: PlanRequest = match parse(input) {
        Ok(request) => request,
        Err(message) => return ApiResponse::<TransferPlan>::err("bad_request", message).into_json(),
    };
    let planner = TransferPlanner::with_config(PlannerConfig {
        horizon: request.horizon,
        max_transfers_per_week: request.max_transfers_per_week,
        start_gameweek: request.start_gameweek,
        initial_free_transfers: request.initial_free_transfers,
    });
    ApiResponse::from_result(planner.plan(&request.current_squad, &request.pool)).into_json()
}
