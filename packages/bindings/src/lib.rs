use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

#[napi]
pub fn run_projection(input_json: String) -> NapiResult<String> {
    let input: ruwasa_core::projection::ProjectionInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = ruwasa_core::projection::project(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Monte Carlo sensitivity
// ---------------------------------------------------------------------------

/// Request shape for the sensitivity run: the comparison summary from a
/// prior projection, the metric to perturb, and an optional RNG seed.
#[derive(Deserialize)]
struct SensitivityRequest {
    summary: ruwasa_core::projection::ComparisonSummary,
    #[serde(default)]
    metric: ruwasa_core::sensitivity::SimMetric,
    #[serde(default)]
    seed: Option<u64>,
}

#[napi]
pub fn run_sensitivity(request_json: String) -> NapiResult<String> {
    let request: SensitivityRequest =
        serde_json::from_str(&request_json).map_err(to_napi_error)?;
    let output =
        ruwasa_core::sensitivity::run_sensitivity(&request.summary, request.metric, request.seed)
            .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Hydraulic design
// ---------------------------------------------------------------------------

#[napi]
pub fn size_system(input_json: String) -> NapiResult<String> {
    let input: ruwasa_core::design::DesignInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = ruwasa_core::design::size_system(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
