use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use statrs::distribution::Uniform;
use std::time::Instant;

use crate::error::RuwasaError;
use crate::projection::ComparisonSummary;
use crate::types::{ComputationMetadata, ComputationOutput};
use crate::RuwasaResult;

/// Number of perturbed scenarios sampled per invocation.
const TRIALS: u32 = 10_000;
/// Histogram bin count over the [min, max] differential range.
const HISTOGRAM_BINS: usize = 40;
/// Each component is perturbed by an independent uniform factor in
/// [1 - SPREAD, 1 + SPREAD) per trial.
const SPREAD: f64 = 0.2;

// ---------------------------------------------------------------------------
// Helper: build ComputationOutput without requiring Decimal
// ---------------------------------------------------------------------------

fn with_metadata_f64<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "ieee754_f64".to_string(),
        },
    }
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which net-value framing the sampler perturbs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimMetric {
    /// All monetized benefits minus all costs including capital
    #[default]
    Economic,
    /// Revenue minus operating cost; capital excluded (donor-funded)
    Financial,
}

/// A single histogram bin over the solar-minus-handpump differential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifferentialBin {
    pub bin_start: f64,
    pub bin_end: f64,
    pub count: u32,
    /// Bin start in thousands, e.g. "150k"
    pub label: String,
}

/// Outcome of one sampler invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub solar_wins: u32,
    pub handpump_wins: u32,
    /// Solar win rate as a percentage of all trials
    pub solar_win_rate: f64,
    pub distribution: Vec<DifferentialBin>,
}

/// Summary components lifted to f64 once, before the trial loop.
struct PerturbationBasis {
    capex_solar: f64,
    capex_handpump: f64,
    opex_solar: f64,
    opex_handpump: f64,
    revenue_solar: f64,
    revenue_handpump: f64,
    time_solar: f64,
    time_handpump: f64,
    health_solar: f64,
    health_handpump: f64,
    /// Institutional categories plus carbon+subsidy, perturbed as one block
    additional_solar: f64,
    theft_risk: f64,
}

impl PerturbationBasis {
    fn from_summary(summary: &ComparisonSummary) -> RuwasaResult<Self> {
        Ok(Self {
            capex_solar: to_f64(summary.capex_solar, "capex_solar")?,
            capex_handpump: to_f64(summary.capex_handpump, "capex_handpump")?,
            opex_solar: to_f64(summary.opex_solar_npv, "opex_solar_npv")?,
            opex_handpump: to_f64(summary.opex_handpump_npv, "opex_handpump_npv")?,
            revenue_solar: to_f64(summary.revenue_solar_npv, "revenue_solar_npv")?,
            revenue_handpump: to_f64(summary.revenue_handpump_npv, "revenue_handpump_npv")?,
            time_solar: to_f64(summary.time_saved_solar_npv, "time_saved_solar_npv")?,
            time_handpump: to_f64(summary.time_saved_handpump_npv, "time_saved_handpump_npv")?,
            health_solar: to_f64(summary.health_benefit_solar_npv, "health_benefit_solar_npv")?,
            health_handpump: to_f64(
                summary.health_benefit_handpump_npv,
                "health_benefit_handpump_npv",
            )?,
            additional_solar: to_f64(
                summary.value_school_npv
                    + summary.value_clinic_npv
                    + summary.value_garden_npv
                    + summary.value_energy_npv
                    + summary.carbon_and_subsidy_npv,
                "additional_solar",
            )?,
            theft_risk: to_f64(summary.theft_risk_npv, "theft_risk_npv")?,
        })
    }
}

fn to_f64(value: Decimal, field: &str) -> RuwasaResult<f64> {
    value.to_f64().ok_or_else(|| RuwasaError::NumericOverflow {
        context: format!("converting {field} to f64"),
    })
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run the Monte Carlo sensitivity analysis over a comparison summary.
///
/// Draws 10,000 perturbed scenarios, each component scaled by a fresh
/// independent uniform factor in [0.8, 1.2), tallies which system wins
/// (ties favor the handpump), and buckets the solar-minus-handpump
/// differential into a 40-bin histogram.
///
/// Pass a seed for reproducible output; `None` draws from OS entropy.
/// The run is CPU-bound and completes in place with no internal
/// concurrency or cancellation; callers serving a UI should dispatch it to
/// a worker thread and replace any previous result when it returns.
pub fn run_sensitivity(
    summary: &ComparisonSummary,
    metric: SimMetric,
    seed: Option<u64>,
) -> RuwasaResult<ComputationOutput<SimulationResult>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    let basis = PerturbationBasis::from_summary(summary)?;

    let uniform = Uniform::new(1.0 - SPREAD, 1.0 + SPREAD).map_err(|e| {
        RuwasaError::InvalidConfiguration {
            field: "perturbation".into(),
            reason: format!("Invalid uniform spread: {e}"),
        }
    })?;

    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let mut diffs: Vec<f64> = Vec::with_capacity(TRIALS as usize);
    let mut solar_wins: u32 = 0;

    for _ in 0..TRIALS {
        let solar_capital = basis.capex_solar * rng.sample(uniform);
        let handpump_capital = basis.capex_handpump * rng.sample(uniform);
        let solar_opex = basis.opex_solar * rng.sample(uniform);
        let handpump_opex = basis.opex_handpump * rng.sample(uniform);

        let solar_time = basis.time_solar * rng.sample(uniform);
        let handpump_time = basis.time_handpump * rng.sample(uniform);
        let solar_health = basis.health_solar * rng.sample(uniform);
        let handpump_health = basis.health_handpump * rng.sample(uniform);

        let solar_additional = basis.additional_solar * rng.sample(uniform);
        let theft = basis.theft_risk * rng.sample(uniform);

        let (solar_net, handpump_net) = match metric {
            SimMetric::Financial => {
                let solar_revenue = basis.revenue_solar * rng.sample(uniform);
                let handpump_revenue = basis.revenue_handpump * rng.sample(uniform);
                // Capital excluded: donor-funded cash-flow framing
                (solar_revenue - solar_opex, handpump_revenue - handpump_opex)
            }
            SimMetric::Economic => (
                (solar_time + solar_health + solar_additional)
                    - (solar_capital + solar_opex + theft),
                (handpump_time + handpump_health) - (handpump_capital + handpump_opex),
            ),
        };

        // Strictly greater only: ties favor the handpump
        if solar_net > handpump_net {
            solar_wins += 1;
        }
        diffs.push(solar_net - handpump_net);
    }

    diffs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let result = SimulationResult {
        solar_wins,
        handpump_wins: TRIALS - solar_wins,
        solar_win_rate: f64::from(solar_wins) / f64::from(TRIALS) * 100.0,
        distribution: build_distribution(&diffs),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata_f64(
        "Monte Carlo Sensitivity (±20% uniform perturbation)",
        &serde_json::json!({
            "trials": TRIALS,
            "metric": metric,
            "spread": SPREAD,
            "bins": HISTOGRAM_BINS,
            "seed": seed,
        }),
        warnings,
        elapsed,
        result,
    ))
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Partition sorted differentials into equal-width bins over [min, max].
///
/// Values are assigned by index with the maximum clamped into the final
/// bin, so every differential lands in exactly one bin. A degenerate range
/// (all trials identical) collapses to a single bin holding every count.
fn build_distribution(sorted: &[f64]) -> Vec<DifferentialBin> {
    if sorted.is_empty() {
        return Vec::new();
    }

    let min = sorted[0];
    let max = sorted[sorted.len() - 1];

    if (max - min).abs() < f64::EPSILON {
        return vec![DifferentialBin {
            bin_start: min,
            bin_end: max,
            count: sorted.len() as u32,
            label: bin_label(min),
        }];
    }

    let width = (max - min) / HISTOGRAM_BINS as f64;

    let mut bins: Vec<DifferentialBin> = (0..HISTOGRAM_BINS)
        .map(|i| {
            let bin_start = min + i as f64 * width;
            let bin_end = if i == HISTOGRAM_BINS - 1 {
                max
            } else {
                min + (i + 1) as f64 * width
            };
            DifferentialBin {
                bin_start,
                bin_end,
                count: 0,
                label: bin_label(bin_start),
            }
        })
        .collect();

    for &d in sorted {
        let mut idx = ((d - min) / width).floor() as usize;
        if idx >= HISTOGRAM_BINS {
            idx = HISTOGRAM_BINS - 1;
        }
        bins[idx].count += 1;
    }

    bins
}

/// Human-readable bin label: start value in thousands, e.g. "150k".
fn bin_label(start: f64) -> String {
    format!("{:.0}k", start / 1000.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::{project, ProjectionInput};

    const SEED: u64 = 42;

    fn sample_summary() -> ComparisonSummary {
        project(&ProjectionInput::default())
            .unwrap()
            .result
            .summary
    }

    #[test]
    fn test_win_count_conservation() {
        let summary = sample_summary();
        for metric in [SimMetric::Economic, SimMetric::Financial] {
            let result = run_sensitivity(&summary, metric, Some(SEED)).unwrap();
            let r = &result.result;
            assert_eq!(r.solar_wins + r.handpump_wins, 10_000);
        }
    }

    #[test]
    fn test_histogram_coverage() {
        let summary = sample_summary();
        let result = run_sensitivity(&summary, SimMetric::Economic, Some(SEED)).unwrap();
        let total: u32 = result.result.distribution.iter().map(|b| b.count).sum();
        assert_eq!(total, 10_000);
    }

    #[test]
    fn test_forty_bins() {
        let summary = sample_summary();
        let result = run_sensitivity(&summary, SimMetric::Economic, Some(SEED)).unwrap();
        assert_eq!(result.result.distribution.len(), 40);
    }

    #[test]
    fn test_seeded_reproducibility() {
        let summary = sample_summary();
        let a = run_sensitivity(&summary, SimMetric::Economic, Some(SEED)).unwrap();
        let b = run_sensitivity(&summary, SimMetric::Economic, Some(SEED)).unwrap();
        assert_eq!(a.result.solar_wins, b.result.solar_wins);
        assert_eq!(a.result.distribution, b.result.distribution);
    }

    #[test]
    fn test_win_rate_is_percentage_of_wins() {
        let summary = sample_summary();
        let result = run_sensitivity(&summary, SimMetric::Financial, Some(SEED)).unwrap();
        let r = &result.result;
        let expected = f64::from(r.solar_wins) / 100.0;
        assert!((r.solar_win_rate - expected).abs() < 1e-9);
    }

    #[test]
    fn test_bins_are_ordered_and_contiguous() {
        let summary = sample_summary();
        let result = run_sensitivity(&summary, SimMetric::Economic, Some(SEED)).unwrap();
        let dist = &result.result.distribution;
        for pair in dist.windows(2) {
            assert!(pair[0].bin_start < pair[1].bin_start);
            assert!((pair[0].bin_end - pair[1].bin_start).abs() < 1e-6);
        }
    }

    #[test]
    fn test_degenerate_range_single_bin() {
        // All components zero: every differential is exactly 0.0
        let zero = ComparisonSummary {
            capex_solar: Decimal::ZERO,
            capex_handpump: Decimal::ZERO,
            opex_solar_npv: Decimal::ZERO,
            opex_handpump_npv: Decimal::ZERO,
            revenue_solar_npv: Decimal::ZERO,
            revenue_handpump_npv: Decimal::ZERO,
            total_solar_financial: Decimal::ZERO,
            total_handpump_financial: Decimal::ZERO,
            theft_risk_npv: Decimal::ZERO,
            time_saved_solar_npv: Decimal::ZERO,
            time_saved_handpump_npv: Decimal::ZERO,
            health_benefit_solar_npv: Decimal::ZERO,
            health_benefit_handpump_npv: Decimal::ZERO,
            value_school_npv: Decimal::ZERO,
            value_clinic_npv: Decimal::ZERO,
            value_garden_npv: Decimal::ZERO,
            value_energy_npv: Decimal::ZERO,
            carbon_and_subsidy_npv: Decimal::ZERO,
            net_economic_value_solar: Decimal::ZERO,
            net_economic_value_handpump: Decimal::ZERO,
        };
        let result = run_sensitivity(&zero, SimMetric::Economic, Some(SEED)).unwrap();
        let r = &result.result;
        assert_eq!(r.distribution.len(), 1);
        assert_eq!(r.distribution[0].count, 10_000);
        // Ties favor the handpump
        assert_eq!(r.solar_wins, 0);
        assert_eq!(r.handpump_wins, 10_000);
    }

    #[test]
    fn test_dominant_solar_summary_wins_nearly_always() {
        let mut summary = sample_summary();
        // Massive solar benefit, no solar costs: solar should win every trial
        summary.time_saved_solar_npv = Decimal::from(1_000_000);
        summary.capex_solar = Decimal::ZERO;
        summary.opex_solar_npv = Decimal::ZERO;
        summary.theft_risk_npv = Decimal::ZERO;
        let result = run_sensitivity(&summary, SimMetric::Economic, Some(SEED)).unwrap();
        assert_eq!(result.result.solar_wins, 10_000);
    }

    #[test]
    fn test_bin_label_thousands() {
        assert_eq!(bin_label(150_000.0), "150k");
        assert_eq!(bin_label(-2_400.0), "-2k");
        assert_eq!(bin_label(0.0), "0k");
    }

    #[test]
    fn test_metadata_precision_field() {
        let summary = sample_summary();
        let result = run_sensitivity(&summary, SimMetric::Economic, Some(SEED)).unwrap();
        assert_eq!(result.metadata.precision, "ieee754_f64");
    }
}
