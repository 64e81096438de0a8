use clap::{Args, ValueEnum};
use serde_json::Value;

use ruwasa_core::projection::{project, ProjectionInput};
use ruwasa_core::sensitivity::{run_sensitivity, SimMetric};

use crate::input;

#[derive(Debug, Clone, ValueEnum)]
pub enum MetricArg {
    /// Net economic value (all monetized benefits)
    Economic,
    /// Cashflow-only view (tariff revenue minus costs and capital)
    Financial,
}

impl From<MetricArg> for SimMetric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::Economic => SimMetric::Economic,
            MetricArg::Financial => SimMetric::Financial,
        }
    }
}

/// Arguments for the Monte Carlo robustness check. The scenario is the same
/// JSON shape the project command takes; its deterministic summary seeds
/// the sampler.
#[derive(Args)]
pub struct SimulateArgs {
    /// Comparison metric to perturb
    #[arg(long, default_value = "economic")]
    pub metric: MetricArg,

    /// RNG seed for reproducible runs (omit for OS entropy)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Path to a JSON scenario file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_simulate(args: SimulateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let projection_input: ProjectionInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        ProjectionInput::default()
    };

    let projection = project(&projection_input)?;
    let simulation = run_sensitivity(
        &projection.result.summary,
        args.metric.into(),
        args.seed,
    )?;
    Ok(serde_json::to_value(simulation)?)
}
