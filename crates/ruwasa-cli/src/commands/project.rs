use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use ruwasa_core::projection::{project, ProjectionInput};

use crate::input;

/// Arguments for the NPV comparison. Individual flags override the Malawi
/// defaults; a JSON scenario (file or stdin) replaces them wholesale.
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ProjectArgs {
    /// Design population served by the scheme
    #[arg(long)]
    pub population: Option<u32>,

    /// Annual population growth rate in percent (e.g. 2.5)
    #[arg(long, alias = "growth")]
    pub growth_rate: Option<Decimal>,

    /// Projection horizon in years
    #[arg(long)]
    pub horizon: Option<u32>,

    /// Annual discount rate in percent (e.g. 10)
    #[arg(long)]
    pub discount_rate: Option<Decimal>,

    /// Monthly solar tariff per household (e.g. 0.50)
    #[arg(long)]
    pub tariff: Option<Decimal>,

    /// Design population served by one handpump
    #[arg(long)]
    pub users_per_pump: Option<u32>,

    /// Path to a JSON scenario file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_project(args: ProjectArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let projection_input: ProjectionInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        let mut scenario = ProjectionInput::default();
        if let Some(population) = args.population {
            scenario.global.population = population;
        }
        if let Some(growth) = args.growth_rate {
            scenario.global.population_growth_rate = growth;
        }
        if let Some(horizon) = args.horizon {
            scenario.global.horizon_years = horizon;
        }
        if let Some(rate) = args.discount_rate {
            scenario.global.discount_rate = rate;
        }
        if let Some(tariff) = args.tariff {
            scenario.revenue.tariff_solar_monthly = tariff;
        }
        if let Some(users) = args.users_per_pump {
            scenario.handpump.users_per_pump = users;
        }
        scenario
    };

    let result = project(&projection_input)?;
    Ok(serde_json::to_value(result)?)
}
