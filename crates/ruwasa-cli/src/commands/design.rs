use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use ruwasa_core::design::{size_system, DesignInput};

use crate::input;

/// Arguments for the hydraulic pre-design. Flags override the default
/// site; a JSON file or piped scenario replaces them.
#[derive(Args)]
pub struct DesignArgs {
    /// Design population served by the scheme
    #[arg(long)]
    pub population: Option<u32>,

    /// Domestic demand (L/person/day)
    #[arg(long)]
    pub demand_lpcd: Option<Decimal>,

    /// Borehole depth (m)
    #[arg(long)]
    pub borehole_depth: Option<Decimal>,

    /// Static water level below ground (m)
    #[arg(long)]
    pub static_water_level: Option<Decimal>,

    /// Ground elevation difference, borehole to tank site (m)
    #[arg(long)]
    pub elevation: Option<Decimal>,

    /// Peak sun hours per day at the site
    #[arg(long)]
    pub peak_sun_hours: Option<Decimal>,

    /// Number of connected schools
    #[arg(long)]
    pub schools: Option<u32>,

    /// Number of connected clinics
    #[arg(long)]
    pub clinics: Option<u32>,

    /// Number of connected community gardens
    #[arg(long)]
    pub gardens: Option<u32>,

    /// Include a mini-grid kiosk / charging station
    #[arg(long)]
    pub grid: bool,

    /// Path to a JSON site file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_design(args: DesignArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let design_input: DesignInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        let mut site = DesignInput::default();
        if let Some(population) = args.population {
            site.population = population;
        }
        if let Some(demand) = args.demand_lpcd {
            site.daily_demand_per_capita_l = demand;
        }
        if let Some(depth) = args.borehole_depth {
            site.borehole_depth_m = depth;
        }
        if let Some(level) = args.static_water_level {
            site.static_water_level_m = level;
        }
        if let Some(elevation) = args.elevation {
            site.elevation_difference_m = elevation;
        }
        if let Some(sun) = args.peak_sun_hours {
            site.peak_sun_hours = sun;
        }
        if let Some(schools) = args.schools {
            site.schools = schools;
        }
        if let Some(clinics) = args.clinics {
            site.clinics = clinics;
        }
        if let Some(gardens) = args.gardens {
            site.gardens = gardens;
        }
        if args.grid {
            site.has_grid = true;
        }
        site
    };

    let result = size_system(&design_input)?;
    Ok(serde_json::to_value(result)?)
}
