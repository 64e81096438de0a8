use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::RuwasaError;
use crate::projection::SystemSpecification;
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::RuwasaResult;

use super::boq::{capital_split, generate_boq, BoqItem};

const LITRES_PER_M3: Decimal = dec!(1000);
const GRAVITY_M_S2: Decimal = dec!(9.81);
const SECONDS_PER_HOUR: Decimal = dec!(3600);

/// Motor/drive losses on top of hydraulic power.
const PUMP_DERATING: Decimal = dec!(1.2);
/// PV array oversizing over pump power (irradiance variability margin).
const PV_OVERSIZE: Decimal = dec!(1.5);

/// Institutional daily demand norms (litres/day).
const SCHOOL_DEMAND_L: Decimal = dec!(2500);
const CLINIC_DEMAND_L: Decimal = dec!(1000);
const GARDEN_DEMAND_L: Decimal = dec!(2000);

// ---------------------------------------------------------------------------
// Input / output types
// ---------------------------------------------------------------------------

/// Survey inputs for sizing the solar pumping scheme. Pipe lengths,
/// elevations and institution counts come from the field survey or a map
/// capture tool; geometry itself is out of scope here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignInput {
    pub population: u32,
    /// Domestic design demand (L/person/day)
    pub daily_demand_per_capita_l: Decimal,
    pub borehole_depth_m: Decimal,
    pub static_water_level_m: Decimal,
    /// Borehole to tank base elevation gain (m)
    pub elevation_difference_m: Decimal,
    /// Tank stand height (m)
    pub tank_height_m: Decimal,
    pub rising_main_m: Decimal,
    pub main_line_m: Decimal,
    pub distribution_m: Decimal,
    pub tap_stands: u32,
    pub schools: u32,
    pub clinics: u32,
    pub gardens: u32,
    pub has_grid: bool,
    /// Usable pumping hours per day
    pub peak_sun_hours: Decimal,
    /// Wire-to-water efficiency, in (0, 1]
    pub pump_efficiency: Decimal,
    /// Friction head per metre of pipeline (m/m)
    pub friction_loss_factor: Decimal,
}

impl Default for DesignInput {
    fn default() -> Self {
        Self {
            population: 2000,
            daily_demand_per_capita_l: dec!(30),
            borehole_depth_m: dec!(60),
            static_water_level_m: dec!(25),
            elevation_difference_m: dec!(15),
            tank_height_m: dec!(6),
            rising_main_m: Decimal::ZERO,
            main_line_m: Decimal::ZERO,
            distribution_m: Decimal::ZERO,
            tap_stands: 0,
            schools: 0,
            clinics: 0,
            gardens: 0,
            has_grid: false,
            peak_sun_hours: dec!(5.5),
            pump_efficiency: dec!(0.6),
            friction_loss_factor: dec!(0.08),
        }
    }
}

/// Closed-form hydraulic sizing results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HydraulicDesign {
    pub domestic_demand_m3: Decimal,
    pub institutional_demand_m3: Decimal,
    pub daily_demand_m3: Decimal,
    pub flow_rate_m3h: Decimal,
    pub total_dynamic_head_m: Decimal,
    pub pump_power_kw: Decimal,
    pub pv_array_kwp: Decimal,
    pub pipe_diameter_mm: u32,
}

/// Full design output: hydraulics, the specification consumed by the
/// projection engine, the bill of quantities and its capital rollups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignOutput {
    pub hydraulics: HydraulicDesign,
    pub specification: SystemSpecification,
    pub boq: Vec<BoqItem>,
    /// Drilling and civil works subtotal, seeds `capex_drilling_civil`
    pub capital_civil: Money,
    /// Mechanical and electrical subtotal, seeds `capex_equipment`
    pub capital_equipment: Money,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Size the solar pumping scheme from survey inputs and generate its bill
/// of quantities.
///
/// Demand aggregates domestic (population x per-capita) and institutional
/// norms; pumping must deliver the daily volume within the peak sun
/// window, against static lift plus friction losses.
pub fn size_system(input: &DesignInput) -> RuwasaResult<ComputationOutput<DesignOutput>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    validate_design_input(input)?;

    let domestic_demand_m3 =
        Decimal::from(input.population) * input.daily_demand_per_capita_l / LITRES_PER_M3;
    let institutional_demand_m3 = (Decimal::from(input.schools) * SCHOOL_DEMAND_L
        + Decimal::from(input.clinics) * CLINIC_DEMAND_L
        + Decimal::from(input.gardens) * GARDEN_DEMAND_L)
        / LITRES_PER_M3;
    let daily_demand_m3 = domestic_demand_m3 + institutional_demand_m3;

    let flow_rate_m3h = daily_demand_m3 / input.peak_sun_hours;

    let pipe_length_m = input.rising_main_m + input.main_line_m + input.distribution_m;
    let static_head_m =
        input.static_water_level_m + input.elevation_difference_m + input.tank_height_m;
    let friction_head_m = pipe_length_m * input.friction_loss_factor;
    let total_dynamic_head_m = static_head_m + friction_head_m;

    // P_hyd = rho*g*Q*H; with Q in m3/h the 3600 converts to seconds and
    // the water density cancels into kW.
    let hydraulic_power_kw = flow_rate_m3h * total_dynamic_head_m * GRAVITY_M_S2
        / (SECONDS_PER_HOUR * input.pump_efficiency);
    let pump_power_kw = hydraulic_power_kw * PUMP_DERATING;
    let pv_array_kwp = pump_power_kw * PV_OVERSIZE;

    let hydraulics = HydraulicDesign {
        domestic_demand_m3,
        institutional_demand_m3,
        daily_demand_m3,
        flow_rate_m3h,
        total_dynamic_head_m,
        pump_power_kw,
        pv_array_kwp,
        pipe_diameter_mm: 63,
    };

    let specification = SystemSpecification {
        daily_demand_m3,
        schools: input.schools,
        clinics: input.clinics,
        gardens: input.gardens,
        has_grid: input.has_grid,
    };

    let boq = generate_boq(input, &hydraulics);
    let (capital_civil, capital_equipment) = capital_split(&boq);

    let output = DesignOutput {
        hydraulics,
        specification,
        boq,
        capital_civil,
        capital_equipment,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Solar Pumping Scheme Sizing & Bill of Quantities",
        &serde_json::json!({
            "population": input.population,
            "daily_demand_per_capita_l": input.daily_demand_per_capita_l,
            "peak_sun_hours": input.peak_sun_hours,
            "pump_efficiency": input.pump_efficiency,
            "pipe_length_m": pipe_length_m,
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn validate_design_input(input: &DesignInput) -> RuwasaResult<()> {
    if input.peak_sun_hours <= Decimal::ZERO {
        return Err(RuwasaError::InvalidConfiguration {
            field: "peak_sun_hours".into(),
            reason: "Peak sun hours must be positive".into(),
        });
    }

    if input.pump_efficiency <= Decimal::ZERO || input.pump_efficiency > Decimal::ONE {
        return Err(RuwasaError::InvalidConfiguration {
            field: "pump_efficiency".into(),
            reason: "Pump efficiency must be in (0, 1]".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
