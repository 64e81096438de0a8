use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Currency, Money, Rate};

/// Project-wide assumptions shared by both candidate systems.
///
/// Growth and discount rates apply uniformly across the whole horizon;
/// there is no year-by-year override.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalAssumptions {
    /// Design population at year 0
    pub population: u32,
    /// Annual population growth (%)
    pub population_growth_rate: Rate,
    /// Project horizon in years (must be >= 1)
    pub horizon_years: u32,
    /// Annual discount rate (%)
    pub discount_rate: Rate,
    #[serde(default)]
    pub currency: Currency,
}

impl Default for GlobalAssumptions {
    fn default() -> Self {
        Self {
            population: 2000,
            population_growth_rate: dec!(2.5),
            horizon_years: 20,
            discount_rate: dec!(10),
            currency: Currency::USD,
        }
    }
}

/// Cost profile of the solar-powered piped scheme.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolarCostProfile {
    /// Borehole drilling, tank base, trenching
    pub capex_drilling_civil: Money,
    /// Pump, panels, inverter, piping
    pub capex_equipment: Money,
    /// Operator salary, chlorination, minor repairs
    pub opex_annual: Money,
    /// Pump/inverter replacement cost
    pub replacement_cost: Money,
    /// Replacement interval in years; 0 means the cost never recurs
    pub replacement_interval_years: u32,
    /// Annual probability of major theft (% of capital)
    pub theft_probability: Rate,
}

impl Default for SolarCostProfile {
    fn default() -> Self {
        Self {
            capex_drilling_civil: dec!(51000),
            capex_equipment: dec!(25000),
            opex_annual: dec!(1500),
            replacement_cost: dec!(4000),
            replacement_interval_years: 7,
            theft_probability: dec!(5),
        }
    }
}

/// Cost profile of the handpump fleet. Fleet size is derived from
/// population, always rounding up: partial pump coverage is not allowed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandpumpCostProfile {
    /// Design norm for users served per pump (Malawi standard: 250)
    pub users_per_pump: u32,
    /// Deep borehole + Afridev pump + platform, per unit
    pub capex_per_unit: Money,
    /// Fast-moving spares and committee costs, per unit per year
    pub opex_annual_per_unit: Money,
    /// Major rehabilitation (rods, pipes), per unit
    pub rehab_cost_per_unit: Money,
    /// Rehabilitation interval in years; 0 means the cost never recurs
    pub rehab_interval_years: u32,
}

impl Default for HandpumpCostProfile {
    fn default() -> Self {
        Self {
            users_per_pump: 250,
            capex_per_unit: dec!(6500),
            opex_annual_per_unit: dec!(150),
            rehab_cost_per_unit: dec!(800),
            rehab_interval_years: 5,
        }
    }
}

/// Tariff, collection and external-inflow assumptions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueAssumptions {
    /// Monthly household tariff under the solar scheme
    pub tariff_solar_monthly: Money,
    /// Monthly household tariff under handpumps (often zero)
    pub tariff_handpump_monthly: Money,
    /// Collection efficiency for the solar scheme (%)
    pub collection_efficiency_solar: Rate,
    /// Collection efficiency for handpump committees (%)
    pub collection_efficiency_handpump: Rate,
    /// Average people per billable household
    pub household_size: Money,
    /// Volumetric carbon-credit price ($/m3)
    pub carbon_credit_price_m3: Money,
    /// Government subsidy as % of collected tariff
    pub govt_subsidy_fraction: Rate,
}

impl Default for RevenueAssumptions {
    fn default() -> Self {
        Self {
            tariff_solar_monthly: dec!(0.50),
            tariff_handpump_monthly: Money::ZERO,
            collection_efficiency_solar: dec!(85),
            collection_efficiency_handpump: dec!(40),
            household_size: dec!(5),
            carbon_credit_price_m3: dec!(0.10),
            govt_subsidy_fraction: dec!(10),
        }
    }
}

/// Monetized socio-economic benefits, valued against a status-quo
/// baseline of no improved water source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenefitAssumptions {
    /// Opportunity-cost wage ($/hour)
    pub hourly_wage: Money,
    /// Baseline collection time, minutes per person per day
    pub baseline_minutes_daily: Money,
    /// Collection time under handpumps (walking + queuing)
    pub handpump_minutes_daily: Money,
    /// Collection time under the solar scheme (taps usually < 200 m)
    pub solar_minutes_daily: Money,
    /// Health value of piped safe water ($/person/year)
    pub health_premium_solar: Money,
    /// Health value of a safe point source ($/person/year)
    pub health_premium_handpump: Money,
}

impl Default for BenefitAssumptions {
    fn default() -> Self {
        Self {
            hourly_wage: dec!(0.10),
            baseline_minutes_daily: dec!(120),
            handpump_minutes_daily: dec!(60),
            solar_minutes_daily: dec!(15),
            health_premium_solar: dec!(2.50),
            health_premium_handpump: dec!(1.50),
        }
    }
}

/// Flat annual values attributed to connected institutions. Counts come
/// from the engineered system specification; only the piped scheme can
/// serve institutions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstitutionalBenefits {
    /// Annual value per connected school
    pub value_school: Money,
    /// Annual value per connected clinic
    pub value_clinic: Money,
    /// Annual value per garden / irrigation plot
    pub value_garden: Money,
    /// Annual value of grid-energy access if present
    pub value_energy: Money,
}

impl Default for InstitutionalBenefits {
    fn default() -> Self {
        Self {
            value_school: dec!(2500),
            value_clinic: dec!(3500),
            value_garden: dec!(1000),
            value_energy: dec!(500),
        }
    }
}

/// Engineered system specification supplied by the hydraulic design once
/// one exists. When absent the engine falls back to a population-derived
/// demand estimate of 30 L/person/day for the carbon volume basis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemSpecification {
    /// Total daily demand (m3/day)
    pub daily_demand_m3: Money,
    pub schools: u32,
    pub clinics: u32,
    pub gardens: u32,
    pub has_grid: bool,
}
