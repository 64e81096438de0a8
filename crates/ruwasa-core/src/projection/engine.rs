use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::RuwasaError;
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::RuwasaResult;

use super::assumptions::{
    BenefitAssumptions, GlobalAssumptions, HandpumpCostProfile, InstitutionalBenefits,
    RevenueAssumptions, SolarCostProfile, SystemSpecification,
};
use super::summary::{build_summary, ComparisonSummary};

pub(crate) const DAYS_PER_YEAR: Decimal = dec!(365);
pub(crate) const MONTHS_PER_YEAR: Decimal = dec!(12);
pub(crate) const MINUTES_PER_HOUR: Decimal = dec!(60);
pub(crate) const PERCENT: Decimal = dec!(100);

/// Fallback demand when no engineered specification exists (L/person/day).
const FALLBACK_DEMAND_LPCD: Decimal = dec!(30);
const LITRES_PER_M3: Decimal = dec!(1000);

/// Time saved is valued at half the opportunity-cost wage as a
/// conservatism adjustment.
pub(crate) const TIME_VALUE_FACTOR: Decimal = dec!(0.5);

// ---------------------------------------------------------------------------
// Input / output types
// ---------------------------------------------------------------------------

/// Full input snapshot for one projection run. The engine carries no state
/// between calls; every run reads a self-consistent snapshot and produces
/// fresh values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectionInput {
    #[serde(default)]
    pub global: GlobalAssumptions,
    #[serde(default)]
    pub solar: SolarCostProfile,
    #[serde(default)]
    pub handpump: HandpumpCostProfile,
    #[serde(default)]
    pub revenue: RevenueAssumptions,
    #[serde(default)]
    pub benefits: BenefitAssumptions,
    #[serde(default)]
    pub institutional: InstitutionalBenefits,
    /// Engineered system specification, if a hydraulic design exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_spec: Option<SystemSpecification>,
}

/// One row per projection year. The cashflow and net-value fields are the
/// running accumulators as of that year, not per-year deltas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyResult {
    pub year: u32,
    pub solar_cost: Money,
    pub solar_revenue: Money,
    /// Cumulative revenue minus operating cost; capital excluded
    /// (donor-funded by assumption)
    pub solar_cash_balance: Money,
    /// Cumulative discounted net economic value; starts at -capex
    pub solar_net_value: Money,
    pub handpump_cost: Money,
    pub handpump_revenue: Money,
    pub handpump_cash_balance: Money,
    pub handpump_net_value: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionOutput {
    pub yearly: Vec<YearlyResult>,
    pub summary: ComparisonSummary,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Run the year-by-year NPV comparison of the solar piped scheme against a
/// handpump fleet.
///
/// Pure and deterministic: identical inputs always produce identical
/// outputs. The operational cash balance tracks revenue minus operating
/// cost only (the operator's bank-balance view), while the net economic
/// value nets all monetized benefits against all costs including capital,
/// discounted year by year.
pub fn project(input: &ProjectionInput) -> RuwasaResult<ComputationOutput<ProjectionOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;

    let global = &input.global;
    let solar = &input.solar;
    let handpump = &input.handpump;
    let revenue = &input.revenue;
    let benefits = &input.benefits;

    let population = Decimal::from(global.population);

    // Capital costs. Handpump fleet always rounds up: partial coverage of
    // the design population is not allowed.
    let solar_capex = solar.capex_drilling_civil + solar.capex_equipment;
    let handpumps_needed = global.population.div_ceil(handpump.users_per_pump);
    let handpump_units = Decimal::from(handpumps_needed);
    let handpump_capex = handpump_units * handpump.capex_per_unit;

    // Annual volume basis for carbon credits. Held constant over the whole
    // horizon: installed capacity is the limit, not the grown population.
    let annual_volume_m3 = match &input.system_spec {
        Some(spec) => spec.daily_demand_m3 * DAYS_PER_YEAR,
        None => {
            warnings.push(format!(
                "No system specification supplied; carbon volume estimated at {FALLBACK_DEMAND_LPCD} L/person/day"
            ));
            population * FALLBACK_DEMAND_LPCD / LITRES_PER_M3 * DAYS_PER_YEAR
        }
    };
    let carbon_revenue = annual_volume_m3 * revenue.carbon_credit_price_m3;

    if solar.replacement_interval_years == 0 && !solar.replacement_cost.is_zero() {
        warnings.push("Solar replacement interval is 0; periodic replacement cost disabled".into());
    }
    if handpump.rehab_interval_years == 0 && !handpump.rehab_cost_per_unit.is_zero() {
        warnings.push("Handpump rehab interval is 0; periodic rehab cost disabled".into());
    }

    // Institutional value only accrues to the piped scheme, and only once a
    // design names the connected institutions.
    let institutional_value = match &input.system_spec {
        Some(spec) => annual_institutional_value(spec, &input.institutional),
        None => Money::ZERO,
    };

    let annual_theft_cost = solar_capex * solar.theft_probability / PERCENT;

    let hours_saved_solar =
        (benefits.baseline_minutes_daily - benefits.solar_minutes_daily) / MINUTES_PER_HOUR
            * DAYS_PER_YEAR;
    let hours_saved_handpump =
        (benefits.baseline_minutes_daily - benefits.handpump_minutes_daily) / MINUTES_PER_HOUR
            * DAYS_PER_YEAR;

    let one_plus_growth = Decimal::ONE + global.population_growth_rate / PERCENT;
    let one_plus_discount = Decimal::ONE + global.discount_rate / PERCENT;

    // Operational cash balances start at zero; net economic value starts at
    // negative capital cost.
    let mut solar_cash = Money::ZERO;
    let mut handpump_cash = Money::ZERO;
    let mut solar_net = -solar_capex;
    let mut handpump_net = -handpump_capex;

    let mut pop_factor = Decimal::ONE;
    let mut disc_factor = Decimal::ONE;

    let mut yearly: Vec<YearlyResult> = Vec::with_capacity(global.horizon_years as usize);

    for year in 1..=global.horizon_years {
        pop_factor *= one_plus_growth;
        disc_factor *= one_plus_discount;
        let current_pop = population * pop_factor;

        // Operating costs; the periodic replacement/rehab is a step cost in
        // the year it falls due, not amortized.
        let mut solar_cost = solar.opex_annual;
        if is_recurrence_year(year, solar.replacement_interval_years) {
            solar_cost += solar.replacement_cost;
        }
        let mut handpump_cost = handpump_units * handpump.opex_annual_per_unit;
        if is_recurrence_year(year, handpump.rehab_interval_years) {
            handpump_cost += handpump_units * handpump.rehab_cost_per_unit;
        }

        // Tariff revenue from billable households
        let households = current_pop / revenue.household_size;
        let solar_tariff = households
            * revenue.tariff_solar_monthly
            * MONTHS_PER_YEAR
            * (revenue.collection_efficiency_solar / PERCENT);
        let handpump_tariff = households
            * revenue.tariff_handpump_monthly
            * MONTHS_PER_YEAR
            * (revenue.collection_efficiency_handpump / PERCENT);

        let subsidy = solar_tariff * revenue.govt_subsidy_fraction / PERCENT;
        let solar_revenue_year = solar_tariff + carbon_revenue + subsidy;
        let handpump_revenue_year = handpump_tariff;

        solar_cash += solar_revenue_year - solar_cost;
        handpump_cash += handpump_revenue_year - handpump_cost;

        // Time savings floor at zero: a slower system yields no benefit
        // rather than a cost.
        let solar_time_value = (hours_saved_solar
            * current_pop
            * benefits.hourly_wage
            * TIME_VALUE_FACTOR)
            .max(Money::ZERO);
        let handpump_time_value = (hours_saved_handpump
            * current_pop
            * benefits.hourly_wage
            * TIME_VALUE_FACTOR)
            .max(Money::ZERO);

        let solar_health_value = current_pop * benefits.health_premium_solar;
        let handpump_health_value = current_pop * benefits.health_premium_handpump;

        // Economic flows. The government subsidy is a transfer payment and
        // is excluded here even though the financial view includes it.
        // Theft is an annualized expected loss charged every year.
        let solar_flow = (solar_tariff
            + solar_time_value
            + solar_health_value
            + institutional_value
            + carbon_revenue)
            - (solar_cost + annual_theft_cost);
        let handpump_flow =
            (handpump_tariff + handpump_time_value + handpump_health_value) - handpump_cost;

        solar_net += solar_flow / disc_factor;
        handpump_net += handpump_flow / disc_factor;

        yearly.push(YearlyResult {
            year,
            solar_cost,
            solar_revenue: solar_revenue_year,
            solar_cash_balance: solar_cash,
            solar_net_value: solar_net,
            handpump_cost,
            handpump_revenue: handpump_revenue_year,
            handpump_cash_balance: handpump_cash,
            handpump_net_value: handpump_net,
        });
    }

    let last = yearly.last().ok_or_else(|| RuwasaError::InsufficientData(
        "Projection produced no yearly results".into(),
    ))?;

    let summary = build_summary(
        input,
        solar_capex,
        handpump_capex,
        handpumps_needed,
        annual_volume_m3,
        last,
    );

    let output = ProjectionOutput { yearly, summary };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Rural Water Supply NPV Comparison (Solar Piped vs Handpumps)",
        &serde_json::json!({
            "population": global.population,
            "population_growth_rate": global.population_growth_rate,
            "horizon_years": global.horizon_years,
            "discount_rate": global.discount_rate,
            "currency": global.currency,
            "handpumps_needed": handpumps_needed,
            "engineered_spec": input.system_spec.is_some(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// True when a periodic cost falls due this year. A zero interval means
/// the cost never recurs (guards the modulo against division by zero).
fn is_recurrence_year(year: u32, interval_years: u32) -> bool {
    interval_years > 0 && year % interval_years == 0
}

pub(crate) fn annual_institutional_value(
    spec: &SystemSpecification,
    values: &InstitutionalBenefits,
) -> Money {
    let mut total = Decimal::from(spec.schools) * values.value_school
        + Decimal::from(spec.clinics) * values.value_clinic
        + Decimal::from(spec.gardens) * values.value_garden;
    if spec.has_grid {
        total += values.value_energy;
    }
    total
}

fn validate_input(input: &ProjectionInput) -> RuwasaResult<()> {
    if input.global.horizon_years == 0 {
        return Err(RuwasaError::InvalidConfiguration {
            field: "global.horizon_years".into(),
            reason: "Project horizon must be at least 1 year".into(),
        });
    }

    if input.revenue.household_size <= Decimal::ZERO {
        return Err(RuwasaError::InvalidConfiguration {
            field: "revenue.household_size".into(),
            reason: "Household size must be positive (billable households are population / household size)".into(),
        });
    }

    if input.handpump.users_per_pump == 0 {
        return Err(RuwasaError::InvalidConfiguration {
            field: "handpump.users_per_pump".into(),
            reason: "Users per pump must be positive to size the fleet".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn base_input() -> ProjectionInput {
        ProjectionInput::default()
    }

    #[test]
    fn test_recurrence_year() {
        assert!(is_recurrence_year(7, 7));
        assert!(is_recurrence_year(14, 7));
        assert!(!is_recurrence_year(8, 7));
        assert!(!is_recurrence_year(1, 7));
    }

    #[test]
    fn test_zero_interval_never_recurs() {
        for year in 1..=30 {
            assert!(!is_recurrence_year(year, 0));
        }
    }

    #[test]
    fn test_fleet_sizing_exact_division() {
        let mut input = base_input();
        input.global.population = 2000;
        input.handpump.users_per_pump = 250;
        let result = project(&input).unwrap();
        assert_eq!(result.assumptions["handpumps_needed"], 8);
    }

    #[test]
    fn test_fleet_sizing_rounds_up() {
        let mut input = base_input();
        input.global.population = 2001;
        input.handpump.users_per_pump = 250;
        let result = project(&input).unwrap();
        assert_eq!(result.assumptions["handpumps_needed"], 9);
    }

    #[test]
    fn test_zero_horizon_rejected() {
        let mut input = base_input();
        input.global.horizon_years = 0;
        assert!(matches!(
            project(&input),
            Err(RuwasaError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_zero_household_size_rejected() {
        let mut input = base_input();
        input.revenue.household_size = Decimal::ZERO;
        assert!(project(&input).is_err());
    }

    #[test]
    fn test_zero_users_per_pump_rejected() {
        let mut input = base_input();
        input.handpump.users_per_pump = 0;
        assert!(project(&input).is_err());
    }

    #[test]
    fn test_missing_spec_warns_about_fallback() {
        let input = base_input();
        let result = project(&input).unwrap();
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("L/person/day")));
    }

    #[test]
    fn test_zero_replacement_interval_warns_and_runs() {
        let mut input = base_input();
        input.solar.replacement_interval_years = 0;
        let result = project(&input).unwrap();
        assert!(result.warnings.iter().any(|w| w.contains("disabled")));
        // Every year's solar cost is plain opex
        for row in &result.result.yearly {
            assert_eq!(row.solar_cost, input.solar.opex_annual);
        }
    }

    #[test]
    fn test_cash_balance_excludes_capital() {
        let mut input = base_input();
        // No revenue, no opex: balance must stay exactly zero despite capex
        input.revenue = RevenueAssumptions {
            tariff_solar_monthly: Money::ZERO,
            tariff_handpump_monthly: Money::ZERO,
            carbon_credit_price_m3: Money::ZERO,
            govt_subsidy_fraction: Money::ZERO,
            ..RevenueAssumptions::default()
        };
        input.solar.opex_annual = Money::ZERO;
        input.solar.replacement_cost = Money::ZERO;
        input.handpump.opex_annual_per_unit = Money::ZERO;
        input.handpump.rehab_cost_per_unit = Money::ZERO;
        let result = project(&input).unwrap();
        for row in &result.result.yearly {
            assert_eq!(row.solar_cash_balance, Money::ZERO);
            assert_eq!(row.handpump_cash_balance, Money::ZERO);
        }
    }

    #[test]
    fn test_net_value_starts_at_negative_capex() {
        let mut input = base_input();
        input.global.horizon_years = 1;
        // Kill every flow so year 1 net value equals exactly -capex
        input.revenue = RevenueAssumptions {
            tariff_solar_monthly: Money::ZERO,
            tariff_handpump_monthly: Money::ZERO,
            carbon_credit_price_m3: Money::ZERO,
            govt_subsidy_fraction: Money::ZERO,
            ..RevenueAssumptions::default()
        };
        input.benefits = BenefitAssumptions {
            hourly_wage: Money::ZERO,
            health_premium_solar: Money::ZERO,
            health_premium_handpump: Money::ZERO,
            ..BenefitAssumptions::default()
        };
        input.solar.opex_annual = Money::ZERO;
        input.solar.replacement_cost = Money::ZERO;
        input.solar.theft_probability = Money::ZERO;
        input.handpump.opex_annual_per_unit = Money::ZERO;
        input.handpump.rehab_cost_per_unit = Money::ZERO;

        let result = project(&input).unwrap();
        let row = &result.result.yearly[0];
        let solar_capex = input.solar.capex_drilling_civil + input.solar.capex_equipment;
        assert_eq!(row.solar_net_value, -solar_capex);
        assert_eq!(row.handpump_net_value, -(dec!(8) * input.handpump.capex_per_unit));
    }

    #[test]
    fn test_negative_time_saving_floors_to_zero() {
        let mut input = base_input();
        // Handpump slower than the baseline: benefit floors at zero, never a cost
        input.benefits.handpump_minutes_daily = dec!(200);
        input.benefits.baseline_minutes_daily = dec!(120);
        let floored = project(&input).unwrap();

        let mut neutral = base_input();
        neutral.benefits.handpump_minutes_daily = neutral.benefits.baseline_minutes_daily;
        let zero_saving = project(&neutral).unwrap();

        let a = floored.result.yearly.last().unwrap().handpump_net_value;
        let b = zero_saving.result.yearly.last().unwrap().handpump_net_value;
        assert_eq!(a, b);
    }

    #[test]
    fn test_spec_volume_overrides_population_fallback() {
        let mut input = base_input();
        input.system_spec = Some(SystemSpecification {
            daily_demand_m3: dec!(60),
            schools: 0,
            clinics: 0,
            gardens: 0,
            has_grid: false,
        });
        let with_spec = project(&input).unwrap();
        assert!(with_spec.warnings.iter().all(|w| !w.contains("L/person/day")));

        // 2000 people * 30 L = 60 m3/day: identical carbon basis, so the
        // revenue series must match the fallback exactly.
        input.system_spec = None;
        let fallback = project(&input).unwrap();
        assert_eq!(
            with_spec.result.yearly[0].solar_revenue,
            fallback.result.yearly[0].solar_revenue
        );
    }

    #[test]
    fn test_institutional_value_only_with_spec_and_only_solar() {
        let mut input = base_input();
        input.system_spec = Some(SystemSpecification {
            daily_demand_m3: dec!(60),
            schools: 2,
            clinics: 1,
            gardens: 3,
            has_grid: true,
        });
        let with_inst = project(&input).unwrap();

        let mut no_inst = input.clone();
        no_inst.system_spec = Some(SystemSpecification {
            daily_demand_m3: dec!(60),
            schools: 0,
            clinics: 0,
            gardens: 0,
            has_grid: false,
        });
        let without = project(&no_inst).unwrap();

        // Handpump economics are untouched by institutions
        assert_eq!(
            with_inst.result.yearly.last().unwrap().handpump_net_value,
            without.result.yearly.last().unwrap().handpump_net_value
        );
        // Solar gains from them
        assert!(
            with_inst.result.yearly.last().unwrap().solar_net_value
                > without.result.yearly.last().unwrap().solar_net_value
        );
    }

    #[test]
    fn test_annual_institutional_value() {
        let spec = SystemSpecification {
            daily_demand_m3: dec!(60),
            schools: 2,
            clinics: 1,
            gardens: 3,
            has_grid: true,
        };
        let values = InstitutionalBenefits::default();
        // 2*2500 + 1*3500 + 3*1000 + 500 = 12000
        assert_eq!(annual_institutional_value(&spec, &values), dec!(12000));
    }
}
