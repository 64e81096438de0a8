use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::time_value::{compound_factor, npv_constant_flow};
use crate::types::Money;

use super::engine::{
    ProjectionInput, YearlyResult, DAYS_PER_YEAR, MINUTES_PER_HOUR, MONTHS_PER_YEAR, PERCENT,
    TIME_VALUE_FACTOR,
};

/// Flat component breakdown of the comparison, used for charting and for
/// the Monte Carlo sensitivity sampler.
///
/// The standalone NPV components discount a constant per-year figure and
/// use a midpoint-population approximation for the solar tariff, so they
/// will not reconcile exactly with the year-by-year grown-population
/// series. Accepted as a summary-level estimate. The final totals are read
/// directly from the last projection year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    // Financial view
    pub capex_solar: Money,
    pub capex_handpump: Money,
    pub opex_solar_npv: Money,
    pub opex_handpump_npv: Money,
    pub revenue_solar_npv: Money,
    pub revenue_handpump_npv: Money,
    /// Final cumulative operational cash balance (capital excluded)
    pub total_solar_financial: Money,
    pub total_handpump_financial: Money,

    // Economic breakdown
    pub theft_risk_npv: Money,
    pub time_saved_solar_npv: Money,
    pub time_saved_handpump_npv: Money,
    pub health_benefit_solar_npv: Money,
    pub health_benefit_handpump_npv: Money,
    pub value_school_npv: Money,
    pub value_clinic_npv: Money,
    pub value_garden_npv: Money,
    pub value_energy_npv: Money,
    /// Combined carbon-credit and subsidy inflows (external financial
    /// inflows grouped for the chart breakdown)
    pub carbon_and_subsidy_npv: Money,

    // Net totals from the final projection year
    pub net_economic_value_solar: Money,
    pub net_economic_value_handpump: Money,
}

/// Build the flat summary from the input snapshot and the final projection
/// year.
pub(crate) fn build_summary(
    input: &ProjectionInput,
    solar_capex: Money,
    handpump_capex: Money,
    handpumps_needed: u32,
    annual_volume_m3: Decimal,
    last_year: &YearlyResult,
) -> ComparisonSummary {
    let global = &input.global;
    let revenue = &input.revenue;
    let benefits = &input.benefits;

    let years = global.horizon_years;
    let rate = global.discount_rate;
    let npv = |flow: Money| npv_constant_flow(flow, rate, years);

    let population = Decimal::from(global.population);

    // Midpoint-population tariff approximation for the solar revenue
    // rollup. Midpoint is floor(horizon / 2) whole years.
    let midpoint_pop = population * compound_factor(global.population_growth_rate, years / 2);
    let avg_solar_tariff = midpoint_pop / revenue.household_size
        * revenue.tariff_solar_monthly
        * MONTHS_PER_YEAR
        * (revenue.collection_efficiency_solar / PERCENT);
    let avg_subsidy = avg_solar_tariff * revenue.govt_subsidy_fraction / PERCENT;

    let carbon_flow = annual_volume_m3 * revenue.carbon_credit_price_m3;

    // Handpump tariff rollup keeps the base population (no growth), as the
    // collection performance of committees rarely scales with it.
    let handpump_tariff_flow = population / revenue.household_size
        * revenue.tariff_handpump_monthly
        * MONTHS_PER_YEAR
        * (revenue.collection_efficiency_handpump / PERCENT);

    let time_flow = |system_minutes: Decimal| {
        population * (benefits.baseline_minutes_daily - system_minutes) / MINUTES_PER_HOUR
            * DAYS_PER_YEAR
            * benefits.hourly_wage
            * TIME_VALUE_FACTOR
    };

    let (school_flow, clinic_flow, garden_flow, energy_flow) = match &input.system_spec {
        Some(spec) => (
            Decimal::from(spec.schools) * input.institutional.value_school,
            Decimal::from(spec.clinics) * input.institutional.value_clinic,
            Decimal::from(spec.gardens) * input.institutional.value_garden,
            if spec.has_grid {
                input.institutional.value_energy
            } else {
                Money::ZERO
            },
        ),
        None => (Money::ZERO, Money::ZERO, Money::ZERO, Money::ZERO),
    };

    ComparisonSummary {
        capex_solar: solar_capex,
        capex_handpump: handpump_capex,
        opex_solar_npv: npv(input.solar.opex_annual),
        opex_handpump_npv: npv(
            Decimal::from(handpumps_needed) * input.handpump.opex_annual_per_unit,
        ),
        revenue_solar_npv: npv(avg_solar_tariff + carbon_flow + avg_subsidy),
        revenue_handpump_npv: npv(handpump_tariff_flow),
        total_solar_financial: last_year.solar_cash_balance,
        total_handpump_financial: last_year.handpump_cash_balance,

        theft_risk_npv: npv(solar_capex * input.solar.theft_probability / PERCENT),
        time_saved_solar_npv: npv(time_flow(benefits.solar_minutes_daily)),
        time_saved_handpump_npv: npv(time_flow(benefits.handpump_minutes_daily)),
        health_benefit_solar_npv: npv(population * benefits.health_premium_solar),
        health_benefit_handpump_npv: npv(population * benefits.health_premium_handpump),
        value_school_npv: npv(school_flow),
        value_clinic_npv: npv(clinic_flow),
        value_garden_npv: npv(garden_flow),
        value_energy_npv: npv(energy_flow),
        carbon_and_subsidy_npv: npv(carbon_flow) + npv(avg_subsidy),

        net_economic_value_solar: last_year.solar_net_value,
        net_economic_value_handpump: last_year.handpump_net_value,
    }
}

#[cfg(test)]
mod tests {
    use super::super::engine::project;
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_zero_theft_probability_zeroes_theft_npv() {
        let mut input = ProjectionInput::default();
        input.solar.theft_probability = Decimal::ZERO;
        let result = project(&input).unwrap();
        assert_eq!(result.result.summary.theft_risk_npv, Money::ZERO);
    }

    #[test]
    fn test_zero_subsidy_leaves_only_carbon() {
        let mut input = ProjectionInput::default();
        input.revenue.govt_subsidy_fraction = Decimal::ZERO;
        let result = project(&input).unwrap();
        let s = &result.result.summary;

        // With subsidy at zero the combined figure is the carbon NPV alone:
        // 2000 people * 30 L / 1000 * 365 d * 0.10 $/m3 = 2190 $/yr
        let expected = npv_constant_flow(dec!(2190), dec!(10), 20);
        assert_eq!(s.carbon_and_subsidy_npv, expected);
    }

    #[test]
    fn test_final_totals_match_last_year() {
        let input = ProjectionInput::default();
        let result = project(&input).unwrap();
        let out = &result.result;
        let last = out.yearly.last().unwrap();
        assert_eq!(out.summary.net_economic_value_solar, last.solar_net_value);
        assert_eq!(
            out.summary.net_economic_value_handpump,
            last.handpump_net_value
        );
        assert_eq!(out.summary.total_solar_financial, last.solar_cash_balance);
        assert_eq!(
            out.summary.total_handpump_financial,
            last.handpump_cash_balance
        );
    }

    #[test]
    fn test_institutional_npvs_zero_without_spec() {
        let input = ProjectionInput::default();
        let result = project(&input).unwrap();
        let s = &result.result.summary;
        assert_eq!(s.value_school_npv, Money::ZERO);
        assert_eq!(s.value_clinic_npv, Money::ZERO);
        assert_eq!(s.value_garden_npv, Money::ZERO);
        assert_eq!(s.value_energy_npv, Money::ZERO);
    }

    #[test]
    fn test_opex_npv_scales_with_fleet() {
        let mut input = ProjectionInput::default();
        input.global.population = 2000; // 8 pumps at 250/pump
        let eight = project(&input).unwrap().result.summary.opex_handpump_npv;

        input.global.population = 4000; // 16 pumps
        let sixteen = project(&input).unwrap().result.summary.opex_handpump_npv;
        assert_eq!(sixteen, eight * dec!(2));
    }
}
