use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::Money;

use super::hydraulics::{DesignInput, HydraulicDesign};

// Unit-rate database (USD), typical for rural Malawi schemes.
mod rates {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    /// Siting + mobilisation/demobilisation
    pub const DRILLING_BASE: Decimal = dec!(2500);
    pub const DRILLING_PER_M: Decimal = dec!(60);

    /// HDPE pipe material, rising and main lines
    pub const PIPE_HDPE_63MM_PER_M: Decimal = dec!(6);
    /// HDPE pipe material, distribution lines
    pub const PIPE_HDPE_32MM_PER_M: Decimal = dec!(3);
    /// Manual excavation and backfill
    pub const TRENCHING_PER_M: Decimal = dec!(2.5);

    /// 5000 L steel tank base price
    pub const TANK_BASE: Decimal = dec!(2000);
    pub const TANK_PER_M3: Decimal = dec!(300);
    pub const TANK_STAND_6M: Decimal = dec!(3500);

    /// Controller + cabling + sensors
    pub const PUMP_BASE: Decimal = dec!(1200);
    pub const PUMP_PER_KW: Decimal = dec!(800);

    pub const PV_STRUCTURE_BASE: Decimal = dec!(500);
    /// Panels + rack + install
    pub const PV_PER_KW: Decimal = dec!(600);
    pub const INVERTER: Decimal = dec!(1500);

    /// Security fence + tap stand bases
    pub const FENCE_CIVILS: Decimal = dec!(1500);
    /// Per tap stand (kiosk)
    pub const TAP_STAND: Decimal = dec!(600);
    /// Extra fittings/meter per school or clinic connection
    pub const INSTITUTION_CONNECTION: Decimal = dec!(300);
    pub const GRID_KIOSK: Decimal = dec!(4500);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoqCategory {
    Civils,
    Network,
    Mechanical,
    Electrical,
}

/// One priced line of the bill of quantities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoqItem {
    pub category: BoqCategory,
    pub item: String,
    pub unit: String,
    pub qty: Decimal,
    pub rate: Money,
    pub amount: Money,
}

impl BoqItem {
    fn new(
        category: BoqCategory,
        item: impl Into<String>,
        unit: &str,
        qty: Decimal,
        rate: Money,
    ) -> Self {
        Self {
            category,
            item: item.into(),
            unit: unit.into(),
            qty,
            rate,
            amount: (qty * rate).round(),
        }
    }
}

/// Price the sized scheme, one line per physical component. Conditional
/// lines (pipe runs, institution connections, grid kiosk) appear only when
/// their quantity is non-zero.
pub fn generate_boq(input: &DesignInput, design: &HydraulicDesign) -> Vec<BoqItem> {
    let mut boq = Vec::new();
    let pipe_length = input.rising_main_m + input.main_line_m + input.distribution_m;

    // Civils
    boq.push(BoqItem::new(
        BoqCategory::Civils,
        "Borehole Drilling & Construction",
        "m",
        input.borehole_depth_m,
        rates::DRILLING_PER_M,
    ));
    boq.push(BoqItem::new(
        BoqCategory::Civils,
        "Borehole Siting & Mob/Demob",
        "LS",
        Decimal::ONE,
        rates::DRILLING_BASE,
    ));
    boq.push(BoqItem::new(
        BoqCategory::Civils,
        format!("Tank Stand ({}m) & Base", input.tank_height_m),
        "Sum",
        Decimal::ONE,
        rates::TANK_STAND_6M,
    ));
    boq.push(BoqItem::new(
        BoqCategory::Civils,
        "Fencing & Site Works",
        "Sum",
        Decimal::ONE,
        rates::FENCE_CIVILS,
    ));
    if input.tap_stands > 0 {
        boq.push(BoqItem::new(
            BoqCategory::Civils,
            "Tap Stand Construction",
            "No",
            Decimal::from(input.tap_stands),
            rates::TAP_STAND,
        ));
    }

    // Network
    if !pipe_length.is_zero() {
        boq.push(BoqItem::new(
            BoqCategory::Network,
            "Trenching & Backfill",
            "m",
            pipe_length,
            rates::TRENCHING_PER_M,
        ));
    }
    if !input.rising_main_m.is_zero() {
        boq.push(BoqItem::new(
            BoqCategory::Network,
            "Rising Main (HDPE 63mm)",
            "m",
            input.rising_main_m,
            rates::PIPE_HDPE_63MM_PER_M,
        ));
    }
    if !input.main_line_m.is_zero() {
        boq.push(BoqItem::new(
            BoqCategory::Network,
            "Main Line (HDPE 63mm)",
            "m",
            input.main_line_m,
            rates::PIPE_HDPE_63MM_PER_M,
        ));
    }
    if !input.distribution_m.is_zero() {
        boq.push(BoqItem::new(
            BoqCategory::Network,
            "Distribution (HDPE 32mm)",
            "m",
            input.distribution_m,
            rates::PIPE_HDPE_32MM_PER_M,
        ));
    }
    let institutions = input.schools + input.clinics + input.gardens;
    if institutions > 0 {
        boq.push(BoqItem::new(
            BoqCategory::Network,
            "Institution Connections (Fittings/Meter)",
            "No",
            Decimal::from(institutions),
            rates::INSTITUTION_CONNECTION,
        ));
    }

    // Mechanical
    let tank_rate = (rates::TANK_BASE + design.daily_demand_m3 * rates::TANK_PER_M3).round();
    boq.push(BoqItem::new(
        BoqCategory::Mechanical,
        format!("Steel Tank ({}m3)", design.daily_demand_m3.ceil()),
        "No",
        Decimal::ONE,
        tank_rate,
    ));
    let pump_rate = (rates::PUMP_BASE + design.pump_power_kw * rates::PUMP_PER_KW).round();
    boq.push(BoqItem::new(
        BoqCategory::Mechanical,
        format!("Submersible Pump ({:.1}kW)", design.pump_power_kw),
        "No",
        Decimal::ONE,
        pump_rate,
    ));

    // Electrical
    let pv_rate = (rates::PV_STRUCTURE_BASE + design.pv_array_kwp * rates::PV_PER_KW).round();
    boq.push(BoqItem::new(
        BoqCategory::Electrical,
        format!("Solar Array ({:.2}kWp) & Structure", design.pv_array_kwp),
        "Sum",
        Decimal::ONE,
        pv_rate,
    ));
    boq.push(BoqItem::new(
        BoqCategory::Electrical,
        "Solar Pump Inverter/Controller",
        "No",
        Decimal::ONE,
        rates::INVERTER,
    ));
    if input.has_grid {
        boq.push(BoqItem::new(
            BoqCategory::Electrical,
            "Mini-Grid Kiosk / Charging Station",
            "Sum",
            Decimal::ONE,
            rates::GRID_KIOSK,
        ));
    }

    boq
}

/// Split the priced bill into the two capital components the projection
/// engine budgets: drilling/civil works (Civils + Network) and equipment
/// (Mechanical + Electrical).
pub(crate) fn capital_split(boq: &[BoqItem]) -> (Money, Money) {
    let mut civil = Money::ZERO;
    let mut equipment = Money::ZERO;
    for item in boq {
        match item.category {
            BoqCategory::Civils | BoqCategory::Network => civil += item.amount,
            BoqCategory::Mechanical | BoqCategory::Electrical => equipment += item.amount,
        }
    }
    (civil, equipment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::hydraulics::size_system;

    fn sample_design() -> (DesignInput, HydraulicDesign) {
        let input = DesignInput {
            rising_main_m: dec!(120),
            main_line_m: dec!(600),
            distribution_m: dec!(250),
            tap_stands: 6,
            schools: 1,
            clinics: 1,
            gardens: 0,
            has_grid: true,
            ..DesignInput::default()
        };
        let hydraulics = size_system(&input).unwrap().result.hydraulics;
        (input, hydraulics)
    }

    #[test]
    fn test_amounts_are_qty_times_rate() {
        let (input, hydraulics) = sample_design();
        for item in generate_boq(&input, &hydraulics) {
            assert_eq!(item.amount, (item.qty * item.rate).round(), "{}", item.item);
        }
    }

    #[test]
    fn test_drilling_line() {
        let (input, hydraulics) = sample_design();
        let boq = generate_boq(&input, &hydraulics);
        let drilling = boq
            .iter()
            .find(|i| i.item.starts_with("Borehole Drilling"))
            .unwrap();
        // 60 m at 60 $/m
        assert_eq!(drilling.amount, dec!(3600));
    }

    #[test]
    fn test_conditional_lines() {
        let (mut input, hydraulics) = sample_design();
        input.distribution_m = Decimal::ZERO;
        input.has_grid = false;
        input.schools = 0;
        input.clinics = 0;
        let boq = generate_boq(&input, &hydraulics);
        assert!(boq.iter().all(|i| !i.item.starts_with("Distribution")));
        assert!(boq.iter().all(|i| !i.item.starts_with("Mini-Grid")));
        assert!(boq.iter().all(|i| !i.item.starts_with("Institution")));
    }

    #[test]
    fn test_capital_split_covers_every_line() {
        let (input, hydraulics) = sample_design();
        let boq = generate_boq(&input, &hydraulics);
        let (civil, equipment) = capital_split(&boq);
        let total: Decimal = boq.iter().map(|i| i.amount).sum();
        assert_eq!(civil + equipment, total);
        assert!(civil > Money::ZERO);
        assert!(equipment > Money::ZERO);
    }
}
