use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::{Money, Rate};

const PERCENT: Decimal = dec!(100);

/// `(1 + rate/100)^periods` by iterative multiplication.
///
/// Exact in Decimal for integer periods, unlike `powd` which goes through
/// a ln/exp approximation. Used for both compound population growth and
/// discount factors.
pub fn compound_factor(rate_pct: Rate, periods: u32) -> Decimal {
    let one_plus_r = Decimal::ONE + rate_pct / PERCENT;
    let mut factor = Decimal::ONE;
    for _ in 0..periods {
        factor *= one_plus_r;
    }
    factor
}

/// Per-year discount factor `(1 + discount/100)^year`.
pub fn discount_factor(discount_rate_pct: Rate, year: u32) -> Decimal {
    compound_factor(discount_rate_pct, year)
}

/// NPV of a constant annual flow over `years`:
/// `Σ flow / (1 + rate/100)^y for y = 1..=years`.
pub fn npv_constant_flow(flow: Money, discount_rate_pct: Rate, years: u32) -> Money {
    let one_plus_r = Decimal::ONE + discount_rate_pct / PERCENT;
    let mut npv = Decimal::ZERO;
    let mut factor = Decimal::ONE;
    for _ in 1..=years {
        factor *= one_plus_r;
        if factor.is_zero() {
            break;
        }
        npv += flow / factor;
    }
    npv
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_compound_factor_zero_rate() {
        assert_eq!(compound_factor(dec!(0), 10), Decimal::ONE);
    }

    #[test]
    fn test_compound_factor_matches_manual_power() {
        // (1.025)^3 = 1.076890625
        assert_eq!(compound_factor(dec!(2.5), 3), dec!(1.076890625));
    }

    #[test]
    fn test_discount_factor_strictly_increases() {
        let mut prev = discount_factor(dec!(10), 1);
        for year in 2..=20 {
            let f = discount_factor(dec!(10), year);
            assert!(f > prev, "factor should grow with year");
            prev = f;
        }
    }

    #[test]
    fn test_npv_constant_flow_zero_rate_is_sum() {
        assert_eq!(npv_constant_flow(dec!(100), dec!(0), 5), dec!(500));
    }

    #[test]
    fn test_npv_constant_flow_basic() {
        // 100/1.1 + 100/1.21 ≈ 173.55
        let npv = npv_constant_flow(dec!(100), dec!(10), 2);
        assert!((npv - dec!(173.55)).abs() < dec!(0.01), "npv={npv}");
    }

    #[test]
    fn test_npv_constant_flow_zero_years() {
        assert_eq!(npv_constant_flow(dec!(100), dec!(10), 0), Decimal::ZERO);
    }
}
