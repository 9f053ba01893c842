use rust_decimal::{prelude::ToPrimitive, Decimal};

/// Smallest principal the ROI estimate will ever assume.
pub const MIN_ESTIMATED_INVESTMENT: f64 = 50_000.0;

/// Parses a decimal string the lenient way the leaderboard producers do:
/// surrounding whitespace is ignored and anything unparsable becomes `NaN`.
pub fn parse_decimal(value: &str) -> f64 {
    value.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// Tiered guess of a trader's starting capital from their all-time PnL.
///
/// The tier is picked on the raw (signed) value, so every loss falls into the
/// lowest tier and is lifted to [`MIN_ESTIMATED_INVESTMENT`].
pub fn estimate_initial_investment(all_time_pnl: f64) -> f64 {
    let ratio = if all_time_pnl > 100_000_000.0 {
        0.20
    } else if all_time_pnl > 50_000_000.0 {
        0.15
    } else if all_time_pnl > 10_000_000.0 {
        0.12
    } else {
        0.08
    };

    let estimate = all_time_pnl * ratio;
    // NaN must survive the floor so it reaches `calculate_roi` untouched.
    if estimate < MIN_ESTIMATED_INVESTMENT {
        MIN_ESTIMATED_INVESTMENT
    } else {
        estimate
    }
}

pub fn calculate_roi(pnl: f64, estimated_investment: f64) -> f64 {
    if estimated_investment > 0.0 {
        pnl / estimated_investment
    } else {
        0.0
    }
}

/// Integer cents for numeric annotations. `NaN` becomes 0 and out of range
/// values saturate.
pub fn to_cents(value: f64) -> i64 {
    (value * 100.0).floor() as i64
}

/// `floor(value * factor)` as an integer annotation. Overflow becomes 0.
pub fn scaled_floor(value: Decimal, factor: i64) -> i64 {
    value
        .checked_mul(Decimal::from(factor))
        .and_then(|scaled| scaled.floor().to_i64())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use std::str::FromStr;

    use super::*;

    #[rstest]
    #[case(200_000_000.0, 40_000_000.0)]
    #[case(60_000_000.0, 9_000_000.0)]
    #[case(20_000_000.0, 2_400_000.0)]
    #[case(5_000_000.0, 400_000.0)]
    #[case(100_000.0, MIN_ESTIMATED_INVESTMENT)]
    #[case(0.0, MIN_ESTIMATED_INVESTMENT)]
    #[case(-25_000_000.0, MIN_ESTIMATED_INVESTMENT)]
    fn estimates_investment_by_tier(#[case] pnl: f64, #[case] expected: f64) {
        let estimate = estimate_initial_investment(pnl);
        assert!(
            (estimate - expected).abs() < 1e-6,
            "{pnl} -> {estimate}, expected {expected}"
        );
    }

    #[test]
    fn tier_boundaries_are_exclusive() {
        // Exactly 100M stays in the 15% tier.
        let estimate = estimate_initial_investment(100_000_000.0);
        assert!((estimate - 15_000_000.0).abs() < 1e-6);
    }

    #[test]
    fn zero_pnl_has_zero_roi() {
        let investment = estimate_initial_investment(0.0);
        assert_eq!(investment, 50_000.0);
        assert_eq!(calculate_roi(0.0, investment), 0.0);
    }

    #[test]
    fn roi_guards_against_non_positive_investment() {
        assert_eq!(calculate_roi(1_000.0, 0.0), 0.0);
        assert_eq!(calculate_roi(1_000.0, f64::NAN), 0.0);
        assert_eq!(calculate_roi(5_000.0, 50_000.0), 0.1);
    }

    #[test]
    fn unparsable_values() {
        assert!(parse_decimal("not-a-number").is_nan());
        assert_eq!(parse_decimal(" 12.5 "), 12.5);
        assert!(estimate_initial_investment(f64::NAN).is_nan());
    }

    #[test]
    fn cents_are_floored() {
        assert_eq!(to_cents(1.239), 123);
        assert_eq!(to_cents(-0.001), -1);
        assert_eq!(to_cents(f64::NAN), 0);
    }

    #[rstest]
    #[case("60000.567", 100, 6_000_056)]
    #[case("0.12345", 10_000, 1_234)]
    #[case("-1.005", 100, -101)]
    #[case("0", 100, 0)]
    fn scales_decimals_down(#[case] value: &str, #[case] factor: i64, #[case] expected: i64) {
        assert_eq!(scaled_floor(Decimal::from_str(value).unwrap(), factor), expected);
    }

    #[test]
    fn scaling_overflow_is_zero() {
        assert_eq!(scaled_floor(Decimal::MAX, 100), 0);
    }
}
