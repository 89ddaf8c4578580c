//! Unit and mission volumes per year.

use plan_core::{Maturation, ServicesScenario};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Truncating growth step: floor(units * growth), saturating at `u64::MAX`.
pub fn grow_units(units: u64, growth: Decimal) -> u64 {
    match Decimal::from(units).checked_mul(growth) {
        Some(next) if next <= Decimal::ZERO => 0,
        Some(next) => next.floor().to_u64().unwrap_or(u64::MAX),
        None => u64::MAX,
    }
}

/// Hardware units sold in each year `1..=horizon` (index 0 is year 1).
///
/// Zero before the first sales year, `initial_units` in it, then each year
/// truncates the previous year's already-truncated count times `growth`.
pub fn hardware_units_by_year(
    initial_units: u64,
    growth: Decimal,
    maturation_year: u32,
    horizon: u32,
) -> Vec<u64> {
    let first_sales_year = maturation_year.saturating_add(1);
    let mut out = Vec::with_capacity(horizon as usize);
    let mut units = 0u64;
    for year in 1..=horizon {
        if year == first_sales_year {
            units = initial_units;
        } else if year > first_sales_year {
            units = grow_units(units, growth);
        }
        out.push(units);
    }
    out
}

/// Missions flown in `year`; zero before service starts, never negative.
pub fn missions_in_year(s: &ServicesScenario, year: u32) -> u64 {
    let start = s.maturation.first_active_year();
    if year < start {
        return 0;
    }
    let year_index = i128::from(year - start);
    let missions =
        i128::from(s.missions_first_year) + i128::from(s.mission_growth_per_year) * year_index;
    u64::try_from(missions.max(0)).unwrap_or(u64::MAX)
}

/// Whether `m` charges its one-time cost in `year`.
pub fn matures_in(m: &Maturation, year: u32) -> bool {
    m.year == year
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn services(first: u64, growth: i64, maturation_year: u32) -> ServicesScenario {
        ServicesScenario {
            label: "svc".to_string(),
            missions_first_year: first,
            mission_growth_per_year: growth,
            revenue_per_mission_usd: Decimal::new(50_000, 0),
            cost_per_mission_usd: Decimal::new(10_000, 0),
            baseline_cost_usd: Decimal::new(25_000, 0),
            maturation: Maturation {
                year: maturation_year,
                cost_usd: Decimal::ZERO,
            },
        }
    }

    #[test]
    fn units_truncate_each_year() {
        let u = hardware_units_by_year(100, Decimal::new(125, 2), 2, 10);
        assert_eq!(u.len(), 10);
        assert_eq!(&u[..6], &[0, 0, 100, 125, 156, 195]);
        assert_eq!(&u[6..], &[243, 303, 378, 472]);
    }

    #[test]
    fn units_before_first_sales_year_are_zero() {
        let u = hardware_units_by_year(100, Decimal::new(125, 2), 12, 10);
        assert!(u.iter().all(|&x| x == 0));
    }

    #[test]
    fn maturation_year_zero_sells_from_year_one() {
        let u = hardware_units_by_year(10, Decimal::new(2, 0), 0, 3);
        assert_eq!(u, vec![10, 20, 40]);
    }

    #[test]
    fn missions_grow_linearly_after_start() {
        let s = services(52, 104, 3);
        assert_eq!(missions_in_year(&s, 3), 0);
        assert_eq!(missions_in_year(&s, 4), 52);
        assert_eq!(missions_in_year(&s, 5), 156);
        assert_eq!(missions_in_year(&s, 10), 52 + 104 * 6);
    }

    #[test]
    fn missions_clamp_at_zero() {
        let s = services(10, -4, 0);
        assert_eq!(missions_in_year(&s, 1), 10);
        assert_eq!(missions_in_year(&s, 3), 2);
        assert_eq!(missions_in_year(&s, 4), 0);
        assert_eq!(missions_in_year(&s, 10), 0);
    }

    #[test]
    fn growth_saturates_instead_of_overflowing() {
        assert_eq!(grow_units(u64::MAX, Decimal::new(2, 0)), u64::MAX);
    }

    proptest! {
        #[test]
        fn units_never_decrease_with_growth_above_one(
            initial in 1u64..100_000,
            pct in 101i64..300,
            maturation in 0u32..5,
        ) {
            let u = hardware_units_by_year(initial, Decimal::new(pct, 2), maturation, 10);
            for w in u.windows(2) {
                prop_assert!(w[1] >= w[0]);
            }
        }

        #[test]
        fn missions_never_negative(
            first in 0u64..1_000,
            growth in -500i64..500,
            maturation in 0u32..10,
            year in 1u32..30,
        ) {
            let s = services(first, growth, maturation);
            let expected = if year <= maturation {
                0
            } else {
                (first as i64 + growth * i64::from(year - maturation - 1)).max(0) as u64
            };
            prop_assert_eq!(missions_in_year(&s, year), expected);
        }
    }
}
