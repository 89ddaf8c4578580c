//! Investment metrics derived from the cumulative cash-flow curve.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Summary investment metrics for a run, in raw USD.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    /// Deepest cumulative deficit, floored at zero.
    pub total_investment: Decimal,
    /// Cumulative cash flow at the final year.
    pub total_return: Decimal,
    /// total_return / total_investment, zero without investment.
    pub roi: Decimal,
    /// Multiple on invested capital, zero without investment.
    pub moic: Decimal,
    /// First year cumulative cash flow turned positive; `None` if never.
    pub payback_year: Option<u32>,
}

/// Aggregate metrics from cumulative cash flow ordered by year.
pub fn aggregate(cumulative_cash_flow: &[Decimal], payback_year: Option<u32>) -> SummaryMetrics {
    let worst = cumulative_cash_flow
        .iter()
        .copied()
        .min()
        .unwrap_or(Decimal::ZERO);
    let total_investment = (-worst).max(Decimal::ZERO);
    let total_return = cumulative_cash_flow
        .last()
        .copied()
        .unwrap_or(Decimal::ZERO);
    let (roi, moic) = if total_investment > Decimal::ZERO {
        (
            total_return
                .checked_div(total_investment)
                .unwrap_or(Decimal::ZERO),
            (total_return + total_investment)
                .checked_div(total_investment)
                .unwrap_or(Decimal::ZERO),
        )
    } else {
        (Decimal::ZERO, Decimal::ZERO)
    };
    SummaryMetrics {
        total_investment,
        total_return,
        roi,
        moic,
        payback_year,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn d(v: i64) -> Decimal {
        Decimal::new(v, 0)
    }

    #[test]
    fn investment_is_deepest_deficit() {
        let m = aggregate(&[d(-10), d(-30), d(-5), d(60)], Some(4));
        assert_eq!(m.total_investment, d(30));
        assert_eq!(m.total_return, d(60));
        assert_eq!(m.roi, d(2));
        assert_eq!(m.moic, d(3));
        assert_eq!(m.payback_year, Some(4));
    }

    #[test]
    fn never_negative_means_no_investment() {
        let m = aggregate(&[d(5), d(10), d(20)], Some(1));
        assert_eq!(m.total_investment, Decimal::ZERO);
        assert_eq!(m.roi, Decimal::ZERO);
        assert_eq!(m.moic, Decimal::ZERO);
        assert_eq!(m.total_return, d(20));
    }

    #[test]
    fn losses_throughout_give_negative_roi() {
        let m = aggregate(&[d(-10), d(-20)], None);
        assert_eq!(m.total_investment, d(20));
        assert_eq!(m.roi, d(-1));
        assert_eq!(m.moic, Decimal::ZERO);
        assert_eq!(m.payback_year, None);
    }

    proptest! {
        #[test]
        fn moic_is_roi_plus_one(values in proptest::collection::vec(-1_000_000i64..1_000_000, 1..20)) {
            let cum: Vec<Decimal> = values.iter().map(|&v| d(v)).collect();
            let m = aggregate(&cum, None);
            prop_assert!(m.total_investment >= Decimal::ZERO);
            if m.total_investment > Decimal::ZERO {
                prop_assert_eq!((m.moic - m.roi).round_dp(12), Decimal::ONE);
            }
        }
    }
}
