//! Text rendering of scenario inputs, investor summary and the year table.

use plan_core::ResolvedScenarios;
use plan_sim::{RunResult, SummaryMetrics, YearRecord};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::io::{self, Write};
use tracing::warn;

/// Converted value, or NaN with a warning so a bad figure never prints as 0.00.
fn or_nan(converted: Option<f64>, v: Decimal) -> f64 {
    converted.unwrap_or_else(|| {
        warn!(value = %v, "value not representable as f64");
        f64::NAN
    })
}

/// Decimal as `f64` for display.
pub fn to_display(v: Decimal) -> f64 {
    or_nan(v.to_f64(), v)
}

/// Money in millions for display.
pub fn millions(v: Decimal) -> f64 {
    to_display(v) / 1e6
}

/// Whole currency units with thousands separators, e.g. `-8,729,000`.
pub fn thousands(v: Decimal) -> String {
    let rounded = v.round_dp(0);
    let digits = rounded.abs().trunc().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Growth factor as a whole percentage, truncated: 1.25 -> 25.
fn growth_pct(growth: Decimal) -> String {
    let pct = ((growth - Decimal::ONE) * Decimal::ONE_HUNDRED).trunc();
    match pct.to_i64() {
        Some(p) => p.to_string(),
        None => {
            warn!(%growth, "growth percentage out of range");
            pct.to_string()
        }
    }
}

/// Key inputs of every active line.
pub fn write_header<W: Write>(w: &mut W, s: &ResolvedScenarios<'_>) -> io::Result<()> {
    writeln!(w, "\n--- Financial Summary Table ({}) ---", s.label())?;
    for (name, hw) in [("HW A", s.hardware_a), ("HW B", s.hardware_b)] {
        let Some(hw) = hw else { continue };
        let h = hw.scenario;
        writeln!(w, "{name} {}:", h.label)?;
        writeln!(w, "  Price per Unit: ${}", thousands(h.price_usd))?;
        writeln!(w, "  Cost per Unit:  ${}", thousands(h.cost_usd))?;
        writeln!(
            w,
            "  Initial Units Sold (Year {}): {}",
            hw.maturation.first_active_year(),
            h.initial_units
        )?;
        writeln!(w, "  Sales Growth Rate: {}%", growth_pct(h.growth))?;
    }
    if let Some(svc) = s.services {
        let start = svc.maturation.first_active_year();
        writeln!(w, "Services {}:", svc.label)?;
        writeln!(w, "  Start Year: Year {start}")?;
        writeln!(
            w,
            "  Missions (Y{start}): {}, {:+}/yr",
            svc.missions_first_year, svc.mission_growth_per_year
        )?;
        writeln!(
            w,
            "  $/Mission: rev ${}, cost ${} (baseline ${}/yr)",
            thousands(svc.revenue_per_mission_usd),
            thousands(svc.cost_per_mission_usd),
            thousands(svc.baseline_cost_usd)
        )?;
    }
    Ok(())
}

/// Investment, return, ROI, MOIC and payback.
pub fn write_summary<W: Write>(
    w: &mut W,
    label: &str,
    m: &SummaryMetrics,
    horizon_years: u32,
) -> io::Result<()> {
    writeln!(w, "\n--- Investor Summary Table ({label}) ---")?;
    writeln!(w, "Total Investment:   ${}", thousands(m.total_investment))?;
    writeln!(w, "Total Return:       ${}", thousands(m.total_return))?;
    writeln!(w, "ROI: {:.2}x", to_display(m.roi))?;
    writeln!(w, "MOIC: {:.2}x", to_display(m.moic))?;
    match m.payback_year {
        Some(y) => writeln!(w, "Payback Period: Year {y}\n"),
        None => writeln!(w, "Payback Period: Not achieved in {horizon_years} years\n"),
    }
}

#[derive(Clone, Copy)]
enum Cell {
    Count(u64),
    Money(Decimal),
}

type RowFn = fn(&YearRecord) -> Cell;

const ROWS: &[(&str, RowFn)] = &[
    ("FTEs", |y| Cell::Count(u64::from(y.headcount))),
    ("Total FTE Cost", |y| Cell::Money(y.fte_cost)),
    ("Business Dev Cost", |y| Cell::Money(y.business_dev_cost)),
    ("Other Costs", |y| Cell::Money(y.other_cost)),
    ("Grant Revenue", |y| Cell::Money(y.grant_revenue)),
    ("SW Dev Revenue", |y| Cell::Money(y.sw_dev_revenue)),
    ("HW A Units", |y| Cell::Count(y.hardware_a.units)),
    ("HW A Cost", |y| Cell::Money(y.hardware_a.cost)),
    ("HW A Revenue", |y| Cell::Money(y.hardware_a.revenue)),
    ("Missions", |y| Cell::Count(y.services.missions)),
    ("Services Cost", |y| Cell::Money(y.services.cost)),
    ("Services Revenue", |y| Cell::Money(y.services.revenue)),
    ("HW B Units", |y| Cell::Count(y.hardware_b.units)),
    ("HW B Cost", |y| Cell::Money(y.hardware_b.cost)),
    ("HW B Revenue", |y| Cell::Money(y.hardware_b.revenue)),
    ("Maturation Cost", |y| Cell::Money(y.maturation_cost)),
    ("Total Cost", |y| Cell::Money(y.total_cost)),
    ("Total Revenue", |y| Cell::Money(y.total_revenue)),
    ("Net Cash Flow", |y| Cell::Money(y.net_cash_flow)),
    ("Cumulative Cost", |y| Cell::Money(y.cumulative_cost)),
    ("Cumulative Revenue", |y| Cell::Money(y.cumulative_revenue)),
    ("Cumulative Cash Flow", |y| Cell::Money(y.cumulative_cash_flow)),
];

/// Metrics down, years across. Money in millions, counts as integers.
pub fn write_table<W: Write>(w: &mut W, r: &RunResult) -> io::Result<()> {
    write!(w, "{:<21}", "Phase")?;
    for y in &r.years {
        write!(w, "{:>8} ", format!("Year {}", y.year))?;
    }
    writeln!(w)?;
    for (name, cell) in ROWS {
        write!(w, "{name:<21}")?;
        for y in &r.years {
            match cell(y) {
                Cell::Count(n) => write!(w, "{n:>8} ")?,
                Cell::Money(v) => write!(w, "{:>8.2} ", millions(v))?,
            }
        }
        writeln!(w)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_groups_digits() {
        assert_eq!(thousands(Decimal::new(8_729_000, 0)), "8,729,000");
        assert_eq!(thousands(Decimal::new(-1_362_500, 0)), "-1,362,500");
        assert_eq!(thousands(Decimal::new(999, 0)), "999");
        assert_eq!(thousands(Decimal::ZERO), "0");
        assert_eq!(thousands(Decimal::new(12_345_678, 2)), "123,457");
    }

    #[test]
    fn growth_is_truncated_percent() {
        assert_eq!(growth_pct(Decimal::new(125, 2)), "25");
        assert_eq!(growth_pct(Decimal::new(1205, 3)), "20");
    }

    #[test]
    fn failed_conversion_is_not_shown_as_zero() {
        let shown = or_nan(None, Decimal::new(42, 0));
        assert!(shown.is_nan());
        assert_eq!(format!("{shown:.2}"), "NaN");
        assert!((to_display(Decimal::new(578, 2)) - 5.78).abs() < 1e-12);
        assert_eq!(millions(Decimal::new(1_462_500, 0)), 1.4625);
    }

    #[test]
    fn summary_reports_unachieved_payback() {
        let m = SummaryMetrics {
            total_investment: Decimal::new(10, 0),
            total_return: Decimal::new(-10, 0),
            roi: Decimal::new(-1, 0),
            moic: Decimal::ZERO,
            payback_year: None,
        };
        let mut buf = Vec::new();
        write_summary(&mut buf, "X", &m, 10).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Not achieved in 10 years"));
        assert!(text.contains("ROI: -1.00x"));
    }
}
