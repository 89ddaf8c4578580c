#![deny(warnings)]

//! Year-by-year projection engine.
//!
//! Given resolved scenarios, [`simulate`] computes every cost and revenue
//! component per year, threads running totals through the years in order,
//! detects the payback year and aggregates investment metrics. All money is
//! raw USD; scaling for display is left to the caller.

use plan_core::{
    validate_finance, validate_hardware, validate_maturation, validate_services, ActiveHardware,
    Maturation, PlanError, ProductLine, ResolvedScenarios, SimConfig, ValidationError,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub mod metrics;
pub mod volume;

pub use metrics::{aggregate, SummaryMetrics};

/// Sales of a hardware line in one year.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HardwareYear {
    pub units: u64,
    pub revenue: Decimal,
    pub cost: Decimal,
}

/// Services activity in one year.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ServicesYear {
    pub missions: u64,
    pub revenue: Decimal,
    pub cost: Decimal,
}

/// Every component for one simulated year plus running totals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct YearRecord {
    /// 1-indexed year.
    pub year: u32,
    pub headcount: u32,
    pub fte_cost: Decimal,
    pub business_dev_cost: Decimal,
    pub other_cost: Decimal,
    pub grant_revenue: Decimal,
    pub sw_dev_revenue: Decimal,
    pub hardware_a: HardwareYear,
    pub services: ServicesYear,
    pub hardware_b: HardwareYear,
    pub maturation_cost: Decimal,
    pub total_cost: Decimal,
    pub total_revenue: Decimal,
    pub net_cash_flow: Decimal,
    pub cumulative_cost: Decimal,
    pub cumulative_revenue: Decimal,
    pub cumulative_cash_flow: Decimal,
}

/// Output of one simulation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Combination label, e.g. "Scale to 11 FTE + Dragonfly 100+25%".
    pub label: String,
    pub horizon_years: u32,
    /// One record per year, ordered by year.
    pub years: Vec<YearRecord>,
    pub metrics: SummaryMetrics,
}

/// Precomputed per-year units for an active hardware line.
struct HardwarePlan<'a> {
    line: ActiveHardware<'a>,
    units: Vec<u64>,
}

impl<'a> HardwarePlan<'a> {
    fn new(line: ActiveHardware<'a>, horizon: u32) -> Self {
        let units = volume::hardware_units_by_year(
            line.scenario.initial_units,
            line.scenario.growth,
            line.maturation.year,
            horizon,
        );
        Self { line, units }
    }

    fn year(&self, year: u32) -> HardwareYear {
        let units = self
            .units
            .get(plan_core::year_index(year))
            .copied()
            .unwrap_or(0);
        let n = Decimal::from(units);
        HardwareYear {
            units,
            revenue: n * self.line.scenario.price_usd,
            cost: n * self.line.scenario.cost_usd,
        }
    }
}

fn services_year(s: &plan_core::ServicesScenario, year: u32) -> ServicesYear {
    if year < s.maturation.first_active_year() {
        return ServicesYear::default();
    }
    let missions = volume::missions_in_year(s, year);
    let n = Decimal::from(missions);
    ServicesYear {
        missions,
        revenue: n * s.revenue_per_mission_usd,
        cost: s.baseline_cost_usd + n * s.cost_per_mission_usd,
    }
}

/// Running totals threaded through the year loop in increasing year order.
#[derive(Default)]
struct Accumulator {
    cost: Decimal,
    revenue: Decimal,
    cash_flow: Decimal,
    payback_year: Option<u32>,
}

impl Accumulator {
    fn add(&mut self, year: u32, cost: Decimal, revenue: Decimal) {
        self.cost += cost;
        self.revenue += revenue;
        self.cash_flow += revenue - cost;
        if self.payback_year.is_none() && self.cash_flow > Decimal::ZERO {
            self.payback_year = Some(year);
        }
    }
}

fn validate_active(
    scenarios: &ResolvedScenarios<'_>,
    horizon: u32,
) -> Result<(), ValidationError> {
    validate_finance(scenarios.finance, horizon)?;
    for (line, hw) in [
        (ProductLine::HardwareA, scenarios.hardware_a),
        (ProductLine::HardwareB, scenarios.hardware_b),
    ] {
        if let Some(hw) = hw {
            validate_hardware(hw.scenario, line)?;
            validate_maturation(&hw.scenario.label, &hw.maturation)?;
        }
    }
    if let Some(s) = scenarios.services {
        validate_services(s)?;
    }
    Ok(())
}

/// Run the projection for one resolved scenario combination.
///
/// Fails with `InvalidScenarioData` when the finance scenario's per-year
/// series do not cover the horizon or any active line carries invalid
/// data; no partial result is produced.
pub fn simulate(
    scenarios: &ResolvedScenarios<'_>,
    cfg: &SimConfig,
) -> Result<RunResult, PlanError> {
    let horizon = cfg.horizon_years;
    let finance = scenarios.finance;
    validate_active(scenarios, horizon)?;

    let hardware_a = scenarios.hardware_a.map(|h| HardwarePlan::new(h, horizon));
    let hardware_b = scenarios.hardware_b.map(|h| HardwarePlan::new(h, horizon));

    let maturations: Vec<Maturation> = std::iter::once(finance.avionics)
        .chain(scenarios.hardware_a.map(|h| h.maturation))
        .chain(scenarios.hardware_b.map(|h| h.maturation))
        .chain(scenarios.services.map(|s| s.maturation))
        .collect();

    let mut acc = Accumulator::default();
    let mut years = Vec::with_capacity(horizon as usize);
    for year in 1..=horizon {
        let i = plan_core::year_index(year);
        let headcount = finance.headcount_by_year[i];
        let fte_cost = Decimal::from(headcount) * finance.cost_per_head_usd;
        let business_dev_cost = finance.business_dev_cost(year);
        let other_cost = finance.other_cost_usd;
        let grant_revenue = finance.grant_revenue_usd;
        let sw_dev_revenue =
            Decimal::from(finance.sw_customers_by_year[i]) * finance.sw_revenue_per_customer_usd;

        let maturation_cost: Decimal = maturations
            .iter()
            .filter(|m| volume::matures_in(m, year))
            .map(|m| m.cost_usd)
            .sum();

        let hw_a = hardware_a.as_ref().map(|p| p.year(year)).unwrap_or_default();
        let hw_b = hardware_b.as_ref().map(|p| p.year(year)).unwrap_or_default();
        let svc = scenarios
            .services
            .map(|s| services_year(s, year))
            .unwrap_or_default();

        let total_revenue =
            grant_revenue + hw_a.revenue + hw_b.revenue + svc.revenue + sw_dev_revenue;
        let total_cost = fte_cost
            + business_dev_cost
            + other_cost
            + hw_a.cost
            + hw_b.cost
            + svc.cost
            + maturation_cost;
        acc.add(year, total_cost, total_revenue);

        debug!(
            year,
            %total_cost,
            %total_revenue,
            cumulative_cash_flow = %acc.cash_flow,
            "simulated year"
        );
        years.push(YearRecord {
            year,
            headcount,
            fte_cost,
            business_dev_cost,
            other_cost,
            grant_revenue,
            sw_dev_revenue,
            hardware_a: hw_a,
            services: svc,
            hardware_b: hw_b,
            maturation_cost,
            total_cost,
            total_revenue,
            net_cash_flow: total_revenue - total_cost,
            cumulative_cost: acc.cost,
            cumulative_revenue: acc.revenue,
            cumulative_cash_flow: acc.cash_flow,
        });
    }

    let cumulative: Vec<Decimal> = years.iter().map(|y| y.cumulative_cash_flow).collect();
    let metrics = aggregate(&cumulative, acc.payback_year);
    let label = scenarios.label();
    info!(
        %label,
        investment = %metrics.total_investment,
        total_return = %metrics.total_return,
        payback_year = ?metrics.payback_year,
        "simulation complete"
    );
    Ok(RunResult {
        label,
        horizon_years: horizon,
        years,
        metrics,
    })
}
