#![deny(warnings)]

//! Core domain models and invariants for venture planning.
//!
//! This crate defines the serializable scenario types consumed by the
//! simulator, validation helpers guaranteeing basic invariants, and the
//! resolver that turns a combination request into concrete scenarios.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

mod resolve;

pub use resolve::{resolve, ActiveHardware, ResolvedScenarios};

/// Default simulation horizon in years.
pub const DEFAULT_HORIZON_YEARS: u32 = 10;

/// Business lines a scenario can belong to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductLine {
    /// First hardware product line.
    HardwareA,
    /// Services (missions) line.
    Services,
    /// Second hardware product line.
    HardwareB,
    /// Shared corporate cost structure.
    Finance,
}

impl fmt::Display for ProductLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProductLine::HardwareA => "hardware_a",
            ProductLine::Services => "services",
            ProductLine::HardwareB => "hardware_b",
            ProductLine::Finance => "finance",
        };
        f.write_str(s)
    }
}

/// Hardware slot a finance scenario can supply maturation data for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HardwareSlot {
    #[serde(rename = "hardware_a")]
    A,
    #[serde(rename = "hardware_b")]
    B,
}

impl HardwareSlot {
    /// Product line this slot corresponds to.
    pub fn line(self) -> ProductLine {
        match self {
            HardwareSlot::A => ProductLine::HardwareA,
            HardwareSlot::B => ProductLine::HardwareB,
        }
    }
}

/// One-time validation cost incurred in a given (1-indexed) year.
///
/// Activity for the line begins the year after `year`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maturation {
    /// Year in which validation completes.
    pub year: u32,
    /// One-time cost charged in `year`, in USD.
    pub cost_usd: Decimal,
}

impl Maturation {
    /// First year of sales or service activity.
    pub fn first_active_year(&self) -> u32 {
        self.year.saturating_add(1)
    }
}

/// A hardware product line with compounding unit sales.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HardwareScenario {
    /// Unique label within its scenario set.
    pub label: String,
    /// Revenue per unit sold, in USD.
    pub price_usd: Decimal,
    /// Cost per unit sold, in USD.
    pub cost_usd: Decimal,
    /// Units sold in the first sales year.
    pub initial_units: u64,
    /// Multiplicative year-over-year growth factor (e.g. 1.25).
    pub growth: Decimal,
    /// Own maturation data. When absent the finance scenario must supply it.
    #[serde(default)]
    pub maturation: Option<Maturation>,
}

/// A services line billed per mission with linear volume growth.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServicesScenario {
    pub label: String,
    /// Missions flown in the first service year.
    pub missions_first_year: u64,
    /// Missions added (or removed, when negative) each subsequent year.
    pub mission_growth_per_year: i64,
    pub revenue_per_mission_usd: Decimal,
    pub cost_per_mission_usd: Decimal,
    /// Fixed annual operating cost once service has started.
    pub baseline_cost_usd: Decimal,
    pub maturation: Maturation,
}

/// Shared corporate cost structure and non-product revenue.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinanceScenario {
    pub label: String,
    /// Headcount per year; must cover the horizon.
    pub headcount_by_year: Vec<u32>,
    /// Fully loaded annual cost per head.
    pub cost_per_head_usd: Decimal,
    /// Business-development cost per year. Absent means zero every year.
    #[serde(default)]
    pub business_dev_cost_by_year: Option<Vec<Decimal>>,
    /// Software-development customers per year; must cover the horizon.
    pub sw_customers_by_year: Vec<u32>,
    pub sw_revenue_per_customer_usd: Decimal,
    /// Flat annual cost not covered elsewhere.
    pub other_cost_usd: Decimal,
    /// Flat annual grant revenue.
    pub grant_revenue_usd: Decimal,
    /// Avionics validation, always active.
    pub avionics: Maturation,
    /// Maturation supplied on behalf of hardware lines lacking their own.
    #[serde(default)]
    pub hardware_maturations: BTreeMap<HardwareSlot, Maturation>,
}

impl FinanceScenario {
    /// Business-development cost for a 1-indexed year, zero when not configured.
    pub fn business_dev_cost(&self, year: u32) -> Decimal {
        self.business_dev_cost_by_year
            .as_ref()
            .and_then(|v| v.get(year_index(year)).copied())
            .unwrap_or(Decimal::ZERO)
    }
}

/// All configured scenario sets.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSets {
    #[serde(default)]
    pub hardware_a: Vec<HardwareScenario>,
    #[serde(default)]
    pub services: Vec<ServicesScenario>,
    #[serde(default)]
    pub hardware_b: Vec<HardwareScenario>,
    #[serde(default)]
    pub finance: Vec<FinanceScenario>,
}

/// Selection of at most one scenario per optional line plus a finance scenario.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboRequest {
    #[serde(default)]
    pub hardware_a: Option<String>,
    #[serde(default)]
    pub services: Option<String>,
    #[serde(default)]
    pub hardware_b: Option<String>,
    pub finance: String,
}

/// Simulation configuration parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Number of simulated years (1-indexed).
    pub horizon_years: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            horizon_years: DEFAULT_HORIZON_YEARS,
        }
    }
}

/// Errors surfaced by resolution and simulation.
#[derive(Debug, Error, PartialEq)]
pub enum PlanError {
    /// A requested label matched no scenario in its set.
    #[error("{line} scenario not found: {label:?}")]
    ScenarioNotFound { line: ProductLine, label: String },
    /// Scenario data violates an invariant required to run.
    #[error("invalid scenario data: {0}")]
    InvalidScenarioData(#[from] ValidationError),
}

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{0} scenario has an empty label")]
    EmptyLabel(ProductLine),
    #[error("duplicate {line} scenario label: {label:?}")]
    DuplicateLabel { line: ProductLine, label: String },
    #[error("{label:?}: negative monetary value in {field}")]
    NegativeMoney { label: String, field: &'static str },
    #[error("{label:?}: growth factor must be > 0")]
    NonPositiveGrowth { label: String },
    #[error("{label:?}: {field} has {len} entries, horizon needs {horizon}")]
    SeriesTooShort {
        label: String,
        field: &'static str,
        len: usize,
        horizon: u32,
    },
    #[error("horizon must be at least one year")]
    ZeroHorizon,
    #[error("{line} {label:?}: maturation defined by both the line and the finance scenario")]
    MaturationDefinedTwice { line: ProductLine, label: String },
    #[error("{line} {label:?}: no maturation defined by the line or the finance scenario")]
    MaturationMissing { line: ProductLine, label: String },
}

/// Zero-based index for a 1-indexed year.
pub fn year_index(year: u32) -> usize {
    year.saturating_sub(1) as usize
}

fn non_negative(label: &str, field: &'static str, v: Decimal) -> Result<(), ValidationError> {
    if v < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney {
            label: label.to_string(),
            field,
        });
    }
    Ok(())
}

fn covers_horizon(
    label: &str,
    field: &'static str,
    len: usize,
    horizon: u32,
) -> Result<(), ValidationError> {
    if len < horizon as usize {
        return Err(ValidationError::SeriesTooShort {
            label: label.to_string(),
            field,
            len,
            horizon,
        });
    }
    Ok(())
}

/// Validate a maturation charged on behalf of `label`.
pub fn validate_maturation(label: &str, m: &Maturation) -> Result<(), ValidationError> {
    non_negative(label, "maturation.cost_usd", m.cost_usd)
}

/// Validate a hardware scenario belonging to `line`.
pub fn validate_hardware(h: &HardwareScenario, line: ProductLine) -> Result<(), ValidationError> {
    if h.label.trim().is_empty() {
        return Err(ValidationError::EmptyLabel(line));
    }
    non_negative(&h.label, "price_usd", h.price_usd)?;
    non_negative(&h.label, "cost_usd", h.cost_usd)?;
    if h.growth <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveGrowth {
            label: h.label.clone(),
        });
    }
    if h.growth <= Decimal::ONE {
        tracing::warn!(label = %h.label, growth = %h.growth, "hardware growth factor does not exceed 1");
    }
    if let Some(m) = &h.maturation {
        validate_maturation(&h.label, m)?;
    }
    Ok(())
}

/// Validate a services scenario.
pub fn validate_services(s: &ServicesScenario) -> Result<(), ValidationError> {
    if s.label.trim().is_empty() {
        return Err(ValidationError::EmptyLabel(ProductLine::Services));
    }
    non_negative(&s.label, "revenue_per_mission_usd", s.revenue_per_mission_usd)?;
    non_negative(&s.label, "cost_per_mission_usd", s.cost_per_mission_usd)?;
    non_negative(&s.label, "baseline_cost_usd", s.baseline_cost_usd)?;
    validate_maturation(&s.label, &s.maturation)?;
    Ok(())
}

/// Validate a finance scenario against the simulation horizon.
pub fn validate_finance(f: &FinanceScenario, horizon: u32) -> Result<(), ValidationError> {
    if horizon == 0 {
        return Err(ValidationError::ZeroHorizon);
    }
    if f.label.trim().is_empty() {
        return Err(ValidationError::EmptyLabel(ProductLine::Finance));
    }
    covers_horizon(&f.label, "headcount_by_year", f.headcount_by_year.len(), horizon)?;
    covers_horizon(
        &f.label,
        "sw_customers_by_year",
        f.sw_customers_by_year.len(),
        horizon,
    )?;
    if let Some(bd) = &f.business_dev_cost_by_year {
        covers_horizon(&f.label, "business_dev_cost_by_year", bd.len(), horizon)?;
        for v in bd {
            non_negative(&f.label, "business_dev_cost_by_year", *v)?;
        }
    }
    non_negative(&f.label, "cost_per_head_usd", f.cost_per_head_usd)?;
    non_negative(
        &f.label,
        "sw_revenue_per_customer_usd",
        f.sw_revenue_per_customer_usd,
    )?;
    non_negative(&f.label, "other_cost_usd", f.other_cost_usd)?;
    non_negative(&f.label, "grant_revenue_usd", f.grant_revenue_usd)?;
    non_negative(&f.label, "avionics.cost_usd", f.avionics.cost_usd)?;
    for m in f.hardware_maturations.values() {
        non_negative(&f.label, "hardware_maturations.cost_usd", m.cost_usd)?;
    }
    Ok(())
}

fn unique_labels<'a>(
    line: ProductLine,
    labels: impl Iterator<Item = &'a str>,
) -> Result<(), ValidationError> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for l in labels {
        if !seen.insert(l) {
            return Err(ValidationError::DuplicateLabel {
                line,
                label: l.to_string(),
            });
        }
    }
    Ok(())
}

/// Validate all scenario sets, including label uniqueness per set.
pub fn validate_sets(sets: &ScenarioSets, horizon: u32) -> Result<(), ValidationError> {
    for h in &sets.hardware_a {
        validate_hardware(h, ProductLine::HardwareA)?;
    }
    for h in &sets.hardware_b {
        validate_hardware(h, ProductLine::HardwareB)?;
    }
    for s in &sets.services {
        validate_services(s)?;
    }
    for f in &sets.finance {
        validate_finance(f, horizon)?;
    }
    unique_labels(
        ProductLine::HardwareA,
        sets.hardware_a.iter().map(|h| h.label.as_str()),
    )?;
    unique_labels(
        ProductLine::HardwareB,
        sets.hardware_b.iter().map(|h| h.label.as_str()),
    )?;
    unique_labels(
        ProductLine::Services,
        sets.services.iter().map(|s| s.label.as_str()),
    )?;
    unique_labels(
        ProductLine::Finance,
        sets.finance.iter().map(|f| f.label.as_str()),
    )?;
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_sets_validate() {
        validate_sets(&sets(), DEFAULT_HORIZON_YEARS).unwrap();
    }

    #[test]
    fn serde_roundtrip_finance() {
        let f = scale_to_11();
        let s = serde_json::to_string(&f).unwrap();
        let back: FinanceScenario = serde_json::from_str(&s).unwrap();
        assert_eq!(back, f);
    }

    #[test]
    fn short_headcount_series_rejected() {
        let mut f = scale_to_11();
        f.headcount_by_year.truncate(7);
        let err = validate_finance(&f, 10).unwrap_err();
        assert_eq!(
            err,
            ValidationError::SeriesTooShort {
                label: f.label.clone(),
                field: "headcount_by_year",
                len: 7,
                horizon: 10,
            }
        );
    }

    #[test]
    fn short_business_dev_series_rejected() {
        let mut f = scale_to_11();
        f.business_dev_cost_by_year = Some(vec![Decimal::ONE; 3]);
        assert!(matches!(
            validate_finance(&f, 10),
            Err(ValidationError::SeriesTooShort {
                field: "business_dev_cost_by_year",
                ..
            })
        ));
    }

    #[test]
    fn business_dev_defaults_to_zero() {
        let f = scale_to_11();
        assert_eq!(f.business_dev_cost(1), Decimal::ZERO);
        assert_eq!(f.business_dev_cost(10), Decimal::ZERO);
    }

    #[test]
    fn duplicate_labels_rejected() {
        let mut s = sets();
        s.hardware_a.push(dragonfly());
        assert!(matches!(
            validate_sets(&s, 10),
            Err(ValidationError::DuplicateLabel {
                line: ProductLine::HardwareA,
                ..
            })
        ));
    }

    #[test]
    fn zero_horizon_rejected() {
        assert_eq!(
            validate_finance(&scale_to_11(), 0),
            Err(ValidationError::ZeroHorizon)
        );
    }

    #[test]
    fn hardware_slot_keys_use_line_names() {
        let mut f = scale_to_11();
        f.hardware_maturations.insert(
            HardwareSlot::B,
            Maturation {
                year: 4,
                cost_usd: Decimal::new(1_000, 0),
            },
        );
        let s = serde_json::to_string(&f).unwrap();
        assert!(s.contains("\"hardware_b\""));
    }

    proptest! {
        #[test]
        fn negative_price_rejected(cents in 1i64..10_000_000) {
            let mut h = dragonfly();
            h.price_usd = Decimal::new(-cents, 2);
            let rejected = matches!(
                validate_hardware(&h, ProductLine::HardwareA),
                Err(ValidationError::NegativeMoney { field: "price_usd", .. })
            );
            prop_assert!(rejected);
        }

        #[test]
        fn positive_growth_accepted(g in 1i64..1_000) {
            let mut h = dragonfly();
            h.growth = Decimal::new(g, 2);
            prop_assert!(validate_hardware(&h, ProductLine::HardwareA).is_ok());
        }
    }
}
