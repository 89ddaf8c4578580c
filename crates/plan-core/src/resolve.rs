//! Scenario resolution: combination request to concrete scenarios.

use crate::{
    validate_hardware, validate_maturation, validate_services, ComboRequest, FinanceScenario,
    HardwareScenario, HardwareSlot, Maturation, PlanError, ProductLine, ScenarioSets,
    ServicesScenario, ValidationError,
};
use tracing::debug;

/// An enabled hardware line with its authoritative maturation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveHardware<'a> {
    pub scenario: &'a HardwareScenario,
    pub maturation: Maturation,
}

/// Scenarios selected for a single run. `None` disables a line entirely.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedScenarios<'a> {
    pub finance: &'a FinanceScenario,
    pub hardware_a: Option<ActiveHardware<'a>>,
    pub services: Option<&'a ServicesScenario>,
    pub hardware_b: Option<ActiveHardware<'a>>,
}

impl ResolvedScenarios<'_> {
    /// Display label: finance label followed by each active line's label.
    pub fn label(&self) -> String {
        let mut label = self.finance.label.clone();
        if let Some(h) = &self.hardware_a {
            label.push_str(" + ");
            label.push_str(&h.scenario.label);
        }
        if let Some(s) = self.services {
            label.push_str(" + ");
            label.push_str(&s.label);
        }
        if let Some(h) = &self.hardware_b {
            label.push_str(" + ");
            label.push_str(&h.scenario.label);
        }
        label
    }
}

fn find<'a, T>(
    set: &'a [T],
    line: ProductLine,
    label: &str,
    label_of: impl Fn(&T) -> &str,
) -> Result<&'a T, PlanError> {
    set.iter()
        .find(|s| label_of(s) == label)
        .ok_or_else(|| PlanError::ScenarioNotFound {
            line,
            label: label.to_string(),
        })
}

fn hardware_maturation(
    h: &HardwareScenario,
    slot: HardwareSlot,
    finance: &FinanceScenario,
) -> Result<Maturation, ValidationError> {
    let maturation = match (h.maturation, finance.hardware_maturations.get(&slot)) {
        (Some(own), None) => own,
        (None, Some(from_finance)) => *from_finance,
        (Some(_), Some(_)) => {
            return Err(ValidationError::MaturationDefinedTwice {
                line: slot.line(),
                label: h.label.clone(),
            })
        }
        (None, None) => {
            return Err(ValidationError::MaturationMissing {
                line: slot.line(),
                label: h.label.clone(),
            })
        }
    };
    validate_maturation(&h.label, &maturation)?;
    Ok(maturation)
}

fn resolve_hardware<'a>(
    set: &'a [HardwareScenario],
    slot: HardwareSlot,
    label: Option<&str>,
    finance: &FinanceScenario,
) -> Result<Option<ActiveHardware<'a>>, PlanError> {
    let Some(label) = label else {
        return Ok(None);
    };
    let scenario = find(set, slot.line(), label, |h| h.label.as_str())?;
    validate_hardware(scenario, slot.line())?;
    let maturation = hardware_maturation(scenario, slot, finance)?;
    Ok(Some(ActiveHardware {
        scenario,
        maturation,
    }))
}

/// Look up every scenario named by `req` by exact label match.
///
/// A provided label that matches nothing is an error for every line, not
/// just finance; omitting a label disables that line. Selected hardware and
/// services scenarios are validated here, so hand-built sets get the same
/// checks as loaded ones.
pub fn resolve<'a>(
    sets: &'a ScenarioSets,
    req: &ComboRequest,
) -> Result<ResolvedScenarios<'a>, PlanError> {
    let finance = find(&sets.finance, ProductLine::Finance, &req.finance, |f| {
        f.label.as_str()
    })?;
    let hardware_a = resolve_hardware(
        &sets.hardware_a,
        HardwareSlot::A,
        req.hardware_a.as_deref(),
        finance,
    )?;
    let hardware_b = resolve_hardware(
        &sets.hardware_b,
        HardwareSlot::B,
        req.hardware_b.as_deref(),
        finance,
    )?;
    let services = match req.services.as_deref() {
        Some(label) => {
            let s = find(&sets.services, ProductLine::Services, label, |s| {
                s.label.as_str()
            })?;
            validate_services(s)?;
            Some(s)
        }
        None => None,
    };
    let resolved = ResolvedScenarios {
        finance,
        hardware_a,
        services,
        hardware_b,
    };
    debug!(label = %resolved.label(), "resolved scenario combination");
    Ok(resolved)
}
