#![deny(warnings)]

//! Headless CLI: run configured scenario combinations and print projections.

mod chart;
mod report;

use anyhow::{bail, Context, Result};
use plan_core::{resolve, ComboRequest};
use plan_sim::{simulate, RunResult};
use scenario_config::PlanConfig;
use std::io::Write;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

const CHART_WIDTH: u16 = 100;
const CHART_HEIGHT: u16 = 30;

#[derive(Debug, Default)]
struct Args {
    scenarios: Option<String>,
    combo: Option<usize>,
    json: bool,
    no_chart: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(argv: I) -> Result<Args> {
    let mut args = Args::default();
    let mut it = argv.into_iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--scenarios" => {
                args.scenarios = Some(it.next().context("--scenarios needs a path")?);
            }
            "--combo" => {
                let n = it.next().context("--combo needs a 1-based index")?;
                args.combo = Some(n.parse().with_context(|| format!("bad --combo {n:?}"))?);
            }
            "--json" => args.json = true,
            "--no-chart" => args.no_chart = true,
            other => bail!("unknown argument: {other}"),
        }
    }
    Ok(args)
}

fn selected(cfg: &PlanConfig, combo: Option<usize>) -> Result<Vec<&ComboRequest>> {
    match combo {
        None => Ok(cfg.combinations.iter().collect()),
        Some(n) => match n.checked_sub(1).and_then(|i| cfg.combinations.get(i)) {
            Some(c) => Ok(vec![c]),
            None => bail!(
                "--combo {n} out of range (1..={})",
                cfg.combinations.len()
            ),
        },
    }
}

fn run_one<W: Write>(
    out: &mut W,
    cfg: &PlanConfig,
    combo: &ComboRequest,
    args: &Args,
) -> Result<RunResult> {
    let resolved = resolve(&cfg.scenarios, combo)?;
    let result = simulate(&resolved, &cfg.sim_config())?;
    if !args.json {
        report::write_header(out, &resolved)?;
        report::write_summary(out, &result.label, &result.metrics, result.horizon_years)?;
        report::write_table(out, &result)?;
        if !args.no_chart {
            writeln!(out)?;
            chart::write_chart(out, &result, CHART_WIDTH, CHART_HEIGHT)?;
        }
    }
    Ok(result)
}

fn main() -> Result<()> {
    // Logging setup; stdout is reserved for the report
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::DEBUG)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    info!(
        git_sha = env!("GIT_SHA"),
        build_date = env!("BUILD_DATE"),
        ?args,
        "starting venture-plan"
    );

    let cfg = match &args.scenarios {
        Some(path) => scenario_config::load_from_path(path)
            .with_context(|| format!("loading scenarios from {path}"))?,
        None => scenario_config::builtin().context("loading built-in scenarios")?,
    };
    let combos = selected(&cfg, args.combo)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut results = Vec::with_capacity(combos.len());
    let mut failed = 0usize;
    for combo in &combos {
        match run_one(&mut out, &cfg, combo, &args) {
            Ok(r) => results.push(r),
            Err(e) => {
                failed += 1;
                error!(finance = %combo.finance, error = %e, "combination failed");
            }
        }
    }
    if args.json {
        serde_json::to_writer_pretty(&mut out, &results)?;
        writeln!(out)?;
    }
    out.flush()?;

    if failed > 0 {
        bail!("{failed} of {} combinations failed", combos.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn scenarios_flag_requires_a_path() {
        let err = parse_args(argv(&["--json", "--scenarios"])).unwrap_err();
        assert!(err.to_string().contains("--scenarios needs a path"));
    }

    #[test]
    fn flags_are_parsed() {
        let args = parse_args(argv(&["--scenarios", "plan.yaml", "--combo", "2", "--no-chart"]))
            .unwrap();
        assert_eq!(args.scenarios.as_deref(), Some("plan.yaml"));
        assert_eq!(args.combo, Some(2));
        assert!(args.no_chart);
        assert!(!args.json);
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert!(parse_args(argv(&["--years", "5"])).is_err());
    }

    #[test]
    fn combo_index_is_one_based() {
        let cfg = scenario_config::builtin().unwrap();
        assert_eq!(selected(&cfg, Some(1)).unwrap()[0], &cfg.combinations[0]);
        assert!(selected(&cfg, Some(0)).is_err());
        assert_eq!(selected(&cfg, None).unwrap().len(), cfg.combinations.len());
    }
}
