//! Terminal chart: total cost and revenue as lines, cumulative cash flow as bars.
//!
//! Widgets are rendered into an off-screen [`Buffer`] and written out as plain
//! text rows, so the chart works on any stdout, piped or not.

use crate::report::millions;
use plan_sim::RunResult;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Widget},
};
use std::io::{self, Write};

fn points(r: &RunResult, value: impl Fn(&plan_sim::YearRecord) -> f64) -> Vec<(f64, f64)> {
    r.years
        .iter()
        .map(|y| (f64::from(y.year), value(y)))
        .filter(|(_, v)| v.is_finite())
        .collect()
}

fn bounds(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if hi > lo {
        [lo, hi]
    } else {
        [lo, lo + 1.0]
    }
}

/// Bars hold magnitudes in hundredths of a million; the sign lives in the
/// text value and the colour.
fn cash_flow_bar(year: u32, v: f64) -> Bar<'static> {
    let magnitude = if v.is_finite() {
        (v.abs() * 100.0).round() as u64
    } else {
        0
    };
    let colour = if v < 0.0 { Color::Red } else { Color::Green };
    Bar::default()
        .value(magnitude)
        .label(Line::from(format!("Y{year}")))
        .text_value(format!("{v:.2}"))
        .style(Style::default().fg(colour))
}

/// Draw the chart for `r` into a `width` x `height` buffer.
pub fn render(r: &RunResult, width: u16, height: u16) -> Buffer {
    let area = Rect::new(0, 0, width, height);
    let mut buf = Buffer::empty(area);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let cost = points(r, |y| millions(y.total_cost));
    let revenue = points(r, |y| millions(y.total_revenue));
    let first = r.years.first().map_or(1.0, |y| f64::from(y.year));
    let last = r.years.last().map_or(1.0, |y| f64::from(y.year));
    let x = [first, last.max(first + 1.0)];
    let y = bounds(cost.iter().chain(&revenue).map(|(_, v)| *v));

    let datasets = vec![
        Dataset::default()
            .name("Total Cost")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Red))
            .data(&cost),
        Dataset::default()
            .name("Total Revenue")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Green))
            .data(&revenue),
    ];
    let lines = Chart::new(datasets)
        .block(
            Block::default()
                .title(format!(" {} ", r.label))
                .borders(Borders::ALL),
        )
        .x_axis(
            Axis::default()
                .title("Year")
                .bounds(x)
                .labels(vec![
                    Span::raw(format!("{}", x[0])),
                    Span::raw(format!("{}", x[1])),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("Millions $")
                .bounds(y)
                .labels(vec![
                    Span::raw(format!("{:.1}", y[0])),
                    Span::raw(format!("{:.1}", y[1])),
                ]),
        );
    lines.render(chunks[0], &mut buf);

    let bars: Vec<Bar> = r
        .years
        .iter()
        .map(|y| cash_flow_bar(y.year, millions(y.cumulative_cash_flow)))
        .collect();
    let n = u16::try_from(bars.len().max(1)).unwrap_or(u16::MAX);
    let bar_width = (chunks[1].width.saturating_sub(2) / n).saturating_sub(1).max(1);
    let cumulative = BarChart::default()
        .block(
            Block::default()
                .title(" Cumulative Cash Flow (Millions $, red = deficit) ")
                .borders(Borders::ALL),
        )
        .bar_width(bar_width)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars));
    cumulative.render(chunks[1], &mut buf);

    buf
}

/// Render the chart and write it as text rows.
pub fn write_chart<W: Write>(w: &mut W, r: &RunResult, width: u16, height: u16) -> io::Result<()> {
    let buf = render(r, width, height);
    let area = buf.area;
    for y in area.top()..area.bottom() {
        let row: String = (area.left()..area.right())
            .map(|x| buf.get(x, y).symbol())
            .collect();
        writeln!(w, "{}", row.trim_end())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use plan_core::resolve;
    use plan_sim::simulate;

    fn reference_run() -> RunResult {
        let cfg = scenario_config::builtin().unwrap();
        let resolved = resolve(&cfg.scenarios, &cfg.combinations[0]).unwrap();
        simulate(&resolved, &cfg.sim_config()).unwrap()
    }

    #[test]
    fn bounds_include_zero_and_pad_flat_series() {
        assert_eq!(bounds([2.0, 5.0].into_iter()), [0.0, 5.0]);
        assert_eq!(bounds([-3.0, 4.0].into_iter()), [-3.0, 4.0]);
        assert_eq!(bounds(std::iter::empty()), [0.0, 1.0]);
        assert_eq!(bounds([f64::NAN].into_iter()), [0.0, 1.0]);
    }

    #[test]
    fn deficit_bars_keep_their_sign_in_the_label() {
        let bar = cash_flow_bar(2, -8.729);
        let mut buf = Buffer::empty(Rect::new(0, 0, 12, 6));
        BarChart::default()
            .bar_width(8)
            .data(BarGroup::default().bars(&[bar]))
            .render(buf.area, &mut buf);
        let text: String = buf.content.iter().map(|c| c.symbol()).collect();
        assert!(text.contains("-8.73"), "{text}");
        assert!(text.contains("Y2"), "{text}");
    }

    #[test]
    fn chart_has_title_and_cumulative_values() {
        let r = reference_run();
        let mut out = Vec::new();
        write_chart(&mut out, &r, 100, 30).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 30);
        assert!(text.contains("Scale to 11 FTE + Dragonfly 100+25%"), "{text}");
        assert!(text.contains("Cumulative Cash Flow"), "{text}");
        assert!(text.contains("50.47"), "{text}");
        assert!(text.contains("-8.73"), "{text}");
    }
}
