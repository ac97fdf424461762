//! Plain-text renderings for the command line

use crate::core::table::AdjustedTable;
use crate::indicators::registry::Registry;
use crate::limits::registry::LimitRegistry;
use std::fmt::Write;

const MISSING: &str = "-";

fn cell(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| MISSING.to_string())
}

/// Fixed-width table, one line per year.
pub fn render_table(table: &AdjustedTable) -> String {
    let widths: Vec<usize> = table
        .columns
        .iter()
        .map(|c| {
            c.values
                .iter()
                .map(|v| cell(*v).len())
                .chain(std::iter::once(c.name.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let _ = write!(out, "{:<6}", "year");
    for (c, w) in table.columns.iter().zip(&widths) {
        let _ = write!(out, " | {:>w$}", c.name, w = w);
    }
    out.push('\n');

    for (i, year) in table.years.iter().enumerate() {
        let _ = write!(out, "{:<6}", year);
        for (c, w) in table.columns.iter().zip(&widths) {
            let _ = write!(out, " | {:>w$}", cell(c.values[i]), w = w);
        }
        out.push('\n');
    }

    if !table.incomplete_years.is_empty() {
        let _ = writeln!(out, "partial limit data in: {:?}", table.incomplete_years);
    }
    out
}

pub fn render_registry() -> String {
    let mut out = String::from("Indicators:\n");
    for ind in Registry::get_all_indicators() {
        let _ = writeln!(
            out,
            "  {:<18} | {:<16} | {:?} | {}",
            ind.slug, ind.source_symbol, ind.unit, ind.description
        );
    }
    out.push_str("Limits:\n");
    for lim in LimitRegistry::get_all_limits() {
        let _ = writeln!(
            out,
            "  {:<18} | {:<16} | {:?} | {}",
            lim.config_name, lim.source_symbol, lim.unit, lim.description
        );
    }
    out
}

pub fn render_curve(samples: &[(f64, f64)]) -> String {
    let mut out = format!("{:>10} | {:>10}\n", "x", "f(x)");
    for (x, f) in samples {
        let _ = writeln!(out, "{:>10.4} | {:>10.4}", x, f);
    }
    out
}
