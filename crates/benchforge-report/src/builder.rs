//! Projection of results tables onto charts.

use std::collections::BTreeSet;

use benchforge_core::experiment::GLOBAL_ARTIFACT;
use benchforge_core::{Cell, Experiment, GlobalPlot, ResultsTable};
use tracing::warn;

use crate::plot::{PlotDescription, PlotEntry, PlotSeries, PlotValue};

/// Artifact stem of the overview chart.
pub const GLOBAL_NAME: &str = GLOBAL_ARTIFACT;

/// Builds plot descriptions from results tables.
///
/// # Example
///
/// ```
/// use benchforge_core::{Cell, CellFailure, ResultsTable, SummaryValue};
/// use benchforge_report::ReportBuilder;
/// use benchforge_test::counting_experiment;
///
/// let experiment = counting_experiment();
/// let mut table = ResultsTable::new("Counting", ["1"], ["lf-cpp-1", "lf-cpp-4"]);
/// table.record("1", "lf-cpp-1", Cell::Value(SummaryValue::new(100.0, 3)));
/// table.record("1", "lf-cpp-4", Cell::Failed(CellFailure::not_run("build failed")));
///
/// let plot = ReportBuilder::build(&experiment, &table);
/// assert_eq!(plot.present_count(), 1);
/// assert_eq!(plot.absent_count(), 1);
/// assert_eq!(plot.series[0].variant, "lf-cpp-4");
/// ```
pub struct ReportBuilder;

impl ReportBuilder {
    /// Builds the chart of one experiment.
    ///
    /// Variants follow the experiment's arrangement, with unlisted variants
    /// appended alphabetically. None are dropped.
    pub fn build(experiment: &Experiment, table: &ResultsTable) -> PlotDescription {
        let display = experiment.display();
        let order = arrange(&display.arrangement, table.variants().iter().map(String::as_str));

        let series: Vec<PlotSeries> = order
            .iter()
            .enumerate()
            .map(|(index, variant)| {
                let spec = experiment.variant(variant);
                style(
                    experiment.id(),
                    variant,
                    index,
                    spec.and_then(|s| s.color.as_deref()),
                    spec.and_then(|s| s.display_name.as_deref()),
                )
            })
            .collect();

        let mut entries = Vec::with_capacity(table.sequences().len() * series.len());
        for sequence in table.sequences() {
            for line in &series {
                entries.push(entry(sequence, line, table.get(sequence, &line.variant)));
            }
        }

        PlotDescription {
            name: experiment.id().to_string(),
            title: display.title.clone(),
            x_axis_label: display.x_axis_label.clone(),
            y_axis_label: display.y_axis_label.clone(),
            gnuplot_header: display.gnuplot_header.clone(),
            plotter: display.plotter,
            x_labels: table.sequences().to_vec(),
            series,
            entries,
        }
    }

    /// Builds the overview chart: one x position per experiment, holding the
    /// value of each variant at that experiment's global sequence.
    ///
    /// Variants an experiment does not run get no entry there; variants it
    /// runs without a value are flagged absent.
    pub fn build_global(runs: &[(&Experiment, &ResultsTable)], global: &GlobalPlot) -> PlotDescription {
        let all_variants: BTreeSet<&str> = runs
            .iter()
            .flat_map(|(_, table)| table.variants().iter().map(String::as_str))
            .collect();
        let order = arrange(&global.display.arrangement, all_variants.into_iter());

        let series: Vec<PlotSeries> = order
            .iter()
            .enumerate()
            .map(|(index, variant)| {
                let spec = runs.iter().find_map(|(experiment, _)| experiment.variant(variant));
                let color = global
                    .colors
                    .get(*variant)
                    .map(String::as_str)
                    .or_else(|| spec.and_then(|s| s.color.as_deref()));
                let name = global
                    .names
                    .get(*variant)
                    .map(String::as_str)
                    .or_else(|| spec.and_then(|s| s.display_name.as_deref()));
                style(GLOBAL_NAME, variant, index, color, name)
            })
            .collect();

        let mut x_labels = Vec::with_capacity(runs.len());
        let mut entries = Vec::new();
        for (experiment, table) in runs {
            let label = experiment.global_x_label().to_string();
            let sequence = experiment.global_sequence().unwrap_or_default();
            for line in &series {
                if !table.variants().contains(&line.variant) {
                    continue;
                }
                entries.push(entry(&label, line, table.get(sequence, &line.variant)));
            }
            x_labels.push(label);
        }

        PlotDescription {
            name: GLOBAL_NAME.to_string(),
            title: global.display.title.clone(),
            x_axis_label: global.display.x_axis_label.clone(),
            y_axis_label: global.display.y_axis_label.clone(),
            gnuplot_header: global.display.gnuplot_header.clone(),
            plotter: global.display.plotter,
            x_labels,
            series,
            entries,
        }
    }
}

/// Orders `variants` by `arrangement`, then alphabetically.
pub(crate) fn arrange<'a>(arrangement: &[String], variants: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut rest: Vec<&str> = variants.collect();
    rest.sort_unstable();
    rest.dedup();

    let mut ordered = Vec::with_capacity(rest.len());
    for name in arrangement {
        if let Some(at) = rest.iter().position(|v| *v == name.as_str()) {
            ordered.push(rest.remove(at));
        }
    }
    ordered.extend(rest);
    ordered
}

fn style(chart: &str, variant: &str, index: usize, color: Option<&str>, name: Option<&str>) -> PlotSeries {
    let color = match color {
        Some(color) => color.to_string(),
        None => {
            let fallback = (index + 1).to_string();
            warn!(event = "display_fallback", chart = chart, variant = variant, color = %fallback);
            fallback
        }
    };
    let display_name = match name {
        Some(name) => name.to_string(),
        None => {
            warn!(event = "display_fallback", chart = chart, variant = variant, name = variant);
            variant.to_string()
        }
    };
    PlotSeries {
        variant: variant.to_string(),
        display_name,
        color,
    }
}

fn entry(x_label: &str, series: &PlotSeries, cell: Option<&Cell>) -> PlotEntry {
    let value = match cell {
        Some(Cell::Value(summary)) => PlotValue::Present {
            value: summary.value,
            spread: summary.spread,
        },
        Some(Cell::Failed(failure)) => PlotValue::Absent {
            reason: failure.message.clone(),
        },
        None => PlotValue::Absent {
            reason: "not recorded".to_string(),
        },
    };
    PlotEntry {
        x_label: x_label.to_string(),
        variant: series.variant.clone(),
        display_name: series.display_name.clone(),
        color: series.color.clone(),
        value,
    }
}
