//! Gnuplot data files and scripts.
//!
//! The data file has one row per x-axis label and one column per series;
//! absent values are written as `NaN`, which gnuplot skips. The script
//! draws the chart in the style of the description's plotter and places a
//! "missing" label where a value is absent.

use std::fmt::{self, Write as _};

use benchforge_core::PlotterKind;

use crate::plot::PlotDescription;

/// Width of one histogram cluster, in x units.
const BOX_WIDTH: f64 = 0.9;

/// Gap between clusters, in boxes.
const CLUSTER_GAP: usize = 1;

/// Renders the `.dat` file.
///
/// # Example
///
/// ```
/// use benchforge_core::{Cell, CellFailure, ResultsTable, SummaryValue};
/// use benchforge_report::{gnuplot, ReportBuilder};
/// use benchforge_test::counting_experiment;
///
/// let mut table = ResultsTable::new("Counting", ["1"], ["lf-cpp-1", "lf-cpp-4"]);
/// table.record("1", "lf-cpp-1", Cell::Value(SummaryValue::new(100.0, 3)));
/// table.record("1", "lf-cpp-4", Cell::Failed(CellFailure::not_run("build failed")));
/// let plot = ReportBuilder::build(&counting_experiment(), &table);
///
/// let data = gnuplot::render_data(&plot);
/// assert_eq!(data.lines().nth(1), Some("\"1\"\tNaN\t100"));
/// ```
pub fn render_data(plot: &PlotDescription) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_data(plot, &mut out);
    out
}

/// Renders the `.gp` script reading `data_file` and writing `output_file`.
pub fn render_script(plot: &PlotDescription, data_file: &str, output_file: &str) -> String {
    let mut out = String::new();
    let _ = write_script(plot, data_file, output_file, &mut out);
    out
}

fn write_data(plot: &PlotDescription, out: &mut String) -> fmt::Result {
    write!(out, "# x")?;
    for series in &plot.series {
        write!(out, "\t{}", series.variant)?;
    }
    writeln!(out)?;

    for label in &plot.x_labels {
        write!(out, "{}", quote(label))?;
        for series in &plot.series {
            match plot.entry(label, &series.variant).and_then(|e| e.value.value()) {
                Some(value) => write!(out, "\t{}", value)?,
                None => write!(out, "\tNaN")?,
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

fn write_script(
    plot: &PlotDescription,
    data_file: &str,
    output_file: &str,
    out: &mut String,
) -> fmt::Result {
    writeln!(out, "set terminal pdfcairo enhanced size 8in,5in")?;
    writeln!(out, "set output {}", quote(output_file))?;
    writeln!(out, "set title {}", quote(&plot.title))?;
    writeln!(out, "set xlabel {}", quote(&plot.x_axis_label))?;
    writeln!(out, "set ylabel {}", quote(&plot.y_axis_label))?;
    writeln!(out, "set datafile missing \"NaN\"")?;
    writeln!(out, "set key outside right top")?;
    writeln!(out, "set yrange [0:*]")?;
    match plot.plotter {
        PlotterKind::Box => {
            writeln!(out, "set style data histogram")?;
            writeln!(out, "set style histogram cluster gap {}", CLUSTER_GAP)?;
            writeln!(out, "set style fill solid 0.8 border -1")?;
            writeln!(out, "set boxwidth {}", BOX_WIDTH)?;
        }
        PlotterKind::Line => {
            writeln!(out, "set style data linespoints")?;
            writeln!(out, "set xtics rotate by -30")?;
        }
    }
    if !plot.gnuplot_header.is_empty() {
        writeln!(out, "{}", plot.gnuplot_header.trim_end())?;
    }

    let mut tag = 0;
    for (x, label) in plot.x_labels.iter().enumerate() {
        for (column, series) in plot.series.iter().enumerate() {
            let absent = plot
                .entry(label, &series.variant)
                .is_some_and(|e| !e.value.is_present());
            if absent {
                tag += 1;
                writeln!(
                    out,
                    "set label {} \"missing\" at first {:.4}, graph 0.02 left rotate by 90 font \",8\"",
                    tag,
                    label_position(plot.plotter, x, column, plot.series.len()),
                )?;
            }
        }
    }

    if plot.series.is_empty() {
        return writeln!(out, "plot NaN notitle");
    }
    for (column, series) in plot.series.iter().enumerate() {
        let source = if column == 0 {
            quote(data_file)
        } else {
            "\"\"".to_string()
        };
        let using = match (plot.plotter, column) {
            (PlotterKind::Box, 0) => format!("{}:xtic(1)", column + 2),
            (PlotterKind::Box, _) => format!("{}", column + 2),
            (PlotterKind::Line, _) => format!("0:{}:xtic(1)", column + 2),
        };
        let prefix = if column == 0 { "plot " } else { "     " };
        let suffix = if column + 1 < plot.series.len() { ", \\" } else { "" };
        writeln!(
            out,
            "{}{} using {} title {} {}{}",
            prefix,
            source,
            using,
            quote(&series.display_name),
            line_color(&series.color),
            suffix,
        )?;
    }
    Ok(())
}

/// X coordinate of a cell's label.
fn label_position(plotter: PlotterKind, x: usize, column: usize, columns: usize) -> f64 {
    match plotter {
        PlotterKind::Box => {
            let offset = column as f64 - (columns as f64 - 1.0) / 2.0;
            x as f64 + offset / (columns + CLUSTER_GAP) as f64
        }
        PlotterKind::Line => x as f64,
    }
}

/// Translates a color token into a gnuplot line color clause.
fn line_color(color: &str) -> String {
    if !color.is_empty() && color.bytes().all(|b| b.is_ascii_digit()) {
        format!("lc {}", color)
    } else {
        format!("lc rgb {}", quote(color))
    }
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use benchforge_core::{Cell, CellFailure, ResultsTable, SummaryValue};
    use benchforge_test::counting_experiment;

    use super::*;
    use crate::ReportBuilder;

    fn counting_plot() -> PlotDescription {
        let mut table = ResultsTable::new("Counting", ["1"], ["lf-cpp-1", "lf-cpp-4"]);
        table.record("1", "lf-cpp-1", Cell::Value(SummaryValue::new(100.0, 3)));
        table.record(
            "1",
            "lf-cpp-4",
            Cell::Failed(CellFailure::not_run("build failed")),
        );
        ReportBuilder::build(&counting_experiment(), &table)
    }

    #[test]
    fn test_data_marks_absent_as_nan() {
        let data = render_data(&counting_plot());
        let lines: Vec<&str> = data.lines().collect();
        assert_eq!(lines, vec!["# x\tlf-cpp-4\tlf-cpp-1", "\"1\"\tNaN\t100"]);
    }

    #[test]
    fn test_box_script() {
        let script = render_script(&counting_plot(), "Counting.dat", "Counting.pdf");

        assert!(script.contains("set output \"Counting.pdf\""));
        assert!(script.contains("set style histogram cluster gap 1"));
        assert!(script.contains("set label 1 \"missing\" at first -0.1667, graph 0.02"));
        assert!(script.contains(
            "plot \"Counting.dat\" using 2:xtic(1) title \"LF C++ (4 threads)\" lc 4, \\"
        ));
        assert!(script.contains("     \"\" using 3 title \"LF C++ (1 thread)\" lc 2\n"));
    }

    #[test]
    fn test_line_script_and_custom_header() {
        let mut plot = counting_plot();
        plot.plotter = PlotterKind::Line;
        plot.gnuplot_header = "set logscale y\n".to_string();
        plot.series[1].color = "#1f77b4".to_string();

        let script = render_script(&plot, "Counting.dat", "Counting.pdf");

        assert!(script.contains("set style data linespoints"));
        assert!(script.contains("set logscale y\n"));
        assert!(script.contains("set label 1 \"missing\" at first 0.0000, graph 0.02"));
        assert!(script.contains("using 0:3:xtic(1) title \"LF C++ (1 thread)\" lc rgb \"#1f77b4\""));
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(quote("a\\b"), "\"a\\\\b\"");
    }
}
