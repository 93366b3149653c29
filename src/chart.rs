use crate::compute::Totals;
use rust_decimal::{prelude::ToPrimitive, Decimal};
use std::{fmt::Write, path::Path};
use svg::{
    node::{
        element::{Line, Rectangle, Text},
        Text as TextNode,
    },
    Document,
};

/// Width in characters of the longest bar on the terminal.
const BAR_WIDTH: usize = 40;

/// Horizontal bar chart of the totals, one line per category, longest bar for
/// the biggest spend. Ends with the overall total.
pub(crate) fn text_chart(totals: &Totals, total: Decimal) -> String {
    let mut out = String::new();
    let max = totals.values().copied().max().unwrap_or_default();
    let label_width = totals
        .keys()
        .map(|c| c.name().chars().count())
        .max()
        .unwrap_or(0)
        .max("Total".len());
    for (category, amount) in totals {
        let bar = "#".repeat(bar_len(scale(amount.to_f64(), max.to_f64()), BAR_WIDTH));
        let _ = writeln!(
            out,
            "{:<label_width$}  {:<BAR_WIDTH$}  {:>10.2}",
            category.name(),
            bar,
            amount
        );
    }
    let _ = writeln!(
        out,
        "{:<label_width$}  {:<BAR_WIDTH$}  {:>10.2}",
        "Total",
        "",
        total
    );
    out
}

/// Fraction of the biggest value, 0 when there's nothing to compare to.
fn scale(value: Option<f64>, max: Option<f64>) -> f64 {
    match (value, max) {
        (Some(value), Some(max)) if max > 0.0 => value / max,
        _ => 0.0,
    }
}

/// Any nonzero amount gets at least one cell so it doesn't look absent.
fn bar_len(fraction: f64, width: usize) -> usize {
    if fraction <= 0.0 {
        return 0;
    }
    ((fraction * width as f64).round() as usize).clamp(1, width)
}

const SVG_WIDTH: f64 = 640.0;
const SVG_HEIGHT: f64 = 400.0;
const MARGIN: f64 = 60.0;

/// Vertical bar chart "Expenses by Category", saved as an SVG file.
pub(crate) fn save_svg(totals: &Totals, path: &Path) -> std::io::Result<()> {
    svg::save(path, &svg_chart(totals))
}

fn svg_chart(totals: &Totals) -> Document {
    let plot_width = SVG_WIDTH - 2.0 * MARGIN;
    let plot_height = SVG_HEIGHT - 2.0 * MARGIN;
    let baseline = SVG_HEIGHT - MARGIN;
    let max = totals.values().copied().max().unwrap_or_default().to_f64();
    let slot = plot_width / totals.len().max(1) as f64;

    let mut document = Document::new()
        .set("viewBox", (0.0, 0.0, SVG_WIDTH, SVG_HEIGHT))
        .set("font-family", "sans-serif")
        .set("font-size", 12)
        .add(label(SVG_WIDTH / 2.0, MARGIN / 2.0, "Expenses by Category").set("font-size", 16))
        .add(label(SVG_WIDTH / 2.0, SVG_HEIGHT - 10.0, "Category"))
        .add(
            label(15.0, SVG_HEIGHT / 2.0, "Total Spent")
                .set("transform", format!("rotate(-90 15 {})", SVG_HEIGHT / 2.0)),
        );

    for (i, (category, amount)) in totals.iter().enumerate() {
        // amounts read back from the file aren't checked, a negative one gets no bar
        let height = scale(amount.to_f64(), max).max(0.0) * plot_height;
        let x = MARGIN + i as f64 * slot;
        let center = x + slot / 2.0;
        document = document
            .add(
                Rectangle::new()
                    .set("x", x + slot * 0.1)
                    .set("y", baseline - height)
                    .set("width", slot * 0.8)
                    .set("height", height)
                    .set("fill", COLORS[i % COLORS.len()]),
            )
            .add(label(center, baseline + 16.0, category.name()))
            .add(label(center, baseline - height - 4.0, &format!("{amount:.2}")));
    }

    document.add(
        Line::new()
            .set("x1", MARGIN)
            .set("x2", SVG_WIDTH - MARGIN)
            .set("y1", baseline)
            .set("y2", baseline)
            .set("stroke", "black")
            .set("stroke-width", 1.5),
    )
}

fn label(x: f64, y: f64, content: &str) -> Text {
    Text::new()
        .set("x", x)
        .set("y", y)
        .set("text-anchor", "middle")
        .add(TextNode::new(content))
}

const COLORS: &[&str] = &[
    "steelblue",
    "darkorange",
    "seagreen",
    "firebrick",
    "mediumpurple",
    "sienna",
    "orchid",
];
