//! Bar and pie charts of the work plan's per-role effort.

use std::f64::consts::TAU;

use super::svg::{fitted_font_size, Anchor, Baseline, Point, SvgDocument, TextStyle};
use super::{format_tick, nice_step};
use crate::assessment::RoleSummary;
use crate::palette::{AZURE, BAR_CYCLE, BLACK, GRID, PIE_CYCLE};

/// Bar chart size in pixels (6.5 × 3.6 in at 180 dpi).
pub const BAR_SIZE: (u32, u32) = (1170, 648);
/// Pie chart size in pixels (6 × 3.6 in at 180 dpi).
pub const PIE_SIZE: (u32, u32) = (1080, 648);

pub const BAR_TITLE: &str = "Esfuerzo por rol (horas)";
pub const BAR_Y_LABEL: &str = "Horas";
pub const PIE_TITLE: &str = "Distribución de esfuerzo por rol (%)";

/// Hours per role with missing, negative or non-numeric values treated as zero.
pub fn bar_values(roles: &[RoleSummary]) -> Vec<f64> {
    roles
        .iter()
        .map(|role| role.hours.unwrap_or(0.0).max(0.0))
        .collect()
}

/// Normalised pie fractions from each role's percentage; all zero when the total is zero.
pub fn pie_fractions(roles: &[RoleSummary]) -> Vec<f64> {
    let values: Vec<f64> = roles
        .iter()
        .map(|role| role.share_percent.unwrap_or(0.0).max(0.0))
        .collect();
    // scaled by the largest share first so huge inputs cannot overflow the sum
    let largest = values.iter().copied().fold(0.0, f64::max);
    if largest <= 0.0 {
        return vec![0.0; values.len()];
    }
    let scaled: Vec<f64> = values.into_iter().map(|value| value / largest).collect();
    let total: f64 = scaled.iter().sum();
    scaled.into_iter().map(|value| value / total).collect()
}

/// Wedge label, e.g. `42.9%`.
pub fn percent_label(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

/// Upper bound on the number of y-axis ticks.
const MAX_TICKS: usize = 20;

/// Y-axis scale for the bar chart: the axis maximum and its tick values, all finite.
///
/// The largest bar gets 10% headroom, as on the original matplotlib axis.
pub fn hour_axis(values: &[f64]) -> (f64, Vec<f64>) {
    let max = values
        .iter()
        .copied()
        .filter(|value| value.is_finite())
        .fold(0.0, f64::max)
        .min(f64::MAX / 4.0);
    let step = nice_step(max * 1.1, 5);
    let axis_max = ((max * 1.1) / step).ceil().max(1.0) * step;
    let count = ((axis_max / step).round() as usize).min(MAX_TICKS);
    let ticks = (0..=count).map(|index| index as f64 * step).collect();
    (axis_max, ticks)
}

fn draw_title(svg: &mut SvgDocument, title: &str) {
    let centre = svg.width() as f64 / 2.0;
    svg.text(
        title,
        (centre, 18.0),
        TextStyle::new(30.0, AZURE).anchored(Anchor::Middle, Baseline::Top),
    );
}

/// Role labels under the bars are tilted this many degrees counter-clockwise.
const ROLE_LABEL_TILT: f64 = 15.0;

pub(super) fn draw_hours(svg: &mut SvgDocument, roles: &[RoleSummary]) {
    let values = bar_values(roles);
    let (left, right, top, bottom) = (130.0, BAR_SIZE.0 as f64 - 30.0, 80.0, BAR_SIZE.1 as f64 - 120.0);
    let plot_height = bottom - top;

    let (axis_max, ticks) = hour_axis(&values);
    let y_of = |value: f64| bottom - (value / axis_max).min(1.0) * plot_height;

    for tick in ticks {
        let y = y_of(tick);
        svg.line((left - 8.0, y), (left, y), 1.5, BLACK);
        svg.text(
            &format_tick(tick),
            (left - 14.0, y),
            TextStyle::new(20.0, BLACK).anchored(Anchor::End, Baseline::Middle),
        );
    }
    svg.line((left, top), (left, bottom), 1.5, BLACK);
    svg.line((left, bottom), (right, bottom), 1.5, BLACK);

    if !values.is_empty() {
        let slot = (right - left) / values.len() as f64;
        let bar_width = slot * 0.8;
        for (index, (role, value)) in roles.iter().zip(&values).enumerate() {
            let centre = left + slot * (index as f64 + 0.5);
            let (x0, x1) = (centre - bar_width / 2.0, centre + bar_width / 2.0);
            let y = y_of(*value);
            svg.rect(
                (x0, y),
                (x1, bottom),
                BAR_CYCLE[index % BAR_CYCLE.len()],
                Some((BLACK, 2.4)),
            );

            svg.text(
                &role.hours_text,
                (centre, y - plot_height * 0.02 - 4.0),
                TextStyle::new(20.0, BLACK).anchored(Anchor::Middle, Baseline::Bottom),
            );
            let size = fitted_font_size(&role.role, 22.0, 12.0, (slot * 1.5).min(300.0));
            svg.text(
                &role.role,
                (centre, bottom + 12.0),
                TextStyle::new(size, BLACK)
                    .anchored(Anchor::End, Baseline::Top)
                    .rotated(-ROLE_LABEL_TILT),
            );
        }
    }

    draw_title(svg, BAR_TITLE);
    svg.text(
        BAR_Y_LABEL,
        (30.0, (top + bottom) / 2.0),
        TextStyle::new(22.0, BLACK)
            .anchored(Anchor::Middle, Baseline::Middle)
            .rotated(-90.0),
    );
}

/// Polygon approximating the wedge from `start` to `end`, angles counter-clockwise from 3 o'clock.
pub fn wedge(centre: Point, radius: f64, start: f64, end: f64) -> Vec<Point> {
    let steps = (((end - start) / TAU) * 180.0).ceil().max(1.0) as usize;
    let mut points = Vec::with_capacity(steps + 2);
    points.push(centre);
    for step in 0..=steps {
        let angle = start + (end - start) * step as f64 / steps as f64;
        points.push(on_circle(centre, radius, angle));
    }
    points
}

fn on_circle(centre: Point, radius: f64, angle: f64) -> Point {
    (centre.0 + radius * angle.cos(), centre.1 - radius * angle.sin())
}

pub(super) fn draw_share(svg: &mut SvgDocument, roles: &[RoleSummary]) {
    let fractions = pie_fractions(roles);
    let centre = (PIE_SIZE.0 as f64 / 2.0, PIE_SIZE.1 as f64 / 2.0 + 30.0);
    let radius = 220.0;

    let mut start = 0.0;
    for (index, (role, fraction)) in roles.iter().zip(&fractions).enumerate() {
        if *fraction <= 0.0 {
            continue;
        }
        let end = start + fraction * TAU;
        svg.polygon(
            &wedge(centre, radius, start, end),
            PIE_CYCLE[index % PIE_CYCLE.len()],
            1.0,
        );

        let middle = (start + end) / 2.0;
        let outer = on_circle(centre, radius * 1.1, middle);
        let anchor = if middle.cos() >= 0.0 { Anchor::Start } else { Anchor::End };
        svg.text(
            &role.role,
            outer,
            TextStyle::new(22.0, BLACK).anchored(anchor, Baseline::Middle),
        );
        svg.text(
            &percent_label(*fraction),
            on_circle(centre, radius * 0.6, middle),
            TextStyle::new(20.0, BLACK).anchored(Anchor::Middle, Baseline::Middle),
        );
        start = end;
    }

    if fractions.iter().all(|fraction| *fraction <= 0.0) {
        svg.circle(centre, radius, 1.5, GRID);
    }
    draw_title(svg, PIE_TITLE);
}
