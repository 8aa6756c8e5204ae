//! Radar (spider) chart comparing current and projected pillar percentages.

use std::f64::consts::TAU;

use super::svg::{fitted_font_size, Anchor, Baseline, Point, SvgDocument, TextStyle};
use crate::palette::{Rgb, AZURE, BLACK, DARK_GREY, GRID, VIOLET};
use crate::scoring::PillarSeries;

/// Chart size in pixels (about 7.3 in square at 150 dpi).
pub const SIZE: (u32, u32) = (1100, 1100);

pub const TITLE: &str = "Evaluación WAF: Actual vs Proyección";
pub const CURRENT_LABEL: &str = "Situación actual (#0078D4)";
pub const PROJECTED_LABEL: &str = "Situación proyectada (#7F3FBF)";

/// Percentages at which concentric rings are drawn.
pub const RINGS: [f64; 5] = [20.0, 40.0, 60.0, 80.0, 100.0];

const CENTRE: Point = (550.0, 600.0);
const RADIUS: f64 = 360.0;
const LINE_WIDTH: f64 = 5.0;
const CURRENT_ALPHA: f64 = 0.15;
const PROJECTED_ALPHA: f64 = 0.12;

/// Angle of each axis, measured clockwise from straight up.
pub fn axis_angles(count: usize) -> Vec<f64> {
    (0..count)
        .map(|index| index as f64 / count as f64 * TAU)
        .collect()
}

/// Repeats the first value at the end so a polygon closes on itself.
pub fn close_series(values: &[f64]) -> Vec<f64> {
    let mut closed = values.to_vec();
    if let Some(first) = values.first() {
        closed.push(*first);
    }
    closed
}

/// Chart position at `fraction` of `radius` along the axis at `angle`.
pub fn polar_point(centre: Point, radius: f64, angle: f64, fraction: f64) -> Point {
    (
        centre.0 + radius * fraction * angle.sin(),
        centre.1 - radius * fraction * angle.cos(),
    )
}

/// Closed polygon for a percentage series: `values.len() + 1` points, last equal to first.
pub fn closed_polygon(values: &[f64], centre: Point, radius: f64) -> Vec<Point> {
    let mut angles = axis_angles(values.len());
    if let Some(first) = angles.first().copied() {
        angles.push(first);
    }
    close_series(values)
        .iter()
        .zip(angles)
        .map(|(value, angle)| polar_point(centre, radius, angle, value.clamp(0.0, 100.0) / 100.0))
        .collect()
}

/// Anchor of the label for `ring`, on the first (upward) axis just right of the spoke.
pub fn ring_label_anchor(ring: f64) -> Point {
    let (x, y) = polar_point(CENTRE, RADIUS, 0.0, ring / 100.0);
    (x + 6.0, y)
}

pub(super) fn draw(svg: &mut SvgDocument, series: &PillarSeries) {
    draw_grid(svg, series);

    let current = closed_polygon(&series.current, CENTRE, RADIUS);
    let projected = closed_polygon(&series.projected, CENTRE, RADIUS);
    draw_series(svg, &current, AZURE, CURRENT_ALPHA);
    draw_series(svg, &projected, VIOLET, PROJECTED_ALPHA);

    svg.text(
        TITLE,
        (SIZE.0 as f64 / 2.0, 40.0),
        TextStyle::new(40.0, AZURE)
            .anchored(Anchor::Middle, Baseline::Top)
            .bold(),
    );
    draw_legend(svg);
}

fn draw_grid(svg: &mut SvgDocument, series: &PillarSeries) {
    for ring in RINGS {
        svg.circle(CENTRE, RADIUS * ring / 100.0, 1.5, GRID);
    }

    for (label, angle) in series.labels.iter().zip(axis_angles(series.len())) {
        svg.line(CENTRE, polar_point(CENTRE, RADIUS, angle, 1.0), 1.5, GRID);

        let anchor = polar_point(CENTRE, RADIUS, angle, 1.1);
        let sin = angle.sin();
        let h_align = if sin > 0.2 {
            Anchor::Start
        } else if sin < -0.2 {
            Anchor::End
        } else {
            Anchor::Middle
        };
        let cos = angle.cos();
        let v_align = if cos > 0.2 {
            Baseline::Bottom
        } else if cos < -0.2 {
            Baseline::Top
        } else {
            Baseline::Middle
        };
        let room = match h_align {
            Anchor::Start => SIZE.0 as f64 - anchor.0 - 10.0,
            Anchor::End => anchor.0 - 10.0,
            Anchor::Middle => SIZE.0 as f64 / 2.0,
        };
        let size = fitted_font_size(label, 26.0, 14.0, room);
        svg.text(
            label,
            anchor,
            TextStyle::new(size, BLACK).anchored(h_align, v_align),
        );
    }

    // on top of the spokes
    for ring in RINGS {
        svg.text(
            &format!("{}%", ring as u32),
            ring_label_anchor(ring),
            TextStyle::new(22.0, DARK_GREY).anchored(Anchor::Start, Baseline::Bottom),
        );
    }
}

fn draw_series(svg: &mut SvgDocument, polygon: &[Point], color: Rgb, alpha: f64) {
    svg.polygon(polygon, color, alpha);
    svg.polyline(polygon, LINE_WIDTH, color);
}

fn draw_legend(svg: &mut SvgDocument) {
    let left = SIZE.0 as f64 - 470.0;
    let top = 110.0;
    for (row, (label, color)) in [(CURRENT_LABEL, AZURE), (PROJECTED_LABEL, VIOLET)]
        .into_iter()
        .enumerate()
    {
        let y = top + row as f64 * 38.0;
        svg.line((left, y), (left + 50.0, y), LINE_WIDTH, color);
        svg.text(
            label,
            (left + 62.0, y),
            TextStyle::new(24.0, BLACK).anchored(Anchor::Start, Baseline::Middle),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polygons_close_on_their_first_point() {
        let values = [40.0, 60.0, 80.0, 20.0, 100.0];
        let polygon = closed_polygon(&values, (0.0, 0.0), 100.0);
        assert_eq!(polygon.len(), values.len() + 1);
        assert_eq!(polygon.first(), polygon.last());
        assert_eq!(close_series(&values).last(), Some(&40.0));
    }

    #[test]
    fn first_axis_points_up_and_axes_run_clockwise() {
        let polygon = closed_polygon(&[100.0, 100.0, 100.0, 100.0], (0.0, 0.0), 10.0);
        let near = |a: Point, b: Point| (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9;
        assert!(near(polygon[0], (0.0, -10.0)));
        assert!(near(polygon[1], (10.0, 0.0)));
        assert!(near(polygon[2], (0.0, 10.0)));
        assert!(near(polygon[3], (-10.0, 0.0)));
    }

    #[test]
    fn values_outside_the_scale_are_clamped() {
        let polygon = closed_polygon(&[150.0, -20.0], (0.0, 0.0), 10.0);
        assert!((polygon[0].1 + 10.0).abs() < 1e-9);
        assert!(polygon[1].0.abs() < 1e-9 && polygon[1].1.abs() < 1e-9);
    }

    #[test]
    fn empty_series_yield_empty_polygons() {
        assert!(close_series(&[]).is_empty());
        assert!(closed_polygon(&[], (0.0, 0.0), 10.0).is_empty());
        assert!(axis_angles(0).is_empty());
    }

    #[test]
    fn ring_labels_sit_on_the_upward_axis() {
        for ring in RINGS {
            let (x, y) = ring_label_anchor(ring);
            assert!((x - (CENTRE.0 + 6.0)).abs() < 1e-9);
            assert!((y - (CENTRE.1 - RADIUS * ring / 100.0)).abs() < 1e-9);
        }
    }

    #[test]
    fn chart_markup_contains_both_series_and_legend() {
        let series = PillarSeries {
            labels: vec!["Seguridad".to_owned(), "Confiabilidad".to_owned(), "Costos".to_owned()],
            current: vec![40.0, 60.0, 20.0],
            projected: vec![68.0, 88.0, 48.0],
        };
        let mut svg = SvgDocument::new(SIZE.0, SIZE.1, true);
        draw(&mut svg, &series);
        let markup = svg.finish();
        assert_eq!(markup.matches("<polygon").count(), 2);
        assert!(markup.contains("fill-opacity='0.15'"));
        assert!(markup.contains("fill-opacity='0.12'"));
        assert!(markup.contains(CURRENT_LABEL));
        assert!(markup.contains(">20%</text>"));
    }

    #[test]
    fn single_pillar_closes_to_two_points() {
        let polygon = closed_polygon(&[50.0], (0.0, 0.0), 10.0);
        assert_eq!(polygon.len(), 2);
        assert_eq!(polygon[0], polygon[1]);
    }
}
