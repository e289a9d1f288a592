//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual checks of a model run in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - one marker per series (`*`, `o`, `x`, `+`, `#`, cycling)
//! - `-` segments between consecutive points of a series

use crate::results::{Series, period_axis};

pub const MARKERS: [char; 5] = ['*', 'o', 'x', '+', '#'];

/// Render one or more series over a shared period axis.
pub fn render_series_plot(series: &[Series], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let periods = period_axis(series);
    let n = periods.len();
    let (x_min, x_max) = if n >= 2 { (0.0, n as f64 - 1.0) } else { (0.0, 1.0) };

    let (y_min, y_max) = y_range(series).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Segments first so markers overlay them.
    for s in series {
        let mut prev = None;
        for (t, v) in s.axis_points(&periods) {
            let x = map_x(t, x_min, x_max, width);
            let y = map_y(v, y_min, y_max, height);
            if let Some((x0, y0)) = prev {
                draw_line(&mut grid, x0, y0, x, y, '-');
            }
            prev = Some((x, y));
        }
    }

    for (idx, s) in series.iter().enumerate() {
        let marker = MARKERS[idx % MARKERS.len()];
        for (t, v) in s.axis_points(&periods) {
            let x = map_x(t, x_min, x_max, width);
            let y = map_y(v, y_min, y_max, height);
            grid[y][x] = marker;
        }
    }

    let mut out = String::new();
    let period_range = match (periods.first(), periods.last()) {
        (Some(a), Some(b)) => format!("{a} .. {b}"),
        _ => "none".to_string(),
    };
    out.push_str(&format!(
        "Plot: periods=[{period_range}] ({n}) | y=[{y_min:.2}, {y_max:.2}]\n"
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    let legend: Vec<String> = series
        .iter()
        .enumerate()
        .map(|(idx, s)| format!("{} {}", MARKERS[idx % MARKERS.len()], s.label))
        .collect();
    if !legend.is_empty() {
        out.push_str(&format!("Legend: {}\n", legend.join("  ")));
    }

    out
}

fn y_range(series: &[Series]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for p in series.iter().flat_map(|s| &s.points) {
        min_y = min_y.min(p.value);
        max_y = max_y.max(p.value);
    }

    if min_y.is_finite() && max_y.is_finite() && max_y >= min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = if span > 0.0 {
        span * frac
    } else {
        (min.abs() * frac).max(1.0)
    };
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
