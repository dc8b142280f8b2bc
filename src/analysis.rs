// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Beam-analysis helpers over parsed field grids.

use crate::grid::FieldGrid;

/// Find the grid position of the peak magnitude of component `comp`.
///
/// Points outside `max_radius` or inside `min_radius` (measured from the
/// beam center) are ignored, as are points the file marked out of range.
/// Returns `None` when no point survives the filters.
pub fn find_peak(
    field: &FieldGrid,
    comp: usize,
    min_radius: Option<f64>,
    max_radius: Option<f64>,
) -> Option<(f64, f64)> {
    let (xs, ys) = field.positions_1d();
    let radii = field.radius_grid(None);

    let mut best: Option<(f64, (f64, f64))> = None;
    for i in 0..field.nx {
        for j in 0..field.ny {
            if !field.mask[[i, j]] {
                continue;
            }
            if let Some(r) = max_radius {
                if radii[[i, j]] > r {
                    continue;
                }
            }
            if let Some(r) = min_radius {
                if radii[[i, j]] < r {
                    continue;
                }
            }
            let mag = field.field[[i, j, comp]].norm();
            if best.map_or(true, |(m, _)| mag > m) {
                best = Some((mag, (xs[i], ys[j])));
            }
        }
    }
    best.map(|(_, pos)| pos)
}

/// Find the center of illumination: the magnitude-weighted "center of
/// mass" of component `comp`.
///
/// Contributions at or below `trunc_level` are ignored, as are points
/// outside `max_radius` or inside `min_radius` and points the file marked
/// out of range. Returns `None` when nothing contributes.
pub fn find_center(
    field: &FieldGrid,
    comp: usize,
    trunc_level: f64,
    min_radius: Option<f64>,
    max_radius: Option<f64>,
) -> Option<(f64, f64)> {
    let (grid_x, grid_y) = field.positions();
    let radii = field.radius_grid(None);

    let mut x_illum = 0.0;
    let mut y_illum = 0.0;
    let mut norm = 0.0;
    for i in 0..field.nx {
        for j in 0..field.ny {
            if !field.mask[[i, j]] {
                continue;
            }
            if let Some(r) = max_radius {
                if radii[[i, j]] > r {
                    continue;
                }
            }
            if let Some(r) = min_radius {
                if radii[[i, j]] < r {
                    continue;
                }
            }
            let mag = field.field[[i, j, comp]].norm();
            if mag <= trunc_level {
                continue;
            }
            x_illum += grid_x[[i, j]] * mag;
            y_illum += grid_y[[i, j]] * mag;
            norm += mag;
        }
    }

    if norm == 0.0 {
        None
    } else {
        Some((x_illum / norm, y_illum / norm))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::c64;
    use approx::assert_abs_diff_eq;
    use ndarray::prelude::*;

    /// A 5x5 grid on [-1, 1]^2, component 0 peaking at (0.5, -0.5).
    fn test_field() -> FieldGrid {
        let nx = 5;
        let ny = 5;
        let mut field = Array3::zeros((nx, ny, 2));
        field.mapv_inplace(|_: c64| c64::new(0.1, 0.0));
        // Peak at i=3 (x=0.5), j=1 (y=-0.5).
        field[[3, 1, 0]] = c64::new(0.0, 2.0);
        FieldGrid {
            beam_center: (0.0, 0.0),
            min_x: -1.0,
            min_y: -1.0,
            max_x: 1.0,
            max_y: 1.0,
            nx,
            ny,
            step_x: 0.5,
            step_y: 0.5,
            sparse: false,
            field,
            mask: Array2::from_elem((nx, ny), true),
        }
    }

    #[test]
    fn peak_location() {
        let f = test_field();
        let (x, y) = find_peak(&f, 0, None, None).unwrap();
        assert_abs_diff_eq!(x, 0.5);
        assert_abs_diff_eq!(y, -0.5);
    }

    #[test]
    fn peak_respects_max_radius() {
        let f = test_field();
        // The true peak sits at radius ~0.707; exclude it and the search
        // falls back to the flat background.
        let peak = find_peak(&f, 0, None, Some(0.4));
        assert!(peak.is_some());
        let (x, y) = peak.unwrap();
        assert!(x * x + y * y <= 0.4 * 0.4 + 1e-12);
    }

    #[test]
    fn peak_respects_mask() {
        let mut f = test_field();
        f.mask[[3, 1]] = false;
        let (x, y) = find_peak(&f, 0, None, None).unwrap();
        assert!((x, y) != (0.5, -0.5));
    }

    #[test]
    fn center_of_uniform_field_is_origin() {
        let mut f = test_field();
        f.field[[3, 1, 0]] = c64::new(0.1, 0.0);
        let (x, y) = find_center(&f, 0, 0.0, None, None).unwrap();
        assert_abs_diff_eq!(x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn center_pulls_toward_peak() {
        let f = test_field();
        let (x, y) = find_center(&f, 0, 0.0, None, None).unwrap();
        assert!(x > 0.0);
        assert!(y < 0.0);
    }

    #[test]
    fn center_truncation_isolates_peak() {
        let f = test_field();
        // Everything at or below the background level drops out.
        let (x, y) = find_center(&f, 0, 0.1, None, None).unwrap();
        assert_abs_diff_eq!(x, 0.5);
        assert_abs_diff_eq!(y, -0.5);
    }

    #[test]
    fn fully_masked_field_has_no_center() {
        let mut f = test_field();
        f.mask.fill(false);
        assert!(find_center(&f, 0, 0.0, None, None).is_none());
        assert!(find_peak(&f, 0, None, None).is_none());
    }
}
