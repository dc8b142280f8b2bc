// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Reflectance and transmission corrections for dielectric interfaces.

GRASP physical-optics calculations commonly assume ideal anti-reflection
coatings on lenses and windows. When the real part has no coating, the
computed field amplitudes must be scaled down by the transmission
coefficient of each uncoated interface. Interference between interfaces is
ignored, which is the appropriate model for cascaded PO calculations.
 */

use crate::algebra::{scale_cut, scale_grid};
use crate::cut::Cut;
use crate::grid::Grid;

/// Amplitude reflection coefficient at normal incidence for a wave moving
/// from a medium of refractive index `n1` into one of index `n2`.
pub fn reflectance(n1: f64, n2: f64) -> f64 {
    (n1 - n2) / (n1 + n2)
}

/// Power reflection coefficient at normal incidence between media of
/// indices `n1` and `n2`.
pub fn power_reflectance(n1: f64, n2: f64) -> f64 {
    let r = reflectance(n1, n2);
    r * r
}

/// Amplitude transmission coefficient at normal incidence between media of
/// indices `n1` and `n2`.
pub fn transmittance(n1: f64, n2: f64) -> f64 {
    (1.0 - power_reflectance(n1, n2)).sqrt()
}

/// Total amplitude transmission through the listed media, interface by
/// interface, with no interference between them.
pub fn total_transmittance(ns: &[f64]) -> f64 {
    ns.windows(2).map(|w| transmittance(w[0], w[1])).product()
}

/// A new grid with every field amplitude scaled by the total transmission
/// through the media chain `ns` (e.g. `[1.0, 1.5, 1.0]` for an uncoated
/// lens in air).
pub fn correct_grid_transmission(grid: &Grid, ns: &[f64]) -> Grid {
    scale_grid(grid, total_transmittance(ns))
}

/// A new cut file with every field amplitude scaled by the total
/// transmission through the media chain `ns`.
pub fn correct_cut_transmission(cut: &Cut, ns: &[f64]) -> Cut {
    scale_cut(cut, total_transmittance(ns))
}

/// A new grid corrected for a single interface with a precomputed power
/// reflection coefficient: amplitudes are scaled by `sqrt(1 - R)`.
pub fn correct_grid_reflection(grid: &Grid, power_reflection: f64) -> Grid {
    scale_grid(grid, (1.0 - power_reflection).sqrt())
}

/// A new cut file corrected for a single interface with a precomputed
/// power reflection coefficient.
pub fn correct_cut_reflection(cut: &Cut, power_reflection: f64) -> Cut {
    scale_cut(cut, (1.0 - power_reflection).sqrt())
}
