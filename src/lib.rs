// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Reader and field algebra for output files from TICRA GRASP, TICRA Tools and
CHAMP.

Two line-oriented text formats are supported: field-on-grid files (`*.grd`)
and field-cut files (`*.cut`). Both are header-driven: counts declared in
the header determine exactly how much data must follow, and a mismatch is a
parse error rather than a silent truncation. Parsed entities hold complex
field samples in [`ndarray`] arrays and can be scaled, summed coherently or
incoherently, combined across analysis runs, and corrected for missing
anti-reflection coatings.
 */

pub mod algebra;
pub mod analysis;
pub mod corrections;
pub mod cut;
pub mod errors;
pub mod grid;
pub(crate) mod reader;
pub mod types;

pub use cut::{Cut, CutHeader, CutSet, SingleCut};
pub use errors::*;
pub use grid::{FieldGrid, Grid, GridHeader};
pub use types::*;

// Re-exports.
pub use num_complex::Complex64 as c64;
