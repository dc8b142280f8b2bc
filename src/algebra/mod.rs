// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Algebra over parsed grids and cuts: scaling, coherent and incoherent
summation, and combination of analysis runs.

Every operation checks operand compatibility (polarization basis, field-set
count, array shapes) before touching any sample, so a failed call leaves
its operands untouched and returns a new entity on success.

Coherent and incoherent summation are *not* interchangeable: a coherent sum
adds complex amplitudes and assumes the operands share a phase reference,
while an incoherent sum adds powers and assumes no phase correlation. For
operands with non-trivial relative phase the two give different physical
answers.
 */

#[cfg(test)]
mod tests;

use ndarray::{Array2, Zip};
use rayon::prelude::*;

use crate::c64;
use crate::cut::Cut;
use crate::errors::{AlgebraError, BasisMismatchError, ShapeMismatchError};
use crate::grid::{FieldGrid, Grid};

/// How an incoherent sum reports its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SumMode {
    /// Summed power, `sum |E|^2`.
    Power,
    /// Magnitude of the summed power, `sqrt(sum |E|^2)`.
    Magnitude,
}

/// Whether [`combine_grids`]/[`combine_cuts`] adds or subtracts the second
/// operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombineOp {
    Add,
    Subtract,
}

fn check_field_pair(a: &FieldGrid, b: &FieldGrid) -> Result<(), ShapeMismatchError> {
    if a.shape() != b.shape() {
        let (nx, ny, nc) = a.shape();
        let (mx, my, mc) = b.shape();
        return Err(ShapeMismatchError {
            expected: vec![nx, ny, nc],
            got: vec![mx, my, mc],
        });
    }
    Ok(())
}

fn check_grid_pair(a: &Grid, b: &Grid) -> Result<(), AlgebraError> {
    if a.header.polarization != b.header.polarization {
        return Err(BasisMismatchError {
            lhs: a.header.polarization,
            rhs: b.header.polarization,
        }
        .into());
    }
    if a.fields.len() != b.fields.len() {
        return Err(AlgebraError::SetCount {
            lhs: a.fields.len(),
            rhs: b.fields.len(),
        });
    }
    for (fa, fb) in a.fields.iter().zip(&b.fields) {
        check_field_pair(fa, fb)?;
    }
    Ok(())
}

fn check_cut_pair(a: &Cut, b: &Cut) -> Result<(), AlgebraError> {
    if a.cut_sets.len() != b.cut_sets.len() {
        return Err(AlgebraError::SetCount {
            lhs: a.cut_sets.len(),
            rhs: b.cut_sets.len(),
        });
    }
    for (sa, sb) in a.cut_sets.iter().zip(&b.cut_sets) {
        if sa.cuts.len() != sb.cuts.len() {
            return Err(AlgebraError::SetCount {
                lhs: sa.cuts.len(),
                rhs: sb.cuts.len(),
            });
        }
        for (ca, cb) in sa.cuts.iter().zip(&sb.cuts) {
            if ca.header.polarization != cb.header.polarization {
                return Err(BasisMismatchError {
                    lhs: ca.header.polarization,
                    rhs: cb.header.polarization,
                }
                .into());
            }
            if ca.data.dim() != cb.data.dim() {
                return Err(ShapeMismatchError {
                    expected: vec![ca.data.dim().0, ca.data.dim().1],
                    got: vec![cb.data.dim().0, cb.data.dim().1],
                }
                .into());
            }
        }
    }
    Ok(())
}

fn and_mask(out: &mut Array2<bool>, other: &Array2<bool>) {
    Zip::from(out).and(other).for_each(|m, &o| *m &= o);
}

/// Multiply every sample of every field set by `factor`. The validity mask
/// is unchanged.
pub fn scale_grid(grid: &Grid, factor: impl Into<c64>) -> Grid {
    let factor = factor.into();
    let mut out = grid.clone();
    out.fields.par_iter_mut().for_each(|f| {
        f.field.mapv_inplace(|v| v * factor);
    });
    out
}

/// Multiply every sample of every cut by `factor`.
pub fn scale_cut(cut: &Cut, factor: impl Into<c64>) -> Cut {
    let factor = factor.into();
    let mut out = cut.clone();
    for set in &mut out.cut_sets {
        for c in &mut set.cuts {
            c.data.mapv_inplace(|v| v * factor);
        }
    }
    out
}

/// Element-wise complex sum of grids that share a phase reference. The
/// result's validity mask is the AND of the operands' masks. A
/// single-element slice returns a value numerically identical to it.
pub fn coherent_sum_grids(grids: &[Grid]) -> Result<Grid, AlgebraError> {
    let (first, rest) = grids.split_first().ok_or(AlgebraError::NoOperands)?;
    for g in rest {
        check_grid_pair(first, g)?;
    }

    let mut out = first.clone();
    for g in rest {
        for (fo, fg) in out.fields.iter_mut().zip(&g.fields) {
            fo.field += &fg.field;
            and_mask(&mut fo.mask, &fg.mask);
        }
    }
    Ok(out)
}

/// Element-wise power sum of grids with uncorrelated phases. Every result
/// sample is real-valued: summed power, or its square root when `mode` is
/// [`SumMode::Magnitude`].
pub fn incoherent_sum_grids(grids: &[Grid], mode: SumMode) -> Result<Grid, AlgebraError> {
    let (first, rest) = grids.split_first().ok_or(AlgebraError::NoOperands)?;
    for g in rest {
        check_grid_pair(first, g)?;
    }

    let mut out = first.clone();
    for fo in &mut out.fields {
        fo.field.mapv_inplace(|v| c64::new(v.norm_sqr(), 0.0));
    }
    for g in rest {
        for (fo, fg) in out.fields.iter_mut().zip(&g.fields) {
            Zip::from(&mut fo.field).and(&fg.field).for_each(|o, &v| {
                *o += c64::new(v.norm_sqr(), 0.0);
            });
            and_mask(&mut fo.mask, &fg.mask);
        }
    }
    if mode == SumMode::Magnitude {
        for fo in &mut out.fields {
            fo.field.mapv_inplace(|v| c64::new(v.re.sqrt(), 0.0));
        }
    }
    Ok(out)
}

/// Add or subtract two analysis runs of the same configuration, field set
/// by field set (e.g. apply an aperture-blockage correction to an
/// unobstructed result).
pub fn combine_grids(a: &Grid, b: &Grid, op: CombineOp) -> Result<Grid, AlgebraError> {
    check_grid_pair(a, b)?;

    let mut out = a.clone();
    for (fo, fb) in out.fields.iter_mut().zip(&b.fields) {
        match op {
            CombineOp::Add => fo.field += &fb.field,
            CombineOp::Subtract => fo.field -= &fb.field,
        }
        and_mask(&mut fo.mask, &fb.mask);
    }
    Ok(out)
}

/// Element-wise complex sum of cut files that share a phase reference.
pub fn coherent_sum_cuts(cuts: &[Cut]) -> Result<Cut, AlgebraError> {
    let (first, rest) = cuts.split_first().ok_or(AlgebraError::NoOperands)?;
    for c in rest {
        check_cut_pair(first, c)?;
    }

    let mut out = first.clone();
    for c in rest {
        for (so, sc) in out.cut_sets.iter_mut().zip(&c.cut_sets) {
            for (co, cc) in so.cuts.iter_mut().zip(&sc.cuts) {
                co.data += &cc.data;
            }
        }
    }
    Ok(out)
}

/// Element-wise power sum of cut files with uncorrelated phases; see
/// [`incoherent_sum_grids`].
pub fn incoherent_sum_cuts(cuts: &[Cut], mode: SumMode) -> Result<Cut, AlgebraError> {
    let (first, rest) = cuts.split_first().ok_or(AlgebraError::NoOperands)?;
    for c in rest {
        check_cut_pair(first, c)?;
    }

    let mut out = first.clone();
    for so in &mut out.cut_sets {
        for co in &mut so.cuts {
            co.data.mapv_inplace(|v| c64::new(v.norm_sqr(), 0.0));
        }
    }
    for c in rest {
        for (so, sc) in out.cut_sets.iter_mut().zip(&c.cut_sets) {
            for (co, cc) in so.cuts.iter_mut().zip(&sc.cuts) {
                Zip::from(&mut co.data).and(&cc.data).for_each(|o, &v| {
                    *o += c64::new(v.norm_sqr(), 0.0);
                });
            }
        }
    }
    if mode == SumMode::Magnitude {
        for so in &mut out.cut_sets {
            for co in &mut so.cuts {
                co.data.mapv_inplace(|v| c64::new(v.re.sqrt(), 0.0));
            }
        }
    }
    Ok(out)
}

/// Add or subtract two cut files of the same configuration, cut by cut.
pub fn combine_cuts(a: &Cut, b: &Cut, op: CombineOp) -> Result<Cut, AlgebraError> {
    check_cut_pair(a, b)?;

    let mut out = a.clone();
    for (so, sb) in out.cut_sets.iter_mut().zip(&b.cut_sets) {
        for (co, cb) in so.cuts.iter_mut().zip(&sb.cuts) {
            match op {
                CombineOp::Add => co.data += &cb.data,
                CombineOp::Subtract => co.data -= &cb.data,
            }
        }
    }
    Ok(out)
}

/// Collapse the field sets of one grid into a single set by coherent
/// summation (e.g. to merge per-source results computed against a common
/// phase reference).
pub fn coherent_sum_sets(grid: &Grid) -> Result<Grid, AlgebraError> {
    let (first, rest) = grid.fields.split_first().ok_or(AlgebraError::NoOperands)?;
    for f in rest {
        check_field_pair(first, f)?;
    }

    let mut out_field = first.clone();
    for f in rest {
        out_field.field += &f.field;
        and_mask(&mut out_field.mask, &f.mask);
    }
    Ok(single_set_grid(grid, out_field))
}

/// Collapse the field sets of one grid into a single set by incoherent
/// (power) summation, e.g. to merge independent frequency results.
pub fn incoherent_sum_sets(grid: &Grid, mode: SumMode) -> Result<Grid, AlgebraError> {
    let (first, rest) = grid.fields.split_first().ok_or(AlgebraError::NoOperands)?;
    for f in rest {
        check_field_pair(first, f)?;
    }

    let mut out_field = first.clone();
    out_field
        .field
        .mapv_inplace(|v| c64::new(v.norm_sqr(), 0.0));
    for f in rest {
        Zip::from(&mut out_field.field)
            .and(&f.field)
            .for_each(|o, &v| {
                *o += c64::new(v.norm_sqr(), 0.0);
            });
        and_mask(&mut out_field.mask, &f.mask);
    }
    if mode == SumMode::Magnitude {
        out_field
            .field
            .mapv_inplace(|v| c64::new(v.re.sqrt(), 0.0));
    }
    Ok(single_set_grid(grid, out_field))
}

/// A grid like `grid` but holding just the one collapsed field set.
fn single_set_grid(grid: &Grid, field: FieldGrid) -> Grid {
    let mut header = grid.header.clone();
    header.nset = 1;
    header.freqs.truncate(1);
    header.beam_centers.truncate(1);
    Grid {
        header,
        fields: vec![field],
    }
}
