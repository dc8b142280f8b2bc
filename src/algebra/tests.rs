// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests for the field algebra.

use super::*;
use approx::assert_abs_diff_eq;
use ndarray::prelude::*;

use crate::cut::{CutHeader, SingleCut};
use crate::grid::{FieldGrid, Grid, GridHeader};
use crate::types::{CutAxis, CutGeometry, FileVersion, GridKind, Polarization};

fn test_header(polarization: Polarization, nset: usize, components: usize) -> GridHeader {
    GridHeader {
        text: vec![],
        version: FileVersion::TicraTools,
        freqs: (0..nset).map(|i| 82.0 + 15.0 * i as f64).collect(),
        freq_unit: "GHz".to_string(),
        ktype: 1,
        nset,
        polarization,
        components,
        kind: GridKind::Uv,
        beam_centers: vec![(0, 0); nset],
    }
}

/// A 2x2 field set with every sample set to `value`.
fn uniform_field(value: c64, components: usize) -> FieldGrid {
    FieldGrid {
        beam_center: (0.0, 0.0),
        min_x: -1.0,
        min_y: -1.0,
        max_x: 1.0,
        max_y: 1.0,
        nx: 2,
        ny: 2,
        step_x: 2.0,
        step_y: 2.0,
        sparse: false,
        field: Array3::from_elem((2, 2, components), value),
        mask: Array2::from_elem((2, 2), true),
    }
}

fn uniform_grid(value: c64) -> Grid {
    Grid {
        header: test_header(Polarization::Ludwig3, 1, 2),
        fields: vec![uniform_field(value, 2)],
    }
}

fn uniform_cut(value: c64) -> Cut {
    let header = CutHeader {
        text: String::new(),
        v_ini: -180.0,
        v_inc: 90.0,
        v_num: 4,
        constant: 0.0,
        polarization: Polarization::Ludwig3,
        axis: CutAxis::Polar,
        components: 2,
    };
    Cut {
        cut_sets: vec![crate::cut::CutSet {
            cuts: vec![SingleCut {
                header,
                data: Array2::from_elem((4, 2), value),
            }],
        }],
        constants: vec![0.0],
        geometry: CutGeometry::Spherical,
    }
}

fn assert_fields_close(a: &FieldGrid, b: &FieldGrid) {
    for (x, y) in a.field.iter().zip(b.field.iter()) {
        assert_abs_diff_eq!(x.re, y.re, epsilon = 1e-12);
        assert_abs_diff_eq!(x.im, y.im, epsilon = 1e-12);
    }
}

#[test]
fn scaling_twice_composes() {
    let g = uniform_grid(c64::new(1.0, 2.0));
    let a = c64::new(0.5, -0.25);
    let b = c64::new(-3.0, 1.0);
    let twice = scale_grid(&scale_grid(&g, a), b);
    let once = scale_grid(&g, a * b);
    assert_fields_close(&twice.fields[0], &once.fields[0]);
}

#[test]
fn scaling_by_a_real_factor() {
    let g = uniform_grid(c64::new(1.0, -1.0));
    let scaled = scale_grid(&g, 2.0);
    assert_eq!(scaled.fields[0].field[[0, 0, 0]], c64::new(2.0, -2.0));
}

#[test]
fn scaling_preserves_the_mask() {
    let mut g = uniform_grid(c64::new(1.0, 0.0));
    g.fields[0].mask[[1, 1]] = false;
    let scaled = scale_grid(&g, c64::new(0.0, 1.0));
    assert_eq!(scaled.fields[0].mask, g.fields[0].mask);
}

#[test]
fn coherent_sum_of_one_is_identity() {
    let g = uniform_grid(c64::new(0.3, -0.7));
    let sum = coherent_sum_grids(std::slice::from_ref(&g)).unwrap();
    assert_eq!(sum, g);
}

#[test]
fn coherent_sum_is_commutative() {
    let a = uniform_grid(c64::new(1.0, 2.0));
    let b = uniform_grid(c64::new(-0.5, 0.25));
    let ab = coherent_sum_grids(&[a.clone(), b.clone()]).unwrap();
    let ba = coherent_sum_grids(&[b, a]).unwrap();
    assert_fields_close(&ab.fields[0], &ba.fields[0]);
}

#[test]
fn coherent_sum_is_associative() {
    let a = uniform_grid(c64::new(1.0, 2.0));
    let b = uniform_grid(c64::new(-0.5, 0.25));
    let c = uniform_grid(c64::new(0.1, -0.1));
    let left = coherent_sum_grids(&[
        coherent_sum_grids(&[a.clone(), b.clone()]).unwrap(),
        c.clone(),
    ])
    .unwrap();
    let right = coherent_sum_grids(&[a, coherent_sum_grids(&[b, c]).unwrap()]).unwrap();
    assert_fields_close(&left.fields[0], &right.fields[0]);
}

#[test]
fn incoherent_sum_is_commutative_in_the_power_domain() {
    let a = uniform_grid(c64::new(1.0, 2.0));
    let b = uniform_grid(c64::new(-0.5, 0.25));
    let ab = incoherent_sum_grids(&[a.clone(), b.clone()], SumMode::Power).unwrap();
    let ba = incoherent_sum_grids(&[b, a], SumMode::Power).unwrap();
    assert_fields_close(&ab.fields[0], &ba.fields[0]);
}

#[test]
fn incoherent_power_sums_are_associative() {
    // Associativity holds in the power domain: summing powers of powers
    // needs the intermediate result left in Power mode.
    let a = uniform_grid(c64::new(3.0, 0.0));
    let b = uniform_grid(c64::new(0.0, 4.0));
    let c = uniform_grid(c64::new(1.0, 1.0));
    let all = incoherent_sum_grids(&[a.clone(), b.clone(), c.clone()], SumMode::Power).unwrap();
    let v = all.fields[0].field[[0, 0, 0]].re;
    assert_abs_diff_eq!(v, 9.0 + 16.0 + 2.0, epsilon = 1e-12);
}

#[test]
fn opposite_phases_cancel_coherently_but_not_incoherently() {
    // Equal magnitude, 180 degrees apart: the coherent sum vanishes while
    // the incoherent sum keeps both contributions' power.
    let a = uniform_grid(c64::new(1.0, 0.0));
    let b = uniform_grid(c64::new(-1.0, 0.0));

    let coherent = coherent_sum_grids(&[a.clone(), b.clone()]).unwrap();
    assert_abs_diff_eq!(coherent.fields[0].field[[0, 0, 0]].norm(), 0.0);

    let incoherent = incoherent_sum_grids(&[a, b], SumMode::Magnitude).unwrap();
    assert_abs_diff_eq!(
        incoherent.fields[0].field[[0, 0, 0]].re,
        2.0_f64.sqrt(),
        epsilon = 1e-12
    );
}

#[test]
fn magnitude_mode_is_the_root_of_power_mode() {
    let a = uniform_grid(c64::new(1.0, 2.0));
    let b = uniform_grid(c64::new(0.5, -0.5));
    let power = incoherent_sum_grids(&[a.clone(), b.clone()], SumMode::Power).unwrap();
    let mag = incoherent_sum_grids(&[a, b], SumMode::Magnitude).unwrap();
    for (p, m) in power.fields[0].field.iter().zip(mag.fields[0].field.iter()) {
        assert_abs_diff_eq!(m.re, p.re.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(m.im, 0.0);
    }
}

#[test]
fn summation_intersects_masks() {
    let mut a = uniform_grid(c64::new(1.0, 0.0));
    let mut b = uniform_grid(c64::new(2.0, 0.0));
    a.fields[0].mask[[0, 0]] = false;
    b.fields[0].mask[[1, 1]] = false;

    let sum = coherent_sum_grids(&[a.clone(), b.clone()]).unwrap();
    assert!(!sum.fields[0].mask[[0, 0]]);
    assert!(!sum.fields[0].mask[[1, 1]]);
    assert!(sum.fields[0].mask[[0, 1]]);

    let sum = incoherent_sum_grids(&[a, b], SumMode::Power).unwrap();
    assert!(!sum.fields[0].mask[[0, 0]]);
    assert!(!sum.fields[0].mask[[1, 1]]);
}

#[test]
fn empty_operand_list_is_an_error() {
    assert!(matches!(
        coherent_sum_grids(&[]),
        Err(AlgebraError::NoOperands)
    ));
    assert!(matches!(
        incoherent_sum_grids(&[], SumMode::Power),
        Err(AlgebraError::NoOperands)
    ));
}

#[test]
fn combine_adds_and_subtracts() {
    let a = uniform_grid(c64::new(3.0, 1.0));
    let b = uniform_grid(c64::new(1.0, 1.0));
    let sum = combine_grids(&a, &b, CombineOp::Add).unwrap();
    assert_eq!(sum.fields[0].field[[0, 0, 0]], c64::new(4.0, 2.0));
    let diff = combine_grids(&a, &b, CombineOp::Subtract).unwrap();
    assert_eq!(diff.fields[0].field[[0, 0, 0]], c64::new(2.0, 0.0));
}

#[test]
fn combine_rejects_mismatched_components_and_leaves_inputs_alone() {
    let a = Grid {
        header: test_header(Polarization::Ludwig3, 1, 2),
        fields: vec![uniform_field(c64::new(1.0, 0.0), 2)],
    };
    let b = Grid {
        header: test_header(Polarization::Ludwig3, 1, 3),
        fields: vec![uniform_field(c64::new(2.0, 0.0), 3)],
    };
    let a_before = a.clone();
    let b_before = b.clone();

    assert!(matches!(
        combine_grids(&a, &b, CombineOp::Add),
        Err(AlgebraError::Shape(_))
    ));
    assert_eq!(a, a_before);
    assert_eq!(b, b_before);
}

#[test]
fn combine_rejects_mismatched_bases() {
    let a = uniform_grid(c64::new(1.0, 0.0));
    let mut b = uniform_grid(c64::new(1.0, 0.0));
    b.header.polarization = Polarization::Circular;
    assert!(matches!(
        combine_grids(&a, &b, CombineOp::Add),
        Err(AlgebraError::Basis(_))
    ));
}

#[test]
fn sums_reject_mismatched_set_counts() {
    let a = uniform_grid(c64::new(1.0, 0.0));
    let mut b = uniform_grid(c64::new(1.0, 0.0));
    b.fields.push(uniform_field(c64::new(1.0, 0.0), 2));
    assert!(matches!(
        coherent_sum_grids(&[a, b]),
        Err(AlgebraError::SetCount { lhs: 1, rhs: 2 })
    ));
}

#[test]
fn collapsing_sets_coherently() {
    let mut g = uniform_grid(c64::new(1.0, 1.0));
    g.header.nset = 2;
    g.header.freqs = vec![82.0, 97.0];
    g.header.beam_centers = vec![(0, 0), (0, 0)];
    g.fields.push(uniform_field(c64::new(2.0, -1.0), 2));

    let collapsed = coherent_sum_sets(&g).unwrap();
    assert_eq!(collapsed.fields.len(), 1);
    assert_eq!(collapsed.header.nset, 1);
    assert_eq!(collapsed.header.freqs, vec![82.0]);
    assert_eq!(collapsed.fields[0].field[[1, 0, 1]], c64::new(3.0, 0.0));
}

#[test]
fn collapsing_sets_incoherently() {
    let mut g = uniform_grid(c64::new(3.0, 0.0));
    g.header.nset = 2;
    g.fields.push(uniform_field(c64::new(0.0, 4.0), 2));

    let collapsed = incoherent_sum_sets(&g, SumMode::Magnitude).unwrap();
    assert_eq!(collapsed.fields.len(), 1);
    assert_abs_diff_eq!(
        collapsed.fields[0].field[[0, 1, 0]].re,
        5.0,
        epsilon = 1e-12
    );
}

#[test]
fn cut_scaling_and_summation() {
    let a = uniform_cut(c64::new(1.0, 0.0));
    let b = uniform_cut(c64::new(0.0, 1.0));

    let scaled = scale_cut(&a, c64::new(0.0, 2.0));
    assert_eq!(scaled.cut_sets[0].cuts[0].data[[0, 0]], c64::new(0.0, 2.0));

    let sum = coherent_sum_cuts(&[a.clone(), b.clone()]).unwrap();
    assert_eq!(sum.cut_sets[0].cuts[0].data[[1, 1]], c64::new(1.0, 1.0));

    let power = incoherent_sum_cuts(&[a.clone(), b.clone()], SumMode::Power).unwrap();
    assert_abs_diff_eq!(power.cut_sets[0].cuts[0].data[[1, 1]].re, 2.0);

    let diff = combine_cuts(&a, &b, CombineOp::Subtract).unwrap();
    assert_eq!(diff.cut_sets[0].cuts[0].data[[0, 0]], c64::new(1.0, -1.0));
}

#[test]
fn cut_operations_reject_mismatched_shapes() {
    let a = uniform_cut(c64::new(1.0, 0.0));
    let mut b = uniform_cut(c64::new(1.0, 0.0));
    b.cut_sets[0].cuts[0].data = Array2::from_elem((5, 2), c64::new(1.0, 0.0));
    let a_before = a.clone();

    assert!(matches!(
        combine_cuts(&a, &b, CombineOp::Add),
        Err(AlgebraError::Shape(_))
    ));
    assert_eq!(a, a_before);

    let mut c = uniform_cut(c64::new(1.0, 0.0));
    c.cut_sets[0].cuts[0].header.polarization = Polarization::ThetaPhi;
    assert!(matches!(
        coherent_sum_cuts(&[a, c]),
        Err(AlgebraError::Basis(_))
    ));
}
