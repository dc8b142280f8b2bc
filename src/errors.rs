// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Errors raised while reading grid and cut files and while operating on the
parsed entities.
 */

use thiserror::Error;

use crate::types::Polarization;

/// A structural problem in a grid or cut file: the header contradicts
/// itself, a token that must be a number isn't one, or the file's contents
/// don't match what the header declared.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("Line {line}: expected a number, found '{token}'")]
    NotANumber { line: usize, token: String },

    #[error("Line {line}: expected at least {expected} fields, found {found}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Line {line}: {name} must be positive, found {value}")]
    NonPositiveCount {
        line: usize,
        name: &'static str,
        value: i64,
    },

    /// Only KTYPE=1 files are defined by TICRA.
    #[error("Unsupported file type KTYPE={0}; only KTYPE=1 is supported")]
    UnsupportedKtype(i64),

    #[error("Unknown polarization code ICOMP={0}")]
    UnknownPolarization(i64),

    #[error("Unknown grid type IGRID={0}")]
    UnknownGridKind(i64),

    #[error("Unknown cut type ICUT={0}")]
    UnknownCutAxis(i64),

    /// The header promised more field sets than the file contains.
    #[error("Header declared {expected} field sets, but the file ends after {found}")]
    SetCountMismatch { expected: usize, found: usize },

    /// A sparse (KLIMIT=1) row declared limits outside the grid extent.
    #[error("Line {line}: sparse row limits [{start}, {end}) fall outside the {n} declared columns")]
    SparseRowLimits {
        line: usize,
        start: i64,
        end: i64,
        n: usize,
    },

    #[error("Malformed frequency header line: '{0}'")]
    FrequencyHeader(String),
}

/// The file ended while data lines promised by a header were still owed.
#[derive(Error, Debug)]
#[error("File ended at line {line} with {missing} declared data lines still missing")]
pub struct TruncatedFileError {
    pub line: usize,
    pub missing: usize,
}

/// Anything that can go wrong while reading a grid or cut file.
#[derive(Error, Debug)]
pub enum ReadError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Truncated(#[from] TruncatedFileError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Field-algebra operands whose array shapes disagree.
#[derive(Error, Debug)]
#[error("Operand shapes differ: {expected:?} vs {got:?}")]
pub struct ShapeMismatchError {
    pub expected: Vec<usize>,
    pub got: Vec<usize>,
}

/// Field-algebra operands whose polarization bases disagree.
#[derive(Error, Debug)]
#[error("Operand polarization bases differ: {lhs} vs {rhs}")]
pub struct BasisMismatchError {
    pub lhs: Polarization,
    pub rhs: Polarization,
}

/// Anything that can go wrong in a field-algebra operation. All of these
/// are raised before any numeric work, so operands are never left half
/// modified.
#[derive(Error, Debug)]
pub enum AlgebraError {
    #[error(transparent)]
    Shape(#[from] ShapeMismatchError),

    #[error(transparent)]
    Basis(#[from] BasisMismatchError),

    #[error("Operands hold different numbers of field sets: {lhs} vs {rhs}")]
    SetCount { lhs: usize, rhs: usize },

    #[error("Cannot sum an empty list of operands")]
    NoOperands,

    #[error("Polarization rotation requires a linear basis, found {0}")]
    NotLinear(Polarization),
}
