// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Shared types for the grid and cut file formats.

use crate::errors::FormatError;

/// Polarization basis of the field components, the file's `ICOMP` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarization {
    /// Linear E_theta and E_phi.
    ThetaPhi,
    /// Right-hand and left-hand circular (Erhc and Elhc).
    Circular,
    /// Linear Eco and Ecx, Ludwig's third definition.
    Ludwig3,
    /// Linear along the major and minor axes of the polarization ellipse.
    MajorMinor,
    /// XPD fields E_theta/E_phi and E_phi/E_theta.
    XpdThetaPhi,
    /// XPD fields Erhc/Elhc and Elhc/Erhc.
    XpdCircular,
    /// XPD fields Eco/Ecx and Ecx/Eco.
    XpdLudwig3,
    /// XPD fields Emaj/Emin and Emin/Emaj.
    XpdMajorMinor,
    /// Total power |E| and Erhc/Elhc.
    TotalPower,
}

impl Polarization {
    /// Map a file's `ICOMP` code onto a basis.
    pub fn from_code(code: i64) -> Result<Polarization, FormatError> {
        Ok(match code {
            1 => Polarization::ThetaPhi,
            2 => Polarization::Circular,
            3 => Polarization::Ludwig3,
            4 => Polarization::MajorMinor,
            5 => Polarization::XpdThetaPhi,
            6 => Polarization::XpdCircular,
            7 => Polarization::XpdLudwig3,
            8 => Polarization::XpdMajorMinor,
            9 => Polarization::TotalPower,
            _ => return Err(FormatError::UnknownPolarization(code)),
        })
    }

    /// The `ICOMP` code this basis is written as.
    pub fn code(self) -> i64 {
        match self {
            Polarization::ThetaPhi => 1,
            Polarization::Circular => 2,
            Polarization::Ludwig3 => 3,
            Polarization::MajorMinor => 4,
            Polarization::XpdThetaPhi => 5,
            Polarization::XpdCircular => 6,
            Polarization::XpdLudwig3 => 7,
            Polarization::XpdMajorMinor => 8,
            Polarization::TotalPower => 9,
        }
    }

    /// Whether the two components form a linear basis that can be rotated
    /// by an angle.
    pub fn is_linear(self) -> bool {
        matches!(
            self,
            Polarization::ThetaPhi | Polarization::Ludwig3 | Polarization::MajorMinor
        )
    }
}

impl std::fmt::Display for Polarization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Polarization::ThetaPhi => "linear theta/phi",
                Polarization::Circular => "circular rhc/lhc",
                Polarization::Ludwig3 => "linear co/cx (Ludwig 3)",
                Polarization::MajorMinor => "linear major/minor",
                Polarization::XpdThetaPhi => "XPD theta/phi",
                Polarization::XpdCircular => "XPD rhc/lhc",
                Polarization::XpdLudwig3 => "XPD co/cx",
                Polarization::XpdMajorMinor => "XPD major/minor",
                Polarization::TotalPower => "total power",
            }
        )
    }
}

/// The coordinate system a grid is defined on, the grid file's `IGRID`
/// value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridKind {
    /// uv-grid: (X, Y) = (u, v), direction cosines.
    Uv,
    /// Elevation over azimuth.
    ElOverAz,
    /// Elevation and azimuth: Az = -theta cos(phi), El = theta sin(phi).
    ElAndAz,
    /// Azimuth over elevation.
    AzOverEl,
    /// theta-phi grid: (X, Y) = (phi, theta).
    ThetaPhi,
    /// Azimuth over elevation, EDX definition.
    AzOverElEdx,
    /// Elevation over azimuth, EDX definition.
    ElOverAzEdx,
}

impl GridKind {
    /// Map a file's `IGRID` code onto a grid kind.
    pub fn from_code(code: i64) -> Result<GridKind, FormatError> {
        Ok(match code {
            1 => GridKind::Uv,
            4 => GridKind::ElOverAz,
            5 => GridKind::ElAndAz,
            6 => GridKind::AzOverEl,
            7 => GridKind::ThetaPhi,
            9 => GridKind::AzOverElEdx,
            10 => GridKind::ElOverAzEdx,
            _ => return Err(FormatError::UnknownGridKind(code)),
        })
    }

    /// The `IGRID` code this kind is written as.
    pub fn code(self) -> i64 {
        match self {
            GridKind::Uv => 1,
            GridKind::ElOverAz => 4,
            GridKind::ElAndAz => 5,
            GridKind::AzOverEl => 6,
            GridKind::ThetaPhi => 7,
            GridKind::AzOverElEdx => 9,
            GridKind::ElOverAzEdx => 10,
        }
    }
}

/// What a cut's swept variable is, the cut file's `ICUT` value. The
/// meaning of the constant coordinate follows from it (e.g. for a polar
/// cut the constant is phi).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutAxis {
    /// Standard polar cut with fixed phi (radial/axial for planar and
    /// cylindrical cuts).
    Polar,
    /// Conical cut with fixed theta (circular for planar and cylindrical
    /// cuts).
    Conical,
}

impl CutAxis {
    pub fn from_code(code: i64) -> Result<CutAxis, FormatError> {
        Ok(match code {
            1 => CutAxis::Polar,
            2 => CutAxis::Conical,
            _ => return Err(FormatError::UnknownCutAxis(code)),
        })
    }

    pub fn code(self) -> i64 {
        match self {
            CutAxis::Polar => 1,
            CutAxis::Conical => 2,
        }
    }
}

/// The surface a set of cuts lies on. Cut files do not record this; it
/// defaults to spherical and callers that know better can overwrite it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CutGeometry {
    #[default]
    Spherical,
    Planar,
    Cylindrical,
}

/// Which format family wrote the file. Selected once while reading the
/// header; the two families differ in how frequencies are recorded and in
/// whether sparse (k-limited) grids appear.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FileVersion {
    /// TICRA GRASP releases before TICRA Tools (`FREQUENCY:` header).
    Grasp,
    /// TICRA Tools 19.0 and later (`FREQUENCIES [unit]:` header).
    #[default]
    TicraTools,
}

/// The raster convention of grid data records: which axis index varies
/// fastest from one record to the next. Grid files store no per-point
/// coordinates, so the reader must be told the convention rather than
/// inferring it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RasterOrder {
    /// Records sweep the first axis fastest: rows of constant Y, X inner.
    #[default]
    FirstAxisFastest,
    /// Records sweep the second axis fastest: columns of constant X, Y
    /// inner.
    SecondAxisFastest,
}
