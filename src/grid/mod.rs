// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Reading of GRASP/TICRA Tools field-on-grid files (`*.grd`).

A grid file is a free-text comment block terminated by a `++++` sentinel,
a short numeric header, and then one block of raster-ordered data records
per field set. The header fully determines how many records follow; the
reader never infers counts from the length of the input.
 */


use std::io::BufRead;
use std::path::Path;

use ndarray::prelude::*;

use crate::c64;
use crate::errors::{AlgebraError, FormatError, ReadError};
use crate::reader::{parse_count, parse_float, parse_int, require_fields, LineReader};
use crate::types::{FileVersion, GridKind, Polarization, RasterOrder};

/// The sentinel line that ends the free-text comment block.
const HEADER_SENTINEL: &str = "++++";

/// The parsed header of a grid file: the comment block, the frequency
/// information recovered from it, and the numeric file-type parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct GridHeader {
    /// The comment lines preceding the `++++` sentinel, in file order.
    pub text: Vec<String>,
    /// Which format family wrote the file, judged from the style of its
    /// frequency comment line.
    pub version: FileVersion,
    /// Frequencies recovered from the comment block, in `freq_unit`. May
    /// be empty when the file carries no frequency comment.
    pub freqs: Vec<f64>,
    /// The unit the frequencies are given in, when the file names one.
    pub freq_unit: String,
    /// The file's KTYPE; always 1 for TICRA-written files.
    pub ktype: i64,
    /// Number of field sets in the file (NSET).
    pub nset: usize,
    /// Polarization basis of the field components (ICOMP).
    pub polarization: Polarization,
    /// Number of field components per grid point (NCOMP): 2 for far
    /// fields, 3 for near fields.
    pub components: usize,
    /// The coordinate system the grid is defined on (IGRID).
    pub kind: GridKind,
    /// One beam center per field set, in grid-index units.
    pub beam_centers: Vec<(i64, i64)>,
}

impl GridHeader {
    /// Read the comment block and the numeric header lines, leaving the
    /// reader at the first field-set record. Returns the header and the
    /// number of lines consumed.
    pub(crate) fn parse<R: BufRead>(
        reader: &mut LineReader<R>,
    ) -> Result<(GridHeader, usize), ReadError> {
        let mut text = vec![];
        loop {
            let line = reader.expect_line(1)?;
            if line.starts_with(HEADER_SENTINEL) {
                break;
            }
            text.push(line);
        }

        let (version, freqs, freq_unit) = parse_frequencies(&text)?;

        let line = reader.expect_line(1)?;
        let ktype = parse_int(line.split_whitespace().next().unwrap_or(""), reader.line_no())?;
        if ktype != 1 {
            return Err(FormatError::UnsupportedKtype(ktype).into());
        }

        let line = reader.expect_line(1)?;
        let line_no = reader.line_no();
        let fields = require_fields(&line, 4, line_no)?;
        let nset = parse_count(fields[0], "NSET", line_no)?;
        let polarization = Polarization::from_code(parse_int(fields[1], line_no)?)?;
        let components = parse_count(fields[2], "NCOMP", line_no)?;
        let kind = GridKind::from_code(parse_int(fields[3], line_no)?)?;

        let mut beam_centers = Vec::with_capacity(nset);
        for i in 0..nset {
            let line = reader.expect_line(nset - i)?;
            let line_no = reader.line_no();
            let fields = require_fields(&line, 2, line_no)?;
            beam_centers.push((parse_int(fields[0], line_no)?, parse_int(fields[1], line_no)?));
        }

        let header = GridHeader {
            text,
            version,
            freqs,
            freq_unit,
            ktype,
            nset,
            polarization,
            components,
            kind,
            beam_centers,
        };
        Ok((header, reader.line_no()))
    }
}

/// Recover frequency information from the comment block. Legacy GRASP
/// writes a single `FREQUENCY:` line, either as a `start_frequency` range
/// or as a quote-separated list; TICRA Tools writes `FREQUENCIES [unit]:`
/// with the values spread over the following comment lines.
fn parse_frequencies(text: &[String]) -> Result<(FileVersion, Vec<f64>, String), FormatError> {
    for (l, line) in text.iter().enumerate() {
        let Some((term, rest)) = line.split_once(':') else {
            continue;
        };

        if term.trim() == "FREQUENCY" {
            let bad = || FormatError::FrequencyHeader(line.clone());

            if let Some((first, range)) = rest.split_once(':') {
                if first.trim() == "start_frequency" {
                    // A frequency range: start, stop, count.
                    let parts: Vec<&str> = range.split(',').collect();
                    if parts.len() != 3 {
                        return Err(bad());
                    }
                    let value = |s: &str| -> Result<f64, FormatError> {
                        parse_float(s.split_whitespace().next().unwrap_or(""), l + 1)
                            .map_err(|_| bad())
                    };
                    let start = value(parts[0])?;
                    let stop = value(parts[1])?;
                    let num: usize = parts[2].trim().parse().map_err(|_| bad())?;
                    return Ok((FileVersion::Grasp, linspace(start, stop, num), String::new()));
                }
            }

            // A quote-separated list of frequencies with units.
            let mut freqs = vec![];
            for part in rest.split('\'') {
                let part = part.trim().trim_matches(',');
                if part.is_empty() {
                    continue;
                }
                let token = part.split_whitespace().next().unwrap_or("");
                freqs.push(parse_float(token, l + 1).map_err(|_| bad())?);
            }
            return Ok((FileVersion::Grasp, freqs, String::new()));
        }

        if term.split_whitespace().next() == Some("FREQUENCIES") {
            let freq_unit = term
                .split_whitespace()
                .nth(1)
                .unwrap_or("")
                .trim_matches(['[', ']'])
                .to_string();
            // The list may spread over several comment lines.
            let mut freqs = vec![];
            for token in text[l + 1..].iter().flat_map(|t| t.split_whitespace()) {
                freqs.push(
                    parse_float(token, l + 1)
                        .map_err(|_| FormatError::FrequencyHeader(line.clone()))?,
                );
            }
            return Ok((FileVersion::TicraTools, freqs, freq_unit));
        }
    }

    Ok((FileVersion::default(), vec![], String::new()))
}

fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => vec![],
        1 => vec![start],
        _ => {
            let step = (stop - start) / (num - 1) as f64;
            (0..num).map(|i| start + step * i as f64).collect()
        }
    }
}

/// One field set from a grid file: a rectangular raster of complex field
/// samples with a validity mask.
///
/// Samples are stored in an array of shape `(nx, ny, components)`, so the
/// polarization components of one grid point are contiguous. Grid point
/// `(i, j)` lies at `(min_x + i * step_x, min_y + j * step_y)`; positions
/// are always derived from the extents, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldGrid {
    /// Beam center for this set, from the file header.
    pub beam_center: (f64, f64),
    /// Minimum extent on the first axis (XS).
    pub min_x: f64,
    /// Minimum extent on the second axis (YS).
    pub min_y: f64,
    /// Maximum extent on the first axis (XE).
    pub max_x: f64,
    /// Maximum extent on the second axis (YE).
    pub max_y: f64,
    /// Number of grid points on the first axis (NX).
    pub nx: usize,
    /// Number of grid points on the second axis (NY).
    pub ny: usize,
    /// Grid spacing on the first axis.
    pub step_x: f64,
    /// Grid spacing on the second axis.
    pub step_y: f64,
    /// Whether the file stored this set sparsely (KLIMIT=1), with per-row
    /// limits marking points outside the computed region.
    pub sparse: bool,
    /// Complex field samples, shape `(nx, ny, components)`.
    pub field: Array3<c64>,
    /// Validity per grid point, shape `(nx, ny)`. Points outside a sparse
    /// row's limits are invalid and hold zero samples.
    pub mask: Array2<bool>,
}

impl FieldGrid {
    /// Read one field set. `extents_line` is the set's first line, already
    /// consumed by the caller so that it could tell a missing set apart
    /// from a truncated one.
    fn read<R: BufRead>(
        extents_line: String,
        reader: &mut LineReader<R>,
        components: usize,
        raster: RasterOrder,
        beam_center: (i64, i64),
    ) -> Result<FieldGrid, ReadError> {
        let line_no = reader.line_no();
        let fields = require_fields(&extents_line, 4, line_no)?;
        let min_x = parse_float(fields[0], line_no)?;
        let min_y = parse_float(fields[1], line_no)?;
        let max_x = parse_float(fields[2], line_no)?;
        let max_y = parse_float(fields[3], line_no)?;

        let line = reader.expect_line(1)?;
        let line_no = reader.line_no();
        let fields = require_fields(&line, 3, line_no)?;
        let nx = parse_count(fields[0], "NX", line_no)?;
        let ny = parse_count(fields[1], "NY", line_no)?;
        let sparse = parse_int(fields[2], line_no)? != 0;

        let step = |min: f64, max: f64, n: usize| {
            if n > 1 {
                (max - min) / (n - 1) as f64
            } else {
                0.0
            }
        };
        let step_x = step(min_x, max_x, nx);
        let step_y = step(min_y, max_y, ny);

        let mut field = Array3::zeros((nx, ny, components));
        // A dense grid is valid everywhere; a sparse one only where rows
        // say so.
        let mut mask = Array2::from_elem((nx, ny), !sparse);

        // The outer loop walks the slower axis, the inner loop the faster
        // one, per the declared raster convention.
        let (n_outer, n_inner) = match raster {
            RasterOrder::FirstAxisFastest => (ny, nx),
            RasterOrder::SecondAxisFastest => (nx, ny),
        };

        for outer in 0..n_outer {
            let rows_left = n_outer - outer;
            let (start, end) = if sparse {
                // Sparse rows declare 1-based start index and point count
                // before their data.
                let line = reader.expect_line(rows_left)?;
                let line_no = reader.line_no();
                let fields = require_fields(&line, 2, line_no)?;
                let is = parse_int(fields[0], line_no)? - 1;
                let in_ = parse_int(fields[1], line_no)?;
                let ie = is + in_;
                if is < 0 || in_ < 0 || ie > n_inner as i64 {
                    return Err(FormatError::SparseRowLimits {
                        line: line_no,
                        start: is + 1,
                        end: ie,
                        n: n_inner,
                    }
                    .into());
                }
                (is as usize, ie as usize)
            } else {
                (0, n_inner)
            };

            for inner in start..end {
                let missing = (end - inner) + (rows_left - 1) * n_inner;
                let line = reader.expect_line(missing)?;
                let line_no = reader.line_no();
                let fields = require_fields(&line, 2 * components, line_no)?;
                let (i, j) = match raster {
                    RasterOrder::FirstAxisFastest => (inner, outer),
                    RasterOrder::SecondAxisFastest => (outer, inner),
                };
                for c in 0..components {
                    let re = parse_float(fields[2 * c], line_no)?;
                    let im = parse_float(fields[2 * c + 1], line_no)?;
                    field[[i, j, c]] = c64::new(re, im);
                }
                mask[[i, j]] = true;
            }
        }

        Ok(FieldGrid {
            beam_center: (beam_center.0 as f64, beam_center.1 as f64),
            min_x,
            min_y,
            max_x,
            max_y,
            nx,
            ny,
            step_x,
            step_y,
            sparse,
            field,
            mask,
        })
    }

    /// The shape of the sample array: `(nx, ny, components)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        let d = self.field.dim();
        (d.0, d.1, d.2)
    }

    /// The first- and second-axis coordinates of the grid points.
    pub fn positions_1d(&self) -> (Array1<f64>, Array1<f64>) {
        (
            Array1::linspace(self.min_x, self.max_x, self.nx),
            Array1::linspace(self.min_y, self.max_y, self.ny),
        )
    }

    /// Meshed coordinate arrays of every grid point, each shaped
    /// `(nx, ny)`.
    pub fn positions(&self) -> (Array2<f64>, Array2<f64>) {
        let (xs, ys) = self.positions_1d();
        let mut grid_x = Array2::zeros((self.nx, self.ny));
        let mut grid_y = Array2::zeros((self.nx, self.ny));
        for i in 0..self.nx {
            for j in 0..self.ny {
                grid_x[[i, j]] = xs[i];
                grid_y[[i, j]] = ys[j];
            }
        }
        (grid_x, grid_y)
    }

    /// Radial distance from the beam center to grid point `(i, j)`.
    ///
    /// Useful for integrating beam power within a given radius.
    pub fn index_radial_dist(&self, i: usize, j: usize) -> f64 {
        let off_x = self.min_x + self.step_x * i as f64 - self.beam_center.0;
        let off_y = self.min_y + self.step_y * j as f64 - self.beam_center.1;
        (off_x * off_x + off_y * off_y).sqrt()
    }

    /// The radius of every grid point from `center`, or from the beam
    /// center if `center` is `None`. Shape `(nx, ny)`.
    pub fn radius_grid(&self, center: Option<(f64, f64)>) -> Array2<f64> {
        let (cx, cy) = center.unwrap_or(self.beam_center);
        let (grid_x, grid_y) = self.positions();
        let mut radii = Array2::zeros((self.nx, self.ny));
        for i in 0..self.nx {
            for j in 0..self.ny {
                let dx = grid_x[[i, j]] - cx;
                let dy = grid_y[[i, j]] - cy;
                radii[[i, j]] = (dx * dx + dy * dy).sqrt();
            }
        }
        radii
    }

    /// Rotate the first two field components by `angle` degrees. The
    /// caller is responsible for checking that the basis is linear; see
    /// [`Grid::rotate_polarization`].
    pub(crate) fn rotate_components(&mut self, angle_deg: f64) {
        let (sin, cos) = angle_deg.to_radians().sin_cos();
        for i in 0..self.nx {
            for j in 0..self.ny {
                let e0 = self.field[[i, j, 0]];
                let e1 = self.field[[i, j, 1]];
                self.field[[i, j, 0]] = e0 * cos - e1 * sin;
                self.field[[i, j, 1]] = e1 * cos + e0 * sin;
            }
        }
    }
}

/// A parsed grid file: the header and one [`FieldGrid`] per field set.
///
/// All sets in one file share the header's component count and
/// polarization basis; when the header carries as many frequencies as
/// sets, set `i` is the result at frequency `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub header: GridHeader,
    pub fields: Vec<FieldGrid>,
}

impl Grid {
    /// Read a grid file with the default raster convention
    /// ([`RasterOrder::FirstAxisFastest`], matching TICRA's writers).
    pub fn read<R: BufRead>(reader: R) -> Result<Grid, ReadError> {
        Self::read_with_order(reader, RasterOrder::default())
    }

    /// Read a grid file, stating explicitly which axis varies fastest in
    /// the data records.
    pub fn read_with_order<R: BufRead>(reader: R, raster: RasterOrder) -> Result<Grid, ReadError> {
        let mut reader = LineReader::new(reader);
        let (header, _header_lines) = GridHeader::parse(&mut reader)?;

        let mut fields = Vec::with_capacity(header.nset);
        for iset in 0..header.nset {
            // A file that ends cleanly between sets declared more sets
            // than it holds; that's a header/contents mismatch, not a
            // truncation.
            let extents_line = match reader.next_nonblank_line()? {
                Some(line) => line,
                None => {
                    return Err(FormatError::SetCountMismatch {
                        expected: header.nset,
                        found: iset,
                    }
                    .into());
                }
            };
            fields.push(FieldGrid::read(
                extents_line,
                &mut reader,
                header.components,
                raster,
                header.beam_centers[iset],
            )?);
        }

        Ok(Grid { header, fields })
    }

    /// Read a grid file from a path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Grid, ReadError> {
        let file = std::fs::File::open(path)?;
        Self::read(std::io::BufReader::new(file))
    }

    /// Frequencies recovered from the file header.
    pub fn frequencies(&self) -> &[f64] {
        &self.header.freqs
    }

    /// Rotate the polarization basis of every field set by `angle`
    /// degrees, in place. Only linear bases can be rotated.
    pub fn rotate_polarization(&mut self, angle_deg: f64) -> Result<(), AlgebraError> {
        if !self.header.polarization.is_linear() {
            return Err(AlgebraError::NotLinear(self.header.polarization));
        }
        for field in &mut self.fields {
            field.rotate_components(angle_deg);
        }
        Ok(())
    }
}
