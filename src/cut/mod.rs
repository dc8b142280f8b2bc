// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Reading of GRASP/TICRA Tools field-cut files (`*.cut`).

A cut file is a sequence of blocks, each a one-line description, a
seven-field numeric header and exactly `V_NUM` data records. Blocks at
different constant coordinates (typically phi) belong to one cut set; when
a constant value repeats, a new set begins (e.g. the same cuts at the next
frequency). Every block is validated against its own header.
 */


use std::io::BufRead;
use std::path::Path;

use ndarray::prelude::*;

use crate::c64;
use crate::errors::ReadError;
use crate::reader::{parse_count, parse_float, parse_int, require_fields, LineReader};
use crate::types::{CutAxis, CutGeometry, Polarization};

/// The per-block header of a cut: the sweep definition and the field
/// layout of the records that follow.
#[derive(Debug, Clone, PartialEq)]
pub struct CutHeader {
    /// The description line preceding the numeric header.
    pub text: String,
    /// Initial value of the swept variable (V_INI), in degrees for
    /// spherical cuts.
    pub v_ini: f64,
    /// Increment of the swept variable (V_INC).
    pub v_inc: f64,
    /// Number of sweep steps (V_NUM).
    pub v_num: usize,
    /// The constant coordinate of this cut (C); its meaning follows from
    /// `axis`.
    pub constant: f64,
    /// Polarization basis of the field components (ICOMP).
    pub polarization: Polarization,
    /// What the swept variable is (ICUT).
    pub axis: CutAxis,
    /// Number of field components per record (NCOMP): 2 for far fields, 3
    /// for near fields where the third component is E_z.
    pub components: usize,
}

/// One cut: a single angular sweep of complex field samples.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleCut {
    pub header: CutHeader,
    /// Complex field samples, shape `(v_num, components)`.
    pub data: Array2<c64>,
}

impl SingleCut {
    /// Read one block. `text` and `spec_line` have already been consumed
    /// by the caller.
    fn read<R: BufRead>(
        text: String,
        spec_line: &str,
        reader: &mut LineReader<R>,
    ) -> Result<SingleCut, ReadError> {
        let line_no = reader.line_no();
        let fields = require_fields(spec_line, 7, line_no)?;
        let v_ini = parse_float(fields[0], line_no)?;
        let v_inc = parse_float(fields[1], line_no)?;
        let v_num = parse_count(fields[2], "V_NUM", line_no)?;
        let constant = parse_float(fields[3], line_no)?;
        let polarization = Polarization::from_code(parse_int(fields[4], line_no)?)?;
        let axis = CutAxis::from_code(parse_int(fields[5], line_no)?)?;
        let components = parse_count(fields[6], "NCOMP", line_no)?;

        let mut data = Array2::zeros((v_num, components));
        for v in 0..v_num {
            let line = reader.expect_line(v_num - v)?;
            let line_no = reader.line_no();
            let fields = require_fields(&line, 2 * components, line_no)?;
            for c in 0..components {
                let re = parse_float(fields[2 * c], line_no)?;
                let im = parse_float(fields[2 * c + 1], line_no)?;
                data[[v, c]] = c64::new(re, im);
            }
        }

        let header = CutHeader {
            text,
            v_ini,
            v_inc,
            v_num,
            constant,
            polarization,
            axis,
            components,
        };
        Ok(SingleCut { header, data })
    }

    /// The swept-variable values of the data points: `v_ini + v_inc * k`.
    pub fn positions(&self) -> Array1<f64> {
        let h = &self.header;
        Array1::from_iter((0..h.v_num).map(|k| h.v_ini + h.v_inc * k as f64))
    }

    /// A new cut holding only the points with positions in
    /// `[pos_min, pos_max]`.
    pub fn select_pos_range(&self, pos_min: f64, pos_max: f64) -> SingleCut {
        let positions = self.positions();
        let i_min = positions
            .iter()
            .position(|&p| p >= pos_min)
            .unwrap_or(self.header.v_num);
        let i_max = positions
            .iter()
            .position(|&p| p > pos_max)
            .unwrap_or(self.header.v_num)
            .max(i_min);

        let mut header = self.header.clone();
        header.v_ini = positions.get(i_min).copied().unwrap_or(pos_min);
        header.v_num = i_max - i_min;
        SingleCut {
            header,
            data: self.data.slice(s![i_min..i_max, ..]).to_owned(),
        }
    }
}

/// A group of cuts sharing a common parameter, such as frequency or beam.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CutSet {
    pub cuts: Vec<SingleCut>,
}

/// A parsed cut file: cut sets in file order.
///
/// Cut files often carry no record of the parameter distinguishing the
/// sets (particularly CHAMP output); callers that know the frequencies of
/// the sets must track them alongside.
#[derive(Debug, Clone, PartialEq)]
pub struct Cut {
    /// The sets of cuts in the file, in file order.
    pub cut_sets: Vec<CutSet>,
    /// The constant coordinate of every cut in one set, in file order. A
    /// repeat of the first set's pattern is what starts a new set.
    pub constants: Vec<f64>,
    /// The surface the cuts lie on. Not stored in the file; defaults to
    /// spherical.
    pub geometry: CutGeometry,
}

impl Cut {
    /// Read a cut file, block by block, until the input is exhausted.
    pub fn read<R: BufRead>(reader: R) -> Result<Cut, ReadError> {
        let mut reader = LineReader::new(reader);
        let mut cut_sets = vec![CutSet::default()];
        let mut constants: Vec<f64> = vec![];

        while let Some(text) = reader.next_nonblank_line()? {
            // The description line may be absent for blocks after the
            // first; a line that parses as a seven-field header is one.
            let (text, spec_line) = if looks_like_spec(&text) {
                (String::new(), text)
            } else {
                match reader.next_nonblank_line()? {
                    Some(spec) => (text, spec),
                    // Trailing description with no block after it.
                    None => break,
                }
            };

            let cut = SingleCut::read(text, &spec_line, &mut reader)?;
            if constants.contains(&cut.header.constant) {
                // The constant wrapped around: a new set of cuts begins.
                cut_sets.push(CutSet::default());
                constants.clear();
            }
            constants.push(cut.header.constant);
            cut_sets.last_mut().unwrap().cuts.push(cut);
        }

        Ok(Cut {
            cut_sets,
            constants,
            geometry: CutGeometry::default(),
        })
    }

    /// Read a cut file from a path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Cut, ReadError> {
        let file = std::fs::File::open(path)?;
        Self::read(std::io::BufReader::new(file))
    }

    /// A new cut file object holding only the points of each cut with
    /// positions in `[pos_min, pos_max]`.
    pub fn select_pos_range(&self, pos_min: f64, pos_max: f64) -> Cut {
        Cut {
            cut_sets: self
                .cut_sets
                .iter()
                .map(|set| CutSet {
                    cuts: set
                        .cuts
                        .iter()
                        .map(|c| c.select_pos_range(pos_min, pos_max))
                        .collect(),
                })
                .collect(),
            constants: self.constants.clone(),
            geometry: self.geometry,
        }
    }
}

/// Whether a line is a numeric cut header rather than a description: seven
/// fields, all parseable as numbers.
fn looks_like_spec(line: &str) -> bool {
    let fields: Vec<&str> = line.split_whitespace().collect();
    fields.len() == 7 && fields.iter().all(|f| f.parse::<f64>().is_ok())
}
