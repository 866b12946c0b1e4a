use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{BigEndian, WriteBytesExt};
use ndarray::{Array3, ArrayView2, Axis};

use crate::consts::{FITS_BLOCK_SIZE, FITS_CARD_SIZE};
use crate::cube::SpectralCube;
use crate::error::{DiskSurfError, Result};
use crate::io::fits::HeaderValue;

/// Writes a float32 3-D image as a single primary HDU, one channel at a time.
pub struct FitsWriter {
    writer: BufWriter<File>,
    shape: (usize, usize, usize),
    channels_written: usize,
}

impl FitsWriter {
    /// Create the file and write the header. `shape` is (channels, rows, columns).
    pub fn create(
        path: &Path,
        shape: (usize, usize, usize),
        extra_cards: &[(&str, HeaderValue)],
    ) -> Result<Self> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        write_header(&mut writer, shape, extra_cards)?;
        Ok(Self {
            writer,
            shape,
            channels_written: 0,
        })
    }

    /// Append one channel; its shape must match the header.
    pub fn write_channel(&mut self, image: ArrayView2<'_, f32>) -> Result<()> {
        let (nv, ny, nx) = self.shape;
        if image.dim() != (ny, nx) {
            return Err(DiskSurfError::InvalidDimensions {
                channels: nv,
                height: image.nrows(),
                width: image.ncols(),
            });
        }
        if self.channels_written >= nv {
            return Err(DiskSurfError::ChannelIndexOutOfRange {
                index: self.channels_written,
                total: nv,
            });
        }
        for &v in image.iter() {
            self.writer.write_f32::<BigEndian>(v)?;
        }
        self.channels_written += 1;
        Ok(())
    }

    /// Pad the data to a whole record and flush.
    pub fn finalize(mut self) -> Result<()> {
        let (nv, ny, nx) = self.shape;
        if self.channels_written != nv {
            return Err(DiskSurfError::Pipeline(format!(
                "wrote {} of {} channels",
                self.channels_written, nv
            )));
        }
        let data_len = nv * ny * nx * std::mem::size_of::<f32>();
        let pad = padding(data_len);
        self.writer.write_all(&vec![0u8; pad])?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Write a whole cube in one call.
pub fn write_cube(
    path: &Path,
    data: &Array3<f32>,
    extra_cards: &[(&str, HeaderValue)],
) -> Result<()> {
    let mut writer = FitsWriter::create(path, data.dim(), extra_cards)?;
    for channel in data.axis_iter(Axis(0)) {
        writer.write_channel(channel)?;
    }
    writer.finalize()
}

/// Header cards describing a cube's sky grid, velocity axis and beam, so a
/// written cube reads back with the same metadata.
pub fn cube_cards(cube: &SpectralCube) -> Vec<(&'static str, HeaderValue)> {
    let cdelt = cube.pixelscale / 3600.0;
    let dv = match cube.velocity.as_slice() {
        [first, second, ..] => second - first,
        _ => 1.0,
    };

    let mut cards = vec![
        ("CTYPE1", HeaderValue::Text("RA---SIN".into())),
        ("CDELT1", HeaderValue::Real(-cdelt)),
        ("CTYPE2", HeaderValue::Text("DEC--SIN".into())),
        ("CDELT2", HeaderValue::Real(cdelt)),
        ("CTYPE3", HeaderValue::Text("VRAD".into())),
        ("CUNIT3", HeaderValue::Text("km/s".into())),
        ("CRPIX3", HeaderValue::Real(1.0)),
        ("CRVAL3", HeaderValue::Real(cube.velocity[0])),
        ("CDELT3", HeaderValue::Real(dv)),
        ("BMAJ", HeaderValue::Real(cube.beam.major / 3600.0)),
        ("BMIN", HeaderValue::Real(cube.beam.minor / 3600.0)),
        ("BPA", HeaderValue::Real(cube.beam.angle)),
    ];
    if let Some(nu) = cube.rest_frequency {
        cards.push(("RESTFRQ", HeaderValue::Real(nu)));
    }
    if let Some(ref unit) = cube.unit {
        cards.push(("BUNIT", HeaderValue::Text(unit.clone())));
    }
    cards
}

fn write_header(
    w: &mut impl Write,
    (nv, ny, nx): (usize, usize, usize),
    extra_cards: &[(&str, HeaderValue)],
) -> Result<()> {
    let mut cards = vec![
        format_card("SIMPLE", &HeaderValue::Logical(true)),
        format_card("BITPIX", &HeaderValue::Integer(-32)),
        format_card("NAXIS", &HeaderValue::Integer(3)),
        format_card("NAXIS1", &HeaderValue::Integer(nx as i64)),
        format_card("NAXIS2", &HeaderValue::Integer(ny as i64)),
        format_card("NAXIS3", &HeaderValue::Integer(nv as i64)),
    ];
    cards.extend(extra_cards.iter().map(|(k, v)| format_card(k, v)));
    cards.push(format!("{:<80}", "END"));

    let mut written = 0;
    for card in &cards {
        w.write_all(card.as_bytes())?;
        written += FITS_CARD_SIZE;
    }
    w.write_all(&vec![b' '; padding(written)])?;
    Ok(())
}

/// Format a fixed-format 80-column header card.
pub(crate) fn format_card(key: &str, value: &HeaderValue) -> String {
    let body = match value {
        HeaderValue::Logical(b) => format!("{:>20}", if *b { "T" } else { "F" }),
        HeaderValue::Integer(v) => format!("{v:>20}"),
        HeaderValue::Real(v) => format!("{:>20}", format!("{v:.12E}")),
        HeaderValue::Text(s) => format!("'{:<8}'", s.replace('\'', "''")),
    };
    let mut card = format!("{key:<8}= {body}");
    card.truncate(FITS_CARD_SIZE);
    format!("{card:<80}")
}

fn padding(len: usize) -> usize {
    (FITS_BLOCK_SIZE - len % FITS_BLOCK_SIZE) % FITS_BLOCK_SIZE
}
