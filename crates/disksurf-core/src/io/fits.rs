use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use byteorder::{BigEndian, ReadBytesExt};
use memmap2::Mmap;
use ndarray::Array3;

use crate::consts::{FITS_BLOCK_SIZE, FITS_CARD_SIZE, SPEED_OF_LIGHT};
use crate::cube::{Beam, CubeInfo, SpectralCube};
use crate::error::{DiskSurfError, Result};

pub(crate) const FITS_MAGIC: &[u8; 30] = b"SIMPLE  =                    T";

/// Value of a single FITS header card.
#[derive(Clone, Debug, PartialEq)]
pub enum HeaderValue {
    Logical(bool),
    Integer(i64),
    Real(f64),
    Text(String),
}

impl HeaderValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Real(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            Self::Real(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Parsed primary HDU header.
#[derive(Clone, Debug, Default)]
pub struct FitsHeader {
    cards: HashMap<String, HeaderValue>,
    /// Length of the header in bytes, including padding to whole records.
    pub byte_len: usize,
}

impl FitsHeader {
    pub fn get(&self, key: &str) -> Option<&HeaderValue> {
        self.cards.get(key)
    }

    pub fn f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(HeaderValue::as_f64)
    }

    pub fn i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(HeaderValue::as_i64)
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(HeaderValue::as_str)
    }

    fn require_f64(&self, key: &str) -> Result<f64> {
        self.f64(key)
            .ok_or_else(|| DiskSurfError::MissingKeyword(key.to_string()))
    }

    fn require_i64(&self, key: &str) -> Result<i64> {
        self.i64(key)
            .ok_or_else(|| DiskSurfError::MissingKeyword(key.to_string()))
    }

    pub fn bitpix(&self) -> Result<i64> {
        self.require_i64("BITPIX")
    }

    /// Axis lengths, NAXIS1 first.
    pub fn axes(&self) -> Result<Vec<usize>> {
        let naxis = self.require_i64("NAXIS")?;
        (1..=naxis)
            .map(|i| {
                let len = self.require_i64(&format!("NAXIS{i}"))?;
                usize::try_from(len)
                    .map_err(|_| DiskSurfError::InvalidFits(format!("negative NAXIS{i}")))
            })
            .collect()
    }

    pub fn bytes_per_value(&self) -> Result<usize> {
        match self.bitpix()? {
            8 => Ok(1),
            16 => Ok(2),
            32 | -32 => Ok(4),
            -64 => Ok(8),
            other => Err(DiskSurfError::UnsupportedBitpix(other)),
        }
    }

    /// Total bytes of the data array (without padding).
    pub fn data_byte_size(&self) -> Result<usize> {
        self.axes()?
            .iter()
            .try_fold(self.bytes_per_value()?, |acc, &n| acc.checked_mul(n))
            .ok_or_else(|| DiskSurfError::InvalidFits("data size overflow".into()))
    }

    /// Rest frequency of the line in Hz.
    pub fn rest_frequency(&self) -> Option<f64> {
        self.f64("RESTFRQ").or_else(|| self.f64("RESTFREQ"))
    }

    pub fn beam(&self) -> Result<Beam> {
        let major = self.require_f64("BMAJ")? * 3600.0;
        let minor = self.f64("BMIN").map(|v| v * 3600.0).unwrap_or(major);
        let angle = self.f64("BPA").unwrap_or(0.0);
        Ok(Beam {
            major,
            minor,
            angle,
        })
    }

    /// Pixel size in arcsec from the declination axis increment.
    pub fn pixelscale(&self) -> Result<f64> {
        Ok(self.require_f64("CDELT2")?.abs() * 3600.0)
    }
}

/// Memory-mapped reader for the primary HDU of a FITS spectral cube.
pub struct FitsReader {
    mmap: Mmap,
    pub header: FitsHeader,
}

impl FitsReader {
    /// Open a FITS file and parse its primary header.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };

        if mmap.len() < FITS_BLOCK_SIZE {
            return Err(DiskSurfError::InvalidFits(
                "File too small for a FITS header".into(),
            ));
        }
        if &mmap[..FITS_MAGIC.len()] != FITS_MAGIC {
            return Err(DiskSurfError::InvalidFits("Missing SIMPLE = T card".into()));
        }

        let header = parse_header(&mmap)?;
        let expected = header
            .data_byte_size()?
            .checked_add(header.byte_len)
            .ok_or_else(|| DiskSurfError::InvalidFits("data size overflow".into()))?;
        if mmap.len() < expected {
            return Err(DiskSurfError::InvalidFits(format!(
                "File truncated: expected at least {} bytes, got {}",
                expected,
                mmap.len()
            )));
        }

        Ok(Self { mmap, header })
    }

    /// Cube shape as (channels, rows, columns), dropping a degenerate Stokes axis.
    pub fn cube_shape(&self) -> Result<(usize, usize, usize)> {
        let axes = self.header.axes()?;
        match axes.as_slice() {
            [nx, ny, nv] => Ok((*nv, *ny, *nx)),
            [nx, ny, nv, 1] => Ok((*nv, *ny, *nx)),
            [nx, ny, 1, nv] => Ok((*nv, *ny, *nx)),
            _ => Err(DiskSurfError::InvalidFits(format!(
                "expected a 3-D cube, got axes {axes:?}"
            ))),
        }
    }

    /// FITS axis number (1-based) of the spectral axis.
    fn spectral_axis(&self) -> Result<usize> {
        let axes = self.header.axes()?;
        if axes.len() == 4 && axes[2] == 1 && axes[3] != 1 {
            Ok(4)
        } else {
            Ok(3)
        }
    }

    /// Velocity of every channel in km/s.
    pub fn velocity_axis(&self) -> Result<Vec<f64>> {
        let (nv, _, _) = self.cube_shape()?;
        let axis = self.spectral_axis()?;
        let h = &self.header;

        let crval = h.require_f64(&format!("CRVAL{axis}"))?;
        let cdelt = h.require_f64(&format!("CDELT{axis}"))?;
        let crpix = h.f64(&format!("CRPIX{axis}")).unwrap_or(1.0);
        let ctype = h.str(&format!("CTYPE{axis}")).unwrap_or("").to_uppercase();
        let cunit = h.str(&format!("CUNIT{axis}")).unwrap_or("").to_lowercase();

        let world = (0..nv).map(|i| crval + (i as f64 + 1.0 - crpix) * cdelt);

        if ctype.starts_with("FREQ") {
            let rest = h
                .rest_frequency()
                .ok_or_else(|| DiskSurfError::MissingKeyword("RESTFRQ".into()))?;
            let c_kms = SPEED_OF_LIGHT / 1e3;
            Ok(world.map(|nu| c_kms * (1.0 - nu / rest)).collect())
        } else if ctype.starts_with("VRAD") || ctype.starts_with("VELO") || ctype.starts_with("VOPT")
        {
            let to_kms = if cunit == "km/s" { 1.0 } else { 1e-3 };
            Ok(world.map(|v| v * to_kms).collect())
        } else {
            Err(DiskSurfError::InvalidFits(format!(
                "unsupported spectral axis type '{ctype}'"
            )))
        }
    }

    /// Decode the full data array into (channels, rows, columns), applying BSCALE/BZERO.
    pub fn read_data(&self) -> Result<Array3<f32>> {
        let (nv, ny, nx) = self.cube_shape()?;
        let bitpix = self.header.bitpix()?;
        let bscale = self.header.f64("BSCALE").unwrap_or(1.0);
        let bzero = self.header.f64("BZERO").unwrap_or(0.0);
        let start = self.header.byte_len;
        let raw = &self.mmap[start..start + self.header.data_byte_size()?];

        let values = decode_values(raw, bitpix, nv * ny * nx)?;
        let scaled: Vec<f32> = if bscale == 1.0 && bzero == 0.0 {
            values.into_iter().map(|v| v as f32).collect()
        } else {
            values
                .into_iter()
                .map(|v| (v * bscale + bzero) as f32)
                .collect()
        };

        Array3::from_shape_vec((nv, ny, nx), scaled)
            .map_err(|e| DiskSurfError::InvalidFits(e.to_string()))
    }

    /// Read the whole file into a spectral cube.
    pub fn read_cube(&self) -> Result<SpectralCube> {
        let data = self.read_data()?;
        let velocity = self.velocity_axis()?;
        let mut cube = SpectralCube::new(
            data,
            velocity,
            self.header.pixelscale()?,
            self.header.beam()?,
        )?;
        cube.rest_frequency = self.header.rest_frequency();
        cube.unit = self.header.str("BUNIT").map(str::to_string);
        Ok(cube)
    }

    pub fn cube_info(&self, path: &Path) -> Result<CubeInfo> {
        let (channels, height, width) = self.cube_shape()?;
        let velocity = self.velocity_axis()?;
        let lo = velocity.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = velocity.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Ok(CubeInfo {
            filename: path.to_path_buf(),
            channels,
            width,
            height,
            bitpix: self.header.bitpix()?,
            pixelscale: self.header.pixelscale()?,
            beam: self.header.beam()?,
            velocity_range: (lo, hi),
            rest_frequency: self.header.rest_frequency(),
            unit: self.header.str("BUNIT").map(str::to_string),
            object: self.header.str("OBJECT").map(str::to_string),
        })
    }
}

/// Open and read a FITS cube in one call.
pub fn read_cube(path: &Path) -> Result<SpectralCube> {
    FitsReader::open(path)?.read_cube()
}

fn parse_header(buf: &[u8]) -> Result<FitsHeader> {
    let mut cards = HashMap::new();

    for (i, card) in buf.chunks_exact(FITS_CARD_SIZE).enumerate() {
        if !card.is_ascii() {
            return Err(DiskSurfError::InvalidFits(format!("non-ASCII header card {i}")));
        }
        let text = std::str::from_utf8(card)
            .map_err(|_| DiskSurfError::InvalidFits(format!("non-ASCII header card {i}")))?;
        let key = text[..8].trim_end();

        if key == "END" {
            let used = (i + 1) * FITS_CARD_SIZE;
            let byte_len = used.div_ceil(FITS_BLOCK_SIZE) * FITS_BLOCK_SIZE;
            return Ok(FitsHeader { cards, byte_len });
        }
        if key.is_empty() || &text[8..10] != "= " {
            // COMMENT, HISTORY and blank cards carry no value.
            continue;
        }
        if let Some(value) = parse_value(&text[10..]) {
            cards.insert(key.to_string(), value);
        }
    }

    Err(DiskSurfError::InvalidFits("header has no END card".into()))
}

fn parse_value(field: &str) -> Option<HeaderValue> {
    let field = field.trim_start();
    if let Some(rest) = field.strip_prefix('\'') {
        // Quoted string; '' is an escaped quote.
        let mut out = String::new();
        let mut chars = rest.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\'' {
                if chars.peek() == Some(&'\'') {
                    out.push('\'');
                    chars.next();
                } else {
                    break;
                }
            } else {
                out.push(c);
            }
        }
        return Some(HeaderValue::Text(out.trim_end().to_string()));
    }

    let raw = field.split('/').next().unwrap_or("").trim();
    match raw {
        "" => None,
        "T" => Some(HeaderValue::Logical(true)),
        "F" => Some(HeaderValue::Logical(false)),
        _ => {
            if let Ok(v) = raw.parse::<i64>() {
                Some(HeaderValue::Integer(v))
            } else {
                raw.replace(['D', 'd'], "E")
                    .parse::<f64>()
                    .ok()
                    .map(HeaderValue::Real)
            }
        }
    }
}

fn decode_values(raw: &[u8], bitpix: i64, count: usize) -> Result<Vec<f64>> {
    let mut cursor = raw;
    let mut values = Vec::with_capacity(count);

    for _ in 0..count {
        let v = match bitpix {
            8 => cursor.read_u8()? as f64,
            16 => cursor.read_i16::<BigEndian>()? as f64,
            32 => cursor.read_i32::<BigEndian>()? as f64,
            -32 => cursor.read_f32::<BigEndian>()? as f64,
            -64 => cursor.read_f64::<BigEndian>()?,
            other => return Err(DiskSurfError::UnsupportedBitpix(other)),
        };
        values.push(v);
    }

    Ok(values)
}
