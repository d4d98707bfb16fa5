use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use clap::ValueEnum;
use ndarray::{ArrayBase, ArrayD, Data, Dimension, IxDyn};

/// Element type of a raw sample file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SampleType {
    F32,
    F64,
}

impl SampleType {
    pub fn width(self) -> usize {
        match self {
            SampleType::F32 => 4,
            SampleType::F64 => 8,
        }
    }
}

/// Array shape given as comma-separated extents, e.g. `100,100`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape(pub Vec<usize>);

impl Shape {
    pub fn element_count(&self) -> usize {
        self.0.iter().product()
    }
}

impl FromStr for Shape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let dims = s
            .split(',')
            .map(|d| {
                d.trim()
                    .parse::<usize>()
                    .map_err(|e| format!("bad extent {:?}: {}", d, e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if dims.iter().any(|&d| d == 0) {
            return Err(format!("shape {} has a zero extent", s));
        }
        Ok(Shape(dims))
    }
}

/// Reads little-endian samples and widens them to `f64`.
///
/// Without a shape the file is read as a flat 1-D array.
pub fn read_raw(path: &Path, dtype: SampleType, shape: Option<&Shape>) -> Result<ArrayD<f64>> {
    let mut bytes = Vec::new();
    File::open(path)
        .with_context(|| format!("open {}", path.display()))?
        .read_to_end(&mut bytes)
        .with_context(|| format!("read {}", path.display()))?;

    if bytes.len() % dtype.width() != 0 {
        bail!(
            "{} holds {} bytes, not a whole number of {:?} samples",
            path.display(),
            bytes.len(),
            dtype
        );
    }
    let count = bytes.len() / dtype.width();

    let values = match dtype {
        SampleType::F32 => {
            let mut buf = vec![0.0f32; count];
            LittleEndian::read_f32_into(&bytes, &mut buf);
            buf.into_iter().map(f64::from).collect()
        }
        SampleType::F64 => {
            let mut buf = vec![0.0f64; count];
            LittleEndian::read_f64_into(&bytes, &mut buf);
            buf
        }
    };

    let dims = match shape {
        Some(shape) if shape.element_count() != count => {
            bail!("shape {:?} needs {} samples, file has {}", shape.0, shape.element_count(), count)
        }
        Some(shape) => shape.0.clone(),
        None => vec![count],
    };
    ArrayD::from_shape_vec(IxDyn(&dims), values).context("reshape samples")
}

/// Writes samples in logical (row-major) order as little-endian `dtype`.
pub fn write_raw<S, D>(path: &Path, data: &ArrayBase<S, D>, dtype: SampleType) -> Result<()>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    for &v in data.iter() {
        match dtype {
            SampleType::F32 => out.write_f32::<LittleEndian>(v as f32)?,
            SampleType::F64 => out.write_f64::<LittleEndian>(v)?,
        }
    }
    out.flush()?;
    Ok(())
}
