//! Format B.
//!
//! A record is an `Example` with two features:
//!
//! * `"shape"`: `int64_list` `[length, depth]`
//! * `"values"`: `float_list` of `length * depth` values, row-major
//!
//! Files are opened in two phases: `inspect` reads the depth from the first
//! record, then `open_reader` decodes every record with that depth. A record
//! of any other depth is an error.

use std::convert::TryFrom;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

use prost::Message;

use crate::codec::{self, RecordFormat, SequenceReader};
use crate::error::{Error, Result};
use crate::proto::{feature, Example, Feature, Features};
use crate::record::{file_reader, RecordWriter};
use crate::tensor::SequenceTensor;

/// name of the shape feature
pub const SHAPE_KEY: &str = "shape";
/// name of the flattened values feature
pub const VALUES_KEY: &str = "values";

/// A decoded record before it is checked and reshaped
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedRecord {
    /// shape as stored
    pub shape: Vec<i64>,
    /// row-major values as stored
    pub values: Vec<f32>,
}

impl ShapedRecord {
    /// validated `[length, depth]`
    pub fn dims(&self) -> Result<[usize; 2]> {
        let dims = match self.shape.as_slice() {
            &[len, depth] => [to_dim(len)?, to_dim(depth)?],
            other => {
                return Err(Error::InvalidRecord(format!(
                    "shape has rank {}, expected 2",
                    other.len()
                )))
            }
        };
        if dims[1] == 0 {
            return Err(Error::InvalidRecord("shape has zero depth".to_owned()));
        }
        match dims[0].checked_mul(dims[1]) {
            Some(numel) if numel == self.values.len() => Ok(dims),
            _ => Err(Error::InvalidRecord(format!(
                "shape {:?} does not match {} values",
                self.shape,
                self.values.len()
            ))),
        }
    }
}

fn to_dim(d: i64) -> Result<usize> {
    usize::try_from(d).map_err(|_| Error::InvalidRecord(format!("negative dimension {}", d)))
}

/// serialize `tensor` as an `Example` with shape and values
pub fn encode(tensor: &SequenceTensor) -> Vec<u8> {
    let [len, depth] = tensor.shape();
    let mut features = Features::default();
    features
        .feature
        .insert(SHAPE_KEY.to_owned(), Feature::int64s(vec![len as i64, depth as i64]));
    features
        .feature
        .insert(VALUES_KEY.to_owned(), Feature::floats(tensor.to_f32_vec()));
    Example {
        features: Some(features),
    }
    .encode_to_vec()
}

fn lookup<'a>(example: &'a Example, key: &str) -> Result<&'a Feature> {
    example
        .features
        .as_ref()
        .and_then(|f| f.feature.get(key))
        .ok_or_else(|| Error::InvalidRecord(format!("missing feature \"{}\"", key)))
}

fn shape_of(example: &Example) -> Result<Vec<i64>> {
    let feat = lookup(example, SHAPE_KEY)?;
    match &feat.kind {
        Some(feature::Kind::Int64List(list)) => Ok(list.value.clone()),
        _ => Err(Error::InvalidRecord(format!(
            "feature \"{}\" is {}, expected int64_list",
            SHAPE_KEY,
            feat.kind_name()
        ))),
    }
}

fn values_of(example: Example) -> Result<Vec<f32>> {
    let mut features = example
        .features
        .ok_or_else(|| Error::InvalidRecord(format!("missing feature \"{}\"", VALUES_KEY)))?;
    let feat = features
        .feature
        .remove(VALUES_KEY)
        .ok_or_else(|| Error::InvalidRecord(format!("missing feature \"{}\"", VALUES_KEY)))?;
    let kind_name = feat.kind_name();
    match feat.kind {
        Some(feature::Kind::FloatList(list)) => Ok(list.value),
        _ => Err(Error::InvalidRecord(format!(
            "feature \"{}\" is {}, expected float_list",
            VALUES_KEY, kind_name
        ))),
    }
}

/// parse the payload without checking its shape
pub fn decode(bytes: &[u8]) -> Result<ShapedRecord> {
    let example = Example::decode(bytes)?;
    let shape = shape_of(&example)?;
    let values = values_of(example)?;
    Ok(ShapedRecord { shape, values })
}

/// depth of a record, reading only its shape
pub fn read_depth(bytes: &[u8]) -> Result<usize> {
    let example = Example::decode(bytes)?;
    match shape_of(&example)?.as_slice() {
        &[_, depth] if depth > 0 => to_dim(depth),
        other => Err(Error::InvalidRecord(format!("cannot take depth from shape {:?}", other))),
    }
}

/// Parse a payload and reshape it to `[length, depth]`.
/// The record's own depth must equal `depth`
pub fn decode_with_depth(bytes: &[u8], depth: usize) -> Result<SequenceTensor> {
    let record = decode(bytes)?;
    let [_, found] = record.dims()?;
    if found != depth {
        return Err(Error::DepthMismatch { expected: depth, found });
    }
    SequenceTensor::from_flat(record.values, depth)
}

/// Write `tensor` as one Format B record
pub fn write_shaped_record<W: Write>(tensor: &SequenceTensor, wtr: &mut RecordWriter<W>) -> Result<()> {
    wtr.write_record(&encode(tensor))
}

/// Read the depth of a file from its first record
pub fn inspect<P: AsRef<Path>>(path: P) -> Result<usize> {
    let path = path.as_ref();
    let mut rdr = file_reader(path)?;
    match rdr.read_record()? {
        Some(bytes) => {
            let depth = read_depth(&bytes)?;
            debug!("inspected depth {} from {}", depth, path.display());
            Ok(depth)
        }
        None => Err(Error::EmptyFile(path.display().to_string())),
    }
}

/// Open a Format B file whose depth is already known, usually from `inspect`
pub fn open_reader<P: AsRef<Path>>(path: P, depth: usize) -> Result<SequenceReader<BufReader<File>>> {
    codec::open_reader(path, RecordFormat::ShapeValues, depth)
}
