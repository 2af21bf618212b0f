//! Format A.
//!
//! A record is a `SequenceExample` whose feature list `"values"` holds one
//! `float_list` of `depth` values per time step. There is no shape field: the
//! depth is fixed for the dataset and given to the reader.

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

use prost::Message;

use crate::codec::{self, RecordFormat, SequenceReader};
use crate::error::{Error, Result};
use crate::proto::{feature, Feature, FeatureList, FeatureLists, SequenceExample};
use crate::record::RecordWriter;
use crate::tensor::SequenceTensor;

/// name of the feature list holding the time steps
pub const VALUES_KEY: &str = "values";

/// serialize `tensor` as a `SequenceExample`
pub fn encode(tensor: &SequenceTensor) -> Vec<u8> {
    let feature = tensor.rows_f32().into_iter().map(Feature::floats).collect();
    let mut lists = FeatureLists::default();
    lists.feature_list.insert(VALUES_KEY.to_owned(), FeatureList { feature });
    let example = SequenceExample {
        context: None,
        feature_lists: Some(lists),
    };
    example.encode_to_vec()
}

/// Parse a `SequenceExample` payload. Every time step must hold exactly
/// `depth` floats
pub fn decode(bytes: &[u8], depth: usize) -> Result<SequenceTensor> {
    if depth == 0 {
        return Err(Error::InvalidArgument("depth must be positive".to_owned()));
    }
    let example = SequenceExample::decode(bytes)?;
    let list = example
        .feature_lists
        .as_ref()
        .and_then(|lists| lists.feature_list.get(VALUES_KEY))
        .ok_or_else(|| Error::InvalidRecord(format!("missing feature list \"{}\"", VALUES_KEY)))?;

    // a float takes at least 4 payload bytes
    let mut values = Vec::with_capacity(list.feature.len().saturating_mul(depth).min(bytes.len() / 4));
    for (step, feat) in list.feature.iter().enumerate() {
        match &feat.kind {
            Some(feature::Kind::FloatList(floats)) => {
                if floats.value.len() != depth {
                    return Err(Error::DepthMismatch {
                        expected: depth,
                        found: floats.value.len(),
                    });
                }
                values.extend_from_slice(&floats.value);
            }
            _ => {
                return Err(Error::InvalidRecord(format!(
                    "time step {} is {}, expected float_list",
                    step,
                    feat.kind_name()
                )))
            }
        }
    }
    SequenceTensor::from_flat(values, depth)
}

/// Write `tensor` as one Format A record
pub fn write_sequence_record<W: Write>(tensor: &SequenceTensor, wtr: &mut RecordWriter<W>) -> Result<()> {
    wtr.write_record(&encode(tensor))
}

/// Open a Format A file, the depth comes from the dataset definition
pub fn open_reader<P: AsRef<Path>>(path: P, depth: usize) -> Result<SequenceReader<BufReader<File>>> {
    codec::open_reader(path, RecordFormat::SequenceExample, depth)
}
