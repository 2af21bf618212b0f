//! Inputter settings, usually stored next to a dataset as JSON:
//!
//! ```json
//! {"format": "shape_values", "dtype": "float32"}
//! ```

use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::codec::RecordFormat;
use crate::error::{Error, Result};
use crate::inputter::{Inputter, SequenceRecordInputter, ShapedRecordInputter};
use crate::tensor::DType;

fn default_verify_checksums() -> bool {
    true
}

/// format: record payload format
/// depth: feature depth. Required for `sequence_example`, inspected from the data file otherwise
/// dtype: element type of produced tensors, float32 by default
/// verify_checksums: check the data crc of each record, on by default
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputterConfig {
    /// record payload format
    pub format: RecordFormat,
    /// feature depth
    #[serde(default)]
    pub depth: Option<usize>,
    /// element type
    #[serde(default)]
    pub dtype: DType,
    /// data crc verification
    #[serde(default = "default_verify_checksums")]
    pub verify_checksums: bool,
}

impl FromStr for InputterConfig {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

impl InputterConfig {
    /// read a JSON config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        fs::read_to_string(path)?.parse()
    }

    /// Build the configured inputter. `data_file` is only read when the
    /// depth has to be inspected
    pub fn build(&self, data_file: Option<&Path>) -> Result<Box<dyn Inputter>> {
        let inputter: Box<dyn Inputter> = match (self.format, self.depth) {
            (RecordFormat::SequenceExample, Some(depth)) => Box::new(
                SequenceRecordInputter::new(depth, self.dtype)?.verify_checksums(self.verify_checksums),
            ),
            (RecordFormat::SequenceExample, None) => {
                return Err(Error::InvalidArgument(
                    "depth is required for sequence_example records".to_owned(),
                ))
            }
            (RecordFormat::ShapeValues, Some(depth)) => Box::new(
                ShapedRecordInputter::new(depth, self.dtype)?.verify_checksums(self.verify_checksums),
            ),
            (RecordFormat::ShapeValues, None) => {
                let data_file = data_file.ok_or_else(|| {
                    Error::InvalidArgument("a data file is needed to inspect the depth".to_owned())
                })?;
                Box::new(
                    ShapedRecordInputter::from_file(data_file, self.dtype)?
                        .verify_checksums(self.verify_checksums),
                )
            }
        };
        debug!(
            "built {} inputter, depth {}, dtype {}",
            inputter.format(),
            inputter.depth(),
            inputter.dtype()
        );
        Ok(inputter)
    }
}
