/// Format A inputter
pub mod sequence;
/// Format B inputter
pub mod shaped;

pub use self::sequence::SequenceRecordInputter;
pub use self::shaped::ShapedRecordInputter;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::codec::RecordFormat;
use crate::error::{Error, Result};
use crate::record::{count_records, file_reader, RecordReader};
use crate::tensor::{DType, SequenceTensor};

/// Model features built from one record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Features {
    /// `[length, depth]` tensor
    pub tensor: Option<SequenceTensor>,
    /// number of time steps of `tensor`
    pub length: Option<usize>,
}

impl Features {
    /// features holding an already materialized tensor
    pub fn from_tensor(tensor: SequenceTensor) -> Self {
        Features {
            length: Some(tensor.len()),
            tensor: Some(tensor),
        }
    }
}

/// Name, element type and shape of one serving input. `None` is an unknown dimension
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TensorSpec {
    /// input name
    pub name: &'static str,
    /// element type
    pub dtype: String,
    /// dimensions
    pub shape: Vec<Option<usize>>,
}

/// The inputs a served model receives in place of record files
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceiverSpec {
    /// `[batch, time, depth]`
    pub tensor: TensorSpec,
    /// `[batch]` int32 lengths
    pub length: TensorSpec,
}

/// Turns record files into model-ready features
pub trait Inputter {
    /// feature depth of every record
    fn depth(&self) -> usize;

    /// element type of produced tensors
    fn dtype(&self) -> DType;

    /// payload format of the records
    fn format(&self) -> RecordFormat;

    /// whether datasets check the data crc of each record
    fn verifies_checksums(&self) -> bool {
        true
    }

    /// raw record bytes of `data_file`, in file order
    fn make_dataset(&self, data_file: &Path) -> Result<RecordReader<BufReader<File>>> {
        Ok(file_reader(data_file)?.verify_checksums(self.verifies_checksums()))
    }

    /// number of records in `data_file`
    fn get_dataset_size(&self, data_file: &Path) -> Result<u64> {
        count_records(data_file)
    }

    /// serving inputs
    fn receiver_spec(&self) -> ReceiverSpec {
        ReceiverSpec {
            tensor: TensorSpec {
                name: "tensor",
                dtype: self.dtype().to_string(),
                shape: vec![None, None, Some(self.depth())],
            },
            length: TensorSpec {
                name: "length",
                dtype: "int32".to_owned(),
                shape: vec![None],
            },
        }
    }

    /// Parse `element` into `features`.
    ///
    /// Features that already hold a tensor are returned untouched. Otherwise
    /// `element` is required and its length is taken from the decoded tensor.
    fn make_features(&self, element: Option<&[u8]>, features: Option<Features>) -> Result<Features> {
        let mut features = features.unwrap_or_default();
        if features.tensor.is_some() {
            return Ok(features);
        }
        let element = element.ok_or_else(Error::missing_input)?;
        let tensor = self.format().decode(element, self.depth())?.cast(self.dtype());
        features.length = Some(tensor.len());
        features.tensor = Some(tensor);
        Ok(features)
    }

    /// the model input held by `features`
    fn make_inputs<'a>(&self, features: &'a Features) -> Result<&'a SequenceTensor> {
        features
            .tensor
            .as_ref()
            .ok_or_else(|| Error::InvalidArgument("features hold no tensor".to_owned()))
    }

    /// sequence length of `features`, once parsed
    fn get_length(&self, features: &Features) -> Option<usize> {
        features.length
    }
}
