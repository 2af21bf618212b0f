use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::codec::{RecordFormat, SequenceReader};
use crate::error::{Error, Result};
use crate::inputter::Inputter;
use crate::tensor::DType;

pub use crate::codec::sequence_example::write_sequence_record;

/// Inputter for variable-length tensors stored as `SequenceExample` records
/// (Format A). The depth is not stored in the records and is fixed here.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceRecordInputter {
    depth: usize,
    dtype: DType,
    verify_checksums: bool,
}

impl SequenceRecordInputter {
    /// `depth` is the size of each time step's feature vector, `dtype` the
    /// element type tensors are cast to
    pub fn new(depth: usize, dtype: DType) -> Result<Self> {
        if depth == 0 {
            return Err(Error::InvalidArgument("input depth must be positive".to_owned()));
        }
        Ok(SequenceRecordInputter {
            depth,
            dtype,
            verify_checksums: true,
        })
    }

    /// skip data crc verification when reading datasets
    pub fn verify_checksums(mut self, verify: bool) -> Self {
        self.verify_checksums = verify;
        self
    }

    /// typed reader over every record of `data_file`
    pub fn open_reader(&self, data_file: &Path) -> Result<SequenceReader<BufReader<File>>> {
        let records = self.make_dataset(data_file)?;
        Ok(SequenceReader::new(records, RecordFormat::SequenceExample, self.depth).with_dtype(self.dtype))
    }
}

impl Inputter for SequenceRecordInputter {
    fn depth(&self) -> usize {
        self.depth
    }

    fn dtype(&self) -> DType {
        self.dtype
    }

    fn format(&self) -> RecordFormat {
        RecordFormat::SequenceExample
    }

    fn verifies_checksums(&self) -> bool {
        self.verify_checksums
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::sequence_example;
    use crate::inputter::Features;
    use crate::record::file_writer;
    use crate::tensor::{SequenceTensor, TensorData};

    #[test]
    fn should_reject_zero_depth() {
        assert!(SequenceRecordInputter::new(0, DType::F32).is_err());
    }

    #[test]
    fn should_make_features_from_record() {
        let t = SequenceTensor::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        let bytes = sequence_example::encode(&t);

        let inputter = SequenceRecordInputter::new(3, DType::F64).unwrap();
        let features = inputter.make_features(Some(bytes.as_slice()), None).unwrap();
        assert_eq!(features.length, Some(2));
        let tensor = features.tensor.unwrap();
        assert_eq!(tensor.dtype(), DType::F64);
        assert_eq!(tensor.data(), &TensorData::F64(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]));
    }

    #[test]
    fn should_fail_cleanly_on_huge_depth() {
        let t = SequenceTensor::from_flat(vec![1.0, 2.0, 3.0], 1).unwrap();
        let inputter = SequenceRecordInputter::new(usize::MAX / 2, DType::F32).unwrap();
        let bytes = sequence_example::encode(&t);
        assert!(matches!(
            inputter.make_features(Some(bytes.as_slice()), None),
            Err(Error::DepthMismatch { found: 1, .. })
        ));
    }

    #[test]
    fn should_fill_existing_features_without_tensor() {
        let t = SequenceTensor::from_rows(&[vec![1.0]]).unwrap();
        let inputter = SequenceRecordInputter::new(1, DType::F32).unwrap();
        let features = inputter
            .make_features(Some(sequence_example::encode(&t).as_slice()), Some(Features::default()))
            .unwrap();
        assert_eq!(features, Features::from_tensor(t));
    }

    #[test]
    fn should_read_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let fname = dir.path().join("seq.tfrecord");
        {
            let mut wtr = file_writer(&fname, false).unwrap();
            for len in 1..=4 {
                let t = SequenceTensor::from_flat(vec![len as f32; len * 2], 2).unwrap();
                write_sequence_record(&t, &mut wtr).unwrap();
            }
            wtr.flush().unwrap();
        }

        let inputter = SequenceRecordInputter::new(2, DType::F32).unwrap();
        assert_eq!(inputter.get_dataset_size(&fname).unwrap(), 4);

        let lengths: Vec<usize> = inputter
            .make_dataset(&fname)
            .unwrap()
            .map(|element| {
                let features = inputter.make_features(Some(element.unwrap().as_slice()), None).unwrap();
                inputter.get_length(&features).unwrap()
            })
            .collect();
        assert_eq!(lengths, vec![1, 2, 3, 4]);

        let tensors: Vec<SequenceTensor> = inputter.open_reader(&fname).unwrap().map(|t| t.unwrap()).collect();
        assert_eq!(tensors[3].to_f32_vec(), vec![4.0; 8]);
    }
}
