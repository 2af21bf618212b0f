use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::codec::{shape_values, RecordFormat, SequenceReader};
use crate::error::{Error, Result};
use crate::inputter::Inputter;
use crate::tensor::DType;

pub use crate::codec::shape_values::write_shaped_record;

/// Inputter for records carrying their own `[length, depth]` shape (Format B).
///
/// The depth is read once from the first record of a file by `from_file` and
/// stays fixed. Every parsed record must have that depth.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedRecordInputter {
    depth: usize,
    dtype: DType,
    verify_checksums: bool,
}

impl ShapedRecordInputter {
    /// inputter for a dataset whose depth is already known
    pub fn new(depth: usize, dtype: DType) -> Result<Self> {
        if depth == 0 {
            return Err(Error::InvalidArgument("input depth must be positive".to_owned()));
        }
        Ok(ShapedRecordInputter {
            depth,
            dtype,
            verify_checksums: true,
        })
    }

    /// inputter whose depth is taken from the first record of `data_file`
    pub fn from_file<P: AsRef<Path>>(data_file: P, dtype: DType) -> Result<Self> {
        let depth = shape_values::inspect(data_file)?;
        Self::new(depth, dtype)
    }

    /// skip data crc verification when reading datasets
    pub fn verify_checksums(mut self, verify: bool) -> Self {
        self.verify_checksums = verify;
        self
    }

    /// typed reader over every record of `data_file`
    pub fn open_reader(&self, data_file: &Path) -> Result<SequenceReader<BufReader<File>>> {
        let records = self.make_dataset(data_file)?;
        Ok(SequenceReader::new(records, RecordFormat::ShapeValues, self.depth).with_dtype(self.dtype))
    }
}

impl Inputter for ShapedRecordInputter {
    fn depth(&self) -> usize {
        self.depth
    }

    fn dtype(&self) -> DType {
        self.dtype
    }

    fn format(&self) -> RecordFormat {
        RecordFormat::ShapeValues
    }

    fn verifies_checksums(&self) -> bool {
        self.verify_checksums
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::file_writer;
    use crate::tensor::SequenceTensor;

    #[test]
    fn should_infer_depth_and_apply_it_to_every_record() {
        let dir = tempfile::tempdir().unwrap();
        let fname = dir.path().join("shaped.tfrecord");
        {
            let mut wtr = file_writer(&fname, false).unwrap();
            write_shaped_record(&SequenceTensor::from_flat(vec![0.5; 20], 4).unwrap(), &mut wtr).unwrap();
            write_shaped_record(&SequenceTensor::from_flat(vec![1.5; 12], 4).unwrap(), &mut wtr).unwrap();
            wtr.flush().unwrap();
        }

        let inputter = ShapedRecordInputter::from_file(&fname, DType::F32).unwrap();
        assert_eq!(inputter.depth(), 4);
        assert_eq!(inputter.get_dataset_size(&fname).unwrap(), 2);

        let shapes: Vec<[usize; 2]> = inputter
            .make_dataset(&fname)
            .unwrap()
            .map(|element| {
                let features = inputter.make_features(Some(element.unwrap().as_slice()), None).unwrap();
                inputter.make_inputs(&features).unwrap().shape()
            })
            .collect();
        assert_eq!(shapes, vec![[5, 4], [3, 4]]);
    }

    #[test]
    fn should_detect_heterogeneous_depth() {
        let dir = tempfile::tempdir().unwrap();
        let fname = dir.path().join("mixed.tfrecord");
        {
            let mut wtr = file_writer(&fname, false).unwrap();
            write_shaped_record(&SequenceTensor::from_flat(vec![0.0; 20], 4).unwrap(), &mut wtr).unwrap();
            write_shaped_record(&SequenceTensor::from_flat(vec![0.0; 12], 3).unwrap(), &mut wtr).unwrap();
            wtr.flush().unwrap();
        }

        let inputter = ShapedRecordInputter::from_file(&fname, DType::F32).unwrap();
        let results: Vec<_> = inputter.open_reader(&fname).unwrap().collect();
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(Error::DepthMismatch { expected: 4, found: 3 })
        ));
    }

    #[test]
    fn should_fail_on_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let fname = dir.path().join("empty.tfrecord");
        file_writer(&fname, false).unwrap().flush().unwrap();
        assert!(matches!(
            ShapedRecordInputter::from_file(&fname, DType::F32),
            Err(Error::EmptyFile(_))
        ));
    }
}
