/// Format A: `SequenceExample` with one float feature per time step
pub mod sequence_example;
/// Format B: `Example` with explicit `shape` and flat `values`
pub mod shape_values;

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::record::{file_reader, RecordReader, RecordWriter};
use crate::tensor::{DType, SequenceTensor};

/// Payload layout of the records in a file.
/// The two formats are not interchangeable, a file written in one cannot be
/// decoded as the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordFormat {
    /// depth is implicit and supplied by the reader
    SequenceExample,
    /// each record carries `[length, depth]`
    ShapeValues,
}

impl RecordFormat {
    /// serialize `tensor` into a record payload
    pub fn encode(self, tensor: &SequenceTensor) -> Vec<u8> {
        match self {
            RecordFormat::SequenceExample => sequence_example::encode(tensor),
            RecordFormat::ShapeValues => shape_values::encode(tensor),
        }
    }

    /// parse a record payload into a float32 tensor of the given depth
    pub fn decode(self, bytes: &[u8], depth: usize) -> Result<SequenceTensor> {
        match self {
            RecordFormat::SequenceExample => sequence_example::decode(bytes, depth),
            RecordFormat::ShapeValues => shape_values::decode_with_depth(bytes, depth),
        }
    }

    /// encode `tensor` and write it as one record
    pub fn write<W: Write>(self, tensor: &SequenceTensor, wtr: &mut RecordWriter<W>) -> Result<()> {
        wtr.write_record(&self.encode(tensor))
    }
}

impl fmt::Display for RecordFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RecordFormat::SequenceExample => write!(f, "sequence_example"),
            RecordFormat::ShapeValues => write!(f, "shape_values"),
        }
    }
}

impl FromStr for RecordFormat {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sequence_example" | "seq" | "a" => Ok(RecordFormat::SequenceExample),
            "shape_values" | "shaped" | "b" => Ok(RecordFormat::ShapeValues),
            _ => Err(Error::InvalidArgument(format!("unknown record format: {}", s))),
        }
    }
}

/// Decodes every record of a file into tensors of a fixed depth
#[derive(Debug)]
pub struct SequenceReader<R: Read> {
    records: RecordReader<R>,
    format: RecordFormat,
    depth: usize,
    dtype: DType,
    done: bool,
    failed_at: Option<u64>,
}

impl<R: Read> SequenceReader<R> {
    /// decode `records` as `format`, expecting `depth` on every record
    pub fn new(records: RecordReader<R>, format: RecordFormat, depth: usize) -> Self {
        SequenceReader {
            records,
            format,
            depth,
            dtype: DType::default(),
            done: false,
            failed_at: None,
        }
    }

    /// cast decoded tensors to `dtype`
    pub fn with_dtype(mut self, dtype: DType) -> Self {
        self.dtype = dtype;
        self
    }

    /// depth applied to every record
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// payload format
    pub fn format(&self) -> RecordFormat {
        self.format
    }

    /// start offset of the record that stopped iteration, if any
    pub fn failed_at(&self) -> Option<u64> {
        self.failed_at
    }
}

impl<R: Read> Iterator for SequenceReader<R> {
    type Item = Result<SequenceTensor>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let offset = self.records.offset();
        let bytes = match self.records.next()? {
            Ok(bytes) => bytes,
            Err(e) => {
                self.done = true;
                self.failed_at = Some(offset);
                return Some(Err(e));
            }
        };
        match self.format.decode(&bytes, self.depth) {
            Ok(tensor) => Some(Ok(tensor.cast(self.dtype))),
            Err(e) => {
                self.done = true;
                self.failed_at = Some(offset);
                warn!("stopped decoding {} records at offset {}: {}", self.format, offset, e);
                Some(Err(e))
            }
        }
    }
}

/// Open a record file and decode it as `format` with a known `depth`
pub fn open_reader<P: AsRef<Path>>(
    path: P,
    format: RecordFormat,
    depth: usize,
) -> Result<SequenceReader<BufReader<File>>> {
    if depth == 0 {
        return Err(Error::InvalidArgument("depth must be positive".to_owned()));
    }
    Ok(SequenceReader::new(file_reader(path)?, format, depth))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_tensor() -> SequenceTensor {
        SequenceTensor::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap()
    }

    #[test]
    fn should_parse_format_names() {
        assert_eq!("b".parse::<RecordFormat>().unwrap(), RecordFormat::ShapeValues);
        assert_eq!("sequence_example".parse::<RecordFormat>().unwrap(), RecordFormat::SequenceExample);
        assert!("npy".parse::<RecordFormat>().is_err());
        assert_eq!(RecordFormat::ShapeValues.to_string(), "shape_values");
    }

    #[test]
    fn should_not_decode_across_formats() {
        let t = sample_tensor();
        let a = RecordFormat::SequenceExample.encode(&t);
        let b = RecordFormat::ShapeValues.encode(&t);
        assert!(RecordFormat::ShapeValues.decode(&a, 2).is_err());
        assert!(RecordFormat::SequenceExample.decode(&b, 2).is_err());
    }

    #[test]
    fn should_iterate_and_cast() {
        let mut wtr = RecordWriter::new(Vec::new());
        for _ in 0..2 {
            RecordFormat::ShapeValues.write(&sample_tensor(), &mut wtr).unwrap();
        }
        let rdr = RecordReader::new(Cursor::new(wtr.into_inner()));
        let tensors: Vec<SequenceTensor> = SequenceReader::new(rdr, RecordFormat::ShapeValues, 2)
            .with_dtype(DType::F64)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(tensors.len(), 2);
        assert_eq!(tensors[1], sample_tensor().cast(DType::F64));
    }

    #[test]
    fn should_stop_after_first_bad_record() {
        let mut wtr = RecordWriter::new(Vec::new());
        RecordFormat::ShapeValues.write(&sample_tensor(), &mut wtr).unwrap();
        wtr.write_record(b"\xFF\xFF").unwrap();
        RecordFormat::ShapeValues.write(&sample_tensor(), &mut wtr).unwrap();

        let rdr = RecordReader::new(Cursor::new(wtr.into_inner()));
        let mut it = SequenceReader::new(rdr, RecordFormat::ShapeValues, 2);
        assert!(it.next().unwrap().is_ok());
        assert_eq!(it.failed_at(), None);
        assert!(it.next().unwrap().is_err());
        // the bad record starts right after the first one
        let first_len = 12 + RecordFormat::ShapeValues.encode(&sample_tensor()).len() as u64 + 4;
        assert_eq!(it.failed_at(), Some(first_len));
        assert!(it.next().is_none());
    }
}
