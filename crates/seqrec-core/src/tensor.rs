use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Element type of decoded tensors. Records always store 32-bit floats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DType {
    /// 32-bit float
    #[serde(rename = "float32")]
    F32,
    /// 64-bit float
    #[serde(rename = "float64")]
    F64,
}

impl Default for DType {
    fn default() -> Self {
        DType::F32
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DType::F32 => write!(f, "float32"),
            DType::F64 => write!(f, "float64"),
        }
    }
}

impl FromStr for DType {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "float32" | "f32" => Ok(DType::F32),
            "float64" | "f64" => Ok(DType::F64),
            _ => Err(Error::InvalidArgument(format!("unknown dtype: {}", s))),
        }
    }
}

/// Row-major element storage
#[derive(Debug, Clone, PartialEq)]
pub enum TensorData {
    /// float32 elements
    F32(Vec<f32>),
    /// float64 elements
    F64(Vec<f64>),
}

impl TensorData {
    fn numel(&self) -> usize {
        match self {
            TensorData::F32(v) => v.len(),
            TensorData::F64(v) => v.len(),
        }
    }
}

/// A `[length, depth]` sequence of feature vectors, stored row-major.
///
/// The element count is always an exact multiple of `depth`, and `depth` is
/// never zero, so reshaping into `[length, depth]` cannot fail.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceTensor {
    depth: usize,
    data: TensorData,
}

fn check_shape(numel: usize, depth: usize) -> Result<()> {
    if depth == 0 {
        return Err(Error::InvalidArgument("depth must be positive".to_owned()));
    }
    if numel % depth != 0 {
        return Err(Error::InvalidArgument(format!(
            "{} values cannot be reshaped to depth {}",
            numel, depth
        )));
    }
    Ok(())
}

impl SequenceTensor {
    /// build from row-major float32 values
    pub fn from_flat(values: Vec<f32>, depth: usize) -> Result<Self> {
        check_shape(values.len(), depth)?;
        Ok(SequenceTensor {
            depth,
            data: TensorData::F32(values),
        })
    }

    /// build from row-major float64 values
    pub fn from_flat_f64(values: Vec<f64>, depth: usize) -> Result<Self> {
        check_shape(values.len(), depth)?;
        Ok(SequenceTensor {
            depth,
            data: TensorData::F64(values),
        })
    }

    /// Build from one slice per time step. All rows must share the same
    /// non-zero length, which becomes the depth
    pub fn from_rows<R: AsRef<[f32]>>(rows: &[R]) -> Result<Self> {
        let depth = match rows.first() {
            Some(row) => row.as_ref().len(),
            None => {
                return Err(Error::InvalidArgument(
                    "cannot infer depth from zero rows".to_owned(),
                ))
            }
        };
        let mut values = Vec::with_capacity(depth * rows.len());
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != depth {
                return Err(Error::InvalidArgument(format!(
                    "row {} has {} values, expected {}",
                    i,
                    row.len(),
                    depth
                )));
            }
            values.extend_from_slice(row);
        }
        Self::from_flat(values, depth)
    }

    /// zero time steps of the given depth
    pub fn empty(depth: usize, dtype: DType) -> Result<Self> {
        match dtype {
            DType::F32 => Self::from_flat(vec![], depth),
            DType::F64 => Self::from_flat_f64(vec![], depth),
        }
    }

    /// number of time steps
    pub fn len(&self) -> usize {
        self.data.numel() / self.depth
    }

    /// true when there is no time step
    pub fn is_empty(&self) -> bool {
        self.data.numel() == 0
    }

    /// feature depth
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// `[length, depth]`
    pub fn shape(&self) -> [usize; 2] {
        [self.len(), self.depth]
    }

    /// element type
    pub fn dtype(&self) -> DType {
        match self.data {
            TensorData::F32(_) => DType::F32,
            TensorData::F64(_) => DType::F64,
        }
    }

    /// underlying storage
    pub fn data(&self) -> &TensorData {
        &self.data
    }

    /// convert the elements to `dtype`
    pub fn cast(self, dtype: DType) -> Self {
        let depth = self.depth;
        let data = match (self.data, dtype) {
            (TensorData::F32(v), DType::F64) => TensorData::F64(v.into_iter().map(f64::from).collect()),
            (TensorData::F64(v), DType::F32) => TensorData::F32(v.into_iter().map(|x| x as f32).collect()),
            (data, _) => data,
        };
        SequenceTensor { depth, data }
    }

    /// row-major elements as float32, the on-disk element type
    pub fn to_f32_vec(&self) -> Vec<f32> {
        match &self.data {
            TensorData::F32(v) => v.clone(),
            TensorData::F64(v) => v.iter().map(|&x| x as f32).collect(),
        }
    }

    /// row-major elements as float64
    pub fn to_f64_vec(&self) -> Vec<f64> {
        match &self.data {
            TensorData::F32(v) => v.iter().map(|&x| f64::from(x)).collect(),
            TensorData::F64(v) => v.clone(),
        }
    }

    /// one float32 vector per time step
    pub fn rows_f32(&self) -> Vec<Vec<f32>> {
        self.to_f32_vec()
            .chunks_exact(self.depth)
            .map(|row| row.to_vec())
            .collect()
    }
}
