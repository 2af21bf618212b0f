//! seqrec_core reads and writes variable-length sequence tensors
//! (time steps x feature depth) stored as framed records.
#![warn(missing_docs)]

extern crate byteorder;
extern crate prost;
extern crate serde;
extern crate serde_json;
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate log;

/// crate error type
pub mod error;
/// record framing: checksums, writer, reader, counter
pub mod record;
/// `tf.train` protobuf messages
pub mod proto;
/// in-memory sequence tensors
pub mod tensor;
/// payload formats for a sequence tensor
pub mod codec;
/// inputters: turn record files into model features
pub mod inputter;
/// serde description of an inputter
pub mod config;

pub use crate::codec::RecordFormat;
pub use crate::error::{Error, Result};
pub use crate::inputter::{Features, Inputter, SequenceRecordInputter, ShapedRecordInputter};
pub use crate::tensor::{DType, SequenceTensor};
