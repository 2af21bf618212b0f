/// CRC-32C and the checksum mask stored next to every record
pub mod masked_crc;
/// framing of records in a sequential file
pub mod file_format;

pub use self::file_format::{count_records, file_reader, file_writer, RecordReader, RecordWriter};
pub use self::masked_crc::MaskedCrc;
