//!
//! Record framing for sequence record files (TFRecord compatible)
//!
//!
//! File Spec:
//! no global header, records are laid end to end until EOF
//!
//!
//! Record Spec:
//! Offset 00: (u64, LE) `length` of the data block
//! Offset 08: (u32, LE) masked crc32c of the 8 length bytes
//! Offset 12: ([u8; length]) data, the serialized payload
//! Offset 12 + length: (u32, LE) masked crc32c of data

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::record::masked_crc::MaskedCrc;

const HEADER_LEN: u64 = 12; // length + length crc
const FOOTER_LEN: u64 = 4; // data crc

/// Open `path` for writing records.
/// With `append` the file is created if missing and new records go after the existing ones,
/// otherwise the file is truncated.
pub fn file_writer<P: AsRef<Path>>(path: P, append: bool) -> Result<RecordWriter<BufWriter<File>>> {
    let path = path.as_ref();
    let file = if append {
        fs::OpenOptions::new().create(true).append(true).open(path)?
    } else {
        File::create(path)?
    };
    debug!("writing records to {} (append: {})", path.display(), append);
    Ok(RecordWriter::new(BufWriter::new(file)))
}

/// Open `path` for sequential reading of raw records
pub fn file_reader<P: AsRef<Path>>(path: P) -> Result<RecordReader<BufReader<File>>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    debug!("reading records from {}", path.display());
    Ok(RecordReader::new(BufReader::new(file)))
}

/// write one framed record
pub fn write_record(wtr: &mut dyn Write, data: &[u8]) -> io::Result<()> {
    let len_bytes = (data.len() as u64).to_le_bytes();
    wtr.write_all(&len_bytes)?;
    wtr.write_u32::<LittleEndian>(MaskedCrc::compute(&len_bytes).0)?;
    wtr.write_all(data)?;
    wtr.write_u32::<LittleEndian>(MaskedCrc::compute(data).0)
}

/// Appends framed records to a sequential store
#[derive(Debug)]
pub struct RecordWriter<W: Write> {
    wtr: W,
    written: u64,
}

impl<W: Write> RecordWriter<W> {
    /// wrap a writer
    pub fn new(wtr: W) -> Self {
        RecordWriter { wtr, written: 0 }
    }

    /// frame `data` and write it as exactly one record
    pub fn write_record(&mut self, data: &[u8]) -> Result<()> {
        write_record(&mut self.wtr, data)?;
        self.written += 1;
        Ok(())
    }

    /// number of records written through this handle
    pub fn records_written(&self) -> u64 {
        self.written
    }

    /// flush the underlying store
    pub fn flush(&mut self) -> Result<()> {
        self.wtr.flush()?;
        Ok(())
    }

    /// mutable access to the underlying store
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.wtr
    }

    /// unwrap the underlying store
    pub fn into_inner(self) -> W {
        self.wtr
    }
}

/// fill as much of `buf` as the reader has, returns the number of bytes read
fn read_up_to<R: Read + ?Sized>(rdr: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match rdr.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Reads the 12 byte header and checks the length crc.
/// `None` on a clean EOF (no byte left at a record boundary)
fn read_header<R: Read + ?Sized>(rdr: &mut R, offset: u64) -> Result<Option<u64>> {
    let mut buf = [0u8; HEADER_LEN as usize];
    match read_up_to(rdr, &mut buf)? {
        0 => return Ok(None),
        n if n < buf.len() => return Err(Error::Truncated { offset }),
        _ => (),
    }
    let len_crc = MaskedCrc(LittleEndian::read_u32(&buf[8..]));
    if MaskedCrc::compute(&buf[..8]) != len_crc {
        return Err(Error::Corrupted {
            offset,
            reason: "length checksum mismatch".to_owned(),
        });
    }
    Ok(Some(LittleEndian::read_u64(&buf[..8])))
}

/// Sequential reader over raw records.
///
/// Iterating yields the payload of each record. The iterator stops after the
/// first error, a truncated or corrupted file cannot be resynchronized.
#[derive(Debug)]
pub struct RecordReader<R: Read> {
    rdr: R,
    offset: u64,
    verify_checksums: bool,
    done: bool,
}

impl<R: Read> RecordReader<R> {
    /// wrap a reader positioned at a record boundary
    pub fn new(rdr: R) -> Self {
        RecordReader {
            rdr,
            offset: 0,
            verify_checksums: true,
            done: false,
        }
    }

    /// Toggle verification of the data crc. The length crc is always checked
    pub fn verify_checksums(mut self, verify: bool) -> Self {
        self.verify_checksums = verify;
        self
    }

    /// byte offset of the next record, relative to where reading started
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// read the next record, `None` at the end of the store
    pub fn read_record(&mut self) -> Result<Option<Vec<u8>>> {
        let start = self.offset;
        let len = match read_header(&mut self.rdr, start)? {
            Some(len) => len,
            None => return Ok(None),
        };

        // `take` keeps a garbage length from allocating everything up front
        let mut data = Vec::new();
        let read = self.rdr.by_ref().take(len).read_to_end(&mut data)?;
        if (read as u64) < len {
            return Err(Error::Truncated { offset: start });
        }

        let mut footer = [0u8; FOOTER_LEN as usize];
        if read_up_to(&mut self.rdr, &mut footer)? < footer.len() {
            return Err(Error::Truncated { offset: start });
        }
        if self.verify_checksums && MaskedCrc::compute(&data) != MaskedCrc(LittleEndian::read_u32(&footer)) {
            return Err(Error::Corrupted {
                offset: start,
                reason: "data checksum mismatch".to_owned(),
            });
        }

        self.offset = start + HEADER_LEN + len + FOOTER_LEN;
        Ok(Some(data))
    }

    /// unwrap the underlying reader
    pub fn into_inner(self) -> R {
        self.rdr
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_record() {
            Ok(Some(data)) => Some(Ok(data)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                warn!("stopped reading records at offset {}: {}", self.offset, e);
                Some(Err(e))
            }
        }
    }
}

/// Count the records in a file.
/// Only framing is read: each header is checked and the payload is skipped.
pub fn count_records<P: AsRef<Path>>(path: P) -> Result<u64> {
    let path = path.as_ref();
    let mut rdr = BufReader::new(File::open(path)?);
    let count = count_records_in_buf(&mut rdr)?;
    debug!("{} records in {}", count, path.display());
    Ok(count)
}

/// Count the records in a seekable buffer, starting from its beginning
pub fn count_records_in_buf<R: Read + Seek>(rdr: &mut R) -> Result<u64> {
    let end = rdr.seek(SeekFrom::End(0))?;
    let mut offset = rdr.seek(SeekFrom::Start(0))?;
    let mut count = 0;

    while offset < end {
        let len = read_header(rdr, offset)?.ok_or(Error::Truncated { offset })?;
        let next = len
            .checked_add(HEADER_LEN + FOOTER_LEN)
            .and_then(|n| offset.checked_add(n))
            .filter(|&next| next <= end)
            .ok_or(Error::Truncated { offset })?;
        rdr.seek(SeekFrom::Start(next))?;
        offset = next;
        count += 1;
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_file(payloads: &[&[u8]]) -> Vec<u8> {
        let mut wtr = RecordWriter::new(Vec::new());
        for p in payloads {
            wtr.write_record(p).unwrap();
        }
        assert_eq!(wtr.records_written(), payloads.len() as u64);
        wtr.into_inner()
    }

    #[test]
    fn should_frame_empty_record() {
        let bytes = sample_file(&[b""]);
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[..8], &[0u8; 8]);
        assert_eq!(LittleEndian::read_u32(&bytes[8..12]), MaskedCrc::compute(&[0u8; 8]).0);
        assert_eq!(&bytes[12..], &[0xD8, 0xEA, 0x82, 0xA2]);
    }

    #[test]
    fn should_read_back_records_in_order() {
        let bytes = sample_file(&[b"first", b"", b"third record"]);
        let records: Vec<Vec<u8>> = RecordReader::new(Cursor::new(bytes))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(records, vec![b"first".to_vec(), vec![], b"third record".to_vec()]);
    }

    #[test]
    fn should_count_records() {
        let bytes = sample_file(&[b"a", b"bb", b"ccc", b"dddd"]);
        assert_eq!(count_records_in_buf(&mut Cursor::new(bytes)).unwrap(), 4);
        assert_eq!(count_records_in_buf(&mut Cursor::new(Vec::new())).unwrap(), 0);
    }

    #[test]
    fn should_report_truncated_body() {
        let mut bytes = sample_file(&[b"first", b"second"]);
        bytes.truncate(bytes.len() - 2);

        let mut rdr = RecordReader::new(Cursor::new(bytes.clone()));
        assert_eq!(rdr.next().unwrap().unwrap(), b"first".to_vec());
        match rdr.next() {
            Some(Err(Error::Truncated { offset })) => assert_eq!(offset, 21),
            other => panic!("expected truncation, got {:?}", other),
        }
        assert!(rdr.next().is_none());

        match count_records_in_buf(&mut Cursor::new(bytes)) {
            Err(Error::Truncated { offset }) => assert_eq!(offset, 21),
            other => panic!("expected truncation, got {:?}", other),
        }
    }

    #[test]
    fn should_report_truncated_header() {
        let mut bytes = sample_file(&[b"first"]);
        bytes.extend_from_slice(&[1, 2, 3]);
        assert!(matches!(
            count_records_in_buf(&mut Cursor::new(bytes)),
            Err(Error::Truncated { offset: 21 })
        ));
    }

    #[test]
    fn should_detect_corrupted_data() {
        let mut bytes = sample_file(&[b"payload"]);
        bytes[13] ^= 0xFF;

        let res: Result<Vec<Vec<u8>>> = RecordReader::new(Cursor::new(bytes.clone())).collect();
        assert!(matches!(res, Err(Error::Corrupted { offset: 0, .. })));

        // counting never looks at the payload
        assert_eq!(count_records_in_buf(&mut Cursor::new(bytes.clone())).unwrap(), 1);

        let unchecked: Vec<Vec<u8>> = RecordReader::new(Cursor::new(bytes))
            .verify_checksums(false)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(unchecked.len(), 1);
    }

    #[test]
    fn should_detect_corrupted_length() {
        let mut bytes = sample_file(&[b"payload"]);
        bytes[0] ^= 0x01;
        assert!(matches!(
            count_records_in_buf(&mut Cursor::new(bytes.clone())),
            Err(Error::Corrupted { offset: 0, .. })
        ));
        let mut rdr = RecordReader::new(Cursor::new(bytes)).verify_checksums(false);
        assert!(matches!(rdr.next(), Some(Err(Error::Corrupted { .. }))));
    }

    #[test]
    fn should_append_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let fname = dir.path().join("append.tfrecord");
        {
            let mut wtr = file_writer(&fname, false).unwrap();
            wtr.write_record(b"one").unwrap();
            wtr.flush().unwrap();
        }
        {
            let mut wtr = file_writer(&fname, true).unwrap();
            wtr.write_record(b"two").unwrap();
            wtr.write_record(b"three").unwrap();
            wtr.flush().unwrap();
        }
        assert_eq!(count_records(&fname).unwrap(), 3);
        let records: Vec<Vec<u8>> = file_reader(&fname).unwrap().collect::<Result<_>>().unwrap();
        assert_eq!(records[2], b"three".to_vec());
    }
}
