use std::error::Error;
use std::io::Write;

use seqrec_core::record::{file_writer, RecordWriter};
use seqrec_core::{DType, RecordFormat, SequenceTensor};

use crate::utils::{depth_of, format_of, required, CliResult};

/// One time step per line, comma separated.
/// A file without any line needs `depth` to become an empty sequence
fn read_csv_tensor(path: &str, depth: Option<usize>) -> Result<SequenceTensor, Box<dyn Error>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;
    let mut rows: Vec<Vec<f32>> = vec![];
    for record in rdr.records() {
        let record = record?;
        let row = record
            .iter()
            .map(|v| v.parse::<f32>())
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(row);
    }
    match (rows.is_empty(), depth) {
        (true, Some(depth)) => Ok(SequenceTensor::empty(depth, DType::F32)?),
        (true, None) => Err(format!("{} has no rows, pass --depth to pack it as an empty sequence", path).into()),
        (false, _) => Ok(SequenceTensor::from_rows(&rows)?),
    }
}

/// Write each csv file as one record. All inputs share one depth, which is
/// `depth` when given, else the depth of the first input. Returns that depth
fn pack_files<W: Write>(
    inputs: &[&str],
    format: RecordFormat,
    depth: Option<usize>,
    wtr: &mut RecordWriter<W>,
) -> Result<Option<usize>, Box<dyn Error>> {
    let mut depth = depth;
    for input in inputs {
        let tensor = read_csv_tensor(input, depth)?;
        match depth {
            Some(d) if d != tensor.depth() => {
                return Err(format!("{} has depth {}, expected {}", input, tensor.depth(), d).into());
            }
            _ => depth = Some(tensor.depth()),
        }
        format.write(&tensor, wtr)?;
        info!("packed {} as {} x {}", input, tensor.len(), tensor.depth());
    }
    Ok(depth)
}

pub fn run(matches: &clap::ArgMatches) -> CliResult {
    let output = required(matches, "output")?;
    let format = format_of(matches, "format")?;
    let append = matches.is_present("append");
    let inputs: Vec<&str> = matches.values_of("inputs").ok_or("missing INPUTS")?.collect();

    let mut wtr = file_writer(output, append)?;
    pack_files(&inputs, format, depth_of(matches)?, &mut wtr)?;
    wtr.flush()?;

    info!("wrote {} {} records to {}", wtr.records_written(), format, output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use seqrec_core::record::count_records;
    use seqrec_core::{Inputter, ShapedRecordInputter};
    use std::fs;

    fn write_csv(dir: &tempfile::TempDir, name: &str, body: &str) -> String {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn should_read_rows() {
        let dir = tempfile::tempdir().unwrap();
        let csv = write_csv(&dir, "a.csv", "1, 2\n3, 4\n5, 6\n");
        let t = read_csv_tensor(&csv, None).unwrap();
        assert_eq!(t.shape(), [3, 2]);
        assert_eq!(t.to_f32_vec(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn should_reject_ragged_csv() {
        let dir = tempfile::tempdir().unwrap();
        let csv = write_csv(&dir, "ragged.csv", "1,2\n3\n");
        assert!(read_csv_tensor(&csv, None).is_err());
    }

    #[test]
    fn should_need_depth_for_empty_csv() {
        let dir = tempfile::tempdir().unwrap();
        let csv = write_csv(&dir, "empty.csv", "");
        assert!(read_csv_tensor(&csv, None).is_err());
        assert_eq!(read_csv_tensor(&csv, Some(3)).unwrap().shape(), [0, 3]);
    }

    #[test]
    fn should_reject_depth_mismatch_across_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_csv(&dir, "a.csv", "1,2\n3,4\n");
        let b = write_csv(&dir, "b.csv", "1,2,3\n");
        let mut wtr = RecordWriter::new(Vec::new());
        let err = pack_files(&[a.as_str(), b.as_str()], RecordFormat::ShapeValues, None, &mut wtr).unwrap_err();
        assert!(err.to_string().contains("expected 2"));
        assert_eq!(wtr.records_written(), 1);

        let mut wtr = RecordWriter::new(Vec::new());
        assert!(pack_files(&[a.as_str()], RecordFormat::ShapeValues, Some(3), &mut wtr).is_err());
    }

    #[test]
    fn should_pack_and_append() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_csv(&dir, "a.csv", "1,2\n3,4\n5,6\n");
        let empty = write_csv(&dir, "empty.csv", "");
        let out = dir.path().join("out.tfrecord");

        let mut wtr = file_writer(&out, false).unwrap();
        let depth = pack_files(&[a.as_str()], RecordFormat::ShapeValues, None, &mut wtr).unwrap();
        wtr.flush().unwrap();
        assert_eq!(depth, Some(2));

        let mut wtr = file_writer(&out, true).unwrap();
        pack_files(&[empty.as_str(), a.as_str()], RecordFormat::ShapeValues, Some(2), &mut wtr).unwrap();
        wtr.flush().unwrap();
        assert_eq!(count_records(&out).unwrap(), 3);

        let inputter = ShapedRecordInputter::from_file(&out, DType::F32).unwrap();
        let lengths: Vec<usize> = inputter
            .open_reader(&out)
            .unwrap()
            .map(|t| t.unwrap().len())
            .collect();
        assert_eq!(lengths, vec![3, 0, 3]);
        assert_eq!(inputter.depth(), 2);
    }
}
