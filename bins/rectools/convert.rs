use std::error::Error;
use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use seqrec_core::codec::SequenceReader;
use seqrec_core::record::file_writer;
use seqrec_core::{Inputter, RecordFormat};

use crate::utils::{format_of, inputter_for, required, CliResult};

/// Re-encode every record `inputter` reads from `input` as `to` into
/// `output`. Returns the number of records written
fn convert_file(
    inputter: &dyn Inputter,
    input: &Path,
    output: &Path,
    to: RecordFormat,
    bar: &ProgressBar,
) -> Result<u64, Box<dyn Error>> {
    if input == output {
        return Err("INPUT and OUTPUT must be different files".into());
    }
    let records = inputter.make_dataset(input)?;
    let mut wtr = file_writer(output, false)?;
    for tensor in SequenceReader::new(records, inputter.format(), inputter.depth()) {
        to.write(&tensor?, &mut wtr)?;
        bar.inc(1);
    }
    wtr.flush()?;
    Ok(wtr.records_written())
}

pub fn run(matches: &clap::ArgMatches) -> CliResult {
    let input = required(matches, "input")?;
    let output = required(matches, "output")?;
    let from = format_of(matches, "from")?;
    let to = format_of(matches, "to")?;

    let inputter = inputter_for(matches, input, from)?;
    let total = inputter.get_dataset_size(Path::new(input))?;

    let bar = ProgressBar::new(total);
    bar.set_style(ProgressStyle::default_bar()
        .template("[{elapsed_precise}, remaining: {eta_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")
        .progress_chars("##-"));

    let written = convert_file(inputter.as_ref(), Path::new(input), Path::new(output), to, &bar)?;
    bar.finish();

    info!("converted {} records from {} to {}", written, from, to);
    Ok(())
}
