use seqrec_core::codec::shape_values;
use seqrec_core::record::count_records;
use seqrec_core::RecordFormat;

use crate::utils::{format_of, required, CliResult};

pub fn run(matches: &clap::ArgMatches) -> CliResult {
    let input = required(matches, "input")?;
    let format = format_of(matches, "format")?;

    let records = count_records(input)?;
    // sequence_example records carry no depth
    let depth = match format {
        RecordFormat::ShapeValues if records > 0 => Some(shape_values::inspect(input)?),
        _ => None,
    };

    let meta = serde_json::json!({
        "file": input,
        "format": format,
        "records": records,
        "depth": depth,
    });
    println!("{}", serde_json::to_string_pretty(&meta)?);
    Ok(())
}
