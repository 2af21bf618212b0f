use std::io::{self, Write};
use std::path::Path;

use crate::utils::{format_of, inputter_for, required, CliResult};

pub fn run(matches: &clap::ArgMatches) -> CliResult {
    let input = required(matches, "input")?;
    let format = format_of(matches, "format")?;
    let inputter = inputter_for(matches, input, format)?;
    let records = inputter
        .make_dataset(Path::new(input))?
        .map(|element| inputter.make_features(Some(element?.as_slice()), None));

    if matches.is_present("csv") {
        let mut wtr = csv::WriterBuilder::new()
            .flexible(true)
            .has_headers(false)
            .from_writer(io::stdout());
        for (i, features) in records.enumerate() {
            let features = features?;
            for row in inputter.make_inputs(&features)?.rows_f32() {
                let mut fields = vec![i.to_string()];
                fields.extend(row.iter().map(|v| v.to_string()));
                wtr.write_record(&fields)?;
            }
        }
        wtr.flush()?;
    } else {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for features in records {
            let features = features?;
            let tensor = inputter.make_inputs(&features)?;
            let line = serde_json::json!({
                "length": inputter.get_length(&features),
                "depth": tensor.depth(),
                "values": tensor.rows_f32(),
            });
            writeln!(out, "{}", line)?;
        }
    }
    Ok(())
}
