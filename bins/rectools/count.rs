use seqrec_core::record::count_records;

use crate::utils::{required, CliResult};

pub fn run(matches: &clap::ArgMatches) -> CliResult {
    let input = required(matches, "input")?;
    println!("{}", count_records(input)?);
    Ok(())
}
