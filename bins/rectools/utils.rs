use std::env;
use std::error::Error;
use std::path::Path;

use seqrec_core::config::InputterConfig;
use seqrec_core::{DType, Inputter, RecordFormat};

pub type CliResult = Result<(), Box<dyn Error>>;

pub fn key_or_none(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(val) => Some(val),
        Err(_) => None,
    }
}

/// value of a required positional argument
pub fn required<'a>(matches: &'a clap::ArgMatches, name: &str) -> Result<&'a str, Box<dyn Error>> {
    matches
        .value_of(name)
        .ok_or_else(|| format!("missing argument {}", name).into())
}

pub fn format_of(matches: &clap::ArgMatches, name: &str) -> Result<RecordFormat, Box<dyn Error>> {
    Ok(required(matches, name)?.parse()?)
}

/// `--depth`, then RECTOOLS_DEPTH
pub fn depth_of(matches: &clap::ArgMatches) -> Result<Option<usize>, Box<dyn Error>> {
    let depth = matches
        .value_of("depth")
        .map(String::from)
        .or_else(|| key_or_none("RECTOOLS_DEPTH"));
    match depth {
        Some(d) => Ok(Some(d.parse()?)),
        None => Ok(None),
    }
}

/// inputter for reading `input` as `format`
pub fn inputter_for(
    matches: &clap::ArgMatches,
    input: &str,
    format: RecordFormat,
) -> Result<Box<dyn Inputter>, Box<dyn Error>> {
    let config = InputterConfig {
        format,
        depth: depth_of(matches)?,
        dtype: DType::F32,
        verify_checksums: !matches.is_present("no_verify"),
    };
    Ok(config.build(Some(Path::new(input)))?)
}
