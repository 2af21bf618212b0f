#[macro_use]
extern crate log;
extern crate fern;
extern crate clap;
extern crate seqrec_core;

mod utils;
mod count;
mod meta;
mod cat;
mod pack;
mod convert;

use clap::{App, Arg, ArgMatches, SubCommand};
use indoc::indoc;

fn main() {
    let matches = get_matches();

    let verbosity = matches.occurrences_of("v") as u8;
    let log_file = matches
        .value_of("log_file")
        .map(String::from)
        .or_else(|| utils::key_or_none("RECTOOLS_LOG_FILE"));
    if let Err(e) = prepare_logger(verbosity, log_file.as_deref()) {
        eprintln!("cannot set up logging: {}", e);
        ::std::process::exit(1);
    }

    let res = match matches.subcommand() {
        ("count", Some(m)) => count::run(m),
        ("meta", Some(m)) => meta::run(m),
        ("cat", Some(m)) => cat::run(m),
        ("pack", Some(m)) => pack::run(m),
        ("convert", Some(m)) => convert::run(m),
        _ => {
            println!("{}", matches.usage());
            Ok(())
        }
    };

    if let Err(e) = res {
        error!("{}", e);
        ::std::process::exit(1);
    }
}

fn prepare_logger(verbosity: u8, log_file: Option<&str>) -> Result<(), fern::InitError> {
    let level = match verbosity {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        3 => log::LevelFilter::Debug,
        _ => log::LevelFilter::max(),
    };

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S:%f]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr());
    if let Some(log_file) = log_file {
        dispatch = dispatch.chain(fern::log_file(log_file)?);
    }
    dispatch.apply()?;
    Ok(())
}

fn format_arg(name: &'static str, long: &'static str, default: &'static str) -> Arg<'static, 'static> {
    Arg::with_name(name)
        .long(long)
        .value_name("FORMAT")
        .help("record format: sequence_example (a) or shape_values (b)")
        .default_value(default)
        .takes_value(true)
}

fn depth_arg() -> Arg<'static, 'static> {
    Arg::with_name("depth")
        .short("d")
        .long("depth")
        .value_name("DEPTH")
        .help("feature depth, falls back to RECTOOLS_DEPTH; inspected from the file for shape_values")
        .takes_value(true)
}

fn no_verify_arg() -> Arg<'static, 'static> {
    Arg::with_name("no_verify")
        .long("no-verify")
        .help("skip the data checksum of each record")
}

fn get_matches<'a>() -> ArgMatches<'a> {
    App::new("rectools")
        .version("0.1.0")
        .author("Ricky Han <tectonic@rickyhan.com>")
        .about("tools for sequence record files")
        .arg(Arg::with_name("v").short("v").multiple(true).help(
            "Sets the level of verbosity",
        ))
        .arg(
            Arg::with_name("log_file")
                .short("l")
                .long("log_file")
                .value_name("LOG_FILE")
                .help("Also write logs to this file, falls back to RECTOOLS_LOG_FILE")
                .takes_value(true),
        )

        .subcommand(SubCommand::with_name("count")
            .about(indoc!("
                Count the records of a file
                Examples:
                rectools count train.tfrecord
                "))
            .arg(
                Arg::with_name("input")
                    .value_name("INPUT")
                    .help("file to read")
                    .required(true)
                    .takes_value(true),
            ))

        .subcommand(SubCommand::with_name("meta")
            .about(indoc!("
                Print record count and depth as json
                Examples:
                rectools meta train.tfrecord
                rectools meta train.tfrecord --format sequence_example
                "))
            .arg(
                Arg::with_name("input")
                    .value_name("INPUT")
                    .help("file to read")
                    .required(true)
                    .takes_value(true),
            )
            .arg(format_arg("format", "format", "shape_values")))

        .subcommand(SubCommand::with_name("cat")
            .about(indoc!("
                Print records as json, one per line, or as csv rows
                Examples:
                rectools cat train.tfrecord
                rectools cat feats.tfrecord --format sequence_example -d 40 --csv
                "))
            .arg(
                Arg::with_name("input")
                    .value_name("INPUT")
                    .help("file to read")
                    .required(true)
                    .takes_value(true),
            )
            .arg(format_arg("format", "format", "shape_values"))
            .arg(depth_arg())
            .arg(no_verify_arg())
            .arg(Arg::with_name("csv")
                .long("csv")
                .help("output `record,v0,v1,..` rows instead of json")))

        .subcommand(SubCommand::with_name("pack")
            .about(indoc!("
                Write each csv file (one time step per line) as one record
                An empty csv file becomes a zero length record and needs --depth
                Examples:
                rectools pack out.tfrecord utt1.csv utt2.csv
                rectools pack out.tfrecord utt3.csv --format sequence_example --append
                "))
            .arg(
                Arg::with_name("output")
                    .value_name("OUTPUT")
                    .help("record file to write")
                    .required(true)
                    .takes_value(true)
                    .index(1),
            )
            .arg(
                Arg::with_name("inputs")
                    .value_name("INPUTS")
                    .help("csv files to pack")
                    .required(true)
                    .multiple(true)
                    .takes_value(true)
                    .index(2),
            )
            .arg(format_arg("format", "format", "shape_values"))
            .arg(depth_arg())
            .arg(Arg::with_name("append")
                .short("a")
                .long("append")
                .help("append to OUTPUT instead of truncating it")))

        .subcommand(SubCommand::with_name("convert")
            .about(indoc!("
                Re-encode every record of a file in another format
                Examples:
                rectools convert feats.tfrecord shaped.tfrecord --from sequence_example --to shape_values -d 40
                "))
            .arg(
                Arg::with_name("input")
                    .value_name("INPUT")
                    .help("file to read")
                    .required(true)
                    .takes_value(true)
                    .index(1),
            )
            .arg(
                Arg::with_name("output")
                    .value_name("OUTPUT")
                    .help("file to write")
                    .required(true)
                    .takes_value(true)
                    .index(2),
            )
            .arg(format_arg("from", "from", "sequence_example"))
            .arg(format_arg("to", "to", "shape_values"))
            .arg(depth_arg())
            .arg(no_verify_arg()))
        .get_matches()
}
