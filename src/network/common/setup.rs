use anyhow::{Context, Result, bail};
use clap::{Arg, ArgMatches, Command, ValueEnum, builder::EnumValueParser, value_parser};
use env_logger::{Builder, Env};
use serde::Deserialize;
use std::io::Write;

use crate::network::model::{evidence::Evidence, topology};

/// Type of storage to use for parameter snapshots
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, ValueEnum)]
pub enum StorageType {
    /// In-memory database (not persistent)
    #[serde(rename = "in-memory")]
    InMemory,

    /// SQLite database stored in a file (persistent)
    #[serde(rename = "persistent")]
    Persistent,
}

/// These options define the inputs from the user.
#[derive(Deserialize, Clone, Debug)]
pub struct CommandLineOptions {
    pub scenario_name: String,
    pub dataset_file: Option<String>,
    pub target: String,
    pub evidence: Evidence,
    pub samples: usize,
    pub seed: u64,
    pub storage_type: StorageType,
    pub db_path: Option<String>,
    pub snapshot_label: String,
    pub export_file: Option<String>,
}

/// Command-line flag for each symptom.
pub const SYMPTOM_FLAGS: [(&str, &str); 5] = [
    ("burning", topology::BURNING),
    ("quality", topology::QUALITY),
    ("wrinkled", topology::WRINKLED),
    ("mult_pages", topology::MULT_PAGES),
    ("paper_jam", topology::PAPER_JAM),
];

/// Reads `true`, `false` or `unknown`.
pub fn parse_observation(value: &str) -> Result<Option<bool>> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(Some(true)),
        "false" | "no" | "0" => Ok(Some(false)),
        "unknown" | "?" | "" => Ok(None),
        other => bail!("expected true, false or unknown, got '{}'", other),
    }
}

pub fn initialize_logging() {
    let _ = Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let file = record.file().unwrap_or("unknown");
            let line = record.line().unwrap_or(0);
            writeln!(
                buf,
                "{} [{}:{}] {}",
                record.level(),
                file,
                line,
                record.args()
            )
        })
        .try_init();
}

fn command() -> Command {
    let mut command = Command::new("BAYESDIAG")
        .version("1.0")
        .about("Learns a printer troubleshooting Bayesian network and answers diagnostic queries.")
        .arg(
            Arg::new("scenario_name")
                .long("scenario_name")
                .value_name("STRING")
                .help("Dataset scenario to learn from: 'printer' or 'synthetic'")
                .default_value("printer"),
        )
        .arg(
            Arg::new("dataset")
                .long("dataset")
                .value_name("FILE")
                .help("JSON file mapping node names to boolean arrays (overrides the scenario)"),
        )
        .arg(
            Arg::new("target")
                .long("target")
                .value_name("ROOT")
                .help("Root cause to query")
                .default_value(topology::FUSE),
        )
        .arg(
            Arg::new("samples")
                .long("samples")
                .value_name("NUMBER")
                .value_parser(value_parser!(usize))
                .help("Monte Carlo samples for the parameter-uncertainty query (0 disables it)")
                .default_value("0"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_name("NUMBER")
                .value_parser(value_parser!(u64))
                .help("Random seed for sampling and synthetic data")
                .default_value("2017"),
        )
        .arg(
            Arg::new("storage_type")
                .long("storage_type")
                .value_parser(EnumValueParser::<StorageType>::new())
                .help("Type of database storage to use: 'in-memory' or 'persistent'")
                .default_value("in-memory"),
        )
        .arg(
            Arg::new("db_path")
                .long("db_path")
                .value_name("PATH")
                .help("Path to SQLite database file (only used with persistent storage)"),
        )
        .arg(
            Arg::new("snapshot_label")
                .long("snapshot_label")
                .value_name("STRING")
                .help("Label under which learned parameters are stored")
                .default_value("printer"),
        )
        .arg(
            Arg::new("export")
                .long("export")
                .value_name("FILE")
                .help("Write the learned parameters to a JSON file"),
        );
    for (flag, symptom) in SYMPTOM_FLAGS {
        command = command.arg(
            Arg::new(flag)
                .long(flag)
                .value_name("true|false|unknown")
                .help(format!("Observed value of {}", symptom))
                .default_value("unknown"),
        );
    }
    command
}

/// Initializes logging and parses the process arguments. Exits on `--help`
/// and on malformed flags, like any clap program.
pub fn parse_configuration_options() -> Result<CommandLineOptions> {
    initialize_logging();
    options_from_matches(&command().get_matches())
}

/// Parses an explicit argument list, first element being the program name.
pub fn options_from_args<I, T>(args: I) -> Result<CommandLineOptions>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let matches = command().try_get_matches_from(args)?;
    options_from_matches(&matches)
}

fn options_from_matches(matches: &ArgMatches) -> Result<CommandLineOptions> {
    let mut evidence = Evidence::new();
    for (flag, symptom) in SYMPTOM_FLAGS {
        let raw = matches
            .get_one::<String>(flag)
            .map(String::as_str)
            .unwrap_or("unknown");
        let value = parse_observation(raw).with_context(|| format!("invalid --{}", flag))?;
        evidence.set(symptom, value);
    }

    let string_arg = |name: &str| matches.get_one::<String>(name).cloned();

    Ok(CommandLineOptions {
        scenario_name: string_arg("scenario_name").unwrap_or_else(|| "printer".to_string()),
        dataset_file: string_arg("dataset"),
        target: string_arg("target").unwrap_or_else(|| topology::FUSE.to_string()),
        evidence,
        samples: matches.get_one::<usize>("samples").copied().unwrap_or(0),
        seed: matches.get_one::<u64>("seed").copied().unwrap_or(2017),
        storage_type: matches
            .get_one::<StorageType>("storage_type")
            .copied()
            .unwrap_or(StorageType::InMemory),
        db_path: string_arg("db_path"),
        snapshot_label: string_arg("snapshot_label").unwrap_or_else(|| "printer".to_string()),
        export_file: string_arg("export"),
    })
}
