use crate::utils::parser::{RangeSpec, parse_range};
use clap::{Args, Parser, Subcommand};
use ligfilter::core::models::property::Property;
use ligfilter::supervisor::WORKER_SLOT_ENV;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "LigFilter Developers",
    version,
    about = "LigFilter CLI - Serve range queries over the ligand property table of a docking library.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load the property table and serve it through a pool of worker processes.
    Serve(ServeArgs),
    /// Run as a worker process. Started by `serve`; not meant to be invoked by hand.
    #[command(hide = true)]
    Worker(WorkerArgs),
    /// Load the property table and count the ligands matching the given ranges.
    Count(CountArgs),
    /// Convert a CSV of ligand properties into a compressed property table.
    Pack(PackArgs),
    /// Send one query to a running worker and print its reply.
    Query(QueryArgs),
}

/// Configuration sources shared by every command that loads the property table.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Path to a configuration file in TOML format.
    /// Defaults to the per-user configuration file, if one exists.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the property table file.
    #[arg(short, long, value_name = "PATH")]
    pub table: Option<PathBuf>,

    /// Override the number of ligands the property table holds.
    #[arg(short, long, value_name = "INT")]
    pub num_ligands: Option<usize>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S workers.count=8
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `serve` subcommand.
#[derive(Args, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Override the number of worker processes.
    /// Defaults to the number of available logical cores.
    #[arg(short, long, value_name = "NUM")]
    pub workers: Option<usize>,

    /// Give up on a query when the owner has not answered within this many seconds.
    #[arg(long, value_name = "SECS")]
    pub request_timeout_secs: Option<u64>,

    /// Override the address the workers listen on.
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<IpAddr>,

    /// Override the port of worker 0; worker `i` listens on `base-port + i`.
    #[arg(long, value_name = "PORT")]
    pub base_port: Option<u16>,
}

/// Arguments for the hidden `worker` subcommand.
#[derive(Args, Debug)]
pub struct WorkerArgs {
    /// The pool slot this worker occupies.
    #[arg(long, env = WORKER_SLOT_ENV, value_name = "INT")]
    pub slot: usize,

    #[arg(long, value_name = "ADDR")]
    pub bind: IpAddr,

    #[arg(long, value_name = "PORT")]
    pub base_port: u16,

    #[arg(long, value_name = "SECS")]
    pub request_timeout_secs: Option<u64>,
}

/// Arguments for the `count` subcommand.
#[derive(Args, Debug)]
pub struct CountArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub ranges: RangeArgs,

    /// Reject ranges that reach outside the docking library domain, as a worker would.
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the `pack` subcommand.
#[derive(Args, Debug)]
pub struct PackArgs {
    /// CSV file with a header row naming the nine property columns.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the compressed property table.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,
}

/// Arguments for the `query` subcommand.
#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Address of the worker to ask.
    #[arg(short, long, default_value = "127.0.0.1:3000", value_name = "ADDR:PORT")]
    pub addr: SocketAddr,

    #[command(flatten)]
    pub ranges: RangeArgs,
}

/// One optional inclusive range per property, written as `LB:UB`.
/// Either side may be left empty to keep its default.
#[derive(Args, Debug, Clone, Default)]
pub struct RangeArgs {
    /// Molecular weight range (e.g. 200:400).
    #[arg(long, value_name = "LB:UB", value_parser = parse_range, allow_hyphen_values = true)]
    pub mwt: Option<RangeSpec>,
    /// Partition coefficient xlogP range.
    #[arg(long, value_name = "LB:UB", value_parser = parse_range, allow_hyphen_values = true)]
    pub lgp: Option<RangeSpec>,
    /// Apolar desolvation range.
    #[arg(long, value_name = "LB:UB", value_parser = parse_range, allow_hyphen_values = true)]
    pub ads: Option<RangeSpec>,
    /// Polar desolvation range.
    #[arg(long, value_name = "LB:UB", value_parser = parse_range, allow_hyphen_values = true)]
    pub pds: Option<RangeSpec>,
    /// Hydrogen bond donor range.
    #[arg(long, value_name = "LB:UB", value_parser = parse_range, allow_hyphen_values = true)]
    pub hbd: Option<RangeSpec>,
    /// Hydrogen bond acceptor range.
    #[arg(long, value_name = "LB:UB", value_parser = parse_range, allow_hyphen_values = true)]
    pub hba: Option<RangeSpec>,
    /// Topological polar surface area range.
    #[arg(long, value_name = "LB:UB", value_parser = parse_range, allow_hyphen_values = true)]
    pub psa: Option<RangeSpec>,
    /// Net charge range.
    #[arg(long, value_name = "LB:UB", value_parser = parse_range, allow_hyphen_values = true)]
    pub chg: Option<RangeSpec>,
    /// Rotatable bond range.
    #[arg(long, value_name = "LB:UB", value_parser = parse_range, allow_hyphen_values = true)]
    pub nrb: Option<RangeSpec>,
}

impl RangeArgs {
    /// The ranges given on the command line, in property order.
    pub fn given(&self) -> impl Iterator<Item = (Property, RangeSpec)> + '_ {
        [
            (Property::MolecularWeight, self.mwt),
            (Property::LogP, self.lgp),
            (Property::ApolarDesolvation, self.ads),
            (Property::PolarDesolvation, self.pds),
            (Property::HydrogenBondDonors, self.hbd),
            (Property::HydrogenBondAcceptors, self.hba),
            (Property::PolarSurfaceArea, self.psa),
            (Property::NetCharge, self.chg),
            (Property::RotatableBonds, self.nrb),
        ]
        .into_iter()
        .filter_map(|(property, spec)| spec.map(|spec| (property, spec)))
    }
}
