use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "reactmesh CLI - generate cached 3D molecule assets and animate reactions between them.",
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

    /// Path to a configuration file in TOML format.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory that holds the `models` folder. Overrides the config file.
    #[arg(long, global = true, value_name = "DIR")]
    pub media_root: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate (or reuse) the GLB asset for one or more chemical identifiers.
    Generate(GenerateArgs),
    /// Interpolate frames between already generated reactant and product assets.
    Animate(AnimateArgs),
    /// Generate every participant of a reaction, then animate it.
    React(ReactArgs),
    /// Inspect and repair the asset cache index.
    Cache(CacheArgs),
}

/// Arguments for the `generate` subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Identifiers to generate, e.g. `water` or `H2O`.
    #[arg(required = true, value_name = "IDENT")]
    pub identifiers: Vec<String>,

    /// Regenerate even when an asset already exists.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `animate` subcommand.
#[derive(Args, Debug)]
pub struct AnimateArgs {
    /// Public or storage path of a reactant asset. Repeat for several reactants.
    #[arg(short, long = "reactant", required = true, value_name = "PATH")]
    pub reactants: Vec<String>,

    /// Public or storage path of a product asset. Repeat for several products.
    #[arg(short, long = "product", required = true, value_name = "PATH")]
    pub products: Vec<String>,

    #[command(flatten)]
    pub animation: AnimationOverrides,
}

/// Arguments for the `react` subcommand.
#[derive(Args, Debug)]
pub struct ReactArgs {
    /// Identifier of a reactant. Repeat for several reactants.
    #[arg(short, long = "reactant", required = true, value_name = "IDENT")]
    pub reactants: Vec<String>,

    /// Identifier of a product. Repeat for several products.
    #[arg(short, long = "product", required = true, value_name = "IDENT")]
    pub products: Vec<String>,

    #[command(flatten)]
    pub animation: AnimationOverrides,
}

#[derive(Args, Debug, Default, Clone)]
pub struct AnimationOverrides {
    /// Number of frames to interpolate.
    #[arg(short = 'n', long, value_name = "NUM")]
    pub frames: Option<usize>,

    /// Maximum distance in Angstroms at which two atoms are drawn as bonded.
    #[arg(long, value_name = "FLOAT")]
    pub bond_threshold: Option<f64>,

    /// Write the animation as JSON to this file instead of stdout.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `cache` subcommand.
#[derive(Args, Debug)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommands,
}

#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// List every indexed key and its public path.
    List,
    /// Print the public path stored for a key.
    Get {
        /// Cache key or raw identifier; it is normalized before lookup.
        #[arg(value_name = "KEY")]
        key: String,
    },
    /// Check every indexed asset and regenerate the missing or corrupt ones.
    Repair,
}
