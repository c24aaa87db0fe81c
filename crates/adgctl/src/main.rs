use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use adgctl::cmd_codec;
use adgctl::cmd_drum::{self, DrumRackArgs};
use adgctl::cmd_macro;
use adgctl::cmd_modify;
use adgctl::cmd_sampler::{self, SamplerArgs};
use adgctl::common::{self, Options};

#[derive(Parser, Debug)]
#[command(name = "adgctl", version, about = "Ableton device file CLI")]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Output JSON where applicable
    #[arg(long)]
    json: bool,
    /// Do everything except writing the output files
    #[arg(long)]
    dry_run: bool,
    /// Process batch folders on all cores
    #[arg(long)]
    parallel: bool,
    /// JSON tool configuration
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print (or save) the XML inside a device file
    Decode {
        input: PathBuf,
        output: Option<PathBuf>,
    },
    /// Compress an XML file into a device file
    Encode { input: PathBuf, output: PathBuf },
    /// Summarise a device file or a folder of them
    Info { input: PathBuf },
    /// Fill a drum rack template from a sample folder
    DrumRack {
        samples: PathBuf,
        output: PathBuf,
        #[arg(long)]
        template: Option<PathBuf>,
        /// sequential, standard, 808 or percussion
        #[arg(long, default_value = "sequential")]
        layout: String,
        /// Order sequential samples by drum category
        #[arg(long)]
        categorize: bool,
        #[arg(long)]
        no_recursive: bool,
        #[arg(long, default_value_t = 32)]
        max_samples: usize,
    },
    /// One pad per note from "Auto Sampled" velocity layers
    Multivelocity {
        samples: PathBuf,
        output: PathBuf,
        #[arg(long)]
        template: Option<PathBuf>,
    },
    /// Build a sampler with one zone per sample
    Sampler {
        samples: PathBuf,
        output: PathBuf,
        #[arg(long)]
        template: Option<PathBuf>,
        /// chromatic, drum or percussion
        #[arg(long, default_value = "chromatic")]
        layout: String,
        #[arg(long)]
        max_samples: Option<usize>,
    },
    /// Shift pad notes
    Remap {
        input: PathBuf,
        output: PathBuf,
        #[arg(long, allow_negative_numbers = true)]
        shift: i64,
        #[arg(long, allow_negative_numbers = true, default_value_t = 0)]
        scroll_shift: i64,
        /// Fail instead of clamping notes into 0-127
        #[arg(long)]
        no_clamp: bool,
    },
    /// Keep only the highest pads
    Trim {
        input: PathBuf,
        output: PathBuf,
        #[arg(long, default_value_t = 16)]
        keep: usize,
    },
    /// Color pads by drum category
    Color { input: PathBuf, output: PathBuf },
    /// Route CC Control slots to macros
    CcMap {
        input: PathBuf,
        output: PathBuf,
        /// slot:cc:macro[,...], all 0-based
        #[arg(long)]
        map: Option<String>,
    },
    /// Map sampler transpose to a macro
    Transpose {
        input: PathBuf,
        output: PathBuf,
        #[arg(long = "macro", default_value_t = 16)]
        macro_number: usize,
        #[arg(long, default_value_t = 63.5)]
        value: f64,
    },
}

fn main() -> Result<ExitCode> {
    let Cli {
        verbose,
        json,
        dry_run,
        parallel,
        config,
        cmd,
    } = Cli::parse();

    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| level.into()),
        ))
        .with_target(false)
        .init();

    let config = common::load_config(config.as_deref())?;
    let opts = Options {
        json,
        dry_run,
        parallel: parallel || config.parallel,
        config,
    };

    let ok = match cmd {
        Cmd::Decode { input, output } => {
            cmd_codec::decode(&input, output.as_deref(), &opts)?;
            true
        }
        Cmd::Encode { input, output } => {
            cmd_codec::encode(&input, &output, &opts)?;
            true
        }
        Cmd::Info { input } => {
            cmd_codec::info(&input, &opts)?;
            true
        }
        Cmd::DrumRack {
            samples,
            output,
            template,
            layout,
            categorize,
            no_recursive,
            max_samples,
        } => {
            let args = DrumRackArgs {
                samples,
                output,
                template,
                layout,
                categorize,
                recursive: !no_recursive,
                max_samples,
            };
            cmd_drum::run(args, &opts)?;
            true
        }
        Cmd::Multivelocity {
            samples,
            output,
            template,
        } => {
            cmd_drum::multivelocity(&samples, &output, template, &opts)?;
            true
        }
        Cmd::Sampler {
            samples,
            output,
            template,
            layout,
            max_samples,
        } => {
            let args = SamplerArgs {
                samples,
                output,
                template,
                layout,
                max_samples,
            };
            cmd_sampler::run(args, &opts)?;
            true
        }
        Cmd::Remap {
            input,
            output,
            shift,
            scroll_shift,
            no_clamp,
        } => cmd_modify::remap(&input, &output, shift, scroll_shift, !no_clamp, &opts)?,
        Cmd::Trim {
            input,
            output,
            keep,
        } => cmd_modify::trim(&input, &output, keep, &opts)?,
        Cmd::Color { input, output } => cmd_modify::color(&input, &output, &opts)?,
        Cmd::CcMap { input, output, map } => cmd_macro::cc_map(&input, &output, map.as_deref(), &opts)?,
        Cmd::Transpose {
            input,
            output,
            macro_number,
            value,
        } => cmd_macro::transpose(&input, &output, macro_number, value, &opts)?,
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
