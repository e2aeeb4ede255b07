//! soxgate CLI
//!
//! Command-line front end for the serialized SoX engine.

use clap::Parser;
use log::{debug, info};

use soxgate::cli::commands;
use soxgate::cli::{Cli, Commands};
use soxgate::{Mp3Quality, Result, SoxConfig, SoxGate};

fn main() {
    let cli = Cli::parse();

    soxgate::init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error [{}]: {}", e.error_code(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        println!("soxgate v{}", soxgate::VERSION);
        println!("Use --help for available commands");
        return Ok(());
    };

    let mut config = SoxConfig::load(cli.config.as_deref())?;
    if let Some(sox) = cli.sox {
        config.binary = sox;
        config.validate()?;
    }
    debug!("Using config: {:?}", config);

    let gate = SoxGate::from_config(&config);
    info!("soxgate v{} (engine: {})", soxgate::VERSION, config.binary.display());

    handle_command(&gate, command, cli.json)
}

fn handle_command(gate: &SoxGate, cmd: Commands, json: bool) -> Result<()> {
    match cmd {
        Commands::Trim {
            input,
            output,
            start,
            end,
        } => commands::trim(gate, &input, &output, start, end, json),
        Commands::Convert {
            input,
            output,
            bits,
            rate,
        } => commands::convert(gate, &input, &output, bits, rate, json),
        Commands::Mp3 {
            input,
            output,
            bitrate,
            vbr,
            quality,
            rate,
        } => {
            let quality = quality.map(Mp3Quality::new).transpose()?;
            commands::mp3(gate, &input, &output, bitrate, vbr, quality, rate, json)
        }
        Commands::SplitStereo { input, export } => {
            commands::split_stereo(gate, &input, &export.to_request(), json)
        }
        Commands::ExportChannels { input, export } => {
            commands::export_channels(gate, &input, &export.to_request(), json)
        }
        Commands::ToMono { input, export } => {
            commands::to_mono(gate, &input, &export.to_request(), json)
        }
        Commands::Mux { output, inputs } => commands::mux(gate, &inputs, &output, json),
        Commands::Info { input } => commands::info(gate, &input, json),
    }
}
