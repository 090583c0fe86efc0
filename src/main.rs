//! geckoflash - Flash programmer for EFM32/EFR32 Series 2 parts
//!
//! Drives the flash controller of a Series 2 part through a target that
//! can read and write memory. The bundled target is a simulated chip whose
//! identity comes from a RON description and whose flash contents can be
//! kept in a state directory between runs.

mod cli;
mod commands;
mod error;
mod state;

use clap::Parser;
use cli::{Cli, Commands};
use error::CliError;
use geckoflash_core::bank::SessionRegistry;
use geckoflash_core::FlashOptions;
use geckoflash_dummy::{DummyConfig, DummyTarget};
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    let options = load_options(cli.config.as_deref())?;
    let config = load_target_config(cli.target.as_deref())?;

    let mut target = DummyTarget::new(config);
    if let Some(dir) = &cli.state {
        state::load(&mut target, dir)?;
    }

    let mut registry = SessionRegistry::new(options);
    let target_ref = &mut target;

    let result = match cli.command {
        Commands::Probe { bank } => commands::run_probe(&mut registry, target_ref, bank.bank),
        Commands::Info => commands::run_info(&mut registry, target_ref),
        Commands::Read {
            bank,
            output,
            offset,
            length,
        } => commands::run_read(&mut registry, target_ref, bank.bank, &output, offset, length),
        Commands::Write {
            bank,
            input,
            offset,
            erase,
            no_verify,
        } => commands::run_write(
            &mut registry,
            target_ref,
            bank.bank,
            &input,
            offset,
            erase,
            !no_verify,
        ),
        Commands::Erase { bank, range } => {
            commands::run_erase(&mut registry, target_ref, bank.bank, range)
        }
        Commands::Protect { range, clear } => {
            commands::run_protect(&mut registry, target_ref, range, !clear)
        }
        Commands::ProtectCheck { bank } => {
            commands::run_protect_check(&mut registry, target_ref, bank.bank)
        }
        Commands::Debuglock => commands::run_debug_lock(&mut registry, target_ref),
    };

    // Flash keeps whatever a failed operation already changed
    if let Some(dir) = &cli.state {
        state::save(&target, dir)?;
    }

    result.map_err(Into::into)
}

/// Load flash tunables, falling back to the defaults
fn load_options(path: Option<&Path>) -> Result<FlashOptions, CliError> {
    let Some(path) = path else {
        return Ok(FlashOptions::default());
    };

    let content = std::fs::read_to_string(path).map_err(|e| CliError::io(path, e))?;
    let options = toml::from_str(&content).map_err(|source| CliError::FlashConfig {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("Loaded flash options from {}: {:?}", path.display(), options);
    Ok(options)
}

/// Load the simulated part description, falling back to an xG22
fn load_target_config(path: Option<&Path>) -> Result<DummyConfig, CliError> {
    let Some(path) = path else {
        return Ok(DummyConfig::default());
    };

    let content = std::fs::read_to_string(path).map_err(|e| CliError::io(path, e))?;
    let config = ron::from_str(&content).map_err(|source| CliError::TargetConfig {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("Loaded target description from {}", path.display());
    Ok(config)
}
