//! Config subcommand handlers.

use shelf_config::{self as config, Config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let rendered = render_config(&cfg, global.output.unwrap_or(OutputFormat::Table))?;
            output::print_output(&rendered, global.quiet);
            Ok(())
        }

        ConfigCommand::Init { force } => {
            let path = config::config_path();
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }

            let mut cfg = Config::starter();
            if let (Some(endpoint), Some(profile)) = (&global.endpoint, cfg.profiles.get_mut("default")) {
                profile.endpoint.clone_from(endpoint);
            }
            config::save_config_to(&cfg, &path)?;

            if !global.quiet {
                eprintln!("Wrote {}", path.display());
            }
            Ok(())
        }
    }
}

/// Table and plain render the TOML form; JSON and YAML serialize it.
fn render_config(cfg: &Config, format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Table | OutputFormat::Plain => {
            toml::to_string_pretty(cfg).map_err(output::render_err)
        }
        OutputFormat::Json => serde_json::to_string_pretty(cfg).map_err(output::render_err),
        OutputFormat::JsonCompact => serde_json::to_string(cfg).map_err(output::render_err),
        OutputFormat::Yaml => serde_yaml::to_string(cfg).map_err(output::render_err),
    }
}
