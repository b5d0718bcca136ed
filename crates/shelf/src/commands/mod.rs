//! Command handlers and the per-invocation session they share.

pub mod config_cmd;
pub mod list;
pub mod util;
pub mod watch;

use std::time::Duration;

use clap::ValueEnum;
use futures_util::future::BoxFuture;
use tracing::debug;

use shelf_config::{Config, Profile, SourceTarget};
use shelf_core::{
    CatalogItem, FetchConfig, FetchController, FetchFailure, FetchSource, FetchState, HttpSource,
    SimulatedSource,
};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

// ── Source selection ─────────────────────────────────────────────────

/// The catalog source picked by profile and flags.
#[derive(Debug, Clone)]
pub enum CatalogSource {
    Http(HttpSource),
    Simulated(SimulatedSource),
}

impl FetchSource<CatalogItem> for CatalogSource {
    fn fetch(&self) -> BoxFuture<'static, Result<Vec<CatalogItem>, FetchFailure>> {
        match self {
            Self::Http(source) => source.fetch(),
            Self::Simulated(source) => source.fetch(),
        }
    }
}

// ── Session ──────────────────────────────────────────────────────────

/// Everything a fetching command needs: where to fetch from, how, and how
/// to print the result.
#[derive(Debug)]
pub struct Session {
    pub source: CatalogSource,
    /// Human-readable description of the source, for messages.
    pub target: String,
    pub fetch: FetchConfig,
    pub output: OutputFormat,
    pub color: bool,
}

impl Session {
    /// Build a session from the config file, the selected profile and CLI
    /// overrides.
    pub fn resolve(global: &GlobalOpts) -> Result<Self, CliError> {
        let cfg = shelf_config::load_config()?;
        let (name, mut profile) = shelf_config::select_profile(&cfg, global.profile.as_deref())?;
        apply_overrides(&mut profile, global);

        let resolved = shelf_config::resolve_profile(&profile, &name, &cfg.defaults)?;
        debug!(
            profile = %resolved.name,
            timeout_ms = resolved.fetch.timeout_ms(),
            "resolved profile"
        );

        let (source, target) = match resolved.target {
            SourceTarget::Http {
                endpoint,
                transport,
            } => {
                let source = HttpSource::new(endpoint.as_str(), &transport)?;
                let target = source.endpoint().to_owned();
                (CatalogSource::Http(source), target)
            }
            SourceTarget::Simulated => {
                let mut source = SimulatedSource::new()
                    .with_delay(Duration::from_millis(global.simulate_delay_ms));
                if global.simulate_failure {
                    source = source.failing();
                }
                (CatalogSource::Simulated(source), "the simulated catalog".to_owned())
            }
        };

        Ok(Self {
            source,
            target,
            fetch: resolved.fetch,
            output: output_format(global, &cfg)?,
            color: output::should_color(color_mode(global, &cfg)?),
        })
    }

    /// Build a controller that reports every transition to `on_transition`,
    /// including the auto-start one.
    pub fn controller(
        &self,
        on_transition: impl Fn(&FetchState<CatalogItem>) + Send + Sync + 'static,
    ) -> FetchController<CatalogItem> {
        FetchController::builder(self.source.clone())
            .config(self.fetch)
            .on_transition(on_transition)
            .build()
    }
}

fn apply_overrides(profile: &mut Profile, global: &GlobalOpts) {
    if let Some(ref endpoint) = global.endpoint {
        profile.endpoint.clone_from(endpoint);
        profile.simulate = false;
    }
    if let Some(timeout_ms) = global.timeout_ms {
        profile.timeout_ms = Some(timeout_ms);
    }
    if global.insecure {
        profile.insecure = true;
    }
    if global.simulate || global.simulate_failure {
        profile.simulate = true;
    }
}

fn output_format(global: &GlobalOpts, cfg: &Config) -> Result<OutputFormat, CliError> {
    if let Some(format) = global.output {
        return Ok(format);
    }
    OutputFormat::from_str(&cfg.defaults.output, true).map_err(|reason| CliError::Validation {
        field: "defaults.output".into(),
        reason,
    })
}

fn color_mode(global: &GlobalOpts, cfg: &Config) -> Result<ColorMode, CliError> {
    if let Some(mode) = global.color {
        return Ok(mode);
    }
    ColorMode::from_str(&cfg.defaults.color, true).map_err(|reason| CliError::Validation {
        field: "defaults.color".into(),
        reason,
    })
}
