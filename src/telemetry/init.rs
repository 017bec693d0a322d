//! Telemetry initialization.
//!
//! Provides configuration and initialization for the tracing subscriber.

use tracing::Level;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Configuration for telemetry initialization.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Level for third-party crates
    pub default_level: Level,
    /// Level for events emitted by bbcli itself
    pub crate_level: Level,
    /// Whether to include file and line numbers
    pub include_file_line: bool,
    /// Whether to include the target (module path)
    pub include_target: bool,
    /// Whether to use ANSI colors
    pub ansi_colors: bool,
    /// Custom filter directive (overrides the levels if set)
    pub filter_directive: Option<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            default_level: Level::WARN,
            crate_level: Level::WARN,
            include_file_line: false,
            include_target: false,
            ansi_colors: true,
            filter_directive: None,
        }
    }
}

impl TelemetryConfig {
    /// Configuration for `--verbose`: debug events from bbcli, with targets.
    pub fn verbose() -> Self {
        Self {
            default_level: Level::WARN,
            crate_level: Level::DEBUG,
            include_file_line: false,
            include_target: true,
            ansi_colors: true,
            filter_directive: None,
        }
    }

    /// Pick the configuration for the global `--verbose` flag.
    pub fn for_verbosity(verbose: bool) -> Self {
        if verbose {
            Self::verbose()
        } else {
            Self::default()
        }
    }

    fn filter(&self) -> anyhow::Result<EnvFilter> {
        if let Some(ref directive) = self.filter_directive {
            return Ok(EnvFilter::try_new(directive)?);
        }
        // RUST_LOG wins over the flag-derived levels when present.
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        Ok(EnvFilter::new(self.default_level.to_string())
            .add_directive(format!("bbcli={}", self.crate_level).parse()?))
    }
}

/// Guard that keeps the telemetry subscriber active.
pub struct TelemetryGuard {
    #[allow(dead_code)]
    _private: (),
}

/// Initialize telemetry with the given configuration.
///
/// Returns a guard that must be kept alive for the duration of the application.
///
/// # Example
///
/// ```rust,ignore
/// use bbcli::telemetry::{init_telemetry, TelemetryConfig};
///
/// let _guard = init_telemetry(&TelemetryConfig::for_verbosity(true))?;
/// ```
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<TelemetryGuard> {
    let filter = config.filter()?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(config.ansi_colors)
        .with_target(config.include_target)
        .with_file(config.include_file_line)
        .with_line_number(config.include_file_line)
        .compact();

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer);

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(TelemetryGuard { _private: () })
}
