use std::fs::File;
use std::sync::Mutex;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::error::{ReconError, Result};
use crate::settings::Settings;

/// Overrides `level_console` with a full filter directive, e.g. `galrecon=debug`.
pub const CONSOLE_FILTER_ENV: &str = "GALRECON_LOG";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Accepts level names (`INFO`, `warning`, `CRITICAL`...) and numeric levels
/// on the 0-50 scale used by the Galaktika tooling.
pub fn parse_level(raw: &str) -> Option<LevelFilter> {
    let level = raw.trim().to_ascii_uppercase();
    if let Ok(n) = level.parse::<u32>() {
        return Some(match n {
            0 => LevelFilter::TRACE,
            1..=10 => LevelFilter::DEBUG,
            11..=20 => LevelFilter::INFO,
            21..=30 => LevelFilter::WARN,
            31..=50 => LevelFilter::ERROR,
            _ => LevelFilter::OFF,
        });
    }
    match level.as_str() {
        "TRACE" | "NOTSET" => Some(LevelFilter::TRACE),
        "DEBUG" => Some(LevelFilter::DEBUG),
        "INFO" => Some(LevelFilter::INFO),
        "WARN" | "WARNING" => Some(LevelFilter::WARN),
        "ERROR" | "CRITICAL" => Some(LevelFilter::ERROR),
        "OFF" => Some(LevelFilter::OFF),
        _ => None,
    }
}

fn level_or_warn(raw: &str) -> LevelFilter {
    parse_level(raw).unwrap_or_else(|| {
        eprintln!("Unknown log level {raw:?}; using WARN");
        LevelFilter::WARN
    })
}

fn format_layer<W>(writer: W, bare: bool, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer().with_writer(writer).with_ansi(ansi);
    if bare {
        layer.without_time().with_level(false).with_target(false).boxed()
    } else {
        layer.boxed()
    }
}

/// Install the console and file layers described by `settings`.
///
/// The log file is truncated on every run; its directory is created.
pub fn init(settings: &Settings) -> Result<()> {
    let bare = settings.log_format.trim().eq_ignore_ascii_case("message");

    let path = settings.log_path();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ReconError::Output {
            path: path.clone(),
            source,
        })?;
    }
    let file = File::create(&path).map_err(|source| ReconError::Output {
        path: path.clone(),
        source,
    })?;

    let console = match EnvFilter::try_from_env(CONSOLE_FILTER_ENV) {
        Ok(filter) => format_layer(std::io::stdout, bare, true).with_filter(filter).boxed(),
        Err(_) => format_layer(std::io::stdout, bare, true)
            .with_filter(level_or_warn(&settings.level_console))
            .boxed(),
    };
    let file = format_layer(Mutex::new(file), bare, false)
        .with_filter(level_or_warn(&settings.level_file))
        .boxed();

    tracing_subscriber::registry()
        .with(vec![console, file])
        .try_init()
        .map_err(|e| ReconError::Other(format!("Cannot install logger: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level_names() {
        assert_eq!(parse_level("info"), Some(LevelFilter::INFO));
        assert_eq!(parse_level(" Warning "), Some(LevelFilter::WARN));
        assert_eq!(parse_level("CRITICAL"), Some(LevelFilter::ERROR));
        assert_eq!(parse_level("loud"), None);
        assert_eq!(parse_level(""), None);
    }

    #[test]
    fn test_parse_level_numbers() {
        assert_eq!(parse_level("10"), Some(LevelFilter::DEBUG));
        assert_eq!(parse_level("20"), Some(LevelFilter::INFO));
        assert_eq!(parse_level("30"), Some(LevelFilter::WARN));
        assert_eq!(parse_level("50"), Some(LevelFilter::ERROR));
        assert_eq!(parse_level("60"), Some(LevelFilter::OFF));
    }

    #[test]
    fn test_unknown_level_falls_back_to_warn() {
        assert_eq!(level_or_warn("chatty"), LevelFilter::WARN);
    }
}
