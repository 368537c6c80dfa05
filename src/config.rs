use crate::clipboard::ClipboardBackend;
use crate::error::ConfigError;
use crate::state::Theme;
use crate::submission::DEFAULT_SHEET_URL;
use crate::tilt::TiltConfig;
use crate::widget::CellMetrics;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Command line arguments; most fall back to `SHRED_*` environment variables
#[derive(Parser, Debug)]
#[command(version, about = "Shred Studio landing page for the terminal")]
pub struct Args {
    /// Largest card tilt in degrees
    #[arg(long, env = "SHRED_MAX_TILT", default_value_t = 10.0)]
    pub max_tilt: f64,

    /// Interest sheet opened after submitting
    #[arg(long, env = "SHRED_SHEET_URL", default_value = DEFAULT_SHEET_URL)]
    pub sheet_url: String,

    #[arg(long, value_enum, env = "SHRED_CLIPBOARD", default_value_t = ClipboardBackend::Osc52)]
    pub clipboard: ClipboardBackend,

    /// Give up on the clipboard after this many milliseconds
    #[arg(long, env = "SHRED_CLIPBOARD_TIMEOUT_MS", default_value_t = 5000)]
    pub clipboard_timeout_ms: u64,

    #[arg(long, value_enum, env = "SHRED_THEME", default_value_t = Theme::Dark)]
    pub theme: Theme,

    /// Width of a terminal cell in pixels
    #[arg(long, default_value_t = 8)]
    pub cell_width: u16,

    /// Height of a terminal cell in pixels
    #[arg(long, default_value_t = 16)]
    pub cell_height: u16,

    /// Log file, `-` disables logging
    #[arg(long, env = "SHRED_LOG_FILE", default_value = "shred-studio.log")]
    pub log_file: String,

    /// Start with the debug overlay enabled
    #[arg(long)]
    pub debug: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub tilt: TiltConfig,
    pub destination: String,
    pub clipboard: ClipboardBackend,
    pub clipboard_timeout: Duration,
    pub theme: Theme,
    pub cell: CellMetrics,
    pub log_file: Option<PathBuf>,
    pub debug: bool,
}

impl TryFrom<Args> for Config {
    type Error = ConfigError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        if !(args.max_tilt > 0.0 && args.max_tilt <= 45.0) {
            return Err(ConfigError::TiltOutOfRange(args.max_tilt));
        }
        if args.clipboard_timeout_ms == 0 {
            return Err(ConfigError::ZeroClipboardTimeout);
        }
        if args.cell_width == 0 || args.cell_height == 0 {
            return Err(ConfigError::ZeroCellSize {
                width: args.cell_width,
                height: args.cell_height,
            });
        }
        let destination = validate_destination(&args.sheet_url)?;

        Ok(Config {
            tilt: TiltConfig::with_max_angle(args.max_tilt),
            destination,
            clipboard: args.clipboard,
            clipboard_timeout: Duration::from_millis(args.clipboard_timeout_ms),
            theme: args.theme,
            cell: CellMetrics {
                width: f64::from(args.cell_width),
                height: f64::from(args.cell_height),
            },
            log_file: match args.log_file.as_str() {
                "-" | "" => None,
                path => Some(PathBuf::from(path)),
            },
            debug: args.debug,
        })
    }
}

fn validate_destination(raw: &str) -> Result<String, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidDestination {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw).map_err(|err| invalid(err.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url.to_string()),
        other => Err(invalid(format!("unsupported scheme `{other}`"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config, ConfigError> {
        let args = Args::try_parse_from(std::iter::once("shred-studio").chain(args.iter().copied()))
            .expect("arguments parse");
        Config::try_from(args)
    }

    #[test]
    fn defaults_match_the_page() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.tilt.max_angle, 10.0);
        assert_eq!(config.destination, DEFAULT_SHEET_URL);
        assert_eq!(config.clipboard, ClipboardBackend::Osc52);
        assert_eq!(config.clipboard_timeout, Duration::from_secs(5));
        assert_eq!(config.theme, Theme::Dark);
        assert_eq!(config.log_file, Some(PathBuf::from("shred-studio.log")));
        assert!(!config.debug);
    }

    #[test]
    fn tilt_variant_is_configurable() {
        let config = parse(&["--max-tilt", "12"]).unwrap();
        assert_eq!(config.tilt.max_angle, 12.0);
        assert_eq!(parse(&["--max-tilt", "0"]).unwrap_err(), ConfigError::TiltOutOfRange(0.0));
        assert_eq!(parse(&["--max-tilt", "90"]).unwrap_err(), ConfigError::TiltOutOfRange(90.0));
    }

    #[test]
    fn destination_must_be_http() {
        assert!(matches!(
            parse(&["--sheet-url", "ftp://example.com/sheet"]),
            Err(ConfigError::InvalidDestination { .. })
        ));
        assert!(matches!(
            parse(&["--sheet-url", "not a url"]),
            Err(ConfigError::InvalidDestination { .. })
        ));
        let config = parse(&["--sheet-url", "https://example.com/sheet"]).unwrap();
        assert_eq!(config.destination, "https://example.com/sheet");
    }

    #[test]
    fn zero_timeout_and_cells_are_rejected() {
        assert_eq!(
            parse(&["--clipboard-timeout-ms", "0"]).unwrap_err(),
            ConfigError::ZeroClipboardTimeout
        );
        assert!(matches!(
            parse(&["--cell-width", "0"]),
            Err(ConfigError::ZeroCellSize { .. })
        ));
    }

    #[test]
    fn dash_disables_the_log_file() {
        let config = parse(&["--log-file", "-", "--clipboard", "disabled", "--theme", "light"]).unwrap();
        assert_eq!(config.log_file, None);
        assert_eq!(config.clipboard, ClipboardBackend::Disabled);
        assert_eq!(config.theme, Theme::Light);
    }
}
