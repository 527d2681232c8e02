use anyhow::{bail, Context, Result};
use clap::Parser;
use printdeck_core::PrinterTarget;
use printdeck_octoprint::ConnectOptions;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 480;

#[derive(Parser, Debug)]
#[command(name = "printdeck", about = "Touchscreen front-end for OctoPrint")]
pub struct Args {
    /// OctoPrint base URL.
    #[arg(long, env = "OCTOPRINT_HOST", default_value = "http://localhost:5000")]
    pub endpoint: String,
    #[arg(long, env = "OCTOPRINT_APIKEY", default_value = "", hide_env_values = true)]
    pub api_key: String,
    /// Screen size as WIDTHxHEIGHT.
    #[arg(long, env = "PRINTDECK_RESOLUTION", default_value = "")]
    pub resolution: String,
    #[arg(long, env = "PRINTDECK_LOG_FILE", default_value = "")]
    pub log_file: String,
    /// Seconds between status polls.
    #[arg(long, default_value_t = 5)]
    pub poll_interval: u64,
    #[arg(long, default_value_t = 4)]
    pub request_timeout: u64,
    #[arg(long)]
    pub serial_port: Option<String>,
    #[arg(long)]
    pub baudrate: Option<u32>,
    #[arg(long)]
    pub printer_profile: Option<String>,
    #[arg(long, default_value_t = false)]
    pub debug: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl Resolution {
    /// Parse `WIDTHxHEIGHT`; an empty value or a zero dimension means the default.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Self::default());
        }
        let lowered = raw.to_ascii_lowercase();
        let Some((width, height)) = lowered.split_once('x') else {
            bail!("invalid resolution {raw:?}, expected WIDTHxHEIGHT");
        };
        let width: u32 = width
            .trim()
            .parse()
            .with_context(|| format!("invalid resolution width in {raw:?}"))?;
        let height: u32 = height
            .trim()
            .parse()
            .with_context(|| format!("invalid resolution height in {raw:?}"))?;
        if width == 0 || height == 0 {
            return Ok(Self::default());
        }
        Ok(Self { width, height })
    }

    pub fn scale_factor(self) -> u16 {
        if self.width > 1000 {
            3
        } else if self.width > 480 {
            2
        } else {
            1
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub target: PrinterTarget,
    pub resolution: Resolution,
    pub log_file: Option<PathBuf>,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub connect: ConnectOptions,
    pub debug: bool,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self> {
        let endpoint = args.endpoint.trim().to_string();
        if endpoint.is_empty() {
            bail!("endpoint must not be empty");
        }
        if args.poll_interval == 0 {
            bail!("poll interval must be at least one second");
        }
        if args.request_timeout == 0 {
            bail!("request timeout must be at least one second");
        }
        let log_file = Some(args.log_file.trim())
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            target: PrinterTarget::new(endpoint, args.api_key.trim()),
            resolution: Resolution::parse(&args.resolution)?,
            log_file,
            poll_interval: Duration::from_secs(args.poll_interval),
            request_timeout: Duration::from_secs(args.request_timeout),
            connect: ConnectOptions {
                port: args.serial_port,
                baudrate: args.baudrate,
                printer_profile: args.printer_profile,
                ..ConnectOptions::default()
            },
            debug: args.debug,
        })
    }
}
