// src/config.rs
// Command line definition and startup configuration for pshs

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::ffi::OsString;
use std::net::{IpAddr, Ipv4Addr};

use crate::tls::{TlsError, TlsMode};

pub const DEFAULT_BIND: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

#[derive(Debug)]
pub enum ConfigError {
    NoFiles,
    InvalidPrefix(String),
    Tls(TlsError),
    Network(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NoFiles => write!(f, "No files to share were given"),
            ConfigError::InvalidPrefix(prefix) => write!(
                f,
                "Invalid prefix '{}': must be non-empty and contain only URL-safe characters",
                prefix
            ),
            ConfigError::Tls(err) => write!(f, "SSL configuration error: {}", err),
            ConfigError::Network(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Tls(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TlsError> for ConfigError {
    fn from(err: TlsError) -> Self {
        ConfigError::Tls(err)
    }
}

/// Everything the server needs, as given on the command line.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub files: Vec<OsString>,
    pub prefix: Option<String>,
    pub bind: IpAddr,
    pub port: Option<u16>,
    pub tls: TlsMode,
    pub upnp: bool,
    pub qrcode: bool,
    pub request_logging: bool,
    pub timestamps: bool,
}

impl ServeConfig {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self, ConfigError> {
        let files: Vec<OsString> = matches
            .get_many::<OsString>("files")
            .map(|values| values.cloned().collect())
            .unwrap_or_default();

        let tls = TlsMode::from_args(
            matches.get_flag("ssl"),
            matches.get_one::<String>("ssl-cert").map(String::as_str),
            matches.get_one::<String>("ssl-key").map(String::as_str),
        )?;

        Ok(ServeConfig {
            files,
            prefix: matches.get_one::<String>("prefix").cloned(),
            bind: matches
                .get_one::<IpAddr>("bind")
                .copied()
                .unwrap_or(DEFAULT_BIND),
            port: matches.get_one::<u16>("port").copied(),
            tls,
            upnp: !matches.get_flag("no-upnp"),
            qrcode: !matches.get_flag("no-qrcode"),
            request_logging: !matches.get_flag("no-request-logging"),
            timestamps: !matches.get_flag("no-timestamps"),
        })
    }
}

pub fn build_cli() -> Command {
    Command::new("pshs")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Pretty small HTTP server - share the given files over HTTP(S)")
        .long_about("pshs serves exactly the files named on the command line, together with a generated index page.\n\nFiles are read fresh on every request. Nothing else on the filesystem is reachable.")
        .arg(
            Arg::new("files")
                .value_name("FILE")
                .num_args(0..)
                .value_parser(value_parser!(OsString))
                .action(ArgAction::Append)
                .help("Files to share, in the order they should appear on the index page"),
        )
        .arg(
            Arg::new("bind")
                .short('b')
                .long("bind")
                .value_name("IP")
                .value_parser(value_parser!(IpAddr))
                .help("Bind the server to this IP address (default: 0.0.0.0)"),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("N")
                .value_parser(value_parser!(u16).range(1..65535))
                .help("Port to listen on (default: random)"),
        )
        .arg(
            Arg::new("prefix")
                .short('P')
                .long("prefix")
                .value_name("PFX")
                .help("Require all URLs to start with /PFX/"),
        )
        .arg(
            Arg::new("ssl")
                .short('s')
                .long("ssl")
                .action(ArgAction::SetTrue)
                .help("Enable TLS with a freshly generated self-signed certificate"),
        )
        .arg(
            Arg::new("ssl-cert")
                .long("ssl-cert")
                .value_name("FILE")
                .help("Enable TLS with this PEM certificate chain"),
        )
        .arg(
            Arg::new("ssl-key")
                .long("ssl-key")
                .value_name("FILE")
                .help("PEM private key matching --ssl-cert"),
        )
        .arg(
            Arg::new("no-upnp")
                .short('U')
                .long("no-upnp")
                .action(ArgAction::SetTrue)
                .help("Disable port redirection using UPnP"),
        )
        .arg(
            Arg::new("no-qrcode")
                .short('Q')
                .long("no-qrcode")
                .action(ArgAction::SetTrue)
                .help("Do not print a QR code of the server URL"),
        )
        .arg(
            Arg::new("no-request-logging")
                .short('L')
                .long("no-request-logging")
                .action(ArgAction::SetTrue)
                .help("Disable HTTP request logging"),
        )
        .arg(
            Arg::new("no-timestamps")
                .short('T')
                .long("no-timestamps")
                .action(ArgAction::SetTrue)
                .help("Disable timestamps in log messages"),
        )
}
