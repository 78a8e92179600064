//! Command-line front end for the forwarding helpers.
//!
//! Runs the same transformations the proxy applies so forwarding decisions
//! and captured traffic can be inspected offline.
//!
//! ```text
//! proxy-helpers transport https://backend.internal:8443
//! proxy-helpers headers -t http://backend:9000 -H 'host: localhost' -H 'set-cookie: a=1' --flatten
//! proxy-helpers decode body.bin --encoding gzip
//! ```

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hyper::body::Bytes;
use serde::Serialize;

use proxy_helpers::config::{load_config, HelperConfig};
use proxy_helpers::observability::logging;
use proxy_helpers::{
    decode_body, fix_headers, flatten_headers, select_transport, CapturedResponse, HeaderSet, Target,
    Transport,
};

#[derive(Parser)]
#[command(name = "proxy-helpers")]
#[command(about = "Inspect forwarding decisions and captured proxy traffic", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show which transport a target URL is forwarded over
    Transport {
        url: String,
    },
    /// Rewrite request headers for a target
    Headers {
        /// Target URL (defaults to forwarding.default_target)
        #[arg(short, long)]
        target: Option<String>,

        /// Header as 'name: value'; repeat a name for multi-valued fields
        #[arg(short = 'H', long = "header", value_parser = parse_header)]
        headers: Vec<(String, String)>,

        /// Collapse multi-valued fields into single strings
        #[arg(long)]
        flatten: bool,
    },
    /// Decode a captured response body
    Decode {
        file: PathBuf,

        /// Content-Encoding the body was captured with
        #[arg(short, long)]
        encoding: Option<String>,
    },
}

#[derive(Serialize)]
struct TransportReport<'a> {
    scheme: Option<&'a str>,
    host: Option<&'a str>,
    transport: Transport,
    secure: bool,
    default_port: u16,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected 'name: value', got '{}'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty header name in '{}'", raw));
    }
    Ok((name.to_ascii_lowercase(), value.trim().to_string()))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => HelperConfig::default(),
    };
    logging::init_logging(&config.observability)?;

    match cli.command {
        Commands::Transport { url } => {
            let target: Target = url.parse()?;
            let transport = select_transport(&target)?;
            let report = TransportReport {
                scheme: target.scheme(),
                host: target.host(),
                transport,
                secure: transport.is_secure(),
                default_port: transport.default_port(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Headers {
            target,
            headers,
            flatten,
        } => {
            let raw_target = target
                .or(config.forwarding.default_target)
                .ok_or("no --target given and forwarding.default_target is not set")?;
            let target: Target = raw_target.parse()?;

            let mut inbound = HeaderSet::new();
            for (name, value) in headers {
                inbound.append(name, value);
            }

            let fixed = fix_headers(&target, &inbound);
            tracing::debug!(forward_to = %raw_target, fields = fixed.len(), "Headers fixed for target");

            let out = if flatten {
                serde_json::to_string_pretty(&flatten_headers(&fixed))?
            } else {
                serde_json::to_string_pretty(&fixed)?
            };
            println!("{}", out);
        }
        Commands::Decode { file, encoding } => {
            let body = fs::read(&file)?;
            let mut headers = HeaderSet::new();
            if let Some(encoding) = encoding {
                headers.insert("content-encoding", encoding);
            }

            let response = CapturedResponse::new(headers, Some(Bytes::from(body)));
            if let Some(text) = decode_body(&response)? {
                println!("{}", text);
            } else {
                tracing::info!(file = ?file, "Captured body is empty");
            }
        }
    }

    Ok(())
}
