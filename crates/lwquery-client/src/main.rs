//! lwquery: poll dedicated server state over the lightweight query protocol.
//!
//! - Targets come from the command line or the config's `servers` list
//! - One task, socket, and cookie per target; reports print in input order
//! - Exit status is non-zero if any target failed

use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tokio::task::JoinSet;
use tracing_subscriber::{fmt, EnvFilter};

use lwquery_client::config;
use lwquery_client::report::StateReport;
use lwquery_client::{new_cookie, query_state_with};
use lwquery_core::error::{LwQueryError, Result};

/// Poll dedicated server state
#[derive(Parser, Debug)]
#[command(name = "lwquery")]
#[command(version)]
#[command(about = "Poll dedicated server state over the lightweight query protocol")]
struct Args {
    /// Servers to query ("host:port"); replaces the config's server list
    addresses: Vec<String>,

    /// YAML config file (falls back to $LWQUERY_CONFIG)
    #[arg(short, long)]
    config: Option<String>,

    /// Send attempts per server
    #[arg(long)]
    retries: Option<usize>,

    /// Delay between attempts in milliseconds
    #[arg(long)]
    retry_delay_ms: Option<u64>,

    /// Fixed cookie instead of a random one
    #[arg(long)]
    cookie: Option<u64>,

    /// Accept the first datagram even if its cookie differs
    #[arg(long)]
    no_match_cookie: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Trace logging
    #[arg(short, long)]
    trace: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug)]
struct Target {
    name: String,
    address: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let filter = if args.trace {
        EnvFilter::new("trace")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(code = e.code().as_str(), error = %e, "lwquery failed");
            ExitCode::FAILURE
        }
    }
}

/// Returns Ok(false) if at least one target failed.
async fn run(args: Args) -> Result<bool> {
    let mut cfg = config::load(args.config.as_deref())?;

    if let Some(retries) = args.retries {
        cfg.query.max_retries = retries;
    }
    if let Some(delay) = args.retry_delay_ms {
        cfg.query.retry_delay_ms = delay;
    }
    if args.no_match_cookie {
        cfg.query.match_cookie = false;
    }
    cfg.query.validate()?;

    let targets: Vec<Target> = if args.addresses.is_empty() {
        cfg.servers
            .iter()
            .map(|s| Target {
                name: s.name.clone(),
                address: s.address.clone(),
            })
            .collect()
    } else {
        args.addresses
            .iter()
            .map(|a| Target {
                name: a.clone(),
                address: a.clone(),
            })
            .collect()
    };
    if targets.is_empty() {
        return Err(LwQueryError::Config(
            "no servers: pass an address or list servers in the config".into(),
        ));
    }

    let opts = cfg.query.options();
    tracing::info!(targets = targets.len(), max_retries = opts.max_retries, "querying servers");

    let mut set = JoinSet::new();
    for (idx, target) in targets.into_iter().enumerate() {
        let opts = opts.clone();
        let cookie = args.cookie.unwrap_or_else(new_cookie);
        set.spawn(async move {
            let res = query_state_with(&target.address, cookie, &opts).await;
            (idx, target, res)
        });
    }

    let mut results = Vec::new();
    let mut all_ok = true;
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(r) => results.push(r),
            Err(e) => {
                tracing::error!(error = %e, "query task failed");
                all_ok = false;
            }
        }
    }
    results.sort_by_key(|(idx, _, _)| *idx);

    for (_, target, res) in results {
        match res {
            Ok(resp) => {
                let report = StateReport::new(&target.name, &target.address, &resp);
                match args.format {
                    OutputFormat::Text => println!("{}", report.render_text()),
                    OutputFormat::Json => match report.render_json() {
                        Ok(json) => println!("{json}"),
                        Err(e) => {
                            tracing::error!(server = %target.name, error = %e, "render failed");
                            all_ok = false;
                        }
                    },
                }
            }
            Err(e) => {
                tracing::error!(
                    server = %target.name,
                    address = %target.address,
                    code = e.code().as_str(),
                    error = %e,
                    "query failed"
                );
                all_ok = false;
            }
        }
    }

    Ok(all_ok)
}
