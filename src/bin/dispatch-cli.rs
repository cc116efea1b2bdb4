use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use serde_json::{json, Value};

use req_dispatch::config::{load_config, DispatchConfig};
use req_dispatch::observability::logging;
use req_dispatch::transport::LocalTransport;
use req_dispatch::{CallOptions, Dispatcher, JsonMode, Verb};

#[derive(Parser)]
#[command(name = "dispatch-cli")]
#[command(about = "Issue a single call through the request dispatcher", long_about = None)]
struct Cli {
    /// HTTP method (GET, POST, PUT, PATCH, DELETE)
    method: Verb,

    /// Absolute URL to call
    target: String,

    /// Query parameter, repeatable (key=value)
    #[arg(short, long = "query", value_parser = parse_pair)]
    query: Vec<(String, String)>,

    /// Request header, repeatable (name=value)
    #[arg(short = 'H', long = "header", value_parser = parse_pair)]
    headers: Vec<(String, String)>,

    /// JSON request body
    #[arg(short, long)]
    data: Option<String>,

    /// Timeout in milliseconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Retries on 5xx or connection failure
    #[arg(short, long)]
    retries: Option<u32>,

    /// Print the body without decoding it
    #[arg(long)]
    raw: bool,

    /// Log every call
    #[arg(short, long)]
    verbose: bool,

    /// Plugin-wide options file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{s}'"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => DispatchConfig::default(),
    };
    logging::init_logging(if cli.verbose { "info" } else { "warn" });

    let dispatcher = Dispatcher::new(config.dispatch, LocalTransport::deferred());

    let mut options = CallOptions::new().verbose(cli.verbose);
    for (key, value) in cli.query {
        options = options.query(key, value);
    }
    for (name, value) in cli.headers {
        options = options.header(name, value);
    }
    if let Some(data) = cli.data {
        let value: Value = serde_json::from_str(&data)?;
        options = options.json_payload(value);
    }
    if let Some(ms) = cli.timeout {
        options = options.timeout(Duration::from_millis(ms));
    }
    if let Some(retries) = cli.retries {
        options = options.max_retries(retries);
    }
    if cli.raw {
        options = options.json(JsonMode::Off);
    }

    match dispatcher.call(None, cli.method, &cli.target, options).await {
        Ok(reply) => match reply.into_payload() {
            Value::String(text) => println!("{}", text),
            value => println!("{}", serde_json::to_string_pretty(&value)?),
        },
        Err(err) => {
            let body = json!({
                "statusCode": err.status_code(),
                "message": err.message(),
                "data": err.data(),
            });
            eprintln!("{}", serde_json::to_string_pretty(&body)?);
            std::process::exit(1);
        }
    }

    Ok(())
}
