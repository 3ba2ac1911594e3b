//! resource-dispatch CLI
//!
//! Sends one request through the dispatcher to an HTTP backend.
//!
//! ```text
//! resource-dispatch --base-url http://localhost:9000 \
//!     --param ids='[1,2]' --parent-function onMessage \
//!     get orders 42
//!
//!   → RequestTarget  /orders/42?ids=1,2
//!   → Dispatcher     context captured (MAIN_STRAND=true)
//!   → ReqwestClient  GET http://localhost:9000/orders/42?ids=1,2
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use resource_dispatch::config::loader::{load_config, ConfigError};
use resource_dispatch::config::validation::validate_config;
use resource_dispatch::config::DispatchConfig;
use resource_dispatch::context::{CallerContext, MainStrandDetector, PropagationKey};
use resource_dispatch::dispatch::Dispatcher;
use resource_dispatch::observability::logging::init_logging;
use resource_dispatch::path::ResourcePath;
use resource_dispatch::transport::{ClientResponse, Payload, ReqwestClient, TargetType};

#[derive(Parser)]
#[command(name = "resource-dispatch")]
#[command(about = "Dispatch a resource request through the HTTP client facade", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override client.base_url
    #[arg(long)]
    base_url: Option<String>,

    /// Name of the calling task
    #[arg(long)]
    caller: Option<String>,

    /// Name of the function that started the calling task
    #[arg(long)]
    parent_function: Option<String>,

    /// Propagated remote address
    #[arg(long)]
    remote_address: Option<String>,

    /// Propagated origin host
    #[arg(long)]
    origin_host: Option<String>,

    /// Request header, `name:value`
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Query parameter, `key=value` (JSON values allowed)
    #[arg(short, long = "param")]
    params: Vec<String>,

    /// How to decode the response body
    #[arg(short, long, value_enum, default_value_t = TargetArg::Json)]
    target: TargetArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Get(ReadArgs),
    Head(ReadArgs),
    Options(ReadArgs),
    Post(WriteArgs),
    Put(WriteArgs),
    Patch(WriteArgs),
    Delete(WriteArgs),
}

#[derive(Args)]
struct ReadArgs {
    /// Path segments
    segments: Vec<String>,
}

#[derive(Args)]
struct WriteArgs {
    /// Path segments
    segments: Vec<String>,

    /// Request body; sent as JSON when it parses as JSON
    #[arg(short, long)]
    data: Option<String>,

    /// Content type of the body
    #[arg(long)]
    media_type: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum TargetArg {
    Text,
    Json,
    Bytes,
}

impl From<TargetArg> for TargetType {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::Text => TargetType::Text,
            TargetArg::Json => TargetType::Json,
            TargetArg::Bytes => TargetType::Bytes,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => DispatchConfig::default(),
    };
    if let Some(base_url) = &cli.base_url {
        config.client.base_url = base_url.clone();
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    init_logging(&config.observability);

    tracing::info!(
        path = ?cli.config,
        base_url = %config.client.base_url,
        main_strand_rule = ?config.main_strand.rule,
        entry_point = %config.main_strand.entry_point,
        metrics_enabled = config.observability.metrics_enabled,
        "Configuration loaded"
    );

    let client = Arc::new(ReqwestClient::from_config(&config.client)?);
    let dispatcher = Dispatcher::with_detector(client, MainStrandDetector::from(&config.main_strand))
        .with_metrics(config.observability.metrics_enabled);

    let caller = build_caller(&cli);
    let headers = parse_headers(&cli.headers)?;
    let target_type = TargetType::from(cli.target);

    let result = match &cli.command {
        Commands::Get(args) => {
            let resource = build_resource(&args.segments, &cli.params)?;
            dispatcher.get_resource(&caller, &resource, headers, target_type).await
        }
        Commands::Head(args) => {
            let resource = build_resource(&args.segments, &cli.params)?;
            dispatcher.head_resource(&caller, &resource, headers).await
        }
        Commands::Options(args) => {
            let resource = build_resource(&args.segments, &cli.params)?;
            dispatcher.options_resource(&caller, &resource, headers, target_type).await
        }
        Commands::Post(args) => {
            let (resource, body) = write_parts(args, &cli.params)?;
            dispatcher
                .post_resource(&caller, &resource, body, headers, args.media_type.clone(), target_type)
                .await
        }
        Commands::Put(args) => {
            let (resource, body) = write_parts(args, &cli.params)?;
            dispatcher
                .put_resource(&caller, &resource, body, headers, args.media_type.clone(), target_type)
                .await
        }
        Commands::Patch(args) => {
            let (resource, body) = write_parts(args, &cli.params)?;
            dispatcher
                .patch_resource(&caller, &resource, body, headers, args.media_type.clone(), target_type)
                .await
        }
        Commands::Delete(args) => {
            let (resource, body) = write_parts(args, &cli.params)?;
            dispatcher
                .delete_resource(&caller, &resource, body, headers, args.media_type.clone(), target_type)
                .await
        }
    };

    let response = result??;
    print_response(&response)?;
    Ok(())
}

fn build_caller(cli: &Cli) -> CallerContext {
    let mut caller = CallerContext::new();
    if let Some(name) = &cli.caller {
        caller = caller.with_name(name.clone());
    }
    if let Some(name) = &cli.parent_function {
        caller = caller.with_parent_function(name.clone());
    }
    if let Some(addr) = &cli.remote_address {
        caller = caller.with_local(PropagationKey::RemoteAddress, addr.clone());
    }
    if let Some(host) = &cli.origin_host {
        caller = caller.with_local(PropagationKey::OriginHost, host.clone());
    }
    caller
}

fn parse_headers(raw: &[String]) -> Result<HeaderMap, Box<dyn std::error::Error>> {
    let mut headers = HeaderMap::new();
    for entry in raw {
        let (name, value) = entry
            .split_once(':')
            .ok_or_else(|| format!("invalid header '{}', expected name:value", entry))?;
        headers.append(
            HeaderName::from_bytes(name.trim().as_bytes())?,
            HeaderValue::from_str(value.trim())?,
        );
    }
    Ok(headers)
}

fn build_resource(segments: &[String], params: &[String]) -> Result<ResourcePath, String> {
    let mut resource = ResourcePath::new(segments.iter());
    for entry in params {
        let (key, value) = entry
            .split_once('=')
            .ok_or_else(|| format!("invalid parameter '{}', expected key=value", entry))?;
        let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
        resource = resource.param(key, value);
    }
    Ok(resource)
}

fn write_parts(args: &WriteArgs, params: &[String]) -> Result<(ResourcePath, Payload), String> {
    let resource = build_resource(&args.segments, params)?;
    let body = match &args.data {
        None => Payload::Empty,
        Some(data) => match serde_json::from_str(data) {
            Ok(json) => Payload::Json(json),
            Err(_) => Payload::Text(data.clone()),
        },
    };
    Ok((resource, body))
}

fn print_response(response: &ClientResponse) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("HTTP {}", response.status);
    match &response.body {
        Payload::Empty => {}
        Payload::Text(text) => println!("{}", text),
        Payload::Json(json) => println!("{}", serde_json::to_string_pretty(json)?),
        Payload::Bytes(bytes) => println!("<{} bytes>", bytes.len()),
    }
    Ok(())
}
