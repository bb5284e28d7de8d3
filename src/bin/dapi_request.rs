//! dapi-request: 通过限流感知客户端发送单个 REST 请求的命令行工具
//!
//! Usage:
//!   dapi-request <METHOD> <PATH> [name=value ...] [--json <body>] [--query k=v] [--reason <text>] [--config <file>]
//!
//! Path placeholders are filled from the `name=value` arguments. The bot token
//! is read from `DAPI_TOKEN`; `DAPI_*` variables override the configuration.

use anyhow::{anyhow, bail, Context};
use dapi_rest::builders::ParamsBuilder;
use dapi_rest::{ClientConfig, RequestPayload, RestClient, Route};
use reqwest::Method;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Args {
    method: String,
    path: String,
    params: Vec<(String, String)>,
    json: Option<String>,
    query: Vec<(String, String)>,
    reason: Option<String>,
    config: Option<String>,
}

fn print_usage() {
    println!(
        r#"dapi-request: send one request through the rate-limit aware client

USAGE:
    dapi-request <METHOD> <PATH> [name=value ...] [OPTIONS]

OPTIONS:
    --json <body>       JSON request body
    --query <k=v>       Query parameter (repeatable)
    --reason <text>     X-Audit-Log-Reason header
    --config <file>     YAML client configuration

ENVIRONMENT:
    DAPI_TOKEN          Bot token (required)
    DAPI_BASE_URL       API base URL override
    RUST_LOG            Log filter, e.g. dapi_rest=debug"#
    );
}

fn split_pair(raw: &str) -> anyhow::Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected name=value, got `{raw}`"))?;
    Ok((key.to_string(), value.to_string()))
}

fn parse_args(raw: &[String]) -> anyhow::Result<Args> {
    let mut args = Args::default();
    let mut positional = Vec::new();
    let mut iter = raw.iter();

    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| anyhow!("{flag} requires a value"))
        };
        match arg.as_str() {
            "--json" => args.json = Some(value("--json")?),
            "--query" => args.query.push(split_pair(&value("--query")?)?),
            "--reason" => args.reason = Some(value("--reason")?),
            "--config" => args.config = Some(value("--config")?),
            flag if flag.starts_with("--") => bail!("unknown option: {flag}"),
            _ => positional.push(arg.clone()),
        }
    }

    let mut positional = positional.into_iter();
    args.method = positional.next().context("missing METHOD")?;
    args.path = positional.next().context("missing PATH")?;
    for pair in positional {
        args.params.push(split_pair(&pair)?);
    }
    Ok(args)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let raw: Vec<String> = std::env::args().skip(1).collect();
    if raw.is_empty() || raw.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }
    let args = parse_args(&raw)?;

    let config = match &args.config {
        Some(path) => ClientConfig::from_yaml_file(path)?.with_env_overrides()?,
        None => ClientConfig::from_env()?,
    };
    let token = std::env::var("DAPI_TOKEN").context("DAPI_TOKEN is not set")?;
    let client = RestClient::builder().token(token).config(config).build()?;

    let method = Method::from_bytes(args.method.to_ascii_uppercase().as_bytes())
        .with_context(|| format!("invalid METHOD `{}`", args.method))?;
    let mut route = Route::new(method, args.path);
    for (name, value) in &args.params {
        route = route.param(name.as_str(), value);
    }

    let mut payload = RequestPayload::new();
    if let Some(body) = &args.json {
        let json = serde_json::from_str(body).context("--json is not valid JSON")?;
        payload = payload.json_value(json);
    }
    if !args.query.is_empty() {
        let params = args
            .query
            .iter()
            .fold(ParamsBuilder::new(), |params, (k, v)| params.add(k, v));
        payload = payload.params(&params);
    }
    if let Some(reason) = args.reason {
        payload = payload.reason(reason);
    }

    match client.request(&route, &payload).await {
        Ok(response) => {
            println!("{}", response.status());
            println!("{}", response.body());
            Ok(())
        }
        Err(err) => match err.http_exception() {
            Some(exception) => {
                eprintln!("{exception}");
                std::process::exit(1);
            }
            None => Err(err.into()),
        },
    }
}
