//! Request command - send a raw call through the transport.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use folio_transport::{Body, Method, Payload, QueryValue, UrlParams};
use serde_json::Value;
use tracing::debug;

use crate::context::AppContext;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// HTTP verb accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Verb {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl From<Verb> for Method {
    fn from(verb: Verb) -> Self {
        match verb {
            Verb::Get => Method::Get,
            Verb::Post => Method::Post,
            Verb::Put => Method::Put,
            Verb::Delete => Method::Delete,
        }
    }
}

/// Arguments for the request command.
#[derive(Args)]
pub struct RequestArgs {
    /// HTTP method.
    #[arg(value_enum, ignore_case = true)]
    pub method: Verb,

    /// Path below `<origin>/api`, or below the origin with --direct.
    pub path: String,

    /// Query parameter as key=value. Repeat a key to send a list.
    #[arg(long = "param", short = 'p')]
    pub params: Vec<String>,

    /// JSON request body (POST and PUT).
    #[arg(long, short = 'd')]
    pub data: Option<String>,

    /// Skip the `/api` prefix (GET only). Absolute URLs are used as-is.
    #[arg(long)]
    pub direct: bool,

    /// Write the response body to a file instead of stdout.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Runs the request command.
pub async fn run(args: &RequestArgs, ctx: &AppContext, cli: &Cli) -> Result<()> {
    let http = ctx.http()?;
    let params = parse_params(&args.params)?;
    let params = (!params.is_empty()).then_some(&params);
    let body = args.data.as_deref().map(parse_body).transpose()?;

    if args.direct && args.method != Verb::Get {
        bail!("--direct only applies to GET requests");
    }
    if body.is_some() && matches!(args.method, Verb::Get | Verb::Delete) {
        bail!("--data is only sent with POST and PUT");
    }

    let method = Method::from(args.method);
    debug!(%method, path = %args.path, "Sending request");

    let payload = match args.method {
        Verb::Get if args.direct => http.get_direct(&args.path, params, None).await?,
        Verb::Get => http.get(&args.path, params, None).await?,
        Verb::Post => http.post(&args.path, body, params, None).await?,
        Verb::Put => {
            if params.is_some() {
                bail!("PUT does not take query parameters");
            }
            http.put(&args.path, body, None).await?
        }
        Verb::Delete => http.delete(&args.path, params, None).await?,
    };

    if let Some(path) = &args.output {
        let kind = payload.kind();
        let bytes = payload.into_bytes().await?;
        tokio::fs::write(path, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        if !cli.quiet {
            eprintln!("Wrote {} bytes ({kind}) to {}", bytes.len(), path.display());
        }
        return Ok(());
    }

    print_payload(payload, cli)
}

fn print_payload(payload: Payload, cli: &Cli) -> Result<()> {
    let formatter = TextFormatter::new(!cli.no_color);
    match (payload, cli.format) {
        (Payload::Empty, OutputFormat::Text) => {
            if !cli.quiet {
                println!("{}", formatter.dim("(no content)"));
            }
        }
        (Payload::Empty, OutputFormat::Json) => println!("null"),
        (Payload::Json(value), OutputFormat::Text) => {
            println!("{}", JsonFormatter::new(true).format(&value)?);
        }
        (Payload::Json(value), OutputFormat::Json) => {
            println!("{}", JsonFormatter::new(cli.pretty).format(&value)?);
        }
        (Payload::Text(text), OutputFormat::Text) => println!("{text}"),
        (Payload::Text(text), OutputFormat::Json) => {
            println!("{}", JsonFormatter::new(cli.pretty).format(&text)?);
        }
        (Payload::Binary(response), _) => {
            let size = response
                .content_length()
                .map_or_else(|| "unknown size".to_string(), |n| format!("{n} bytes"));
            bail!("Binary response ({size}); use --output to save it");
        }
    }
    Ok(())
}

/// Parses `key=value` pairs. Repeated keys become lists in first-seen order.
pub fn parse_params(raw: &[String]) -> Result<UrlParams> {
    let mut grouped: Vec<(String, Vec<String>)> = Vec::new();

    for pair in raw {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("Invalid parameter '{pair}', expected key=value");
        };
        if key.is_empty() {
            bail!("Invalid parameter '{pair}', key is empty");
        }
        match grouped.iter_mut().find(|(k, _)| k == key) {
            Some((_, values)) => values.push(value.to_string()),
            None => grouped.push((key.to_string(), vec![value.to_string()])),
        }
    }

    Ok(grouped
        .into_iter()
        .map(|(key, mut values)| {
            let value = if values.len() == 1 {
                QueryValue::Str(values.remove(0))
            } else {
                QueryValue::List(values)
            };
            (key, value)
        })
        .collect())
}

/// Parses a request body; it must be valid JSON.
pub fn parse_body(raw: &str) -> Result<Body> {
    let value: Value = serde_json::from_str(raw).context("--data is not valid JSON")?;
    Ok(Body::Json(value))
}
