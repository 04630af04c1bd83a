//! ai-explain — ask a configured provider to explain a diagnostic message.
//!
//! Usage:
//!   ai-explain [OPTIONS] <prompt>...

use ai_explain::cache::FileCache;
use ai_explain::config::{AiConfiguration, ProviderConfig};
use ai_explain::{new_client, AiProvider, RequestContext, PROVIDER_NAMES};
use anyhow::{anyhow, bail, Context};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    provider: Option<String>,
    language: String,
    template: String,
    no_cache: bool,
    cache_dir: Option<PathBuf>,
    timeout_secs: Option<u64>,
    prompt: Vec<String>,
}

fn print_usage() {
    println!(
        r#"ai-explain — cached explanations for diagnostic messages

USAGE:
    ai-explain [OPTIONS] <PROMPT>...

OPTIONS:
    --config <FILE>        YAML provider configuration
    --provider <NAME>      Provider to use ({})
    --language <LANG>      Output language (default: english)
    --template <NAME>      Named prompt template (default: default)
    --no-cache             Skip cache lookups (answers are still stored)
    --cache-dir <DIR>      Cache directory (default: user cache dir)
    --timeout <SECS>       Abandon the request after SECS seconds
    -h, --help             Show this help message

ENVIRONMENT:
    AI_EXPLAIN_PASSWORD    Overrides the provider password
    AI_EXPLAIN_BASE_URL    Overrides the provider base URL
    AI_EXPLAIN_MODEL       Overrides the provider model
    RUST_LOG               Log filter (default: warn)"#,
        PROVIDER_NAMES.join(", ")
    );
}

fn parse_args(raw: &[String]) -> anyhow::Result<Option<Args>> {
    let mut args = Args {
        language: "english".to_string(),
        ..Args::default()
    };
    let mut it = raw.iter();
    while let Some(arg) = it.next() {
        let mut value = |flag: &str| {
            it.next()
                .cloned()
                .ok_or_else(|| anyhow!("{flag} requires a value"))
        };
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "--config" => args.config = Some(PathBuf::from(value("--config")?)),
            "--provider" => args.provider = Some(value("--provider")?),
            "--language" => args.language = value("--language")?,
            "--template" => args.template = value("--template")?,
            "--no-cache" => args.no_cache = true,
            "--cache-dir" => args.cache_dir = Some(PathBuf::from(value("--cache-dir")?)),
            "--timeout" => {
                let v = value("--timeout")?;
                args.timeout_secs = Some(v.parse().with_context(|| format!("invalid --timeout {v}"))?);
            }
            other if other.starts_with("--") => bail!("unknown option: {other}"),
            other => args.prompt.push(other.to_string()),
        }
    }
    if args.prompt.is_empty() {
        bail!("missing prompt");
    }
    Ok(Some(args))
}

fn provider_config(args: &Args) -> anyhow::Result<ProviderConfig> {
    let config = match &args.config {
        Some(path) => AiConfiguration::from_file(path)?.resolve(args.provider.as_deref())?,
        None => ProviderConfig::new(args.provider.as_deref().unwrap_or("fastgpt")),
    };
    Ok(config.with_env_overrides())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let raw: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&raw) {
        Ok(Some(args)) => args,
        Ok(None) => {
            print_usage();
            return Ok(());
        }
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!();
            print_usage();
            std::process::exit(2);
        }
    };

    let config = provider_config(&args)?;
    let mut client = new_client(&config.name)
        .ok_or_else(|| anyhow!("unknown provider {} (known: {})", config.name, PROVIDER_NAMES.join(", ")))?;
    client.configure(&config, &args.language)?;

    let cache_dir = args
        .cache_dir
        .clone()
        .or_else(FileCache::default_dir)
        .context("no cache directory available; pass --cache-dir")?;
    let cache = FileCache::new(cache_dir).with_no_cache(args.no_cache);

    let mut ctx = RequestContext::new();
    if let Some(secs) = args.timeout_secs {
        ctx = ctx.with_timeout(Duration::from_secs(secs));
    }
    let shutdown = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.cancel();
        }
    });

    let template = if args.template.is_empty() {
        String::new()
    } else {
        ai_explain::prompt::template_for(&args.template).to_string()
    };

    let answer = client.parse(&ctx, &args.prompt, &cache, &template).await?;
    println!("{answer}");
    Ok(())
}
