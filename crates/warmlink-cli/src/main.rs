//! warmlink - Command line entry point
//!
//! Prefetches every URL given on the command line through the best
//! available transport and reports which ones failed.

use anyhow::{bail, Context, Result};
use std::rc::Rc;
use tracing_subscriber::EnvFilter;
use warmlink::dom::{Document, DomFeatures};
use warmlink::net::BlockingBackend;
use warmlink::{Host, LinkLoader, PrefetchConfig, PrefetchOptions, Supported};

const USAGE: &str = "usage: warmlink [--base URL] [--no-fetch] [--no-link-prefetch] \
[--crossorigin] [--cors] [--credentials] [--high-priority] URL...";

#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    base: Option<String>,
    no_fetch: bool,
    no_link_prefetch: bool,
    options: PrefetchOptions,
    urls: Vec<String>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut parsed = Args::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--base" => parsed.base = Some(args.next().context("--base needs a URL")?),
            "--no-fetch" => parsed.no_fetch = true,
            "--no-link-prefetch" => parsed.no_link_prefetch = true,
            "--crossorigin" => parsed.options.crossorigin = true,
            "--cors" => parsed.options.cors_mode = true,
            "--credentials" => parsed.options.credentials = true,
            "--high-priority" => parsed.options.priority = true,
            "-h" | "--help" => bail!(USAGE),
            flag if flag.starts_with("--") => bail!("unknown flag {flag}\n{USAGE}"),
            _ => parsed.urls.push(arg),
        }
    }

    if parsed.urls.is_empty() {
        bail!(USAGE);
    }
    Ok(parsed)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    let config = PrefetchConfig::default();

    let backend = BlockingBackend::new(&config.user_agent, config.request_timeout)
        .context("building HTTP client")?;
    let backend = Rc::new(backend);
    let features = if args.no_link_prefetch {
        DomFeatures::legacy()
    } else {
        DomFeatures::default()
    };
    let base = args.base.as_deref().unwrap_or("about:blank");
    let document = Rc::new(Document::with_features(base, features));

    let mut builder = Host::builder(document, backend.clone()).config(config);
    if !args.no_fetch {
        builder = builder.fetch(backend);
    }
    let host = builder.build();
    LinkLoader::install(&host);

    let supported = Supported::detect(&host);
    let pending: Vec<_> = args
        .urls
        .iter()
        .map(|url| (url, supported.prefetch(&host, url, &args.options)))
        .collect();

    let mut failed = 0;
    for (url, prefetch) in pending {
        match host.block_on(prefetch) {
            Ok(()) => tracing::info!(%url, "warmed"),
            Err(e) => {
                tracing::warn!(%url, error = %e, "prefetch failed");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} prefetches failed", args.urls.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_flags_and_urls() {
        let parsed = args(&[
            "--base",
            "https://example.com/",
            "--cors",
            "--high-priority",
            "/a",
            "/b",
        ])
        .unwrap();
        assert_eq!(parsed.base.as_deref(), Some("https://example.com/"));
        assert!(parsed.options.cors_mode);
        assert!(parsed.options.priority);
        assert!(!parsed.options.credentials);
        assert_eq!(parsed.urls, vec!["/a", "/b"]);
    }

    #[test]
    fn test_parse_requires_url() {
        assert!(args(&["--no-fetch"]).is_err());
    }

    #[test]
    fn test_parse_unknown_flag() {
        assert!(args(&["--bogus", "https://example.com/"]).is_err());
    }

    #[test]
    fn test_parse_base_needs_value() {
        assert!(args(&["--base"]).is_err());
    }
}
