use std::net::SocketAddr;

use anyhow::Context as _;
use clap::Parser;

pub const DEFAULT_ADDR: &str = "127.0.0.1:9000";
pub const ADDR_ENV: &str = "BOOKSHELF_ADDR";

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct AppArgs {
    /// Listen address [default: 127.0.0.1:9000, or $BOOKSHELF_ADDR].
    #[arg(long)]
    pub addr: Option<SocketAddr>,

    /// Allowed CORS origin (repeatable). Any origin is allowed when omitted.
    #[arg(long = "cors-origin")]
    pub cors_origins: Vec<String>,
}

impl AppArgs {
    /// `--addr` wins, then `BOOKSHELF_ADDR`, then the built-in default.
    pub fn resolve_addr(&self) -> anyhow::Result<SocketAddr> {
        if let Some(addr) = self.addr {
            return Ok(addr);
        }
        let raw = std::env::var(ADDR_ENV)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        match raw {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("invalid {ADDR_ENV}={raw:?}")),
            None => DEFAULT_ADDR.parse().context("parse default addr"),
        }
    }
}
