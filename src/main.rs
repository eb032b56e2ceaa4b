use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser as _;

use bookshelf::app::book_store::InMemoryBookStore;
use bookshelf::app::routes::{AppState, cors_layer, router};
use bookshelf::cli::AppArgs;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    bookshelf::logging::init().context("init logging")?;

    let args = AppArgs::parse();
    tracing::debug!(?args, "parsed cli");

    let addr = args.resolve_addr()?;
    let cors = cors_layer(&args.cors_origins).context("build cors layer")?;

    let state = AppState::new(Arc::new(InMemoryBookStore::new()));
    let app = router(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| anyhow::anyhow!("bind {addr}: {err}"))?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app).await.context("serve")?;
    Ok(())
}
