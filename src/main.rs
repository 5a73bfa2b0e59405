//! 搜索服务入口

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};

use live_search::app;
use live_search::infrastructure::{
    config::load_config,
    database::{init_database, PgProductStore},
    logger::Logger,
};

#[derive(Debug, Parser)]
#[command(name = "live-search-server", about = "Product search HTTP endpoint")]
struct Args {
    /// 配置文件路径
    #[arg(long, env = "LIVE_SEARCH_CONFIG")]
    config: Option<PathBuf>,

    /// 启动前建表并写入示例数据
    #[arg(long)]
    init_db: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    Logger::init(&config.logging.level);

    info!("Starting search server...");

    if args.init_db {
        init_database(&config.database.url).await.map_err(|e| {
            error!("Failed to initialize database: {}", e);
            e
        })?;
    }

    let store = PgProductStore::from_config(&config.database).await?;
    info!("Database connection mode: {:?}", config.database.mode);

    let app = app::router(Arc::new(store));

    let listener = TcpListener::bind(config.server.address()).await?;
    let addr = listener.local_addr()?;

    info!("🚀 Search server running on http://{}", addr);
    info!("   GET /api/search?query=<text>  - Search products by name");
    info!("   GET /health                   - Health check");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
