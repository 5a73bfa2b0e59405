//! 数据库基础设施

use async_trait::async_trait;
use sqlx::{
    postgres::{PgConnectOptions, PgConnection, PgPool, PgPoolOptions},
    Connection, Error, PgExecutor,
};
use tracing::{debug, info, warn};

use super::config::{ConnectionMode, DatabaseConfig};
use crate::app::search::model::Product;

const SEARCH_SQL: &str = "SELECT * FROM products WHERE name LIKE $1 LIMIT $2";

const SCHEMA_SQL: &str = include_str!("../../migrations/0001_products.sql");

/// 商品读取接口，屏蔽连接的获取方式
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// 按 `LIKE` 模式匹配商品名，最多返回 `limit` 行，不保证顺序
    async fn search_by_name(&self, pattern: &str, limit: i64) -> Result<Vec<Product>, Error>;
}

/// PostgreSQL 实现
pub enum PgProductStore {
    /// 每次查询单独建立连接，查询结束后关闭
    PerRequest { options: PgConnectOptions },
    Pooled(PgPool),
}

impl PgProductStore {
    pub async fn from_config(config: &DatabaseConfig) -> Result<Self, Error> {
        match config.mode {
            // 只解析地址，不建立连接
            ConnectionMode::PerRequest => Ok(Self::PerRequest {
                options: config.url.parse()?,
            }),
            ConnectionMode::Pooled => {
                let pool = PgPoolOptions::new()
                    .max_connections(config.max_connections)
                    .connect(&config.url)
                    .await?;
                Ok(Self::Pooled(pool))
            }
        }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn search_by_name(&self, pattern: &str, limit: i64) -> Result<Vec<Product>, Error> {
        match self {
            PgProductStore::PerRequest { options } => {
                let mut conn = PgConnection::connect_with(options).await?;
                let rows = fetch_matching(&mut conn, pattern, limit).await;

                // 查询失败也要关闭连接
                if let Err(e) = conn.close().await {
                    warn!("Failed to close database connection: {}", e);
                }
                rows
            }
            PgProductStore::Pooled(pool) => fetch_matching(pool, pattern, limit).await,
        }
    }
}

async fn fetch_matching<'e, E>(executor: E, pattern: &str, limit: i64) -> Result<Vec<Product>, Error>
where
    E: PgExecutor<'e>,
{
    debug!("Searching products with pattern {:?}", pattern);
    sqlx::query_as::<_, Product>(SEARCH_SQL)
        .bind(pattern)
        .bind(limit)
        .fetch_all(executor)
        .await
}

/// 建表并在空表时写入示例数据
pub async fn init_database(url: &str) -> Result<(), Error> {
    info!("Initializing products table...");
    let mut conn = PgConnection::connect(url).await?;

    sqlx::query(SCHEMA_SQL).execute(&mut conn).await?;
    seed_products(&mut conn).await?;

    conn.close().await?;
    info!("Database initialized");
    Ok(())
}

async fn seed_products(conn: &mut PgConnection) -> Result<(), Error> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
        .fetch_one(&mut *conn)
        .await?;

    if count.0 > 0 {
        info!("Products table already contains data, skipping seed");
        return Ok(());
    }

    let products = [
        ("Blue Widget", "A small blue widget for everyday tinkering"),
        ("Red Widget", "The same widget, painted red"),
        ("Widget Pro Max", "Industrial widget with a reinforced frame"),
        ("Gadget Stand", "Adjustable stand for gadgets and tablets"),
        ("Desk Lamp", "LED desk lamp with three brightness levels"),
        ("Lamp Shade", "Linen shade that fits most desk lamps"),
        ("USB Cable", "One metre braided USB-C cable"),
        ("Cable Organizer", "Silicone clips that keep cables tidy"),
        ("Coffee Mug", "Ceramic mug, 350 ml"),
        ("Travel Mug", "Insulated stainless steel travel mug"),
        ("Notebook", "A5 dotted notebook, 120 pages"),
        ("Pocket Notebook", "A6 notebook that fits in a jacket pocket"),
    ];

    for (name, description) in products {
        sqlx::query("INSERT INTO products (name, description) VALUES ($1, $2)")
            .bind(name)
            .bind(description)
            .execute(&mut *conn)
            .await?;
    }

    info!("Seeded {} products", products.len());
    Ok(())
}
