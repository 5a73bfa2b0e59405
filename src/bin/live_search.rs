//! 终端版搜索框
//!
//! 标准输入的每一行视为输入框当前的完整内容，状态每次变化都重新渲染。
//!
//! ```text
//! printf 'w\nwi\nwid\nwidget\n' | live-search --base-url http://127.0.0.1:3000
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use live_search::client::{view::HEADING, HttpBackend, LiveSearch, SearchOptions};
use live_search::infrastructure::{config::load_config, logger::Logger};

#[derive(Debug, Parser)]
#[command(name = "live-search", about = "Interactive product search in the terminal")]
struct Args {
    /// 配置文件路径
    #[arg(long, env = "LIVE_SEARCH_CONFIG")]
    config: Option<PathBuf>,

    /// 覆盖 client.base_url
    #[arg(long)]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    Logger::init(&config.logging.level);

    let base_url = args
        .base_url
        .unwrap_or_else(|| config.client.base_url.clone());
    let options = SearchOptions::from(&config.client);

    let mut search = LiveSearch::spawn(HttpBackend::new(&base_url), options);
    let mut updates = search.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}\n", HEADING);
    print!("{}", search.view());

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(value) => search.input(value),
                None => break,
            },
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                updates.borrow_and_update();
                println!("---");
                print!("{}", search.view());
            }
        }
    }

    // 输入结束后等最后一次输入生效、请求完成
    tokio::time::sleep(options.debounce + Duration::from_millis(50)).await;
    search.wait_for(|state| !state.is_loading()).await;
    println!("---");
    print!("{}", search.view());

    Ok(())
}
