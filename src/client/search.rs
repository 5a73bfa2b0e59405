//! 实时搜索状态机
//!
//! 驱动任务监听防抖后的稳定查询：长度不足时不发请求；命中缓存直接给出结果；
//! 否则进入加载状态并在后台发请求。每次查询变化都会递增代数并取消仍在进行
//! 的请求，返回时代数不是最新的响应直接丢弃，慢请求不会覆盖较新的结果。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, warn};

use super::backend::SearchBackend;
use super::debouncer::{Debouncer, DEFAULT_DELAY};
use super::view::SearchView;
use super::ClientError;
use crate::app::search::model::Product;
use crate::infrastructure::config::ClientConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub debounce: Duration,
    pub min_query_len: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DELAY,
            min_query_len: 3,
        }
    }
}

impl From<&ClientConfig> for SearchOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            debounce: config.debounce(),
            min_query_len: config.min_query_len,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStatus {
    /// 查询过短，没有请求
    Idle,
    Loading,
    Ready(Vec<Product>),
    /// 请求失败，渲染时等同于空结果
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchState {
    pub stable_query: String,
    pub status: SearchStatus,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            stable_query: String::new(),
            status: SearchStatus::Idle,
        }
    }
}

impl SearchState {
    pub fn is_loading(&self) -> bool {
        self.status == SearchStatus::Loading
    }

    pub fn results(&self) -> &[Product] {
        match &self.status {
            SearchStatus::Ready(products) => products,
            _ => &[],
        }
    }
}

/// 一个搜索框的完整客户端状态
///
/// drop 时取消防抖定时器、停止驱动任务并取消进行中的请求。
pub struct LiveSearch {
    debouncer: Debouncer,
    state: watch::Receiver<SearchState>,
    options: SearchOptions,
    driver: JoinHandle<()>,
}

impl LiveSearch {
    /// 启动驱动任务，必须在 tokio 运行时内调用
    pub fn spawn<B>(backend: B, options: SearchOptions) -> Self
    where
        B: SearchBackend + 'static,
    {
        let debouncer = Debouncer::new(options.debounce);
        let (state_tx, state_rx) = watch::channel(SearchState::default());

        let driver = Driver {
            backend: Arc::new(backend),
            min_query_len: options.min_query_len,
            cache: HashMap::new(),
            generation: 0,
            in_flight: JoinSet::new(),
            state: state_tx,
        };
        let driver = tokio::spawn(driver.run(debouncer.subscribe()));

        Self {
            debouncer,
            state: state_rx,
            options,
            driver,
        }
    }

    /// 输入框的新值
    pub fn input(&mut self, value: impl Into<String>) {
        self.debouncer.input(value);
    }

    pub fn raw_query(&self) -> &str {
        self.debouncer.raw()
    }

    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.clone()
    }

    pub fn view(&self) -> SearchView {
        SearchView::render(
            self.debouncer.raw(),
            &self.state.borrow(),
            self.options.min_query_len,
        )
    }

    /// 等待状态满足条件，驱动任务退出时返回 `None`
    pub async fn wait_for<F>(&mut self, mut predicate: F) -> Option<SearchState>
    where
        F: FnMut(&SearchState) -> bool,
    {
        self.state
            .wait_for(|state| predicate(state))
            .await
            .ok()
            .map(|state| state.clone())
    }
}

impl Drop for LiveSearch {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

struct Completion {
    generation: u64,
    query: String,
    result: Result<Vec<Product>, ClientError>,
}

struct Driver<B> {
    backend: Arc<B>,
    min_query_len: usize,
    /// 按查询字符串缓存成功结果
    cache: HashMap<String, Vec<Product>>,
    generation: u64,
    /// 驱动任务被取消时随之 drop，其中的请求全部中止
    in_flight: JoinSet<Completion>,
    state: watch::Sender<SearchState>,
}

impl<B> Driver<B>
where
    B: SearchBackend + 'static,
{
    async fn run(mut self, mut stable: watch::Receiver<String>) {
        loop {
            tokio::select! {
                changed = stable.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let query = stable.borrow_and_update().clone();
                    self.on_query(query);
                }
                Some(joined) = self.in_flight.join_next() => {
                    // 被取消的请求没有结果
                    if let Ok(done) = joined {
                        self.on_completion(done);
                    }
                }
            }
        }
        self.in_flight.abort_all();
    }

    fn on_query(&mut self, query: String) {
        self.generation += 1;
        self.in_flight.abort_all();

        if query.chars().count() < self.min_query_len {
            self.publish(query, SearchStatus::Idle);
            return;
        }

        if let Some(products) = self.cache.get(&query) {
            debug!("Cache hit for {:?}", query);
            let products = products.clone();
            self.publish(query, SearchStatus::Ready(products));
            return;
        }

        self.publish(query.clone(), SearchStatus::Loading);

        let backend = Arc::clone(&self.backend);
        let generation = self.generation;
        self.in_flight.spawn(async move {
            let result = backend.search(&query).await;
            Completion {
                generation,
                query,
                result,
            }
        });
    }

    fn on_completion(&mut self, done: Completion) {
        let status = match done.result {
            Ok(products) => {
                self.cache.insert(done.query.clone(), products.clone());
                SearchStatus::Ready(products)
            }
            Err(e) => {
                warn!("Search for {:?} failed: {}", done.query, e);
                SearchStatus::Failed
            }
        };

        if done.generation != self.generation {
            debug!("Discarding stale response for {:?}", done.query);
            return;
        }

        self.publish(done.query, status);
    }

    fn publish(&self, stable_query: String, status: SearchStatus) {
        self.state.send_replace(SearchState {
            stable_query,
            status,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::view::{ResultsRegion, NO_RESULTS_MESSAGE};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::time::sleep;

    fn product(id: i32) -> Product {
        Product {
            id,
            name: format!("Product {}", id),
            description: format!("Description {}", id),
        }
    }

    /// 按查询返回预设结果，可为单个查询设置延迟或失败
    #[derive(Clone, Default)]
    struct ScriptedBackend {
        calls: Arc<Mutex<Vec<String>>>,
        completed: Arc<Mutex<Vec<String>>>,
        delays: HashMap<String, Duration>,
        failing: bool,
        results: Vec<Product>,
    }

    impl ScriptedBackend {
        fn returning(results: Vec<Product>) -> Self {
            Self {
                results,
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        /// 完整跑完、没有被取消的请求
        fn completed(&self) -> Vec<String> {
            self.completed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SearchBackend for ScriptedBackend {
        async fn search(&self, query: &str) -> Result<Vec<Product>, ClientError> {
            self.calls.lock().unwrap().push(query.to_string());
            let delay = self
                .delays
                .get(query)
                .copied()
                .unwrap_or(Duration::from_millis(50));
            sleep(delay).await;
            self.completed.lock().unwrap().push(query.to_string());

            if self.failing {
                return Err(ClientError::Status(500));
            }
            Ok(self.results.clone())
        }
    }

    async fn type_chars(search: &mut LiveSearch, text: &str, gap: Duration) {
        let mut typed = String::new();
        for c in text.chars() {
            typed.push(c);
            search.input(typed.clone());
            sleep(gap).await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn short_query_never_hits_backend() {
        let backend = ScriptedBackend::returning(vec![product(1)]);
        let mut search = LiveSearch::spawn(backend.clone(), SearchOptions::default());

        type_chars(&mut search, "te", Duration::from_millis(10)).await;
        sleep(Duration::from_millis(500)).await;

        assert!(backend.calls().is_empty());
        let state = search.state();
        assert_eq!(state.stable_query, "te");
        assert_eq!(state.status, SearchStatus::Idle);
        assert_eq!(search.view().results, ResultsRegion::Empty);
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_typing_issues_one_request() {
        let backend = ScriptedBackend::returning(vec![product(1), product(2)]);
        let mut search = LiveSearch::spawn(backend.clone(), SearchOptions::default());

        type_chars(&mut search, "test", Duration::from_millis(20)).await;
        let state = search
            .wait_for(|s| matches!(s.status, SearchStatus::Ready(_)))
            .await
            .unwrap();

        assert_eq!(backend.calls(), vec!["test".to_string()]);
        assert_eq!(state.results().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn loading_state_shows_three_placeholders() {
        let backend = ScriptedBackend::returning(vec![product(1)]);
        let mut search = LiveSearch::spawn(backend, SearchOptions::default());

        search.input("test");
        search.wait_for(SearchState::is_loading).await.unwrap();

        let view = search.view();
        assert_eq!(view.status_count(), 3);
        assert!(view.button.disabled);

        search.wait_for(|s| !s.is_loading()).await.unwrap();
        let view = search.view();
        assert_eq!(view.status_count(), 0);
        assert!(!view.button.disabled);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_response_shows_no_results_message() {
        let backend = ScriptedBackend::returning(Vec::new());
        let mut search = LiveSearch::spawn(backend, SearchOptions::default());

        search.input("test");
        search
            .wait_for(|s| matches!(s.status, SearchStatus::Ready(_)))
            .await
            .unwrap();

        assert_eq!(
            search.view().results,
            ResultsRegion::NoResults(NO_RESULTS_MESSAGE)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failure_renders_as_no_products() {
        let backend = ScriptedBackend {
            failing: true,
            ..ScriptedBackend::returning(vec![product(1)])
        };
        let mut search = LiveSearch::spawn(backend, SearchOptions::default());

        search.input("test");
        let state = search
            .wait_for(|s| s.status == SearchStatus::Failed)
            .await
            .unwrap();

        assert!(state.results().is_empty());
        let view = search.view();
        assert!(view.product_rows().is_empty());
        assert_eq!(view.results, ResultsRegion::NoResults(NO_RESULTS_MESSAGE));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_stale_response_is_discarded() {
        let mut delays = HashMap::new();
        delays.insert("lamp".to_string(), Duration::from_secs(5));
        delays.insert("lamps".to_string(), Duration::from_millis(10));
        let backend = ScriptedBackend {
            delays,
            ..ScriptedBackend::returning(vec![product(1)])
        };
        let mut search = LiveSearch::spawn(backend.clone(), SearchOptions::default());

        search.input("lamp");
        search.wait_for(SearchState::is_loading).await.unwrap();
        search.input("lamps");
        search
            .wait_for(|s| s.stable_query == "lamps" && !s.is_loading())
            .await
            .unwrap();

        // 等慢请求返回
        sleep(Duration::from_secs(6)).await;

        let state = search.state();
        assert_eq!(state.stable_query, "lamps");
        assert!(matches!(state.status, SearchStatus::Ready(_)));
        assert_eq!(backend.calls(), vec!["lamp".to_string(), "lamps".to_string()]);
        assert_eq!(backend.completed(), vec!["lamps".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_query_is_served_from_cache() {
        let backend = ScriptedBackend::returning(vec![product(1)]);
        let mut search = LiveSearch::spawn(backend.clone(), SearchOptions::default());

        search.input("mug");
        search
            .wait_for(|s| s.stable_query == "mug" && matches!(s.status, SearchStatus::Ready(_)))
            .await
            .unwrap();

        search.input("mu");
        search.wait_for(|s| s.stable_query == "mu").await.unwrap();

        search.input("mug");
        let state = search.wait_for(|s| s.stable_query == "mug").await.unwrap();

        assert_eq!(state.results(), &[product(1)]);
        assert_eq!(backend.calls(), vec!["mug".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_before_settle_sends_nothing() {
        let backend = ScriptedBackend::returning(vec![product(1)]);
        let mut search = LiveSearch::spawn(backend.clone(), SearchOptions::default());

        search.input("widget");
        drop(search);
        sleep(Duration::from_secs(1)).await;

        assert!(backend.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_mid_request_cancels_it() {
        let mut delays = HashMap::new();
        delays.insert("widget".to_string(), Duration::from_secs(5));
        let backend = ScriptedBackend {
            delays,
            ..ScriptedBackend::returning(vec![product(1)])
        };
        let mut search = LiveSearch::spawn(backend.clone(), SearchOptions::default());

        search.input("widget");
        search.wait_for(SearchState::is_loading).await.unwrap();
        drop(search);
        sleep(Duration::from_secs(10)).await;

        assert_eq!(backend.calls(), vec!["widget".to_string()]);
        assert!(backend.completed().is_empty());
    }
}
