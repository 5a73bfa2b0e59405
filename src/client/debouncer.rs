//! 输入防抖
//!
//! 每次输入都会取消尚未触发的定时任务并重新计时，只有静默期结束时的
//! 最后一个值会写入稳定查询。`Debouncer` 被 drop 时未触发的任务一并取消。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const DEFAULT_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug)]
pub struct Debouncer {
    raw: String,
    delay: Duration,
    stable: Arc<watch::Sender<String>>,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        let (stable, _) = watch::channel(String::new());
        Self {
            raw: String::new(),
            delay,
            stable: Arc::new(stable),
            pending: None,
        }
    }

    /// 记录最新输入并重新计时，必须在 tokio 运行时内调用
    pub fn input(&mut self, value: impl Into<String>) {
        self.raw = value.into();
        self.cancel();

        let stable = Arc::clone(&self.stable);
        let delay = self.delay;
        let value = self.raw.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            stable.send_if_modified(|current| {
                if *current == value {
                    return false;
                }
                *current = value;
                true
            });
        }));
    }

    /// 取消尚未触发的更新
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn stable(&self) -> String {
        self.stable.borrow().clone()
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// 稳定查询的订阅端，值变化时收到通知
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.stable.subscribe()
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
