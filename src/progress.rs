//! # 进度与取消
//!
//! 调用方持有的进度计数器。嵌入和提取在扫描每一行之后更新它，
//! 调用方可以在另一个线程中轮询百分比或请求取消。
//! 使用原子变量，因此可以通过 `&Progress` 在线程之间共享。

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::error::{Result, StegoError};

#[derive(Debug, Default)]
pub struct Progress {
    done: AtomicU64,
    total: AtomicU64,
    cancelled: AtomicBool,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置总步数并把已完成步数归零。
    pub fn start(&self, total: u64) {
        self.done.store(0, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
    }

    /// 前进 `steps` 步，不会超过总数。
    pub fn advance(&self, steps: u64) {
        let total = self.total.load(Ordering::Relaxed);
        let _ = self
            .done
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |done| {
                Some(done.saturating_add(steps).min(total))
            });
    }

    /// 标记为已完成。
    pub fn finish(&self) {
        self.done
            .store(self.total.load(Ordering::Relaxed), Ordering::Relaxed);
    }

    /// 返回 `(已完成, 总数)`。
    pub fn get(&self) -> (u64, u64) {
        (
            self.done.load(Ordering::Relaxed),
            self.total.load(Ordering::Relaxed),
        )
    }

    /// 以 0 到 100 的整数返回进度，总数为 0 时视为 0%。
    pub fn percent(&self) -> u8 {
        let (done, total) = self.get();
        if total == 0 {
            return 0;
        }
        ((done.min(total) * 100) / total) as u8
    }

    /// 请求取消当前操作。
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// 如果已请求取消，返回 [`StegoError::Cancelled`]。
    pub fn check_cancelled(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(StegoError::Cancelled)
        } else {
            Ok(())
        }
    }
}
