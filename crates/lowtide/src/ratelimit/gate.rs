//! 并发闸门
//!
//! 基于计数信号量的准入控制

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// 并发闸门
///
/// 持有 `max_concurrent` 个槽位，任务在 `acquire` 处挂起直到有空闲槽位。
/// 排队顺序由信号量的等待队列决定，持续满载下可能出现饥饿。
#[derive(Debug)]
pub struct ConcurrencyGate {
    semaphore: Arc<Semaphore>,
}

impl ConcurrencyGate {
    /// 创建指定容量的闸门
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
        }
    }

    /// 获取一个槽位
    ///
    /// 返回的令牌在离开作用域时归还槽位，无论成功、失败还是取消。
    pub async fn acquire(&self) -> OwnedSemaphorePermit {
        Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .expect("gate semaphore is never closed")
    }

    /// 当前空闲槽位数
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}
