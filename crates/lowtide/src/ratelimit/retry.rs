//! 重试策略
//!
//! 指数退避加抖动，包装任意异步请求操作

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use super::gate::ConcurrencyGate;

/// 速率限制配置
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// 最大重试次数
    pub max_retries: u32,
    /// 基础延迟（秒）
    pub initial_delay: f64,
    /// 最大并发请求数
    pub max_concurrent: usize,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: 1.0,
            max_concurrent: 10,
        }
    }
}

impl RateLimiterConfig {
    /// 校验配置
    pub fn validate(&self) -> Result<(), String> {
        if self.initial_delay <= 0.0 {
            return Err("initial_delay must be greater than 0".to_string());
        }
        if self.max_concurrent == 0 {
            return Err("max_concurrent must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// 错误重试分类
///
/// 限流响应（429）和网络传输错误可重试，其余状态码立即向上传播。
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// 计算第 `retries` 次重试前的基础延迟（不含抖动）
pub fn backoff_base_delay(initial_delay: f64, retries: u32) -> f64 {
    initial_delay * 2f64.powi(retries as i32 - 1)
}

/// 计算含抖动的等待时长
///
/// 抖动取 `[0, delay * 0.1)` 的均匀随机值，避免并发重试同步风暴。
fn backoff_delay(initial_delay: f64, retries: u32) -> Duration {
    let delay = backoff_base_delay(initial_delay, retries);
    let jitter = if delay > 0.0 {
        rand::thread_rng().gen_range(0.0..delay * 0.1)
    } else {
        0.0
    };
    Duration::from_secs_f64((delay + jitter).max(0.0))
}

/// 速率限制器
///
/// 组合并发闸门与退避重试：每次尝试先取闸门槽位，失败时释放槽位、
/// 等待后重新取槽重试。
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    gate: ConcurrencyGate,
}

impl RateLimiter {
    /// 创建新的速率限制器
    pub fn new(config: RateLimiterConfig) -> Self {
        let gate = ConcurrencyGate::new(config.max_concurrent);
        Self { config, gate }
    }

    /// 获取配置
    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }

    /// 获取并发闸门
    pub fn gate(&self) -> &ConcurrencyGate {
        &self.gate
    }

    /// 在闸门与重试保护下执行操作
    ///
    /// `target` 仅用于日志标识被调用的资源。可重试错误最多重试
    /// `max_retries` 次，超限后记录错误并传播；不可重试错误立即传播。
    pub async fn call<T, E, F, Fut>(&self, target: &str, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable,
    {
        let mut retries = 0u32;
        loop {
            let permit = self.gate.acquire().await;
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    drop(permit);
                    if !err.is_retryable() {
                        return Err(err);
                    }
                    retries += 1;
                    if retries > self.config.max_retries {
                        tracing::error!(
                            "Max retries ({}) exceeded for {}",
                            self.config.max_retries,
                            target
                        );
                        return Err(err);
                    }
                    self.wait_with_jitter(retries).await;
                }
            }
        }
    }

    /// 退避等待
    async fn wait_with_jitter(&self, retries: u32) {
        let wait = backoff_delay(self.config.initial_delay, retries);
        tracing::warn!(
            "Rate limit hit. Waiting {:.2} seconds before retry {}",
            wait.as_secs_f64(),
            retries
        );
        tokio::time::sleep(wait).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Instant;

    #[derive(Debug)]
    enum TestError {
        RateLimited,
        Fatal,
    }

    impl Retryable for TestError {
        fn is_retryable(&self) -> bool {
            matches!(self, TestError::RateLimited)
        }
    }

    fn fast_config(max_retries: u32) -> RateLimiterConfig {
        RateLimiterConfig {
            max_retries,
            initial_delay: 0.001,
            max_concurrent: 4,
        }
    }

    #[test]
    fn test_config_default() {
        let config = RateLimiterConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.initial_delay, 1.0);
        assert_eq!(config.max_concurrent, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validate() {
        let zero_delay = RateLimiterConfig {
            initial_delay: 0.0,
            ..Default::default()
        };
        assert!(zero_delay.validate().is_err());

        let zero_concurrent = RateLimiterConfig {
            max_concurrent: 0,
            ..Default::default()
        };
        assert!(zero_concurrent.validate().is_err());
    }

    #[test]
    fn test_backoff_base_delay() {
        assert_eq!(backoff_base_delay(1.0, 1), 1.0);
        assert_eq!(backoff_base_delay(1.0, 2), 2.0);
        assert_eq!(backoff_base_delay(1.0, 3), 4.0);
        assert_eq!(backoff_base_delay(5.0, 1), 5.0);
        assert_eq!(backoff_base_delay(5.0, 3), 20.0);
    }

    #[test]
    fn test_backoff_delay_jitter_bounds() {
        for retries in 1..=3 {
            let base = backoff_base_delay(2.0, retries);
            for _ in 0..20 {
                let wait = backoff_delay(2.0, retries).as_secs_f64();
                assert!(wait >= base, "wait {wait} below base {base}");
                assert!(wait <= base * 1.1, "wait {wait} above jitter cap");
            }
        }
    }

    #[tokio::test]
    async fn test_gate_bounds_concurrency() {
        let limiter = Arc::new(RateLimiter::new(RateLimiterConfig {
            max_concurrent: 2,
            ..Default::default()
        }));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let high_water = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let limiter = Arc::clone(&limiter);
            let in_flight = Arc::clone(&in_flight);
            let high_water = Arc::clone(&high_water);
            handles.push(tokio::spawn(async move {
                limiter
                    .call("task", || {
                        let in_flight = Arc::clone(&in_flight);
                        let high_water = Arc::clone(&high_water);
                        async move {
                            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                            high_water.fetch_max(now, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(20)).await;
                            in_flight.fetch_sub(1, Ordering::SeqCst);
                            Ok::<(), TestError>(())
                        }
                    })
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert!(high_water.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_always_rate_limited_exhausts_retries() {
        let limiter = RateLimiter::new(fast_config(3));
        let attempts = Arc::new(AtomicU32::new(0));

        let result: Result<(), TestError> = limiter
            .call("always-limited", || {
                let attempts = Arc::clone(&attempts);
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Err(TestError::RateLimited)
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_recovers_after_single_rate_limit() {
        let limiter = RateLimiter::new(RateLimiterConfig {
            max_retries: 3,
            initial_delay: 0.05,
            max_concurrent: 4,
        });
        let attempts = Arc::new(AtomicU32::new(0));
        let start = Instant::now();

        let result: Result<u32, TestError> = limiter
            .call("recovers", || {
                let attempts = Arc::clone(&attempts);
                async move {
                    if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(TestError::RateLimited)
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        // one backoff wait of at least initial_delay
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_fatal_error_propagates_immediately() {
        let limiter = RateLimiter::new(fast_config(3));
        let attempts = Arc::new(AtomicU32::new(0));
        let start = Instant::now();

        let result: Result<(), TestError> = limiter
            .call("fatal", || {
                let attempts = Arc::clone(&attempts);
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Err(TestError::Fatal)
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_permit_released_after_failure() {
        let limiter = RateLimiter::new(fast_config(1));

        let result: Result<(), TestError> = limiter
            .call("failing", || async { Err(TestError::RateLimited) })
            .await;
        assert!(result.is_err());

        assert_eq!(limiter.gate().available(), limiter.config().max_concurrent);
    }
}
