//! 速率限制和重试系统
//!
//! 限制并发出站请求数，对限流错误做指数退避重试

mod gate;
mod retry;

pub use gate::ConcurrencyGate;
pub use retry::{backoff_base_delay, RateLimiter, RateLimiterConfig, Retryable};
