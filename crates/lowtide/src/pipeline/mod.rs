//! 批处理流水线
//!
//! 读取链接工作簿，在速率限制下并发抓取评论数并写入分类报表


use std::path::Path;
use std::sync::Arc;

use futures::future::join_all;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::ratelimit::RateLimiter;
use crate::reddit::{ApiError, SubmissionId, SubmissionSource};
use crate::report::{self, sheet_for_count, ReportError, ReportWriter};

/// 流水线错误
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// 批处理执行器
///
/// 所有任务共享同一个限流器与写入器；任务完成顺序不保证与
/// 入队顺序一致。
pub struct Runner<S> {
    source: Arc<S>,
    limiter: Arc<RateLimiter>,
    writer: Arc<Mutex<ReportWriter>>,
}

impl<S: SubmissionSource + 'static> Runner<S> {
    /// 创建执行器
    pub fn new(source: S, limiter: RateLimiter, writer: ReportWriter) -> Self {
        Self {
            source: Arc::new(source),
            limiter: Arc::new(limiter),
            writer: Arc::new(Mutex::new(writer)),
        }
    }

    /// 执行整批处理
    ///
    /// 输入不可读时记录日志后正常返回（视为无数据）。任何一个任务的
    /// 重试耗尽或不可重试错误会终止整批并向上传播。
    pub async fn run(&self, input: &Path, skip_header: bool) -> Result<(), PipelineError> {
        let sheets = match report::read_rows(input) {
            Ok(sheets) => sheets,
            Err(err) => {
                tracing::error!("Error reading input file: {err}");
                tracing::warn!("No data to process in file!");
                return Ok(());
            }
        };

        let mut handles = Vec::new();
        for (sheet_name, rows) in sheets {
            for (index, (url, traffic)) in rows.into_iter().enumerate() {
                if skip_header && index == 0 {
                    continue;
                }
                tracing::info!("Queued: row {} in sheet {}", index, sheet_name);
                let source = Arc::clone(&self.source);
                let limiter = Arc::clone(&self.limiter);
                let writer = Arc::clone(&self.writer);
                handles.push(tokio::spawn(async move {
                    process_submission(&*source, &limiter, &writer, &url, &traffic).await
                }));
            }
        }

        for result in join_all(handles).await {
            result??;
        }

        self.writer.lock().await.sort_by_traffic()?;
        tracing::info!("Processing complete!");
        Ok(())
    }
}

/// 处理单条提交
///
/// 非法链接与锁定/归档的提交跳过，不影响整批。
async fn process_submission<S: SubmissionSource>(
    source: &S,
    limiter: &RateLimiter,
    writer: &Mutex<ReportWriter>,
    url: &str,
    traffic: &str,
) -> Result<(), PipelineError> {
    let id = match SubmissionId::parse(url) {
        Ok(id) => id,
        Err(_) => {
            tracing::warn!("Invalid submission URL: {url}. Skipping...");
            return Ok(());
        }
    };

    let info = limiter.call(url, || source.submission(&id)).await?;
    if info.locked || info.archived {
        return Ok(());
    }

    if let Some(sheet) = sheet_for_count(info.num_comments) {
        writer
            .lock()
            .await
            .append(sheet, url, info.num_comments, traffic)?;
    }
    tracing::info!(
        "Successfully processed submission: {url} with {} comments",
        info.num_comments
    );
    Ok(())
}
