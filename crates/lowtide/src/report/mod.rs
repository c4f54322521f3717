//! 报表工作簿读写
//!
//! 输入链接清单的读取、低互动分类输出与按流量排序

mod reader;
mod writer;

use thiserror::Error;

/// 工作簿读写错误
#[derive(Debug, Error)]
pub enum ReportError {
    /// 输入文件不存在
    #[error("File not found: {0}")]
    NotFound(String),

    /// 文件无法按 xlsx 解析
    #[error("Invalid workbook: {0}")]
    Invalid(String),

    /// 输出保存失败
    #[error("Failed to save workbook: {0}")]
    Save(String),
}

pub use reader::{read_rows, SheetRows};
pub use writer::{
    sheet_for_count, ReportWriter, LOW_COMMENTS_SHEET, NO_COMMENTS_SHEET, REPORT_HEADER,
};
