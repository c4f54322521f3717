//! 输出工作簿写入
//!
//! 按评论数分类追加行，支持按流量列整表排序

use std::path::{Path, PathBuf};

use umya_spreadsheet::{Spreadsheet, Worksheet};

use super::ReportError;

/// 零评论提交所在工作表
pub const NO_COMMENTS_SHEET: &str = "No comments";
/// 1-3 条评论提交所在工作表
pub const LOW_COMMENTS_SHEET: &str = "3 or less comments";
/// 自动创建工作表时写入的表头
pub const REPORT_HEADER: [&str; 3] = ["URL", "Number of comments", "Traffic"];

/// 评论数对应的目标工作表
///
/// 超过 3 条评论的提交不记录。
pub fn sheet_for_count(count: u32) -> Option<&'static str> {
    match count {
        0 => Some(NO_COMMENTS_SHEET),
        1..=3 => Some(LOW_COMMENTS_SHEET),
        _ => None,
    }
}

/// 报表写入器
///
/// 持有输出工作簿与目标路径，每次追加后立即落盘。
pub struct ReportWriter {
    book: Spreadsheet,
    path: PathBuf,
}

impl ReportWriter {
    /// 创建写入器（输出文件在首次保存时生成）
    pub fn create(path: impl Into<PathBuf>) -> Self {
        Self {
            book: umya_spreadsheet::new_file(),
            path: path.into(),
        }
    }

    /// 输出路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 追加一行 `(url, 评论数, traffic)` 并保存
    ///
    /// 目标工作表不存在时自动创建并写入表头。
    pub fn append(
        &mut self,
        sheet_name: &str,
        url: &str,
        count: u32,
        traffic: &str,
    ) -> Result<(), ReportError> {
        let sheet = self.sheet_mut(sheet_name);
        let row = sheet.get_highest_row() + 1;
        sheet.get_cell_mut((1, row)).set_value(url);
        sheet.get_cell_mut((2, row)).set_value_number(count);
        sheet.get_cell_mut((3, row)).set_value(traffic);
        self.save()
    }

    fn sheet_mut(&mut self, name: &str) -> &mut Worksheet {
        if self.book.get_sheet_by_name(name).is_none() {
            if let Ok(sheet) = self.book.new_sheet(name) {
                for (index, title) in REPORT_HEADER.iter().enumerate() {
                    sheet.get_cell_mut((index as u32 + 1, 1)).set_value(*title);
                }
            }
        }
        self.book
            .get_sheet_by_name_mut(name)
            .expect("sheet exists after creation")
    }

    /// 将所有工作表的数据行按第 3 列（流量）降序排序并保存
    ///
    /// 表头保持在第 1 行不动。
    pub fn sort_by_traffic(&mut self) -> Result<(), ReportError> {
        for sheet in self.book.get_sheet_collection_mut().iter_mut() {
            let highest = sheet.get_highest_row();
            if highest < 3 {
                continue;
            }

            let mut rows: Vec<(String, String, String)> = (2..=highest)
                .map(|row| {
                    (
                        sheet.get_value((1, row)),
                        sheet.get_value((2, row)),
                        sheet.get_value((3, row)),
                    )
                })
                .collect();
            rows.sort_by(|a, b| b.2.cmp(&a.2));

            for (offset, (url, count, traffic)) in rows.iter().enumerate() {
                let row = offset as u32 + 2;
                sheet.get_cell_mut((1, row)).set_value(url.clone());
                match count.parse::<f64>() {
                    Ok(number) => sheet.get_cell_mut((2, row)).set_value_number(number),
                    Err(_) => sheet.get_cell_mut((2, row)).set_value(count.clone()),
                };
                sheet.get_cell_mut((3, row)).set_value(traffic.clone());
            }
        }
        self.save()
    }

    /// 保存工作簿
    pub fn save(&self) -> Result<(), ReportError> {
        umya_spreadsheet::writer::xlsx::write(&self.book, &self.path)
            .map_err(|err| ReportError::Save(format!("{err:?}")))
    }
}
