//! 输入工作簿读取

use std::path::Path;

use super::ReportError;

/// 各工作表的行数据：`(表名, [(url, traffic)])`，保持工作簿内顺序
pub type SheetRows = Vec<(String, Vec<(String, String)>)>;

/// 读取输入工作簿
///
/// 每个工作表取第 1、2 列作为 `(url, traffic)`，包含表头行，
/// 完全空白的行被跳过。
pub fn read_rows(path: &Path) -> Result<SheetRows, ReportError> {
    if !path.exists() {
        return Err(ReportError::NotFound(path.display().to_string()));
    }

    let book = umya_spreadsheet::reader::xlsx::read(path)
        .map_err(|err| ReportError::Invalid(format!("{err:?}")))?;

    let mut sheets = Vec::new();
    for sheet in book.get_sheet_collection().iter() {
        let mut rows = Vec::new();
        for row in 1..=sheet.get_highest_row() {
            let url = sheet.get_value((1, row));
            let traffic = sheet.get_value((2, row));
            if url.is_empty() && traffic.is_empty() {
                continue;
            }
            rows.push((url, traffic));
        }
        sheets.push((sheet.get_name().to_string(), rows));
    }
    Ok(sheets)
}
