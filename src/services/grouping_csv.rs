//! 分组文档扁平化 - 业务能力层
//!
//! 把层级分组 JSON 文档顶层的 children 数组压平成 CSV：
//! 表头取第一条记录的字段名（按文档顺序），每条记录一行，输入序保留。
//! 后续记录中第一条记录没有的字段会被静默丢弃，表头字段缺失时留空——
//! 这是既定行为，不做"修正"

use std::path::Path;

use serde_json::Value;
use tokio::fs;
use tracing::info;

use crate::error::{AppError, AppResult};

/// 把分组 JSON 正文转换为 CSV 文本
pub fn grouping_to_csv(grouping_json: &str) -> AppResult<String> {
    let document: Value = serde_json::from_str(grouping_json)?;

    let children = document
        .get("children")
        .and_then(|v| v.as_array())
        .ok_or_else(|| AppError::Other("分组文档缺少顶层 children 数组".to_string()))?;

    let mut csv = String::new();

    let Some(first) = children.first().and_then(|v| v.as_object()) else {
        // 没有记录就只有空输出
        return Ok(csv);
    };

    let header: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    csv.push_str(&join_row(header.iter().map(|h| escape_field(h))));

    for record in children {
        let Some(record) = record.as_object() else {
            continue;
        };
        let row = header.iter().map(|field| {
            record
                .get(*field)
                .map(format_value)
                .unwrap_or_default()
        });
        csv.push_str(&join_row(row.map(|cell| escape_field(&cell))));
    }

    Ok(csv)
}

/// 转换并落盘到分组文档旁边的 CSV 路径
pub async fn write_grouping_csv(grouping_json: &str, csv_path: &Path) -> AppResult<()> {
    let csv = grouping_to_csv(grouping_json)?;

    fs::write(csv_path, csv)
        .await
        .map_err(|e| AppError::file_write_failed(csv_path, e))?;

    info!("分组文档已扁平化为 {}", csv_path.display());
    Ok(())
}

/// JSON 值转 CSV 单元格文本（字符串不带引号，复合值按紧凑 JSON）
fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// CSV 字段转义：包含逗号、引号或换行时用双引号包裹
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn join_row(cells: impl Iterator<Item = String>) -> String {
    let mut row = cells.collect::<Vec<_>>().join(",");
    row.push('\n');
    row
}
