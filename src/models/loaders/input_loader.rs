//! 输入文件发现
//!
//! 递归扫描输入目录，按文件名后缀约定收集待处理文件

use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::fs;

/// 递归收集指定目录下所有以给定后缀结尾的输入文件
///
/// # 参数
/// - `folder_path`: 输入目录
/// - `suffix`: 文件名后缀约定（例如 `IDs_Pvalues.txt`）
///
/// # 返回
/// 返回按路径排序的文件列表；目录不存在时报错（发现失败是致命错误）
pub async fn discover_input_files(folder_path: &str, suffix: &str) -> Result<Vec<PathBuf>> {
    let root = PathBuf::from(folder_path);

    if !root.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let mut input_files = Vec::new();
    let mut pending_dirs = vec![root];

    while let Some(dir) = pending_dirs.pop() {
        let mut entries = fs::read_dir(&dir)
            .await
            .with_context(|| format!("无法读取文件夹: {}", dir.display()))?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let file_type = entry.file_type().await?;

            if file_type.is_dir() {
                pending_dirs.push(path);
            } else if path
                .file_name()
                .and_then(|s| s.to_str())
                .map(|name| name.ends_with(suffix))
                .unwrap_or(false)
            {
                tracing::info!(
                    "发现输入文件: {}",
                    path.file_name().unwrap_or_default().to_string_lossy()
                );
                input_files.push(path);
            }
        }
    }

    input_files.sort();
    Ok(input_files)
}

/// 读取单个输入文件的词条正文
pub async fn load_term_blob(path: &PathBuf) -> Result<String> {
    fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取输入文件: {}", path.display()))
}
