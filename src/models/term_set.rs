//! 打分词条集数据模型
//!
//! 一个词条集对应一个 (输入文件, 命名空间) 对；正文是按行分隔的
//! 打分词条文本，读取后不再修改

use std::path::{Path, PathBuf};

use crate::models::namespace::Namespace;

/// 打分词条集
#[derive(Debug, Clone)]
pub struct TermSet {
    /// 来源输入文件
    pub source_file: PathBuf,
    /// 所属命名空间
    pub namespace: Namespace,
    /// 词条正文（整体作为不透明文本提交）
    pub content: String,
}

impl TermSet {
    /// 创建词条集
    pub fn new(source_file: PathBuf, namespace: Namespace, content: String) -> Self {
        Self {
            source_file,
            namespace,
            content,
        }
    }

    /// 输入文件基名（不含扩展名），用于产物命名
    pub fn file_base(&self) -> String {
        file_base(&self.source_file)
    }

    /// 图形标题使用的派生标签
    pub fn derived_label(&self) -> String {
        derived_label(&self.source_file)
    }
}

/// 取输入文件基名（不含扩展名）
pub fn file_base(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// 从文件基名派生图形标题标签
///
/// 取下划线分隔的前三段以空格连接；段数不足时退回整个基名
pub fn derived_label(path: &Path) -> String {
    let base = file_base(path);
    let segments: Vec<&str> = base.split('_').collect();
    if segments.len() >= 3 {
        segments[..3].join(" ")
    } else {
        base
    }
}
