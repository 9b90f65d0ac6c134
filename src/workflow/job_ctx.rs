//! 任务处理上下文
//!
//! 封装"我正在处理哪个文件的哪个命名空间"这一信息

use std::fmt::Display;
use std::path::PathBuf;

use crate::models::Namespace;

/// 任务处理上下文
///
/// 包含处理单个 (文件, 命名空间) 对所需的全部上下文信息
#[derive(Debug, Clone)]
pub struct JobCtx {
    /// 输入文件路径
    pub source_file: PathBuf,

    /// 文件索引（仅用于日志显示）
    pub file_index: usize,

    /// 命名空间
    pub namespace: Namespace,
}

impl JobCtx {
    /// 创建新的任务上下文
    pub fn new(source_file: PathBuf, file_index: usize, namespace: Namespace) -> Self {
        Self {
            source_file,
            file_index,
            namespace,
        }
    }
}

impl Display for JobCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[文件#{} {} 命名空间#{}]",
            self.file_index,
            self.source_file.display(),
            self.namespace
        )
    }
}
