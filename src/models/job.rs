//! 远程任务数据模型

use std::path::PathBuf;

use crate::models::namespace::Namespace;

/// 任务状态机
///
/// Submitted → Polling → {Completed | Failed}，两个终态都不再重试
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// 已提交，尚未开始轮询
    Submitted,
    /// 轮询中
    Polling,
    /// 已完成（四个产物全部取回）
    Completed,
    /// 已失败（任何一次产物获取失败即终态）
    Failed,
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobState::Submitted => "已提交",
            JobState::Polling => "轮询中",
            JobState::Completed => "已完成",
            JobState::Failed => "已失败",
        };
        write!(f, "{}", s)
    }
}

/// 一个远程任务
///
/// 仅存在于进程内存中，到达终态后随流水线一起丢弃
#[derive(Debug, Clone)]
pub struct Job {
    /// 远程服务分配的任务ID（不透明字符串）
    pub job_id: String,
    /// 所属命名空间
    pub namespace: Namespace,
    /// 来源输入文件
    pub source_file: PathBuf,
    /// 当前状态
    pub state: JobState,
}

impl Job {
    /// 由提交结果创建任务（初始状态为已提交）
    pub fn new(job_id: String, namespace: Namespace, source_file: PathBuf) -> Self {
        Self {
            job_id,
            namespace,
            source_file,
            state: JobState::Submitted,
        }
    }
}
