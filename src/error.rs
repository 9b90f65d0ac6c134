use std::fmt;
use std::path::Path;

use crate::models::{ArtifactKind, Namespace};

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 远程服务调用错误
    Api(ApiError),
    /// 文件操作错误
    File(FileError),
    /// 任务生命周期错误
    Job(JobError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Api(e) => write!(f, "服务错误: {}", e),
            AppError::File(e) => write!(f, "文件错误: {}", e),
            AppError::Job(e) => write!(f, "任务错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Api(e) => Some(e),
            AppError::File(e) => Some(e),
            AppError::Job(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// 远程服务调用错误
#[derive(Debug)]
pub enum ApiError {
    /// 任务提交失败（网络失败或非成功响应）
    SubmissionFailed {
        endpoint: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 提交响应缺少任务ID或格式不正确
    BadSubmitResponse {
        endpoint: String,
        body: String,
    },
    /// 无法访问服务（状态查询或结果获取时的传输失败）
    TransportFailed {
        endpoint: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 结果获取失败（响应正文中嵌入了错误标记）
    FetchFailed {
        job_id: String,
        kind: ArtifactKind,
        reason: String,
    },
    /// JSON 解析失败
    JsonParseFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::SubmissionFailed { endpoint, source } => {
                write!(f, "任务提交失败 ({}): {}", endpoint, source)
            }
            ApiError::BadSubmitResponse { endpoint, body } => {
                write!(f, "提交响应缺少任务ID ({}): {}", endpoint, body)
            }
            ApiError::TransportFailed { endpoint, source } => {
                write!(f, "无法访问服务 ({}): {}", endpoint, source)
            }
            ApiError::FetchFailed {
                job_id,
                kind,
                reason,
            } => {
                write!(
                    f,
                    "结果获取失败 (任务 {}, 类型 {}): {}",
                    job_id, kind, reason
                )
            }
            ApiError::JsonParseFailed { source } => {
                write!(f, "JSON解析失败: {}", source)
            }
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::SubmissionFailed { source, .. }
            | ApiError::TransportFailed { source, .. }
            | ApiError::JsonParseFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 文件操作错误
#[derive(Debug)]
pub enum FileError {
    /// 读取文件失败
    ReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入文件失败
    WriteFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 创建目录失败
    CreateDirFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 外部命令执行失败
    CommandFailed {
        command: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 目录不存在
    DirectoryNotFound {
        path: String,
    },
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileError::ReadFailed { path, source } => {
                write!(f, "读取文件失败 ({}): {}", path, source)
            }
            FileError::WriteFailed { path, source } => {
                write!(f, "写入文件失败 ({}): {}", path, source)
            }
            FileError::CreateDirFailed { path, source } => {
                write!(f, "创建目录失败 ({}): {}", path, source)
            }
            FileError::CommandFailed { command, source } => {
                write!(f, "外部命令执行失败 ({}): {}", command, source)
            }
            FileError::DirectoryNotFound { path } => write!(f, "目录不存在: {}", path),
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileError::ReadFailed { source, .. }
            | FileError::WriteFailed { source, .. }
            | FileError::CreateDirFailed { source, .. }
            | FileError::CommandFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 任务生命周期错误
#[derive(Debug)]
pub enum JobError {
    /// 单个 (文件, 命名空间) 流水线失败的终态汇总
    NamespaceFailed {
        source_file: String,
        namespace: Namespace,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 等待任务完成时收到停机信号
    Cancelled {
        job_id: String,
    },
    /// 等待任务完成超时（仅在配置了超时上限时出现）
    TimedOut {
        job_id: String,
        waited_secs: u64,
    },
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobError::NamespaceFailed {
                source_file,
                namespace,
                source,
            } => {
                write!(
                    f,
                    "命名空间任务失败 (文件 {}, 命名空间 {}): {}",
                    source_file, namespace, source
                )
            }
            JobError::Cancelled { job_id } => {
                write!(f, "任务 {} 在停机时被取消", job_id)
            }
            JobError::TimedOut { job_id, waited_secs } => {
                write!(f, "任务 {} 等待超时 (已等待 {} 秒)", job_id, waited_secs)
            }
        }
    }
}

impl std::error::Error for JobError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            JobError::NamespaceFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

// ========== 从常见错误类型转换 ==========
// 注意：不需要手动实现 From<AppError> for anyhow::Error，
// 因为 anyhow 已经为所有实现了 std::error::Error 的类型提供了自动实现

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Api(ApiError::JsonParseFailed {
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        let endpoint = err.url().map(|u| u.to_string()).unwrap_or_default();
        AppError::Api(ApiError::TransportFailed {
            endpoint,
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建任务提交失败错误
    pub fn submission_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Api(ApiError::SubmissionFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        })
    }

    /// 创建传输失败错误
    pub fn transport_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Api(ApiError::TransportFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        })
    }

    /// 创建结果获取失败错误
    pub fn fetch_failed(
        job_id: impl Into<String>,
        kind: ArtifactKind,
        reason: impl Into<String>,
    ) -> Self {
        AppError::Api(ApiError::FetchFailed {
            job_id: job_id.into(),
            kind,
            reason: reason.into(),
        })
    }

    /// 创建文件写入失败错误
    pub fn file_write_failed(
        path: &Path,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.display().to_string(),
            source: Box::new(source),
        })
    }

    /// 创建命名空间任务失败错误
    pub fn namespace_failed(
        source_file: &Path,
        namespace: Namespace,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Job(JobError::NamespaceFailed {
            source_file: source_file.display().to_string(),
            namespace,
            source: Box::new(source),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
