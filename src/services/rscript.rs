//! 外部渲染脚本执行 - 业务能力层
//!
//! 只负责"以不透明子进程运行替换后的渲染脚本"能力；
//! 脚本预期在被替换进去的目的地生成 PDF，本层不解释脚本语义

use std::path::Path;

use tokio::process::Command;

use crate::error::{AppError, AppResult, FileError};

/// 渲染脚本执行器
pub struct RscriptRunner {
    command: String,
}

impl RscriptRunner {
    /// 创建执行器
    ///
    /// # 参数
    /// - `command`: 解释器命令（通常是 `Rscript`）
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// 运行一个渲染脚本，等待进程退出
    ///
    /// # 返回
    /// 返回进程是否以成功状态退出；无法启动进程时报错
    pub async fn run(&self, script_path: &Path) -> AppResult<bool> {
        let status = Command::new(&self.command)
            .arg(script_path)
            .status()
            .await
            .map_err(|e| {
                AppError::File(FileError::CommandFailed {
                    command: format!("{} {}", self.command, script_path.display()),
                    source: Box::new(e),
                })
            })?;

        Ok(status.success())
    }
}
