//! 单个文件处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块负责一个输入文件的三路命名空间扇出，是文件级别的编排器。
//!
//! ## 核心功能
//!
//! 1. **读取词条**：每个文件只读一次，三个命名空间共享正文
//! 2. **并发扇出**：三个命名空间流水线作为独立任务并发运行
//! 3. **失败隔离**：一个命名空间失败不取消、不阻塞另外两个
//! 4. **统计输出**：记录成功/失败数量，部分成功按部分成功上报

use std::path::PathBuf;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::watch;
use tracing::{error, info};

use crate::error::AppError;
use crate::models::{load_term_blob, Namespace, TermSet};
use crate::workflow::{JobCtx, NamespaceFlow};

/// 单个文件的命名空间处理统计
#[derive(Debug, Default)]
pub struct FileStats {
    pub succeeded: usize,
    pub failed: usize,
}

impl FileStats {
    /// 至少有一个命名空间成功
    pub fn any_success(&self) -> bool {
        self.succeeded > 0
    }
}

/// 处理单个输入文件
///
/// # 参数
/// - `flow`: 命名空间流水线（跨任务共享）
/// - `source_file`: 输入文件路径
/// - `file_index`: 文件索引（用于日志）
/// - `shutdown`: 停机信号接收端
///
/// # 返回
/// 返回本文件的命名空间统计；输入文件不可读时三个命名空间都记为失败，
/// 不中止批次
pub async fn process_file(
    flow: Arc<NamespaceFlow>,
    source_file: PathBuf,
    file_index: usize,
    shutdown: watch::Receiver<bool>,
) -> FileStats {
    info!("[文件 {}] 开始处理: {}", file_index, source_file.display());

    let content = match load_term_blob(&source_file).await {
        Ok(content) => content,
        Err(e) => {
            error!("[文件 {}] ❌ 无法读取输入文件: {}", file_index, e);
            return FileStats {
                succeeded: 0,
                failed: Namespace::all().len(),
            };
        }
    };

    // ========== 三路命名空间扇出 ==========
    // 轻量任务组：三个流水线独立跑到各自的终态，互不取消
    let mut handles = Vec::new();

    for namespace in Namespace::all() {
        let flow = flow.clone();
        let term_set = TermSet::new(source_file.clone(), namespace, content.clone());
        let ctx = JobCtx::new(source_file.clone(), file_index, namespace);
        let shutdown = shutdown.clone();

        handles.push(tokio::spawn(async move {
            match flow.run(&term_set, &ctx, shutdown).await {
                Ok(()) => true,
                Err(e) => {
                    // 失败汇总为带 (文件, 命名空间) 标签的终态事件，
                    // 只记录，不上抛——兄弟命名空间继续跑
                    let failure = AppError::namespace_failed(&ctx.source_file, ctx.namespace, e);
                    error!("[文件 {}] ❌ {}", file_index, failure);
                    false
                }
            }
        }));
    }

    let mut stats = FileStats::default();

    for result in join_all(handles).await {
        match result {
            Ok(true) => stats.succeeded += 1,
            Ok(false) => stats.failed += 1,
            Err(e) => {
                error!("[文件 {}] 命名空间任务执行失败: {}", file_index, e);
                stats.failed += 1;
            }
        }
    }

    log_file_complete(file_index, &stats);

    stats
}

fn log_file_complete(file_index: usize, stats: &FileStats) {
    info!(
        "[文件 {}] 命名空间统计: 成功 {}, 失败 {}",
        file_index, stats.succeeded, stats.failed
    );
    if stats.any_success() {
        info!("[文件 {}] ✅ 文件处理完成\n", file_index);
    } else {
        error!("[文件 {}] ❌ 文件全部命名空间失败\n", file_index);
    }
}
