//! 批量文件处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量输入文件的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：启动日志、创建服务客户端与流水线
//! 2. **输入发现**：按后缀约定递归扫描待处理的输入文件
//! 3. **并发控制**：使用 Semaphore 限制同时处理的文件数量
//! 4. **停机处理**：Ctrl-C 后不再启动新任务，解除在途轮询等待
//! 5. **全局统计**：汇总所有文件的处理结果并换算退出状态
//! 6. **汇总交接**：批次结束后把批次清单交给汇总图协作方（仅一次）
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单个文件的细节，向下委托 file_processor
//! - **单层资源池**：文件级一个全局有界池，文件内是轻量三任务组，
//!   不嵌套第二层池
//! - **失败隔离**：单文件、单命名空间的失败从不波及兄弟任务

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{watch, Semaphore};
use tracing::{error, info, warn};

use crate::clients::{JobService, RevigoClient};
use crate::config::Config;
use crate::models::{discover_input_files, BatchManifest};
use crate::orchestrator::file_processor;
use crate::services::{ChartRenderer, NoopRenderer};
use crate::utils::logging::init_log_file;
use crate::workflow::NamespaceFlow;

/// 一次批量运行的最终结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// 全部命名空间任务成功
    AllSucceeded,
    /// 至少一个命名空间任务成功
    PartialSuccess,
    /// 没有任何命名空间任务成功
    TotalFailure,
}

impl BatchOutcome {
    /// 换算进程退出码：0 全部成功，1 部分成功，2 全部失败
    pub fn exit_code(self) -> ExitCode {
        match self {
            BatchOutcome::AllSucceeded => ExitCode::SUCCESS,
            BatchOutcome::PartialSuccess => ExitCode::from(1),
            BatchOutcome::TotalFailure => ExitCode::from(2),
        }
    }
}

/// 应用主结构
pub struct App {
    config: Config,
    flow: Arc<NamespaceFlow>,
    manifest: BatchManifest,
    renderer: Arc<dyn ChartRenderer>,
    shutdown_tx: Arc<watch::Sender<bool>>,
    shutdown_rx: watch::Receiver<bool>,
}

impl App {
    /// 初始化应用（使用真实服务客户端与默认渲染协作方）
    pub fn initialize(config: Config) -> Result<Self> {
        let client: Arc<dyn JobService> = Arc::new(RevigoClient::new(&config));
        let renderer: Arc<dyn ChartRenderer> = Arc::new(NoopRenderer);
        Self::with_collaborators(config, client, renderer)
    }

    /// 用指定协作方初始化应用
    pub fn with_collaborators(
        config: Config,
        client: Arc<dyn JobService>,
        renderer: Arc<dyn ChartRenderer>,
    ) -> Result<Self> {
        // 初始化日志文件
        init_log_file(&config.output_log_file)?;

        log_startup(&config);

        let manifest = BatchManifest::new();
        let flow = Arc::new(NamespaceFlow::new(
            &config,
            client,
            renderer.clone(),
            manifest.clone(),
        ));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            config,
            flow,
            manifest,
            renderer,
            shutdown_tx: Arc::new(shutdown_tx),
            shutdown_rx,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<BatchOutcome> {
        self.listen_for_shutdown();

        // 发现全部待处理的输入文件（发现失败在任何远程调用之前中止）
        info!("\n📁 正在扫描待处理的输入文件...");
        let input_files =
            discover_input_files(&self.config.input_folder, &self.config.input_suffix).await?;

        if input_files.is_empty() {
            anyhow::bail!(
                "在 {} 下没有找到以 {} 结尾的输入文件",
                self.config.input_folder,
                self.config.input_suffix
            );
        }

        let total_files = input_files.len();
        log_files_loaded(total_files, self.config.max_concurrent_files);

        // 处理所有文件
        let stats = self.process_all_files(input_files).await?;

        // 批次结束后把清单交给汇总图协作方（仅一次）
        self.hand_off_combined_barplot().await;

        // 输出最终统计
        print_final_stats(&stats, &self.config);

        Ok(stats.outcome())
    }

    /// 监听 Ctrl-C，收到后广播停机信号
    fn listen_for_shutdown(&self) {
        let shutdown_tx = self.shutdown_tx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("⚠️ 收到停机信号：不再启动新任务，在途任务解除等待");
                let _ = shutdown_tx.send(true);
            }
        });
    }

    /// 在全局有界池中处理所有文件
    async fn process_all_files(
        &self,
        input_files: Vec<std::path::PathBuf>,
    ) -> Result<BatchStats> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_files));
        let mut stats = BatchStats {
            files_total: input_files.len(),
            ..Default::default()
        };

        let mut handles = Vec::new();

        for (idx, source_file) in input_files.into_iter().enumerate() {
            let file_index = idx + 1;

            // 停机后停止启动新的文件任务（在途任务自然跑完）
            if *self.shutdown_rx.borrow() {
                warn!("⚠️ 停机中，跳过剩余 {} 个文件", stats.files_total - idx);
                stats.files_skipped = stats.files_total - idx;
                break;
            }

            let permit = semaphore.clone().acquire_owned().await?;
            let flow = self.flow.clone();
            let shutdown = self.shutdown_rx.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                file_processor::process_file(flow, source_file, file_index, shutdown).await
            });
            handles.push((file_index, handle));
        }

        // 等待全部文件任务完成
        for (file_index, handle) in handles {
            match handle.await {
                Ok(file_stats) => {
                    stats.namespaces_succeeded += file_stats.succeeded;
                    stats.namespaces_failed += file_stats.failed;
                    if file_stats.any_success() {
                        stats.files_with_success += 1;
                    }
                }
                Err(e) => {
                    error!("[文件 {}] 任务执行失败: {}", file_index, e);
                    stats.namespaces_failed += crate::models::Namespace::all().len();
                }
            }
        }

        Ok(stats)
    }

    /// 把最终批次清单交给跨文件汇总图协作方
    async fn hand_off_combined_barplot(&self) {
        if self.manifest.is_empty().await {
            warn!("⚠️ 批次清单为空，跳过汇总条形图交接");
            return;
        }

        let snapshot = self.manifest.snapshot().await;
        let output_dir = Path::new(&self.config.combined_graphics_folder);

        match self
            .renderer
            .render_combined_barplot(&snapshot, output_dir)
            .await
        {
            Ok(()) => info!("✓ 汇总条形图交接完成 ({} 个命名空间)", snapshot.len()),
            Err(e) => warn!("⚠️ 汇总条形图交接失败: {}", e),
        }
    }
}

/// 批次处理统计
#[derive(Debug, Default)]
struct BatchStats {
    files_total: usize,
    files_with_success: usize,
    files_skipped: usize,
    namespaces_succeeded: usize,
    namespaces_failed: usize,
}

impl BatchStats {
    fn outcome(&self) -> BatchOutcome {
        if self.namespaces_succeeded == 0 {
            BatchOutcome::TotalFailure
        } else if self.namespaces_failed == 0 && self.files_skipped == 0 {
            BatchOutcome::AllSucceeded
        } else {
            BatchOutcome::PartialSuccess
        }
    }
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - REVIGO 批量提交模式");
    info!("📊 最大并发文件数: {}", config.max_concurrent_files);
    info!("🌐 服务地址: {}", config.revigo_base_url);
    info!("{}", "=".repeat(60));
}

fn log_files_loaded(total: usize, max_concurrent: usize) {
    info!("✓ 找到 {} 个待处理的输入文件", total);
    info!("📋 同时最多处理 {} 个文件，每个文件三路命名空间并发\n", max_concurrent);
}

fn print_final_stats(stats: &BatchStats, config: &Config) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!(
        "📄 文件: {}/{} 至少一个命名空间成功",
        stats.files_with_success, stats.files_total
    );
    if stats.files_skipped > 0 {
        info!("⏭️ 因停机跳过: {}", stats.files_skipped);
    }
    info!("✅ 命名空间任务成功: {}", stats.namespaces_succeeded);
    info!("❌ 命名空间任务失败: {}", stats.namespaces_failed);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", config.output_log_file);
}
