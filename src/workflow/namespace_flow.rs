//! 命名空间流水线 - 流程层
//!
//! 核心职责：定义一个 (文件, 命名空间) 对的完整处理流程
//!
//! 流程顺序：
//! 1. 提交词条集 → 获得任务
//! 2. 轮询到终态并取回四个产物
//! 3. 写入产物（含渲染脚本替换）
//! 4. 运行外部渲染脚本（失败不致命）
//! 5. 向渲染协作方交接散点图与条形图
//! 6. 分组文档扁平化为 CSV
//! 7. 把表格路径登记进批次清单

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::clients::JobService;
use crate::config::Config;
use crate::error::AppResult;
use crate::models::{ArtifactPaths, BatchManifest, Job, TermSet};
use crate::services::{ArtifactWriter, ChartRenderer, JobPoller, RscriptRunner};
use crate::utils::logging::truncate_text;
use crate::workflow::job_ctx::JobCtx;

/// 命名空间流水线
///
/// - 编排单个命名空间任务的完整流程
/// - 不做跨任务调度（那是编排层的事）
/// - 失败以带 (文件, 命名空间) 标签的错误上抛，由调用方记录
pub struct NamespaceFlow {
    client: Arc<dyn JobService>,
    poller: JobPoller,
    writer: ArtifactWriter,
    rscript: RscriptRunner,
    renderer: Arc<dyn ChartRenderer>,
    manifest: BatchManifest,
    verbose_logging: bool,
}

impl NamespaceFlow {
    /// 创建新的命名空间流水线
    pub fn new(
        config: &Config,
        client: Arc<dyn JobService>,
        renderer: Arc<dyn ChartRenderer>,
        manifest: BatchManifest,
    ) -> Self {
        let poll_timeout = match config.poll_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Self {
            poller: JobPoller::new(
                client.clone(),
                Duration::from_millis(config.poll_interval_ms),
                poll_timeout,
            ),
            client,
            writer: ArtifactWriter::new(),
            rscript: RscriptRunner::new(config.rscript_command.clone()),
            renderer,
            manifest,
            verbose_logging: config.verbose_logging,
        }
    }

    /// 执行一个 (文件, 命名空间) 对的完整流程
    pub async fn run(
        &self,
        term_set: &TermSet,
        ctx: &JobCtx,
        mut shutdown: watch::Receiver<bool>,
    ) -> AppResult<()> {
        if self.verbose_logging {
            info!(
                "[文件 {}] 词条集预览 ({}): {}",
                ctx.file_index,
                ctx.namespace,
                truncate_text(&term_set.content, 80)
            );
        }

        // ========== 流程 1: 提交 ==========
        let job_id = self
            .client
            .submit(&term_set.content, ctx.namespace)
            .await?;

        info!(
            "[文件 {}] 📤 任务已提交, ID {} (命名空间 {})",
            ctx.file_index, job_id, ctx.namespace
        );

        let mut job = Job::new(job_id, ctx.namespace, ctx.source_file.clone());

        // ========== 流程 2: 轮询到终态并取回产物 ==========
        let artifacts = self.poller.run(&mut job, &mut shutdown).await?;

        info!(
            "[文件 {}] ✓ 任务 {} 已完成, 四个产物全部取回",
            ctx.file_index, job.job_id
        );

        // ========== 流程 3: 写入产物 ==========
        let paths = ArtifactPaths::new(&ctx.source_file, ctx.namespace);
        let file_base = term_set.file_base();

        self.writer
            .write_all(&paths, &artifacts, &file_base, ctx.namespace)
            .await?;

        // ========== 流程 4: 运行外部渲染脚本 ==========
        self.run_render_script(&paths, ctx).await;

        // ========== 流程 5: 渲染协作方交接 ==========
        self.hand_off_graphics(term_set, &paths, ctx).await;

        // ========== 流程 6: 分组文档扁平化 ==========
        crate::services::grouping_csv::write_grouping_csv(&artifacts.grouping, &paths.grouping_csv)
            .await?;

        // ========== 流程 7: 登记批次清单 ==========
        self.manifest
            .register_table(ctx.namespace, paths.table.clone())
            .await;

        info!("[文件 {}] ✅ 命名空间 {} 处理完成", ctx.file_index, ctx.namespace);

        Ok(())
    }

    /// 运行替换后的渲染脚本
    ///
    /// 脚本是外部协作方，启动失败或非零退出只记警告，不影响流水线
    async fn run_render_script(&self, paths: &ArtifactPaths, ctx: &JobCtx) {
        info!(
            "[文件 {}] 📋 运行渲染脚本 {}...",
            ctx.file_index,
            paths.render_script.display()
        );

        match self.rscript.run(&paths.render_script).await {
            Ok(true) => info!("[文件 {}] ✓ 渲染脚本执行完成", ctx.file_index),
            Ok(false) => warn!(
                "[文件 {}] ⚠️ 渲染脚本以非零状态退出: {}",
                ctx.file_index,
                paths.render_script.display()
            ),
            Err(e) => warn!("[文件 {}] ⚠️ 渲染脚本无法启动: {}", ctx.file_index, e),
        }
    }

    /// 把散点图与条形图路径交给渲染协作方
    ///
    /// 渲染是外部协作方的职责，交接失败只记警告
    async fn hand_off_graphics(&self, term_set: &TermSet, paths: &ArtifactPaths, ctx: &JobCtx) {
        let ns = ctx.namespace;

        let scatter_title = format!("{} {} PC_0 vs PC_1", term_set.derived_label(), ns);
        if let Err(e) = self
            .renderer
            .render_scatter(&paths.projection, &scatter_title, &paths.scatter_png)
            .await
        {
            warn!("[文件 {}] ⚠️ 散点图交接失败: {}", ctx.file_index, e);
        }

        let barplot_title = format!("GO Terms Bar Plot - {}", ns);
        if let Err(e) = self
            .renderer
            .render_barplot(&paths.table, &barplot_title, &paths.barplot_png, ns.color())
            .await
        {
            warn!("[文件 {}] ⚠️ 条形图交接失败: {}", ctx.file_index, e);
        }
    }
}
