//! # Revigo Batch Submit
//!
//! 一个把打分 GO 词条集批量提交到 REVIGO 语义聚类服务的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 远程服务 HTTP 表面的无状态包装
//! - `RevigoClient` - 提交 / 状态查询 / 结果获取，不含任何重试策略
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个任务
//! - `JobPoller` - 驱动任务状态机到终态的能力
//! - `ArtifactWriter` - 产物落盘与渲染脚本替换能力
//! - `RscriptRunner` - 运行外部渲染脚本能力
//! - `grouping_csv` - 分组文档扁平化能力
//! - `ChartRenderer` - 图形渲染协作方边界
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个 (文件, 命名空间) 对"的完整处理流程
//! - `JobCtx` - 上下文封装（文件 + 命名空间）
//! - `NamespaceFlow` - 流程编排（提交 → 轮询 → 落盘 → 交接）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量文件处理器，管理并发和停机
//! - `orchestrator/file_processor` - 单个文件处理器，三路命名空间扇出
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{JobService, RevigoClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{
    ArtifactKind, ArtifactPaths, ArtifactSet, BatchManifest, Job, JobState, Namespace, TermSet,
};
pub use orchestrator::{process_file, App, BatchOutcome};
pub use services::{ArtifactWriter, ChartRenderer, JobPoller, NoopRenderer, RscriptRunner};
pub use workflow::{JobCtx, NamespaceFlow};
