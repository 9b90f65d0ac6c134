//! 图形渲染协作方边界 - 业务能力层
//!
//! 图表绘制本身不在本仓库范围内；这里只定义核心向渲染协作方
//! 交接路径与标签的接口。核心产出产物文件和文件名，渲染逻辑
//! 由实现方自行决定

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::error::AppResult;
use crate::models::Namespace;

/// 图形渲染协作方接口
#[async_trait]
pub trait ChartRenderer: Send + Sync {
    /// 渲染单个命名空间的条形图
    ///
    /// # 参数
    /// - `table_path`: 表格产物路径
    /// - `title`: 图标题
    /// - `output_image`: 输出图像路径
    /// - `color`: 命名空间固定颜色
    async fn render_barplot(
        &self,
        table_path: &Path,
        title: &str,
        output_image: &Path,
        color: &str,
    ) -> AppResult<()>;

    /// 渲染单个命名空间的二维投影散点图
    async fn render_scatter(
        &self,
        projection_path: &Path,
        title: &str,
        output_image: &Path,
    ) -> AppResult<()>;

    /// 用最终批次清单渲染跨文件汇总条形图（每次运行至多调用一次）
    async fn render_combined_barplot(
        &self,
        manifest: &HashMap<Namespace, PathBuf>,
        output_dir: &Path,
    ) -> AppResult<()>;
}

/// 默认渲染协作方：只记录交接，不产出图像
///
/// 图表生成在本仓库之外完成；默认实现保证流水线在没有接入
/// 真实渲染方时也能完整运转
pub struct NoopRenderer;

#[async_trait]
impl ChartRenderer for NoopRenderer {
    async fn render_barplot(
        &self,
        table_path: &Path,
        title: &str,
        output_image: &Path,
        color: &str,
    ) -> AppResult<()> {
        debug!(
            "条形图交接: 表格 {}, 标题 {}, 输出 {}, 颜色 {}",
            table_path.display(),
            title,
            output_image.display(),
            color
        );
        Ok(())
    }

    async fn render_scatter(
        &self,
        projection_path: &Path,
        title: &str,
        output_image: &Path,
    ) -> AppResult<()> {
        debug!(
            "散点图交接: 投影 {}, 标题 {}, 输出 {}",
            projection_path.display(),
            title,
            output_image.display()
        );
        Ok(())
    }

    async fn render_combined_barplot(
        &self,
        manifest: &HashMap<Namespace, PathBuf>,
        output_dir: &Path,
    ) -> AppResult<()> {
        debug!(
            "汇总条形图交接: {} 个命名空间, 输出目录 {}",
            manifest.len(),
            output_dir.display()
        );
        Ok(())
    }
}
