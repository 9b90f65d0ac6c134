//! 结果产物数据模型
//!
//! 一个完成的任务固定产出四类产物；产物落盘路径由
//! (输入文件, 命名空间, 产物类型) 确定性推导，重复运行覆盖同一路径

use std::path::{Path, PathBuf};

use crate::models::namespace::Namespace;
use crate::models::term_set;

/// 结果目录名（位于输入文件所在目录下）
pub const RESULTS_DIR_NAME: &str = "results_revigo";

/// 图形产物子目录名
pub const GRAPHICS_DIR_NAME: &str = "obtained_graphics";

/// 产物类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// 表格汇总（TSV）
    Table,
    /// 层级分组文档（JSON 树）
    Grouping,
    /// 二维投影（TSV 坐标）
    Projection,
    /// 渲染脚本（R 脚本模板）
    RenderScript,
}

impl ArtifactKind {
    /// 远程服务的结果类型参数
    pub fn remote_type(self) -> &'static str {
        match self {
            ArtifactKind::Table => "table",
            ArtifactKind::Grouping => "TreeMap",
            ArtifactKind::Projection => "scatterPlot",
            ArtifactKind::RenderScript => "RTreeMap",
        }
    }

    /// 文件名中使用的类型标签
    pub fn file_label(self) -> &'static str {
        match self {
            ArtifactKind::Table => "table",
            ArtifactKind::Grouping => "TreeMap",
            ArtifactKind::Projection => "scatterPlot",
            ArtifactKind::RenderScript => "Rscript",
        }
    }

    /// 落盘扩展名（分组文档按原始 JSON 正文落盘，沿用 tsv 扩展名）
    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::RenderScript => "R",
            _ => "tsv",
        }
    }

    /// 该类型的响应正文是否适用嵌入式错误标记检查
    ///
    /// 渲染脚本正文本身就包含 error 字样，不参与检查
    pub fn error_marker_applies(self) -> bool {
        !matches!(self, ArtifactKind::RenderScript)
    }

    /// 全部产物类型（任务完成前必须全部取回）
    pub fn all() -> [ArtifactKind; 4] {
        [
            ArtifactKind::Table,
            ArtifactKind::Grouping,
            ArtifactKind::Projection,
            ArtifactKind::RenderScript,
        ]
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.remote_type())
    }
}

/// 一个完成任务的四个产物正文
#[derive(Debug, Clone)]
pub struct ArtifactSet {
    pub table: String,
    pub grouping: String,
    pub projection: String,
    pub render_script: String,
}

impl ArtifactSet {
    /// 按类型取产物正文
    pub fn payload(&self, kind: ArtifactKind) -> &str {
        match kind {
            ArtifactKind::Table => &self.table,
            ArtifactKind::Grouping => &self.grouping,
            ArtifactKind::Projection => &self.projection,
            ArtifactKind::RenderScript => &self.render_script,
        }
    }
}

/// 一个 (输入文件, 命名空间) 对的全部落盘路径
///
/// 同一三元组的两次推导必然得到相同路径，重复运行覆盖而不是累积
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    /// 结果目录：{输入文件所在目录}/results_revigo
    pub results_dir: PathBuf,
    /// 图形目录：{结果目录}/obtained_graphics
    pub graphics_dir: PathBuf,
    pub table: PathBuf,
    pub grouping: PathBuf,
    pub projection: PathBuf,
    pub render_script: PathBuf,
    /// 渲染脚本产出 PDF 的文件名（替换进脚本时解析为绝对路径）
    pub pdf_file_name: String,
    /// 分组文档扁平化后的 CSV 路径
    pub grouping_csv: PathBuf,
    /// 投影散点图交接路径
    pub scatter_png: PathBuf,
    /// 条形图交接路径
    pub barplot_png: PathBuf,
}

impl ArtifactPaths {
    /// 由输入文件和命名空间推导全部路径
    pub fn new(source_file: &Path, namespace: Namespace) -> Self {
        let file_base = term_set::file_base(source_file);
        let ns = namespace.label();

        let results_dir = source_file
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(RESULTS_DIR_NAME);
        let graphics_dir = results_dir.join(GRAPHICS_DIR_NAME);

        let artifact_path = |kind: ArtifactKind| {
            results_dir.join(format!(
                "{}_{}_{}.{}",
                file_base,
                ns,
                kind.file_label(),
                kind.extension()
            ))
        };

        let grouping = artifact_path(ArtifactKind::Grouping);
        let grouping_csv = PathBuf::from(format!("{}.csv", grouping.display()));

        Self {
            table: artifact_path(ArtifactKind::Table),
            projection: artifact_path(ArtifactKind::Projection),
            render_script: artifact_path(ArtifactKind::RenderScript),
            pdf_file_name: format!("{}_{}_treemap.pdf", file_base, ns),
            grouping,
            grouping_csv,
            scatter_png: graphics_dir.join(format!("{}_{}_scatterplot.png", file_base, ns)),
            barplot_png: graphics_dir.join(format!("{}_{}_barplot.png", file_base, ns)),
            results_dir,
            graphics_dir,
        }
    }

    /// 按类型取产物路径
    pub fn path(&self, kind: ArtifactKind) -> &Path {
        match kind {
            ArtifactKind::Table => &self.table,
            ArtifactKind::Grouping => &self.grouping,
            ArtifactKind::Projection => &self.projection,
            ArtifactKind::RenderScript => &self.render_script,
        }
    }
}
