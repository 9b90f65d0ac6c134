//! 产物写入服务 - 业务能力层
//!
//! ## 职责
//! - 把取回的产物正文原样写到确定性路径上（重复运行覆盖）
//! - 按需创建结果目录和图形目录（目录已存在不算错误）
//! - 落盘渲染脚本前做三处精确文本替换，使脚本自包含
//!
//! 替换按精确匹配进行；远程服务的输出格式没有契约保证，
//! 预期字面量缺失时记一条警告后按原文落盘，不报错

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult, FileError};
use crate::models::{ArtifactKind, ArtifactPaths, ArtifactSet, Namespace};

/// 渲染脚本中硬编码的 PDF 输出指令
const PDF_DIRECTIVE: &str = r#"pdf( file="revigo_treemap.pdf", width=16, height=9 )"#;

/// 渲染脚本中硬编码的标题指令
const TITLE_DIRECTIVE: &str = r#"title = "Revigo TreeMap""#;

/// 渲染脚本中的图例布局指令（追加格式参数，保留原有参数）
const LEGEND_DIRECTIVE: &str = r#"position.legend = "none""#;

/// 追加到图例布局指令后的字号与对齐参数
const LEGEND_AUGMENT: &str = r#"position.legend = "none", fontsize.labels = c(12,15), align.labels = list(c("left","top"),c("center","center")),"#;

/// 一条精确匹配替换规则
struct Substitution {
    needle: String,
    replacement: String,
}

/// 产物写入服务
pub struct ArtifactWriter;

impl ArtifactWriter {
    /// 创建产物写入服务
    pub fn new() -> Self {
        Self
    }

    /// 写入一个完成任务的全部产物
    ///
    /// # 参数
    /// - `paths`: 该 (文件, 命名空间) 对的全部落盘路径
    /// - `artifacts`: 四个产物正文
    /// - `file_base`: 输入文件基名（用于脚本标题）
    /// - `namespace`: 命名空间（用于脚本标题）
    pub async fn write_all(
        &self,
        paths: &ArtifactPaths,
        artifacts: &ArtifactSet,
        file_base: &str,
        namespace: Namespace,
    ) -> AppResult<()> {
        create_dir(&paths.results_dir).await?;
        create_dir(&paths.graphics_dir).await?;

        for kind in [
            ArtifactKind::Table,
            ArtifactKind::Grouping,
            ArtifactKind::Projection,
        ] {
            write_payload(paths.path(kind), artifacts.payload(kind)).await?;
            info!("{} 结果已写入 {}", kind, paths.path(kind).display());
        }

        // 目录此时必然存在，解析出替换进脚本的绝对 PDF 目的地
        let pdf_destination = resolve_pdf_destination(&paths.results_dir, &paths.pdf_file_name)?;

        let script = apply_substitutions(
            &artifacts.render_script,
            &script_substitutions(&pdf_destination, file_base, namespace),
        );

        write_payload(&paths.render_script, &script).await?;
        info!("渲染脚本已写入 {}", paths.render_script.display());

        Ok(())
    }
}

impl Default for ArtifactWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// 渲染脚本的三条替换规则
fn script_substitutions(
    pdf_destination: &Path,
    file_base: &str,
    namespace: Namespace,
) -> Vec<Substitution> {
    vec![
        Substitution {
            needle: PDF_DIRECTIVE.to_string(),
            replacement: format!(
                r#"pdf( file="{}", width=16, height=9 )"#,
                pdf_destination.display()
            ),
        },
        Substitution {
            needle: TITLE_DIRECTIVE.to_string(),
            replacement: format!(
                r#"title = "{} {} TreeMap""#,
                file_base,
                namespace.label()
            ),
        },
        Substitution {
            needle: LEGEND_DIRECTIVE.to_string(),
            replacement: LEGEND_AUGMENT.to_string(),
        },
    ]
}

/// 按顺序应用精确匹配替换；缺失的字面量记警告后跳过
fn apply_substitutions(payload: &str, substitutions: &[Substitution]) -> String {
    let mut result = payload.to_string();

    for sub in substitutions {
        if result.contains(&sub.needle) {
            result = result.replace(&sub.needle, &sub.replacement);
        } else {
            warn!("渲染脚本中未找到预期字面量，按原文落盘: {}", sub.needle);
        }
    }

    result
}

/// 解析 PDF 目的地的绝对路径
fn resolve_pdf_destination(results_dir: &Path, pdf_file_name: &str) -> AppResult<PathBuf> {
    let absolute_dir = std::fs::canonicalize(results_dir).map_err(|e| {
        AppError::File(FileError::CreateDirFailed {
            path: results_dir.display().to_string(),
            source: Box::new(e),
        })
    })?;
    Ok(absolute_dir.join(pdf_file_name))
}

/// 创建目录（目录已存在不算错误）
async fn create_dir(path: &Path) -> AppResult<()> {
    fs::create_dir_all(path).await.map_err(|e| {
        AppError::File(FileError::CreateDirFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })
    })?;
    debug!("目录就绪: {}", path.display());
    Ok(())
}

/// 把正文原样写到指定路径（覆盖写）
async fn write_payload(path: &Path, payload: &str) -> AppResult<()> {
    fs::write(path, payload)
        .await
        .map_err(|e| AppError::file_write_failed(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// 模拟远程服务返回的渲染脚本片段
    fn sample_script() -> String {
        [
            r#"pdf( file="revigo_treemap.pdf", width=16, height=9 )"#,
            r#"treemap("#,
            r#"  title = "Revigo TreeMap","#,
            r#"  position.legend = "none""#,
            r#")"#,
        ]
        .join("\n")
    }

    #[test]
    fn test_substitutions_rewrite_all_three_directives() {
        let subs = script_substitutions(
            Path::new("/data/results_revigo/aa_BP_treemap.pdf"),
            "aa_candidates_0.01_IDs_Pvalues",
            Namespace::BiologicalProcess,
        );
        let result = apply_substitutions(&sample_script(), &subs);

        assert!(result.contains(r#"pdf( file="/data/results_revigo/aa_BP_treemap.pdf", width=16, height=9 )"#));
        assert!(result.contains(r#"title = "aa_candidates_0.01_IDs_Pvalues BP TreeMap""#));
        // 原有参数保留，新参数追加在后
        assert!(result.contains(
            r#"position.legend = "none", fontsize.labels = c(12,15), align.labels = list(c("left","top"),c("center","center")),"#
        ));
        assert!(!result.contains("revigo_treemap.pdf"));
    }

    #[test]
    fn test_missing_literal_is_not_fatal() {
        let payload = "completely unrelated script body";
        let subs = script_substitutions(
            Path::new("/tmp/out.pdf"),
            "base",
            Namespace::MolecularFunction,
        );
        let result = apply_substitutions(payload, &subs);

        // 预期字面量缺失时按原文落盘
        assert_eq!(result, payload);
    }

    #[test]
    fn test_write_all_creates_four_files() {
        tokio_test::block_on(async {
            let dir = tempfile::tempdir().expect("创建临时目录失败");
            let source_file = dir.path().join("aa_candidates_0.01_IDs_Pvalues.txt");
            std::fs::write(&source_file, "GO:0008150\t0.001\n").expect("写入输入文件失败");

            let paths = ArtifactPaths::new(&source_file, Namespace::CellularComponent);
            let artifacts = ArtifactSet {
                table: "TermID\tName\n".to_string(),
                grouping: r#"{"children":[]}"#.to_string(),
                projection: "TermID\tPC_0\tPC_1\n".to_string(),
                render_script: sample_script(),
            };

            let writer = ArtifactWriter::new();
            writer
                .write_all(
                    &paths,
                    &artifacts,
                    "aa_candidates_0.01_IDs_Pvalues",
                    Namespace::CellularComponent,
                )
                .await
                .expect("写入产物失败");

            for kind in ArtifactKind::all() {
                assert!(paths.path(kind).exists(), "缺少产物文件: {}", kind);
            }

            let script = std::fs::read_to_string(&paths.render_script).expect("读取脚本失败");
            assert!(script.contains("aa_candidates_0.01_IDs_Pvalues_CC_treemap.pdf"));
        });
    }
}
