//! 模拟远程服务驱动的流水线测试
//!
//! 用内存模拟服务替换真实客户端，验证流水线的可测性质：
//! 产物路径、幂等覆盖、轮询次数、失败隔离、清单覆盖语义

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use revigo_batch_submit::clients::JobService;
use revigo_batch_submit::error::{AppError, AppResult, JobError};
use revigo_batch_submit::models::{
    ArtifactKind, ArtifactPaths, BatchManifest, Namespace, TermSet,
};
use revigo_batch_submit::orchestrator::process_file;
use revigo_batch_submit::services::ChartRenderer;
use revigo_batch_submit::workflow::{JobCtx, NamespaceFlow};
use revigo_batch_submit::Config;
use tokio::sync::{watch, Mutex};

/// 模拟远程服务返回的渲染脚本模板
const SCRIPT_TEMPLATE: &str = concat!(
    "pdf( file=\"revigo_treemap.pdf\", width=16, height=9 )\n",
    "treemap(\n",
    "  title = \"Revigo TreeMap\",\n",
    "  position.legend = \"none\"\n",
    ")\n",
);

/// 模拟远程服务返回的分组文档
const GROUPING_PAYLOAD: &str = r#"{"children":[{"name":"A","size":1},{"name":"B","size":2}]}"#;

/// 内存模拟批处理服务
///
/// 每个任务前 `polls_until_done` 次状态查询返回运行中，之后返回完成；
/// 指定命名空间的表格正文带嵌入式错误标记
struct MockJobService {
    polls_until_done: usize,
    failing_namespace: Option<Namespace>,
    submit_calls: AtomicUsize,
    poll_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    poll_counts: Mutex<HashMap<String, usize>>,
}

impl MockJobService {
    fn new(polls_until_done: usize) -> Self {
        Self {
            polls_until_done,
            failing_namespace: None,
            submit_calls: AtomicUsize::new(0),
            poll_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            poll_counts: Mutex::new(HashMap::new()),
        }
    }

    fn failing_for(polls_until_done: usize, namespace: Namespace) -> Self {
        Self {
            failing_namespace: Some(namespace),
            ..Self::new(polls_until_done)
        }
    }

    fn payload(&self, namespace: Namespace, kind: ArtifactKind) -> String {
        if self.failing_namespace == Some(namespace) && kind == ArtifactKind::Table {
            // 服务唯一的错误信号：正文中的错误标记
            return "error: Job with this ID does not exist".to_string();
        }
        match kind {
            ArtifactKind::Table => {
                "TermID\tName\tValue\nGO:0008150\tbiological_process\t-3.5\n".to_string()
            }
            ArtifactKind::Grouping => GROUPING_PAYLOAD.to_string(),
            ArtifactKind::Projection => {
                "TermID\tPC_0\tPC_1\tLogSize\nGO:0008150\t1.2\t-0.4\t2.1\n".to_string()
            }
            ArtifactKind::RenderScript => SCRIPT_TEMPLATE.to_string(),
        }
    }
}

#[async_trait]
impl JobService for MockJobService {
    async fn submit(&self, _term_list: &str, namespace: Namespace) -> AppResult<String> {
        let n = self.submit_calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("job-{}-{}", namespace, n))
    }

    async fn poll_status(&self, job_id: &str) -> AppResult<bool> {
        self.poll_calls.fetch_add(1, Ordering::SeqCst);
        let mut counts = self.poll_counts.lock().await;
        let count = counts.entry(job_id.to_string()).or_insert(0);
        *count += 1;
        Ok(*count <= self.polls_until_done)
    }

    async fn fetch_artifact(
        &self,
        job_id: &str,
        namespace: Namespace,
        kind: ArtifactKind,
    ) -> AppResult<String> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let payload = self.payload(namespace, kind);
        if kind.error_marker_applies() && payload.contains("error") {
            return Err(AppError::fetch_failed(job_id, kind, "响应正文包含错误标记"));
        }
        Ok(payload)
    }
}

/// 记录交接调用的渲染协作方
#[derive(Default)]
struct RecordingRenderer {
    events: Mutex<Vec<String>>,
}

impl RecordingRenderer {
    async fn events(&self) -> Vec<String> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl ChartRenderer for RecordingRenderer {
    async fn render_barplot(
        &self,
        table_path: &Path,
        title: &str,
        output_image: &Path,
        color: &str,
    ) -> AppResult<()> {
        self.events.lock().await.push(format!(
            "barplot|{}|{}|{}|{}",
            table_path.display(),
            title,
            output_image.display(),
            color
        ));
        Ok(())
    }

    async fn render_scatter(
        &self,
        projection_path: &Path,
        title: &str,
        output_image: &Path,
    ) -> AppResult<()> {
        self.events.lock().await.push(format!(
            "scatter|{}|{}|{}",
            projection_path.display(),
            title,
            output_image.display()
        ));
        Ok(())
    }

    async fn render_combined_barplot(
        &self,
        manifest: &HashMap<Namespace, PathBuf>,
        output_dir: &Path,
    ) -> AppResult<()> {
        self.events
            .lock()
            .await
            .push(format!("combined|{}|{}", manifest.len(), output_dir.display()));
        Ok(())
    }
}

/// 测试用配置：毫秒级轮询间隔，渲染脚本解释器换成总是成功的命令
fn test_config() -> Config {
    Config {
        poll_interval_ms: 1,
        rscript_command: "true".to_string(),
        ..Config::default()
    }
}

fn make_flow(
    client: Arc<MockJobService>,
    renderer: Arc<RecordingRenderer>,
    manifest: BatchManifest,
) -> Arc<NamespaceFlow> {
    Arc::new(NamespaceFlow::new(
        &test_config(),
        client,
        renderer,
        manifest,
    ))
}

fn write_input(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, "GO:0008150\t0.001\nGO:0006412\t0.0005\n").expect("写入输入文件失败");
    path
}

async fn run_flow(
    flow: &NamespaceFlow,
    source_file: &Path,
    namespace: Namespace,
) -> AppResult<()> {
    let content = std::fs::read_to_string(source_file).expect("读取输入文件失败");
    let term_set = TermSet::new(source_file.to_path_buf(), namespace, content);
    let ctx = JobCtx::new(source_file.to_path_buf(), 1, namespace);
    let (_tx, rx) = watch::channel(false);
    flow.run(&term_set, &ctx, rx).await
}

#[tokio::test]
async fn test_completed_job_writes_four_artifacts_at_predicted_paths() {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let source = write_input(dir.path(), "aa_candidates_0.01_IDs_Pvalues.txt");

    let client = Arc::new(MockJobService::new(0));
    let renderer = Arc::new(RecordingRenderer::default());
    let flow = make_flow(client, renderer.clone(), BatchManifest::new());

    run_flow(&flow, &source, Namespace::BiologicalProcess)
        .await
        .expect("流水线应当成功");

    // 命名语法预测的四个产物路径
    let results_dir = dir.path().join("results_revigo");
    let expected = [
        "aa_candidates_0.01_IDs_Pvalues_BP_table.tsv",
        "aa_candidates_0.01_IDs_Pvalues_BP_TreeMap.tsv",
        "aa_candidates_0.01_IDs_Pvalues_BP_scatterPlot.tsv",
        "aa_candidates_0.01_IDs_Pvalues_BP_Rscript.R",
    ];
    for name in expected {
        assert!(results_dir.join(name).exists(), "缺少产物文件: {}", name);
    }

    // 分组文档已扁平化
    let csv = std::fs::read_to_string(
        results_dir.join("aa_candidates_0.01_IDs_Pvalues_BP_TreeMap.tsv.csv"),
    )
    .expect("读取CSV失败");
    assert_eq!(csv, "name,size\nA,1\nB,2\n");

    // 渲染脚本替换：PDF 目的地、标题、图例参数
    let script = std::fs::read_to_string(
        results_dir.join("aa_candidates_0.01_IDs_Pvalues_BP_Rscript.R"),
    )
    .expect("读取脚本失败");
    assert!(script.contains("aa_candidates_0.01_IDs_Pvalues_BP_treemap.pdf"));
    assert!(!script.contains("revigo_treemap.pdf"));
    assert!(script.contains(r#"title = "aa_candidates_0.01_IDs_Pvalues BP TreeMap""#));
    assert!(script.contains(
        r#"position.legend = "none", fontsize.labels = c(12,15), align.labels = list(c("left","top"),c("center","center")),"#
    ));

    // 渲染协作方收到散点图与条形图交接
    let events = renderer.events().await;
    assert!(events
        .iter()
        .any(|e| e.starts_with("scatter|") && e.contains("aa candidates 0.01 BP PC_0 vs PC_1")));
    assert!(events
        .iter()
        .any(|e| e.starts_with("barplot|") && e.contains("GO Terms Bar Plot - BP") && e.contains("skyblue")));
}

#[tokio::test]
async fn test_rerun_overwrites_instead_of_accumulating() {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let source = write_input(dir.path(), "bb_universe_0.05_IDs_Pvalues.txt");

    let client = Arc::new(MockJobService::new(0));
    let renderer = Arc::new(RecordingRenderer::default());
    let flow = make_flow(client, renderer, BatchManifest::new());

    run_flow(&flow, &source, Namespace::MolecularFunction)
        .await
        .expect("第一次运行应当成功");
    run_flow(&flow, &source, Namespace::MolecularFunction)
        .await
        .expect("第二次运行应当成功");

    // 同一三元组的路径必然碰撞：4 个产物 + 1 个CSV + 图形目录
    let results_dir = dir.path().join("results_revigo");
    let entries = std::fs::read_dir(&results_dir)
        .expect("读取结果目录失败")
        .count();
    assert_eq!(entries, 6);
}

#[tokio::test]
async fn test_n_running_polls_cause_n_plus_one_status_calls() {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let source = write_input(dir.path(), "cc_candidates_0.01_IDs_Pvalues.txt");

    let client = Arc::new(MockJobService::new(3));
    let renderer = Arc::new(RecordingRenderer::default());
    let flow = make_flow(client.clone(), renderer, BatchManifest::new());

    run_flow(&flow, &source, Namespace::CellularComponent)
        .await
        .expect("流水线应当成功");

    // N 次运行中 + 1 次完成 = N+1 次状态查询，产物获取恰好一轮 4 次
    assert_eq!(client.poll_calls.load(Ordering::SeqCst), 4);
    assert_eq!(client.fetch_calls.load(Ordering::SeqCst), 4);
    assert_eq!(client.submit_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_error_marker_fails_one_namespace_but_not_siblings() {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let source = write_input(dir.path(), "dd_candidates_0.01_IDs_Pvalues.txt");

    let client = Arc::new(MockJobService::failing_for(0, Namespace::CellularComponent));
    let renderer = Arc::new(RecordingRenderer::default());
    let flow = make_flow(client, renderer, BatchManifest::new());

    let (_tx, rx) = watch::channel(false);
    let stats = process_file(flow, source.clone(), 1, rx).await;

    assert_eq!(stats.succeeded, 2);
    assert_eq!(stats.failed, 1);

    // 失败命名空间零产物落盘，兄弟命名空间正常完成
    let results_dir = dir.path().join("results_revigo");
    let names: Vec<String> = std::fs::read_dir(&results_dir)
        .expect("读取结果目录失败")
        .map(|e| e.expect("目录项读取失败").file_name().to_string_lossy().into_owned())
        .collect();
    assert!(!names.iter().any(|n| n.contains("_CC_")));
    assert!(names.iter().any(|n| n.contains("_BP_table")));
    assert!(names.iter().any(|n| n.contains("_MF_table")));
}

#[tokio::test]
async fn test_manifest_keeps_last_writer_per_namespace() {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let first = write_input(dir.path(), "f1_candidates_0.01_IDs_Pvalues.txt");
    let second = write_input(dir.path(), "f2_candidates_0.01_IDs_Pvalues.txt");

    let client = Arc::new(MockJobService::new(0));
    let renderer = Arc::new(RecordingRenderer::default());
    let manifest = BatchManifest::new();
    let flow = make_flow(client, renderer, manifest.clone());

    run_flow(&flow, &first, Namespace::BiologicalProcess)
        .await
        .expect("第一个文件应当成功");
    run_flow(&flow, &second, Namespace::BiologicalProcess)
        .await
        .expect("第二个文件应当成功");

    // 同一命名空间后写者覆盖，清单里只剩一个 BP 条目
    let snapshot = manifest.snapshot().await;
    assert_eq!(snapshot.len(), 1);
    assert_eq!(
        snapshot.get(&Namespace::BiologicalProcess),
        Some(&ArtifactPaths::new(&second, Namespace::BiologicalProcess).table)
    );
}

#[tokio::test]
async fn test_shutdown_unblocks_waiting_poller() {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let source = write_input(dir.path(), "ee_candidates_0.01_IDs_Pvalues.txt");

    // 远程任务永不完成，轮询间隔放大到秒级
    let client = Arc::new(MockJobService::new(usize::MAX));
    let renderer = Arc::new(RecordingRenderer::default());
    let config = Config {
        poll_interval_ms: 1000,
        rscript_command: "true".to_string(),
        ..Config::default()
    };
    let flow = Arc::new(NamespaceFlow::new(
        &config,
        client,
        renderer,
        BatchManifest::new(),
    ));

    let (tx, rx) = watch::channel(false);
    let content = std::fs::read_to_string(&source).expect("读取输入文件失败");
    let term_set = TermSet::new(source.clone(), Namespace::BiologicalProcess, content);
    let ctx = JobCtx::new(source.clone(), 1, Namespace::BiologicalProcess);

    let handle = tokio::spawn(async move { flow.run(&term_set, &ctx, rx).await });

    // 给流水线时间进入轮询等待，再广播停机
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    tx.send(true).expect("发送停机信号失败");

    let result = handle.await.expect("任务执行失败");
    match result {
        Err(AppError::Job(JobError::Cancelled { .. })) => {}
        other => panic!("期望取消错误，实际为 {:?}", other.map(|_| ())),
    }
}
