//! 批次清单
//!
//! 跨文件共享的 命名空间 → 表格产物路径 映射，交给跨文件汇总图协作方。
//! 键是固定的命名空间标签，同一命名空间后写者覆盖先写者——这是既定
//! 设计约束，不做"修正"

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::models::namespace::Namespace;

/// 批次清单
///
/// 唯一的共享可变状态，只通过本类型的同步访问器更新，
/// 工作任务不直接持有内部映射
#[derive(Debug, Clone, Default)]
pub struct BatchManifest {
    inner: Arc<Mutex<HashMap<Namespace, PathBuf>>>,
}

impl BatchManifest {
    /// 创建空清单
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记一个命名空间的表格产物路径（后写者覆盖）
    pub async fn register_table(&self, namespace: Namespace, table_path: PathBuf) {
        let mut inner = self.inner.lock().await;
        inner.insert(namespace, table_path);
    }

    /// 取当前清单快照
    pub async fn snapshot(&self) -> HashMap<Namespace, PathBuf> {
        self.inner.lock().await.clone()
    }

    /// 清单是否为空
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}
