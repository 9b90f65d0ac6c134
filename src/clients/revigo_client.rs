//! REVIGO 批处理服务客户端
//!
//! 封装远程服务 HTTP 表面的无状态包装：提交、查询状态、按类型取结果。
//! 本层不做任何重试、退避或熔断——全部策略位于轮询器和流程层

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult};
use crate::models::{ArtifactKind, Namespace};

/// 响应正文中的嵌入式错误标记
///
/// 服务没有独立的错误状态码，正文子串是唯一的错误信号
const ERROR_MARKER: &str = "error";

/// 远程批处理服务能力
///
/// 真实实现是 [`RevigoClient`]；测试用模拟服务替换
#[async_trait]
pub trait JobService: Send + Sync {
    /// 提交一个词条集，返回服务分配的任务ID
    async fn submit(&self, term_list: &str, namespace: Namespace) -> AppResult<String>;

    /// 查询任务是否仍在运行；本层不重试
    async fn poll_status(&self, job_id: &str) -> AppResult<bool>;

    /// 取回一个命名空间下指定类型的结果正文
    async fn fetch_artifact(
        &self,
        job_id: &str,
        namespace: Namespace,
        kind: ArtifactKind,
    ) -> AppResult<String>;
}

/// REVIGO 服务客户端
pub struct RevigoClient {
    client: reqwest::Client,
    base_url: String,
    cutoff: String,
    value_type: String,
    species_taxon: String,
    measure: String,
}

impl RevigoClient {
    /// 创建新的服务客户端
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.revigo_base_url.clone(),
            cutoff: config.cutoff.clone(),
            value_type: config.value_type.clone(),
            species_taxon: config.species_taxon.clone(),
            measure: config.measure.clone(),
        }
    }

    fn submit_endpoint(&self) -> String {
        format!("{}/StartJob", self.base_url)
    }

    fn query_endpoint(&self) -> String {
        format!("{}/QueryJob", self.base_url)
    }

    /// 从提交响应中提取任务ID（数字或字符串都按原样转为字符串返回）
    fn extract_job_id(endpoint: &str, body: &Value) -> AppResult<String> {
        match body.get("jobid") {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            _ => Err(AppError::Api(ApiError::BadSubmitResponse {
                endpoint: endpoint.to_string(),
                body: body.to_string(),
            })),
        }
    }

    /// 从状态响应中提取 running 标志（非零即视为运行中）
    fn extract_running(body: &Value) -> bool {
        match body.get("running") {
            Some(Value::Number(n)) => n.as_i64().unwrap_or(0) != 0,
            Some(Value::Bool(b)) => *b,
            _ => false,
        }
    }
}

#[async_trait]
impl JobService for RevigoClient {
    async fn submit(&self, term_list: &str, namespace: Namespace) -> AppResult<String> {
        let endpoint = self.submit_endpoint();

        debug!(
            "提交词条集: 命名空间 {}, 正文 {} 字节",
            namespace,
            term_list.len()
        );

        let params = [
            ("cutoff", self.cutoff.as_str()),
            ("valueType", self.value_type.as_str()),
            ("speciesTaxon", self.species_taxon.as_str()),
            ("measure", self.measure.as_str()),
            ("goList", term_list),
        ];

        let response = self
            .client
            .post(&endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::submission_failed(&endpoint, e))?
            .error_for_status()
            .map_err(|e| AppError::submission_failed(&endpoint, e))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::submission_failed(&endpoint, e))?;

        Self::extract_job_id(&endpoint, &body)
    }

    async fn poll_status(&self, job_id: &str) -> AppResult<bool> {
        let endpoint = self.query_endpoint();

        let response = self
            .client
            .get(&endpoint)
            .query(&[("jobid", job_id), ("type", "jstatus")])
            .send()
            .await
            .map_err(|e| AppError::transport_failed(&endpoint, e))?
            .error_for_status()
            .map_err(|e| AppError::transport_failed(&endpoint, e))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::transport_failed(&endpoint, e))?;

        Ok(Self::extract_running(&body))
    }

    async fn fetch_artifact(
        &self,
        job_id: &str,
        namespace: Namespace,
        kind: ArtifactKind,
    ) -> AppResult<String> {
        let endpoint = self.query_endpoint();
        let namespace_code = namespace.code().to_string();

        let response = self
            .client
            .get(&endpoint)
            .query(&[
                ("jobid", job_id),
                ("type", kind.remote_type()),
                ("namespace", namespace_code.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::transport_failed(&endpoint, e))?
            .error_for_status()
            .map_err(|e| AppError::transport_failed(&endpoint, e))?;

        let payload = response
            .text()
            .await
            .map_err(|e| AppError::transport_failed(&endpoint, e))?;

        if kind.error_marker_applies() && payload.contains(ERROR_MARKER) {
            return Err(AppError::fetch_failed(
                job_id,
                kind,
                "响应正文包含错误标记",
            ));
        }

        Ok(payload)
    }
}
