//! 任务轮询器 - 业务能力层
//!
//! 驱动一个已提交任务走完状态机：
//! Submitted → Polling → {Completed | Failed}
//!
//! ## 职责
//! - 以固定间隔轮询任务状态直到 running 为否
//! - 状态落定后一次性取回全部四个产物
//! - 任何一次获取失败即把任务置为失败终态，不再重试
//! - 等待使用可取消的定时器，停机信号能解除阻塞
//!
//! 默认不设超时：永不完成的任务只会占住它自己的工作槽位，
//! 不会拖垮整个批次（扇出按命名空间隔离）

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::clients::JobService;
use crate::error::{AppError, AppResult, JobError};
use crate::models::{ArtifactKind, ArtifactSet, Job, JobState};

/// 任务轮询器
pub struct JobPoller {
    client: Arc<dyn JobService>,
    poll_interval: Duration,
    /// 等待上限；None 表示不设上限
    poll_timeout: Option<Duration>,
}

impl JobPoller {
    /// 创建新的任务轮询器
    ///
    /// # 参数
    /// - `client`: 远程服务客户端
    /// - `poll_interval`: 轮询间隔
    /// - `poll_timeout`: 等待上限（None 表示不设上限）
    pub fn new(
        client: Arc<dyn JobService>,
        poll_interval: Duration,
        poll_timeout: Option<Duration>,
    ) -> Self {
        Self {
            client,
            poll_interval,
            poll_timeout,
        }
    }

    /// 驱动任务到终态并取回全部产物
    ///
    /// 成功返回产物集合（任务状态置为已完成）；
    /// 失败返回错误（任务状态置为已失败，调用方记录后继续处理兄弟任务）
    pub async fn run(
        &self,
        job: &mut Job,
        shutdown: &mut watch::Receiver<bool>,
    ) -> AppResult<ArtifactSet> {
        match self.wait_until_done(job, shutdown).await {
            Ok(()) => {}
            Err(e) => {
                job.state = JobState::Failed;
                return Err(e);
            }
        }

        match self.fetch_artifacts(job).await {
            Ok(artifacts) => {
                job.state = JobState::Completed;
                Ok(artifacts)
            }
            Err(e) => {
                // 任何一个产物获取失败都是终态，不再轮询也不再获取
                job.state = JobState::Failed;
                Err(e)
            }
        }
    }

    /// 轮询任务状态直到 running 为否
    async fn wait_until_done(
        &self,
        job: &mut Job,
        shutdown: &mut watch::Receiver<bool>,
    ) -> AppResult<()> {
        job.state = JobState::Polling;
        let started = Instant::now();

        loop {
            let running = self.client.poll_status(&job.job_id).await?;
            if !running {
                return Ok(());
            }

            debug!("任务 {} 仍在运行，{:?} 后重新轮询", job.job_id, self.poll_interval);

            if let Some(timeout) = self.poll_timeout {
                if started.elapsed() >= timeout {
                    return Err(AppError::Job(JobError::TimedOut {
                        job_id: job.job_id.clone(),
                        waited_secs: started.elapsed().as_secs(),
                    }));
                }
            }

            if self.pause_or_cancel(shutdown).await {
                return Err(AppError::Job(JobError::Cancelled {
                    job_id: job.job_id.clone(),
                }));
            }
        }
    }

    /// 挂起一个轮询间隔；停机信号到达时提前返回 true
    async fn pause_or_cancel(&self, shutdown: &mut watch::Receiver<bool>) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(self.poll_interval) => false,
            changed = shutdown.changed() => {
                match changed {
                    Ok(()) if *shutdown.borrow() => true,
                    // 发送端已关闭或值未置位：退化为普通等待
                    _ => {
                        tokio::time::sleep(self.poll_interval).await;
                        false
                    }
                }
            }
        }
    }

    /// 一次性取回全部四个产物
    ///
    /// 不变式：四个产物全部取回任务才算完成，部分取回按失败处理
    async fn fetch_artifacts(&self, job: &Job) -> AppResult<ArtifactSet> {
        let mut payloads = Vec::with_capacity(4);

        for kind in ArtifactKind::all() {
            match self
                .client
                .fetch_artifact(&job.job_id, job.namespace, kind)
                .await
            {
                Ok(payload) => payloads.push(payload),
                Err(e) => {
                    warn!(
                        "任务 {} 产物 {} 获取失败，放弃该任务: {}",
                        job.job_id, kind, e
                    );
                    return Err(e);
                }
            }
        }

        let mut payloads = payloads.into_iter();
        Ok(ArtifactSet {
            table: payloads.next().unwrap_or_default(),
            grouping: payloads.next().unwrap_or_default(),
            projection: payloads.next().unwrap_or_default(),
            render_script: payloads.next().unwrap_or_default(),
        })
    }
}
