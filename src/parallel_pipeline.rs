// THEORY:
// Concurrency around the synchronous engine. A single chart is always analyzed
// on one thread; what runs in parallel is *charts*:
//
// - `evaluate_bilateral` analyzes the right and left eye at the same time on
//   tokio's blocking pool and joins the two independent results.
// - `BatchEvaluator` is a worker pool for headless batch runs. A dispatcher
//   hands charts round-robin to N workers (one per CPU by default); each answer
//   travels back through its own oneshot channel, so callers may await in any
//   order.
//
// The pipeline itself is immutable and shared behind an `Arc`; there is no
// mutable state to coordinate. No cancellation or timeouts.

use crate::config::PipelineConfig;
use crate::error::{Result, VisionError};
use crate::pipeline::{AnalysisResult, BilateralReport, VisualFieldPipeline};
use futures::future::join_all;
use image::RgbImage;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

/// Analyze one chart off the async threads.
async fn analyze_blocking(
    pipeline: Arc<VisualFieldPipeline>,
    raster: RgbImage,
) -> Result<AnalysisResult> {
    tokio::task::spawn_blocking(move || pipeline.analyze(&raster))
        .await
        .map_err(|e| VisionError::worker_pool(format!("analysis task failed: {e}")))?
}

/// Both eyes in parallel. Either eye failing fails the evaluation.
pub async fn evaluate_bilateral(
    pipeline: Arc<VisualFieldPipeline>,
    right: RgbImage,
    left: RgbImage,
) -> Result<BilateralReport> {
    let (right, left) = tokio::try_join!(
        analyze_blocking(Arc::clone(&pipeline), right),
        analyze_blocking(pipeline, left),
    )?;
    Ok(BilateralReport::new(right, left))
}

pub struct ChartTask {
    pub chart_id: u64,
    pub raster: RgbImage,
    pub result_sender: oneshot::Sender<Result<AnalysisResult>>,
}

pub struct WorkerPool {
    task_sender: mpsc::UnboundedSender<ChartTask>,
    workers: Vec<tokio::task::JoinHandle<()>>,
}

impl WorkerPool {
    /// Must be called inside a tokio runtime.
    pub fn new(pipeline: Arc<VisualFieldPipeline>, worker_count: usize) -> Self {
        let worker_count = worker_count.max(1);
        let (task_sender, mut task_receiver) = mpsc::unbounded_channel::<ChartTask>();
        let mut workers = Vec::with_capacity(worker_count + 1);

        let (worker_senders, worker_receivers): (Vec<_>, Vec<_>) = (0..worker_count)
            .map(|_| mpsc::unbounded_channel::<ChartTask>())
            .unzip();

        // Dispatcher
        workers.push(tokio::spawn(async move {
            let mut worker_idx = 0;
            while let Some(task) = task_receiver.recv().await {
                let _ = worker_senders[worker_idx].send(task);
                worker_idx = (worker_idx + 1) % worker_count;
            }
        }));

        for (worker_id, mut worker_receiver) in worker_receivers.into_iter().enumerate() {
            let worker_pipeline = Arc::clone(&pipeline);
            workers.push(tokio::spawn(async move {
                while let Some(task) = worker_receiver.recv().await {
                    debug!(worker_id, chart_id = task.chart_id, "chart picked up");
                    let result = analyze_blocking(Arc::clone(&worker_pipeline), task.raster).await;
                    // The caller may have stopped waiting.
                    let _ = task.result_sender.send(result);
                }
            }));
        }

        Self {
            task_sender,
            workers,
        }
    }

    pub async fn submit(&self, chart_id: u64, raster: RgbImage) -> Result<AnalysisResult> {
        let (result_sender, result_receiver) = oneshot::channel();
        let task = ChartTask {
            chart_id,
            raster,
            result_sender,
        };

        self.task_sender
            .send(task)
            .map_err(|_| VisionError::worker_pool("failed to send chart to worker pool"))?;

        result_receiver
            .await
            .map_err(|_| VisionError::worker_pool("failed to receive result from worker"))?
    }

    /// Stops accepting charts and waits for in-flight ones to finish.
    pub async fn shutdown(self) {
        drop(self.task_sender);
        for worker in self.workers {
            let _ = worker.await;
        }
    }
}

/// Headless-friendly batch scoring of many charts.
pub struct BatchEvaluator {
    worker_pool: WorkerPool,
    chart_counter: AtomicU64,
}

impl BatchEvaluator {
    /// One worker per CPU.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        Self::with_workers(config, num_cpus::get())
    }

    pub fn with_workers(config: PipelineConfig, worker_count: usize) -> Result<Self> {
        let pipeline = Arc::new(VisualFieldPipeline::new(config)?);
        Ok(Self {
            worker_pool: WorkerPool::new(pipeline, worker_count),
            chart_counter: AtomicU64::new(0),
        })
    }

    pub async fn evaluate(&self, raster: RgbImage) -> Result<AnalysisResult> {
        let chart_id = self.chart_counter.fetch_add(1, Ordering::Relaxed);
        self.worker_pool.submit(chart_id, raster).await
    }

    /// Results in input order; one bad chart does not affect the others.
    pub async fn evaluate_all(&self, rasters: Vec<RgbImage>) -> Vec<Result<AnalysisResult>> {
        join_all(rasters.into_iter().map(|raster| self.evaluate(raster))).await
    }

    pub async fn shutdown(self) {
        self.worker_pool.shutdown().await;
    }
}
