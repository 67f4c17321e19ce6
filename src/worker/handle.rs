//! Worker thread loop and the async handle used to talk to it.

use crate::codec;
use crate::core::inference::DepthSession;
use crate::core::RelievoError;
use async_trait::async_trait;
use image::RgbaImage;
use std::path::PathBuf;
use tokio::sync::{mpsc, oneshot};

use super::messages::{InferJob, Request, RuntimeConfig};
use crate::resolver::ports::DepthmapGenerator;

/// Async handle to a spawned inference worker.
///
/// Cloneable; all clones feed the same queue. The worker thread shuts down
/// once every handle is dropped.
#[derive(Clone)]
pub struct WorkerHandle {
    tx: mpsc::UnboundedSender<Request>,
}

/// Spawns the worker thread and returns a handle to it.
pub fn spawn_worker() -> WorkerHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::Builder::new()
        .name("relievo-infer".to_string())
        .spawn(move || worker_loop(rx))
        .map_err(|e| tracing::error!(error = %e, "failed to spawn inference worker thread"))
        .ok();
    WorkerHandle { tx }
}

impl WorkerHandle {
    /// Delivers the runtime configuration to the worker.
    ///
    /// Must be called before [`WorkerHandle::infer`]; queue ordering makes
    /// the init visible to every job sent afterwards. The dylib path is
    /// applied to the process environment here, synchronously on the
    /// caller's thread: init happens at application startup, before any
    /// session exists and before other threads consult the environment.
    pub fn init(&self, runtime: RuntimeConfig) -> Result<(), RelievoError> {
        if let Some(path) = &runtime.ort_dylib {
            std::env::set_var("ORT_DYLIB_PATH", path);
        }
        self.tx
            .send(Request::Init(runtime))
            .map_err(|_| RelievoError::WorkerUnavailable("worker thread is gone".to_string()))
    }

    /// Runs one inference round-trip: preprocess, model forward pass,
    /// postprocess. Returns the displayable grayscale depth image.
    pub async fn infer(&self, job: InferJob) -> Result<RgbaImage, RelievoError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Request::Infer(job, reply_tx))
            .map_err(|_| RelievoError::WorkerUnavailable("worker thread is gone".to_string()))?;
        reply_rx
            .await
            .map_err(|_| RelievoError::WorkerUnavailable("worker dropped the request".to_string()))?
    }
}

/// State owned by the worker thread once it has been initialized.
///
/// Its absence is the not-initialized error condition; there is no flag.
struct WorkerContext {
    #[allow(dead_code)]
    runtime: RuntimeConfig,
    session: Option<DepthSession>,
}

fn worker_loop(mut rx: mpsc::UnboundedReceiver<Request>) {
    let mut context: Option<WorkerContext> = None;

    while let Some(request) = rx.blocking_recv() {
        match request {
            Request::Init(runtime) => {
                tracing::debug!(overwrite = context.is_some(), "worker initialized");
                let session = context.take().and_then(|c| c.session);
                context = Some(WorkerContext { runtime, session });
            }
            Request::Infer(job, reply) => {
                let result = match context.as_mut() {
                    None => Err(RelievoError::NotInitialized),
                    Some(ctx) => run_job(ctx, job),
                };
                if let Err(ref e) = result {
                    tracing::warn!(error = %e, "inference request failed");
                }
                // A closed reply channel means the caller gave up; the
                // worker itself stays alive either way.
                let _ = reply.send(result);
            }
        }
    }

    tracing::debug!("all worker handles dropped, inference thread exiting");
}

fn run_job(ctx: &mut WorkerContext, job: InferJob) -> Result<RgbaImage, RelievoError> {
    let (width, height) = job.pixels.dimensions();
    if width != job.size || height != job.size {
        return Err(RelievoError::invalid_input(format!(
            "pixel buffer is {width}x{height}, expected {0}x{0}",
            job.size
        )));
    }

    let mut session = DepthSession::for_model(ctx.session.take(), &job.model)?;

    let input = codec::preprocess(&job.pixels)?;
    let output = session.run(&input);
    // The session loaded fine; keep it cached even if this pass failed.
    ctx.session = Some(session);

    codec::postprocess(&output?)
}

/// Adapter binding a worker handle to one model file, exposed to the
/// resolver as its depth-generation port.
#[derive(Clone)]
pub struct WorkerDepthmapGenerator {
    handle: WorkerHandle,
    model: PathBuf,
}

impl WorkerDepthmapGenerator {
    /// Creates a generator that runs every request through `model`.
    pub fn new(handle: WorkerHandle, model: impl Into<PathBuf>) -> Self {
        Self {
            handle,
            model: model.into(),
        }
    }
}

#[async_trait]
impl DepthmapGenerator for WorkerDepthmapGenerator {
    async fn generate(&self, pixels: RgbaImage, size: u32) -> Result<RgbaImage, RelievoError> {
        self.handle
            .infer(InferJob {
                pixels,
                size,
                model: self.model.clone(),
            })
            .await
    }
}
