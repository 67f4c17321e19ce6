//! Isolated inference worker.
//!
//! The depth model runs on a dedicated OS thread behind a typed message
//! boundary, so tensor work never blocks the orchestration surface. The
//! worker must receive [`RuntimeConfig`] via [`WorkerHandle::init`] before
//! it accepts inference requests; a request arriving earlier is answered
//! with an explicit not-initialized error instead of being attempted.
//!
//! Failures inside the worker (model load, shape mismatch, runtime errors)
//! are caught at the boundary and returned as structured errors; the worker
//! thread never exits on a failed request. Requests are served strictly in
//! arrival order, so at most one inference is in flight at a time.

mod handle;
mod messages;

pub use handle::{spawn_worker, WorkerDepthmapGenerator, WorkerHandle};
pub use messages::{InferJob, RuntimeConfig};
