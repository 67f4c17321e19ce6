//! ONNX Runtime session management for depth estimation.

mod depth;
mod session;

pub use depth::DepthSession;
pub use session::load_session;
