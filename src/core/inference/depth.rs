//! A loaded, ready-to-run instance of the depth-estimation model.

use crate::core::errors::{RelievoError, SimpleError};
use crate::core::{Tensor3D, Tensor4D};
use ndarray::ArrayView3;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::{Path, PathBuf};

use super::session::load_session;

/// Fallback input name when the model does not declare one.
const DEFAULT_INPUT_NAME: &str = "image";

/// An ONNX depth-estimation session bound to one model file.
///
/// The session is created once and reused across inference calls; callers
/// that may switch models should go through [`DepthSession::for_model`],
/// which only rebuilds the session when the model path changes.
pub struct DepthSession {
    session: Session,
    model_path: PathBuf,
    input_name: String,
    output_name: String,
}

impl std::fmt::Debug for DepthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DepthSession")
            .field("model_path", &self.model_path)
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .finish()
    }
}

impl DepthSession {
    /// Loads the model at `model_path` and discovers its tensor names.
    pub fn load(model_path: impl AsRef<Path>) -> Result<Self, RelievoError> {
        let path = model_path.as_ref().to_path_buf();
        let session = load_session(&path)?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| DEFAULT_INPUT_NAME.to_string());
        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| {
                RelievoError::model_load_error(
                    &path,
                    "model declares no outputs",
                    Some("the file may be truncated or not a depth model"),
                    None::<SimpleError>,
                )
            })?;

        tracing::debug!(
            model = %path.display(),
            input = %input_name,
            output = %output_name,
            "depth session loaded"
        );

        Ok(Self {
            session,
            model_path: path,
            input_name,
            output_name,
        })
    }

    /// Reuses `cached` if it was built from `model_path`, otherwise loads a
    /// fresh session for that model.
    pub fn for_model(
        cached: Option<DepthSession>,
        model_path: impl AsRef<Path>,
    ) -> Result<Self, RelievoError> {
        match cached {
            Some(session) if session.model_path == model_path.as_ref() => Ok(session),
            _ => Self::load(model_path),
        }
    }

    /// Returns the model path this session was built from.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Runs one inference call.
    ///
    /// The input must be an `[1, 3, S, S]` planar tensor; the output is the
    /// model's raw single-channel depth tensor, shaped `[1, H, W]`.
    pub fn run(&mut self, input: &Tensor4D) -> Result<Tensor3D, RelievoError> {
        let input_shape = input.shape().to_vec();

        let input_tensor = TensorRef::from_array_view(input.view()).map_err(|e| {
            RelievoError::inference_error(
                &format!("failed to convert input tensor with shape {input_shape:?}"),
                e,
            )
        })?;

        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let outputs = self.session.run(inputs).map_err(|e| {
            RelievoError::inference_error(
                &format!(
                    "forward pass failed for input '{}' -> output '{}'",
                    self.input_name, self.output_name
                ),
                e,
            )
        })?;

        let (output_shape, output_data) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| {
                RelievoError::inference_error(
                    &format!("failed to extract output tensor '{}' as f32", self.output_name),
                    e,
                )
            })?;

        if output_shape.len() != 3 {
            return Err(RelievoError::tensor_operation_error(
                "output_validation",
                &[3],
                &[output_shape.len()],
                &format!(
                    "expected a [1, H, W] depth tensor, got shape {output_shape:?}"
                ),
                SimpleError::new("invalid output tensor dimensions"),
            ));
        }

        let batch = output_shape[0] as usize;
        let height = output_shape[1] as usize;
        let width = output_shape[2] as usize;
        let expected_len = batch * height * width;

        if output_data.len() != expected_len {
            return Err(RelievoError::invalid_input(format!(
                "output data size mismatch: expected {expected_len}, got {}",
                output_data.len()
            )));
        }

        let array_view = ArrayView3::from_shape((batch, height, width), output_data)
            .map_err(RelievoError::Tensor)?;
        Ok(array_view.to_owned())
    }
}
