//! The asset-resolution state machine.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::core::RelievoError;
use crate::resolver::assets::{
    AssetPair, AssetSource, DepthAsset, FilePayload, ImageAsset, Provenance,
};
use crate::resolver::gallery;
use crate::resolver::ports::{AssetFetcher, DepthmapGenerator, HistorySink};
use crate::resolver::query::StartupParams;
use crate::utils::image::{decode_image, encode_png, to_inference_input};
use crate::viewer::Renderer;

/// Observable resolver state. `Error` is the single signal surfaced upward;
/// callers re-attempt the whole load explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverState {
    Idle,
    Loading,
    Error,
}

/// What happened to a completed resolution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The pair was published to the renderer.
    Published,
    /// A newer request started in the meantime; this result was discarded.
    Superseded,
}

/// An explicit load triggered by user action. Fields mirror the input
/// form's state: a file beats a URL for each slot, and an absent depth slot
/// means "generate unless a user-supplied depth map is still active".
#[derive(Debug, Default)]
pub struct LoadRequest {
    pub image_file: Option<FilePayload>,
    pub image_url: Option<String>,
    pub depth_file: Option<FilePayload>,
    pub depth_url: Option<String>,
    /// Explicitly drop the active user-supplied depth map.
    pub remove_depth: bool,
}

struct ResolverInner {
    state: ResolverState,
    /// The last pair published to the renderer; both fields replaced
    /// together under this lock, never observed half-updated.
    current: Option<AssetPair>,
    /// Active depth source. A user-supplied entry survives image
    /// replacement; a generated one does not.
    active_depth: Option<DepthAsset>,
    depthmap_size: u32,
}

/// Decides the active image/depth pair from competing input sources and
/// publishes it to the renderer.
///
/// Overlapping loads are resolved with a monotonically increasing
/// generation token: whichever request started last wins, and completions
/// for superseded tokens are discarded unconditionally.
pub struct AssetResolver {
    renderer: Arc<dyn Renderer>,
    fetcher: Arc<dyn AssetFetcher>,
    generator: Arc<dyn DepthmapGenerator>,
    history: Arc<dyn HistorySink>,
    inner: Mutex<ResolverInner>,
    generation: AtomicU64,
}

impl AssetResolver {
    pub fn new(
        renderer: Arc<dyn Renderer>,
        fetcher: Arc<dyn AssetFetcher>,
        generator: Arc<dyn DepthmapGenerator>,
        history: Arc<dyn HistorySink>,
        depthmap_size: u32,
    ) -> Self {
        Self {
            renderer,
            fetcher,
            generator,
            history,
            inner: Mutex::new(ResolverInner {
                state: ResolverState::Idle,
                current: None,
                active_depth: None,
                depthmap_size,
            }),
            generation: AtomicU64::new(0),
        }
    }

    /// Current state of the machine.
    pub fn state(&self) -> ResolverState {
        self.lock_inner().state
    }

    /// The last pair published to the renderer, if any.
    pub fn current_pair(&self) -> Option<AssetPair> {
        self.lock_inner().current.clone()
    }

    /// Updates the square inference resolution used for future loads.
    pub fn set_depthmap_size(&self, size: u32) {
        self.lock_inner().depthmap_size = size;
    }

    /// Resolves the startup sources in priority order: explicit image and
    /// depth URLs (no inference), image URL alone (fetch, then infer), or
    /// a random gallery pair (pre-paired, no inference). Startup never
    /// records history; the entry the user arrived with already encodes
    /// these sources.
    pub async fn startup(&self, params: StartupParams) -> Result<LoadOutcome, RelievoError> {
        if let Some(mode) = params.display_mode {
            self.renderer.set_display_mode(mode);
        }

        match (params.input, params.depthmap) {
            (Some(input), Some(depthmap)) => {
                tracing::debug!(%input, %depthmap, "startup with paired urls");
                let generation = self.begin();
                let image = ImageAsset {
                    source: AssetSource::Remote(input),
                    payload: None,
                };
                let depth = DepthAsset {
                    source: AssetSource::Remote(depthmap),
                    provenance: Provenance::UserSupplied,
                };
                Ok(self.publish(generation, image, depth, false))
            }
            (Some(input), None) => {
                tracing::debug!(%input, "startup with image url, depth to generate");
                let generation = self.begin();
                let result = self
                    .resolve_remote_image_with_inference(&input, generation)
                    .await;
                match result {
                    Ok((image, depth)) => Ok(self.publish(generation, image, depth, false)),
                    Err(e) => Err(self.fail(generation, e)),
                }
            }
            (None, _) => {
                let entry = gallery::random_entry();
                tracing::debug!(example = entry.key, "startup with gallery pair");
                let generation = self.begin();
                let image = ImageAsset {
                    source: AssetSource::Gallery(entry.image_path()),
                    payload: None,
                };
                let depth = DepthAsset {
                    source: AssetSource::Gallery(entry.depthmap_path()),
                    provenance: Provenance::UserSupplied,
                };
                Ok(self.publish(generation, image, depth, false))
            }
        }
    }

    /// Resolves an explicit load request.
    ///
    /// The image comes from the uploaded file, else the URL. The depth map
    /// comes from an explicitly supplied file or URL; failing that, from a
    /// still-active user-supplied depth asset; failing that, the worker
    /// generates one. Only fully resolved pairs are published, and only
    /// remote sources are recorded in history.
    pub async fn load(&self, request: LoadRequest) -> Result<LoadOutcome, RelievoError> {
        let generation = self.begin();

        let result = self.resolve_request(&request, generation).await;
        match result {
            Ok(Some((image, depth))) => Ok(self.publish(generation, image, depth, true)),
            Ok(None) => Ok(LoadOutcome::Superseded),
            Err(e) => Err(self.fail(generation, e)),
        }
    }

    async fn resolve_request(
        &self,
        request: &LoadRequest,
        generation: u64,
    ) -> Result<Option<(ImageAsset, DepthAsset)>, RelievoError> {
        let image = if let Some(file) = &request.image_file {
            ImageAsset {
                payload: Some(file.bytes.clone()),
                source: AssetSource::LocalFile(file.clone()),
            }
        } else if let Some(url) = &request.image_url {
            let bytes = self.fetcher.fetch(url).await?;
            ImageAsset {
                source: AssetSource::Remote(url.clone()),
                payload: Some(Arc::new(bytes)),
            }
        } else {
            return Err(RelievoError::invalid_input(
                "no image source in load request".to_string(),
            ));
        };

        let explicit_depth = if let Some(file) = &request.depth_file {
            Some(DepthAsset {
                source: AssetSource::LocalFile(file.clone()),
                provenance: Provenance::UserSupplied,
            })
        } else if let Some(url) = &request.depth_url {
            // Fetch up front so an unloadable depth source fails the whole
            // attempt instead of surfacing later in the renderer.
            self.fetcher.fetch(url).await?;
            Some(DepthAsset {
                source: AssetSource::Remote(url.clone()),
                provenance: Provenance::UserSupplied,
            })
        } else {
            None
        };

        // An explicit depth source, however obtained, beats inference. A
        // still-active user-supplied one does too; only a generated depth
        // map is invalidated by the image changing underneath it.
        let depth = match explicit_depth {
            Some(depth) => Some(depth),
            None if request.remove_depth => None,
            None => self
                .lock_inner()
                .active_depth
                .clone()
                .filter(|d| d.provenance == Provenance::UserSupplied),
        };

        let depth = match depth {
            Some(depth) => depth,
            None => self.generate_depth(&image, generation).await?,
        };

        if !self.is_current(generation) {
            tracing::debug!(generation, "load superseded, discarding result");
            return Ok(None);
        }
        Ok(Some((image, depth)))
    }

    async fn resolve_remote_image_with_inference(
        &self,
        url: &str,
        generation: u64,
    ) -> Result<(ImageAsset, DepthAsset), RelievoError> {
        let bytes = self.fetcher.fetch(url).await?;
        let image = ImageAsset {
            source: AssetSource::Remote(url.to_string()),
            payload: Some(Arc::new(bytes)),
        };
        // The derived tag carries this attempt's token, not whatever the
        // live counter says by the time inference finishes.
        let depth = self.generate_depth(&image, generation).await?;
        Ok((image, depth))
    }

    async fn generate_depth(
        &self,
        image: &ImageAsset,
        generation: u64,
    ) -> Result<DepthAsset, RelievoError> {
        let payload = image.payload.as_ref().ok_or_else(|| {
            RelievoError::invalid_input("image has no byte payload to run inference on".to_string())
        })?;

        let size = self.lock_inner().depthmap_size;
        let decoded = decode_image(payload)?;
        let pixels = to_inference_input(&decoded, size)?;

        // Decode always precedes dispatch; the worker round-trip suspends
        // here without blocking other resolver callers.
        let depth_image = self.generator.generate(pixels, size).await?;
        let bytes = encode_png(&depth_image)?;

        Ok(DepthAsset {
            source: AssetSource::Derived {
                tag: format!("depth-{generation}"),
                bytes: Arc::new(bytes),
            },
            provenance: Provenance::Generated,
        })
    }

    /// Starts a new resolution attempt, superseding any in flight.
    fn begin(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.lock_inner().state = ResolverState::Loading;
        generation
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Publishes a fully resolved pair: commits the active sources and the
    /// pair in one locked update, then hands the URLs to the renderer and
    /// optionally records a history entry.
    fn publish(
        &self,
        generation: u64,
        image: ImageAsset,
        depth: DepthAsset,
        record_history: bool,
    ) -> LoadOutcome {
        let pair = AssetPair {
            image: image.clone(),
            depth: depth.clone(),
        };

        {
            let mut inner = self.lock_inner();
            if self.generation.load(Ordering::SeqCst) != generation {
                return LoadOutcome::Superseded;
            }
            inner.active_depth = Some(depth.clone());
            inner.current = Some(pair);
            inner.state = ResolverState::Idle;
        }

        self.renderer.load(&image.display_url(), &depth.display_url());

        if record_history && image.source.is_remote_http() {
            let mut serializer = url::form_urlencoded::Serializer::new(String::new());
            serializer.append_pair("input", &image.display_url());
            if depth.source.is_remote_http() {
                serializer.append_pair("depthmap", &depth.display_url());
            }
            self.history.push(format!("?{}", serializer.finish()));
        }

        tracing::info!(
            image = %image.display_url(),
            depth = %depth.display_url(),
            "published asset pair"
        );
        LoadOutcome::Published
    }

    /// Marks the attempt failed. The previously published pair stays
    /// untouched; a superseded attempt does not even change state.
    fn fail(&self, generation: u64, error: RelievoError) -> RelievoError {
        if self.is_current(generation) {
            self.lock_inner().state = ResolverState::Error;
        }
        tracing::warn!(error = %error, "load attempt failed");
        error
    }

    fn lock_inner(&self) -> std::sync::MutexGuard<'_, ResolverInner> {
        // Lock poisoning only happens if a holder panicked; the inner
        // value is still coherent for our single-field updates.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
