use std::sync::{Arc, Mutex, MutexGuard};

use crate::resolver::ports::PersistenceStore;
use crate::viewer::Renderer;

/// How the stereo output is composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// Single full-frame view with parallax.
    #[default]
    Full,
    /// Side-by-side halves, each squeezed to half width.
    HalfSideBySide,
    /// Side-by-side at full width per eye.
    FullSideBySide,
    /// Red/cyan anaglyph composite.
    Anaglyph,
}

impl DisplayMode {
    /// Every supported mode, in presentation order.
    pub const ALL: [DisplayMode; 4] = [
        DisplayMode::Full,
        DisplayMode::HalfSideBySide,
        DisplayMode::FullSideBySide,
        DisplayMode::Anaglyph,
    ];

    /// The wire/persisted token for this mode.
    pub fn as_str(self) -> &'static str {
        match self {
            DisplayMode::Full => "full",
            DisplayMode::HalfSideBySide => "hsbs",
            DisplayMode::FullSideBySide => "fsbs",
            DisplayMode::Anaglyph => "anaglyph",
        }
    }

    /// Parses a persisted or query-supplied token. Unknown tokens fall
    /// back to [`DisplayMode::Full`] rather than erroring, so a stale
    /// stored value can never wedge startup.
    pub fn parse_or_default(value: &str) -> Self {
        match value {
            "full" => DisplayMode::Full,
            "hsbs" => DisplayMode::HalfSideBySide,
            "fsbs" => DisplayMode::FullSideBySide,
            "anaglyph" => DisplayMode::Anaglyph,
            _ => DisplayMode::Full,
        }
    }
}

/// Persistence keys, kept compatible with the settings store of earlier
/// releases so existing installations keep their tuning.
pub mod keys {
    pub const FOCUS: &str = "focus";
    pub const DEPTHMAP_SIZE: &str = "depthmapSize";
    pub const DEVICE_PIXEL_RATIO: &str = "devicePixelRatio";
    pub const DISPLAY_MODE: &str = "displayMode";
    pub const MOUSE_X_OFFSET: &str = "mouseXOffset";
}

/// The tunable viewer configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub display_mode: DisplayMode,
    /// Depth plane that stays fixed under parallax, 0.0 (far) to 1.0 (near).
    pub focus: f32,
    /// Square inference resolution for generated depth maps.
    pub depthmap_size: u32,
    /// Render-resolution multiplier.
    pub device_pixel_ratio: f32,
    /// Horizontal eye separation for the stereo modes.
    pub mouse_x_offset: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            display_mode: DisplayMode::Full,
            focus: 0.3,
            depthmap_size: 518,
            device_pixel_ratio: 1.0,
            mouse_x_offset: 0.3,
        }
    }
}

/// Write-through settings layer: every change lands in the renderer and in
/// persistent storage in the same call, and startup replays what storage
/// holds. Unparseable stored values are ignored, keeping the default.
pub struct ViewerSettings {
    store: Arc<dyn PersistenceStore>,
    renderer: Arc<dyn Renderer>,
    config: Mutex<ViewerConfig>,
}

impl ViewerSettings {
    /// Builds the settings layer and applies any persisted values to the
    /// renderer immediately.
    pub fn load(store: Arc<dyn PersistenceStore>, renderer: Arc<dyn Renderer>) -> Self {
        let mut config = ViewerConfig::default();

        // Stored values are only trusted if they parse to something usable;
        // a zero or non-finite tunable would blank the viewer.
        if let Some(v) = store.get(keys::FOCUS).and_then(parse_tunable) {
            config.focus = v;
        }
        if let Some(v) = store
            .get(keys::DEPTHMAP_SIZE)
            .and_then(|v| v.parse().ok())
            .filter(|&v: &u32| v > 0)
        {
            config.depthmap_size = v;
        }
        if let Some(v) = store.get(keys::DEVICE_PIXEL_RATIO).and_then(parse_tunable) {
            config.device_pixel_ratio = v;
        }
        if let Some(v) = store.get(keys::DISPLAY_MODE) {
            config.display_mode = DisplayMode::parse_or_default(&v);
        }
        if let Some(v) = store.get(keys::MOUSE_X_OFFSET).and_then(parse_tunable) {
            config.mouse_x_offset = v;
        }

        renderer.set_focus(config.focus);
        renderer.set_depthmap_size(config.depthmap_size);
        renderer.set_device_pixel_ratio(config.device_pixel_ratio);
        renderer.set_display_mode(config.display_mode);
        renderer.set_mouse_x_offset(config.mouse_x_offset);

        Self {
            store,
            renderer,
            config: Mutex::new(config),
        }
    }

    pub fn config(&self) -> ViewerConfig {
        self.lock_config().clone()
    }

    pub fn set_focus(&self, focus: f32) {
        self.lock_config().focus = focus;
        self.renderer.set_focus(focus);
        self.store.set(keys::FOCUS, &focus.to_string());
    }

    pub fn set_depthmap_size(&self, size: u32) {
        self.lock_config().depthmap_size = size;
        self.renderer.set_depthmap_size(size);
        self.store.set(keys::DEPTHMAP_SIZE, &size.to_string());
    }

    pub fn set_device_pixel_ratio(&self, ratio: f32) {
        self.lock_config().device_pixel_ratio = ratio;
        self.renderer.set_device_pixel_ratio(ratio);
        self.store.set(keys::DEVICE_PIXEL_RATIO, &ratio.to_string());
    }

    pub fn set_display_mode(&self, mode: DisplayMode) {
        self.lock_config().display_mode = mode;
        self.renderer.set_display_mode(mode);
        self.store.set(keys::DISPLAY_MODE, mode.as_str());
    }

    pub fn set_mouse_x_offset(&self, offset: f32) {
        self.lock_config().mouse_x_offset = offset;
        self.renderer.set_mouse_x_offset(offset);
        self.store.set(keys::MOUSE_X_OFFSET, &offset.to_string());
    }

    fn lock_config(&self) -> MutexGuard<'_, ViewerConfig> {
        self.config.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn parse_tunable(value: String) -> Option<f32> {
    value.parse().ok().filter(|v: &f32| v.is_finite() && *v > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemStore {
        values: Mutex<HashMap<String, String>>,
    }

    impl MemStore {
        fn with(pairs: &[(&str, &str)]) -> Arc<Self> {
            Arc::new(Self {
                values: Mutex::new(
                    pairs
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                ),
            })
        }
    }

    impl PersistenceStore for MemStore {
        fn get(&self, key: &str) -> Option<String> {
            self.values.lock().unwrap().get(key).cloned()
        }

        fn set(&self, key: &str, value: &str) {
            self.values
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
        }
    }

    #[derive(Default)]
    struct RecordingRenderer {
        config: Mutex<ViewerConfig>,
    }

    impl Renderer for RecordingRenderer {
        fn load(&self, _image_url: &str, _depth_url: &str) {}

        fn set_display_mode(&self, mode: DisplayMode) {
            self.config.lock().unwrap().display_mode = mode;
        }

        fn set_focus(&self, focus: f32) {
            self.config.lock().unwrap().focus = focus;
        }

        fn set_depthmap_size(&self, size: u32) {
            self.config.lock().unwrap().depthmap_size = size;
        }

        fn set_device_pixel_ratio(&self, ratio: f32) {
            self.config.lock().unwrap().device_pixel_ratio = ratio;
        }

        fn set_mouse_x_offset(&self, offset: f32) {
            self.config.lock().unwrap().mouse_x_offset = offset;
        }

        fn config(&self) -> ViewerConfig {
            self.config.lock().unwrap().clone()
        }
    }

    #[test]
    fn display_mode_tokens_round_trip() {
        for mode in DisplayMode::ALL {
            assert_eq!(DisplayMode::parse_or_default(mode.as_str()), mode);
        }
    }

    #[test]
    fn unknown_mode_token_defaults_to_full() {
        assert_eq!(DisplayMode::parse_or_default("vr180"), DisplayMode::Full);
        assert_eq!(DisplayMode::parse_or_default(""), DisplayMode::Full);
    }

    #[test]
    fn load_replays_persisted_values_onto_renderer() {
        let store = MemStore::with(&[
            (keys::FOCUS, "0.55"),
            (keys::DEPTHMAP_SIZE, "336"),
            (keys::DISPLAY_MODE, "hsbs"),
        ]);
        let renderer = Arc::new(RecordingRenderer::default());

        let settings = ViewerSettings::load(store, renderer.clone());

        let config = settings.config();
        assert_eq!(config.focus, 0.55);
        assert_eq!(config.depthmap_size, 336);
        assert_eq!(config.display_mode, DisplayMode::HalfSideBySide);
        // Untouched fields keep their defaults.
        assert_eq!(config.device_pixel_ratio, 1.0);
        assert_eq!(renderer.config(), config);
    }

    #[test]
    fn unparseable_stored_value_keeps_default() {
        let store = MemStore::with(&[(keys::FOCUS, "not-a-number")]);
        let settings = ViewerSettings::load(store, Arc::new(RecordingRenderer::default()));
        assert_eq!(settings.config().focus, 0.3);
    }

    #[test]
    fn degenerate_stored_values_keep_defaults() {
        let store = MemStore::with(&[
            (keys::FOCUS, "NaN"),
            (keys::DEVICE_PIXEL_RATIO, "0"),
            (keys::DEPTHMAP_SIZE, "0"),
            (keys::MOUSE_X_OFFSET, "-1"),
        ]);
        let settings = ViewerSettings::load(store, Arc::new(RecordingRenderer::default()));
        assert_eq!(settings.config(), ViewerConfig::default());
    }

    #[test]
    fn setters_write_through_to_store_and_renderer() {
        let store = MemStore::with(&[]);
        let renderer = Arc::new(RecordingRenderer::default());
        let settings = ViewerSettings::load(store.clone(), renderer.clone());

        settings.set_focus(0.8);
        settings.set_display_mode(DisplayMode::Anaglyph);
        settings.set_depthmap_size(1036);

        assert_eq!(store.get(keys::FOCUS).as_deref(), Some("0.8"));
        assert_eq!(store.get(keys::DISPLAY_MODE).as_deref(), Some("anaglyph"));
        assert_eq!(store.get(keys::DEPTHMAP_SIZE).as_deref(), Some("1036"));
        assert_eq!(renderer.config().focus, 0.8);
        assert_eq!(renderer.config().display_mode, DisplayMode::Anaglyph);
    }
}
