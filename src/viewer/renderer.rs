use crate::viewer::config::{DisplayMode, ViewerConfig};

/// The seam between orchestration and the actual renderer.
///
/// `load` hands over display URLs, not pixels: the renderer resolves
/// `mem://` URLs against its own buffer registry and remote/gallery URLs
/// against its texture loader. Setters take effect on the next frame.
pub trait Renderer: Send + Sync {
    /// Replaces the displayed image/depth pair. Both change together.
    fn load(&self, image_url: &str, depth_url: &str);

    fn set_display_mode(&self, mode: DisplayMode);
    fn set_focus(&self, focus: f32);
    fn set_depthmap_size(&self, size: u32);
    fn set_device_pixel_ratio(&self, ratio: f32);
    fn set_mouse_x_offset(&self, offset: f32);

    /// The configuration currently in effect.
    fn config(&self) -> ViewerConfig;
}
