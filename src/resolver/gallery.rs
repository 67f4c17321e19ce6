//! Bundled example image/depth pairs.
//!
//! Each entry is a pre-paired photograph and depth map served from the
//! application's asset directory; picking one never triggers inference.

use rand::seq::SliceRandom;

/// A named example pair with a thumbnail for the picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GalleryEntry {
    pub key: &'static str,
}

impl GalleryEntry {
    pub fn image_path(&self) -> String {
        format!("assets/gallery/{}.jpg", self.key)
    }

    pub fn thumb_path(&self) -> String {
        format!("assets/gallery/{}_thumb.jpg", self.key)
    }

    pub fn depthmap_path(&self) -> String {
        format!("assets/gallery/{}_depthmap.png", self.key)
    }
}

const ENTRIES: &[GalleryEntry] = &[
    GalleryEntry { key: "alpine-lake" },
    GalleryEntry { key: "street-cat" },
    GalleryEntry { key: "neon-alley" },
    GalleryEntry { key: "lighthouse" },
    GalleryEntry { key: "fern-forest" },
    GalleryEntry { key: "old-tram" },
    GalleryEntry { key: "market-spices" },
    GalleryEntry { key: "paper-cranes" },
    GalleryEntry { key: "dune-walker" },
    GalleryEntry { key: "harbor-fog" },
];

/// All bundled example pairs.
pub fn entries() -> &'static [GalleryEntry] {
    ENTRIES
}

/// Picks one example pair at random.
pub fn random_entry() -> GalleryEntry {
    *ENTRIES
        .choose(&mut rand::thread_rng())
        .unwrap_or(&ENTRIES[0])
}
