//! Shared test utilities.
//!
//! Builders for content values and in-memory stores, so module tests can set
//! up a provider or a file-backed store in one line.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let provider = provider_with(sample_content());
//! let title = provider.provide(|| use_content().about().title);
//! assert_eq!(title, "Built on Preparation");
//! ```

use std::sync::Arc;

use crate::content::{GalleryCategory, GalleryItem, ServiceItem, SiteContent};
use crate::kv::{KeyValueStore, MemoryKvStore};
use crate::provider::ContentProvider;
use crate::store::ContentStore;

// =========================================================================
// Content builders
// =========================================================================

/// Content that differs from the default in every section.
pub fn sample_content() -> SiteContent {
    let mut content = SiteContent::default();
    content.assets.logo = "/images/logo-dark.svg".to_string();
    content.services.push(ServiceItem {
        id: "feature-walls".to_string(),
        title: "Feature Walls".to_string(),
        description: "Textured and metallic statement finishes.".to_string(),
        image: "/images/services/feature.jpg".to_string(),
        features: vec!["Venetian plaster".to_string(), "Metallics".to_string()],
    });
    content.gallery.push(GalleryItem {
        id: 4,
        title: "Bondi Terrace Facade".to_string(),
        category: GalleryCategory::Painting,
        image_url: "/images/gallery/bondi.jpg".to_string(),
        description: "Salt-resistant exterior system.".to_string(),
    });
    content.contact.phone = "0411 222 333".to_string();
    content.about.title = "Built on Preparation".to_string();
    content.about.story.push("Unicode survives: café ✓".to_string());
    content
}

// =========================================================================
// Store setup
// =========================================================================

pub fn memory_kv() -> Arc<dyn KeyValueStore> {
    Arc::new(MemoryKvStore::new())
}

/// A provider over an in-memory store already holding `content`.
pub fn provider_with(content: SiteContent) -> ContentProvider {
    let mut store = ContentStore::open(memory_kv());
    store.commit(content).unwrap();
    ContentProvider::new(store)
}
