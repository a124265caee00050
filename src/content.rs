//! Site content data model.
//!
//! [`SiteContent`] is the single aggregate edited by the admin surface. It is
//! versionless and always replaced wholesale: an edit produces a complete new
//! value which the store persists in one write. JSON field names match the
//! generated `constants.tsx` consumed by the deployed site (`imageUrl`,
//! `heroImage`, ...), so a persisted blob and an exported file describe the
//! same object.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Root content aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteContent {
    pub assets: SiteAssets,
    pub services: Vec<ServiceItem>,
    pub gallery: Vec<GalleryItem>,
    pub contact: ContactInfo,
    pub about: AboutContent,
}

/// Image references used by the page chrome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteAssets {
    pub logo: String,
    pub home: HomeAssets,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeAssets {
    pub hero: String,
}

/// A service offered on the services page.
///
/// `id` is the list key and must stay stable across edits. Uniqueness within
/// `services` is the editor's responsibility; nothing here enforces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    pub id: u32,
    pub title: String,
    pub category: GalleryCategory,
    pub image_url: String,
    pub description: String,
}

/// Fixed set of gallery categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GalleryCategory {
    Painting,
    Plastering,
    Commercial,
}

impl GalleryCategory {
    pub const ALL: [GalleryCategory; 3] = [
        GalleryCategory::Painting,
        GalleryCategory::Plastering,
        GalleryCategory::Commercial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GalleryCategory::Painting => "Painting",
            GalleryCategory::Plastering => "Plastering",
            GalleryCategory::Commercial => "Commercial",
        }
    }
}

impl fmt::Display for GalleryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GalleryCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown gallery category: {s}"))
    }
}

/// Business contact details. `whatsapp` is an international-format number
/// (a leading `+` is tolerated and stripped when building chat links).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub phone: String,
    pub email: String,
    pub address: String,
    pub whatsapp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutContent {
    pub title: String,
    pub subtitle: String,
    pub hero_image: String,
    /// Story paragraphs, rendered as markdown.
    pub story: Vec<String>,
    pub philosophy: Vec<PhilosophyItem>,
}

/// A value card on the about page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhilosophyItem {
    pub id: u32,
    /// Icon name: `Award`, `Target`, `Shield` or `Heart`. Anything else
    /// renders as `Shield`.
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub desc: String,
}

/// A customer review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    pub id: u32,
    pub name: String,
    pub location: String,
    pub content: String,
    pub rating: u8,
    pub date: String,
}

/// Reviews shown on the testimonials page. Compiled in and not editable;
/// exported as `TESTIMONIALS_DATA = []`.
pub const TESTIMONIALS: &[Testimonial] = &[];

impl Default for SiteContent {
    fn default() -> Self {
        Self {
            assets: SiteAssets {
                logo: "/images/sfs-logo.png".to_string(),
                home: HomeAssets {
                    hero: "/images/home-hero.jpg".to_string(),
                },
            },
            services: default_services(),
            gallery: default_gallery(),
            contact: ContactInfo {
                phone: "0400 123 456".to_string(),
                email: "info@shieldfinishing.com.au".to_string(),
                address: "Greater Sydney, NSW".to_string(),
                whatsapp: "+61400123456".to_string(),
            },
            about: default_about(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_services() -> Vec<ServiceItem> {
    vec![
        ServiceItem {
            id: "interior-painting".to_string(),
            title: "Interior Painting".to_string(),
            description: "Flawless walls, ceilings and trims with premium low-VOC paints."
                .to_string(),
            image: "/images/services/interior.jpg".to_string(),
            features: strings(&["Surface preparation", "Low-VOC paints", "Clean-up included"]),
        },
        ServiceItem {
            id: "exterior-painting".to_string(),
            title: "Exterior Painting".to_string(),
            description: "Weather-resistant coatings that protect and refresh your facade."
                .to_string(),
            image: "/images/services/exterior.jpg".to_string(),
            features: strings(&["Pressure washing", "Crack repair", "UV-stable finishes"]),
        },
        ServiceItem {
            id: "plastering".to_string(),
            title: "Plastering".to_string(),
            description: "Set, patch and skim coats for a perfectly smooth base.".to_string(),
            image: "/images/services/plastering.jpg".to_string(),
            features: strings(&["Patch repairs", "Cornices", "Level 5 finishes"]),
        },
        ServiceItem {
            id: "commercial".to_string(),
            title: "Commercial Projects".to_string(),
            description: "Offices, retail and strata work delivered on schedule.".to_string(),
            image: "/images/services/commercial.jpg".to_string(),
            features: strings(&["After-hours work", "Strata compliance", "Project management"]),
        },
    ]
}

fn default_gallery() -> Vec<GalleryItem> {
    vec![
        GalleryItem {
            id: 1,
            title: "Harbourside Living Room".to_string(),
            category: GalleryCategory::Painting,
            image_url: "/images/gallery/living-room.jpg".to_string(),
            description: "Full interior repaint in a warm neutral palette.".to_string(),
        },
        GalleryItem {
            id: 2,
            title: "Heritage Ceiling Restoration".to_string(),
            category: GalleryCategory::Plastering,
            image_url: "/images/gallery/ceiling.jpg".to_string(),
            description: "Ornate cornice repair and skim coat.".to_string(),
        },
        GalleryItem {
            id: 3,
            title: "CBD Office Fit-out".to_string(),
            category: GalleryCategory::Commercial,
            image_url: "/images/gallery/office.jpg".to_string(),
            description: "Three floors painted over two weekends.".to_string(),
        },
    ]
}

fn default_about() -> AboutContent {
    AboutContent {
        title: "Our Story".to_string(),
        subtitle: "Painting and plastering experts serving Greater Sydney since 2008.".to_string(),
        hero_image: "/images/about-hero.jpg".to_string(),
        story: strings(&[
            "Shield Finishing Services started with one van and a simple promise: \
             do the preparation properly and the finish takes care of itself.",
            "Today our team of qualified tradespeople handles everything from \
             single-room refreshes to **multi-storey commercial** projects.",
        ]),
        philosophy: vec![
            PhilosophyItem {
                id: 1,
                kind: "Award".to_string(),
                title: "Quality".to_string(),
                desc: "Premium materials and proven techniques.".to_string(),
            },
            PhilosophyItem {
                id: 2,
                kind: "Target".to_string(),
                title: "Precision".to_string(),
                desc: "Clean lines and attention to detail.".to_string(),
            },
            PhilosophyItem {
                id: 3,
                kind: "Shield".to_string(),
                title: "Protection".to_string(),
                desc: "Fully licensed and insured.".to_string(),
            },
            PhilosophyItem {
                id: 4,
                kind: "Heart".to_string(),
                title: "Care".to_string(),
                desc: "We treat your home like our own.".to_string(),
            },
        ],
    }
}
