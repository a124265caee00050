//! Static preview of the public site.
//!
//! Renders the public pages from the content currently held by the active
//! [`ContentProvider`](crate::provider::ContentProvider), so an editor can
//! check a change before deploying it. Every renderer reads content through
//! [`use_content`] and must run inside a provider scope.
//!
//! ## Generated Pages
//!
//! | File                | Content                                       |
//! |---------------------|-----------------------------------------------|
//! | `index.html`        | Hero, service teasers, call to action         |
//! | `services.html`     | Full service list with feature bullets        |
//! | `about.html`        | Story (markdown) and philosophy cards         |
//! | `gallery.html`      | Project grid, optionally filtered by category |
//! | `testimonials.html` | Review grid from the compiled-in list         |
//! | `contact.html`      | Contact details and instant chat link         |
//!
//! Every page carries a floating chat link built by [`whatsapp_url`].
//! Output is HTML-escaped by maud; only rendered markdown is inserted raw.

use crate::content::{ContactInfo, GalleryCategory, GalleryItem, TESTIMONIALS, Testimonial};
use crate::provider::use_content;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

const CSS: &str = include_str!("../templates/site.css");

pub const SITE_NAME: &str = "Shield Finishing Services";

/// Prefilled message of the floating chat link.
pub const QUOTE_MESSAGE: &str = "Hi Shield Finishing Services, I'd like to request a quote.";

/// Prefilled message of the contact page's instant quote button.
pub const INSTANT_QUOTE_MESSAGE: &str =
    "Hi SFS, I'm using your instant WhatsApp quote feature. I'll send photos and details now!";

pub const EMPTY_GALLERY_MESSAGE: &str = "No projects found in this category";

const PAGES: &[(&str, &str)] = &[
    ("index.html", "Home"),
    ("services.html", "Services"),
    ("about.html", "About"),
    ("gallery.html", "Gallery"),
    ("testimonials.html", "Testimonials"),
    ("contact.html", "Contact"),
];

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Gallery category selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GalleryFilter {
    #[default]
    All,
    Only(GalleryCategory),
}

impl GalleryFilter {
    pub fn matches(&self, item: &GalleryItem) -> bool {
        match self {
            GalleryFilter::All => true,
            GalleryFilter::Only(category) => item.category == *category,
        }
    }

    fn options() -> impl Iterator<Item = GalleryFilter> {
        std::iter::once(GalleryFilter::All)
            .chain(GalleryCategory::ALL.into_iter().map(GalleryFilter::Only))
    }
}

impl fmt::Display for GalleryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GalleryFilter::All => f.write_str("All"),
            GalleryFilter::Only(category) => write!(f, "{category}"),
        }
    }
}

impl FromStr for GalleryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            Ok(GalleryFilter::All)
        } else {
            s.parse().map(GalleryFilter::Only)
        }
    }
}

/// Chat deep link for `contact` with a prefilled `message`.
pub fn whatsapp_url(contact: &ContactInfo, message: &str) -> String {
    let number = contact.whatsapp.replace('+', "");
    let base = format!("https://wa.me/{number}");
    match url::Url::parse_with_params(&base, &[("text", message)]) {
        Ok(url) => url.to_string(),
        // Only reachable when the stored number is not URL-safe.
        Err(_) => base,
    }
}

/// Write every page into `output_dir`. Must run inside a provider scope.
pub fn render_site(output_dir: &Path, gallery_filter: GalleryFilter) -> Result<Vec<PathBuf>, SiteError> {
    fs::create_dir_all(output_dir)?;

    let pages = [
        ("index.html", render_home()),
        ("services.html", render_services()),
        ("about.html", render_about()),
        ("gallery.html", render_gallery(gallery_filter)),
        ("testimonials.html", render_testimonials()),
        ("contact.html", render_contact()),
    ];

    let mut written = Vec::with_capacity(pages.len());
    for (file, markup) in pages {
        let path = output_dir.join(file);
        fs::write(&path, markup.into_string())?;
        tracing::debug!(path = %path.display(), "page written");
        written.push(path);
    }
    tracing::info!(dir = %output_dir.display(), pages = written.len(), "preview rendered");
    Ok(written)
}

// ============================================================================
// HTML Components
// ============================================================================

/// Page shell with header, footer and the floating chat link.
fn base_document(title: &str, current: &str, content: Markup) -> Markup {
    let content_handle = use_content();
    let assets = content_handle.assets();
    let contact = content_handle.contact();

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " | " (SITE_NAME) }
                style { (PreEscaped(CSS)) }
            }
            body {
                (site_header(&assets.logo, current))
                main { (content) }
                (site_footer(&contact))
                a.whatsapp-fab href=(whatsapp_url(&contact, QUOTE_MESSAGE)) target="_blank" rel="noopener" {
                    "WhatsApp"
                }
            }
        }
    }
}

fn site_header(logo: &str, current: &str) -> Markup {
    html! {
        header.site-header {
            a href="index.html" {
                img src=(logo) alt=(SITE_NAME);
            }
            nav.site-nav {
                ul {
                    @for (file, label) in PAGES {
                        li class=[(*file == current).then_some("current")] {
                            a href=(file) { (label) }
                        }
                    }
                }
            }
        }
    }
}

fn site_footer(contact: &ContactInfo) -> Markup {
    html! {
        footer.site-footer {
            p { (SITE_NAME) }
            p {
                a href={ "tel:" (contact.phone.replace(' ', "")) } { (contact.phone) }
                " · "
                a href={ "mailto:" (contact.email) } { (contact.email) }
            }
            p { (contact.address) }
        }
    }
}

fn hero(image: &str, heading: Markup, tagline: &str) -> Markup {
    html! {
        section.hero style={ "background-image: url('" (image) "')" } {
            h1 { (heading) }
            p { (tagline) }
        }
    }
}

fn markdown_to_html(source: &str) -> String {
    let parser = Parser::new(source);
    let mut out = String::new();
    md_html::push_html(&mut out, parser);
    out
}

/// Icon for a philosophy card. Unknown names fall back to the shield.
fn philosophy_icon(kind: &str) -> &'static str {
    match kind {
        "Award" => "award",
        "Target" => "target",
        "Heart" => "heart",
        _ => "shield",
    }
}

// ============================================================================
// Pages
// ============================================================================

pub fn render_home() -> Markup {
    let content = use_content();
    let services = content.services();

    let body = html! {
        (hero(
            &content.assets().home.hero,
            html! { "Premium Painting & Plastering" },
            "Residential and commercial finishes across Greater Sydney.",
        ))
        section {
            h2 { "Our Core Services" }
            div.grid {
                @for service in &services {
                    article.card {
                        img src=(service.image) alt=(service.title) loading="lazy";
                        div.body {
                            h3 { (service.title) }
                            p { (service.description) }
                        }
                    }
                }
            }
        }
        section {
            h2 { "Shield Your Investment." }
            a href="contact.html" { "Get a free quote" }
        }
    };

    base_document("Home", "index.html", body)
}

pub fn render_services() -> Markup {
    let services = use_content().services();

    let body = html! {
        section {
            h1 { "Services" }
            div.grid {
                @for service in &services {
                    article.card id=(service.id) {
                        img src=(service.image) alt=(service.title) loading="lazy";
                        div.body {
                            h3 { (service.title) }
                            p { (service.description) }
                            ul {
                                @for feature in &service.features {
                                    li { (feature) }
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    base_document("Services", "services.html", body)
}

pub fn render_about() -> Markup {
    let about = use_content().about();

    let body = html! {
        (hero(&about.hero_image, html! { (about.title) }, &about.subtitle))
        section.story {
            @for paragraph in &about.story {
                (PreEscaped(markdown_to_html(paragraph)))
            }
        }
        section {
            div.grid {
                @for item in &about.philosophy {
                    article.card {
                        div.body {
                            span class={ "icon icon-" (philosophy_icon(&item.kind)) } {}
                            h3 { (item.title) }
                            p { (item.desc) }
                        }
                    }
                }
            }
        }
    };

    base_document(&about.title, "about.html", body)
}

pub fn render_gallery(filter: GalleryFilter) -> Markup {
    let items: Vec<GalleryItem> = use_content()
        .gallery()
        .into_iter()
        .filter(|item| filter.matches(item))
        .collect();

    let body = html! {
        section {
            h1 { "Visual Portfolio" }
            div.filters {
                @for option in GalleryFilter::options() {
                    a.active[option == filter] href="gallery.html" { (option) }
                }
            }
            @if items.is_empty() {
                p.empty { (EMPTY_GALLERY_MESSAGE) }
            } @else {
                div.grid.gallery {
                    @for item in &items {
                        figure.card {
                            img src=(item.image_url) alt=(item.title) loading="lazy";
                            figcaption.body {
                                h3 { (item.title) }
                                span.category { (item.category) }
                                p { (item.description) }
                            }
                        }
                    }
                }
            }
        }
    };

    base_document("Gallery", "gallery.html", body)
}

pub fn render_testimonials() -> Markup {
    let body = html! {
        section {
            h1 { "Client Voices" }
            p { "\"Expert work, transparent communication, and stunning results.\"" }
            (testimonial_grid(TESTIMONIALS))
        }
        section {
            h2 { "Experience the Shield Difference" }
        }
    };

    base_document("Testimonials", "testimonials.html", body)
}

fn testimonial_grid(reviews: &[Testimonial]) -> Markup {
    html! {
        div.grid.testimonials {
            @for review in reviews {
                blockquote.card {
                    div.body {
                        div.rating { @for _ in 0..review.rating { "★" } }
                        p { "\"" (review.content) "\"" }
                        footer {
                            strong { (review.name) }
                            " " (review.location) " • " (review.date)
                        }
                    }
                }
            }
        }
    }
}

pub fn render_contact() -> Markup {
    let contact = use_content().contact();

    let body = html! {
        section {
            h1 { "Let's finish it right." }
            dl {
                dt { "Phone" }
                dd { a href={ "tel:" (contact.phone.replace(' ', "")) } { (contact.phone) } }
                dt { "Email" }
                dd { a href={ "mailto:" (contact.email) } { (contact.email) } }
                dt { "Service area" }
                dd { (contact.address) }
            }
            a.instant-quote href=(whatsapp_url(&contact, INSTANT_QUOTE_MESSAGE)) target="_blank" rel="noopener" {
                "Instant WhatsApp quote"
            }
        }
        section {
            h2 { "Request a Site Visit" }
            p { "Attach photos of the job with " code { "shield-cms uploads add" } "." }
        }
    };

    base_document("Contact", "contact.html", body)
}
