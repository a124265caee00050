//! # shield-cms
//!
//! Content management for the Shield Finishing Services website. The public
//! site is a static front-end whose text, images and gallery come from one
//! content aggregate. This crate owns that aggregate: it persists edits,
//! renders a local preview, caches visitor uploads, and deploys by pushing
//! generated source files to the site repository, which triggers the host to
//! rebuild.
//!
//! # Data Flow
//!
//! ```text
//! storage.json ──load──▶ ContentStore ──provide──▶ use_content() ──▶ site (preview)
//!        ▲                    │
//!        └──────commit────────┘
//!                             │
//!                  export::build_file_set ──▶ sync (repository push)
//!                             └─────────────▶ export::build_archive (.zip)
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`kv`] | Persistent string slots (`storage.json`) behind the [`kv::KeyValueStore`] trait |
//! | [`content`] | Content data model and built-in defaults |
//! | [`store`] | Load/commit of the content aggregate, change subscriptions |
//! | [`provider`] | Scoped content access for renderers (`use_content`) |
//! | [`history`] | Recent-uploads cache, capped at six entries |
//! | [`upload`] | Contact-page upload simulation state machine |
//! | [`gate`] | Admin access key and persisted session flag |
//! | [`credentials`] | Repository token, owner and name for deploys |
//! | [`export`] | `constants.tsx` generation and project archive |
//! | [`sync`] | Repository contents API client, deploy state |
//! | [`site`] | Static HTML preview rendered with Maud |
//! | [`config`] | `config.toml` loading, validation and merging |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Wholesale Content Replacement
//!
//! Content is one versionless value. Editors produce a complete new value and
//! [`store::ContentStore::commit`] persists it in a single write. There is no
//! partial update and no merge, so the persisted slot and the in-memory value
//! never disagree about individual fields.
//!
//! ## Corrupt Data Is Not an Error
//!
//! An unreadable content blob or upload list is logged and replaced by the
//! default. A broken storage file must never lock an editor out of the tool.
//!
//! ## Deploy by Push
//!
//! There is no deploy API. The live site rebuilds whenever its repository
//! changes, so a deploy is a sequence of file writes through the contents
//! API, one file at a time, stopping at the first failure.

pub mod config;
pub mod content;
pub mod credentials;
pub mod export;
pub mod gate;
pub mod history;
pub mod kv;
pub mod output;
pub mod provider;
pub mod site;
pub mod store;
pub mod sync;
pub mod upload;

#[cfg(test)]
pub(crate) mod test_helpers;
