//! Content provider and consumer access.
//!
//! Presentation code never touches the [`ContentStore`] directly. A
//! [`ContentProvider`] opens a scope on the current thread with
//! [`ContentProvider::provide`]; inside it, [`use_content`] hands out a
//! [`ContentHandle`] that reads individual content fields and forwards
//! wholesale replacements to the store.
//!
//! Calling [`use_content`] with no provider in scope is a programming error
//! and panics, so a renderer can never run against uninitialized content.
//!
//! ```rust,ignore
//! let provider = ContentProvider::new(ContentStore::open(kv));
//! let html = provider.provide(|| site::render_home().into_string());
//! ```

use crate::content::{AboutContent, ContactInfo, GalleryItem, ServiceItem, SiteAssets, SiteContent};
use crate::store::{ContentStore, StoreError};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc::Receiver;

thread_local! {
    static ACTIVE: RefCell<Vec<ContentProvider>> = const { RefCell::new(Vec::new()) };
}

/// Owner of the content store for a rendering scope. Cheap to clone.
#[derive(Clone)]
pub struct ContentProvider {
    store: Rc<RefCell<ContentStore>>,
}

impl ContentProvider {
    pub fn new(store: ContentStore) -> Self {
        Self {
            store: Rc::new(RefCell::new(store)),
        }
    }

    /// Run `f` with this provider active. Scopes nest; the innermost wins.
    pub fn provide<R>(&self, f: impl FnOnce() -> R) -> R {
        ACTIVE.with(|active| active.borrow_mut().push(self.clone()));
        let _scope = ScopeGuard;
        f()
    }

    /// Receive every content value committed through this provider.
    pub fn subscribe(&self) -> Receiver<SiteContent> {
        self.store.borrow_mut().subscribe()
    }

    pub fn snapshot(&self) -> SiteContent {
        self.store.borrow().current().clone()
    }
}

// Pops the provider even if the scoped closure panics.
struct ScopeGuard;

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        ACTIVE.with(|active| {
            active.borrow_mut().pop();
        });
    }
}

/// Access the content of the innermost active provider.
///
/// # Panics
///
/// Panics when called outside [`ContentProvider::provide`].
pub fn use_content() -> ContentHandle {
    let provider = ACTIVE.with(|active| active.borrow().last().cloned());
    match provider {
        Some(provider) => ContentHandle { provider },
        None => panic!("use_content must be used within a ContentProvider"),
    }
}

/// Read/write view of the provided content.
pub struct ContentHandle {
    provider: ContentProvider,
}

impl ContentHandle {
    fn read<T>(&self, f: impl FnOnce(&SiteContent) -> T) -> T {
        f(self.provider.store.borrow().current())
    }

    pub fn assets(&self) -> SiteAssets {
        self.read(|c| c.assets.clone())
    }

    pub fn services(&self) -> Vec<ServiceItem> {
        self.read(|c| c.services.clone())
    }

    pub fn gallery(&self) -> Vec<GalleryItem> {
        self.read(|c| c.gallery.clone())
    }

    pub fn contact(&self) -> ContactInfo {
        self.read(|c| c.contact.clone())
    }

    pub fn about(&self) -> AboutContent {
        self.read(|c| c.about.clone())
    }

    /// Replace all content, persisting it and notifying subscribers.
    pub fn update_all(&self, new_content: SiteContent) -> Result<(), StoreError> {
        self.provider.store.borrow_mut().commit(new_content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{memory_kv, sample_content};

    fn provider() -> ContentProvider {
        ContentProvider::new(ContentStore::open(memory_kv()))
    }

    #[test]
    #[should_panic(expected = "use_content must be used within a ContentProvider")]
    fn use_content_outside_scope_panics() {
        let _ = use_content();
    }

    #[test]
    fn reads_fields_inside_scope() {
        let provider = provider();
        let phone = provider.provide(|| use_content().contact().phone);
        assert_eq!(phone, SiteContent::default().contact.phone);
    }

    #[test]
    fn update_all_commits_through_store() {
        let provider = provider();
        let rx = provider.subscribe();
        let content = sample_content();
        provider.provide(|| use_content().update_all(content.clone()).unwrap());
        assert_eq!(provider.snapshot(), content);
        assert_eq!(rx.try_recv().unwrap(), content);
    }

    #[test]
    fn scope_closes_after_provide() {
        let provider = provider();
        provider.provide(|| ());
        let result = std::panic::catch_unwind(|| {
            let _ = use_content();
        });
        assert!(result.is_err());
    }

    #[test]
    fn innermost_provider_wins() {
        let outer = provider();
        let inner = provider();
        inner
            .provide(|| use_content().update_all(sample_content()))
            .unwrap();
        let titles = outer.provide(|| {
            let outer_title = use_content().about().title;
            let inner_title = inner.provide(|| use_content().about().title);
            (outer_title, inner_title)
        });
        assert_eq!(titles.0, SiteContent::default().about.title);
        assert_eq!(titles.1, sample_content().about.title);
    }
}
