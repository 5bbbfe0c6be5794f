//! Adapter for generic multi-resource coordinators.
//!
//! A coordinator manages many loadable resources with priorities, tags and a
//! wall-clock timeout it owns itself. This module wraps a stylesheet load as
//! one such resource: the coordinator drives [`ResourcePlugin::start`] and
//! the plugin reports back through [`Coordinator::on_load`] or
//! [`Coordinator::on_timeout`]. The engine keeps loading after a timeout and
//! still runs its own batch callback if the resource eventually finishes.

use std::sync::Arc;

use crate::engine::handle::LoaderHandle;
use crate::engine::queue::{BatchCallback, ResourceKind, StyleEntry};

/// Callbacks a coordinator exposes to its resource plugins.
pub trait Coordinator: Send + Sync {
    /// The named resource finished loading.
    fn on_load(&self, name: &str);
    /// The coordinator stopped waiting for the named resource.
    fn on_timeout(&self, name: &str);
}

/// One loadable resource, as seen by a generic coordinator.
pub trait ResourcePlugin: Send + Sync {
    /// Begin loading; report completion through `coordinator`.
    fn start(&self, coordinator: Arc<dyn Coordinator>);
    /// The coordinator's deadline passed before completion was reported.
    fn on_timeout(&self, coordinator: Arc<dyn Coordinator>);
    /// Name used in the coordinator's diagnostics.
    fn name(&self) -> String;
}

/// Registry surface of a coordinator.
pub trait PluginHost {
    fn add(&mut self, plugin: Box<dyn ResourcePlugin>);
}

/// A stylesheet load request wrapped as a coordinator resource.
pub struct StyleResource {
    entries: Vec<StyleEntry>,
    /// Coordinator bookkeeping, carried but not interpreted here.
    tags: Vec<String>,
    priority: Option<u32>,
    loader: LoaderHandle,
}

impl StyleResource {
    pub fn new(
        entries: Vec<StyleEntry>,
        tags: Vec<String>,
        priority: Option<u32>,
        loader: LoaderHandle,
    ) -> Self {
        Self {
            entries,
            tags,
            priority,
            loader,
        }
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn priority(&self) -> Option<u32> {
        self.priority
    }
}

impl ResourcePlugin for StyleResource {
    fn start(&self, coordinator: Arc<dyn Coordinator>) {
        let loader = self.loader.clone();
        let entries = self.entries.clone();
        let name = self.name();

        tokio::spawn(async move {
            let done: BatchCallback = {
                let coordinator = coordinator.clone();
                let name = name.clone();
                Box::new(move |_| coordinator.on_load(&name))
            };

            if loader.load_styles(entries, Some(done), None).await.is_err() {
                // Engine gone. Report completion so the coordinator is not
                // left waiting on a load that can never happen.
                coordinator.on_load(&name);
            }
        });
    }

    fn on_timeout(&self, coordinator: Arc<dyn Coordinator>) {
        let loader = self.loader.clone();
        let name = self.name();

        tokio::spawn(async move {
            match loader.pending(ResourceKind::Style).await {
                // Still in flight: the deadline is real.
                Ok(true) => coordinator.on_timeout(&name),
                // Nothing pending (or the engine is gone): treat as complete.
                Ok(false) | Err(_) => coordinator.on_load(&name),
            }
        });
    }

    fn name(&self) -> String {
        self.entries
            .first()
            .map(|entry| entry.url.clone())
            .unwrap_or_default()
    }
}

/// Add a style-loading request to `host` and return the engine handle so the
/// caller can inspect pending state later.
pub fn register_styles(
    host: &mut dyn PluginHost,
    loader: &LoaderHandle,
    entries: Vec<StyleEntry>,
    tags: Vec<String>,
    priority: Option<u32>,
) -> LoaderHandle {
    host.add(Box::new(StyleResource::new(
        entries,
        tags,
        priority,
        loader.clone(),
    )));
    loader.clone()
}
