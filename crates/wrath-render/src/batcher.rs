//! Per-frame draw batching grouped by shared resource
//!
//! Drawables submitted during a frame are grouped by their `ResourceKey`.
//! On flush each group binds its resource once, draws every instance in
//! submission order, then unbinds. All batches are cleared by the flush,
//! whether or not it succeeded.

use crate::resource::{ResourceKey, ResourceTable};
use std::collections::HashMap;
use wrath_core::{Result, Transform};

/// The GPU side of the batcher: binds a resource, draws instances of it, unbinds.
pub trait RenderBackend<R> {
    fn bind(&mut self, key: ResourceKey, resource: &R) -> Result<()>;
    fn draw(&mut self, key: ResourceKey, transform: &Transform) -> Result<()>;
    fn unbind(&mut self, key: ResourceKey) -> Result<()>;
}

type UpdateFn = Box<dyn FnOnce(&mut Transform)>;

/// One instance to draw this frame
pub struct DrawRequest {
    pub transform: Transform,
    /// Runs just before the instance is drawn
    update: Option<UpdateFn>,
}

impl DrawRequest {
    pub fn new(transform: Transform) -> Self {
        Self {
            transform,
            update: None,
        }
    }

    pub fn with_update<F>(mut self, update: F) -> Self
    where
        F: FnOnce(&mut Transform) + 'static,
    {
        self.update = Some(Box::new(update));
        self
    }
}

impl From<Transform> for DrawRequest {
    fn from(transform: Transform) -> Self {
        Self::new(transform)
    }
}

/// Counts from one flush
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Groups bound and drawn
    pub groups: usize,
    /// Instances drawn
    pub draws: usize,
    /// Groups skipped because their resource is not loaded
    pub skipped: usize,
}

#[derive(Default)]
pub struct RenderBatcher {
    batches: HashMap<ResourceKey, Vec<DrawRequest>>,
    /// Keys in first-submission order, so flushes are reproducible
    order: Vec<ResourceKey>,
}

impl RenderBatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an instance for this frame's flush
    pub fn submit(&mut self, key: ResourceKey, request: impl Into<DrawRequest>) {
        let batch = self.batches.entry(key).or_insert_with(|| {
            self.order.push(key);
            Vec::new()
        });
        batch.push(request.into());
    }

    /// Instances queued for the next flush
    pub fn pending(&self) -> usize {
        self.batches.values().map(Vec::len).sum()
    }

    pub fn group_count(&self) -> usize {
        self.order.len()
    }

    /// Draw every queued instance, one bind/unbind per distinct key.
    pub fn flush<R>(
        &mut self,
        resources: &ResourceTable<R>,
        backend: &mut dyn RenderBackend<R>,
    ) -> Result<BatchStats> {
        let mut batches = std::mem::take(&mut self.batches);
        let order = std::mem::take(&mut self.order);
        let mut stats = BatchStats::default();

        for key in order {
            let Some(requests) = batches.remove(&key) else {
                continue;
            };
            let Some(resource) = resources.get(key) else {
                log::debug!(
                    "Skipping {} draw(s) for {key}: resource not loaded",
                    requests.len()
                );
                stats.skipped += 1;
                continue;
            };

            backend.bind(key, resource)?;
            let mut drawn = Ok(());
            for request in requests {
                let mut transform = request.transform;
                if let Some(update) = request.update {
                    update(&mut transform);
                }
                drawn = backend.draw(key, &transform);
                if drawn.is_err() {
                    break;
                }
                stats.draws += 1;
            }
            // a bound resource is always released, draw errors take precedence
            let unbound = backend.unbind(key);
            drawn.and(unbound)?;
            stats.groups += 1;
        }

        Ok(stats)
    }

    /// Drop everything queued without drawing it
    pub fn clear(&mut self) {
        self.batches.clear();
        self.order.clear();
    }
}
