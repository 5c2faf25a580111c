//! Lifecycle registries: objects notified when the surface reopens or closes.
//!
//! Entries are weak: registering does not keep an object alive, and an
//! object dropped without unregistering is skipped and pruned on the next
//! run. Both registries snapshot their entry list before iterating, so a
//! callback may register or unregister entries (itself included) while a
//! run is in progress. The snapshot is what runs: an entry unregistered
//! mid-run by a sibling is still invoked if it was in the snapshot.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Needs reinitialising after the surface (and its GPU context) is recreated.
pub trait Reload {
    fn reload(&mut self);
}

/// Holds resources that must be released when the surface closes.
pub trait Release {
    fn release(&mut self);
}

struct Registry<C: ?Sized> {
    entries: RefCell<Vec<Weak<RefCell<C>>>>,
}

impl<C: ?Sized> Registry<C> {
    fn new() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
        }
    }

    fn push(&self, entry: Weak<RefCell<C>>) {
        self.entries.borrow_mut().push(entry);
    }

    fn remove(&self, target: *const ()) -> usize {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|e| e.as_ptr() as *const () != target);
        before - entries.len()
    }

    fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Run `f` over a snapshot of the entries. Returns how many were invoked.
    fn run(&self, name: &str, mut f: impl FnMut(&mut C)) -> usize {
        let snapshot: Vec<_> = self.entries.borrow().clone();
        let mut invoked = 0;
        for entry in snapshot {
            let Some(obj) = entry.upgrade() else {
                continue;
            };
            match obj.try_borrow_mut() {
                Ok(mut obj) => {
                    f(&mut *obj);
                    invoked += 1;
                }
                Err(_) => log::warn!("{name}: entry is already borrowed, skipping"),
            };
        }
        self.entries.borrow_mut().retain(|e| e.strong_count() > 0);
        invoked
    }
}

/// Registry of objects to `reload()` after the surface is recreated.
pub struct Refresher {
    registry: Registry<dyn Reload>,
}

impl Refresher {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
        }
    }

    /// Register an object. Registering twice reloads it twice.
    pub fn register<T: Reload + 'static>(&self, obj: &Rc<RefCell<T>>) {
        let weak: Weak<RefCell<T>> = Rc::downgrade(obj);
        self.registry.push(weak as Weak<RefCell<dyn Reload>>);
    }

    /// Remove every registration of `obj`. Returns how many were removed.
    pub fn unregister<T: Reload + 'static>(&self, obj: &Rc<RefCell<T>>) -> usize {
        self.registry.remove(Rc::as_ptr(obj) as *const ())
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reload every live entry in insertion order
    pub fn run(&self) -> usize {
        let reloaded = self.registry.run("refresher", |obj| obj.reload());
        log::debug!("Reloaded {reloaded} object(s)");
        reloaded
    }
}

impl Default for Refresher {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry of objects to `release()` when the surface closes.
pub struct TrashCollector {
    registry: Registry<dyn Release>,
}

impl TrashCollector {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
        }
    }

    /// Register an object. Registering twice releases it twice.
    pub fn register<T: Release + 'static>(&self, obj: &Rc<RefCell<T>>) {
        let weak: Weak<RefCell<T>> = Rc::downgrade(obj);
        self.registry.push(weak as Weak<RefCell<dyn Release>>);
    }

    /// Remove every registration of `obj`. Returns how many were removed.
    pub fn unregister<T: Release + 'static>(&self, obj: &Rc<RefCell<T>>) -> usize {
        self.registry.remove(Rc::as_ptr(obj) as *const ())
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Release every live entry of a snapshot taken before the first callback
    pub fn run(&self) -> usize {
        let released = self.registry.run("trash collector", |obj| obj.release());
        log::debug!("Released {released} object(s)");
        released
    }
}

impl Default for TrashCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        reloads: u32,
        releases: u32,
    }

    impl Counter {
        fn shared() -> Rc<RefCell<Self>> {
            Rc::new(RefCell::new(Self {
                reloads: 0,
                releases: 0,
            }))
        }
    }

    impl Reload for Counter {
        fn reload(&mut self) {
            self.reloads += 1;
        }
    }

    impl Release for Counter {
        fn release(&mut self) {
            self.releases += 1;
        }
    }

    struct Ordered {
        name: &'static str,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl Reload for Ordered {
        fn reload(&mut self) {
            self.log.borrow_mut().push(self.name);
        }
    }

    #[test]
    fn test_refresher_reloads_in_insertion_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let refresher = Refresher::new();
        let objs: Vec<_> = ["first", "second", "third"]
            .into_iter()
            .map(|name| {
                Rc::new(RefCell::new(Ordered {
                    name,
                    log: log.clone(),
                }))
            })
            .collect();
        for obj in &objs {
            refresher.register(obj);
        }

        assert_eq!(refresher.run(), 3);
        assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_duplicate_registration_duplicates_invocation() {
        let collector = TrashCollector::new();
        let obj = Counter::shared();
        collector.register(&obj);
        collector.register(&obj);

        assert_eq!(collector.run(), 2);
        assert_eq!(obj.borrow().releases, 2);

        assert_eq!(collector.unregister(&obj), 2);
        assert!(collector.is_empty());
    }

    #[test]
    fn test_registration_does_not_keep_objects_alive() {
        let refresher = Refresher::new();
        let alive = Counter::shared();
        {
            let dropped = Counter::shared();
            refresher.register(&dropped);
        }
        refresher.register(&alive);
        assert_eq!(refresher.len(), 2);

        assert_eq!(refresher.run(), 1);
        assert_eq!(alive.borrow().reloads, 1);
        assert_eq!(refresher.len(), 1);
    }

    struct Sibling {
        collector: Rc<TrashCollector>,
        victim: Option<Rc<RefCell<Counter>>>,
        released: bool,
    }

    impl Release for Sibling {
        fn release(&mut self) {
            if let Some(victim) = self.victim.take() {
                self.collector.unregister(&victim);
            }
            self.released = true;
        }
    }

    #[test]
    fn test_release_unregistering_a_sibling_completes_snapshot() {
        let collector = Rc::new(TrashCollector::new());
        let before = Counter::shared();
        let victim = Counter::shared();
        let after = Counter::shared();
        let killer = Rc::new(RefCell::new(Sibling {
            collector: collector.clone(),
            victim: Some(victim.clone()),
            released: false,
        }));

        collector.register(&before);
        collector.register(&killer);
        collector.register(&victim);
        collector.register(&after);

        assert_eq!(collector.run(), 4);
        assert_eq!(before.borrow().releases, 1);
        assert!(killer.borrow().released);
        assert_eq!(victim.borrow().releases, 1);
        assert_eq!(after.borrow().releases, 1);

        // the sibling is gone for the next run
        assert_eq!(collector.len(), 3);
        assert_eq!(collector.run(), 3);
        assert_eq!(victim.borrow().releases, 1);
    }

    struct SelfRemoving {
        collector: Rc<TrashCollector>,
        me: Weak<RefCell<SelfRemoving>>,
        releases: u32,
    }

    impl Release for SelfRemoving {
        fn release(&mut self) {
            self.releases += 1;
            if let Some(me) = self.me.upgrade() {
                self.collector.unregister(&me);
            }
        }
    }

    #[test]
    fn test_release_may_unregister_itself() {
        let collector = Rc::new(TrashCollector::new());
        let obj = Rc::new_cyclic(|me| {
            RefCell::new(SelfRemoving {
                collector: collector.clone(),
                me: me.clone(),
                releases: 0,
            })
        });
        let other = Counter::shared();
        collector.register(&obj);
        collector.register(&other);

        assert_eq!(collector.run(), 2);
        assert_eq!(obj.borrow().releases, 1);
        assert_eq!(other.borrow().releases, 1);
        assert_eq!(collector.len(), 1);
    }
}
