use std::cell::RefCell;
use std::rc::{Rc, Weak};

use compact_str::CompactString;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::{normalize_alt_click, route_signal, Module, ModuleFactory, Slot, UpdateSignal};
use crate::config::BarConfig;

/// Module shared between its list and in-flight update handlers
pub type SharedModule<M> = Rc<RefCell<Box<M>>>;

/// A module placed in a slot, with its update trigger
pub struct ModuleEntry<M: ?Sized> {
    name: CompactString,
    module: SharedModule<M>,
    trigger: UpdateSignal,
}

impl<M: ?Sized> ModuleEntry<M> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn module(&self) -> &SharedModule<M> {
        &self.module
    }

    pub fn trigger(&self) -> &UpdateSignal {
        &self.trigger
    }
}

/// The three module lists of one bar
pub struct ModuleRegistry<M: ?Sized> {
    start: Vec<ModuleEntry<M>>,
    center: Vec<ModuleEntry<M>>,
    end: Vec<ModuleEntry<M>>,
}

impl<M: ?Sized> Default for ModuleRegistry<M> {
    fn default() -> Self {
        Self {
            start: Vec::new(),
            center: Vec::new(),
            end: Vec::new(),
        }
    }
}

impl<M: Module + ?Sized + 'static> ModuleRegistry<M> {
    /// Build every configured module.
    ///
    /// Alt-format click bindings in `config` are normalized first. A module
    /// that fails to build is logged and left out. The end list is reversed
    /// so that index 0 is the module nearest the center.
    pub fn build<F>(config: &mut BarConfig, factory: &F) -> Self
    where
        F: ModuleFactory<Module = M>,
    {
        let names: Vec<CompactString> = Slot::ALL
            .iter()
            .flat_map(|slot| config.modules(*slot).iter().cloned())
            .collect();
        normalize_alt_click(config.raw_mut(), &names);

        let mut registry = Self::default();
        for slot in Slot::ALL {
            for name in config.modules(slot) {
                let fragment = config.module_config(name).unwrap_or(&Value::Null);
                if let Some(entry) = Self::make_entry(factory, name, fragment) {
                    registry.list_mut(slot).push(entry);
                }
            }
        }
        registry.end.reverse();

        info!(
            "Loaded {} modules ({} start, {} center, {} end)",
            registry.len(),
            registry.start.len(),
            registry.center.len(),
            registry.end.len()
        );
        registry
    }

    fn make_entry<F>(factory: &F, name: &CompactString, fragment: &Value) -> Option<ModuleEntry<M>>
    where
        F: ModuleFactory<Module = M>,
    {
        let trigger = UpdateSignal::new();
        let module = match factory.make_module(name, fragment, trigger.clone()) {
            Ok(module) => Rc::new(RefCell::new(module)),
            Err(e) => {
                warn!("module {}: {}", name, e);
                return None;
            }
        };

        let weak: Weak<RefCell<Box<M>>> = Rc::downgrade(&module);
        let handler_name = name.clone();
        trigger.connect(move || {
            // Released modules ignore late triggers
            let Some(module) = weak.upgrade() else {
                return;
            };
            let Ok(mut module) = module.try_borrow_mut() else {
                debug!("{}: update already running, skipping", handler_name);
                return;
            };
            if let Err(e) = module.update() {
                error!("{}: {}", handler_name, e);
            }
        });

        Some(ModuleEntry {
            name: name.clone(),
            module,
            trigger,
        })
    }

    /// Forward an external refresh signal, see [`route_signal`]
    pub fn handle_signal(&self, signal: i32) -> usize {
        route_signal(self, signal)
    }
}

impl<M: ?Sized> ModuleRegistry<M> {
    pub fn list(&self, slot: Slot) -> &[ModuleEntry<M>] {
        match slot {
            Slot::Start => &self.start,
            Slot::Center => &self.center,
            Slot::End => &self.end,
        }
    }

    fn list_mut(&mut self, slot: Slot) -> &mut Vec<ModuleEntry<M>> {
        match slot {
            Slot::Start => &mut self.start,
            Slot::Center => &mut self.center,
            Slot::End => &mut self.end,
        }
    }

    /// All entries: start, then center, then end
    pub fn entries(&self) -> impl Iterator<Item = &ModuleEntry<M>> {
        self.start.iter().chain(self.center.iter()).chain(self.end.iter())
    }

    pub fn len(&self) -> usize {
        self.start.len() + self.center.len() + self.end.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Release every module, whether or not an update is running.
    ///
    /// Handlers only hold weak references, so a module borrowed by a running
    /// update is dropped when that update returns.
    pub fn clear(&mut self) {
        for entry in self.entries() {
            entry.trigger.disconnect_all();
        }
        self.start.clear();
        self.center.clear();
        self.end.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeFactory;
    use serde_json::json;

    fn names<M: Module + ?Sized>(registry: &ModuleRegistry<M>, slot: Slot) -> Vec<String> {
        registry
            .list(slot)
            .iter()
            .map(|e| e.module().borrow().name().to_string())
            .collect()
    }

    #[test]
    fn test_end_list_is_reversed() {
        let mut config = BarConfig::resolve(&json!({
            "modules-left": ["l1", "l2"],
            "modules-center": ["c1"],
            "modules-right": ["a", "b", "c"],
        }))
        .unwrap();
        let factory = FakeFactory::default();

        let registry = ModuleRegistry::build(&mut config, &factory);

        assert_eq!(names(&registry, Slot::Start), ["l1", "l2"]);
        assert_eq!(names(&registry, Slot::Center), ["c1"]);
        assert_eq!(names(&registry, Slot::End), ["c", "b", "a"]);
        assert_eq!(registry.len(), 6);
    }

    #[test]
    fn test_failed_module_is_skipped() {
        let mut config = BarConfig::resolve(&json!({
            "modules-left": ["ok1", "broken", "ok2"],
            "modules-right": ["broken", "ok3"],
        }))
        .unwrap();
        let factory = FakeFactory::failing(["broken"]);

        let registry = ModuleRegistry::build(&mut config, &factory);

        assert_eq!(names(&registry, Slot::Start), ["ok1", "ok2"]);
        assert_eq!(names(&registry, Slot::End), ["ok3"]);
        assert_eq!(factory.attempts(), 5);
    }

    #[test]
    fn test_factory_receives_normalized_fragment() {
        let mut config = BarConfig::resolve(&json!({
            "modules-center": ["clock"],
            "clock": { "format-alt": "%F", "format-alt-click": "click-forward" },
        }))
        .unwrap();
        let factory = FakeFactory::default();

        let _registry = ModuleRegistry::build(&mut config, &factory);

        let seen = factory.fragment("clock").unwrap();
        assert_eq!(seen["format-alt-click"], json!(9));
        assert_eq!(config.raw()["clock"]["format-alt-click"], json!(9));
    }

    #[test]
    fn test_shared_fragment_is_normalized_once() {
        let mut config = BarConfig::resolve(&json!({
            "modules-left": ["clock"],
            "modules-right": ["clock"],
            "clock": { "format-alt": "%F", "format-alt-click": "click-right" },
        }))
        .unwrap();
        let factory = FakeFactory::default();

        let registry = ModuleRegistry::build(&mut config, &factory);

        assert_eq!(registry.len(), 2);
        assert_eq!(factory.fragment("clock").unwrap()["format-alt-click"], json!(3));
    }

    #[test]
    fn test_update_failure_is_contained() {
        let mut config = BarConfig::resolve(&json!({ "modules-left": ["fail-update", "fine"] }))
            .unwrap();
        let factory = FakeFactory::default();
        let registry = ModuleRegistry::build(&mut config, &factory);

        for entry in registry.entries() {
            entry.trigger().emit();
        }

        let log = factory.log();
        assert_eq!(*log.borrow(), ["update fail-update", "update fine"]);
    }

    #[test]
    fn test_clear_releases_modules_and_ignores_late_triggers() {
        let mut config =
            BarConfig::resolve(&json!({ "modules-left": ["a"], "modules-right": ["b"] })).unwrap();
        let factory = FakeFactory::default();
        let mut registry = ModuleRegistry::build(&mut config, &factory);

        let trigger = registry.list(Slot::Start)[0].trigger().clone();
        let weak = Rc::downgrade(registry.list(Slot::Start)[0].module());

        registry.clear();

        assert!(registry.is_empty());
        assert!(weak.upgrade().is_none());
        trigger.emit();
        assert!(factory.log().borrow().is_empty());
    }

    #[test]
    fn test_clear_during_update_is_safe() {
        let mut config = BarConfig::resolve(&json!({ "modules-left": ["a"] })).unwrap();
        let factory = FakeFactory::default();
        let mut registry = ModuleRegistry::build(&mut config, &factory);

        let module = registry.list(Slot::Start)[0].module().clone();
        let in_flight = module.borrow_mut();
        registry.clear();
        assert!(registry.is_empty());
        drop(in_flight);

        assert_eq!(Rc::strong_count(&module), 1);
    }
}
