use tracing::{debug, trace};

use super::{Module, ModuleRegistry};

/// Deliver an external refresh signal to every module that supports it.
///
/// Walks the start, center and end lists in that order, each in list order.
/// Modules without the [`Refresh`](super::Refresh) capability are skipped.
/// Returns how many modules were refreshed.
pub fn route_signal<M: Module + ?Sized>(registry: &ModuleRegistry<M>, signal: i32) -> usize {
    let mut refreshed = 0;

    for entry in registry.entries() {
        let Ok(mut module) = entry.module().try_borrow_mut() else {
            debug!("{}: busy, dropping signal {}", entry.name(), signal);
            continue;
        };
        if let Some(refresher) = module.refresher() {
            trace!("{}: refresh on signal {}", entry.name(), signal);
            refresher.refresh(signal);
            refreshed += 1;
        }
    }

    refreshed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BarConfig;
    use crate::testing::FakeFactory;
    use serde_json::json;

    #[test]
    fn test_signal_reaches_refreshable_modules_in_order() {
        let mut config = BarConfig::resolve(&json!({
            "modules-left": ["m1", "refresh/m2"],
            "modules-center": ["refresh/m3"],
            "modules-right": [],
        }))
        .unwrap();
        let factory = FakeFactory::default();
        let registry = ModuleRegistry::build(&mut config, &factory);

        let refreshed = route_signal(&registry, 10);

        assert_eq!(refreshed, 2);
        assert_eq!(*factory.log().borrow(), ["refresh/m2 10", "refresh/m3 10"]);
    }

    #[test]
    fn test_signal_walks_end_list_in_stored_order() {
        let mut config = BarConfig::resolve(&json!({
            "modules-left": ["refresh/s"],
            "modules-right": ["refresh/a", "refresh/b"],
        }))
        .unwrap();
        let factory = FakeFactory::default();
        let registry = ModuleRegistry::build(&mut config, &factory);

        registry.handle_signal(4);

        assert_eq!(
            *factory.log().borrow(),
            ["refresh/s 4", "refresh/b 4", "refresh/a 4"]
        );
    }

    #[test]
    fn test_signal_without_modules() {
        let mut config = BarConfig::resolve(&json!({})).unwrap();
        let factory = FakeFactory::default();
        let registry = ModuleRegistry::build(&mut config, &factory);
        assert_eq!(route_signal(&registry, 1), 0);
    }
}
