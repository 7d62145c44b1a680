//! Property-based tests for resolution
//!
//! These tests verify identity, freshness and argument ordering for arbitrary
//! graphs rather than hand-picked ones.

use proptest::prelude::*;
use quarry::{RegisterOptions, Registry};
use std::collections::HashSet;
use std::sync::Arc;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn value_resolves_to_registered_value(value in "\\PC{0,50}") {
        let mut registry = Registry::new();
        registry.register_value("Value", value.clone()).unwrap();
        let container = registry.seal().unwrap();

        let resolved = runtime().block_on(container.resolve_as::<String>("Value")).unwrap();
        prop_assert_eq!(&*resolved, &value);
    }

    #[test]
    fn dependencies_arrive_in_declaration_order(order in Just((0..8usize).collect::<Vec<_>>()).prop_shuffle()) {
        let mut registry = Registry::new();
        for i in 0..8usize {
            registry.register_value(format!("V{}", i), i).unwrap();
        }
        let names: Vec<String> = order.iter().map(|i| format!("V{}", i)).collect();
        registry
            .register_factory("Recorder", RegisterOptions::transient().depends_on(names), |deps| {
                (0..deps.len())
                    .map(|i| deps.get_cloned::<usize>(i))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(Into::into)
            })
            .unwrap();
        let container = registry.seal().unwrap();

        let recorded = runtime().block_on(container.resolve_as::<Vec<usize>>("Recorder")).unwrap();
        prop_assert_eq!(&*recorded, &order);
    }

    #[test]
    fn singletons_are_shared_and_transients_are_fresh(calls in 1usize..16, singleton in any::<bool>()) {
        let options = if singleton { RegisterOptions::singleton() } else { RegisterOptions::transient() };
        let mut registry = Registry::new();
        registry.register_factory("Component", options, |_| Ok(String::from("component"))).unwrap();
        let container = registry.seal().unwrap();

        let rt = runtime();
        let resolved: Vec<Arc<String>> = (0..calls)
            .map(|_| rt.block_on(container.resolve_as::<String>("Component")).unwrap())
            .collect();

        let distinct: HashSet<*const String> = resolved.iter().map(Arc::as_ptr).collect();
        let expected = if singleton { 1 } else { calls };
        prop_assert_eq!(distinct.len(), expected);
    }

    #[test]
    fn chains_of_any_length_seal_and_resolve(len in 1usize..40, cut in any::<prop::sample::Index>()) {
        let mut registry = Registry::new();
        registry.register_factory("C0", RegisterOptions::singleton(), |_| Ok(0usize)).unwrap();
        for i in 1..len {
            registry
                .register_factory(
                    format!("C{}", i),
                    RegisterOptions::singleton().depends_on([format!("C{}", i - 1)]),
                    |deps| Ok(*deps.get::<usize>(0)? + 1),
                )
                .unwrap();
        }
        let container = registry.seal().unwrap();

        let target = cut.index(len);
        let value = runtime().block_on(container.resolve_as::<usize>(&format!("C{}", target))).unwrap();
        prop_assert_eq!(*value, target);
        prop_assert_eq!(container.cached_singletons(), target + 1);
    }
}
