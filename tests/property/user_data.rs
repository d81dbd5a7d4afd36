//! Property-based tests for the user-data store

use actx::context::{UserDataKey, UserDataStore};
use proptest::prelude::*;
use std::collections::HashMap;

const NAMES: [&str; 4] = ["place", "modifiers", "presentation", "origin"];

/// A sequence of puts and removals behaves like a plain map.
#[test]
fn test_user_data_matches_map_model() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &prop::collection::vec((0..NAMES.len(), prop::option::of(any::<i64>())), 0..40),
            |ops| {
                let store = UserDataStore::new();
                let mut model: HashMap<&'static str, i64> = HashMap::new();

                for (index, value) in ops {
                    let key = UserDataKey::<i64>::new(NAMES[index]);
                    store.put(&key, value);
                    match value {
                        Some(v) => {
                            model.insert(NAMES[index], v);
                        }
                        None => {
                            model.remove(NAMES[index]);
                        }
                    }
                }

                for name in NAMES {
                    let key = UserDataKey::<i64>::new(name);
                    prop_assert_eq!(store.get(&key).map(|v| *v), model.get(name).copied());
                }
                prop_assert_eq!(store.len(), model.len());
                Ok(())
            },
        )
        .unwrap();
}
