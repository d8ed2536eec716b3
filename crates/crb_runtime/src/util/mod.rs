//! Utility modules.

mod appendable;

pub use appendable::Appendable;
pub(crate) use appendable::value_to_string;

use std::hash::Hash;

use ahash::RandomState;
use hashbrown::HashMap;

pub type FastHashMap<K, V> = HashMap<K, V, RandomState>;

fn fast_hasher() -> RandomState {
    RandomState::with_seeds(0, 0, 0, 0)
}

pub fn fast_map_new<K: Eq + Hash, V>() -> FastHashMap<K, V> {
    HashMap::with_hasher(fast_hasher())
}
