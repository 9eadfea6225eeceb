use std::any::{Any, TypeId};
use std::sync::{Arc, LazyLock, Mutex};

use crate::constants::ERR_POISONED_LOCK;

/// Process-wide storage for one value per type, used to give every element type its own global
/// registry without a generic static (which Rust does not have).
static GLOBALS: LazyLock<Mutex<foldhash::HashMap<TypeId, Arc<dyn Any + Send + Sync>>>> =
    LazyLock::new(|| Mutex::new(foldhash::HashMap::default()));

/// Returns the process-wide value of type `V`, creating it with `init` on first use.
///
/// The value lives until the process exits.
pub(crate) fn global<V, I>(init: I) -> Arc<V>
where
    V: Any + Send + Sync,
    I: FnOnce() -> V,
{
    let mut globals = GLOBALS.lock().expect(ERR_POISONED_LOCK);

    let entry = globals
        .entry(TypeId::of::<V>())
        .or_insert_with(|| Arc::new(init()));

    Arc::clone(entry)
        .downcast::<V>()
        .expect("global entries are always keyed by the TypeId of their own value")
}
