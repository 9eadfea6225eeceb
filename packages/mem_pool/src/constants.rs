// A poisoned pool lock means an element may have been left half-reset or half-mutated by a
// panicking caller. Handing that element out again is not something we can make safe, so we panic.
pub(crate) const ERR_POISONED_LOCK: &str = "encountered poisoned pool lock - a previous \
    operation panicked while holding it and the pooled elements may be in an inconsistent state";
