// A poisoned lock means a producer or consumer panicked mid-operation. The collection itself stays
// consistent, but the protocol between the threads using it does not, so we panic too.
pub(crate) const ERR_POISONED_LOCK: &str = "encountered poisoned collection lock - a thread \
    panicked while pushing or popping and the producer/consumer protocol can no longer be trusted";
