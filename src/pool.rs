//! Process-wide shared byte pool (spec §5 "Shared resources").
//!
//! The only global mutable state in the crate (spec §9 "Global mutable
//! state"): a free-list of previously-used `Vec<u8>` buffers, so that
//! repeatedly parsing short-lived [`crate::doc::Document`]s doesn't
//! allocate and free a fresh backing buffer every time. Grounded in the
//! same "lazily-initialized, process-lifetime, no teardown" shape the
//! teacher uses for its own `OnceCell`-backed tables (`src/lib.rs`,
//! `CombinedTokenizer::debug`), generalized from `OnceCell` to
//! `once_cell::sync::Lazy` since this state is shared across threads
//! rather than owned by one tokenizer instance.

use once_cell::sync::Lazy;
use std::sync::Mutex;

const MAX_POOLED_BUFFERS: usize = 32;

static FREE_LIST: Lazy<Mutex<Vec<Vec<u8>>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Take a buffer with at least `min_capacity` spare capacity from the pool,
/// or allocate a fresh one if the pool is empty or every pooled buffer is
/// too small.
pub fn rent(min_capacity: usize) -> Vec<u8> {
    let mut free_list = FREE_LIST.lock().expect("byte pool mutex poisoned");
    if let Some(pos) = free_list.iter().position(|b| b.capacity() >= min_capacity) {
        let mut buf = free_list.swap_remove(pos);
        buf.clear();
        buf
    } else {
        Vec::with_capacity(min_capacity)
    }
}

/// Return a buffer to the pool for a future [`rent`] call. The caller
/// relinquishes ownership; buffers beyond [`MAX_POOLED_BUFFERS`] are simply
/// dropped rather than grown without bound.
pub fn release(mut buf: Vec<u8>) {
    buf.clear();
    let mut free_list = FREE_LIST.lock().expect("byte pool mutex poisoned");
    if free_list.len() < MAX_POOLED_BUFFERS {
        free_list.push(buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rented_buffer_is_reused_after_release() {
        let buf = rent(64);
        let cap = buf.capacity();
        assert!(cap >= 64);
        release(buf);
        let buf2 = rent(64);
        assert!(buf2.capacity() >= 64);
    }
}
