//! Per-depth bit-plane storage (spec §3 "BitStack", §9 "BitStack beyond 64").
//!
//! Each plane answers a single yes/no question about the container at a
//! given depth. The first 64 depths live in a `u64` fast path; depths 64
//! and beyond spill into a [`bitvec::vec::BitVec`], grounded in
//! `estuary-flow/crates/json/src/validator.rs`'s own
//! `bitvec::prelude::BitVec<LocalBits>` use for exactly this kind of
//! per-index boolean state.

use bitvec::vec::BitVec;

/// One boolean per container depth, split into a 64-bit fast path and a
/// growable spillover for depths >= 64.
#[derive(Debug, Clone, Default)]
struct DepthPlane {
    fast: u64,
    spill: BitVec,
}

impl DepthPlane {
    fn get(&self, depth: usize) -> bool {
        if depth < 64 {
            (self.fast >> depth) & 1 != 0
        } else {
            self.spill
                .get(depth - 64)
                .map(|b| *b)
                .unwrap_or(false)
        }
    }

    fn set(&mut self, depth: usize, value: bool) {
        if depth < 64 {
            if value {
                self.fast |= 1 << depth;
            } else {
                self.fast &= !(1 << depth);
            }
        } else {
            let index = depth - 64;
            if index >= self.spill.len() {
                self.spill.resize(index + 1, false);
            }
            self.spill.set(index, value);
        }
    }

    /// Drop any state recorded for `depth` and beyond.
    fn truncate(&mut self, depth: usize) {
        if depth < 64 {
            let keep_mask = (1u64 << depth).wrapping_sub(1);
            self.fast &= keep_mask;
            self.spill.clear();
        } else {
            self.spill.truncate(depth - 64);
        }
    }
}

/// Tracks, per container depth: whether the container is an object (expects
/// `PropertyName` tokens), a map (expects `=>` arrows between key and
/// value), a tuple (closes with `)` rather than `]`), and — reusing the same
/// fast-path/spillover machinery — whether a map at that depth is currently
/// awaiting its arrow-then-value (`arrow_pending`).
///
/// A writer and a reader each own one independent `BitStack`; the shapes are
/// identical (spec §4.3: "A bit-stack identical in shape to the reader's").
#[derive(Debug, Clone, Default)]
pub struct BitStack {
    depth: usize,
    in_object: DepthPlane,
    is_map: DepthPlane,
    is_tuple: DepthPlane,
    arrow_pending: DepthPlane,
}

impl BitStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Push a new container level. `in_object`/`is_map`/`is_tuple` classify
    /// the container being opened; the new depth's `arrow_pending` bit
    /// always starts cleared (a map's first item is a key).
    pub fn push(&mut self, in_object: bool, is_map: bool, is_tuple: bool) {
        let depth = self.depth;
        self.in_object.set(depth, in_object);
        self.is_map.set(depth, is_map);
        self.is_tuple.set(depth, is_tuple);
        self.arrow_pending.set(depth, false);
        self.depth += 1;
    }

    /// Pop the innermost container level.
    pub fn pop(&mut self) {
        debug_assert!(self.depth > 0, "BitStack popped past the root");
        if self.depth > 0 {
            self.depth -= 1;
            self.in_object.truncate(self.depth);
            self.is_map.truncate(self.depth);
            self.is_tuple.truncate(self.depth);
            self.arrow_pending.truncate(self.depth);
        }
    }

    fn current_depth(&self) -> Option<usize> {
        self.depth.checked_sub(1)
    }

    pub fn is_in_object(&self) -> bool {
        self.current_depth()
            .map(|d| self.in_object.get(d))
            .unwrap_or(false)
    }

    pub fn is_in_map(&self) -> bool {
        self.current_depth()
            .map(|d| self.is_map.get(d))
            .unwrap_or(false)
    }

    pub fn is_in_tuple(&self) -> bool {
        self.current_depth()
            .map(|d| self.is_tuple.get(d))
            .unwrap_or(false)
    }

    /// Whether the current map depth has consumed its `=>` and is now
    /// expecting a value (as opposed to a key).
    pub fn map_awaiting_value(&self) -> bool {
        self.current_depth()
            .map(|d| self.arrow_pending.get(d))
            .unwrap_or(false)
    }

    /// Record that `=>` has just been consumed: the next token is a value.
    pub fn set_map_awaiting_value(&mut self, value: bool) {
        if let Some(d) = self.current_depth() {
            self.arrow_pending.set(d, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_nesting_past_64() {
        let mut stack = BitStack::new();
        for i in 0..70 {
            stack.push(i % 2 == 0, false, false);
        }
        assert_eq!(stack.depth(), 70);
        assert!(stack.is_in_object());
        stack.pop();
        assert!(!stack.is_in_object());
    }

    #[test]
    fn map_arrow_state_round_trips() {
        let mut stack = BitStack::new();
        stack.push(false, true, false);
        assert!(!stack.map_awaiting_value());
        stack.set_map_awaiting_value(true);
        assert!(stack.map_awaiting_value());
        stack.push(false, false, false);
        assert!(!stack.map_awaiting_value());
        stack.pop();
        assert!(stack.map_awaiting_value());
    }

    #[test]
    fn pop_clears_spillover_state() {
        let mut stack = BitStack::new();
        for _ in 0..66 {
            stack.push(true, false, false);
        }
        stack.pop();
        stack.pop();
        stack.push(false, false, true);
        assert!(stack.is_in_tuple());
        assert!(!stack.is_in_object());
    }
}
