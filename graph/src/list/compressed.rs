use tracing::trace;

use super::replace::Replace;

/// Produces list elements from their predecessor.
///
/// Generation must be deterministic and free of side effects: the list
/// regenerates the same index many times and relies on getting equal values.
pub trait Generator<T> {
    /// Element at index 0
    fn generate_first(&self) -> T;

    /// Element at `prev_index + 1`, given the element at `prev_index`
    fn generate(&self, prev: &T, prev_index: usize) -> T;
}

/// A row-indexed list that only stores an anchor every `step` elements and
/// regenerates the rest on access.
///
/// Structural edits arrive as [`Replace`]s; [`CompressedList::recalculate`]
/// regenerates from the last anchor before the edit and stops as soon as it
/// meets an anchor past the edit whose stored value is still correct.
#[derive(Debug, Clone)]
pub struct CompressedList<T> {
    step: usize,
    size: usize,
    /// Sorted by index; the first anchor sits at 0 whenever the list is non-empty
    anchors: Vec<(usize, T)>,
}

impl<T: Clone + PartialEq> CompressedList<T> {
    pub fn new<G: Generator<T>>(size: usize, step: usize, generator: &G) -> Self {
        let step = step.max(1);
        let mut anchors = Vec::with_capacity(size / step + 1);
        if size > 0 {
            let mut current = generator.generate_first();
            anchors.push((0, current.clone()));
            for index in 1..size {
                current = generator.generate(&current, index - 1);
                if index % step == 0 {
                    anchors.push((index, current.clone()));
                }
            }
        }
        Self {
            step,
            size,
            anchors,
        }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn anchor_count(&self) -> usize {
        self.anchors.len()
    }

    pub fn get<G: Generator<T>>(&self, index: usize, generator: &G) -> Option<T> {
        if index >= self.size {
            return None;
        }
        let slot = match self.anchors.binary_search_by_key(&index, |(i, _)| *i) {
            Ok(slot) => slot,
            Err(slot) => slot.checked_sub(1)?,
        };
        let (start, anchor) = &self.anchors[slot];
        let mut at = *start;
        let mut current = anchor.clone();
        while at < index {
            current = generator.generate(&current, at);
            at += 1;
        }
        Some(current)
    }

    /// Apply a structural edit. The generator must already reflect the new state.
    ///
    /// Returns the first index from which every element is known to equal its
    /// pre-edit value (shifted); elements in `[replace.from, returned)` may differ.
    pub fn recalculate<G: Generator<T>>(&mut self, replace: Replace, generator: &G) -> usize {
        self.recalculate_from(replace.from, replace, generator)
    }

    /// Like [`CompressedList::recalculate`], for edits that also changed
    /// elements in `[dirty_from, replace.from)` without moving them.
    pub fn recalculate_from<G: Generator<T>>(
        &mut self,
        dirty_from: usize,
        replace: Replace,
        generator: &G,
    ) -> usize {
        let dirty_from = dirty_from.min(replace.from);
        let new_size = replace.apply_to_len(self.size);
        let delta = replace.delta();
        let dirty_end = replace.from + replace.new_count;

        let mut kept = Vec::with_capacity(self.anchors.len());
        let mut tail = Vec::new();
        for (index, value) in self.anchors.drain(..) {
            if index < dirty_from {
                kept.push((index, value));
            } else if index >= replace.to {
                tail.push(((index as isize + delta) as usize, value));
            }
        }
        self.size = new_size;
        if new_size == 0 {
            return 0;
        }

        let (mut at, mut current) = match kept.last() {
            Some((index, value)) => (*index, value.clone()),
            None => {
                let first = generator.generate_first();
                kept.push((0, first.clone()));
                (0, first)
            }
        };
        let mut last_anchor = at;
        let start = at;
        let mut tail = tail
            .into_iter()
            .skip_while(move |(index, _)| *index <= start)
            .peekable();
        let mut generated = 0usize;

        while at + 1 < new_size {
            current = generator.generate(&current, at);
            at += 1;
            generated += 1;

            if tail.peek().map(|(index, _)| *index) == Some(at) {
                if let Some((_, stored)) = tail.next() {
                    if at >= dirty_end && stored == current {
                        kept.push((at, stored));
                        kept.extend(tail);
                        self.anchors = kept;
                        trace!(?replace, generated, "compressed list converged");
                        return at;
                    }
                }
                kept.push((at, current.clone()));
                last_anchor = at;
            } else if at - last_anchor >= self.step {
                kept.push((at, current.clone()));
                last_anchor = at;
            }
        }

        trace!(?replace, generated, "compressed list regenerated to end");
        self.anchors = kept;
        new_size
    }
}
