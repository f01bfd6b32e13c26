//! Bounded circular buffer backing the dynamic table.
//!
//! Elements are pushed at the head and removed from the tail, so index 0
//! is always the most recently pushed element.
//!
//! The slot limit is logical. Storage starts small and doubles on demand up
//! to the limit, so a large table size costs nothing until entries arrive.

/// Slots allocated up front, at most.
const INITIAL_SLOTS: usize = 8;

#[derive(Debug, Clone)]
pub(crate) struct CircularBuffer<T> {
    elements: Vec<Option<T>>,
    /// Slot the next push writes to.
    head: usize,
    /// Slot holding the oldest element.
    tail: usize,
    len: usize,
    /// Most slots the storage grows to before a push is forced past it.
    limit: usize,
}

impl<T> CircularBuffer<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let limit = capacity.max(1);
        let mut elements = Vec::new();
        elements.resize_with(limit.min(INITIAL_SLOTS), || None);
        Self {
            elements,
            head: 0,
            tail: 0,
            len: 0,
            limit,
        }
    }

    /// Logical slot limit.
    pub(crate) fn capacity(&self) -> usize {
        self.limit
    }

    /// Slots currently backed by storage.
    pub(crate) fn allocated(&self) -> usize {
        self.elements.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Push a new element, growing the storage when it is full. Pushing past
    /// the limit raises it.
    pub(crate) fn push(&mut self, elem: T) {
        if self.len == self.allocated() {
            let grown = self
                .allocated()
                .saturating_mul(2)
                .min(self.limit)
                .max(self.len + 1);
            self.limit = self.limit.max(grown);
            self.reallocate(grown);
        }
        self.elements[self.head] = Some(elem);
        self.head = (self.head + 1) % self.allocated();
        self.len += 1;
    }

    /// Remove and return the oldest element.
    pub(crate) fn pop_oldest(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let elem = self.elements[self.tail].take();
        self.tail = (self.tail + 1) % self.allocated();
        self.len -= 1;
        elem
    }

    /// Element `index` positions back from the newest one.
    pub(crate) fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }
        let cap = self.allocated();
        let slot = (self.head + cap - 1 - index) % cap;
        self.elements[slot].as_ref()
    }

    /// Change the slot limit, keeping every element in order. Storage above
    /// the new limit is released.
    ///
    /// # Panics
    ///
    /// Debug builds panic if `capacity` is smaller than the current length.
    pub(crate) fn resize(&mut self, capacity: usize) {
        debug_assert!(capacity >= self.len, "resize would drop elements");
        self.limit = capacity.max(self.len).max(1);
        if self.allocated() > self.limit {
            self.reallocate(self.limit);
        }
    }

    fn reallocate(&mut self, slots: usize) {
        let len = self.len;
        let mut elements = Vec::with_capacity(slots);
        while let Some(elem) = self.pop_oldest() {
            elements.push(Some(elem));
        }
        elements.resize_with(slots, || None);
        self.elements = elements;
        self.head = len % slots;
        self.tail = 0;
        self.len = len;
    }
}
