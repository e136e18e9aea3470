/*
 * Signal Queue Module
 *
 * Fixed-length history of a signaling level. Pushing a new value evicts the
 * oldest one, so the length chosen at creation never changes. Callers only
 * see the most recent entries, newest last.
 */

#[derive(Debug, Clone, PartialEq)]
pub struct SignalQueue {
    buffer: Box<[f32]>,
    // Index of the oldest entry
    head: usize,
}

impl SignalQueue {
    // Zero-filled queue; `len` is validated positive by SimulationParams
    pub fn zeroed(len: usize) -> Self {
        Self {
            buffer: vec![0.0; len.max(1)].into_boxed_slice(),
            head: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    // Never true, a queue always holds at least one entry
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    // Append the newest value and drop the oldest, O(1)
    #[inline]
    pub fn push(&mut self, value: f32) {
        self.buffer[self.head] = value;
        self.head = (self.head + 1) % self.buffer.len();
    }

    pub fn latest(&self) -> f32 {
        let last = (self.head + self.buffer.len() - 1) % self.buffer.len();
        self.buffer[last]
    }

    // The `k` most recent entries in age order, oldest first
    pub fn recent(&self, k: usize) -> impl Iterator<Item = f32> + '_ {
        let len = self.buffer.len();
        let k = k.min(len);
        (len - k..len).map(move |offset| self.buffer[(self.head + offset) % len])
    }

    pub fn recent_mean(&self, k: usize) -> f32 {
        let k = k.min(self.buffer.len());
        if k == 0 {
            return 0.0;
        }
        self.recent(k).sum::<f32>() / k as f32
    }

    // All entries, oldest first
    pub fn to_vec(&self) -> Vec<f32> {
        self.recent(self.buffer.len()).collect()
    }
}
