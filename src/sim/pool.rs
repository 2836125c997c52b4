// pool.rs - Fixed-capacity entity store
//
// Structure-of-Arrays layout, allocated once per surface configuration.
// Slots are handed out round-robin. If the slot under the cursor is still
// live, spawn does nothing: bursts are throttled, never queued.

pub struct EntityPool {
    // Position
    pub x: Vec<f32>,
    pub y: Vec<f32>,

    // Velocity
    pub vx: Vec<f32>,
    pub vy: Vec<f32>,

    // Look
    pub size: Vec<f32>,
    pub opacity: Vec<f32>,
    pub tint: Vec<u8>,     // palette index
    pub glyph: Vec<char>,

    // Lifecycle
    pub age: Vec<f32>,
    pub life: Vec<f32>,
    pub max_life: Vec<f32>,

    // Position of each live slot within `live`
    slot: Vec<Option<usize>>,
    live: Vec<usize>,
    cursor: usize,
}

impl EntityPool {
    pub fn allocate(capacity: usize) -> Self {
        Self {
            x: vec![0.0; capacity],
            y: vec![0.0; capacity],
            vx: vec![0.0; capacity],
            vy: vec![0.0; capacity],
            size: vec![0.0; capacity],
            opacity: vec![0.0; capacity],
            tint: vec![0; capacity],
            glyph: vec![' '; capacity],
            age: vec![0.0; capacity],
            life: vec![0.0; capacity],
            max_life: vec![0.0; capacity],
            slot: vec![None; capacity],
            live: Vec::with_capacity(capacity),
            cursor: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slot.len()
    }

    #[inline]
    pub fn active_count(&self) -> usize {
        self.live.len()
    }

    #[inline]
    pub fn is_active(&self, i: usize) -> bool {
        matches!(self.slot.get(i), Some(Some(_)))
    }

    /// Indices of live entities. Order is not spawn order.
    #[inline]
    pub fn active(&self) -> &[usize] {
        &self.live
    }

    /// Check out the slot under the round-robin cursor.
    /// Returns None if that slot is busy or the pool is empty.
    pub fn spawn(&mut self) -> Option<usize> {
        let cap = self.capacity();
        if cap == 0 { return None; }

        let i = self.cursor;
        self.cursor = (i + 1) % cap;
        if self.slot[i].is_some() { return None; }

        self.slot[i] = Some(self.live.len());
        self.live.push(i);
        Some(i)
    }

    /// Return a slot to the pool. Stale data stays until the next spawn.
    pub fn recycle(&mut self, i: usize) {
        let Some(pos) = self.slot.get_mut(i).and_then(Option::take) else { return };
        self.live.swap_remove(pos);
        if let Some(&moved) = self.live.get(pos) {
            self.slot[moved] = Some(pos);
        }
    }

    pub fn clear(&mut self) {
        self.slot.fill(None);
        self.live.clear();
        self.cursor = 0;
    }
}
