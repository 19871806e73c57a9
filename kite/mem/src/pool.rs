//! Fixed-capacity slot pool

use core::fmt;

use heapless::Vec;

use crate::PoolStats;

/// Reference to a pool slot, valid until that slot is freed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    index: u16,
    generation: u16,
}

impl Handle {
    /// Slot index inside the pool
    pub const fn index(&self) -> u16 {
        self.index
    }

    /// Generation of the slot at the time this handle was issued
    pub const fn generation(&self) -> u16 {
        self.generation
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Handle {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "#{}.{}", self.index, self.generation);
    }
}

#[derive(Debug)]
enum Entry<T> {
    Occupied(T),
    Vacant { next_free: Option<u16> },
}

#[derive(Debug)]
struct Slot<T> {
    generation: u16,
    entry: Entry<T>,
}

/// A pool of up to `N` values of `T` with stable indices
///
/// Slots are created on first use and recycled through a free list, so the
/// pool can be built in a `const` context and never allocates from a heap.
#[derive(Debug)]
pub struct Pool<T, const N: usize> {
    slots: Vec<Slot<T>, N>,
    free_head: Option<u16>,
    stats: PoolStats,
}

impl<T, const N: usize> Pool<T, N> {
    const CAPACITY_FITS: () = assert!(N <= u16::MAX as usize, "pool capacity must fit a u16 index");

    /// Create an empty pool
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_FITS;
        Self {
            slots: Vec::new(),
            free_head: None,
            stats: PoolStats::new(N),
        }
    }

    /// Store `value`, returning it back if every slot is in use
    pub fn alloc(&mut self, value: T) -> Result<Handle, T> {
        let index = match self.free_head {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                self.free_head = match slot.entry {
                    Entry::Vacant { next_free } => next_free,
                    Entry::Occupied(_) => unreachable!("free list points at an occupied slot"),
                };
                slot.entry = Entry::Occupied(value);
                index
            }
            None => {
                let index = self.slots.len() as u16;
                self.slots
                    .push(Slot {
                        generation: 0,
                        entry: Entry::Occupied(value),
                    })
                    .map_err(|slot| match slot.entry {
                        Entry::Occupied(value) => value,
                        Entry::Vacant { .. } => unreachable!(),
                    })?;
                index
            }
        };
        self.stats.on_alloc();
        Ok(Handle {
            index,
            generation: self.slots[index as usize].generation,
        })
    }

    /// Remove and return the value behind `handle`
    ///
    /// Returns `None` for a stale or foreign handle. The slot's generation is
    /// bumped so outstanding copies of the handle stop resolving.
    pub fn free(&mut self, handle: Handle) -> Option<T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation || !matches!(slot.entry, Entry::Occupied(_)) {
            return None;
        }
        let entry = core::mem::replace(
            &mut slot.entry,
            Entry::Vacant {
                next_free: self.free_head,
            },
        );
        slot.generation = slot.generation.wrapping_add(1);
        self.free_head = Some(handle.index);
        self.stats.on_dealloc();
        match entry {
            Entry::Occupied(value) => Some(value),
            Entry::Vacant { .. } => None,
        }
    }

    /// Borrow the value behind `handle`
    pub fn get(&self, handle: Handle) -> Option<&T> {
        match self.slots.get(handle.index as usize) {
            Some(Slot {
                generation,
                entry: Entry::Occupied(value),
            }) if *generation == handle.generation => Some(value),
            _ => None,
        }
    }

    /// Mutably borrow the value behind `handle`
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        match self.slots.get_mut(handle.index as usize) {
            Some(Slot {
                generation,
                entry: Entry::Occupied(value),
            }) if *generation == handle.generation => Some(value),
            _ => None,
        }
    }

    /// Borrow an occupied slot by raw index, ignoring generations
    pub fn get_index(&self, index: u16) -> Option<&T> {
        match self.slots.get(index as usize) {
            Some(Slot {
                entry: Entry::Occupied(value),
                ..
            }) => Some(value),
            _ => None,
        }
    }

    /// Mutably borrow an occupied slot by raw index, ignoring generations
    pub fn get_index_mut(&mut self, index: u16) -> Option<&mut T> {
        match self.slots.get_mut(index as usize) {
            Some(Slot {
                entry: Entry::Occupied(value),
                ..
            }) => Some(value),
            _ => None,
        }
    }

    /// Current handle of the occupied slot at `index`
    pub fn handle_at(&self, index: u16) -> Option<Handle> {
        match self.slots.get(index as usize) {
            Some(Slot {
                generation,
                entry: Entry::Occupied(_),
            }) => Some(Handle {
                index,
                generation: *generation,
            }),
            _ => None,
        }
    }

    /// Iterate over occupied slots with their handles
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| match &slot.entry {
                Entry::Occupied(value) => Some((
                    Handle {
                        index: index as u16,
                        generation: slot.generation,
                    },
                    value,
                )),
                Entry::Vacant { .. } => None,
            })
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.stats.used_blocks
    }

    /// Check if no slot is occupied
    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Check if every slot is occupied
    pub fn is_full(&self) -> bool {
        self.stats.is_full()
    }

    /// Maximum number of values
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Usage statistics, including the low-water mark of free slots
    pub fn stats(&self) -> PoolStats {
        self.stats
    }
}

impl<T, const N: usize> Default for Pool<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn test_alloc_until_full() {
        let mut pool: Pool<u32, 2> = Pool::new();
        let a = pool.alloc(1).unwrap();
        let b = pool.alloc(2).unwrap();
        assert_ne!(a, b);
        assert!(pool.is_full());
        assert_eq!(pool.alloc(3), Err(3));
    }

    #[test]
    fn test_free_recycles_slot_with_new_generation() {
        let mut pool: Pool<u32, 1> = Pool::new();
        let first = pool.alloc(10).unwrap();
        assert_eq!(pool.free(first), Some(10));
        let second = pool.alloc(20).unwrap();

        assert_eq!(first.index(), second.index());
        assert_ne!(first.generation(), second.generation());
        assert_eq!(pool.get(first), None);
        assert_eq!(pool.get(second), Some(&20));
        assert_eq!(pool.free(first), None);
    }

    #[test]
    fn test_index_access_ignores_generation() {
        let mut pool: Pool<&str, 4> = Pool::new();
        let h = pool.alloc("a").unwrap();
        *pool.get_index_mut(h.index()).unwrap() = "b";
        assert_eq!(pool.get_index(h.index()), Some(&"b"));
        assert_eq!(pool.handle_at(h.index()), Some(h));
        pool.free(h);
        assert_eq!(pool.get_index(h.index()), None);
        assert_eq!(pool.handle_at(h.index()), None);
    }

    #[test]
    fn test_stats_track_low_water_mark() {
        let mut pool: Pool<u8, 4> = Pool::new();
        let handles: std::vec::Vec<_> = (0..3).map(|i| pool.alloc(i).unwrap()).collect();
        for h in handles {
            pool.free(h);
        }
        let stats = pool.stats();
        assert_eq!(stats.free_blocks, 4);
        assert_eq!(stats.min_free_blocks, 1);
        assert!(stats.is_empty());
    }

    /// Random alloc/free sequences against a `Vec<Option<_>>` model
    #[quickcheck]
    fn quickcheck_pool_matches_reference(ops: std::vec::Vec<(bool, u8)>) {
        const CAP: usize = 6;
        let mut pool: Pool<u8, CAP> = Pool::new();
        let mut live: std::vec::Vec<(Handle, u8)> = std::vec::Vec::new();
        let mut dead: std::vec::Vec<Handle> = std::vec::Vec::new();

        for (is_alloc, value) in ops {
            if is_alloc {
                match pool.alloc(value) {
                    Ok(h) => {
                        assert!(live.len() < CAP);
                        live.push((h, value));
                    }
                    Err(v) => {
                        assert_eq!(v, value);
                        assert_eq!(live.len(), CAP);
                    }
                }
            } else if !live.is_empty() {
                let (h, v) = live.remove(value as usize % live.len());
                assert_eq!(pool.free(h), Some(v));
                dead.push(h);
            }

            assert_eq!(pool.len(), live.len());
            for &(h, v) in &live {
                assert_eq!(pool.get(h), Some(&v));
            }
            for &h in &dead {
                assert_eq!(pool.get(h), None);
            }
        }
    }
}
