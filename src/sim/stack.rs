//! Bounded LIFO of tile positions awaiting chain-reaction resolution

use thiserror::Error;

use super::grid::TilePos;

/// Pushing onto a full stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("more than {capacity} pending explosions")]
pub struct StackOverflow {
    pub capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplosionStack {
    entries: Vec<TilePos>,
    capacity: usize,
}

impl ExplosionStack {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
        }
    }

    pub fn push(&mut self, pos: TilePos) -> Result<(), StackOverflow> {
        if self.entries.len() >= self.capacity {
            return Err(StackOverflow {
                capacity: self.capacity,
            });
        }
        self.entries.push(pos);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<TilePos> {
        self.entries.pop()
    }

    pub fn top(&self) -> Option<TilePos> {
        self.entries.last().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifo_order() {
        let mut stack = ExplosionStack::new(4);
        stack.push(TilePos::new(0, 0)).unwrap();
        stack.push(TilePos::new(1, 0)).unwrap();
        assert_eq!(stack.top(), Some(TilePos::new(1, 0)));
        assert_eq!(stack.pop(), Some(TilePos::new(1, 0)));
        assert_eq!(stack.pop(), Some(TilePos::new(0, 0)));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_overflow_is_an_error() {
        let mut stack = ExplosionStack::new(2);
        stack.push(TilePos::new(0, 0)).unwrap();
        stack.push(TilePos::new(0, 1)).unwrap();
        assert_eq!(
            stack.push(TilePos::new(0, 2)),
            Err(StackOverflow { capacity: 2 })
        );
        assert_eq!(stack.len(), 2);
    }
}
