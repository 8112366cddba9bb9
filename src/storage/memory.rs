//! Volatile store, used by tests and `BRACKET_STORAGE=memory`

use parking_lot::Mutex;

use super::transaction::Transaction;
use super::{Arena, Repository, Store};
use crate::types::EngineResult;

/// Store that keeps the arena in process memory only
#[derive(Debug, Default)]
pub struct MemoryStore {
    arena: Mutex<Arena>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing arena
    pub fn with_arena(arena: Arena) -> Self {
        Self {
            arena: Mutex::new(arena),
        }
    }

    /// Copy of the committed state
    pub fn snapshot(&self) -> Arena {
        self.arena.lock().clone()
    }
}

impl Store for MemoryStore {
    fn read<T>(&self, f: impl FnOnce(&dyn Repository) -> T) -> T {
        let arena = self.arena.lock();
        f(&*arena)
    }

    fn transaction<T>(
        &self,
        f: impl FnOnce(&mut dyn Repository) -> EngineResult<T>,
    ) -> EngineResult<T> {
        let mut arena = self.arena.lock();
        let mut tx = Transaction::begin(&mut arena);
        let value = f(&mut tx)?;
        tx.commit();
        Ok(value)
    }
}
