use std::collections::HashMap;
use crate::error::{BracketError, PoolError};
use crate::types::{Entrant, EntrantId, MIN_ENTRANTS};
use tracing::debug;

/// EntrantPool collects registrations for one bracket:
/// - ids are unique
/// - labels are trimmed and must not be empty
/// - seeds follow registration order, starting at 1
#[derive(Debug, Clone)]
pub struct EntrantPool {
    capacity: usize,
    /// Entrants in registration order
    entrants: Vec<Entrant>,
    /// Index from entrant id to position in `entrants`
    index: HashMap<EntrantId, usize>,
}

impl EntrantPool {
    /// `capacity` must be a bracket size: a power of two, at least 4.
    pub fn new(capacity: usize) -> Result<Self, BracketError> {
        if capacity < MIN_ENTRANTS || !capacity.is_power_of_two() {
            return Err(BracketError::InvalidEntrantCount { count: capacity });
        }
        Ok(EntrantPool {
            capacity,
            entrants: Vec::with_capacity(capacity),
            index: HashMap::new(),
        })
    }

    pub fn register(&mut self, id: EntrantId, label: &str) -> Result<&Entrant, PoolError> {
        if self.index.contains_key(&id) {
            return Err(PoolError::Duplicate { id });
        }
        if self.is_full() {
            return Err(PoolError::Full { capacity: self.capacity });
        }
        let label = label.trim();
        if label.is_empty() {
            return Err(PoolError::EmptyLabel { id });
        }
        let seed = self.entrants.len() as u32 + 1;
        self.index.insert(id, self.entrants.len());
        self.entrants.push(Entrant::new(id, label, seed));
        debug!("registered {label} ({id}) as seed {seed}");
        Ok(&self.entrants[self.entrants.len() - 1])
    }

    /// Drop an entrant before the bracket is generated. Later seeds move up.
    pub fn withdraw(&mut self, id: EntrantId) -> Option<Entrant> {
        let position = self.index.remove(&id)?;
        let removed = self.entrants.remove(position);
        for (i, entrant) in self.entrants.iter_mut().enumerate().skip(position) {
            entrant.seed = i as u32 + 1;
            self.index.insert(entrant.id, i);
        }
        Some(removed)
    }

    pub fn get(&self, id: EntrantId) -> Option<&Entrant> {
        self.index.get(&id).map(|&i| &self.entrants[i])
    }

    pub fn len(&self) -> usize {
        self.entrants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entrants.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.entrants.len() >= self.capacity
    }

    /// Hand the roster to the bracket generator, in seed order.
    pub fn finalize(self) -> Result<Vec<Entrant>, BracketError> {
        if !self.is_full() {
            return Err(BracketError::InvalidEntrantCount { count: self.entrants.len() });
        }
        Ok(self.entrants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_pool() -> EntrantPool {
        let mut pool = EntrantPool::new(4).unwrap();
        for (id, label) in [(10, "Shadowblade"), (11, "Lightspeed"), (12, "Quantum"), (13, "Phoenix")] {
            pool.register(id, label).unwrap();
        }
        pool
    }

    #[test]
    fn test_capacity_must_be_bracket_size() {
        assert!(EntrantPool::new(16).is_ok());
        assert!(matches!(
            EntrantPool::new(6),
            Err(BracketError::InvalidEntrantCount { count: 6 })
        ));
        assert!(EntrantPool::new(2).is_err());
    }

    #[test]
    fn test_register_assigns_seeds() {
        let pool = full_pool();
        assert_eq!(pool.get(10).unwrap().seed, 1);
        assert_eq!(pool.get(13).unwrap().seed, 4);
        assert!(pool.is_full());
    }

    #[test]
    fn test_register_rejections() {
        let mut pool = full_pool();
        assert_eq!(pool.register(10, "Again"), Err(PoolError::Duplicate { id: 10 }));
        assert_eq!(pool.register(20, "Vortex"), Err(PoolError::Full { capacity: 4 }));

        let mut pool = EntrantPool::new(4).unwrap();
        assert_eq!(pool.register(1, "   "), Err(PoolError::EmptyLabel { id: 1 }));
        assert_eq!(pool.register(1, "  Vortex ").unwrap().label, "Vortex");
    }

    #[test]
    fn test_withdraw_reseeds() {
        let mut pool = full_pool();
        let removed = pool.withdraw(11).unwrap();
        assert_eq!(removed.label, "Lightspeed");
        assert_eq!(pool.get(12).unwrap().seed, 2);
        assert_eq!(pool.get(13).unwrap().seed, 3);
        assert!(pool.withdraw(11).is_none());
        pool.register(14, "Vortex").unwrap();
        assert_eq!(pool.get(14).unwrap().seed, 4);
    }

    #[test]
    fn test_finalize_requires_full_pool() {
        let mut pool = EntrantPool::new(4).unwrap();
        pool.register(1, "Solo").unwrap();
        assert!(matches!(
            pool.finalize(),
            Err(BracketError::InvalidEntrantCount { count: 1 })
        ));

        let roster = full_pool().finalize().unwrap();
        let ids = roster.iter().map(|e| e.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![10, 11, 12, 13]);
    }
}
