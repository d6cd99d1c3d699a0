//! Binding of external points to a cage and their reconstruction.
//!
//! Binding captures one `Influence` per point and is the expensive half;
//! `update` only reads stored coordinates against current cage geometry.

use crate::error::{CageError, CageResult};
use crate::model::{Influence, Vec2};
use crate::Cage;

/// Bound points in insertion order. A slot is `None` for points that found
/// nothing to bind to or were detached.
#[derive(Clone, Debug, Default)]
pub struct Deformer {
    slots: Vec<Option<Influence>>,
}

impl Deformer {
    pub fn new() -> Self {
        Deformer::default()
    }

    /// Capture influences for `points`, appending one slot per point.
    /// Returns the new slots in the same order.
    pub fn bind(&mut self, cage: &Cage, points: &[Vec2]) -> Vec<Option<Influence>> {
        let bound: Vec<Option<Influence>> = points.iter().map(|p| cage.compute_influence(*p)).collect();
        let hits = bound.iter().filter(|b| b.is_some()).count();
        log::debug!("bound {} of {} points", hits, points.len());
        self.slots.extend(bound.iter().cloned());
        bound
    }

    /// Recompute every bound point in place from the current cage. `points`
    /// is positional against the slots; unbound points and degenerate
    /// reconstructions are left where they are. Returns how many moved.
    pub fn update(&self, cage: &Cage, points: &mut [Vec2]) -> usize {
        let mut moved = 0;
        for (slot, p) in self.slots.iter().zip(points.iter_mut()) {
            let Some(inf) = slot else { continue };
            match cage.reconstruct(inf) {
                Ok(q) => {
                    *p = q;
                    moved += 1;
                }
                Err(e) => log::warn!("keeping point at last position: {}", e),
            }
        }
        moved
    }

    /// Reconstructed position of one slot.
    pub fn position(&self, cage: &Cage, index: usize) -> CageResult<Vec2> {
        match self.slots.get(index) {
            Some(Some(inf)) => cage.reconstruct(inf),
            _ => Err(CageError::NotBound),
        }
    }

    /// Unbind one point. Slots keep their indices.
    pub fn detach(&mut self, index: usize) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => slot.take().is_some(),
            None => false,
        }
    }

    pub fn influence(&self, index: usize) -> Option<&Influence> {
        self.slots.get(index).and_then(|s| s.as_ref())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn bound_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}
