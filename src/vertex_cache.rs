use crate::{error::Result, geometry::CellPosition, mesh::MeshVertexId};
use dashmap::DashMap;
use glam::{Vec3, Vec3A};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Slot = Arc<Mutex<Option<MeshVertexId>>>;

/// Shared map from cell to the index of its mesh vertex.
///
/// Each cell's vertex is placed at most once. Workers asking for the same cell
/// wait on that cell's slot; workers asking for different cells never wait on
/// each other except for the brief push onto the vertex list.
#[derive(Debug, Default)]
pub struct VertexCache {
    slots: DashMap<CellPosition, Slot>,
    /// We don't use `Vec3A` because it's 16-byte-aligned.
    positions: Mutex<Vec<Vec3>>,
}

impl VertexCache {
    pub fn get_or_insert_with(
        &self,
        cell: CellPosition,
        place: impl FnOnce(CellPosition) -> Result<Vec3A>,
    ) -> Result<MeshVertexId> {
        // Clone the slot out so the map shard is unlocked while placing.
        let slot = Arc::clone(self.slots.entry(cell).or_default().value());
        let mut index = lock(&slot);
        if let Some(id) = *index {
            return Ok(id);
        }

        let vertex = place(cell)?;
        let id = self.push(vertex);
        *index = Some(id);
        Ok(id)
    }

    #[cfg(test)]
    fn get(&self, cell: CellPosition) -> Option<MeshVertexId> {
        let slot = Arc::clone(self.slots.get(&cell)?.value());
        let id = *lock(&slot);
        id
    }

    #[cfg(test)]
    fn num_vertices(&self) -> usize {
        lock(&self.positions).len()
    }

    pub fn into_positions(self) -> Vec<Vec3> {
        self.positions
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, vertex: Vec3A) -> MeshVertexId {
        let mut positions = lock(&self.positions);
        let id = positions.len() as MeshVertexId;
        positions.push(vertex.into());
        id
    }
}

// A panicking worker aborts the whole build, so poisoned data is never read
// back into a finished mesh.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
