//! Ports to the host: world storage, network sync and progress state.
//!
//! All three are shared with unrelated subsystems of the host, so every
//! method takes `&self` and implementations provide their own interior
//! synchronisation.

use crate::types::{SignId, Tile, TileKind, TilePos, WorldProgress};

/// Read/write access to the host's tile grid and sign table.
pub trait World: Send + Sync {
    /// The world's designated spawn cell, used as the board anchor.
    fn spawn_point(&self) -> TilePos;

    /// The cell at `pos`, or `None` when `pos` lies outside the world.
    fn tile(&self, pos: TilePos) -> Option<Tile>;

    /// Removes the foreground tile at `pos` without dropping items. Removing
    /// a sign also frees its text buffer.
    fn kill_tile(&self, pos: TilePos) -> anyhow::Result<()>;

    /// Removes the background wall at `pos`.
    fn clear_wall(&self, pos: TilePos) -> anyhow::Result<()>;

    /// Places a single-cell block. `Ok(false)` when the host refuses.
    fn place_tile(&self, pos: TilePos, kind: TileKind) -> anyhow::Result<bool>;

    /// Places a piece of furniture such as a sign. `Ok(false)` when the host
    /// refuses (cell occupied, no support, out of range).
    fn place_object(&self, pos: TilePos, kind: TileKind) -> anyhow::Result<bool>;

    /// Recomputes the frame/shape of `pos` and its neighbours.
    fn square_frame(&self, pos: TilePos) -> anyhow::Result<()>;

    /// The sign whose object occupies `pos`, if any.
    fn find_sign(&self, pos: TilePos) -> Option<SignId>;

    fn sign_text(&self, id: SignId) -> Option<String>;

    fn set_sign_text(&self, id: SignId, text: &str) -> anyhow::Result<()>;
}

/// Outbound synchronisation to every connected observer.
pub trait Broadcaster: Send + Sync {
    /// A sign's text buffer changed.
    fn sign_changed(&self, id: SignId);

    /// Tiles in the `size` x `size` square centred on `center` changed.
    fn tile_square(&self, center: TilePos, size: u8);
}

/// Read-only view of the simulation's milestone state.
pub trait ProgressSource: Send + Sync {
    fn snapshot(&self) -> WorldProgress;
}
