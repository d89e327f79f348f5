//! Data types module - tiles, panels, progress flags and NPC kinds

mod npc;
mod panel;
mod progress;
mod tile;

// Re-export all types
pub use npc::NpcKind;
pub use panel::{Panel, PanelRole};
pub use progress::{InvasionType, ProgressFlags, WorldProgress};
pub use tile::{SignId, Tile, TileKind, TilePos};
