//! Read-only inspection of the board area.

use board_core::constants::PANEL_COUNT;
use board_core::traits::World;
use board_core::types::{Panel, TilePos};

/// Whether an active sign occupies `pos`. Cells outside the world are empty.
pub fn sign_exists(world: &dyn World, pos: TilePos) -> bool {
    world.tile(pos).is_some_and(|tile| tile.is_sign())
}

/// Which of the three panel cells already hold a sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AreaState {
    pub present: [bool; PANEL_COUNT],
}

impl AreaState {
    pub fn is_complete(&self) -> bool {
        self.present.iter().all(|&present| present)
    }

    pub fn present_count(&self) -> usize {
        self.present.iter().filter(|&&present| present).count()
    }
}

pub fn probe_area(world: &dyn World, panels: &[Panel; PANEL_COUNT]) -> AreaState {
    AreaState {
        present: panels.map(|panel| sign_exists(world, panel.pos)),
    }
}
