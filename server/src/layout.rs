//! Board geometry derived from the world's spawn point.

use board_core::constants::{
    CLEAR_MARGIN_ABOVE, CLEAR_MARGIN_X, FIRST_PANEL_OFFSET_X, PANEL_COUNT, PANEL_SPACING_X,
};
use board_core::types::{Panel, PanelRole, TilePos};

/// The three panels, left to right, for a board anchored at `anchor`.
pub fn panel_positions(anchor: TilePos) -> [Panel; PANEL_COUNT] {
    let first = anchor.offset(FIRST_PANEL_OFFSET_X, 0);
    let mut x = first.x;
    PanelRole::ALL.map(|role| {
        let panel = Panel {
            role,
            pos: TilePos::new(x, first.y),
        };
        x += PANEL_SPACING_X;
        panel
    })
}

/// Inclusive rectangle scanned for obstacles before a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearBounds {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl ClearBounds {
    /// Every cell in the rectangle, column by column.
    pub fn cells(self) -> impl Iterator<Item = TilePos> {
        (self.left..=self.right)
            .flat_map(move |x| (self.top..=self.bottom).map(move |y| TilePos::new(x, y)))
    }

    pub fn contains(&self, pos: TilePos) -> bool {
        (self.left..=self.right).contains(&pos.x) && (self.top..=self.bottom).contains(&pos.y)
    }
}

/// Clearing rectangle: a margin to either side of the outer panels and a few
/// rows above the panel row. The support row below is not included.
pub fn clear_bounds(panels: &[Panel; PANEL_COUNT]) -> ClearBounds {
    let first = panels[0].pos;
    let last = panels[PANEL_COUNT - 1].pos;
    ClearBounds {
        left: first.x - CLEAR_MARGIN_X,
        right: last.x + CLEAR_MARGIN_X,
        top: first.y - CLEAR_MARGIN_ABOVE,
        bottom: first.y,
    }
}
