//! Board panels

use std::fmt;

use super::TilePos;

/// What a panel reports. Fixed by the panel's position on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelRole {
    PreHardmode,
    Hardmode,
    Invasion,
}

impl PanelRole {
    /// Roles in left-to-right board order.
    pub const ALL: [PanelRole; 3] = [
        PanelRole::PreHardmode,
        PanelRole::Hardmode,
        PanelRole::Invasion,
    ];
}

impl fmt::Display for PanelRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PanelRole::PreHardmode => "pre-hardmode",
            PanelRole::Hardmode => "hardmode",
            PanelRole::Invasion => "invasion",
        };
        f.write_str(name)
    }
}

/// One display slot: a role and the cell its sign sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Panel {
    pub role: PanelRole,
    pub pos: TilePos,
}
