//! World cell structures

use std::fmt;

/// Integer cell coordinate in the world grid. `y` grows downwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// The cell directly underneath this one.
    pub const fn below(self) -> Self {
        self.offset(0, 1)
    }
}

impl fmt::Display for TilePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Foreground tile kinds the board cares about. Anything else the host
/// stores is reported as `Other` with its raw id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileKind {
    Dirt,
    Stone,
    Grass,
    WoodBlock,
    Sign,
    Torch,
    Tree,
    Other(u16),
}

impl TileKind {
    /// Whether the kind can carry furniture placed on top of it.
    pub fn is_solid(self) -> bool {
        matches!(
            self,
            TileKind::Dirt | TileKind::Stone | TileKind::Grass | TileKind::WoodBlock
        )
    }
}

/// One cell of the world grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// foreground tile present
    pub active: bool,
    /// meaningful only while `active`
    pub kind: TileKind,
    /// background wall id, 0 = none
    pub wall: u16,
    /// frame/shape variant chosen by the last square-frame pass
    pub frame: u16,
}

impl Default for Tile {
    fn default() -> Self {
        Self {
            active: false,
            kind: TileKind::Dirt,
            wall: 0,
            frame: 0,
        }
    }
}

impl Tile {
    pub fn solid(kind: TileKind) -> Self {
        Self {
            active: true,
            kind,
            ..Self::default()
        }
    }

    pub fn is_sign(&self) -> bool {
        self.active && self.kind == TileKind::Sign
    }

    /// An occupied cell that is not a sign, i.e. something the rebuild clears.
    pub fn is_obstacle(&self) -> bool {
        self.active && self.kind != TileKind::Sign
    }
}

/// Index of a sign's text buffer in the host's sign table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignId(pub usize);

impl fmt::Display for SignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
