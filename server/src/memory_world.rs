//! In-memory host world.
//!
//! A fixed-size tile grid plus a sign table, shared behind an `RwLock` the
//! same way the rest of the host would share its world. Used by the console
//! host and by the tests as the stand-in for a real game world.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::bail;
use board_core::traits::World;
use board_core::types::{SignId, Tile, TileKind, TilePos};

#[derive(Debug, Clone)]
struct SignEntry {
    pos: TilePos,
    text: String,
}

struct Grid {
    spawn: TilePos,
    cells: Vec<Tile>,
    signs: BTreeMap<SignId, SignEntry>,
    next_sign: usize,
    signs_destroyed: usize,
}

/// Largest grid a `MemoryWorld` will allocate.
pub const MAX_WORLD_CELLS: i32 = 1 << 25;

/// Number of cells in a `width` x `height` grid, or `None` when either side
/// is not positive or the grid exceeds [`MAX_WORLD_CELLS`].
pub fn cell_count(width: i32, height: i32) -> Option<usize> {
    if width <= 0 || height <= 0 {
        return None;
    }
    width
        .checked_mul(height)
        .filter(|&cells| cells <= MAX_WORLD_CELLS)
        .map(|cells| cells as usize)
}

pub struct MemoryWorld {
    width: i32,
    height: i32,
    grid: RwLock<Grid>,
}

impl MemoryWorld {
    /// An empty world of `width` x `height` cells.
    pub fn new(width: i32, height: i32, spawn: TilePos) -> anyhow::Result<Self> {
        let Some(cells) = cell_count(width, height) else {
            bail!("World size {width}x{height} is out of range (max {MAX_WORLD_CELLS} cells)");
        };
        Ok(Self {
            width,
            height,
            grid: RwLock::new(Grid {
                spawn,
                cells: vec![Tile::default(); cells],
                signs: BTreeMap::new(),
                next_sign: 0,
                signs_destroyed: 0,
            }),
        })
    }

    /// A world with grass on the row below spawn and dirt underneath it.
    pub fn with_ground(width: i32, height: i32, spawn: TilePos) -> anyhow::Result<Self> {
        let world = Self::new(width, height, spawn)?;
        {
            let mut grid = world.write();
            for y in (spawn.y + 1).max(0)..world.height {
                for x in 0..world.width {
                    let kind = if y == spawn.y + 1 {
                        TileKind::Grass
                    } else {
                        TileKind::Dirt
                    };
                    let idx = world.index(TilePos::new(x, y)).unwrap_or_default();
                    grid.cells[idx] = Tile::solid(kind);
                }
            }
        }
        Ok(world)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    fn read(&self) -> RwLockReadGuard<'_, Grid> {
        self.grid.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Grid> {
        self.grid.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn index(&self, pos: TilePos) -> Option<usize> {
        if pos.x < 0 || pos.y < 0 || pos.x >= self.width || pos.y >= self.height {
            return None;
        }
        // In range and width * height fits in i32, so this cannot overflow.
        Some((pos.y * self.width + pos.x) as usize)
    }

    pub fn set_spawn(&self, spawn: TilePos) {
        self.write().spawn = spawn;
    }

    /// Overwrites `pos` with an active tile of `kind`, bypassing placement
    /// rules. Replacing a sign frees its text buffer. Out-of-range is ignored.
    pub fn set_tile(&self, pos: TilePos, kind: TileKind) {
        let Some(idx) = self.index(pos) else {
            return;
        };
        let mut grid = self.write();
        Self::remove_sign_at(&mut grid, pos);
        let wall = grid.cells[idx].wall;
        grid.cells[idx] = Tile {
            wall,
            ..Tile::solid(kind)
        };
    }

    pub fn set_wall(&self, pos: TilePos, wall: u16) {
        if let Some(idx) = self.index(pos) {
            self.write().cells[idx].wall = wall;
        }
    }

    /// Empties `pos` completely: tile, wall and any sign.
    pub fn clear_cell(&self, pos: TilePos) {
        let Some(idx) = self.index(pos) else {
            return;
        };
        let mut grid = self.write();
        Self::remove_sign_at(&mut grid, pos);
        grid.cells[idx] = Tile::default();
    }

    /// Puts a sign with `text` at `pos` regardless of support or occupancy.
    pub fn force_sign(&self, pos: TilePos, text: &str) -> Option<SignId> {
        let idx = self.index(pos)?;
        let mut grid = self.write();
        Self::remove_sign_at(&mut grid, pos);
        grid.cells[idx] = Tile::solid(TileKind::Sign);
        Some(Self::allocate_sign(&mut grid, pos, text))
    }

    pub fn sign_count(&self) -> usize {
        self.read().signs.len()
    }

    /// Signs removed by tile kills or overwrites since the world was created.
    pub fn signs_destroyed(&self) -> usize {
        self.read().signs_destroyed
    }

    fn allocate_sign(grid: &mut Grid, pos: TilePos, text: &str) -> SignId {
        let id = SignId(grid.next_sign);
        grid.next_sign += 1;
        grid.signs.insert(
            id,
            SignEntry {
                pos,
                text: text.to_string(),
            },
        );
        id
    }

    fn remove_sign_at(grid: &mut Grid, pos: TilePos) {
        let before = grid.signs.len();
        grid.signs.retain(|_, entry| entry.pos != pos);
        grid.signs_destroyed += before - grid.signs.len();
    }

    fn is_solid(&self, grid: &Grid, pos: TilePos) -> bool {
        self.index(pos)
            .map(|idx| grid.cells[idx])
            .is_some_and(|tile| tile.active && tile.kind.is_solid())
    }
}

impl World for MemoryWorld {
    fn spawn_point(&self) -> TilePos {
        self.read().spawn
    }

    fn tile(&self, pos: TilePos) -> Option<Tile> {
        let idx = self.index(pos)?;
        Some(self.read().cells[idx])
    }

    fn kill_tile(&self, pos: TilePos) -> anyhow::Result<()> {
        let Some(idx) = self.index(pos) else {
            bail!("Cannot kill tile at {pos}: outside the world");
        };
        let mut grid = self.write();
        Self::remove_sign_at(&mut grid, pos);
        let wall = grid.cells[idx].wall;
        grid.cells[idx] = Tile {
            wall,
            ..Tile::default()
        };
        Ok(())
    }

    fn clear_wall(&self, pos: TilePos) -> anyhow::Result<()> {
        let Some(idx) = self.index(pos) else {
            bail!("Cannot clear wall at {pos}: outside the world");
        };
        self.write().cells[idx].wall = 0;
        Ok(())
    }

    fn place_tile(&self, pos: TilePos, kind: TileKind) -> anyhow::Result<bool> {
        let Some(idx) = self.index(pos) else {
            return Ok(false);
        };
        let mut grid = self.write();
        if grid.cells[idx].active {
            return Ok(false);
        }
        let wall = grid.cells[idx].wall;
        grid.cells[idx] = Tile {
            wall,
            ..Tile::solid(kind)
        };
        Ok(true)
    }

    fn place_object(&self, pos: TilePos, kind: TileKind) -> anyhow::Result<bool> {
        let Some(idx) = self.index(pos) else {
            return Ok(false);
        };
        let mut grid = self.write();
        if grid.cells[idx].active || !self.is_solid(&grid, pos.below()) {
            return Ok(false);
        }
        let wall = grid.cells[idx].wall;
        grid.cells[idx] = Tile {
            wall,
            ..Tile::solid(kind)
        };
        if kind == TileKind::Sign {
            Self::allocate_sign(&mut grid, pos, "");
        }
        Ok(true)
    }

    fn square_frame(&self, pos: TilePos) -> anyhow::Result<()> {
        if self.index(pos).is_none() {
            bail!("Cannot frame tile at {pos}: outside the world");
        }
        let mut grid = self.write();
        for cell in [
            pos,
            pos.offset(-1, 0),
            pos.offset(1, 0),
            pos.offset(0, -1),
            pos.offset(0, 1),
        ] {
            let Some(idx) = self.index(cell) else {
                continue;
            };
            let tile = grid.cells[idx];
            if !tile.active {
                grid.cells[idx].frame = 0;
                continue;
            }
            // One bit per matching neighbour: up, right, down, left.
            let mut frame = 0u16;
            for (bit, (dx, dy)) in [(0, -1), (1, 0), (0, 1), (-1, 0)].into_iter().enumerate() {
                let neighbour = self
                    .index(cell.offset(dx, dy))
                    .map(|n| grid.cells[n])
                    .unwrap_or_default();
                if neighbour.active && neighbour.kind == tile.kind {
                    frame |= 1 << bit;
                }
            }
            grid.cells[idx].frame = frame;
        }
        Ok(())
    }

    fn find_sign(&self, pos: TilePos) -> Option<SignId> {
        let idx = self.index(pos)?;
        let grid = self.read();
        if !grid.cells[idx].is_sign() {
            return None;
        }
        grid.signs
            .iter()
            .find(|(_, entry)| entry.pos == pos)
            .map(|(id, _)| *id)
    }

    fn sign_text(&self, id: SignId) -> Option<String> {
        self.read().signs.get(&id).map(|entry| entry.text.clone())
    }

    fn set_sign_text(&self, id: SignId, text: &str) -> anyhow::Result<()> {
        let mut grid = self.write();
        let Some(entry) = grid.signs.get_mut(&id) else {
            bail!("Sign {id} does not exist");
        };
        entry.text = text.to_string();
        Ok(())
    }
}
