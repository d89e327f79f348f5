//! Constants module - fixed layout and glyphs of the progress signboard

// =============================================================================
// Panel layout
// =============================================================================

/// Horizontal offset of the first panel from the spawn point
pub const FIRST_PANEL_OFFSET_X: i32 = -10;
/// Horizontal spacing between neighbouring panels
pub const PANEL_SPACING_X: i32 = 5;
/// Number of panels on the board
pub const PANEL_COUNT: usize = 3;

/// Cells cleared to the left of the first and right of the last panel
pub const CLEAR_MARGIN_X: i32 = 3;
/// Cells cleared above the panel row
pub const CLEAR_MARGIN_ABOVE: i32 = 3;

/// Side length of the tile square broadcast around a changed panel
pub const SYNC_SQUARE_SIZE: u8 = 3;

// =============================================================================
// Rendering
// =============================================================================

/// Glyph for a met milestone
pub const GLYPH_DONE: &str = "✔";
/// Glyph for an outstanding milestone
pub const GLYPH_OPEN: &str = "✘";

// =============================================================================
// Commands
// =============================================================================

/// Operator command that forces a board refresh
pub const BOSS_STATUS_COMMAND: &str = "bossstatus";
/// Permission required to run [`BOSS_STATUS_COMMAND`]
pub const BOSS_STATUS_PERMISSION: &str = "signboard.use";
/// Owner name recorded for every convergence started by the hooks
pub const SYSTEM_TRIGGER: &str = "System";
