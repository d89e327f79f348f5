//! Panel text rendering.
//!
//! Each panel is a fixed list of `(label, required flags)` lines. A line is
//! checked when every required flag is set, which is how the aggregate
//! Pumpkin Moon and Frost Moon lines work.

use board_core::constants::{GLYPH_DONE, GLYPH_OPEN};
use board_core::types::{PanelRole, ProgressFlags};

type Line = (&'static str, ProgressFlags);

const PRE_HARDMODE_LINES: [Line; 7] = [
    ("King Slime", ProgressFlags::KingSlime),
    ("Eye of Cthulhu", ProgressFlags::EyeOfCthulhu),
    ("Eater of Worlds/Brain of Cthulhu", ProgressFlags::EvilBoss),
    ("Skeletron", ProgressFlags::Skeletron),
    ("Queen Bee", ProgressFlags::QueenBee),
    ("Deerclops", ProgressFlags::Deerclops),
    // Killing the Wall of Flesh is what starts hardmode.
    ("Wall of Flesh", ProgressFlags::Hardmode),
];

const HARDMODE_LINES: [Line; 10] = [
    ("The Destroyer", ProgressFlags::Destroyer),
    ("The Twins", ProgressFlags::Twins),
    ("Skeletron Prime", ProgressFlags::SkeletronPrime),
    ("Plantera", ProgressFlags::Plantera),
    ("Golem", ProgressFlags::Golem),
    ("Queen Slime", ProgressFlags::QueenSlime),
    ("Duke Fishron", ProgressFlags::DukeFishron),
    ("Empress of Light", ProgressFlags::EmpressOfLight),
    ("Lunatic Cultist", ProgressFlags::LunaticCultist),
    ("Moon Lord", ProgressFlags::MoonLord),
];

const INVASION_LINES: [Line; 7] = [
    ("Goblin Army", ProgressFlags::GoblinArmy),
    ("Pirate Invasion", ProgressFlags::Pirates),
    ("Martian Madness", ProgressFlags::Martians),
    ("Pumpkin Moon", ProgressFlags::PUMPKIN_MOON),
    ("Frost Moon", ProgressFlags::FROST_MOON),
    ("Celestial Pillars", ProgressFlags::CelestialPillars),
    ("Frost Legion", ProgressFlags::FrostLegion),
];

fn lines_for(role: PanelRole) -> &'static [Line] {
    match role {
        PanelRole::PreHardmode => &PRE_HARDMODE_LINES,
        PanelRole::Hardmode => &HARDMODE_LINES,
        PanelRole::Invasion => &INVASION_LINES,
    }
}

fn glyph(done: bool) -> &'static str {
    if done {
        GLYPH_DONE
    } else {
        GLYPH_OPEN
    }
}

/// Text for the panel with `role`, one `"<name>: <glyph>"` line per
/// milestone, newline separated with no trailing newline.
pub fn render(role: PanelRole, flags: ProgressFlags) -> String {
    lines_for(role)
        .iter()
        .map(|(label, required)| format!("{label}: {}", glyph(flags.contains(*required))))
        .collect::<Vec<_>>()
        .join("\n")
}
