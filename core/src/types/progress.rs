//! Boss and invasion progress as seen by the board

use std::str::FromStr;

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// Milestone flags owned by the world simulation.
    ///
    /// One bit per kill/completion flag the simulation tracks. Aggregate
    /// board lines (Pumpkin Moon, Frost Moon) are expressed as unions of the
    /// individual bits rather than bits of their own.
    pub struct ProgressFlags: u64 {
        // pre-hardmode
        const KingSlime = 1u64 << 0;
        const EyeOfCthulhu = 1u64 << 1;
        /// Eater of Worlds or Brain of Cthulhu, whichever the world has.
        const EvilBoss = 1u64 << 2;
        const Skeletron = 1u64 << 3;
        const QueenBee = 1u64 << 4;
        const Deerclops = 1u64 << 5;
        /// Set once the world entered hardmode, which defeating the Wall of
        /// Flesh causes.
        const Hardmode = 1u64 << 6;

        // hardmode
        const Destroyer = 1u64 << 8;
        const Twins = 1u64 << 9;
        const SkeletronPrime = 1u64 << 10;
        const Plantera = 1u64 << 11;
        const Golem = 1u64 << 12;
        const QueenSlime = 1u64 << 13;
        const DukeFishron = 1u64 << 14;
        const EmpressOfLight = 1u64 << 15;
        const LunaticCultist = 1u64 << 16;
        const MoonLord = 1u64 << 17;

        // invasions and events
        const GoblinArmy = 1u64 << 24;
        const Pirates = 1u64 << 25;
        const Martians = 1u64 << 26;
        const Pumpking = 1u64 << 27;
        const MourningWood = 1u64 << 28;
        const IceQueen = 1u64 << 29;
        const SantaNk1 = 1u64 << 30;
        const Everscream = 1u64 << 31;
        /// All four celestial pillars are down.
        const CelestialPillars = 1u64 << 32;
        const FrostLegion = 1u64 << 33;
    }
}

impl ProgressFlags {
    /// Both Pumpkin Moon bosses.
    pub const PUMPKIN_MOON: Self = Self::Pumpking.union(Self::MourningWood);
    /// All three Frost Moon bosses.
    pub const FROST_MOON: Self = Self::IceQueen
        .union(Self::SantaNk1)
        .union(Self::Everscream);
}

impl FromStr for ProgressFlags {
    type Err = String;

    /// Parses `"KingSlime | Hardmode"` style text. Empty text is no progress.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Self::empty());
        }
        bitflags::parser::from_str::<Self>(s)
            .map_err(|err| format!("Invalid progress flags '{s}': {err}"))
    }
}

/// Invasion currently running in the world, if any.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InvasionType {
    #[default]
    None = 0,
    Goblins = 1,
    FrostLegion = 2,
    Pirates = 3,
    Martians = 4,
}

impl InvasionType {
    pub fn is_active(self) -> bool {
        self != InvasionType::None
    }
}

impl FromStr for InvasionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(InvasionType::None),
            "goblins" | "goblin" => Ok(InvasionType::Goblins),
            "frostlegion" | "frost" => Ok(InvasionType::FrostLegion),
            "pirates" | "pirate" => Ok(InvasionType::Pirates),
            "martians" | "martian" => Ok(InvasionType::Martians),
            other => Err(format!("Unknown invasion type '{other}'")),
        }
    }
}

/// Snapshot of everything the board reads from the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorldProgress {
    pub flags: ProgressFlags,
    pub invasion: InvasionType,
}

impl WorldProgress {
    pub fn new(flags: ProgressFlags, invasion: InvasionType) -> Self {
        Self { flags, invasion }
    }
}
