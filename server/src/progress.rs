//! Shared milestone state owned by the simulation.

use std::sync::{PoisonError, RwLock};

use board_core::traits::ProgressSource;
use board_core::types::{InvasionType, NpcKind, ProgressFlags, WorldProgress};

/// Progress store the simulation writes and the board reads.
#[derive(Default)]
pub struct SharedProgress {
    state: RwLock<WorldProgress>,
}

impl SharedProgress {
    pub fn new(initial: WorldProgress) -> Self {
        Self {
            state: RwLock::new(initial),
        }
    }

    pub fn mark(&self, flags: ProgressFlags) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .flags
            .insert(flags);
    }

    pub fn set_invasion(&self, invasion: InvasionType) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .invasion = invasion;
    }

    /// Applies the flag a kill of `npc` sets in the simulation, if any.
    pub fn record_kill(&self, npc: NpcKind) -> Option<ProgressFlags> {
        let flag = milestone_for(npc)?;
        self.mark(flag);
        Some(flag)
    }
}

impl ProgressSource for SharedProgress {
    fn snapshot(&self) -> WorldProgress {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Flag the simulation sets when `npc` dies.
///
/// Either twin counts for The Twins. Invasion leaders map to their
/// invasion, which the real simulation only flags once the whole invasion
/// is beaten.
pub fn milestone_for(npc: NpcKind) -> Option<ProgressFlags> {
    let flag = match npc {
        NpcKind::KingSlime => ProgressFlags::KingSlime,
        NpcKind::EyeOfCthulhu => ProgressFlags::EyeOfCthulhu,
        NpcKind::BrainOfCthulhu | NpcKind::EaterOfWorldsHead => ProgressFlags::EvilBoss,
        NpcKind::SkeletronHead => ProgressFlags::Skeletron,
        NpcKind::QueenBee => ProgressFlags::QueenBee,
        NpcKind::Deerclops => ProgressFlags::Deerclops,
        NpcKind::WallOfFlesh => ProgressFlags::Hardmode,
        NpcKind::Retinazer | NpcKind::Spazmatism => ProgressFlags::Twins,
        NpcKind::TheDestroyer => ProgressFlags::Destroyer,
        NpcKind::SkeletronPrime => ProgressFlags::SkeletronPrime,
        NpcKind::Plantera => ProgressFlags::Plantera,
        NpcKind::Golem => ProgressFlags::Golem,
        NpcKind::QueenSlime => ProgressFlags::QueenSlime,
        NpcKind::DukeFishron => ProgressFlags::DukeFishron,
        NpcKind::EmpressOfLight => ProgressFlags::EmpressOfLight,
        NpcKind::LunaticCultist => ProgressFlags::LunaticCultist,
        NpcKind::MoonLordCore => ProgressFlags::MoonLord,
        NpcKind::GoblinSorcerer => ProgressFlags::GoblinArmy,
        NpcKind::PirateCaptain => ProgressFlags::Pirates,
        NpcKind::MartianSaucer => ProgressFlags::Martians,
        NpcKind::Other(_) => return None,
    };
    Some(flag)
}
