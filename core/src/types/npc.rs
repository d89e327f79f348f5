//! NPC kinds reported by kill events

use std::str::FromStr;

/// Kind of a killed NPC. Only the kinds the board reacts to are named;
/// everything else arrives as `Other` with the host's raw id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NpcKind {
    KingSlime,
    EyeOfCthulhu,
    BrainOfCthulhu,
    EaterOfWorldsHead,
    SkeletronHead,
    QueenBee,
    Deerclops,
    WallOfFlesh,
    Retinazer,
    Spazmatism,
    TheDestroyer,
    SkeletronPrime,
    Plantera,
    Golem,
    QueenSlime,
    DukeFishron,
    EmpressOfLight,
    LunaticCultist,
    MoonLordCore,
    GoblinSorcerer,
    PirateCaptain,
    MartianSaucer,
    Other(u16),
}

impl NpcKind {
    /// Bosses whose death can flip a milestone flag.
    pub fn is_boss(self) -> bool {
        matches!(
            self,
            NpcKind::KingSlime
                | NpcKind::EyeOfCthulhu
                | NpcKind::BrainOfCthulhu
                | NpcKind::EaterOfWorldsHead
                | NpcKind::SkeletronHead
                | NpcKind::QueenBee
                | NpcKind::Deerclops
                | NpcKind::WallOfFlesh
                | NpcKind::Retinazer
                | NpcKind::Spazmatism
                | NpcKind::TheDestroyer
                | NpcKind::SkeletronPrime
                | NpcKind::Plantera
                | NpcKind::Golem
                | NpcKind::QueenSlime
                | NpcKind::DukeFishron
                | NpcKind::EmpressOfLight
                | NpcKind::LunaticCultist
                | NpcKind::MoonLordCore
        )
    }

    /// Leaders of the goblin, pirate and martian invasions.
    pub fn is_invasion_enemy(self) -> bool {
        matches!(
            self,
            NpcKind::GoblinSorcerer | NpcKind::PirateCaptain | NpcKind::MartianSaucer
        )
    }
}

impl FromStr for NpcKind {
    type Err = String;

    /// Accepts the variant name in any case, with or without spaces, or a raw
    /// numeric id for unnamed kinds.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();

        let kind = match key.as_str() {
            "kingslime" => NpcKind::KingSlime,
            "eyeofcthulhu" => NpcKind::EyeOfCthulhu,
            "brainofcthulhu" => NpcKind::BrainOfCthulhu,
            "eaterofworlds" | "eaterofworldshead" => NpcKind::EaterOfWorldsHead,
            "skeletron" | "skeletronhead" => NpcKind::SkeletronHead,
            "queenbee" => NpcKind::QueenBee,
            "deerclops" => NpcKind::Deerclops,
            "wallofflesh" => NpcKind::WallOfFlesh,
            "retinazer" => NpcKind::Retinazer,
            "spazmatism" => NpcKind::Spazmatism,
            "thedestroyer" | "destroyer" => NpcKind::TheDestroyer,
            "skeletronprime" => NpcKind::SkeletronPrime,
            "plantera" => NpcKind::Plantera,
            "golem" => NpcKind::Golem,
            "queenslime" => NpcKind::QueenSlime,
            "dukefishron" => NpcKind::DukeFishron,
            "empressoflight" => NpcKind::EmpressOfLight,
            "lunaticcultist" | "cultist" => NpcKind::LunaticCultist,
            "moonlord" | "moonlordcore" => NpcKind::MoonLordCore,
            "goblinsorcerer" => NpcKind::GoblinSorcerer,
            "piratecaptain" => NpcKind::PirateCaptain,
            "martiansaucer" => NpcKind::MartianSaucer,
            other => match other.parse::<u16>() {
                Ok(id) => NpcKind::Other(id),
                Err(_) => return Err(format!("Unknown NPC kind '{}'", s.trim())),
            },
        };
        Ok(kind)
    }
}
