use std::sync::{Mutex, PoisonError};

use board_core::traits::Broadcaster;
use board_core::types::{SignId, TilePos};
use chrono::{DateTime, Local};

/// What an outbound sync packet announced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncKind {
    /// Sign text packet for every observer.
    SignText(SignId),
    /// Tile square packet of `size` cells centred on `center`.
    TileSquare { center: TilePos, size: u8 },
}

#[derive(Debug, Clone)]
pub struct SyncEvent {
    pub at: DateTime<Local>,
    pub kind: SyncKind,
}

/// Broadcast side of the host's network layer.
///
/// Keeps a journal of every packet it was asked to send so that the console
/// host can show it and tests can assert on it.
#[derive(Default)]
pub struct NetworkManager {
    journal: Mutex<Vec<SyncEvent>>,
}

impl NetworkManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, kind: SyncKind) {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SyncEvent {
                at: Local::now(),
                kind,
            });
    }

    /// Every packet sent so far, oldest first.
    pub fn events(&self) -> Vec<SyncKind> {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|event| event.kind)
            .collect()
    }

    /// Drains the journal.
    pub fn take_events(&self) -> Vec<SyncEvent> {
        std::mem::take(&mut *self.journal.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Broadcaster for NetworkManager {
    fn sign_changed(&self, id: SignId) {
        log::debug!("sync: sign {id} text changed");
        self.push(SyncKind::SignText(id));
    }

    fn tile_square(&self, center: TilePos, size: u8) {
        log::debug!("sync: tile square {size}x{size} at {center}");
        self.push(SyncKind::TileSquare { center, size });
    }
}
