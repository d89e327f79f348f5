//! Inbound triggers: the NPC-killed hook and the `bossstatus` command.
//!
//! Both dispatch a convergence onto the tokio runtime and return at once.
//! The returned [`JoinHandle`] may be dropped; the engine logs its own
//! failures.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use board_core::constants::{BOSS_STATUS_COMMAND, BOSS_STATUS_PERMISSION, SYSTEM_TRIGGER};
use board_core::traits::ProgressSource;
use board_core::types::{NpcKind, WorldProgress};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::engine::{ConvergeOutcome, ConvergenceEngine};

/// Whether a kill of `npc` can have moved the board.
pub fn is_milestone_kill(npc: NpcKind, progress: WorldProgress) -> bool {
    npc.is_boss() || npc.is_invasion_enemy() || progress.invasion.is_active()
}

// ---------------------------------------------------------------------------
//  Hook registry
// ---------------------------------------------------------------------------

pub type NpcKilledHandler = Arc<dyn Fn(NpcKind) + Send + Sync>;

/// Host-side list of NPC-killed callbacks.
#[derive(Default)]
pub struct HookRegistry {
    next_id: AtomicU64,
    npc_killed: Mutex<Vec<(u64, NpcKilledHandler)>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_npc_killed(&self, handler: NpcKilledHandler) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.npc_killed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, handler));
        id
    }

    pub fn deregister_npc_killed(&self, id: u64) -> bool {
        let mut handlers = self
            .npc_killed
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let before = handlers.len();
        handlers.retain(|(handler_id, _)| *handler_id != id);
        handlers.len() != before
    }

    /// Invokes every registered handler with `npc`.
    pub fn fire_npc_killed(&self, npc: NpcKind) {
        // Call outside the lock so a handler may register or deregister.
        let handlers: Vec<NpcKilledHandler> = self
            .npc_killed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();
        for handler in handlers {
            handler(npc);
        }
    }

    pub fn npc_killed_count(&self) -> usize {
        self.npc_killed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Keeps the board's hook registered; deregisters on drop.
pub struct HookRegistration {
    registry: Arc<HookRegistry>,
    id: u64,
}

impl Drop for HookRegistration {
    fn drop(&mut self) {
        self.registry.deregister_npc_killed(self.id);
        log::info!("Progress board hooks deregistered");
    }
}

// ---------------------------------------------------------------------------
//  Commands
// ---------------------------------------------------------------------------

/// Someone issuing a chat/console command.
#[derive(Debug, Clone)]
pub struct Operator {
    pub name: String,
    permissions: HashSet<String>,
}

impl Operator {
    pub fn new(name: &str, permissions: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// The host console, which may run everything.
    pub fn console() -> Self {
        Self::new("Server", &["*"])
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains("*") || self.permissions.contains(permission)
    }
}

pub enum CommandReply {
    /// The refresh is running in the background.
    Dispatched(JoinHandle<ConvergeOutcome>),
    UnknownCommand(String),
    PermissionDenied,
}

impl CommandReply {
    /// Text shown to the invoker.
    pub fn message(&self) -> String {
        match self {
            CommandReply::Dispatched(_) => "Updating progress signs...".to_string(),
            CommandReply::UnknownCommand(name) => format!("Invalid command '{name}'."),
            CommandReply::PermissionDenied => {
                "You do not have access to this command.".to_string()
            }
        }
    }
}

// ---------------------------------------------------------------------------
//  Board
// ---------------------------------------------------------------------------

/// The progress board as the host sees it: an engine plus its triggers.
pub struct ProgressBoard {
    engine: ConvergenceEngine,
    progress: Arc<dyn ProgressSource>,
    runtime: Handle,
}

impl ProgressBoard {
    pub fn new(
        engine: ConvergenceEngine,
        progress: Arc<dyn ProgressSource>,
        runtime: Handle,
    ) -> Arc<Self> {
        Arc::new(Self {
            engine,
            progress,
            runtime,
        })
    }

    /// Hooks the board into the host's NPC-killed event.
    pub fn initialize(self: &Arc<Self>, registry: &Arc<HookRegistry>) -> HookRegistration {
        let board = Arc::clone(self);
        let id = registry.register_npc_killed(Arc::new(move |npc: NpcKind| {
            board.on_npc_killed(npc);
        }));
        log::info!("Progress board hooks registered");
        HookRegistration {
            registry: Arc::clone(registry),
            id,
        }
    }

    /// Starts a convergence without waiting for it.
    pub fn dispatch(&self, owner: &str) -> JoinHandle<ConvergeOutcome> {
        let engine = self.engine.clone();
        let owner = owner.to_string();
        self.runtime
            .spawn(async move { engine.converge(&owner).await })
    }

    /// NPC-killed hook. Dispatches only for milestone kills.
    pub fn on_npc_killed(&self, npc: NpcKind) -> Option<JoinHandle<ConvergeOutcome>> {
        if !is_milestone_kill(npc, self.progress.snapshot()) {
            return None;
        }
        log::debug!("Milestone kill {npc:?}, refreshing progress signs");
        Some(self.dispatch(SYSTEM_TRIGGER))
    }

    /// Runs an operator command. Only `bossstatus` is known.
    pub fn run_command(&self, invoker: &Operator, command: &str) -> CommandReply {
        // Arguments are accepted and ignored.
        let name = command
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .trim_start_matches('/')
            .to_lowercase();
        if name != BOSS_STATUS_COMMAND {
            return CommandReply::UnknownCommand(name);
        }
        if !invoker.has_permission(BOSS_STATUS_PERMISSION) {
            log::warn!(
                "{} tried to run {BOSS_STATUS_COMMAND} without {BOSS_STATUS_PERMISSION}",
                invoker.name
            );
            return CommandReply::PermissionDenied;
        }
        log::info!("{} requested a progress sign refresh", invoker.name);
        CommandReply::Dispatched(self.dispatch(SYSTEM_TRIGGER))
    }
}
