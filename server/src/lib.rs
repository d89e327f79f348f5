/// Progress signboard library crate.
///
/// Keeps three signs next to the world spawn in sync with the simulation's
/// boss and invasion progress. The console host in `main.rs` and the
/// integration tests both drive it through [`hooks::ProgressBoard`].

/// Environment configuration for the console host.
pub mod config;

/// The convergence engine that builds or updates the board.
///
/// Provides [`engine::ConvergenceEngine::converge`], serialised behind an
/// engine-owned lock.
pub mod engine;

/// NPC-killed hook, `bossstatus` command and hook registration.
pub mod hooks;

/// Pure board geometry derived from the spawn point.
pub mod layout;

/// In-memory world used by the console host and the tests.
pub mod memory_world;

/// Outbound sync packets, journaled.
pub mod network_manager;

/// Read-only sign checks at the panel cells.
pub mod probe;

/// Shared milestone state written by the simulation.
pub mod progress;

/// Pure panel text rendering.
pub mod render;
