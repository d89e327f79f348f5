//! Convergence engine: brings the board area to the correct three signs.
//!
//! A run probes the three panel cells. When all three signs are there the
//! texts are rewritten in place. Otherwise the area is cleared around the
//! panels, every panel gets a wooden support block, and missing signs are
//! placed and written. Runs are serialised by an engine-owned mutex and the
//! world work happens on tokio's blocking pool.

use std::sync::Arc;

use anyhow::Context;
use board_core::constants::{PANEL_COUNT, SYNC_SQUARE_SIZE};
use board_core::traits::{Broadcaster, ProgressSource, World};
use board_core::types::{Panel, ProgressFlags, TileKind, TilePos};
use tokio::sync::Mutex;

use crate::layout::{self, ClearBounds};
use crate::probe::{self, AreaState};
use crate::render::render;

/// How a convergence run ended. Failures are logged inside the engine and
/// only show up here as `Aborted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvergeOutcome {
    /// All three signs existed; `rewritten` of them got fresh text.
    Updated { rewritten: usize },
    /// The area was rebuilt. `placed` new signs were created and `rewritten`
    /// surviving ones were overwritten.
    Rebuilt { placed: usize, rewritten: usize },
    /// The run hit a fault and stopped where it was.
    Aborted,
}

/// Cheap to clone; clones share the same ports and the same lock.
#[derive(Clone)]
pub struct ConvergenceEngine {
    world: Arc<dyn World>,
    progress: Arc<dyn ProgressSource>,
    network: Arc<dyn Broadcaster>,
    lock: Arc<Mutex<()>>,
}

impl ConvergenceEngine {
    pub fn new(
        world: Arc<dyn World>,
        progress: Arc<dyn ProgressSource>,
        network: Arc<dyn Broadcaster>,
    ) -> Self {
        Self {
            world,
            progress,
            network,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Runs one convergence on behalf of `trigger`.
    ///
    /// Waits for any run already in flight. Never fails: errors and panics
    /// from the world are logged and reported as [`ConvergeOutcome::Aborted`].
    pub async fn converge(&self, trigger: &str) -> ConvergeOutcome {
        let guard = self.lock.clone().lock_owned().await;

        let job = self.clone();
        let owner = trigger.to_string();
        // The guard travels with the blocking job: dropping this future must
        // not release the lock while the world is still being written.
        let result = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            job.converge_blocking(&owner)
        })
        .await;

        match result {
            Ok(Ok(outcome)) => {
                log::info!("[{trigger}] Progress signs converged: {outcome:?}");
                outcome
            }
            Ok(Err(err)) => {
                log::error!("[{trigger}] Error updating progress signs: {err:#}");
                ConvergeOutcome::Aborted
            }
            Err(err) => {
                log::error!("[{trigger}] Progress sign update did not finish: {err}");
                ConvergeOutcome::Aborted
            }
        }
    }

    fn converge_blocking(&self, trigger: &str) -> anyhow::Result<ConvergeOutcome> {
        let anchor = self.world.spawn_point();
        let panels = layout::panel_positions(anchor);
        let area = probe::probe_area(self.world.as_ref(), &panels);
        log::debug!(
            "[{trigger}] Board anchored at {anchor}, {}/{PANEL_COUNT} signs present",
            area.present_count()
        );

        if area.is_complete() {
            let flags = self.progress.snapshot().flags;
            let rewritten = self.update_in_place(&panels, flags)?;
            Ok(ConvergeOutcome::Updated { rewritten })
        } else {
            self.rebuild(trigger, &panels, area)
        }
    }

    fn update_in_place(
        &self,
        panels: &[Panel; PANEL_COUNT],
        flags: ProgressFlags,
    ) -> anyhow::Result<usize> {
        let mut rewritten = 0;
        for panel in panels {
            if self.rewrite_sign(panel, flags)? {
                rewritten += 1;
            }
        }
        Ok(rewritten)
    }

    fn rebuild(
        &self,
        trigger: &str,
        panels: &[Panel; PANEL_COUNT],
        area: AreaState,
    ) -> anyhow::Result<ConvergeOutcome> {
        let bounds = layout::clear_bounds(panels);
        let cleared = self.clear_obstacles(bounds)?;
        log::debug!("[{trigger}] Cleared {cleared} obstacles in {bounds:?}");

        for panel in panels {
            self.ensure_support(panel.pos.below())?;
        }

        let flags = self.progress.snapshot().flags;
        let mut placed = 0;
        let mut rewritten = 0;
        for (panel, was_present) in panels.iter().zip(area.present) {
            // Re-probe: the cell may have changed since the first look.
            if probe::sign_exists(self.world.as_ref(), panel.pos) {
                if self.rewrite_sign(panel, flags)? {
                    rewritten += 1;
                }
            } else if self.place_sign(panel, flags)? {
                placed += 1;
            } else {
                log::debug!(
                    "[{trigger}] Could not place {} sign at {} (present before: {was_present})",
                    panel.role,
                    panel.pos
                );
            }
        }

        Ok(ConvergeOutcome::Rebuilt { placed, rewritten })
    }

    /// Removes every non-sign tile (and its wall) inside `bounds`.
    fn clear_obstacles(&self, bounds: ClearBounds) -> anyhow::Result<usize> {
        let mut cleared = 0;
        for pos in bounds.cells() {
            let Some(tile) = self.world.tile(pos) else {
                continue;
            };
            if tile.is_obstacle() {
                self.world
                    .kill_tile(pos)
                    .with_context(|| format!("Failed to clear obstacle at {pos}"))?;
                self.world
                    .clear_wall(pos)
                    .with_context(|| format!("Failed to clear wall at {pos}"))?;
                cleared += 1;
            }
        }
        Ok(cleared)
    }

    /// Replaces whatever is at `pos` with a freshly framed wood block.
    fn ensure_support(&self, pos: TilePos) -> anyhow::Result<()> {
        self.world
            .kill_tile(pos)
            .with_context(|| format!("Failed to clear support cell {pos}"))?;
        if !self
            .world
            .place_tile(pos, TileKind::WoodBlock)
            .with_context(|| format!("Failed to place support block at {pos}"))?
        {
            log::warn!("Support block at {pos} was refused");
        }
        self.world
            .square_frame(pos)
            .with_context(|| format!("Failed to frame support block at {pos}"))
    }

    /// Places a new sign for `panel` and writes its text. `Ok(false)` when
    /// the host refused the placement or the new sign cannot be found.
    fn place_sign(&self, panel: &Panel, flags: ProgressFlags) -> anyhow::Result<bool> {
        let placed = self
            .world
            .place_object(panel.pos, TileKind::Sign)
            .with_context(|| format!("Failed to place {} sign at {}", panel.role, panel.pos))?;
        self.world
            .square_frame(panel.pos)
            .with_context(|| format!("Failed to frame sign at {}", panel.pos))?;

        if !placed {
            return Ok(false);
        }
        let Some(id) = self.world.find_sign(panel.pos) else {
            return Ok(false);
        };

        self.world
            .set_sign_text(id, &render(panel.role, flags))
            .with_context(|| format!("Failed to write {} sign {id}", panel.role))?;
        self.network.tile_square(panel.pos, SYNC_SQUARE_SIZE);
        Ok(true)
    }

    /// Overwrites the text of the sign already standing on `panel`.
    fn rewrite_sign(&self, panel: &Panel, flags: ProgressFlags) -> anyhow::Result<bool> {
        let Some(id) = self.world.find_sign(panel.pos) else {
            return Ok(false);
        };

        self.world
            .set_sign_text(id, &render(panel.role, flags))
            .with_context(|| format!("Failed to update {} sign {id}", panel.role))?;
        self.network.sign_changed(id);
        self.network.tile_square(panel.pos, SYNC_SQUARE_SIZE);
        Ok(true)
    }
}
