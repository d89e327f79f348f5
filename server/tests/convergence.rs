use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};
use std::time::Duration;

use board_core::traits::World;
use board_core::types::{ProgressFlags, SignId, Tile, TileKind, TilePos, WorldProgress};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use signboard::engine::{ConvergeOutcome, ConvergenceEngine};
use signboard::hooks::ProgressBoard;
use signboard::layout;
use signboard::memory_world::MemoryWorld;
use signboard::network_manager::NetworkManager;
use signboard::progress::SharedProgress;
use signboard::render::render;

const SPAWN: TilePos = TilePos::new(50, 30);

fn ground() -> Arc<MemoryWorld> {
    Arc::new(MemoryWorld::with_ground(100, 60, SPAWN).expect("world size"))
}

fn progress(flags: ProgressFlags) -> Arc<SharedProgress> {
    Arc::new(SharedProgress::new(WorldProgress {
        flags,
        ..Default::default()
    }))
}

/// Sign id and text at each panel cell.
fn board_state(world: &dyn World) -> Vec<Option<(SignId, String)>> {
    layout::panel_positions(world.spawn_point())
        .iter()
        .map(|panel| {
            let id = world.find_sign(panel.pos)?;
            Some((id, world.sign_text(id)?))
        })
        .collect()
}

fn assert_board_matches(world: &dyn World, flags: ProgressFlags) {
    for panel in layout::panel_positions(world.spawn_point()) {
        let id = world
            .find_sign(panel.pos)
            .unwrap_or_else(|| panic!("no {} sign at {}", panel.role, panel.pos));
        assert_eq!(
            world.sign_text(id),
            Some(render(panel.role, flags)),
            "{} panel text",
            panel.role
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_converge_from_scratch() {
    let world = ground();
    let flags = ProgressFlags::EyeOfCthulhu | ProgressFlags::Twins | ProgressFlags::PUMPKIN_MOON;
    let engine = ConvergenceEngine::new(
        world.clone(),
        progress(flags),
        Arc::new(NetworkManager::new()),
    );

    let outcome = engine.converge("scratch").await;

    assert_eq!(
        outcome,
        ConvergeOutcome::Rebuilt {
            placed: 3,
            rewritten: 0
        }
    );
    assert_eq!(world.sign_count(), 3);
    assert_board_matches(&*world, flags);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_converge_is_idempotent() {
    let world = ground();
    let engine = ConvergenceEngine::new(
        world.clone(),
        progress(ProgressFlags::Hardmode | ProgressFlags::Golem),
        Arc::new(NetworkManager::new()),
    );

    engine.converge("first").await;
    let first = board_state(&*world);

    let outcome = engine.converge("second").await;
    let second = board_state(&*world);

    assert_eq!(outcome, ConvergeOutcome::Updated { rewritten: 3 });
    assert_eq!(first, second, "Same ids and texts after a repeat run");
    assert_eq!(world.sign_count(), 3);
    assert_eq!(world.signs_destroyed(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_partial_state_repair_keeps_existing_signs() {
    let world = ground();
    let flags = ProgressFlags::KingSlime | ProgressFlags::FrostLegion;
    let engine = ConvergenceEngine::new(
        world.clone(),
        progress(flags),
        Arc::new(NetworkManager::new()),
    );
    engine.converge("build").await;

    let panels = layout::panel_positions(SPAWN);
    let kept: Vec<_> = panels[..2]
        .iter()
        .map(|panel| world.find_sign(panel.pos).expect("built"))
        .collect();

    // Third sign replaced by an unrelated obstacle.
    world.set_tile(panels[2].pos, TileKind::Stone);
    world.set_wall(panels[2].pos, 9);
    let destroyed_before = world.signs_destroyed();

    let outcome = engine.converge("repair").await;

    assert_eq!(
        outcome,
        ConvergeOutcome::Rebuilt {
            placed: 1,
            rewritten: 2
        }
    );
    assert_eq!(world.find_sign(panels[0].pos), Some(kept[0]));
    assert_eq!(world.find_sign(panels[1].pos), Some(kept[1]));
    assert_eq!(world.signs_destroyed(), destroyed_before, "No sign was recreated");
    assert_eq!(world.tile(panels[2].pos).map(|t| t.wall), Some(0));
    assert_eq!(world.sign_count(), 3);
    assert_board_matches(&*world, flags);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_rebuild_clears_obstacles_inside_bounds_only() {
    let world = ground();
    let engine = ConvergenceEngine::new(
        world.clone(),
        progress(ProgressFlags::empty()),
        Arc::new(NetworkManager::new()),
    );
    let panels = layout::panel_positions(SPAWN);
    let bounds = layout::clear_bounds(&panels);

    let inside = TilePos::new(bounds.left, bounds.top);
    let outside_left = TilePos::new(bounds.left - 1, bounds.top);
    let above = TilePos::new(bounds.left, bounds.top - 1);
    for pos in [inside, outside_left, above] {
        world.set_wall(pos, 2);
        world.set_tile(pos, TileKind::Tree);
    }

    engine.converge("clear").await;

    assert_eq!(world.tile(inside), Some(Tile::default()));
    assert_eq!(world.tile(outside_left).map(|t| t.active), Some(true));
    assert_eq!(world.tile(above).map(|t| t.active), Some(true));
    for panel in &panels {
        let support = world.tile(panel.pos.below()).expect("in range");
        assert!(support.active && support.kind == TileKind::WoodBlock);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_repairs_random_damage() {
    let flags = ProgressFlags::all();
    for seed in 0..16u64 {
        let world = ground();
        let engine = ConvergenceEngine::new(
            world.clone(),
            progress(flags),
            Arc::new(NetworkManager::new()),
        );
        engine.converge("build").await;

        let bounds = layout::clear_bounds(&layout::panel_positions(SPAWN));
        let mut rng = StdRng::seed_from_u64(seed);
        for _ in 0..12 {
            let pos = TilePos::new(
                rng.gen_range(bounds.left..=bounds.right),
                rng.gen_range(bounds.top..=bounds.bottom + 1),
            );
            match rng.gen_range(0..3) {
                0 => world.clear_cell(pos),
                1 => world.set_tile(pos, TileKind::Stone),
                _ => world.set_tile(pos, TileKind::Torch),
            }
        }

        let outcome = engine.converge("repair").await;
        assert_ne!(outcome, ConvergeOutcome::Aborted, "seed {seed}");
        assert_board_matches(&*world, flags);
        assert_eq!(world.sign_count(), 3, "seed {seed}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_board_off_the_world_edge_aborts_quietly() {
    let world = MemoryWorld::with_ground(40, 20, TilePos::new(4, 10)).expect("world size");
    let world = Arc::new(world);
    let engine = ConvergenceEngine::new(
        world.clone(),
        progress(ProgressFlags::empty()),
        Arc::new(NetworkManager::new()),
    );

    assert_eq!(engine.converge("edge").await, ConvergeOutcome::Aborted);
    assert_eq!(world.sign_count(), 0);
}

// ---------------------------------------------------------------------------
//  Mutual exclusion
// ---------------------------------------------------------------------------

/// Delegates to a `MemoryWorld`, recording which thread made each call and
/// stalling on the first read of a run.
struct TracingWorld {
    inner: MemoryWorld,
    calls: Mutex<Vec<(&'static str, ThreadId)>>,
    delay: Duration,
}

impl TracingWorld {
    fn new(delay: Duration) -> Self {
        Self {
            inner: MemoryWorld::with_ground(100, 60, SPAWN).expect("world size"),
            calls: Mutex::new(Vec::new()),
            delay,
        }
    }

    fn record(&self, op: &'static str) {
        self.calls.lock().unwrap().push((op, thread::current().id()));
    }

    /// Asserts every run's calls came from a single thread without any
    /// other run starting in between. Returns the number of runs.
    fn assert_runs_serialised(&self) -> usize {
        let calls = self.calls.lock().unwrap();
        let mut current = None;
        let mut runs = 0;
        for (i, (op, thread)) in calls.iter().enumerate() {
            if *op == "spawn_point" {
                current = Some(*thread);
                runs += 1;
            } else {
                assert_eq!(Some(*thread), current, "call {i} ({op}) interleaved");
            }
        }
        runs
    }
}

impl World for TracingWorld {
    fn spawn_point(&self) -> TilePos {
        self.record("spawn_point");
        thread::sleep(self.delay);
        self.inner.spawn_point()
    }

    fn tile(&self, pos: TilePos) -> Option<Tile> {
        self.record("tile");
        self.inner.tile(pos)
    }

    fn kill_tile(&self, pos: TilePos) -> anyhow::Result<()> {
        self.record("kill_tile");
        self.inner.kill_tile(pos)
    }

    fn clear_wall(&self, pos: TilePos) -> anyhow::Result<()> {
        self.record("clear_wall");
        self.inner.clear_wall(pos)
    }

    fn place_tile(&self, pos: TilePos, kind: TileKind) -> anyhow::Result<bool> {
        self.record("place_tile");
        thread::sleep(self.delay / 4);
        self.inner.place_tile(pos, kind)
    }

    fn place_object(&self, pos: TilePos, kind: TileKind) -> anyhow::Result<bool> {
        self.record("place_object");
        self.inner.place_object(pos, kind)
    }

    fn square_frame(&self, pos: TilePos) -> anyhow::Result<()> {
        self.record("square_frame");
        self.inner.square_frame(pos)
    }

    fn find_sign(&self, pos: TilePos) -> Option<SignId> {
        self.record("find_sign");
        self.inner.find_sign(pos)
    }

    fn sign_text(&self, id: SignId) -> Option<String> {
        self.inner.sign_text(id)
    }

    fn set_sign_text(&self, id: SignId, text: &str) -> anyhow::Result<()> {
        self.record("set_sign_text");
        thread::sleep(self.delay / 4);
        self.inner.set_sign_text(id, text)
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_triggers_do_not_interleave() {
    let world = Arc::new(TracingWorld::new(Duration::from_millis(20)));
    let flags = ProgressFlags::MoonLord | ProgressFlags::CelestialPillars;
    let shared = progress(flags);
    let engine = ConvergenceEngine::new(
        world.clone(),
        shared.clone(),
        Arc::new(NetworkManager::new()),
    );
    let board = ProgressBoard::new(engine, shared, tokio::runtime::Handle::current());

    let handles: Vec<_> = (0..6).map(|_| board.dispatch("System")).collect();
    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.expect("task completed"));
    }

    assert_eq!(world.assert_runs_serialised(), 6);
    let rebuilds = outcomes
        .iter()
        .filter(|o| matches!(o, ConvergeOutcome::Rebuilt { .. }))
        .count();
    assert_eq!(rebuilds, 1, "Only the first run builds: {outcomes:?}");
    assert_eq!(world.inner.sign_count(), 3);
    assert_board_matches(&world.inner, flags);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_last_run_wins_with_changing_flags() {
    let world = Arc::new(TracingWorld::new(Duration::from_millis(5)));
    let shared = progress(ProgressFlags::empty());
    let engine = ConvergenceEngine::new(
        world.clone(),
        shared.clone(),
        Arc::new(NetworkManager::new()),
    );

    let first = tokio::spawn({
        let engine = engine.clone();
        async move { engine.converge("a").await }
    });
    shared.mark(ProgressFlags::QueenBee);
    let second = tokio::spawn({
        let engine = engine.clone();
        async move { engine.converge("b").await }
    });

    first.await.expect("first run");
    second.await.expect("second run");
    world.assert_runs_serialised();

    // Whichever run finished last read the flags after the mark.
    assert_board_matches(&world.inner, ProgressFlags::QueenBee);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cancelled_run_keeps_lock_until_world_work_ends() {
    let world = Arc::new(TracingWorld::new(Duration::from_millis(200)));
    let flags = ProgressFlags::Skeletron;
    let engine = ConvergenceEngine::new(
        world.clone(),
        progress(flags),
        Arc::new(NetworkManager::new()),
    );

    // Give up on the first run while its world work is still going.
    let first = tokio::time::timeout(Duration::from_millis(50), engine.converge("a")).await;
    assert!(first.is_err(), "first run should still be in flight");

    let second = engine.converge("b").await;

    assert_eq!(world.assert_runs_serialised(), 2);
    assert_eq!(second, ConvergeOutcome::Updated { rewritten: 3 });
    assert_eq!(world.inner.sign_count(), 3);
    assert_board_matches(&world.inner, flags);
}

// ---------------------------------------------------------------------------
//  Faults
// ---------------------------------------------------------------------------

/// Fails the first sign text write, then behaves.
struct FlakyWorld {
    inner: MemoryWorld,
    tripped: AtomicBool,
}

impl World for FlakyWorld {
    fn spawn_point(&self) -> TilePos {
        self.inner.spawn_point()
    }
    fn tile(&self, pos: TilePos) -> Option<Tile> {
        self.inner.tile(pos)
    }
    fn kill_tile(&self, pos: TilePos) -> anyhow::Result<()> {
        self.inner.kill_tile(pos)
    }
    fn clear_wall(&self, pos: TilePos) -> anyhow::Result<()> {
        self.inner.clear_wall(pos)
    }
    fn place_tile(&self, pos: TilePos, kind: TileKind) -> anyhow::Result<bool> {
        self.inner.place_tile(pos, kind)
    }
    fn place_object(&self, pos: TilePos, kind: TileKind) -> anyhow::Result<bool> {
        self.inner.place_object(pos, kind)
    }
    fn square_frame(&self, pos: TilePos) -> anyhow::Result<()> {
        self.inner.square_frame(pos)
    }
    fn find_sign(&self, pos: TilePos) -> Option<SignId> {
        self.inner.find_sign(pos)
    }
    fn sign_text(&self, id: SignId) -> Option<String> {
        self.inner.sign_text(id)
    }
    fn set_sign_text(&self, id: SignId, text: &str) -> anyhow::Result<()> {
        if !self.tripped.swap(true, Ordering::SeqCst) {
            anyhow::bail!("sign table is locked by another plugin");
        }
        self.inner.set_sign_text(id, text)
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_fault_aborts_then_next_trigger_self_heals() {
    let world = Arc::new(FlakyWorld {
        inner: MemoryWorld::with_ground(100, 60, SPAWN).expect("world size"),
        tripped: AtomicBool::new(false),
    });
    let flags = ProgressFlags::Deerclops;
    let engine = ConvergenceEngine::new(
        world.clone(),
        progress(flags),
        Arc::new(NetworkManager::new()),
    );

    assert_eq!(engine.converge("first").await, ConvergeOutcome::Aborted);
    // The first sign went up before the write failed; the others never did.
    assert_eq!(world.inner.sign_count(), 1);

    let outcome = engine.converge("second").await;
    assert_eq!(
        outcome,
        ConvergeOutcome::Rebuilt {
            placed: 2,
            rewritten: 1
        }
    );
    assert_board_matches(&world.inner, flags);
}
