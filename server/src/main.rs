use std::io::{self, BufRead};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use board_core::traits::World;
use board_core::types::{InvasionType, NpcKind, ProgressFlags, TileKind, TilePos};
use rand::Rng;

use signboard::config::Settings;
use signboard::engine::ConvergenceEngine;
use signboard::hooks::{CommandReply, HookRegistry, Operator, ProgressBoard};
use signboard::layout;
use signboard::memory_world::MemoryWorld;
use signboard::network_manager::NetworkManager;
use signboard::progress::SharedProgress;

const HELP: &str = "\
commands:
  bossstatus            refresh the progress signs
  kill <npc>            kill an NPC (e.g. 'kill king slime', 'kill 17')
  defeat <flags>        set progress flags (e.g. 'defeat Golem | Plantera')
  invasion <type>       none, goblins, frostlegion, pirates, martians
  dig [count]           randomly mess up the board area
  show                  print the three panels
  sync                  print and clear the sync journal
  quit";

/// Scatters trees, torches and stone around the board area, and sometimes
/// knocks out a sign, the way players wandering through spawn would.
fn dig(world: &MemoryWorld, count: usize) {
    let panels = layout::panel_positions(world.spawn_point());
    let bounds = layout::clear_bounds(&panels);
    let mut rng = rand::thread_rng();

    for _ in 0..count {
        let pos = TilePos::new(
            rng.gen_range(bounds.left..=bounds.right),
            rng.gen_range(bounds.top..=bounds.bottom),
        );
        match rng.gen_range(0..4) {
            0 => {
                if let Err(e) = world.kill_tile(pos) {
                    log::warn!("dig: {e}");
                }
            }
            1 => world.set_tile(pos, TileKind::Tree),
            2 => world.set_tile(pos, TileKind::Torch),
            _ => {
                world.set_wall(pos, 4);
                world.set_tile(pos, TileKind::Stone);
            }
        }
    }
}

fn show(world: &MemoryWorld) {
    for panel in layout::panel_positions(world.spawn_point()) {
        println!("--- {} panel at {} ---", panel.role, panel.pos);
        match world.find_sign(panel.pos).and_then(|id| world.sign_text(id)) {
            Some(text) => println!("{text}"),
            None => println!("(no sign)"),
        }
    }
}

fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("console".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                if tx.send(line).is_err() {
                    break;
                }
            }
        })
        .unwrap_or_else(|e| {
            eprintln!("Failed to spawn console thread: {e}. Exiting.");
            process::exit(1);
        });
    rx
}

fn main() {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env().unwrap_or_else(|e| {
        eprintln!("Invalid configuration: {e}. Exiting.");
        process::exit(1);
    });

    board_core::initialize_logger(settings.log_level, settings.log_file.as_deref())
        .unwrap_or_else(|e| {
            eprintln!("Failed to initialize logger: {e:#}. Exiting.");
            process::exit(1);
        });

    log::info!(
        "Starting progress signboard v{} ({}x{} world, spawn {})",
        env!("CARGO_PKG_VERSION"),
        settings.world_width,
        settings.world_height,
        settings.spawn
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("signboard-worker")
        .build()
        .unwrap_or_else(|e| {
            log::error!("Failed to start runtime: {e}. Exiting.");
            process::exit(1);
        });

    let quit_flag = Arc::new(AtomicBool::new(false));
    let quit_flag_clone = quit_flag.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        if !quit_flag_clone.load(Ordering::SeqCst) {
            log::info!("Got signal to terminate. Shutdown initiated...");
        } else {
            log::info!("Alright, alright, I'm already terminating!");
        }
        quit_flag_clone.store(true, Ordering::SeqCst);
    }) {
        log::warn!("Could not install Ctrl-C handler: {e}");
    }

    let world = MemoryWorld::with_ground(
        settings.world_width,
        settings.world_height,
        settings.spawn,
    )
    .unwrap_or_else(|e| {
        log::error!("Failed to create world: {e:#}. Exiting.");
        process::exit(1);
    });
    let world = Arc::new(world);
    let progress = Arc::new(SharedProgress::new(settings.progress));
    let network = Arc::new(NetworkManager::new());
    let engine = ConvergenceEngine::new(world.clone(), progress.clone(), network.clone());
    let board = ProgressBoard::new(engine, progress.clone(), runtime.handle().clone());

    let registry = Arc::new(HookRegistry::new());
    let registration = board.initialize(&registry);
    let operator = Operator::console();

    println!("{HELP}");
    let lines = spawn_stdin_reader();

    while !quit_flag.load(Ordering::SeqCst) {
        let line = match lines.recv_timeout(Duration::from_millis(200)) {
            Ok(line) => line,
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        };
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));

        match command.to_lowercase().as_str() {
            "" => {}
            "help" => println!("{HELP}"),
            "quit" | "exit" => break,
            "kill" => match rest.parse::<NpcKind>() {
                Ok(npc) => {
                    if let Some(flag) = progress.record_kill(npc) {
                        println!("{npc:?} defeated ({flag:?})");
                    }
                    registry.fire_npc_killed(npc);
                }
                Err(e) => println!("{e}"),
            },
            "defeat" => match rest.parse::<ProgressFlags>() {
                Ok(flags) => progress.mark(flags),
                Err(e) => println!("{e}"),
            },
            "invasion" => match rest.parse::<InvasionType>() {
                Ok(invasion) => progress.set_invasion(invasion),
                Err(e) => println!("{e}"),
            },
            "dig" => dig(&world, rest.trim().parse().unwrap_or(10)),
            "show" => show(&world),
            "sync" => {
                for event in network.take_events() {
                    println!("{} {:?}", event.at.format("%H:%M:%S%.3f"), event.kind);
                }
            }
            _ => {
                let reply = board.run_command(&operator, line);
                println!("{}", reply.message());
                // Fire and forget: the engine logs the result.
                if let CommandReply::Dispatched(handle) = reply {
                    drop(handle);
                }
            }
        }
    }

    drop(registration);
    // Let a convergence that is already running finish.
    runtime.shutdown_timeout(Duration::from_secs(5));
    log::info!("Signboard shutdown complete.");
}
