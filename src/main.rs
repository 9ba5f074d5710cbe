//! Arcade Cabinet - headless native runner
//!
//! Plays one game with a seeded autopilot, then prints the HUD and the
//! leaderboard and optionally writes the last frame as a PNG. The browser
//! build drives `Cabinet` from requestAnimationFrame instead.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::{Path, PathBuf};

    use anyhow::{Context, Result, anyhow};
    use clap::Parser;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use arcade_cabinet::consts::TICK_MS;
    use arcade_cabinet::persistence::{JsonFileStore, MemoryStore, ScoreStore};
    use arcade_cabinet::platform::{Action, InputEvent};
    use arcade_cabinet::renderer::Canvas;
    use arcade_cabinet::sim::{GameKind, GamePhase, Identity};
    use arcade_cabinet::{Arcade, Settings, cabinet_for};

    const AUTOPILOT_ACTIONS: [Action; 6] = [
        Action::Up,
        Action::Down,
        Action::Left,
        Action::Right,
        Action::A,
        Action::B,
    ];
    /// Frames between autopilot input changes
    const AUTOPILOT_HOLD: u64 = 12;

    #[derive(Parser, Debug)]
    #[command(version, about = "Run an arcade cabinet game headless")]
    struct Args {
        /// Game tag: space-invaders, tetris, pacman, donkey-kong, frogger, racing
        #[arg(short, long, default_value = "tetris")]
        game: String,

        /// Frames to run (60 per second)
        #[arg(short, long, default_value_t = 3600)]
        frames: u64,

        /// Seed for the simulation and the autopilot
        #[arg(short, long, default_value_t = 1)]
        seed: u64,

        /// Sign in under this name (unlocks levels past 2 and saved games)
        #[arg(short, long)]
        player: Option<String>,

        /// JSON score store; in-memory if omitted
        #[arg(long)]
        store: Option<PathBuf>,

        /// Ship to fly (space-invaders only)
        #[arg(long)]
        ship: Option<usize>,

        /// Settings file
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Write the final frame here as PNG
        #[arg(long)]
        frame_out: Option<PathBuf>,
    }

    pub fn main() -> Result<()> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        let args = Args::parse();
        log::info!("Arcade Cabinet (native) starting...");

        let kind = GameKind::from_tag(&args.game)
            .ok_or_else(|| anyhow!("unknown game '{}'", args.game))?;
        let settings = args
            .settings
            .as_deref()
            .map(Settings::load_from)
            .unwrap_or_default();
        let store: Box<dyn ScoreStore> = match &args.store {
            Some(path) => Box::new(JsonFileStore::open(path)?),
            None => Box::new(MemoryStore::new()),
        };

        let mut cabinet = cabinet_for(kind, args.seed, store, settings);
        run(cabinet.as_mut(), &args)
    }

    fn run(cabinet: &mut dyn Arcade, args: &Args) -> Result<()> {
        if let Some(name) = &args.player {
            cabinet.sign_in(Identity::new(format!("local|{name}"), name.as_str()));
        }
        if let Some(ship) = args.ship {
            if !cabinet.select_ship(ship) {
                log::warn!("Ship {ship} is not available in {}", cabinet.kind().title());
            }
        }

        let mut handle = cabinet.resume_saved().or_else(|| cabinet.start());
        let mut pilot = Pcg32::seed_from_u64(args.seed.rotate_left(17));
        let mut held: Option<Action> = None;
        let mut time = 0.0;

        for frame in 0..args.frames {
            if frame % AUTOPILOT_HOLD == 0 {
                if let Some(action) = held.take() {
                    cabinet.input(InputEvent::release(action));
                }
                let action = AUTOPILOT_ACTIONS[pilot.random_range(0..AUTOPILOT_ACTIONS.len())];
                cabinet.input(InputEvent::press(action));
                held = Some(action);
            }

            let Some(h) = handle else {
                break;
            };
            time += TICK_MS as f64;
            handle = cabinet.frame(h, time);

            for event in cabinet.drain_events() {
                log::info!("{:?}", event);
            }
            match cabinet.phase() {
                GamePhase::LevelTransition => handle = cabinet.continue_level(),
                GamePhase::AuthRequired => {
                    log::info!("Stopping: sign in with --player to play past level 2");
                    break;
                }
                _ => {}
            }
        }

        cabinet.render();
        if let Some(path) = &args.frame_out {
            save_png(cabinet.canvas(), path)?;
            log::info!("Wrote {}", path.display());
        }

        let hud = cabinet.hud();
        println!(
            "{}: {:?} at level {} with {} points, {} lives left",
            cabinet.kind().title(),
            hud.phase,
            hud.level,
            hud.score,
            hud.lives
        );
        if let Some(rank) = hud.last_rank {
            println!("New high score! Rank #{rank}");
        }
        println!("Top scores:");
        for (i, record) in cabinet.top_scores().iter().enumerate() {
            println!(
                "{:>3}. {:<16} {:>8}  (level {})",
                i + 1,
                record.player_name,
                record.score,
                record.level
            );
        }
        Ok(())
    }

    fn save_png(canvas: &Canvas, path: &Path) -> Result<()> {
        image::save_buffer(
            path,
            canvas.as_bytes(),
            canvas.width(),
            canvas.height(),
            image::ExtendedColorType::Rgba8,
        )
        .with_context(|| format!("writing {}", path.display()))
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::main()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The web build is driven through `WebCabinet` in the library
}
