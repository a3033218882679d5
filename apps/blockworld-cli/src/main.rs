use std::path::PathBuf;

use anyhow::{Context, bail};
use blockworld_common::WorldConfig;
use blockworld_input::{Action, InputState, Key, MouseButton};
use blockworld_render::RecordingRenderer;
use blockworld_session::{Session, SessionError};
use blockworld_stream::PerlinHeightField;
use blockworld_tools::{WorldInspector, check_invariants};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "blockworld-cli", about = "Headless driver for the block world")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the effective configuration
    Info {
        #[command(flatten)]
        world: WorldArgs,
    },
    /// Run a headless session driven by deterministic pseudo-random input
    Simulate {
        #[command(flatten)]
        world: WorldArgs,
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "600")]
        ticks: u64,
        /// Seed for the generated input
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// Print a summary every N ticks (0 disables)
        #[arg(long, default_value = "60")]
        report_every: u64,
    },
    /// Stream, drain and check the world invariants
    Validate {
        #[command(flatten)]
        world: WorldArgs,
        /// Ticks to run before checking
        #[arg(short, long, default_value = "120")]
        ticks: u64,
    },
}

#[derive(Args)]
struct WorldArgs {
    /// JSON configuration file; missing fields use defaults
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Terrain seed override
    #[arg(long)]
    terrain_seed: Option<u32>,
    /// Streaming radius override, in chunks
    #[arg(long)]
    render_radius: Option<i32>,
}

impl WorldArgs {
    fn load(&self) -> anyhow::Result<WorldConfig> {
        let mut config = match &self.config {
            Some(path) => WorldConfig::from_json_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => WorldConfig::default(),
        };
        if let Some(seed) = self.terrain_seed {
            config.terrain.seed = seed;
        }
        if let Some(radius) = self.render_radius {
            config.render_radius = radius;
        }
        config.validate()?;
        Ok(config)
    }
}

type HeadlessSession = Session<RecordingRenderer, PerlinHeightField>;

fn open_session(config: WorldConfig) -> anyhow::Result<HeadlessSession> {
    let terrain = PerlinHeightField::new(&config.terrain);
    Ok(Session::new(config, RecordingRenderer::new(), terrain)?)
}

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

const MOVEMENT_KEYS: [Key; 4] = [Key::W, Key::A, Key::S, Key::D];

/// Generates desktop-style input events and folds them through an
/// [`InputState`], so the session sees the same actions a window would send.
struct ScriptedInput {
    input: InputState,
    held: Option<Key>,
    rng: u64,
}

impl ScriptedInput {
    fn new(seed: u64) -> Self {
        Self {
            input: InputState::new(),
            held: None,
            rng: seed,
        }
    }

    /// Actions for one tick: mostly walking forward with occasional turns,
    /// jumps, slot changes and edits.
    fn next_actions(&mut self) -> Vec<Action> {
        let roll = splitmix64(&mut self.rng);
        let mut actions = Vec::with_capacity(2);
        match roll % 16 {
            0..=5 => {
                let key = if (roll >> 8) % 3 == 0 {
                    MOVEMENT_KEYS[((roll >> 10) % 4) as usize]
                } else {
                    Key::W
                };
                if self.held != Some(key) {
                    actions.extend(self.release_movement());
                    actions.push(self.input.key_pressed(key));
                    self.held = Some(key);
                }
            }
            6 | 7 => {
                let dx = ((roll >> 16) % 401) as f32 - 200.0;
                let dy = ((roll >> 32) % 201) as f32 - 100.0;
                actions.push(self.input.mouse_moved(dx, dy));
            }
            8 => actions.push(self.input.key_pressed(Key::Space)),
            9 => actions.push(self.input.key_released(Key::Space)),
            10 | 11 => actions.push(self.input.button_pressed(MouseButton::Left)),
            12 | 13 => actions.push(self.input.button_pressed(MouseButton::Right)),
            14 => {
                let digit = ((roll >> 40) % 9) as u8 + 1;
                actions.push(self.input.key_pressed(Key::Digit(digit)));
            }
            _ => actions.extend(self.release_movement()),
        }
        actions
    }

    fn release_movement(&mut self) -> Option<Action> {
        let key = self.held.take()?;
        Some(self.input.key_released(key))
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info { world } => {
            let config = world.load()?;
            println!("blockworld-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "tick budget: {:?} ({} ticks/s, {} substeps)",
                config.tick_budget(),
                config.ticks_per_second,
                config.substeps
            );
            println!("{}", config.to_json_pretty()?);
        }
        Commands::Simulate {
            world,
            ticks,
            seed,
            report_every,
        } => {
            let config = world.load()?;
            let dt = 1.0 / config.ticks_per_second as f32;
            let mut session = open_session(config)?;
            let mut input = ScriptedInput::new(seed);
            let mut refused = 0;

            println!("Simulating {ticks} ticks, input seed={seed}");
            for tick in 1..=ticks {
                for action in input.next_actions() {
                    match session.apply(action) {
                        Ok(()) => {}
                        Err(SessionError::Unbreakable(_) | SessionError::Obstructed(_)) => {
                            refused += 1;
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
                session.tick(dt)?;
                if report_every > 0 && tick % report_every == 0 {
                    println!("[{tick:>5}] {}", session.summary());
                }
            }

            println!("Final: {}", session.summary());
            println!("Refused edits: {refused}");
            println!("Renderer: {}", session.world().renderer().describe());
            let timer = session.timer();
            println!(
                "Tick time: avg={:?} max={:?} ({:.0} ticks/s)",
                timer.average(),
                timer.max(),
                timer.rate()
            );
            if let Some(info) = session
                .focused_block()
                .and_then(|hit| WorldInspector::inspect_block(session.world(), hit.block))
            {
                println!("Focused: {info}");
            }
            let violations = check_invariants(session.world());
            println!("Invariants: {}", if violations.is_empty() { "OK" } else { "VIOLATED" });
            for v in &violations {
                println!("  {v}");
            }
        }
        Commands::Validate { world, ticks } => {
            let config = world.load()?;
            let dt = 1.0 / config.ticks_per_second as f32;
            let mut session = open_session(config)?;
            for _ in 0..ticks {
                session.tick(dt)?;
            }
            while !session.world().pending().is_empty() {
                session.tick(dt)?;
            }

            let violations = check_invariants(session.world());
            println!("{}", session.summary());
            let histogram = WorldInspector::sector_histogram(session.world());
            if let Some((sector, count)) = histogram.iter().max_by_key(|(_, count)| *count) {
                println!(
                    "Sectors: {} populated, densest {sector} with {count} blocks",
                    histogram.len()
                );
            }
            if !violations.is_empty() {
                for v in &violations {
                    tracing::error!("{v}");
                }
                bail!("{} invariant violations", violations.len());
            }
            println!("Invariants: OK");
        }
    }

    Ok(())
}
