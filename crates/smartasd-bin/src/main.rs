//! Command-line tool for SmartASD I/O boards.
//!
//! # Usage
//!
//! List boards:
//! ```bash
//! smartasd scan
//! ```
//!
//! Read five input snapshots from a named board:
//! ```bash
//! smartasd --device "SmartASD 1" read --count 5 --timeout-ms 200
//! ```
//!
//! Drive outputs:
//! ```bash
//! smartasd set-all --state 0xFF --mask 0xFF
//! smartasd set --channel d7 --on
//! ```
//!
//! Play an LED program for ten seconds:
//! ```bash
//! smartasd --config panel.toml leds --program attract --duration-ms 10000
//! ```
//!
//! Without the `hardware` feature every command runs against a simulated
//! board.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use smartasd_driver::hal::{AsyncSmartAsd, OutputSwitch};
use smartasd_driver::leds::{LedController, Scene};
use smartasd_driver::{
    discovery, InputFlags, InputSnapshot, SimulatedDriver, SmartApi, SmartAsdConfig,
    SmartAsdDevice,
};
use tracing::{info, warn};

/// LED refresh period of the `leds` command.
const LED_TICK: Duration = Duration::from_millis(10);

#[derive(Parser)]
#[command(name = "smartasd")]
#[command(about = "Inspect and drive SmartASD I/O boards", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Device name to use, "*" for the first board found (overrides the config)
    #[arg(long, global = true)]
    device: Option<String>,

    /// Use a simulated board instead of the vendor library
    #[arg(long, global = true)]
    simulate: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List attached boards
    Scan,

    /// Read input snapshots
    Read {
        /// How long to wait for each snapshot (default: config read_timeout)
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Number of snapshots to read
        #[arg(long, default_value = "1")]
        count: u32,
    },

    /// Write the output word under a mask
    SetAll {
        /// New output bits (decimal or 0x hex)
        #[arg(long, value_parser = parse_word)]
        state: u32,

        /// Bits allowed to change (decimal or 0x hex)
        #[arg(long, value_parser = parse_word, default_value = "0xFFFFFFFF")]
        mask: u32,
    },

    /// Switch one output channel
    #[command(group(ArgGroup::new("level").required(true).args(["on", "off"])))]
    Set {
        /// Channel number (0-31), "out3" or a line name such as "d7"
        #[arg(long)]
        channel: String,

        #[arg(long)]
        on: bool,

        #[arg(long)]
        off: bool,
    },

    /// Play an LED program on the control panel
    Leds {
        #[arg(long, value_enum)]
        program: LedProgram,

        /// How long to run before switching the panel off
        #[arg(long, default_value = "5000")]
        duration_ms: u64,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LedProgram {
    /// Everything on, slow chase
    Attract,
    /// One-shot curtain
    Curtain,
    /// Controls of `panel.input_controls`
    Controls,
    /// Game list highlight (`panel.list_controls`)
    List,
    /// Menu highlight (`panel.menu_controls`)
    Menu,
}

/// Parse a 32-bit word given in decimal or `0x` hex.
fn parse_word(text: &str) -> Result<u32, String> {
    let text = text.trim().replace('_', "");
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|e| format!("'{}' is not a 32-bit value: {}", text, e))
}

/// Driver selected on the command line.
struct Backend {
    api: Arc<dyn SmartApi>,
    simulated: Option<Arc<SimulatedDriver>>,
}

impl Backend {
    fn select(simulate: bool) -> Self {
        #[cfg(feature = "hardware")]
        if !simulate {
            return Self {
                api: Arc::new(smartasd_driver::NativeDriver::new()),
                simulated: None,
            };
        }
        #[cfg(not(feature = "hardware"))]
        if !simulate {
            warn!("Built without the `hardware` feature, using a simulated board");
        }

        let sim = Arc::new(SimulatedDriver::new());
        sim.add_board("SmartASD (simulated)");
        Self {
            api: sim.clone(),
            simulated: Some(sim),
        }
    }

    /// Queue `count` snapshots on a simulated board so reads have data.
    fn feed_inputs(&self, device: &SmartAsdDevice, count: u32) {
        let Some(sim) = &self.simulated else {
            return;
        };
        for n in 0..count {
            let mut snapshot = InputSnapshot::default();
            if let Some(line) = InputFlags::digital((n % 24) as u8 + 1) {
                snapshot.set(line, true);
            }
            for (i, value) in snapshot.encoders_mut().iter_mut().enumerate() {
                *value = (n as i16).wrapping_mul(i as i16 + 1);
            }
            sim.push_input(device.id(), snapshot);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SmartAsdConfig::load(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => SmartAsdConfig::default(),
    };
    if let Some(device) = cli.device {
        config.device.name = device;
    }

    let backend = Backend::select(cli.simulate);

    match cli.command {
        Commands::Scan => scan(&backend),
        Commands::Read { timeout_ms, count } => {
            let timeout = timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(config.device.read_timeout);
            read(&backend, &config, timeout, count).await
        }
        Commands::SetAll { state, mask } => set_all(&backend, &config, state, mask).await,
        Commands::Set { channel, on, .. } => set(&backend, &config, &channel, on).await,
        Commands::Leds {
            program,
            duration_ms,
        } => leds(&backend, &config, program, Duration::from_millis(duration_ms)).await,
    }
}

fn scan(backend: &Backend) -> Result<()> {
    let devices = discovery::scan(backend.api.as_ref());
    if devices.is_empty() {
        println!("No SmartASD boards found ({} backend)", backend.api.backend());
        return Ok(());
    }
    for info in devices {
        println!("{}\t{}", info.id, info.display_name());
    }
    Ok(())
}

fn open(backend: &Backend, config: &SmartAsdConfig) -> Result<AsyncSmartAsd> {
    let device = SmartAsdDevice::attach(backend.api.clone(), &config.device.name)
        .with_context(|| format!("attaching '{}'", config.device.name))?;
    Ok(AsyncSmartAsd::new(device).with_read_timeout(config.device.read_timeout))
}

async fn read(
    backend: &Backend,
    config: &SmartAsdConfig,
    timeout: Duration,
    count: u32,
) -> Result<()> {
    let board = open(backend, config)?;
    backend.feed_inputs(board.device(), count);

    for _ in 0..count {
        match board.poll_inputs_within(timeout).await {
            Ok(snapshot) => print_snapshot(&snapshot),
            Err(e)
                if e.downcast_ref::<smartasd_driver::SmartAsdError>()
                    .is_some_and(|e| e.is_timeout()) =>
            {
                println!("no input within {:?}", timeout);
            }
            Err(e) => return Err(e),
        }
    }
    board.close().await
}

fn print_snapshot(snapshot: &InputSnapshot) {
    let lines: Vec<_> = snapshot
        .flags()
        .iter_names()
        .map(|(name, _)| name.to_ascii_lowercase())
        .collect();
    println!(
        "bits {:#010x} [{}] enc {:?} analog {:?}",
        snapshot.flags().bits(),
        lines.join(" "),
        snapshot.encoders(),
        snapshot.analog_channels()
    );
}

async fn set_all(backend: &Backend, config: &SmartAsdConfig, state: u32, mask: u32) -> Result<()> {
    let board = open(backend, config)?;
    board.set_all(state, mask).await?;
    println!("outputs {:#010x}", board.device().outputs());
    board.close().await
}

async fn set(backend: &Backend, config: &SmartAsdConfig, channel: &str, on: bool) -> Result<()> {
    let mut board = open(backend, config)?;
    if on {
        board.turn_on(channel).await?;
    } else {
        board.turn_off(channel).await?;
    }
    println!("outputs {:#010x}", board.device().outputs());
    board.close().await
}

async fn leds(
    backend: &Backend,
    config: &SmartAsdConfig,
    program: LedProgram,
    duration: Duration,
) -> Result<()> {
    let mut controller = LedController::from_config(backend.api.clone(), config);
    if !controller.wiring().is_enabled() {
        anyhow::bail!("LED wiring is disabled (device.wiring_mode = 0)");
    }

    let panel = controller.panel_mut();
    match program {
        LedProgram::Attract => panel.attract(),
        LedProgram::Curtain => panel.curtain(),
        LedProgram::Controls => panel.show_controls(&config.panel.input_controls, true, false),
        LedProgram::List => panel.highlight(&config.panel.list_controls, Scene::List),
        LedProgram::Menu => panel.highlight(&config.panel.menu_controls, Scene::Menu),
    }
    info!(?program, wiring = %controller.wiring(), ?duration, "Running LED program");

    let interrupted = play(&mut controller, duration, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    })
    .await;
    if interrupted {
        println!("Interrupted");
    }

    if !controller.is_attached() {
        warn!(device = %config.device.name, "No board was attached during the run");
    }
    controller.shutdown();
    Ok(())
}

/// Update `controller` every [`LED_TICK`] until `duration` has passed or
/// `shutdown` completes. Returns `true` when stopped by `shutdown`.
async fn play(
    controller: &mut LedController,
    duration: Duration,
    shutdown: impl Future<Output = ()>,
) -> bool {
    tokio::pin!(shutdown);
    let started = Instant::now();
    let mut ticker = tokio::time::interval(LED_TICK);
    let mut last_word = None;
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut shutdown => return true,
        }
        let elapsed = started.elapsed();
        if elapsed >= duration {
            return false;
        }
        let now = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let word = controller.update(now);
        if word != last_word {
            if let Some(word) = word {
                println!("{:>6} ms  {:032b}", now, word);
            }
            last_word = word;
        }
    }
}
