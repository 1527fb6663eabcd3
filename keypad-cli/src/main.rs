mod table;
mod trace;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use keypad_matrix::scan::SAMPLE_ATTEMPTS;
use keypad_matrix::sim::{FreeRunningCountdown, ScriptedPort};
use keypad_matrix::{ColumnOutcome, Delay, Scanner, COLS};
use std::fs;

/// Core clock of the keypad MCU.
const DEFAULT_CLOCK_HZ: u32 = 48_000_000;
/// SysTick reload for a 10 ms tick at the default clock.
const DEFAULT_RELOAD: u32 = DEFAULT_CLOCK_HZ / 100 - 1;

#[derive(Parser)]
#[command(name = "keypad-cli")]
#[command(about = "Keypad matrix scanner tools")]
struct Cli {
    /// Log more (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the key lookup table
    Table {
        /// Write an HTML picture of the matrix to this file instead
        #[arg(long)]
        html: Option<String>,
    },
    /// Run one poll against a recorded row-sample trace
    Replay {
        /// Path to the trace file
        file: String,
        #[command(flatten)]
        timer: TimerArgs,
    },
    /// Show the label and matrix position of a raw key code
    Key {
        /// Key code, as stored by the key-event layer
        code: u8,
    },
    /// Run the busy-wait delay against a simulated countdown
    Delay {
        /// Delay in microseconds
        us: u32,
        #[command(flatten)]
        timer: TimerArgs,
    },
}

#[derive(clap::Args)]
struct TimerArgs {
    /// Counter tick rate in Hz
    #[arg(long, default_value_t = DEFAULT_CLOCK_HZ)]
    clock_hz: u32,
    /// Countdown reload value
    #[arg(long, default_value_t = DEFAULT_RELOAD)]
    reload: u32,
    /// Ticks the simulated counter moves between two reads
    #[arg(long, default_value_t = 4)]
    step: u32,
}

impl TimerArgs {
    fn countdown(&self) -> Result<FreeRunningCountdown> {
        if self.clock_hz < 1_000_000 {
            bail!("clock of {} Hz is below one tick per microsecond", self.clock_hz);
        }
        if self.step == 0 || self.step > self.reload {
            // A read gap of a whole period or more hides the wrap.
            bail!("step must be between 1 and the reload value ({})", self.reload);
        }
        log::debug!(
            "countdown: {} Hz, reload {}, {} ticks per read",
            self.clock_hz,
            self.reload,
            self.step
        );
        Ok(FreeRunningCountdown::new(self.reload, self.step))
    }

    fn ticks_to_us(&self, ticks: u64) -> f64 {
        ticks as f64 * 1_000_000.0 / self.clock_hz as f64
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn describe(outcome: ColumnOutcome) -> String {
    match outcome {
        ColumnOutcome::Skipped => "not scanned".to_string(),
        ColumnOutcome::Noisy => format!("noisy, no stable read in {} samples", SAMPLE_ATTEMPTS),
        ColumnOutcome::Stable(rows) => format!("stable {:04b}", rows.bits()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Table { html } => match html {
            Some(path) => {
                fs::write(&path, table::render_html())
                    .with_context(|| format!("writing {}", path))?;
                println!("Wrote {}", path);
            }
            None => print!("{}", table::render_text()),
        },
        Command::Replay { file, timer } => {
            let contents =
                fs::read_to_string(&file).with_context(|| format!("reading {}", file))?;
            let parsed =
                trace::parse_trace(&contents).with_context(|| format!("parsing trace {}", file))?;
            for (col, samples) in parsed.columns.iter().enumerate() {
                log::debug!("column {}: {} scripted samples", col, samples.len());
            }

            let delay = Delay::new(timer.countdown()?, timer.clock_hz);
            let mut scanner = Scanner::new(ScriptedPort::with_scripts(parsed.scripts()), delay);
            let mut outcomes = [ColumnOutcome::Skipped; COLS];
            let key = scanner.poll_traced(&mut outcomes);

            let (port, delay) = scanner.free();
            if !port.columns_released() {
                log::warn!("column lines left driven after the scan");
            }
            let reads = port.reads();
            for (col, outcome) in outcomes.iter().enumerate() {
                let line = match col {
                    0 => "no line".to_string(),
                    _ => format!("line {}", col - 1),
                };
                println!(
                    "col {} ({}): {} [{} reads]",
                    col,
                    line,
                    describe(*outcome),
                    reads[col]
                );
            }

            if key.is_invalid() {
                println!("Result: no key");
            } else {
                println!("Result: {} (code {})", key.display_name(), key.code());
            }

            let counter = delay.free();
            println!(
                "Simulated time: {} ticks ({:.1} us), {} reloads",
                counter.ticks(),
                timer.ticks_to_us(counter.ticks()),
                counter.reloads()
            );
        }
        Command::Key { code } => println!("{}", table::describe_code(code)),
        Command::Delay { us, timer } => {
            let mut delay = Delay::new(timer.countdown()?, timer.clock_hz);
            let Some(target) = us.checked_mul(delay.ticks_per_us()) else {
                bail!("{} us does not fit the tick arithmetic at {} Hz", us, timer.clock_hz);
            };
            log::info!("waiting {} us = {} ticks", us, target);

            delay.delay_us(us);
            let counter = delay.free();
            println!("Requested: {} us ({} ticks)", us, target);
            println!(
                "Waited:    {} ticks ({:.1} us), {} reloads",
                counter.ticks(),
                timer.ticks_to_us(counter.ticks()),
                counter.reloads()
            );
        }
    }

    Ok(())
}
