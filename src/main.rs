// tdbg: terminal front-end for source-level debugging

mod backend;
mod cache;
mod logbuf;
mod ui;

use std::fs::File;
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use color_eyre::eyre;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use backend::gdb::GdbBackend;
use backend::LaunchSpec;
use ui::App;

#[derive(Debug, Parser)]
#[command(
    name = "tdbg",
    about = "A full-screen terminal front-end for source-level debugging"
)]
struct Args {
    /// Environment entries for the debuggee (repeatable)
    #[arg(short = 'e', long = "env", value_name = "KEY=VALUE", value_parser = parse_env_entry)]
    env: Vec<(String, String)>,

    /// Executable to debug
    target: PathBuf,

    /// Arguments passed to the debuggee
    #[arg(last = true, value_name = "ARGS")]
    args: Vec<String>,
}

fn parse_env_entry(entry: &str) -> Result<(String, String), String> {
    entry
        .split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("'{}' is not a KEY=VALUE entry", entry))
}

/// Raw mode + alternate screen + mouse capture, released on every exit path.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    fn acquire() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableMouseCapture) {
            let _ = disable_raw_mode();
            return Err(e);
        }
        match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => Ok(TerminalGuard { terminal }),
            Err(e) => {
                let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
                let _ = disable_raw_mode();
                Err(e)
            }
        }
    }

    fn inner(&mut self) -> &mut Terminal<CrosstermBackend<Stdout>> {
        &mut self.terminal
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        );
        let _ = self.terminal.show_cursor();
    }
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    // The alternate screen owns stdout, so diagnostics go to a file.
    let log_file = File::create("tdbg.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    if !args.target.exists() {
        eprintln!("Error: target '{}' not found", args.target.display());
        std::process::exit(1);
    }

    let backend = match GdbBackend::new(&args.target) {
        Ok(backend) => backend,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let launch = LaunchSpec {
        args: args.args,
        env: args.env.into_iter().collect(),
        cwd: Some(PathBuf::from(".")),
    };

    tracing::info!(target = %args.target.display(), "session starting");

    let mut guard = TerminalGuard::acquire()?;
    let mut app = App::new(backend, launch);
    let result = app.run(guard.inner());
    drop(guard);

    result?;
    Ok(())
}
