#[macro_use]
pub mod logging;

pub mod display;
pub mod io;
pub mod settings;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

use display::ConsoleDisplay;
use io::serial::SerialConfig;
use io::SessionStats;
use settings::ProbeSettings;

/// Where the probe byte stream comes from
#[derive(Clone, Debug)]
pub enum ProbeSource {
    /// Live serial port
    Serial(SerialConfig),
    /// Recorded capture file, replayed in fixed-size chunks
    Replay { path: PathBuf, chunk_size: usize },
}

/// Stream `source` to `display` until the source ends or Ctrl-C is pressed.
pub async fn run_probe<W: std::io::Write>(
    source: ProbeSource,
    display: &mut ConsoleDisplay<W>,
) -> Result<SessionStats, String> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let stop_flag = Arc::new(AtomicBool::new(false));

    let (name, task) = match source {
        ProbeSource::Serial(config) => {
            let name = config.port.clone();
            let task = tokio::spawn(io::serial::run_source(config, stop_flag.clone(), tx));
            (name, task)
        }
        ProbeSource::Replay { path, chunk_size } => {
            let file = io::replay::open_capture(&path)?;
            let name = path.display().to_string();
            let task = tokio::spawn(io::replay::run_replay(
                name.clone(),
                file,
                chunk_size,
                stop_flag.clone(),
                tx,
            ));
            (name, task)
        }
    };

    // Ctrl-C asks the source to stop; it still reports Ended with final stats
    let interrupt_flag = stop_flag.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tlog!("[probe] Interrupted, stopping source");
            interrupt_flag.store(true, Ordering::Relaxed);
        }
    });

    let ended = display::present(&mut rx, display).await;
    interrupt.abort();
    if let Err(e) = task.await {
        tlog!("[probe] Source task failed: {:?}", e);
    }

    match ended? {
        Some((reason, _)) if reason == "error" => Err(format!("{} ended with an error", name)),
        Some((_, stats)) => Ok(stats),
        None => Err(format!("{} closed without reporting an end", name)),
    }
}

/// Run `source` on a fresh runtime with console output, honouring the
/// logging and output options in `settings`.
pub fn run_blocking(settings: &ProbeSettings, source: ProbeSource) -> Result<SessionStats, String> {
    if let Some(dir) = &settings.log_dir {
        logging::init_file_logging(Path::new(dir))?;
    }

    let result = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start runtime: {}", e))
        .and_then(|runtime| {
            let mut display = ConsoleDisplay::stdout(settings.json_output);
            runtime.block_on(run_probe(source, &mut display))
        });

    logging::stop_file_logging();
    result
}

/// Default entry point: read the probe on the configured serial port.
pub fn run() {
    let settings = match settings::load_settings(None) {
        Ok(s) => s,
        Err(e) => {
            tlog!("[setup] {}", e);
            std::process::exit(2);
        }
    };

    let source = ProbeSource::Serial(settings.serial_config());
    if let Err(e) = run_blocking(&settings, source) {
        tlog!("[setup] {}", e);
        std::process::exit(1);
    }
}
