//! scan_demo - replay a scan script through the full overlay pipeline
//!
//! This binary:
//! 1. Loads scanner settings (SCAN_OVERLAY_CONFIG + env + flags)
//! 2. Passes the camera permission gate
//! 3. Feeds scripted frames through a keep-only-latest slot to the analysis thread
//! 4. Renders the overlay display list whenever the surface asks for a redraw
//! 5. Lets the inactivity ticker clear the overlay once frames stop matching

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use scan_overlay::{
    ingest::pump_into, on_permission_result, request_camera_and_start, AnalysisWorker, DrawCommand,
    GateDecision, GlyphMeasure, HostShell, InactivityTicker, LatestFrameSlot, OverlaySurface,
    Paint, PermissionStatus, ScanScript, ScanSession, ScannerConfig, SlotSource, ViewportGeometry,
};

const RENDER_TICK: Duration = Duration::from_millis(20);

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// JSON scan script. Uses a built-in demo sequence when omitted.
    #[arg(long)]
    script: Option<PathBuf>,
    /// Viewport size as WIDTHxHEIGHT (overrides config).
    #[arg(long)]
    viewport: Option<String>,
    /// Inactivity threshold in milliseconds (overrides config).
    #[arg(long)]
    inactivity_ms: Option<u64>,
    /// Delay between scripted frames.
    #[arg(long, default_value_t = 100)]
    frame_interval_ms: u64,
    /// How long to keep rendering after the script ends.
    #[arg(long, default_value_t = 3000)]
    linger_ms: u64,
    /// Simulate a user that refuses camera access.
    #[arg(long)]
    deny_camera: bool,
}

/// Host shell for a terminal: launching just flips a flag.
#[derive(Default)]
struct CliShell {
    launched: bool,
}

impl HostShell for CliShell {
    fn launch_scanner(&mut self) {
        self.launched = true;
    }

    fn request_camera_permission(&mut self) {
        eprintln!("scan_demo: camera access requested");
    }

    fn should_show_rationale(&self) -> bool {
        false
    }

    fn open_permission_settings(&mut self) {
        log::warn!("open the system settings to grant camera access");
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut cfg = ScannerConfig::load()?;
    if let Some(viewport) = args.viewport.as_deref() {
        cfg.viewport = ViewportGeometry::parse(viewport)?;
    }
    if let Some(ms) = args.inactivity_ms {
        cfg.inactivity = Duration::from_millis(ms);
    }
    cfg.validate()?;

    let mut shell = CliShell::default();
    let status = if args.deny_camera {
        PermissionStatus::Denied
    } else {
        PermissionStatus::Granted
    };
    if request_camera_and_start(&mut shell, status) == GateDecision::RequestedPermission {
        if let Err(fault) = on_permission_result(&mut shell, !args.deny_camera) {
            eprintln!("scan_demo: {}", fault);
            return Ok(());
        }
    }
    if !shell.launched {
        return Err(anyhow!("scanner was not launched"));
    }

    let (script, name) = match &args.script {
        Some(path) => (
            ScanScript::from_path(path)?,
            path.display().to_string(),
        ),
        None => (ScanScript::builtin_demo(), "builtin-demo".to_string()),
    };
    let (mut source, detector) = script.into_parts(&name)?;
    let released = source.release_counter();

    let surface = Arc::new(OverlaySurface::from_config(&cfg));
    let dirty = Arc::new(AtomicBool::new(true));
    let dirty_hook = dirty.clone();
    surface.on_redraw(Arc::new(move || dirty_hook.store(true, Ordering::SeqCst)));

    log::info!(
        "scan_demo running. viewport={}x{} inactivity={:?}",
        cfg.viewport.width,
        cfg.viewport.height,
        cfg.inactivity
    );

    let ticker = InactivityTicker::spawn(surface.clone())?;
    let slot = Arc::new(LatestFrameSlot::new());
    let worker = AnalysisWorker::spawn(
        ScanSession::new(detector, surface.clone()),
        SlotSource::new(slot.clone()),
    )?;

    let producer_slot = slot.clone();
    let frame_interval = Duration::from_millis(args.frame_interval_ms);
    let producer = std::thread::Builder::new()
        .name("frame-producer".to_string())
        .spawn(move || pump_into(&mut source, &producer_slot, frame_interval))?;

    let (tx, rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })
    .context("error setting Ctrl-C handler")?;

    let measure = GlyphMeasure::new(surface.style());
    let mut producer_done_at: Option<Instant> = None;
    let mut renders = 0u64;
    loop {
        if rx.try_recv().is_ok() {
            log::info!("shutdown signal received, stopping...");
            slot.close();
            break;
        }
        if dirty.swap(false, Ordering::SeqCst) {
            renders += 1;
            print_display_list(renders, &surface.render(&measure));
        }
        if producer_done_at.is_none() && producer.is_finished() {
            producer_done_at = Some(Instant::now());
        }
        if let Some(done) = producer_done_at {
            if done.elapsed() >= Duration::from_millis(args.linger_ms) {
                break;
            }
        }
        std::thread::sleep(RENDER_TICK);
    }

    let offered = producer
        .join()
        .map_err(|_| anyhow!("frame producer thread panicked"))?
        .context("frame producer failed")?;
    let stats = worker.join()?;
    let expirations = ticker.cancel()?;

    println!("scan_demo summary:");
    println!("  frames offered: {}", offered);
    println!("  frames dropped (stale): {}", slot.dropped());
    println!("  frames released: {}", released.load(Ordering::SeqCst));
    println!(
        "  analysed: {} (detected {}, empty {}, unavailable {}, failed {})",
        stats.frames, stats.detected, stats.empty, stats.unavailable, stats.failed
    );
    println!("  overlay renders: {}", renders);
    println!("  inactivity clears: {}", expirations);
    Ok(())
}

fn print_display_list(render: u64, commands: &[DrawCommand]) {
    let panels = commands
        .iter()
        .filter(|c| {
            matches!(
                c,
                DrawCommand::RoundRect {
                    paint: Paint::PanelBackground,
                    ..
                }
            )
        })
        .count();
    println!("render #{}: {} annotation(s)", render, panels);
    for command in commands {
        match command {
            DrawCommand::RoundRect { rect, paint, .. } => println!(
                "  {:?} ({:.1}, {:.1})-({:.1}, {:.1})",
                paint, rect.left, rect.top, rect.right, rect.bottom
            ),
            DrawCommand::Text { origin, text, .. } => {
                println!("  label '{}' at ({:.1}, {:.1})", text, origin.x, origin.y)
            }
            DrawCommand::TextBlock { origin, block, .. } => println!(
                "  content {} line(s) at ({:.1}, {:.1})",
                block.lines.len(),
                origin.x,
                origin.y
            ),
        }
    }
}
