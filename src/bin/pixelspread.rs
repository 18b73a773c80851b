use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use pixelspread::{InputScript, PaintSession, RunOpts, SessionConfig, run_script};

#[derive(Parser, Debug)]
#[command(name = "pixelspread", version)]
struct Cli {
    /// Log at DEBUG level.
    #[arg(long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay recorded input headlessly and save the final canvas.
    Run(RunArgs),
    /// Paint one diagonal stroke and let it fill the canvas.
    Demo(DemoArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Session config JSON (defaults apply when omitted).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Input script JSON.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Maximum number of frames to run.
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Output image path; the extension is chosen from the final state.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Stop as soon as the canvas is done (or cleared) and the script is exhausted.
    #[arg(long, default_value_t = false)]
    until_done: bool,
}

#[derive(Parser, Debug)]
struct DemoArgs {
    #[arg(long, default_value_t = 256)]
    width: u32,

    #[arg(long, default_value_t = 256)]
    height: u32,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Maximum number of frames to run.
    #[arg(long, default_value_t = 2000)]
    frames: u64,

    /// Output image path; the extension is chosen from the final state.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::Demo(args) => cmd_demo(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => SessionConfig::from_path(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => SessionConfig::default(),
    };
    let script = match &args.script {
        Some(path) => InputScript::from_path(path)
            .with_context(|| format!("load script '{}'", path.display()))?,
        None => InputScript::default(),
    };

    let mut session = PaintSession::new(config).context("start session")?;
    let opts = RunOpts {
        max_frames: args.frames,
        until_done: args.until_done,
        ..RunOpts::default()
    };
    let summary = run_script(&mut session, &script, Instant::now(), &opts)?;
    eprintln!(
        "ran {} frames, final state {:?}",
        summary.frames_run, summary.final_state
    );

    let out = args
        .out
        .unwrap_or_else(|| PathBuf::from(session.suggested_export_name()));
    let written = session
        .export_image(&out)
        .with_context(|| format!("export canvas to '{}'", out.display()))?;
    eprintln!("wrote {}", written.display());
    Ok(())
}

fn cmd_demo(args: DemoArgs) -> anyhow::Result<()> {
    let config = SessionConfig {
        width: args.width,
        height: args.height,
        seed: args.seed,
        ..SessionConfig::default()
    };
    let mut session = PaintSession::new(config).context("start session")?;

    let (w, h) = (f64::from(args.width), f64::from(args.height));
    session.pointer_down(0.0, 0.0);
    session.pointer_move(w - 1.0, h - 1.0);
    session.pointer_up();

    let opts = RunOpts {
        max_frames: args.frames,
        until_done: true,
        ..RunOpts::default()
    };
    let summary = run_script(&mut session, &InputScript::default(), Instant::now(), &opts)?;
    eprintln!(
        "ran {} frames, final state {:?}",
        summary.frames_run, summary.final_state
    );

    let written = session
        .export_image(&args.out)
        .with_context(|| format!("export canvas to '{}'", args.out.display()))?;
    eprintln!("wrote {}", written.display());
    Ok(())
}
