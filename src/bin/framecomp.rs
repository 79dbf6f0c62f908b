use std::{
    io::Write as _,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use framecomp::{FrameScript, RendererSettings, replay::ReplayFrame};

#[derive(Parser, Debug)]
#[command(name = "framecomp", version)]
struct Cli {
    /// Log compositor decisions to stderr.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a JSON frame script against recording collaborators.
    Replay(ReplayArgs),
    /// Print the effective renderer settings as JSON.
    Settings(SettingsArgs),
}

#[derive(Parser, Debug)]
struct ReplayArgs {
    /// Input frame script JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Also print every backend and surface call (text output only).
    #[arg(long)]
    calls: bool,

    /// Exit with an error if any frame failed.
    #[arg(long)]
    strict: bool,
}

#[derive(Parser, Debug)]
struct SettingsArgs {
    /// Settings JSON to start from instead of the defaults.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Replay(args) => cmd_replay(args),
        Command::Settings(args) => cmd_settings(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cmd_replay(args: ReplayArgs) -> anyhow::Result<()> {
    let mut script = read_script(&args.in_path)?;
    script.settings = script.settings.apply_env_overrides();

    let frames = script
        .run()
        .with_context(|| format!("replay '{}'", args.in_path.display()))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match args.format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &frames).context("write replay JSON")?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            for frame in &frames {
                print_frame(&mut out, frame, args.calls)?;
            }
        }
    }

    let failed = frames.iter().filter(|f| f.error.is_some()).count();
    if failed > 0 {
        eprintln!("{failed} of {} frame(s) failed", frames.len());
        if args.strict {
            anyhow::bail!("{failed} frame(s) failed");
        }
    }
    Ok(())
}

fn cmd_settings(args: SettingsArgs) -> anyhow::Result<()> {
    let settings = match &args.in_path {
        Some(path) => {
            let s = std::fs::read_to_string(path)
                .with_context(|| format!("read settings '{}'", path.display()))?;
            RendererSettings::from_json_str(&s)
                .with_context(|| format!("parse settings '{}'", path.display()))?
        }
        None => RendererSettings::default(),
    }
    .apply_env_overrides();
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

fn read_script(path: &Path) -> anyhow::Result<FrameScript> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("open frame script '{}'", path.display()))?;
    FrameScript::from_json_str(&s).with_context(|| format!("parse frame script '{}'", path.display()))
}

fn print_frame(out: &mut impl std::io::Write, frame: &ReplayFrame, calls: bool) -> anyhow::Result<()> {
    match (&frame.report, &frame.error) {
        (Some(r), _) => {
            let d = r.root_damage_rect;
            writeln!(
                out,
                "frame {}: damage=({}, {}, {}, {}) skipped={} passes={} quads={} polygons={} overlays={} copies={}",
                frame.index,
                d.x0,
                d.y0,
                d.x1,
                d.y1,
                r.root_skipped,
                r.passes_drawn,
                r.quads_drawn,
                r.polygons_drawn,
                r.overlay_candidates,
                r.copy_requests,
            )?;
        }
        (None, Some(err)) => writeln!(out, "frame {}: error: {err}", frame.index)?,
        (None, None) => writeln!(out, "frame {}: no result", frame.index)?,
    }
    if calls {
        for call in &frame.surface_calls {
            writeln!(out, "  surface {}", serde_json::to_string(call)?)?;
        }
        for call in &frame.backend_calls {
            writeln!(out, "  backend {}", serde_json::to_string(call)?)?;
        }
    }
    Ok(())
}
