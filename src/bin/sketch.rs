use clap::Parser;
use molsketch::edit::{Modifiers, PointerEvent, Tool};
use molsketch::prelude::*;
use std::io::{stderr, Read};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Replay a pointer-event script against the editor and print what comes out
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Script to run; reads stdin if not given
    #[arg(short, long)]
    script: Option<PathBuf>,
    /// Don't fill in hydrogens
    #[arg(long)]
    no_hydrogens: bool,
    /// Refuse bonds that would overfill an atom
    #[arg(long)]
    enforce_admission: bool,
    /// Write double bonds out instead of guessing aromaticity
    #[arg(long)]
    kekule: bool,
}

#[derive(Debug, Error)]
enum ScriptError {
    #[error("unknown command {0:?}")]
    UnknownCommand(String),
    #[error("{0} takes {1} argument(s)")]
    Arity(String, usize),
    #[error("{0:?} isn't a number")]
    BadNumber(String),
    #[error("unknown tool {0:?}, expected select, place, erase, or pan")]
    UnknownTool(String),
    #[error(transparent)]
    Edit(#[from] EditError),
}

fn init_tracing() {
    use tracing_subscriber::filter::*;
    use tracing_subscriber::prelude::*;
    let targets = match std::env::var("RUST_LOG") {
        Ok(var) => var.parse::<Targets>().unwrap_or_else(|e| {
            eprintln!("Ignoring `RUST_LOG={var:?}`: {e}");
            Targets::new().with_default(tracing::Level::ERROR)
        }),
        Err(e) => {
            if e != std::env::VarError::NotPresent {
                eprintln!("Ignoring `RUST_LOG`: {e}");
            }
            Targets::new().with_default(tracing::Level::ERROR)
        }
    };
    let fmt = tracing_subscriber::fmt::layer().with_writer(stderr);
    tracing_subscriber::registry()
        .with(targets)
        .with(fmt)
        .init();
}

fn num(s: &str) -> Result<f64, ScriptError> {
    s.parse().map_err(|_| ScriptError::BadNumber(s.to_string()))
}

/// Events are spaced one frame apart unless a `wait` says otherwise
const FRAME: Duration = Duration::from_millis(16);

fn run_line(editor: &mut Editor, line: &str, now: &mut Instant) -> Result<(), ScriptError> {
    let words = line.split_whitespace().collect::<Vec<_>>();
    let Some((&cmd, args)) = words.split_first() else {
        return Ok(());
    };
    let arity = |n: usize| {
        if args.len() == n {
            Ok(())
        } else {
            Err(ScriptError::Arity(cmd.to_string(), n))
        }
    };
    *now += FRAME;
    match cmd {
        "tool" => {
            arity(1)?;
            let tool = match args[0] {
                "select" => Tool::Select,
                "place" => Tool::PlaceAtom,
                "erase" => Tool::Erase,
                "pan" => Tool::Pan,
                other => return Err(ScriptError::UnknownTool(other.to_string())),
            };
            editor.select_tool(tool);
        }
        "element" => {
            arity(1)?;
            editor.select_element(args[0])?;
        }
        "down" | "move" | "up" | "atom" => {
            let shift = args.len() == 3 && args[2] == "shift";
            if !shift {
                arity(2)?;
            }
            let (x, y) = (num(args[0])?, num(args[1])?);
            let ev = match cmd {
                "down" => PointerEvent::down(x, y, *now),
                "move" => PointerEvent::moved(x, y, *now),
                "up" => PointerEvent::up(x, y, *now),
                _ => {
                    let at = editor.view().to_world(Point::new(x, y));
                    editor.place_atom(at)?;
                    return Ok(());
                }
            };
            let ev = if shift {
                ev.with_modifiers(Modifiers::SHIFT)
            } else {
                ev
            };
            if let Some(edit) = editor.handle(ev)? {
                tracing::info!(?edit, "edit");
            }
        }
        "leave" => {
            arity(0)?;
            editor.handle(PointerEvent::leave(*now))?;
        }
        "wheel" => {
            arity(3)?;
            let ev = PointerEvent::wheel(num(args[0])?, num(args[1])?, num(args[2])?, *now);
            editor.handle(ev)?;
        }
        "zoom" => {
            arity(1)?;
            // keep the origin's screen position put
            let center = Point::from(editor.view().offset);
            editor.set_zoom(num(args[0])?, center);
        }
        "wait" => {
            arity(1)?;
            let ms = num(args[0])?.max(0.0);
            *now += Duration::from_secs_f64(ms / 1000.0);
        }
        "delete" => {
            arity(0)?;
            editor.delete_selection()?;
        }
        "import" => {
            let notation = line.trim_start()["import".len()..].trim();
            editor.import(&TemplateImporter::new(), notation)?;
        }
        other => return Err(ScriptError::UnknownCommand(other.to_string())),
    }
    Ok(())
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let script = match &cli.script {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).map(|_| buf)
        }
    };
    let script = match script {
        Ok(s) => s,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };
    let cfg = EditConfig::new()
        .with_hydrogens(!cli.no_hydrogens)
        .with_enforce_admission(cli.enforce_admission);
    let mut editor = Editor::new(cfg);
    let mut now = Instant::now();
    for (n, line) in script.lines().enumerate() {
        let line = line.split("//").next().unwrap_or_default();
        if let Err(err) = run_line(&mut editor, line, &mut now) {
            eprintln!("line {}: {err}", n + 1);
        }
    }
    let smiles_cfg = if cli.kekule {
        SmilesConfig::kekule()
    } else {
        SmilesConfig::new()
    };
    let mol = editor.molecule();
    println!("{}", generate_smiles(mol, smiles_cfg));
    println!("{}", mol.formula());
    for warning in editor.warnings() {
        println!("warning: {warning}");
    }
}
