use serde::Serialize;
use std::io::Read;
use trailhead::layout::{SimulationOptions, Viewport};
use trailhead::render::{Scene, SvgRenderOptions, render_svg};
use trailhead::{ConceptId, Curriculum, Progress, Session, SessionOptions};

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Curriculum(trailhead::Error),
    Json(serde_json::Error),
    Rejected(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Curriculum(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::Rejected(msg) => write!(f, "{msg}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<trailhead::Error> for CliError {
    fn from(value: trailhead::Error) -> Self {
        Self::Curriculum(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Inspect,
    Settle,
    Render,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    seed: u64,
    viewport_width: f64,
    viewport_height: f64,
    learn: Vec<u32>,
    goal: Option<u32>,
    include_labels: bool,
    diagram_id: Option<String>,
    out: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConceptOut<'a> {
    id: ConceptId,
    name: &'a str,
    prereqs: &'a [ConceptId],
    depth: u32,
    known: bool,
    unlockable: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InspectOut<'a> {
    concepts: Vec<ConceptOut<'a>>,
    edges: &'a [(ConceptId, ConceptId)],
    max_depth: u32,
    goal: Option<ConceptId>,
    path_to_goal: Vec<ConceptId>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SettleOut {
    steps: u32,
    scene: Scene,
}

fn usage() -> &'static str {
    "trailhead-cli\n\
\n\
USAGE:\n\
  trailhead-cli [inspect] [--pretty] [--learn <id>] [--goal <id>] [<path>|-]\n\
  trailhead-cli settle [--pretty] [--seed <n>] [--viewport-width <w>] [--viewport-height <h>] [--learn <id>] [--goal <id>] [<path>|-]\n\
  trailhead-cli render [--seed <n>] [--viewport-width <w>] [--viewport-height <h>] [--learn <id>] [--goal <id>] [--no-labels] [--id <diagram-id>] [--out <path>] [<path>|-]\n\
\n\
NOTES:\n\
  - <path> is a curriculum JSON file; '-' reads one from stdin; when omitted the built-in arithmetic table is used.\n\
  - inspect prints the validated concept table with depths and learning state.\n\
  - settle runs the layout to rest and prints the final scene as JSON.\n\
  - render runs the layout to rest and prints SVG to stdout; use --out to write a file.\n\
  - --learn may repeat; concepts are learned in order and each must be unlockable when applied.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        command: Command::Inspect,
        viewport_width: 800.0,
        viewport_height: 520.0,
        include_labels: true,
        ..Default::default()
    };

    let mut it = argv.iter().skip(1).peekable();
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "inspect" => args.command = Command::Inspect,
            "settle" => args.command = Command::Settle,
            "render" => args.command = Command::Render,
            "--pretty" => args.pretty = true,
            "--no-labels" => args.include_labels = false,
            "--seed" => {
                let Some(seed) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.seed = seed.parse::<u64>().map_err(|_| CliError::Usage(usage()))?;
            }
            "--viewport-width" => {
                let Some(w) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.viewport_width = w.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
            }
            "--viewport-height" => {
                let Some(h) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.viewport_height = h.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
            }
            "--learn" => {
                let Some(id) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.learn
                    .push(id.parse::<u32>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--goal" => {
                let Some(id) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.goal = Some(id.parse::<u32>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--id" => {
                let Some(id) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.diagram_id = Some(id.clone());
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            // Bare `-` is the stdin input, not a flag; it has to be matched
            // before the unknown-flag arm below.
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn load_curriculum(input: Option<&str>) -> Result<Curriculum, CliError> {
    match input {
        None => Ok(trailhead::arithmetic_basics()),
        Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(Curriculum::from_json(&buf)?)
        }
        Some(path) => Ok(Curriculum::from_json(&std::fs::read_to_string(path)?)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    Ok(())
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

/// Marks `--learn` concepts known and applies `--goal`, in that order, with
/// the same gating an interactive click goes through.
fn apply_learning(
    progress: &mut Progress,
    learn: &[u32],
    goal: Option<u32>,
) -> Result<(), CliError> {
    for &id in learn {
        let id = ConceptId(id);
        if !progress.set_known(id, true) {
            return Err(CliError::Rejected(format!(
                "cannot learn concept {id}: unknown id or prerequisites not met"
            )));
        }
    }
    if let Some(id) = goal {
        let id = ConceptId(id);
        if !progress.set_goal(id) {
            return Err(CliError::Rejected(format!(
                "cannot set goal {id}: unknown id or already known"
            )));
        }
    }
    Ok(())
}

fn build_session(curriculum: Curriculum, args: &Args) -> Session {
    let simulation = SimulationOptions {
        random_seed: args.seed,
        ..Default::default()
    };
    let options = SessionOptions {
        viewport: Viewport::new(args.viewport_width, args.viewport_height),
        simulation,
        ..Default::default()
    };
    Session::new(curriculum, options)
}

fn settle(session: &mut Session) -> Scene {
    let mut scene = session.frame();
    while !session.simulation().is_settled() {
        scene = session.frame();
    }
    scene
}

fn run(args: Args) -> Result<(), CliError> {
    let curriculum = load_curriculum(args.input.as_deref())?;

    match args.command {
        Command::Inspect => {
            let mut progress = Progress::new(curriculum);
            apply_learning(&mut progress, &args.learn, args.goal)?;
            let curriculum = progress.curriculum();
            let concepts = curriculum
                .concepts()
                .iter()
                .enumerate()
                .map(|(i, c)| ConceptOut {
                    id: c.id,
                    name: &c.name,
                    prereqs: &c.prereqs,
                    depth: c.depth,
                    known: progress.known()[i],
                    unlockable: progress.unlockable()[i],
                })
                .collect();
            let out = InspectOut {
                concepts,
                edges: curriculum.edges(),
                max_depth: curriculum.max_depth(),
                goal: progress.goal(),
                path_to_goal: progress.path_to_goal(),
            };
            write_json(&out, args.pretty)?;
            Ok(())
        }
        Command::Settle => {
            let mut session = build_session(curriculum, &args);
            apply_learning(session.progress_mut(), &args.learn, args.goal)?;
            let scene = settle(&mut session);
            let out = SettleOut {
                steps: session.simulation().steps_taken(),
                scene,
            };
            write_json(&out, args.pretty)?;
            Ok(())
        }
        Command::Render => {
            let mut session = build_session(curriculum, &args);
            apply_learning(session.progress_mut(), &args.learn, args.goal)?;
            let scene = settle(&mut session);
            let svg_options = SvgRenderOptions {
                diagram_id: args.diagram_id.clone(),
                include_labels: args.include_labels,
                ..Default::default()
            };
            let svg = render_svg(&scene, &svg_options);
            write_text(&svg, args.out.as_deref())?;
            Ok(())
        }
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    match run(args) {
        Ok(()) => {}
        Err(CliError::Rejected(msg)) => {
            eprintln!("{msg}");
            std::process::exit(3);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
