use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use cutline::{Cycle, Element as _, GroupId, Query, State, TimelineDef};

#[derive(Parser, Debug)]
#[command(name = "cutline", version)]
struct Cli {
    /// Log scheduler decisions (debug level) to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play a timeline to the end and print every cycle.
    Run(RunArgs),
    /// Print the aggregate range of a timeline.
    Range(RangeArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Input timeline JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Emit one JSON object per cycle instead of text.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Give up after this many cycles.
    #[arg(long, default_value_t = 1_000_000)]
    max_cycles: u64,
}

#[derive(Parser, Debug)]
struct RangeArgs {
    /// Input timeline JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(serde::Serialize, Debug)]
struct CycleRecord {
    cycle: u64,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<GroupId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp_ns: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_ns: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<String>,
}

impl CycleRecord {
    fn new(cycle: u64, c: &Cycle) -> Self {
        let (kind, group) = match c {
            Cycle::Buffer { group, .. } => ("buffer", Some(*group)),
            Cycle::GroupEnd(g) => ("group_end", Some(*g)),
            Cycle::Reseek(g) => ("reseek", Some(*g)),
            Cycle::Discard(g) => ("discard", Some(*g)),
            Cycle::Fault(g) => ("fault", Some(*g)),
            Cycle::EndOfStream => ("end_of_stream", None),
            Cycle::Drained => ("drained", None),
        };
        let buffer = match c {
            Cycle::Buffer { buffer, .. } => Some(buffer),
            _ => None,
        };
        Self {
            cycle,
            kind,
            group,
            timestamp_ns: buffer.map(|b| b.timestamp.nanos()),
            duration_ns: buffer.map(|b| b.duration.nanos()),
            payload: buffer.map(|b| String::from_utf8_lossy(&b.data).into_owned()),
        }
    }

    fn text(&self) -> String {
        let mut line = format!("{:>6} {}", self.cycle, self.kind);
        if let Some(g) = self.group {
            line.push_str(&format!(" {g}"));
        }
        if let Some(ts) = self.timestamp_ns {
            line.push_str(&format!(" {}", cutline::ClockTime(ts)));
        }
        if let Some(payload) = &self.payload {
            line.push_str(&format!(" {payload:?}"));
        }
        line
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::Range(args) => cmd_range(args),
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "cutline=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load(path: &Path) -> anyhow::Result<cutline::Timeline> {
    let def = TimelineDef::from_path(path)?;
    def.build()
        .with_context(|| format!("build timeline from '{}'", path.display()))
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let mut timeline = load(&args.in_path)?;
    timeline
        .set_state(State::Playing)
        .context("activate timeline")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut finished = false;
    for n in 0..args.max_cycles {
        let cycle = timeline.pull()?;
        let record = CycleRecord::new(n, &cycle);
        if args.json {
            serde_json::to_writer(&mut out, &record).context("serialize cycle")?;
            writeln!(out)?;
        } else {
            writeln!(out, "{}", record.text())?;
        }
        if cycle == Cycle::EndOfStream {
            finished = true;
            break;
        }
    }
    out.flush()?;

    let position = timeline.query(Query::Position);
    timeline.set_state(State::Null).context("shut down timeline")?;
    timeline.dispose();

    if !finished {
        anyhow::bail!(
            "timeline did not reach end of stream within {} cycles",
            args.max_cycles
        );
    }
    if let Some(position) = position {
        eprintln!("finished at {position}");
    }
    Ok(())
}

fn cmd_range(args: RangeArgs) -> anyhow::Result<()> {
    let timeline = load(&args.in_path)?;
    let range = timeline.range();
    println!("start    {}", range.start);
    println!("stop     {}", range.stop);
    match timeline.query(Query::Duration) {
        Some(d) => println!("duration {d}"),
        None => println!("duration open-ended"),
    }
    println!("groups   {}", timeline.group_count());
    Ok(())
}
