#![deny(warnings)]

//! `relic`: terminal front end for the upgrade-line tracker.
//!
//! Renders a line's checklist and material rows as plain text and forwards
//! raw input to the tracker entry points.

use anyhow::{bail, Context, Result};
use catalog::Catalog;
use persistence::{default_store_path, JsonFileStore};
use relic_core::{Equipment, MaterialId, StepId, UnitId};
use std::fmt::Write as _;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracker::{Change, Tracker, TrackerView};

const USAGE: &str = "usage: relic [--store <path>] [--lines <dir>] [--armor] [--json] <command>
commands:
  lines
  show <line>
  toggle <line> <step> <unit>
  held <line> <material> <value>";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Lines,
    Show { line: String },
    Toggle { line: String, step: String, unit: String },
    Held { line: String, material: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Args {
    store: String,
    lines: Option<String>,
    equipment: Equipment,
    json: bool,
    command: Command,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args> {
    let mut store = default_store_path().to_string();
    let mut lines = None;
    let mut equipment = Equipment::Weapon;
    let mut json = false;
    let mut positional = Vec::new();
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--store" => store = it.next().context("--store needs a path")?,
            "--lines" => lines = Some(it.next().context("--lines needs a directory")?),
            "--armor" => equipment = Equipment::Armor,
            "--json" => json = true,
            "-h" | "--help" => bail!("{USAGE}"),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let command = match (positional.next().as_deref(), positional.as_slice()) {
        (Some("lines"), []) => Command::Lines,
        (Some("show"), [line]) => Command::Show { line: line.clone() },
        (Some("toggle"), [line, step, unit]) => Command::Toggle {
            line: line.clone(),
            step: step.clone(),
            unit: unit.clone(),
        },
        (Some("held"), [line, material, value]) => Command::Held {
            line: line.clone(),
            material: material.clone(),
            value: value.clone(),
        },
        _ => bail!("{USAGE}"),
    };
    Ok(Args {
        store,
        lines,
        equipment,
        json,
        command,
    })
}

fn render(view: &TrackerView<'_>) -> String {
    let mut out = String::new();
    let step_width = view.ordered_steps.iter().map(|s| s.name.len()).max().unwrap_or(0);
    let _ = writeln!(out, "{}", view.name);
    let _ = write!(out, "{:step_width$}", "");
    for unit in view.ordered_units {
        let _ = write!(out, " {:>4}", unit.name);
    }
    out.push('\n');
    for step in view.ordered_steps {
        let _ = write!(out, "{:step_width$}", step.name);
        for unit in view.ordered_units {
            let mark = if view.completion_matrix.is_done(&step.id, &unit.id) { "x" } else { "." };
            let _ = write!(out, " {:>w$}", mark, w = unit.name.len().max(4));
        }
        out.push('\n');
    }
    out.push('\n');

    let name_width = view
        .derived_material_rows
        .iter()
        .map(|r| r.name.len())
        .max()
        .unwrap_or(0);
    for row in view.derived_material_rows {
        let _ = writeln!(
            out,
            "{:name_width$}  {:>6} / {:<6} need {:>6}  {:>3}%",
            row.name,
            row.total_held,
            row.total_needed,
            row.remaining,
            row.progress.round()
        );
    }
    out
}

fn print_lines(catalog: &Catalog) {
    for line in catalog.lines() {
        let equipment = match line.equipment {
            Equipment::Weapon => "weapon",
            Equipment::Armor => "armor",
        };
        println!(
            "{:<12} {:<7} {:<28} units: {:>2} | steps: {:>2} | materials: {:>2}",
            line.id,
            equipment,
            line.name,
            line.units.len(),
            line.steps.len(),
            line.materials.len()
        );
    }
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    info!(command = ?args.command, store = %args.store, "starting CLI");

    let mut catalog = Catalog::builtin().context("loading built-in lines")?;
    if let Some(dir) = &args.lines {
        catalog.load_dir(dir).with_context(|| format!("loading lines from {dir}"))?;
    }

    let line_id = match &args.command {
        Command::Lines => {
            print_lines(&catalog);
            return Ok(());
        }
        Command::Show { line } | Command::Toggle { line, .. } | Command::Held { line, .. } => line,
    };
    let line = catalog
        .get(line_id, args.equipment)
        .with_context(|| format!("no {:?} line named {line_id}", args.equipment))?
        .clone();
    let store = JsonFileStore::open(&args.store).with_context(|| format!("opening store {}", args.store))?;
    let mut tracker = Tracker::new(line, store)?;

    let change = match &args.command {
        Command::Toggle { step, unit, .. } => {
            Some(tracker.on_step_toggled(&StepId::from(step.as_str()), &UnitId::from(unit.as_str()))?)
        }
        Command::Held { material, value, .. } => {
            Some(tracker.on_held_changed(&MaterialId::from(material.as_str()), value.as_str())?)
        }
        _ => None,
    };
    if change == Some(Change::Unchanged) {
        info!("nothing changed");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&tracker.view())?);
    } else {
        print!("{}", render(&tracker.view()));
    }
    Ok(())
}
