//! Command implementations
//!
//! Every command loads the project file, works on it and, when something
//! changed, writes it back in place. Edits go through [`GraphStore`] so the
//! CLI gets the same cascades and rejections as the interactive editor.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use colored::Colorize;
use floorgraph_core::{ConnectionType, FloorDimensions, GridPoint, round_to};
use floorgraph_editor::{EditorConfig, GraphStore};
use floorgraph_ir::{
    ExportOptions, FloorDraft, FloorId, GlobalConnectionDraft, NodeDraft, NodeId, Project,
    Validator, export_project_with, load_project, save_project,
};
use floorgraph_ir::serialization::ensure_extension;
use walkdir::WalkDir;

use crate::{Cli, Command, FloorAction, FloorAddArgs, NodeAction, NodeAddArgs};

/// Execute a parsed command line
pub fn run(cli: Cli) -> Result<()> {
    let config = EditorConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load editor configuration")?;
    tracing::debug!("Running {:?}", cli.command);

    match cli.command {
        Command::New { path, name, force } => new_project(&path, &name, force),
        Command::Info { path, json } => info(&path, json),
        Command::Validate { path, fix } => validate(&path, fix),
        Command::Export {
            path,
            strip_images,
            compact,
            output,
        } => export(&path, strip_images, compact, output.as_deref()),
        Command::Floor { action } => match action {
            FloorAction::Add(args) => floor_add(args),
            FloorAction::Remove { path, floor } => floor_remove(&path, &floor),
        },
        Command::Node { action } => match action {
            NodeAction::Add(args) => node_add(args),
            NodeAction::Remove { path, node } => node_remove(&path, &node),
        },
        Command::Link {
            path,
            from,
            to,
            distance,
        } => link(&path, &from, &to, distance, &config),
        Command::Unlink { path, from, to } => unlink(&path, &from, &to),
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn open(path: &Path) -> Result<GraphStore> {
    let project =
        load_project(path).with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(GraphStore::with_project(project))
}

fn write(store: &GraphStore, path: &Path) -> Result<()> {
    save_project(store.project(), path)
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Find a floor by id, falling back to a case-insensitive name match
fn resolve_floor(project: &Project, needle: &str) -> Result<FloorId> {
    let by_id = FloorId::new(needle);
    if project.floor(&by_id).is_some() {
        return Ok(by_id);
    }

    let matches: Vec<&FloorId> = project
        .floors()
        .iter()
        .filter(|f| f.name.eq_ignore_ascii_case(needle))
        .map(|f| &f.id)
        .collect();
    match matches.as_slice() {
        [id] => Ok((*id).clone()),
        [] => bail!("No floor with id or name '{}'", needle),
        _ => bail!("Floor name '{}' is ambiguous, use the floor id", needle),
    }
}

fn resolve_node(project: &Project, id: &str) -> Result<NodeId> {
    let id = NodeId::new(id);
    if !project.contains_node(&id) {
        bail!("No node with id '{}'", id);
    }
    Ok(id)
}

// ============================================================================
// Project-level commands
// ============================================================================

fn new_project(path: &Path, name: &str, force: bool) -> Result<()> {
    let path = ensure_extension(path);
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    let project = Project::new(name);
    save_project(&project, &path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    println!("{} Created project '{}'", "✓".green().bold(), name.cyan());
    println!("  {}", path.display().to_string().dimmed());
    Ok(())
}

fn info(path: &Path, json: bool) -> Result<()> {
    let project =
        load_project(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let stats = project.stats();

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    let building = project.building();
    println!("{}", building.name.bold());
    println!("  {} {}", "id:".dimmed(), building.id);
    println!("  {} {}", "created:".dimmed(), building.meta.created_at.to_rfc3339());
    println!("  {} {}", "updated:".dimmed(), building.meta.updated_at.to_rfc3339());
    println!();

    println!("{} ({})", "Floors".bold(), stats.floor_count);
    for floor in project.floors_by_level() {
        let plan = match floor.dimensions() {
            Some(d) => format!("{}x{}", d.width, d.height),
            None => "no plan".to_string(),
        };
        println!(
            "  {:>3}  {} {} {} node(s), {}",
            floor.level,
            floor.name.cyan(),
            format!("[{}]", floor.id).dimmed(),
            floor.node_count(),
            plan.dimmed()
        );
    }
    println!();

    println!("{}", "Graph".bold());
    println!("  nodes:              {}", stats.node_count);
    for (kind, count) in &stats.nodes_by_type {
        println!("    {:<16} {}", kind.display_name(), count);
    }
    println!("  local edges:        {}", stats.local_edge_count);
    println!("  floor connections:  {}", stats.global_connection_count);
    Ok(())
}

/// Project files under `path`: the file itself, or every .json file below a directory
fn collect_files(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to scan {}", path.display()))?;
        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|e| e == "json")
        {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn validate(path: &Path, fix: bool) -> Result<()> {
    let files = collect_files(path)?;
    if files.is_empty() {
        bail!("No project files found under {}", path.display());
    }

    let validator = Validator::with_default_rules();
    let mut failed = 0;

    for file in &files {
        let mut store = match open(file) {
            Ok(store) => store,
            Err(e) => {
                println!("{} {}: {:#}", "✗".red().bold(), file.display(), e);
                failed += 1;
                continue;
            }
        };

        if fix {
            let report = store.repair();
            if !report.is_clean() {
                write(&store, file)?;
                println!("{} {}: {}", "⚒".yellow(), file.display(), report);
            }
        }

        let result = validator.validate(store.project());
        if result.has_errors() {
            failed += 1;
            println!(
                "{} {} ({} error(s))",
                "✗".red().bold(),
                file.display(),
                result.errors.len()
            );
        } else {
            println!("{} {}", "✓".green().bold(), file.display());
        }
        for error in &result.errors {
            println!("    {} {}", "error:".red(), error);
        }
        for warning in &result.warnings {
            println!("    {}", warning.to_string().yellow());
        }
    }

    if failed > 0 {
        bail!("{} of {} file(s) failed validation", failed, files.len());
    }
    Ok(())
}

fn export(path: &Path, strip_images: bool, compact: bool, output: Option<&Path>) -> Result<()> {
    let project =
        load_project(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let options = ExportOptions {
        strip_images,
        pretty: !compact,
    };
    let json = export_project_with(&project, options)?;

    match output {
        Some(out) => {
            std::fs::write(out, json)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            eprintln!("{} Exported to {}", "✓".green().bold(), out.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

// ============================================================================
// Edits
// ============================================================================

fn floor_add(args: FloorAddArgs) -> Result<()> {
    let mut store = open(&args.path)?;

    let mut draft = FloorDraft::new(args.name.clone());
    if let Some(level) = args.level {
        draft = draft.with_level(level);
    }
    if let Some(id) = args.id {
        draft = draft.with_id(id);
    }
    if let (Some(width), Some(height)) = (args.width, args.height) {
        let dimensions = FloorDimensions::new(width, height);
        draft = match args.image {
            Some(url) => draft.with_image(url, dimensions),
            None => draft.with_dimensions(dimensions),
        };
    }

    let id = store.add_floor(draft);
    write(&store, &args.path)?;
    println!("{} Added floor '{}' as {}", "✓".green().bold(), args.name.cyan(), id);
    Ok(())
}

fn floor_remove(path: &Path, floor: &str) -> Result<()> {
    let mut store = open(path)?;
    let id = resolve_floor(store.project(), floor)?;
    if !store.remove_floor(&id) {
        bail!("Floor '{}' was not removed", id);
    }
    write(&store, path)?;
    println!("{} Removed floor {}", "✓".green().bold(), id);
    Ok(())
}

fn node_add(args: NodeAddArgs) -> Result<()> {
    let mut store = open(&args.path)?;
    let floor = resolve_floor(store.project(), &args.floor)?;

    let mut draft = NodeDraft::new(args.kind, GridPoint::new(args.x, args.y))
        .with_name(args.name);
    if let Some(id) = args.id {
        draft = draft.with_id(id);
    }

    let Some(id) = store.add_node(&floor, draft) else {
        bail!("Node was rejected (id already in use or position not finite)");
    };
    write(&store, &args.path)?;
    println!("{} Added {} {} on {}", "✓".green().bold(), args.kind, id.to_string().cyan(), floor);
    Ok(())
}

fn node_remove(path: &Path, node: &str) -> Result<()> {
    let mut store = open(path)?;
    let id = resolve_node(store.project(), node)?;
    let floor = store
        .project()
        .node_floor_id(&id)
        .cloned()
        .context("Node has no floor")?;
    if !store.remove_node(&floor, &id) {
        bail!("Node '{}' was not removed", id);
    }
    write(&store, path)?;
    println!("{} Removed node {}", "✓".green().bold(), id);
    Ok(())
}

fn link(path: &Path, from: &str, to: &str, distance: Option<f64>, config: &EditorConfig) -> Result<()> {
    let mut store = open(path)?;
    let from = resolve_node(store.project(), from)?;
    let to = resolve_node(store.project(), to)?;

    let (Some((from_floor, a)), Some((to_floor, b))) = (
        store.project().find_node(&from),
        store.project().find_node(&to),
    ) else {
        bail!("Both nodes must exist");
    };
    let same_floor = (from_floor.id == to_floor.id).then(|| from_floor.id.clone());
    let grid_distance = round_to(a.position().distance_to(&b.position()), config.distance_precision);
    let kinds = (a.kind, b.kind);

    if let Some(floor) = same_floor {
        let distance = distance.unwrap_or(grid_distance);
        if !store.add_local_connection(&floor, &from, &to, distance) {
            bail!("Could not connect {} and {}", from, to);
        }
        write(&store, path)?;
        println!(
            "{} Linked {} ↔ {} on {} (distance {})",
            "✓".green().bold(),
            from,
            to,
            floor,
            distance
        );
    } else {
        let Some(kind) = ConnectionType::for_endpoints(kinds.0, kinds.1) else {
            bail!(
                "Floor changes need stair or elevator endpoints, got {} and {}",
                kinds.0,
                kinds.1
            );
        };
        let distance = distance.unwrap_or(config.floor_change_distance);
        let draft = GlobalConnectionDraft::new(from.clone(), to.clone(), kind.into(), distance);
        if !store.add_global_connection(draft) {
            bail!("Could not connect {} and {}", from, to);
        }
        write(&store, path)?;
        println!(
            "{} Linked {} ↔ {} by {} (distance {})",
            "✓".green().bold(),
            from,
            to,
            kind,
            distance
        );
    }
    Ok(())
}

fn unlink(path: &Path, from: &str, to: &str) -> Result<()> {
    let mut store = open(path)?;
    let from = resolve_node(store.project(), from)?;
    let to = resolve_node(store.project(), to)?;

    let local_floor = store.project().node_floor_id(&from).cloned();
    let removed = match local_floor {
        Some(floor) if store.project().node_floor_id(&to) == Some(&floor) => {
            store.remove_local_connection(&floor, &from, &to)
        }
        _ => store.remove_global_connection(&from, &to),
    };
    if !removed {
        bail!("{} and {} are not connected", from, to);
    }
    write(&store, path)?;
    println!("{} Unlinked {} and {}", "✓".green().bold(), from, to);
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
