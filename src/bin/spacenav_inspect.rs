use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use log::info;
use roomlist_spaces::filter::{filter_rooms, resolve_selected_space};
use roomlist_spaces::roomlist::translate_visible_range;
use roomlist_spaces::spaces::{
    SpaceHierarchyItem, SpaceList, build_space_hierarchy, resolve_space_name,
};
use roomlist_spaces::store::{FileSelectionStore, SpaceSelectionStore};
use roomlist_spaces::types::{RoomSummaries, RoomSummary, SelectionPath, SpaceSummary};
use roomlist_spaces::unread::{aggregate, compute_space_unread_counts};
use roomlist_spaces::{CountingMode, PseudoSpaceSettings};
use serde::Deserialize;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "spacenav_inspect")]
#[command(about = "Space navigation inspection tool")]
#[command(
    long_about = "Builds the space hierarchy from a room list fixture, resolves a selection and shows the filtered rooms, unread counts and translated visible range"
)]
struct Cli {
    /// JSON fixture: { "rooms": [...], "spaces": [...] }
    fixture: PathBuf,

    /// Selection path, comma separated (e.g. s:!a,s:!b)
    #[arg(short, long, value_delimiter = ',')]
    select: Vec<String>,

    /// Pseudo spaces to enable
    #[arg(short, long, value_enum, value_delimiter = ',')]
    pseudo: Vec<PseudoArg>,

    /// Count with server-reported counters instead of client-generated ones
    #[arg(long)]
    server_counts: bool,

    /// Visible range over the filtered list, as a..=b
    #[arg(short, long, value_parser = parse_range)]
    range: Option<RangeInclusive<usize>>,

    /// Show nothing instead of all rooms when no space is selected
    #[arg(long)]
    no_all_rooms: bool,

    /// Read the selection from this file when --select is not given
    #[arg(long)]
    selection_file: Option<PathBuf>,

    /// Write the resolved selection back to --selection-file
    #[arg(long, requires = "selection_file")]
    save: bool,

    #[arg(short, long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum PseudoArg {
    Favorites,
    Dms,
    Groups,
    SpacelessGroups,
    Spaceless,
    Notifications,
    Unread,
}

#[derive(Deserialize)]
struct Fixture {
    #[serde(default)]
    rooms: Vec<RoomSummary>,
    #[serde(default)]
    spaces: Vec<SpaceSummary>,
}

fn parse_range(value: &str) -> Result<RangeInclusive<usize>, String> {
    let (start, end) = value
        .split_once("..=")
        .ok_or_else(|| format!("expected a..=b, got '{value}'"))?;
    let start = start.trim().parse().map_err(|e| format!("bad start: {e}"))?;
    let end = end.trim().parse().map_err(|e| format!("bad end: {e}"))?;
    Ok(start..=end)
}

fn pseudo_settings(pseudo: &[PseudoArg], client_unread_counts: bool) -> PseudoSpaceSettings {
    let mut settings = PseudoSpaceSettings {
        client_unread_counts,
        ..Default::default()
    };
    for arg in pseudo {
        match arg {
            PseudoArg::Favorites => settings.favorites = true,
            PseudoArg::Dms => settings.dms = true,
            PseudoArg::Groups => settings.groups = true,
            PseudoArg::SpacelessGroups => settings.spaceless_groups = true,
            PseudoArg::Spaceless => settings.spaceless = true,
            PseudoArg::Notifications => settings.notifications = true,
            PseudoArg::Unread => settings.unread = true,
        }
    }
    settings
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let data = tokio::fs::read(&cli.fixture)
        .await
        .with_context(|| format!("reading {}", cli.fixture.display()))?;
    let fixture: Fixture = serde_json::from_slice(&data).context("parsing fixture")?;

    let selection_store = cli.selection_file.as_ref().map(FileSelectionStore::new);
    let selection: SelectionPath = match (&selection_store, cli.select.is_empty()) {
        (Some(store), true) => store.load_initial_space_selection().await,
        _ => cli.select.clone(),
    };

    let mode = if cli.server_counts {
        CountingMode::ServerGenerated
    } else {
        CountingMode::ClientGenerated
    };
    let settings = pseudo_settings(&cli.pseudo, mode == CountingMode::ClientGenerated);
    let root: SpaceList = build_space_hierarchy(&fixture.spaces, &settings).into();
    let rooms: RoomSummaries = fixture.rooms.into();

    let resolution = resolve_selected_space(Some(selection.as_slice()), Some(&root), &settings);
    if !resolution.found {
        bail!("selection {selection:?} does not resolve in the space hierarchy");
    }
    let filtered = filter_rooms(resolution.selected.as_ref(), &rooms, !cli.no_all_rooms);
    let totals = aggregate(rooms.iter(), mode);
    let translated = cli
        .range
        .clone()
        .map(|range| translate_visible_range(range, &filtered, &rooms));
    let title = resolve_space_name(&root, &selection);

    if cli.json {
        let output = serde_json::json!({
            "title": title,
            "selection": selection,
            "spaces": root.iter().map(|item| space_json(item, &rooms, mode)).collect::<Vec<_>>(),
            "filtered_rooms": filtered.iter().map(|room| room.room_id.as_str()).collect::<Vec<_>>(),
            "total_unread_counts": totals,
            "upstream_range": translated.as_ref().map(|range| [range.start(), range.end()]),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        info!("=== Space hierarchy ===");
        for item in root.iter() {
            print_space(item, &rooms, mode, 0);
        }
        info!("----------------------------------------");
        info!("Selection: {selection:?} ({})", title.as_deref().unwrap_or("spaces disabled"));
        info!("Filtered rooms ({}/{}):", filtered.len(), rooms.len());
        for room in filtered.iter() {
            info!("  {} {}", room.room_id, room.display_name());
        }
        info!("Total unread: {totals:?}");
        if let (Some(range), Some(translated)) = (&cli.range, &translated) {
            info!("Visible range {range:?} -> upstream {translated:?}");
        }
    }

    if cli.save {
        if let Some(store) = &selection_store {
            store.persist_space_selection(&selection).await?;
            info!("Saved selection to {}", store.path().display());
        }
    }

    Ok(())
}

fn print_space(item: &SpaceHierarchyItem, rooms: &Arc<[RoomSummary]>, mode: CountingMode, depth: usize) {
    let counts = compute_space_unread_counts(item, rooms, mode);
    info!(
        "{:indent$}{} [{}] unread chats: {}, notified: {}, mentioned: {}",
        "",
        item.name(),
        item.selection_id(),
        counts.unread_chats,
        counts.notified_chats,
        counts.mentioned_chats,
        indent = depth * 2
    );
    for child in item.child_spaces() {
        print_space(child, rooms, mode, depth + 1);
    }
}

fn space_json(item: &SpaceHierarchyItem, rooms: &Arc<[RoomSummary]>, mode: CountingMode) -> serde_json::Value {
    serde_json::json!({
        "id": item.selection_id(),
        "name": item.name(),
        "unread_counts": compute_space_unread_counts(item, rooms, mode),
        "spaces": item
            .child_spaces()
            .iter()
            .map(|child| space_json(child, rooms, mode))
            .collect::<Vec<_>>(),
    })
}
