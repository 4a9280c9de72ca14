use std::error::Error;
use std::path::{Path, PathBuf};

use indexmap::IndexSet;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::drag::controller::{self, default_predicate};
use crate::drag::{payload, DragPosition};
use crate::io::config_io;
use crate::io::lock::FileLock;
use crate::io::timeline_io;
use crate::model::archetype::TrackArchetype;
use crate::model::config::EditorConfig;
use crate::model::media::MediaId;
use crate::model::timeline::Timeline;
use crate::model::track::TrackId;
use crate::ops::{check, track_ops};

type CmdResult<T = ()> = Result<T, Box<dyn Error>>;

/// Resolved invocation settings shared by the CLI and the TUI
pub struct Context {
    pub path: PathBuf,
    pub config: EditorConfig,
    pub json: bool,
}

impl Context {
    /// Load the config and pick the timeline file: `--file`, else the
    /// configured default relative to the working directory
    pub fn from_cli(cli: &Cli) -> CmdResult<Context> {
        let cwd = std::env::current_dir()?;
        let (config, _) = config_io::load_config(cli.config.as_deref(), &cwd)?;
        let path = match &cli.file {
            Some(p) => p.clone(),
            None => cwd.join(&config.timeline.default_file),
        };
        Ok(Context {
            path,
            config,
            json: cli.json,
        })
    }

    fn load(&self) -> CmdResult<Timeline> {
        Ok(timeline_io::load(&self.path, self.config.layout)?)
    }

    /// Lock, load, apply `f`, save
    fn mutate<T>(&self, f: impl FnOnce(&mut Timeline) -> CmdResult<T>) -> CmdResult<T> {
        let _lock = FileLock::acquire_default(&self.path)?;
        let mut tl = self.load()?;
        let out = f(&mut tl)?;
        timeline_io::save(&self.path, &mut tl)?;
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(ctx: &Context, command: Commands) -> CmdResult {
    match command {
        Commands::New(args) => cmd_new(ctx, args),
        Commands::Tree => cmd_tree(ctx),
        Commands::Add(args) => cmd_add(ctx, args),
        Commands::Rename(args) => cmd_rename(ctx, args),
        Commands::Rm(args) => cmd_rm(ctx, args),
        Commands::Mv(args) => cmd_mv(ctx, args),
        Commands::Expand(args) => cmd_expand(ctx, args, true),
        Commands::Collapse(args) => cmd_expand(ctx, args, false),
        Commands::Mute(args) => cmd_mute(ctx, args),
        Commands::Media(args) => cmd_media(ctx, args.action),
        Commands::Check => cmd_check(ctx),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn find_track(tl: &Timeline, name: &str) -> CmdResult<TrackId> {
    tl.find_by_name(name)
        .ok_or_else(|| format!("track not found: {}", name).into())
}

fn media_at(tl: &Timeline, track: TrackId, index: usize) -> CmdResult<MediaId> {
    let t = tl.track(track).ok_or(track_ops::TrackError::NotFound(track))?;
    t.media().get(index).copied().ok_or_else(|| {
        format!(
            "{} has {} media segment(s), no index {}",
            t.name,
            t.media().len(),
            index
        )
        .into()
    })
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_new(ctx: &Context, args: NewArgs) -> CmdResult {
    if ctx.path.exists() && !args.force {
        return Err(format!("{} already exists (use --force to overwrite)", display(&ctx.path)).into());
    }
    let fps = args.fps.unwrap_or(ctx.config.timeline.fps);
    if !(fps.is_finite() && fps > 0.0) {
        return Err(format!("invalid frame rate: {}", fps).into());
    }
    let _lock = FileLock::acquire_default(&ctx.path)?;
    let mut tl = Timeline::new(fps, ctx.config.layout);
    timeline_io::save(&ctx.path, &mut tl)?;
    println!("{}", display(&ctx.path));
    Ok(())
}

fn cmd_tree(ctx: &Context) -> CmdResult {
    let tl = ctx.load()?;
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&timeline_to_json(&tl))?);
    } else if tl.track_count() == 0 {
        println!("(no tracks)");
    } else {
        print_lines(&format_tree(&tl));
    }
    Ok(())
}

fn cmd_add(ctx: &Context, args: AddArgs) -> CmdResult {
    let archetype = TrackArchetype::parse(&args.archetype)
        .ok_or_else(|| format!("unknown track kind: {}", args.archetype))?;
    let json = ctx.mutate(|tl| {
        let parent = args.parent.as_deref().map(|p| find_track(tl, p)).transpose()?;
        let base = args.name.as_deref().unwrap_or(archetype.default_name());
        let id = track_ops::spawn_named(tl, archetype, parent, base)?;
        Ok(track_to_json(tl, id))
    })?;
    if let Some(track) = json {
        if ctx.json {
            println!("{}", serde_json::to_string_pretty(&track)?);
        } else {
            println!("{}", track.name);
        }
    }
    Ok(())
}

fn cmd_rename(ctx: &Context, args: RenameArgs) -> CmdResult {
    let name = ctx.mutate(|tl| {
        let id = find_track(tl, &args.track)?;
        let kind = tl.archetype_of(id).ok_or(track_ops::TrackError::NotFound(id))?;
        if !kind.can_rename() {
            return Err(format!("{} tracks can't be renamed", kind).into());
        }
        track_ops::rename(tl, id, &args.name)?;
        Ok(tl.track(id).map(|t| t.name.clone()).unwrap_or_default())
    })?;
    println!("{}", name);
    Ok(())
}

fn cmd_rm(ctx: &Context, args: RmArgs) -> CmdResult {
    let deleted = ctx.mutate(|tl| {
        let ids = args
            .tracks
            .iter()
            .map(|n| find_track(tl, n))
            .collect::<CmdResult<Vec<_>>>()?;
        let before = tl.track_count();
        tl.with_layout_suspended(|tl| {
            for id in ids {
                // Already gone with an ancestor listed earlier
                tl.delete(id);
            }
        });
        Ok(before - tl.track_count())
    })?;
    println!("deleted {} track(s)", deleted);
    Ok(())
}

fn cmd_mv(ctx: &Context, args: MvArgs) -> CmdResult {
    let (target_name, position) = match (&args.above, &args.below, &args.into) {
        (Some(t), _, _) => (t, DragPosition::Above),
        (_, Some(t), _) => (t, DragPosition::Below),
        (_, _, Some(t)) => (t, DragPosition::At),
        _ => return Err("one of --above, --below or --into is required".into()),
    };
    let moved = ctx.mutate(|tl| {
        let target = find_track(tl, target_name)?;
        let names: IndexSet<&str> = args.tracks.iter().map(String::as_str).collect();
        for name in &names {
            find_track(tl, name)?;
        }
        let encoded = payload::encode(names.iter().copied());
        let candidates = controller::live_candidates(tl, target, &encoded, &default_predicate);
        if candidates.len() != names.len() {
            return Err("can't move a track onto itself or into its own subtree".into());
        }
        if !controller::validate_drop(tl, target, position, &candidates) {
            return Err(format!("{} can't take these tracks there", target_name).into());
        }
        Ok(controller::apply_drop(tl, target, position, &candidates)?)
    })?;
    println!("moved {} track(s)", moved);
    Ok(())
}

fn cmd_expand(ctx: &Context, args: ExpandArgs, expand: bool) -> CmdResult {
    ctx.mutate(|tl| {
        let targets = match (&args.track, args.all) {
            (Some(name), _) => vec![find_track(tl, name)?],
            (None, true) => tl.roots().to_vec(),
            (None, false) => return Err("name a track or pass --all".into()),
        };
        tl.with_layout_suspended(|tl| {
            for id in targets {
                match (expand, args.all) {
                    (true, true) => track_ops::expand_all(tl, id)?,
                    (true, false) => {
                        track_ops::expand(tl, id)?;
                    }
                    (false, true) => track_ops::collapse_all(tl, id)?,
                    (false, false) => {
                        track_ops::collapse(tl, id)?;
                    }
                }
            }
            Ok::<_, track_ops::TrackError>(())
        })?;
        Ok(())
    })
}

fn cmd_mute(ctx: &Context, args: MuteArgs) -> CmdResult {
    ctx.mutate(|tl| {
        let id = find_track(tl, &args.track)?;
        track_ops::set_muted(tl, id, !args.off)?;
        Ok(())
    })
}

fn cmd_media(ctx: &Context, action: MediaAction) -> CmdResult {
    match action {
        MediaAction::Ls { track } => {
            let tl = ctx.load()?;
            let id = find_track(&tl, &track)?;
            if ctx.json {
                println!("{}", serde_json::to_string_pretty(&media_to_json(&tl, id))?);
            } else {
                let segments = tl.track(id).map(|t| t.media().to_vec()).unwrap_or_default();
                for (i, m) in segments.iter().filter_map(|&m| tl.media(m)).enumerate() {
                    println!("{}", format_media_line(i, m, tl.fps()));
                }
            }
            Ok(())
        }
        MediaAction::Add {
            track,
            start,
            duration,
        } => ctx.mutate(|tl| {
            let id = find_track(tl, &track)?;
            let kind = tl.archetype_of(id).ok_or(track_ops::TrackError::NotFound(id))?;
            if !kind.holds_media() {
                return Err(format!("{} tracks don't hold media", kind).into());
            }
            track_ops::add_media(tl, id, start, duration)?;
            Ok(())
        }),
        MediaAction::Rm { track, index } => ctx.mutate(|tl| {
            let id = find_track(tl, &track)?;
            let media = media_at(tl, id, index)?;
            track_ops::delete_media(tl, media)?;
            Ok(())
        }),
        MediaAction::Mv { track, index, to } => ctx.mutate(|tl| {
            let from = find_track(tl, &track)?;
            let dest = find_track(tl, &to)?;
            let kind = tl.archetype_of(dest).ok_or(track_ops::TrackError::NotFound(dest))?;
            if !kind.holds_media() {
                return Err(format!("{} tracks don't hold media", kind).into());
            }
            let media = media_at(tl, from, index)?;
            track_ops::attach_media(tl, dest, media)?;
            Ok(())
        }),
    }
}

fn cmd_check(ctx: &Context) -> CmdResult {
    let tl = ctx.load()?;
    let result = check::check_timeline(&tl);
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_lines(&format_check(&result));
    }
    if !result.valid {
        return Err(format!("{} error(s) found", result.errors.len()).into());
    }
    Ok(())
}
