use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tl", about = concat!("trackline v", env!("CARGO_PKG_VERSION"), " - outline editor for timeline tracks"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Timeline file (default: `timeline.default_file` from the config)
    #[arg(short = 'f', long = "file", global = true)]
    pub file: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use this config file instead of the discovered one
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an empty timeline file
    New(NewArgs),
    /// Print the track tree
    Tree,
    /// Spawn a track
    Add(AddArgs),
    /// Rename a track (the name is sanitized and made unique)
    Rename(RenameArgs),
    /// Delete tracks with their children and media
    Rm(RmArgs),
    /// Move tracks next to or into another track
    Mv(MvArgs),
    /// Expand a track (and its ancestors)
    Expand(ExpandArgs),
    /// Collapse a track
    Collapse(ExpandArgs),
    /// Mute or unmute a track
    Mute(MuteArgs),
    /// List or edit a track's media segments
    Media(MediaCmd),
    /// Validate the track tree
    Check,
}

#[derive(Args)]
pub struct NewArgs {
    /// Frame rate (default: `timeline.fps` from the config)
    #[arg(long)]
    pub fps: Option<f32>,
    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct AddArgs {
    /// Track kind: folder, actor, script, property, event, audio, screen-fade, camera-cut
    pub archetype: String,
    /// Base name (default: the kind's display name)
    pub name: Option<String>,
    /// Parent track (default: root level)
    #[arg(long)]
    pub parent: Option<String>,
}

#[derive(Args)]
pub struct RenameArgs {
    pub track: String,
    pub name: String,
}

#[derive(Args)]
pub struct RmArgs {
    #[arg(required = true)]
    pub tracks: Vec<String>,
}

#[derive(Args)]
#[command(group(clap::ArgGroup::new("position").required(true).args(["above", "below", "into"])))]
pub struct MvArgs {
    /// Tracks to move, in the order they should land
    #[arg(required = true)]
    pub tracks: Vec<String>,
    /// Insert as siblings before this track
    #[arg(long, value_name = "TRACK")]
    pub above: Option<String>,
    /// Insert as siblings after this track
    #[arg(long, value_name = "TRACK")]
    pub below: Option<String>,
    /// Append as the last children of this track
    #[arg(long, value_name = "TRACK")]
    pub into: Option<String>,
}

#[derive(Args)]
pub struct ExpandArgs {
    /// Track to change (with --all and no track: every root)
    pub track: Option<String>,
    /// Apply to the whole subtree
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct MuteArgs {
    pub track: String,
    /// Unmute instead
    #[arg(long)]
    pub off: bool,
}

#[derive(Args)]
pub struct MediaCmd {
    #[command(subcommand)]
    pub action: MediaAction,
}

#[derive(Subcommand)]
pub enum MediaAction {
    /// List a track's segments
    Ls { track: String },
    /// Add a segment (frames)
    Add {
        track: String,
        start: u32,
        duration: u32,
    },
    /// Delete the segment at INDEX
    Rm { track: String, index: usize },
    /// Hand the segment at INDEX over to another track
    Mv {
        track: String,
        index: usize,
        to: String,
    },
}
