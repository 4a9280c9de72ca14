use crate::model::archetype::TrackArchetype;
use crate::model::timeline::Timeline;
use crate::model::track::TrackId;
use crate::ops::track_ops::{self, TrackError};

/// An action offered by a track's context menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackCommand {
    Rename,
    Delete,
    ExpandAll,
    CollapseAll,
    AddChild(TrackArchetype),
    ToggleMute,
    ToggleLoop,
}

/// Host-side menu construction. The host decides how entries look.
pub trait MenuBuilder {
    fn add_command(&mut self, label: &str, command: TrackCommand);
    fn add_separator(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    Command { label: String, command: TrackCommand },
    Separator,
}

/// Plain list of entries, for hosts that render menus themselves
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MenuItems {
    pub entries: Vec<MenuEntry>,
}

impl MenuItems {
    pub fn commands(&self) -> impl Iterator<Item = (&str, TrackCommand)> {
        self.entries.iter().filter_map(|e| match e {
            MenuEntry::Command { label, command } => Some((label.as_str(), *command)),
            MenuEntry::Separator => None,
        })
    }
}

impl MenuBuilder for MenuItems {
    fn add_command(&mut self, label: &str, command: TrackCommand) {
        self.entries.push(MenuEntry::Command {
            label: label.to_string(),
            command,
        });
    }

    fn add_separator(&mut self) {
        self.entries.push(MenuEntry::Separator);
    }
}

/// Fill `menu` with the commands available on `id`
pub fn build_context_menu(tl: &Timeline, id: TrackId, menu: &mut dyn MenuBuilder) {
    let Some(track) = tl.track(id) else {
        return;
    };
    if track.archetype.can_rename() {
        menu.add_command("Rename", TrackCommand::Rename);
    }
    menu.add_command("Delete", TrackCommand::Delete);
    if track.can_expand() {
        menu.add_separator();
        menu.add_command("Expand All", TrackCommand::ExpandAll);
        menu.add_command("Collapse All", TrackCommand::CollapseAll);
    }

    let children: Vec<TrackArchetype> = TrackArchetype::ALL
        .into_iter()
        .filter(|c| track.archetype.can_add_child_track(*c))
        .collect();
    if !children.is_empty() {
        menu.add_separator();
        for child in children {
            menu.add_command(&format!("Add {}", child), TrackCommand::AddChild(child));
        }
    }

    menu.add_separator();
    menu.add_command(
        if track.muted { "Unmute" } else { "Mute" },
        TrackCommand::ToggleMute,
    );
    menu.add_command(
        if track.looped { "Disable Loop" } else { "Loop" },
        TrackCommand::ToggleLoop,
    );
}

/// Result of running a menu command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Done,
    /// The host must prompt for a new name
    NeedsRename,
    Spawned(TrackId),
}

/// Run a command that needs no further input from the user
pub fn execute(
    tl: &mut Timeline,
    id: TrackId,
    command: TrackCommand,
) -> Result<CommandOutcome, TrackError> {
    let track = tl.track(id).ok_or(TrackError::NotFound(id))?;
    let (muted, looped) = (track.muted, track.looped);
    match command {
        TrackCommand::Rename => return Ok(CommandOutcome::NeedsRename),
        TrackCommand::Delete => track_ops::delete(tl, id)?,
        TrackCommand::ExpandAll => track_ops::expand_all(tl, id)?,
        TrackCommand::CollapseAll => track_ops::collapse_all(tl, id)?,
        TrackCommand::AddChild(kind) => {
            let child = track_ops::spawn_track(tl, kind, Some(id))?;
            tl.select(child, false);
            return Ok(CommandOutcome::Spawned(child));
        }
        TrackCommand::ToggleMute => {
            track_ops::set_muted(tl, id, !muted)?;
        }
        TrackCommand::ToggleLoop => {
            track_ops::set_looped(tl, id, !looped)?;
        }
    }
    Ok(CommandOutcome::Done)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::LayoutConfig;
    use insta::assert_snapshot;

    fn labels(items: &MenuItems) -> String {
        items
            .entries
            .iter()
            .map(|e| match e {
                MenuEntry::Command { label, .. } => label.clone(),
                MenuEntry::Separator => "---".to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn actor_menu_lists_member_kinds() {
        let mut tl = Timeline::new(30.0, LayoutConfig::default());
        let actor = track_ops::spawn_track(&mut tl, TrackArchetype::Actor, None).unwrap();
        track_ops::spawn_track(&mut tl, TrackArchetype::Script, Some(actor)).unwrap();

        let mut items = MenuItems::default();
        build_context_menu(&tl, actor, &mut items);
        assert_snapshot!(labels(&items), @r"
        Rename
        Delete
        ---
        Expand All
        Collapse All
        ---
        Add Script
        Add Property
        Add Event
        ---
        Mute
        Loop
        ");
    }

    #[test]
    fn member_tracks_cannot_be_renamed() {
        let mut tl = Timeline::new(30.0, LayoutConfig::default());
        let actor = track_ops::spawn_track(&mut tl, TrackArchetype::Actor, None).unwrap();
        let prop = track_ops::spawn_track(&mut tl, TrackArchetype::Property, Some(actor)).unwrap();

        let mut items = MenuItems::default();
        build_context_menu(&tl, prop, &mut items);
        let commands: Vec<TrackCommand> = items.commands().map(|(_, c)| c).collect();
        assert_eq!(
            commands,
            vec![
                TrackCommand::Delete,
                TrackCommand::ToggleMute,
                TrackCommand::ToggleLoop
            ]
        );
    }

    #[test]
    fn execute_add_child_selects_new_track() {
        let mut tl = Timeline::new(30.0, LayoutConfig::default());
        let folder = track_ops::spawn_track(&mut tl, TrackArchetype::Folder, None).unwrap();
        let outcome = execute(&mut tl, folder, TrackCommand::AddChild(TrackArchetype::Audio)).unwrap();
        let CommandOutcome::Spawned(child) = outcome else {
            panic!("expected a spawned track, got {outcome:?}");
        };
        assert_eq!(tl.parent_of(child), Some(folder));
        assert!(tl.is_selected(child));

        execute(&mut tl, folder, TrackCommand::ToggleMute).unwrap();
        assert!(tl.track(folder).unwrap().muted);
        assert_eq!(
            execute(&mut tl, folder, TrackCommand::Rename).unwrap(),
            CommandOutcome::NeedsRename
        );
    }
}
