mod commands;

pub use commands::PathCommand;

use bevy::prelude::*;

use crate::error::PathEditError;
use crate::path::{BezierPath, PathPlugin};

/// Settings for the path editor.
#[derive(Resource, Debug, Clone)]
pub struct EditorSettings {
    /// Whether the editor applies incoming commands.
    pub enabled: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl EditorSettings {
    /// Toggle the editor on/off.
    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }
}

/// Request to run a [`PathCommand`] on a path entity.
#[derive(Message, Debug, Clone)]
pub struct PathCommandMessage {
    /// The entity with the BezierPath component.
    pub path: Entity,
    /// The edit to apply.
    pub command: PathCommand,
}

/// Message emitted when a command could not be applied.
#[derive(Message, Debug, Clone)]
pub struct PathCommandRejected {
    /// The entity the command targeted.
    pub path: Entity,
    /// The command that was rejected.
    pub command: PathCommand,
    /// Why it was rejected.
    pub reason: PathEditError,
}

/// System that applies queued path commands in arrival order.
pub fn apply_path_commands(
    settings: Res<EditorSettings>,
    mut requests: MessageReader<PathCommandMessage>,
    mut paths: Query<&mut BezierPath>,
    mut rejected: MessageWriter<PathCommandRejected>,
) {
    if !settings.enabled {
        requests.clear();
        return;
    }

    for request in requests.read() {
        let Ok(mut path) = paths.get_mut(request.path) else {
            warn!("path command {:?} targets missing path {}", request.command, request.path);
            continue;
        };

        match request.command.apply(&mut path) {
            Ok(()) if request.command.is_structural() => {
                debug!(
                    "{:?} on {}: {} segments",
                    request.command,
                    request.path,
                    path.number_of_segments()
                );
            }
            Ok(()) => {}
            Err(reason) => {
                warn!("rejected {:?} on {}: {reason}", request.command, request.path);
                rejected.write(PathCommandRejected {
                    path: request.path,
                    command: request.command,
                    reason,
                });
            }
        }
    }
}

/// Plugin that applies [`PathCommandMessage`]s to paths.
///
/// Front ends (input handling, UI, scripting) write commands; this plugin
/// applies them and reports the ones that were rejected.
///
/// # Disabling
/// Use the `EditorSettings` resource to enable/disable the editor:
/// ```ignore
/// fn toggle_editor(mut settings: ResMut<EditorSettings>) {
///     settings.toggle();
/// }
/// ```
pub struct PathEditorPlugin;

impl Plugin for PathEditorPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<PathPlugin>() {
            app.add_plugins(PathPlugin);
        }

        app.init_resource::<EditorSettings>()
            .add_message::<PathCommandMessage>()
            .add_message::<PathCommandRejected>()
            .add_systems(Update, apply_path_commands.before(crate::path::ease_path_normals));
    }
}
