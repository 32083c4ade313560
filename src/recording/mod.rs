// Turning key presses at a playback position into annotation intervals

pub mod keymap;
pub mod multi_state;
pub mod session;
pub mod workspace;

pub use keymap::{KeyAction, KeyBinding, Keymap, default_bindings};
pub use multi_state::MultiStateGazeSession;
pub use session::{RecordingEvent, RecordingSession, RecordingState, Transition, reduce};
pub use workspace::{
    AnnotationWorkspace, EventOutcome, ImportTicket, PlaybackCursor, SessionId, WorkspaceEvent,
};
