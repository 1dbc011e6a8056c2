//! Ports between the pipeline core and its platform collaborators.
//!
//! Everything that crosses a process or OS boundary sits behind one of
//! these traits so the state machines can be exercised against test
//! doubles that record calls instead of performing them.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::Result;

/// Places one image's bytes onto the system clipboard.
///
/// Implementations must provide at least one bitmap representation usable
/// by paste targets; richer secondary representations are best effort.
pub trait ClipboardImageWriter: Send + Sync {
    fn copy_image(&self, path: &Path) -> Result<()>;
}

/// Delivers a synthetic paste command to whichever application currently
/// holds input focus.
///
/// This crosses a process boundary outside the program's control: success
/// means the command was delivered, never that the paste landed.
#[async_trait]
pub trait PasteInjector: Send + Sync {
    async fn trigger_paste(&self) -> Result<()>;
}

/// Snapshot of the global modifier-key state at one poll tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModifierState {
    pub command: bool,
    pub option: bool,
}

impl ModifierState {
    /// The trigger chord: Command and Option held simultaneously.
    pub fn chord_held(&self) -> bool {
        self.command && self.option
    }
}

/// Reads the OS-global modifier-key state.
///
/// A failed read is a transient condition; callers log and keep polling.
pub trait ModifierStateSource: Send + Sync {
    fn read(&self) -> Result<ModifierState>;
}

/// External collaborator that renders one document page into an image
/// file inside the asset store's scratch directory.
///
/// The pipeline only consumes the resulting file paths, never page
/// content.
pub trait PageRenderer: Send + Sync {
    fn render_page(&self, page: u32, dpi: u32) -> Result<PathBuf>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chord_requires_both_keys() {
        assert!(!ModifierState::default().chord_held());
        assert!(!ModifierState {
            command: true,
            option: false
        }
        .chord_held());
        assert!(!ModifierState {
            command: false,
            option: true
        }
        .chord_held());
        assert!(ModifierState {
            command: true,
            option: true
        }
        .chord_held());
    }
}
