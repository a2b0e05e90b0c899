//! Inter-frame and background messages.
//!
//! Sends are fire-and-forget: the dispatcher never waits on a reply. The
//! wire form is JSON with a `target` tag, matching what a host forwards over
//! its messaging port.

use serde::{Deserialize, Serialize};

use crate::command::{CommandDescriptor, TabPosition};

/// Identifier of a frame within a tab. `FrameId::UI_COMPONENT` stands in for
/// frames that are extension UI rather than page content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameId(pub u32);

impl FrameId {
    /// Sentinel origin for UI-only frames.
    pub const UI_COMPONENT: FrameId = FrameId(0);
}

/// Where a dispatcher runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    pub frame_id: FrameId,
    /// The frame hosts extension UI (help dialog, vomnibar) rather than a
    /// page. Its id is meaningless to the top frame.
    pub is_ui_component: bool,
}

impl FrameInfo {
    pub fn page(frame_id: FrameId) -> Self {
        Self {
            frame_id,
            is_ui_component: false,
        }
    }

    pub fn ui_component(frame_id: FrameId) -> Self {
        Self {
            frame_id,
            is_ui_component: true,
        }
    }

    /// The id to report as a message origin.
    pub fn origin_id(&self) -> FrameId {
        if self.is_ui_component {
            FrameId::UI_COMPONENT
        } else {
            self.frame_id
        }
    }
}

/// A message handed to the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "kebab-case")]
pub enum BusMessage {
    /// Ask the top-level frame to run the command.
    #[serde(rename_all = "camelCase")]
    RunInTopFrame {
        origin_frame_id: FrameId,
        descriptor: CommandDescriptor,
    },
    /// Ask the background process to run the command.
    #[serde(rename_all = "camelCase")]
    RunInBackground {
        descriptor: CommandDescriptor,
        count: Option<u32>,
    },
    #[serde(rename_all = "camelCase")]
    OpenUrlInNewTab {
        url: String,
        position: Option<TabPosition>,
        count: u32,
    },
    #[serde(rename_all = "camelCase")]
    OpenUrlInCurrentTab { url: String },
}

/// Transport for [`BusMessage`]s.
pub trait MessageBus {
    fn send(&mut self, message: BusMessage);
}
