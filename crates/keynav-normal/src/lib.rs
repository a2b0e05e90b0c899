//! Normal mode for keynav.
//!
//! Keys resolve through [`mappings::KeyResolver`] to command descriptors;
//! [`dispatch::CommandDispatcher`] normalizes the repeat count and runs the
//! command locally, in the top frame, or in the background process. The
//! pagination commands use the link matcher in [`links`], and `focusInput`
//! starts the [`focus::FocusCycler`].

pub mod bus;
pub mod command;
pub mod count;
pub mod dispatch;
pub mod focus;
pub mod handlers;
pub mod host;
pub mod links;
pub mod mappings;
pub mod mode;
pub mod normal;

#[cfg(test)]
pub(crate) mod test_utils;

pub use bus::{BusMessage, FrameId, FrameInfo, MessageBus};
pub use command::{CommandDescriptor, CommandKind, CommandOptions, TabPosition};
pub use dispatch::{CommandDispatcher, Dispatched};
pub use focus::{Activation, CycleOutcome, FocusCycler};
pub use host::{Env, Finder, Hud, Prompt};
pub use mappings::{KeyMappingProvider, KeyMappings, KeyResolver, SharedKeyMappings};
pub use mode::{DelegatedMode, InsertMode, Mode, NormalModeOptions};
pub use normal::{NormalMode, NormalOutcome};
