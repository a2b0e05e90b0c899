//! Command dispatch: count normalization, confirmation, and routing.
//!
//! A resolved command runs in exactly one place. Top-frame commands are
//! forwarded to the page's outermost frame, background commands to the
//! background process, and everything else runs here through the handler
//! table.

use std::collections::HashMap;

use keynav_types::error::{KeynavError, Result};

use crate::bus::{BusMessage, FrameId, FrameInfo};
use crate::command::{CommandDescriptor, CommandKind};
use crate::count::{needs_confirmation, normalize_count, repeat_prompt};
use crate::handlers::{Handler, Invocation, handler_table};
use crate::host::Env;
use crate::mode::Mode;

/// Where a dispatched command ended up.
#[derive(Debug)]
pub enum Dispatched {
    /// The user declined the repeat-limit confirmation. Nothing happened.
    Aborted,
    ForwardedToTopFrame,
    ForwardedToBackground,
    /// Ran locally; the mode, if any, should become active.
    Ran(Option<Mode>),
}

/// Routes commands for one frame.
pub struct CommandDispatcher {
    frame: FrameInfo,
    handlers: HashMap<CommandKind, Handler>,
}

impl CommandDispatcher {
    pub fn new(frame: FrameInfo) -> Self {
        Self {
            frame,
            handlers: handler_table(),
        }
    }

    pub fn frame(&self) -> FrameInfo {
        self.frame
    }

    pub fn has_local_handler(&self, kind: CommandKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Normalize the count, confirm large repeats, and route the command.
    pub fn dispatch(
        &self,
        descriptor: &CommandDescriptor,
        raw_count: Option<u32>,
        env: &mut Env<'_>,
    ) -> Result<Dispatched> {
        let count = normalize_count(descriptor, raw_count);

        if needs_confirmation(descriptor, count)
            && let Some(n) = count
        {
            let question = repeat_prompt(&env.settings.product_name, n, descriptor.command);
            if !env.prompt.confirm(&question) {
                log::debug!("{} x{n} declined", descriptor.command);
                return Ok(Dispatched::Aborted);
            }
        }

        let options = &descriptor.options;
        if options.top_frame {
            let origin_frame_id = self.frame.origin_id();
            log::debug!(
                "Forwarding {} to the top frame from frame {}",
                descriptor.command,
                origin_frame_id.0
            );
            env.bus.send(BusMessage::RunInTopFrame {
                origin_frame_id,
                descriptor: descriptor.clone(),
            });
            return Ok(Dispatched::ForwardedToTopFrame);
        }
        if options.background {
            log::debug!(
                "Forwarding {} to the background with count {count:?}",
                descriptor.command
            );
            env.bus.send(BusMessage::RunInBackground {
                descriptor: descriptor.clone(),
                count,
            });
            return Ok(Dispatched::ForwardedToBackground);
        }

        let mode = self.run_local(descriptor, count.unwrap_or(1), self.frame.origin_id(), env)?;
        Ok(Dispatched::Ran(mode))
    }

    /// Run a command forwarded to this (top) frame by `source_frame`.
    ///
    /// The forwarded descriptor carries no typed count, so the command runs
    /// with its static count only.
    pub fn run_in_top_frame(
        &self,
        source_frame: FrameId,
        descriptor: &CommandDescriptor,
        env: &mut Env<'_>,
    ) -> Result<Option<Mode>> {
        let count = normalize_count(descriptor, None).unwrap_or(1);
        self.run_local(descriptor, count, source_frame, env)
    }

    fn run_local(
        &self,
        descriptor: &CommandDescriptor,
        count: u32,
        source_frame: FrameId,
        env: &mut Env<'_>,
    ) -> Result<Option<Mode>> {
        let handler = self.handlers.get(&descriptor.command).ok_or_else(|| {
            KeynavError::Command(format!("{} has no local handler", descriptor.command))
        })?;
        log::debug!("Running {} x{count}", descriptor.command);
        let invocation = Invocation {
            count,
            descriptor,
            source_frame,
        };
        let mode = handler(&invocation, env)?;
        if let Some(mode) = &mode {
            log::info!("{} entered {} mode", descriptor.command, mode.name());
        }
        Ok(mode)
    }
}
