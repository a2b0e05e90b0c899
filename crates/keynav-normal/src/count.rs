//! Repeat-count normalization.

use crate::command::{CommandDescriptor, CommandKind};

/// Turn the typed count into the count a command runs with.
///
/// The static multiplier applies first, then the default of 1 (except for
/// commands that give an absent count its own meaning), then `noRepeat`.
/// A typed zero is treated as 1.
pub fn normalize_count(descriptor: &CommandDescriptor, raw: Option<u32>) -> Option<u32> {
    let options = &descriptor.options;
    let mut count = raw.map(|n| n.max(1));
    if let Some(multiplier) = options.count {
        count = Some(count.unwrap_or(1).saturating_mul(multiplier.max(1)));
    }
    if count.is_none() && !descriptor.command.allows_null_count() {
        count = Some(1);
    }
    if options.no_repeat && count.is_some() {
        count = Some(1);
    }
    count
}

/// Whether the count exceeds the command's repeat limit.
pub fn needs_confirmation(descriptor: &CommandDescriptor, count: Option<u32>) -> bool {
    matches!(
        (descriptor.options.repeat_limit, count),
        (Some(limit), Some(n)) if n > limit
    )
}

/// The confirmation question for a large repeat count.
pub fn repeat_prompt(product: &str, count: u32, command: CommandKind) -> String {
    format!(
        "You have asked {product} to perform {count} repetitions of the command \"{}\". \
         Are you sure you want to continue?",
        command.name()
    )
}
