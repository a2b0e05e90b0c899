//! Local command handlers.
//!
//! Each handler runs in the frame that received the key (or, for top-frame
//! commands, in the top frame after forwarding) and may return a mode for
//! the host to activate.

use std::collections::HashMap;

use keynav_dom::{Axis, ScrollAmount, ScrollTarget};
use keynav_types::error::Result;

use crate::bus::{BusMessage, FrameId};
use crate::command::{CommandDescriptor, CommandKind};
use crate::focus::{Activation, FocusCycler, NO_INPUTS_NOTICE, NO_INPUTS_NOTICE_MS};
use crate::host::Env;
use crate::links::find_and_follow;
use crate::mode::{DelegatedMode, InsertMode, Mode, NormalModeOptions};

/// Prefix that turns a URL into its source view.
pub const VIEW_SOURCE_PREFIX: &str = "view-source:";

/// Longest URL shown verbatim in the "Yanked" notice.
pub const YANK_DISPLAY_MAX: usize = 40;

/// How long the "Yanked" notice stays up.
pub const YANK_NOTICE_MS: u32 = 2000;

/// Arguments of one handler run.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'d> {
    /// Normalized repeat count.
    pub count: u32,
    pub descriptor: &'d CommandDescriptor,
    /// Frame that originated the command; for local runs, this frame.
    pub source_frame: FrameId,
}

pub type Handler = fn(&Invocation<'_>, &mut Env<'_>) -> Result<Option<Mode>>;

/// The local handler for a command, if it has one. Tab commands only run
/// in the background process and have none.
pub fn handler_for(kind: CommandKind) -> Option<Handler> {
    use CommandKind::*;
    let handler: Handler = match kind {
        ScrollToBottom => scroll_to_bottom,
        ScrollToTop => scroll_to_top,
        ScrollToLeft => scroll_to_left,
        ScrollToRight => scroll_to_right,
        ScrollUp => scroll_up,
        ScrollDown => scroll_down,
        ScrollPageUp => scroll_page_up,
        ScrollPageDown => scroll_page_down,
        ScrollFullPageUp => scroll_full_page_up,
        ScrollFullPageDown => scroll_full_page_down,
        ScrollLeft => scroll_left,
        ScrollRight => scroll_right,
        GoBack => go_back,
        GoForward => go_forward,
        GoUp => go_up,
        GoToRoot => go_to_root,
        ToggleViewSource => toggle_view_source,
        CopyCurrentUrl => copy_current_url,
        OpenCopiedUrlInNewTab => open_copied_url_in_new_tab,
        OpenCopiedUrlInCurrentTab => open_copied_url_in_current_tab,
        EnterInsertMode => enter_insert_mode,
        EnterVisualMode => enter_visual_mode,
        EnterVisualLineMode => enter_visual_line_mode,
        EnterFindMode => enter_find_mode,
        PerformFind => perform_find,
        PerformBackwardsFind => perform_backwards_find,
        FindSelected => find_selected,
        FindSelectedBackwards => find_selected_backwards,
        MainFrame => main_frame,
        ShowHelp => show_help,
        PassNextKey => pass_next_key,
        GoPrevious => go_previous,
        GoNext => go_next,
        FocusInput => focus_input,
        LinkHints(_) => link_hints,
        Vomnibar(_) => vomnibar,
        Marks(_) => marks,
        CreateTab | RemoveTab | RestoreTab | NextTab | PreviousTab | CloseTabsOnLeft
        | CloseTabsOnRight => return None,
    };
    Some(handler)
}

/// Handlers for every command that has one, resolved once.
pub fn handler_table() -> HashMap<CommandKind, Handler> {
    CommandKind::all()
        .into_iter()
        .filter_map(|kind| handler_for(kind).map(|h| (kind, h)))
        .collect()
}

// ---------------------------------------------------------------------------
// URL helpers
// ---------------------------------------------------------------------------

/// `url` with `count` trailing path segments removed, never going above
/// the host. `None` when already at the root.
pub fn parent_url(url: &str, count: u32) -> Option<String> {
    let url = url.strip_suffix('/').unwrap_or(url);
    let parts: Vec<&str> = url.split('/').collect();
    if parts.len() <= 3 {
        return None;
    }
    let keep = parts.len().saturating_sub(count as usize).max(3);
    Some(parts[..keep].join("/"))
}

/// `scheme://host[:port]` of an absolute URL.
pub fn origin_of(url: &str) -> Option<String> {
    let host_start = url.find("://")? + 3;
    let host_end = url[host_start..]
        .find(['/', '?', '#'])
        .map_or(url.len(), |i| host_start + i);
    Some(url[..host_end].to_string())
}

/// Add or strip the `view-source:` prefix.
pub fn toggle_view_source_url(url: &str) -> String {
    match url.strip_prefix(VIEW_SOURCE_PREFIX) {
        Some(rest) => rest.to_string(),
        None => format!("{VIEW_SOURCE_PREFIX}{url}"),
    }
}

/// The notice shown after copying `url`.
pub fn yank_notice(url: &str) -> String {
    if url.chars().count() > YANK_DISPLAY_MAX {
        let head: String = url.chars().take(YANK_DISPLAY_MAX - 2).collect();
        format!("Yanked {head}...")
    } else {
        format!("Yanked {url}")
    }
}

fn signed(count: u32) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

fn step(inv: &Invocation<'_>, env: &Env<'_>) -> i32 {
    env.settings.scroll_step_size.saturating_mul(signed(inv.count))
}

// ---------------------------------------------------------------------------
// Scrolling
// ---------------------------------------------------------------------------

fn scroll_to_bottom(_: &Invocation<'_>, env: &mut Env<'_>) -> Result<Option<Mode>> {
    env.frame.record_previous_position();
    env.frame.scroll_to(Axis::Y, ScrollTarget::Max);
    Ok(None)
}

fn scroll_to_top(inv: &Invocation<'_>, env: &mut Env<'_>) -> Result<Option<Mode>> {
    env.frame.record_previous_position();
    let offset = env
        .settings
        .scroll_step_size
        .saturating_mul(signed(inv.count) - 1);
    env.frame.scroll_to(Axis::Y, ScrollTarget::Offset(offset));
    Ok(None)
}

fn scroll_to_left(_: &Invocation<'_>, env: &mut Env<'_>) -> Result<Option<Mode>> {
    env.frame.scroll_to(Axis::X, ScrollTarget::Offset(0));
    Ok(None)
}

fn scroll_to_right(_: &Invocation<'_>, env: &mut Env<'_>) -> Result<Option<Mode>> {
    env.frame.scroll_to(Axis::X, ScrollTarget::Max);
    Ok(None)
}

fn scroll_up(inv: &Invocation<'_>, env: &mut Env<'_>) -> Result<Option<Mode>> {
    let by = -step(inv, env);
    env.frame.scroll_by(Axis::Y, ScrollAmount::Pixels(by));
    Ok(None)
}

fn scroll_down(inv: &Invocation<'_>, env: &mut Env<'_>) -> Result<Option<Mode>> {
    let by = step(inv, env);
    env.frame.scroll_by(Axis::Y, ScrollAmount::Pixels(by));
    Ok(None)
}

fn scroll_left(inv: &Invocation<'_>, env: &mut Env<'_>) -> Result<Option<Mode>> {
    let by = -step(inv, env);
    env.frame.scroll_by(Axis::X, ScrollAmount::Pixels(by));
    Ok(None)
}

fn scroll_right(inv: &Invocation<'_>, env: &mut Env<'_>) -> Result<Option<Mode>> {
    let by = step(inv, env);
    env.frame.scroll_by(Axis::X, ScrollAmount::Pixels(by));
    Ok(None)
}

fn scroll_views(inv: &Invocation<'_>, env: &mut Env<'_>, views: f32) -> Result<Option<Mode>> {
    env.frame
        .scroll_by(Axis::Y, ScrollAmount::ViewSize(views * inv.count as f32));
    Ok(None)
}

fn scroll_page_up(inv: &Invocation<'_>, env: &mut Env<'_>) -> Result<Option<Mode>> {
    scroll_views(inv, env, -0.5)
}

fn scroll_page_down(inv: &Invocation<'_>, env: &mut Env<'_>) -> Result<Option<Mode>> {
    scroll_views(inv, env, 0.5)
}

fn scroll_full_page_up(inv: &Invocation<'_>, env: &mut Env<'_>) -> Result<Option<Mode>> {
    scroll_views(inv, env, -1.0)
}

fn scroll_full_page_down(inv: &Invocation<'_>, env: &mut Env<'_>) -> Result<Option<Mode>> {
    scroll_views(inv, env, 1.0)
}

// ---------------------------------------------------------------------------
// History and URL
// ---------------------------------------------------------------------------

fn go_back(inv: &Invocation<'_>, env: &mut Env<'_>) -> Result<Option<Mode>> {
    env.frame.history_go(-signed(inv.count));
    Ok(None)
}

fn go_forward(inv: &Invocation<'_>, env: &mut Env<'_>) -> Result<Option<Mode>> {
    env.frame.history_go(signed(inv.count));
    Ok(None)
}

fn go_up(inv: &Invocation<'_>, env: &mut Env<'_>) -> Result<Option<Mode>> {
    if let Some(url) = parent_url(&env.frame.location(), inv.count) {
        log::info!("Going up to {url}");
        env.frame.set_location(&url);
    }
    Ok(None)
}

fn go_to_root(_: &Invocation<'_>, env: &mut Env<'_>) -> Result<Option<Mode>> {
    if let Some(origin) = origin_of(&env.frame.location()) {
        env.frame.set_location(&origin);
    }
    Ok(None)
}

fn toggle_view_source(_: &Invocation<'_>, env: &mut Env<'_>) -> Result<Option<Mode>> {
    let url = toggle_view_source_url(&env.frame.location());
    env.bus.send(BusMessage::OpenUrlInNewTab {
        url,
        position: None,
        count: 1,
    });
    Ok(None)
}

fn copy_current_url(_: &Invocation<'_>, env: &mut Env<'_>) -> Result<Option<Mode>> {
    let url = env.frame.location();
    env.hud.copy_to_clipboard(&url);
    env.hud.show(&yank_notice(&url), YANK_NOTICE_MS);
    Ok(None)
}

fn open_copied_url_in_new_tab(inv: &Invocation<'_>, env: &mut Env<'_>) -> Result<Option<Mode>> {
    if let Some(url) = env.hud.paste_from_clipboard() {
        env.bus.send(BusMessage::OpenUrlInNewTab {
            url,
            position: inv.descriptor.options.position,
            count: inv.count,
        });
    }
    Ok(None)
}

fn open_copied_url_in_current_tab(_: &Invocation<'_>, env: &mut Env<'_>) -> Result<Option<Mode>> {
    if let Some(url) = env.hud.paste_from_clipboard() {
        env.bus.send(BusMessage::OpenUrlInCurrentTab { url });
    }
    Ok(None)
}

// ---------------------------------------------------------------------------
// Modes and find
// ---------------------------------------------------------------------------

fn enter_insert_mode(_: &Invocation<'_>, _: &mut Env<'_>) -> Result<Option<Mode>> {
    Ok(Some(Mode::Insert(InsertMode::global())))
}

fn enter_visual_mode(_: &Invocation<'_>, _: &mut Env<'_>) -> Result<Option<Mode>> {
    Ok(Some(Mode::Visual { line: false }))
}

fn enter_visual_line_mode(_: &Invocation<'_>, _: &mut Env<'_>) -> Result<Option<Mode>> {
    Ok(Some(Mode::Visual { line: true }))
}

fn enter_find_mode(_: &Invocation<'_>, env: &mut Env<'_>) -> Result<Option<Mode>> {
    env.frame.record_previous_position();
    Ok(Some(Mode::Find))
}

fn perform_find(inv: &Invocation<'_>, env: &mut Env<'_>) -> Result<Option<Mode>> {
    for _ in 0..inv.count {
        env.finder.find_next(false);
    }
    Ok(None)
}

fn perform_backwards_find(inv: &Invocation<'_>, env: &mut Env<'_>) -> Result<Option<Mode>> {
    for _ in 0..inv.count {
        env.finder.find_next(true);
    }
    Ok(None)
}

fn find_selection(env: &mut Env<'_>, backwards: bool) -> Result<Option<Mode>> {
    let selection = env.frame.selection_text();
    if selection.is_empty() {
        return Ok(None);
    }
    env.finder.update_query(&selection);
    env.finder.save_query();
    env.finder.find_next(backwards);
    Ok(None)
}

fn find_selected(_: &Invocation<'_>, env: &mut Env<'_>) -> Result<Option<Mode>> {
    find_selection(env, false)
}

fn find_selected_backwards(_: &Invocation<'_>, env: &mut Env<'_>) -> Result<Option<Mode>> {
    find_selection(env, true)
}

// ---------------------------------------------------------------------------
// Misc
// ---------------------------------------------------------------------------

fn main_frame(_: &Invocation<'_>, _: &mut Env<'_>) -> Result<Option<Mode>> {
    Ok(Some(Mode::Delegated(DelegatedMode::MainFrame)))
}

fn show_help(inv: &Invocation<'_>, _: &mut Env<'_>) -> Result<Option<Mode>> {
    Ok(Some(Mode::Delegated(DelegatedMode::HelpDialog {
        source_frame: inv.source_frame,
    })))
}

fn pass_next_key(inv: &Invocation<'_>, _: &mut Env<'_>) -> Result<Option<Mode>> {
    if inv.descriptor.options.normal {
        return Ok(Some(Mode::Normal(NormalModeOptions::pass_keys_disabled(
            inv.count,
        ))));
    }
    Ok(Some(Mode::PassNextKey { count: inv.count }))
}

fn go_previous(_: &Invocation<'_>, env: &mut Env<'_>) -> Result<Option<Mode>> {
    let phrases = env.settings.previous_phrases();
    if find_and_follow(env.frame, "prev", &phrases).is_none() {
        log::debug!("No previous-page link found");
    }
    Ok(None)
}

fn go_next(_: &Invocation<'_>, env: &mut Env<'_>) -> Result<Option<Mode>> {
    let phrases = env.settings.next_phrases();
    if find_and_follow(env.frame, "next", &phrases).is_none() {
        log::debug!("No next-page link found");
    }
    Ok(None)
}

fn focus_input(inv: &Invocation<'_>, env: &mut Env<'_>) -> Result<Option<Mode>> {
    let scroll = env.frame.scroll_offset();
    match FocusCycler::activate(env.frame, inv.count, scroll) {
        Activation::NoInputs => {
            env.hud.show(NO_INPUTS_NOTICE, NO_INPUTS_NOTICE_MS);
            Ok(None)
        },
        Activation::Finished(handoff) => Ok(handoff.map(Mode::Insert)),
        Activation::Active(cycler) => Ok(Some(Mode::FocusInput(cycler))),
    }
}

fn link_hints(inv: &Invocation<'_>, _: &mut Env<'_>) -> Result<Option<Mode>> {
    let CommandKind::LinkHints(action) = inv.descriptor.command else {
        return Ok(None);
    };
    Ok(Some(Mode::Delegated(DelegatedMode::LinkHints {
        action,
        count: inv.count,
    })))
}

fn vomnibar(inv: &Invocation<'_>, _: &mut Env<'_>) -> Result<Option<Mode>> {
    let CommandKind::Vomnibar(action) = inv.descriptor.command else {
        return Ok(None);
    };
    Ok(Some(Mode::Delegated(DelegatedMode::Vomnibar {
        action,
        source_frame: inv.source_frame,
    })))
}

fn marks(inv: &Invocation<'_>, _: &mut Env<'_>) -> Result<Option<Mode>> {
    let CommandKind::Marks(action) = inv.descriptor.command else {
        return Ok(None);
    };
    Ok(Some(Mode::Delegated(DelegatedMode::Marks { action })))
}
