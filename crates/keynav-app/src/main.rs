//! keynav command-line driver.
//!
//! Loads a page fixture, feeds it a sequence of keys through normal mode,
//! and prints where the page ended up along with every message sent to the
//! top frame or the background. Set `RUST_LOG=debug` for a trace of each
//! key.

mod args;
mod host;
mod session;

use anyhow::{Context, Result};

use args::Args;
use host::ConsoleHost;
use keynav_dom::PageFixture;
use keynav_normal::{FrameId, FrameInfo, KeyMappings};
use keynav_types::settings::Settings;
use session::Session;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse(std::env::args().skip(1))?;

    let page = PageFixture::load(&args.page)
        .and_then(PageFixture::into_page)
        .with_context(|| format!("loading page {}", args.page.display()))?;

    let settings = match &args.settings {
        Some(path) => Settings::load(path)
            .with_context(|| format!("loading settings {}", path.display()))?,
        None => Settings::default(),
    };

    let mappings = match &args.mappings {
        Some(path) => KeyMappings::load(path)
            .with_context(|| format!("loading mappings {}", path.display()))?,
        None => KeyMappings::defaults(),
    };
    log::info!("Loaded {} key mappings", mappings.len());

    let frame = if args.ui_component {
        FrameInfo::ui_component(FrameId(args.frame_id))
    } else {
        FrameInfo::page(FrameId(args.frame_id))
    };

    let mut session = Session::new(page, ConsoleHost::new(settings, args.prompt), mappings, frame);
    for token in &args.keys {
        log::debug!("Feeding {token:?}");
        session.feed_token(token)?;
    }

    for line in session.summary() {
        println!("{line}");
    }
    for message in &session.host.bus.sent {
        println!("{}", serde_json::to_string(message)?);
    }
    session.finish();
    Ok(())
}
