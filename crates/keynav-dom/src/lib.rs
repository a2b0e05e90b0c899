//! Page model for keynav.
//!
//! Normal-mode logic never touches a real browser DOM directly. It talks to
//! the [`Page`] and [`Window`] services defined here; [`MemoryPage`] is an
//! arena-backed implementation used by tests and the demo binary, and
//! [`PageFixture`] builds one from a TOML description.

pub mod dom;
pub mod fixture;
pub mod history;
pub mod memory;
pub mod page;
pub mod scroll;

pub use dom::{ComputedStyle, Display, Document, ElementData, NodeId, Rect, TagName, Visibility};
pub use fixture::PageFixture;
pub use memory::MemoryPage;
pub use page::{Frame, Marker, OverlayId, Page, Window};
pub use scroll::{Axis, ScrollAmount, ScrollTarget};
