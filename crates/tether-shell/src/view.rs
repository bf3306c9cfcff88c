#![forbid(unsafe_code)]

//! View nodes the shell commits, and the collaborator contracts it
//! consumes.
//!
//! The shell does not lay out or draw anything. It produces a [`View`]
//! describing *what* should be on screen; page layout, dialog content, and
//! theming are external collaborators reached through the traits below and
//! treated as black boxes.

use tether_client::Page;

/// An RGB color token supplied by the [`Theme`] collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Page background and text colors applied to every full-screen view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chrome {
    pub background: Color,
    pub text: Color,
}

/// Opaque handle to a laid-out page subtree, produced by [`PageLayout`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutNode(String);

impl LayoutNode {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Opaque handle to an active dialog, produced by [`DialogHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogNode(String);

impl DialogNode {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.0
    }
}

/// What the app shell shows, exactly one variant at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    /// No page yet: full-screen spinner.
    Loading { label: &'static str, chrome: Chrome },
    /// Transient not-found: content is expected to arrive; keep spinning.
    Waiting { label: &'static str, chrome: Chrome },
    /// Hard error, rendered verbatim.
    Error { message: String, chrome: Chrome },
    /// A server page, keyed so a new key forces a full remount of the
    /// layout subtree rather than an in-place diff.
    Ready {
        key: String,
        layout: LayoutNode,
        dialog: Option<DialogNode>,
        chrome: Chrome,
    },
}

impl View {
    /// The page key, when a page is showing.
    #[must_use]
    pub fn page_key(&self) -> Option<&str> {
        match self {
            View::Ready { key, .. } => Some(key),
            _ => None,
        }
    }
}

/// The busy overlay's output. The node is always present in the tree:
/// visibility tracks the busy flag, opacity tracks the debounced spinner.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayView {
    pub visible: bool,
    pub opacity: f32,
    pub label: &'static str,
}

// ---------------------------------------------------------------------------
// Collaborator contracts
// ---------------------------------------------------------------------------

/// Renders a page descriptor into a layout subtree.
pub trait PageLayout {
    fn render(&self, page: &Page) -> LayoutNode;
}

/// Renders an independent overlay keyed off shared state not modeled here.
pub trait DialogHost {
    fn active(&self) -> Option<DialogNode>;
}

/// Supplies color tokens.
pub trait Theme {
    fn page_background(&self) -> Color;
    fn text(&self) -> Color;
}

/// The hosting environment: the one place that can reload the whole
/// client.
pub trait Platform {
    /// Discard every piece of client state and start over. The component
    /// tree is about to be destroyed; nothing should run after this
    /// returns.
    fn reload(&self);
}
