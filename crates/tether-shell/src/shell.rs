#![forbid(unsafe_code)]

//! The app shell: owns page/error state, wires socket events to state
//! transitions, and handles hash routing and content-link events.
//!
//! State machine, represented by one wholesale-replaced content cell:
//!
//! | state | content | view |
//! |-------|---------|------|
//! | Loading | no page, no error | full-screen spinner |
//! | Waiting | error `"not_found"` | "waiting for content" spinner |
//! | Error | any other error | the literal error text |
//! | Ready | a page | keyed layout + dialog host |
//!
//! - `Data(page)` from *any* state yields Ready, clearing any prior error.
//! - `Err("not_found")` is a recoverable transient: the server is expected
//!   to eventually push `Data`; no client-side retry.
//! - Any other `Err` text is terminal for the current render.
//! - `Reset` forces exactly one full reload via [`Platform`]; client state
//!   cannot be trusted to resynchronize, so there is no reconnect path.
//!
//! `init` opens the socket session and registers the two environment
//! listeners; `dispose` releases exactly those listeners. Only one shell
//! is expected to be mounted at a time.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, warn};

use tether_client::{
    Client, ClientError, Connector, Session, SockEvent, SockMessageType, connect,
};
use tether_reactive::{BindingScope, Component, Emitter, Observable};

use crate::config::ShellConfig;
use crate::view::{Chrome, DialogHost, PageLayout, Platform, Theme, View};

/// Full-screen spinner label while no page has arrived.
pub const LOADING_LABEL: &str = "Loading ...";

/// Spinner label for the transient not-found state.
pub const WAITING_LABEL: &str = "Waiting for content...";

/// The error text that means "transient, keep waiting" rather than a hard
/// failure.
const NOT_FOUND: &str = "not_found";

/// Current page/error pair. Replaced wholesale on every transition, so a
/// new page always clears a stale error and vice versa.
#[derive(Debug, Clone, PartialEq, Default)]
struct Content {
    page: Option<tether_client::Page>,
    error: Option<String>,
}

/// Environment event channels the shell listens to.
///
/// The host emits into these: `hash_changed` carries the new URL fragment
/// (including the leading `#`), `link_clicked` carries the argument name a
/// content link names in its detail payload.
#[derive(Clone, Default)]
pub struct ShellEvents {
    pub hash_changed: Emitter<String>,
    pub link_clicked: Emitter<String>,
}

/// External collaborators the shell composes but never looks inside.
#[derive(Clone)]
pub struct Collaborators {
    pub connector: Rc<dyn Connector>,
    pub platform: Rc<dyn Platform>,
    pub layout: Rc<dyn PageLayout>,
    pub dialogs: Rc<dyn DialogHost>,
    pub theme: Rc<dyn Theme>,
}

/// Shared handle for feeding inbound socket frames to the shell's session.
#[derive(Clone)]
pub struct SessionHandle {
    session: Rc<RefCell<Option<Session>>>,
}

impl SessionHandle {
    /// Deliver one raw inbound frame.
    pub fn deliver(&self, raw: &str) -> Result<(), ClientError> {
        match self.session.borrow().as_ref() {
            Some(session) => Ok(session.handle_frame(raw)?),
            None => Err(ClientError::NotConnected),
        }
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.session.borrow().is_some()
    }
}

/// The root shell component.
pub struct AppShell {
    content: Observable<Content>,
    client: Client,
    config: ShellConfig,
    collab: Collaborators,
    events: ShellEvents,
    session: Rc<RefCell<Option<Session>>>,
    listeners: BindingScope,
}

impl AppShell {
    #[must_use]
    pub fn new(
        client: Client,
        config: ShellConfig,
        collab: Collaborators,
        events: ShellEvents,
    ) -> Self {
        Self {
            content: Observable::new(Content::default()),
            client,
            config,
            collab,
            events,
            session: Rc::new(RefCell::new(None)),
            listeners: BindingScope::new(),
        }
    }

    /// Handle for the host to feed inbound frames through.
    #[must_use]
    pub fn session_handle(&self) -> SessionHandle {
        SessionHandle {
            session: Rc::clone(&self.session),
        }
    }

    /// The sync client this shell drives.
    #[must_use]
    pub fn client(&self) -> Client {
        self.client.clone()
    }
}

impl Component for AppShell {
    type Output = View;

    fn render(&self) -> View {
        let chrome = Chrome {
            background: self.collab.theme.page_background(),
            text: self.collab.theme.text(),
        };
        self.content.with(|content| match content {
            Content {
                error: Some(error), ..
            } if error == NOT_FOUND => View::Waiting {
                label: WAITING_LABEL,
                chrome,
            },
            Content {
                error: Some(error), ..
            } => View::Error {
                message: error.clone(),
                chrome,
            },
            Content { page: None, .. } => View::Loading {
                label: LOADING_LABEL,
                chrome,
            },
            Content {
                page: Some(page), ..
            } => View::Ready {
                key: page.key.clone(),
                layout: self.collab.layout.render(page),
                dialog: self.collab.dialogs.active(),
                chrome,
            },
        })
    }

    fn init(&mut self) {
        let content = self.content.clone();
        let platform = Rc::clone(&self.collab.platform);
        let on_socket = move |event: SockEvent| match event {
            SockEvent::Data(page) => content.set(Content {
                page: Some(page),
                error: None,
            }),
            SockEvent::Message(SockMessageType::Err, text) => content.set(Content {
                page: None,
                error: Some(text),
            }),
            SockEvent::Message(kind, text) => debug!(?kind, %text, "inline message ignored"),
            SockEvent::Reset => platform.reload(),
        };
        match connect(
            &self.config.endpoint,
            self.collab.connector.as_ref(),
            self.client.clone(),
            on_socket,
        ) {
            Ok(session) => *self.session.borrow_mut() = Some(session),
            Err(err) => warn!(%err, "socket connect failed; staying in loading state"),
        }

        let client = self.client.clone();
        self.listeners
            .listen(&self.events.hash_changed, move |fragment: &String| {
                if fragment.len() > 1 {
                    client.set_arg("#", fragment[1..].to_owned());
                }
                if let Err(err) = client.sync() {
                    warn!(%err, "hash sync failed");
                }
            });

        let client = self.client.clone();
        self.listeners
            .listen(&self.events.link_clicked, move |name: &String| {
                // A later sync, triggered elsewhere, carries this to the
                // server.
                client.set_arg(name.clone(), true);
            });
    }

    fn dispose(&mut self) {
        self.listeners.clear();
        debug!("shell disposed");
    }
}

impl std::fmt::Debug for AppShell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let content = self.content.with(|c| c.clone());
        f.debug_struct("AppShell")
            .field("page", &content.page.as_ref().map(|p| p.key.clone()))
            .field("error", &content.error)
            .field("connected", &self.session.borrow().is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tether_client::Page;
    use tether_client::transport::testing::{LoopbackConnector, LoopbackTransport};
    use tether_reactive::{Mount, RenderScheduler};

    use crate::view::{Color, DialogNode, LayoutNode};

    struct TestLayout;
    impl PageLayout for TestLayout {
        fn render(&self, page: &Page) -> LayoutNode {
            LayoutNode::new(format!("layout:{}", page.key))
        }
    }

    struct TestDialogs;
    impl DialogHost for TestDialogs {
        fn active(&self) -> Option<DialogNode> {
            None
        }
    }

    struct TestTheme;
    impl Theme for TestTheme {
        fn page_background(&self) -> Color {
            Color::new(16, 16, 16)
        }
        fn text(&self) -> Color {
            Color::new(240, 240, 240)
        }
    }

    #[derive(Default)]
    struct TestPlatform {
        reloads: Cell<usize>,
    }
    impl Platform for TestPlatform {
        fn reload(&self) {
            self.reloads.set(self.reloads.get() + 1);
        }
    }

    struct Harness {
        sched: RenderScheduler,
        events: ShellEvents,
        platform: Rc<TestPlatform>,
        transport: LoopbackTransport,
        session: SessionHandle,
        views: Rc<RefCell<Vec<View>>>,
        mount: Mount<AppShell>,
    }

    fn mount_shell() -> Harness {
        let sched = RenderScheduler::new();
        let events = ShellEvents::default();
        let platform = Rc::new(TestPlatform::default());
        let connector = LoopbackConnector::new();
        let transport = connector.transport();
        let collab = Collaborators {
            connector: Rc::new(connector),
            platform: Rc::clone(&platform) as Rc<dyn Platform>,
            layout: Rc::new(TestLayout),
            dialogs: Rc::new(TestDialogs),
            theme: Rc::new(TestTheme),
        };
        let shell = AppShell::new(
            Client::new(),
            ShellConfig::default(),
            collab,
            events.clone(),
        );
        let session = shell.session_handle();
        let views = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&views);
        let mount = Mount::new(shell, &sched, move |view: &View| {
            sink.borrow_mut().push(view.clone())
        });
        Harness {
            sched,
            events,
            platform,
            transport,
            session,
            views,
            mount,
        }
    }

    fn last(h: &Harness) -> View {
        h.views.borrow().last().cloned().expect("at least one render")
    }

    fn deliver(h: &Harness, raw: &str) {
        h.session.deliver(raw).expect("valid frame");
        h.sched.flush();
    }

    #[test]
    fn starts_loading_and_connects() {
        let h = mount_shell();
        assert!(h.session.is_connected());
        assert!(matches!(
            last(&h),
            View::Loading {
                label: LOADING_LABEL,
                ..
            }
        ));
    }

    #[test]
    fn data_from_loading_yields_ready() {
        let h = mount_shell();
        deliver(&h, r#"{"t":"page","page":{"key":"home","body":{}}}"#);
        assert_eq!(last(&h).page_key(), Some("home"));
    }

    #[test]
    fn data_replaces_error_state() {
        let h = mount_shell();
        deliver(&h, r#"{"t":"msg","kind":"err","text":"boom"}"#);
        assert!(matches!(last(&h), View::Error { .. }));

        deliver(&h, r#"{"t":"page","page":{"key":"recovered"}}"#);
        assert_eq!(last(&h).page_key(), Some("recovered"));
    }

    #[test]
    fn not_found_from_ready_yields_waiting_not_error() {
        let h = mount_shell();
        deliver(&h, r#"{"t":"page","page":{"key":"home"}}"#);
        deliver(&h, r#"{"t":"msg","kind":"err","text":"not_found"}"#);
        assert!(matches!(
            last(&h),
            View::Waiting {
                label: WAITING_LABEL,
                ..
            }
        ));
    }

    #[test]
    fn hard_error_renders_literal_text() {
        let h = mount_shell();
        deliver(&h, r#"{"t":"msg","kind":"err","text":"stage crashed"}"#);
        match last(&h) {
            View::Error { message, .. } => assert_eq!(message, "stage crashed"),
            other => panic!("expected error view, got {other:?}"),
        }
    }

    #[test]
    fn non_error_messages_do_not_transition() {
        let h = mount_shell();
        deliver(&h, r#"{"t":"page","page":{"key":"home"}}"#);
        deliver(&h, r#"{"t":"msg","kind":"info","text":"deployed"}"#);
        assert_eq!(last(&h).page_key(), Some("home"));
    }

    #[test]
    fn reset_reloads_exactly_once() {
        let h = mount_shell();
        deliver(&h, r#"{"t":"reset"}"#);
        assert_eq!(h.platform.reloads.get(), 1);

        // From a Ready state too, still one reload per reset.
        deliver(&h, r#"{"t":"page","page":{"key":"home"}}"#);
        deliver(&h, r#"{"t":"reset"}"#);
        assert_eq!(h.platform.reloads.get(), 2);
    }

    #[test]
    fn new_page_key_forces_new_layout_subtree() {
        let h = mount_shell();
        deliver(&h, r#"{"t":"page","page":{"key":"first"}}"#);
        let first = last(&h);
        deliver(&h, r#"{"t":"page","page":{"key":"second"}}"#);
        let second = last(&h);

        match (first, second) {
            (
                View::Ready {
                    key: k1, layout: l1, ..
                },
                View::Ready {
                    key: k2, layout: l2, ..
                },
            ) => {
                assert_ne!(k1, k2);
                assert_ne!(l1, l2, "layout subtree rebuilt for the new key");
            }
            other => panic!("expected two ready views, got {other:?}"),
        }
    }

    #[test]
    fn hash_change_stores_fragment_and_syncs_once() {
        let h = mount_shell();
        let client = h.mount.with_component(AppShell::client);

        h.events.hash_changed.emit("#foo".into());
        // Args were flushed by the sync the listener issued.
        assert_eq!(h.transport.sent_count(), 1);
        let frame: serde_json::Value =
            serde_json::from_str(&h.transport.sent()[0]).expect("valid json");
        assert_eq!(frame["t"], "sync");
        assert_eq!(frame["args"]["#"], "foo");
        assert_eq!(client.args_len(), 0);
    }

    #[test]
    fn empty_fragment_still_syncs_without_arg() {
        let h = mount_shell();
        h.events.hash_changed.emit("#".into());
        assert_eq!(h.transport.sent_count(), 1);
        let frame: serde_json::Value =
            serde_json::from_str(&h.transport.sent()[0]).expect("valid json");
        assert_eq!(frame["args"], serde_json::json!({}));
    }

    #[test]
    fn link_click_sets_arg_without_syncing() {
        let h = mount_shell();
        let client = h.mount.with_component(AppShell::client);

        h.events.link_clicked.emit("mylink".into());
        assert_eq!(client.arg("mylink"), Some(serde_json::json!(true)));
        assert_eq!(h.transport.sent_count(), 0, "propagation waits for a later sync");
    }

    #[test]
    fn mount_unmount_leaves_no_listeners() {
        let h = mount_shell();
        assert_eq!(h.events.hash_changed.subscriber_count(), 1);
        assert_eq!(h.events.link_clicked.subscriber_count(), 1);

        let Harness { mount, events, .. } = h;
        mount.unmount();
        assert_eq!(events.hash_changed.subscriber_count(), 0);
        assert_eq!(events.link_clicked.subscriber_count(), 0);
    }

    #[test]
    fn remount_after_unmount_registers_fresh_listeners() {
        let h = mount_shell();
        let Harness { mount, events, .. } = h;
        mount.unmount();

        // A second shell on the same channels gets exactly one listener
        // each; nothing leaked from the first mount.
        let sched = RenderScheduler::new();
        let connector = LoopbackConnector::new();
        let collab = Collaborators {
            connector: Rc::new(connector),
            platform: Rc::new(TestPlatform::default()),
            layout: Rc::new(TestLayout),
            dialogs: Rc::new(TestDialogs),
            theme: Rc::new(TestTheme),
        };
        let shell = AppShell::new(
            Client::new(),
            ShellConfig::default(),
            collab,
            events.clone(),
        );
        let _mount = Mount::new(shell, &sched, |_| {});
        assert_eq!(events.hash_changed.subscriber_count(), 1);
        assert_eq!(events.link_clicked.subscriber_count(), 1);
    }

    #[test]
    fn connect_failure_keeps_loading() {
        let sched = RenderScheduler::new();
        let connector = LoopbackConnector::new();
        connector.refuse(true);
        let collab = Collaborators {
            connector: Rc::new(connector),
            platform: Rc::new(TestPlatform::default()),
            layout: Rc::new(TestLayout),
            dialogs: Rc::new(TestDialogs),
            theme: Rc::new(TestTheme),
        };
        let shell = AppShell::new(
            Client::new(),
            ShellConfig::default(),
            collab,
            ShellEvents::default(),
        );
        let session = shell.session_handle();
        let views = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&views);
        let _mount = Mount::new(shell, &sched, move |view: &View| {
            sink.borrow_mut().push(view.clone())
        });

        assert!(!session.is_connected());
        assert!(matches!(
            views.borrow().last(),
            Some(View::Loading { .. })
        ));
        assert!(matches!(
            session.deliver("{}"),
            Err(ClientError::NotConnected)
        ));
    }
}
