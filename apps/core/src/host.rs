use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::config::Config;
use crate::model::{Tab, TabId};
use crate::overlay::{self, HeadlessPage, OverlayMarkup, OverlayPage};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("tab {0} no longer exists")]
    TabClosed(TabId),
    #[error("scripting is not allowed in tab {0}")]
    ScriptingDisallowed(TabId),
    #[error("host call failed: {0}")]
    Call(String),
    #[error("overlay entry point failed in tab {tab_id}: {source}")]
    EntryPoint {
        tab_id: TabId,
        source: overlay::PageError,
    },
}

/// Privileged browser facilities the coordinator and dispatcher depend on.
#[async_trait]
pub trait TabHost: Send + Sync {
    async fn active_tab(&self) -> Result<Option<Tab>, HostError>;
    /// One ordered snapshot of the current window's tabs.
    async fn list_tabs(&self) -> Result<Vec<Tab>, HostError>;
    async fn activate_tab(&self, id: TabId) -> Result<(), HostError>;
    async fn inject_overlay(&self, id: TabId) -> Result<(), HostError>;
}

#[derive(Debug)]
struct StaticHostState {
    tabs: Vec<Tab>,
    pages: HashMap<TabId, HeadlessPage>,
    markup: OverlayMarkup,
    active: Option<TabId>,
    list_calls: usize,
    activations: Vec<TabId>,
    injections: Vec<TabId>,
    scripting_blocked: bool,
}

impl Default for StaticHostState {
    fn default() -> Self {
        Self {
            tabs: Vec::new(),
            pages: HashMap::new(),
            markup: OverlayMarkup::from_config(&Config::default()),
            active: None,
            list_calls: 0,
            activations: Vec::new(),
            injections: Vec::new(),
            scripting_blocked: false,
        }
    }
}

/// In-memory host backed by a fixed tab list. Activation moves the active
/// marker, and each tab owns a headless page that injections run against.
#[derive(Debug, Default)]
pub struct StaticTabHost {
    state: Mutex<StaticHostState>,
}

impl StaticTabHost {
    pub fn new(tabs: Vec<Tab>, active: Option<TabId>) -> Self {
        Self {
            state: Mutex::new(StaticHostState {
                tabs,
                active,
                ..StaticHostState::default()
            }),
        }
    }

    pub fn with_markup(self, markup: OverlayMarkup) -> Self {
        self.with_state(|state| state.markup = markup);
        self
    }

    /// Runs `f` against the page of tab `id`, if an injection ever reached it.
    pub fn with_page<T>(&self, id: TabId, f: impl FnOnce(&mut HeadlessPage) -> T) -> Option<T> {
        self.with_state(|state| state.pages.get_mut(&id).map(f))
    }

    pub fn overlay_mounted(&self, id: TabId) -> bool {
        self.with_state(|state| {
            let element_id = state.markup.element_id.clone();
            state
                .pages
                .get(&id)
                .is_some_and(|page| page.has_overlay(&element_id))
        })
    }

    pub fn block_scripting(&self) {
        self.with_state(|state| state.scripting_blocked = true);
    }

    pub fn close_tab(&self, id: TabId) {
        self.with_state(|state| {
            state.tabs.retain(|tab| tab.id != id);
            state.pages.remove(&id);
            if state.active == Some(id) {
                state.active = None;
            }
        });
    }

    pub fn active_id(&self) -> Option<TabId> {
        self.with_state(|state| state.active)
    }

    pub fn activations(&self) -> Vec<TabId> {
        self.with_state(|state| state.activations.clone())
    }

    pub fn injections(&self) -> Vec<TabId> {
        self.with_state(|state| state.injections.clone())
    }

    pub fn list_calls(&self) -> usize {
        self.with_state(|state| state.list_calls)
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut StaticHostState) -> T) -> T {
        let mut guard = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }
}

#[async_trait]
impl TabHost for StaticTabHost {
    async fn active_tab(&self) -> Result<Option<Tab>, HostError> {
        Ok(self.with_state(|state| {
            let active = state.active?;
            state.tabs.iter().find(|tab| tab.id == active).cloned()
        }))
    }

    async fn list_tabs(&self) -> Result<Vec<Tab>, HostError> {
        Ok(self.with_state(|state| {
            state.list_calls += 1;
            let mut tabs = state.tabs.clone();
            tabs.sort_by_key(|tab| tab.position_index);
            tabs
        }))
    }

    async fn activate_tab(&self, id: TabId) -> Result<(), HostError> {
        self.with_state(|state| {
            if !state.tabs.iter().any(|tab| tab.id == id) {
                return Err(HostError::TabClosed(id));
            }
            state.active = Some(id);
            state.activations.push(id);
            Ok(())
        })
    }

    async fn inject_overlay(&self, id: TabId) -> Result<(), HostError> {
        self.with_state(|state| {
            if !state.tabs.iter().any(|tab| tab.id == id) {
                return Err(HostError::TabClosed(id));
            }
            if state.scripting_blocked {
                return Err(HostError::ScriptingDisallowed(id));
            }
            state.injections.push(id);
            let markup = state.markup.clone();
            let page = state.pages.entry(id).or_default();
            overlay::inject_overlay(page, &markup)
                .map(|_| ())
                .map_err(|source| HostError::EntryPoint { tab_id: id, source })
        })
    }
}
