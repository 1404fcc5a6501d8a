use tracing::{debug, warn};

use crate::config::Config;
use crate::overlay_state::{OverlayEffect, OverlayEvent, OverlayPhase, OverlayState};
use crate::transport::RequestSink;

/// What the page needs to build the overlay's host element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayMarkup {
    pub element_id: String,
    pub placeholder: String,
}

impl OverlayMarkup {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            element_id: cfg.overlay_element_id.clone(),
            placeholder: cfg.placeholder.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    #[error("overlay element {0} is already mounted")]
    AlreadyMounted(String),
    #[error("page has no document body")]
    NoBody,
}

/// DOM operations of the page the overlay lives in. Implementations mount a
/// single host element with an isolated style root under the document body,
/// and keep the overlay's state alongside the page so every injection into the
/// same page sees it.
pub trait OverlayPage {
    fn has_overlay(&self, element_id: &str) -> bool;
    fn mount_overlay(&mut self, markup: &OverlayMarkup) -> Result<(), PageError>;
    fn unmount_overlay(&mut self, element_id: &str);
    fn focus_input(&mut self);
    fn overlay_state(&self) -> &OverlayState;
    fn overlay_state_mut(&mut self) -> &mut OverlayState;
}

impl<T: OverlayPage + ?Sized> OverlayPage for &mut T {
    fn has_overlay(&self, element_id: &str) -> bool {
        (**self).has_overlay(element_id)
    }

    fn mount_overlay(&mut self, markup: &OverlayMarkup) -> Result<(), PageError> {
        (**self).mount_overlay(markup)
    }

    fn unmount_overlay(&mut self, element_id: &str) {
        (**self).unmount_overlay(element_id)
    }

    fn focus_input(&mut self) {
        (**self).focus_input()
    }

    fn overlay_state(&self) -> &OverlayState {
        (**self).overlay_state()
    }

    fn overlay_state_mut(&mut self) -> &mut OverlayState {
        (**self).overlay_state_mut()
    }
}

/// How the host should treat the DOM event that was just handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventDisposition {
    pub stop_propagation: bool,
    pub prevent_default: bool,
}

/// Entry point run by the injected script. An overlay element already on the
/// page is removed instead of mounting a second one, even when the page's
/// recorded state no longer knows about it.
pub fn inject_overlay<P: OverlayPage + ?Sized>(
    page: &mut P,
    markup: &OverlayMarkup,
) -> Result<OverlayPhase, PageError> {
    if !page.overlay_state().is_open() && page.has_overlay(&markup.element_id) {
        debug!(element_id = markup.element_id.as_str(), "removing orphaned overlay element");
        page.unmount_overlay(&markup.element_id);
        return Ok(OverlayPhase::Closed);
    }

    let effects = page.overlay_state_mut().on_inject();
    for effect in effects {
        apply_dom_effect(page, markup, effect)?;
    }
    Ok(page.overlay_state().phase())
}

fn apply_dom_effect<P: OverlayPage + ?Sized>(
    page: &mut P,
    markup: &OverlayMarkup,
    effect: OverlayEffect,
) -> Result<(), PageError> {
    match effect {
        OverlayEffect::Mount => {
            if let Err(error) = page.mount_overlay(markup) {
                *page.overlay_state_mut() = OverlayState::default();
                return Err(error);
            }
        }
        OverlayEffect::FocusInput => page.focus_input(),
        OverlayEffect::Unmount => page.unmount_overlay(&markup.element_id),
        OverlayEffect::StopPropagation | OverlayEffect::PreventDefault | OverlayEffect::Send(_) => {}
    }
    Ok(())
}

/// Page-side controller. The overlay state it drives lives in the page, so a
/// controller built for a later injection toggles instead of stacking.
pub struct OverlayController<P, S> {
    page: P,
    sink: S,
    markup: OverlayMarkup,
}

impl<P: OverlayPage, S: RequestSink> OverlayController<P, S> {
    pub fn new(page: P, sink: S, markup: OverlayMarkup) -> Self {
        Self { page, sink, markup }
    }

    pub fn phase(&self) -> OverlayPhase {
        self.page.overlay_state().phase()
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn inject(&mut self) -> Result<OverlayPhase, PageError> {
        inject_overlay(&mut self.page, &self.markup)
    }

    pub fn handle(&mut self, event: OverlayEvent) -> Result<EventDisposition, PageError> {
        if event == OverlayEvent::Inject {
            self.inject()?;
            return Ok(EventDisposition::default());
        }

        let effects = self.page.overlay_state_mut().on_event(event);
        let mut disposition = EventDisposition::default();
        for effect in effects {
            match effect {
                OverlayEffect::StopPropagation => disposition.stop_propagation = true,
                OverlayEffect::PreventDefault => disposition.prevent_default = true,
                OverlayEffect::Send(request) => {
                    debug!(action = request.action(), "sending match request");
                    if let Err(error) = self.sink.send(request) {
                        warn!("match request dropped: {error}");
                    }
                }
                dom => apply_dom_effect(&mut self.page, &self.markup, dom)?,
            }
        }
        Ok(disposition)
    }
}

/// Page without a real DOM: tracks which element is mounted and focused.
#[derive(Debug, Default)]
pub struct HeadlessPage {
    overlay: OverlayState,
    mounted: Option<OverlayMarkup>,
    input_focused: bool,
    mount_count: usize,
    detached: bool,
}

impl HeadlessPage {
    /// A page whose document has no body to attach to.
    pub fn detached() -> Self {
        Self {
            detached: true,
            ..Self::default()
        }
    }

    pub fn mounted(&self) -> Option<&OverlayMarkup> {
        self.mounted.as_ref()
    }

    pub fn input_focused(&self) -> bool {
        self.input_focused
    }

    pub fn mount_count(&self) -> usize {
        self.mount_count
    }
}

impl OverlayPage for HeadlessPage {
    fn has_overlay(&self, element_id: &str) -> bool {
        self.mounted
            .as_ref()
            .is_some_and(|markup| markup.element_id == element_id)
    }

    fn mount_overlay(&mut self, markup: &OverlayMarkup) -> Result<(), PageError> {
        if self.detached {
            return Err(PageError::NoBody);
        }
        if self.mounted.is_some() {
            return Err(PageError::AlreadyMounted(markup.element_id.clone()));
        }
        self.mounted = Some(markup.clone());
        self.mount_count += 1;
        Ok(())
    }

    fn unmount_overlay(&mut self, element_id: &str) {
        if self.has_overlay(element_id) {
            self.mounted = None;
            self.input_focused = false;
        }
    }

    fn focus_input(&mut self) {
        self.input_focused = self.mounted.is_some();
    }

    fn overlay_state(&self) -> &OverlayState {
        &self.overlay
    }

    fn overlay_state_mut(&mut self) -> &mut OverlayState {
        &mut self.overlay
    }
}
