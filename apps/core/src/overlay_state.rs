use crate::contract::MatchRequest;
use crate::query::Query;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayPhase {
    #[default]
    Closed,
    Open,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
    Backspace,
    Char(char),
    Other(String),
}

/// Where a pointer activation landed inside the full-screen capture region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    Surface,
    Backdrop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayEvent {
    Inject,
    Key(Key),
    Pointer(PointerTarget),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayEffect {
    Mount,
    FocusInput,
    Unmount,
    StopPropagation,
    PreventDefault,
    Send(MatchRequest),
}

/// Page-scoped overlay lifecycle. Holds the text typed so far while open.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OverlayState {
    phase: OverlayPhase,
    input: String,
}

impl OverlayState {
    pub fn phase(&self) -> OverlayPhase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase == OverlayPhase::Open
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn on_event(&mut self, event: OverlayEvent) -> Vec<OverlayEffect> {
        match event {
            OverlayEvent::Inject => self.on_inject(),
            OverlayEvent::Key(key) => self.on_key(key),
            OverlayEvent::Pointer(target) => self.on_pointer(target),
        }
    }

    pub fn on_inject(&mut self) -> Vec<OverlayEffect> {
        if self.is_open() {
            return self.close();
        }
        self.phase = OverlayPhase::Open;
        self.input.clear();
        vec![OverlayEffect::Mount, OverlayEffect::FocusInput]
    }

    pub fn on_key(&mut self, key: Key) -> Vec<OverlayEffect> {
        if !self.is_open() {
            return Vec::new();
        }

        let mut effects = vec![OverlayEffect::StopPropagation];
        match key {
            Key::Enter => {
                effects.push(OverlayEffect::PreventDefault);
                if let Some(query) = Query::classify(&self.input) {
                    effects.push(OverlayEffect::Send(query.to_request()));
                }
                effects.extend(self.close());
            }
            Key::Escape => {
                effects.push(OverlayEffect::PreventDefault);
                effects.extend(self.close());
            }
            Key::Backspace => {
                self.input.pop();
            }
            Key::Char(ch) => self.input.push(ch),
            Key::Other(_) => {}
        }
        effects
    }

    pub fn on_pointer(&mut self, target: PointerTarget) -> Vec<OverlayEffect> {
        match (self.phase, target) {
            (OverlayPhase::Open, PointerTarget::Backdrop) => self.close(),
            _ => Vec::new(),
        }
    }

    fn close(&mut self) -> Vec<OverlayEffect> {
        self.phase = OverlayPhase::Closed;
        self.input.clear();
        vec![OverlayEffect::Unmount]
    }
}
