//! Keyboard state for walking
//!
//! Host key events are mapped onto a handful of logical actions and folded
//! into a [`KeyState`] that the integrator reads once per frame. Held keys are
//! plain flags; jump is additionally latched as a one-shot request so a tap
//! shorter than a frame is not lost. Key repeat never changes state.

use bitflags::bitflags;
use log::trace;

/// Physical keys the walking controls understand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// W key
    W,
    /// A key
    A,
    /// S key
    S,
    /// D key
    D,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
    /// Space bar
    Space,
    /// Left shift
    LeftShift,
    /// Right shift
    RightShift,
    /// Any key the walking controls ignore
    Other(u32),
}

bitflags! {
    /// Set of held walking actions
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MovementKeys: u8 {
        /// Move forward
        const FORWARD = 1 << 0;
        /// Move backward
        const BACK = 1 << 1;
        /// Strafe (or turn) left
        const LEFT = 1 << 2;
        /// Strafe (or turn) right
        const RIGHT = 1 << 3;
        /// Jump held
        const JUMP = 1 << 4;
        /// Left/right turn instead of strafing
        const TURN_MODIFIER = 1 << 5;
    }
}

/// Logical walking action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalkAction {
    /// Forward
    Forward,
    /// Backward
    Back,
    /// Left
    Left,
    /// Right
    Right,
    /// Jump
    Jump,
    /// Turn modifier (Shift)
    TurnModifier,
}

impl WalkAction {
    /// Default key binding: WASD and arrows, Space, either Shift
    pub fn from_key_code(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::W | KeyCode::Up => Some(Self::Forward),
            KeyCode::S | KeyCode::Down => Some(Self::Back),
            KeyCode::A | KeyCode::Left => Some(Self::Left),
            KeyCode::D | KeyCode::Right => Some(Self::Right),
            KeyCode::Space => Some(Self::Jump),
            KeyCode::LeftShift | KeyCode::RightShift => Some(Self::TurnModifier),
            KeyCode::Other(_) => None,
        }
    }

    /// Flag for this action
    pub fn flag(self) -> MovementKeys {
        match self {
            Self::Forward => MovementKeys::FORWARD,
            Self::Back => MovementKeys::BACK,
            Self::Left => MovementKeys::LEFT,
            Self::Right => MovementKeys::RIGHT,
            Self::Jump => MovementKeys::JUMP,
            Self::TurnModifier => MovementKeys::TURN_MODIFIER,
        }
    }
}

/// A key event from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Key pressed or released
    pub code: KeyCode,
    /// Auto-repeat event
    pub repeat: bool,
}

impl KeyEvent {
    /// Fresh (non-repeat) event
    pub fn new(code: KeyCode) -> Self {
        Self { code, repeat: false }
    }

    /// Auto-repeat event
    pub fn repeated(code: KeyCode) -> Self {
        Self { code, repeat: true }
    }
}

/// Held keys plus the pending jump request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyState {
    held: MovementKeys,
    jump_requested: bool,
}

impl KeyState {
    /// Nothing held
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently held actions
    pub fn held(&self) -> MovementKeys {
        self.held
    }

    /// True if `action` is held
    pub fn is_held(&self, action: WalkAction) -> bool {
        self.held.contains(action.flag())
    }

    /// Mark `action` held; a fresh jump press latches a request
    pub fn press(&mut self, action: WalkAction) {
        if action == WalkAction::Jump && !self.held.contains(MovementKeys::JUMP) {
            self.jump_requested = true;
        }
        self.held.insert(action.flag());
    }

    /// Mark `action` released
    pub fn release(&mut self, action: WalkAction) {
        self.held.remove(action.flag());
    }

    /// True if a jump was requested and not yet consumed
    pub fn jump_requested(&self) -> bool {
        self.jump_requested
    }

    /// Consume the pending jump request (true at most once per press)
    pub fn take_jump_request(&mut self) -> bool {
        std::mem::take(&mut self.jump_requested)
    }

    /// Release everything (e.g. on focus loss)
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Key-down handler; returns true if the key is a walking key
pub fn on_key_down_walking(event: &KeyEvent, keys: &mut KeyState) -> bool {
    let Some(action) = WalkAction::from_key_code(event.code) else {
        return false;
    };
    if !event.repeat {
        keys.press(action);
        trace!("Key down {:?} -> {:?}", event.code, keys.held());
    }
    true
}

/// Key-up handler; returns true if the key is a walking key
pub fn on_key_up_walking(event: &KeyEvent, keys: &mut KeyState) -> bool {
    let Some(action) = WalkAction::from_key_code(event.code) else {
        return false;
    };
    keys.release(action);
    trace!("Key up {:?} -> {:?}", event.code, keys.held());
    true
}
