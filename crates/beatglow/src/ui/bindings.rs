//! Keyboard bindings.
//!
//! Centralizes all keyboard shortcuts and key mapping logic.

use nannou::prelude::*;

use crate::postprocess::Effect;

/// Actions that can be triggered by key presses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    TogglePlay,
    NextPalette,
    NextMode,
    PrevMode,
    ToggleEffects,
    ToggleEffect(Effect),
    BloomUp,
    BloomDown,
    ConnectNextDevice,
    Disconnect,
}

/// Map a key to its action, if any.
pub fn parse_key(key: Key) -> Option<Action> {
    match key {
        Key::Q => Some(Action::Quit),
        Key::Space => Some(Action::TogglePlay),
        Key::C => Some(Action::NextPalette),
        Key::Right => Some(Action::NextMode),
        Key::Left => Some(Action::PrevMode),
        Key::F => Some(Action::ToggleEffects),
        Key::Tab => Some(Action::ConnectNextDevice),
        Key::Back => Some(Action::Disconnect),
        Key::Equals | Key::NumpadAdd => Some(Action::BloomUp),
        Key::Minus | Key::NumpadSubtract => Some(Action::BloomDown),
        _ => parse_effect_key(key).map(Action::ToggleEffect),
    }
}

/// Number keys 1-6 toggle individual effects
fn parse_effect_key(key: Key) -> Option<Effect> {
    let index = match key {
        Key::Key1 => 0,
        Key::Key2 => 1,
        Key::Key3 => 2,
        Key::Key4 => 3,
        Key::Key5 => 4,
        Key::Key6 => 5,
        _ => return None,
    };
    Effect::ALL.get(index).copied()
}
