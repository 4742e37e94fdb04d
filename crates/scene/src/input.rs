//! Platform-independent keyboard vocabulary.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Space,
    Tab,
    F,
    T,
    R,
    C,
    W,
    A,
    S,
    D,
    Q,
    E,
    Digit1,
    Digit2,
    Digit3,
    Left,
    Right,
    Up,
    Down,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Press,
    Repeat,
    Release,
}

impl KeyAction {
    /// Held keys keep moving things.
    #[inline]
    pub fn is_down(self) -> bool {
        matches!(self, KeyAction::Press | KeyAction::Repeat)
    }
}

/// What the event loop should do after an input event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Continue,
    Exit,
}

/// Which transform component object-mode keys edit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransformMode {
    Translate,
    #[default]
    Rotate,
    Scale,
}

/// Whether movement keys drive the camera or the selected model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ControlTarget {
    #[default]
    Object,
    Camera,
}
