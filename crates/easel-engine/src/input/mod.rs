//! Pointer and keyboard input.
//!
//! Public API is platform-agnostic. Host shells translate their native events
//! (DOM, winit, test scripts) into `InputEvent`s in surface coordinates.

mod state;
mod types;

pub use state::InputState;
pub use types::{
    InputEvent,
    Key,
    KeyState,
    Modifiers,
    MouseButton,
    MouseButtonState,
    PointerButtonEvent,
    PointerMoveEvent,
};
