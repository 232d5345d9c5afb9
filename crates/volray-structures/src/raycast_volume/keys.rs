//! Key bindings for the raycast volume's input toggles.
//!
//! Bindings are plain data so the embedding application decides the actual
//! keys; nothing here reads device state.

use winit::keyboard::KeyCode;

/// Which toggle a key press maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// Trilinear vs. nearest-sample lookup.
    Interpolate,
    /// Sampling-grid jitter.
    Perturbation,
    /// Visibility.
    Hide,
}

/// Key-to-toggle configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBindings {
    /// Toggles interpolation.
    pub toggle_interpolate: KeyCode,
    /// Toggles perturbation.
    pub toggle_perturbation: KeyCode,
    /// Toggles visibility.
    pub toggle_hide: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            toggle_interpolate: KeyCode::KeyI,
            toggle_perturbation: KeyCode::KeyP,
            toggle_hide: KeyCode::KeyH,
        }
    }
}

impl KeyBindings {
    /// Maps a pressed key to its toggle, if bound.
    #[must_use]
    pub fn toggle_for(&self, key: KeyCode) -> Option<Toggle> {
        if key == self.toggle_interpolate {
            Some(Toggle::Interpolate)
        } else if key == self.toggle_perturbation {
            Some(Toggle::Perturbation)
        } else if key == self.toggle_hide {
            Some(Toggle::Hide)
        } else {
            None
        }
    }
}
