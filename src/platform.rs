//! Platform-specific configuration

use crossterm::event::KeyModifiers;

/// Platform-appropriate modifier for form shortcuts
/// - macOS: SUPER (Cmd key)
/// - Linux/Windows: CONTROL (Ctrl key)
#[cfg(target_os = "macos")]
pub const SHORTCUT_MODIFIER: KeyModifiers = KeyModifiers::SUPER;

#[cfg(not(target_os = "macos"))]
pub const SHORTCUT_MODIFIER: KeyModifiers = KeyModifiers::CONTROL;

/// Create shortcut display for form help text
/// Ctrl+S works on all platforms
pub const CREATE_SHORTCUT: &str = "Ctrl+S";

/// Create another shortcut display
/// - macOS: "Cmd+N"
/// - Linux/Windows: "Ctrl+N"
#[cfg(target_os = "macos")]
pub const CREATE_ANOTHER_SHORTCUT: &str = "Cmd+N";

#[cfg(not(target_os = "macos"))]
pub const CREATE_ANOTHER_SHORTCUT: &str = "Ctrl+N";

/// Whether `modifiers` carry the shortcut modifier. Ctrl is accepted everywhere.
pub fn is_shortcut(modifiers: KeyModifiers) -> bool {
    modifiers.contains(SHORTCUT_MODIFIER) || modifiers.contains(KeyModifiers::CONTROL)
}
