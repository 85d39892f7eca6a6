//! Presentation options shared by the config layer and the TUI.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiOptions {
    pub ascii_only: bool,
    pub high_contrast: bool,
    /// Freeze spinners and other per-frame motion.
    pub reduced_motion: bool,
}
