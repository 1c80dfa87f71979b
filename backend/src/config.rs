/// Window and context parameters handed to [`crate::system::System::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Requested OpenGL (major, minor); always a core profile.
    pub gl_version: (u8, u8),
    pub forward_compatible: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Test Window".to_string(),
            width: 800,
            height: 600,
            gl_version: (3, 3),
            forward_compatible: true,
        }
    }
}
