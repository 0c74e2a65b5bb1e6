use url::Url;

/// Engine-wide configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub user_agent: String,
    /// Page substituted when a reload is requested and nothing was ever
    /// committed to the window.
    pub blank_url: Url,
    /// Maximum nesting depth for frames/iframes before a navigation is
    /// rejected outright.
    pub max_frame_depth: usize,
    /// Maximum number of entries kept per session history.
    pub max_history: usize,
    pub scale_min: f32,
    pub scale_max: f32,
    /// Relative scale adjustments landing within this distance of 1.0 snap
    /// exactly to 1.0.
    pub scale_snap: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            user_agent: "SkiffEngine/1.0".to_string(),
            blank_url: Url::parse("about:blank").expect("about:blank is a valid URL"),
            max_frame_depth: 8,
            max_history: 100,
            scale_min: 0.2,
            scale_max: 10.0,
            scale_snap: 0.01,
        }
    }
}
