// Server configuration

#[derive(Clone)]
pub struct ServerConfig {
    pub version: String,
    /// Load or build the index in the background right after startup
    pub warm_index: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            version: crate::constants::VERSION.to_string(),
            warm_index: false,
        }
    }
}
