use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub adapters: AdapterAvailability,
}

/// Which adapters can actually run right now. The image adapter is
/// in-process and always available; PDF and video depend on external
/// binaries being installed.
#[derive(Debug, Serialize, Deserialize)]
pub struct AdapterAvailability {
    pub image: bool,
    pub pdf: bool,
    pub video: bool,
}
