use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Describes the remote browser a run should be provisioned with.
///
/// Immutable once constructed; converted to a WebDriver capability map
/// exactly once, at session creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    pub name: String,
    pub build: String,
    pub browser_name: String,
    pub version: Option<String>,
    pub platform: Option<String>,
    pub screen_resolution: String,
    pub record_video: bool,
    pub record_network: bool,
}

impl Capabilities {
    /// Latest Firefox on Windows at the hub's default desktop resolution.
    pub fn firefox_windows() -> Self {
        Self {
            name: "Firefox smoke run".to_string(),
            build: "1.0".to_string(),
            browser_name: "Firefox".to_string(),
            version: None,
            platform: Some("Windows 7".to_string()),
            screen_resolution: "1366x768".to_string(),
            record_video: true,
            record_network: false,
        }
    }

    /// Pinned Chrome on Windows 10 at full HD.
    pub fn chrome_windows() -> Self {
        Self {
            name: "Chrome smoke run".to_string(),
            build: "1.0".to_string(),
            browser_name: "Chrome".to_string(),
            version: Some("latest".to_string()),
            platform: Some("Windows 10".to_string()),
            screen_resolution: "1920x1080".to_string(),
            record_video: true,
            record_network: false,
        }
    }

    /// Safari on macOS, smaller laptop resolution.
    pub fn safari_mac() -> Self {
        Self {
            name: "Safari smoke run".to_string(),
            build: "1.0".to_string(),
            browser_name: "Safari".to_string(),
            version: None,
            platform: Some("Mac OSX 10.14".to_string()),
            screen_resolution: "1366x768".to_string(),
            record_video: true,
            record_network: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_build(mut self, build: impl Into<String>) -> Self {
        self.build = build.into();
        self
    }

    /// The wire-format capability map handed to the remote endpoint.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("name".to_string(), Value::String(self.name.clone()));
        map.insert("build".to_string(), Value::String(self.build.clone()));
        map.insert(
            "browserName".to_string(),
            Value::String(self.browser_name.clone()),
        );
        if let Some(version) = &self.version {
            map.insert("version".to_string(), Value::String(version.clone()));
        }
        if let Some(platform) = &self.platform {
            map.insert("platform".to_string(), Value::String(platform.clone()));
        }
        map.insert(
            "screen_resolution".to_string(),
            Value::String(self.screen_resolution.clone()),
        );
        map.insert("record_video".to_string(), Value::Bool(self.record_video));
        map.insert(
            "record_network".to_string(),
            Value::Bool(self.record_network),
        );
        map
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::firefox_windows()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_carries_descriptor_keys() {
        let caps = Capabilities::firefox_windows().with_name("T1");
        let map = caps.to_map();

        assert_eq!(map["name"], "T1");
        assert_eq!(map["browserName"], "Firefox");
        assert_eq!(map["platform"], "Windows 7");
        assert_eq!(map["screen_resolution"], "1366x768");
        assert_eq!(map["record_video"], true);
        assert_eq!(map["record_network"], false);
        // no version requested, so the key must be absent
        assert!(!map.contains_key("version"));
    }

    #[test]
    fn pinned_version_is_included() {
        let map = Capabilities::chrome_windows().to_map();
        assert_eq!(map["version"], "latest");
    }
}
