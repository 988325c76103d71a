//! Stored option values for hosts without their own option UI.

use std::collections::BTreeMap;

use emu_core::OptionSource;

use crate::config::OPTION_DESCRIPTORS;

/// Option key/value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "native", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "native", serde(transparent))]
pub struct CoreOptions(BTreeMap<String, String>);

impl CoreOptions {
    /// Every option at its UI default.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self(
            OPTION_DESCRIPTORS
                .iter()
                .map(|d| (d.key.to_string(), d.default_value().to_string()))
                .collect(),
        )
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.0.insert(key.to_string(), value.to_string());
    }

    pub fn remove(&mut self, key: &str) {
        self.0.remove(key);
    }

    /// Load options from a JSON object of string values.
    #[cfg(feature = "native")]
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    #[cfg(feature = "native")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl OptionSource for CoreOptions {
    fn option(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}
