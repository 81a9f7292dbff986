use serde::{Deserialize, Serialize};

/// HEC event metadata. Every field is optional; unset fields are left to the
/// collector's token defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sourcetype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
}

impl EventMetadata {
    /// Fills every unset field from `fallback`.
    pub fn or(self, fallback: &EventMetadata) -> Self {
        Self {
            host: self.host.or_else(|| fallback.host.clone()),
            source: self.source.or_else(|| fallback.source.clone()),
            sourcetype: self.sourcetype.or_else(|| fallback.sourcetype.clone()),
            index: self.index.or_else(|| fallback.index.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or_keeps_set_fields() {
        let own = EventMetadata {
            source: Some("middleware".into()),
            ..Default::default()
        };
        let fallback = EventMetadata {
            source: Some("config".into()),
            index: Some("main".into()),
            ..Default::default()
        };

        let merged = own.or(&fallback);
        assert_eq!(merged.source.as_deref(), Some("middleware"));
        assert_eq!(merged.index.as_deref(), Some("main"));
        assert_eq!(merged.host, None);
    }
}
