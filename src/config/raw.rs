use serde::Deserialize;

/// Finalizer inputs as written in the YAML config file or on the command line.
///
/// Every field is optional here; missing required inputs are reported when
/// the call site is bound to the component.
#[cfg_attr(test, derive(PartialEq))]
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawConfig {
    pub(crate) project: Option<String>,

    pub(crate) location: Option<String>,

    /// Cloud Storage root of the training pipeline
    ///
    /// Example: "gs://bucket/path"
    pub(crate) root_dir: Option<String>,

    pub(crate) encryption_spec_key_name: Option<String>,

    /// Output path for the gcp_resources handle
    pub(crate) gcp_resources: Option<String>,
}

impl RawConfig {
    /// Values set in `overrides` win over values in `self`.
    pub(super) fn merge(self, overrides: RawConfig) -> RawConfig {
        RawConfig {
            project: overrides.project.or(self.project),
            location: overrides.location.or(self.location),
            root_dir: overrides.root_dir.or(self.root_dir),
            encryption_spec_key_name: overrides
                .encryption_spec_key_name
                .or(self.encryption_spec_key_name),
            gcp_resources: overrides.gcp_resources.or(self.gcp_resources),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_config_deserialize() {
        let yaml_data = r#"
          project: my-project
          location: us-central1
          root_dir: gs://bucket/path
        "#;

        let raw: RawConfig = serde_yaml::from_str(yaml_data).unwrap();

        assert_eq!(
            raw,
            RawConfig {
                project: Some("my-project".to_string()),
                location: Some("us-central1".to_string()),
                root_dir: Some("gs://bucket/path".to_string()),
                encryption_spec_key_name: None,
                gcp_resources: None,
            }
        );
    }

    #[test]
    fn test_raw_config_rejects_unknown_field() {
        let yaml_data = r#"
          project: my-project
          region: us-central1
        "#;

        assert!(serde_yaml::from_str::<RawConfig>(yaml_data).is_err());
    }

    #[test]
    fn test_raw_config_merge() {
        let file = RawConfig {
            project: Some("file-project".to_string()),
            location: Some("us-central1".to_string()),
            encryption_spec_key_name: Some("file-key".to_string()),
            ..Default::default()
        };
        let flags = RawConfig {
            project: Some("flag-project".to_string()),
            encryption_spec_key_name: Some(String::new()),
            ..Default::default()
        };

        assert_eq!(
            file.merge(flags),
            RawConfig {
                project: Some("flag-project".to_string()),
                location: Some("us-central1".to_string()),
                root_dir: None,
                encryption_spec_key_name: Some(String::new()),
                gcp_resources: None,
            }
        );
    }
}
