pub mod descriptor;
pub mod finalizer;
pub mod payload;
pub mod placeholder;

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument};

use self::descriptor::JobLaunchDescriptor;
use self::finalizer::{FinalizerInputs, GCP_RESOURCES_OUTPUT, automl_tabular_finalizer};
use self::placeholder::input_parameter;

pub const COMPONENT_NAME: &str = "automl-tabular-finalizer";
const COMPONENT_DESCRIPTION: &str = "Finalizer for AutoML Tabular pipelines. Cancels the tuner \
    and cleans up lingering long-running operations left under root_dir.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParameterType {
    String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ParameterType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    pub optional: bool,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ParameterType,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Implementation {
    pub container: JobLaunchDescriptor,
}

/// Registered pipeline node: typed ports plus the container it runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentSpec {
    pub name: String,
    pub description: String,
    pub inputs: Vec<InputSpec>,
    pub outputs: Vec<OutputSpec>,
    pub implementation: Implementation,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BindError {
    #[error("Component '{component}' requires input '{name}' but the call site does not provide it")]
    MissingInput { component: String, name: String },

    #[error("Component '{component}' has no input named '{name}'")]
    UnknownInput { component: String, name: String },

    #[error("'{name}' is an output of component '{component}' and cannot be passed as an input")]
    OutputBoundAsInput { component: String, name: String },

    #[error("Component '{component}' has no output named '{name}'")]
    UnknownOutput { component: String, name: String },
}

/// Arguments a pipeline passes to one component invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallSite {
    pub inputs: BTreeMap<String, String>,

    /// Output name to the path the runtime collects it from. Omitted outputs
    /// use the runtime's output file placeholder.
    pub outputs: BTreeMap<String, String>,
}

impl CallSite {
    pub fn input(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.inputs.insert(name.into(), value.into());
        self
    }

    pub fn output(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.outputs.insert(name.into(), path.into());
        self
    }
}

impl InputSpec {
    fn required(name: &str, description: &str) -> Self {
        InputSpec {
            name: name.to_string(),
            kind: ParameterType::String,
            default: None,
            optional: false,
            description: description.to_string(),
        }
    }

    fn optional(name: &str, default: &str, description: &str) -> Self {
        InputSpec {
            name: name.to_string(),
            kind: ParameterType::String,
            default: Some(default.to_string()),
            optional: true,
            description: description.to_string(),
        }
    }
}

impl ComponentSpec {
    /// The finalizer as registered with the runtime, inputs left as placeholders.
    ///
    /// The `--payload` JSON is serialized before the runtime substitutes the
    /// input placeholders as plain text, so input values needing JSON escaping
    /// break the submitted payload. Only [`ComponentSpec::bind`] escapes them.
    pub fn automl_tabular_finalizer() -> Self {
        let placeholders = FinalizerInputs::new(
            input_parameter("project"),
            input_parameter("location"),
            input_parameter("root_dir"),
        )
        .with_encryption_spec_key_name(input_parameter("encryption_spec_key_name"));

        ComponentSpec {
            name: COMPONENT_NAME.to_string(),
            description: COMPONENT_DESCRIPTION.to_string(),
            inputs: vec![
                InputSpec::required("project", "Project to run the finalizer job in."),
                InputSpec::required("location", "Location for running the finalizer job."),
                InputSpec::required("root_dir", "The Cloud Storage location to store the output."),
                InputSpec::optional(
                    "encryption_spec_key_name",
                    "",
                    "Customer-managed encryption key.",
                ),
            ],
            outputs: vec![OutputSpec {
                name: GCP_RESOURCES_OUTPUT.to_string(),
                kind: ParameterType::String,
                description: "GCP resources created by this component.".to_string(),
            }],
            implementation: Implementation {
                container: automl_tabular_finalizer(&placeholders),
            },
        }
    }

    /// Checks a call site against the declared ports and builds the descriptor.
    ///
    /// Only the presence and names of arguments are checked, never their values.
    #[instrument("component/bind", skip(self, call_site), fields(component = %self.name))]
    pub fn bind(&self, call_site: &CallSite) -> Result<JobLaunchDescriptor, BindError> {
        for name in call_site.outputs.keys() {
            if !self.outputs.iter().any(|o| &o.name == name) {
                return Err(BindError::UnknownOutput {
                    component: self.name.clone(),
                    name: name.clone(),
                });
            }
        }

        for name in call_site.inputs.keys() {
            if self.outputs.iter().any(|o| &o.name == name) {
                return Err(BindError::OutputBoundAsInput {
                    component: self.name.clone(),
                    name: name.clone(),
                });
            }
            if !self.inputs.iter().any(|i| &i.name == name) {
                return Err(BindError::UnknownInput {
                    component: self.name.clone(),
                    name: name.clone(),
                });
            }
        }

        let mut values: BTreeMap<&str, String> = BTreeMap::new();
        for input in &self.inputs {
            let value = match (call_site.inputs.get(&input.name), &input.default) {
                (Some(value), _) => value.clone(),
                (None, Some(default)) => {
                    debug!("Input '{}' omitted, using default.", input.name);
                    default.clone()
                }
                (None, None) => {
                    return Err(BindError::MissingInput {
                        component: self.name.clone(),
                        name: input.name.clone(),
                    });
                }
            };
            values.insert(input.name.as_str(), value);
        }

        let mut take = |name: &str| values.remove(name).unwrap_or_default();
        let mut inputs = FinalizerInputs::new(take("project"), take("location"), take("root_dir"))
            .with_encryption_spec_key_name(take("encryption_spec_key_name"));
        if let Some(path) = call_site.outputs.get(GCP_RESOURCES_OUTPUT) {
            inputs = inputs.with_gcp_resources(path.clone());
        }

        Ok(automl_tabular_finalizer(&inputs))
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
