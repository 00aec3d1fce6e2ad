use k8s_openapi::api::core::v1::Container;
use serde::Serialize;

use super::payload::CustomJobPayload;
use super::placeholder::PlaceholderValues;

/// Name of the container running the launcher inside the task pod.
pub(crate) const LAUNCHER_CONTAINER_NAME: &str = "main";

/// Image, command line and arguments of one containerized launcher invocation.
///
/// Built once per pipeline compilation and read once by the runtime at
/// submission time. There are no setters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobLaunchDescriptor {
    image: String,
    command: Vec<String>,
    args: Vec<String>,
}

impl JobLaunchDescriptor {
    pub(crate) fn new(image: String, command: Vec<String>, args: Vec<String>) -> Self {
        Self {
            image,
            command,
            args,
        }
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn command(&self) -> &[String] {
        &self.command
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Value following `--payload`, if present.
    pub fn payload(&self) -> Option<&str> {
        self.flag_value("--payload")
    }

    pub fn flag_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|arg| arg == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }

    /// Copy with the runtime placeholders substituted.
    ///
    /// A `--payload` value that parses as a [`CustomJobPayload`] is resolved
    /// field by field and re-serialized, so IDs are JSON-escaped. Any other
    /// payload is substituted as plain text.
    pub fn resolved(&self, values: &PlaceholderValues) -> JobLaunchDescriptor {
        let mut args = Vec::with_capacity(self.args.len());
        let mut is_payload = false;
        for arg in &self.args {
            args.push(if is_payload {
                resolve_payload(arg, values)
            } else {
                values.resolve(arg)
            });
            is_payload = arg == "--payload";
        }

        JobLaunchDescriptor {
            image: values.resolve(&self.image),
            command: self.command.iter().map(|c| values.resolve(c)).collect(),
            args,
        }
    }
}

fn resolve_payload(payload: &str, values: &PlaceholderValues) -> String {
    match serde_json::from_str::<CustomJobPayload>(payload) {
        Ok(parsed) => parsed.resolved(values).to_json(),
        Err(_) => values.resolve(payload),
    }
}

impl From<&JobLaunchDescriptor> for Container {
    fn from(descriptor: &JobLaunchDescriptor) -> Self {
        Container {
            name: LAUNCHER_CONTAINER_NAME.to_string(),
            image: Some(descriptor.image.clone()),
            command: Some(descriptor.command.clone()),
            args: Some(descriptor.args.clone()),
            ..Default::default()
        }
    }
}
