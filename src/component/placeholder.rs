/// Resolved by the orchestration runtime to the enclosing pipeline job ID.
pub const PIPELINE_JOB_ID_PLACEHOLDER: &str = "{{$.pipeline_job_uuid}}";

/// Resolved by the orchestration runtime to the current task ID.
pub const PIPELINE_TASK_ID_PLACEHOLDER: &str = "{{$.pipeline_task_uuid}}";

pub fn input_parameter(name: &str) -> String {
    format!("{{{{$.inputs.parameters['{name}']}}}}")
}

/// Path of the file the launched process writes an output parameter into.
pub fn output_parameter_file(name: &str) -> String {
    format!("{{{{$.outputs.parameters['{name}'].output_file}}}}")
}

/// Concrete values for the runtime placeholders.
///
/// Production descriptors keep the tokens opaque. This only exists to preview
/// what the runtime will submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderValues {
    pub pipeline_job_id: String,
    pub pipeline_task_id: String,
}

impl PlaceholderValues {
    pub fn new(pipeline_job_id: impl Into<String>, pipeline_task_id: impl Into<String>) -> Self {
        Self {
            pipeline_job_id: pipeline_job_id.into(),
            pipeline_task_id: pipeline_task_id.into(),
        }
    }

    pub fn resolve(&self, template: &str) -> String {
        template
            .replace(PIPELINE_JOB_ID_PLACEHOLDER, &self.pipeline_job_id)
            .replace(PIPELINE_TASK_ID_PLACEHOLDER, &self.pipeline_task_id)
    }
}
