use tracing::{Level, instrument};

use super::descriptor::JobLaunchDescriptor;
use super::payload::{
    ContainerSpec, CustomJobPayload, EncryptionSpec, JobSpec, MachineSpec, WorkerPoolSpec,
};
use super::placeholder::{
    PIPELINE_JOB_ID_PLACEHOLDER, PIPELINE_TASK_ID_PLACEHOLDER, output_parameter_file,
};

pub const LAUNCHER_IMAGE: &str = "gcr.io/ml-pipeline/google-cloud-pipeline-components:1.0.44";
pub const LAUNCHER_MODULE: &str =
    "google_cloud_pipeline_components.container.v1.custom_job.launcher";
pub const TRAINING_IMAGE: &str =
    "us-docker.pkg.dev/vertex-ai-restricted/automl-tabular/training:20230605_0125";
pub const MACHINE_TYPE: &str = "n1-standard-8";
pub const JOB_TYPE: &str = "CustomJob";
pub const GCP_RESOURCES_OUTPUT: &str = "gcp_resources";

const DISPLAY_NAME_PREFIX: &str = "automl-tabular-finalizer";
const TUNER_COMMAND: &str = "cancel_l2l_tuner";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizerInputs {
    /// Project to run the finalizer job in
    pub project: String,

    /// Region to run the finalizer job in
    pub location: String,

    /// Cloud Storage root the training pipeline wrote its outputs under
    ///
    /// Example: "gs://bucket/path"
    pub root_dir: String,

    /// Customer-managed encryption key, empty when unused
    pub encryption_spec_key_name: String,

    /// Where the launcher writes the handle of the job it creates
    pub gcp_resources: String,
}

impl FinalizerInputs {
    pub fn new(
        project: impl Into<String>,
        location: impl Into<String>,
        root_dir: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            location: location.into(),
            root_dir: root_dir.into(),
            encryption_spec_key_name: String::new(),
            gcp_resources: output_parameter_file(GCP_RESOURCES_OUTPUT),
        }
    }

    pub fn with_encryption_spec_key_name(mut self, key: impl Into<String>) -> Self {
        self.encryption_spec_key_name = key.into();
        self
    }

    pub fn with_gcp_resources(mut self, path: impl Into<String>) -> Self {
        self.gcp_resources = path.into();
        self
    }
}

/// Builds the launcher invocation for the AutoML Tabular finalizer job,
/// which cancels the L2L tuner and cleans up lingering long-running operations.
///
/// Inputs are spliced in as-is; bad values only surface when the launcher runs.
#[instrument(
    "automl_tabular_finalizer",
    level = Level::DEBUG,
    skip(inputs),
    fields(project = %inputs.project, location = %inputs.location)
)]
pub fn automl_tabular_finalizer(inputs: &FinalizerInputs) -> JobLaunchDescriptor {
    let payload = finalizer_payload(&inputs.root_dir, &inputs.encryption_spec_key_name);

    JobLaunchDescriptor::new(
        LAUNCHER_IMAGE.to_string(),
        vec![
            "python3".to_string(),
            "-u".to_string(),
            "-m".to_string(),
            LAUNCHER_MODULE.to_string(),
        ],
        vec![
            "--type".to_string(),
            JOB_TYPE.to_string(),
            "--project".to_string(),
            inputs.project.clone(),
            "--location".to_string(),
            inputs.location.clone(),
            "--gcp_resources".to_string(),
            inputs.gcp_resources.clone(),
            "--payload".to_string(),
            payload.to_json(),
        ],
    )
}

fn finalizer_payload(root_dir: &str, kms_key_name: &str) -> CustomJobPayload {
    let job = PIPELINE_JOB_ID_PLACEHOLDER;
    let task = PIPELINE_TASK_ID_PLACEHOLDER;

    CustomJobPayload {
        display_name: format!("{DISPLAY_NAME_PREFIX}-{job}-{task}"),
        encryption_spec: EncryptionSpec {
            kms_key_name: kms_key_name.to_string(),
        },
        job_spec: JobSpec {
            worker_pool_specs: vec![WorkerPoolSpec {
                replica_count: 1,
                machine_spec: MachineSpec {
                    machine_type: MACHINE_TYPE.to_string(),
                },
                container_spec: ContainerSpec {
                    image_uri: TRAINING_IMAGE.to_string(),
                    args: vec![
                        TUNER_COMMAND.to_string(),
                        format!("--error_file_path={root_dir}/{job}/{task}/error.pb"),
                        format!("--cleanup_lro_job_infos={root_dir}/{job}/lro"),
                    ],
                },
            }],
        },
    }
}
