use serde::{Deserialize, Serialize};

use super::placeholder::PlaceholderValues;

/// CustomJob request body handed to the launcher through `--payload`.
///
/// Field order matters: it is the order the launcher and the pipeline UI see
/// in the serialized JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomJobPayload {
    pub display_name: String,
    pub encryption_spec: EncryptionSpec,
    pub job_spec: JobSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionSpec {
    /// Customer-managed key resource name. Empty means Google-managed.
    pub kms_key_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    pub worker_pool_specs: Vec<WorkerPoolSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerPoolSpec {
    pub replica_count: u32,
    pub machine_spec: MachineSpec,
    pub container_spec: ContainerSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineSpec {
    pub machine_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSpec {
    pub image_uri: String,
    pub args: Vec<String>,
}

impl CustomJobPayload {
    /// Compact JSON, as passed on the launcher command line.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .expect("CustomJobPayload holds only strings and integers and always serializes")
    }

    /// Substitutes the runtime placeholders field by field, so IDs containing
    /// JSON-special characters are escaped on the next `to_json`.
    pub fn resolved(&self, values: &PlaceholderValues) -> CustomJobPayload {
        CustomJobPayload {
            display_name: values.resolve(&self.display_name),
            encryption_spec: EncryptionSpec {
                kms_key_name: values.resolve(&self.encryption_spec.kms_key_name),
            },
            job_spec: JobSpec {
                worker_pool_specs: self
                    .job_spec
                    .worker_pool_specs
                    .iter()
                    .map(|pool| WorkerPoolSpec {
                        replica_count: pool.replica_count,
                        machine_spec: MachineSpec {
                            machine_type: values.resolve(&pool.machine_spec.machine_type),
                        },
                        container_spec: ContainerSpec {
                            image_uri: values.resolve(&pool.container_spec.image_uri),
                            args: pool
                                .container_spec
                                .args
                                .iter()
                                .map(|arg| values.resolve(arg))
                                .collect(),
                        },
                    })
                    .collect(),
            },
        }
    }
}
