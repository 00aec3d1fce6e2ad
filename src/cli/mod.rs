use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use std::path::PathBuf;

use crate::component::placeholder::PlaceholderValues;
use crate::config::raw::RawConfig;

#[derive(Debug, Parser)]
#[clap(name = "automl-finalizer", version, about = "Render the AutoML Tabular finalizer job")]
pub(crate) struct Cli {
    #[clap(subcommand)]
    pub(crate) command: Command,

    /// YAML file with finalizer inputs; flags take precedence
    #[clap(short, long, global = true)]
    pub(crate) config: Option<PathBuf>,

    /// Write to this file instead of stdout
    #[clap(short, long, global = true)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Debug, Clone, Subcommand)]
pub(crate) enum Command {
    /// Launcher image, command and arguments
    Descriptor {
        #[clap(flatten)]
        inputs: InputArgs,

        #[clap(flatten)]
        preview: PreviewArgs,

        #[clap(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },

    /// CustomJob payload only, pretty-printed
    Payload {
        #[clap(flatten)]
        inputs: InputArgs,

        #[clap(flatten)]
        preview: PreviewArgs,
    },

    /// Launcher as a Kubernetes container manifest
    Container {
        #[clap(flatten)]
        inputs: InputArgs,

        #[clap(flatten)]
        preview: PreviewArgs,
    },

    /// Component definition with typed inputs and outputs
    Component {},
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Format {
    Json,
    Yaml,
}

#[derive(Debug, Clone, Default, Args)]
pub(crate) struct InputArgs {
    #[clap(long)]
    pub(crate) project: Option<String>,

    #[clap(long)]
    pub(crate) location: Option<String>,

    #[clap(long)]
    pub(crate) root_dir: Option<String>,

    #[clap(long)]
    pub(crate) encryption_spec_key_name: Option<String>,

    /// Output path for the gcp_resources handle
    #[clap(long)]
    pub(crate) gcp_resources: Option<String>,
}

/// Substitutes the runtime job and task IDs to show what will be submitted.
#[derive(Debug, Clone, Default, Args)]
pub(crate) struct PreviewArgs {
    #[clap(long, requires = "task_id")]
    pub(crate) job_id: Option<String>,

    #[clap(long, requires = "job_id")]
    pub(crate) task_id: Option<String>,
}

impl From<InputArgs> for RawConfig {
    fn from(args: InputArgs) -> Self {
        RawConfig {
            project: args.project,
            location: args.location,
            root_dir: args.root_dir,
            encryption_spec_key_name: args.encryption_spec_key_name,
            gcp_resources: args.gcp_resources,
        }
    }
}

impl PreviewArgs {
    pub(crate) fn values(&self) -> Option<PlaceholderValues> {
        match (&self.job_id, &self.task_id) {
            (Some(job), Some(task)) => Some(PlaceholderValues::new(job.clone(), task.clone())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_descriptor() {
        let cli = Cli::try_parse_from([
            "automl-finalizer",
            "descriptor",
            "--project",
            "p",
            "--root-dir",
            "gs://b",
            "--format",
            "yaml",
            "-c",
            "/etc/finalizer.yaml",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/etc/finalizer.yaml")));
        match cli.command {
            Command::Descriptor {
                inputs,
                preview,
                format,
            } => {
                assert_eq!(inputs.project.as_deref(), Some("p"));
                assert_eq!(inputs.root_dir.as_deref(), Some("gs://b"));
                assert_eq!(inputs.location, None);
                assert_eq!(format, Format::Yaml);
                assert_eq!(preview.values(), None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_preview_ids() {
        let cli = Cli::try_parse_from([
            "automl-finalizer",
            "payload",
            "--job-id",
            "J",
            "--task-id",
            "T",
        ])
        .unwrap();

        match cli.command {
            Command::Payload { preview, .. } => {
                assert_eq!(preview.values(), Some(PlaceholderValues::new("J", "T")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_job_id_requires_task_id() {
        assert!(
            Cli::try_parse_from(["automl-finalizer", "container", "--job-id", "J"]).is_err()
        );
    }

    #[test]
    fn test_input_args_into_raw_config() {
        let raw = RawConfig::from(InputArgs {
            encryption_spec_key_name: Some("k".to_string()),
            ..Default::default()
        });

        assert_eq!(raw.encryption_spec_key_name.as_deref(), Some("k"));
        assert_eq!(raw.project, None);
    }
}
