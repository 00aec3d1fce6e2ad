use self::cli::{Cli, Command, Format, InputArgs, PreviewArgs};
use self::component::ComponentSpec;
use self::component::descriptor::JobLaunchDescriptor;
use self::component::payload::CustomJobPayload;
use self::config::Config;
use self::error::{SpannedErr, SpannedExt};
use clap::Parser;
use k8s_openapi::api::core::v1::Container;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;
use tracing_error::ExtractSpanTrace;
use tracing_error::SpanTrace;

pub(crate) mod cli;
pub mod component;
pub mod config;
pub mod error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Failed to load config.\n{0}")]
    ConfigError(#[from] config::ConfigLoadError),

    #[error("Inputs do not match the component definition.\n{0}")]
    BindError(#[from] SpannedErr<component::BindError>),

    #[error("Launcher arguments carry no --payload value")]
    MissingPayload(SpanTrace),

    #[error("The --payload value is not a valid CustomJob payload.\n{0}")]
    InvalidPayload(SpannedErr<serde_json::Error>),

    #[error("Failed to render output.\n{0}")]
    RenderJson(#[from] SpannedErr<serde_json::Error>),

    #[error("Failed to render output.\n{0}")]
    RenderYaml(#[from] SpannedErr<serde_yaml::Error>),

    #[error("Failed to write '{0}'.\n{1}")]
    WriteOutput(PathBuf, SpannedErr<std::io::Error>),
}

impl ExtractSpanTrace for AppError {
    fn span_trace(&self) -> Option<&SpanTrace> {
        match self {
            AppError::ConfigError(e) => e.span_trace(),
            AppError::BindError(e) => e.span_trace(),
            AppError::MissingPayload(s) => Some(s),
            AppError::InvalidPayload(e) => e.span_trace(),
            AppError::RenderJson(e) => e.span_trace(),
            AppError::RenderYaml(e) => e.span_trace(),
            AppError::WriteOutput(_, e) => e.span_trace(),
        }
    }
}

pub async fn app() -> Result<(), AppError> {
    run(Cli::parse()).await
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let component = ComponentSpec::automl_tabular_finalizer();

    let rendered = match cli.command {
        Command::Descriptor {
            inputs,
            preview,
            format,
        } => {
            let descriptor = bind(&component, cli.config, inputs, &preview).await?;
            match format {
                Format::Json => serde_json::to_string_pretty(&descriptor).with_span_trace()?,
                Format::Yaml => serde_yaml::to_string(&descriptor).with_span_trace()?,
            }
        }
        Command::Payload { inputs, preview } => {
            let descriptor = bind(&component, cli.config, inputs, &preview).await?;
            serde_json::to_string_pretty(&parse_payload(&descriptor)?).with_span_trace()?
        }
        Command::Container { inputs, preview } => {
            let descriptor = bind(&component, cli.config, inputs, &preview).await?;
            serde_yaml::to_string(&Container::from(&descriptor)).with_span_trace()?
        }
        Command::Component {} => component.to_yaml().with_span_trace()?,
    };

    match cli.output {
        Some(path) => {
            tokio::fs::write(&path, rendered)
                .await
                .with_span_trace()
                .map_err(|e| AppError::WriteOutput(path.clone(), e))?;
            info!("Wrote {}.", path.display());
        }
        None => println!("{rendered}"),
    }

    Ok(())
}

fn parse_payload(descriptor: &JobLaunchDescriptor) -> Result<CustomJobPayload, AppError> {
    let payload = descriptor
        .payload()
        .ok_or_else(|| AppError::MissingPayload(SpanTrace::capture()))?;
    serde_json::from_str(payload)
        .with_span_trace()
        .map_err(AppError::InvalidPayload)
}

async fn bind(
    component: &ComponentSpec,
    config_path: Option<PathBuf>,
    inputs: InputArgs,
    preview: &PreviewArgs,
) -> Result<JobLaunchDescriptor, AppError> {
    let config = Config::load(config_path.as_deref(), inputs.into()).await?;

    info!("Config Loaded.");

    let descriptor = component.bind(&config.call_site()).with_span_trace()?;

    Ok(match preview.values() {
        Some(values) => {
            info!(
                "Previewing with job ID '{}' and task ID '{}'.",
                values.pipeline_job_id, values.pipeline_task_id
            );
            descriptor.resolved(&values)
        }
        None => descriptor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::finalizer::LAUNCHER_IMAGE;

    async fn run_to_file(name: &str, args: &[&str]) -> String {
        let path = std::env::temp_dir().join(format!(
            "automl-finalizer-{name}-{}.out",
            std::process::id()
        ));
        let path_arg = path.to_string_lossy().into_owned();

        let mut argv = vec!["automl-finalizer", "-o", path_arg.as_str()];
        argv.extend_from_slice(args);
        run(Cli::try_parse_from(argv).unwrap()).await.unwrap();

        let rendered = tokio::fs::read_to_string(&path).await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();
        rendered
    }

    const INPUTS: [&str; 6] = [
        "--project",
        "p",
        "--location",
        "us-central1",
        "--root-dir",
        "gs://bucket/path",
    ];

    #[tokio::test]
    async fn test_render_descriptor_json() {
        let mut args = vec!["descriptor"];
        args.extend_from_slice(&INPUTS);
        let rendered = run_to_file("descriptor", &args).await;

        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["image"].as_str(), Some(LAUNCHER_IMAGE));
        assert_eq!(value["args"][3].as_str(), Some("p"));
    }

    #[tokio::test]
    async fn test_render_payload_with_preview_ids() {
        let mut args = vec!["payload", "--job-id", r#"a"b"#, "--task-id", "T"];
        args.extend_from_slice(&INPUTS);
        let rendered = run_to_file("payload", &args).await;

        let payload: CustomJobPayload = serde_json::from_str(&rendered).unwrap();
        assert_eq!(payload.display_name, r#"automl-tabular-finalizer-a"b-T"#);
        assert_eq!(
            payload.job_spec.worker_pool_specs[0].container_spec.args[1],
            r#"--error_file_path=gs://bucket/path/a"b/T/error.pb"#
        );
    }

    #[tokio::test]
    async fn test_render_container_yaml() {
        let mut args = vec!["container"];
        args.extend_from_slice(&INPUTS);
        let rendered = run_to_file("container", &args).await;

        let container: Container = serde_yaml::from_str(&rendered).unwrap();
        assert_eq!(container.name, "main");
        assert_eq!(container.image.as_deref(), Some(LAUNCHER_IMAGE));
    }

    #[tokio::test]
    async fn test_render_component_yaml() {
        let rendered = run_to_file("component", &["component"]).await;

        let value: serde_yaml::Value = serde_yaml::from_str(&rendered).unwrap();
        assert_eq!(value["name"].as_str(), Some(component::COMPONENT_NAME));
    }

    #[test]
    fn test_parse_payload_errors() {
        let without = JobLaunchDescriptor::new(
            LAUNCHER_IMAGE.to_string(),
            vec![],
            vec!["--type".to_string(), "CustomJob".to_string()],
        );
        assert!(matches!(
            parse_payload(&without),
            Err(AppError::MissingPayload(_))
        ));

        let malformed = JobLaunchDescriptor::new(
            LAUNCHER_IMAGE.to_string(),
            vec![],
            vec!["--payload".to_string(), r#"{"display_name":"#.to_string()],
        );
        let err = parse_payload(&malformed).unwrap_err();
        assert!(matches!(err, AppError::InvalidPayload(_)));
        assert!(err.to_string().starts_with("The --payload value is not a valid CustomJob payload."));
    }

    #[tokio::test]
    async fn test_missing_input_is_bind_error() {
        let cli = Cli::try_parse_from(["automl-finalizer", "descriptor", "--project", "p"]).unwrap();
        let err = run(cli).await.unwrap_err();

        assert!(matches!(err, AppError::BindError(_)));
    }
}
