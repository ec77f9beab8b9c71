use crate::utils::error::{PipelineError, Result};
use tokio::process::Command;

/// Runner for the external model-export utilities. The pipeline treats them
/// as black-box batch commands: one blocking invocation, non-zero exit is a
/// hard failure, stdout/stderr are surfaced as diagnostics only.
pub struct ModelExport {
    program: String,
    args: Vec<String>,
}

impl ModelExport {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Exports the architecture model to JSON via the npm script, the step
    /// the static extraction strategy expects to have run beforehand.
    pub fn json_export() -> Self {
        Self::new("npm", &["run", "export:json"])
    }

    /// Exports all model views as PNG images via the LikeC4 CLI.
    pub fn image_export(output_dir: &str) -> Self {
        Self::new("npx", &["likec4", "export", "png", "-o", output_dir])
    }

    pub async fn run(&self) -> Result<()> {
        tracing::info!("Running export command: {} {}", self.program, self.args.join(" "));

        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .await
            .map_err(|e| {
                PipelineError::ExternalService(format!(
                    "failed to launch '{}': {}",
                    self.program, e
                ))
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            tracing::debug!("[export stderr]: {}", stderr.trim());
        }

        if !output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            tracing::error!("Export command failed with {}", output.status);
            if !stdout.trim().is_empty() {
                tracing::error!("[export stdout]: {}", stdout.trim());
            }
            return Err(PipelineError::ExternalService(format!(
                "export command '{}' exited with {}",
                self.program, output.status
            )));
        }

        tracing::info!("Export command completed successfully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_success() {
        let export = ModelExport::new("true", &[]);
        assert!(export.run().await.is_ok());
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_external_service_error() {
        let export = ModelExport::new("false", &[]);
        let err = export.run().await.unwrap_err();
        assert!(matches!(err, PipelineError::ExternalService(_)));
    }

    #[tokio::test]
    async fn test_missing_program_is_external_service_error() {
        let export = ModelExport::new("definitely-not-a-real-command", &[]);
        let err = export.run().await.unwrap_err();
        assert!(matches!(err, PipelineError::ExternalService(_)));
    }
}
