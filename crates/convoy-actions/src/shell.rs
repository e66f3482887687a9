use std::time::Instant;

use async_trait::async_trait;
use tokio::process::Command;

use convoy_core::action::{Action, ActionContext, Flag};
use convoy_core::error::ActionError;

/// Runs a command line through the host's command interpreter.
///
/// Fails with a data error when the command string is empty and a runtime
/// error when the interpreter reports nonzero completion. Spawning an
/// external process cannot be reversed, so the action is not undoable.
pub struct ShellCommand {
    description: String,
    command: String,
    verbosity: Flag,
}

impl ShellCommand {
    /// Create a shell action for the given command line.
    pub fn new(command: impl Into<String>) -> Self {
        let command = command.into();
        Self {
            description: format!("system command '{command}'"),
            command,
            verbosity: Flag::Inherit,
        }
    }

    /// Set the verbosity flag.
    pub fn with_verbosity(mut self, verbosity: Flag) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Override the diagnostic description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// The configured command line.
    pub fn command(&self) -> &str {
        &self.command
    }

    #[cfg(unix)]
    fn interpreter(&self) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(&self.command);
        cmd
    }

    #[cfg(windows)]
    fn interpreter(&self) -> Command {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(&self.command);
        cmd
    }
}

#[async_trait]
impl Action for ShellCommand {
    fn description(&self) -> &str {
        &self.description
    }

    fn verbosity(&self) -> Flag {
        self.verbosity
    }

    fn undoable(&self) -> bool {
        false
    }

    async fn execute(&mut self, ctx: &ActionContext) -> Result<(), ActionError> {
        if self.command.is_empty() {
            return Err(ActionError::data(
                "trying to execute an empty system command",
            ));
        }

        let verbose = self.is_verbose(ctx);
        if verbose {
            tracing::info!(command = %self.command, "start executing system command");
        }
        let started = Instant::now();

        let output = self
            .interpreter()
            .output()
            .await
            .map_err(|err| ActionError::runtime(format!("failed to spawn interpreter: {err}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ActionError::runtime(format!(
                "system command '{}' exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        if verbose {
            tracing::info!(
                command = %self.command,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "finished executing system command"
            );
        }
        Ok(())
    }
}
