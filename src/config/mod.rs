pub mod cli;
pub mod manifest;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use args::{CliConfig, Command};

#[cfg(feature = "cli")]
mod args {
    use super::toml_config::TutorConfig;
    use crate::config::toml_config::TutorSettings;
    use crate::utils::error::Result;
    use clap::{ArgGroup, Parser, Subcommand};
    use std::path::Path;

    #[derive(Debug, Clone, Parser)]
    #[command(name = "runbook-tutor")]
    #[command(about = "Actions of the Runbook Tutor: inspect, update and deploy agent runbooks")]
    pub struct CliConfig {
        /// Agent server base URL
        #[arg(long, global = true, env = "AGENT_SERVER_URL")]
        pub server_url: Option<String>,

        /// TOML configuration file
        #[arg(short, long, global = true)]
        pub config: Option<String>,

        /// Dotenv file loaded before anything else
        #[arg(long, global = true, default_value = "devdata/.env")]
        pub env_file: String,

        /// Desktop installation directory (defaults to $ROBOCORP_HOME/sema4ai-desktop)
        #[arg(long, global = true)]
        pub desktop_home: Option<String>,

        /// Request timeout in seconds
        #[arg(long, global = true)]
        pub timeout: Option<u64>,

        #[arg(short, long, global = true, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, global = true, help = "Log as JSON lines")]
        pub json_logs: bool,

        #[command(subcommand)]
        pub command: Command,
    }

    #[derive(Debug, Clone, Subcommand)]
    pub enum Command {
        /// List all agents and their ids
        Agents,
        /// Print the runbook of an agent
        Runbook { assistant_id: String },
        /// Replace the runbook of an agent
        #[command(group(ArgGroup::new("source").required(true).args(["file", "text"])))]
        UpdateRunbook {
            assistant_id: String,
            /// Read the new runbook from a file
            #[arg(long)]
            file: Option<String>,
            /// New runbook text
            #[arg(long)]
            text: Option<String>,
        },
        /// Summarize the latest thread of an agent
        LatestThread { assistant_id: String },
        /// List the action packages available to agents
        Actions {
            /// Package names to leave out (replaces the default internal list)
            #[arg(long = "internal")]
            internal: Vec<String>,
        },
        /// Deploy a new agent from the bundle template
        Deploy {
            #[arg(long)]
            name: String,
            #[arg(long)]
            description: String,
            /// Runbook text, or a path to a runbook file
            #[arg(long)]
            system_prompt: String,
            /// JSON list of {"tool_name": ..., "port": ...}
            #[arg(long, default_value = "[]")]
            tools: String,
            #[arg(long)]
            template: Option<String>,
        },
        /// Run a tool call the way the model would issue it
        Call {
            tool: String,
            /// JSON object of arguments
            #[arg(default_value = "{}")]
            arguments: String,
        },
        /// Print the tutor's system prompt
        Prompt,
        /// Print the tool definitions as JSON
        Tools,
        /// Validate an action package manifest
        Manifest {
            #[arg(default_value = "package.yaml")]
            path: String,
        },
    }

    impl CliConfig {
        /// Loads the dotenv file, then layers config file and flags.
        pub fn load_settings(&self) -> Result<TutorSettings> {
            if Path::new(&self.env_file).exists() {
                match dotenvy::from_path(&self.env_file) {
                    Ok(()) => tracing::debug!("Loaded environment from {}", self.env_file),
                    Err(e) => tracing::warn!("Could not load {}: {}", self.env_file, e),
                }
            }

            let file_config = match &self.config {
                Some(path) => {
                    tracing::info!("📁 Loading configuration from: {}", path);
                    TutorConfig::from_file(path)?
                }
                None => TutorConfig::default(),
            };

            let mut settings = file_config.settings();
            if let Some(url) = &self.server_url {
                settings.agent_server_url = url.clone();
            }
            if let Some(home) = &self.desktop_home {
                settings.desktop_home = Some(home.clone());
            }
            if let Some(timeout) = self.timeout {
                settings.timeout_seconds = timeout;
            }
            if let Command::Deploy {
                template: Some(template),
                ..
            } = &self.command
            {
                settings.template_path = template.clone();
            }
            if let Command::Actions { internal } = &self.command {
                if !internal.is_empty() {
                    settings.internal_actions = internal.clone();
                }
            }

            Ok(settings)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use clap::CommandFactory;

        #[test]
        fn test_cli_definition() {
            CliConfig::command().debug_assert();
        }

        #[test]
        fn test_flags_override_defaults() {
            let cli = CliConfig::try_parse_from([
                "runbook-tutor",
                "--server-url",
                "http://localhost:9100",
                "--timeout",
                "7",
                "--env-file",
                "does-not-exist.env",
                "actions",
                "--internal",
                "Agent Deployer",
            ])
            .unwrap();

            let settings = cli.load_settings().unwrap();
            assert_eq!(settings.agent_server_url, "http://localhost:9100");
            assert_eq!(settings.timeout_seconds, 7);
            assert_eq!(settings.internal_actions, vec!["Agent Deployer".to_string()]);
        }

        #[test]
        fn test_update_runbook_needs_a_source() {
            let result =
                CliConfig::try_parse_from(["runbook-tutor", "update-runbook", "a1"]);
            assert!(result.is_err());

            let cli = CliConfig::try_parse_from([
                "runbook-tutor",
                "update-runbook",
                "a1",
                "--text",
                "You are helpful.",
            ])
            .unwrap();
            assert!(matches!(cli.command, Command::UpdateRunbook { text: Some(_), .. }));
        }
    }
}
