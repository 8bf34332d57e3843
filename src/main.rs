use clap::Parser;
use runbook_tutor::config::manifest::PackageManifest;
use runbook_tutor::core::ConfigProvider;
use runbook_tutor::prompt::{self, RUNBOOK_TUTOR_PROMPT};
use runbook_tutor::utils::{logger, validation::Validate};
use runbook_tutor::{
    AgentServerClient, CliConfig, Command, LocalStorage, Result, RunbookTutor, TutorError,
    TutorSettings,
};

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }
    tracing::debug!("CLI config: {:?}", config);

    match run(config).await {
        Ok(output) => println!("{}", output),
        Err(e) => {
            tracing::error!(
                "❌ {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = e.severity().exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }
}

type Tutor = RunbookTutor<AgentServerClient, LocalStorage, TutorSettings>;

fn build_tutor(config: &CliConfig) -> Result<Tutor> {
    let settings = config.load_settings()?;
    settings.validate()?;
    tracing::info!("🔗 Agent server: {}", settings.agent_server_url());

    let client = AgentServerClient::new(settings.agent_server_url(), settings.request_timeout())?;
    let storage = LocalStorage::new(".".to_string());
    Ok(RunbookTutor::new(client, storage, settings))
}

async fn run(config: CliConfig) -> Result<String> {
    match &config.command {
        Command::Prompt => Ok(RUNBOOK_TUTOR_PROMPT.to_string()),
        Command::Tools => Ok(serde_json::to_string_pretty(&prompt::tool_definitions())?),
        Command::Manifest { path } => {
            let manifest = PackageManifest::from_file(path)?;
            manifest.validate()?;
            Ok(format!(
                "✅ {} is valid: {} ({} dependencies, {} exclusion patterns)",
                path,
                manifest.name,
                manifest.dependency_specs()?.len(),
                manifest.packaging.exclude.len()
            ))
        }
        Command::Agents => build_tutor(&config)?.get_all_agents().await,
        Command::Runbook { assistant_id } => {
            build_tutor(&config)?.get_agent_runbook(assistant_id).await
        }
        Command::UpdateRunbook {
            assistant_id,
            file,
            text,
        } => {
            let new_runbook = match (file, text) {
                (Some(path), _) => std::fs::read_to_string(path)?,
                (None, Some(text)) => text.clone(),
                (None, None) => return Err(TutorError::validation("Pass --file or --text")),
            };
            build_tutor(&config)?
                .update_agent_runbook(assistant_id, &new_runbook)
                .await
        }
        Command::LatestThread { assistant_id } => {
            build_tutor(&config)?.get_latest_thread(assistant_id).await
        }
        Command::Actions { .. } => {
            let packages = build_tutor(&config)?.get_actions(None).await?;
            Ok(serde_json::to_string_pretty(&packages)?)
        }
        Command::Deploy {
            name,
            description,
            system_prompt,
            tools,
            ..
        } => {
            let deployed = build_tutor(&config)?
                .deploy_agent_to_desktop(name, description, system_prompt, tools)
                .await?;
            Ok(serde_json::to_string_pretty(&deployed)?)
        }
        Command::Call { tool, arguments } => {
            build_tutor(&config)?.handle_tool_call(tool, arguments).await
        }
    }
}
