use anyhow::Result;
use httpmock::prelude::*;
use runbook_tutor::{AgentServerClient, LocalStorage, RunbookTutor, TutorConfig, TutorError};
use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;

const TEMPLATE: &str = r#"
s4d-bundle:
  agents:
    - agent:
        name: Template Agent
        description: Placeholder
        model:
          provider: OpenAI
          name: gpt-4o
        system-prompt: runbook.md
        retrieval-prompt: retrieval.md
        tools:
          - retrieval
        files:
          - docs/policy.md
"#;

fn setup_action_root() -> Result<TempDir> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    std::fs::write(root.join("template.yml"), TEMPLATE)?;
    std::fs::write(root.join("retrieval.md"), "Search the uploaded policy.")?;
    std::fs::write(root.join("runbook.md"), "You answer questions about expenses.")?;
    std::fs::create_dir_all(root.join("docs"))?;
    std::fs::write(root.join("docs/policy.md"), "# Expense policy")?;
    Ok(temp_dir)
}

#[tokio::test]
async fn test_deploy_agent_to_desktop() -> Result<()> {
    let temp_dir = setup_action_root()?;
    let server = MockServer::start();

    let create = server.mock(|when, then| {
        when.method(POST).path("/assistants").json_body(json!({
            "name": "Expense Helper",
            "config": {"configurable": {
                "type==agent/retrieval_description": "Search the uploaded policy.",
                "type==agent/agent_type": {"provider": "OpenAI", "name": "gpt-4o"},
                "type==agent/system_message": "You help with expense reports.",
                "type==agent/tools": [{
                    "type": "action_server_by_sema4ai",
                    "name": "Action Server by Sema4.ai",
                    "description": "Run AI actions with [Sema4.ai Action Server](https://github.com/Sema4AI/actions).",
                    "config": {
                        "url": "http://localhost:8081",
                        "api_key": "APIKEY",
                        "name": "Expenses",
                        "isBundled": "false"
                    }
                }],
                "type": "agent",
                "type==agent/interrupt_before_action": false,
                "type==agent/description": "Answers expense questions"
            }}
        }));
        then.status(200).json_body(json!({
            "assistant_id": "new-agent",
            "name": "Expense Helper",
            "config": {"configurable": {}}
        }));
    });
    let ingest = server.mock(|when, then| {
        when.method(POST)
            .path("/ingest")
            .body_contains("filename=\"policy.md\"")
            .body_contains("# Expense policy")
            .body_contains("new-agent");
        then.status(200).json_body(json!([]));
    });
    let welcome = server.mock(|when, then| {
        when.method(POST).path("/threads").json_body(json!({
            "name": "Welcome",
            "assistant_id": "new-agent",
            "starting_message": "Hi! How can I help you with today?"
        }));
        then.status(200).json_body(json!({"thread_id": "welcome-thread"}));
    });

    let settings = TutorConfig::default().settings();
    let client = AgentServerClient::new(server.base_url(), Duration::from_secs(5))?;
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
    let tutor = RunbookTutor::new(client, storage, settings);

    let deployed = tutor
        .deploy_agent_to_desktop(
            "Expense Helper",
            "Answers expense questions",
            "You help with expense reports.",
            r#"[{"tool_name": "Expenses", "port": 8081}]"#,
        )
        .await?;

    create.assert();
    ingest.assert();
    welcome.assert();
    assert_eq!(deployed.assistant_id, "new-agent");
    assert_eq!(deployed.thread_id, "welcome-thread");
    Ok(())
}

#[tokio::test]
async fn test_deploy_reads_runbook_file() -> Result<()> {
    let temp_dir = setup_action_root()?;
    let server = MockServer::start();

    let create = server.mock(|when, then| {
        when.method(POST)
            .path("/assistants")
            .body_contains("You answer questions about expenses.");
        then.status(200).json_body(json!({"assistant_id": "a9", "name": "Expense Helper"}));
    });
    server.mock(|when, then| {
        when.method(POST).path("/ingest");
        then.status(200).json_body(json!([]));
    });
    server.mock(|when, then| {
        when.method(POST).path("/threads");
        then.status(200).json_body(json!({"thread_id": "t9"}));
    });

    let settings = TutorConfig::default().settings();
    let client = AgentServerClient::new(server.base_url(), Duration::from_secs(5))?;
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
    let tutor = RunbookTutor::new(client, storage, settings);

    let out = tutor
        .handle_tool_call(
            "deploy_agent_to_desktop",
            r#"{"name": "Expense Helper", "description": "d", "system_prompt": "runbook.md", "tool_names": "[]"}"#,
        )
        .await?;

    create.assert();
    let deployed: serde_json::Value = serde_json::from_str(&out)?;
    assert_eq!(deployed["assistant_id"], "a9");
    assert_eq!(deployed["thread_id"], "t9");
    Ok(())
}

#[tokio::test]
async fn test_deploy_rejects_string_port_before_any_request() -> Result<()> {
    let temp_dir = setup_action_root()?;
    let server = MockServer::start();
    let create = server.mock(|when, then| {
        when.method(POST).path("/assistants");
        then.status(200);
    });

    let settings = TutorConfig::default().settings();
    let client = AgentServerClient::new(server.base_url(), Duration::from_secs(5))?;
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
    let tutor = RunbookTutor::new(client, storage, settings);

    let err = tutor
        .deploy_agent_to_desktop("x", "y", "z", r#"[{"tool_name": "Expenses", "port": "8081"}]"#)
        .await
        .unwrap_err();

    assert!(matches!(err, TutorError::InvalidConfigValueError { .. }));
    create.assert_hits(0);
    Ok(())
}

#[tokio::test]
async fn test_deploy_rejects_runbook_with_invalid_utf8() -> Result<()> {
    let temp_dir = setup_action_root()?;
    std::fs::write(temp_dir.path().join("runbook.md"), b"Expenses \xe9t\xe9 \xff")?;
    let server = MockServer::start();
    let create = server.mock(|when, then| {
        when.method(POST).path("/assistants");
        then.status(200);
    });

    let settings = TutorConfig::default().settings();
    let client = AgentServerClient::new(server.base_url(), Duration::from_secs(5))?;
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
    let tutor = RunbookTutor::new(client, storage, settings);

    let err = tutor
        .deploy_agent_to_desktop("Expense Helper", "d", "runbook.md", "[]")
        .await
        .unwrap_err();

    assert!(matches!(err, TutorError::ValidationError { .. }));
    create.assert_hits(0);
    Ok(())
}
