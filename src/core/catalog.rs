use crate::core::{ActionPackage, ActionPackages, Storage};
use crate::domain::model::DesktopConfig;
use crate::utils::error::Result;

/// Action packages the tutor itself runs on; they are never offered to the
/// agents it builds.
pub const INTERNAL_ACTIONS: [&str; 4] = [
    "Sema4 Desktop Action Getter",
    "Thread Monitor",
    "Agent Deployer",
    "Retreival",
];

pub fn default_internal_actions() -> Vec<String> {
    INTERNAL_ACTIONS.iter().map(|s| s.to_string()).collect()
}

/// Reads the action packages registered with the desktop installation.
pub struct ActionCatalog<S: Storage> {
    storage: S,
    desktop_home: String,
}

impl<S: Storage> ActionCatalog<S> {
    pub fn new(storage: S, desktop_home: impl Into<String>) -> Self {
        Self {
            storage,
            desktop_home: desktop_home.into(),
        }
    }

    /// All registered packages except those named in `internal_actions`,
    /// each with the API spec from its `metadata.json`.
    pub async fn get_actions(&self, internal_actions: &[String]) -> Result<ActionPackages> {
        let config_path = format!("{}/config.json", self.desktop_home);
        tracing::debug!("📂 Reading desktop config: {}", config_path);

        let raw = self.storage.read_file(&config_path).await?;
        let config: DesktopConfig = serde_json::from_slice(&raw)?;

        let mut actions = Vec::new();
        for mapping in config.action_package_mapping {
            if internal_actions.iter().any(|name| name == &mapping.name) {
                tracing::debug!("Skipping internal action package: {}", mapping.name);
                continue;
            }

            let metadata_path = format!("{}/metadata.json", mapping.path);
            let metadata = self.storage.read_file(&metadata_path).await?;
            let api_spec = serde_json::from_slice(&metadata)?;

            actions.push(ActionPackage {
                name: mapping.name,
                port: mapping.action_server_port,
                api_spec,
            });
        }

        tracing::info!("📦 Found {} action packages", actions.len());
        Ok(ActionPackages { actions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::cli::LocalStorage;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_package(root: &std::path::Path, dir: &str, spec: serde_json::Value) -> String {
        let path = root.join(dir);
        std::fs::create_dir_all(&path).unwrap();
        std::fs::write(path.join("metadata.json"), spec.to_string()).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_get_actions_skips_internal_packages() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        let mail = write_package(root, "mail", json!({"openapi": "3.1.0", "info": {"title": "Mail"}}));
        // 內部套件沒有 metadata.json，若被讀取就會失敗
        let getter = root.join("getter").to_str().unwrap().to_string();

        let config = json!({
            "ActionPackageMapping": [
                {"name": "Mail", "path": mail, "actionServerPort": 8081},
                {"name": "Thread Monitor", "path": getter, "actionServerPort": 8082}
            ]
        });
        std::fs::write(root.join("config.json"), config.to_string()).unwrap();

        let storage = LocalStorage::new(root.to_str().unwrap().to_string());
        let catalog = ActionCatalog::new(storage, root.to_str().unwrap());

        let packages = catalog.get_actions(&default_internal_actions()).await.unwrap();
        assert_eq!(packages.actions.len(), 1);
        assert_eq!(packages.actions[0].name, "Mail");
        assert_eq!(packages.actions[0].port, 8081);
        assert_eq!(packages.actions[0].api_spec["info"]["title"], "Mail");
    }

    #[tokio::test]
    async fn test_get_actions_without_config_fails() {
        let temp_dir = TempDir::new().unwrap();
        let home = temp_dir.path().to_str().unwrap().to_string();
        let catalog = ActionCatalog::new(LocalStorage::new(home.clone()), home);

        assert!(catalog.get_actions(&[]).await.is_err());
    }
}
