pub mod agent_client;
pub mod catalog;
pub mod deploy;
pub mod runbook;
pub mod threads;
pub mod tutor;

pub use crate::domain::model::{
    ActionPackage, ActionPackages, Agent, AgentConfig, AgentUpdate, DeployedAgent, FileUpload,
    Message, NewAgent, NewThread, Thread, ThreadState,
};
pub use crate::domain::ports::{AgentPlatform, ConfigProvider, Storage};
pub use crate::utils::error::Result;
