// Domain layer: models of the agent server and desktop installation, and the ports the core talks through.

pub mod model;
pub mod ports;
