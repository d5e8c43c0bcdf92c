//! Built-in tools served by `toolrelay-server`
//!
//! - `echo`: returns its input
//! - `calculate`: arithmetic over numbers and operators only
//! - `get_system_info`: platform, architecture, working directory
//! - `advanced`: structured profile input
//! - `add`, `greet`: small demo tools

mod calculate;
mod demo;
mod echo;
mod profile;
mod system_info;

pub use calculate::{evaluate, CalculateTool, Number};
pub use demo::{AddTool, GreetTool};
pub use echo::EchoTool;
pub use profile::ProfileTool;
pub use system_info::SystemInfoTool;

use super::tool::ServerTool;
use std::sync::Arc;

/// Every built-in tool, in advertised order
pub fn all_tools() -> Vec<Arc<dyn ServerTool>> {
    vec![
        Arc::new(EchoTool),
        Arc::new(CalculateTool),
        Arc::new(SystemInfoTool),
        Arc::new(ProfileTool),
        Arc::new(AddTool),
        Arc::new(GreetTool),
    ]
}
