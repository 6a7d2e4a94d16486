//! CLI Commands

pub mod init;
pub mod plan;
pub mod run;

pub use init::InitCommand;
pub use plan::PlanCommand;
pub use run::RunCommand;
