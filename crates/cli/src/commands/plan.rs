//! solve-provision plan command

use anyhow::Context;
use clap::Args;
use orchestrator::Plan;
use shared::NetworkManifest;
use solve_adapter::{standard_orchestrator, SolverSettings};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct PlanCommand {
    /// Network manifest (.json, .yaml or .yml)
    pub manifest: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl PlanCommand {
    pub fn run(&self) -> anyhow::Result<()> {
        let plan = self.plan()?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&to_json(&plan))?);
        } else {
            print_plan(&plan);
        }
        Ok(())
    }

    fn plan(&self) -> anyhow::Result<Plan> {
        let manifest = NetworkManifest::from_file(&self.manifest)
            .with_context(|| format!("Failed to load manifest {}", self.manifest.display()))?;
        let network = manifest.to_network()?;
        let settings = SolverSettings::from_manifest(&manifest)?;
        Ok(standard_orchestrator(&settings).plan(&network))
    }
}

fn to_json(plan: &Plan) -> serde_json::Value {
    serde_json::json!({
        "network": plan.network.as_str(),
        "eligible": plan.eligible,
        "deployments": plan
            .deployments
            .iter()
            .map(|(chain, kind)| serde_json::json!({ "chain": chain, "artifact": kind.name() }))
            .collect::<Vec<_>>(),
        "setupTasks": plan
            .setup_tasks
            .iter()
            .map(|(name, idempotent)| serde_json::json!({ "name": name, "idempotent": idempotent }))
            .collect::<Vec<_>>(),
    })
}

fn print_plan(plan: &Plan) {
    if !plan.eligible {
        println!("Network {} is not ephemeral, a run would skip it", plan.network);
        return;
    }

    println!("Network {}", plan.network);
    println!("Phase 1 - deploy boxes:");
    for (chain, kind) in &plan.deployments {
        println!("  {} on {}", kind, chain);
    }
    println!("Phase 2 - setup targets:");
    for (name, idempotent) in &plan.setup_tasks {
        let marker = if *idempotent { "" } else { " (not idempotent)" };
        println!("  {}{}", name, marker);
    }
}
