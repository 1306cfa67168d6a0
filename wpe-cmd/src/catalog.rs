//! `variables` and `health`.

use log::info;
use wpe_core::client::WeatherApi;
use wpe_core::result::HealthStatus;
use wpe_core::variable::VariablesResponse;

use crate::config::Config;

pub fn format_variables(catalog: &VariablesResponse) -> String {
    let mut lines = vec![format!(
        "{:<14} {:<14} {:<8} {:<22} {}",
        "Id", "Name", "Unit", "Dataset", "Since"
    )];
    for variable in &catalog.variables {
        lines.push(format!(
            "{:<14} {:<14} {:<8} {:<22} {}",
            variable.id.as_str(), variable.name, variable.unit, variable.dataset, variable.available_from
        ));
        if !variable.description.is_empty() {
            lines.push(format!("  {}", variable.description));
        }
    }
    lines.join("\n")
}

pub fn format_health(health: &HealthStatus) -> String {
    format!(
        "Status: {}\nEarthdata authenticated: {}",
        health.status,
        if health.earthdata_authenticated { "yes" } else { "no" }
    )
}

pub async fn run_variables(config: &Config) -> anyhow::Result<()> {
    let catalog = WeatherApi::new(config.api_url.as_str()).get_variables().await?;
    info!("Backend offers {} variable(s)", catalog.variables.len());
    println!("{}", format_variables(&catalog));
    Ok(())
}

pub async fn run_health(config: &Config) -> anyhow::Result<()> {
    let health = WeatherApi::new(config.api_url.as_str()).health_check().await?;
    println!("{}", format_health(&health));
    Ok(())
}
