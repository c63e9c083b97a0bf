//! Interactive menu shown when `hardhat` runs without a subcommand.

use dialoguer::{Input, Select};
use hardhat_planner::DEFAULT_COMMUTE_MAX_MINUTES;
use hardhat_server_models::PlanMoveParams;

enum Tool {
    Server,
    Plan,
    Migrate,
    SeedDemo,
}

impl Tool {
    const ALL: &[Self] = &[Self::Server, Self::Plan, Self::Migrate, Self::SeedDemo];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Server => "Start server",
            Self::Plan => "Plan a move",
            Self::Migrate => "Run migrations",
            Self::SeedDemo => "Load demo data",
        }
    }
}

/// Parses an optional dollar amount; blank input means "no limit".
fn parse_budget(input: &str) -> Result<Option<f64>, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<f64>()
        .map(Some)
        .map_err(|_| format!("Not a number: {trimmed}"))
}

fn prompt_budget(prompt: &str) -> Result<Option<f64>, Box<dyn std::error::Error>> {
    let raw: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .validate_with(|s: &String| parse_budget(s).map(|_| ()))
        .interact_text()?;
    Ok(parse_budget(&raw)?)
}

fn prompt_plan() -> Result<PlanMoveParams, Box<dyn std::error::Error>> {
    let slug: String = Input::new().with_prompt("Job site slug").interact_text()?;
    let budget_min = prompt_budget("Budget min (blank for none)")?;
    let budget_max = prompt_budget("Budget max (blank for none)")?;
    let commute_max: i32 = Input::new()
        .with_prompt("Max commute (minutes)")
        .default(DEFAULT_COMMUTE_MAX_MINUTES)
        .interact_text()?;

    Ok(PlanMoveParams {
        jobsite_slug: Some(slug),
        budget_min,
        budget_max,
        commute_max: Some(commute_max),
        ..PlanMoveParams::default()
    })
}

/// Prompts for a tool and runs it.
///
/// # Errors
///
/// Returns an error if a prompt fails or the selected tool fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("Hardhat Housing");
    println!();

    let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Tool::ALL[idx] {
        Tool::Server => crate::serve(true).await,
        Tool::Plan => crate::plan(&prompt_plan()?).await,
        Tool::Migrate => crate::migrate().await,
        Tool::SeedDemo => crate::seed(None).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_budget_is_none() {
        assert_eq!(parse_budget("  "), Ok(None));
        assert_eq!(parse_budget("950"), Ok(Some(950.0)));
        assert!(parse_budget("cheap").is_err());
    }
}
