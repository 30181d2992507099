//! One-shot crew run from the terminal

use anyhow::Context;
use crew_core::{format_error_for_cli, validate_goal, CrewOutput, ResearchCrewBuilder};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::server::config::AppConfig;
use crate::server::{build_crew_builder, resolve_llm_provider, resolve_search_provider};

/// Run the crew for `goal`, print the result and optionally save it
pub async fn run(config: &AppConfig, goal: &str, output: Option<PathBuf>) -> anyhow::Result<()> {
    let outcome = match prepare(config, goal, |name| std::env::var(name).ok()) {
        Ok((goal, builder)) => {
            println!("🚀 Crew running (30-90 seconds)...\n");
            execute(&builder, goal, output.as_deref()).await
        }
        Err(e) => Err(e),
    };

    match outcome {
        Ok(result) => {
            println!("✅ Complete!\n");
            println!("{}", result.raw);
            if let Some(path) = output {
                println!("\n💾 Saved to {}", path.display());
            }
            Ok(())
        }
        Err(RunError::Crew(e)) => {
            eprintln!("{}", format_error_for_cli(&e));
            std::process::exit(1);
        }
        Err(RunError::Other(e)) => Err(e),
    }
}

pub(crate) enum RunError {
    Crew(crew_core::Error),
    Other(anyhow::Error),
}

/// Validate the goal, then the credential, then build the crew.
///
/// The goal goes first so an empty goal is reported even without a key.
pub(crate) fn prepare<'a>(
    config: &AppConfig,
    goal: &'a str,
    env: impl Fn(&str) -> Option<String>,
) -> Result<(&'a str, ResearchCrewBuilder), RunError> {
    let goal = validate_goal(goal).map_err(RunError::Crew)?;
    let api_key = config.resolve_api_key(env).map_err(RunError::Crew)?;
    let llm = resolve_llm_provider(config, api_key).map_err(RunError::Other)?;
    let search = resolve_search_provider(config).map_err(RunError::Other)?;
    Ok((goal, build_crew_builder(config, llm, search)))
}

/// Run the pipeline and write the raw result to `output` when given
pub(crate) async fn execute(
    builder: &ResearchCrewBuilder,
    goal: &str,
    output: Option<&Path>,
) -> Result<CrewOutput, RunError> {
    let result = builder.run(goal).await.map_err(RunError::Crew)?;
    info!(
        tasks = result.tasks_output.len(),
        duration_ms = result.duration_ms,
        "Crew run finished"
    );

    if let Some(path) = output {
        tokio::fs::write(path, &result.raw)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))
            .map_err(RunError::Other)?;
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crew_llm::{MockProvider, MockReply};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_execute_writes_raw_result() {
        let llm = Arc::new(MockProvider::with_replies([
            MockReply::text("signals"),
            MockReply::text("posts"),
            MockReply::text("print('signals')"),
        ]));
        let builder = ResearchCrewBuilder::new(llm);
        let path = std::env::temp_dir().join(format!("research-crew-{}.txt", uuid::Uuid::new_v4()));

        let result = match execute(&builder, "AI trends 2026", Some(&path)).await {
            Ok(result) => result,
            Err(_) => panic!("run should succeed"),
        };
        assert_eq!(result.raw, "print('signals')");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), result.raw);

        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_execute_empty_goal() {
        let llm = Arc::new(MockProvider::new());
        let builder = ResearchCrewBuilder::new(llm.clone());

        let outcome = execute(&builder, "  ", None).await;
        assert!(matches!(outcome, Err(RunError::Crew(crew_core::Error::EmptyGoal))));
        assert_eq!(llm.call_count(), 0);
    }

    #[test]
    fn test_empty_goal_reported_before_missing_key() {
        let outcome = prepare(&AppConfig::default(), "  ", |_| None);
        assert!(matches!(outcome, Err(RunError::Crew(crew_core::Error::EmptyGoal))));
    }

    #[test]
    fn test_missing_key_after_valid_goal() {
        let outcome = prepare(&AppConfig::default(), "AI trends 2026", |_| None);
        assert!(matches!(
            outcome,
            Err(RunError::Crew(crew_core::Error::ApiKeyMissing { .. }))
        ));
    }

    #[test]
    fn test_prepare_trims_goal() {
        let outcome = prepare(&AppConfig::default(), "  AI trends 2026 \n", |name| {
            (name == "GROQ_API_KEY").then(|| "gsk_1234567890abcdef".to_string())
        });
        match outcome {
            Ok((goal, builder)) => {
                assert_eq!(goal, "AI trends 2026");
                assert_eq!(builder.build(goal).unwrap().tasks().len(), 3);
            }
            Err(_) => panic!("prepare should succeed"),
        }
    }
}
