//! Configuration check
//!
//! Validates the effective configuration and credential without touching
//! the network.

use crew_core::format_error_for_cli;
use crew_llm::util::mask_api_key;

use crate::server::config::AppConfig;

/// Print the effective configuration and exit non-zero if it is unusable
pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("🏥 Research Crew Check\n");

    let mut all_ok = true;
    for line in report(config, |name| std::env::var(name).ok()) {
        all_ok &= !line.starts_with('❌');
        println!("{}", line);
    }

    println!();
    if all_ok {
        println!("✅ All checks passed! Ready to run Research Crew.");
        Ok(())
    } else {
        println!("⚠️  Some checks failed. Please fix the issues above.");
        std::process::exit(1);
    }
}

/// Build the check report, one line per item
fn report(config: &AppConfig, env: impl Fn(&str) -> Option<String>) -> Vec<String> {
    let mut lines = vec![
        format!("Server:   http://{}:{}", config.server.host, config.server.port),
        format!(
            "LLM:      {} ({}) at {}",
            config.llm.provider, config.llm.model, config.llm.base_url
        ),
    ];

    if config.llm.provider == "groq" {
        lines.push("Provider: ✅ groq".to_string());
    } else {
        lines.push(format!("❌ Unsupported LLM provider '{}'", config.llm.provider));
    }

    match config.resolve_api_key(env) {
        Ok(key) => lines.push(format!("API key:  ✅ {}", mask_api_key(&key))),
        Err(e) => lines.push(format!("❌ {}", format_error_for_cli(&e).trim_end())),
    }

    if config.search.enabled {
        lines.push(format!(
            "Search:   {} (region {}, max {} results)",
            config.search.endpoint, config.search.region, config.search.max_results
        ));
    } else {
        lines.push("Search:   disabled".to_string());
    }

    if config.crew.max_iterations == 0 {
        lines.push("❌ crew.max_iterations must be at least 1".to_string());
    } else {
        lines.push(format!(
            "Crew:     {} tool rounds, {}s tool timeout, {} stored runs",
            config.crew.max_iterations, config.crew.tool_timeout_secs, config.crew.max_stored_runs
        ));
    }
    lines.push(format!("Output:   {}", config.output.filename));

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_masks_key() {
        let report = report(&AppConfig::default(), |name| {
            (name == "GROQ_API_KEY").then(|| "gsk_1234567890abcdef".to_string())
        });
        let text = report.join("\n");

        assert!(text.contains("gsk_...cdef"));
        assert!(!text.contains("1234567890"));
        assert!(!report.iter().any(|l| l.starts_with('❌')));
    }

    #[test]
    fn test_report_missing_key() {
        let report = report(&AppConfig::default(), |_| None);
        assert!(report
            .iter()
            .any(|l| l.starts_with('❌') && l.contains("GROQ_API_KEY")));
    }

    #[test]
    fn test_report_unknown_provider() {
        let mut config = AppConfig::default();
        config.llm.provider = "openai".to_string();
        let report = report(&config, |_| Some("gsk_1234567890abcdef".to_string()));
        assert!(report.iter().any(|l| l.contains("Unsupported LLM provider")));
    }
}
