//! Console output formatting for batch results

use chorus_application::ChorusReport;
use colored::Colorize;

/// Full report: answer, attribution, failures, and per-model responses.
pub fn format_full(question: &str, report: &ChorusReport) -> String {
    let result = &report.result;
    let mut output = String::new();

    output.push_str(&format!("{} {}\n\n", "Question:".cyan().bold(), question));

    output.push_str(&format!("{}\n\n{}\n", "=== Answer ===".cyan().bold(), result.combined_text));

    output.push_str(&format!(
        "\n{} {}/{} models answered{}\n",
        "Models:".cyan().bold(),
        result.success_count,
        result.total_requested,
        if result.synthesized {
            " (synthesized)"
        } else {
            ""
        }
    ));
    for model in &result.contributing_models {
        output.push_str(&format!(
            "  {} {} ({}ms)\n",
            "*".green(),
            model.name,
            model.duration_ms
        ));
    }
    for model in &result.failed_models {
        output.push_str(&format!("  {} {} (failed)\n", "x".red(), model.name));
    }

    output.push_str(&format!("\n{}\n", "=== Individual Responses ===".cyan().bold()));
    for outcome in &report.outcomes {
        if let Some(text) = &outcome.text {
            output.push_str(&format!(
                "\n{}\n{}\n",
                format!("── {} ──", outcome.model.name).yellow().bold(),
                text
            ));
        } else {
            output.push_str(&format!(
                "\n{}\nNo response\n",
                format!("── {} ──", outcome.model.name).red().bold()
            ));
        }
    }

    output
}

/// Just the combined answer.
pub fn format_answer(report: &ChorusReport) -> String {
    report.result.combined_text.clone()
}

/// The JSON payload the HTTP transport exposes for the batch path.
pub fn format_json(report: &ChorusReport) -> String {
    let result = &report.result;
    let payload = serde_json::json!({
        "response": result.combined_text,
        "models": result.contributing_models.iter().map(|m| {
            serde_json::json!({
                "name": m.name,
                "color": m.display_color,
                "durationMs": m.duration_ms,
            })
        }).collect::<Vec<_>>(),
        "failedModels": result.failed_models.iter().map(|m| {
            serde_json::json!({ "name": m.name })
        }).collect::<Vec<_>>(),
        "synthesized": result.synthesized,
        "successCount": result.success_count,
        "totalModels": result.total_requested,
        "individualResponses": report.outcomes.iter().filter(|o| o.succeeded).map(|o| {
            serde_json::json!({
                "model": o.model.name,
                "response": o.text,
                "durationMs": o.duration_ms,
            })
        }).collect::<Vec<_>>(),
    });
    serde_json::to_string_pretty(&payload).unwrap_or_else(|_| "{}".to_string())
}
