use anyhow::Result;
use colored::Colorize;
use maw_game::numbers::u64_to_f64;
use std::io::Write;
use std::time::Duration;

use super::ScenarioResult;

fn pass_counts(results: &[ScenarioResult]) -> (usize, usize, f64) {
    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    let as_f64 = |n: usize| u64_to_f64(u64::try_from(n).unwrap_or(u64::MAX));
    let success_rate = if total == 0 {
        0.0
    } else {
        (as_f64(passed) / as_f64(total)) * 100.0
    };
    (total, passed, success_rate)
}

pub fn generate_console_report(
    out: &mut dyn Write,
    results: &[ScenarioResult],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Maw Session Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "==============================".cyan())?;

    let (total, passed, success_rate) = pass_counts(results);
    writeln!(out, "Total scenarios: {total}")?;
    writeln!(out, "Passed: {}", passed.to_string().green())?;
    writeln!(out, "Failed: {}", (total - passed).to_string().red())?;
    writeln!(out, "Success rate: {success_rate:.1}%")?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(out, "{} {}", status, result.scenario_name.bold())?;
        writeln!(
            out,
            "   Iterations: {}/{} successful",
            result.successful_iterations, result.iterations_run
        )?;
        writeln!(
            out,
            "   Mean depth: {:.2}  Clear rate: {:.0}%  Mean dregs: {:.1}",
            result.mean_depth,
            result.clear_rate * 100.0,
            result.mean_dregs
        )?;
        writeln!(out, "   Average time: {:?}", result.average_duration)?;
        if !result.failures.is_empty() {
            writeln!(out, "   Failures:")?;
            for failure in &result.failures {
                writeln!(out, "     • {}", failure.red())?;
            }
        }
        writeln!(out)?;
    }

    let deepest = results
        .iter()
        .max_by(|a, b| a.mean_depth.total_cmp(&b.mean_depth));
    let shallowest = results
        .iter()
        .min_by(|a, b| a.mean_depth.total_cmp(&b.mean_depth));
    if let (Some(deepest), Some(shallowest)) = (deepest, shallowest) {
        writeln!(out, "{}", "🏔️  Depth Summary".bright_yellow().bold())?;
        writeln!(out, "{}", "================".yellow())?;
        writeln!(
            out,
            "Deepest: {} ({:.2})",
            deepest.scenario_name.green(),
            deepest.mean_depth
        )?;
        writeln!(
            out,
            "Shallowest: {} ({:.2})",
            shallowest.scenario_name.yellow(),
            shallowest.mean_depth
        )?;
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, results: &[ScenarioResult]) -> Result<()> {
    let json_output = serde_json::to_string_pretty(results)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, results: &[ScenarioResult]) -> Result<()> {
    writeln!(out, "# Maw Session Results\n")?;

    let (total, passed, success_rate) = pass_counts(results);
    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total scenarios**: {total}")?;
    writeln!(out, "- **Passed**: {passed}")?;
    writeln!(out, "- **Failed**: {}", total - passed)?;
    writeln!(out, "- **Success rate**: {success_rate:.1}%\n")?;

    writeln!(out, "## Detailed Results\n")?;
    writeln!(out, "| Scenario | Status | Iterations | Mean depth | Clear rate | Mean dregs |")?;
    writeln!(out, "|---|---|---|---|---|---|")?;
    for result in results {
        let status = if result.passed { "✅" } else { "❌" };
        writeln!(
            out,
            "| {} | {} | {}/{} | {:.2} | {:.0}% | {:.1} |",
            result.scenario_name,
            status,
            result.successful_iterations,
            result.iterations_run,
            result.mean_depth,
            result.clear_rate * 100.0,
            result.mean_dregs
        )?;
    }

    let failing: Vec<&ScenarioResult> = results.iter().filter(|r| !r.failures.is_empty()).collect();
    if !failing.is_empty() {
        writeln!(out, "\n## Failures\n")?;
        for result in failing {
            writeln!(out, "### {}\n", result.scenario_name)?;
            for failure in &result.failures {
                writeln!(out, "- {failure}")?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}
