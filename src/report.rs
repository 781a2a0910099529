// src/report.rs - End-of-run summary shown to the user
use crate::models::{RunSummary, SourceOutcome};

pub fn print_summary(summary: &RunSummary) {
    println!("\n📊 Lead Generation Summary");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "   Industry: {} | Location: {} | Type: {}",
        summary.industry, summary.location, summary.kind
    );

    println!("\n🗂  Per-source results:");
    for report in &summary.sources {
        match &report.outcome {
            SourceOutcome::Collected(count) => {
                println!("   ✅ {}: {} leads", report.source_id, count);
            }
            SourceOutcome::Failed(reason) => {
                println!(
                    "   ❌ {}: 0 leads (retries exhausted: {})",
                    report.source_id, reason
                );
            }
            SourceOutcome::Skipped => {
                println!("   ⏭️  {}: skipped (target count already met)", report.source_id);
            }
        }
    }

    println!(
        "\n🎯 {} leads collected, {} after dedup",
        summary.total_collected, summary.total_after_dedup
    );
    println!("⏱  Completed in {:.2}s", summary.elapsed_ms as f64 / 1000.0);
}
