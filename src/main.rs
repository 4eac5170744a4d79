use anyhow::Result;
use guardian_net::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = GuardConfig::from_env()?;
    println!("GuardianNet content guard ({} sensitivity)", config.sensitivity);
    if config.classifier.api_key.is_none() {
        println!("No API key set; remote checks will fall back to a blocked verdict.");
    }

    let guard = ContentGuard::new(config)?;

    let imported = guard
        .rules()
        .import("https://casino-royale-demo.com/\nshady-downloads.net;abc")
        .await?;
    println!("Imported {} of {} listed sites", imported.added, imported.parsed);

    // Text from the command line, or a few samples
    let args: Vec<String> = std::env::args().skip(1).collect();
    let samples = if args.is_empty() {
        vec![
            "Check out adult-example.com for more".to_string(),
            "Grab the installer from shady-downloads.net".to_string(),
            "The weather is lovely today, let's go for a walk.".to_string(),
        ]
    } else {
        vec![args.join(" ")]
    };

    for text in &samples {
        match guard.submit(text).await {
            Ok(entry) => {
                let status = if entry.result.is_safe { "SAFE" } else { "BLOCKED" };
                let categories: Vec<&str> =
                    entry.result.categories.iter().map(|c| c.label()).collect();
                println!(
                    "[{}] score {:>3} {:?} - {} ({})",
                    status, entry.result.score, categories, entry.snippet, entry.result.reasoning
                );
            }
            Err(e) => println!("Skipped: {}", e),
        }
    }

    let stats = guard.stats().await;
    println!("\nTotal scanned: {}", stats.total_scanned);
    println!("Blocked: {} ({:.1}%)", stats.blocked_count, stats.block_percentage());
    for (category, count) in &stats.category_breakdown {
        println!("  {}: {}", category, count);
    }

    Ok(())
}
