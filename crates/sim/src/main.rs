//! Interrupt classifier scenario runner
//!
//! Usage: `interrupt-sim [scenarios.yaml]`
//!
//! Replays transcripts through the interrupt gate and reports one line per
//! decision. Exits non-zero when any expectation fails.

mod scenario;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use voice_interrupt_config::{constants::env, load_settings, Settings};
use voice_interrupt_pipeline::{InterruptClassifier, InterruptGate, ProcessorChain};

use scenario::{builtin_scenarios, load_scenarios, replay, Outcome};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Priority: env vars > config/{env}.yaml > config/default.yaml > defaults
    let env_name = std::env::var(env::ENV_SELECTOR).ok();
    let settings = match load_settings(env_name.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            // Tracing not yet initialized
            eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
            Settings::default()
        }
    };

    init_tracing(&settings);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = env_name.as_deref().unwrap_or("default"),
        ignored_words = settings.interrupt.ignored_words.len(),
        stop_words = settings.interrupt.stop_words.len(),
        "Starting interrupt simulator"
    );

    let scenarios = match std::env::args().nth(1) {
        Some(path) => load_scenarios(&path)?,
        None => builtin_scenarios(),
    };

    let classifier = Arc::new(InterruptClassifier::new(&settings.interrupt));
    let chain = ProcessorChain::builder("interrupt-sim")
        .processor(InterruptGate::new(Arc::clone(&classifier)))
        .build();

    let started = Instant::now();
    let outcomes = replay(&chain, &classifier, scenarios, "sim").await?;
    let elapsed = started.elapsed();
    tracing::debug!(elapsed_ms = elapsed.as_millis() as u64, "Replay finished");
    let failed = report(&outcomes, elapsed);

    if failed > 0 {
        tracing::warn!(failed, total = outcomes.len(), "Scenario expectations failed");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Print one line per outcome and a summary. Returns the failure count.
fn report(outcomes: &[Outcome], elapsed: Duration) -> usize {
    let mut passed = 0;
    let mut failed = 0;

    for outcome in outcomes {
        let status = match outcome.passed() {
            Some(true) => {
                passed += 1;
                "ok"
            }
            Some(false) => {
                failed += 1;
                "FAIL"
            }
            None => "-",
        };

        println!(
            "[{:>4}] {:<9} {:<28} conf={:.2} speaking={:<5} {:?}",
            status,
            outcome.decision,
            outcome.reason,
            outcome.scenario.confidence,
            outcome.scenario.speaking,
            outcome.scenario.text,
        );
    }

    println!("\n{}", summary(outcomes.len(), passed, failed, elapsed));
    failed
}

fn summary(total: usize, passed: usize, failed: usize, elapsed: Duration) -> String {
    format!(
        "{} scenarios: {} passed, {} failed, {} unchecked in {:.1?}",
        total,
        passed,
        failed,
        total - passed - failed,
        elapsed
    )
}

fn init_tracing(settings: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &settings.observability.log_level;
        format!("voice_interrupt={level},interrupt_sim={level}").into()
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);
    let fmt_layer = if settings.observability.log_json {
        tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        tracing_subscriber::fmt::layer().with_writer(std::io::stderr).boxed()
    };
    subscriber.with(fmt_layer).init();
}
