use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{load_settings, AnalysisController, ControllerSnapshot, ALERT_TITLE};
use shared::event::RawEvent;
use verification_sdk::{Scenario, ScriptedSessionFactory};

#[derive(Parser, Debug)]
struct Args {
    #[arg(long)]
    cpf: String,
    #[arg(long, default_value = "")]
    email: String,
    #[arg(long, default_value = "")]
    ref_id: String,
    /// success, api-error, sdk-error, validation-error, geolocation-denied, unknown, silent
    #[arg(long, default_value = "success")]
    scenario: String,
    /// Extra raw event appended to the scenario, e.g. '{"eventId":"api-error","data":{}}'
    #[arg(long)]
    extra_event: Vec<String>,
    #[arg(long, default_value_t = 800)]
    latency_ms: u64,
    /// Overrides the configured mode (compat or guarded).
    #[arg(long)]
    mode: Option<String>,
    /// Stop once nothing has happened for this long.
    #[arg(long, default_value_t = 3000)]
    idle_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(mode) = &args.mode {
        settings.mode = mode.parse()?;
    }

    let scenario: Scenario = args.scenario.parse()?;
    let mut script = scenario.events();
    for raw in &args.extra_event {
        let event: RawEvent =
            serde_json::from_str(raw).with_context(|| format!("invalid --extra-event '{raw}'"))?;
        script.push(event);
    }

    let factory = Arc::new(
        ScriptedSessionFactory::new(script).with_latency(Duration::from_millis(args.latency_ms)),
    );
    let mut controller = AnalysisController::new(factory, settings.controller_settings());
    controller.initialize(settings.session.clone()).await;
    let controller_settings = controller.settings();
    println!(
        "mode={} fallback={}ms initialized={}",
        controller_settings.mode.as_str(),
        controller_settings.fallback_delay.as_millis(),
        controller.is_initialized()
    );

    let form = controller.form_mut();
    form.set_cpf(args.cpf);
    form.set_email(args.email);
    form.set_ref_id_geoloc(args.ref_id);

    let outcome = controller.submit();
    println!("submit -> {outcome:?}");
    report(&mut controller);

    let idle = Duration::from_millis(args.idle_ms);
    while tokio::time::timeout(idle, controller.process_next())
        .await
        .is_ok()
    {
        report(&mut controller);
    }

    println!("idle for {}ms; done", args.idle_ms);
    Ok(())
}

fn report(controller: &mut AnalysisController) {
    let snapshot = controller.snapshot();
    print_snapshot(&snapshot);
    if snapshot.alert_visible {
        println!("  {ALERT_TITLE}: {}", snapshot.alert_message);
        controller.acknowledge_alert();
    }
}

fn print_snapshot(snapshot: &ControllerSnapshot) {
    println!(
        "[{}] phase={:?} can_submit={}",
        snapshot.submit_label(),
        snapshot.phase,
        snapshot.can_submit
    );
}
