//! Trigger worker service (chart 3.7.0+)
//!
//! A dedicated Celery worker for webhook, schedule and other workflow
//! triggers.

use crate::modules::SERVICES;
use anyhow::Result;
use wizard_core::{FeatureDef, Session};

pub const FEATURE: FeatureDef = FeatureDef {
    id: "trigger_worker",
    name: "Trigger Worker Service",
    description: "Configure triggerWorker service for workflow trigger processing",
    min_version: Some("3.7.0"),
    max_version: None,
    module: SERVICES,
    apply,
};

const CODE_LIMITS: &[(&str, &str)] = &[
    ("maxStringArrayLength", "Maximum string array length"),
    ("maxObjectArrayLength", "Maximum object array length"),
    ("maxNumberArrayLength", "Maximum number array length"),
];

fn apply(session: &mut Session<'_>) -> Result<()> {
    session.ui().section("Trigger worker")?;
    session
        .ui()
        .info("The trigger worker processes webhook and scheduled workflow triggers")?;
    session.ensure_mapping("triggerWorker")?;

    if !session.ui().confirm("Configure the trigger worker?", false)? {
        session.ui().info("Keeping the chart's trigger worker settings")?;
        return Ok(());
    }

    positive_at(session, "triggerWorker.replicas", "Trigger worker replicas")?;
    positive_at(
        session,
        "triggerWorker.celeryWorkerAmount",
        "Celery workers per replica",
    )?;

    session
        .ui()
        .info("Code limits cap the size of arrays code nodes may return")?;
    if session.ui().confirm("Configure code execution limits?", false)? {
        for &(key, prompt) in CODE_LIMITS {
            let path = format!("triggerWorker.code.{}", key);
            if let Some(limit) = ask_count(session, &path, prompt, 500)? {
                session.set(&path, limit)?;
            }
        }
    }
    session.ui().success("Trigger worker configured")?;
    Ok(())
}

/// Ask for a count of at least one; anything else leaves the value alone
fn positive_at(session: &mut Session<'_>, path: &str, prompt: &str) -> Result<()> {
    match ask_count(session, path, prompt, 1)? {
        Some(count) if count >= 1 => session.set(path, count),
        Some(count) => session
            .ui()
            .warning(&format!("{} must be at least 1, ignoring {}", prompt, count)),
        None => Ok(()),
    }
}

/// Whole number for `path`, defaulting to its current value. `None` when
/// the answer is not a number.
fn ask_count(session: &mut Session<'_>, path: &str, prompt: &str, fallback: i64) -> Result<Option<i64>> {
    let current = session.values().get_i64(path).unwrap_or(fallback);
    let answer = session.ui().input(prompt, Some(&current.to_string()), false)?;
    let answer = answer.trim();
    if answer.is_empty() {
        return Ok(Some(current));
    }
    match answer.parse() {
        Ok(count) => Ok(Some(count)),
        Err(_) => {
            session
                .ui()
                .warning(&format!("'{}' is not a number, leaving {} unchanged", answer, path))?;
            Ok(None)
        }
    }
}
