//! Enterprise service secrets, licensing and per-service switches

use anyhow::Result;
use wizard_core::Session;

const LICENSE_SERVER: &str = "https://licenses.dify.ai/server";

const ENTERPRISE_SECRETS: &[(&str, usize)] = &[
    ("appSecretKey", 42),
    ("adminAPIsSecretKeySalt", 42),
    ("passwordEncryptionKey", 32),
];

/// Services whose `enabled` flag can be toggled
const TOGGLEABLE: &[&str] = &[
    "api",
    "worker",
    "workerBeat",
    "web",
    "sandbox",
    "enterprise",
    "enterpriseAudit",
    "enterpriseFrontend",
    "ssrfProxy",
    "unstructured",
    "plugin_daemon",
    "plugin_manager",
];

pub fn configure(session: &mut Session<'_>) -> Result<()> {
    session.ui().header("Services")?;

    if session.get_bool("enterprise.enabled").unwrap_or(true) {
        session.ui().section("Enterprise")?;
        for &(key, length) in ENTERPRISE_SECRETS {
            let secret = session.secret(length);
            session.set(&format!("enterprise.{}", key), secret)?;
            session.ui().success(&format!("Generated enterprise.{}", key))?;
        }

        let mode = session.select_or(
            "enterprise.licenseMode",
            "License mode",
            &["online", "offline"],
            "online",
        )?;
        if mode == "online" {
            session.set("enterprise.licenseServer", LICENSE_SERVER)?;
            session.ui().info(&format!("License server: {}", LICENSE_SERVER))?;
        }
    }

    session.ui().section("Service enablement")?;
    if !session
        .ui()
        .confirm("Enable or disable individual services?", false)?
    {
        session.ui().info("Keeping the chart's service defaults")?;
        return Ok(());
    }
    for service in TOGGLEABLE {
        if !session.contains(service) {
            continue;
        }
        let path = format!("{}.enabled", service);
        session.confirm_at(&path, &format!("Enable {}?", service), true)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::testing::run;
    use wizard_core::interact::Answer;

    const VALUES: &str = "\
enterprise:
  enabled: true
  licenseMode: offline
api:
  enabled: true
sandbox:
  enabled: true
";

    #[test]
    fn test_enterprise_secrets_and_license() {
        let (values, ui) = run(configure, VALUES, [Answer::choice("online")]);
        assert_eq!(values.get_str("enterprise.appSecretKey"), Some("secret-42"));
        assert_eq!(values.get_str("enterprise.adminAPIsSecretKeySalt"), Some("secret-42"));
        assert_eq!(values.get_str("enterprise.passwordEncryptionKey"), Some("secret-32"));
        assert_eq!(values.get_str("enterprise.licenseServer"), Some(LICENSE_SERVER));
        assert!(!ui.asked("Enable api?"));
    }

    #[test]
    fn test_offline_license_keeps_server_unset() {
        let (values, _) = run(configure, VALUES, Vec::<Answer>::new());
        assert_eq!(values.get_str("enterprise.licenseMode"), Some("offline"));
        assert!(!values.contains("enterprise.licenseServer"));
    }

    #[test]
    fn test_toggle_present_services_only() {
        let (values, ui) = run(
            configure,
            VALUES,
            [Answer::Default, Answer::yes(), Answer::Default, Answer::no()],
        );
        assert_eq!(values.get_bool("enterprise.enabled"), Some(true));
        assert_eq!(values.get_bool("sandbox.enabled"), Some(false));
        assert!(ui.asked("Enable api?"));
        assert!(!ui.asked("Enable worker?"));
    }

    #[test]
    fn test_disabled_enterprise_skips_secrets() {
        let (values, _) = run(configure, "enterprise:\n  enabled: false\n", Vec::<Answer>::new());
        assert!(!values.contains("enterprise.appSecretKey"));
    }
}
