//! Outgoing mail

use anyhow::Result;
use wizard_core::Session;

pub fn configure(session: &mut Session<'_>) -> Result<()> {
    session.ui().header("Mail")?;

    let kind = session.select_at("mail.type", "Mail service", &["", "resend", "smtp"])?;
    if kind.is_empty() {
        session.ui().info("Mail is disabled")?;
        return Ok(());
    }

    session.input_at(
        "mail.defaultSender",
        "Default sender address",
        Some("YOUR EMAIL FROM (eg: no-reply <no-reply@dify.ai>)"),
        false,
    )?;

    match kind.as_str() {
        "resend" => {
            session.input_at("mail.resend.apiKey", "Resend API key", None, true)?;
            session.input_at(
                "mail.resend.apiUrl",
                "Resend API URL",
                Some("https://api.resend.com"),
                false,
            )?;
        }
        _ => {
            session.input_at("mail.smtp.server", "SMTP server", None, true)?;
            session.number_at("mail.smtp.port", "SMTP port", 587)?;
            session.input_at("mail.smtp.username", "SMTP username", None, true)?;
            session.input_at("mail.smtp.password", "SMTP password", None, true)?;
            session.confirm_at("mail.smtp.useTLS", "Use TLS for SMTP?", false)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::testing::run;
    use wizard_core::interact::Answer;
    use wizard_core::WizardError;

    const VALUES: &str = "\
mail:
  type: \"\"
  defaultSender: \"\"
  resend:
    apiKey: \"\"
  smtp:
    port: 465
";

    #[test]
    fn test_mail_disabled() {
        let (values, ui) = run(configure, VALUES, Vec::<Answer>::new());
        assert_eq!(values.get_str("mail.type"), Some(""));
        assert!(!ui.asked("sender"));
    }

    #[test]
    fn test_resend() {
        let (values, _) = run(
            configure,
            VALUES,
            [
                Answer::choice("resend"),
                Answer::text("no-reply <no-reply@example.com>"),
                Answer::text("re_123"),
                Answer::Default,
            ],
        );
        assert_eq!(values.get_str("mail.type"), Some("resend"));
        assert_eq!(values.get_str("mail.resend.apiKey"), Some("re_123"));
        assert_eq!(values.get_str("mail.resend.apiUrl"), Some("https://api.resend.com"));
    }

    #[test]
    fn test_smtp_keeps_template_port() {
        let (values, _) = run(
            configure,
            VALUES,
            [
                Answer::choice("smtp"),
                Answer::Default,
                Answer::text("smtp.example.com"),
                Answer::Default,
                Answer::text("mailer"),
                Answer::text("hunter2"),
                Answer::yes(),
            ],
        );
        assert_eq!(values.get_str("mail.smtp.server"), Some("smtp.example.com"));
        assert_eq!(values.get_i64("mail.smtp.port"), Some(465));
        assert_eq!(values.get_bool("mail.smtp.useTLS"), Some(true));
    }

    #[test]
    fn test_required_answer_missing() {
        use wizard_core::interact::ScriptedPrompter;
        use wizard_core::{ConfigContext, Session};

        let mut ui = ScriptedPrompter::new([Answer::choice("smtp")]);
        let mut session = Session::new(ConfigContext::empty("3.7.2"), &mut ui);
        let err = configure(&mut session).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WizardError>(),
            Some(WizardError::AnswerRequired(prompt)) if prompt == "SMTP server"
        ));
    }
}
