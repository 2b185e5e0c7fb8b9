//! Plugin connector image repository

use anyhow::Result;
use wizard_core::Session;

const IRSA: &str = "IRSA (IAM roles for service accounts, recommended)";
const PULL_SECRET: &str = "Kubernetes image pull secret";

const HTTPS: &str = "HTTPS (recommended)";
const HTTP: &str = "HTTP (insecure)";

const DEFAULT_SECRET: &str = "image-repo-secret";

pub fn configure(session: &mut Session<'_>) -> Result<()> {
    session.ui().header("Plugins")?;
    session.ui().section("Plugin connector image repository")?;
    session.ui().info("Plugin images are built and pushed to this repository at install time")?;
    session.ensure_mapping("plugin_connector")?;

    let kind = session.select_or(
        "plugin_connector.imageRepoType",
        "Image repository type",
        &["docker", "ecr"],
        "docker",
    )?;

    if kind == "ecr" {
        ecr(session)?;
    } else {
        session.ui().info("Example prefix: docker.io/your-organization")?;
        session.input_at(
            "plugin_connector.imageRepoPrefix",
            "Image repository prefix",
            Some("docker.io/your-image-repo-prefix"),
            false,
        )?;
        pull_secret(session)?;
    }

    session.ui().warning("Plain HTTP image repositories are not recommended")?;
    let protocol = session
        .ui()
        .select("Image repository protocol", &[HTTPS, HTTP], Some(HTTPS))?;
    let insecure = protocol == HTTP;
    session.set("plugin_connector.insecureImageRepo", insecure)?;
    if insecure {
        session.ui().warning("Plugin images will be pushed over plain HTTP")?;
    } else {
        session.ui().success("Plugin images will be pushed over HTTPS")?;
    }
    Ok(())
}

fn ecr(session: &mut Session<'_>) -> Result<()> {
    let region = session.input_at(
        "plugin_connector.ecrRegion",
        "ECR region",
        Some("us-east-1"),
        false,
    )?;
    session.ui().info(&format!("ECR region: {}", region))?;

    let account = session.ui().input("AWS account ID", None, false)?;
    let registry = if account.is_empty() {
        format!("{{account_id}}.dkr.ecr.{}.amazonaws.com", region)
    } else {
        format!("{}.dkr.ecr.{}.amazonaws.com", account, region)
    };
    session
        .ui()
        .info("Prefix format: <account_id>.dkr.ecr.<region>.amazonaws.com[/<prefix>]")?;
    let prefix = session
        .ui()
        .input("Image repository prefix", Some(registry.as_str()), false)?;
    let prefix = if prefix.is_empty() { registry } else { prefix };
    session.set("plugin_connector.imageRepoPrefix", prefix)?;

    let auth = session
        .ui()
        .select("ECR authentication", &[IRSA, PULL_SECRET], Some(IRSA))?;
    if auth == IRSA {
        session
            .ui()
            .info("Bind the service accounts below to an IAM role with ECR push and pull rights")?;
        session.input_at(
            "plugin_connector.customServiceAccount",
            "Plugin connector service account (optional)",
            None,
            false,
        )?;
        session.input_at(
            "plugin_connector.runnerServiceAccount",
            "Plugin runner service account (optional)",
            None,
            false,
        )?;
        // IRSA needs no pull secret
        session.remove("plugin_connector.imageRepoSecret")?;
    } else {
        pull_secret(session)?;
    }
    Ok(())
}

fn pull_secret(session: &mut Session<'_>) -> Result<()> {
    session
        .ui()
        .info("The secret must exist in the release namespace before installing")?;
    session.input_at(
        "plugin_connector.imageRepoSecret",
        "Image repository secret name",
        Some(DEFAULT_SECRET),
        false,
    )?;
    Ok(())
}
