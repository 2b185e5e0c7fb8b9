//! TLS and ingress

use anyhow::Result;
use serde_yaml::{Mapping, Value};
use wizard_core::Session;

const INGRESS_CLASSES: &[&str] = &["nginx", "alb", "traefik", "istio", "other"];
const CLUSTER_ISSUER: &str = "cert-manager.io/cluster-issuer";

pub fn configure(session: &mut Session<'_>) -> Result<()> {
    session.ui().header("Networking")?;

    session.ui().section("TLS")?;
    session.ui().warning("Global TLS and ingress TLS must agree, or links generated by the services break")?;
    let mut use_tls = session
        .ui()
        .confirm("Serve the services over HTTPS (global.useTLS)?", false)?;
    session.set("global.useTLS", use_tls)?;

    session.ui().section("Ingress")?;
    session.set("ingress.enabled", true)?;
    session.ui().info("Ingress is always enabled for Enterprise deployments")?;

    let class = session
        .ui()
        .select("Ingress controller", INGRESS_CLASSES, Some("nginx"))?;
    if class == "other" {
        let name = session.ui().input("Ingress class name", None, false)?;
        session.set("ingress.className", name)?;
    } else {
        session.set("ingress.className", class.as_str())?;
        session.ui().warning(&format!(
            "Make sure the {} ingress controller is installed in the cluster",
            class
        ))?;
    }

    let ingress_tls = session.ui().confirm("Configure TLS on the ingress?", use_tls)?;
    if ingress_tls {
        session.ui().info("Certificates come from cert-manager or from a TLS secret you create")?;
        add_tls_hosts(session)?;
        if session.ui().confirm("Use a cert-manager ClusterIssuer?", false)? {
            session.ensure_mapping("ingress.annotations")?;
            let issuer = session.ui().input("ClusterIssuer name", None, false)?;
            if !issuer.is_empty() {
                session.set_at(&["ingress", "annotations", CLUSTER_ISSUER], issuer.as_str())?;
                session.ui().success(&format!("cert-manager issuer: {}", issuer))?;
            }
        }
    }

    // Both sides of TLS must agree
    if use_tls && !ingress_tls {
        session.ui().warning("global.useTLS is on but the ingress serves plain HTTP")?;
        if session.ui().confirm("Configure ingress TLS now?", true)? {
            add_tls_hosts(session)?;
        }
    }
    if !use_tls && ingress_tls {
        session.ui().warning("The ingress serves HTTPS but global.useTLS is off")?;
        if session.ui().confirm("Turn on global.useTLS?", true)? {
            use_tls = true;
            session.set("global.useTLS", use_tls)?;
        }
    }

    // Enterprise does not support IP-based hosts
    session.set("ingress.useIpAsHost", false)?;
    Ok(())
}

/// Append one `ingress.tls` entry for the hosts the operator names
fn add_tls_hosts(session: &mut Session<'_>) -> Result<()> {
    let answer = session
        .ui()
        .input("TLS hosts (comma separated, empty to skip)", None, false)?;
    let hosts: Vec<String> = answer
        .split(',')
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .collect();
    let Some(first) = hosts.first() else {
        return Ok(());
    };

    let fallback = format!("{}-tls", first);
    let secret = session
        .ui()
        .input("TLS secret name", Some(fallback.as_str()), false)?;
    let secret = if secret.is_empty() { fallback } else { secret };

    let mut entry = Mapping::new();
    entry.insert(Value::from("hosts"), Value::from(hosts));
    entry.insert(Value::from("secretName"), Value::from(secret));

    let mut tls = match session.get("ingress.tls") {
        Some(Value::Sequence(existing)) => existing.clone(),
        _ => Vec::new(),
    };
    tls.push(Value::Mapping(entry));
    session.set("ingress.tls", Value::Sequence(tls))
}
