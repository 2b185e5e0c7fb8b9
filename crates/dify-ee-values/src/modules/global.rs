//! Global settings shared by every service

use anyhow::Result;
use wizard_core::Session;

const DOMAINS: &[(&str, &str, &str)] = &[
    ("consoleApiDomain", "Console API domain", "console.dify.local"),
    ("consoleWebDomain", "Console web domain", "console.dify.local"),
    ("serviceApiDomain", "Service API domain", "api.dify.local"),
    ("appApiDomain", "App API domain", "app.dify.local"),
    ("appWebDomain", "App web domain", "app.dify.local"),
    ("filesDomain", "Files domain", "files.dify.local"),
    ("enterpriseDomain", "Enterprise domain", "enterprise.dify.local"),
];

pub fn configure(session: &mut Session<'_>) -> Result<()> {
    session.ui().header("Global configuration")?;
    session.ui().info("These settings affect every service in the release")?;

    // Secret keys are always freshly generated
    session.ui().section("Secret keys")?;
    for key in ["appSecretKey", "innerApiKey"] {
        let secret = session.secret(42);
        session.set(&format!("global.{}", key), secret)?;
        session.ui().success(&format!("Generated global.{}", key))?;
    }

    session.ui().section("Domains")?;
    for &(key, prompt, default) in DOMAINS {
        session.input_at(&format!("global.{}", key), prompt, Some(default), false)?;
    }

    session.confirm_at(
        "global.dbMigrationEnabled",
        "Run database migrations on startup?",
        true,
    )?;

    session.ui().section("RAG")?;
    let etl = session.select_or(
        "global.rag.etlType",
        "RAG ETL type",
        &["dify", "Unstructured"],
        "dify",
    )?;
    let unstructured = etl != "dify";
    session.set("unstructured.enabled", unstructured)?;
    session.ui().info(if unstructured {
        "unstructured service enabled for the Unstructured ETL"
    } else {
        "unstructured service disabled (not needed by the dify ETL)"
    })?;

    session.ui().info(
        "Keyword data source: object_storage keeps keyword indexes in object storage, \
         database keeps them in PostgreSQL",
    )?;
    session.select_or(
        "global.rag.keywordDataSourceType",
        "Keyword data source",
        &["object_storage", "database"],
        "object_storage",
    )?;
    session.number_at("global.rag.topKMaxValue", "Maximum top-k for retrieval", 10)?;
    session.number_at(
        "global.rag.indexingMaxSegmentationTokensLength",
        "Maximum tokens per document segment",
        4000,
    )?;
    Ok(())
}
