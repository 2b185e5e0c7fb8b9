//! Databases, cache, vector store and object storage

use anyhow::Result;
use serde_yaml::Value;
use wizard_core::interact::prompt_float;
use wizard_core::Session;

const DATABASES: &[(&str, &str)] = &[
    ("dify", "main database"),
    ("plugin_daemon", "plugin daemon database"),
    ("enterprise", "enterprise database"),
    ("audit", "audit database"),
];

const SSL_MODES: &[&str] = &["disable", "require", "verify-ca", "verify-full"];

const VECTOR_DBS: &[&str] = &[
    "qdrant",
    "weaviate",
    "milvus",
    "relyt",
    "pgvecto-rs",
    "tencent",
    "opensearch",
    "elasticsearch",
    "analyticdb",
    "lindorm",
];

const S3_OPTION: &str = "s3 (AWS S3 or S3-compatible)";
const STORAGE_TYPES: &[&str] = &[
    "local",
    S3_OPTION,
    "azure-blob",
    "aliyun-oss",
    "google-storage",
    "tencent-cos",
    "volcengine-tos",
    "huawei-obs",
];

const AWS_S3: &str = "AWS S3";
const MINIO: &str = "MinIO";
const S3_PROVIDERS: &[&str] = &[AWS_S3, MINIO, "Cloudflare R2", "Other S3-compatible"];

const IRSA: &str = "IRSA (IAM roles for service accounts, recommended)";
const ACCESS_KEYS: &str = "Access key and secret key";

const DOCKER_HOST_TIP: &str =
    "Services on a kind cluster's host are reachable as host.docker.internal";

pub fn configure(session: &mut Session<'_>) -> Result<()> {
    session.ui().header("Infrastructure")?;
    postgres(session)?;
    redis(session)?;
    vector_db(session)?;
    storage(session)
}

fn postgres(session: &mut Session<'_>) -> Result<()> {
    session.ui().section("PostgreSQL")?;
    session.ui().info("Enterprise deployments use an external PostgreSQL")?;
    session.ui().info("Inside the cluster, use the service name (e.g. postgres.db.svc.cluster.local)")?;
    session.ui().warning(DOCKER_HOST_TIP)?;

    session.set("externalPostgres.enabled", true)?;
    session.set("postgresql.enabled", false)?;
    session.input_at(
        "externalPostgres.address",
        "PostgreSQL address",
        Some("host.docker.internal"),
        true,
    )?;
    session.number_at("externalPostgres.port", "PostgreSQL port", 5432)?;

    for &(key, description) in DATABASES {
        session.ui().section(&format!("Database {} ({})", key, description))?;
        let base = format!("externalPostgres.credentials.{}", key);
        session.input_at(
            &format!("{}.database", base),
            &format!("{} database name", key),
            Some(key),
            false,
        )?;
        session.input_at(
            &format!("{}.username", base),
            &format!("{} username", key),
            Some("postgres"),
            false,
        )?;
        session.input_at(
            &format!("{}.password", base),
            &format!("{} password", key),
            None,
            true,
        )?;
        session.select_or(
            &format!("{}.sslmode", base),
            &format!("{} SSL mode", key),
            SSL_MODES,
            "require",
        )?;
        session.set(&format!("{}.extras", base), "")?;
        session.set(&format!("{}.charset", base), "")?;
        session.set(&format!("{}.uriScheme", base), "postgresql")?;
    }
    Ok(())
}

fn redis(session: &mut Session<'_>) -> Result<()> {
    session.ui().section("Redis")?;
    let external = session.ui().confirm("Use an external Redis?", true)?;
    session.set("externalRedis.enabled", external)?;
    session.set("redis.enabled", !external)?;

    if !external {
        session.ui().info("Using the built-in Redis")?;
        if session.ui().confirm("Set a password for the built-in Redis?", true)? {
            session.secret_at("redis.global.redis.password", "Redis password", 32)?;
        }
        return Ok(());
    }

    session.ui().warning(DOCKER_HOST_TIP)?;
    session.input_at("externalRedis.host", "Redis host", Some("host.docker.internal"), true)?;
    session.number_at("externalRedis.port", "Redis port", 6379)?;
    session.confirm_at("externalRedis.useSSL", "Connect to Redis over SSL?", false)?;
    session.input_at("externalRedis.username", "Redis username (optional)", None, false)?;
    session.input_at("externalRedis.password", "Redis password", None, true)?;
    session.number_at("externalRedis.db", "Redis database number", 0)?;

    // Sentinel and cluster mode are mutually exclusive
    let sentinel = session.ui().confirm("Use Redis Sentinel?", false)?;
    session.set("externalRedis.sentinel.enabled", sentinel)?;
    let cluster = if sentinel {
        session.input_at("externalRedis.sentinel.nodes", "Sentinel nodes (host:port,...)", None, true)?;
        session.input_at("externalRedis.sentinel.serviceName", "Sentinel service name", None, true)?;
        session.input_at("externalRedis.sentinel.username", "Sentinel username (optional)", None, false)?;
        session.input_at("externalRedis.sentinel.password", "Sentinel password", None, true)?;
        let current = session
            .get("externalRedis.sentinel.socketTimeout")
            .and_then(Value::as_f64)
            .unwrap_or(0.1);
        let timeout = prompt_float(session.ui(), "Sentinel socket timeout (seconds)", current)?;
        session.set("externalRedis.sentinel.socketTimeout", timeout)?;
        false
    } else {
        session.ui().confirm("Use Redis Cluster?", false)?
    };

    session.set("externalRedis.cluster.enabled", cluster)?;
    if cluster {
        session.input_at("externalRedis.cluster.nodes", "Cluster nodes (host:port,...)", None, true)?;
        session.input_at("externalRedis.cluster.password", "Cluster password", None, true)?;
    }
    Ok(())
}

fn vector_db(session: &mut Session<'_>) -> Result<()> {
    session.ui().section("Vector database")?;
    let external = session.ui().confirm("Use an external vector database?", true)?;
    session.set("vectorDB.useExternal", external)?;

    if external {
        let kind = session.select_or(
            "vectorDB.externalType",
            "Vector database type",
            VECTOR_DBS,
            "qdrant",
        )?;
        session.ui().warning(DOCKER_HOST_TIP)?;
        match kind.as_str() {
            "qdrant" => {
                session.input_at(
                    "vectorDB.externalQdrant.endpoint",
                    "Qdrant endpoint",
                    Some("http://host.docker.internal:6333"),
                    true,
                )?;
                session.input_at("vectorDB.externalQdrant.apiKey", "Qdrant API key", None, false)?;
            }
            "weaviate" => {
                session.input_at(
                    "vectorDB.externalWeaviate.endpoint",
                    "Weaviate endpoint",
                    Some("http://weaviate:8080"),
                    true,
                )?;
                session.input_at("vectorDB.externalWeaviate.apiKey", "Weaviate API key", None, false)?;
            }
            other => {
                session.ui().info(&format!(
                    "Fill in the {} connection settings in the output file",
                    other
                ))?;
            }
        }
        return Ok(());
    }

    let builtin = session
        .ui()
        .select("Built-in vector database", &["qdrant", "weaviate"], Some("qdrant"))?;
    let qdrant = builtin == "qdrant";
    session.set("qdrant.enabled", qdrant)?;
    session.set("weaviate.enabled", !qdrant)?;
    if qdrant {
        session.input_at("qdrant.apiKey", "Qdrant API key", Some("dify123456"), false)?;
        session.number_at("qdrant.replicaCount", "Qdrant replicas", 3)?;
    }
    Ok(())
}

fn storage(session: &mut Session<'_>) -> Result<()> {
    session.ui().section("Storage")?;
    let choice = session
        .ui()
        .select("Storage type", STORAGE_TYPES, Some("local"))?;
    let kind = if choice == S3_OPTION { "s3" } else { choice.as_str() };
    session.set("persistence.type", kind)?;

    match kind {
        "local" => {
            session.input_at(
                "persistence.local.mountPath",
                "Mount path",
                Some("/app/api/storage"),
                false,
            )?;
            let class = session
                .ui()
                .input("Storage class (empty for the cluster default)", None, false)?;
            if !class.is_empty() {
                session.set("persistence.local.persistentVolumeClaim.storageClass", class)?;
            }
            session.input_at(
                "persistence.local.persistentVolumeClaim.size",
                "Volume size",
                Some("5Gi"),
                false,
            )?;
        }
        "s3" => s3(session)?,
        other => {
            session.ui().info(&format!(
                "Fill in the {} credentials in the output file",
                other
            ))?;
        }
    }

    // Everything but AWS S3 needs the built-in MinIO
    if kind != "s3" {
        session.set("minio.enabled", true)?;
    }
    if session.get_bool("minio.enabled") == Some(true) {
        minio(session)?;
    }
    Ok(())
}

fn s3(session: &mut Session<'_>) -> Result<()> {
    let provider = session
        .ui()
        .select("S3 provider", S3_PROVIDERS, Some(AWS_S3))?;

    if provider == AWS_S3 {
        session.set("persistence.s3.useAwsS3", true)?;
        session.set("minio.enabled", false)?;
        session.ui().info("AWS S3 does not need the built-in MinIO; it is disabled")?;
        session.input_at("persistence.s3.endpoint", "S3 endpoint URL", None, true)?;

        let auth = session
            .ui()
            .select("S3 authentication", &[IRSA, ACCESS_KEYS], Some(IRSA))?;
        if auth == IRSA {
            session.set("persistence.s3.useAwsManagedIam", true)?;
            session.ui().info("The api and worker pods need service accounts bound to an IAM role")?;
            let mut bound = false;
            for (service, prompt) in [
                ("api", "API service account (optional)"),
                ("worker", "Worker service account (optional)"),
            ] {
                let account = session.ui().input(prompt, None, false)?;
                if !account.is_empty() {
                    session.set(&format!("{}.serviceAccountName", service), account)?;
                    bound = true;
                }
            }
            if !bound {
                session.ui().info("Set api.serviceAccountName and worker.serviceAccountName once the service accounts exist")?;
            }
            session.remove("persistence.s3.accessKey")?;
            session.remove("persistence.s3.secretKey")?;
        } else {
            session.set("persistence.s3.useAwsManagedIam", false)?;
            session.input_at("persistence.s3.accessKey", "Access key", None, true)?;
            session.input_at("persistence.s3.secretKey", "Secret key", None, true)?;
        }
    } else {
        session.set("persistence.s3.useAwsS3", false)?;
        session.set("persistence.s3.useAwsManagedIam", false)?;
        session.set("minio.enabled", true)?;
        session.ui().info(&format!(
            "Configuring {} (S3 compatible); the built-in MinIO is enabled",
            provider
        ))?;

        let (endpoint, access_key, secret_key) = if provider == MINIO {
            ("http://host.docker.internal:9000", Some("minioadmin"), Some("minioadmin123"))
        } else {
            ("https://xxx.r2.cloudflarestorage.com", None, None)
        };
        session.input_at("persistence.s3.endpoint", "S3 endpoint URL", Some(endpoint), true)?;
        session.input_at("persistence.s3.accessKey", "Access key", access_key, true)?;
        session.input_at("persistence.s3.secretKey", "Secret key", secret_key, true)?;
    }

    session.input_at("persistence.s3.region", "Region", Some("us-east-1"), false)?;
    session.input_at("persistence.s3.bucketName", "Bucket name", Some("your-bucket-name"), true)?;

    let address = session
        .ui()
        .input("Address type (optional, e.g. path or virtual)", None, false)?;
    if !address.is_empty() {
        session.set("persistence.s3.addressType", address)?;
    }
    Ok(())
}

fn minio(session: &mut Session<'_>) -> Result<()> {
    session.ui().section("Built-in MinIO")?;
    session.ui().info("The built-in MinIO stores internal data such as plugin packages")?;
    session.secret_at("minio.rootPassword", "MinIO root password", 32)?;
    session.input_at("minio.rootUser", "MinIO root user", Some("minioadmin"), false)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::testing::run;
    use wizard_core::interact::Answer;

    const VALUES: &str = "\
externalPostgres:
  enabled: false
  credentials:
    dify:
      sslmode: disable
persistence:
  s3:
    accessKey: old
    secretKey: old
minio:
  enabled: false
";

    fn postgres_answers() -> Vec<Answer> {
        let mut answers = vec![Answer::Default, Answer::Default];
        for db in ["dify", "plugin_daemon", "enterprise", "audit"] {
            answers.extend([
                Answer::Default,
                Answer::Default,
                Answer::text(format!("{}-pw", db)),
                Answer::Default,
            ]);
        }
        answers
    }

    #[test]
    fn test_builtin_services_and_local_storage() {
        let mut answers = postgres_answers();
        answers.extend([
            // redis: built-in with generated password
            Answer::no(),
            Answer::yes(),
            Answer::yes(),
            // vector db: built-in qdrant
            Answer::no(),
            Answer::Default,
            Answer::Default,
            Answer::text("1"),
            // local storage
            Answer::Default,
            Answer::Default,
            Answer::text("fast-ssd"),
            Answer::Default,
            // minio
            Answer::yes(),
            Answer::Default,
        ]);
        let (values, ui) = run(configure, VALUES, answers);
        assert_eq!(ui.remaining(), 0);

        assert_eq!(values.get_bool("externalPostgres.enabled"), Some(true));
        assert_eq!(values.get_bool("postgresql.enabled"), Some(false));
        assert_eq!(values.get_i64("externalPostgres.port"), Some(5432));
        // an existing sslmode wins over the usual default
        assert_eq!(values.get_str("externalPostgres.credentials.dify.sslmode"), Some("disable"));
        assert_eq!(values.get_str("externalPostgres.credentials.audit.sslmode"), Some("require"));
        assert_eq!(values.get_str("externalPostgres.credentials.audit.password"), Some("audit-pw"));
        assert_eq!(
            values.get_str("externalPostgres.credentials.plugin_daemon.database"),
            Some("plugin_daemon")
        );
        assert_eq!(values.get_str("externalPostgres.credentials.enterprise.uriScheme"), Some("postgresql"));

        assert_eq!(values.get_bool("redis.enabled"), Some(true));
        assert_eq!(values.get_str("redis.global.redis.password"), Some("secret-32"));

        assert_eq!(values.get_bool("qdrant.enabled"), Some(true));
        assert_eq!(values.get_bool("weaviate.enabled"), Some(false));
        assert_eq!(values.get_i64("qdrant.replicaCount"), Some(1));

        assert_eq!(values.get_str("persistence.type"), Some("local"));
        assert_eq!(
            values.get_str("persistence.local.persistentVolumeClaim.storageClass"),
            Some("fast-ssd")
        );
        assert_eq!(values.get_bool("minio.enabled"), Some(true));
        assert_eq!(values.get_str("minio.rootPassword"), Some("secret-32"));
        assert_eq!(values.get_str("minio.rootUser"), Some("minioadmin"));
    }

    #[test]
    fn test_external_redis_sentinel_and_aws_s3() {
        let mut answers = postgres_answers();
        answers.extend([
            // redis: external with sentinel
            Answer::yes(),
            Answer::text("redis.internal"),
            Answer::Default,
            Answer::Default,
            Answer::Default,
            Answer::text("redis-pw"),
            Answer::Default,
            Answer::yes(),
            Answer::text("s1:26379,s2:26379"),
            Answer::text("mymaster"),
            Answer::Default,
            Answer::text("sentinel-pw"),
            Answer::text("0.5"),
            // vector db: external weaviate
            Answer::yes(),
            Answer::choice("weaviate"),
            Answer::Default,
            Answer::text("wv-key"),
            // AWS S3 with IRSA
            Answer::choice(S3_OPTION),
            Answer::choice(AWS_S3),
            Answer::text("https://s3.us-west-2.amazonaws.com"),
            Answer::choice(IRSA),
            Answer::text("dify-api"),
            Answer::Default,
            Answer::text("us-west-2"),
            Answer::text("dify-data"),
            Answer::Default,
        ]);
        let (values, ui) = run(configure, VALUES, answers);
        assert_eq!(ui.remaining(), 0);

        assert_eq!(values.get_str("externalRedis.host"), Some("redis.internal"));
        assert_eq!(values.get_bool("externalRedis.sentinel.enabled"), Some(true));
        assert_eq!(values.get_bool("externalRedis.cluster.enabled"), Some(false));
        assert_eq!(
            values.get("externalRedis.sentinel.socketTimeout").and_then(Value::as_f64),
            Some(0.5)
        );
        assert!(!ui.asked("Use Redis Cluster?"));

        assert_eq!(values.get_str("vectorDB.externalType"), Some("weaviate"));
        assert_eq!(values.get_str("vectorDB.externalWeaviate.endpoint"), Some("http://weaviate:8080"));

        assert_eq!(values.get_str("persistence.type"), Some("s3"));
        assert_eq!(values.get_bool("persistence.s3.useAwsS3"), Some(true));
        assert_eq!(values.get_bool("persistence.s3.useAwsManagedIam"), Some(true));
        assert!(!values.contains("persistence.s3.accessKey"));
        assert!(!values.contains("persistence.s3.secretKey"));
        assert_eq!(values.get_str("api.serviceAccountName"), Some("dify-api"));
        assert!(!values.contains("worker.serviceAccountName"));
        assert_eq!(values.get_str("persistence.s3.bucketName"), Some("dify-data"));
        assert_eq!(values.get_bool("minio.enabled"), Some(false));
        assert!(!ui.asked("MinIO root"));
    }

    #[test]
    fn test_minio_provider_enables_builtin_minio() {
        let mut answers = postgres_answers();
        answers.extend([
            Answer::yes(),
            Answer::Default,
            Answer::Default,
            Answer::Default,
            Answer::Default,
            Answer::text("redis-pw"),
            Answer::Default,
            Answer::no(),
            Answer::no(),
            Answer::yes(),
            Answer::Default,
            Answer::Default,
            Answer::Default,
            Answer::choice(S3_OPTION),
            Answer::choice(MINIO),
            Answer::Default,
            Answer::Default,
            Answer::Default,
            Answer::Default,
            Answer::Default,
            Answer::text("path"),
            Answer::no(),
            Answer::text("minio-pw"),
            Answer::text("admin"),
        ]);
        let (values, ui) = run(configure, VALUES, answers);
        assert_eq!(ui.remaining(), 0);
        assert_eq!(values.get_bool("externalRedis.cluster.enabled"), Some(false));
        assert_eq!(values.get_str("vectorDB.externalQdrant.endpoint"), Some("http://host.docker.internal:6333"));
        assert_eq!(values.get_bool("persistence.s3.useAwsS3"), Some(false));
        // the template's access key is offered as default
        assert_eq!(values.get_str("persistence.s3.accessKey"), Some("old"));
        assert_eq!(values.get_str("persistence.s3.endpoint"), Some("http://host.docker.internal:9000"));
        assert_eq!(values.get_str("persistence.s3.addressType"), Some("path"));
        assert_eq!(values.get_bool("minio.enabled"), Some(true));
        assert_eq!(values.get_str("minio.rootPassword"), Some("minio-pw"));
        assert_eq!(values.get_str("minio.rootUser"), Some("admin"));
    }
}
