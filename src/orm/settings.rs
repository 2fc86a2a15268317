//! Typed views over the effective configuration.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

/// How entity and field names map onto table and column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingStrategy {
    /// `UserAccount.firstName` becomes `user_account.first_name`.
    Underscore,
    /// Names are used as written.
    Default,
}

/// How identifiers are quoted in generated SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStrategy {
    Default,
    Ansi,
}

/// Entity manager settings. Cache keys are resolved separately.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ManagerSettings {
    pub class_metadata_factory: String,
    pub default_repository_class: String,
    pub repository_factory_class: String,
    pub auto_generate_proxy_classes: bool,
    pub naming_strategy: NamingStrategy,
    pub quote_strategy: QuoteStrategy,
    pub entity_listener_resolver: String,
    pub proxy_dir: PathBuf,
    pub proxy_namespace: String,
    /// Entity namespace to the directories holding its mapped classes.
    #[serde(default, deserialize_with = "one_or_many_paths")]
    pub metadata: BTreeMap<String, Vec<PathBuf>>,
}

/// Options handed to the database driver.
#[derive(Clone, PartialEq, Deserialize, Serialize)]
pub struct ConnectionOptions {
    pub driver: String,
    pub host: String,
    pub port: Option<u16>,
    pub dbname: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub charset: String,
}

impl std::fmt::Debug for ConnectionOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionOptions")
            .field("driver", &self.driver)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("charset", &self.charset)
            .finish()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(PathBuf),
    Many(Vec<PathBuf>),
}

fn one_or_many_paths<'de, D>(deserializer: D) -> Result<BTreeMap<String, Vec<PathBuf>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, OneOrMany>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(namespace, dirs)| {
            let dirs = match dirs {
                OneOrMany::One(dir) => vec![dir],
                OneOrMany::Many(dirs) => dirs,
            };
            (namespace, dirs)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ConfigNode;

    fn manager_node(extra: &str) -> ConfigNode {
        let base = r#"
            class_metadata_factory = "default"
            default_repository_class = "EntityRepository"
            repository_factory_class = "DefaultRepositoryFactory"
            auto_generate_proxy_classes = false
            naming_strategy = "underscore"
            quote_strategy = "ansi"
            entity_listener_resolver = "default"
            proxy_dir = "/tmp/proxies"
            proxy_namespace = "GeneratedProxy"
        "#;
        ConfigNode::from(toml::from_str::<toml::Table>(&format!("{base}\n{extra}")).unwrap())
    }

    #[test]
    fn test_metadata_accepts_single_path_or_list() {
        let node = manager_node(
            r#"
            [metadata]
            "App\\Entity" = "src/entity"
            "App\\Audit" = ["src/audit", "vendor/audit"]
            "#,
        );

        let settings: ManagerSettings = node.deserialize_as().unwrap();
        assert_eq!(settings.metadata["App\\Entity"], vec![PathBuf::from("src/entity")]);
        assert_eq!(settings.metadata["App\\Audit"].len(), 2);
        assert_eq!(settings.quote_strategy, QuoteStrategy::Ansi);
    }

    #[test]
    fn test_metadata_is_optional() {
        let settings: ManagerSettings = manager_node("").deserialize_as().unwrap();
        assert!(settings.metadata.is_empty());
    }

    #[test]
    fn test_unknown_naming_strategy_is_rejected() {
        let node = manager_node("");
        let mut table = node.as_mapping().unwrap().clone();
        table.insert("naming_strategy".into(), "camel".into());

        let result = ConfigNode::Mapping(table).deserialize_as::<ManagerSettings>();
        assert!(result.is_err());
    }

    #[test]
    fn test_connection_debug_hides_password() {
        let options = ConnectionOptions {
            driver: "pdo_mysql".into(),
            host: "db1".into(),
            port: Some(3306),
            dbname: Some("app".into()),
            user: Some("app".into()),
            password: Some("hunter2".into()),
            charset: "UTF8".into(),
        };

        let debug = format!("{options:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("***"));
    }
}
