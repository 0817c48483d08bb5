//! Tag policy configuration.
//!
//! The tag checker runs against a [`TagPolicy`] assembled from three layers,
//! highest priority first:
//! 1. Rule lists passed on the command line (`--required-tags`, `--optional-tags`)
//! 2. A policy file (`--config`, YAML or JSON)
//! 3. Built-in defaults: no rules and [`DEFAULT_TAGGABLE_RESOURCES`]
//!
//! Each layer replaces whole keys; lists are never merged.
//!
//! # Configuration File Format
//!
//! ```yaml
//! # .terraform-tags.yaml
//! required_tags:
//!   - name: Environment
//!     allowed_values: [Dev, Staging, Production]
//!   - name: Owner
//!   - name: CostCenter
//!     pattern: "^CC-[0-9]{4}$"
//!
//! optional_tags:
//!   - name: Project
//!
//! # Replaces the built-in catalog entirely when present
//! taggable_resources:
//!   aws:
//!     - aws_instance
//!     - aws_s3_bucket
//! ```

use crate::error::{HookError, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Default policy file name written by `tfhooks init`.
pub const DEFAULT_CONFIG_FILE: &str = ".terraform-tags.yaml";

/// Built-in taggable resource types per provider.
///
/// Comprehensive but not exhaustive. Replace it through the
/// `taggable_resources` key of a policy file.
pub const DEFAULT_TAGGABLE_RESOURCES: &[(&str, &[&str])] = &[
    (
        "aws",
        &[
            // Compute
            "aws_instance",
            "aws_launch_template",
            "aws_ami",
            "aws_ami_copy",
            "aws_ami_from_instance",
            "aws_ec2_capacity_reservation",
            "aws_ec2_fleet",
            "aws_spot_fleet_request",
            "aws_spot_instance_request",
            // Storage
            "aws_ebs_volume",
            "aws_ebs_snapshot",
            "aws_s3_bucket",
            "aws_s3_bucket_object",
            "aws_s3_object",
            "aws_efs_file_system",
            "aws_fsx_backup",
            "aws_fsx_lustre_file_system",
            "aws_fsx_ontap_file_system",
            "aws_fsx_openzfs_file_system",
            "aws_fsx_windows_file_system",
            // Networking
            "aws_vpc",
            "aws_subnet",
            "aws_internet_gateway",
            "aws_nat_gateway",
            "aws_route_table",
            "aws_security_group",
            "aws_network_interface",
            "aws_eip",
            "aws_vpc_endpoint",
            "aws_vpc_peering_connection",
            "aws_customer_gateway",
            "aws_vpn_gateway",
            "aws_vpn_connection",
            "aws_network_acl",
            "aws_egress_only_internet_gateway",
            "aws_lb",
            "aws_alb",
            "aws_lb_target_group",
            "aws_alb_target_group",
            // Database
            "aws_db_instance",
            "aws_db_cluster",
            "aws_db_snapshot",
            "aws_db_cluster_snapshot",
            "aws_rds_cluster",
            "aws_rds_cluster_instance",
            "aws_elasticache_cluster",
            "aws_elasticache_replication_group",
            "aws_dynamodb_table",
            "aws_neptune_cluster",
            "aws_neptune_cluster_instance",
            "aws_docdb_cluster",
            "aws_docdb_cluster_instance",
            // Containers
            "aws_ecs_cluster",
            "aws_ecs_service",
            "aws_ecs_task_definition",
            "aws_eks_cluster",
            "aws_eks_node_group",
            "aws_ecr_repository",
            // Serverless
            "aws_lambda_function",
            "aws_lambda_layer_version",
            // IAM
            "aws_iam_role",
            "aws_iam_user",
            "aws_iam_policy",
            "aws_iam_instance_profile",
            "aws_iam_openid_connect_provider",
            "aws_iam_saml_provider",
            // Monitoring & messaging
            "aws_cloudwatch_log_group",
            "aws_cloudwatch_metric_alarm",
            "aws_cloudwatch_dashboard",
            "aws_sns_topic",
            "aws_sqs_queue",
            // Security
            "aws_kms_key",
            "aws_kms_alias",
            "aws_secretsmanager_secret",
            "aws_acm_certificate",
            "aws_wafv2_web_acl",
            "aws_wafv2_ip_set",
            "aws_wafv2_regex_pattern_set",
            // Application services
            "aws_api_gateway_rest_api",
            "aws_apigatewayv2_api",
            "aws_cloudfront_distribution",
            "aws_route53_zone",
            "aws_route53_health_check",
            // Analytics & ML
            "aws_kinesis_stream",
            "aws_kinesis_firehose_delivery_stream",
            "aws_elasticsearch_domain",
            "aws_opensearch_domain",
            "aws_glue_job",
            "aws_glue_crawler",
            "aws_sagemaker_notebook_instance",
            "aws_sagemaker_model",
            // Backup
            "aws_backup_plan",
            "aws_backup_vault",
        ],
    ),
    (
        "azurerm",
        &[
            // Compute
            "azurerm_virtual_machine",
            "azurerm_linux_virtual_machine",
            "azurerm_windows_virtual_machine",
            "azurerm_virtual_machine_scale_set",
            "azurerm_linux_virtual_machine_scale_set",
            "azurerm_windows_virtual_machine_scale_set",
            "azurerm_image",
            "azurerm_snapshot",
            // Storage
            "azurerm_storage_account",
            "azurerm_storage_container",
            "azurerm_storage_blob",
            "azurerm_managed_disk",
            // Networking
            "azurerm_virtual_network",
            "azurerm_subnet",
            "azurerm_network_interface",
            "azurerm_network_security_group",
            "azurerm_public_ip",
            "azurerm_lb",
            "azurerm_application_gateway",
            "azurerm_vpn_gateway",
            "azurerm_virtual_network_gateway",
            "azurerm_express_route_circuit",
            // Database
            "azurerm_sql_server",
            "azurerm_sql_database",
            "azurerm_postgresql_server",
            "azurerm_postgresql_flexible_server",
            "azurerm_mysql_server",
            "azurerm_mysql_flexible_server",
            "azurerm_mariadb_server",
            "azurerm_cosmosdb_account",
            "azurerm_redis_cache",
            // Containers
            "azurerm_kubernetes_cluster",
            "azurerm_container_registry",
            "azurerm_container_group",
            // App services
            "azurerm_app_service",
            "azurerm_linux_web_app",
            "azurerm_windows_web_app",
            "azurerm_function_app",
            "azurerm_linux_function_app",
            "azurerm_windows_function_app",
            // Resource management
            "azurerm_resource_group",
            // Monitoring
            "azurerm_log_analytics_workspace",
            "azurerm_application_insights",
            // Security
            "azurerm_key_vault",
            "azurerm_key_vault_key",
            "azurerm_key_vault_secret",
        ],
    ),
    (
        "google",
        &[
            // Compute
            "google_compute_instance",
            "google_compute_disk",
            "google_compute_image",
            "google_compute_snapshot",
            "google_compute_instance_template",
            "google_compute_instance_group",
            "google_compute_instance_group_manager",
            // Networking
            "google_compute_network",
            "google_compute_subnetwork",
            "google_compute_address",
            "google_compute_global_address",
            "google_compute_firewall",
            "google_compute_router",
            "google_compute_vpn_gateway",
            "google_compute_forwarding_rule",
            "google_compute_global_forwarding_rule",
            "google_compute_backend_service",
            "google_compute_health_check",
            // Storage
            "google_storage_bucket",
            "google_storage_bucket_object",
            "google_filestore_instance",
            // Database
            "google_sql_database_instance",
            "google_bigtable_instance",
            "google_spanner_instance",
            "google_firestore_database",
            // Containers
            "google_container_cluster",
            "google_container_node_pool",
            "google_artifact_registry_repository",
            // Serverless
            "google_cloudfunctions_function",
            "google_cloud_run_service",
            // Monitoring
            "google_logging_log_sink",
            "google_monitoring_alert_policy",
            // Security
            "google_kms_key_ring",
            "google_kms_crypto_key",
            "google_secret_manager_secret",
            // Pub/Sub
            "google_pubsub_topic",
            "google_pubsub_subscription",
        ],
    ),
    (
        "oci",
        &[
            // Compute
            "oci_core_instance",
            "oci_core_boot_volume",
            "oci_core_volume",
            "oci_core_image",
            // Networking
            "oci_core_vcn",
            "oci_core_subnet",
            "oci_core_security_list",
            "oci_core_network_security_group",
            "oci_core_internet_gateway",
            "oci_core_nat_gateway",
            "oci_core_service_gateway",
            "oci_core_local_peering_gateway",
            "oci_core_drg",
            // Storage
            "oci_objectstorage_bucket",
            "oci_file_storage_file_system",
            // Database
            "oci_database_db_system",
            "oci_database_autonomous_database",
            // Containers
            "oci_containerengine_cluster",
            "oci_containerengine_node_pool",
        ],
    ),
];

/// A single required or optional tag rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRule {
    /// Exact (case-sensitive) tag key.
    pub name: String,

    /// Permitted values, compared case-sensitively. Takes precedence over `pattern`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<String>>,

    /// Regular expression the value must match from its first character.
    ///
    /// Uses [`regex`] syntax, which has no lookahead (`(?=`, `(?!`) and no
    /// backreferences (`\1`). Such patterns fail to compile and are reported
    /// as invalid patterns rather than silently accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl TagRule {
    /// A rule that only requires the key to be present.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            allowed_values: None,
            pattern: None,
        }
    }

    /// Restrict the value to an allow-list.
    #[must_use]
    pub fn with_allowed_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Constrain the value with a regular expression.
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// The allow-list, if one is set and non-empty.
    ///
    /// An empty list places no restriction on the value.
    #[must_use]
    pub fn allow_list(&self) -> Option<&[String]> {
        self.allowed_values.as_deref().filter(|values| !values.is_empty())
    }

    /// Human-readable description of the value constraint.
    #[must_use]
    pub fn constraint(&self) -> String {
        if let Some(values) = self.allow_list() {
            format!("allowed: {}", values.join(", "))
        } else if let Some(pattern) = &self.pattern {
            format!("pattern: {pattern}")
        } else {
            "any non-empty value".to_string()
        }
    }
}

/// Provider name to taggable resource types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaggableCatalog(BTreeMap<String, BTreeSet<String>>);

impl TaggableCatalog {
    /// The built-in catalog from [`DEFAULT_TAGGABLE_RESOURCES`].
    #[must_use]
    pub fn builtin() -> Self {
        DEFAULT_TAGGABLE_RESOURCES
            .iter()
            .map(|(provider, types)| (*provider, types.iter().copied()))
            .collect()
    }

    /// Exact membership in the union of all provider sets.
    #[must_use]
    pub fn contains(&self, resource_type: &str) -> bool {
        self.0.values().any(|types| types.contains(resource_type))
    }

    /// Provider names in the catalog.
    pub fn providers(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Total number of resource types across providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.values().map(BTreeSet::len).sum()
    }

    /// Whether the catalog lists no resource types at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TaggableCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl<'a, P, T> FromIterator<(P, T)> for TaggableCatalog
where
    P: Into<String>,
    T: IntoIterator<Item = &'a str>,
{
    fn from_iter<I: IntoIterator<Item = (P, T)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(provider, types)| {
                    (provider.into(), types.into_iter().map(String::from).collect())
                })
                .collect(),
        )
    }
}

/// The contents of a policy file. Absent keys leave lower layers untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyFile {
    /// Required tag rules.
    pub required_tags: Option<Vec<TagRule>>,
    /// Optional tag rules.
    pub optional_tags: Option<Vec<TagRule>>,
    /// Replacement taggable catalog.
    pub taggable_resources: Option<TaggableCatalog>,
}

impl PolicyFile {
    /// Parse a policy from YAML.
    ///
    /// An empty or comment-only document yields an empty policy.
    ///
    /// # Errors
    ///
    /// Returns the `serde_yaml` error if the document does not match the schema.
    pub fn from_yaml(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if is_blank_document(content) {
            return Ok(Self::default());
        }
        let parsed: Option<Self> = serde_yaml::from_str(content)?;
        Ok(parsed.unwrap_or_default())
    }

    /// Parse a policy from JSON.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the document does not match the schema.
    pub fn from_json(content: &str) -> std::result::Result<Self, serde_json::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let parsed: Option<Self> = serde_json::from_str(content)?;
        Ok(parsed.unwrap_or_default())
    }

    /// Parse with every available loader, preferring the one the extension suggests.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::ConfigParse`] when neither YAML nor JSON accepts the content.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let json_first = path.extension().and_then(|e| e.to_str()) == Some("json");

        let yaml = || Self::from_yaml(content).map_err(|e| e.to_string());
        let json = || Self::from_json(content).map_err(|e| e.to_string());

        let (first, fallback) = if json_first { (json(), yaml()) } else { (yaml(), json()) };
        let first_err = match first {
            Ok(policy) => return Ok(policy),
            Err(e) => e,
        };

        match fallback {
            Ok(policy) => {
                tracing::debug!(path = %path.display(), "Parsed configuration with fallback loader");
                Ok(policy)
            }
            Err(fallback_err) => {
                let (yaml_err, json_err) = if json_first {
                    (fallback_err, first_err)
                } else {
                    (first_err, fallback_err)
                };
                Err(HookError::config_parse(
                    path,
                    format!("not valid YAML ({yaml_err}) or JSON ({json_err})"),
                    file!(),
                    line!(),
                ))
            }
        }
    }

    /// Read and parse a policy file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or a parse error.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_path(path)?;
        Self::parse(&content, path)
    }
}

fn is_blank_document(content: &str) -> bool {
    content
        .lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#') || line == "---")
}

/// Rule lists supplied directly by the caller. They win over any file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyOverrides {
    /// Replacement required rules.
    pub required_tags: Option<Vec<TagRule>>,
    /// Replacement optional rules.
    pub optional_tags: Option<Vec<TagRule>>,
    /// Replacement taggable catalog.
    pub taggable_resources: Option<TaggableCatalog>,
}

/// The active tag policy for one checker run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagPolicy {
    /// Rules every taggable resource must satisfy.
    pub required_tags: Vec<TagRule>,
    /// Rules checked for key case only, when present.
    pub optional_tags: Vec<TagRule>,
    /// Resource types that carry tags or labels.
    pub taggable_resources: TaggableCatalog,
}

impl Default for TagPolicy {
    fn default() -> Self {
        Self {
            required_tags: Vec::new(),
            optional_tags: Vec::new(),
            taggable_resources: TaggableCatalog::builtin(),
        }
    }
}

impl TagPolicy {
    /// Build the active policy: overrides, then the file, then defaults.
    ///
    /// A `config_path` that does not exist only logs a warning.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file exists but cannot be parsed,
    /// or an I/O error if it cannot be read.
    pub fn load(config_path: Option<&Path>, overrides: PolicyOverrides) -> Result<Self> {
        let mut policy = Self::default();

        if let Some(path) = config_path {
            if path.exists() {
                tracing::debug!(path = %path.display(), "Loading tag policy file");
                policy.apply_file(PolicyFile::load(path)?);
            } else {
                tracing::warn!(path = %path.display(), "Config file not found, using defaults");
            }
        }

        policy.apply_overrides(overrides);

        tracing::debug!(
            required = policy.required_tags.len(),
            optional = policy.optional_tags.len(),
            taggable_types = policy.taggable_resources.len(),
            "Tag policy loaded"
        );

        Ok(policy)
    }

    /// Replace every key the file sets.
    pub fn apply_file(&mut self, file: PolicyFile) {
        if let Some(required) = file.required_tags {
            self.required_tags = required;
        }
        if let Some(optional) = file.optional_tags {
            self.optional_tags = optional;
        }
        if let Some(catalog) = file.taggable_resources {
            self.taggable_resources = catalog;
        }
    }

    /// Replace every key the overrides set.
    pub fn apply_overrides(&mut self, overrides: PolicyOverrides) {
        if let Some(required) = overrides.required_tags {
            self.required_tags = required;
        }
        if let Some(optional) = overrides.optional_tags {
            self.optional_tags = optional;
        }
        if let Some(catalog) = overrides.taggable_resources {
            self.taggable_resources = catalog;
        }
    }

    /// Generate an example YAML policy file.
    #[must_use]
    pub fn example_yaml() -> String {
        r#"# Terraform/OpenTofu tag policy for `tfhooks tags`

# Tags every taggable resource must carry. Keys are case-sensitive.
required_tags:
  - name: Environment
    # Exact-case allow-list; takes precedence over `pattern`
    allowed_values:
      - Dev
      - Staging
      - Production
  - name: Owner
  - name: CostCenter
    # Matched from the start of the value; add `$` for a full match
    pattern: "^CC-[0-9]{4}$"

# Tags that may be omitted but must use the exact key case when present.
optional_tags:
  - name: Project
  - name: Description

# Replaces the built-in catalog of taggable resource types when set.
# taggable_resources:
#   aws:
#     - aws_instance
#     - aws_s3_bucket
#   google:
#     - google_compute_instance
"#
        .to_string()
    }
}

/// Parse a JSON rule list such as `[{"name":"Owner"}]`.
///
/// # Errors
///
/// Returns [`HookError::ConfigValue`] naming `key` if the JSON is invalid.
pub fn parse_tag_rules(key: &str, json: &str) -> Result<Vec<TagRule>> {
    serde_json::from_str(json).map_err(|e| {
        crate::err!(ConfigValue {
            key: key.to_string(),
            message: format!(
                "{e}. Expected JSON such as \
                 [{{\"name\":\"Environment\",\"allowed_values\":[\"Dev\",\"Prod\"]}},{{\"name\":\"Owner\"}}]"
            ),
        })
    })
}
