//! JSON:API resource shapes returned by IT Glue. Only the attributes this service
//! reads are modelled; everything else is ignored on deserialization.

use serde::Deserialize;

/// Top-level JSON:API document: `{"data": ...}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Document<T> {
    pub data: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Resource<A> {
    pub id: String,
    #[serde(default)]
    pub attributes: A,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct OrganizationAttributes {
    pub name: Option<String>,
    pub organization_type_name: Option<String>,
    pub organization_status_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ConfigurationAttributes {
    pub name: Option<String>,
    pub configuration_type_name: Option<String>,
    pub configuration_status_name: Option<String>,
    pub notes: Option<String>,
}

pub type Organization = Resource<OrganizationAttributes>;
pub type Configuration = Resource<ConfigurationAttributes>;
