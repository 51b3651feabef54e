//! Wire types for the admin API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Feature flag id controlling download statistics
pub const FEATURE_DOWNLOAD_STATS: &str = "download_stats";

/// Standard response body: payload under `result`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// The payload
    pub result: T,
}

/// Paged listing: payload under `result` plus paging metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page
    pub result: Vec<T>,
    /// Paging metadata; absent for unpaged listings
    #[serde(default)]
    pub paginator: Option<Paginator>,
}

/// Paging metadata returned with listings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginator {
    /// Current page, 1-based
    #[serde(default)]
    pub page: u32,
    /// Page size
    #[serde(default)]
    pub per_page: u32,
    /// Total number of items
    #[serde(default)]
    pub count: u64,
    /// Total number of pages
    #[serde(default)]
    pub num_pages: u32,
}

/// Console user account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)] // permission flags
pub struct User {
    /// User id
    pub id: u64,
    /// Login name
    pub username: String,
    /// Email address
    #[serde(default)]
    pub email: String,
    /// Given name
    #[serde(default)]
    pub first_name: String,
    /// Family name
    #[serde(default)]
    pub last_name: String,
    /// Account can log in
    #[serde(default)]
    pub is_active: bool,
    /// Account has admin rights
    #[serde(default)]
    pub is_admin: bool,
    /// May list packages
    #[serde(default)]
    pub can_list: bool,
    /// May upload new packages
    #[serde(default)]
    pub can_create: bool,
    /// May download packages
    #[serde(default)]
    pub can_download: bool,
    /// May upload new versions
    #[serde(default)]
    pub can_update: bool,
    /// Creation time
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last change
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// `first last`, skipping empty parts; falls back to the username
    #[must_use]
    pub fn full_name(&self) -> String {
        let name = [self.first_name.trim(), self.last_name.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if name.is_empty() {
            self.username.clone()
        } else {
            name
        }
    }
}

/// A hosted package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Package id
    pub id: u64,
    /// Distribution name
    pub name: String,
    /// Released versions
    #[serde(default)]
    pub versions: Vec<PackageVersion>,
    /// Users allowed to upload new versions
    #[serde(default)]
    pub maintainers: Vec<User>,
    /// First upload
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last change
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Original uploader
    #[serde(default)]
    pub author: Option<User>,
}

/// One released version of a package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageVersion {
    /// Version id
    pub id: u64,
    /// Version string
    #[serde(default)]
    pub version: String,
    /// Short summary
    #[serde(default)]
    pub summary: String,
    /// Project home page
    #[serde(default)]
    pub home_page: String,
    /// License, when the upload declared one
    #[serde(default)]
    pub license: Option<License>,
    /// Upload time
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A license known to the index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    /// License id
    pub id: u64,
    /// Approved for use
    #[serde(default)]
    pub approved: bool,
    /// Short code (e.g. `MIT`)
    #[serde(default)]
    pub code: String,
    /// Full text
    #[serde(default)]
    pub content: String,
    /// Display name
    #[serde(default)]
    pub name: String,
}

/// Server information
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// Server version
    #[serde(default)]
    pub version: String,
    /// Feature flags
    #[serde(default)]
    pub features: Vec<Feature>,
    /// Free-form system details
    #[serde(default)]
    pub system: serde_json::Value,
}

impl Info {
    /// Value of feature `id`; unknown features are off
    #[must_use]
    pub fn has_feature(&self, id: &str) -> bool {
        self.features
            .iter()
            .find(|feature| feature.id == id)
            .is_some_and(|feature| feature.value)
    }
}

/// A feature flag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    /// Flag id
    pub id: String,
    /// Human readable description
    #[serde(default)]
    pub description: String,
    /// Whether the feature is enabled
    #[serde(default)]
    pub value: bool,
}

/// Create/update payload for a user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)] // permission flags
pub struct UserForm {
    /// Login name
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Email address
    pub email: String,
    /// New password; empty keeps the current one on update
    pub password: String,
    /// Password confirmation
    pub password2: String,
    /// Account can log in
    pub is_active: bool,
    /// Account has admin rights
    pub is_admin: bool,
    /// May list packages
    pub can_list: bool,
    /// May download packages
    pub can_download: bool,
    /// May upload new packages
    pub can_create: bool,
    /// May upload new versions
    pub can_update: bool,
}

/// Profile update payload for the logged-in user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileForm {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Email address
    pub email: String,
}

/// Password change payload for the logged-in user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordForm {
    /// Current password
    pub current: String,
    /// New password
    pub password: String,
    /// New password confirmation
    pub password2: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginForm<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct FeatureForm {
    pub value: bool,
}
