use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Student,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Admin => "admin",
        }
    }

    /// Landing route after a successful login.
    pub fn home_path(&self) -> &'static str {
        match self {
            Role::Student => "/student",
            Role::Admin => "/admin",
        }
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "admin" => Ok(Role::Admin),
            other => Err(ValidationError::Invalid(format!("unknown role '{}'", other))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub role: Role,
    pub token: String,
    pub student_id: Option<String>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("role", &self.role)
            .field("token", &"<redacted>")
            .field("student_id", &self.student_id)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_id: String,
    pub password: String,
    /// Sent lower-case, the way the login form submits it.
    #[serde(serialize_with = "ser_role")]
    pub role: Role,
}

fn ser_role<S>(role: &Role, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(role.as_str())
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(deserialize_with = "de_role")]
    pub role: Role,
}

fn de_role<'de, D>(deserializer: D) -> Result<Role, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

/// Opaque reference to a stored attachment.
///
/// Deliberately has no `Display`: the only way to show it is through
/// [`crate::api::files::view_url`].
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct StorageRef(String);

impl StorageRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub(crate) fn reference(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for StorageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StorageRef(..)")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetType {
    #[default]
    All,
    Batch,
    Student,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::All => "ALL",
            TargetType::Batch => "BATCH",
            TargetType::Student => "STUDENT",
        }
    }
}

impl FromStr for TargetType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ALL" => Ok(TargetType::All),
            "BATCH" => Ok(TargetType::Batch),
            "STUDENT" => Ok(TargetType::Student),
            other => Err(ValidationError::Invalid(format!(
                "unknown target type '{}'",
                other
            ))),
        }
    }
}

/// Audience of a resource. A batch or student target always carries a
/// non-empty value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    All,
    Batch(String),
    Student(String),
}

impl Target {
    pub fn from_parts(kind: TargetType, value: Option<&str>) -> Result<Self, ValidationError> {
        let value = value.map(str::trim).filter(|v| !v.is_empty());
        match (kind, value) {
            (TargetType::All, _) => Ok(Target::All),
            (TargetType::Batch, Some(v)) => Ok(Target::Batch(v.to_string())),
            (TargetType::Batch, None) => Err(ValidationError::MissingBatch),
            (TargetType::Student, Some(v)) => Ok(Target::Student(v.to_string())),
            (TargetType::Student, None) => Err(ValidationError::MissingStudent),
        }
    }

    pub fn kind(&self) -> TargetType {
        match self {
            Target::All => TargetType::All,
            Target::Batch(_) => TargetType::Batch,
            Target::Student(_) => TargetType::Student,
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Target::All => None,
            Target::Batch(v) | Target::Student(v) => Some(v),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Test,
    Homework,
    Announcement,
}

impl ResourceType {
    pub const ALL: [ResourceType; 3] = [
        ResourceType::Test,
        ResourceType::Homework,
        ResourceType::Announcement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Test => "TEST",
            ResourceType::Homework => "HOMEWORK",
            ResourceType::Announcement => "ANNOUNCEMENT",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResourceType::Test => "Tests",
            ResourceType::Homework => "Homework",
            ResourceType::Announcement => "Announcements",
        }
    }
}

impl FromStr for ResourceType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TEST" | "TESTS" => Ok(ResourceType::Test),
            "HOMEWORK" => Ok(ResourceType::Homework),
            "ANNOUNCEMENT" | "ANNOUNCEMENTS" => Ok(ResourceType::Announcement),
            other => Err(ValidationError::Invalid(format!(
                "unknown resource type '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestPaper {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default, alias = "testDate")]
    pub date: Option<String>,
    #[serde(default)]
    pub max_marks: Option<f64>,
    #[serde(default)]
    pub marks: Option<f64>,
    #[serde(default)]
    pub assigned_to: TargetType,
    #[serde(default)]
    pub batch: Option<String>,
    #[serde(default, alias = "pdf")]
    pub file: Option<StorageRef>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Homework {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub target_type: TargetType,
    #[serde(default)]
    pub target_value: Option<String>,
    #[serde(default)]
    pub file: Option<StorageRef>,
    #[serde(default)]
    pub submitted: bool,
    #[serde(default)]
    pub submitted_on: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeworkStatus {
    Submitted,
    Late,
    Pending,
}

impl Homework {
    pub fn status(&self, today: NaiveDate) -> HomeworkStatus {
        if self.submitted {
            return HomeworkStatus::Submitted;
        }
        let due = self
            .due_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d.get(..10).unwrap_or(d), "%Y-%m-%d").ok());
        match due {
            Some(due) if today > due => HomeworkStatus::Late,
            _ => HomeworkStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub target_type: TargetType,
    #[serde(default)]
    pub target_value: Option<String>,
    #[serde(default, alias = "attachment")]
    pub file: Option<StorageRef>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinItem {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub deleted_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecycleBinEntry {
    pub kind: ResourceType,
    pub original_id: String,
    pub title: Option<String>,
    pub deleted_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecycleBinListing {
    #[serde(default)]
    pub tests: Vec<BinItem>,
    #[serde(default)]
    pub homework: Vec<BinItem>,
    #[serde(default)]
    pub announcements: Vec<BinItem>,
}

impl RecycleBinListing {
    pub fn items(&self, kind: ResourceType) -> &[BinItem] {
        match kind {
            ResourceType::Test => &self.tests,
            ResourceType::Homework => &self.homework,
            ResourceType::Announcement => &self.announcements,
        }
    }

    pub fn entries(&self) -> Vec<RecycleBinEntry> {
        ResourceType::ALL
            .iter()
            .flat_map(|kind| {
                self.items(*kind).iter().map(move |item| RecycleBinEntry {
                    kind: *kind,
                    original_id: item.id.clone(),
                    title: item.title.clone(),
                    deleted_at: item.deleted_at.clone(),
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tests.len() + self.homework.len() + self.announcements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub batch: Option<String>,
    #[serde(default)]
    pub time_slot: Option<String>,
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub photo: Option<StorageRef>,
}

/// Entry of the student picker used for STUDENT-targeted resources.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentOption {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub batch: Option<String>,
}
