//! Canonical admin entities and their adapters.
//!
//! Each resource gets exactly one `from_raw` adapter. Nothing past this module
//! looks at backend key casing or raw flag encodings.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{coerce::RawRecord, error::AdaptError};

const ACTIVE_KEYS: &[&str] = &["isActive", "active", "enabled"];
const CREATED_KEYS: &[&str] = &["createdAt", "created", "createdDate", "dateCreated"];
const DESCRIPTION_KEYS: &[&str] = &["description", "summary"];

/// Opaque identifier, unique within one collection snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Wrap an identifier as received from the backend.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier as sent back in request paths.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Name of the categorical filter every resource supports.
pub const STATUS_FILTER: &str = "status";

/// Value the `status` filter compares against.
pub fn status_label(active: bool) -> &'static str {
    if active {
        "active"
    } else {
        "inactive"
    }
}

/// A row type managed by a [`crate::controller::ResourceController`].
pub trait AdminEntity: Clone + PartialEq + fmt::Debug + Serialize + 'static {
    /// Path segment under `/api/admin/`.
    const RESOURCE: &'static str;
    /// Human readable singular name used in notifications.
    const LABEL: &'static str;
    /// Categorical filters this resource exposes, in display order.
    const FILTERS: &'static [&'static str];
    /// Key sent in the PATCH body of a status toggle.
    const ACTIVE_FIELD: &'static str = "isActive";
    /// Name of the dependent count shown next to each row.
    const DEPENDENTS_LABEL: &'static str;
    /// Whether the admin API slices this collection itself. When false the
    /// whole collection is fetched once and derived locally.
    const SERVER_PAGINATED: bool = true;

    /// Adapt one raw backend record into the canonical shape.
    fn from_raw(raw: &Value) -> Result<Self, AdaptError>;

    /// Identity within a collection.
    fn id(&self) -> &EntityId;

    /// Title or name shown in tables and messages.
    fn display_name(&self) -> &str;

    /// Normalized status flag.
    fn is_active(&self) -> bool;

    /// Overwrite the status flag after a confirmed write.
    fn set_active(&mut self, active: bool);

    /// Fields the search box matches against.
    fn search_fields(&self) -> Vec<&str>;

    /// Normalized value of a categorical filter, `None` if unsupported.
    fn filter_value(&self, name: &str) -> Option<&str>;

    /// Bucket used by the per-category stats.
    fn category(&self) -> &str;

    /// Derived count of dependents (enrolled users, owners, ...).
    fn dependents(&self) -> u64;

    /// Creation time, when the backend reports one.
    fn created_at(&self) -> Option<DateTime<Utc>>;
}

/// A course as listed on the admin courses page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Identifier from whichever id alias the record used.
    pub id: EntityId,
    /// Display title.
    pub title: String,
    /// Free-text description, empty when absent.
    pub description: String,
    /// Category, empty when absent.
    pub category: String,
    /// Difficulty level as labelled by the backend.
    pub difficulty: String,
    /// Coerced status flag.
    pub is_active: bool,
    /// Users enrolled in the course.
    pub enrolled_users: u64,
    /// Creation time, when the record carries a parseable one.
    pub created_at: Option<DateTime<Utc>>,
}

impl AdminEntity for Course {
    const DEPENDENTS_LABEL: &'static str = "Enrolled";
    const FILTERS: &'static [&'static str] = &["category", "difficulty", STATUS_FILTER];
    const LABEL: &'static str = "Course";
    const RESOURCE: &'static str = "courses";

    fn from_raw(raw: &Value) -> Result<Self, AdaptError> {
        let record = RawRecord::new(raw)?;
        Ok(Self {
            id: record.id(&["courseId", "id", "_id"])?,
            title: record.text_or_default(&["title", "courseTitle", "name"]),
            description: record.text_or_default(DESCRIPTION_KEYS),
            category: record.text_or_default(&["category", "categoryName"]),
            difficulty: record.text_or_default(&["difficulty", "level"]),
            is_active: record.flag_or(ACTIVE_KEYS, true),
            enrolled_users: record.count(&["enrolledUsers", "enrolledCount", "enrollmentCount"]),
            created_at: record.timestamp(CREATED_KEYS),
        })
    }

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.title
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.description.as_str(), self.category.as_str()]
    }

    fn filter_value(&self, name: &str) -> Option<&str> {
        match name {
            "category" => Some(self.category.as_str()),
            "difficulty" => Some(self.difficulty.as_str()),
            STATUS_FILTER => Some(status_label(self.is_active)),
            _ => None,
        }
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn dependents(&self) -> u64 {
        self.enrolled_users
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

/// A collectible badge; `rarity` is its classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nft {
    /// Identifier from whichever id alias the record used.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Free-text description, empty when absent.
    pub description: String,
    /// Rarity tier.
    pub rarity: String,
    /// Artwork URL.
    pub image_url: Option<String>,
    /// Coerced status flag.
    pub is_active: bool,
    /// Users holding the NFT.
    pub owner_count: u64,
    /// Creation time, when the record carries a parseable one.
    pub created_at: Option<DateTime<Utc>>,
}

impl AdminEntity for Nft {
    const DEPENDENTS_LABEL: &'static str = "Owners";
    const FILTERS: &'static [&'static str] = &["rarity", STATUS_FILTER];
    const LABEL: &'static str = "NFT";
    const SERVER_PAGINATED: bool = false;
    const RESOURCE: &'static str = "nfts";

    fn from_raw(raw: &Value) -> Result<Self, AdaptError> {
        let record = RawRecord::new(raw)?;
        Ok(Self {
            id: record.id(&["nftId", "id", "_id", "tokenId"])?,
            name: record.text_or_default(&["name", "title"]),
            description: record.text_or_default(DESCRIPTION_KEYS),
            rarity: record.text_or_default(&["rarity", "tier", "category"]),
            image_url: record
                .text(&["imageUrl", "image", "imageUri"])
                .filter(|value| !value.is_empty()),
            is_active: record.flag_or(ACTIVE_KEYS, true),
            owner_count: record.count(&["ownerCount", "owners", "holders", "ownedBy"]),
            created_at: record.timestamp(CREATED_KEYS),
        })
    }

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.description.as_str()]
    }

    fn filter_value(&self, name: &str) -> Option<&str> {
        match name {
            "rarity" => Some(self.rarity.as_str()),
            STATUS_FILTER => Some(status_label(self.is_active)),
            _ => None,
        }
    }

    fn category(&self) -> &str {
        &self.rarity
    }

    fn dependents(&self) -> u64 {
        self.owner_count
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

/// A quest as listed on the admin quests page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    /// Identifier from whichever id alias the record used.
    pub id: EntityId,
    /// Display title.
    pub title: String,
    /// Free-text description, empty when absent.
    pub description: String,
    /// Category, empty when absent.
    pub category: String,
    /// Difficulty level as labelled by the backend.
    pub difficulty: String,
    /// Points awarded on completion.
    pub reward_points: u64,
    /// Coerced status flag.
    pub is_active: bool,
    /// Users who joined the quest.
    pub participant_count: u64,
    /// Creation time, when the record carries a parseable one.
    pub created_at: Option<DateTime<Utc>>,
}

impl AdminEntity for Quest {
    const DEPENDENTS_LABEL: &'static str = "Participants";
    const FILTERS: &'static [&'static str] = &["category", "difficulty", STATUS_FILTER];
    const LABEL: &'static str = "Quest";
    const SERVER_PAGINATED: bool = false;
    const RESOURCE: &'static str = "quests";

    fn from_raw(raw: &Value) -> Result<Self, AdaptError> {
        let record = RawRecord::new(raw)?;
        Ok(Self {
            id: record.id(&["questId", "id", "_id"])?,
            title: record.text_or_default(&["title", "name"]),
            description: record.text_or_default(DESCRIPTION_KEYS),
            category: record.text_or_default(&["category", "type"]),
            difficulty: record.text_or_default(&["difficulty", "level"]),
            reward_points: record.count(&["rewardPoints", "reward", "points", "xp"]),
            is_active: record.flag_or(ACTIVE_KEYS, true),
            participant_count: record.count(&["participantCount", "participants", "completions"]),
            created_at: record.timestamp(CREATED_KEYS),
        })
    }

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.title
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.description.as_str(), self.category.as_str()]
    }

    fn filter_value(&self, name: &str) -> Option<&str> {
        match name {
            "category" => Some(self.category.as_str()),
            "difficulty" => Some(self.difficulty.as_str()),
            STATUS_FILTER => Some(status_label(self.is_active)),
            _ => None,
        }
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn dependents(&self) -> u64 {
        self.participant_count
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

/// A platform account. Stats bucket users by `role`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Identifier from whichever id alias the record used.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Login email, empty when absent.
    pub email: String,
    /// Platform role such as `student`, `teacher` or `admin`.
    pub role: String,
    /// Coerced status flag.
    pub is_active: bool,
    /// Courses the user is enrolled in.
    pub enrolled_courses: u64,
    /// Creation time, when the record carries a parseable one.
    pub created_at: Option<DateTime<Utc>>,
}

impl AdminEntity for User {
    const DEPENDENTS_LABEL: &'static str = "Courses";
    const FILTERS: &'static [&'static str] = &["role", STATUS_FILTER];
    const LABEL: &'static str = "User";
    const RESOURCE: &'static str = "users";

    fn from_raw(raw: &Value) -> Result<Self, AdaptError> {
        let record = RawRecord::new(raw)?;
        let email = record.text_or_default(&["email", "emailAddress"]);
        let name = record
            .text(&["name", "username", "displayName", "fullName"])
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| email.clone());
        Ok(Self {
            id: record.id(&["userId", "id", "_id"])?,
            name,
            email,
            role: record
                .text(&["role", "userRole"])
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| "student".to_string()),
            is_active: record.flag_or(ACTIVE_KEYS, true),
            enrolled_courses: record.count(&["enrolledCourses", "courseCount", "coursesEnrolled"]),
            created_at: record.timestamp(CREATED_KEYS),
        })
    }

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str()]
    }

    fn filter_value(&self, name: &str) -> Option<&str> {
        match name {
            "role" => Some(self.role.as_str()),
            STATUS_FILTER => Some(status_label(self.is_active)),
            _ => None,
        }
    }

    fn category(&self) -> &str {
        &self.role
    }

    fn dependents(&self) -> u64 {
        self.enrolled_courses
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn course_adapter_reads_pascal_case_rows() {
        let raw = json!({
            "CourseId": 7,
            "Title": "Intro to Rust",
            "Category": "Programming",
            "Difficulty": "Beginner",
            "IsActive": 0,
            "EnrolledUsers": 5,
            "CreatedAt": "2024-01-02T03:04:05Z",
        });
        let course = Course::from_raw(&raw).unwrap();
        assert_eq!(course.id.as_str(), "7");
        assert_eq!(course.title, "Intro to Rust");
        assert!(!course.is_active);
        assert_eq!(course.enrolled_users, 5);
        assert!(course.created_at.is_some());
        assert_eq!(course.filter_value("status"), Some("inactive"));
    }

    #[test]
    fn course_adapter_reads_camel_case_rows() {
        let raw = json!({
            "id": "c-1",
            "title": "Web3 Basics",
            "category": "Blockchain",
            "isActive": "true",
            "enrolledCount": "12",
        });
        let course = Course::from_raw(&raw).unwrap();
        assert!(course.is_active);
        assert_eq!(course.enrolled_users, 12);
        assert_eq!(course.difficulty, "");
    }

    #[test]
    fn missing_status_defaults_to_active_but_null_does_not() {
        let absent = Quest::from_raw(&json!({ "id": 1, "title": "q" })).unwrap();
        assert!(absent.is_active);
        let null = Quest::from_raw(&json!({ "id": 1, "title": "q", "is_active": null })).unwrap();
        assert!(!null.is_active);
    }

    #[test]
    fn user_name_falls_back_to_email() {
        let user = User::from_raw(&json!({ "UserId": 3, "Email": "ada@example.com", "Role": "admin" }))
            .unwrap();
        assert_eq!(user.name, "ada@example.com");
        assert_eq!(user.role, "admin");

        let defaulted = User::from_raw(&json!({ "id": 4, "username": "bob" })).unwrap();
        assert_eq!(defaulted.role, "student");
    }

    #[test]
    fn nft_rarity_doubles_as_category() {
        let nft = Nft::from_raw(&json!({
            "nftId": "n1",
            "name": "Golden Bee",
            "rarity": "Legendary",
            "owners": ["a", "b"],
            "imageUrl": "",
        }))
        .unwrap();
        assert_eq!(nft.category(), "Legendary");
        assert_eq!(nft.owner_count, 2);
        assert_eq!(nft.image_url, None);
    }

    #[test]
    fn records_without_ids_are_rejected() {
        assert_eq!(Course::from_raw(&json!({ "title": "x" })), Err(AdaptError::MissingId));
        assert_eq!(Course::from_raw(&json!("x")), Err(AdaptError::NotAnObject("string")));
    }
}
