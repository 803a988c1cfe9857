//! The event draft aggregate and partial edits to it.

use crate::step::StepId;
use crate::topology::{self, StepTopology};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Name persisted when neither the edit nor the stored draft carries one.
pub const PLACEHOLDER_NAME: &str = "Untitled Event";

/// Remote identifier of a persisted draft.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DraftId(Uuid);

impl DraftId {
    /// Wrap an existing UUID.
    #[must_use]
    pub const fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DraftId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Identity (user profile) that owns a draft.
///
/// Remote inserts reference the owner record, so a missing owner record is
/// what produces a referential failure on save.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OwnerId(Uuid);

impl OwnerId {
    /// Wrap an existing UUID.
    #[must_use]
    pub const fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monetization category; decides which registration sub-steps exist.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Monetization {
    /// No tickets are sold
    #[default]
    Free,
    /// Ticketed event
    Paid,
    /// Ongoing, recurring sales
    Continuous,
}

impl Monetization {
    /// Database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Paid => "paid",
            Self::Continuous => "continuous",
        }
    }

    /// Parse from the database string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "free" => Some(Self::Free),
            "paid" => Some(Self::Paid),
            "continuous" => Some(Self::Continuous),
            _ => None,
        }
    }
}

/// How attendees take part.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventFormat {
    /// Physical venue
    #[default]
    InPerson,
    /// Online only
    Virtual,
    /// Both
    Hybrid,
}

impl EventFormat {
    /// Database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InPerson => "in-person",
            Self::Virtual => "virtual",
            Self::Hybrid => "hybrid",
        }
    }

    /// Parse from the database string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "in-person" => Some(Self::InPerson),
            "virtual" => Some(Self::Virtual),
            "hybrid" => Some(Self::Hybrid),
            _ => None,
        }
    }
}

/// Lifecycle status of an event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// Still being authored
    #[default]
    Draft,
    /// Live; set only by finishing the launch step
    Published,
    /// Hidden from listings
    Archived,
    /// Took place
    Completed,
    /// Called off
    Cancelled,
}

impl EventStatus {
    /// Database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse from the database string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "published" => Some(Self::Published),
            "archived" => Some(Self::Archived),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// The event record under construction.
///
/// `id` stays `None` until the first successful insert. From then on every
/// save is an update keyed by that id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventDraft {
    /// Remote id, absent before the first insert
    pub id: Option<DraftId>,
    /// Owning identity
    pub owner_id: OwnerId,
    /// Event name
    pub name: String,
    /// Monetization category
    pub monetization: Monetization,
    /// Attendance format
    pub format: EventFormat,
    /// Start of the event
    pub starts_at: Option<DateTime<Utc>>,
    /// End of the event
    pub ends_at: Option<DateTime<Utc>>,
    /// Venue or meeting link
    pub location: Option<String>,
    /// Attendee limit
    pub capacity: Option<u32>,
    /// Whether a waitlist opens when capacity is reached
    pub waitlist_enabled: bool,
    /// Waitlist limit
    pub waitlist_capacity: Option<u32>,
    /// Opaque branding configuration
    pub branding: Option<serde_json::Value>,
    /// Lifecycle status
    pub status: EventStatus,
    /// Last successful save, stamped by the repository
    pub updated_at: Option<DateTime<Utc>>,
}

impl EventDraft {
    /// A blank draft owned by `owner_id`.
    #[must_use]
    pub fn new(owner_id: OwnerId) -> Self {
        Self {
            id: None,
            owner_id,
            name: String::new(),
            monetization: Monetization::default(),
            format: EventFormat::default(),
            starts_at: None,
            ends_at: None,
            location: None,
            capacity: None,
            waitlist_enabled: false,
            waitlist_capacity: None,
            branding: None,
            status: EventStatus::default(),
            updated_at: None,
        }
    }

    /// Whether the draft exists remotely.
    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// The steps valid for this draft's monetization category.
    #[must_use]
    pub fn topology(&self) -> StepTopology {
        topology::resolve(self.monetization)
    }

    /// Whether `step` is valid for this draft.
    #[must_use]
    pub fn has_step(&self, step: StepId) -> bool {
        topology::is_member(self.monetization, step)
    }

    /// Apply an edit in place.
    pub fn apply(&mut self, patch: &DraftPatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(monetization) = patch.monetization {
            self.monetization = monetization;
        }
        if let Some(format) = patch.format {
            self.format = format;
        }
        if let Some(starts_at) = patch.starts_at {
            self.starts_at = starts_at;
        }
        if let Some(ends_at) = patch.ends_at {
            self.ends_at = ends_at;
        }
        if let Some(location) = &patch.location {
            self.location.clone_from(location);
        }
        if let Some(capacity) = patch.capacity {
            self.capacity = capacity;
        }
        if let Some(enabled) = patch.waitlist_enabled {
            self.waitlist_enabled = enabled;
        }
        if let Some(waitlist_capacity) = patch.waitlist_capacity {
            self.waitlist_capacity = waitlist_capacity;
        }
        if let Some(branding) = &patch.branding {
            self.branding.clone_from(branding);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }

    /// Return a copy with `patch` applied.
    #[must_use]
    pub fn with_patch(mut self, patch: &DraftPatch) -> Self {
        self.apply(patch);
        self
    }
}

/// Resolve the name to persist.
///
/// Trimmed incoming name, else trimmed existing name, else `placeholder`.
///
/// # Examples
///
/// ```
/// use event_wizard_core::draft::{resolve_name, PLACEHOLDER_NAME};
///
/// assert_eq!(resolve_name(Some("  Gala "), "Old", PLACEHOLDER_NAME), "Gala");
/// assert_eq!(resolve_name(Some("   "), " Old ", PLACEHOLDER_NAME), "Old");
/// assert_eq!(resolve_name(None, "", PLACEHOLDER_NAME), PLACEHOLDER_NAME);
/// ```
#[must_use]
pub fn resolve_name(incoming: Option<&str>, existing: &str, placeholder: &str) -> String {
    incoming
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .or_else(|| Some(existing.trim()).filter(|name| !name.is_empty()))
        .unwrap_or(placeholder)
        .to_string()
}

/// A partial set of field edits.
///
/// `None` leaves a field alone. Nullable fields use a nested option so a
/// patch can clear them: `capacity: Some(None)` removes the limit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DraftPatch {
    /// New name
    pub name: Option<String>,
    /// New monetization category
    pub monetization: Option<Monetization>,
    /// New format
    pub format: Option<EventFormat>,
    /// New start
    pub starts_at: Option<Option<DateTime<Utc>>>,
    /// New end
    pub ends_at: Option<Option<DateTime<Utc>>>,
    /// New location
    pub location: Option<Option<String>>,
    /// New capacity
    pub capacity: Option<Option<u32>>,
    /// New waitlist flag
    pub waitlist_enabled: Option<bool>,
    /// New waitlist capacity
    pub waitlist_capacity: Option<Option<u32>>,
    /// New branding blob
    pub branding: Option<Option<serde_json::Value>>,
    /// New status
    pub status: Option<EventStatus>,
}

impl DraftPatch {
    /// An empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Combine two patches; fields set in `self` win over `earlier`.
    #[must_use]
    pub fn merged_over(self, earlier: Self) -> Self {
        Self {
            name: self.name.or(earlier.name),
            monetization: self.monetization.or(earlier.monetization),
            format: self.format.or(earlier.format),
            starts_at: self.starts_at.or(earlier.starts_at),
            ends_at: self.ends_at.or(earlier.ends_at),
            location: self.location.or(earlier.location),
            capacity: self.capacity.or(earlier.capacity),
            waitlist_enabled: self.waitlist_enabled.or(earlier.waitlist_enabled),
            waitlist_capacity: self.waitlist_capacity.or(earlier.waitlist_capacity),
            branding: self.branding.or(earlier.branding),
            status: self.status.or(earlier.status),
        }
    }

    /// Set the name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the monetization category.
    #[must_use]
    pub const fn monetization(mut self, monetization: Monetization) -> Self {
        self.monetization = Some(monetization);
        self
    }

    /// Set the format.
    #[must_use]
    pub const fn format(mut self, format: EventFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Set both temporal bounds.
    #[must_use]
    pub const fn schedule(mut self, starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> Self {
        self.starts_at = Some(Some(starts_at));
        self.ends_at = Some(Some(ends_at));
        self
    }

    /// Set or clear the location.
    #[must_use]
    pub fn location(mut self, location: Option<String>) -> Self {
        self.location = Some(location);
        self
    }

    /// Set or clear the capacity limit.
    #[must_use]
    pub const fn capacity(mut self, capacity: Option<u32>) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Configure the waitlist.
    #[must_use]
    pub const fn waitlist(mut self, enabled: bool, capacity: Option<u32>) -> Self {
        self.waitlist_enabled = Some(enabled);
        self.waitlist_capacity = Some(capacity);
        self
    }

    /// Set or clear the branding blob.
    #[must_use]
    pub fn branding(mut self, branding: Option<serde_json::Value>) -> Self {
        self.branding = Some(branding);
        self
    }

    /// Set the lifecycle status.
    #[must_use]
    pub const fn status(mut self, status: EventStatus) -> Self {
        self.status = Some(status);
        self
    }
}
