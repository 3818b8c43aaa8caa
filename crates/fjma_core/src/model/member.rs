//! Member records, tribe partitioning and archived snapshots.
//!
//! # Responsibility
//! - Define the four fixed tribes and their storage containers.
//! - Define member rows and the tribe-partitioned mirror projection.
//!
//! # Invariants
//! - Tribe names parse case-insensitively and persist capitalized.
//! - Container names are static per tribe, never built from input text.
//! - A mirror carries every member field except `tribe`.

use super::{require, ValidationError};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// One of the four fixed member sub-groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tribe {
    Larab,
    Makani,
    Lawod,
    Lasang,
}

impl Tribe {
    /// Every tribe, in declaration order.
    pub const ALL: [Tribe; 4] = [Tribe::Larab, Tribe::Makani, Tribe::Lawod, Tribe::Lasang];

    /// Canonical capitalized name stored in `members.tribe`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Larab => "Larab",
            Self::Makani => "Makani",
            Self::Lawod => "Lawod",
            Self::Lasang => "Lasang",
        }
    }

    /// Parses a tribe name ignoring ASCII case.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|tribe| tribe.as_str().eq_ignore_ascii_case(value))
    }

    pub(crate) fn live_table(self) -> &'static str {
        match self {
            Self::Larab => "larab_members",
            Self::Makani => "makani_members",
            Self::Lawod => "lawod_members",
            Self::Lasang => "lasang_members",
        }
    }

    pub(crate) fn archive_table(self) -> &'static str {
        match self {
            Self::Larab => "larab_members_archive",
            Self::Makani => "makani_members_archive",
            Self::Lawod => "lawod_members_archive",
            Self::Lasang => "lasang_members_archive",
        }
    }
}

impl Display for Tribe {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected tribe name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTribe(pub String);

impl Display for UnknownTribe {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid tribe `{}`; must be one of: Larab, Makani, Lawod, Lasang",
            self.0
        )
    }
}

impl Error for UnknownTribe {}

impl FromStr for Tribe {
    type Err = UnknownTribe;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| UnknownTribe(value.to_string()))
    }
}

/// Member input with the tribe still in raw text form.
///
/// Stores resolve the tribe before touching any container, so an unknown
/// tribe never leaves a partial write behind.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MemberDraft {
    pub school_id: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub year_level: String,
    pub section: String,
    pub email_address: String,
    pub phone_number: String,
    pub tribe: String,
}

/// Live member row keyed by `school_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub school_id: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub year_level: String,
    pub section: String,
    pub email_address: String,
    pub phone_number: String,
    pub tribe: Tribe,
}

impl Member {
    /// Checks required fields before any write.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("school_id", &self.school_id)?;
        require("first_name", &self.first_name)?;
        require("last_name", &self.last_name)?;
        Ok(())
    }

    /// Builds the mirror row kept in this member's tribe container.
    pub fn mirror(&self) -> TribeMember {
        TribeMember {
            tribe: self.tribe,
            school_id: self.school_id.clone(),
            first_name: self.first_name.clone(),
            middle_name: self.middle_name.clone(),
            last_name: self.last_name.clone(),
            year_level: self.year_level.clone(),
            section: self.section.clone(),
            email_address: self.email_address.clone(),
            phone_number: self.phone_number.clone(),
        }
    }
}

impl TryFrom<&MemberDraft> for Member {
    type Error = UnknownTribe;

    fn try_from(draft: &MemberDraft) -> Result<Self, Self::Error> {
        Ok(Self {
            school_id: draft.school_id.clone(),
            first_name: draft.first_name.clone(),
            middle_name: draft.middle_name.clone(),
            last_name: draft.last_name.clone(),
            year_level: draft.year_level.clone(),
            section: draft.section.clone(),
            email_address: draft.email_address.clone(),
            phone_number: draft.phone_number.clone(),
            tribe: draft.tribe.parse()?,
        })
    }
}

/// Tribe-partitioned copy of a member row.
///
/// `tribe` names the container the row lives in; it is not a stored column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TribeMember {
    pub tribe: Tribe,
    pub school_id: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub year_level: String,
    pub section: String,
    pub email_address: String,
    pub phone_number: String,
}

impl TribeMember {
    /// Returns whether every shared field matches `member`.
    pub fn agrees_with(&self, member: &Member) -> bool {
        *self == member.mirror()
    }
}

/// Member row moved out of live storage by a delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberArchiveEntry {
    pub archive_id: i64,
    pub member: Member,
    pub deleted_at: String,
}

/// Mirror row moved out of a tribe container by a delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TribeMemberArchiveEntry {
    pub archive_id: i64,
    pub member: TribeMember,
    pub deleted_at: String,
}

#[cfg(test)]
mod tests {
    use super::{Member, MemberDraft, Tribe};

    #[test]
    fn tribe_parse_ignores_case() {
        assert_eq!(Tribe::parse("larab"), Some(Tribe::Larab));
        assert_eq!(Tribe::parse("LAWOD"), Some(Tribe::Lawod));
        assert_eq!(Tribe::parse("Makani"), Some(Tribe::Makani));
        assert_eq!(Tribe::parse("Unknown"), None);
        assert_eq!(Tribe::parse(""), None);
    }

    #[test]
    fn tribe_containers_are_distinct() {
        let mut tables: Vec<_> = Tribe::ALL
            .iter()
            .flat_map(|tribe| [tribe.live_table(), tribe.archive_table()])
            .collect();
        tables.sort_unstable();
        tables.dedup();
        assert_eq!(tables.len(), 8);
    }

    #[test]
    fn draft_with_unknown_tribe_is_rejected() {
        let draft = MemberDraft {
            school_id: "M1".to_string(),
            tribe: "Sky".to_string(),
            ..MemberDraft::default()
        };
        let err = Member::try_from(&draft).unwrap_err();
        assert!(err.to_string().contains("Sky"));
    }

    #[test]
    fn mirror_copies_every_shared_field() {
        let draft = MemberDraft {
            school_id: "M2".to_string(),
            first_name: "Lia".to_string(),
            middle_name: Some("B".to_string()),
            last_name: "Santos".to_string(),
            year_level: "2".to_string(),
            section: "A".to_string(),
            email_address: "lia@x.edu".to_string(),
            phone_number: "0917".to_string(),
            tribe: "lasang".to_string(),
        };
        let member = Member::try_from(&draft).unwrap();
        let mirror = member.mirror();
        assert_eq!(mirror.tribe, Tribe::Lasang);
        assert!(mirror.agrees_with(&member));
    }
}
