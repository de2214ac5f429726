//! Event members - who signed up, as which class, in which role

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::value_objects::Snowflake;

/// Character class of a signup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterClass {
    DeathKnight,
    Druid,
    Hunter,
    Mage,
    Paladin,
    Priest,
    Rogue,
    Shaman,
    Warlock,
    Warrior,
}

impl CharacterClass {
    pub const ALL: [CharacterClass; 10] = [
        Self::DeathKnight,
        Self::Druid,
        Self::Hunter,
        Self::Mage,
        Self::Paladin,
        Self::Priest,
        Self::Rogue,
        Self::Shaman,
        Self::Warlock,
        Self::Warrior,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::DeathKnight => "DeathKnight",
            Self::Druid => "Druid",
            Self::Hunter => "Hunter",
            Self::Mage => "Mage",
            Self::Paladin => "Paladin",
            Self::Priest => "Priest",
            Self::Rogue => "Rogue",
            Self::Shaman => "Shaman",
            Self::Warlock => "Warlock",
            Self::Warrior => "Warrior",
        }
    }
}

impl fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts canonical names and common nicknames, case-insensitively
impl FromStr for CharacterClass {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        if let Some(class) = Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(&key))
        {
            return Ok(class);
        }

        match key.as_str() {
            "huntard" => Ok(Self::Hunter),
            "pally" | "pala" => Ok(Self::Paladin),
            "rouge" => Ok(Self::Rogue),
            "shammy" | "sham" => Ok(Self::Shaman),
            "lock" => Ok(Self::Warlock),
            "warr" => Ok(Self::Warrior),
            "dk" | "death knight" => Ok(Self::DeathKnight),
            _ => Err(UnknownValue(s.trim().to_string())),
        }
    }
}

/// What a member does in the raid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerRole {
    Tank,
    Healer,
    Melee,
    Ranged,
}

impl PlayerRole {
    /// Display order of the roster sections
    pub const ALL: [PlayerRole; 4] = [Self::Tank, Self::Healer, Self::Melee, Self::Ranged];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tank => "Tank",
            Self::Healer => "Healer",
            Self::Melee => "Melee",
            Self::Ranged => "Ranged",
        }
    }

    /// Heading used in the declaration embed
    pub fn heading(self) -> &'static str {
        match self {
            Self::Tank => "Tanks",
            Self::Healer => "Healers",
            Self::Melee => "Melee DPS",
            Self::Ranged => "Ranged DPS",
        }
    }
}

impl fmt::Display for PlayerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlayerRole {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        if let Some(role) = Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(&key))
        {
            return Ok(role);
        }

        match key.as_str() {
            "caster" | "range" => Ok(Self::Ranged),
            "heal" | "heals" => Ok(Self::Healer),
            _ => Err(UnknownValue(s.trim().to_string())),
        }
    }
}

/// A class or role name that matched nothing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value: {0}")]
pub struct UnknownValue(pub String);

/// One signup on an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub character_class: CharacterClass,
    pub role: PlayerRole,
    pub member_id: Snowflake,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_name: Option<String>,
}

impl Member {
    pub fn new(member_id: Snowflake, character_class: CharacterClass, role: PlayerRole) -> Self {
        Self {
            character_class,
            role,
            member_id,
            display_name: None,
            character_name: None,
        }
    }

    #[must_use]
    pub fn with_character_name(mut self, name: Option<String>) -> Self {
        self.character_name = name.filter(|n| !n.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_display_name(mut self, name: Option<String>) -> Self {
        self.display_name = name.filter(|n| !n.is_empty());
        self
    }
}

/// Result of an upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Added,
    Updated,
}

/// Ordered members of an event, at most one entry per member id.
///
/// Order is insertion order; updating a member keeps its slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Member>", into = "Vec<Member>")]
pub struct Roster(Vec<Member>);

impl Roster {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert a member, or overwrite the entry that has the same id in place
    pub fn upsert(&mut self, member: Member) -> Upsert {
        match self.0.iter_mut().find(|m| m.member_id == member.member_id) {
            Some(existing) => {
                *existing = member;
                Upsert::Updated
            }
            None => {
                self.0.push(member);
                Upsert::Added
            }
        }
    }

    /// Remove the member with this id. Returns whether anything was removed.
    pub fn remove(&mut self, member_id: Snowflake) -> bool {
        let before = self.0.len();
        self.0.retain(|m| m.member_id != member_id);
        self.0.len() != before
    }

    pub fn get(&self, member_id: Snowflake) -> Option<&Member> {
        self.0.iter().find(|m| m.member_id == member_id)
    }

    pub fn contains(&self, member_id: Snowflake) -> bool {
        self.get(member_id).is_some()
    }

    /// 1-based display index of a member
    pub fn index_of(&self, member_id: Snowflake) -> Option<usize> {
        self.0
            .iter()
            .position(|m| m.member_id == member_id)
            .map(|i| i + 1)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Member> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Member> {
        self.0.iter_mut()
    }

    pub fn by_role(&self, role: PlayerRole) -> impl Iterator<Item = &Member> {
        self.0.iter().filter(move |m| m.role == role)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Stored data may contain duplicates written by older versions; the first entry wins
impl From<Vec<Member>> for Roster {
    fn from(members: Vec<Member>) -> Self {
        let mut roster = Roster(Vec::with_capacity(members.len()));
        for member in members {
            if !roster.contains(member.member_id) {
                roster.0.push(member);
            }
        }
        roster
    }
}

impl From<Roster> for Vec<Member> {
    fn from(roster: Roster) -> Self {
        roster.0
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a Member;
    type IntoIter = std::slice::Iter<'a, Member>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
