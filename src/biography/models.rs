// src/biography/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Institution kind of a parliamentary group (faction) membership.
pub const PARLIAMENTARY_GROUP_KIND: &str = "Fraktion/Gruppe";

/// One historical name of a person with its validity window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameVariant {
    pub first_name: String,
    pub last_name: String,
    pub academic_title: String,
    pub nobility: String,
    pub prefix: String,
    pub location_suffix: String,
    pub valid_from: NaiveDate,
    pub valid_to: Option<NaiveDate>,
}

impl NameVariant {
    /// Both boundaries are exclusive.
    pub fn is_valid_at(&self, date: NaiveDate) -> bool {
        date > self.valid_from && self.valid_to.map_or(true, |to| date < to)
    }

    /// Literal containment of both the last and the first name, no word boundaries.
    pub fn is_mentioned_in(&self, text: &str) -> bool {
        !self.last_name.is_empty()
            && !self.first_name.is_empty()
            && text.contains(&self.last_name)
            && text.contains(&self.first_name)
    }

    /// Nobility and prefix, e.g. "Freiherr von".
    pub fn name_affix(&self) -> String {
        format!("{} {}", self.nobility, self.prefix).trim().to_string()
    }

    pub fn full_name(&self) -> String {
        [
            self.academic_title.as_str(),
            self.first_name.as_str(),
            self.nobility.as_str(),
            self.prefix.as_str(),
            self.last_name.as_str(),
            self.location_suffix.as_str(),
        ]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affiliation {
    pub kind: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    pub names: Vec<NameVariant>,
    pub affiliations: Vec<Affiliation>,
}

impl Person {
    pub fn is_mentioned_in(&self, text: &str) -> bool {
        self.names.iter().any(|name| name.is_mentioned_in(text))
    }

    /// The name the person carried at `date`.
    pub fn name_at(&self, date: NaiveDate) -> Option<&NameVariant> {
        self.names.iter().find(|name| name.is_valid_at(date))
    }

    /// Label of the parliamentary group membership, empty if there is none.
    pub fn parliamentary_group(&self) -> String {
        self.affiliations
            .iter()
            .find(|affiliation| affiliation.kind == PARLIAMENTARY_GROUP_KIND)
            .map(|affiliation| affiliation.label.clone())
            .unwrap_or_default()
    }
}

/// A resolved speaker as it is attached to an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerRecord {
    pub id: String,
    pub title: Option<String>,
    pub first_name: String,
    pub name_affix: Option<String>,
    pub last_name: String,
    pub location_suffix: Option<String>,
    pub parliamentary_group: String,
    // Roles and states are not part of the biography data.
    pub role: Option<String>,
    pub role_long: Option<String>,
    pub role_short: Option<String>,
    pub state: Option<String>,
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

impl SpeakerRecord {
    pub fn new(person: &Person, name: &NameVariant) -> Self {
        Self {
            id: person.id.clone(),
            title: non_empty(name.academic_title.clone()),
            first_name: name.first_name.clone(),
            name_affix: non_empty(name.name_affix()),
            last_name: name.last_name.clone(),
            location_suffix: non_empty(name.location_suffix.clone()),
            parliamentary_group: person.parliamentary_group(),
            role: None,
            role_long: None,
            role_short: None,
            state: None,
        }
    }
}
