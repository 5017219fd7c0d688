// src/biography/resolver.rs
use chrono::NaiveDate;
use crate::biography::models::{Person, SpeakerRecord};
use crate::biography::store::BiographyStore;
use crate::utils::error::LookupError;

/// Outcome of a successful lookup. Ambiguity is kept visible to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum SpeakerLookup {
    Resolved(SpeakerRecord),
    /// Several persons were mentioned; `chosen` is the first one with a name valid at the date.
    Ambiguous { chosen: SpeakerRecord, candidates: Vec<String> },
}

impl SpeakerLookup {
    pub fn record(&self) -> &SpeakerRecord {
        match self {
            SpeakerLookup::Resolved(record) => record,
            SpeakerLookup::Ambiguous { chosen, .. } => chosen,
        }
    }

    pub fn into_record(self) -> SpeakerRecord {
        match self {
            SpeakerLookup::Resolved(record) => record,
            SpeakerLookup::Ambiguous { chosen, .. } => chosen,
        }
    }
}

/// Matches free entry text against the biography store.
#[derive(Debug, Clone, Copy)]
pub struct SpeakerResolver<'a> {
    store: &'a BiographyStore,
}

impl<'a> SpeakerResolver<'a> {
    pub fn new(store: &'a BiographyStore) -> Self {
        Self { store }
    }

    pub fn resolve(&self, text: &str, date: NaiveDate) -> Result<SpeakerLookup, LookupError> {
        let candidates = self.store.find_mentioned(text);

        match candidates.as_slice() {
            [] => Err(LookupError::Miss(text.to_string())),
            [person] => record_at(person, date).map(SpeakerLookup::Resolved),
            [first, ..] => {
                let ids: Vec<String> = candidates.iter().map(|person| person.id.clone()).collect();
                tracing::warn!("Multiple possible results for: {} ({})", text, ids.join(", "));

                let chosen = candidates
                    .iter()
                    .find_map(|person| record_at(person, date).ok())
                    .ok_or_else(|| LookupError::NoValidName { id: first.id.clone(), date })?;
                Ok(SpeakerLookup::Ambiguous { chosen, candidates: ids })
            }
        }
    }
}

fn record_at(person: &Person, date: NaiveDate) -> Result<SpeakerRecord, LookupError> {
    let name = person
        .name_at(date)
        .ok_or_else(|| LookupError::NoValidName { id: person.id.clone(), date })?;
    tracing::debug!("Found Name: {}", name.full_name());

    let record = SpeakerRecord::new(person, name);
    tracing::debug!("Found Fraktion: {}", record.parliamentary_group);
    Ok(record)
}
