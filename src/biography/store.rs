// src/biography/store.rs
use std::path::Path;
use chrono::NaiveDate;
use roxmltree::{Document, Node, ParsingOptions};
use crate::biography::models::{Affiliation, NameVariant, Person};
use crate::utils::error::BiographyError;

// Biography date format (e.g. 01.09.1951)
const BIOGRAPHY_DATE_FORMAT: &str = "%d.%m.%Y";

/// Read-only person records of one electoral period.
#[derive(Debug, Clone, Default)]
pub struct BiographyStore {
    period: String,
    persons: Vec<Person>,
}

impl BiographyStore {
    pub fn from_persons(period: impl Into<String>, persons: Vec<Person>) -> Self {
        Self { period: period.into(), persons }
    }

    /// Reads a biography XML file. Either the full dataset or an extract for the period.
    pub fn load<P: AsRef<Path>>(path: P, period: &str) -> Result<Self, BiographyError> {
        tracing::info!("Parsing biography file {} for period {}...", path.as_ref().display(), period);
        let xml = std::fs::read_to_string(path.as_ref())?;
        let store = Self::from_xml(&xml, period)?;
        tracing::info!("Loaded {} persons for period {}", store.len(), period);
        Ok(store)
    }

    /// Parses `DOCUMENT/MDB` records, keeping the persons who were members in `period`
    /// together with that period's affiliations.
    pub fn from_xml(xml: &str, period: &str) -> Result<Self, BiographyError> {
        let options = ParsingOptions { allow_dtd: true, ..ParsingOptions::default() };
        let document = Document::parse_with_options(xml, options)?;

        let mut persons = Vec::new();
        for mdb in document.root_element().children().filter(|n| n.has_tag_name("MDB")) {
            if let Some(person) = parse_person(mdb, period)? {
                persons.push(person);
            }
        }

        Ok(Self::from_persons(period, persons))
    }

    pub fn period(&self) -> &str {
        &self.period
    }

    pub fn len(&self) -> usize {
        self.persons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }

    /// Persons with any name variant mentioned in `text`, in store order.
    pub fn find_mentioned(&self, text: &str) -> Vec<&Person> {
        self.persons.iter().filter(|person| person.is_mentioned_in(text)).collect()
    }
}

fn child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(tag))
}

fn child_text<'a>(node: Node<'a, '_>, tag: &str) -> Option<&'a str> {
    child(node, tag)
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
}

fn text_or_empty(node: Node, tag: &str) -> String {
    child_text(node, tag).unwrap_or_default().to_string()
}

pub fn parse_biography_date(id: &str, value: &str) -> Result<NaiveDate, BiographyError> {
    NaiveDate::parse_from_str(value, BIOGRAPHY_DATE_FORMAT).map_err(|_| BiographyError::InvalidDate {
        id: id.to_string(),
        value: value.to_string(),
    })
}

fn parse_person(mdb: Node, period: &str) -> Result<Option<Person>, BiographyError> {
    let id = child_text(mdb, "ID").ok_or(BiographyError::MissingField { field: "ID" })?;

    let membership = child(mdb, "WAHLPERIODEN").and_then(|periods| {
        periods
            .children()
            .filter(|n| n.has_tag_name("WAHLPERIODE"))
            .find(|wp| child_text(*wp, "WP") == Some(period))
    });
    let membership = match membership {
        Some(membership) => membership,
        None => return Ok(None),
    };

    let affiliations = membership
        .descendants()
        .filter(|n| n.has_tag_name("INSTITUTION"))
        .map(|institution| Affiliation {
            kind: text_or_empty(institution, "INSART_LANG"),
            label: text_or_empty(institution, "INS_LANG"),
        })
        .collect();

    let mut names = Vec::new();
    let name_nodes = child(mdb, "NAMEN")
        .into_iter()
        .flat_map(|namen| namen.children())
        .filter(|n| n.has_tag_name("NAME"));
    for name in name_nodes {
        let valid_from = match child_text(name, "HISTORIE_VON") {
            Some(value) => value,
            None => {
                tracing::warn!("No HISTORIE_VON found in NAME for person {}", id);
                continue;
            }
        };

        let dates = parse_biography_date(id, valid_from).and_then(|from| {
            child_text(name, "HISTORIE_BIS")
                .map(|to| parse_biography_date(id, to))
                .transpose()
                .map(|to| (from, to))
        });
        let (valid_from, valid_to) = match dates {
            Ok(dates) => dates,
            Err(e) => {
                tracing::warn!("Skipping name variant: {}", e);
                continue;
            }
        };

        names.push(NameVariant {
            first_name: text_or_empty(name, "VORNAME"),
            last_name: text_or_empty(name, "NACHNAME"),
            academic_title: text_or_empty(name, "AKAD_TITEL"),
            nobility: text_or_empty(name, "ADEL"),
            prefix: text_or_empty(name, "PRAEFIX"),
            location_suffix: text_or_empty(name, "ORTSZUSATZ"),
            valid_from,
            valid_to,
        });
    }

    Ok(Some(Person { id: id.to_string(), names, affiliations }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE DOCUMENT SYSTEM "MDB_STAMMDATEN.DTD">
<DOCUMENT>
  <VERSION>1</VERSION>
  <MDB>
    <ID>11004097</ID>
    <NAMEN>
      <NAME>
        <NACHNAME>Müller</NACHNAME>
        <VORNAME>Petra</VORNAME>
        <ORTSZUSATZ>(Aachen)</ORTSZUSATZ>
        <ADEL/>
        <PRAEFIX/>
        <AKAD_TITEL>Dr.</AKAD_TITEL>
        <HISTORIE_VON>01.01.2014</HISTORIE_VON>
        <HISTORIE_BIS>31.12.2017</HISTORIE_BIS>
      </NAME>
      <NAME>
        <NACHNAME>Schmidt-Müller</NACHNAME>
        <VORNAME>Petra</VORNAME>
        <HISTORIE_VON>01.01.2018</HISTORIE_VON>
        <HISTORIE_BIS/>
      </NAME>
      <NAME>
        <NACHNAME>Ohne Datum</NACHNAME>
        <VORNAME>Petra</VORNAME>
      </NAME>
    </NAMEN>
    <WAHLPERIODEN>
      <WAHLPERIODE>
        <WP>17</WP>
        <INSTITUTIONEN>
          <INSTITUTION><INSART_LANG>Fraktion/Gruppe</INSART_LANG><INS_LANG>Fraktion der FDP</INS_LANG></INSTITUTION>
        </INSTITUTIONEN>
      </WAHLPERIODE>
      <WAHLPERIODE>
        <WP>18</WP>
        <INSTITUTIONEN>
          <INSTITUTION><INSART_LANG>Ausschuss</INSART_LANG><INS_LANG>Haushaltsausschuss</INS_LANG></INSTITUTION>
          <INSTITUTION><INSART_LANG>Fraktion/Gruppe</INSART_LANG><INS_LANG>Fraktion der SPD</INS_LANG></INSTITUTION>
        </INSTITUTIONEN>
      </WAHLPERIODE>
    </WAHLPERIODEN>
  </MDB>
  <MDB>
    <ID>11000001</ID>
    <NAMEN>
      <NAME>
        <NACHNAME>Abelein</NACHNAME>
        <VORNAME>Manfred</VORNAME>
        <HISTORIE_VON>19.10.1965</HISTORIE_VON>
      </NAME>
    </NAMEN>
    <WAHLPERIODEN>
      <WAHLPERIODE><WP>5</WP></WAHLPERIODE>
    </WAHLPERIODEN>
  </MDB>
</DOCUMENT>"#;

    #[test]
    fn test_from_xml_keeps_members_of_period() {
        let store = BiographyStore::from_xml(SAMPLE, "18").unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.period(), "18");

        let found = store.find_mentioned("Petra Müller (SPD)");
        let person = found[0];
        assert_eq!(person.id, "11004097");
        assert_eq!(person.names.len(), 2, "variant without start date is skipped");
        assert_eq!(person.names[0].location_suffix, "(Aachen)");
        assert_eq!(person.names[1].valid_to, None);
        assert_eq!(person.parliamentary_group(), "Fraktion der SPD");
    }

    #[test]
    fn test_affiliations_come_from_requested_period() {
        let store = BiographyStore::from_xml(SAMPLE, "17").unwrap();
        let found = store.find_mentioned("Petra Müller");
        let person = found[0];
        assert_eq!(person.parliamentary_group(), "Fraktion der FDP");
    }

    #[test]
    fn test_missing_id_is_an_error() {
        let xml = "<DOCUMENT><MDB><NAMEN/></MDB></DOCUMENT>";
        assert!(matches!(
            BiographyStore::from_xml(xml, "18"),
            Err(BiographyError::MissingField { field: "ID" })
        ));
    }

    #[test]
    fn test_invalid_xml() {
        assert!(matches!(BiographyStore::from_xml("<DOCUMENT>", "18"), Err(BiographyError::Xml(_))));
    }

    #[test]
    fn test_parse_biography_date() {
        assert_eq!(parse_biography_date("1", "01.09.1951").unwrap(), NaiveDate::from_ymd_opt(1951, 9, 1).unwrap());
        assert!(matches!(parse_biography_date("1", "1951-09-01"), Err(BiographyError::InvalidDate { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("MDB_STAMMDATEN_WP5.xml");
        std::fs::write(&path, SAMPLE).unwrap();

        let store = BiographyStore::load(&path, "5").unwrap();
        assert_eq!(store.find_mentioned("Manfred Abelein")[0].id, "11000001");
        assert!(store.find_mentioned("Manfred").is_empty());
    }
}
