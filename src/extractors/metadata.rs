// src/extractors/metadata.rs
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use crate::document::TextRun;
use crate::extractors::normalize::{normalize_page, split_entries, SECTION_DELIMITER};
use crate::extractors::overrides::OverrideTable;
use crate::utils::error::ExtractError;

/// Header data of one session protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub electoral_period: String,
    pub session_number: String,
    pub location: String,
    /// e.g. "Donnerstag, 12. September 2002"
    pub date_day_text: String,
    pub date: NaiveDate,
}

// Sometimes the session number and ". Sitzung" are separate runs ("201µ. Sitzung").
static SESSION_NUMBER_SPLIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"µ(\d{1,3})µ\.").expect("Failed to compile SESSION_NUMBER_SPLIT")
});

static PERIOD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,2}$").expect("Failed to compile PERIOD"));
static SESSION_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{1,3}$").expect("Failed to compile SESSION_NUMBER")
});

/// Reads period, session number, location and date from the runs of the first page.
pub fn extract_metadata(
    first_page: &[TextRun],
    document_id: &str,
    overrides: &OverrideTable,
) -> Result<Metadata, ExtractError> {
    let normalized = normalize_page(first_page, document_id, overrides);
    let header = split_entries(&normalized).into_iter().next().unwrap_or_default();
    let header = SESSION_NUMBER_SPLIT.replace(&header, "µ${1}.");

    let segments: Vec<&str> = header.split(SECTION_DELIMITER).take(5).collect();

    let (location, date_day_text, date) = parse_location_date(segments.get(4).copied().unwrap_or(""))?;

    // "Plenarprotokoll 18/201"
    let mut tokens = segments
        .first()
        .copied()
        .unwrap_or("")
        .split(|c: char| c == ' ' || c == '/')
        .skip(1);
    let electoral_period = tokens.next().unwrap_or("").to_string();
    let session_number = tokens.next().unwrap_or("").to_string();

    // sanity checks
    if !PERIOD.is_match(&electoral_period) {
        return Err(ExtractError::MetadataSanity(format!(
            "No fitting period found in metadata. Found: {}",
            electoral_period
        )));
    }
    if !SESSION_NUMBER.is_match(&session_number) {
        return Err(ExtractError::MetadataSanity(format!(
            "No fitting session number found in metadata. Found: {}",
            session_number
        )));
    }

    tracing::info!("Protocol {}/{} from {} ({})", electoral_period, session_number, date, location);
    Ok(Metadata { electoral_period, session_number, location, date_day_text, date })
}

/// Splits "Berlin, Donnerstag, 12. September 2002" into location, day text and date.
pub fn parse_location_date(segment: &str) -> Result<(String, String, NaiveDate), ExtractError> {
    let location = segment.split(',').next().unwrap_or("").trim().to_string();
    let date_day_text = segment.splitn(2, ", ").nth(1).unwrap_or("").trim().to_string();

    let words: Vec<&str> = segment.split_whitespace().collect();
    let date = match words.as_slice() {
        [.., day, month, year] => parse_header_date(day, month, year),
        _ => None,
    }
    .ok_or_else(|| ExtractError::DateParse(segment.to_string()))?;

    Ok((location, date_day_text, date))
}

fn parse_header_date(day: &str, month: &str, year: &str) -> Option<NaiveDate> {
    let day = day.strip_suffix('.')?.parse().ok()?;
    let month = german_month(month)?;
    let year = year.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn german_month(name: &str) -> Option<u32> {
    let month = match name.to_lowercase().as_str() {
        "januar" | "jänner" => 1,
        "februar" => 2,
        "märz" | "maerz" => 3,
        "april" => 4,
        "mai" => 5,
        "juni" => 6,
        "juli" => 7,
        "august" => 8,
        "september" => 9,
        "oktober" => 10,
        "november" => 11,
        "dezember" => 12,
        _ => return None,
    };
    Some(month)
}
