// src/extractors/normalize.rs
//! Turns the raw text runs of one page into a single string with two levels of delimiters.
//!
//! `µ` separates the sections (text runs) inside a logical entry, `ƒ` separates the entries.
//! Entries after the first start with the page reference that closed the previous entry,
//! e.g. `Eröffnung der Sitzungƒ1 AµWahl des Präsidentenƒ2 B`.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use crate::document::TextRun;
use crate::extractors::overrides::OverrideTable;
use crate::extractors::references::PAGE_REFERENCE;

pub const SECTION_DELIMITER: char = 'µ';
pub const ENTRY_DELIMITER: char = 'ƒ';

// --- Regex Patterns (Lazy Static) ---

// A hyphen at the end of a run splits a word. There might be empty space before it.
static HYPHEN_BEFORE_DELIMITER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[ µ]*-µ").expect("Failed to compile HYPHEN_BEFORE_DELIMITER")
});

// "Stefan Müller . . . . . . .µ µ123 Aµ" => "Stefan Müllerƒ123 Aµ"
static LEADER_DOTS_BEFORE_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"µ? ?(?:\. ?){{2,}}µ(?: ?µ)?{}(µ|$)", PAGE_REFERENCE))
        .expect("Failed to compile LEADER_DOTS_BEFORE_REFERENCE")
});

// Spaced dots without a reference are formatting noise.
static DECORATIVE_DOTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\. )+\.(?:µ|$)").expect("Failed to compile DECORATIVE_DOTS")
});

static REPEATED_SECTION_DELIMITERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"µ{2,}").expect("Failed to compile REPEATED_SECTION_DELIMITERS")
});

// Justified lines get split into one run per word.
static JUSTIFIED_WORD_BEFORE_SPACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"µ(\p{L}+)µ ").expect("Failed to compile JUSTIFIED_WORD_BEFORE_SPACE")
});
static JUSTIFIED_WORD_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"µ\p{L}+ (?:µ\p{L}+ )*µ\p{L}+").expect("Failed to compile JUSTIFIED_WORD_RUN")
});

static BULLET_BEFORE_DELIMITER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"–µ µ ?").expect("Failed to compile BULLET_BEFORE_DELIMITER")
});

static SPACED_SECTION_DELIMITERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"µ µ").expect("Failed to compile SPACED_SECTION_DELIMITERS")
});
static SPACES_AROUND_SECTION_DELIMITER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r" *µ *").expect("Failed to compile SPACES_AROUND_SECTION_DELIMITER")
});
static SPACES_AROUND_ENTRY_DELIMITER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r" *ƒ *").expect("Failed to compile SPACES_AROUND_ENTRY_DELIMITER")
});
static SECTIONS_AROUND_ENTRY_DELIMITER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"µ*ƒµ*").expect("Failed to compile SECTIONS_AROUND_ENTRY_DELIMITER")
});

// (BÜNDNIS 90/µDIE GRÜNEN) => (BÜNDNIS 90/DIE GRÜNEN)
static SLASH_BEFORE_DELIMITER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/µ").expect("Failed to compile SLASH_BEFORE_DELIMITER")
});

// Some letters end up in a run of their own, e.g. the ğ in "Dağdelen".
static ISOLATED_SPECIAL_LETTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"µ([ğĞıİşŞ])µ").expect("Failed to compile ISOLATED_SPECIAL_LETTER")
});

/// Normalizes the runs of one page. Never fails; broken structure shows up when
/// references and entries are aligned.
pub fn normalize_page(runs: &[TextRun], document_id: &str, overrides: &OverrideTable) -> String {
    let joined = runs
        .iter()
        .map(TextRun::as_str)
        .collect::<Vec<_>>()
        .join(&SECTION_DELIMITER.to_string());

    let text = overrides.apply_pre(document_id, &joined);
    let text = normalize_text(&text);
    overrides.apply_post(document_id, &text)
}

/// The generic rules, in order.
pub fn normalize_text(text: &str) -> String {
    let text = HYPHEN_BEFORE_DELIMITER.replace_all(text, "");

    let text = LEADER_DOTS_BEFORE_REFERENCE.replace_all(&text, |caps: &Captures| {
        let reference = if caps[2].is_empty() {
            caps[1].to_string()
        } else {
            format!("{} {}", &caps[1], &caps[2])
        };
        format!("{}{}{}", ENTRY_DELIMITER, reference, &caps[3])
    });
    let text = DECORATIVE_DOTS.replace_all(&text, "");

    let text = REPEATED_SECTION_DELIMITERS.replace_all(&text, "µ");

    let text = JUSTIFIED_WORD_BEFORE_SPACE.replace_all(&text, "µ${1} ");
    let text = JUSTIFIED_WORD_RUN.replace_all(&text, |caps: &Captures| caps[0].replace(" µ", " "));

    let text = BULLET_BEFORE_DELIMITER.replace_all(&text, "– ");

    let text = SPACED_SECTION_DELIMITERS.replace_all(&text, "µ");
    let text = SPACES_AROUND_SECTION_DELIMITER.replace_all(&text, "µ");
    let text = SPACES_AROUND_ENTRY_DELIMITER.replace_all(&text, "ƒ");
    let text = SECTIONS_AROUND_ENTRY_DELIMITER.replace_all(&text, "ƒ");
    let text = REPEATED_SECTION_DELIMITERS.replace_all(&text, "µ");

    let text = SLASH_BEFORE_DELIMITER.replace_all(&text, "/");

    ISOLATED_SPECIAL_LETTER.replace_all(&text, "${1}").into_owned()
}

/// Splits normalized page text into its logical entries.
pub fn split_entries(normalized: &str) -> Vec<String> {
    normalized.split(ENTRY_DELIMITER).map(str::to_string).collect()
}

/// Entry content as it is emitted: no section delimiters left.
pub fn sections_to_text(entry: &str) -> String {
    entry.replace(SECTION_DELIMITER, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runs(parts: &[&str]) -> Vec<TextRun> {
        parts.iter().map(|p| TextRun::from(*p)).collect()
    }

    fn normalize(parts: &[&str]) -> String {
        normalize_page(&runs(parts), "test", &OverrideTable::new())
    }

    #[test]
    fn test_hyphenated_word_is_joined() {
        assert_eq!(normalize(&["inter", "-", "national"]), "international");
        assert_eq!(normalize(&["Bundes-", "regierung"]), "Bundesregierung");
        assert_eq!(normalize(&["Bundes -", "regierung"]), "Bundesregierung");
    }

    #[test]
    fn test_leader_dots_become_entry_delimiters() {
        let text = normalize(&[
            "Eröffnung der Sitzung",
            " . . . . . . . .",
            " ",
            "1 A",
            "Wahl des Präsidenten",
            " . . . . .",
            " ",
            "2 B/C",
        ]);
        assert_eq!(text, "Eröffnung der Sitzungƒ1 AµWahl des Präsidentenƒ2 B/C");
        assert_eq!(split_entries(&text).len(), 3);
    }

    #[test]
    fn test_reference_without_section_letter() {
        let text = normalize(&["Anlage 3", " . . . .", " ", "3021", "Erklärung"]);
        assert_eq!(text, "Anlage 3ƒ3021µErklärung");
    }

    #[test]
    fn test_decorative_dots_are_removed() {
        let text = normalize(&["Rede von", " . . . .", "Dr. Angela Merkel"]);
        assert_eq!(text, "Rede vonµDr. Angela Merkel");
    }

    #[test]
    fn test_justified_runs_are_merged() {
        let text = normalize(&["Abgeordneter", "Beratung", " des", "Antrags", " der Fraktion"]);
        assert_eq!(text, "AbgeordneterµBeratung desµAntrags der Fraktion");

        let text = normalize(&["Einleitung", "Beschlussempfehlung ", "und ", "Bericht"]);
        assert_eq!(text, "EinleitungµBeschlussempfehlung und Bericht");
    }

    #[test]
    fn test_bullet_is_merged_with_following_text() {
        let text = normalize(&["Antrag der Fraktion", "–", " ", "Drucksache 18/77"]);
        assert_eq!(text, "Antrag der Fraktionµ– Drucksache 18/77");
    }

    #[test]
    fn test_dash_at_end_of_run_keeps_delimiter() {
        assert_eq!(normalize(&["Bundestag –", "18. Wahlperiode"]), "Bundestag –µ18. Wahlperiode");
    }

    #[test]
    fn test_slash_and_special_letter_repair() {
        assert_eq!(normalize(&["(BÜNDNIS 90/", "DIE GRÜNEN)"]), "(BÜNDNIS 90/DIE GRÜNEN)");
        assert_eq!(normalize(&["Sevim Da", "ğ", "delen"]), "Sevim Dağdelen");
    }

    #[test]
    fn test_normalizing_twice_changes_nothing() {
        let once = normalize(&[
            "Tagesordnungspunkt 1:",
            "Wahl des Bundes",
            "-",
            "kanzlers",
            " . . . . . .",
            " ",
            "3 A",
            "Sevim Da",
            "ğ",
            "delen (DIE LINKE)",
            " . . . .",
            " ",
            "4 B",
        ]);
        let twice = normalize(&[once.as_str()]);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_overrides_run_before_and_after() {
        use crate::extractors::overrides::TextOverride;

        fn drop_marker(text: &str) -> String {
            text.replace("XX", "")
        }
        let mut table = OverrideTable::new();
        table.insert("doc", TextOverride { pre: drop_marker, post: str::to_uppercase });

        let text = normalize_page(&runs(&["abXX", "-", "cd"]), "doc", &table);
        assert_eq!(text, "ABCD");
    }

    #[test]
    fn test_sections_to_text_removes_delimiters() {
        assert_eq!(sections_to_text("Rede vonµDr. Angela Merkelµ"), "Rede von Dr. Angela Merkel");
    }
}
