use anyhow::{anyhow, Result};
use isolang::Language;

/// Language utilities for language tag handling
///
/// Caption sites label tracks with BCP-47 style tags ("en", "zh-CN",
/// "zh-Hans"), while container metadata wants ISO 639-2 codes. Everything here
/// works on the primary subtag and resolves it with isolang.

// ISO 639-2/B codes that differ from their 639-2/T counterpart
const BIBLIOGRAPHIC_CODES: &[(&str, &str)] = &[
    ("fre", "fra"),
    ("ger", "deu"),
    ("dut", "nld"),
    ("gre", "ell"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("ice", "isl"),
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("per", "fas"),
    ("geo", "kat"),
    ("may", "msa"),
    ("mac", "mkd"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// Lowercased primary subtag of a language tag ("zh-CN" gives "zh")
pub fn primary_subtag(tag: &str) -> String {
    tag.trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let primary = primary_subtag(code);

    match primary.len() {
        2 => {
            if let Some(lang) = Language::from_639_1(&primary) {
                return Ok(lang.to_639_3().to_string());
            }
        }
        3 => {
            if Language::from_639_3(&primary).is_some() {
                return Ok(primary);
            }
            if let Some((_, terminology)) = BIBLIOGRAPHIC_CODES.iter().find(|(b, _)| *b == primary) {
                return Ok((*terminology).to_string());
            }
        }
        _ => {}
    }

    Err(anyhow!("Invalid language code: {}", code))
}

/// Check that the primary subtag of a tag is a known language
pub fn validate_language_tag(tag: &str) -> Result<()> {
    normalize_to_part2t(tag).map(|_| ())
}

/// Check if two language tags name the same language, ignoring region and script
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_to_part2t(code1), normalize_to_part2t(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// True for any English tag ("en", "en-US", "eng")
pub fn is_english(tag: &str) -> bool {
    language_codes_match(tag, "en")
}

/// Human-readable language name used in translation instructions
pub fn get_language_name(tag: &str) -> Result<String> {
    let part2t = normalize_to_part2t(tag)?;

    if part2t == "zho" {
        let lower = tag.trim().to_lowercase().replace('_', "-");
        let traditional = ["zh-tw", "zh-hk", "zh-mo", "zh-hant"]
            .iter()
            .any(|variant| lower.starts_with(variant));
        return Ok(if traditional {
            "Traditional Chinese".to_string()
        } else {
            "Simplified Chinese".to_string()
        });
    }

    let lang = Language::from_639_3(&part2t)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", part2t))?;
    Ok(lang.to_name().to_string())
}

/// ISO 639-2/B code for container metadata ("zh-CN" gives "chi")
pub fn metadata_language_code(tag: &str) -> Result<String> {
    let part2t = normalize_to_part2t(tag)?;
    let code = BIBLIOGRAPHIC_CODES
        .iter()
        .find(|(_, t)| *t == part2t)
        .map(|(b, _)| (*b).to_string())
        .unwrap_or(part2t);
    Ok(code)
}
