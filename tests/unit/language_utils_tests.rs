/*!
 * Tests for language code helpers
 */

use ytransub::language_utils::{
    get_language_name, is_english, language_codes_match, metadata_language_code,
    normalize_to_part2t, validate_language_tag,
};

#[test]
fn test_normalize_to_part2t_withVariousForms_shouldReturnThreeLetterCode() {
    assert_eq!(normalize_to_part2t("en").unwrap(), "eng");
    assert_eq!(normalize_to_part2t("zh-CN").unwrap(), "zho");
    assert_eq!(normalize_to_part2t("fre").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("deu").unwrap(), "deu");
    assert!(normalize_to_part2t("xx").is_err());
    assert!(normalize_to_part2t("").is_err());
}

#[test]
fn test_language_codes_match_withRegionsAndScripts_shouldIgnoreThem() {
    assert!(language_codes_match("zh-Hans", "zh-CN"));
    assert!(language_codes_match("en", "en-US"));
    assert!(language_codes_match("en-orig", "eng"));
    assert!(!language_codes_match("en", "fr"));
    assert!(!language_codes_match("bogus", "en"));
}

#[test]
fn test_is_english_withTags_shouldIgnoreRegion() {
    assert!(is_english("en"));
    assert!(is_english("eng"));
    assert!(is_english("en-GB"));
    assert!(!is_english("es"));
}

#[test]
fn test_get_language_name_withChineseVariants_shouldNameScript() {
    assert_eq!(get_language_name("zh-CN").unwrap(), "Simplified Chinese");
    assert_eq!(get_language_name("zh-Hans").unwrap(), "Simplified Chinese");
    assert_eq!(get_language_name("zh-TW").unwrap(), "Traditional Chinese");
    assert_eq!(get_language_name("zh-Hant").unwrap(), "Traditional Chinese");
    assert_eq!(get_language_name("fr").unwrap(), "French");
}

#[test]
fn test_metadata_language_code_withCommonTags_shouldReturnBibliographicCodes() {
    assert_eq!(metadata_language_code("zh-CN").unwrap(), "chi");
    assert_eq!(metadata_language_code("fr").unwrap(), "fre");
    assert_eq!(metadata_language_code("ja").unwrap(), "jpn");
}

#[test]
fn test_validate_language_tag_withUnknownTag_shouldFail() {
    assert!(validate_language_tag("ja-JP").is_ok());
    assert!(validate_language_tag("zzzz-zz").is_err());
}
