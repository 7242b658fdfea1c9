/*!
 * Tests for file helpers and output naming
 */

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::common;
use ytransub::file_utils::{sanitize_file_name, FileManager, VideoOutputKind};

#[test]
fn test_translated_subtitle_path_withSrt_shouldInsertLanguage() {
    let path = FileManager::translated_subtitle_path("/dl/My Video.en.srt", "zh-CN");
    assert_eq!(path, PathBuf::from("/dl/My Video.en.zh-CN.srt"));
}

#[test]
fn test_translated_subtitle_path_withVtt_shouldWriteSrt() {
    let path = FileManager::translated_subtitle_path("clip.vtt", "ja");
    assert_eq!(path, PathBuf::from("clip.ja.srt"));
}

#[test]
fn test_bilingual_ass_path_withAndWithoutSecondary_shouldPickSuffix() {
    assert_eq!(
        FileManager::bilingual_ass_path("/dl/clip.zh-CN.srt", true),
        PathBuf::from("/dl/clip.zh-CN_bilingual.ass")
    );
    assert_eq!(
        FileManager::bilingual_ass_path("/dl/clip.zh-CN.srt", false),
        PathBuf::from("/dl/clip.zh-CN_chinese.ass")
    );
}

#[test]
fn test_deoverlapped_path_shouldAddMarker() {
    assert_eq!(
        FileManager::deoverlapped_path("/dl/clip.en.vtt"),
        PathBuf::from("/dl/clip.en.deoverlap.srt")
    );
}

#[test]
fn test_video_output_path_withEachKind_shouldKeepExtension() {
    let video = Path::new("/dl/clip.mp4");
    let cases = [
        (VideoOutputKind::Bilingual, "/dl/clip_bilingual.mp4"),
        (VideoOutputKind::English, "/dl/clip_english.mp4"),
        (VideoOutputKind::Burned, "/dl/clip_burned_subtitles.mp4"),
        (VideoOutputKind::SoftSubtitles, "/dl/clip_with_subtitles.mp4"),
    ];

    for (kind, expected) in cases {
        assert_eq!(FileManager::video_output_path(video, kind), PathBuf::from(expected));
    }
}

#[test]
fn test_sanitize_file_name_withReservedCharacters_shouldReplaceThem() {
    assert_eq!(sanitize_file_name("a<b>c:d\"e/f\\g|h?i*j"), "a_b_c_d_e_f_g_h_i_j");
    assert_eq!(sanitize_file_name("Plain title"), "Plain title");
}

#[test]
fn test_find_files_withMixedFiles_shouldReturnSortedMatchesOnly() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "b.srt", "")?;
    common::create_test_file(temp_dir.path(), "a.SRT", "")?;
    common::create_test_file(temp_dir.path(), "c.vtt", "")?;
    std::fs::create_dir(temp_dir.path().join("nested"))?;
    common::create_test_file(&temp_dir.path().join("nested"), "d.srt", "")?;

    let found = FileManager::find_files(temp_dir.path(), "srt")?;
    let names: Vec<String> = found
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();

    assert_eq!(names, vec!["a.SRT", "b.srt"]);
    Ok(())
}

#[test]
fn test_is_video_file_withExtensions_shouldRecognizeContainers() {
    assert!(FileManager::is_video_file("a.mp4"));
    assert!(FileManager::is_video_file("a.MKV"));
    assert!(!FileManager::is_video_file("a.srt"));
    assert!(!FileManager::is_video_file("noext"));
}
