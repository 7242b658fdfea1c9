/*!
 * End-to-end controller runs against a fake downloader and transcoder
 */

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::common;
use ytransub::app_config::{Config, EmbedType};
use ytransub::app_controller::Controller;
use ytransub::errors::MediaError;
use ytransub::media::{find_subtitle_files, Acquirer, DownloadResult, MediaInfo, Transcoder};
use ytransub::providers::mock::MockProvider;

/// Hands out a prepared download without touching the network
struct FakeAcquirer {
    result: DownloadResult,
}

#[async_trait]
impl Acquirer for FakeAcquirer {
    async fn fetch(&self, _url: &str) -> Result<DownloadResult, MediaError> {
        Ok(self.result.clone())
    }
}

/// Records what it was asked to do and writes an empty output file
#[derive(Default)]
struct RecordingTranscoder {
    burns: Mutex<Vec<(PathBuf, String, PathBuf)>>,
    embeds: Mutex<Vec<(PathBuf, PathBuf, PathBuf, String)>>,
}

#[async_trait]
impl Transcoder for RecordingTranscoder {
    async fn embed_soft(
        &self,
        video: &Path,
        subtitle: &Path,
        output: &Path,
        language_code: &str,
    ) -> Result<PathBuf, MediaError> {
        self.embeds.lock().push((
            video.to_path_buf(),
            subtitle.to_path_buf(),
            output.to_path_buf(),
            language_code.to_string(),
        ));
        std::fs::write(output, b"").map_err(|e| MediaError::Launch {
            tool: "fake".to_string(),
            message: e.to_string(),
        })?;
        Ok(output.to_path_buf())
    }

    async fn burn(&self, video: &Path, filter: &str, output: &Path) -> Result<PathBuf, MediaError> {
        self.burns
            .lock()
            .push((video.to_path_buf(), filter.to_string(), output.to_path_buf()));
        std::fs::write(output, b"").map_err(|e| MediaError::Launch {
            tool: "fake".to_string(),
            message: e.to_string(),
        })?;
        Ok(output.to_path_buf())
    }

    async fn inspect(&self, _video: &Path) -> Result<MediaInfo, MediaError> {
        Ok(MediaInfo::default())
    }
}

const OVERLAPPING_SRT: &str = "1
00:00:01,000 --> 00:00:03,000
First line

2
00:00:02,500 --> 00:00:05,000
Second line
";

struct Fixture {
    _temp_dir: tempfile::TempDir,
    dir: PathBuf,
    video: PathBuf,
    subtitles: BTreeMap<String, PathBuf>,
}

fn fixture(tracks: &[(&str, &str)]) -> Result<Fixture> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();
    let video = common::create_test_file(&dir, "Talk.mp4", "video")?;

    let mut subtitles = BTreeMap::new();
    for (language, content) in tracks {
        let path = common::create_test_file(&dir, &format!("Talk.{}.srt", language), content)?;
        subtitles.insert(language.to_string(), path);
    }

    Ok(Fixture {
        _temp_dir: temp_dir,
        dir,
        video,
        subtitles,
    })
}

fn controller_for(
    fixture: &Fixture,
    config: Config,
    provider: &MockProvider,
) -> (Controller, Arc<RecordingTranscoder>) {
    let acquirer = Arc::new(FakeAcquirer {
        result: DownloadResult {
            title: "Talk".to_string(),
            video_file: fixture.video.clone(),
            subtitles: fixture.subtitles.clone(),
        },
    });
    let transcoder = Arc::new(RecordingTranscoder::default());
    let controller = Controller::with_components(config, acquirer, transcoder.clone(), common::mock_service(provider));
    (controller, transcoder)
}

fn config_with(embed_type: EmbedType, bilingual: bool) -> Config {
    let mut config = Config::default();
    config.target_language = "zh-CN".to_string();
    config.media.embed_type = embed_type;
    config.bilingual.enabled = bilingual;
    config
}

#[tokio::test]
async fn test_run_url_withHardBilingual_shouldBurnTwoDeoverlappedStages() -> Result<()> {
    common::init_logger();
    let fixture = fixture(&[("en", OVERLAPPING_SRT)])?;
    let provider = MockProvider::echo();
    let (controller, transcoder) = controller_for(&fixture, config_with(EmbedType::Hard, true), &provider);

    let output = controller.run_url("https://www.youtube.com/watch?v=abc", None).await?;

    assert_eq!(output, fixture.dir.join("Talk_bilingual.mp4"));
    assert_eq!(provider.request_count(), 1);

    let translated = fixture.dir.join("Talk.en.zh-CN.srt");
    assert!(translated.exists());

    let burns = transcoder.burns.lock();
    assert_eq!(burns.len(), 1);
    let filter = &burns[0].1;
    assert_eq!(filter.matches("subtitles=").count(), 2);
    assert!(filter.contains("Talk.en.zh-CN.deoverlap.srt"));
    assert!(filter.contains("Talk.en.deoverlap.srt"));
    assert!(filter.find("Talk.en.zh-CN.deoverlap.srt") < filter.find("Talk.en.deoverlap.srt"));

    // 3000 overlapped the next start at 2500, so it ends 20 ms before it
    let deoverlapped = std::fs::read_to_string(fixture.dir.join("Talk.en.deoverlap.srt"))?;
    assert!(deoverlapped.contains("00:00:01,000 --> 00:00:02,480"));
    Ok(())
}

#[tokio::test]
async fn test_run_url_withSoftEmbed_shouldMuxBilingualAssDocument() -> Result<()> {
    common::init_logger();
    let fixture = fixture(&[("en", OVERLAPPING_SRT)])?;
    let provider = MockProvider::echo();
    let (controller, transcoder) = controller_for(&fixture, config_with(EmbedType::Soft, true), &provider);

    let output = controller.run_url("https://www.youtube.com/watch?v=abc", None).await?;

    assert_eq!(output, fixture.dir.join("Talk_bilingual.mp4"));
    let embeds = transcoder.embeds.lock();
    assert_eq!(embeds.len(), 1);
    let (video, document, _, language) = &embeds[0];
    assert_eq!(video, &fixture.video);
    assert_eq!(document, &fixture.dir.join("Talk.en.zh-CN_bilingual.ass"));
    assert_eq!(language, "chi");

    let ass = std::fs::read_to_string(document)?;
    assert!(ass.contains("[TRANSLATED] First line\\N"));
    assert!(ass.contains("First line"));
    assert_eq!(ass.matches("Dialogue:").count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_run_url_withExistingTargetTrack_shouldSkipTranslation() -> Result<()> {
    let fixture = fixture(&[("en", OVERLAPPING_SRT), ("zh-Hans", OVERLAPPING_SRT)])?;
    let provider = MockProvider::echo();
    let (controller, transcoder) = controller_for(&fixture, config_with(EmbedType::Hard, true), &provider);

    controller.run_url("https://www.youtube.com/watch?v=abc", None).await?;

    assert_eq!(provider.request_count(), 0);
    let burns = transcoder.burns.lock();
    assert!(burns[0].1.contains("Talk.zh-Hans.deoverlap.srt"));
    assert!(burns[0].1.contains("Talk.en.deoverlap.srt"));
    Ok(())
}

#[tokio::test]
async fn test_run_url_withEarlierTranslationOnDisk_shouldReuseItWithoutProviderCalls() -> Result<()> {
    let mut fixture = fixture(&[("en", OVERLAPPING_SRT)])?;
    common::create_test_file(&fixture.dir, "Talk.en.zh-CN.srt", OVERLAPPING_SRT)?;
    fixture.subtitles = find_subtitle_files(&fixture.dir, "Talk")?;
    let provider = MockProvider::echo();
    let (controller, transcoder) = controller_for(&fixture, config_with(EmbedType::Hard, true), &provider);

    let output = controller.run_url("https://www.youtube.com/watch?v=abc", None).await?;

    assert_eq!(output, fixture.dir.join("Talk_bilingual.mp4"));
    assert_eq!(provider.request_count(), 0);
    let burns = transcoder.burns.lock();
    assert!(burns[0].1.contains("Talk.en.zh-CN.deoverlap.srt"));
    assert!(burns[0].1.contains("Talk.en.deoverlap.srt"));
    Ok(())
}

#[tokio::test]
async fn test_run_url_withUnreachableProvider_shouldFailBeforeTranslating() -> Result<()> {
    let fixture = fixture(&[("en", OVERLAPPING_SRT)])?;
    let provider = MockProvider::failing();
    let (controller, transcoder) = controller_for(&fixture, config_with(EmbedType::Hard, true), &provider);

    let err = controller
        .run_url("https://www.youtube.com/watch?v=abc", None)
        .await
        .unwrap_err();

    assert!(format!("{:#}", err).contains("not reachable"));
    assert_eq!(provider.request_count(), 0);
    assert!(!fixture.dir.join("Talk.en.zh-CN.srt").exists());
    assert!(transcoder.burns.lock().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_run_url_withBilingualDisabled_shouldBurnSingleStage() -> Result<()> {
    let fixture = fixture(&[("en", OVERLAPPING_SRT)])?;
    let provider = MockProvider::echo();
    let (controller, transcoder) = controller_for(&fixture, config_with(EmbedType::Hard, false), &provider);

    let output = controller.run_url("https://www.youtube.com/watch?v=abc", None).await?;

    assert_eq!(output, fixture.dir.join("Talk_burned_subtitles.mp4"));
    let burns = transcoder.burns.lock();
    assert_eq!(burns[0].1.matches("subtitles=").count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_run_url_withNoCaptions_shouldFailWithoutRendering() -> Result<()> {
    let fixture = fixture(&[])?;
    let provider = MockProvider::echo();
    let (controller, transcoder) = controller_for(&fixture, config_with(EmbedType::Hard, true), &provider);

    let result = controller.run_url("https://www.youtube.com/watch?v=abc", None).await;

    assert!(result.is_err());
    assert!(transcoder.burns.lock().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_run_existing_withEnglishTarget_shouldBurnSourceTrackOnly() -> Result<()> {
    let fixture = fixture(&[("en", OVERLAPPING_SRT)])?;
    let provider = MockProvider::echo();
    let mut config = config_with(EmbedType::Hard, true);
    config.target_language = "en".to_string();
    let (controller, transcoder) = controller_for(&fixture, config, &provider);

    let output = controller
        .run_existing(&fixture.video, &fixture.subtitles["en"], None)
        .await?;

    assert_eq!(output, fixture.dir.join("Talk_english.mp4"));
    assert_eq!(provider.request_count(), 0);
    assert_eq!(transcoder.burns.lock()[0].1.matches("subtitles=").count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_run_existing_withBilingualChineseTarget_shouldBurnTranslationOverSource() -> Result<()> {
    let fixture = fixture(&[("en", OVERLAPPING_SRT)])?;
    let provider = MockProvider::echo();
    let (controller, transcoder) = controller_for(&fixture, config_with(EmbedType::Hard, true), &provider);

    let output = controller
        .run_existing(&fixture.video, &fixture.subtitles["en"], None)
        .await?;

    assert_eq!(output, fixture.dir.join("Talk_bilingual.mp4"));
    assert_eq!(provider.request_count(), 1);
    let burns = transcoder.burns.lock();
    let filter = &burns[0].1;
    assert_eq!(filter.matches("subtitles=").count(), 2);
    assert!(filter.find("Talk.en.zh-CN.deoverlap.srt") < filter.find("Talk.en.deoverlap.srt"));
    Ok(())
}

#[tokio::test]
async fn test_run_existing_withExplicitOutput_shouldUseIt() -> Result<()> {
    let fixture = fixture(&[("en", OVERLAPPING_SRT)])?;
    let provider = MockProvider::echo();
    let (controller, _) = controller_for(&fixture, config_with(EmbedType::Soft, false), &provider);
    let wanted = fixture.dir.join("final.mkv");

    let output = controller
        .run_existing(&fixture.video, &fixture.subtitles["en"], Some(wanted.clone()))
        .await?;

    assert_eq!(output, wanted);
    assert!(fixture.dir.join("Talk.en.zh-CN_chinese.ass").exists());
    Ok(())
}

#[tokio::test]
async fn test_run_existing_withMissingVideo_shouldFail() -> Result<()> {
    let fixture = fixture(&[("en", OVERLAPPING_SRT)])?;
    let provider = MockProvider::echo();
    let (controller, _) = controller_for(&fixture, config_with(EmbedType::Hard, true), &provider);

    let result = controller
        .run_existing(&fixture.dir.join("nope.mp4"), &fixture.subtitles["en"], None)
        .await;

    assert!(result.unwrap_err().to_string().contains("nope.mp4"));
    assert_eq!(provider.request_count(), 0);
    Ok(())
}
