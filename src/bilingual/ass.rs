use std::path::{Path, PathBuf};

use log::debug;

use crate::errors::SubtitleError;
use crate::file_utils::FileManager;
use crate::timing::AlignedCue;

use super::style::{LayerStyle, StylePair};

const STYLE_FORMAT: &str = "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding";
const EVENT_FORMAT: &str = "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

/// Format milliseconds as ASS time `H:MM:SS.cc`, rounding to centiseconds
pub fn format_ass_time(ms: u64) -> String {
    let total_cs = ms.saturating_add(5) / 10;
    let cs = total_cs % 100;
    let total_secs = total_cs / 100;
    let s = total_secs % 60;
    let total_mins = total_secs / 60;
    let m = total_mins % 60;
    let h = total_mins / 60;
    format!("{}:{:02}:{:02}.{:02}", h, m, s, cs)
}

/// Make text safe for a `Dialogue:` line
///
/// Braces would open an override block, so they become parentheses.
/// Line breaks become the ASS hard break `\N`.
pub fn escape_ass_text(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('{', "(")
        .replace('}', ")")
        .replace('\n', "\\N")
}

fn layer_segment(text: &str, style: &LayerStyle) -> String {
    let mut tags = format!("\\fs{}", style.font_size);
    if !style.is_untinted() {
        if let Some(colour) = style.inline_colour_tag() {
            tags.push_str(&colour);
        }
    }
    format!("{{{}}}{}", tags, escape_ass_text(text))
}

/// Build the text field of one dialogue event
///
/// Both layers present: `{\fs<P>}primary\N{\fs<S>\c&H..&}secondary`.
/// With one layer the payload is a single segment without `\N`.
pub fn dialogue_payload(cue: &AlignedCue, styles: &StylePair) -> String {
    let primary = cue.primary.trim();
    let secondary = cue.secondary.trim();

    match (primary.is_empty(), secondary.is_empty()) {
        (false, false) => format!(
            "{}\\N{}",
            layer_segment(primary, &styles.primary),
            layer_segment(secondary, &styles.secondary)
        ),
        (false, true) => layer_segment(primary, &styles.primary),
        (true, false) => layer_segment(secondary, &styles.secondary),
        (true, true) => String::new(),
    }
}

/// Render a complete ASS document from aligned cues
pub fn compose_document(cues: &[AlignedCue], styles: &StylePair) -> String {
    let primary = &styles.primary;
    let mut doc = format!(
        "[Script Info]\n\
         ScriptType: v4.00+\n\
         WrapStyle: 0\n\
         ScaledBorderAndShadow: yes\n\
         PlayResX: 1920\n\
         PlayResY: 1080\n\
         \n\
         [V4+ Styles]\n\
         {style_format}\n\
         Style: Default,{font},{size},{colour},&H000000FF,&H00000000,&H64000000,0,0,0,0,100,100,0,0,1,2,0,{align},10,10,{mv},1\n\
         \n\
         [Events]\n\
         {event_format}\n",
        style_format = STYLE_FORMAT,
        font = styles.font_name.replace(',', " "),
        size = primary.font_size,
        colour = primary.colour,
        align = styles.alignment,
        mv = primary.margin_v,
        event_format = EVENT_FORMAT,
    );

    for cue in cues {
        let payload = dialogue_payload(cue, styles);
        if payload.is_empty() {
            continue;
        }
        doc.push_str(&format!(
            "Dialogue: 0,{},{},Default,,0,0,0,,{}\n",
            format_ass_time(cue.start_time_ms),
            format_ass_time(cue.end_time_ms),
            payload
        ));
    }

    doc
}

/// Compose the document and write it next to the primary subtitle file
///
/// The file is `{stem}_bilingual.ass` when a secondary track was supplied,
/// otherwise `{stem}_chinese.ass`. Whether any cue actually matched does not
/// change the name.
pub fn write_document<P: AsRef<Path>>(
    primary_file: P,
    cues: &[AlignedCue],
    styles: &StylePair,
    has_secondary: bool,
) -> Result<PathBuf, SubtitleError> {
    let output_path = FileManager::bilingual_ass_path(primary_file.as_ref(), has_secondary);
    let content = compose_document(cues, styles);

    std::fs::write(&output_path, content).map_err(|source| SubtitleError::Io {
        path: output_path.clone(),
        source,
    })?;

    debug!("Wrote {} dialogue events to {}", cues.len(), output_path.display());
    Ok(output_path)
}
