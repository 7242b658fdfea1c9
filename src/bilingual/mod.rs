/*!
 * Bilingual subtitle rendering.
 *
 * - `style`: per-layer font size, colour and margin
 * - `ass`: styled ASS document for soft embedding
 * - `burn`: filter expression for burning one or two tracks into the picture
 */

pub mod ass;
pub mod burn;
pub mod style;

pub use self::ass::{compose_document, dialogue_payload, format_ass_time, write_document};
pub use self::burn::{build_filter, escape_filter_path};
pub use self::style::{LayerStyle, StylePair};
