//! Per-file preview hints for the listing page

use crate::scanner::FileEntry;

pub const DEFAULT_ICON: &str = "📁";

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "ogg"];

/// How a file is presented next to its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    /// Inline `<img>` thumbnail
    Image,
    /// Inline `<video>` player, with the MIME type for the `<source>` tag
    Video { mime: String },
    /// Static emoji icon
    Icon(&'static str),
}

pub fn classify(file: &FileEntry) -> Preview {
    let Some(ext) = file.extension() else {
        return Preview::Icon(DEFAULT_ICON);
    };

    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return Preview::Image;
    }
    if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        // mime_guess maps .ogg to audio/ogg; the player only cares about video
        let mime = mime_guess::from_ext(&ext)
            .iter()
            .find(|m| m.type_() == mime_guess::mime::VIDEO)
            .map_or_else(|| format!("video/{ext}"), |m| m.essence_str().to_string());
        return Preview::Video { mime };
    }
    Preview::Icon(icon_for(&ext))
}

fn icon_for(ext: &str) -> &'static str {
    match ext {
        "pdf" => "📄",
        "txt" => "📝",
        "zip" | "rar" => "📦",
        "docx" => "📃",
        "xlsx" => "📊",
        "pptx" => "📽",
        "mp3" => "🎵",
        "wav" => "🎶",
        _ => DEFAULT_ICON,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preview(name: &str) -> Preview {
        classify(&FileEntry::new(name))
    }

    #[test]
    fn test_images() {
        assert_eq!(preview("photo.jpg"), Preview::Image);
        assert_eq!(preview("sub/PHOTO.JPEG"), Preview::Image);
        assert_eq!(preview("anim.gif"), Preview::Image);
        assert_eq!(preview("pic.webp"), Preview::Image);
    }

    #[test]
    fn test_videos() {
        assert_eq!(
            preview("clip.mp4"),
            Preview::Video {
                mime: "video/mp4".to_string()
            }
        );
        assert_eq!(
            preview("clip.webm"),
            Preview::Video {
                mime: "video/webm".to_string()
            }
        );
        assert!(matches!(preview("song.ogg"), Preview::Video { .. }));
    }

    #[test]
    fn test_icons() {
        assert_eq!(preview("report.pdf"), Preview::Icon("📄"));
        assert_eq!(preview("notes.txt"), Preview::Icon("📝"));
        assert_eq!(preview("bundle.rar"), Preview::Icon("📦"));
        assert_eq!(preview("sheet.XLSX"), Preview::Icon("📊"));
        assert_eq!(preview("beep.wav"), Preview::Icon("🎶"));
    }

    #[test]
    fn test_default_icon() {
        assert_eq!(preview("archive.tar"), Preview::Icon(DEFAULT_ICON));
        assert_eq!(preview("Makefile"), Preview::Icon(DEFAULT_ICON));
    }
}
