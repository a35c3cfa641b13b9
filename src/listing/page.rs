//! Listing page rendering

use std::fmt::{self, Write};

use super::preview::{classify, Preview};
use crate::scanner::FileEntry;

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>File Sharing</title>
  <style>
    body { font-family: Arial, sans-serif; background-color: #0a192f; color: #ffffff; margin: 0; padding: 20px; }
    .container { max-width: 800px; margin: 0 auto; }
    h1 { color: #64ffda; text-align: center; }
    .file-list { list-style: none; padding: 0; }
    .file-item { background-color: #112240; padding: 15px; border-radius: 8px; margin-bottom: 10px; display: flex; align-items: center; gap: 15px; }
    .file-item img, .file-item video { max-width: 100px; max-height: 100px; border-radius: 5px; }
    .file-icon { width: 50px; height: 50px; display: flex; align-items: center; justify-content: center; background-color: #233554; border-radius: 5px; font-size: 20px; }
    .file-name { flex-grow: 1; color: #ffffff; word-break: break-all; }
    .download-btn { background-color: #64ffda; color: #0a192f; padding: 8px 12px; border-radius: 5px; text-decoration: none; }
    .download-btn:hover { background-color: #52e3c2; }
    .empty, .uptime { text-align: center; margin-top: 20px; color: #8892b0; }
  </style>
</head>
<body>
  <div class="container">
    <h1>Shared Files</h1>
"#;

const PAGE_TAIL: &str = "  </div>\n</body>\n</html>\n";

/// Render the full listing page
pub fn render_listing(files: &[FileEntry], uptime: &str) -> Result<String, fmt::Error> {
    let mut html = String::with_capacity(PAGE_HEAD.len() + files.len() * 256);
    html.push_str(PAGE_HEAD);

    if files.is_empty() {
        writeln!(html, r#"    <p class="empty">No files shared yet.</p>"#)?;
    } else {
        writeln!(html, r#"    <ul class="file-list">"#)?;
        for file in files {
            render_item(&mut html, file)?;
        }
        writeln!(html, "    </ul>")?;
    }

    writeln!(
        html,
        r#"    <div class="uptime">Server started {} ago</div>"#,
        escape_html(uptime)
    )?;
    html.push_str(PAGE_TAIL);
    Ok(html)
}

fn render_item(out: &mut String, file: &FileEntry) -> fmt::Result {
    let href = escape_html(&file.download_href());
    let name = escape_html(file.as_str());

    writeln!(out, r#"      <li class="file-item">"#)?;
    match classify(file) {
        Preview::Image => {
            writeln!(out, r#"        <img src="{href}" alt="{name}" loading="lazy">"#)?;
        }
        Preview::Video { mime } => {
            writeln!(out, r#"        <video controls muted preload="metadata">"#)?;
            writeln!(
                out,
                r#"          <source src="{href}" type="{}">"#,
                escape_html(&mime)
            )?;
            writeln!(out, "          Your browser does not support the video tag.")?;
            writeln!(out, "        </video>")?;
        }
        Preview::Icon(icon) => {
            writeln!(out, r#"        <div class="file-icon">{icon}</div>"#)?;
        }
    }
    writeln!(out, r#"        <span class="file-name">{name}</span>"#)?;
    writeln!(
        out,
        r#"        <a href="{href}" class="download-btn" download>Download</a>"#
    )?;
    writeln!(out, "      </li>")
}

/// Escape text for use in HTML content and quoted attributes
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::preview::DEFAULT_ICON;

    fn page(names: &[&str]) -> String {
        let files: Vec<FileEntry> = names.iter().map(|n| FileEntry::new(*n)).collect();
        render_listing(&files, "1m2s").unwrap()
    }

    #[test]
    fn test_preview_hints() {
        let html = page(&["photo.jpg", "clip.mp4", "report.pdf", "archive.tar"]);
        assert!(html.contains(r#"<img src="/download/photo.jpg" alt="photo.jpg""#));
        assert!(html.contains(r#"<source src="/download/clip.mp4" type="video/mp4">"#));
        assert!(html.contains(r#"<div class="file-icon">📄</div>"#));
        assert!(html.contains(&format!(r#"<div class="file-icon">{DEFAULT_ICON}</div>"#)));
    }

    #[test]
    fn test_links_and_names() {
        let html = page(&["a.txt", "sub/b.png"]);
        assert!(html.contains(r#"<span class="file-name">a.txt</span>"#));
        assert!(html.contains(r#"<span class="file-name">sub/b.png</span>"#));
        assert!(html.contains(r#"<a href="/download/a.txt" class="download-btn" download>"#));
        assert!(html.contains(r#"<a href="/download/sub/b.png" class="download-btn" download>"#));
    }

    #[test]
    fn test_uptime_footer() {
        let html = page(&[]);
        assert!(html.contains("Server started 1m2s ago"));
        assert!(html.contains("No files shared yet."));
    }

    #[test]
    fn test_names_are_escaped() {
        let html = page(&["Tom & Jerry <1>.txt"]);
        assert!(!html.contains("Jerry <1>"));
        assert!(html.contains(r#"<span class="file-name">Tom &amp; Jerry &lt;1&gt;.txt</span>"#));
        // Link target is percent-encoded, so no markup survives there either
        assert!(html.contains(r#"href="/download/Tom%20%26%20Jerry%20%3C1%3E.txt""#));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"a&b "c" 'd'"#), "a&amp;b &quot;c&quot; &#39;d&#39;");
    }
}
