//! Utility functions

use crate::constants::APP_NAME;
use std::path::PathBuf;

// Folded sheet with a grid, for the sidebar logo
pub const LOGO_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 120 96"><path d="M4 12 40 4l40 8 36-8v80l-36 8-40-8-36 8z" fill="#e70013" stroke="#7f1d1d" stroke-width="2" stroke-linejoin="round"/><path d="M40 4v80M80 12v80M4 40l36-8 40 8 36-8M4 64l36-8 40 8 36-8" fill="none" stroke="#fff" stroke-width="3" stroke-linecap="round"/><circle cx="60" cy="50" r="9" fill="#fff"/><circle cx="60" cy="50" r="4" fill="#e70013"/></svg>"##;

// Square viewBox, no outline, for window/taskbar icons
pub const ICON_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 120 120"><g transform="translate(0,12)"><path d="M4 12 40 4l40 8 36-8v80l-36 8-40-8-36 8z" fill="#e70013"/><path d="M40 4v80M80 12v80M4 40l36-8 40 8 36-8M4 64l36-8 40 8 36-8" fill="none" stroke="#fff" stroke-width="3" stroke-linecap="round"/><circle cx="60" cy="50" r="9" fill="#fff"/><circle cx="60" cy="50" r="4" fill="#e70013"/></g></svg>"##;

/// Rasterize the logo SVG at the given width, preserving aspect ratio.
pub fn rasterize_logo(width: u32) -> Option<(Vec<u8>, u32, u32)> {
    let tree = resvg::usvg::Tree::from_str(LOGO_SVG, &resvg::usvg::Options::default()).ok()?;
    let svg_size = tree.size();
    let scale = width as f32 / svg_size.width();
    let height = (svg_size.height() * scale).ceil() as u32;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)?;
    resvg::render(
        &tree,
        resvg::usvg::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    Some((premul_to_straight(&pixmap), width, height))
}

/// Rasterize the icon SVG to a square image (for window/taskbar icons).
pub fn rasterize_logo_square(size: u32) -> Option<(Vec<u8>, u32, u32)> {
    let tree = resvg::usvg::Tree::from_str(ICON_SVG, &resvg::usvg::Options::default()).ok()?;
    let scale = size as f32 / tree.size().width();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size, size)?;
    resvg::render(
        &tree,
        resvg::usvg::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    Some((premul_to_straight(&pixmap), size, size))
}

fn premul_to_straight(pixmap: &resvg::tiny_skia::Pixmap) -> Vec<u8> {
    pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let a = p.alpha();
            if a == 0 {
                [0, 0, 0, 0]
            } else {
                let r = (p.red() as u16 * 255 / a as u16) as u8;
                let g = (p.green() as u16 * 255 / a as u16) as u8;
                let b = (p.blue() as u16 * 255 / a as u16) as u8;
                [r, g, b, a]
            }
        })
        .collect()
}

/// Per-user directory holding settings.json, index.db and logs/
pub fn get_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// True for locators fetched over the network rather than read from disk
pub fn is_remote(locator: &str) -> bool {
    let lower = locator.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Zoom factor as a whole percentage, e.g. 1.5 -> "150%"
pub fn format_percent(scale: f32) -> String {
    format!("{:.0}%", scale * 100.0)
}

/// Format bytes into human-readable string (B, KB, MB)
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_locators() {
        assert!(is_remote("https://maps.example.org/index.jpg"));
        assert!(is_remote("HTTP://host/x.png"));
        assert!(!is_remote("/home/me/index.png"));
        assert!(!is_remote("C:\\maps\\index.png"));
        assert!(!is_remote("httpfoo.png"));
    }

    #[test]
    fn percent_and_bytes() {
        assert_eq!(format_percent(1.5), "150%");
        assert_eq!(format_percent(0.475), "48%");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn logos_rasterize() {
        let (pixels, w, h) = rasterize_logo(120).unwrap();
        assert_eq!(w, 120);
        assert_eq!(h, 96);
        assert_eq!(pixels.len(), (w * h * 4) as usize);
        let (pixels, w, h) = rasterize_logo_square(64).unwrap();
        assert_eq!((w, h), (64, 64));
        assert_eq!(pixels.len(), 64 * 64 * 4);
    }
}
