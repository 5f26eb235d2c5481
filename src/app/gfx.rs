// src/app/gfx.rs
use std::path::Path;

use eframe::egui::{self as eg, ColorImage, TextureHandle};

/// Upload an RGBA image to a GPU texture. (UI thread only)
pub fn upload_rgba(
    ctx: &eg::Context,
    w: u32,
    h: u32,
    bytes: &[u8],
    name: &str,
) -> TextureHandle {
    let img = ColorImage::from_rgba_unmultiplied([w as usize, h as usize], bytes);
    ctx.load_texture(name.to_string(), img, eg::TextureOptions::LINEAR)
}

/// Load a texture from a cached file; rejects art that isn't roughly 2:3.
/// (UI thread only)
pub fn load_texture_from_path(
    ctx: &eg::Context,
    path: &Path,
    cache_name: &str,
) -> Result<TextureHandle, String> {
    let (w, h, bytes) = crate::app::cache::load_rgba(path)?;
    if !is_portrait(w, h) {
        return Err(format!("non-poster aspect {w}x{h}"));
    }
    Ok(upload_rgba(ctx, w, h, &bytes, cache_name))
}

pub(crate) fn is_portrait(w: u32, h: u32) -> bool {
    if h == 0 {
        return false;
    }
    let ar = (w as f32) / (h as f32);
    (0.55..=0.80).contains(&ar)
}

#[cfg(test)]
mod tests {
    use super::is_portrait;

    #[test]
    fn portrait_check() {
        assert!(is_portrait(500, 750));
        assert!(is_portrait(185, 278));
        assert!(!is_portrait(1280, 720));
        assert!(!is_portrait(10, 0));
    }
}
