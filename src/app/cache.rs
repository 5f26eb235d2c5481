use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Once, OnceLock};
use std::time::{Duration, SystemTime};

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use reqwest::blocking::Client;
use tracing::{debug, warn};

use crate::config::{config, resolve_relative_path};

// Chosen once on first call
static CACHE_DIR_ONCE: OnceLock<PathBuf> = OnceLock::new();
static POSTER_DIR_ONCE: OnceLock<PathBuf> = OnceLock::new();
static POSTER_SWEEP_ONCE: Once = Once::new();

const DEFAULT_CACHE_DIR: &str = ".cinedex_cache";
const POSTER_RETENTION_DAYS: u64 = 14;
const POSTER_RETENTION_SECS: u64 = POSTER_RETENTION_DAYS * 24 * 60 * 60;

pub fn cache_dir() -> PathBuf {
    CACHE_DIR_ONCE
        .get_or_init(|| {
            let mut path = config()
                .cache_dir
                .as_deref()
                .map(PathBuf::from)
                .unwrap_or_else(|| resolve_relative_path(DEFAULT_CACHE_DIR));

            if let Err(e) = fs::create_dir_all(&path) {
                warn!("failed to create cache dir {}: {e}", path.display());
                // Fall back to local folder if creation failed
                path = PathBuf::from(DEFAULT_CACHE_DIR);
                let _ = fs::create_dir_all(&path);
            }
            path
        })
        .clone()
}

pub fn poster_cache_dir() -> PathBuf {
    let dir = POSTER_DIR_ONCE.get_or_init(|| {
        let mut path = cache_dir().join("posters");
        if let Err(e) = fs::create_dir_all(&path) {
            warn!("failed to create poster cache dir {}: {e}", path.display());
            path = cache_dir();
        }
        path
    });

    POSTER_SWEEP_ONCE.call_once({
        let path = dir.clone();
        move || match sweep_poster_cache(&path, SystemTime::now()) {
            Ok(n) if n > 0 => debug!("poster cache sweep removed {n} files"),
            Ok(_) => {}
            Err(err) => warn!("poster cache sweep failed: {err}"),
        }
    });

    dir.clone()
}

/// Drop leftover `.part` files, empty images and anything older than the
/// retention window.
pub(crate) fn sweep_poster_cache(dir: &Path, now: SystemTime) -> std::io::Result<usize> {
    let cutoff = now
        .checked_sub(Duration::from_secs(POSTER_RETENTION_SECS))
        .unwrap_or(SystemTime::UNIX_EPOCH);
    let mut removed = 0usize;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase());
        let metadata = entry.metadata()?;
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);

        let should_remove = match ext.as_deref() {
            Some("part") => true,
            Some("png" | "jpg" | "jpeg" | "webp") => metadata.len() == 0 || modified < cutoff,
            _ => false,
        };
        if should_remove {
            fs::remove_file(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}

pub fn url_to_cache_key(url: &str) -> String {
    format!("{:x}", md5::compute(url.as_bytes()))
}

pub fn cached_path_for_key(key: &str) -> PathBuf {
    poster_cache_dir().join(format!("{key}.jpg"))
}

pub fn find_cached(key: &str) -> Option<PathBuf> {
    let p = cached_path_for_key(key);
    p.exists().then_some(p)
}

/// Return (width, height, RGBA8 bytes) for a cached image file.
pub fn load_rgba(path: &Path) -> Result<(u32, u32, Vec<u8>), String> {
    let img = image::ImageReader::open(path)
        .map_err(|e| format!("open image {}: {e}", path.display()))?
        .with_guessed_format()
        .map_err(|e| format!("guess format {}: {e}", path.display()))?
        .decode()
        .map_err(|e| format!("decode {}: {e}", path.display()))?;
    let (w, h) = img.dimensions();
    Ok((w, h, img.to_rgba8().into_raw()))
}

/// Scale down to `max_width` (keeping aspect) and encode as JPEG.
pub(crate) fn encode_resized_jpeg(
    img: DynamicImage,
    max_width: u32,
    quality: u8,
) -> Result<Vec<u8>, String> {
    let (w, h) = img.dimensions();
    let out: DynamicImage = if w > max_width {
        let new_h = ((h as f32) * (max_width as f32 / w as f32))
            .round()
            .max(1.0) as u32;
        img.resize_exact(max_width, new_h, FilterType::CatmullRom)
    } else {
        img
    };

    // JPEG has no alpha channel
    let rgb = out.to_rgb8();
    let mut jpeg_bytes: Vec<u8> = Vec::new();
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg_bytes, quality);
    encoder
        .encode_image(&rgb)
        .map_err(|e| format!("jpeg encode: {e}"))?;
    Ok(jpeg_bytes)
}

/// Write via `<dest>.part` then rename so readers never see half a file.
pub(crate) fn write_atomic(dest: &Path, bytes: &[u8]) -> Result<(), String> {
    if let Some(parent) = dest.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let tmp = dest.with_extension("jpg.part");
    {
        let mut f = fs::File::create(&tmp).map_err(|e| format!("create tmp: {e}"))?;
        f.write_all(bytes).map_err(|e| format!("write: {e}"))?;
    }
    fs::rename(&tmp, dest).map_err(|e| format!("rename: {e}"))
}

/// Download an image with a shared client, resize, and store as
/// `<poster_cache_dir>/<key>.jpg`. Returns the on-disk path.
pub fn download_and_store_resized_with_client(
    client: &Client,
    url: &str,
    key: &str,
    max_width: u32,
    quality: u8,
) -> Result<PathBuf, String> {
    let dest = cached_path_for_key(key);

    // If already present, return immediately.
    if dest.exists() {
        return Ok(dest);
    }

    let bytes = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.bytes())
        .map_err(|e| format!("download bytes: {e}"))?;

    let img = image::load_from_memory(&bytes).map_err(|e| format!("decode {url}: {e}"))?;
    let jpeg = encode_resized_jpeg(img, max_width, quality)?;
    write_atomic(&dest, &jpeg)?;
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn cache_key_is_stable_md5_hex() {
        let k = url_to_cache_key("https://image.tmdb.org/t/p/w500/abc.jpg");
        assert_eq!(k.len(), 32);
        assert_eq!(k, url_to_cache_key("https://image.tmdb.org/t/p/w500/abc.jpg"));
        assert_ne!(k, url_to_cache_key("https://image.tmdb.org/t/p/w185/abc.jpg"));
    }

    #[test]
    fn resize_keeps_aspect_and_roundtrips_through_disk() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(500, 750, Rgba([200, 40, 40, 255])));
        let jpeg = encode_resized_jpeg(img, 320, 75).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("poster.jpg");
        write_atomic(&dest, &jpeg).unwrap();
        assert!(!dest.with_extension("jpg.part").exists());

        let (w, h, rgba) = load_rgba(&dest).unwrap();
        assert_eq!((w, h), (320, 480));
        assert_eq!(rgba.len(), (320 * 480 * 4) as usize);
    }

    #[test]
    fn small_images_are_not_upscaled() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(100, 150));
        let jpeg = encode_resized_jpeg(img, 320, 75).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!(decoded.dimensions(), (100, 150));
    }

    #[test]
    fn sweep_removes_partials_empties_and_stale_files() {
        let dir = tempfile::tempdir().unwrap();
        let write = |name: &str, body: &[u8]| {
            let p = dir.path().join(name);
            fs::write(&p, body).unwrap();
            p
        };
        write("fresh.jpg", b"data");
        write("half.jpg.part", b"da");
        write("empty.jpg", b"");
        write("notes.txt", b"");
        let stale = write("stale.jpg", b"data");
        let old = SystemTime::now() - Duration::from_secs(POSTER_RETENTION_SECS + 60);
        fs::File::options()
            .write(true)
            .open(&stale)
            .unwrap()
            .set_modified(old)
            .unwrap();

        let removed = sweep_poster_cache(dir.path(), SystemTime::now()).unwrap();
        assert_eq!(removed, 3);
        assert!(dir.path().join("fresh.jpg").exists());
        assert!(dir.path().join("notes.txt").exists());
        assert!(!stale.exists());
    }
}
