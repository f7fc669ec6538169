use std::path::Path;

use axum::body::Bytes;
use chrono::Utc;
use image::{imageops::FilterType, DynamicImage, GenericImageView};
use rand::{distributions::Alphanumeric, Rng};
use webp::Encoder;

pub const MAX_WIDTH: u32 = 1920;
pub const MAX_HEIGHT: u32 = 1920;
pub const WEBP_QUALITY: f32 = 80.0;

const WEBP_CONTENT_TYPE: &str = "image/webp";
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

// GIF and SVG are stored as uploaded
const RECODABLE_TYPES: [&str; 6] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "image/bmp",
    "image/tiff",
];

/// Bytes ready for the object store.
#[derive(Debug)]
pub struct PreparedUpload {
    pub data: Bytes,
    pub content_type: String,
    pub extension: String,
    pub compressed: bool,
}

pub fn is_recodable(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    RECODABLE_TYPES.contains(&essence.as_str())
}

/// Scales down to fit the bounds, keeping aspect ratio. Smaller images are returned untouched.
pub fn fit_within(img: DynamicImage, max_w: u32, max_h: u32) -> DynamicImage {
    let (width, height) = img.dimensions();

    if width <= max_w && height <= max_h {
        return img;
    }

    let ratio = (max_w as f64 / width as f64).min(max_h as f64 / height as f64);
    let new_width = ((width as f64 * ratio).round() as u32).clamp(1, max_w);
    let new_height = ((height as f64 * ratio).round() as u32).clamp(1, max_h);

    img.resize_exact(new_width, new_height, FilterType::Triangle)
}

pub fn compress_to_webp(data: &[u8]) -> anyhow::Result<Vec<u8>> {
    let img = image::load_from_memory(data)?;
    let img = fit_within(img, MAX_WIDTH, MAX_HEIGHT);
    let rgba = img.to_rgba8();
    let encoder = Encoder::from_rgba(&rgba, rgba.width(), rgba.height());
    let encoded = encoder.encode(WEBP_QUALITY);
    Ok(encoded.to_vec())
}

fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "bin".to_string())
}

/// Re-encodes raster images on the blocking pool. Failures keep the original bytes.
pub async fn prepare(data: Bytes, content_type: Option<&str>, file_name: &str) -> PreparedUpload {
    let content_type = content_type
        .filter(|ct| !ct.is_empty())
        .unwrap_or(FALLBACK_CONTENT_TYPE)
        .to_string();

    if is_recodable(&content_type) {
        let input = data.clone();
        match tokio::task::spawn_blocking(move || compress_to_webp(&input)).await {
            Ok(Ok(webp)) => {
                tracing::debug!(
                    original = data.len(),
                    compressed = webp.len(),
                    "re-encoded upload as webp"
                );
                return PreparedUpload {
                    data: Bytes::from(webp),
                    content_type: WEBP_CONTENT_TYPE.to_string(),
                    extension: "webp".to_string(),
                    compressed: true,
                };
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, file_name, "image compression failed, storing original");
            }
            Err(e) => {
                tracing::warn!(error = %e, file_name, "image compression task failed, storing original");
            }
        }
    }

    PreparedUpload {
        data,
        content_type,
        extension: extension_of(file_name),
        compressed: false,
    }
}

/// `{unix_millis}_{7 lowercase alphanumerics}.{ext}`
pub fn object_name(extension: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(7)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("{}_{suffix}.{extension}", Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{ImageBuffer, ImageFormat, Rgb};

    use super::*;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = ImageBuffer::from_pixel(width, height, Rgb([200u8, 40, 40]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn recodable_types() {
        assert!(is_recodable("image/jpeg"));
        assert!(is_recodable("image/PNG; charset=binary"));
        assert!(!is_recodable("image/gif"));
        assert!(!is_recodable("image/svg+xml"));
        assert!(!is_recodable("application/pdf"));
    }

    #[test]
    fn fit_within_keeps_aspect_ratio() {
        let img = DynamicImage::new_rgb8(4000, 3000);
        let fitted = fit_within(img, MAX_WIDTH, MAX_HEIGHT);
        assert_eq!(fitted.dimensions(), (1920, 1440));

        let tall = DynamicImage::new_rgb8(1000, 4000);
        assert_eq!(fit_within(tall, MAX_WIDTH, MAX_HEIGHT).dimensions(), (480, 1920));
    }

    #[test]
    fn fit_within_never_upscales() {
        let img = DynamicImage::new_rgb8(300, 200);
        assert_eq!(fit_within(img, MAX_WIDTH, MAX_HEIGHT).dimensions(), (300, 200));
    }

    #[test]
    fn compresses_png_to_webp() {
        let webp = compress_to_webp(&png(64, 32)).unwrap();
        let decoded = image::load_from_memory_with_format(&webp, ImageFormat::WebP).unwrap();
        assert_eq!(decoded.dimensions(), (64, 32));
    }

    #[tokio::test]
    async fn corrupt_image_falls_back_to_original() {
        let data = Bytes::from_static(b"definitely not a jpeg");
        let prepared = prepare(data.clone(), Some("image/jpeg"), "photo.JPG").await;
        assert!(!prepared.compressed);
        assert_eq!(prepared.data, data);
        assert_eq!(prepared.content_type, "image/jpeg");
        assert_eq!(prepared.extension, "jpg");
    }

    #[tokio::test]
    async fn non_images_pass_through() {
        let data = Bytes::from_static(b"%PDF-1.4");
        let prepared = prepare(data.clone(), Some("application/pdf"), "brief.pdf").await;
        assert!(!prepared.compressed);
        assert_eq!(prepared.data, data);
        assert_eq!(prepared.extension, "pdf");
    }

    #[test]
    fn object_names_are_distinct() {
        let a = object_name("webp");
        let b = object_name("webp");
        assert_ne!(a, b);
        assert!(a.ends_with(".webp"));
        let (millis, rest) = a.split_once('_').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(rest.len(), "abcdefg.webp".len());
    }

    #[test]
    fn missing_extension_defaults_to_bin() {
        assert_eq!(extension_of("README"), "bin");
        assert_eq!(extension_of("logo.SVG"), "svg");
    }
}
