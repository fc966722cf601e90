//! Photo Validation & Compression Service
//!
//! 업로드 파이프라인의 첫 두 단계:
//! 1. 파일 타입/크기 검증 (허용 포맷: JPEG, PNG, WebP, HEIC)
//! 2. 리사이즈 + 재인코딩으로 업로드 크기 제한
//!
//! # Design Decision
//!
//! 압축은 절대 실패하지 않음: 디코딩/인코딩이 불가능하면
//! 원본을 그대로 반환 (HEIC처럼 코덱이 없는 포맷 포함).
//! 검증 실패만 사용자에게 에러로 전달됨.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use thiserror::Error;

/// 최대 사진 크기 (10 MiB)
pub const MAX_PHOTO_SIZE_BYTES: usize = 10 * 1024 * 1024;

/// 허용 미디어 타입
pub const ALLOWED_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/webp", "image/heic"];

/// 압축 기본값: 최대 폭 800px, 품질 0.8
pub const DEFAULT_MAX_WIDTH: u32 = 800;
pub const DEFAULT_QUALITY: f32 = 0.8;

/// 사용자가 선택한 원본 사진 파일
#[derive(Debug, Clone)]
pub struct PhotoFile {
    /// 파일 바이트
    pub data: Vec<u8>,
    /// 원본 파일명
    pub file_name: String,
    /// 선언된 미디어 타입 (예: image/jpeg)
    pub content_type: String,
}

impl PhotoFile {
    pub fn new(data: Vec<u8>, file_name: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            data,
            file_name: file_name.into(),
            content_type: content_type.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// 사진 검증 실패 사유
///
/// Display 문자열이 그대로 사용자에게 노출됨
#[derive(Debug, Error, PartialEq)]
pub enum PhotoValidationError {
    #[error("File must be an image")]
    NotAnImage,

    #[error("File size must be less than 10MB")]
    TooLarge,

    #[error("Supported formats: JPEG, PNG, WebP, HEIC")]
    UnsupportedFormat,
}

/// 사진 파일 검증
///
/// 규칙 순서 (첫 실패가 우선):
/// 1. 미디어 타입이 image/ 로 시작
/// 2. 크기 10MiB 이하
/// 3. 허용 포맷 목록에 포함
pub fn validate_photo_file(file: &PhotoFile) -> Result<(), PhotoValidationError> {
    if !file.content_type.starts_with("image/") {
        return Err(PhotoValidationError::NotAnImage);
    }

    if file.size() > MAX_PHOTO_SIZE_BYTES {
        return Err(PhotoValidationError::TooLarge);
    }

    if !ALLOWED_TYPES.contains(&file.content_type.as_str()) {
        return Err(PhotoValidationError::UnsupportedFormat);
    }

    Ok(())
}

/// 기본 설정으로 사진 압축
pub fn compress_image(file: &PhotoFile) -> PhotoFile {
    compress_image_with(file, DEFAULT_MAX_WIDTH, DEFAULT_QUALITY)
}

/// 사진 압축 (리사이즈 + 재인코딩)
///
/// 스케일 비율은 min(max_width/w, max_width/h). 양 축 모두 같은
/// 상한으로 계산하므로 비정방형 소스는 한 축이 더 줄어든다.
/// 비율은 1.0으로 클램프되어 업스케일은 하지 않는다.
///
/// 디코딩/인코딩 실패 시 원본을 그대로 반환하며 에러를 내지 않음.
pub fn compress_image_with(file: &PhotoFile, max_width: u32, quality: f32) -> PhotoFile {
    let img = match image::load_from_memory(&file.data) {
        Ok(img) => img,
        Err(err) => {
            tracing::debug!("Image decode failed, keeping original: {}", err);
            return file.clone();
        }
    };

    let (width, height) = (img.width(), img.height());
    if width == 0 || height == 0 {
        return file.clone();
    }

    let ratio = f64::min(
        max_width as f64 / width as f64,
        max_width as f64 / height as f64,
    )
    .min(1.0);

    let new_width = ((width as f64 * ratio) as u32).max(1);
    let new_height = ((height as f64 * ratio) as u32).max(1);

    let resized = if (new_width, new_height) == (width, height) {
        img
    } else {
        img.resize_exact(new_width, new_height, FilterType::Lanczos3)
    };

    // 소스 미디어 타입 유지하며 재인코딩
    let mut buf = Vec::new();
    let encoded = match file.content_type.as_str() {
        "image/jpeg" => {
            let q = (quality.clamp(0.0, 1.0) * 100.0) as u8;
            resized
                .write_with_encoder(JpegEncoder::new_with_quality(&mut buf, q))
                .is_ok()
        }
        "image/png" => resized
            .write_with_encoder(PngEncoder::new(&mut buf))
            .is_ok(),
        "image/webp" => resized
            .write_with_encoder(WebPEncoder::new_lossless(&mut buf))
            .is_ok(),
        // HEIC 등: 재인코딩 코덱 없음
        _ => false,
    };

    if !encoded {
        tracing::debug!(
            "Image encode failed for {}, keeping original",
            file.content_type
        );
        return file.clone();
    }

    PhotoFile {
        data: buf,
        file_name: file.file_name.clone(),
        content_type: file.content_type.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;

    fn png_file(width: u32, height: u32) -> PhotoFile {
        let img = DynamicImage::ImageRgb8(RgbImage::new(width, height));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        PhotoFile::new(buf, "test.png", "image/png")
    }

    #[test]
    fn test_rejects_non_image() {
        let file = PhotoFile::new(vec![0u8; 100], "doc.pdf", "application/pdf");
        let err = validate_photo_file(&file).unwrap_err();
        assert_eq!(err, PhotoValidationError::NotAnImage);
        assert_eq!(err.to_string(), "File must be an image");
    }

    #[test]
    fn test_rejects_oversized_file() {
        // 10MiB + 1 byte
        let file = PhotoFile::new(
            vec![0u8; MAX_PHOTO_SIZE_BYTES + 1],
            "big.jpg",
            "image/jpeg",
        );
        let err = validate_photo_file(&file).unwrap_err();
        assert_eq!(err, PhotoValidationError::TooLarge);
        assert_eq!(err.to_string(), "File size must be less than 10MB");
    }

    #[test]
    fn test_size_checked_before_format() {
        // 크기 규칙이 포맷 규칙보다 먼저
        let file = PhotoFile::new(vec![0u8; MAX_PHOTO_SIZE_BYTES + 1], "big.gif", "image/gif");
        assert_eq!(
            validate_photo_file(&file).unwrap_err(),
            PhotoValidationError::TooLarge
        );
    }

    #[test]
    fn test_rejects_unsupported_format() {
        let file = PhotoFile::new(vec![0u8; 100], "anim.gif", "image/gif");
        let err = validate_photo_file(&file).unwrap_err();
        assert_eq!(err, PhotoValidationError::UnsupportedFormat);
        assert_eq!(err.to_string(), "Supported formats: JPEG, PNG, WebP, HEIC");
    }

    #[test]
    fn test_accepts_allowed_types_at_limit() {
        for ty in ALLOWED_TYPES {
            let file = PhotoFile::new(vec![0u8; MAX_PHOTO_SIZE_BYTES], "x", ty);
            assert!(validate_photo_file(&file).is_ok(), "{} should pass", ty);
        }
    }

    #[test]
    fn test_compress_returns_original_on_decode_failure() {
        let file = PhotoFile::new(vec![1, 2, 3, 4], "junk.jpg", "image/jpeg");
        let out = compress_image(&file);
        assert_eq!(out.data, file.data);
        assert_eq!(out.content_type, "image/jpeg");
    }

    #[test]
    fn test_compress_no_upscaling_for_small_image() {
        let file = png_file(4, 4);
        let out = compress_image(&file);
        let img = image::load_from_memory(&out.data).unwrap();
        assert_eq!((img.width(), img.height()), (4, 4));
        assert_eq!(out.content_type, "image/png");
    }

    #[test]
    fn test_compress_downscales_wide_image() {
        let file = png_file(1600, 800);
        let out = compress_image(&file);
        let img = image::load_from_memory(&out.data).unwrap();
        assert_eq!((img.width(), img.height()), (800, 400));
    }

    #[test]
    fn test_compress_double_bound_tall_image() {
        // 폭 400은 한도 안이지만 ratio = min(800/400, 800/1000) = 0.8
        // 이 적용되어 양 축이 함께 줄어든다
        let file = png_file(400, 1000);
        let out = compress_image(&file);
        let img = image::load_from_memory(&out.data).unwrap();
        assert_eq!((img.width(), img.height()), (320, 800));
    }

    #[test]
    fn test_compress_keeps_original_for_heic() {
        // HEIC은 디코딩 코덱이 없어 원본 유지
        let file = PhotoFile::new(vec![0u8; 64], "photo.heic", "image/heic");
        let out = compress_image(&file);
        assert_eq!(out.data, file.data);
    }
}
