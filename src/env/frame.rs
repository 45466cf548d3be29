//! 画面帧：原始 RGB 像素（行优先，每像素 3 字节）
//!
//! 视觉模式下由预言机客户端编码为 PNG data URL 发送给模型。

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Pixel buffer has {actual} bytes, expected {expected} for {width}x{height} RGB")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// 传输时为 base64 字符串
    #[serde(with = "pixels_base64")]
    pub pixels: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }

    /// 像素缓冲区长度必须恰好为 width * height * 3
    pub fn validate(&self) -> Result<(), FrameError> {
        let expected = self.expected_len();
        if self.pixels.len() != expected {
            return Err(FrameError::SizeMismatch {
                width: self.width,
                height: self.height,
                expected,
                actual: self.pixels.len(),
            });
        }
        Ok(())
    }

    pub fn to_png(&self) -> Result<Vec<u8>, FrameError> {
        self.validate()?;
        let img = image::RgbImage::from_raw(self.width, self.height, self.pixels.clone())
            .ok_or(FrameError::SizeMismatch {
                width: self.width,
                height: self.height,
                expected: self.expected_len(),
                actual: self.pixels.len(),
            })?;
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img).write_to(&mut buf, image::ImageOutputFormat::Png)?;
        Ok(buf.into_inner())
    }

    /// `data:image/png;base64,...`，可直接作为 image_url
    pub fn to_png_data_url(&self) -> Result<String, FrameError> {
        let png = self.to_png()?;
        Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
    }
}

mod pixels_base64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(pixels: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&STANDARD.encode(pixels))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let raw = String::deserialize(d)?;
        STANDARD.decode(raw.as_bytes()).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_data_url() {
        let frame = Frame::new(2, 2, vec![255; 12]);
        let url = frame.to_png_data_url().unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
        assert!(url.len() > "data:image/png;base64,".len());
    }

    #[test]
    fn test_size_mismatch() {
        assert!(Frame::new(4, 4, vec![0; 48]).validate().is_ok());
        let frame = Frame::new(4, 4, vec![0; 10]);
        assert!(matches!(
            frame.validate(),
            Err(FrameError::SizeMismatch { expected: 48, actual: 10, .. })
        ));
        assert!(matches!(
            frame.to_png(),
            Err(FrameError::SizeMismatch { expected: 48, actual: 10, .. })
        ));
    }

    #[test]
    fn test_pixels_travel_as_base64() {
        let frame = Frame::new(1, 1, vec![1, 2, 3]);
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["pixels"], "AQID");
        let back: Frame = serde_json::from_value(json).unwrap();
        assert_eq!(back, frame);
    }
}
