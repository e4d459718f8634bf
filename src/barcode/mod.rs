/// Barcode generation
///
/// Turns an identifier string into a Code128 PNG with the payload printed
/// underneath, centered.
pub mod font;

use crate::error::{AeliaError, AeliaResult};
use barcoders::generators::image::{Color, Image, Rotation};
use barcoders::sym::code128::Code128;
use image::{imageops, DynamicImage, GrayImage, ImageFormat, Luma};

/// Width of one barcode module in pixels
pub const SCALE: u32 = 3;
/// Height of the bars in pixels
pub const BAR_HEIGHT: u32 = 102;
/// Blank modules on either side of the symbol
pub const QUIET_ZONE: u32 = 10;
/// Longest payload accepted for encoding
pub const MAX_PAYLOAD_LEN: usize = 80;
/// Pixels per font pixel for the text line
const TEXT_SCALE: u32 = 2;
const TEXT_GAP: u32 = 6;
const MARGIN: u32 = 6;

// Selects Code128 character set B in barcoders
const CHARSET_B: char = '\u{0181}';

const BLACK: Luma<u8> = Luma([0]);
const WHITE: Luma<u8> = Luma([255]);

/// Renders a barcode payload to an image buffer
pub trait BarcodeRenderer: Send + Sync {
    /// Produce a PNG for `payload`
    fn render(&self, payload: &str) -> AeliaResult<Vec<u8>>;
}

/// Code128 renderer with a human-readable text line
#[derive(Debug, Clone, Default)]
pub struct Code128Renderer;

impl Code128Renderer {
    pub fn new() -> Self {
        Self
    }

    /// Module pattern (1 = bar) for `payload`
    pub fn encode(&self, payload: &str) -> AeliaResult<Vec<u8>> {
        if payload.is_empty() {
            return Err(AeliaError::Generation("empty barcode payload".to_string()));
        }

        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(AeliaError::Generation(format!(
                "payload of {} characters exceeds the {} character limit",
                payload.len(),
                MAX_PAYLOAD_LEN
            )));
        }

        if let Some(bad) = payload.chars().find(|c| !(' '..='~').contains(c)) {
            return Err(AeliaError::Generation(format!(
                "character {:?} is not encodable in Code128 set B",
                bad
            )));
        }

        let symbol = Code128::new(format!("{}{}", CHARSET_B, payload)).map_err(|e| {
            AeliaError::Generation(format!("cannot encode {:?} as Code128: {:?}", payload, e))
        })?;

        Ok(symbol.encode())
    }

    /// Bars only, as drawn by the barcoders image generator
    fn render_bars(&self, modules: &[u8]) -> AeliaResult<GrayImage> {
        let generator = Image::ImageBuffer {
            height: BAR_HEIGHT,
            xdim: SCALE,
            rotation: Rotation::Zero,
            foreground: Color::black(),
            background: Color::white(),
        };

        let bars = generator
            .generate_buffer(modules)
            .map_err(|e| AeliaError::Generation(format!("failed to draw bars: {:?}", e)))?;

        Ok(DynamicImage::ImageRgba8(bars).to_luma8())
    }

    fn rasterize(&self, modules: &[u8], text: &str) -> AeliaResult<GrayImage> {
        let bars = self.render_bars(modules)?;

        let bars_width = bars.width() + 2 * QUIET_ZONE * SCALE;
        let char_advance = (font::GLYPH_WIDTH + 1) * TEXT_SCALE;
        let text_width = (text.chars().count() as u32 * char_advance).saturating_sub(TEXT_SCALE);
        let text_height = font::GLYPH_HEIGHT * TEXT_SCALE;

        let width = bars_width.max(text_width + 2 * MARGIN);
        let height = MARGIN + BAR_HEIGHT + TEXT_GAP + text_height + MARGIN;
        let mut img = GrayImage::from_pixel(width, height, WHITE);

        let bars_left = (width - bars_width) / 2 + QUIET_ZONE * SCALE;
        imageops::replace(&mut img, &bars, bars_left as i64, MARGIN as i64);

        let text_left = (width - text_width) / 2;
        let text_top = MARGIN + BAR_HEIGHT + TEXT_GAP;
        for (n, c) in text.chars().enumerate() {
            let origin = text_left + n as u32 * char_advance;
            for (row, bits) in font::glyph(c).iter().enumerate() {
                for col in 0..font::GLYPH_WIDTH {
                    if bits & (1 << (font::GLYPH_WIDTH - 1 - col)) == 0 {
                        continue;
                    }
                    let x = origin + col * TEXT_SCALE;
                    let y = text_top + row as u32 * TEXT_SCALE;
                    for dx in 0..TEXT_SCALE {
                        for dy in 0..TEXT_SCALE {
                            img.put_pixel(x + dx, y + dy, BLACK);
                        }
                    }
                }
            }
        }

        Ok(img)
    }
}

impl BarcodeRenderer for Code128Renderer {
    fn render(&self, payload: &str) -> AeliaResult<Vec<u8>> {
        let modules = self.encode(payload)?;
        let img = self.rasterize(&modules, payload)?;

        let mut buf = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buf);
        DynamicImage::ImageLuma8(img)
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|e| AeliaError::Generation(format!("failed to encode PNG: {}", e)))?;

        Ok(buf)
    }
}
