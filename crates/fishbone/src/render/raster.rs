#![forbid(unsafe_code)]

//! PNG/JPG export of the fishbone canvas through `resvg`.

use crate::render::HeadlessError;
use fishbone_core::CanvasSettings;

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error(transparent)]
    Headless(#[from] HeadlessError),
    #[error("fishbone SVG could not be re-parsed for rasterization: {0}")]
    SvgParse(String),
    #[error("cannot allocate a {width}x{height} px raster canvas")]
    PixmapAlloc { width: u32, height: u32 },
    #[error("failed to encode PNG")]
    PngEncode,
    #[error("unrecognised background color {0:?} for JPG export")]
    JpegBackground(String),
    #[error("JPG export needs an opaque background, got {0:?}")]
    JpegOpaqueBackgroundRequired(String),
    #[error("failed to encode JPG: {0}")]
    JpegEncode(String),
}

impl RasterError {
    pub fn hint(&self) -> &'static str {
        match self {
            Self::Headless(err) => err.hint(),
            Self::JpegBackground(_) | Self::JpegOpaqueBackgroundRequired(_) => {
                "Set --background (or canvas.background) to an opaque color such as white or #ffffff."
            }
            Self::SvgParse(_) => "Report this diagram; the canvas renderer produced invalid SVG.",
            _ => "Retry with a smaller --scale or a smaller canvas.",
        }
    }
}

pub type Result<T> = std::result::Result<T, RasterError>;

/// Raster export settings. `scale` multiplies the SVG pixel size (`canvas.pxPerUnit`).
#[derive(Debug, Clone)]
pub struct RasterOptions {
    pub scale: f32,
    pub background: Option<String>,
    pub jpeg_quality: u8,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            background: None,
            jpeg_quality: 90,
        }
    }
}

impl RasterOptions {
    /// Falls back to the canvas background when no explicit one was given.
    pub fn or_canvas_background(mut self, canvas: &CanvasSettings) -> Self {
        if self.background.is_none() {
            self.background = canvas.background.clone();
        }
        self
    }
}

pub fn svg_to_png(svg: &str, options: &RasterOptions) -> Result<Vec<u8>> {
    let pixmap = svg_to_pixmap(svg, options.scale, options.background.as_deref())?;
    pixmap.encode_png().map_err(|_| RasterError::PngEncode)
}

pub fn svg_to_jpeg(svg: &str, options: &RasterOptions) -> Result<Vec<u8>> {
    let bg = options.background.as_deref().unwrap_or("white");
    let Some(color) = parse_tiny_skia_color(bg) else {
        return Err(RasterError::JpegBackground(bg.to_string()));
    };
    if color.alpha() != 1.0 {
        return Err(RasterError::JpegOpaqueBackgroundRequired(bg.to_string()));
    }

    let pixmap = svg_to_pixmap(svg, options.scale, Some(bg))?;
    let (w, h) = (pixmap.width(), pixmap.height());

    // Opaque fill first, so dropping alpha loses nothing.
    let rgb: Vec<u8> = pixmap
        .data()
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();

    let mut out = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, options.jpeg_quality.clamp(1, 100))
        .encode(&rgb, w, h, image::ExtendedColorType::Rgb8)
        .map_err(|err| RasterError::JpegEncode(err.to_string()))?;
    Ok(out)
}

fn svg_to_pixmap(svg: &str, scale: f32, background: Option<&str>) -> Result<tiny_skia::Pixmap> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    opt.font_family = "Arial".to_string();

    let tree =
        usvg::Tree::from_str(svg, &opt).map_err(|err| RasterError::SvgParse(err.to_string()))?;

    let scale = if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    };
    let size = tree.size();
    let width = (size.width() * scale).ceil().max(1.0) as u32;
    let height = (size.height() * scale).ceil().max(1.0) as u32;

    let mut pixmap =
        tiny_skia::Pixmap::new(width, height).ok_or(RasterError::PixmapAlloc { width, height })?;
    if let Some(color) = background.and_then(parse_tiny_skia_color) {
        pixmap.fill(color);
    }

    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    Ok(pixmap)
}

fn parse_tiny_skia_color(text: &str) -> Option<tiny_skia::Color> {
    let s = text.trim().to_ascii_lowercase();
    match s.as_str() {
        "transparent" => return Some(tiny_skia::Color::from_rgba8(0, 0, 0, 0)),
        "white" => return Some(tiny_skia::Color::from_rgba8(255, 255, 255, 255)),
        "black" => return Some(tiny_skia::Color::from_rgba8(0, 0, 0, 255)),
        _ => {}
    }

    let hex = s.strip_prefix('#')?;
    fn hex2(b: &[u8]) -> Option<u8> {
        let hi = (*b.first()? as char).to_digit(16)? as u8;
        let lo = (*b.get(1)? as char).to_digit(16)? as u8;
        Some((hi << 4) | lo)
    }
    fn hex1(c: u8) -> Option<u8> {
        let v = (c as char).to_digit(16)? as u8;
        Some((v << 4) | v)
    }

    let bytes = hex.as_bytes();
    let (r, g, b, a) = match bytes.len() {
        3 => (hex1(bytes[0])?, hex1(bytes[1])?, hex1(bytes[2])?, 255),
        4 => (
            hex1(bytes[0])?,
            hex1(bytes[1])?,
            hex1(bytes[2])?,
            hex1(bytes[3])?,
        ),
        6 => (
            hex2(&bytes[0..2])?,
            hex2(&bytes[2..4])?,
            hex2(&bytes[4..6])?,
            255,
        ),
        8 => (
            hex2(&bytes[0..2])?,
            hex2(&bytes[2..4])?,
            hex2(&bytes[4..6])?,
            hex2(&bytes[6..8])?,
        ),
        _ => return None,
    };
    Some(tiny_skia::Color::from_rgba8(r, g, b, a))
}
