use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthChar;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_size: f64,
    pub font_weight: Option<String>,
}

impl TextStyle {
    pub fn sized(font_size: f64) -> Self {
        Self {
            font_size,
            font_weight: None,
        }
    }

    pub fn bold(font_size: f64) -> Self {
        Self {
            font_size,
            font_weight: Some("bold".to_string()),
        }
    }

    pub fn is_bold(&self) -> bool {
        matches!(self.font_weight.as_deref(), Some("bold" | "600" | "700" | "800" | "900"))
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::sized(0.16)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub line_count: usize,
}

pub trait TextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics;
}

/// Font-independent measurer: each character advances by its terminal display width (1 for
/// Latin, 2 for CJK and other wide glyphs) times `char_width_factor` em.
#[derive(Debug, Clone, Default)]
pub struct DeterministicTextMeasurer {
    pub char_width_factor: f64,
    pub line_height_factor: f64,
}

impl DeterministicTextMeasurer {
    fn char_width_factor(&self) -> f64 {
        if self.char_width_factor == 0.0 {
            0.55
        } else {
            self.char_width_factor
        }
    }

    fn line_height_factor(&self) -> f64 {
        if self.line_height_factor == 0.0 {
            1.25
        } else {
            self.line_height_factor
        }
    }

    pub fn line_height(&self, style: &TextStyle) -> f64 {
        style.font_size * self.line_height_factor()
    }

    fn line_width(&self, line: &str, style: &TextStyle) -> f64 {
        let columns: usize = line.chars().map(|ch| ch.width().unwrap_or(0)).sum();
        let bold = if style.is_bold() { 1.05 } else { 1.0 };
        columns as f64 * style.font_size * self.char_width_factor() * bold
    }
}

impl TextMeasurer for DeterministicTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let lines: Vec<&str> = text.split('\n').collect();
        let width = lines
            .iter()
            .map(|line| self.line_width(line, style))
            .fold(0.0, f64::max);
        TextMetrics {
            width,
            height: lines.len() as f64 * self.line_height(style),
            line_count: lines.len(),
        }
    }
}

/// Greedy word wrap to `max_width`.
///
/// Words wider than the limit (and scripts written without spaces) are broken between
/// characters. Always returns at least one line.
pub fn wrap_text_lines(
    text: &str,
    style: &TextStyle,
    max_width: f64,
    measurer: &dyn TextMeasurer,
) -> Vec<String> {
    let fits = |s: &str| measurer.measure(s, style).width <= max_width;
    let mut out: Vec<String> = Vec::new();
    let mut cur = String::new();

    for word in text.split_whitespace() {
        let candidate = if cur.is_empty() {
            word.to_string()
        } else {
            format!("{cur} {word}")
        };
        if fits(&candidate) {
            cur = candidate;
            continue;
        }
        if !cur.is_empty() {
            out.push(std::mem::take(&mut cur));
        }
        if fits(word) {
            cur = word.to_string();
            continue;
        }
        for ch in word.chars() {
            cur.push(ch);
            if !fits(&cur) && cur.chars().count() > 1 {
                cur.pop();
                out.push(std::mem::take(&mut cur));
                cur.push(ch);
            }
        }
    }
    if !cur.is_empty() || out.is_empty() {
        out.push(cur);
    }
    out
}
