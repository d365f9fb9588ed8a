use std::num::NonZeroUsize;

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping, Weight};
use lru::LruCache;

const MEASURE_CACHE_SIZE: usize = 256;

#[derive(Hash, PartialEq, Eq, Clone)]
struct MeasureKey {
    text: String,
    font_size_bits: u32,
    is_bold: bool,
}

/// Width and height of a single line of label text, in pixels.
pub trait TextMeasure {
    fn measure_text(&mut self, text: &str, font_size: f32, is_bold: bool) -> (f32, f32);
}

/// Shapes text with the system's sans-serif face.
pub struct CosmicTextMeasure {
    font_system: FontSystem,
    cache: LruCache<MeasureKey, (f32, f32)>,
}

impl CosmicTextMeasure {
    pub fn new() -> Self {
        Self {
            font_system: FontSystem::new(),
            cache: LruCache::new(
                NonZeroUsize::new(MEASURE_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN),
            ),
        }
    }
}

impl Default for CosmicTextMeasure {
    fn default() -> Self {
        Self::new()
    }
}

impl TextMeasure for CosmicTextMeasure {
    fn measure_text(&mut self, text: &str, font_size: f32, is_bold: bool) -> (f32, f32) {
        let key = MeasureKey {
            text: text.to_string(),
            font_size_bits: font_size.to_bits(),
            is_bold,
        };

        if let Some(cached) = self.cache.get(&key) {
            return *cached;
        }

        let line_height = font_size * 1.2;
        let mut buffer = Buffer::new(
            &mut self.font_system,
            Metrics {
                font_size,
                line_height,
            },
        );
        buffer.set_size(&mut self.font_system, None, None);

        let attrs = Attrs::new().family(Family::SansSerif).weight(if is_bold {
            Weight::SEMIBOLD
        } else {
            Weight::NORMAL
        });
        buffer.set_text(&mut self.font_system, text, &attrs, Shaping::Advanced, None);

        let mut width: f32 = 0.0;
        let mut height: f32 = 0.0;
        for run in buffer.layout_runs() {
            width = width.max(run.line_w);
            height += run.line_height;
        }

        // No faces installed.
        let measured = if width <= 0.0 && !text.is_empty() {
            EstimatedMeasure.measure_text(text, font_size, is_bold)
        } else {
            (width, height.max(line_height))
        };
        self.cache.put(key, measured);
        measured
    }
}

/// Font-free approximation: 0.6em per character, 1.2em line height.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatedMeasure;

impl TextMeasure for EstimatedMeasure {
    fn measure_text(&mut self, text: &str, font_size: f32, is_bold: bool) -> (f32, f32) {
        let em = if is_bold { 0.65 } else { 0.6 };
        let chars = text.chars().count() as f32;
        (chars * font_size * em, font_size * 1.2)
    }
}
