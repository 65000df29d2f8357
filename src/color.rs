//! Per-figure cyclic default-color picker.

use crate::core::{Color, default_palette};

#[derive(Clone, Debug)]
pub struct ColorScroller {
    palette: Vec<Color>,
    cursor: usize,
}

impl Default for ColorScroller {
    fn default() -> Self {
        Self::new(default_palette())
    }
}

impl ColorScroller {
    /// An empty palette falls back to the default one.
    pub fn new(palette: Vec<Color>) -> Self {
        let palette = if palette.is_empty() {
            default_palette()
        } else {
            palette
        };
        Self { palette, cursor: 0 }
    }

    pub fn palette(&self) -> &[Color] {
        &self.palette
    }

    pub fn current_color(&self) -> Color {
        self.palette[self.cursor]
    }

    /// Returns the color current before the call, then moves the cursor by
    /// `count` (negative counts move backwards), wrapping around the palette.
    pub fn scroll_color(&mut self, count: isize) -> Color {
        let current = self.current_color();
        let len = self.palette.len() as isize;
        self.cursor = (self.cursor as isize + count).rem_euclid(len) as usize;
        current
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}
