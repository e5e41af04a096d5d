/// ASCII presentation of an RGB565 canvas in the terminal
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use std::io::Write;

use crate::raster::rgb565_components;

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: usize = 2;

fn luminosity_char(pixel: u16) -> char {
    let (r, g, b) = rgb565_components(pixel);
    let luma = 0.299 * r + 0.587 * g + 0.114 * b;
    let index = (luma * (LUMINOSITY_RAMP.len() - 1) as f32).round() as usize;
    LUMINOSITY_RAMP[index.min(LUMINOSITY_RAMP.len() - 1)]
}

/// Samples a pixel canvas onto a grid of terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    char_buffer: Vec<char>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            char_buffer: vec![' '; width * height],
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        if (width, height) != (self.width, self.height) {
            *self = Self::new(width, height);
        }
    }

    pub fn char_at(&self, x: usize, y: usize) -> char {
        self.char_buffer[y * self.width + x]
    }

    /// Largest character region that keeps the canvas aspect ratio
    fn fit(&self, canvas_width: usize, canvas_height: usize) -> (usize, usize) {
        if canvas_width == 0 || canvas_height == 0 {
            return (0, 0);
        }
        let cols = self
            .width
            .min(self.height * CELL_ASPECT * canvas_width / canvas_height);
        let rows = (cols * canvas_height / (CELL_ASPECT * canvas_width)).min(self.height);
        (cols, rows)
    }

    /// Convert `canvas` to characters; `background` pixels become blanks
    pub fn present(
        &mut self,
        canvas: &[u16],
        canvas_width: usize,
        canvas_height: usize,
        background: u16,
    ) {
        self.char_buffer.fill(' ');
        let (cols, rows) = self.fit(canvas_width, canvas_height);

        for y in 0..rows {
            let sy = y * canvas_height / rows;
            for x in 0..cols {
                let sx = x * canvas_width / cols;
                let pixel = canvas[sy * canvas_width + sx];
                if pixel != background {
                    // Keep lit geometry visible even when it is very dark
                    let c = luminosity_char(pixel);
                    self.char_buffer[y * self.width + x] = if c == ' ' { '.' } else { c };
                }
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let c = self.char_buffer[y * self.width + x];

                // Color based on character intensity
                let color = match c {
                    ' ' | '.' | ':' => Color::DarkGrey,
                    '-' | '=' => Color::Grey,
                    '+' | '*' => Color::White,
                    '#' | '%' | '@' => Color::Cyan,
                    _ => Color::White,
                };

                writer.queue(SetForegroundColor(color))?;
                writer.queue(Print(c))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::rgb565;

    #[test]
    fn test_luminosity_extremes() {
        assert_eq!(luminosity_char(rgb565(0.0, 0.0, 0.0)), ' ');
        assert_eq!(luminosity_char(rgb565(1.0, 1.0, 1.0)), '@');
    }

    #[test]
    fn test_fit_keeps_aspect() {
        let renderer = AsciiRenderer::new(80, 24);
        // A square canvas on a 24-row terminal uses 48 columns by 24 rows
        assert_eq!(renderer.fit(160, 160), (48, 24));

        let wide = AsciiRenderer::new(40, 100);
        assert_eq!(wide.fit(160, 160), (40, 20));
    }

    #[test]
    fn test_present_blanks_background() {
        let background = rgb565(0.5, 0.5, 0.5);
        let mut canvas = vec![background; 4 * 4];
        canvas[0] = rgb565(1.0, 1.0, 1.0);

        let mut renderer = AsciiRenderer::new(8, 4);
        renderer.present(&canvas, 4, 4, background);

        assert_eq!(renderer.char_at(0, 0), '@');
        assert_eq!(renderer.char_at(3, 3), ' ');
        assert_eq!(renderer.char_at(7, 3), ' ');
    }

    #[test]
    fn test_draw_writes_every_cell() {
        let renderer = AsciiRenderer::new(3, 2);
        let mut out = Vec::new();
        renderer.draw(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("\r\n").count(), 1);
    }
}
