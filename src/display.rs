use std::io;

use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

/// Display width in pixels.
pub const WIDTH: usize = 64;

/// Display height in pixels.
pub const HEIGHT: usize = 32;

/// One row per scanline, one byte per pixel, each byte 0 or 1.
pub type PixelGrid = [[u8; WIDTH]; HEIGHT];

/// The monochrome framebuffer owned by the interpreter. Sprites are
/// composited with XOR and wrap modulo the grid size; rendering happens
/// elsewhere, through a [`DisplaySink`] fed by [`FrameBuffer::snapshot`].
pub struct FrameBuffer {
    pixels: PixelGrid,
}

impl FrameBuffer {
    pub fn new() -> Self {
        FrameBuffer {
            pixels: [[0; WIDTH]; HEIGHT],
        }
    }

    /// Reset every pixel to 0.
    pub fn clear(&mut self) {
        self.pixels = [[0; WIDTH]; HEIGHT];
    }

    /// XOR-blit a sprite whose rows are 8 pixels wide, bit 7 leftmost.
    /// Coordinates wrap independently per axis, so a sprite is never
    /// clipped. Only set sprite bits touch the grid; a clear bit leaves the
    /// target pixel alone. Returns true if any set bit landed on a lit
    /// pixel.
    pub fn draw_sprite(&mut self, rows: &[u8], origin_x: u8, origin_y: u8) -> bool {
        let mut collision = false;
        for (row_index, &row_bits) in rows.iter().enumerate() {
            for column_index in 0..8 {
                if (row_bits >> (7 - column_index)) & 1 == 0 {
                    continue;
                }
                let dx = (origin_x as usize + column_index) % WIDTH;
                let dy = (origin_y as usize + row_index) % HEIGHT;
                if self.pixels[dy][dx] == 1 {
                    collision = true;
                }
                self.pixels[dy][dx] ^= 1;
            }
        }
        collision
    }

    /// Read-only view for the external display sink.
    pub fn snapshot(&self) -> &PixelGrid {
        &self.pixels
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Where a frame goes once the interpreter has finished a cycle. Keeps the
/// core free of any assumption about the rendering medium: terminal canvas,
/// plain text, or a test harness buffer.
pub trait DisplaySink {
    fn draw(&mut self, frame: &PixelGrid) -> Result<(), io::Error>;
}

/// Collect the coordinates of one bitplane, in the inverted-y float space
/// the TUI canvas expects.
fn bitplane(frame: &PixelGrid, plane: u8) -> Vec<(f64, f64)> {
    let mut coords = Vec::new();
    for (y, row) in frame.iter().enumerate() {
        for (x, &pixel) in row.iter().enumerate() {
            if pixel == plane {
                coords.push((x as f64, -1.0 * y as f64));
            }
        }
    }
    coords
}

/// Monochrome display in a terminal, rendered using TUI over crossterm.
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl MonoTermDisplay {
    /// NB. raw mode is the input side's business; we only need a terminal
    /// to draw on
    pub fn new() -> Result<MonoTermDisplay, io::Error> {
        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::new(backend)?;
        Ok(MonoTermDisplay { terminal })
    }
}

impl DisplaySink for MonoTermDisplay {
    fn draw(&mut self, frame: &PixelGrid) -> Result<(), io::Error> {
        // 1:1 ratio between terminal cells, chip8 pixels and the TUI canvas
        let off = bitplane(frame, 0);
        let on = bitplane(frame, 1);
        self.terminal.draw(|f| {
            let size = Rect::new(0, 0, 2 + WIDTH as u16, 2 + HEIGHT as u16);
            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds([0.0, (WIDTH - 1) as f64])
                .y_bounds([-1.0 * (HEIGHT - 1) as f64, 0.0])
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &off,
                        color: Color::Black,
                    });
                    ctx.draw(&Points {
                        coords: &on,
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }
}

/// Glyph used by [`TextDisplay`] for a lit pixel.
pub const PIXEL_CHAR: char = '▓';

/// ANSI cursor-home sequence emitted before each frame.
const ASCII_CLEAR: &str = "\x1b[H";

/// Plain-text renderer: one line per row, a block glyph for 1, a space for
/// 0. Works against any writer, which also makes it the test harness sink.
pub struct TextDisplay<W: io::Write> {
    out: W,
}

impl<W: io::Write> TextDisplay<W> {
    pub fn new(out: W) -> Self {
        TextDisplay { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: io::Write> DisplaySink for TextDisplay<W> {
    fn draw(&mut self, frame: &PixelGrid) -> Result<(), io::Error> {
        write!(self.out, "{}", ASCII_CLEAR)?;
        for (y, row) in frame.iter().enumerate() {
            for &pixel in row.iter() {
                let glyph = if pixel == 1 { PIXEL_CHAR } else { ' ' };
                write!(self.out, "{}", glyph)?;
            }
            if y < HEIGHT - 1 {
                writeln!(self.out)?;
            }
        }
        self.out.flush()
    }
}

/// Useful for testing non-display routines.
pub struct DummyDisplay;

impl DummyDisplay {
    pub fn new() -> Self {
        DummyDisplay {}
    }
}

impl DisplaySink for DummyDisplay {
    fn draw(&mut self, _frame: &PixelGrid) -> Result<(), io::Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framebuffer_starts_clear() {
        let fb = FrameBuffer::new();
        assert!(fb.snapshot().iter().flatten().all(|&p| p == 0));
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(&[0xFF], 0, 0);
        fb.clear();
        assert!(fb.snapshot().iter().flatten().all(|&p| p == 0));
    }

    #[test]
    fn test_draw_sprite_no_wrap() {
        let mut fb = FrameBuffer::new();
        let collision = fb.draw_sprite(&[0b1111_0000], 0, 0);
        assert!(!collision);
        assert_eq!(&fb.snapshot()[0][0..4], &[1, 1, 1, 1]);
        assert!(fb.snapshot()[0][4..].iter().all(|&p| p == 0));
    }

    #[test]
    fn test_draw_sprite_clear_bits_leave_pixels_alone() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(&[0b1111_1111], 0, 0);
        // second sprite has bits 2..5 clear; those pixels must stay lit
        fb.draw_sprite(&[0b1100_0011], 0, 0);
        assert_eq!(&fb.snapshot()[0][0..8], &[0, 0, 1, 1, 1, 1, 0, 0]);
    }

    #[test]
    fn test_draw_sprite_horizontal_wrap() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(&[0xFF], (WIDTH - 4) as u8, 0);
        assert_eq!(&fb.snapshot()[0][WIDTH - 4..], &[1, 1, 1, 1]);
        assert_eq!(&fb.snapshot()[0][0..4], &[1, 1, 1, 1]);
        assert!(fb.snapshot()[0][4..WIDTH - 4].iter().all(|&p| p == 0));
    }

    #[test]
    fn test_draw_sprite_vertical_wrap() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(&[0b1100_0011, 0b0011_1100], 0, (HEIGHT - 1) as u8);
        assert_eq!(&fb.snapshot()[HEIGHT - 1][0..8], &[1, 1, 0, 0, 0, 0, 1, 1]);
        assert_eq!(&fb.snapshot()[0][0..8], &[0, 0, 1, 1, 1, 1, 0, 0]);
    }

    #[test]
    fn test_draw_sprite_is_its_own_inverse() {
        let mut fb = FrameBuffer::new();
        let sprite = [0xFF, 0x81, 0xA5, 0x81, 0xFF];
        let first = fb.draw_sprite(&sprite, 10, 8);
        assert!(!first);
        let second = fb.draw_sprite(&sprite, 10, 8);
        // every set bit now lands on a lit pixel
        assert!(second);
        assert!(fb.snapshot().iter().flatten().all(|&p| p == 0));
    }

    #[test]
    fn test_collision_only_where_bits_overlap() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(&[0b1000_0000], 0, 0);
        // disjoint bits, no collision
        assert!(!fb.draw_sprite(&[0b0100_0000], 0, 0));
        // overlapping bit collides
        assert!(fb.draw_sprite(&[0b1000_0000], 0, 0));
    }

    #[test]
    fn test_text_display_renders_rows() {
        let mut frame = [[0u8; WIDTH]; HEIGHT];
        frame[0][0] = 1;
        frame[0][1] = 1;
        frame[0][6] = 1;

        let mut sink = TextDisplay::new(Vec::new());
        sink.draw(&frame).unwrap();
        let rendered = String::from_utf8(sink.into_inner()).unwrap();

        let body = rendered.strip_prefix(ASCII_CLEAR).unwrap();
        let rows: Vec<&str> = body.split('\n').collect();
        assert_eq!(rows.len(), HEIGHT);
        assert!(rows.iter().all(|r| r.chars().count() == WIDTH));
        let first: String = rows[0].chars().take(8).collect();
        assert_eq!(first, "▓▓    ▓ ");
    }

    #[test]
    fn test_dummy_display_accepts_anything() {
        let mut sink = DummyDisplay::new();
        assert!(sink.draw(&[[0; WIDTH]; HEIGHT]).is_ok());
    }
}
