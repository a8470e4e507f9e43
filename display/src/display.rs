use sdl2::pixels::PixelFormatEnum;

use emu8::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use emu8::FrameBuffer;

/// Bytes per pixel of an RGB24 texture
const CHANNELS: usize = 3;

/// # Display
/// The Chip-8 display is composed of 64x32 black/white pixels.
/// The interpreter stores each pixel as a `u32` that is either all ones (lit) or zero.
/// The display only gets a call to `render` when the Chip-8 FrameBuffer changes.
pub struct Display {
    canvas: sdl2::render::WindowCanvas,
    title: String,
}

impl Display {
    /// Creates a new window bound to an sdl2 context.
    ///
    /// # Arguments
    /// * `sdl` an sdl2 context with which to draw
    /// * `title` the window title
    /// * `scale` the size multiplier for each pixel
    pub fn new(sdl: &sdl2::Sdl, title: &str, scale: u32) -> Result<Self, String> {
        let video_subsystem = sdl.video()?;
        let window = video_subsystem
            .window(
                title,
                DISPLAY_WIDTH as u32 * scale,
                DISPLAY_HEIGHT as u32 * scale,
            )
            .position_centered()
            .build()
            .map_err(|e| e.to_string())?;
        let canvas = window.into_canvas().build().map_err(|e| e.to_string())?;

        Ok(Display {
            canvas,
            title: title.to_owned(),
        })
    }

    /// Formats a Chip-8 FrameBuffer for rendering as an SDL2 texture.
    ///
    /// An SDL2 texture is a 1D array of bytes that represent concatenated rows of RGB pixels.
    ///
    /// This creates a black and white rendering by:
    /// - Flattening the 2D frame buffer into a 1D array by concatenating its rows
    /// - Mapping each lit pixel to full intensity and every other pixel to black
    /// - Triplicating each element to fill the R, G and B channels
    ///
    /// # Arguments
    /// * `frame` a Chip-8 FrameBuffer
    fn frame_to_sdl_texture(frame: &FrameBuffer) -> Vec<u8> {
        frame
            .iter()
            .flatten()
            .map(|&pixel| if pixel == 0 { 0x00 } else { 0xFF })
            .flat_map(|intensity| [intensity; CHANNELS])
            .collect()
    }

    /// Formats the Chip-8 FrameBuffer as an SDL2 RGB24 texture and renders it.
    ///
    /// # Arguments
    /// * `frame` a Chip-8 FrameBuffer
    pub fn render(&mut self, frame: &FrameBuffer) -> Result<(), String> {
        let texture_creator = self.canvas.texture_creator();
        let mut texture = texture_creator
            .create_texture_streaming(
                PixelFormatEnum::RGB24,
                DISPLAY_WIDTH as u32,
                DISPLAY_HEIGHT as u32,
            )
            .map_err(|e| e.to_string())?;

        let pixels = Display::frame_to_sdl_texture(frame);
        texture.with_lock(None, |buffer: &mut [u8], pitch: usize| {
            copy_rows(&pixels, buffer, pitch)
        })?;

        self.canvas.copy(&texture, None, None)?;
        self.canvas.present();
        Ok(())
    }

    /// Appends `status` to the window title, or restores the plain title when it is empty
    pub fn set_status(&mut self, status: &str) -> Result<(), String> {
        let title = status_title(&self.title, status);
        self.canvas
            .window_mut()
            .set_title(&title)
            .map_err(|e| e.to_string())
    }
}

/// Copies packed RGB rows into a locked texture whose rows are `pitch` bytes apart.
/// Any padding at the end of a texture row is left alone.
fn copy_rows(pixels: &[u8], buffer: &mut [u8], pitch: usize) {
    for (row, line) in pixels.chunks(DISPLAY_WIDTH * CHANNELS).enumerate() {
        buffer[row * pitch..row * pitch + line.len()].copy_from_slice(line);
    }
}

fn status_title(title: &str, status: &str) -> String {
    if status.is_empty() {
        title.to_owned()
    } else {
        format!("{} {}", title, status)
    }
}
