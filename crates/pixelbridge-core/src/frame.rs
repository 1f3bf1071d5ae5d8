//! Pixel and frame value types shared by the assembler, codec and transmitter.

/// One RGB pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Pixel {
    pub const BLACK: Pixel = Pixel::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Builds a pixel from wider integers, keeping the low 8 bits of each channel.
    ///
    /// # Examples
    /// ```
    /// use pixelbridge_core::Pixel;
    ///
    /// assert_eq!(Pixel::masked(256, 257, -1), Pixel::new(0, 1, 255));
    /// ```
    pub fn masked(r: i64, g: i64, b: i64) -> Self {
        Self::new((r & 0xFF) as u8, (g & 0xFF) as u8, (b & 0xFF) as u8)
    }

    pub fn to_bytes(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// A complete matrix snapshot of a fixed pixel count.
///
/// Frames are built once and not mutated afterwards; the transmitter
/// consumes them by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pixels: Vec<Pixel>,
}

impl Frame {
    /// Pads with black or truncates so the frame holds exactly `num_pixels`.
    pub fn from_pixels(mut pixels: Vec<Pixel>, num_pixels: usize) -> Self {
        pixels.resize(num_pixels, Pixel::BLACK);
        Self { pixels }
    }

    pub fn blank(num_pixels: usize) -> Self {
        Self {
            pixels: vec![Pixel::BLACK; num_pixels],
        }
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|p| *p == Pixel::BLACK)
    }
}
