//! Synthetic test patterns.
//!
//! These drive the serial side without any Art-Net source, which is handy
//! for checking wiring and matrix orientation.

use std::f64::consts::PI;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::frame::{Frame, Pixel};
use crate::serial::SerialTransmitter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    Solid,
    Rainbow,
    RainbowVertical,
    RainbowDiagonal,
    Wave,
    Plasma,
    Checker,
}

impl Pattern {
    pub const NAMES: [&'static str; 7] = [
        "solid",
        "rainbow",
        "rainbow_v",
        "rainbow_d",
        "wave",
        "plasma",
        "checker",
    ];
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown pattern '{0}'")]
pub struct UnknownPattern(pub String);

impl FromStr for Pattern {
    type Err = UnknownPattern;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solid" => Ok(Pattern::Solid),
            "rainbow" => Ok(Pattern::Rainbow),
            "rainbow_v" => Ok(Pattern::RainbowVertical),
            "rainbow_d" => Ok(Pattern::RainbowDiagonal),
            "wave" => Ok(Pattern::Wave),
            "plasma" => Ok(Pattern::Plasma),
            "checker" => Ok(Pattern::Checker),
            other => Err(UnknownPattern(other.to_string())),
        }
    }
}

/// Renders patterns for a row-major `width × height` matrix.
#[derive(Debug, Clone)]
pub struct PatternGenerator {
    width: usize,
    height: usize,
    tick: u64,
}

impl PatternGenerator {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            tick: 0,
        }
    }

    pub fn advance(&mut self) {
        self.tick += 1;
    }

    pub fn render(&self, pattern: Pattern) -> Frame {
        let t = self.tick as f64;
        let (w, h) = (self.width as f64, self.height as f64);
        let checker_size = 8;
        let checker_offset = (self.tick / 2) as usize % (checker_size * 2);

        let mut pixels = Vec::with_capacity(self.width * self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let (xf, yf) = (x as f64, y as f64);
                let pixel = match pattern {
                    Pattern::Solid => Pixel::new(255, 0, 0),
                    Pattern::Rainbow => hsv(xf / w + t * 0.01, 1.0, 1.0),
                    Pattern::RainbowVertical => hsv(yf / h + t * 0.01, 1.0, 1.0),
                    Pattern::RainbowDiagonal => hsv((xf + yf) / (w + h) + t * 0.01, 1.0, 1.0),
                    Pattern::Wave => {
                        let wave = (xf / w * 4.0 * PI + t * 0.1).sin();
                        let intensity = ((wave + 1.0) * 127.5).floor();
                        hsv(yf / h, 1.0, intensity / 255.0)
                    }
                    Pattern::Plasma => {
                        let (nx, ny) = (xf / w, yf / h);
                        let v = (nx * 10.0 + t * 0.1).sin()
                            + (ny * 10.0 + t * 0.15).sin()
                            + ((nx + ny) * 10.0 + t * 0.12).sin()
                            + ((nx * nx + ny * ny).sqrt() * 10.0 + t * 0.08).sin();
                        hsv((v + 4.0) / 8.0, 1.0, 1.0)
                    }
                    Pattern::Checker => {
                        let cx = (x + checker_offset) / checker_size;
                        let cy = y / checker_size;
                        if (cx + cy) % 2 == 0 {
                            hsv(t * 0.01, 1.0, 1.0)
                        } else {
                            Pixel::BLACK
                        }
                    }
                };
                pixels.push(pixel);
            }
        }
        Frame::from_pixels(pixels, self.width * self.height)
    }
}

/// HSV to RGB with the hue wrapped into `[0, 1)`; channels are truncated.
fn hsv(h: f64, s: f64, v: f64) -> Pixel {
    let h = h.rem_euclid(1.0);
    let sector = (h * 6.0).floor();
    let f = h * 6.0 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    let (r, g, b) = match sector as u8 % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    Pixel::masked(
        (r * 255.0) as i64,
        (g * 255.0) as i64,
        (b * 255.0) as i64,
    )
}

/// Streams `pattern` until `running` is cleared, then blanks the display
/// and disconnects. Returns the number of frames delivered.
pub fn drive(
    transmitter: &mut SerialTransmitter,
    generator: &mut PatternGenerator,
    pattern: Pattern,
    running: &AtomicBool,
    frame_interval: Duration,
) -> u64 {
    let mut sent = 0u64;
    while running.load(Ordering::SeqCst) {
        let started = Instant::now();
        if transmitter.send(&generator.render(pattern)) {
            sent += 1;
            if sent % 100 == 0 {
                log::info!("Sent {sent} frames");
            }
        }
        generator.advance();
        if let Some(rest) = frame_interval.checked_sub(started.elapsed()) {
            thread::sleep(rest);
        }
    }
    transmitter.send_blank();
    transmitter.disconnect();
    sent
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_named_pattern() {
        for name in Pattern::NAMES {
            assert!(name.parse::<Pattern>().is_ok(), "{name}");
        }
        assert_eq!(
            "sparkle".parse::<Pattern>(),
            Err(UnknownPattern("sparkle".to_string()))
        );
    }

    #[test]
    fn hsv_primaries() {
        assert_eq!(hsv(0.0, 1.0, 1.0), Pixel::new(255, 0, 0));
        assert_eq!(hsv(1.0 / 3.0, 1.0, 1.0), Pixel::new(0, 255, 0));
        assert_eq!(hsv(2.0 / 3.0, 1.0, 1.0), Pixel::new(0, 0, 255));
        assert_eq!(hsv(1.0, 1.0, 1.0), Pixel::new(255, 0, 0));
        assert_eq!(hsv(0.5, 0.0, 0.0), Pixel::BLACK);
    }

    #[test]
    fn frames_fill_the_matrix() {
        let generator = PatternGenerator::new(64, 192);
        for name in Pattern::NAMES {
            let frame = generator.render(name.parse().unwrap());
            assert_eq!(frame.len(), 64 * 192, "{name}");
        }
    }

    #[test]
    fn solid_is_red() {
        let frame = PatternGenerator::new(4, 2).render(Pattern::Solid);
        assert!(frame.pixels().iter().all(|p| *p == Pixel::new(255, 0, 0)));
    }

    #[test]
    fn checker_alternates_blocks() {
        let frame = PatternGenerator::new(16, 8).render(Pattern::Checker);
        assert_ne!(frame.pixels()[0], Pixel::BLACK);
        assert_eq!(frame.pixels()[8], Pixel::BLACK);
    }

    #[test]
    fn rainbow_moves_over_time() {
        let mut generator = PatternGenerator::new(8, 1);
        let first = generator.render(Pattern::Rainbow);
        for _ in 0..10 {
            generator.advance();
        }
        assert_ne!(first, generator.render(Pattern::Rainbow));
    }
}
