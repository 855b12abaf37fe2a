//! A fixed 256-color gradient built from three out-of-phase sine
//! waves, and the mapping from a smooth escape value into it.

/// Number of entries in the palette.
pub const PALETTE_SIZE: usize = 256;

/// How many palette entries one unit of smooth value spans.
const BANDING: f64 = 10.0;

/// The color table.  Entries are RGB; alpha is always opaque on output.
#[derive(Clone)]
pub struct Palette {
    colors: [[u8; 3]; PALETTE_SIZE],
}

fn channel(t: f64, frequency: f64, phase: f64) -> u8 {
    let v = (t * frequency + phase).sin() * 0.5 + 0.5;
    (v * 255.0) as u8
}

impl Palette {
    /// Builds the gradient.  Each channel runs at its own frequency and
    /// phase so the colors cycle rather than fade.
    pub fn new() -> Palette {
        let mut colors = [[0u8; 3]; PALETTE_SIZE];
        for (i, color) in colors.iter_mut().enumerate() {
            let t = i as f64 / PALETTE_SIZE as f64;
            *color = [
                channel(t, 5.0, 0.0),
                channel(t, 3.0, 2.0),
                channel(t, 9.0, 1.0),
            ];
        }
        Palette { colors }
    }

    /// The RGB triple at `index`.
    pub fn get(&self, index: usize) -> [u8; 3] {
        self.colors[index % PALETTE_SIZE]
    }

    /// Picks the palette slot for a smooth escape value.  Negative
    /// values wrap around from the top instead of indexing out of the
    /// table.
    pub fn index_for(smooth: f64) -> usize {
        ((smooth * BANDING).floor() as i64).rem_euclid(PALETTE_SIZE as i64) as usize
    }

    /// The opaque RGBA color for a smooth escape value.
    pub fn shade(&self, smooth: f64) -> [u8; 4] {
        let [r, g, b] = self.colors[Palette::index_for(smooth)];
        [r, g, b, 255]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette::new()
    }
}
