//! Brand colours shared by the charts and both document renderers.

use std::fmt;

/// An opaque sRGB colour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Returns the colour as an upper-case `RRGGBB` string without the leading `#`.
    pub fn hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }

    /// Returns the channels as an array, handy for pixel buffers.
    pub fn channels(self) -> [u8; 3] {
        [self.0, self.1, self.2]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.hex())
    }
}

impl From<Rgb> for genpdf::style::Color {
    fn from(color: Rgb) -> Self {
        genpdf::style::Color::Rgb(color.0, color.1, color.2)
    }
}

/// Primary brand colour, `#0078D4`.
pub const AZURE: Rgb = Rgb(0x00, 0x78, 0xD4);
/// Projection colour, `#7F3FBF`.
pub const VIOLET: Rgb = Rgb(0x7F, 0x3F, 0xBF);
/// Accent colour, `#51FF78`.
pub const GREEN: Rgb = Rgb(0x51, 0xFF, 0x78);
/// Fourth bar colour.
pub const DARK_GREY: Rgb = Rgb(0x33, 0x33, 0x33);
/// Fourth pie wedge colour.
pub const LIGHT_GREY: Rgb = Rgb(0x99, 0x99, 0x99);
pub const BLACK: Rgb = Rgb(0, 0, 0);
pub const WHITE: Rgb = Rgb(0xFF, 0xFF, 0xFF);
/// Grid lines and axis spines.
pub const GRID: Rgb = Rgb(0xB0, 0xB0, 0xB0);

/// Colour cycle used for the bars of the effort-by-role chart.
pub const BAR_CYCLE: [Rgb; 4] = [AZURE, VIOLET, GREEN, DARK_GREY];

/// Colour cycle used for the wedges of the effort-share chart.
pub const PIE_CYCLE: [Rgb; 4] = [AZURE, VIOLET, GREEN, LIGHT_GREY];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_is_upper_case_without_hash() {
        assert_eq!(AZURE.hex(), "0078D4");
        assert_eq!(VIOLET.to_string(), "#7F3FBF");
        assert_eq!(GREEN.to_string(), "#51FF78");
    }
}
