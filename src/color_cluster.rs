use palette::{Hsl, IntoColor, Srgb};

/// One group produced by the clusterer: its centroid color and how many pixels were assigned to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorCluster {
    red: u8,
    green: u8,
    blue: u8,
    member_count: u64,
}

impl ColorCluster {
    pub fn new((red, green, blue): (u8, u8, u8), member_count: u64) -> ColorCluster {
        Self {
            red,
            green,
            blue,
            member_count,
        }
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        (self.red, self.green, self.blue)
    }

    /// Hue in positive degrees, saturation and lightness of the centroid, the last two in [0, 1].
    pub fn hsl(self) -> (f32, f32, f32) {
        let centroid: Srgb<f32> = Srgb::new(self.red, self.green, self.blue).into_format();
        let hsl: Hsl = centroid.into_color();
        let (hue, saturation, lightness) = hsl.into_components();

        (hue.into_positive_degrees(), saturation, lightness)
    }

    pub fn member_count(self) -> u64 {
        self.member_count
    }
}
