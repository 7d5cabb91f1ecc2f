//! Linear RGB colors and hex/sRGB conversion.

/// Convert one sRGB-encoded channel in `[0, 1]` to linear light.
pub fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.077_399_38
    } else {
        (c * 0.947_867_3 + 0.052_132_7).powf(2.4)
    }
}

/// A linear-light RGB color. Channels are nominally in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Decode a `0xRRGGBB` sRGB color into linear RGB.
    pub fn from_hex(hex: u32) -> Self {
        let [r, g, b] = hex_channels(hex);
        Self::new(srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b))
    }

    /// Per-channel affine mix: `a * (1 - k) + b * k`.
    ///
    /// Written in this form (not `a + (b - a) * k`) so that `k = 0` yields `a`
    /// and `k = 1` yields `b` bit-for-bit.
    pub fn lerp(a: Rgb, b: Rgb, k: f32) -> Rgb {
        let j = 1.0 - k;
        Rgb::new(a.r * j + b.r * k, a.g * j + b.g * k, a.b * j + b.b * k)
    }

    /// Scale every channel by `s`.
    pub fn scaled(self, s: f32) -> Rgb {
        Rgb::new(self.r * s, self.g * s, self.b * s)
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<Rgb> for glam::Vec3 {
    fn from(c: Rgb) -> Self {
        glam::Vec3::new(c.r, c.g, c.b)
    }
}

fn hex_channels(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}
