use std::{fmt, str::FromStr};

/// Named colors recognized by SVG/CSS, one `name #rrggbb` pair per line
const SVG_COLORS: &str = include_str!("svg-colors.txt");

/// ABGR color packed as u32 value (most of the platforms are little-endian)
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct RGBA(u32);

impl RGBA {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((a as u32) << 24) | ((b as u32) << 16) | ((g as u32) << 8) | (r as u32))
    }

    pub const fn alpha(self) -> u8 {
        ((self.0 >> 24) & 0xff) as u8
    }

    pub const fn blue(self) -> u8 {
        ((self.0 >> 16) & 0xff) as u8
    }

    pub const fn green(self) -> u8 {
        ((self.0 >> 8) & 0xff) as u8
    }

    pub const fn red(self) -> u8 {
        (self.0 & 0xff) as u8
    }

    /// Convert color to sRGBA list
    pub fn to_rgba(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    /// Convert color to sRGBA components in `0.0..=1.0` range
    pub fn to_f32(self) -> [f32; 4] {
        let [r, g, b, a] = self.to_rgba();
        [
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        ]
    }

    /// Whether color is completely transparent
    pub fn is_transparent(self) -> bool {
        self.alpha() == 0
    }

    /// Find color by its SVG name, lookup is case-insensitive
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("transparent") {
            return Some(RGBA::new(0, 0, 0, 0));
        }
        SVG_COLORS.lines().find_map(|line| {
            let (color_name, hex) = line.split_once(' ')?;
            if color_name.eq_ignore_ascii_case(name) {
                hex.parse().ok()
            } else {
                None
            }
        })
    }
}

impl fmt::Debug for RGBA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RGBA({})", self)
    }
}

impl fmt::Display for RGBA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.to_rgba();
        write!(f, "#{:02x}{:02x}{:02x}", r, g, b)?;
        if a != 255 {
            write!(f, "{:02x}", a)?;
        }
        Ok(())
    }
}

impl FromStr for RGBA {
    type Err = ColorError;

    fn from_str(color: &str) -> Result<Self, Self::Err> {
        let color = color.trim();
        let Some(hex) = color.strip_prefix('#') else {
            return RGBA::from_name(color).ok_or_else(|| ColorError::UnknownName(color.into()));
        };
        let digit = |byte: u8| match byte {
            b'A'..=b'F' => Ok(byte - b'A' + 10),
            b'a'..=b'f' => Ok(byte - b'a' + 10),
            b'0'..=b'9' => Ok(byte - b'0'),
            _ => Err(ColorError::HexExpected),
        };
        let bytes = hex.as_bytes();
        match bytes.len() {
            // #RGB
            3 => {
                let mut hex = bytes
                    .iter()
                    .map(|byte| -> Result<u8, ColorError> { Ok(digit(*byte)? * 0x11) });
                Ok(RGBA::new(
                    hex.next().unwrap_or(Ok(0))?,
                    hex.next().unwrap_or(Ok(0))?,
                    hex.next().unwrap_or(Ok(0))?,
                    255,
                ))
            }
            // #RRGGBB(AA)
            6 | 8 => {
                let mut hex = bytes
                    .chunks(2)
                    .map(|pair| -> Result<u8, ColorError> {
                        Ok((digit(pair[0])? << 4) | digit(pair[1])?)
                    });
                Ok(RGBA::new(
                    hex.next().unwrap_or(Ok(0))?,
                    hex.next().unwrap_or(Ok(0))?,
                    hex.next().unwrap_or(Ok(0))?,
                    hex.next().unwrap_or(Ok(255))?,
                ))
            }
            _ => Err(ColorError::HexExpected),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    HexExpected,
    UnknownName(String),
}

impl fmt::Display for ColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorError::HexExpected => {
                write!(f, "Color expected to be #RGB or #RRGGBB(AA) in hexidemical format")
            }
            ColorError::UnknownName(name) => write!(f, "Unknown color name: {}", name),
        }
    }
}

impl std::error::Error for ColorError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_u8() {
        let c = RGBA::new(1, 2, 3, 4);
        assert_eq!([1, 2, 3, 4], c.to_rgba());
        assert_eq!(1, c.red());
        assert_eq!(2, c.green());
        assert_eq!(3, c.blue());
        assert_eq!(4, c.alpha());
    }

    #[test]
    fn test_color_u8_parse() -> Result<(), ColorError> {
        assert_eq!(RGBA::new(1, 2, 3, 4), "#01020304".parse::<RGBA>()?);
        assert_eq!(RGBA::new(170, 187, 204, 255), "#aabbcc".parse::<RGBA>()?);
        assert_eq!(RGBA::new(170, 187, 204, 255), "#ABC".parse::<RGBA>()?);
        assert_eq!(RGBA::new(0, 0, 0, 255), "#000000".parse::<RGBA>()?);
        assert_eq!("#12345".parse::<RGBA>(), Err(ColorError::HexExpected));
        assert_eq!("#gg0000".parse::<RGBA>(), Err(ColorError::HexExpected));
        Ok(())
    }

    #[test]
    fn test_named_colors() -> Result<(), ColorError> {
        assert_eq!(RGBA::new(255, 0, 0, 255), "red".parse::<RGBA>()?);
        assert_eq!(RGBA::new(0, 0, 255, 255), " Blue ".parse::<RGBA>()?);
        assert_eq!(RGBA::new(154, 205, 50, 255), "yellowgreen".parse::<RGBA>()?);
        assert_eq!(RGBA::new(240, 248, 255, 255), "aliceblue".parse::<RGBA>()?);
        assert!("transparent".parse::<RGBA>()?.is_transparent());
        assert_eq!(
            "nosuchcolor".parse::<RGBA>(),
            Err(ColorError::UnknownName("nosuchcolor".into()))
        );
        Ok(())
    }

    #[test]
    fn test_to_f32() {
        assert_eq!(RGBA::new(255, 0, 0, 255).to_f32(), [1.0, 0.0, 0.0, 1.0]);
        let [_, _, _, a] = RGBA::new(0, 0, 0, 51).to_f32();
        assert!((a - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_display_parse() -> Result<(), ColorError> {
        let c: RGBA = "#01020304".parse()?;
        assert_eq!(c, RGBA::new(1, 2, 3, 4));
        assert_eq!(c.to_string(), "#01020304");

        let c: RGBA = "#010203".parse()?;
        assert_eq!(c, RGBA::new(1, 2, 3, 255));
        assert_eq!(c.to_string(), "#010203");

        Ok(())
    }
}
