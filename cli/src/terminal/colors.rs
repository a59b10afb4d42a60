use colored::Color;

pub const PRIMARY: Color = Color::TrueColor { r: 120, g: 200, b: 255 };
pub const ACCENT: Color = Color::TrueColor { r: 255, g: 190, b: 90 };
pub const SEPARATOR: Color = Color::TrueColor { r: 110, g: 110, b: 110 };
pub const TEXT_DEFAULT: Color = Color::TrueColor { r: 220, g: 220, b: 220 };

pub const IPV4_ADDR: Color = Color::TrueColor { r: 130, g: 230, b: 130 };
pub const IPV6_ADDR: Color = Color::TrueColor { r: 190, g: 150, b: 255 };

pub const PORT_OPEN: Color = Color::TrueColor { r: 90, g: 220, b: 120 };
pub const FAILURE: Color = Color::TrueColor { r: 240, g: 100, b: 100 };
