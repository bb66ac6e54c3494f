//! Shared palette. Values mirror the warning-system web theme so the console
//! and the browser dashboard read the same.

use ratatui::style::Color;

use jw_graph::NodeCategory;

pub const ACCENT: Color = Color::Rgb(0x18, 0x90, 0xff);
pub const DEEP_SEA: Color = Color::Rgb(0x02, 0x0b, 0x21);
pub const DANGER: Color = Color::Rgb(0xcf, 0x13, 0x22);
pub const WARN: Color = Color::Rgb(0xfa, 0xad, 0x14);
pub const OK: Color = Color::Rgb(0x3f, 0x86, 0x00);
pub const TEAL: Color = Color::Rgb(0x13, 0xc2, 0xc2);
pub const GREEN: Color = Color::Rgb(0x52, 0xc4, 0x1a);
pub const MUTED: Color = Color::DarkGray;

pub fn category_color(category: NodeCategory) -> Color {
    let (r, g, b) = category.color();
    Color::Rgb(r, g, b)
}
