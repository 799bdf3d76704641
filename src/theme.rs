use ratatui::style::Color;

pub struct Theme {
  pub name: &'static str,
  pub bg: Color,
  pub fg: Color,
  pub accent: Color,
  pub muted: Color,
  pub border: Color,
  pub highlight_fg: Color,
  pub highlight_bg: Color,
  pub stripe_bg: Color,
  pub status: Color,
  pub error: Color,
  pub key_fg: Color,
  pub key_bg: Color,
}

pub static THEMES: [Theme; 3] = [
  Theme {
    name: "Dusk",
    bg: Color::Rgb(7, 25, 82),
    fg: Color::Rgb(240, 240, 240),
    accent: Color::Rgb(0, 184, 148),
    muted: Color::Rgb(140, 150, 180),
    border: Color::Rgb(70, 90, 150),
    highlight_fg: Color::Rgb(255, 255, 255),
    highlight_bg: Color::Rgb(30, 144, 255),
    stripe_bg: Color::Rgb(14, 34, 96),
    status: Color::Rgb(233, 255, 151),
    error: Color::Rgb(220, 0, 131),
    key_fg: Color::Rgb(7, 25, 82),
    key_bg: Color::Rgb(112, 93, 242),
  },
  Theme {
    name: "Charcoal",
    bg: Color::Rgb(38, 38, 38),
    fg: Color::Rgb(230, 230, 230),
    accent: Color::Rgb(30, 144, 255),
    muted: Color::Rgb(130, 130, 130),
    border: Color::Rgb(74, 74, 74),
    highlight_fg: Color::Rgb(255, 255, 255),
    highlight_bg: Color::Rgb(0, 184, 148),
    stripe_bg: Color::Rgb(46, 46, 46),
    status: Color::Rgb(0, 184, 148),
    error: Color::Rgb(255, 99, 99),
    key_fg: Color::Rgb(38, 38, 38),
    key_bg: Color::Rgb(200, 200, 200),
  },
  Theme {
    name: "Paper",
    bg: Color::Rgb(240, 240, 240),
    fg: Color::Rgb(30, 30, 30),
    accent: Color::Rgb(30, 144, 255),
    muted: Color::Rgb(110, 110, 110),
    border: Color::Rgb(200, 200, 200),
    highlight_fg: Color::Rgb(255, 255, 255),
    highlight_bg: Color::Rgb(30, 144, 255),
    stripe_bg: Color::Rgb(221, 221, 221),
    status: Color::Rgb(0, 130, 100),
    error: Color::Rgb(190, 0, 90),
    key_fg: Color::Rgb(240, 240, 240),
    key_bg: Color::Rgb(60, 60, 60),
  },
];

/// Index of the theme called `name`, falling back to the first.
pub fn theme_index(name: Option<&str>) -> usize {
  name.and_then(|n| THEMES.iter().position(|t| t.name == n)).unwrap_or(0)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn theme_lookup_by_name() {
    assert_eq!(theme_index(Some("Paper")), 2);
    assert_eq!(theme_index(Some("missing")), 0);
    assert_eq!(theme_index(None), 0);
  }
}
