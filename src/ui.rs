use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Flex, Layout, Rect},
  style::{Modifier, Style, Stylize},
  text::{Line, Span},
  widgets::{Block, BorderType, Clear, List, ListItem, Padding, Paragraph, Wrap},
};

use crate::app::{App, AppMode};
use crate::theme::Theme;
use crate::upload::{UploadField, UploadForm};

// --- Helpers ---

/// Compute the display width of the first `n` chars (accounting for double-width CJK).
pub fn display_width(s: &str, n: usize) -> usize {
  use unicode_width::UnicodeWidthChar;
  s.chars().take(n).map(|c| c.width().unwrap_or(0)).sum()
}

/// Truncate a string to `max_width` characters, appending "…" if truncated.
fn truncate_str(s: &str, max_width: usize) -> String {
  if s.chars().count() <= max_width {
    s.to_string()
  } else {
    let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    format!("{}…", truncated)
  }
}

/// Page buttons for the pagination row, current page bracketed.
pub fn page_buttons(current: usize, total: usize) -> Vec<(String, bool)> {
  (1..=total).map(|p| if p == current { (format!("[{}]", p), true) } else { (format!(" {} ", p), false) }).collect()
}

fn centered(area: Rect, percent_x: u16, height: u16) -> Rect {
  let [area] = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center).areas(area);
  let [area] = Layout::vertical([Constraint::Length(height)]).flex(Flex::Center).areas(area);
  area
}

fn rounded(theme: &Theme, focused: bool) -> Block<'static> {
  let color = if focused { theme.accent } else { theme.border };
  Block::bordered().border_type(BorderType::Rounded).border_style(Style::default().fg(color))
}

// --- UI Rendering ---

pub fn ui(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();

  frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), frame.area());

  let [header_area, main_area, status_area, input_area, footer_area] = Layout::vertical([
    Constraint::Length(1),
    Constraint::Min(8),
    Constraint::Length(1),
    Constraint::Length(3),
    Constraint::Length(1),
  ])
  .areas(frame.area());

  render_header(frame, theme, header_area);

  let [list_area, player_area] =
    Layout::horizontal([Constraint::Percentage(34), Constraint::Percentage(66)]).areas(main_area);
  render_titles(frame, app, list_area);
  render_player(frame, app, player_area);

  render_status(frame, app, status_area);
  render_input(frame, app, input_area);
  render_footer(frame, app, footer_area);

  let full = frame.area();
  if let Some(form) = &app.upload {
    render_upload(frame, theme, form, full);
  }
}

fn render_header(frame: &mut Frame, theme: &Theme, area: Rect) {
  let left = Line::from(Span::styled(" ▶ Clip Cast ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)));
  frame.render_widget(left, area);

  let version = format!("v{} ", env!("CARGO_PKG_VERSION"));
  let right = Line::from(Span::styled(&version, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(version.len() as u16), width: version.len() as u16, ..area };
  frame.render_widget(right, right_area);
}

fn render_titles(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let block = rounded(theme, app.mode == AppMode::Titles)
    .title(" Titles ")
    .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD));

  let [list_area, pages_area] = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(block.inner(area));
  frame.render_widget(block, area);

  let slice = app.page_slice();
  let total_pages = slice.total_pages;
  if slice.items.is_empty() {
    let empty = Paragraph::new(Line::from(Span::styled("No videos available", Style::default().fg(theme.muted))))
      .alignment(Alignment::Center);
    frame.render_widget(empty, list_area);
    return;
  }

  // Minus 2 chars for the highlight symbol ("▶ ")
  let inner_w = list_area.width.saturating_sub(2) as usize;
  let items: Vec<ListItem> = slice
    .items
    .iter()
    .enumerate()
    .map(|(i, video)| {
      let playing = app.catalog.is_current(video);
      let (fg, bg) = if playing {
        (theme.highlight_fg, theme.highlight_bg)
      } else if i % 2 == 1 {
        (theme.fg, theme.stripe_bg)
      } else {
        (theme.fg, theme.bg)
      };
      ListItem::new(Line::from(Span::styled(truncate_str(&video.name, inner_w), Style::default().fg(fg)))).bg(bg)
    })
    .collect();

  let list = List::new(items)
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().add_modifier(Modifier::BOLD))
    .highlight_spacing(ratatui::widgets::HighlightSpacing::Always);
  frame.render_stateful_widget(list, list_area, &mut app.list_state);

  let current = app.catalog.current_page();
  let spans: Vec<Span> = page_buttons(current, total_pages)
    .into_iter()
    .map(|(label, active)| {
      if active {
        Span::styled(label, Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg))
      } else {
        Span::styled(label, Style::default().fg(theme.muted))
      }
    })
    .collect();
  frame.render_widget(Paragraph::new(Line::from(spans)).alignment(Alignment::Center), pages_area);
}

fn render_player(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let title = Line::from(vec![
    Span::styled(" Videos ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
    Span::styled(if app.player.is_playing() { "[playing] " } else { "" }, Style::default().fg(theme.muted)),
  ]);
  let block = rounded(theme, false).title(title).padding(Padding::horizontal(1));

  let Some(source) = app.player.source() else {
    frame.render_widget(block, area);
    return;
  };

  let inner_w = area.width.saturating_sub(4) as usize;
  let mut lines = vec![
    Line::from(""),
    Line::from(Span::styled(
      truncate_str(&source.title, inner_w),
      Style::default().fg(theme.fg).add_modifier(Modifier::BOLD),
    )),
    Line::from(""),
  ];
  if !source.description.is_empty() {
    lines.push(Line::from(Span::styled(source.description.as_str(), Style::default().fg(theme.fg))));
    lines.push(Line::from(""));
  }
  lines.push(Line::from(Span::styled(
    truncate_str(&source.src, inner_w),
    Style::default().fg(theme.accent).add_modifier(Modifier::UNDERLINED),
  )));
  lines.push(Line::from(""));
  let hint = if app.player.is_playing() { "^s to stop" } else { "Space to play" };
  lines.push(Line::from(Span::styled(hint, Style::default().fg(theme.muted))));

  frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }).block(block), area);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let (text, style) = if app.is_fetching() {
    let msg = app.status_message.as_deref().unwrap_or("Loading…");
    (format!(" ⏳ {}", msg), Style::default().fg(theme.status))
  } else if let Some(err) = &app.last_error {
    (format!(" ⚠  {}", err), Style::default().fg(theme.error))
  } else if let Some(status) = app.player.last_status() {
    (format!(" ♪ {}", status), Style::default().fg(theme.status))
  } else {
    let count = app.catalog.videos().len();
    (format!(" {} videos", count), Style::default().fg(theme.muted))
  };
  frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_input(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let focused = app.mode == AppMode::Input;
  let border_color = if focused { theme.accent } else { theme.border };
  let input_block = rounded(theme, focused)
    .title(" Search ")
    .title_style(Style::default().fg(border_color))
    .padding(Padding::horizontal(1));

  if app.input.is_empty() {
    let placeholder = Paragraph::new("Search videos...").style(Style::default().fg(theme.muted)).block(input_block);
    frame.render_widget(placeholder, area);
    if focused {
      frame.set_cursor_position((area.x + 2, area.y + 1));
    }
    return;
  }

  let inner_w = area.width.saturating_sub(4) as usize;
  let cursor_col = display_width(&app.input, app.cursor_position);

  if cursor_col < app.input_scroll {
    app.input_scroll = cursor_col;
  } else if cursor_col >= app.input_scroll + inner_w {
    app.input_scroll = cursor_col.saturating_sub(inner_w) + 1;
  }

  let visible: String = app
    .input
    .chars()
    .scan(0usize, |col, c| {
      let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
      let start = *col;
      *col += w;
      Some((start, *col, c))
    })
    .skip_while(|(_, end, _)| *end <= app.input_scroll)
    .take_while(|(start, _, _)| *start < app.input_scroll + inner_w)
    .map(|(_, _, c)| c)
    .collect();

  let paragraph = Paragraph::new(visible).style(Style::default().fg(theme.fg)).block(input_block);
  frame.render_widget(paragraph, area);

  if focused {
    let cursor_x = area.x + 2 + (cursor_col - app.input_scroll) as u16;
    frame.set_cursor_position((cursor_x, area.y + 1));
  }
}

fn render_upload(frame: &mut Frame, theme: &Theme, form: &UploadForm, area: Rect) {
  let modal = centered(area, 60, 17);
  frame.render_widget(Clear, modal);

  let block = rounded(theme, true)
    .title(" Upload Video ")
    .title_alignment(Alignment::Center)
    .title_style(Style::default().fg(theme.fg).add_modifier(Modifier::BOLD))
    .style(Style::default().bg(theme.bg))
    .padding(Padding::horizontal(1));
  let inner = block.inner(modal);
  frame.render_widget(block, modal);

  let [title_area, desc_area, file_area, label_area, message_area] = Layout::vertical([
    Constraint::Length(3),
    Constraint::Length(5),
    Constraint::Length(3),
    Constraint::Length(1),
    Constraint::Min(1),
  ])
  .areas(inner);

  let field = |name: &'static str, which: UploadField, text: &str| {
    Paragraph::new(text.to_string())
      .style(Style::default().fg(theme.fg))
      .wrap(Wrap { trim: false })
      .block(rounded(theme, form.focus == which).title(format!(" {} ", name)))
  };
  frame.render_widget(field("Title", UploadField::Title, &form.title), title_area);
  frame.render_widget(field("Description", UploadField::Description, &form.description), desc_area);
  frame.render_widget(field("Video path", UploadField::File, &form.path_input), file_area);

  let label_color = if form.file.is_some() { theme.accent } else { theme.muted };
  frame.render_widget(
    Paragraph::new(Span::styled(form.label.as_str(), Style::default().fg(label_color))).alignment(Alignment::Center),
    label_area,
  );

  let (text, color) = if form.is_submitting() {
    ("Uploading…".to_string(), theme.status)
  } else if let Some(msg) = &form.message {
    (msg.clone(), theme.error)
  } else {
    ("Enter on Video path to upload · Esc to close".to_string(), theme.muted)
  };
  frame.render_widget(
    Paragraph::new(Span::styled(text, Style::default().fg(color))).alignment(Alignment::Center).wrap(Wrap { trim: true }),
    message_area,
  );
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let is_playing = app.player.is_playing();
  let keys: Vec<(&str, &str)> = match app.mode {
    AppMode::Input => {
      let mut k = vec![("Enter", "Search"), ("^u", "Upload"), ("^r", "Refresh")];
      if !app.catalog.videos().is_empty() {
        k.push(("Tab", "Titles"));
      }
      k.push(("^t", "Theme"));
      k.push(("Esc", if app.input.is_empty() { "Quit" } else { "Clear" }));
      k
    }
    AppMode::Titles => {
      let mut k = vec![("Enter", "Select"), ("Space", "Play"), ("j/k", "Move"), ("h/l", "Page")];
      if is_playing {
        k.push(("^s", "Stop"));
      }
      k.push(("^u", "Upload"));
      k.push(("Esc", "Search"));
      k
    }
    AppMode::Upload if app.is_uploading() => vec![("Esc", "Close (upload continues)")],
    AppMode::Upload => vec![("Tab", "Next field"), ("Enter", "Upload"), ("Esc", "Close")],
  };

  let spans: Vec<Span> = keys
    .iter()
    .enumerate()
    .flat_map(|(i, (key, action))| {
      let mut s = vec![
        Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(format!(" {} ", action), Style::default().fg(theme.muted)),
      ];
      if i < keys.len() - 1 {
        s.push(Span::raw("  "));
      }
      s
    })
    .collect();

  frame.render_widget(Line::from(spans), area);

  let theme_label = format!("{} ", theme.name);
  let right = Line::from(Span::styled(&theme_label, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(theme_label.len() as u16), width: theme_label.len() as u16, ..area };
  frame.render_widget(right, right_area);
}
