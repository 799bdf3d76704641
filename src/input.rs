use anyhow::{Context, Result};
use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};

use crate::app::{App, AppMode};
use crate::upload::UploadField;

// --- Helpers ---

/// Convert a char index to a byte offset within the string.
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
  s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

// --- Event Handling ---

pub async fn handle_key_event(app: &mut App, key: event::KeyEvent) -> Result<()> {
  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
    app.should_quit = true;
    return Ok(());
  }

  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('t') {
    app.next_theme();
    return Ok(());
  }

  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
    if app.player.is_playing() {
      app.player.stop().await.context("Failed to stop playback")?;
    }
    return Ok(());
  }

  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('r') {
    app.clear_error();
    app.load_catalog();
    return Ok(());
  }

  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('u') {
    app.open_upload();
    return Ok(());
  }

  match app.mode {
    AppMode::Input => handle_input_key(app, key),
    AppMode::Titles => handle_titles_key(app, key).await,
    AppMode::Upload => handle_upload_key(app, key),
  }
  Ok(())
}

fn handle_input_key(app: &mut App, key: event::KeyEvent) {
  app.clear_error();
  let before = app.input.clone();
  match key.code {
    KeyCode::Enter => {
      app.submit_query_now();
    }
    KeyCode::Char(c) => {
      let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
      app.input.insert(byte_idx, c);
      app.cursor_position += 1;
    }
    KeyCode::Backspace => {
      if app.cursor_position > 0 {
        app.cursor_position -= 1;
        let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
        app.input.remove(byte_idx);
      }
    }
    KeyCode::Delete => {
      if app.cursor_position < app.input.chars().count() {
        let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
        app.input.remove(byte_idx);
      }
    }
    KeyCode::Left => {
      app.cursor_position = app.cursor_position.saturating_sub(1);
    }
    KeyCode::Right => {
      if app.cursor_position < app.input.chars().count() {
        app.cursor_position += 1;
      }
    }
    KeyCode::Home => {
      app.cursor_position = 0;
    }
    KeyCode::End => {
      app.cursor_position = app.input.chars().count();
    }
    KeyCode::Esc => {
      if !app.input.is_empty() {
        app.input.clear();
        app.cursor_position = 0;
        app.input_scroll = 0;
      } else if !app.catalog.videos().is_empty() {
        app.mode = AppMode::Titles;
      } else {
        app.should_quit = true;
      }
    }
    KeyCode::Down | KeyCode::Tab => {
      if !app.catalog.videos().is_empty() {
        app.mode = AppMode::Titles;
      }
    }
    _ => {}
  }
  if app.input != before {
    app.on_query_edited();
  }
}

/// Pages the list pane offers: `1..=total_pages`.
fn page_exists(app: &App, page: usize) -> bool {
  page >= 1 && page <= app.catalog.total_pages()
}

async fn handle_titles_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Enter => {
      if let Some(video) = app.cursor_video().cloned() {
        app.select_video(video);
      }
    }
    KeyCode::Char(' ') | KeyCode::Char('p') => {
      if app.player.source().is_some() {
        app.play_current().await;
      }
    }
    KeyCode::Down | KeyCode::Char('j') => {
      let count = app.page_slice().items.len();
      if count > 0 {
        let i = app.list_state.selected().map_or(0, |i| (i + 1) % count);
        app.list_state.select(Some(i));
      }
    }
    KeyCode::Up | KeyCode::Char('k') => {
      let count = app.page_slice().items.len();
      if count > 0 {
        let i =
          app.list_state.selected().map_or(0, |i| if i == 0 { count.saturating_sub(1) } else { i.saturating_sub(1) });
        app.list_state.select(Some(i));
      }
    }
    KeyCode::Right | KeyCode::Char('l') | KeyCode::PageDown => {
      let next = app.catalog.current_page() + 1;
      if page_exists(app, next) {
        app.set_page(next);
      }
    }
    KeyCode::Left | KeyCode::Char('h') | KeyCode::PageUp => {
      let prev = app.catalog.current_page().saturating_sub(1);
      if page_exists(app, prev) {
        app.set_page(prev);
      }
    }
    KeyCode::Char(c @ '1'..='9') => {
      let page = c as usize - '0' as usize;
      if page_exists(app, page) {
        app.set_page(page);
      }
    }
    KeyCode::Esc | KeyCode::Tab | KeyCode::Char('/') => {
      app.mode = AppMode::Input;
    }
    _ => {}
  }
}

fn handle_upload_key(app: &mut App, key: event::KeyEvent) {
  let Some(form) = app.upload.as_mut() else {
    app.mode = AppMode::Input;
    return;
  };
  match key.code {
    KeyCode::Esc => {
      app.close_upload(false);
    }
    KeyCode::Tab | KeyCode::Down => {
      form.focus = form.focus.next();
    }
    KeyCode::BackTab | KeyCode::Up => {
      form.focus = form.focus.prev();
    }
    KeyCode::Enter => match form.focus {
      UploadField::Title | UploadField::Description => {
        form.focus = form.focus.next();
      }
      UploadField::File => {
        let typed = form.path_input.trim();
        let already_selected = form.file.as_deref().is_some_and(|f| f.as_os_str() == typed);
        if !typed.is_empty()
          && !already_selected
          && let Err(msg) = form.select_typed_file()
        {
          form.message = Some(msg);
          return;
        }
        app.submit_upload();
      }
    },
    KeyCode::Backspace => {
      if !form.is_submitting() {
        form.focused_text_mut().pop();
      }
    }
    KeyCode::Char(c) => {
      if !form.is_submitting() {
        form.focused_text_mut().push(c);
      }
    }
    _ => {}
  }
}
