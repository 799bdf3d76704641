use anyhow::{Context, Result, anyhow};
use std::process::Stdio;
use tokio::{
  io::{AsyncBufReadExt, BufReader as TokioBufReader},
  process::{Child as TokioChild, Command},
  sync::mpsc,
  task::JoinHandle,
};
use tracing::{debug, info};

/// How the media surface is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerOptions {
  pub autoplay: bool,
  pub controls: bool,
  /// mpv `--autofit-larger` geometry; `None` uses the video's native size.
  pub autofit: Option<String>,
}

impl Default for PlayerOptions {
  fn default() -> Self {
    Self { autoplay: false, controls: true, autofit: Some(crate::constants::constants().player_autofit.clone()) }
  }
}

/// What the pane is showing: the resolved stream plus the text around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSource {
  pub src: String,
  pub title: String,
  pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
  /// mpv was spawned and is opening `src`.
  Ready { src: String, pid: Option<u32> },
  /// A status line printed by mpv.
  Status(String),
}

pub struct VideoPlayer {
  pub options: PlayerOptions,
  source: Option<PlaybackSource>,
  current_process: Option<TokioChild>,
  monitor_handle: Option<JoinHandle<()>>,
  events_tx: mpsc::UnboundedSender<PlayerEvent>,
  events_rx: mpsc::UnboundedReceiver<PlayerEvent>,
  last_status: Option<String>,
}

impl VideoPlayer {
  pub fn new(options: PlayerOptions) -> Self {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    Self {
      options,
      source: None,
      current_process: None,
      monitor_handle: None,
      events_tx,
      events_rx,
      last_status: None,
    }
  }

  pub fn source(&self) -> Option<&PlaybackSource> {
    self.source.as_ref()
  }

  pub fn is_playing(&self) -> bool {
    self.current_process.is_some()
  }

  pub fn last_status(&self) -> Option<&str> {
    self.last_status.as_deref()
  }

  /// Show `source` in the pane. Playback only starts here when autoplay is on.
  pub async fn load(&mut self, source: Option<PlaybackSource>) -> Result<()> {
    if self.source == source {
      return Ok(());
    }
    self.stop().await?;
    self.source = source;
    if self.options.autoplay && self.source.is_some() {
      self.play().await?;
    }
    Ok(())
  }

  /// mpv arguments for the loaded source.
  fn mpv_args(&self, src: &str) -> Vec<String> {
    let mut args = vec!["--force-window=yes".to_string(), "--keep-open=no".to_string()];
    args.push(format!("--osc={}", if self.options.controls { "yes" } else { "no" }));
    if let Some(ref geometry) = self.options.autofit {
      args.push(format!("--autofit-larger={}", geometry));
    }
    args.push("--term-status-msg=Time: ${time-pos/full} / ${duration/full} | ${pause} ${percent-pos}%".to_string());
    args.push("--".to_string());
    args.push(src.to_string());
    args
  }

  /// Start playing the loaded source in an mpv window.
  pub async fn play(&mut self) -> Result<()> {
    let Some(source) = self.source.clone() else {
      return Ok(());
    };
    self.stop_process().await.context("Failed to stop previous playback")?;

    let mut cmd = Command::new("mpv");
    cmd.args(self.mpv_args(&source.src));
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    // Send stderr to null — if piped but never drained, the pipe buffer
    // fills and mpv blocks.
    cmd.stderr(Stdio::null());
    cmd.kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|e| {
      if e.kind() == std::io::ErrorKind::NotFound {
        anyhow!("mpv not found. Install it with: brew install mpv (macOS) or apt install mpv (Linux)")
      } else {
        anyhow!(e).context("Failed to spawn mpv process")
      }
    })?;

    let stdout = child.stdout.take().context("Failed to get mpv stdout")?;
    let tx = self.events_tx.clone();
    let _ = tx.send(PlayerEvent::Ready { src: source.src.clone(), pid: child.id() });

    let monitor_handle = tokio::spawn(async move {
      let reader = TokioBufReader::new(stdout);
      let mut lines = reader.lines();
      while let Ok(Some(line)) = lines.next_line().await {
        if tx.send(PlayerEvent::Status(line)).is_err() {
          break;
        }
      }
    });

    info!(src = %source.src, "mpv started");
    self.current_process = Some(child);
    self.monitor_handle = Some(monitor_handle);
    Ok(())
  }

  /// Drain player events. `Ready` events are handed back to the caller;
  /// status lines are kept for the status bar. Also notices when mpv exits.
  pub fn poll_events(&mut self) -> Vec<PlayerEvent> {
    let mut ready = Vec::new();
    while let Ok(event) = self.events_rx.try_recv() {
      match event {
        PlayerEvent::Status(line) => self.last_status = Some(line),
        other => ready.push(other),
      }
    }
    if let Some(child) = self.current_process.as_mut()
      && let Ok(Some(status)) = child.try_wait()
    {
      debug!(%status, "mpv exited");
      self.current_process = None;
      self.last_status = None;
      if let Some(handle) = self.monitor_handle.take() {
        handle.abort();
      }
    }
    ready
  }

  async fn stop_process(&mut self) -> Result<()> {
    if let Some(handle) = self.monitor_handle.take() {
      handle.abort();
      let _ = handle.await;
    }
    self.last_status = None;

    if let Some(mut child) = self.current_process.take() {
      child.kill().await.context("Failed to kill mpv process")?;
      let _ = child.wait().await;
    }
    Ok(())
  }

  /// Stop playback, keeping the loaded source in the pane.
  pub async fn stop(&mut self) -> Result<()> {
    self.stop_process().await
  }
}
