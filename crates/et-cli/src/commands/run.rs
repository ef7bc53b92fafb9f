//! The `et run` session loop.
//!
//! Host events arrive as JSON lines (see [`HostMessage`]). Events, redraw
//! ticks, auto-save ticks and shutdown are multiplexed on one task, and each
//! is handled to completion before the next is looked at.

use std::future::Future;
use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::time::Instant;

use et_core::{KeyValueStore, Persistence};

use crate::commands::util::now_ms;
use crate::config::Config;
use crate::session::{HostEvent, HostMessage, Session};
use crate::ticker::Ticker;

/// Session time source.
///
/// A message with an `at` timestamp sets the time for that event and anchors
/// the clock: until the next message, time runs on from the host's value.
/// A message without `at` goes back to the wall clock.
#[derive(Debug, Default)]
struct Clock {
    anchor: Option<(i64, Instant)>,
}

impl Clock {
    fn observe(&mut self, at: Option<i64>) -> i64 {
        match at {
            Some(at) => {
                self.anchor = Some((at, Instant::now()));
                at
            }
            None => {
                self.anchor = None;
                now_ms()
            }
        }
    }

    fn now(&self) -> i64 {
        self.anchor.map_or_else(now_ms, |(at, since)| {
            let elapsed = i64::try_from(since.elapsed().as_millis()).unwrap_or(i64::MAX);
            at.saturating_add(elapsed)
        })
    }
}

/// Runs a session on stdin, drawing the status line to stderr, until input
/// ends or Ctrl-C.
pub async fn run<S: KeyValueStore>(config: &Config, persistence: Persistence<S>) {
    let reader = BufReader::new(tokio::io::stdin());
    let mut stderr = std::io::stderr();
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    run_with(config, persistence, reader, &mut stderr, shutdown).await;
}

/// Runs a session over arbitrary input and output.
///
/// Returns the persistence layer after the final save, which happens however
/// the loop ends.
pub async fn run_with<R, W, S, F>(
    config: &Config,
    persistence: Persistence<S>,
    reader: R,
    writer: &mut W,
    shutdown: F,
) -> Persistence<S>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    S: KeyValueStore,
    F: Future<Output = ()>,
{
    let mut session = Session::new(persistence, config.resume_on_include);
    let mut clock = Clock::default();
    let mut redraw = Ticker::new(config.tick_interval());
    let mut autosave = Ticker::new(config.autosave_interval());
    redraw.start();
    autosave.start();

    let mut lines = reader.lines();
    tokio::pin!(shutdown);

    tracing::info!("session started");
    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    let Some(message) = parse_line(&line) else {
                        continue;
                    };
                    let now = clock.observe(message.at);
                    match message.event {
                        HostEvent::Hide => redraw.stop(),
                        HostEvent::Show => {
                            redraw.start();
                            draw(writer, &mut redraw, &session.status_line(now));
                        }
                        _ => {}
                    }
                    session.handle(&message.event, now);
                }
                Ok(None) => {
                    tracing::debug!("input closed");
                    break;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to read input");
                    break;
                }
            },
            () = redraw.tick() => {
                draw(writer, &mut redraw, &session.status_line(clock.now()));
            }
            () = autosave.tick() => {
                if session.save(clock.now()) {
                    tracing::debug!("auto-saved");
                }
            }
            () = &mut shutdown => {
                tracing::info!("shutdown requested");
                break;
            }
        }
    }

    redraw.stop();
    autosave.stop();
    let persistence = session.shutdown(clock.now());
    tracing::info!("session ended");
    persistence
}

/// Writes one status line. A failing writer stops redraws until the next
/// `show`.
fn draw<W: Write>(writer: &mut W, redraw: &mut Ticker, status: &str) {
    if let Err(e) = writeln!(writer, "{status}") {
        tracing::warn!(error = %e, "failed to draw status line, redraw stopped");
        redraw.stop();
    }
}

fn parse_line(line: &str) -> Option<HostMessage> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match serde_json::from_str(line) {
        Ok(message) => Some(message),
        Err(e) => {
            tracing::warn!(error = %e, line, "ignoring invalid host event");
            None
        }
    }
}
