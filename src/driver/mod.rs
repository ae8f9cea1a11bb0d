//! Drill driver
//!
//! Connects a session to the outside world through two narrow seams:
//! a `Renderer` that owns all presentation (and the per-item handles),
//! and an `InputSource` that yields raw learner input.
//!
//! Each keystroke is applied to the session synchronously before any
//! presentation delay starts, so timers never touch session state.

pub mod input;
pub mod simulate;
pub mod terminal;

use anyhow::Result;
use std::future::Future;
use std::pin::{pin, Pin};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::DrillConfig;
use crate::exercise::Exercise;
use crate::fretboard::NoteToken;
use crate::session::{Session, SessionSummary};

/// Number of positions listed in the end-of-session summary
pub const SUMMARY_TOP: usize = 5;

/// Presentation state of a quiz item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemMark {
    Current,
    Correct,
    Incorrect,
}

/// Presentation side of the drill
pub trait Renderer {
    /// Opaque per-item reference, created and interpreted only by the renderer
    type Handle;

    /// Lay out a fresh exercise, attaching a handle to every item
    fn render_exercise(&mut self, exercise: &mut Exercise<Self::Handle>) -> Result<()>;

    fn mark(&mut self, handle: &Self::Handle, mark: ItemMark) -> Result<()>;

    /// Briefly show the learner's raw input on an item
    fn flash(&mut self, handle: &Self::Handle, token: &NoteToken) -> Result<()>;

    fn clear_flash(&mut self, handle: &Self::Handle) -> Result<()>;

    /// Draw pending updates
    fn refresh(&mut self) -> Result<()>;

    fn finish(&mut self, summary: &SessionSummary) -> Result<()>;
}

/// Source of raw learner input
#[allow(async_fn_in_trait)]
pub trait InputSource {
    /// Next chunk of input, `None` once input is exhausted
    async fn next_input(&mut self) -> Result<Option<String>>;
}

pub struct Driver<R: Renderer, I: InputSource> {
    session: Session<R::Handle>,
    renderer: R,
    input: I,
    flash_delay: Duration,
    restart_delay: Duration,
}

impl<R: Renderer, I: InputSource> Driver<R, I> {
    pub fn new(session: Session<R::Handle>, renderer: R, input: I, config: &DrillConfig) -> Self {
        Self {
            session,
            renderer,
            input,
            flash_delay: config.flash_delay(),
            restart_delay: config.restart_delay(),
        }
    }

    pub fn session(&self) -> &Session<R::Handle> {
        &self.session
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Run until input is exhausted or Ctrl+C, then report the session
    pub async fn run(self) -> Result<SessionSummary> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Ctrl+C listener unavailable: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run until input is exhausted or `shutdown` resolves
    ///
    /// `shutdown` is polled across input reads and presentation delays alike.
    pub async fn run_until<F: Future<Output = ()>>(
        mut self,
        shutdown: F,
    ) -> Result<SessionSummary> {
        let mut shutdown = pin!(shutdown);
        self.present()?;

        'drill: loop {
            let chunk = tokio::select! {
                chunk = self.input.next_input() => chunk?,
                _ = shutdown.as_mut() => {
                    info!("Interrupted, ending session");
                    None
                }
            };
            let Some(chunk) = chunk else {
                break;
            };

            for token in input::tokens_in(&chunk) {
                if !self.handle_token(token, shutdown.as_mut()).await? {
                    break 'drill;
                }
            }
        }

        let summary = self.session.summary(SUMMARY_TOP);
        self.renderer.finish(&summary)?;
        Ok(summary)
    }

    /// Apply one answer and play out its presentation delays
    ///
    /// Returns `false` if `shutdown` resolved during a delay.
    async fn handle_token<F: Future<Output = ()>>(
        &mut self,
        token: NoteToken,
        mut shutdown: Pin<&mut F>,
    ) -> Result<bool> {
        let outcome = self.session.answer(&token)?;

        let mark = if outcome.correct {
            ItemMark::Correct
        } else {
            ItemMark::Incorrect
        };
        if let Some(handle) = handle_at(&self.session, outcome.item_index) {
            self.renderer.mark(handle, mark)?;
            self.renderer.flash(handle, &token)?;
        }
        self.renderer.refresh()?;

        if !pause(self.flash_delay, shutdown.as_mut()).await {
            return Ok(false);
        }
        if let Some(handle) = handle_at(&self.session, outcome.item_index) {
            self.renderer.clear_flash(handle)?;
        }

        if outcome.completed() {
            self.renderer.refresh()?;
            let wait = self.restart_wait();
            debug!("Waiting {:?} before next exercise", wait);
            if !pause(wait, shutdown).await {
                return Ok(false);
            }
            self.session.restart();
            self.present()?;
        } else {
            self.mark_current()?;
            self.renderer.refresh()?;
        }
        Ok(true)
    }

    /// Time left after the flash before the next exercise appears
    fn restart_wait(&self) -> Duration {
        self.restart_delay.saturating_sub(self.flash_delay)
    }

    fn present(&mut self) -> Result<()> {
        self.renderer.render_exercise(self.session.exercise_mut())?;
        self.mark_current()?;
        self.renderer.refresh()
    }

    fn mark_current(&mut self) -> Result<()> {
        if let Some(handle) = self.session.current_item().and_then(|i| i.handle.as_ref()) {
            self.renderer.mark(handle, ItemMark::Current)?;
        }
        Ok(())
    }
}

/// Sleep for `delay`, returning `false` if `shutdown` resolves first
async fn pause<F: Future<Output = ()>>(delay: Duration, shutdown: Pin<&mut F>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(delay) => true,
        _ = shutdown => {
            info!("Interrupted, ending session");
            false
        }
    }
}

fn handle_at<H>(session: &Session<H>, index: usize) -> Option<&H> {
    session
        .exercise()
        .get(index)
        .and_then(|item| item.handle.as_ref())
}
