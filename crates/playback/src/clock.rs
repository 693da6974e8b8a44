//! The animation state machine shared by all sources.
//!
//! The clock owns no timer. Whoever drives it (the tokio runner, a test,
//! manual stepping) calls [`AnimationClock::tick`] with the tracks to move.

use std::fmt;

use crate::{track::Track, ViewerError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClockState {
    #[default]
    Idle,
    Running,
    /// Every track reached its end; waiting out the settle delay.
    Settling,
}

impl fmt::Display for ClockState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ClockState::Idle => write!(f, "idle"),
            ClockState::Running => write!(f, "running"),
            ClockState::Settling => write!(f, "settling"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// At least one track moved a frame.
    Advanced,
    /// No track could move. The clock is now settling.
    Exhausted,
    /// The clock was not running, nothing moved.
    Idle,
}

#[derive(Debug, Clone, Default)]
pub struct AnimationClock {
    state: ClockState,
    ticks: u64,
}

impl AnimationClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Running or settling, i.e. the animation still counts as playing.
    pub fn is_active(&self) -> bool {
        self.state != ClockState::Idle
    }

    /// Number of ticks that advanced a frame since the last start.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn start<'a, I>(&mut self, tracks: I) -> Result<(), ViewerError>
    where
        I: IntoIterator<Item = &'a Track>,
    {
        if self.state == ClockState::Running {
            return Ok(());
        }
        if !tracks.into_iter().any(Track::is_animatable) {
            log::warn!("Refusing to animate, no route has more than one point.");
            return Err(ViewerError::NothingToAnimate);
        }
        log::info!("Animation started.");
        self.state = ClockState::Running;
        self.ticks = 0;
        Ok(())
    }

    /// Advances every track that is not at its last frame yet.
    pub fn tick<'a, I>(&mut self, tracks: I) -> TickOutcome
    where
        I: IntoIterator<Item = &'a mut Track>,
    {
        if self.state != ClockState::Running {
            return TickOutcome::Idle;
        }
        let advanced = tracks
            .into_iter()
            .fold(false, |advanced, track| track.advance() || advanced);
        if advanced {
            self.ticks += 1;
            TickOutcome::Advanced
        } else {
            log::debug!("All tracks exhausted after {} ticks.", self.ticks);
            self.state = ClockState::Settling;
            TickOutcome::Exhausted
        }
    }

    /// Completes a natural stop. Returns whether the clock was settling.
    pub fn settle(&mut self) -> bool {
        if self.state != ClockState::Settling {
            return false;
        }
        log::info!("Animation finished.");
        self.state = ClockState::Idle;
        true
    }

    pub fn stop(&mut self) {
        if self.state != ClockState::Idle {
            log::info!("Animation stopped.");
        }
        self.state = ClockState::Idle;
    }

    /// Stops an active animation or starts an idle one.
    pub fn toggle<'a, I>(&mut self, tracks: I) -> Result<ClockState, ViewerError>
    where
        I: IntoIterator<Item = &'a Track>,
    {
        if self.is_active() {
            self.stop();
        } else {
            self.start(tracks)?;
        }
        Ok(self.state)
    }
}
