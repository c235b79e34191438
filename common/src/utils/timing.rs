// Copyright (c) 2026 Ipfold and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

use std::time::Instant;

use crate::verbose;

/// Tracks the three phases of a run: reading the inputs, computing the
/// result, and writing it out.
pub struct StageTimer {
    started: Instant,
    loaded: Option<Instant>,
    computed: Option<Instant>,
}

impl StageTimer {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            loaded: None,
            computed: None,
        }
    }

    /// All input sources have been read.
    pub fn mark_loaded(&mut self) {
        self.loaded = Some(Instant::now());
    }

    /// The result has been computed; anything after this is output.
    pub fn mark_computed(&mut self) {
        self.computed = Some(Instant::now());
    }

    /// Log the per-stage breakdown. Stages that were never marked collapse
    /// into their neighbours instead of being reported as zero.
    pub fn report(&self) {
        let stop = Instant::now();
        let loaded = self.loaded.unwrap_or(self.started);
        let computed = self.computed.unwrap_or(loaded);

        verbose!(
            "completed in {:.5} seconds (read {:.5} + think {:.5} + speak {:.5})",
            (stop - self.started).as_secs_f64(),
            (loaded - self.started).as_secs_f64(),
            (computed - loaded).as_secs_f64(),
            (stop - computed).as_secs_f64(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_are_monotonic() {
        let mut timer = StageTimer::start();
        timer.mark_loaded();
        timer.mark_computed();
        let loaded = timer.loaded.unwrap();
        let computed = timer.computed.unwrap();
        assert!(timer.started <= loaded);
        assert!(loaded <= computed);
    }
}
