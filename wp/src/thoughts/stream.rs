//! Turn-scoped paced reveal of thought steps
//!
//! A new batch replaces the visible set and reveals steps one at a time in
//! sequence order, step *i* becoming visible `i × interval` after the batch
//! arrives. Each batch belongs to one turn, tagged with an epoch: beginning
//! a new turn aborts the previous reveal task, and the epoch check stops a
//! stale task from revealing steps even if it wins the race with the abort.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::domain::ThoughtStep;

/// Shared between the stream and its reveal task
#[derive(Debug, Default)]
struct RevealState {
    steps: Vec<ThoughtStep>,
    visible: usize,
    epoch: u64,
}

/// Paces the display of one agent turn's reasoning trace
#[derive(Debug)]
pub struct ThoughtStream {
    state: Arc<Mutex<RevealState>>,
    reveal_interval: Duration,
    processing: bool,
    epoch: u64,
    reveal_task: Option<JoinHandle<()>>,
}

impl ThoughtStream {
    pub fn new(reveal_interval: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(RevealState::default())),
            reveal_interval,
            processing: false,
            epoch: 0,
            reveal_task: None,
        }
    }

    /// Replace the visible set with a new turn's batch and start revealing
    ///
    /// Not-yet-fired reveals of the superseded turn are cancelled; a stale
    /// step must never appear after the new turn has started.
    pub fn begin_turn(&mut self, steps: Vec<ThoughtStep>) {
        self.epoch += 1;
        let epoch = self.epoch;
        debug!(epoch, step_count = steps.len(), "begin_turn: called");

        if let Some(task) = self.reveal_task.take() {
            task.abort();
        }

        {
            let mut state = self.state.lock().expect("reveal state poisoned");
            state.steps = steps;
            state.visible = 0;
            state.epoch = epoch;
        }

        let state = Arc::clone(&self.state);
        let interval = self.reveal_interval;
        self.reveal_task = Some(tokio::spawn(async move {
            // Absolute deadlines: step i fires at batch arrival + i * interval
            let start = tokio::time::Instant::now();
            for i in 0u32.. {
                tokio::time::sleep_until(start + interval * i).await;
                let mut state = state.lock().expect("reveal state poisoned");
                if state.epoch != epoch {
                    // Superseded by a newer turn
                    return;
                }
                if (i as usize) >= state.steps.len() {
                    return;
                }
                state.visible = i as usize + 1;
                if state.visible == state.steps.len() {
                    return;
                }
            }
        }));
    }

    /// Toggle the indeterminate "thinking" affordance for the turn in flight
    pub fn set_processing(&mut self, processing: bool) {
        self.processing = processing;
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    /// Steps revealed so far, in sequence order
    pub fn visible_steps(&self) -> Vec<ThoughtStep> {
        let state = self.state.lock().expect("reveal state poisoned");
        state.steps[..state.visible].to_vec()
    }

    /// True when the component should render nothing at all
    pub fn is_idle(&self) -> bool {
        if self.processing {
            return false;
        }
        let state = self.state.lock().expect("reveal state poisoned");
        state.visible == 0
    }
}

impl Drop for ThoughtStream {
    fn drop(&mut self) {
        if let Some(task) = self.reveal_task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(tag: &str, count: u32) -> Vec<ThoughtStep> {
        (1..=count)
            .map(|i| ThoughtStep::new(i, "analyze", format!("{tag}-{i}")))
            .collect()
    }

    /// Give spawned reveal tasks a chance to run without advancing time
    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_steps_reveal_on_schedule() {
        let mut stream = ThoughtStream::new(Duration::from_millis(500));
        stream.begin_turn(batch("a", 3));

        // Step 0 is visible immediately
        settle().await;
        assert_eq!(stream.visible_steps().len(), 1);

        // Not yet at the next reveal boundary
        tokio::time::advance(Duration::from_millis(499)).await;
        settle().await;
        assert_eq!(stream.visible_steps().len(), 1);

        tokio::time::advance(Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(stream.visible_steps().len(), 2);

        tokio::time::advance(Duration::from_millis(500)).await;
        settle().await;
        assert_eq!(stream.visible_steps().len(), 3);

        // Schedule exhausted; nothing more appears
        tokio::time::advance(Duration::from_secs(10)).await;
        settle().await;
        assert_eq!(stream.visible_steps().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_turn_replaces_and_cancels_previous() {
        let mut stream = ThoughtStream::new(Duration::from_millis(500));
        stream.begin_turn(batch("old", 5));

        tokio::time::advance(Duration::from_millis(1_100)).await;
        settle().await;
        assert_eq!(stream.visible_steps().len(), 3);

        // A new turn arrives before the old reveal schedule finished
        stream.begin_turn(batch("new", 2));
        settle().await;
        let visible = stream.visible_steps();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].text, "new-1");

        // No stale step from the superseded turn ever appears
        tokio::time::advance(Duration::from_secs(10)).await;
        settle().await;
        let visible = stream.visible_steps();
        assert_eq!(visible.len(), 2);
        assert!(visible.iter().all(|s| s.text.starts_with("new-")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_batch_is_idle() {
        let mut stream = ThoughtStream::new(Duration::from_millis(500));
        stream.begin_turn(Vec::new());

        tokio::time::advance(Duration::from_secs(5)).await;
        settle().await;
        assert!(stream.visible_steps().is_empty());
        assert!(stream.is_idle());
    }

    #[tokio::test(start_paused = true)]
    async fn test_processing_flag_overrides_idle() {
        let mut stream = ThoughtStream::new(Duration::from_millis(500));
        assert!(stream.is_idle());

        stream.set_processing(true);
        assert!(!stream.is_idle());
        assert!(stream.is_processing());

        stream.set_processing(false);
        assert!(stream.is_idle());
    }
}
