//! # Incremental Reveal
//!
//! Typewriter animation for bot replies. [`Typewriter`] is the pure part:
//! a growing prefix of the reply text. [`RevealTimer`] is the scheduled
//! task that drives it: a tokio interval that calls back until told to
//! stop, and is aborted when cancelled or dropped.
//!
//! Only one reveal runs at a time. It belongs to the most recently added
//! bot message; every other message renders its full text.

use std::time::Duration;

use log::debug;
use tokio::task::AbortHandle;

use crate::core::message::MessageId;

/// Delay between revealed characters.
pub const DEFAULT_REVEAL_INTERVAL: Duration = Duration::from_millis(15);

/// A progressively longer prefix of `text`.
#[derive(Debug, Clone, PartialEq)]
pub struct Typewriter {
    text: String,
    /// Byte offset of the end of the visible prefix (always a char boundary).
    shown: usize,
}

impl Typewriter {
    /// With `animate == false` the whole text is visible from the start.
    pub fn new(text: &str, animate: bool) -> Self {
        Self {
            text: text.to_string(),
            shown: if animate { 0 } else { text.len() },
        }
    }

    pub fn visible(&self) -> &str {
        &self.text[..self.shown]
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_complete(&self) -> bool {
        self.shown >= self.text.len()
    }

    /// Reveals one more character. Returns false once the text is complete.
    pub fn tick(&mut self) -> bool {
        match self.text[self.shown..].chars().next() {
            Some(c) => {
                self.shown += c.len_utf8();
                true
            }
            None => false,
        }
    }

    pub fn finish(&mut self) {
        self.shown = self.text.len();
    }
}

/// The reveal of one specific message.
#[derive(Debug, Clone, PartialEq)]
pub struct Reveal {
    pub message_id: MessageId,
    pub typewriter: Typewriter,
}

impl Reveal {
    pub fn new(message_id: MessageId, text: &str, animate: bool) -> Self {
        Self {
            message_id,
            typewriter: Typewriter::new(text, animate),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.typewriter.is_complete()
    }
}

/// Cancellable repeating task that drives a reveal.
///
/// The task stops on its own when `on_tick` returns false. It is aborted on
/// [`cancel`](Self::cancel) or drop, so no callback runs after teardown.
pub struct RevealTimer {
    handle: AbortHandle,
}

impl RevealTimer {
    /// Spawns the timer on the current tokio runtime.
    pub fn start<F>(interval: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick of a tokio interval completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if !on_tick() {
                    debug!("Reveal timer stopped by callback");
                    break;
                }
            }
        });
        Self {
            handle: task.abort_handle(),
        }
    }

    pub fn cancel(self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for RevealTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_animated_reveal_grows_one_char_at_a_time() {
        let mut tw = Typewriter::new("abc", true);
        let mut frames = vec![tw.visible().to_string()];
        while tw.tick() {
            frames.push(tw.visible().to_string());
        }
        assert_eq!(frames, ["", "a", "ab", "abc"]);
        assert!(tw.is_complete());
        assert!(!tw.tick());
    }

    #[test]
    fn test_prefixes_strictly_increase_and_end_at_full_text() {
        let text = "Here are some options:\n1. A\n2. B";
        let mut tw = Typewriter::new(text, true);
        let mut prev_len = tw.visible().len();
        while tw.tick() {
            let visible = tw.visible();
            assert!(visible.len() > prev_len);
            assert!(text.starts_with(visible));
            prev_len = visible.len();
        }
        assert_eq!(tw.visible(), text);
    }

    #[test]
    fn test_static_reveal_shows_full_text_immediately() {
        let tw = Typewriter::new("no animation", false);
        assert_eq!(tw.visible(), "no animation");
        assert!(tw.is_complete());
    }

    #[test]
    fn test_multibyte_characters_are_revealed_whole() {
        let mut tw = Typewriter::new("₹5 🛍️", true);
        tw.tick();
        assert_eq!(tw.visible(), "₹");
        tw.tick();
        tw.tick();
        tw.tick();
        assert_eq!(tw.visible(), "₹5 🛍");
        tw.finish();
        assert_eq!(tw.visible(), "₹5 🛍️");
    }

    #[test]
    fn test_empty_text_is_complete() {
        let tw = Typewriter::new("", true);
        assert!(tw.is_complete());
        assert_eq!(tw.visible(), "");
    }

    #[tokio::test]
    async fn test_timer_ticks_until_callback_returns_false() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let timer = RevealTimer::start(Duration::from_millis(1), move || {
            counter.fetch_add(1, Ordering::SeqCst) + 1 < 3
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(timer.is_finished());
    }

    #[tokio::test]
    async fn test_dropped_timer_stops_ticking() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let timer = RevealTimer::start(Duration::from_millis(1), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        timer.cancel();
        // Let the abort land before sampling.
        tokio::time::sleep(Duration::from_millis(5)).await;
        let after_cancel = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(count.load(Ordering::SeqCst), after_cancel);
    }
}
