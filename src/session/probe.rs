use std::future::Future;
use std::time::Duration;

use crate::config::Timings;
use crate::error::ChannelError;
use crate::host::PageProbe;
use crate::models::{MediaSnapshot, TabId};

const ENABLE_LOGS: bool = true;

use crate::log_debug;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    /// Wait after an answer that was not yet conclusive.
    pub backoff_after_response: Duration,
    /// Wait after the attempt itself failed.
    pub backoff_after_error: Duration,
}

impl RetryPolicy {
    pub fn from_timings(timings: &Timings) -> Self {
        Self {
            attempts: timings.probe_attempts.max(1),
            backoff_after_response: timings.probe_backoff_after_response,
            backoff_after_error: timings.probe_backoff_after_error,
        }
    }
}

/// Run `attempt` up to `policy.attempts` times. Stops early on the first
/// answer `is_conclusive` accepts; otherwise the last outcome is returned.
pub async fn retry_with_backoff<T, E, F, Fut, C>(
    policy: &RetryPolicy,
    mut attempt: F,
    is_conclusive: C,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: Fn(&T) -> bool,
{
    let attempts = policy.attempts.max(1);
    let mut round = 1;

    loop {
        let outcome = attempt().await;
        if round >= attempts {
            return outcome;
        }

        let backoff = match &outcome {
            Ok(value) if is_conclusive(value) => None,
            Ok(_) => Some(policy.backoff_after_response),
            Err(_) => Some(policy.backoff_after_error),
        };
        let Some(backoff) = backoff else {
            return outcome;
        };

        tokio::time::sleep(backoff).await;
        round += 1;
    }
}

/// Ask a tab for its media state, riding out the window right after a
/// navigation when the page side is not listening yet. Never fails: an
/// unreachable page reads as "nothing playing".
pub async fn check_media_with_retry(
    probe: &dyn PageProbe,
    tab_id: TabId,
    policy: &RetryPolicy,
) -> MediaSnapshot {
    let outcome = retry_with_backoff(
        policy,
        move || probe.check_media(tab_id),
        |answer: &Option<MediaSnapshot>| {
            answer
                .as_ref()
                .map(|snapshot| snapshot.has_playing() || snapshot.has_ended())
                .unwrap_or(false)
        },
    )
    .await;

    match outcome {
        Ok(Some(snapshot)) => snapshot,
        Ok(None) => MediaSnapshot::empty(),
        Err(err) => {
            log_probe_failure(tab_id, &err);
            MediaSnapshot::empty()
        }
    }
}

fn log_probe_failure(tab_id: TabId, err: &ChannelError) {
    log_debug!("media probe for tab {tab_id} gave up: {err}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MediaItem, MediaKind};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::time::Instant;

    struct ScriptedProbe {
        answers: Mutex<VecDeque<Result<Option<MediaSnapshot>, ChannelError>>>,
        calls: Mutex<Vec<Instant>>,
    }

    impl ScriptedProbe {
        fn new(answers: Vec<Result<Option<MediaSnapshot>, ChannelError>>) -> Self {
            Self {
                answers: Mutex::new(answers.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn gaps(&self) -> Vec<Duration> {
            let calls = self.calls.lock().unwrap();
            calls.windows(2).map(|pair| pair[1] - pair[0]).collect()
        }
    }

    #[async_trait]
    impl PageProbe for ScriptedProbe {
        async fn check_media(&self, _tab_id: TabId) -> Result<Option<MediaSnapshot>, ChannelError> {
            self.calls.lock().unwrap().push(Instant::now());
            self.answers
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(None))
        }
    }

    fn playing() -> MediaSnapshot {
        MediaSnapshot {
            playing_items: vec![MediaItem {
                kind: MediaKind::Video,
                src: "a.mp4".into(),
                duration: Some(10.0),
                current_time: 1.0,
                volume: 1.0,
                muted: false,
                width: None,
                height: None,
            }],
            ..MediaSnapshot::empty()
        }
    }

    fn policy() -> RetryPolicy {
        RetryPolicy::from_timings(&Timings::default())
    }

    fn unreachable() -> ChannelError {
        ChannelError::classify("Receiving end does not exist.")
    }

    #[tokio::test(start_paused = true)]
    async fn conclusive_answer_stops_retrying() {
        let probe = ScriptedProbe::new(vec![Ok(Some(playing())), Ok(None)]);
        let snapshot = check_media_with_retry(&probe, 1, &policy()).await;

        assert!(snapshot.has_playing());
        assert_eq!(probe.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_depends_on_failure_kind() {
        let probe = ScriptedProbe::new(vec![
            Err(unreachable()),
            Ok(Some(MediaSnapshot::empty())),
            Ok(Some(playing())),
        ]);
        let snapshot = check_media_with_retry(&probe, 1, &policy()).await;

        assert!(snapshot.has_playing());
        assert_eq!(
            probe.gaps(),
            vec![Duration::from_millis(500), Duration::from_millis(800)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_errors_degrade_to_empty() {
        let probe = ScriptedProbe::new(vec![Err(unreachable()), Err(unreachable()), Err(unreachable())]);
        let snapshot = check_media_with_retry(&probe, 1, &policy()).await;

        assert_eq!(snapshot, MediaSnapshot::empty());
        assert_eq!(probe.calls.lock().unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_page_is_accepted_after_last_attempt() {
        let probe = ScriptedProbe::new(vec![Ok(None), Ok(None), Ok(Some(MediaSnapshot::empty()))]);
        let snapshot = check_media_with_retry(&probe, 1, &policy()).await;

        assert!(!snapshot.has_playing());
        assert_eq!(probe.calls.lock().unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn single_attempt_policy_never_sleeps() {
        let policy = RetryPolicy {
            attempts: 1,
            ..policy()
        };
        let started = Instant::now();
        let result: Result<u32, ()> = retry_with_backoff(&policy, || async { Err(()) }, |_| true).await;

        assert!(result.is_err());
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}
