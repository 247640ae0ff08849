//! Background collaborators: score persistence and crash feedback
//!
//! The game never waits on storage. Score requests go to a worker thread and
//! their replies are picked up on a later frame with a non-blocking poll.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::game::{GameEvent, SharedGame};
use crate::highscores::{HighScoreEntry, ScoreStore};

/// How long dropping a [`ScoreService`] waits for queued writes to land
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug)]
enum ScoreRequest {
    LoadBest,
    Record(u32),
    Top(usize),
    Clear,
}

/// Result of a completed score request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreReply {
    Best(u32),
    Top(Vec<HighScoreEntry>),
}

/// Handle to a score store running on its own thread
#[derive(Debug)]
pub struct ScoreService {
    requests: Option<Sender<ScoreRequest>>,
    replies: Receiver<ScoreReply>,
    /// Disconnects when the worker exits
    finished: Receiver<()>,
    worker: Option<JoinHandle<()>>,
}

impl ScoreService {
    /// Move `store` onto a worker thread
    pub fn spawn<S: ScoreStore + 'static>(mut store: S) -> Result<Self> {
        let (request_tx, request_rx) = mpsc::channel::<ScoreRequest>();
        let (reply_tx, reply_rx) = mpsc::channel();
        let (finished_tx, finished_rx) = mpsc::channel::<()>();

        let worker = thread::Builder::new()
            .name("score-store".into())
            .spawn(move || {
                let _finished = finished_tx;
                for request in request_rx {
                    let reply = match request {
                        ScoreRequest::LoadBest => store.best().map(ScoreReply::Best),
                        ScoreRequest::Record(score) => store.record(score).map(ScoreReply::Best),
                        ScoreRequest::Top(n) => store.top(n).map(ScoreReply::Top),
                        ScoreRequest::Clear => store.clear().map(|_| ScoreReply::Best(0)),
                    };
                    match reply {
                        Ok(reply) => {
                            if reply_tx.send(reply).is_err() {
                                break;
                            }
                        }
                        Err(e) => log::warn!("Score store request failed: {e}"),
                    }
                }
                log::debug!("Score worker stopped");
            })?;

        Ok(Self {
            requests: Some(request_tx),
            replies: reply_rx,
            finished: finished_rx,
            worker: Some(worker),
        })
    }

    fn send(&self, request: ScoreRequest) -> Result<()> {
        self.requests
            .as_ref()
            .ok_or(Error::ServiceStopped)?
            .send(request)
            .map_err(|_| Error::ServiceStopped)
    }

    fn fire(&self, request: ScoreRequest) {
        if let Err(e) = self.send(request) {
            log::warn!("Dropped score request: {e}");
        }
    }

    /// Ask for the current best score
    pub fn request_best(&self) {
        self.fire(ScoreRequest::LoadBest);
    }

    /// Record a finished run; the reply carries the new best score
    pub fn record(&self, score: u32) {
        self.fire(ScoreRequest::Record(score));
    }

    /// Ask for the `n` highest entries
    pub fn request_top(&self, n: usize) {
        self.fire(ScoreRequest::Top(n));
    }

    /// Wipe the leaderboard
    pub fn clear(&self) {
        self.fire(ScoreRequest::Clear);
    }

    /// Replies that have arrived so far, without blocking
    pub fn poll(&self) -> Vec<ScoreReply> {
        self.replies.try_iter().collect()
    }

    /// Block up to `timeout` for the next reply
    pub fn wait(&self, timeout: Duration) -> Option<ScoreReply> {
        self.replies.recv_timeout(timeout).ok()
    }
}

impl Drop for ScoreService {
    fn drop(&mut self) {
        // Closing the channel lets the worker finish queued writes and exit
        self.requests.take();
        let Some(worker) = self.worker.take() else {
            return;
        };
        match self.finished.recv_timeout(SHUTDOWN_GRACE) {
            Err(RecvTimeoutError::Timeout) => {
                log::warn!("Score store still busy after {SHUTDOWN_GRACE:?}; detaching worker");
            }
            _ => {
                let _ = worker.join();
            }
        }
    }
}

/// Receives the one-shot crash notification
pub trait FeedbackSink: Send {
    fn crashed(&mut self, sound: bool, haptics: bool);
}

/// Feedback sink that only logs
#[derive(Debug, Default)]
pub struct LogFeedback;

impl FeedbackSink for LogFeedback {
    fn crashed(&mut self, sound: bool, haptics: bool) {
        match (sound, haptics) {
            (false, false) => log::info!("Crash (feedback muted)"),
            _ => log::info!(
                "Crash feedback: sound={} haptics={}",
                if sound { "on" } else { "off" },
                if haptics { "on" } else { "off" }
            ),
        }
    }
}

/// Routes game events to collaborators and folds their results back
pub struct Services {
    pub scores: ScoreService,
    feedback: Box<dyn FeedbackSink>,
    latest_top: Option<Vec<HighScoreEntry>>,
}

impl Services {
    pub fn new(scores: ScoreService, feedback: Box<dyn FeedbackSink>) -> Self {
        Self {
            scores,
            feedback,
            latest_top: None,
        }
    }

    /// Most recent leaderboard reply, if one has arrived
    pub fn latest_top(&self) -> Option<&[HighScoreEntry]> {
        self.latest_top.as_deref()
    }

    fn fold(&mut self, game: &SharedGame, reply: ScoreReply) {
        match reply {
            ScoreReply::Best(best) => game.fold_best_score(best),
            ScoreReply::Top(top) => self.latest_top = Some(top),
        }
    }

    /// Dispatch pending game events and fold in any completed replies.
    ///
    /// Returns the events that were handled.
    pub fn pump(&mut self, game: &SharedGame) -> Vec<GameEvent> {
        let events = game.drain_events();
        for event in &events {
            if let GameEvent::Crashed {
                score,
                sound_on,
                haptics_on,
            } = *event
            {
                self.feedback.crashed(sound_on, haptics_on);
                self.scores.record(score);
            }
        }

        for reply in self.scores.poll() {
            self.fold(game, reply);
        }
        events
    }

    /// Block up to `timeout` for the next reply and fold it in.
    ///
    /// Returns false if nothing arrived. Only for shutdown paths; frames use
    /// [`Services::pump`].
    pub fn settle(&mut self, game: &SharedGame, timeout: Duration) -> bool {
        match self.scores.wait(timeout) {
            Some(reply) => {
                self.fold(game, reply);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::highscores::HighScores;

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn test_record_replies_with_best() {
        let service = ScoreService::spawn(HighScores::new()).unwrap();
        service.request_best();
        assert_eq!(service.wait(WAIT), Some(ScoreReply::Best(0)));
        service.record(8);
        assert_eq!(service.wait(WAIT), Some(ScoreReply::Best(8)));
        service.record(2);
        assert_eq!(service.wait(WAIT), Some(ScoreReply::Best(8)));
        service.request_top(5);
        match service.wait(WAIT) {
            Some(ScoreReply::Top(top)) => {
                assert_eq!(top.iter().map(|e| e.score).collect::<Vec<_>>(), vec![8, 2])
            }
            other => panic!("unexpected reply {other:?}"),
        }
        service.clear();
        assert_eq!(service.wait(WAIT), Some(ScoreReply::Best(0)));
    }

    #[test]
    fn test_poll_never_blocks() {
        let service = ScoreService::spawn(HighScores::new()).unwrap();
        assert!(service.poll().is_empty());
    }

    /// Store whose every request fails
    struct Silent;

    impl ScoreStore for Silent {
        fn best(&mut self) -> Result<u32> {
            Err(Error::ServiceStopped)
        }
        fn record(&mut self, _score: u32) -> Result<u32> {
            Err(Error::ServiceStopped)
        }
        fn top(&mut self, _n: usize) -> Result<Vec<HighScoreEntry>> {
            Err(Error::ServiceStopped)
        }
        fn clear(&mut self) -> Result<()> {
            Err(Error::ServiceStopped)
        }
    }

    /// Store that blocks until the test releases it
    struct Hung(mpsc::Receiver<()>);

    impl ScoreStore for Hung {
        fn best(&mut self) -> Result<u32> {
            let _ = self.0.recv();
            Err(Error::ServiceStopped)
        }
        fn record(&mut self, _score: u32) -> Result<u32> {
            self.best()
        }
        fn top(&mut self, _n: usize) -> Result<Vec<HighScoreEntry>> {
            self.best().map(|_| Vec::new())
        }
        fn clear(&mut self) -> Result<()> {
            self.best().map(|_| ())
        }
    }

    #[test]
    fn test_drop_does_not_wait_on_hung_store() {
        let (release, gate) = mpsc::channel::<()>();
        let service = ScoreService::spawn(Hung(gate)).unwrap();
        service.request_best();
        service.record(3);

        let started = std::time::Instant::now();
        drop(service);
        assert!(started.elapsed() < SHUTDOWN_GRACE * 3);
        drop(release);
    }

    #[test]
    fn test_drop_flushes_queued_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        let service = ScoreService::spawn(crate::persistence::FileScoreStore::open(&path)).unwrap();
        service.record(12);
        drop(service);

        let mut reopened = crate::persistence::FileScoreStore::open(&path);
        assert_eq!(ScoreStore::best(&mut reopened).unwrap(), 12);
    }

    #[test]
    fn test_settle_collects_leaderboard() {
        use crate::{Game, Settings, Tuning};

        let game = SharedGame::new(Game::new(Tuning::default(), Settings::default(), 1));
        let mut store = HighScores::new();
        store.add_score(4, 1);
        store.add_score(9, 2);
        let mut services = Services::new(ScoreService::spawn(store).unwrap(), Box::new(LogFeedback));
        assert!(services.latest_top().is_none());

        services.scores.request_best();
        services.scores.request_top(5);
        while services.latest_top().is_none() && services.settle(&game, WAIT) {}

        let top: Vec<u32> = services.latest_top().unwrap().iter().map(|e| e.score).collect();
        assert_eq!(top, vec![9, 4]);
        assert_eq!(game.snapshot().best_score, 9);
    }

    #[test]
    fn test_settle_times_out_on_silent_store() {
        use crate::{Game, Settings, Tuning};

        let game = SharedGame::new(Game::new(Tuning::default(), Settings::default(), 1));
        let mut services = Services::new(ScoreService::spawn(Silent).unwrap(), Box::new(LogFeedback));
        services.scores.request_top(5);
        assert!(!services.settle(&game, Duration::from_millis(50)));
        assert!(services.latest_top().is_none());
    }

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<(bool, bool)>>>);

    impl FeedbackSink for Recorder {
        fn crashed(&mut self, sound: bool, haptics: bool) {
            self.0.lock().unwrap().push((sound, haptics));
        }
    }

    #[test]
    fn test_silent_store_keeps_default_best() {
        use crate::{Game, Settings, Tuning};

        let game = SharedGame::new(Game::new(Tuning::default(), Settings::default(), 1));
        let service = ScoreService::spawn(Silent).unwrap();
        service.request_best();
        let mut services = Services::new(service, Box::new(LogFeedback));
        services.pump(&game);
        assert_eq!(game.snapshot().best_score, 0);
    }

    #[test]
    fn test_pump_routes_crash() {
        use crate::sim::{Obstacle, ObstacleKind};
        use crate::{Game, Settings, Tuning};

        let game = SharedGame::new(Game::new(Tuning::default(), Settings::default(), 1));
        game.start_run();
        game.with(|g| {
            let mut snapshot = (*g.snapshot()).clone();
            snapshot.score = 5;
            snapshot.obstacles.push(Obstacle {
                id: 1,
                x: snapshot.skier_x,
                y: snapshot.skier_y,
                radius: 0.06,
                kind: ObstacleKind::Tree,
            });
            g.load_state(snapshot);
        });
        game.tick(0.0);

        let recorder = Recorder::default();
        let service = ScoreService::spawn(HighScores::new()).unwrap();
        let mut services = Services::new(service, Box::new(recorder.clone()));
        let events = services.pump(&game);
        assert!(matches!(events.as_slice(), [GameEvent::RunStarted, GameEvent::Crashed { score: 5, .. }]));
        assert_eq!(*recorder.0.lock().unwrap(), vec![(true, true)]);

        // Reply arrives asynchronously; keep pumping until it is folded in
        let deadline = std::time::Instant::now() + WAIT;
        while game.snapshot().best_score != 5 && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
            services.pump(&game);
        }
        assert_eq!(game.snapshot().best_score, 5);
    }
}
