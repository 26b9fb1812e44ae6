use crate::config::SessionConfig;
use crate::generator::generate_block;
use rand::Rng;
use std::time::Duration;
use stroop_core::{
    BlockStats, Color, Response, ResultsView, SessionPhase, SessionView, Stimulus, TrialPhase,
    TrialView,
};
use stroop_timing::{Clock, Scheduler, TimerHandle};

/// Raw inputs forwarded by the display surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionInput {
    /// Start action on the instructions screen.
    Begin,
    /// A response key, or the equivalent on-screen button.
    Key(char),
    /// Repeat action on the results screen.
    Repeat,
}

/// Actions the session schedules against its own future.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    ShowWord,
    BlankWord,
    NextTrial,
    PauseTick,
}

/// The session controller: sole owner and sole mutator of session state.
///
/// Inputs arrive through `handle_input`; elapsed time arrives through
/// `tick`, which drains due scheduled actions one at a time. Nothing here
/// blocks, and a timed transition racing a key press resolves by whichever
/// the caller delivers first.
pub struct Session<C: Clock, R: Rng> {
    clock: C,
    rng: R,
    config: SessionConfig,

    phase: SessionPhase,
    trial_phase: TrialPhase,
    block: Vec<Stimulus>,
    trial_index: usize,
    /// What the subject currently sees (word or blank placeholder).
    visible: Option<Stimulus>,
    /// Word onset, the reference point for latency measurement.
    onset_ns: Option<u64>,

    block1: Vec<Response>,
    block2: Vec<Response>,
    pause_remaining_s: u32,

    scheduler: Scheduler<Action>,
    /// Pending word-blanking timer for the current trial, cancelled when a
    /// response arrives before it fires.
    blank_timer: Option<TimerHandle>,
}

impl<C: Clock, R: Rng> Session<C, R> {
    pub fn new(config: SessionConfig, clock: C, rng: R) -> Session<C, R> {
        Session {
            clock,
            rng,
            config,
            phase: SessionPhase::Instructions,
            trial_phase: TrialPhase::Gap,
            block: Vec::new(),
            trial_index: 0,
            visible: None,
            onset_ns: None,
            block1: Vec::new(),
            block2: Vec::new(),
            pause_remaining_s: 0,
            scheduler: Scheduler::new(),
            blank_timer: None,
        }
    }

    /// Drains every scheduled action whose deadline has passed.
    pub fn tick(&mut self) {
        loop {
            let now = self.clock.now_ns();
            let Some(action) = self.scheduler.pop_due(now) else {
                break;
            };
            self.apply(action, now);
        }
    }

    /// Processes one raw input. Returns whether it had any effect; unbound
    /// keys and out-of-phase inputs are no-ops, never errors.
    pub fn handle_input(&mut self, input: SessionInput) -> bool {
        match (self.phase, input) {
            (SessionPhase::Instructions, SessionInput::Begin) => {
                self.start_block(SessionPhase::Block1);
                true
            }
            (phase, SessionInput::Key(key)) if phase.is_block() => self.score(key),
            (SessionPhase::Results, SessionInput::Repeat) => {
                self.reset();
                true
            }
            _ => false,
        }
    }

    fn start_block(&mut self, phase: SessionPhase) {
        debug_assert!(phase.is_block());
        self.phase = phase;
        self.block = generate_block(&mut self.rng, &self.config);
        self.trial_index = 0;
        println!(
            "Block {} started: {} trials",
            phase.block_number().unwrap_or(0),
            self.block.len()
        );
        self.begin_trial();
    }

    fn begin_trial(&mut self) {
        self.trial_phase = TrialPhase::Fixation;
        self.visible = None;
        self.onset_ns = None;
        let now = self.clock.now_ns();
        self.scheduler.schedule_after(
            now,
            Duration::from_millis(self.config.fixation_ms),
            Action::ShowWord,
        );
    }

    fn apply(&mut self, action: Action, now_ns: u64) {
        match action {
            Action::ShowWord => {
                let Some(stimulus) = self.block.get(self.trial_index).cloned() else {
                    debug_assert!(false, "word scheduled past the end of the block");
                    return;
                };
                self.trial_phase = TrialPhase::Word;
                self.visible = Some(stimulus);
                self.onset_ns = Some(now_ns);
                self.blank_timer = Some(self.scheduler.schedule_after(
                    now_ns,
                    Duration::from_millis(self.config.word_ms),
                    Action::BlankWord,
                ));
                println!("Trial {} word shown at {} ns", self.trial_index, now_ns);
            }
            Action::BlankWord => {
                self.blank_timer = None;
                if self.trial_phase == TrialPhase::Word {
                    // The onset stays in effect; responses remain valid.
                    self.trial_phase = TrialPhase::Blank;
                    self.visible = Some(Stimulus::blank());
                }
            }
            Action::NextTrial => self.begin_trial(),
            Action::PauseTick => {
                self.pause_remaining_s = self.pause_remaining_s.saturating_sub(1);
                if self.pause_remaining_s == 0 {
                    self.start_block(SessionPhase::Block2);
                } else {
                    self.scheduler
                        .schedule_after(now_ns, Duration::from_secs(1), Action::PauseTick);
                }
            }
        }
    }

    fn score(&mut self, key: char) -> bool {
        if !self.trial_phase.accepts_response() {
            // Fixation or inter-trial gap: no stimulus is active.
            return false;
        }
        let Some(color) = Color::from_key(key) else {
            return false;
        };
        let Some(onset) = self.onset_ns else {
            debug_assert!(false, "response window open without a recorded onset");
            return false;
        };
        let Some(stimulus) = self.block.get(self.trial_index).cloned() else {
            debug_assert!(false, "response window open past the end of the block");
            return false;
        };

        let now = self.clock.now_ns();
        let response = Response {
            correct: stimulus.ink_color() == Some(color),
            response_time_ms: now.saturating_sub(onset) as f64 / 1e6,
            key: color.key(),
            stimulus,
        };
        println!(
            "Trial {}: '{}' {} RT {:.1} ms",
            self.trial_index,
            response.key,
            if response.correct { "correct" } else { "incorrect" },
            response.response_time_ms
        );

        match self.phase {
            SessionPhase::Block1 => self.block1.push(response),
            SessionPhase::Block2 => self.block2.push(response),
            _ => unreachable!("scoring outside a block"),
        }

        // The blanking timer must not outlive the trial it belongs to.
        if let Some(handle) = self.blank_timer.take() {
            self.scheduler.cancel(handle);
        }
        self.advance_trial(now);
        true
    }

    fn advance_trial(&mut self, now_ns: u64) {
        self.trial_index += 1;
        self.visible = None;
        self.onset_ns = None;

        if self.trial_index < self.block.len() {
            self.trial_phase = TrialPhase::Gap;
            self.scheduler.schedule_after(
                now_ns,
                Duration::from_millis(self.config.inter_trial_ms),
                Action::NextTrial,
            );
            return;
        }

        match self.phase {
            SessionPhase::Block1 => {
                self.phase = SessionPhase::Pause;
                self.pause_remaining_s = self.config.pause_secs;
                self.scheduler
                    .schedule_after(now_ns, Duration::from_secs(1), Action::PauseTick);
                println!("Block 1 complete, pausing {} s", self.pause_remaining_s);
            }
            SessionPhase::Block2 => {
                self.phase = SessionPhase::Results;
                println!("Block 2 complete, showing results");
            }
            _ => unreachable!("trial advanced outside a block"),
        }
    }

    /// Full reset back to the instructions screen. Cancels every pending
    /// scheduled action so no stale timer can touch the fresh session.
    fn reset(&mut self) {
        self.scheduler.cancel_all();
        self.blank_timer = None;
        self.phase = SessionPhase::Instructions;
        self.trial_phase = TrialPhase::Gap;
        self.block.clear();
        self.trial_index = 0;
        self.visible = None;
        self.onset_ns = None;
        self.block1.clear();
        self.block2.clear();
        self.pause_remaining_s = 0;
        println!("Session reset to instructions");
    }

    /// Snapshot for the display surface.
    pub fn view(&self) -> SessionView {
        let trial = self.phase.block_number().map(|block| TrialView {
            block,
            fixation: self.trial_phase.shows_fixation(),
            stimulus: self.visible.clone(),
            index: self.trial_index,
            total: self.block.len(),
        });

        let results = (self.phase == SessionPhase::Results).then(|| {
            let block1 = BlockStats::summarize(&self.block1);
            let block2 = BlockStats::summarize(&self.block2);
            let all: Vec<Response> = self.block1.iter().chain(&self.block2).cloned().collect();
            let overall = BlockStats::summarize(&all);
            ResultsView {
                block1,
                block2,
                overall,
                stroop_effect_ms: overall.stroop_effect_ms(),
            }
        });

        SessionView {
            phase: self.phase,
            trial,
            pause_remaining_s: self.pause_remaining_s,
            results,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn trial_phase(&self) -> TrialPhase {
        self.trial_phase
    }

    pub fn trial_index(&self) -> usize {
        self.trial_index
    }

    pub fn pause_remaining_s(&self) -> u32 {
        self.pause_remaining_s
    }

    /// The stimulus a response would be scored against right now.
    pub fn current_stimulus(&self) -> Option<&Stimulus> {
        if self.trial_phase.accepts_response() {
            self.block.get(self.trial_index)
        } else {
            None
        }
    }

    pub fn block_stimuli(&self) -> &[Stimulus] {
        &self.block
    }

    pub fn block1_responses(&self) -> &[Response] {
        &self.block1
    }

    pub fn block2_responses(&self) -> &[Response] {
        &self.block2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use stroop_timing::ManualClock;

    type TestSession = Session<ManualClock, StdRng>;

    fn session(seed: u64) -> (TestSession, ManualClock) {
        let clock = ManualClock::new();
        let session = Session::new(
            SessionConfig::default(),
            clock.clone(),
            StdRng::seed_from_u64(seed),
        );
        (session, clock)
    }

    fn advance_ms(session: &mut TestSession, clock: &ManualClock, ms: u64) {
        clock.advance(Duration::from_millis(ms));
        session.tick();
    }

    fn correct_key(session: &TestSession) -> char {
        session
            .current_stimulus()
            .and_then(Stimulus::ink_color)
            .map(Color::key)
            .expect("active stimulus")
    }

    fn wrong_key(session: &TestSession) -> char {
        let ink = session
            .current_stimulus()
            .and_then(Stimulus::ink_color)
            .expect("active stimulus");
        Color::ALL
            .into_iter()
            .find(|c| *c != ink)
            .map(Color::key)
            .unwrap()
    }

    /// Answers every remaining trial of the active block correctly,
    /// waiting out fixation and the inter-trial gap along the way.
    fn run_block_correctly(session: &mut TestSession, clock: &ManualClock) {
        loop {
            advance_ms(session, clock, 1000);
            assert_eq!(session.trial_phase(), TrialPhase::Word);
            let key = correct_key(session);
            assert!(session.handle_input(SessionInput::Key(key)));
            if !session.phase().is_block() {
                break;
            }
            advance_ms(session, clock, 500);
        }
    }

    #[test]
    fn starts_on_instructions() {
        let (session, _clock) = session(0);
        assert_eq!(session.phase(), SessionPhase::Instructions);
        let view = session.view();
        assert!(view.trial.is_none());
        assert!(view.results.is_none());
    }

    #[test]
    fn begin_generates_a_block_and_enters_fixation() {
        let (mut session, clock) = session(1);
        assert!(session.handle_input(SessionInput::Begin));
        assert_eq!(session.phase(), SessionPhase::Block1);
        assert_eq!(session.trial_phase(), TrialPhase::Fixation);
        assert_eq!(session.block_stimuli().len(), 60);

        let view = session.view();
        let trial = view.trial.expect("trial view");
        assert!(trial.fixation);
        assert!(trial.stimulus.is_none());
        assert_eq!(trial.progress(), 0.0);

        advance_ms(&mut session, &clock, 1000);
        assert_eq!(session.trial_phase(), TrialPhase::Word);
        let view = session.view();
        let shown = view.trial.unwrap().stimulus.expect("visible word");
        assert_eq!(&shown, &session.block_stimuli()[0]);
    }

    #[test]
    fn fixation_phase_ignores_responses() {
        let (mut session, _clock) = session(2);
        session.handle_input(SessionInput::Begin);
        assert_eq!(session.trial_phase(), TrialPhase::Fixation);
        assert!(!session.handle_input(SessionInput::Key('r')));
        assert!(session.block1_responses().is_empty());
        assert_eq!(session.trial_index(), 0);
    }

    #[test]
    fn unbound_keys_are_ignored() {
        let (mut session, clock) = session(3);
        session.handle_input(SessionInput::Begin);
        advance_ms(&mut session, &clock, 1000);
        assert!(!session.handle_input(SessionInput::Key('q')));
        assert!(!session.handle_input(SessionInput::Key('7')));
        assert!(session.block1_responses().is_empty());
        assert_eq!(session.trial_index(), 0);
    }

    #[test]
    fn keys_are_case_insensitive() {
        let (mut session, clock) = session(4);
        session.handle_input(SessionInput::Begin);
        advance_ms(&mut session, &clock, 1000);
        let key = correct_key(&session).to_ascii_uppercase();
        assert!(session.handle_input(SessionInput::Key(key)));
        assert!(session.block1_responses()[0].correct);
    }

    #[test]
    fn wrong_key_scores_incorrect_and_advances_once() {
        let (mut session, clock) = session(5);
        session.handle_input(SessionInput::Begin);
        advance_ms(&mut session, &clock, 1000);
        let key = wrong_key(&session);
        assert!(session.handle_input(SessionInput::Key(key)));

        let responses = session.block1_responses();
        assert_eq!(responses.len(), 1);
        assert!(!responses[0].correct);
        assert_eq!(session.trial_index(), 1);
        assert_eq!(session.trial_phase(), TrialPhase::Gap);
    }

    #[test]
    fn word_blanks_after_its_window_but_stays_scorable() {
        let (mut session, clock) = session(6);
        session.handle_input(SessionInput::Begin);
        advance_ms(&mut session, &clock, 1000);
        let expected = session.block_stimuli()[0].clone();
        let key = correct_key(&session);

        advance_ms(&mut session, &clock, 750);
        assert_eq!(session.trial_phase(), TrialPhase::Blank);
        let view = session.view();
        assert!(view.trial.unwrap().stimulus.unwrap().is_blank());

        // Answer 250 ms into the blank: latency runs from word onset and
        // the original stimulus is the one scored.
        advance_ms(&mut session, &clock, 250);
        assert!(session.handle_input(SessionInput::Key(key)));
        let response = &session.block1_responses()[0];
        assert_eq!(response.response_time_ms, 1000.0);
        assert!(response.correct);
        assert_eq!(response.stimulus, expected);
    }

    #[test]
    fn early_response_cancels_the_blank_timer() {
        let (mut session, clock) = session(7);
        session.handle_input(SessionInput::Begin);
        advance_ms(&mut session, &clock, 1000);
        let key = correct_key(&session);
        assert!(session.handle_input(SessionInput::Key(key)));

        // 500 ms gap, then the next fixation begins. 250 ms later the old
        // trial's blank timer would have fired if it were still pending.
        advance_ms(&mut session, &clock, 500);
        assert_eq!(session.trial_phase(), TrialPhase::Fixation);
        advance_ms(&mut session, &clock, 250);
        assert_eq!(session.trial_phase(), TrialPhase::Fixation);
        assert!(session.view().trial.unwrap().stimulus.is_none());

        advance_ms(&mut session, &clock, 750);
        assert_eq!(session.trial_phase(), TrialPhase::Word);
        let shown = session.view().trial.unwrap().stimulus.unwrap();
        assert_eq!(&shown, &session.block_stimuli()[1]);
    }

    #[test]
    fn correct_block_one_run_reaches_pause_with_full_stats() {
        let (mut session, clock) = session(8);
        session.handle_input(SessionInput::Begin);
        run_block_correctly(&mut session, &clock);

        assert_eq!(session.phase(), SessionPhase::Pause);
        assert_eq!(session.pause_remaining_s(), 10);
        assert_eq!(session.block1_responses().len(), 60);

        let stats = BlockStats::summarize(session.block1_responses());
        assert_eq!(stats.congruent_correct, 30);
        assert_eq!(stats.congruent_total, 30);
        assert_eq!(stats.incongruent_correct, 30);
        assert_eq!(stats.incongruent_total, 30);
        assert!(stats.congruent_avg_ms >= 0.0);
        assert!(stats.incongruent_avg_ms >= 0.0);
    }

    #[test]
    fn pause_counts_down_once_per_second_then_starts_block_two() {
        let (mut session, clock) = session(9);
        session.handle_input(SessionInput::Begin);
        run_block_correctly(&mut session, &clock);

        for tick in 1..=9u32 {
            advance_ms(&mut session, &clock, 1000);
            assert_eq!(session.phase(), SessionPhase::Pause);
            assert_eq!(session.pause_remaining_s(), 10 - tick);
            // The pause is non-interactive.
            assert!(!session.handle_input(SessionInput::Key('r')));
        }

        advance_ms(&mut session, &clock, 1000);
        assert_eq!(session.phase(), SessionPhase::Block2);
        assert_eq!(session.trial_phase(), TrialPhase::Fixation);
        assert_eq!(session.trial_index(), 0);

        // Freshly generated block, equal only in length and composition.
        let block = session.block_stimuli();
        assert_eq!(block.len(), 60);
        assert_eq!(block.iter().filter(|s| s.congruent).count(), 30);
    }

    #[test]
    fn completing_block_two_shows_results_and_repeat_resets() {
        let (mut session, clock) = session(10);
        session.handle_input(SessionInput::Begin);
        run_block_correctly(&mut session, &clock);
        for _ in 0..10 {
            advance_ms(&mut session, &clock, 1000);
        }
        run_block_correctly(&mut session, &clock);

        assert_eq!(session.phase(), SessionPhase::Results);
        let view = session.view();
        let results = view.results.expect("results view");
        assert_eq!(results.overall.congruent_total, 60);
        assert_eq!(results.overall.incongruent_total, 60);
        assert_eq!(results.overall.congruent_correct, 60);
        assert_eq!(results.overall.incongruent_correct, 60);
        assert_eq!(
            results.stroop_effect_ms,
            results.overall.incongruent_avg_ms - results.overall.congruent_avg_ms
        );

        assert!(session.handle_input(SessionInput::Repeat));
        assert_eq!(session.phase(), SessionPhase::Instructions);
        assert!(session.block1_responses().is_empty());
        assert!(session.block2_responses().is_empty());
        assert_eq!(session.trial_index(), 0);

        // No stale timer may mutate the reset session.
        for _ in 0..10 {
            advance_ms(&mut session, &clock, 1000);
        }
        assert_eq!(session.phase(), SessionPhase::Instructions);
    }

    #[test]
    fn latency_is_measured_from_word_onset() {
        let (mut session, clock) = session(11);
        session.handle_input(SessionInput::Begin);
        advance_ms(&mut session, &clock, 1000);
        advance_ms(&mut session, &clock, 320);
        let key = correct_key(&session);
        session.handle_input(SessionInput::Key(key));
        assert_eq!(session.block1_responses()[0].response_time_ms, 320.0);
    }

    #[test]
    fn an_unanswered_trial_waits_indefinitely() {
        let (mut session, clock) = session(12);
        session.handle_input(SessionInput::Begin);
        advance_ms(&mut session, &clock, 1000);
        // Hours pass with no input: still the same trial, still scorable.
        advance_ms(&mut session, &clock, 3_600_000);
        assert_eq!(session.phase(), SessionPhase::Block1);
        assert_eq!(session.trial_phase(), TrialPhase::Blank);
        assert_eq!(session.trial_index(), 0);
        let key = correct_key(&session);
        assert!(session.handle_input(SessionInput::Key(key)));
        assert_eq!(session.block1_responses()[0].response_time_ms, 3_600_000.0);
    }

    #[test]
    fn begin_and_repeat_are_rejected_out_of_phase() {
        let (mut session, clock) = session(13);
        assert!(!session.handle_input(SessionInput::Repeat));
        session.handle_input(SessionInput::Begin);
        assert!(!session.handle_input(SessionInput::Begin));
        advance_ms(&mut session, &clock, 1000);
        assert!(!session.handle_input(SessionInput::Repeat));
    }
}
