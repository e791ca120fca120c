use vsrg_model::{Chart, Time};
use vsrg_replay::{KeyBits, KeySink, ReplayCursor, ReplayData, ReplayError};
use vsrg_rule::{
    HoldBehaviour, JudgementId, Ruleset, RulesetError, grade_for, judge_with_gates, lamp_for,
    osu_ln_judgement,
};

use crate::event::{HitEvent, HitEventGuts};
use crate::health::HealthBar;
use crate::hit_data::{HitData, HitStatus};
use crate::snapshot::{SNAPSHOT_COUNT, Snapshot};
use crate::state::ScoreState;

/// Per-lane hold tracking, tagged with the hold-head row it refers to.
///
/// Distinguishes a hold that was never hit (`MissedHead`) from one whose
/// head was hit and finger later released (`Dropped`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HoldState {
    Nothing,
    Holding { head: usize, head_delta: Time },
    Dropped { head: usize, head_delta: Time },
    MissedHead { head: usize },
    MissedHeadThenHeld { head: usize },
}

impl HoldState {
    pub fn head_index(self) -> Option<usize> {
        match self {
            HoldState::Nothing => None,
            HoldState::Holding { head, .. }
            | HoldState::Dropped { head, .. }
            | HoldState::MissedHead { head }
            | HoldState::MissedHeadThenHeld { head } => Some(head),
        }
    }

    /// The recorded head delta, where one exists (the head was actually hit).
    pub fn head_delta(self) -> Option<Time> {
        match self {
            HoldState::Holding { head_delta, .. } | HoldState::Dropped { head_delta, .. } => {
                Some(head_delta)
            }
            _ => None,
        }
    }
}

/// The scoring state machine.
///
/// Consumes key edges against the hit-data ledger and produces hit events,
/// running totals, health and snapshots. One instance per scoring run; the
/// ruleset is shared read-only.
pub struct Scorer<'a> {
    ruleset: &'a Ruleset,
    rate: f32,

    hit_data: HitData,
    first_note_time: Time,
    duration: Time,

    /// Next row to retire as missed.
    passive_cursor: usize,
    /// First row still eligible for press matching.
    active_cursor: usize,

    hold_states: Vec<HoldState>,
    key_state: KeyBits,

    state: ScoreState,
    health: HealthBar,
    events: Vec<HitEvent>,
    snapshots: Vec<Snapshot>,

    subscriber: Option<Box<dyn FnMut(&HitEvent) + 'a>>,
}

impl<'a> Scorer<'a> {
    pub fn new(ruleset: &'a Ruleset, chart: &Chart, rate: f32) -> Self {
        Scorer {
            ruleset,
            rate,
            hit_data: HitData::from_chart(chart, ruleset.miss_window),
            first_note_time: chart.first_note_time(),
            duration: chart.duration(),
            passive_cursor: 0,
            active_cursor: 0,
            hold_states: vec![HoldState::Nothing; chart.keys() as usize],
            key_state: KeyBits::EMPTY,
            state: ScoreState::new(ruleset.judgement_count()),
            health: HealthBar::new(&ruleset.health),
            events: Vec::new(),
            snapshots: Vec::new(),
            subscriber: None,
        }
    }

    /// Register the (single) event subscriber, invoked synchronously per
    /// event. Subscribers must not re-enter the engine.
    pub fn on_event(&mut self, subscriber: impl FnMut(&HitEvent) + 'a) {
        self.subscriber = Some(Box::new(subscriber));
    }

    // --- Accessors ---

    pub fn ruleset(&self) -> &'a Ruleset {
        self.ruleset
    }

    pub fn state(&self) -> &ScoreState {
        &self.state
    }

    pub fn health(&self) -> &HealthBar {
        &self.health
    }

    pub fn events(&self) -> &[HitEvent] {
        &self.events
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn hit_data(&self) -> &HitData {
        &self.hit_data
    }

    pub fn hold_state(&self, lane: usize) -> HoldState {
        self.hold_states[lane]
    }

    /// True once every row has been retired or resolved.
    pub fn finished(&self) -> bool {
        self.passive_cursor == self.hit_data.len()
    }

    pub fn failed(&self) -> bool {
        self.health.failed()
    }

    pub fn accuracy(&self) -> f64 {
        self.state.accuracy()
    }

    pub fn grade(&self) -> i32 {
        grade_for(self.accuracy(), self.ruleset)
    }

    pub fn lamp(&self) -> i32 {
        lamp_for(
            &self.state.judgement_counts,
            self.state.combo_breaks,
            self.ruleset,
        )
    }

    // --- Passive sweep ---

    /// Retire every row at least a miss window behind `now`, then bring the
    /// snapshot series up to date.
    pub fn handle_passive(&mut self, now: Time) {
        let miss_window = self.ruleset.miss_window;
        while self.passive_cursor < self.hit_data.len() {
            let row_time = self.hit_data.rows()[self.passive_cursor].time;
            if now - row_time < miss_window {
                break;
            }
            let event_time = row_time + miss_window;
            let row = self.passive_cursor;

            for k in 0..self.hit_data.keys() as usize {
                match self.hit_data.rows()[row].status[k] {
                    HitStatus::HitRequired => {
                        self.hit_data.rows_mut()[row].status[k] = HitStatus::HitAccepted;
                        let delta = self.hit_data.rows()[row].deltas[k];
                        self.resolve_hit(event_time, k, delta, true, false);
                    }
                    HitStatus::HoldHeadRequired => {
                        self.hit_data.rows_mut()[row].status[k] = HitStatus::HitAccepted;
                        let delta = self.hit_data.rows()[row].deltas[k];
                        self.hold_states[k] = HoldState::MissedHead { head: row };
                        self.resolve_hit(event_time, k, delta, true, true);
                    }
                    HitStatus::ReleaseRequired => {
                        self.hit_data.rows_mut()[row].status[k] = HitStatus::ReleaseAccepted;
                        let delta = self.hit_data.rows()[row].deltas[k];
                        let hs = self.hold_states[k];
                        let overhold = matches!(
                            hs,
                            HoldState::Holding { .. } | HoldState::Dropped { .. }
                        ) && self.key_state.has(k);
                        let dropped = matches!(
                            hs,
                            HoldState::Dropped { .. }
                                | HoldState::MissedHead { .. }
                                | HoldState::MissedHeadThenHeld { .. }
                        );
                        let head_delta = hs.head_delta().unwrap_or(miss_window);
                        if hs.head_index().is_some_and(|h| h <= row) {
                            self.hold_states[k] = HoldState::Nothing;
                        }
                        self.resolve_release(
                            event_time, k, delta, head_delta, true, overhold, dropped,
                        );
                    }
                    _ => {}
                }
            }
            self.passive_cursor += 1;
        }
        self.take_snapshots(now);
    }

    // --- Event resolution ---

    /// Judge a tap or hold head. Heads are judged immediately only under
    /// behaviours that do not combine them with the release.
    fn resolve_hit(&mut self, time: Time, column: usize, delta: Time, missed: bool, is_hold: bool) {
        let head_judged = matches!(
            self.ruleset.hold_behaviour,
            HoldBehaviour::BreakComboOnly | HoldBehaviour::JudgeReleases { .. }
        );
        let judgement = (!is_hold || head_judged).then(|| self.ruleset.judge(delta));

        self.emit(HitEvent {
            time,
            column,
            guts: HitEventGuts::Hit {
                judgement,
                delta,
                missed,
                is_hold,
            },
        });
        if !missed {
            self.state.add_delta_sample(delta);
        }
        if let Some(j) = judgement {
            let points = self.ruleset.points(delta, j);
            self.award(j, points, delta);
        }
    }

    /// Apply the ruleset's hold behaviour to a resolved release.
    #[allow(clippy::too_many_arguments)]
    fn resolve_release(
        &mut self,
        time: Time,
        column: usize,
        delta: Time,
        head_delta: Time,
        missed: bool,
        overhold: bool,
        dropped: bool,
    ) {
        // Judgement plus the delta its points are evaluated at; `Normal`
        // scores from the head since its judgement derives from the head.
        let ruleset = self.ruleset;
        let judged: Option<(JudgementId, Time)> = match &ruleset.hold_behaviour {
            HoldBehaviour::BreakComboOnly => None,
            HoldBehaviour::OsuStyle { od } => {
                Some((osu_ln_judgement(head_delta, delta, *od, overhold, dropped), delta))
            }
            HoldBehaviour::JudgeReleases { gates } => Some((
                judge_with_gates(gates, self.ruleset.default_judgement, delta),
                delta,
            )),
            HoldBehaviour::Normal { drop, overhold: oj } => {
                let head_j = self.ruleset.judge(head_delta);
                // Worst of the head judgement and the configured penalty
                let j = if overhold {
                    head_j.max(*oj)
                } else if missed || dropped {
                    head_j.max(*drop)
                } else {
                    head_j
                };
                Some((j, head_delta))
            }
            HoldBehaviour::OnlyJudgeReleases => Some((self.ruleset.judge(delta), delta)),
        };

        self.emit(HitEvent {
            time,
            column,
            guts: HitEventGuts::Release {
                judgement: judged.map(|(j, _)| j),
                delta,
                missed,
                overhold,
                dropped,
            },
        });
        if !missed {
            self.state.add_delta_sample(delta);
        }

        match judged {
            Some((j, points_delta)) => {
                let points = self.ruleset.points(points_delta, j);
                self.award(j, points, delta);
            }
            // BreakComboOnly: no points, no judgement count
            None => {
                if !overhold && (missed || dropped) {
                    self.break_combo(true);
                } else {
                    self.incr_combo();
                }
            }
        }
    }

    fn award(&mut self, judgement: JudgementId, points: f64, delta: Time) {
        self.state.add_judgement(judgement, delta);
        self.state.points_scored += points;
        self.state.max_points_scored += 1.0;
        if self.ruleset.breaks_combo(judgement) {
            self.break_combo(true);
        } else {
            self.incr_combo();
        }
        self.health.apply_delta(self.ruleset.health.deltas[judgement]);
    }

    fn incr_combo(&mut self) {
        self.state.current_combo += 1;
        self.state.best_combo = self.state.best_combo.max(self.state.current_combo);
        self.state.max_possible_combo += 1;
    }

    fn break_combo(&mut self, would_have_increased_combo: bool) {
        if would_have_increased_combo {
            self.state.max_possible_combo += 1;
        }
        self.state.combo_breaks += 1;
        self.state.current_combo = 0;
    }

    fn emit(&mut self, event: HitEvent) {
        if let Some(subscriber) = self.subscriber.as_mut() {
            subscriber(&event);
        }
        self.events.push(event);
    }

    // --- Snapshots ---

    fn take_snapshots(&mut self, now: Time) {
        if self.duration <= Time::ZERO {
            return;
        }
        let chart_time = (now - self.first_note_time).clamp(Time::ZERO, self.duration);
        let target = ((SNAPSHOT_COUNT as f32 * chart_time.as_ms() / self.duration.as_ms()).ceil()
            as usize)
            .min(SNAPSHOT_COUNT);
        while self.snapshots.len() < target {
            let bucket = self.snapshots.len() + 1;
            let lamp = self.lamp();
            self.snapshots.push(Snapshot {
                time: self.duration * (bucket as f32 / SNAPSHOT_COUNT as f32),
                points_scored: self.state.points_scored,
                max_points_scored: self.state.max_points_scored,
                combo: self.state.current_combo,
                lamp,
            });
        }
    }
}

impl KeySink for Scorer<'_> {
    /// Press-to-note resolution: retire stale rows, then match the press to
    /// the nearest unconsumed candidate unless an already-hit early note
    /// absorbs it.
    fn key_down(&mut self, time: Time, lane: usize) {
        self.handle_passive(time);
        self.key_state = self.key_state.with(lane);

        let miss_window = self.ruleset.miss_window;
        let cbrush_window = self.ruleset.cbrush_window;

        while self.active_cursor < self.hit_data.len()
            && time - self.hit_data.rows()[self.active_cursor].time > miss_window
        {
            self.active_cursor += 1;
        }

        let mut earliest: Option<(usize, Time)> = None;
        let mut absorb: Option<Time> = None;

        let mut i = self.active_cursor;
        while i < self.hit_data.len() && self.hit_data.rows()[i].time <= time + miss_window {
            let row = &self.hit_data.rows()[i];
            let d = time - row.time;
            match row.status[lane] {
                HitStatus::HitRequired | HitStatus::HoldHeadRequired => {
                    if earliest.is_none_or(|(_, e)| d.abs() < e.abs()) {
                        earliest = Some((i, d));
                    }
                }
                HitStatus::HitAccepted if row.deltas[lane] < -cbrush_window => {
                    if absorb.is_none_or(|a| d.abs() < a.abs()) {
                        absorb = Some(d);
                    }
                }
                _ => {}
            }
            // Column-lock prevention: a candidate inside the cbrush window
            // ends the search.
            if let Some((_, e)) = earliest
                && e.abs() < cbrush_window
            {
                break;
            }
            i += 1;
        }

        match earliest {
            Some((row, d)) if absorb.is_none_or(|a| a.abs() >= d.abs()) => {
                let is_hold =
                    self.hit_data.rows()[row].status[lane] == HitStatus::HoldHeadRequired;
                let delta = d / self.rate;
                self.hit_data.rows_mut()[row].status[lane] = HitStatus::HitAccepted;
                self.hit_data.rows_mut()[row].deltas[lane] = delta;
                if is_hold {
                    self.hold_states[lane] = HoldState::Holding {
                        head: row,
                        head_delta: delta,
                    };
                }
                self.resolve_hit(time, lane, delta, false, is_hold);
            }
            // Absorbed: a clean-up repeat of an earlier fumble
            Some(_) => {}
            None => {
                if let HoldState::MissedHead { head } = self.hold_states[lane] {
                    self.hold_states[lane] = HoldState::MissedHeadThenHeld { head };
                } else if absorb.is_none() {
                    self.state.ghost_taps += 1;
                }
            }
        }
    }

    /// Release-to-tail resolution.
    fn key_up(&mut self, time: Time, lane: usize) {
        self.handle_passive(time);
        self.key_state = self.key_state.without(lane);

        let hs = self.hold_states[lane];
        let head = match hs {
            HoldState::Holding { head, .. }
            | HoldState::Dropped { head, .. }
            | HoldState::MissedHeadThenHeld { head } => head,
            HoldState::MissedHead { .. } | HoldState::Nothing => return,
        };

        let miss_window = self.ruleset.miss_window;
        let mut found = None;
        let mut i = head;
        while i < self.hit_data.len() && self.hit_data.rows()[i].time <= time + miss_window {
            if self.hit_data.rows()[i].status[lane] == HitStatus::ReleaseRequired {
                found = Some(i);
                break;
            }
            i += 1;
        }

        match found {
            Some(row) => {
                let d = time - self.hit_data.rows()[row].time;
                let delta = d / self.rate;
                self.hit_data.rows_mut()[row].status[lane] = HitStatus::ReleaseAccepted;
                self.hit_data.rows_mut()[row].deltas[lane] = delta;
                let dropped = matches!(
                    hs,
                    HoldState::Dropped { .. } | HoldState::MissedHeadThenHeld { .. }
                );
                let head_delta = hs.head_delta().unwrap_or(miss_window);
                self.hold_states[lane] = HoldState::Nothing;
                self.resolve_release(time, lane, delta, head_delta, false, false, dropped);
            }
            None => {
                // Released before the tail window opened
                if let HoldState::Holding { head, head_delta } = hs {
                    self.hold_states[lane] = HoldState::Dropped { head, head_delta };
                    if matches!(self.ruleset.hold_behaviour, HoldBehaviour::OsuStyle { .. }) {
                        self.break_combo(false);
                    }
                }
            }
        }
    }
}

/// A complete scoring run: a [`ReplayCursor`] draining frames into a
/// [`Scorer`].
///
/// Single-threaded and synchronous; `update` is O(rows retired + frames
/// consumed since the last call).
pub struct ScoringRun<'a> {
    cursor: ReplayCursor,
    scorer: Scorer<'a>,
}

impl<'a> ScoringRun<'a> {
    /// Validates the ruleset up front; chart validity is guaranteed by
    /// [`Chart`] construction.
    pub fn new(
        ruleset: &'a Ruleset,
        chart: &Chart,
        replay: ReplayData,
        rate: f32,
    ) -> Result<Self, RulesetError> {
        ruleset.validate()?;
        tracing::debug!(
            ruleset = %ruleset.name,
            keys = chart.keys(),
            rows = chart.rows().len(),
            rate,
            "starting scoring run"
        );
        Ok(ScoringRun {
            cursor: ReplayCursor::new(replay),
            scorer: Scorer::new(ruleset, chart, rate),
        })
    }

    /// Advance the run to the given chart time: drain replay frames, retire
    /// missed notes, sample snapshots.
    pub fn update(&mut self, chart_time: Time) -> Result<(), ReplayError> {
        self.cursor.advance_to(chart_time, &mut self.scorer)?;
        self.scorer.handle_passive(chart_time);
        Ok(())
    }

    /// Drain the replay and retire every remaining row.
    pub fn finish(&mut self) -> Result<(), ReplayError> {
        self.update(Time::INFINITY)
    }

    pub fn scorer(&self) -> &Scorer<'a> {
        &self.scorer
    }

    pub fn on_event(&mut self, subscriber: impl FnMut(&HitEvent) + 'a) {
        self.scorer.on_event(subscriber);
    }

    pub fn state(&self) -> &ScoreState {
        self.scorer.state()
    }

    pub fn events(&self) -> &[HitEvent] {
        self.scorer.events()
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        self.scorer.snapshots()
    }

    pub fn health(&self) -> &HealthBar {
        self.scorer.health()
    }

    pub fn finished(&self) -> bool {
        self.scorer.finished()
    }

    pub fn failed(&self) -> bool {
        self.scorer.failed()
    }

    pub fn accuracy(&self) -> f64 {
        self.scorer.accuracy()
    }

    pub fn grade(&self) -> i32 {
        self.scorer.grade()
    }

    pub fn lamp(&self) -> i32 {
        self.scorer.lamp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vsrg_model::{NoteRow, NoteType, TimedRow};
    use vsrg_rule::presets;

    fn tap_chart(times: &[f32]) -> Chart {
        Chart::new(
            4,
            times
                .iter()
                .map(|&t| TimedRow {
                    time: Time(t),
                    row: NoteRow::empty(4).with(0, NoteType::Normal),
                })
                .collect(),
        )
        .unwrap()
    }

    fn hold_chart() -> Chart {
        Chart::new(
            4,
            vec![
                TimedRow {
                    time: Time(1000.0),
                    row: NoteRow::empty(4).with(0, NoteType::HoldHead),
                },
                TimedRow {
                    time: Time(1500.0),
                    row: NoteRow::empty(4).with(0, NoteType::HoldTail),
                },
            ],
        )
        .unwrap()
    }

    // --- HoldState helpers ---

    #[test]
    fn hold_state_head_tracking() {
        assert_eq!(HoldState::Nothing.head_index(), None);
        assert_eq!(HoldState::MissedHead { head: 7 }.head_index(), Some(7));
        let holding = HoldState::Holding {
            head: 3,
            head_delta: Time(-12.0),
        };
        assert_eq!(holding.head_index(), Some(3));
        assert_eq!(holding.head_delta(), Some(Time(-12.0)));
        assert_eq!(HoldState::MissedHead { head: 3 }.head_delta(), None);
    }

    // --- Press matching ---

    #[test]
    fn press_between_notes_takes_the_nearer_one() {
        let ruleset = presets::standard();
        let chart = tap_chart(&[1000.0, 1100.0]);
        let mut scorer = Scorer::new(&ruleset, &chart, 1.0);

        // 95ms late on the first note, 5ms early on the second
        scorer.key_down(Time(1095.0), 0);
        assert_eq!(scorer.events().len(), 1);
        assert_eq!(scorer.events()[0].delta(), Time(-5.0));
    }

    #[test]
    fn first_candidate_inside_cbrush_window_ends_the_search() {
        let ruleset = presets::standard();
        let chart = tap_chart(&[1000.0, 1100.0]);
        let mut scorer = Scorer::new(&ruleset, &chart, 1.0);

        // 60ms late on the first note is within the cbrush window, so the
        // scan never reaches the (nearer) second note.
        scorer.key_down(Time(1060.0), 0);
        assert_eq!(scorer.events()[0].delta(), Time(60.0));
    }

    #[test]
    fn cleanup_press_is_absorbed_by_an_early_hit() {
        let ruleset = presets::standard();
        let chart = tap_chart(&[1000.0, 1020.0]);
        let mut scorer = Scorer::new(&ruleset, &chart, 1.0);

        scorer.key_down(Time(890.0), 0);
        scorer.key_up(Time(900.0), 0);
        // Closer to the already-hit first note than to the second: swallowed
        scorer.key_down(Time(930.0), 0);
        assert_eq!(scorer.events().len(), 1);
        assert_eq!(scorer.state().ghost_taps, 0);
    }

    #[test]
    fn cleanup_press_after_the_last_note_is_not_a_ghost_tap() {
        let ruleset = presets::standard();
        let chart = tap_chart(&[1000.0]);
        let mut scorer = Scorer::new(&ruleset, &chart, 1.0);

        scorer.key_down(Time(890.0), 0);
        scorer.key_up(Time(900.0), 0);
        scorer.key_down(Time(930.0), 0);
        assert_eq!(scorer.events().len(), 1);
        assert_eq!(scorer.state().ghost_taps, 0);
    }

    #[test]
    fn unmatched_press_counts_as_ghost_tap() {
        let ruleset = presets::standard();
        let chart = tap_chart(&[1000.0]);
        let mut scorer = Scorer::new(&ruleset, &chart, 1.0);

        scorer.key_down(Time(5000.0), 0);
        // The note itself was retired as a miss by the passive sweep
        assert_eq!(scorer.state().ghost_taps, 1);
        assert_eq!(scorer.events().len(), 1);
        assert!(scorer.events()[0].is_miss());
    }

    // --- Hold transitions ---

    #[test]
    fn early_release_drops_the_hold() {
        let ruleset = presets::standard();
        let chart = hold_chart();
        let mut scorer = Scorer::new(&ruleset, &chart, 1.0);

        scorer.key_down(Time(1000.0), 0);
        assert!(matches!(
            scorer.hold_state(0),
            HoldState::Holding { head: 0, .. }
        ));
        scorer.key_up(Time(1100.0), 0);
        assert!(matches!(
            scorer.hold_state(0),
            HoldState::Dropped { head: 0, .. }
        ));
    }

    #[test]
    fn missed_head_becomes_held_on_late_press() {
        let ruleset = presets::standard();
        let chart = hold_chart();
        let mut scorer = Scorer::new(&ruleset, &chart, 1.0);

        scorer.handle_passive(Time(1400.0));
        assert!(matches!(
            scorer.hold_state(0),
            HoldState::MissedHead { head: 0 }
        ));
        scorer.key_down(Time(1400.0), 0);
        assert!(matches!(
            scorer.hold_state(0),
            HoldState::MissedHeadThenHeld { head: 0 }
        ));
    }

    // --- Snapshot bucketing ---

    #[test]
    fn snapshots_cap_at_the_full_series() {
        let ruleset = presets::standard();
        let chart = tap_chart(&[0.0, 1000.0]);
        let mut scorer = Scorer::new(&ruleset, &chart, 1.0);

        scorer.handle_passive(Time(250.0));
        assert_eq!(scorer.snapshots().len(), 25);
        scorer.handle_passive(Time::INFINITY);
        assert_eq!(scorer.snapshots().len(), SNAPSHOT_COUNT);
        // Snapshot times are equally spaced across the duration
        assert_eq!(scorer.snapshots()[24].time, Time(250.0));
    }
}
