//! Solvability-gated generate-and-test loop with tiered fallbacks.
//!
//! Tiers: push target met, best feasible attempt, first feasible attempt of a
//! second pass, then the raw attempt-0 candidate. Only the last is `Unverified`
//! unless cancellation cuts the passes short.

use std::ops::{ControlFlow, Range};
use std::panic;
use std::thread;

use log::{debug, info, warn};

use crate::config::GameOptions;
use crate::solver::{CancelToken, SolveParams, estimate_min_pushes, solve_block_puzzle};
use crate::state::{LevelState, Solvability};

use super::generator::LevelGenerator;
use super::grid::mobility_region_size;
use super::model::{LevelCandidate, Verdict};
use super::progression;
use super::seed::attempt_seed;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerationPass {
    /// Looking for a candidate at or above the push target.
    Targeted,
    /// Accepting the first solvable mobile candidate regardless of pushes.
    Relaxed,
}

/// Reported once per evaluated attempt, in attempt order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttemptProgress {
    pub attempt: u32,
    pub pass: GenerationPass,
    pub width: usize,
    pub height: usize,
    pub seed: u64,
    pub min_pushes: Option<u32>,
}

struct AttemptOutcome {
    attempt: u32,
    candidate: LevelCandidate,
    min_pushes: Option<u32>,
    mobile: bool,
}

impl AttemptOutcome {
    fn feasible_pushes(&self) -> Option<u32> {
        self.min_pushes.filter(|_| self.mobile)
    }
}

struct AttemptContext<'a> {
    options: &'a GameOptions,
    generator: LevelGenerator,
    cancel: &'a CancelToken,
}

impl AttemptContext<'_> {
    fn evaluate(&self, attempt: u32) -> AttemptOutcome {
        let config = &self.options.config;
        let seed = attempt_seed(self.options.seed, attempt, config.seed_stride);
        let candidate = self.generator.build(seed);
        let params = SolveParams::new(&candidate.tiles, candidate.start_area, candidate.exit)
            .with_limits(config.solve_limits())
            .with_cancel(self.cancel);
        let min_pushes = estimate_min_pushes(&params);
        let mobile = monsters_are_mobile(&candidate, config.mobility_floor);
        AttemptOutcome { attempt, candidate, min_pushes, mobile }
    }

    /// Evaluates `attempts` in order, `workers` at a time, feeding each outcome to `visit`.
    ///
    /// Returns `false` if cancellation cut the range short.
    fn run<V>(&self, attempts: Range<u32>, mut visit: V) -> bool
    where
        V: FnMut(AttemptOutcome) -> ControlFlow<()>,
    {
        let workers = self.options.config.workers.max(1) as u32;
        let mut next = attempts.start;
        while next < attempts.end {
            if self.cancel.is_cancelled() {
                warn!("level generation cancelled before attempt {next}");
                return false;
            }
            let chunk = next..next.saturating_add(workers).min(attempts.end);
            next = chunk.end;

            let outcomes = if workers == 1 {
                chunk.map(|attempt| self.evaluate(attempt)).collect()
            } else {
                self.evaluate_parallel(chunk)
            };
            for outcome in outcomes {
                if visit(outcome).is_break() {
                    return true;
                }
            }
        }
        true
    }

    fn evaluate_parallel(&self, chunk: Range<u32>) -> Vec<AttemptOutcome> {
        thread::scope(|scope| {
            let handles: Vec<_> =
                chunk.map(|attempt| scope.spawn(move || self.evaluate(attempt))).collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or_else(|payload| panic::resume_unwind(payload)))
                .collect()
        })
    }
}

/// Second-pass acceptance: any feasible attempt, whatever its push count.
fn accept_relaxed(
    accepted: &mut Option<(AttemptOutcome, Solvability)>,
    outcome: AttemptOutcome,
) -> ControlFlow<()> {
    if outcome.feasible_pushes().is_none() {
        return ControlFlow::Continue(());
    }
    *accepted = Some((outcome, Solvability::BestEffort));
    ControlFlow::Break(())
}

fn monsters_are_mobile(candidate: &LevelCandidate, floor: usize) -> bool {
    candidate
        .monsters
        .iter()
        .all(|monster| mobility_region_size(&candidate.tiles, monster.pos) >= floor)
}

pub(super) fn generate_level<P>(
    options: &GameOptions,
    cancel: &CancelToken,
    mut on_progress: P,
) -> LevelState
where
    P: FnMut(&AttemptProgress),
{
    let config = &options.config;
    let (width, height) = options.effective_size();
    let target = progression::target_pushes(options.level, config.target_pushes_per_level);
    let cancel = config.bounded_token(cancel);
    let context = AttemptContext {
        options,
        generator: LevelGenerator::new(options.level, width, height),
        cancel: &cancel,
    };
    let mut report = |outcome: &AttemptOutcome, pass: GenerationPass| {
        debug!(
            "level {} attempt {} ({pass:?}): seed {} min pushes {:?} mobile {}",
            options.level,
            outcome.attempt,
            outcome.candidate.attempt_seed,
            outcome.min_pushes,
            outcome.mobile
        );
        on_progress(&AttemptProgress {
            attempt: outcome.attempt,
            pass,
            width,
            height,
            seed: outcome.candidate.attempt_seed,
            min_pushes: outcome.min_pushes,
        });
    };

    let mut accepted: Option<(AttemptOutcome, Solvability)> = None;
    let mut best: Option<AttemptOutcome> = None;
    let completed = context.run(0..config.max_attempts, |outcome| {
        report(&outcome, GenerationPass::Targeted);
        let Some(pushes) = outcome.feasible_pushes() else {
            return ControlFlow::Continue(());
        };
        if pushes >= target {
            accepted = Some((outcome, Solvability::Proven));
            return ControlFlow::Break(());
        }
        let best_pushes = best.as_ref().and_then(AttemptOutcome::feasible_pushes);
        if best_pushes.is_none_or(|best_pushes| pushes > best_pushes) {
            best = Some(outcome);
        }
        ControlFlow::Continue(())
    });

    if accepted.is_none() {
        if let Some(outcome) = best.take() {
            warn!(
                "level {} missed its push target {target}; keeping best attempt {}",
                options.level, outcome.attempt
            );
            accepted = Some((outcome, Solvability::BestEffort));
        } else if completed {
            warn!("level {} found no solvable mobile candidate; relaxing the target", options.level);
            let relaxed = config.max_attempts..config.max_attempts.saturating_mul(2);
            context.run(relaxed, |outcome| {
                report(&outcome, GenerationPass::Relaxed);
                accept_relaxed(&mut accepted, outcome)
            });
        }
    }

    let (candidate, solvability, min_pushes) = match accepted {
        Some((outcome, solvability)) => (outcome.candidate, solvability, outcome.min_pushes),
        None => {
            warn!("level {} falling back to an unverified candidate", options.level);
            let seed = attempt_seed(options.seed, 0, config.seed_stride);
            (context.generator.build(seed), Solvability::Unverified, None)
        }
    };

    let solution = min_pushes.and_then(|_| {
        let params = SolveParams::new(&candidate.tiles, candidate.start_area, candidate.exit)
            .with_limits(config.solve_limits())
            .with_cancel(&cancel);
        solve_block_puzzle(&params)
    });
    info!(
        "accepted level {} from attempt seed {} ({solvability:?}, min pushes {min_pushes:?})",
        options.level, candidate.attempt_seed
    );
    let verdict = Verdict { solvability, min_pushes, solution };
    candidate.into_level_state(options.level, options.seed, verdict)
}
