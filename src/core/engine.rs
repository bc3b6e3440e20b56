use crate::attacks::dice::Dice;
use crate::attacks::selector::AttackSelector;
use crate::config::AppConfig;
use crate::core::error::TrainerError;
use crate::core::types::{DisplayPayload, PhishResult, Round};
use crate::core::url::split;
use crate::progress::ProgressMachine;
use crate::sources::UrlSource;

#[derive(Debug, Clone)]
pub struct TrainerSettings {
    pub phish_percent: u8,
    pub points_per_level: u32,
    pub max_resamples: usize,
}

impl Default for TrainerSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for TrainerSettings {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            phish_percent: cfg.phish_percent,
            points_per_level: cfg.points_per_level,
            max_resamples: cfg.max_resamples,
        }
    }
}

/// Runs training rounds: draws a URL, maybe attacks it, judges the user's
/// answers and folds the outcome into the progress machine it owns.
pub struct Trainer {
    source: Box<dyn UrlSource>,
    selector: AttackSelector,
    dice: Box<dyn Dice>,
    progress: ProgressMachine,
    settings: TrainerSettings,
    points: u32,
    current: Option<Round>,
}

impl Trainer {
    /// The progress machine must already be loaded, so that outcomes never
    /// land on top of not-yet-loaded history.
    pub fn new(
        source: Box<dyn UrlSource>,
        selector: AttackSelector,
        dice: Box<dyn Dice>,
        progress: ProgressMachine,
        settings: TrainerSettings,
    ) -> Result<Self, TrainerError> {
        if !progress.is_ready() {
            return Err(TrainerError::NotReady);
        }
        Ok(Self {
            source,
            selector,
            dice,
            progress,
            settings,
            points: 0,
            current: None,
        })
    }

    /// Resets the per-level points. Persisted counters are untouched.
    pub async fn start_level(&mut self, level: u32) -> Result<(), TrainerError> {
        self.points = 0;
        self.current = None;
        self.progress.set_level(level).await
    }

    pub fn level(&self) -> u32 {
        self.progress.level()
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn points_needed(&self) -> u32 {
        self.settings.points_per_level
    }

    pub fn level_complete(&self) -> bool {
        self.points >= self.settings.points_per_level
    }

    pub fn current_round(&self) -> Option<&Round> {
        self.current.as_ref()
    }

    pub fn progress(&self) -> &ProgressMachine {
        &self.progress
    }

    pub fn progress_mut(&mut self) -> &mut ProgressMachine {
        &mut self.progress
    }

    /// Draws the next round. Malformed candidates and attacks that do not
    /// fit a URL are skipped; the source itself is never retried.
    pub async fn next_round(&mut self) -> Result<DisplayPayload, TrainerError> {
        self.current = None;
        let level = self.progress.level();

        for attempt in 1..=self.settings.max_resamples {
            let Some(url) = self.source.next_candidate_url().await else {
                return Err(TrainerError::NoUrlAvailable);
            };
            let parts = match split(&url) {
                Ok(parts) => parts,
                Err(err) => {
                    tracing::debug!(attempt, "skipping candidate: {}", err);
                    continue;
                }
            };
            let lesson = self.selector.pick(level, self.dice.as_mut());
            let is_phish = self.dice.roll(100) < usize::from(self.settings.phish_percent);
            let (shown, attack) = if is_phish {
                match lesson.apply(&parts, self.dice.as_mut()) {
                    Ok(shown) => (shown, Some(lesson)),
                    Err(err) => {
                        tracing::debug!(attempt, "resampling: {}", err);
                        continue;
                    }
                }
            } else {
                (parts, None)
            };

            let round = Round {
                source_url: url,
                lesson,
                attack,
                shown,
                verdict: None,
                part_choice: None,
            };
            let payload = round.payload();
            self.current = Some(round);
            return Ok(payload);
        }

        tracing::warn!(
            "no usable url after {} candidates",
            self.settings.max_resamples
        );
        Err(TrainerError::NoUrlAvailable)
    }

    /// Judges the "is this phish?" answer for the active round.
    pub async fn judge_verdict(&mut self, is_phish_guess: bool) -> Result<PhishResult, TrainerError> {
        let is_phish = match &self.current {
            Some(round) if round.verdict.is_none() => round.is_phish(),
            _ => return Err(TrainerError::NoActiveRound),
        };
        let result = PhishResult::from_judgement(is_phish, is_phish_guess);
        self.progress.add_result(result).await?;
        if let Some(round) = self.current.as_mut() {
            round.verdict = Some(result);
        }
        if result.is_correct() {
            self.points += 1;
        }
        Ok(result)
    }

    /// Whether `selected` is a part carrying the attack. Picks before the
    /// verdict are only answered; the first pick after a detected phish
    /// earns a bonus point when correct.
    pub fn judge_part(&mut self, selected: usize) -> Result<bool, TrainerError> {
        let round = self.current.as_mut().ok_or(TrainerError::NoActiveRound)?;
        let correct = round.attack.is_some_and(|a| a.is_correct_part(selected));
        if round.verdict.is_some() && round.part_choice.is_none() {
            round.part_choice = Some(selected);
            if correct && round.verdict == Some(PhishResult::PhishDetected) {
                self.points += 1;
            }
        }
        Ok(correct)
    }

    /// Waits for outstanding saves.
    pub async fn shutdown(&mut self) {
        self.progress.flush().await;
    }
}
