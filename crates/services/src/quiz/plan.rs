use rand::Rng;
use rand::seq::SliceRandom;

use quiz_core::model::Question;

pub const MIN_QUESTION_COUNT: u32 = 1;
pub const MAX_QUESTION_COUNT: u32 = 50;
pub const DEFAULT_QUESTION_COUNT: u32 = 10;
pub const MIN_SECONDS_PER_QUESTION: u32 = 5;
pub const DEFAULT_SECONDS_PER_QUESTION: u32 = 30;

/// Settings chosen on the start screen, already clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizOptions {
    count: u32,
    timed: bool,
    seconds_per_question: u32,
}

impl Default for QuizOptions {
    fn default() -> Self {
        Self {
            count: DEFAULT_QUESTION_COUNT,
            timed: false,
            seconds_per_question: DEFAULT_SECONDS_PER_QUESTION,
        }
    }
}

impl QuizOptions {
    /// Clamp `count` to 1..=50 and `seconds_per_question` to at least 5.
    ///
    /// A count of zero means "not chosen" and falls back to the default.
    #[must_use]
    pub fn new(count: u32, timed: bool, seconds_per_question: u32) -> Self {
        let count = if count == 0 {
            DEFAULT_QUESTION_COUNT
        } else {
            count.clamp(MIN_QUESTION_COUNT, MAX_QUESTION_COUNT)
        };
        Self {
            count,
            timed,
            seconds_per_question: seconds_per_question.max(MIN_SECONDS_PER_QUESTION),
        }
    }

    /// Build options from raw form input.
    ///
    /// Only the leading integer of each field counts. Missing numbers fall back to the defaults before clamping;
    /// negative numbers clamp to the minimum.
    #[must_use]
    pub fn from_raw(count: &str, timed: bool, seconds_per_question: &str) -> Self {
        let count = parse_or(count, DEFAULT_QUESTION_COUNT);
        let seconds = parse_or(seconds_per_question, DEFAULT_SECONDS_PER_QUESTION);
        Self::new(count, timed, seconds)
    }

    #[must_use]
    pub fn count(&self) -> u32 {
        self.count
    }

    #[must_use]
    pub fn timed(&self) -> bool {
        self.timed
    }

    #[must_use]
    pub fn seconds_per_question(&self) -> u32 {
        self.seconds_per_question
    }
}

fn parse_or(raw: &str, default: u32) -> u32 {
    match leading_int(raw) {
        None | Some(0) => default,
        Some(value) if value < 0 => 1,
        Some(value) => u32::try_from(value).unwrap_or(u32::MAX),
    }
}

/// Integer prefix of `raw`: optional sign then digits, ignoring whatever
/// follows. `"12abc"` is 12 and `"3.5"` is 3.
fn leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    let magnitude = rest[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Pick `min(count, bank.len())` distinct questions in random order.
///
/// The bank itself is left untouched.
#[must_use]
pub fn sample_questions<R>(bank: &[Question], count: u32, rng: &mut R) -> Vec<Question>
where
    R: Rng + ?Sized,
{
    let take = usize::try_from(count).unwrap_or(usize::MAX).min(bank.len());
    let mut picked = bank.to_vec();
    picked.shuffle(rng);
    picked.truncate(take);
    picked
}
