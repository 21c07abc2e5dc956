//! 选词与选项生成

use rand::seq::SliceRandom;
use rand::Rng;

use crate::constants::{DISTRACTOR_COUNT, PLACEHOLDER_MEANING, PLACEHOLDER_WORD};
use crate::queue::types::{QueuedEntry, QuizMode, QuizOptions};
use crate::queue::LearningQueue;

/// 选出下一个要展示的单词。
///
/// 有连错记录的单词总是优先，按 `last_shown` 升序取最久未见的；
/// 否则按 `(priority, last_shown)` 升序。键相同时保留队列中的先后顺序。
pub fn select_next(active: &[QueuedEntry]) -> Option<&QueuedEntry> {
    // min_by_key 在键相等时返回第一个元素
    let error_first = active
        .iter()
        .filter(|entry| entry.error_count > 0)
        .min_by_key(|entry| entry.last_shown);

    error_first.or_else(|| {
        active
            .iter()
            .min_by_key(|entry| (entry.priority, entry.last_shown))
    })
}

fn placeholder_for(mode: QuizMode) -> &'static str {
    match mode {
        QuizMode::WordToMeaning => PLACEHOLDER_MEANING,
        QuizMode::MeaningToWord => PLACEHOLDER_WORD,
    }
}

/// 1 个正确答案 + 3 个干扰项，打乱后返回
pub fn build_options<'a, R>(
    target: &QueuedEntry,
    pool: impl Iterator<Item = &'a QueuedEntry>,
    mode: QuizMode,
    rng: &mut R,
) -> QuizOptions
where
    R: Rng + ?Sized,
{
    let mut candidates: Vec<&QueuedEntry> =
        pool.filter(|entry| entry.id() != target.id()).collect();
    candidates.shuffle(rng);

    let mut options: Vec<(bool, String)> = Vec::with_capacity(DISTRACTOR_COUNT + 1);
    options.push((true, mode.answer_of(&target.word).to_string()));
    options.extend(
        candidates
            .into_iter()
            .take(DISTRACTOR_COUNT)
            .map(|entry| (false, mode.answer_of(&entry.word).to_string())),
    );
    while options.len() < DISTRACTOR_COUNT + 1 {
        options.push((false, placeholder_for(mode).to_string()));
    }

    options.shuffle(rng);
    let correct_index = options
        .iter()
        .position(|(is_correct, _)| *is_correct)
        .unwrap_or(0);

    QuizOptions {
        options: options.into_iter().map(|(_, text)| text).collect(),
        correct_index,
    }
}

impl LearningQueue {
    pub fn pick_next(&self) -> Option<&QueuedEntry> {
        let next = select_next(&self.active);
        if let Some(entry) = next {
            tracing::debug!(
                word_id = %entry.word.id,
                error_count = entry.error_count,
                priority = entry.priority,
                "Picked next word"
            );
        }
        next
    }

    pub fn generate_options(&self, target: &QueuedEntry, mode: QuizMode) -> QuizOptions {
        self.generate_options_with(target, mode, &mut rand::thread_rng())
    }

    /// 同 [`generate_options`](Self::generate_options)，随机源由调用方提供
    pub fn generate_options_with<R>(
        &self,
        target: &QueuedEntry,
        mode: QuizMode,
        rng: &mut R,
    ) -> QuizOptions
    where
        R: Rng + ?Sized,
    {
        build_options(
            target,
            self.active.iter().chain(self.mastered.iter()),
            mode,
            rng,
        )
    }

    pub fn needs_more_words(&self) -> bool {
        self.active.len() < self.batch_size
    }

    /// 活跃队列即将耗尽且尚未达到掌握目标时提前拉词
    pub fn should_prefetch(&self) -> bool {
        self.active.len() <= self.config.prefetch_threshold && !self.is_target_reached()
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::queue::types::LearningItem;

    fn entry(id: &str, priority: u64) -> QueuedEntry {
        QueuedEntry::new(
            LearningItem::new(id, format!("text-{id}"), format!("meaning-{id}")),
            priority,
        )
    }

    #[test]
    fn empty_queue_has_no_next() {
        assert!(select_next(&[]).is_none());
    }

    #[test]
    fn error_entries_preempt_priority() {
        let mut b = entry("b", 5);
        b.error_count = 1;
        b.last_shown = 900;
        let active = vec![entry("a", 0), b];
        assert_eq!(select_next(&active).unwrap().id(), "b");
    }

    #[test]
    fn oldest_error_entry_first() {
        let mut a = entry("a", 0);
        a.error_count = 2;
        a.last_shown = 500;
        let mut b = entry("b", 1);
        b.error_count = 1;
        b.last_shown = 100;
        assert_eq!(select_next(&[a, b]).unwrap().id(), "b");
    }

    #[test]
    fn ties_keep_queue_order() {
        let mut a = entry("a", 3);
        a.error_count = 1;
        let mut b = entry("b", 1);
        b.error_count = 1;
        assert_eq!(select_next(&[a.clone(), b.clone()]).unwrap().id(), "a");
        assert_eq!(select_next(&[b, a]).unwrap().id(), "b");

        let c = entry("c", 2);
        let d = entry("d", 2);
        assert_eq!(select_next(&[c, d]).unwrap().id(), "c");
    }

    #[test]
    fn recency_breaks_priority_ties() {
        let mut a = entry("a", 1);
        a.last_shown = 200;
        let mut b = entry("b", 1);
        b.last_shown = 100;
        let c = entry("c", 2);
        assert_eq!(select_next(&[a, b, c]).unwrap().id(), "b");
    }

    #[test]
    fn options_pad_with_placeholders() {
        let target = entry("a", 0);
        let pool = vec![target.clone(), entry("b", 1)];
        let mut rng = StdRng::seed_from_u64(7);

        let quiz = build_options(&target, pool.iter(), QuizMode::MeaningToWord, &mut rng);
        assert_eq!(quiz.options.len(), 4);
        assert_eq!(quiz.correct_answer(), "text-a");
        assert!(quiz.options.contains(&"text-b".to_string()));
        let placeholders = quiz
            .options
            .iter()
            .filter(|o| o.as_str() == PLACEHOLDER_WORD)
            .count();
        assert_eq!(placeholders, 2);
    }

    #[test]
    fn options_never_repeat_target() {
        let target = entry("a", 0);
        let pool: Vec<QueuedEntry> = (0..10).map(|i| entry(&format!("w{i}"), i)).collect();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..50 {
            let quiz = build_options(
                &target,
                pool.iter().chain(std::iter::once(&target)),
                QuizMode::WordToMeaning,
                &mut rng,
            );
            assert_eq!(quiz.options.len(), 4);
            let hits = quiz.options.iter().filter(|o| *o == "meaning-a").count();
            assert_eq!(hits, 1);
            assert_eq!(quiz.correct_answer(), "meaning-a");
        }
    }

    #[test]
    fn correct_answer_lands_in_every_position() {
        let target = entry("a", 0);
        let pool: Vec<QueuedEntry> = (0..5).map(|i| entry(&format!("w{i}"), i)).collect();
        let mut rng = StdRng::seed_from_u64(1);
        let mut seen = [0usize; 4];

        for _ in 0..400 {
            let quiz = build_options(&target, pool.iter(), QuizMode::WordToMeaning, &mut rng);
            seen[quiz.correct_index] += 1;
        }
        assert!(seen.iter().all(|count| *count > 50), "{seen:?}");
    }
}
