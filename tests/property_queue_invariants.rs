mod common;

use std::collections::HashSet;

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use learning_queue::config::QueueConfig;
use learning_queue::queue::types::QuizMode;

use common::fixtures::{item, queue, queue_with};

#[derive(Debug, Clone)]
enum Op {
    Add(Vec<u8>),
    Answer(u8, bool),
    Tick(u16),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        prop::collection::vec(0_u8..20, 0..6).prop_map(Op::Add),
        (0_u8..20, any::<bool>()).prop_map(|(id, correct)| Op::Answer(id, correct)),
        (0_u16..500).prop_map(Op::Tick),
    ]
}

proptest! {
    #[test]
    fn pt_queue_invariants_hold(ops in prop::collection::vec(op_strategy(), 1..80)) {
        let mut t = queue();
        let mut ever_mastered: HashSet<String> = HashSet::new();

        for op in ops {
            match op {
                Op::Add(ids) => {
                    let max_before = t.queue.active().iter().map(|e| e.priority).max();
                    let known: HashSet<String> = t.queue.get_all_word_ids().into_iter().collect();
                    let batch = ids.iter().map(|id| item(&format!("w{id}"))).collect();
                    t.queue.add_words(batch);

                    for entry in t.queue.active() {
                        if known.contains(entry.id()) {
                            continue;
                        }
                        if let Some(max) = max_before {
                            prop_assert!(entry.priority > max);
                        }
                    }
                }
                Op::Answer(id, correct) => {
                    let id = format!("w{id}");
                    let was_active = t.queue.active().iter().any(|e| e.id() == id);
                    let before = t.queue.entry(&id).map(|e| e.correct_count);
                    let outcome = t.queue.record_answer(&id, correct, Some(1_000));

                    if !was_active {
                        prop_assert!(!outcome.mastered);
                    } else if outcome.mastered {
                        prop_assert!(correct);
                        prop_assert_eq!(before.map(|c| c + 1), Some(t.queue.config().mastery_threshold));
                        prop_assert!(ever_mastered.insert(id.clone()));
                    }

                    if let Some(entry) = t.queue.entry(&id) {
                        prop_assert!(entry.correct_count == 0 || entry.error_count == 0);
                    }
                }
                Op::Tick(ms) => {
                    t.clock.advance(i64::from(ms));
                }
            }

            let ids = t.queue.get_all_word_ids();
            let unique: HashSet<&String> = ids.iter().collect();
            prop_assert_eq!(unique.len(), ids.len());

            for id in &ever_mastered {
                prop_assert!(!t.queue.active().iter().any(|e| e.id() == id));
            }
            prop_assert!(t.queue.history().len() <= t.queue.config().max_answer_history);
        }
    }

    #[test]
    fn pt_error_entries_always_picked_first(
        error_flags in prop::collection::vec(any::<bool>(), 1..15),
    ) {
        let mut t = queue_with(QueueConfig::default());
        let batch = (0..error_flags.len()).map(|i| item(&format!("w{i}"))).collect();
        t.queue.load_words(batch);
        for (i, flag) in error_flags.iter().enumerate() {
            if *flag {
                t.clock.advance(5);
                t.queue.record_answer(&format!("w{i}"), false, None);
            }
        }

        let picked = t.queue.pick_next().unwrap();
        if error_flags.iter().any(|f| *f) {
            prop_assert!(picked.error_count > 0);
        } else {
            prop_assert_eq!(picked.id(), "w0");
        }
    }

    #[test]
    fn pt_options_always_four(pool in 1_usize..8, seed in any::<u64>(), meaning in any::<bool>()) {
        let mut t = queue();
        t.queue.load_words((0..pool).map(|i| item(&format!("w{i}"))).collect());
        let mode = if meaning { QuizMode::WordToMeaning } else { QuizMode::MeaningToWord };
        let target = t.queue.pick_next().unwrap().clone();

        let mut rng = StdRng::seed_from_u64(seed);
        let quiz = t.queue.generate_options_with(&target, mode, &mut rng);
        prop_assert_eq!(quiz.options.len(), 4);
        prop_assert!(quiz.correct_index < 4);
        prop_assert_eq!(quiz.correct_answer(), mode.answer_of(&target.word));
    }
}
