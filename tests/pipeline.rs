//! End-to-end runs of score, choose, diff and summarize with a stub ranker.

use geo_eval::attribution::compute_position_weighted_word_count;
use geo_eval::chooser::choose_by_blended_score;
use geo_eval::{
    DiffMode, Evaluator, ExperimentRow, LexRankRanker, ReportOptions, ScorePair, ScoreWeights,
    SentenceRanker, evaluate_diff, render_report, summarize,
};

/// Scores each candidate by its length in words, which keeps the expected
/// numbers easy to derive by hand.
struct WordLengthRanker;

impl SentenceRanker for WordLengthRanker {
    fn rank_sentences(&self, _corpus: &[Vec<String>], candidates: &[String]) -> Vec<f64> {
        candidates
            .iter()
            .map(|sentence| sentence.split_whitespace().count() as f64)
            .collect()
    }
}

const SOURCES: [&str; 3] = [
    "Solar panels convert sunlight into electricity.",
    "Wind turbines generate power from moving air.",
    "Hydroelectric dams use flowing water.",
];

#[test]
fn later_sentence_contributes_word_count_over_position() {
    let sentences = ["Intro without citations.", "[1] one two three"];
    let weights = compute_position_weighted_word_count(&sentences);
    assert_eq!(weights.get(&1), Some(&1.5));
    assert_eq!(weights.len(), 1);
}

#[test]
fn evaluate_choose_edit_and_summarize() {
    let evaluator = Evaluator::new(WordLengthRanker);
    let weights = ScoreWeights::default();

    let before_response = "Solar power is clean [1]. Wind is cheap [2]. Dams are reliable [3].";
    let before = evaluator
        .evaluate(before_response, &SOURCES)
        .expect("baseline evaluation");
    assert_eq!(before.len(), 3);
    // relevance 5, 4 and 4 for the three sentences; the first is 5 words at position 1
    assert_eq!(before[0], ScorePair::new(5.0 / 13.0, 1.0));

    // the last source sits furthest down the answer, so it is the one to edit
    let chosen = choose_by_blended_score(&SOURCES, &before, &weights);
    assert_eq!(chosen, 2);

    let after_response = concat!(
        "Dams are reliable and store energy for later use [3]. ",
        "Solar power is clean [1]. Wind is cheap [2]."
    );
    let after = evaluator
        .evaluate(after_response, &SOURCES)
        .expect("edited evaluation");

    let deltas = evaluate_diff(&before, &after, DiffMode::Strict).expect("same source count");
    let chosen_delta = deltas[2];
    assert!(chosen_delta.importance_delta_pct > 0.0);
    assert!(chosen_delta.word_count_delta_pct > 0.0);

    let rows = vec![ExperimentRow {
        id: Some("energy".to_string()),
        batch_id: None,
        deltas,
        chosen_index: Some(chosen),
    }];
    let summary = summarize(&rows, &weights).expect("one qualifying row");
    assert_eq!(summary.n, 1);
    assert_eq!(summary.positive_count_total, Some(1));

    let report = render_report(&summary, &ReportOptions::new("Reorder", 72), None);
    assert!(report.contains("[Reorder] Evaluation Summary"));
    assert!(report.contains("overall positive:1, overall negative:0"));
}

#[test]
fn lexrank_evaluation_is_bit_identical_across_runs() {
    let evaluator = Evaluator::new(LexRankRanker::default());
    let response = "Solar panels turn sunlight into power [1]. \
        Wind turbines spin in moving air [2]. \
        Both solar and wind power are renewable [1][2]. \
        Dams hold back water [3].";

    let first = evaluator.evaluate(response, &SOURCES).expect("first run");
    let second = evaluator.evaluate(response, &SOURCES).expect("second run");

    assert_eq!(first.len(), SOURCES.len());
    for (left, right) in first.iter().zip(&second) {
        assert_eq!(left.importance.to_bits(), right.importance.to_bits());
        assert_eq!(
            left.position_weighted_word_count.to_bits(),
            right.position_weighted_word_count.to_bits()
        );
    }

    let importance_sum = first.iter().map(|pair| pair.importance).sum::<f64>();
    assert!((importance_sum - 1.0).abs() < 1e-9);
}

#[test]
fn uncited_response_scores_zero_everywhere() {
    let evaluator = Evaluator::new(WordLengthRanker);
    let scores = evaluator
        .evaluate("Renewable energy is growing quickly.", &SOURCES)
        .expect("evaluation");
    assert!(scores.iter().all(|pair| *pair == ScorePair::new(0.0, 0.0)));
    assert_eq!(
        choose_by_blended_score(&SOURCES, &scores, &ScoreWeights::default()),
        geo_eval::NO_DOCUMENT
    );
}
