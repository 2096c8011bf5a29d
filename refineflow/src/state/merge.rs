use crate::types::{ActivityState, CategorizedQuestions, Record};

use super::dedup::{dedupe_records, dedupe_strings};

/// Combine the persisted state with a freshly extracted candidate.
///
/// Lists are appended base-first and deduplicated, so nothing recorded earlier
/// is lost and first-seen order is kept. `summary` and `canvas` take the
/// incoming value only when it is non-empty; `last_updated` always does.
pub fn merge(base: &ActivityState, incoming: &ActivityState) -> ActivityState {
    ActivityState {
        summary: if incoming.summary.is_empty() {
            base.summary.clone()
        } else {
            incoming.summary.clone()
        },
        action_items: merge_records(&base.action_items, &incoming.action_items),
        open_questions: merge_questions(&base.open_questions, &incoming.open_questions),
        decisions: merge_records(&base.decisions, &incoming.decisions),
        functional_requirements: merge_strings(
            &base.functional_requirements,
            &incoming.functional_requirements,
        ),
        non_functional_requirements: merge_strings(
            &base.non_functional_requirements,
            &incoming.non_functional_requirements,
        ),
        identified_risks: merge_records(&base.identified_risks, &incoming.identified_risks),
        dependencies: merge_records(&base.dependencies, &incoming.dependencies),
        metrics: merge_records(&base.metrics, &incoming.metrics),
        costs: merge_records(&base.costs, &incoming.costs),
        information_gaps: merge_strings(&base.information_gaps, &incoming.information_gaps),
        canvas: if incoming.canvas.is_empty() {
            base.canvas.clone()
        } else {
            incoming.canvas.clone()
        },
        last_updated: incoming.last_updated.clone(),
    }
}

fn merge_strings(base: &[String], incoming: &[String]) -> Vec<String> {
    dedupe_strings(base.iter().chain(incoming))
}

fn merge_records(base: &[Record], incoming: &[Record]) -> Vec<Record> {
    dedupe_records(base.iter().chain(incoming))
}

// The same question may sit under several categories; dedup is per category.
fn merge_questions(
    base: &CategorizedQuestions,
    incoming: &CategorizedQuestions,
) -> CategorizedQuestions {
    let mut merged = CategorizedQuestions::new();
    for category in base.keys().chain(incoming.keys()) {
        if merged.contains_key(category) {
            continue;
        }
        let from_base = base.get(category).map(Vec::as_slice).unwrap_or_default();
        let from_incoming = incoming
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or_default();
        merged.insert(category.clone(), merge_strings(from_base, from_incoming));
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;
    use std::collections::HashSet;

    fn state(summary: &str, last_updated: &str) -> ActivityState {
        ActivityState::empty(summary, last_updated)
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_merge_summary_and_requirements() {
        let mut base = state("A", "t1");
        base.functional_requirements = strings(&["Req 1"]);
        let mut incoming = state("B", "t2");
        incoming.functional_requirements = strings(&["Req 1", "Req 2"]);

        let merged = merge(&base, &incoming);
        assert_eq!(merged.summary, "B");
        assert_eq!(merged.functional_requirements, strings(&["Req 1", "Req 2"]));
    }

    #[test]
    fn test_merge_keeps_base_summary_when_incoming_empty() {
        let merged = merge(&state("Keep me", "t1"), &state("", "t2"));
        assert_eq!(merged.summary, "Keep me");
        assert_eq!(merged.last_updated, "t2");
    }

    #[test]
    fn test_merge_categories_from_both_sides() {
        let mut base = state("", "t1");
        base.open_questions
            .insert("Frontend".into(), strings(&["Q1", "Q2"]));
        let mut incoming = state("", "t2");
        incoming
            .open_questions
            .insert("Backend".into(), strings(&["Q3"]));

        let merged = merge(&base, &incoming);
        assert_eq!(merged.open_questions["Frontend"], strings(&["Q1", "Q2"]));
        assert_eq!(merged.open_questions["Backend"], strings(&["Q3"]));
    }

    #[test]
    fn test_merge_dedupes_questions_within_category() {
        let mut base = state("", "t1");
        base.open_questions
            .insert("Backend".into(), strings(&["Qual o banco?"]));
        let mut incoming = state("", "t2");
        incoming.open_questions.insert(
            "Backend".into(),
            strings(&["qual o banco? ", "Qual a fila?"]),
        );

        let merged = merge(&base, &incoming);
        assert_eq!(
            merged.open_questions["Backend"],
            strings(&["Qual o banco?", "Qual a fila?"])
        );
    }

    #[test]
    fn test_merge_allows_same_question_in_several_categories() {
        let mut incoming = state("", "t2");
        incoming
            .open_questions
            .insert("Frontend".into(), strings(&["Qual o SLA?"]));
        incoming
            .open_questions
            .insert("Backend".into(), strings(&["Qual o SLA?"]));

        let merged = merge(&state("", "t1"), &incoming);
        assert_eq!(merged.open_questions["Frontend"], strings(&["Qual o SLA?"]));
        assert_eq!(merged.open_questions["Backend"], strings(&["Qual o SLA?"]));
    }

    #[test]
    fn test_merge_keeps_empty_categories() {
        let mut base = state("", "t1");
        base.open_questions.insert("Produto".into(), Vec::new());
        let merged = merge(&base, &state("", "t2"));
        assert!(merged.open_questions["Produto"].is_empty());
    }

    #[test]
    fn test_merge_records_dedupe_by_full_equality() {
        let risk = Record::new()
            .with("risk", "API lenta")
            .with("impact", "Alto");
        let mut base = state("", "t1");
        base.identified_risks = vec![risk.clone()];
        let mut incoming = state("", "t2");
        incoming.identified_risks = vec![
            Record::new().with("impact", "Alto").with("risk", "API lenta"),
            risk.clone().with("mitigation", "Cache"),
        ];

        let merged = merge(&base, &incoming);
        assert_eq!(merged.identified_risks.len(), 2);
        assert_eq!(merged.identified_risks[0], risk);
        assert_eq!(merged.identified_risks[1].get("mitigation"), Some("Cache"));
    }

    #[test]
    fn test_merge_canvas_latest_wins_when_non_empty() {
        let mut base = state("", "t1");
        base.canvas.insert("purpose".into(), json!("old"));

        let kept = merge(&base, &state("", "t2"));
        assert_eq!(kept.canvas["purpose"], json!("old"));

        let mut incoming = state("", "t3");
        incoming.canvas.insert("budget".into(), json!("10k"));
        let replaced = merge(&base, &incoming);
        assert_eq!(replaced.canvas.len(), 1);
        assert_eq!(replaced.canvas["budget"], json!("10k"));
    }

    #[test]
    fn test_merge_does_not_mutate_inputs() {
        let mut base = state("A", "t1");
        base.information_gaps = strings(&["Gap"]);
        let mut incoming = state("B", "t2");
        incoming.information_gaps = strings(&["gap", "Other"]);
        let base_before = base.clone();
        let incoming_before = incoming.clone();

        let _ = merge(&base, &incoming);
        assert_eq!(base, base_before);
        assert_eq!(incoming, incoming_before);
    }

    fn arb_strings() -> impl Strategy<Value = Vec<String>> {
        proptest::collection::vec(prop_oneof![
            Just("Req".to_string()),
            Just(" req ".to_string()),
            Just("REQ".to_string()),
            Just("   ".to_string()),
            "[a-cA-C ]{0,4}",
        ], 0..8)
    }

    fn arb_record() -> impl Strategy<Value = Record> {
        proptest::collection::btree_map("[ab]", "[xy]", 0..3)
            .prop_map(|fields| fields.into_iter().collect())
    }

    fn arb_state() -> impl Strategy<Value = ActivityState> {
        (
            "[a-z]{0,3}",
            "[0-9]{1,4}",
            arb_strings(),
            arb_strings(),
            proptest::collection::vec(arb_record(), 0..6),
            proptest::collection::vec(arb_record(), 0..6),
            proptest::collection::btree_map(
                prop_oneof![Just("Frontend".to_string()), Just("Backend".to_string()), Just("Geral".to_string())],
                arb_strings(),
                0..3,
            ),
        )
            .prop_map(|(summary, ts, frs, gaps, actions, risks, questions)| ActivityState {
                summary,
                last_updated: ts,
                functional_requirements: frs,
                information_gaps: gaps,
                action_items: actions,
                identified_risks: risks,
                open_questions: questions,
                ..ActivityState::default()
            })
    }

    fn no_string_dupes(items: &[String]) -> bool {
        let mut seen = HashSet::new();
        items
            .iter()
            .all(|s| !s.trim().is_empty() && seen.insert(s.trim().to_lowercase()))
    }

    fn no_record_dupes(items: &[Record]) -> bool {
        let mut seen = HashSet::new();
        items.iter().all(|r| seen.insert(r))
    }

    proptest! {
        #[test]
        fn merged_string_lists_have_no_duplicates(a in arb_state(), b in arb_state()) {
            let merged = merge(&a, &b);
            prop_assert!(no_string_dupes(&merged.functional_requirements));
            prop_assert!(no_string_dupes(&merged.information_gaps));
            for questions in merged.open_questions.values() {
                prop_assert!(no_string_dupes(questions));
            }
        }

        #[test]
        fn merged_record_lists_have_no_duplicates(a in arb_state(), b in arb_state()) {
            let merged = merge(&a, &b);
            prop_assert!(no_record_dupes(&merged.action_items));
            prop_assert!(no_record_dupes(&merged.identified_risks));
        }

        #[test]
        fn merged_questions_keep_every_category_in_first_seen_order(a in arb_state(), b in arb_state()) {
            let merged = merge(&a, &b);
            for category in a.open_questions.keys().chain(b.open_questions.keys()) {
                let combined: Vec<String> = a.open_questions.get(category).into_iter().flatten()
                    .chain(b.open_questions.get(category).into_iter().flatten())
                    .cloned()
                    .collect();
                let expected = dedupe_strings(&combined);
                prop_assert_eq!(merged.open_questions.get(category), Some(&expected));
            }
        }

        #[test]
        fn last_updated_always_comes_from_incoming(a in arb_state(), b in arb_state()) {
            prop_assert_eq!(merge(&a, &b).last_updated, b.last_updated.clone());
        }

        #[test]
        fn empty_incoming_summary_keeps_base(a in arb_state(), mut b in arb_state()) {
            b.summary.clear();
            prop_assert_eq!(merge(&a, &b).summary, a.summary.clone());
        }
    }
}
