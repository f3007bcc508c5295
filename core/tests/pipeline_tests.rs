use index_core::{combine, map_shard, reduce, Count, MapperKind, PartialPosting};
use index_core::tokenizer::tokenize;
use std::collections::HashMap;

/// Run the whole pipeline in-process: map every shard, optionally combine
/// each shard's grouped emissions, shuffle by term, reduce. Returns the
/// final index as term -> sorted postings.
fn final_index(
    kind: MapperKind,
    corpus: &[(&str, &str)],
    use_combiner: bool,
) -> HashMap<String, Vec<(String, Count)>> {
    let mut shuffled: HashMap<String, Vec<PartialPosting>> = HashMap::new();
    for (doc, text) in corpus {
        let mut emitted = Vec::new();
        map_shard(kind, doc, text.lines(), &mut |r| emitted.push(r));
        let outgoing = if use_combiner {
            let mut groups: HashMap<String, Vec<PartialPosting>> = HashMap::new();
            for r in emitted {
                groups.entry(r.term.clone()).or_default().push(r);
            }
            groups
                .into_iter()
                .map(|(term, group)| combine(&term, &group).unwrap())
                .collect()
        } else {
            emitted
        };
        for r in outgoing {
            shuffled.entry(r.term.clone()).or_default().push(r);
        }
    }
    shuffled
        .into_iter()
        .map(|(term, records)| {
            let out = reduce(&term, &records).unwrap();
            (term, out.postings)
        })
        .collect()
}

const TWO_DOCS: &[(&str, &str)] = &[("doc1", "The cat sat."), ("doc2", "The cat ran.")];

#[test]
fn two_document_scenario() {
    let index = final_index(MapperKind::Counting, TWO_DOCS, true);
    assert_eq!(index["cat"], vec![("doc1".into(), 1), ("doc2".into(), 1)]);
    assert_eq!(index["the"], vec![("doc1".into(), 1), ("doc2".into(), 1)]);
    assert_eq!(index["sat"], vec![("doc1".into(), 1)]);
    assert_eq!(index["ran"], vec![("doc2".into(), 1)]);
    assert_eq!(index.len(), 4);
}

#[test]
fn repeated_term_counts_every_occurrence() {
    let corpus = &[("doc1", "cat cat cat")];
    for kind in [MapperKind::Counting, MapperKind::Presence] {
        for use_combiner in [false, true] {
            let index = final_index(kind, corpus, use_combiner);
            assert_eq!(index["cat"], vec![("doc1".into(), 3)], "{kind:?} combiner={use_combiner}");
        }
    }
}

#[test]
fn mapper_variants_are_equivalent() {
    let corpus = &[
        ("a.txt", "Apples and oranges.\nApples again!"),
        ("b.txt", "oranges ORANGES oranges"),
        ("c.txt", ""),
    ];
    let counting = final_index(MapperKind::Counting, corpus, false);
    let presence = final_index(MapperKind::Presence, corpus, false);
    assert_eq!(counting, presence);
    assert_eq!(counting["apples"], vec![("a.txt".into(), 2)]);
    assert_eq!(counting["oranges"], vec![("a.txt".into(), 1), ("b.txt".into(), 3)]);
}

#[test]
fn combiner_is_transparent() {
    let corpus = &[
        ("d1", "to be or not to be"),
        ("d2", "be quick, be very quick"),
    ];
    for kind in [MapperKind::Counting, MapperKind::Presence] {
        let without = final_index(kind, corpus, false);
        let with = final_index(kind, corpus, true);
        assert_eq!(without, with, "{kind:?}");
    }
}

#[test]
fn combiner_is_reentrant_on_arbitrary_groupings() {
    // Per-occurrence records for "be" spread across two documents.
    let records = vec![
        PartialPosting::single("be", "d1", 1),
        PartialPosting::single("be", "d1", 1),
        PartialPosting::single("be", "d2", 1),
        PartialPosting::single("be", "d1", 1),
        PartialPosting::single("be", "d2", 1),
    ];

    let all_at_once = reduce("be", &records).unwrap();

    // One combiner pass over an uneven split, then reduce.
    let first = combine("be", &records[..2]).unwrap();
    let second = combine("be", &records[2..]).unwrap();
    let split = reduce("be", &[first.clone(), second.clone()]).unwrap();

    // Re-combining combiner output must not change anything either.
    let recombined = combine("be", &[first, second]).unwrap();
    let nested = reduce("be", &[recombined]).unwrap();

    assert_eq!(all_at_once, split);
    assert_eq!(all_at_once, nested);
    assert_eq!(all_at_once.postings, vec![("d1".into(), 3), ("d2".into(), 2)]);
}

#[test]
fn additivity_matches_raw_occurrences() {
    let text = "dog dog cat\ndog bird\n\nbird dog";
    let occurrences = {
        let mut counts: HashMap<String, Count> = HashMap::new();
        for line in text.lines() {
            for term in tokenize(line) {
                *counts.entry(term).or_insert(0) += 1;
            }
        }
        counts
    };
    let index = final_index(MapperKind::Presence, &[("d", text)], true);
    for (term, count) in occurrences {
        assert_eq!(index[&term], vec![("d".into(), count)]);
    }
    assert_eq!(index["dog"], vec![("d".into(), 4)]);
}

#[test]
fn tokenization_is_idempotent() {
    let line = "The CAT's 9 lives -- over_there!";
    assert_eq!(tokenize(line), tokenize(line));
}

#[test]
fn empty_document_contributes_nothing() {
    let corpus = &[("empty", ""), ("doc1", "cat")];
    for kind in [MapperKind::Counting, MapperKind::Presence] {
        let index = final_index(kind, corpus, true);
        assert_eq!(index.len(), 1);
        assert_eq!(index["cat"], vec![("doc1".into(), 1)]);
    }
}
