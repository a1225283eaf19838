// SPDX-License-Identifier: MIT OR Apache-2.0

use gammon_core::{BgMove, Collection, CookedValue};

fn parse_and_cook(input: &str) -> Collection {
    let mut collection = Collection::parse(input.as_bytes()).into_result().unwrap();
    collection.cook().unwrap();
    collection
}

#[test]
fn move_parse_grid() {
    // Every dice pair with zero to four syntactically valid point pairs.
    let pair_pool = ["ad", "fj", "mq", "sy"];
    for d1 in 1u8..=6 {
        for d2 in 1u8..=6 {
            for pairs in 0..=4usize {
                let mut text = format!("{}{}", d1, d2);
                for pair in pair_pool.iter().take(pairs) {
                    text.push_str(pair);
                }
                let mv = BgMove::from_wire(&text)
                    .unwrap_or_else(|e| panic!("'{}' failed: {}", text, e));
                assert!(mv.is_regular());
                assert!(!mv.is_double() && !mv.is_take() && !mv.is_drop());
                assert_eq!(mv.die(0), Some(d1), "{}", text);
                assert_eq!(mv.die(1), Some(d2), "{}", text);
                assert_eq!(mv.steps().len(), pairs);
                assert_eq!(mv.to_wire(), text);
            }
        }
    }
}

#[test]
fn cube_words_are_mutually_exclusive() {
    let cases: [(&str, fn(&BgMove) -> bool); 3] = [
        ("double", BgMove::is_double),
        ("take", BgMove::is_take),
        ("drop", BgMove::is_drop),
    ];
    for (text, predicate) in cases {
        let mv = BgMove::from_wire(text).unwrap();
        assert!(predicate(&mv));
        assert!(!mv.is_regular());
        let others = [mv.is_double(), mv.is_take(), mv.is_drop()]
            .iter()
            .filter(|&&b| b)
            .count();
        assert_eq!(others, 1, "'{}' must set exactly one variant", text);
    }
}

#[test]
fn malformed_moves_error_with_the_offending_text() {
    for bad in ["07ad", "3", "12a", "12abc", "12ABCD", "Double", ""] {
        let err = BgMove::from_wire(bad).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Invalid move syntax '{}'", bad),
            "input '{}'",
            bad
        );
    }
}

#[test]
fn moves_cook_inside_documents() {
    let collection = parse_and_cook("(;GM[6];B[21ab];W[double];B[drop])");
    let trees = collection.game_trees();
    let moves: Vec<&CookedValue> = trees[0]
        .nodes()
        .iter()
        .skip(1)
        .map(|node| {
            node.properties()
                .next()
                .and_then(|p| p.cooked())
                .expect("cooked move")
        })
        .collect();
    match moves[0] {
        CookedValue::Move(mv) => {
            assert_eq!(mv.die(0), Some(2));
            assert_eq!(mv.die(1), Some(1));
            assert_eq!(mv.steps(), &[(0, 1)]);
        }
        other => panic!("expected move, got {:?}", other),
    }
    assert!(matches!(moves[1], CookedValue::Move(BgMove::Double)));
    assert!(matches!(moves[2], CookedValue::Move(BgMove::Drop)));
}

#[test]
fn bad_move_notation_fails_cooking() {
    let mut collection = Collection::parse("(;GM[6];B[99xx])".as_bytes())
        .into_result()
        .unwrap();
    let err = collection.cook().unwrap_err();
    assert_eq!(err.to_string(), "Invalid move syntax '99xx'");
}

#[test]
fn cooking_failure_leaves_earlier_siblings_cooked() {
    // Properties cook in identifier order, so CV and GM cook before the
    // malformed MI fails; they stay cooked, nothing is rolled back.
    let mut collection = Collection::parse("(;GM[6]CV[4]MI[nocolon])".as_bytes())
        .into_result()
        .unwrap();
    assert!(collection.cook().is_err());
    let node = &collection.game_trees()[0].nodes()[0];
    assert_eq!(
        node.property("CV").unwrap().cooked(),
        Some(&CookedValue::Number(4))
    );
    assert_eq!(
        node.property("GM").unwrap().cooked(),
        Some(&CookedValue::Number(6))
    );
    assert!(node.property("MI").unwrap().cooked().is_none());
}
