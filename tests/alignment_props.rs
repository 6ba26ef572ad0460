use editmotion::{EditOp, OpMix, align, align_str, apply_ops, classify, verify_alignment};

fn mix64(mut z: u64) -> u64 {
    // SplitMix64 mixing function.
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

struct SplitMix(u64);

impl SplitMix {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        mix64(self.0)
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }

    /// String over a small alphabet so matches are common.
    fn string(&mut self, max_len: u64) -> String {
        let len = self.below(max_len + 1);
        (0..len)
            .map(|_| char::from(b'A' + self.below(4) as u8))
            .collect()
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur = vec![0usize; b.len() + 1];
    for i in 1..=a.len() {
        cur[0] = i;
        for j in 1..=b.len() {
            let sub = prev[j - 1] + usize::from(a[i - 1] != b[j - 1]);
            cur[j] = sub.min(prev[j] + 1).min(cur[j - 1] + 1);
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

fn chars(s: &str) -> Vec<char> {
    s.chars().collect()
}

#[test]
fn distance_matches_reference_levenshtein() {
    let mut rng = SplitMix(0x5EED);
    for _ in 0..2_000 {
        let a = rng.string(9);
        let b = rng.string(9);
        let al = align_str(&a, &b);
        assert_eq!(al.distance, levenshtein(&a, &b), "{a:?} -> {b:?}");
        assert_eq!(al.ops.len(), al.distance, "{a:?} -> {b:?}");
    }
}

#[test]
fn ops_replay_onto_target() {
    let mut rng = SplitMix(42);
    for _ in 0..2_000 {
        let a = rng.string(10);
        let b = rng.string(10);
        let al = align_str(&a, &b);
        let out = apply_ops(&chars(&a), &al.ops).unwrap();
        assert_eq!(out, chars(&b), "{a:?} -> {b:?} via {:?}", al.ops);
        verify_alignment(&chars(&a), &chars(&b), &al.ops).unwrap();
    }
}

#[test]
fn positions_are_non_decreasing() {
    let mut rng = SplitMix(7);
    for _ in 0..500 {
        let a = rng.string(8);
        let b = rng.string(8);
        let al = align_str(&a, &b);
        assert!(
            al.ops.windows(2).all(|w| w[0].position() <= w[1].position()),
            "{a:?} -> {b:?}: {:?}",
            al.ops
        );
    }
}

#[test]
fn alignment_is_deterministic() {
    let mut rng = SplitMix(99);
    for _ in 0..200 {
        let a = rng.string(12);
        let b = rng.string(12);
        assert_eq!(align_str(&a, &b), align_str(&a, &b));
    }
}

#[test]
fn degenerate_inputs() {
    let same = align_str("HELLO", "HELLO");
    assert_eq!(same.distance, 0);
    assert!(same.ops.is_empty());
    assert_eq!(classify(&same.ops), OpMix::NoOp);

    let from_empty = align_str("", "XYZ");
    assert_eq!(from_empty.distance, 3);
    assert_eq!(classify(&from_empty.ops), OpMix::InsertOnly);
    assert_eq!(apply_ops(&[], &from_empty.ops).unwrap(), chars("XYZ"));

    let to_empty = align_str("XYZ", "");
    assert_eq!(to_empty.distance, 3);
    assert_eq!(classify(&to_empty.ops), OpMix::DeleteOnly);
    assert!(apply_ops(&chars("XYZ"), &to_empty.ops).unwrap().is_empty());

    assert_eq!(align_str("", "").distance, 0);
}

#[test]
fn documented_scenarios() {
    assert_eq!(align_str("KITTEN", "SITTING").distance, 3);

    assert_eq!(
        align_str("CAT", "CATS").ops,
        vec![EditOp::Insert {
            position: 3,
            character: 'S'
        }]
    );
    assert_eq!(
        align_str("CATS", "CAT").ops,
        vec![EditOp::Delete {
            position: 3,
            character: 'S'
        }]
    );
    assert_eq!(
        align_str("CAT", "COT").ops,
        vec![EditOp::Replace {
            position: 1,
            old_character: 'A',
            new_character: 'O'
        }]
    );
    let abc = align_str("ABC", "BCD");
    assert_eq!(
        abc.ops,
        vec![
            EditOp::Delete {
                position: 0,
                character: 'A'
            },
            EditOp::Insert {
                position: 3,
                character: 'D'
            },
        ]
    );
    assert_eq!(classify(&abc.ops), OpMix::Mixed);
}

#[test]
fn generic_sequences_align_too() {
    let a = [1u8, 2, 3, 4];
    let b = [1u8, 3, 4, 5];
    let al = align(&a, &b);
    assert_eq!(al.distance, 2);
    assert_eq!(apply_ops(&a, &al.ops).unwrap(), b.to_vec());
}

#[test]
fn unicode_is_aligned_per_char() {
    let al = align_str("naïve", "naive");
    assert_eq!(
        al.ops,
        vec![EditOp::Replace {
            position: 2,
            old_character: 'ï',
            new_character: 'i'
        }]
    );
}
