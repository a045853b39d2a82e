use std::sync::Arc;

use proptest::prelude::*;

use super::*;

#[test]
fn capacity_follows_growth_rule_on_push() {
    let mut array = TypedArray::new(ArrayKind::Int);
    assert_eq!(array.capacity(), 0);

    for k in 1..=100u32 {
        array.push_int(k).unwrap();
        assert_eq!(array.capacity(), ((k as usize / 16) + 1) * 16, "after {k} pushes");
    }
    assert_eq!(array.len(), 100);
}

#[test]
fn first_and_seventeenth_push() {
    let mut array = TypedArray::new(ArrayKind::Str);
    array.push_string(Some("a")).unwrap();
    assert_eq!(array.capacity(), 16);
    for _ in 1..17 {
        array.push_string(Some("b")).unwrap();
    }
    assert_eq!(array.len(), 17);
    assert_eq!(array.capacity(), 32);
}

#[test]
fn indexed_set_jumps_and_zero_fills() {
    let mut array = TypedArray::new(ArrayKind::Int);
    array.push_int(9).unwrap();
    array.set_int(1000, 5).unwrap();

    assert_eq!(array.len(), 1001);
    assert_eq!(array.capacity(), 1008);
    assert_eq!(array.get_int(0), 9);
    assert_eq!(array.get_int(500), 0);
    assert_eq!(array.get_int(1000), 5);

    let mut strings = TypedArray::new(ArrayKind::Str);
    strings.set_string(3, Some("x")).unwrap();
    assert_eq!(strings.get_string(0), None);
    assert_eq!(strings.get_string(3).as_deref(), Some("x"));
}

#[test]
fn indexed_set_past_addressable_range_fails_cleanly() {
    let mut array = TypedArray::new(ArrayKind::Int);
    array.push_int(7).unwrap();

    for index in [usize::MAX, usize::MAX - 3] {
        assert!(matches!(
            array.set_int(index, 1),
            Err(ArrayError::Alloc { .. })
        ));
    }
    let mut strings = TypedArray::new(ArrayKind::Str);
    assert!(strings.set_string(usize::MAX, Some("x")).is_err());

    assert_eq!(array.len(), 1);
    assert_eq!(array.capacity(), 16);
    assert_eq!(array.get_int(0), 7);
    assert_eq!(grown_capacity(usize::MAX - 3), None);
    assert_eq!(grown_capacity(1000), Some(1008));
}

#[test]
fn int_and_float_onto_string_array() {
    let mut array = TypedArray::new(ArrayKind::Str);
    array.push_int(42).unwrap();
    array.push_float(1.5).unwrap();
    assert_eq!(array.get_string(0).as_deref(), Some("42"));
    assert_eq!(array.get_string(1).as_deref(), Some("1.500000"));
}

#[test]
fn float_onto_int_array_truncates() {
    let mut array = TypedArray::new(ArrayKind::Int);
    array.push_float(3.9).unwrap();
    array.push_string(Some("17 torches")).unwrap();
    array.push_string(None).unwrap();
    assert_eq!(array.get_int(0), 3);
    assert_eq!(array.get_int(1), 17);
    assert_eq!(array.get_int(2), 0);
}

#[test]
fn scalars_onto_float_array() {
    let mut array = TypedArray::new(ArrayKind::Float);
    array.push_int(2).unwrap();
    array.push_string(Some("0.25m")).unwrap();
    assert_eq!(array.get_float(0), 2.0);
    assert_eq!(array.get_float(1), 0.25);
    assert_eq!(array.get_int(1), 0);
    assert_eq!(array.get_string(0).as_deref(), Some("2.000000"));
}

#[test]
fn pointer_arrays_reject_scalars_and_vice_versa() {
    let mut ptrs = TypedArray::new(ArrayKind::Ptr);
    let err = ptrs.push_int(1).unwrap_err();
    assert_eq!(
        err,
        ArrayError::KindMismatch {
            array: ArrayKind::Ptr,
            op: ArrayKind::Int
        }
    );
    assert!(ptrs.push_string(Some("x")).is_err());
    assert!(ptrs.set_float(0, 1.0).is_err());
    assert!(ptrs.is_empty());
    assert_eq!(ptrs.capacity(), 0);

    let mut ints = TypedArray::new(ArrayKind::Int);
    let p: Opaque = Arc::new(5u8);
    assert!(ints.push_ptr(Some(p.clone())).is_err());
    assert!(ints.insert_ptr(p).is_err());
    assert!(ints.is_empty());
}

#[test]
fn pops_coerce_and_report_empty() {
    let mut array = TypedArray::from_ints([1, 2, 3]).unwrap();
    assert_eq!(array.pop_string().as_deref(), Some("3"));
    assert_eq!(array.pop_float(), Some(2.0));
    assert_eq!(array.pop_int(), Some(1));
    assert_eq!(array.pop_int(), None);

    let mut strings = TypedArray::new(ArrayKind::Str);
    strings.push_string(None).unwrap();
    strings.push_string(Some("8")).unwrap();
    assert_eq!(strings.pop_int(), Some(8));
    assert_eq!(strings.pop_string(), None);
    assert!(strings.is_empty());
}

#[test]
fn find_and_remove_do_not_coerce() {
    let mut strings = TypedArray::from_strings(["1", "2", "3"]).unwrap();
    assert_eq!(strings.find_string(Some("2")), Some(1));
    assert_eq!(strings.find_int(2), None);
    assert!(!strings.remove_int(2));
    assert!(strings.remove_string(Some("2")));
    assert_eq!(strings.find_string(Some("3")), Some(1));

    let mut floats = TypedArray::new(ArrayKind::Float);
    floats.push_float(0.5).unwrap();
    assert_eq!(floats.find_float(0.5), Some(0));
    assert!(floats.remove_float(0.5));
    assert!(floats.is_empty());
    assert!(!floats.remove_at(0));
}

#[test]
fn pointer_identity_unique_and_insert() {
    let a: Opaque = Arc::new(String::from("node"));
    let b: Opaque = Arc::new(String::from("node"));
    let mut ptrs = TypedArray::new(ArrayKind::Ptr);

    assert_eq!(ptrs.push_unique_ptr(a.clone()).unwrap(), 0);
    assert_eq!(ptrs.push_unique_ptr(a.clone()).unwrap(), 0);
    assert_eq!(ptrs.push_unique_ptr(b.clone()).unwrap(), 1);
    assert_eq!(ptrs.len(), 2);

    ptrs.set_ptr(0, None).unwrap();
    assert_eq!(ptrs.find_ptr(&a), None);
    assert_eq!(ptrs.insert_ptr(a.clone()).unwrap(), 0);
    assert_eq!(ptrs.insert_ptr(a.clone()).unwrap(), 2);

    assert!(ptrs.remove_ptr(&b));
    assert_eq!(ptrs.len(), 2);
    let first = ptrs.get_ptr(0).unwrap();
    assert!(first.downcast_ref::<String>().is_some_and(|s| s == "node"));
}

#[test]
fn join_rules() {
    let words = TypedArray::from_strings(["give", "dirt", "5"]).unwrap();
    assert_eq!(words.join(None, 0).as_deref(), Some("give dirt 5"));
    assert_eq!(words.join(Some(","), 1).as_deref(), Some("dirt,5"));
    assert_eq!(words.join(None, 3), None);

    let ints = TypedArray::from_ints([1]).unwrap();
    assert_eq!(ints.join(None, 0), None);

    let mut with_null = TypedArray::from_strings(["a"]).unwrap();
    with_null.push_string(None).unwrap();
    with_null.push_string(Some("c")).unwrap();
    assert_eq!(with_null.join(Some("-"), 0).as_deref(), Some("a--c"));
}

#[test]
fn split_then_join_is_identity_on_simple_input() {
    let tokens = split("a b c", " ", false).unwrap();
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens.join(Some(" "), 0).as_deref(), Some("a b c"));
}

#[test]
fn split_empty_tokens_and_long_tokens() {
    let kept = split(",a,,b,", ",", true).unwrap();
    assert_eq!(kept.strings().collect::<Vec<_>>(), vec![Some(""), Some("a"), Some(""), Some("b"), Some("")]);

    let dropped = split(",a,,b,", ",", false).unwrap();
    assert_eq!(dropped.strings().collect::<Vec<_>>(), vec![Some("a"), Some("b")]);

    let multi = split("x::y::z", "::", false).unwrap();
    assert_eq!(multi.len(), 3);

    let long = "q".repeat(10_000);
    let single = split(&format!("{long} end"), " ", false).unwrap();
    assert_eq!(single.get_string(0).as_deref(), Some(long.as_str()));

    assert_eq!(split("whole", "", false).unwrap().len(), 1);
    assert!(split("", " ", false).unwrap().is_empty());
}

#[test]
fn compare_across_kinds() {
    let ints = TypedArray::from_ints([1, 2, 3]).unwrap();
    let strings = TypedArray::from_strings(["1", "2", "3"]).unwrap();
    let other = TypedArray::from_strings(["1", "2", "4"]).unwrap();
    let short = TypedArray::from_ints([1, 2]).unwrap();

    assert_eq!(ints.compare(&strings), ArrayComparison::Equal);
    assert_eq!(strings.compare(&ints), ArrayComparison::Equal);
    assert_eq!(ints.compare(&other).code(), 1);
    assert_eq!(ints.compare(&short).code(), -1);
    assert_eq!(compare_opt(None, Some(&ints)), ArrayComparison::Incomparable);
    assert_eq!(compare_opt(Some(&ints), Some(&ints)), ArrayComparison::Equal);

    let ptrs = TypedArray::from_ptrs([Arc::new(1u8) as Opaque]).unwrap();
    let one = TypedArray::from_ints([1]).unwrap();
    assert_eq!(one.compare(&ptrs), ArrayComparison::Mismatch);
    assert_eq!(ptrs.compare(&one), ArrayComparison::Mismatch);
}

#[test]
fn copy_is_deep_and_regrows() {
    let mut original = TypedArray::new(ArrayKind::Str);
    original.set_string(40, Some("tail")).unwrap();
    assert_eq!(original.capacity(), 48);

    let mut copy = original.copy().unwrap();
    assert_eq!(copy.compare(&original), ArrayComparison::Equal);
    assert_eq!(copy.capacity(), 48);

    copy.set_string(40, Some("changed")).unwrap();
    assert_eq!(original.get_string(40).as_deref(), Some("tail"));

    let ptr: Opaque = Arc::new(3u32);
    let ptrs = TypedArray::from_ptrs([ptr.clone()]).unwrap();
    let ptrs_copy = ptrs.copy().unwrap();
    assert_eq!(ptrs_copy.find_ptr(&ptr), Some(0));
}

#[test]
fn clone_matches_copy_after_pops() {
    let mut array = TypedArray::from_ints(0..20).unwrap();
    assert_eq!(array.capacity(), 32);
    for _ in 0..12 {
        array.pop_int();
    }

    let cloned = array.clone();
    let copied = array.copy().unwrap();
    assert_eq!(cloned.capacity(), 16);
    assert_eq!(cloned.capacity(), copied.capacity());
    assert_eq!(cloned.compare(&copied), ArrayComparison::Equal);
    assert_eq!(TypedArray::new(ArrayKind::Str).clone().capacity(), 0);
}

proptest! {
    #[test]
    fn capacity_is_rule_generated(indices in proptest::collection::vec(0usize..2048, 1..32)) {
        let mut array = TypedArray::new(ArrayKind::Float);
        for index in indices {
            array.set_float(index, 1.0).unwrap();
            prop_assert_eq!(array.capacity() % 16, 0);
            prop_assert!(array.len() < array.capacity());
        }
    }
}
