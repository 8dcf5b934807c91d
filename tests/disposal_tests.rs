//! Disposal propagation tests: every combinator disposes its upstream exactly once.

mod test_helpers;

use std::cell::Cell;
use std::rc::Rc;

use lazyseq::lazyseq_core::source::{range, VecSource};
use lazyseq::lazyseq_operators::{chain, collect_chunks, collect_groups, interleave, to_vec};
use lazyseq::{Cursor, CursorExt};
use test_helpers::{identity, ints, tracked, Tracked};

/// Advance `cursor` once, dispose it twice, and check it stays shut.
fn dispose_twice<C: Cursor>(mut cursor: C) {
    cursor.advance();
    cursor.dispose();
    cursor.dispose();
    assert!(!cursor.advance());
}

/// Run `cursor` to its natural end, then dispose it twice.
fn exhaust_then_dispose_twice<C: Cursor>(mut cursor: C) {
    while cursor.advance() {}
    assert!(!cursor.advance());
    cursor.dispose();
    cursor.dispose();
    assert!(!cursor.advance());
}

/// Build a combinator over a tracked source, shut it with `finish`, and check
/// the source saw exactly one disposal.
fn check_with<C, F>(build: F, finish: fn(C))
where
    C: Cursor,
    F: FnOnce(Tracked<VecSource<i32>>) -> C,
{
    let (source, disposals) = tracked(ints(&[1, 2, 3, 4]));
    finish(build(source));
    assert_eq!(disposals.get(), 1);
}

fn check_disposes_once<C, F>(build: F)
where
    C: Cursor,
    F: FnOnce(Tracked<VecSource<i32>>) -> C,
{
    check_with(build, dispose_twice::<C>);
}

fn check_disposes_once_after_exhaustion<C, F>(build: F)
where
    C: Cursor,
    F: FnOnce(Tracked<VecSource<i32>>) -> C,
{
    check_with(build, exhaust_then_dispose_twice::<C>);
}

#[test]
fn test_single_upstream_combinators_dispose_once() {
    check_disposes_once(|s| s.map(|x| Ok(x + 1)));
    check_disposes_once(|s| s.filter(|x| x % 2 == 0));
    check_disposes_once(|s| s.skip_if(|x| x % 2 == 0));
    check_disposes_once(|s| s.filter_map(|x| Ok(Some(*x))));
    check_disposes_once(|s| s.take_while(|x| *x < 3));
    check_disposes_once(|s| s.skip_while(|x| *x < 3));
    check_disposes_once(|s| s.flat_map(|x| Ok(range(0, *x as usize, |i| i))));
    check_disposes_once(|s| s.chunk(3, identity));
    check_disposes_once(|s| s.chunk_by_count(2));
    check_disposes_once(|s| s.group_by(identity));
    check_disposes_once(|s| s.cleanup(|| {}));
}

#[test]
fn test_exhausted_combinators_dispose_once() {
    check_disposes_once_after_exhaustion(|s| s.map(|x| Ok(x + 1)));
    check_disposes_once_after_exhaustion(|s| s.filter(|x| x % 2 == 0));
    check_disposes_once_after_exhaustion(|s| s.take_while(|x| *x < 3));
    check_disposes_once_after_exhaustion(|s| s.skip_while(|x| *x < 3));
    check_disposes_once_after_exhaustion(|s| s.flat_map(|x| Ok(range(0, *x as usize, |i| i))));
    check_disposes_once_after_exhaustion(|s| s.chunk(3, identity));
    check_disposes_once_after_exhaustion(|s| s.chunk_by_count(2));
    check_disposes_once_after_exhaustion(|s| s.group_by(identity));
    check_disposes_once_after_exhaustion(|s| interleave(vec![s], identity));
    check_disposes_once_after_exhaustion(|s| chain(vec![s]));
    check_disposes_once_after_exhaustion(|s| s.cleanup(|| {}));
}

#[test]
fn test_interleave_disposes_every_exhausted_source_once() {
    let (a, a_disposals) = tracked(ints(&[1, 4]));
    let (b, b_disposals) = tracked(ints(&[2, 3]));
    exhaust_then_dispose_twice(interleave(vec![a, b], identity));
    assert_eq!(a_disposals.get(), 1);
    assert_eq!(b_disposals.get(), 1);
}

#[test]
fn test_reduction_helpers_dispose_once() {
    let (source, disposals) = tracked(ints(&[1, 2, 3]));
    to_vec(source).unwrap();
    assert_eq!(disposals.get(), 1);

    let (source, disposals) = tracked(ints(&[1, 2, 3]));
    collect_chunks(source.chunk_by_count(2)).unwrap();
    assert_eq!(disposals.get(), 1);

    let (source, disposals) = tracked(ints(&[1, 1, 2]));
    collect_groups(source.group_by(identity)).unwrap();
    assert_eq!(disposals.get(), 1);

    let (source, disposals) = tracked(ints(&[1, 2]));
    source.sum_by(|x| *x).unwrap();
    assert_eq!(disposals.get(), 1);
}

#[test]
fn test_chunk_disposes_upstream_while_windows_are_alive() {
    let (source, disposals) = tracked(ints(&[1, 2, 3, 4]));
    let mut chunks = source.chunk_by_count(2);
    assert!(chunks.advance());
    let mut window = chunks.current().unwrap().clone();
    assert!(window.advance());

    window.dispose();
    assert_eq!(disposals.get(), 0);

    chunks.dispose();
    assert_eq!(disposals.get(), 1);
    let mut other = window.clone();
    assert!(!other.advance());
    drop(chunks);
    assert_eq!(disposals.get(), 1);
}

#[test]
fn test_chain_disposes_every_source_once() {
    let (a, a_disposals) = tracked(ints(&[1]));
    let (b, b_disposals) = tracked(ints(&[2]));
    let (c, c_disposals) = tracked(ints(&[3]));
    let mut chained = chain(vec![a, b, c]);

    // Finish the first source and stop inside the second.
    assert!(chained.advance());
    assert!(chained.advance());
    assert_eq!(a_disposals.get(), 1);

    chained.dispose();
    chained.dispose();
    assert_eq!(a_disposals.get(), 1);
    assert_eq!(b_disposals.get(), 1);
    assert_eq!(c_disposals.get(), 1);
}

#[test]
fn test_flat_map_disposes_inner_cursors() {
    let inner_disposals = Rc::new(Cell::new(0));
    let counter = Rc::clone(&inner_disposals);
    let (source, outer_disposals) = tracked(ints(&[2, 2, 2]));
    let mut flat = source.flat_map(move |n| {
        let counter = Rc::clone(&counter);
        Ok(range(0, *n as usize, |i| i).cleanup(move || counter.set(counter.get() + 1)))
    });

    // Two full inners and one partially read.
    for _ in 0..5 {
        assert!(flat.advance());
    }
    assert_eq!(inner_disposals.get(), 2);
    flat.dispose();
    assert_eq!(inner_disposals.get(), 3);
    assert_eq!(outer_disposals.get(), 1);
}

#[test]
fn test_cleanup_runs_after_upstream_disposal() {
    let (source, disposals) = tracked(ints(&[1, 2]));
    let seen = Rc::new(Cell::new(usize::MAX));
    let observer = Rc::clone(&seen);
    let counts = Rc::clone(&disposals);
    let cursor = source.cleanup(move || observer.set(counts.get()));
    drop(cursor);
    assert_eq!(seen.get(), 1);
    assert_eq!(disposals.get(), 1);
}

#[test]
fn test_interleave_of_pipelines_disposes_leaves() {
    let (a, a_disposals) = tracked(ints(&[1, 3]));
    let (b, b_disposals) = tracked(ints(&[2, 4]));
    let merged = interleave(
        vec![a.map(|x| Ok(*x)).boxed(), b.filter(|_| true).boxed()],
        identity,
    );
    assert_eq!(to_vec(merged).unwrap(), vec![1, 2, 3, 4]);
    assert_eq!(a_disposals.get(), 1);
    assert_eq!(b_disposals.get(), 1);
}
