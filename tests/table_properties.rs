use std::cell::Cell;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use proptest::prelude::*;

use metro::OrderedTable;

#[derive(Clone, Debug)]
enum Op {
    Insert(u8, u32),
    Erase(usize),
    EraseKey(u8),
    Reserve(usize),
    Clear,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..8u8, any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        2 => (0..12usize).prop_map(Op::Erase),
        2 => (0..8u8).prop_map(Op::EraseKey),
        1 => (0..40usize).prop_map(Op::Reserve),
        1 => Just(Op::Clear),
    ]
}

proptest! {
    #[test]
    fn behaves_like_a_vec_of_pairs(ops in prop::collection::vec(op(), 0..200)) {
        let mut table = OrderedTable::new();
        let mut model: Vec<(u8, u32)> = Vec::new();
        let mut cap = 0usize;

        for op in ops {
            match op {
                Op::Insert(k, v) => {
                    if model.len() == cap {
                        cap = if cap == 0 { 1 } else { cap * 2 };
                    }
                    prop_assert_eq!(table.insert(k, v), model.len());
                    model.push((k, v));
                }
                Op::Erase(index) => {
                    let res = table.erase(index);
                    if index < model.len() {
                        prop_assert_eq!(res, Ok(model.remove(index)));
                    } else {
                        prop_assert!(res.is_err());
                    }
                }
                Op::EraseKey(k) => {
                    let pos = model.iter().position(|(mk, _)| *mk == k);
                    prop_assert_eq!(table.erase_key(&k), pos.is_some());
                    if let Some(pos) = pos {
                        model.remove(pos);
                    }
                }
                Op::Reserve(n) => {
                    table.reserve(n);
                    cap = cap.max(n);
                }
                Op::Clear => {
                    table.clear();
                    model.clear();
                }
            }

            prop_assert_eq!(table.len(), model.len());
            prop_assert_eq!(table.capacity(), cap);
            prop_assert_eq!(table.as_slice(), &model[..]);
        }

        for k in 0..8u8 {
            let expected = model.iter().position(|(mk, _)| *mk == k).unwrap_or(model.len());
            prop_assert_eq!(table.find(&k), expected);
            prop_assert_eq!(table.lookup(&k), model.get(expected).map(|(_, v)| v));
        }
    }

    #[test]
    fn iteration_follows_insertion_order(keys in prop::collection::vec(".{0,6}", 0..50)) {
        let table: OrderedTable<String, usize> =
            keys.iter().cloned().enumerate().map(|(i, k)| (k, i)).collect();

        let forward: Vec<(&String, &usize)> = table.iter().collect();
        let expected: Vec<(&String, usize)> = keys.iter().zip(0..).collect();
        prop_assert_eq!(forward.len(), expected.len());
        for ((k, v), (ek, ev)) in forward.into_iter().zip(expected) {
            prop_assert_eq!(k, ek);
            prop_assert_eq!(*v, ev);
        }

        let backward: Vec<usize> = table.iter().rev().map(|(_, v)| *v).collect();
        prop_assert_eq!(backward, (0..keys.len()).rev().collect::<Vec<_>>());

        let owned: Vec<String> = table.into_iter().map(|(k, _)| k).collect();
        prop_assert_eq!(owned, keys);
    }
}

/// Counts how many times values sharing a counter have been dropped.
#[derive(Debug)]
struct Counted(Rc<Cell<usize>>);

impl Drop for Counted {
    fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

fn counted_table(n: usize, drops: &Rc<Cell<usize>>) -> OrderedTable<usize, Counted> {
    let mut table = OrderedTable::new();
    for i in 0..n {
        table.insert(i, Counted(drops.clone()));
    }
    table
}

#[test]
fn growth_moves_without_dropping() {
    let drops = Rc::new(Cell::new(0));
    let table = counted_table(33, &drops);
    assert_eq!(table.capacity(), 64);
    assert_eq!(drops.get(), 0);
    drop(table);
    assert_eq!(drops.get(), 33);
}

#[test]
fn every_entry_dropped_once() {
    let drops = Rc::new(Cell::new(0));

    let mut table = counted_table(5, &drops);
    let erased = table.erase(1).unwrap();
    assert_eq!(drops.get(), 0);
    drop(erased);
    assert_eq!(drops.get(), 1);

    assert!(table.erase_key(&3));
    assert_eq!(drops.get(), 2);

    table.clear();
    assert_eq!(drops.get(), 5);
    assert_eq!(table.capacity(), 8);
    drop(table);
    assert_eq!(drops.get(), 5);
}

#[test]
fn partially_consumed_into_iter_drops_the_rest() {
    let drops = Rc::new(Cell::new(0));
    let mut iter = counted_table(6, &drops).into_iter();

    let first = iter.next().unwrap();
    let last = iter.next_back().unwrap();
    assert_eq!((first.0, last.0), (0, 5));
    assert_eq!(iter.len(), 4);

    drop(iter);
    assert_eq!(drops.get(), 4);
    drop((first, last));
    assert_eq!(drops.get(), 6);
}

#[test]
fn take_moves_ownership() {
    let drops = Rc::new(Cell::new(0));
    let mut source = counted_table(3, &drops);

    let moved = source.take();
    assert!(source.is_empty());
    assert_eq!(source.capacity(), 0);
    assert!(!source.is_allocated());
    assert_eq!(moved.len(), 3);
    assert_eq!(moved.capacity(), 4);

    source.insert(9, Counted(drops.clone()));
    drop(source);
    assert_eq!(drops.get(), 1);
    drop(moved);
    assert_eq!(drops.get(), 4);
}

/// Panics on the clone that brings the shared budget to zero.
struct Fragile {
    budget: Rc<Cell<usize>>,
    drops: Rc<Cell<usize>>,
}

impl Clone for Fragile {
    fn clone(&self) -> Self {
        let left = self.budget.get();
        if left == 0 {
            panic!("clone budget exhausted");
        }
        self.budget.set(left - 1);
        Self {
            budget: self.budget.clone(),
            drops: self.drops.clone(),
        }
    }
}

impl Drop for Fragile {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

#[test]
fn panicking_clone_cleans_up() {
    let budget = Rc::new(Cell::new(2));
    let drops = Rc::new(Cell::new(0));

    let mut table = OrderedTable::new();
    for i in 0..4 {
        table.insert(
            i,
            Fragile {
                budget: budget.clone(),
                drops: drops.clone(),
            },
        );
    }

    let result = catch_unwind(AssertUnwindSafe(|| table.clone()));
    assert!(result.is_err());
    // The two copies made before the panic were dropped with the partial table.
    assert_eq!(drops.get(), 2);
    assert_eq!(table.len(), 4);

    drop(table);
    assert_eq!(drops.get(), 6);
}

#[test]
fn clones_are_independent() {
    let mut original: OrderedTable<String, Vec<u8>> = OrderedTable::new();
    original.insert("a".to_string(), vec![1]);
    original.insert("b".to_string(), vec![2]);

    let mut copy = original.clone();
    assert_eq!(copy, original);
    assert_eq!(copy.capacity(), original.capacity());

    copy.lookup_mut("a").unwrap().push(10);
    copy.insert("c".to_string(), vec![3]);
    assert!(copy.erase_key("b"));

    assert_eq!(original.lookup("a"), Some(&vec![1]));
    assert_eq!(original.len(), 2);
    assert!(original.contains_key("b"));

    let mut target = OrderedTable::new();
    target.clone_from(&copy);
    assert_eq!(target, copy);
}
