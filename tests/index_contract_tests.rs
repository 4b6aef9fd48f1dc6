// Index Contract Tests - Stage 1: Test-Driven Development
// Both index structures must satisfy the same OrderedIndex contract; every
// test here runs against each implementation through the trait.

use anyhow::Result;
use filedex::{
    BalancedIndex, EntryBuilder, MultiwayIndex, OrderedIndex, RangeScan, ValidatedDegree,
    ValidatedFileName, ValidatedPath,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::collections::BTreeMap;

fn name(s: &str) -> ValidatedFileName {
    ValidatedFileName::new(s).expect("test filename should be valid")
}

fn path(s: &str) -> ValidatedPath {
    ValidatedPath::new(s).expect("test path should be valid")
}

fn degree(t: usize) -> ValidatedDegree {
    ValidatedDegree::new(t).expect("test degree should be valid")
}

fn implementations() -> Vec<Box<dyn OrderedIndex>> {
    vec![
        Box::new(BalancedIndex::new()),
        Box::new(MultiwayIndex::new(degree(3))),
        Box::new(MultiwayIndex::new(degree(2))),
    ]
}

#[test]
fn test_unsorted_inserts_list_in_key_order() -> Result<()> {
    for mut index in implementations() {
        for n in ["b.txt", "a.txt", "d.txt", "c.txt"] {
            index.insert(name(n), path(&format!("/files/{n}")))?;
        }

        let listed: Vec<String> = index
            .list_all()?
            .into_iter()
            .map(|(k, _)| k.as_str().to_string())
            .collect();
        assert_eq!(
            listed,
            vec!["a.txt", "b.txt", "c.txt", "d.txt"],
            "{} index returned wrong order",
            index.index_type()
        );
    }
    Ok(())
}

#[test]
fn test_search_round_trip() -> Result<()> {
    for mut index in implementations() {
        index.insert(name("thesis.pdf"), path("/home/user/thesis.pdf"))?;

        assert_eq!(
            index.search(&name("thesis.pdf"))?,
            Some(path("/home/user/thesis.pdf"))
        );
        assert_eq!(index.search(&name("absent.pdf"))?, None);
    }
    Ok(())
}

#[test]
fn test_reinsert_replaces_value_without_growth() -> Result<()> {
    for mut index in implementations() {
        index.insert(name("config.toml"), path("/etc/old/config.toml"))?;
        index.insert(name("config.toml"), path("/etc/new/config.toml"))?;

        assert_eq!(index.len(), 1, "{} index grew on reinsert", index.index_type());
        assert_eq!(
            index.search(&name("config.toml"))?,
            Some(path("/etc/new/config.toml"))
        );
    }
    Ok(())
}

#[test]
fn test_delete_existing_then_absent() -> Result<()> {
    for mut index in implementations() {
        index.insert(name("tmp.dat"), path("/tmp/tmp.dat"))?;

        assert!(index.delete(&name("tmp.dat"))?);
        assert!(!index.delete(&name("tmp.dat"))?);
        assert!(index.is_empty());
        assert_eq!(index.search(&name("tmp.dat"))?, None);
    }
    Ok(())
}

#[test]
fn test_interleaved_operations_track_len() -> Result<()> {
    for mut index in implementations() {
        for i in 0..40 {
            index.insert(name(&format!("f{i:02}")), path(&format!("/f/{i}")))?;
        }
        for i in (0..40).step_by(2) {
            assert!(index.delete(&name(&format!("f{i:02}")))?);
        }

        assert_eq!(index.len(), 20);
        let listed = index.list_all()?;
        assert_eq!(listed.len(), 20);
        for window in listed.windows(2) {
            assert!(window[0].0 < window[1].0);
        }
    }
    Ok(())
}

#[test]
fn test_entries_built_from_full_paths() -> Result<()> {
    for mut index in implementations() {
        let (key, value) = EntryBuilder::new()
            .path("/var/log/syslog.1")?
            .build()?;
        index.insert(key.clone(), value)?;

        assert_eq!(key.as_str(), "syslog.1");
        assert_eq!(index.search(&key)?, Some(path("/var/log/syslog.1")));
    }
    Ok(())
}

#[test]
fn test_range_query_matches_filtered_list() -> Result<()> {
    let mut index = MultiwayIndex::new(degree(3));
    let names: Vec<String> = (0..30).map(|i| format!("n{i:02}.log")).collect();
    for n in &names {
        index.insert(name(n), path(&format!("/log/{n}")))?;
    }

    let lo = name("n07.log");
    let hi = name("n21.log");
    let scanned: Vec<String> = index
        .range_query(&lo, &hi)?
        .into_iter()
        .map(|(k, _)| k.as_str().to_string())
        .collect();
    let expected: Vec<String> = names
        .iter()
        .filter(|n| name(n.as_str()) >= lo && name(n.as_str()) <= hi)
        .cloned()
        .collect();
    assert_eq!(scanned, expected);
    Ok(())
}

proptest! {
    /// Random workloads applied to both structures and a std::collections
    /// BTreeMap must agree on every observable.
    #[test]
    fn prop_both_indexes_mirror_btreemap(
        ops in prop::collection::vec(
            (prop::bool::ANY, 0usize..60),
            1..200,
        )
    ) {
        let mut balanced = BalancedIndex::new();
        let mut multiway = MultiwayIndex::new(degree(2));
        let mut model: BTreeMap<String, String> = BTreeMap::new();

        for (is_insert, slot) in ops {
            let key_str = format!("k{slot:02}.bin");
            let key = name(&key_str);

            if is_insert {
                let value_str = format!("/store/{slot}");
                let value = path(&value_str);
                balanced.insert(key.clone(), value.clone()).unwrap();
                multiway.insert(key.clone(), value).unwrap();
                model.insert(key_str, value_str);
            } else {
                let removed_b = balanced.delete(&key).unwrap();
                let removed_m = multiway.delete(&key).unwrap();
                let removed_model = model.remove(&key_str).is_some();
                prop_assert_eq!(removed_b, removed_model);
                prop_assert_eq!(removed_m, removed_model);
            }

            prop_assert_eq!(balanced.len(), model.len());
            prop_assert_eq!(multiway.len(), model.len());
        }

        let expected: Vec<(String, String)> = model.into_iter().collect();
        for index in [&balanced as &dyn OrderedIndex, &multiway as &dyn OrderedIndex] {
            let listed: Vec<(String, String)> = index
                .list_all()
                .unwrap()
                .into_iter()
                .map(|(k, v)| (k.as_str().to_string(), v.as_str().to_string()))
                .collect();
            prop_assert_eq!(&listed, &expected);
        }
    }
}
