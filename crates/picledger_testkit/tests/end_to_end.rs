//! End-to-end ledger scenarios.

use picledger_core::{Config, CoreError, ErrorKind, Record};
use picledger_state::{split_composite_key, StateStore, SENTINEL_VALUE};
use picledger_testkit::prelude::*;
use picledger_testkit::scenarios::{populated_ledger, seeded_ledger};
use proptest::prelude::*;
use serde_json::Value;

fn json(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap()
}

#[test]
fn picture_lifecycle() {
    let ledger = TestLedger::new();

    ledger.create("p1", "blue", "35", "tom").unwrap();
    let p1 = json(&ledger.read("p1").unwrap());
    assert_eq!(p1["category"], "blue");
    assert_eq!(p1["quantity"], 35);
    assert_eq!(p1["owner"], "tom");

    ledger.create("p2", "red", "50", "tom").unwrap();
    ledger.create("p3", "blue", "70", "tom").unwrap();

    let summary = ledger.transfer_by_category("blue", "jerry").unwrap();
    assert_eq!(summary.transferred, 2);
    assert_eq!(ledger.record("p1").owner, "jerry");
    assert_eq!(ledger.record("p3").owner, "jerry");
    assert_eq!(ledger.record("p2").owner, "tom");

    ledger.delete("p1").unwrap();
    let err = ledger.read("p1").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(ledger.category_ids("blue"), vec!["p3"]);
    assert_eq!(ledger.state().open_cursors(), 0);
}

#[test]
fn lifecycle_through_invoke() {
    let ledger = TestLedger::new();
    let steps: [(&str, &[&str], bool); 8] = [
        ("create", &["p1", "blue", "35", "tom"], true),
        ("create", &["p2", "red", "50", "tom"], true),
        ("create", &["p3", "blue", "70", "tom"], true),
        ("create", &["p3", "green", "1", "amy"], false),
        ("transfer-by-category", &["blue", "jerry"], true),
        ("update-owner", &["p2", "amy"], true),
        ("delete", &["p1"], true),
        ("delete", &["p1"], false),
    ];
    for (function, args, ok) in steps {
        let response = ledger.invoke(function, args);
        assert_eq!(response.is_ok(), ok, "{function} {args:?}: {}", response.message);
    }

    let owners: Vec<Value> = json(&ledger.invoke("range-query", &["", ""]).payload)
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["record"]["owner"].clone())
        .collect();
    assert_eq!(owners, vec!["amy", "jerry"]);
}

#[test]
fn create_collision_leaves_existing_record() {
    let ledger = seeded_ledger();
    let before = ledger.read("p1").unwrap();

    let err = ledger.create("p1", "green", "1", "amy").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    assert_eq!(ledger.read("p1").unwrap(), before);
    assert!(ledger.category_ids("green").is_empty());
}

#[test]
fn delete_of_missing_record_mutates_nothing() {
    let ledger = seeded_ledger();
    let before = ledger.state().mutation_count();

    let err = ledger.delete("p9").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(ledger.state().mutation_count(), before);
}

#[test]
fn failed_index_write_leaves_nothing_behind() {
    let ledger = TestLedger::new();
    ledger.state().fail_writes_with_prefix("\u{0}");

    let err = ledger.create("p1", "blue", "35", "tom").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StoreFailure);

    ledger.state().clear_write_faults();
    assert_eq!(ledger.read("p1").unwrap_err().kind(), ErrorKind::NotFound);
    assert!(ledger.category_ids("blue").is_empty());
}

#[test]
fn partial_transfer_keeps_earlier_writes() {
    let ledger = seeded_ledger();
    // An indexed id whose record is corrupt sits between p1 and p3.
    let key = ledger.index().entry_key("blue", "p2x").unwrap();
    ledger.state().put_state(&key, SENTINEL_VALUE).unwrap();
    ledger.state().put_state("p2x", b"garbage").unwrap();

    let err = ledger.transfer_by_category("blue", "jerry").unwrap_err();
    assert!(matches!(
        err,
        CoreError::TransferAborted { transferred: 1, .. }
    ));
    assert_eq!(err.kind(), ErrorKind::SerializationError);

    assert_eq!(ledger.record("p1").owner, "jerry");
    assert_eq!(ledger.record("p3").owner, "tom");
    assert_eq!(ledger.state().open_cursors(), 0);
}

#[test]
fn history_counts_every_write() {
    let ledger = seeded_ledger();
    ledger.update_owner("p1", "jerry").unwrap();
    ledger.update_owner("p1", "amy").unwrap();
    ledger.delete("p1").unwrap();

    let history = json(&ledger.history("p1").unwrap());
    let entries = history.as_array().unwrap();
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0]["isDelete"], true);
    assert_eq!(entries[0]["value"], Value::Null);
    assert_eq!(entries[1]["value"]["owner"], "amy");
    assert_eq!(entries[3]["value"]["owner"], "tom");
    assert_eq!(ledger.state().open_cursors(), 0);
}

#[test]
fn paginated_range_query_output() {
    let ledger = seeded_ledger();

    let page = json(&ledger.range_query_paginated("", "", "2", "").unwrap());
    assert_eq!(page[0].as_array().unwrap().len(), 2);
    assert_eq!(page[1]["responseMetadata"]["recordsCount"], 2);
    assert_eq!(page[1]["responseMetadata"]["bookmark"], "p2");

    let page = json(&ledger.range_query_paginated("", "", "2", "p2").unwrap());
    assert_eq!(page[0][0]["key"], "p3");
    assert_eq!(page[1]["responseMetadata"]["bookmark"], "p3");

    let page = json(&ledger.range_query_paginated("", "", "2", "p3").unwrap());
    assert!(page[0].as_array().unwrap().is_empty());
    assert_eq!(page[1]["responseMetadata"]["recordsCount"], 0);
    assert_eq!(page[1]["responseMetadata"]["bookmark"], "p3");
}

#[test]
fn predicate_queries() {
    let ledger = seeded_ledger();
    ledger.update_owner("p2", "Jerry").unwrap();

    let results = json(&ledger.query_by_owner("JERRY").unwrap());
    assert_eq!(results.as_array().unwrap().len(), 1);
    assert_eq!(results[0]["key"], "p2");

    let query = r#"{"selector":{"docType":"picture","quantity":{"$gte":50}}}"#;
    let results = json(&ledger.predicate_query(query).unwrap());
    let keys: Vec<&str> = results
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|entry| entry["key"].as_str())
        .collect();
    assert_eq!(keys, vec!["p2", "p3"]);

    let page = json(&ledger.predicate_query_paginated(query, "1", "").unwrap());
    assert_eq!(page[1]["responseMetadata"]["bookmark"], "p2");
}

#[test]
fn predicate_query_ignores_projection_and_sort() {
    let ledger = seeded_ledger();
    let query = concat!(
        r#"{"selector":{"docType":"picture","owner":"tom"},"#,
        r#""fields":["docType","id","owner"],"sort":[{"size":"desc"}]}"#,
    );

    let results = json(&ledger.predicate_query(query).unwrap());
    let keys: Vec<&str> = results
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|entry| entry["key"].as_str())
        .collect();
    assert_eq!(keys, vec!["p1", "p2", "p3"]);
    assert_eq!(results[0]["record"]["quantity"], 35);
}

#[test]
fn predicate_queries_without_capability() {
    let ledger = TestLedger::without_rich_query();
    ledger.create("p1", "blue", "35", "tom").unwrap();

    let response = ledger.invoke("predicate-query", &[r#"{"selector":{}}"#]);
    assert!(!response.is_ok());
    let err = ledger.query_by_owner("tom").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedOperation);

    // Range scans still work.
    assert!(ledger.range_query("", "").is_ok());
}

#[test]
fn custom_configuration() {
    let ledger = TestLedger::with_config(Config::new().kind("marble").max_page_size(10));
    ledger.create("m1", "red", "3", "tom").unwrap();
    assert_eq!(ledger.record("m1").kind, "marble");

    let err = ledger.range_query_paginated("", "", "11", "").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn large_category_transfer() {
    let ledger = populated_ledger(200, &["blue", "red", "green", "yellow"]);
    let summary = ledger.transfer_by_category("green", "jerry").unwrap();
    assert_eq!(summary.transferred, 50);

    for id in ledger.category_ids("green") {
        assert_eq!(ledger.record(&id).owner, "jerry");
    }
    for id in ledger.category_ids("red") {
        assert_eq!(ledger.record(&id).owner, "tom");
    }
}

proptest! {
    #[test]
    fn create_then_read_round_trips((id, category, quantity, owner) in picture_strategy()) {
        let ledger = TestLedger::new();
        ledger.create(&id, &category, &quantity, &owner).unwrap();

        let stored = Record::from_json(&id, &ledger.read(&id).unwrap()).unwrap();
        let quantity: u64 = quantity.parse().unwrap();
        let expected = Record::new("picture", id.as_str(), &category, quantity, &owner);
        prop_assert_eq!(stored, expected);
    }

    #[test]
    fn transfer_touches_exactly_one_category(
        pictures in pictures_strategy(20),
        target in category_strategy(),
        new_owner in owner_strategy(),
    ) {
        let ledger = TestLedger::new();
        for (id, category, quantity, owner) in &pictures {
            ledger.create(id, category, quantity, owner).unwrap();
        }

        let summary = ledger.transfer_by_category(&target, &new_owner).unwrap();
        let expected = pictures.iter().filter(|p| p.1 == target).count();
        prop_assert_eq!(summary.transferred, expected);

        for (id, category, _, owner) in &pictures {
            let record = ledger.record(id);
            if *category == target {
                prop_assert_eq!(record.owner, new_owner.to_lowercase());
            } else {
                prop_assert_eq!(record.owner, owner.to_lowercase());
            }
        }
    }

    #[test]
    fn pages_concatenate_to_the_full_scan(
        pictures in pictures_strategy(25),
        page_size in 1usize..6,
    ) {
        let ledger = TestLedger::new();
        for (id, category, quantity, owner) in &pictures {
            ledger.create(id, category, quantity, owner).unwrap();
        }
        let full = json(&ledger.range_query("", "").unwrap());

        let size = page_size.to_string();
        let mut bookmark = String::new();
        let mut paged = Vec::new();
        loop {
            let page = json(&ledger.range_query_paginated("", "", &size, &bookmark).unwrap());
            let entries = page[0].as_array().unwrap().clone();
            prop_assert!(entries.len() <= page_size);

            let next = page[1]["responseMetadata"]["bookmark"].as_str().unwrap().to_string();
            if next == bookmark {
                break;
            }
            paged.extend(entries);
            bookmark = next;
        }
        prop_assert_eq!(Value::Array(paged), full);
        prop_assert_eq!(ledger.state().open_cursors(), 0);
    }

    #[test]
    fn history_length_matches_mutations(
        owners in prop::collection::vec(owner_strategy(), 0..6),
        delete in any::<bool>(),
    ) {
        let ledger = TestLedger::new();
        ledger.create("p1", "blue", "1", "tom").unwrap();
        for owner in &owners {
            ledger.update_owner("p1", owner).unwrap();
        }
        if delete {
            ledger.delete("p1").unwrap();
        }

        let history = json(&ledger.history("p1").unwrap());
        let entries = history.as_array().unwrap();
        prop_assert_eq!(entries.len(), 1 + owners.len() + usize::from(delete));
        prop_assert_eq!(entries[0]["isDelete"].as_bool(), Some(delete));
    }

    #[test]
    fn index_keys_split_back_into_their_parts(
        category in key_part_strategy(),
        id in key_part_strategy(),
    ) {
        let ledger = TestLedger::new();
        let key = ledger.index().entry_key(&category, &id).unwrap();
        prop_assert!(key.starts_with('\0'));

        let (object_type, attributes) = split_composite_key(&key).unwrap();
        prop_assert_eq!(object_type, ledger.index().name());
        prop_assert_eq!(attributes, vec![category, id]);
    }
}
