use std::sync::Arc;
use std::thread;

use attrflow::{Attribute, Catalog, RuleBook, RuleBookBuilder, Selections};

fn book() -> RuleBook {
    let catalog = Catalog::new([
        Attribute::new("color", "Color").values(["Red", "Blue"]),
        Attribute::new("size", "Size").values(["Small", "Medium", "Large"]),
        Attribute::new("finish", "Finish").values(["Matte", "Gloss"]),
    ]);
    RuleBookBuilder::new(catalog)
        .rule("red_sizes", |r| {
            r.priority(1)
                .when("color", "Red")
                .show_only("size", ["Small", "Medium"])
        })
        .rule("blue_no_finish", |r| r.when("color", "Blue").hide("finish"))
        .compile()
}

#[test]
fn evaluate_across_threads() {
    let book = Arc::new(book());

    let mut handles = vec![];

    // Thread 1: red, large size cleared
    let b = Arc::clone(&book);
    handles.push(thread::spawn(move || {
        b.evaluate(&Selections::new().set("color", "Red").set("size", "Large"))
    }));

    // Thread 2: blue, finish hidden and cleared
    let b = Arc::clone(&book);
    handles.push(thread::spawn(move || {
        b.evaluate(&Selections::new().set("color", "Blue").set("finish", "Gloss"))
    }));

    // Thread 3: nothing selected, nothing fires
    let b = Arc::clone(&book);
    handles.push(thread::spawn(move || b.evaluate(&Selections::new())));

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(results[0].selections(), &Selections::new().set("color", "Red"));
    assert_eq!(
        results[0].state("size").unwrap().allowed_values,
        vec!["Small", "Medium"]
    );
    assert_eq!(results[1].selections(), &Selections::new().set("color", "Blue"));
    assert!(!results[1].state("finish").unwrap().is_visible);
    assert!(results[2].states().iter().all(|s| s.is_visible));
}

#[test]
fn concurrent_evaluations_match_sequential() {
    let book = Arc::new(book());
    let inputs: Vec<Selections> = ["Red", "Blue", "Green"]
        .iter()
        .flat_map(|color| {
            ["Small", "Large"]
                .iter()
                .map(move |size| Selections::new().set("color", *color).set("size", *size))
        })
        .collect();
    let expected: Vec<_> = inputs.iter().map(|s| book.evaluate(s)).collect();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let b = Arc::clone(&book);
            let inputs = inputs.clone();
            thread::spawn(move || inputs.iter().map(|s| b.evaluate(s)).collect::<Vec<_>>())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn rulebook_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RuleBook>();
    assert_send_sync::<Selections>();
    assert_send_sync::<attrflow::Outcome>();
}
