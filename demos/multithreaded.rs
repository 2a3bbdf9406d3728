use std::sync::Arc;
use std::thread;

use attrflow::{Attribute, Catalog, RuleBookBuilder, Selections};

fn main() {
    let catalog = Catalog::new([
        Attribute::new("color", "Color").values(["Red", "Blue", "Green"]),
        Attribute::new("size", "Size").values(["Small", "Medium", "Large"]),
        Attribute::new("finish", "Finish").values(["Matte", "Gloss"]),
    ]);

    let book = Arc::new(
        RuleBookBuilder::new(catalog)
            .rule("red_sizes", |r| {
                r.priority(1)
                    .when("color", "Red")
                    .show_only("size", ["Small", "Medium"])
            })
            .rule("blue_no_finish", |r| r.when("color", "Blue").hide("finish"))
            .compile(),
    );

    // One compiled book, shared read-only by every worker
    let handles: Vec<_> = ["Red", "Blue", "Green"]
        .into_iter()
        .enumerate()
        .map(|(i, color)| {
            let book = Arc::clone(&book);
            thread::spawn(move || {
                let selections = Selections::new()
                    .set("color", color)
                    .set("size", "Large")
                    .set("finish", "Gloss");
                let outcome = book.evaluate(&selections);
                println!("Thread {i} ({color}): {:?}", outcome.selections());
            })
        })
        .collect();

    for h in handles {
        h.join().expect("worker thread panicked");
    }
}
