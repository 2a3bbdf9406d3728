use attrflow::{Attribute, Catalog, RuleBookBuilder, Selections};

fn main() {
    let catalog = Catalog::new([
        Attribute::new("color", "Color").values(["Red", "Blue"]),
        Attribute::new("size", "Size").values(["Small", "Medium", "Large"]),
        Attribute::new("finish", "Finish").values(["Matte", "Gloss"]),
    ]);

    // Define rules
    let book = RuleBookBuilder::new(catalog)
        .rule("red_sizes", |r| {
            r.name("Red limits sizes")
                .priority(1)
                .when("color", "Red")
                .show_only("size", ["Small", "Medium"])
                .set_default("size", "Small")
        })
        .rule("blue_no_finish", |r| r.when("color", "Blue").hide("finish"))
        .compile();

    println!("{book}");

    // Evaluate against the user's current choices
    let selections = Selections::new().set("color", "Red").set("size", "Large");
    let outcome = book.evaluate(&selections);

    for state in outcome.states() {
        println!(
            "{:<8} visible={:<5} allowed={:?} default={:?}",
            state.id, state.is_visible, state.allowed_values, state.default_value
        );
    }
    println!("Selections after cascade: {:?}", outcome.selections());
}
