use attrflow::{Attribute, Catalog, RuleBookBuilder, Selections};

fn main() {
    // RUST_LOG=attrflow=trace shows fired rules and cleared selections.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let catalog = Catalog::new([
        Attribute::new("color", "Color").values(["Red", "Blue"]),
        Attribute::new("size", "Size").values(["Small", "Medium", "Large"]),
        Attribute::new("finish", "Finish").values(["Matte", "Gloss"]),
    ]);

    let book = RuleBookBuilder::new(catalog)
        .rule("red_sizes", |r| {
            r.priority(2)
                .when("color", "Red")
                .show_only("size", ["Small", "Medium"])
        })
        .rule("red_matte", |r| r.priority(1).when("color", "Red").hide("finish"))
        .rule("blue_large", |r| r.when("color", "Blue").set_default("size", "Large"))
        .rule("unknown", |r| r.when("trim", "Chrome").hide("finish"))
        .compile();

    let selections = Selections::new()
        .set("color", "Red")
        .set("size", "Large")
        .set("finish", "Gloss");

    let report = book.evaluate_detailed(&selections);

    println!("{report}");
    println!();
    println!("Evaluation order: {:?}", report.evaluation_order());
    println!("Rules that fired: {:?}", report.fired());
    println!("Selections cleared: {:?}", report.cleared());
    println!("Duration: {:?}", report.duration());
    println!("Skipped at compile time: {:?}", book.diagnostics());
}
