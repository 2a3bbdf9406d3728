use attrflow::{Attribute, Catalog, RuleBook, Selections};

fn main() {
    let catalog = Catalog::new([
        Attribute::new("color", "Color").values(["Red", "Blue"]),
        Attribute::new("size", "Size").values(["Small", "Medium", "Large"]),
        Attribute::new("finish", "Finish").values(["Matte", "Gloss"]),
        Attribute::new("engraving", "Engraving").values(["None", "Initials"]),
        Attribute::new("qty", "Quantity"),
    ]);

    let book = RuleBook::from_file(catalog, "demos/rules.attrflow").expect("failed to load rules");

    println!("{book}");
    for diagnostic in book.diagnostics() {
        println!("skipped: {diagnostic}");
    }

    let selections = Selections::new().set("color", "Red").set("size", "Large");
    let outcome = book.evaluate(&selections);

    match serde_json::to_string_pretty(&outcome) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("failed to render outcome: {e}"),
    }
}
