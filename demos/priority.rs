use attrflow::{Attribute, Catalog, RuleBookBuilder, Selections};

/// Two rules fire for the same selection and touch the same attribute. The
/// one applied later (lower priority) decides the final state.
fn main() {
    let catalog = Catalog::new([
        Attribute::new("material", "Material").values(["Wood", "Steel"]),
        Attribute::new("finish", "Finish").values(["Oiled", "Painted", "Brushed"]),
        Attribute::new("engraving", "Engraving").values(["None", "Laser"]),
    ]);

    let book = RuleBookBuilder::new(catalog)
        .rule("steel_hides_engraving", |r| {
            r.priority(10).when("material", "Steel").hide("engraving")
        })
        .rule("steel_finishes", |r| {
            r.priority(10)
                .when("material", "Steel")
                .show_only("finish", ["Painted", "Brushed"])
        })
        .rule("steel_laser_ok", |r| {
            r.priority(1).when("material", "Steel").show("engraving")
        })
        .rule("steel_brushed_only", |r| {
            r.priority(1)
                .when("material", "Steel")
                .show_only("finish", ["Brushed"])
                .set_default("finish", "Brushed")
        })
        .compile();

    println!("Execution order: {:?}", book.execution_order());
    println!("Rules touching finish: {:?}", book.rules_affecting("finish"));

    let selections = Selections::new()
        .set("material", "Steel")
        .set("finish", "Painted")
        .set("engraving", "Laser");
    let outcome = book.evaluate(&selections);

    for state in outcome.states() {
        println!(
            "{:<10} visible={:<5} allowed={:?} default={:?}",
            state.id, state.is_visible, state.allowed_values, state.default_value
        );
    }
    println!("Selections: {:?} -> {:?}", selections, outcome.selections());
}
