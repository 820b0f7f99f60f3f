use toml::{Table, Value};

/// Name of the section whose options every other section falls back to.
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// Layer one parsed document on top of already merged state.
///
/// Sections accumulate: a new section is added, an existing one keeps its
/// options and has same-named ones replaced. Option values are replaced whole,
/// never merged. Top-level scalars and the `DEFAULT` table go to `defaults`.
pub fn merge_layer(sections: &mut Table, defaults: &mut Table, overlay: Table) {
    for (key, overlay_val) in overlay {
        match overlay_val {
            Value::Table(options) if key == DEFAULT_SECTION => {
                merge_options(defaults, options);
            }
            Value::Table(options) => {
                let entry = sections
                    .entry(key)
                    .or_insert_with(|| Value::Table(Table::new()));
                match entry {
                    Value::Table(existing) => merge_options(existing, options),
                    other => *other = Value::Table(options),
                }
            }
            scalar => {
                defaults.insert(key, scalar);
            }
        }
    }
}

fn merge_options(base: &mut Table, overlay: Table) {
    for (option, value) in overlay {
        base.insert(option, value);
    }
}
