use std::path::Path;
use std::sync::Arc;

use smartcsv::io::CsvFileReader;
use smartcsv::rules::{RuleFormat, parse_rules};

const CSV: &str = "\
name,age,birthday,country
Bob,nine,1990-02-30,NO
Alice,42,1983-07-14,
Eve,,2001-11-02,Sweden
";

const RULES: &str = r#"{
  "columns": {
    "name": { "not empty": true },
    "age": { "integer": true, "not empty": true },
    "birthday": { "date": "%Y-%m-%d" },
    "country": { "value of": ["NO", "SE", "DK"] }
  }
}"#;

fn main() {
    println!("=== Rule Validation Demo ===");

    let mut model = CsvFileReader::default()
        .read_from(CSV.as_bytes(), Path::new("people.csv"))
        .expect("demo csv parses");
    println!("\nLoaded {} rows, columns {:?}", model.len(), model.header());
    println!("Without rules: valid = {}", model.is_valid());

    let rules = parse_rules(RULES, RuleFormat::Json, Path::new("people.json")).expect("demo rules parse");
    println!("Rules for columns {:?}", rules.columns());
    model.set_validator(Some(Arc::new(rules)));

    println!("\nWith rules: {} invalid cells", model.invalid_count());
    for entry in model.invalid_cells() {
        println!(
            "  row {} {:>9}: {:?} -> {}",
            entry.row_number,
            entry.cell.column(),
            entry.cell.value(),
            entry.cell.state().summary()
        );
    }

    println!("\nFixing Bob's age and birthday...");
    model.set_value(0, "age", "9");
    model.set_value(0, "birthday", "1990-02-28");
    println!("Now {} invalid cells", model.invalid_count());
}
