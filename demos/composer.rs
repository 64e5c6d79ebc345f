use std::path::PathBuf;

use ops_config::Ops;

fn main() -> Result<(), ops_config::Error> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/handel.toml");
    let mut ops = Ops::open(path)?;

    println!("Last name: {}", ops.get::<String>("last_name")?);
    println!("Full name: {}", ops.get::<String>("full_name")?);
    println!("Birth year: {}", ops.get::<i64>("birth_year")?);
    println!("Nationality: {:?}", ops.get::<Vec<String>>("nationality")?);

    let entries = ops.entry_list("name")?;
    println!("Entries in \"name\": {}", entries.join(", "));
    println!("Middle name: {}", ops.get::<String>(&format!("name.{}", entries[1]))?);
    ops.set_prefix("name.");
    println!("Middle name: {}", ops.get::<String>(&entries[1])?);
    ops.clear_prefix();

    let age: i64 = ops.get_checked("death_age", "v >= 0 and v < 150")?;
    println!("Death age: {age}");
    let work: String =
        ops.get_checked("one_composition", "ops_in(v, {'Messiah', 'Water Music'})")?;
    println!("One composition: {work}");
    let op_6: Vec<i64> = ops.get_checked(
        "compositions.concerti_grossi_op_6",
        "(v % 2 == 0 or v % 2 == 1) and v < 13",
    )?;
    println!("Concerti grossi, op. 6: {op_6:?}");

    let show = ops.get_or("Show_compositions", "", true)?;
    println!("Show compositions: {show}");

    Ok(())
}
