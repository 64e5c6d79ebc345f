//! End-to-end reads over the composer document in `tests/data/handel.toml`.

use std::io::Write;
use std::path::PathBuf;

use ops_config::{Document, Error, ExprError, LoadError, Ops};
use serde::Deserialize;
use tempfile::NamedTempFile;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/handel.toml")
}

fn ops() -> Ops {
    Ops::open(fixture()).unwrap()
}

#[test]
fn test_basic_access() {
    let ops = ops();
    assert_eq!(ops.get::<String>("last_name").unwrap(), "Handel");
    assert_eq!(
        ops.get::<String>("full_name").unwrap(),
        "Georg Friedrich Handel"
    );
    assert_eq!(ops.get::<i64>("birth_year").unwrap(), 1685);
    assert_eq!(ops.get::<i32>("birth_year").unwrap(), 1685);
    assert_eq!(
        ops.get::<Vec<String>>("nationality").unwrap(),
        ["German", "British"]
    );
}

#[test]
fn test_entry_list_and_prefix() {
    let mut ops = ops();
    let entries = ops.entry_list("name").unwrap();
    assert_eq!(entries, ["first", "middle", "last"]);

    let direct: String = ops.get(&format!("name.{}", entries[1])).unwrap();
    ops.set_prefix("name.");
    let prefixed: String = ops.get(&entries[1]).unwrap();
    assert_eq!(direct, "Friedrich");
    assert_eq!(prefixed, direct);

    assert_eq!(ops.entry_list("").unwrap(), entries);

    ops.clear_prefix();
    assert_eq!(ops.prefix(), "");
    assert!(ops.get::<String>("middle").unwrap_err().is_missing_key());
}

#[test]
fn test_constraints() {
    let ops = ops();
    assert_eq!(
        ops.get_checked::<i64>("death_age", "v >= 0 and v < 150").unwrap(),
        74
    );
    assert_eq!(
        ops.get_checked::<String>("one_composition", "ops_in(v, {'Messiah', 'Water Music'})")
            .unwrap(),
        "Messiah"
    );
    assert_eq!(
        ops.get_checked::<Vec<i64>>(
            "compositions.concerti_grossi_op_6",
            "(v % 2 == 0 or v % 2 == 1) and v < 13",
        )
        .unwrap()
        .len(),
        12
    );
}

#[test]
fn test_constraint_violation_reports_context() {
    let ops = ops();
    let err = ops
        .get_checked::<i64>("death_age", "v > 80")
        .unwrap_err();
    match &err {
        Error::ConstraintViolation {
            entry,
            value,
            expression,
            ..
        } => {
            assert_eq!(entry, "death_age");
            assert_eq!(value, "74");
            assert_eq!(expression, "v > 80");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("handel.toml"));
}

#[test]
fn test_vector_violation_names_element() {
    let ops = ops();
    let err = ops
        .get_checked::<Vec<i64>>("compositions.concerti_grossi_op_6", "v < 10")
        .unwrap_err();
    assert!(matches!(
        err,
        Error::ConstraintViolation { ref entry, ref value, .. }
            if entry == "compositions.concerti_grossi_op_6[9]" && value == "10"
    ));
}

#[test]
fn test_membership_violation_has_note() {
    let ops = ops();
    let err = ops
        .get_checked::<String>("one_composition", "ops_in(v, {'Rinaldo'})")
        .unwrap_err();
    assert!(err.to_string().contains("Note: 'ops_in"));
}

#[test]
fn test_malformed_constraint_is_distinct() {
    let ops = ops();
    let err = ops.get_checked::<i64>("death_age", "v >= and").unwrap_err();
    assert!(matches!(err, Error::ConstraintExpression { .. }));

    let err = ops.get_checked::<String>("last_name", "v > 3").unwrap_err();
    assert!(matches!(err, Error::ConstraintExpression { .. }));
}

#[test]
fn test_defaults() {
    let ops = ops();
    assert!(ops.get_or::<bool>("Show_compositions", "", true).unwrap());
    // The default is trusted: the constraint is not applied to it.
    assert_eq!(ops.get_or::<i64>("absent", "v > 100", 1).unwrap(), 1);
    assert_eq!(ops.get_or::<i64>("absent", "not valid ((", 1).unwrap(), 1);
    // A present value is still checked.
    assert!(ops.get_or::<i64>("death_age", "v > 100", 1).is_err());
}

#[test]
fn test_missing_and_mismatch() {
    let ops = ops();
    assert!(matches!(
        ops.get::<bool>("Show_compositions"),
        Err(Error::MissingKey { ref entry, .. }) if entry == "Show_compositions"
    ));
    assert!(matches!(
        ops.get_or::<i64>("last_name", "", 0),
        Err(Error::TypeMismatch { expected: "integer", ref actual, .. }) if actual == "string"
    ));
    assert!(matches!(
        ops.get::<String>("name"),
        Err(Error::TypeMismatch { ref actual, .. }) if actual == "record"
    ));
    assert!(matches!(
        ops.entry_list("last_name"),
        Err(Error::TypeMismatch { expected: "record", .. })
    ));
    assert!(ops.entry_list("nobody").unwrap_err().is_missing_key());
}

#[test]
fn test_is_and_exists() {
    let ops = ops();
    assert!(ops.is::<i64>("birth_year"));
    assert!(ops.is::<f64>("birth_year"));
    assert!(!ops.is::<String>("birth_year"));
    assert!(!ops.is::<i64>("no_such_key"));
    assert!(ops.exists("compositions.water_music"));
    assert!(ops.exists("compositions.water_music.2"));
    assert!(!ops.exists("compositions.water_music.3"));
}

#[test]
fn test_scoped_facades_share_document() {
    let ops = ops();
    let name = ops.scoped("name");
    assert_eq!(name.get::<String>("first").unwrap(), "Georg");
    assert_eq!(ops.prefix(), "");
    assert!(std::sync::Arc::ptr_eq(ops.document(), name.document()));
}

#[test]
fn test_deserialize_sub_record() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct Name {
        first: String,
        middle: String,
        last: String,
    }

    let ops = ops();
    assert_eq!(
        ops.deserialize::<Name>("name").unwrap(),
        Name {
            first: "Georg".into(),
            middle: "Friedrich".into(),
            last: "Handel".into(),
        }
    );
    assert!(matches!(
        ops.deserialize::<Name>("compositions"),
        Err(Error::Deserialize { .. })
    ));
}

#[test]
fn test_reopen_clears_prefix() {
    let mut other = NamedTempFile::new().unwrap();
    writeln!(other, "[name]\nfirst = \"Johann\"").unwrap();

    let mut ops = ops();
    ops.set_prefix("name");
    ops.reopen(other.path()).unwrap();
    assert_eq!(ops.prefix(), "");
    assert_eq!(ops.get::<String>("name.first").unwrap(), "Johann");

    ops.set_prefix("name");
    assert!(matches!(
        ops.reopen("/nonexistent/other.toml"),
        Err(Error::Load(LoadError::FileNotFound(_)))
    ));
    assert_eq!(ops.prefix(), "name");
}

#[test]
fn test_open_reports_load_errors() {
    let mut broken = NamedTempFile::new().unwrap();
    writeln!(broken, "name = [1, \"two\"]").unwrap();
    assert!(matches!(
        Ops::open(broken.path()),
        Err(Error::Load(LoadError::UnsupportedArray { .. }))
    ));
    assert!(matches!(
        Ops::open("/nonexistent/handel.toml"),
        Err(Error::Load(LoadError::FileNotFound(_)))
    ));
}

#[test]
fn test_env_override_visible_through_ops() {
    std::env::set_var("OPS_CONFIG_TEST_COMPOSER__DEATH_AGE", "200");
    let document = Document::builder()
        .with_file(fixture(), true)
        .with_env("OPS_CONFIG_TEST_COMPOSER", "__")
        .build()
        .unwrap();
    std::env::remove_var("OPS_CONFIG_TEST_COMPOSER__DEATH_AGE");

    let ops = Ops::from_document(document.into());
    assert_eq!(ops.get::<i64>("death_age").unwrap(), 200);
    assert!(matches!(
        ops.get_checked::<i64>("death_age", "v >= 0 and v < 150"),
        Err(Error::ConstraintViolation { .. })
    ));
}

#[test]
fn test_satisfies_reports_without_failing() {
    let ops = ops();
    assert!(ops.satisfies("death_age", "v >= 0 and v < 150").unwrap());
    assert!(!ops.satisfies("death_age", "v > 80").unwrap());
    assert!(ops.satisfies("death_age", "").unwrap());
    assert!(ops
        .satisfies("compositions.concerti_grossi_op_6", "v < 13")
        .unwrap());
    assert!(!ops
        .satisfies("compositions.concerti_grossi_op_6", "v < 10")
        .unwrap());

    assert!(ops.satisfies("absent", "v > 0").unwrap_err().is_missing_key());
    assert!(matches!(
        ops.satisfies("name", "v > 0"),
        Err(Error::TypeMismatch { expected: "scalar or vector", .. })
    ));
    assert!(matches!(
        ops.satisfies("last_name", "v > 3"),
        Err(Error::ConstraintExpression { .. })
    ));
}

#[test]
fn test_deep_constraint_is_an_error() {
    let ops = ops();
    let err = ops
        .get_checked::<i64>("death_age", &"(".repeat(2_000))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::ConstraintExpression {
            source: ExprError::TooDeep { .. },
            ..
        }
    ));
}

#[test]
fn test_escapes_kept_beside_references() {
    let ops = Ops::from_toml_str(
        "a = \"x\"\nb = \"${a}\"\nc = \"literal $${HOME}\"\nprice = \"$$$$5\"",
    )
    .unwrap();
    assert_eq!(ops.get::<String>("b").unwrap(), "x");
    assert_eq!(ops.get::<String>("c").unwrap(), "literal ${HOME}");
    assert_eq!(ops.get::<String>("price").unwrap(), "$$5");
}
