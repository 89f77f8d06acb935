use dimcfg::dimension::Register;
use dimcfg::value::Value;
use dimcfg::{yaml, Config, Error, Tuple};
use pretty_assertions::assert_eq;

const ENV: &str = r#"
env/[[]]:
  dev: [d1]
  prod: [p1]
url[[prod]]: "http://[[@]]"
url[[dev]]: "http://[[@]]:8080"
"#;

fn config(source: &str) -> Config {
    Config::parse(&yaml!(source)).expect("valid document")
}

fn labels(tuples: &[Tuple]) -> Vec<String> {
    tuples.iter().map(Tuple::to_string).collect()
}

#[test]
fn url_per_environment() {
    let config = config(ENV);
    let tuples = config.generate();
    assert_eq!(labels(&tuples), ["env=dev.d1", "env=prod.p1"]);

    assert_eq!(config.render(&tuples[0]).unwrap(), yaml!("url: http://d1:8080"));
    assert_eq!(config.render(&tuples[1]).unwrap(), yaml!("url: http://p1"));
}

#[test]
fn unknown_filter_value() {
    let mut config = config(ENV);
    let err = config.filter(["env=staging"]).unwrap_err();

    assert!(matches!(err, Error::Filter { .. }));
    assert!(matches!(
        err.root_cause(),
        Error::Unresolved { dimension, value, .. } if dimension == "env" && value == "staging"
    ));
}

#[test]
fn cartesian_completeness() {
    let config = config(
        r#"
        a/[[]]:
          x: [1, 2]
          y: [3]
          ":z": [4, 5]
        b/<>:
          p: [6, 7]
        "#,
    );

    let tuples = config.generate();
    // a: 3 values in R0 x 2 values in R1, b: 2 values
    assert_eq!(tuples.len(), 12);

    let unique: std::collections::HashSet<String> = labels(&tuples).into_iter().collect();
    assert_eq!(unique.len(), 12);

    for tuple in &tuples {
        assert_eq!(tuple.get("a").map(|fragment| fragment.len()), Some(2));
        assert_eq!(tuple.get("b").map(|fragment| fragment.len()), Some(1));
    }
}

#[test]
fn filter_monotonicity() {
    let source = r#"
        env/[[]]:
          dev: [d1, d2]
          prod: [p1]
        region/<>:
          eu: [fra, ams]
          us: [nyc]
        "#;

    let unfiltered = config(source).generate().len();
    assert_eq!(unfiltered, 9);

    let mut by_domain = config(source);
    by_domain.filter(["env=dev"]).unwrap();
    assert_eq!(by_domain.generate().len(), 6);

    let mut by_value = config(source);
    by_value.filter(["env=dev.d2", "region=fra"]).unwrap();
    assert_eq!(labels(&by_value.generate()), ["env=dev.d2,region=eu.fra"]);

    // two filters that share nothing leave no items
    let mut disjoint = config(source);
    disjoint.filter(["env=dev", "env=prod"]).unwrap();
    assert!(disjoint.generate().is_empty());
}

#[test]
fn filter_cascades_into_dependents() {
    let mut config = config(
        r#"
        env/[[]]:
          dev: [d1]
          prod: [p1]
        region/<>:
          "-[[prod]]":
            eu: [fra]
          us: [nyc]
        "#,
    );
    assert_eq!(config.generate().len(), 3);

    config.filter(["env=dev"]).unwrap();

    let region = config.dimension("region").unwrap();
    assert_eq!(region.domains(Register(0)), ["us"]);
    assert_eq!(labels(&config.generate()), ["env=dev.d1,region=us.nyc"]);
}

#[test]
fn condition_and_semantics() {
    let config = config(
        r#"
        env/[[]]:
          dev: [d1]
          prod: [p1]
        region/<>:
          eu: [fra]
          us: [nyc]
        flag[[prod]]<eu>: on
        "#,
    );

    let rendered: Vec<(String, Value)> = config
        .generate()
        .iter()
        .map(|tuple| (tuple.to_string(), config.render(tuple).unwrap()))
        .collect();

    for (label, tree) in rendered {
        let expected = if label == "env=prod.p1,region=eu.fra" {
            yaml!("flag: on")
        } else {
            yaml!("{}")
        };
        assert_eq!(tree, expected, "{label}");
    }
}

#[test]
fn interpolation_identity() {
    let config = config(
        r#"
        env/[[]]:
          dev: [d1]
          prod: [p1]
        name: "[[.]]"
        selected: "[[$]]/[[@]]"
        "#,
    );

    let trees: Vec<Value> = config
        .generate()
        .iter()
        .map(|tuple| config.render(tuple).unwrap())
        .collect();

    assert_eq!(trees[0], yaml!("name: env\nselected: dev/d1"));
    assert_eq!(trees[1], yaml!("name: env\nselected: prod/p1"));
}

#[test]
fn tuple_labels_round_trip_as_filters() {
    let source = r#"
        env/[[]]:
          dev: [d1, d2]
          ":zone": [a, b]
        region/<>:
          eu: [fra]
          us: [nyc]
        "#;

    for tuple in config(source).generate() {
        let mut filtered = config(source);
        filtered.filter(tuple.filters()).unwrap();
        assert_eq!(filtered.generate(), [tuple]);
    }
}

#[test]
fn products_pair_variant_and_tree() {
    let products = config(ENV).products().unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(
        products[1].variant.selection("env", Register(0)).map(|s| s.domain.as_str()),
        Some("prod")
    );
    assert_eq!(products[1].tree, yaml!("url: http://p1"));
}

#[test]
fn interpolation_errors_abort_rendering() {
    let config = config(
        r#"
        env/[[]]:
          dev: [d1]
        broken: "[[:@]]"
        "#,
    );

    let tuple = &config.generate()[0];
    let err = config.render(tuple).unwrap_err();
    assert!(matches!(err, Error::Interpolation { .. }));
    assert!(matches!(config.products(), Err(Error::Interpolation { .. })));
}

#[test]
fn garbage_key_fails_parse() {
    let err = Config::parse(&yaml!("env/[[]]: { dev: [d1] }\nurl[[dev]]x: 1")).unwrap_err();
    assert!(matches!(err, Error::TrailingGarbage { key } if key == "url[[dev]]x"));
}
