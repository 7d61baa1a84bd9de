use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use jschema::loader::{LoaderRegistry, MemoryLoader};
use jschema::*;
use std::sync::Arc;

const PERSON: &str = r#"{
    "type":"object",
    "properties":{
        "name":{"type":"string","required":true,"maxLength":64},
        "age":{"type":"integer","minimum":0,"maximum":125},
        "email":{"type":"string","format":"email"},
        "tags":{"type":"array","items":{"type":"string"},"uniqueItems":true},
        "state":{"type":"string","requires":"city"},
        "city":{"type":"string"}
    },
    "additionalProperties":false
}"#;

fn people(count: usize) -> Value {
    (0..count)
        .map(|i| {
            Value::from_json_str(&format!(
                r#"{{"name":"Person {i}","age":{age},"email":"p{i}@example.com",
                    "tags":["a{i}","b{i}","c{i}"],"state":"Ohio","city":"Dayton"}}"#,
                i = i,
                age = i % 130
            ))
            .unwrap()
        })
        .collect()
}

fn bench_list(c: &mut Criterion) {
    let schema = Arc::new(
        Schema::from_json_str(&format!(r#"{{"type":"array","items":{}}}"#, PERSON)).unwrap(),
    );
    let registry = Arc::new(LoaderRegistry::new());
    let mut group = c.benchmark_group("validate_list");
    for count in [10, 100, 1000] {
        let value = people(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &value, |b, value| {
            let mut validator = Validator::with_registry(ValidatorConfig::default(), registry.clone());
            b.iter(|| {
                validator.reset();
                validator.check(black_box(value), &schema).unwrap();
                validator.errors().len()
            })
        });
    }
    group.finish();
}

fn bench_linked(c: &mut Criterion) {
    let mut memory = MemoryLoader::new();
    memory.insert_schema("http://bench/person", PERSON);
    memory.insert_schema(
        "http://bench/employee",
        r#"{"extends":"person","properties":{"id":{"type":"integer"}}}"#,
    );
    let mut registry = LoaderRegistry::new();
    registry.add_loader(memory);
    let registry = Arc::new(registry);

    let value = Value::from_json_str(r#"{"name":"Ann","age":40,"id":7}"#).unwrap();
    let mut validator = Validator::with_registry(ValidatorConfig::default(), registry);
    c.bench_function("validate_extends_cached", |b| {
        b.iter(|| {
            validator.reset();
            validator
                .check(black_box(&value), SchemaSource::uri("http://bench/employee"))
                .unwrap();
            validator.errors().len()
        })
    });
}

criterion_group!(benches, bench_list, bench_linked);
criterion_main!(benches);
