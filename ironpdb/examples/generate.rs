//! Generates wrappers for a small hand-built module and prints the result.
//!
//! Run with: `cargo run --example generate`

use ironpdb::prelude::*;

fn main() -> Result<(), CodegenError> {
    let mut builder = ModuleBuilder::new("demo");
    let int4 = builder.basic_type(BasicType::Int, 4);
    let float4 = builder.basic_type(BasicType::Float, 4);

    let point = builder.udt("Point", 8);
    builder.field(point, "x", int4, 0);
    builder.field(point, "y", int4, 4);

    let circle = builder.udt("Circle", 16);
    builder.base_class(circle, point, 0);
    builder.field(circle, "radius", float4, 8);

    builder.enum_type(
        "Color",
        BasicType::UInt,
        4,
        &[("Red", 0), ("Green", 1), ("Blue", 2)],
    );

    builder.global("origin", point);

    let provider = builder.into_provider();
    let mut options = GenerationOptions::new();
    options.field_type_info_comments = true;
    options.default_namespace = Some("Demo".to_string());

    let generated = generate_module(&provider, "demo", &TypeMappings::new(), &options)?;
    println!("{}", generated.source);
    for error in &generated.errors {
        eprintln!("warning: {error}");
    }
    Ok(())
}
