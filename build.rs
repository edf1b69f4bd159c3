#[cfg(feature = "spirv-build")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use spirv_builder::{MetadataPrintout, SpirvBuilder};

    // Exposes the module path as `catalog_shaders.spv` for `include_bytes!`.
    SpirvBuilder::new("shaders", "spirv-unknown-vulkan1.1")
        .print_metadata(MetadataPrintout::Full)
        .build()?;
    Ok(())
}

#[cfg(not(feature = "spirv-build"))]
fn main() {
    println!("cargo:rerun-if-changed=build.rs");
}
