// build.rs

fn main() {
    // Generate build info (VERGEN_BUILD_TIMESTAMP, shown in the report banner)
    vergen::EmitBuilder::builder()
        .all_build()
        .emit()
        .expect("Unable to generate build info");
}
