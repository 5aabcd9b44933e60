fn main() {
    println!("cargo:rerun-if-changed=fragview.manifest");

    if std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default() != "windows" {
        return;
    }

    let mut res = winres::WindowsResource::new();
    res.set_manifest_file("fragview.manifest")
        .set("ProductName", "fragview")
        .set("FileDescription", "GLSL fragment shader preview");
    if let Err(err) = res.compile() {
        println!("cargo:warning=manifest not embedded: {err}");
    }
}
