use std::path::Path;

const PROTO_ROOT: &str = "proto";
const PROTOS: &[&str] = &["command.proto"];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    std::env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?);

    let root = Path::new(PROTO_ROOT);
    let protos: Vec<_> = PROTOS.iter().map(|name| root.join(name)).collect();
    for proto in &protos {
        println!("cargo:rerun-if-changed={}", proto.display());
    }

    prost_build::Config::new().compile_protos(&protos, &[root])?;

    Ok(())
}
