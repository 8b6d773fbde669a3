use std::io::Result;

fn main() -> Result<()> {
    let proto_files = &["proto/api-service.proto"];

    let proto_folder = "proto";

    // The server half is only compiled so tests can run an in-process fake.
    tonic_prost_build::configure()
        .protoc_arg("--experimental_allow_proto3_optional")
        .build_client(true)
        .build_server(true)
        .compile_protos(proto_files, &[proto_folder])?;

    println!("cargo:rerun-if-changed=proto/api-service.proto");

    Ok(())
}
