use argh::FromArgs;
use std::path::PathBuf;

use ply_reader::{read_ply_vertices_with_config, VertexDecodeConfig};

#[derive(FromArgs)]
/// Read the vertices of a PLY file and print a summary
struct Args {
    /// path to the PLY file
    #[argh(option)]
    ply_path: PathBuf,

    /// name of the element holding the points
    #[argh(option, default = "String::from(\"vertex\")")]
    vertex_element: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args: Args = argh::from_env();

    let config = VertexDecodeConfig::new().with_element_name(args.vertex_element);

    let now = std::time::Instant::now();
    let cloud = match read_ply_vertices_with_config(&args.ply_path, &config) {
        Ok(cloud) => cloud,
        Err(err) => {
            log::error!("{}: {err} ({:?})", args.ply_path.display(), err.kind());
            return Err(err.into());
        }
    };
    log::info!("Read #{} points in {:?}", cloud.len(), now.elapsed());

    if let (Some(min), Some(max)) = (cloud.min_bound(), cloud.max_bound()) {
        log::info!("Bounds: min {min:?} max {max:?}");
    }

    match (cloud.timestamp_property(), cloud.timestamp_range()) {
        (Some(name), Some((first, last))) => {
            log::info!("Timestamps from '{name}': [{first}, {last}]")
        }
        _ => log::info!("No timestamps"),
    }

    Ok(())
}
