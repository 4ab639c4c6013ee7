//! Demo binary: load or generate a voxel chunk, compress it, build its quad
//! mesh, and test its visibility from the configured camera.
//!
//! Run with `cargo run -p voxide-demo -- model.vox`, or without a model to
//! mesh a generated shape (`--shape solid|sphere|checkerboard`).

mod shapes;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use glam::{Mat4, Vec3};
use tracing::{error, info, warn};
use voxide_config::Config;
use voxide_cull::Frustum;
use voxide_formats::{Kv6Model, VoxModel};
use voxide_mesh::{MESH_VERTEX_SIZE, MesherOptions, build_mesh};
use voxide_voxel::{CHUNK_SIZE, Chunk, ChunkPool, CompressedChunk, DenseChunk, RgbaVoxel};

/// World-space scale applied to chunk-local coordinates when rendering.
const WORLD_SCALE: f32 = 0.01;

#[derive(Parser, Debug)]
#[command(name = "voxide-demo", about = "Mesh a voxel model and report statistics")]
struct Args {
    /// Voxel model to load (`.vox` or `.kv6`); a generated shape if omitted.
    model: Option<PathBuf>,

    /// Shape to generate when no model file is given.
    #[arg(long, value_enum, default_value = "sphere")]
    shape: shapes::Shape,

    /// Emit faces unconditionally instead of culling occluded ones.
    #[arg(long)]
    no_culling: bool,

    /// Emit one quad per visible face instead of merging rectangles.
    #[arg(long)]
    no_merging: bool,

    /// Directory containing (or receiving) `config.ron`.
    #[arg(long, default_value = ".")]
    config_dir: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // The config informs the log filter, so it loads before logging starts.
    let config = match Config::load_or_create(&args.config_dir) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("voxide-demo: {err}");
            return ExitCode::FAILURE;
        }
    };
    voxide_log::init_logging(None, cfg!(debug_assertions), Some(&config));

    match run(&args, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("demo failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let pool = ChunkPool::new();
    let mut dense = pool.acquire();
    match &args.model {
        Some(path) => load_model(path, &mut dense)?,
        None => {
            info!(shape = ?args.shape, "generating chunk");
            shapes::fill(args.shape, &mut dense);
        }
    }

    let compressed = CompressedChunk::compress(&dense);
    let ratio =
        compressed.compressed_len() as f64 / voxide_voxel::CHUNK_VOLUME as f64 * 100.0;
    info!(
        runs = compressed.run_count(),
        bytes = compressed.compressed_len(),
        ratio = %format!("{ratio:.1}%"),
        "compressed chunk"
    );

    // Both representations must agree before the dense form goes back.
    let probe = glam::IVec3::splat(CHUNK_SIZE as i32 / 2);
    debug_assert_eq!(compressed.at(probe), dense.at(probe));
    pool.release(dense);

    let options = MesherOptions {
        disable_culling: args.no_culling || config.mesher.disable_culling,
        disable_merging: args.no_merging || config.mesher.disable_merging,
        disable_buffer_upload: config.mesher.disable_buffer_upload,
    };
    let mesh = build_mesh(&compressed, options);
    info!(
        quads = mesh.len() / 4,
        bytes = mesh.len() * MESH_VERTEX_SIZE,
        "built mesh"
    );

    let camera = &config.camera;
    let projection = Mat4::perspective_rh_gl(
        camera.fov_y_degrees.to_radians(),
        camera.aspect,
        camera.z_near,
        camera.z_far,
    );
    let position = Vec3::from(camera.position);
    let view = Mat4::look_at_rh(position, position + Vec3::from(camera.direction), Vec3::Y);

    let mut frustum = Frustum::new();
    frustum.update(projection, view);

    let bounds = Vec3::splat(CHUNK_SIZE as f32) * WORLD_SCALE;
    let visible = frustum.is_cube_within(Vec3::ZERO, bounds);
    info!(visible, "visibility from configured camera");

    Ok(())
}

/// Loads a model file (dispatching on extension) into the dense chunk.
///
/// Voxels outside the chunk volume are dropped with a warning; models up to
/// 64³ fit untouched.
fn load_model(path: &Path, dense: &mut DenseChunk<RgbaVoxel>) -> Result<(), Box<dyn std::error::Error>> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let file = File::open(path)?;
    match extension.as_deref() {
        Some("vox") => {
            let model = VoxModel::read(file)?;
            info!(path = %path.display(), voxels = model.voxel_count(), "loaded vox model");
            copy_into(&model, dense);
        }
        Some("kv6") => {
            let model = Kv6Model::read(file)?;
            info!(path = %path.display(), voxels = model.voxel_count(), "loaded kv6 model");
            copy_into(&model, dense);
        }
        _ => return Err(format!("unrecognized model format: {}", path.display()).into()),
    }
    Ok(())
}

/// Copies every in-bounds voxel of `model` into the dense chunk.
fn copy_into<C>(model: &C, dense: &mut DenseChunk<C::Voxel>)
where
    C: Chunk,
{
    let bounds = glam::IVec3::splat(CHUNK_SIZE as i32);
    let mut dropped = 0usize;
    model.for_each_voxel(|pos, voxel| {
        if pos.cmpge(glam::IVec3::ZERO).all() && pos.cmplt(bounds).all() {
            dense.set(pos, Some(voxel.clone()));
        } else {
            dropped += 1;
        }
    });
    if dropped > 0 {
        warn!(dropped, "model exceeds the chunk volume; voxels dropped");
    }
}
