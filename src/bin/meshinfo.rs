//! Print statistics for the sub-meshes of a serialized mesh container.

use std::ops::Range;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use serialized_mesh::vfs::{FileSystemProvider, Vfs};
use serialized_mesh::{
    ScalarType, SerializedError, ShapeProps, Transform, TriangleMesh, container_mesh_count,
    load_shape, open_container,
};
use serialized_mesh_core::math::Vec3;

#[derive(Parser)]
#[command(name = "meshinfo")]
#[command(about = "Inspect serialized triangle mesh containers")]
struct Cli {
    /// Path to the .serialized file
    file: PathBuf,

    /// Sub-mesh to inspect
    #[arg(long, short, default_value_t = 0, conflicts_with = "all")]
    index: i32,

    /// Inspect every sub-mesh in the file
    #[arg(long, short)]
    all: bool,

    /// Load with flat face normals
    #[arg(long)]
    face_normals: bool,

    /// Keep vertex data in double precision
    #[arg(long)]
    double: bool,

    /// Translate after scaling
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_hyphen_values = true)]
    translate: Option<Vec<f64>>,

    /// Uniform scale
    #[arg(long)]
    scale: Option<f64>,

    /// Extra directories searched when the file is not found next to the path
    #[arg(long = "search-path", short = 's')]
    search_paths: Vec<PathBuf>,
}

impl Cli {
    fn to_world(&self) -> Transform {
        let mut transform = Transform::identity();
        if let Some(s) = self.scale {
            transform = transform.then(&Transform::scale(Vec3::repeat(s)));
        }
        if let Some(t) = &self.translate {
            transform = transform.then(&Transform::translate(Vec3::new(t[0], t[1], t[2])));
        }
        transform
    }

    fn vfs(&self) -> (Vfs, String) {
        let dir = self
            .file
            .parent()
            .map(PathBuf::from)
            .unwrap_or_default();
        let name = self
            .file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let provider = self
            .search_paths
            .iter()
            .fold(FileSystemProvider::new(dir), |p, root| p.with_root(root));
        let mut vfs = Vfs::new();
        vfs.mount("local", provider);
        vfs.set_default("local");
        (vfs, name)
    }
}

fn print_mesh(index: i32, mesh: &TriangleMesh) {
    let yes_no = |b: bool| if b { "yes" } else { "no" };
    println!("[{index}] {}", mesh.name());
    println!("    vertices:      {}", mesh.vertex_count());
    println!("    faces:         {}", mesh.face_count());
    println!("    precision:     {:?}", mesh.layout().scalar());
    println!("    index format:  {:?}", mesh.index_format());
    println!("    normals:       {}", yes_no(mesh.has_vertex_normals()));
    println!("    texcoords:     {}", yes_no(mesh.has_vertex_texcoords()));
    println!("    colors:        {}", yes_no(mesh.has_vertex_colors()));
    println!("    face normals:  {}", yes_no(mesh.has_face_normals()));
    let bbox = mesh.bbox();
    if bbox.is_valid() {
        println!(
            "    bbox:          [{:.4}, {:.4}, {:.4}] - [{:.4}, {:.4}, {:.4}]",
            bbox.min.x, bbox.min.y, bbox.min.z, bbox.max.x, bbox.max.y, bbox.max.z
        );
    } else {
        println!("    bbox:          empty");
    }
    println!("    surface area:  {:.6}", mesh.surface_area());
}

/// Indices of a container with `count` meshes that a shape index can name.
fn addressable_indices(count: u32) -> Range<i32> {
    match i32::try_from(count) {
        Ok(n) => 0..n,
        Err(_) => {
            log::warn!(
                "directory lists {count} meshes; only the first {} are addressable",
                i32::MAX
            );
            0..i32::MAX
        }
    }
}

fn run(cli: &Cli) -> Result<(), SerializedError> {
    let (vfs, name) = cli.vfs();

    let indices: Box<dyn Iterator<Item = i32>> = if cli.all {
        let file = open_container(&vfs, &name)?;
        let count = container_mesh_count(file, &name)?;
        log::info!("{name} contains {count} meshes");
        Box::new(addressable_indices(count))
    } else {
        Box::new(std::iter::once(cli.index))
    };

    let precision = if cli.double {
        ScalarType::Float64
    } else {
        ScalarType::Float32
    };
    let base = ShapeProps::new(name)
        .with_face_normals(cli.face_normals)
        .with_precision(precision)
        .with_to_world(cli.to_world());

    for index in indices {
        let props = base.clone().with_shape_index(index);
        let mesh = load_shape(&vfs, &props, &[])?;
        print_mesh(index, &mesh);
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    serialized_mesh_core::init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("meshinfo: {e}");
            ExitCode::FAILURE
        }
    }
}
