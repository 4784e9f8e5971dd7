use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use easel_editor::prelude::*;
use easel_engine::logging::{init_logging, LoggingConfig};
use easel_engine::paint::Paint;
use easel_engine::scene::SceneObject;

/// Builds a sample design, crops it through the editor and writes a PNG.
#[derive(Debug, Parser)]
#[command(name = "easel-studio", version)]
struct Args {
    /// Editor config JSON; missing keys keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output PNG path
    #[arg(long, default_value = "easel-out.png")]
    out: PathBuf,

    /// Built-in template to place on the surface
    #[arg(long, default_value = "sale-badge")]
    template: String,

    /// Log filter in env_logger syntax, e.g. "easel_editor=debug"
    #[arg(long = "log")]
    log_filter: Option<String>,

    /// Image files to load onto the surface
    images: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(match &args.log_filter {
        Some(filter) => LoggingConfig::with_filter(filter.clone()),
        None => LoggingConfig::default(),
    });

    let config = match &args.config {
        Some(path) => {
            EditorConfig::load(path).with_context(|| format!("loading {}", path.display()))?
        }
        None => EditorConfig::default(),
    };

    let scene = Scene::new(800.0, 600.0);
    let (width, height) = (scene.size().x, scene.size().y);
    let mut editor = Editor::new(scene, config, tokio::runtime::Handle::current());

    // Backdrop with a reflected gradient. It takes no pointer input so the crop can start on it.
    let backdrop = editor.engine_mut().add_object(
        SceneObject::rect(Rect::new(0.0, 0.0, width, height)).fill(Paint::solid(Rgb::WHITE)),
    );
    editor.engine_mut().set_selection(&[backdrop]);
    let (light, dark) = (Rgb::from_hex("#e0e7ff")?, Rgb::from_hex("#c7d2fe")?);
    let backdrop_gradient = GradientSpec::new(GradientKind::Reflected, light, dark)
        .mid(30.0)
        .angle(90.0);
    editor.apply_gradient(&backdrop_gradient);
    if let Some(obj) = editor.engine_mut().object_mut(backdrop) {
        obj.evented = false;
    }

    let ids = editor
        .insert_template(&args.template)
        .with_context(|| format!("inserting template '{}'", args.template))?;
    log::info!("template '{}' placed {} objects", args.template, ids.len());

    if !args.images.is_empty() {
        let items = args.images.iter().cloned().map(ImageSource::File).collect();
        editor.add_images(items, Some(Vec2::new(260.0, 60.0)));
        let inserted = editor.settle_images().await;
        log::info!("{} of {} images inserted", inserted.len(), args.images.len());
    }

    // Crop from the bottom-right corner back toward the template.
    editor.set_tool(Tool::Crop);
    let start = Vec2::new(width - 1.0, height - 1.0);
    if !editor.handle_event(&InputEvent::pointer_down(start)).is_consumed() {
        log::warn!("crop press at {:?} landed on an object", start);
    }
    editor.handle_event(&InputEvent::pointer_move(Vec2::new(0.0, 0.0)));

    let region = match editor.finalize_crop() {
        Some(CropOutcome::Replaced { region, .. }) => region,
        Some(CropOutcome::Cancelled) | None => {
            log::warn!("no crop was made; exporting the whole surface");
            editor.engine().bounds()
        }
    };

    let scene = editor.detach();
    let image = scene
        .rasterize(region, 1.0)
        .with_context(|| format!("rendering {region:?}"))?;
    image
        .save(&args.out)
        .with_context(|| format!("writing {}", args.out.display()))?;

    println!("wrote {} ({}x{})", args.out.display(), image.width(), image.height());
    Ok(())
}
