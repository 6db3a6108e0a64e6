//! Bake a layer's automation into real frames.

use std::io::Write;
use std::path::PathBuf;

use glowgrid_common::config::AppConfig;
use glowgrid_pattern_model::EditContext;
use glowgrid_render_engine::{bake_in_background, BakeRequest, CancellationToken, GenerationProgress};

pub struct BakeArgs {
    pub path: PathBuf,
    pub layer: Option<u32>,
    pub frame: u32,
    pub count: Option<u32>,
    pub force: bool,
    pub keep_actions: bool,
}

pub async fn run(args: BakeArgs, config: &AppConfig) -> anyhow::Result<()> {
    let mut pattern = super::load_pattern(&args.path)?;
    let layer = super::resolve_layer(&pattern, args.layer)?;
    let count = args.count.unwrap_or(config.automation.default_bake_count);

    println!(
        "Baking layer {layer} of '{}' from frame {} ({count} frame(s))",
        pattern.name, args.frame
    );

    let mut request = BakeRequest::from_config(count, &config.automation);
    request.options.force |= args.force;
    if args.keep_actions {
        request.finalize_actions = false;
    }
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    request.options = request.options.with_cancel(cancel).with_progress(|p: GenerationProgress| {
        print!(
            "\r  Progress: {:5.1}% ({}/{})",
            p.progress * 100.0,
            p.frames_generated,
            p.total_frames
        );
        let _ = std::io::stdout().flush();
    });

    let ctx = EditContext::for_pattern(&pattern, layer, args.frame);
    let result = bake_in_background(&mut pattern, ctx, request).await;
    interrupt.abort();
    println!();
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) if e.is_cancelled() => {
            println!("Bake interrupted; {} left unchanged", args.path.display());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    super::save_pattern(&pattern, &args.path)?;
    println!(
        "Baked frames {}..{} on layer {}; {} action(s) finalized",
        outcome.frames.start, outcome.frames.end, outcome.layer, outcome.finalized
    );
    Ok(())
}
