//! `wbmedia video` command.

use std::time::Duration;

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use tokio::sync::mpsc;
use wbmedia::config::ConfigFile;

use super::common::{parse_article, start_app};
use crate::error::CliError;

/// Arguments of `wbmedia video`.
#[derive(Debug, Args)]
pub struct VideoArgs {
    /// Article number or product link
    pub article: String,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the video command.
pub async fn run(args: VideoArgs, config: &ConfigFile) -> Result<(), CliError> {
    let id = parse_article(&args.article)?;
    let (app, cancel) = start_app(config).await?;
    let service = app.service();

    let (tx, mut rx) = mpsc::channel::<u8>(16);
    let bar = progress_bar(args.json);
    let bar_task = {
        let bar = bar.clone();
        tokio::spawn(async move {
            while let Some(percent) = rx.recv().await {
                bar.set_position(u64::from(percent));
            }
        })
    };

    let result = service.search_video(id, Some(&tx), &cancel).await;
    drop(tx);
    let _ = bar_task.await;
    bar.finish_and_clear();

    app.shutdown().await;

    let video = result?;

    if args.json {
        let out = json!({ "id": id, "video": video });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        match video {
            Some(url) => println!("{}", url),
            None => println!("Article {} has no video", id),
        }
    }
    Ok(())
}

fn progress_bar(hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(100);
    if let Ok(style) = ProgressStyle::with_template("{spinner} Searching video [{bar:40}] {pos:>3}%") {
        bar.set_style(style.progress_chars("=> "));
    }
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}
