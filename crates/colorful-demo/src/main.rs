//! Colorful picker walkthrough
//!
//! Drives the toggle controller against in-memory props the way a user
//! would: open the picker, pick three colors in quick succession and wait
//! for the single deferred close.
//!
//! ```text
//! colorful-demo [props.json]
//! ```
//!
//! Without a file the props are those of a hex picker starting at `#222`.
//! Set `RUST_LOG=debug` to follow the controller.

use std::convert::Infallible;
use std::path::PathBuf;
use std::time::Duration;

use colorful_core::{
    ColorfulError, ColorfulProps, SharedProps, ThrottleError, ToggleController,
};
use log::{error, info};

/// Colors picked one after the other.
const PICKS: [&str; 3] = ["#ef4444", "#22c55e", "#3b82f6"];
/// Time between two picks.
const PICK_INTERVAL: Duration = Duration::from_millis(300);

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Colorful(#[from] ColorfulError),
    #[error("deferred close failed: {0}")]
    Close(#[from] ThrottleError<Infallible>),
}

fn load_props() -> Result<ColorfulProps, DemoError> {
    let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) else {
        return Ok(ColorfulProps {
            id: Some("component".to_string()),
            value: Some("#222".into()),
            toggleable: true,
            ..ColorfulProps::default()
        });
    };

    let json = std::fs::read_to_string(&path).map_err(|source| DemoError::Read {
        path: path.clone(),
        source,
    })?;
    info!("Loaded props from {}", path.display());
    Ok(ColorfulProps::from_json(&json)?)
}

async fn run() -> Result<(), DemoError> {
    let host = SharedProps::new(load_props()?);
    let controller = ToggleController::new(host.clone())?;

    if !host.snapshot().active && controller.on_toggle(&host.snapshot()) {
        info!("Picker opened");
    }

    let mut closing = None;
    for (i, color) in PICKS.into_iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(PICK_INTERVAL).await;
        }
        closing = controller.on_change(&host.snapshot(), color.into());
        info!("Picked {} (active = {})", color, host.snapshot().active);
    }

    match closing {
        Some(pending) => {
            info!("Waiting for the picker to close");
            pending.await?;
            info!("Picker closed");
        }
        None => info!("Picker stays open, toggle_on_choose is off"),
    }

    println!("{}", host.snapshot().to_json()?);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();

    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}
