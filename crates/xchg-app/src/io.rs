use kanal::AsyncSender;
use tokio_util::sync::CancellationToken;
use xchg_types::{AppEvent, CaptureRegion, Command, Mode, RegionSlot};

const COMMANDS: &str = "pause, resume, lock, unlock, swap, mode <auto|have|want>, \
    region <ratio|left|right> X Y W H, status, quit";

/// Parse one console line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match (head.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("pause", []) => Command::Pause,
        ("resume", []) => Command::Resume,
        ("lock", []) => Command::Lock,
        ("unlock", []) => Command::Unlock,
        ("swap", []) => Command::Swap,
        ("status", []) => Command::Status,
        ("quit" | "exit", []) => Command::Quit,
        ("mode", [mode]) => Command::SetMode(mode.parse::<Mode>()?),
        ("region", [slot, x, y, width, height]) => Command::SetRegion {
            slot: slot.parse::<RegionSlot>()?,
            region: CaptureRegion::new(
                parse_number(x, "x")?,
                parse_number(y, "y")?,
                parse_number(width, "width")?,
                parse_number(height, "height")?,
            ),
        },
        (other, _) => {
            return Err(format!(
                "unrecognized command '{other}'; expected one of: {COMMANDS}"
            ));
        }
    };

    Ok(Some(command))
}

fn parse_number<T: std::str::FromStr>(text: &str, name: &str) -> Result<T, String> {
    text.parse()
        .map_err(|_| format!("invalid {name} '{text}'"))
}

/// Forward stdin lines as commands until cancelled or stdin closes.
///
/// Stdin is read on a plain thread so a pending read never holds up runtime
/// shutdown.
pub async fn console_input(
    event_tx: AsyncSender<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let (line_tx, line_rx) = kanal::bounded::<String>(16);
    let line_rx = line_rx.to_async();

    std::thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            for line in std::io::stdin().lines() {
                let Ok(line) = line else {
                    break;
                };
                if line_tx.send(line).is_err() {
                    break;
                }
            }
        })?;

    tracing::info!("Console commands: {COMMANDS}");
    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            line = line_rx.recv() => line,
        };
        let Ok(line) = line else {
            tracing::debug!("Stdin closed");
            break;
        };

        match parse_command(&line) {
            Ok(Some(command)) => event_tx.send(AppEvent::Command(command)).await?,
            Ok(None) => {}
            Err(e) => tracing::warn!("{e}"),
        }
    }

    Ok(())
}
