use kanal::AsyncReceiver;
use tokio_util::sync::CancellationToken;
use xchg_types::{AppEvent, Side, Snapshot};

fn value_text(value: Option<u64>) -> String {
    value.map_or_else(|| "--".to_string(), |v| v.to_string())
}

/// Console block for one snapshot
pub fn render_snapshot(snapshot: &Snapshot) -> String {
    let target = snapshot.direction.target_side();
    let stale = if snapshot.stale { " (stale)" } else { "" };

    let side_line = |side: Side| {
        let (value, expected) = match side {
            Side::Left => (snapshot.left, snapshot.expected_left),
            Side::Right => (snapshot.right, snapshot.expected_right),
        };
        format!(
            "  {:<7} {:>10}   expected {:>10}",
            format!("{}:", side.label()),
            value_text(value),
            value_text(expected)
        )
    };

    [
        format!("[#{}] Ratio {}{stale}", snapshot.sequence, snapshot.ratio_text),
        side_line(Side::Left),
        side_line(Side::Right),
        format!("  Recommended {}: {}", target.label(), snapshot.recommendation),
        format!("  Confidence {}% | {}", snapshot.confidence, snapshot.status),
    ]
    .join("\n")
}

/// Prints snapshots and status lines to stdout
pub async fn ui_loop(
    app_to_ui_rx: AsyncReceiver<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let mut last_status = String::new();

    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = app_to_ui_rx.recv() => event,
        };
        let Ok(event) = event else {
            break;
        };

        match event {
            AppEvent::ShowSnapshot(snapshot) => {
                last_status = snapshot.status.clone();
                println!("{}\n", render_snapshot(&snapshot));
            }
            AppEvent::StatusUpdate { status, paused } => {
                // Repeated notices (e.g. missing regions every tick) print once
                if status != last_status {
                    let marker = if paused { " [paused]" } else { "" };
                    println!("* {status}{marker}");
                    last_status = status;
                }
            }
            AppEvent::BackendReady => {
                println!("xchg running. Type a command (status, pause, quit, ...).");
            }
            _ => {}
        }
    }

    Ok(())
}

/// One-off startup warning: a message box on Windows, a banner elsewhere
pub fn alert(title: &str, message: &str) {
    #[cfg(windows)]
    {
        use windows::Win32::UI::WindowsAndMessaging::{MB_ICONWARNING, MB_OK, MessageBoxW};
        use windows::core::{HSTRING, PCWSTR};

        let text = HSTRING::from(message);
        let caption = HSTRING::from(title);
        unsafe {
            let _ = MessageBoxW(
                None,
                PCWSTR(text.as_ptr()),
                PCWSTR(caption.as_ptr()),
                MB_OK | MB_ICONWARNING,
            );
        }
    }

    #[cfg(not(windows))]
    {
        let rule = "=".repeat(title.len().max(message.len()).min(78));
        eprintln!("{rule}\n{title}\n{message}\n{rule}");
    }
}

#[cfg(test)]
mod tests {
    use xchg_types::{Direction, Recommendation};

    use super::*;

    fn snapshot() -> Snapshot {
        Snapshot {
            sequence: 3,
            ratio_text: "2 : 1".to_string(),
            left: Some(50),
            right: Some(10),
            expected_left: Some(20),
            expected_right: Some(25),
            direction: Direction::HaveToWant,
            recommendation: Recommendation::Value(25),
            confidence: 100,
            status: "OCR updated.".to_string(),
            stale: false,
            raw_text: String::new(),
        }
    }

    #[test]
    fn renders_values_and_recommendation() {
        let text = render_snapshot(&snapshot());
        assert!(text.starts_with("[#3] Ratio 2 : 1\n"), "{text}");
        assert!(text.contains("Recommended I want: 25"), "{text}");
        assert!(text.contains("Confidence 100% | OCR updated."), "{text}");
        assert_eq!(text.lines().count(), 5);
    }

    #[test]
    fn missing_values_render_as_dashes() {
        let snapshot = Snapshot {
            left: None,
            expected_right: None,
            recommendation: Recommendation::InputNotReady,
            direction: Direction::HaveToWant,
            stale: true,
            ..snapshot()
        };
        let text = render_snapshot(&snapshot);
        assert!(text.contains("(stale)"));
        assert!(text.contains("Recommended I want: -- (input not ready)"), "{text}");
        let left_line = text.lines().nth(1).unwrap();
        assert!(left_line.contains("I have:"));
        assert!(left_line.contains("--"));
    }
}
