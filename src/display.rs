// src/display.rs
//
// Console presentation for probe messages. Runs on the presentation task,
// on the receiving end of the source channel.

use std::io::Write;
use tokio::sync::mpsc;

use crate::io::{ProbeMessage, SessionStats};

/// Renders probe messages as text lines or JSON lines.
pub struct ConsoleDisplay<W: Write> {
    out: W,
    json: bool,
}

impl ConsoleDisplay<std::io::Stdout> {
    pub fn stdout(json: bool) -> Self {
        Self::new(std::io::stdout(), json)
    }
}

impl<W: Write> ConsoleDisplay<W> {
    pub fn new(out: W, json: bool) -> Self {
        Self { out, json }
    }

    pub fn render(&mut self, msg: &ProbeMessage) -> Result<(), String> {
        let line = if self.json {
            serde_json::to_string(msg).map_err(|e| format!("Failed to encode message: {}", e))?
        } else {
            format_message(msg)
        };
        writeln!(self.out, "{}", line)
            .and_then(|_| self.out.flush())
            .map_err(|e| format!("Failed to write output: {}", e))
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Value line, e.g. `Values: 10, 20, 255, 0, `
pub fn format_values(values: &[i32]) -> String {
    let mut line = String::from("Values: ");
    for value in values {
        line.push_str(&value.to_string());
        line.push_str(", ");
    }
    line
}

pub fn format_stats(stats: &SessionStats) -> String {
    format!(
        "{} bytes, {} frames ({} samples, {} diagnostics), {} parse failures",
        stats.bytes, stats.frames, stats.samples, stats.diagnostics, stats.parse_failures
    )
}

fn format_message(msg: &ProbeMessage) -> String {
    match msg {
        ProbeMessage::Connected { source } => format!("Connected: {}", source),
        ProbeMessage::Diagnostic { text } => format!("Debug: {}", text),
        ProbeMessage::Values { values } => format_values(values),
        ProbeMessage::Ended { reason, stats } => {
            format!("Ended ({}): {}", reason, format_stats(stats))
        }
        ProbeMessage::Error { message } => format!("Error: {}", message),
    }
}

/// Render messages until the source reports `Ended` or the channel closes.
/// Returns the end reason and final stats, or `None` if the source vanished.
pub async fn present<W: Write>(
    rx: &mut mpsc::UnboundedReceiver<ProbeMessage>,
    display: &mut ConsoleDisplay<W>,
) -> Result<Option<(String, SessionStats)>, String> {
    while let Some(msg) = rx.recv().await {
        display.render(&msg)?;
        if let ProbeMessage::Ended { reason, stats } = msg {
            return Ok(Some((reason, stats)));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(display: ConsoleDisplay<Vec<u8>>) -> String {
        String::from_utf8(display.into_inner()).unwrap()
    }

    #[test]
    fn test_format_values() {
        assert_eq!(format_values(&[10, 20, 255, 0]), "Values: 10, 20, 255, 0, ");
        assert_eq!(format_values(&[]), "Values: ");
    }

    #[test]
    fn test_render_text() {
        let mut display = ConsoleDisplay::new(Vec::new(), false);
        display
            .render(&ProbeMessage::Diagnostic {
                text: "booting up".to_string(),
            })
            .unwrap();
        display
            .render(&ProbeMessage::Values {
                values: vec![1, 2],
            })
            .unwrap();

        assert_eq!(rendered(display), "Debug: booting up\nValues: 1, 2, \n");
    }

    #[test]
    fn test_render_json_lines() {
        let mut display = ConsoleDisplay::new(Vec::new(), true);
        display
            .render(&ProbeMessage::Diagnostic {
                text: "ok".to_string(),
            })
            .unwrap();

        assert_eq!(rendered(display), "{\"type\":\"diagnostic\",\"text\":\"ok\"}\n");
    }

    #[tokio::test]
    async fn test_present_stops_at_ended() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let stats = SessionStats {
            bytes: 11,
            frames: 1,
            samples: 1,
            ..SessionStats::default()
        };
        tx.send(ProbeMessage::Values { values: vec![3] }).unwrap();
        tx.send(ProbeMessage::Ended {
            reason: "complete".to_string(),
            stats,
        })
        .unwrap();
        tx.send(ProbeMessage::Values { values: vec![4] }).unwrap();

        let mut display = ConsoleDisplay::new(Vec::new(), false);
        let ended = present(&mut rx, &mut display).await.unwrap();

        assert_eq!(ended, Some(("complete".to_string(), stats)));
        assert_eq!(
            rendered(display),
            "Values: 3, \nEnded (complete): 11 bytes, 1 frames (1 samples, 0 diagnostics), 0 parse failures\n"
        );
    }

    #[tokio::test]
    async fn test_present_channel_closed() {
        let (tx, mut rx) = mpsc::unbounded_channel::<ProbeMessage>();
        drop(tx);

        let mut display = ConsoleDisplay::new(Vec::new(), false);
        assert_eq!(present(&mut rx, &mut display).await.unwrap(), None);
    }
}
