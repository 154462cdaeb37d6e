use std::io::{self, BufRead, BufReader, Read};
use std::thread;

use tokio::sync::mpsc;

/// Reads stdin line by line on a dedicated thread.
///
/// A blocking read cannot be cancelled, so it is kept off the runtime; the
/// thread is simply abandoned at exit. The channel closes at end of input.
pub fn spawn_stdin_reader() -> io::Result<mpsc::UnboundedReceiver<String>> {
    spawn_line_reader(io::stdin())
}

pub fn spawn_line_reader<R: Read + Send + 'static>(
    reader: R,
) -> io::Result<mpsc::UnboundedReceiver<String>> {
    let (tx, rx) = mpsc::unbounded_channel();
    thread::Builder::new()
        .name(String::from("input-reader"))
        .spawn(move || forward_lines(BufReader::new(reader), &tx))?;
    Ok(rx)
}

/// Forwards each line of `reader` without its line ending.
///
/// Bytes that are not valid UTF-8 are replaced rather than ending the input.
pub fn forward_lines<R: BufRead>(mut reader: R, tx: &mpsc::UnboundedSender<String>) {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                    if buf.last() == Some(&b'\r') {
                        buf.pop();
                    }
                }
                let line = String::from_utf8_lossy(&buf).into_owned();
                if tx.send(line).is_err() {
                    break;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => {
                log::warn!("Stopped reading input: {e}");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use pretty_assertions::assert_eq;

    use super::*;

    fn collect(input: &[u8]) -> Vec<String> {
        let (tx, mut rx) = mpsc::unbounded_channel();

        forward_lines(Cursor::new(input.to_vec()), &tx);
        drop(tx);

        let mut lines = Vec::new();
        while let Ok(line) = rx.try_recv() {
            lines.push(line);
        }
        lines
    }

    #[test]
    fn test_forward_lines_strips_line_endings() {
        assert_eq!(
            collect(b"one\r\ntwo\n\nthree"),
            vec!["one", "two", "", "three"]
        );
    }

    #[test]
    fn test_forward_lines_stops_when_receiver_dropped() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);

        forward_lines(Cursor::new("ignored\n"), &tx);

        assert!(tx.is_closed());
    }

    #[test]
    fn test_forward_lines_replaces_invalid_utf8_and_keeps_reading() {
        assert_eq!(
            collect(b"caf\xe9\nsecond message\n"),
            vec!["caf\u{fffd}", "second message"]
        );
    }

    #[tokio::test]
    async fn test_line_reader_thread_closes_channel_at_end_of_input() -> io::Result<()> {
        let mut rx = spawn_line_reader(Cursor::new(b"hello\n\xff\nbye".to_vec()))?;

        assert_eq!(rx.recv().await.as_deref(), Some("hello"));
        assert_eq!(rx.recv().await.as_deref(), Some("\u{fffd}"));
        assert_eq!(rx.recv().await.as_deref(), Some("bye"));
        assert_eq!(rx.recv().await, None);
        Ok(())
    }

    #[test]
    fn test_forward_lines_keeps_lone_carriage_return_inside_line() {
        assert_eq!(collect(b"a\rb\n"), vec!["a\rb"]);
    }
}
