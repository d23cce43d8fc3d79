use std::io;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing_subscriber::fmt::MakeWriter;
use taskwork::{Config, Pool, Recovered, TaskError};

/// In-memory log sink.
#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Capture {
    type Writer = Capture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn capture_logs() -> (Capture, tracing::subscriber::DefaultGuard) {
    let capture = Capture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(capture.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (capture, guard)
}

#[test]
fn test_default_panic_handler_logs_message() {
    let (capture, _guard) = capture_logs();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime");

    runtime.block_on(async {
        let pool = Pool::new(Config::default());
        pool.go(async { panic!("test panic") }).await;
        pool.wait().await;
    });

    let logs = capture.text();
    assert!(logs.contains("test panic"), "logs: {logs}");
    assert!(logs.contains("ERROR"));
}

#[test]
fn test_log_error_logs_label() {
    let (capture, _guard) = capture_logs();
    taskwork::log_error(TaskError::fail("disk full"));
    taskwork::log_panic(Recovered::new(0, Box::new("direct")));

    let logs = capture.text();
    assert!(logs.contains("disk full"));
    assert!(logs.contains("task_failed"));
    assert!(logs.contains("direct"));
}
