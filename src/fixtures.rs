#[cfg(test)]
pub mod test {
    use std::fs;
    use std::io;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use tempfile::TempDir;

    use crate::merged::MergedConfig;
    use crate::parser::{ConfigParser, TomlParser};

    /// Write `(relative path, content)` pairs under a fresh temp dir.
    pub fn layout(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (rel, content) in files {
            let path = dir.path().join(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, content).unwrap();
        }
        dir
    }

    // -- Parser instrumentation ------------------------------------------------

    /// Delegates to [`TomlParser`] and counts how often it was asked to parse.
    #[derive(Debug, Clone, Default)]
    pub struct CountingParser {
        calls: Arc<AtomicUsize>,
    }

    impl CountingParser {
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ConfigParser for CountingParser {
        fn parse_files(&self, paths: &[PathBuf], target: &mut MergedConfig) -> Vec<PathBuf> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            TomlParser.parse_files(paths, target)
        }
    }

    // -- Log capture -------------------------------------------------------------

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl io::Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Run `f` with a thread-local subscriber and return everything it logged.
    pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
        let buf = SharedBuf::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();

        let result = tracing::subscriber::with_default(subscriber, f);
        let logs = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        (result, logs)
    }

    /// Lines of `logs` emitted at `level` ("ERROR", "WARN", ...).
    pub fn lines_at<'a>(logs: &'a str, level: &str) -> Vec<&'a str> {
        logs.lines()
            .filter(|line| line.split_whitespace().any(|word| word == level))
            .collect()
    }

    #[test]
    fn capture_logs_sees_levels() {
        let ((), logs) = capture_logs(|| {
            tracing::warn!("careful");
            tracing::trace!("quiet");
        });
        assert_eq!(lines_at(&logs, "WARN").len(), 1);
        assert!(lines_at(&logs, "TRACE")[0].contains("quiet"));
    }
}
