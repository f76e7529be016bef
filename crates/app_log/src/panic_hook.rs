//! Panic hook for crash reporting

use backtrace::Backtrace;
use chrono::Local;
use std::any::Any;
use std::panic::PanicHookInfo;

/// Initialize the panic hook for crash reporting
pub fn init_panic_hook() {
    std::panic::set_hook(Box::new(panic_handler));
    tracing::debug!("Panic hook initialized");
}

fn payload_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<unknown>")
}

fn crash_report(timestamp: &str, thread: &str, location: &str, message: &str, backtrace: &str) -> String {
    format!(
        "=== CRITICAL PANIC ===\n\
         Timestamp: {}\n\
         Thread: {}\n\
         Location: {}\n\
         Payload: {}\n\n\
         Stack Trace:\n{}",
        timestamp, thread, location, message, backtrace
    )
}

fn panic_handler(info: &PanicHookInfo) {
    let backtrace = Backtrace::new();
    let thread = std::thread::current();
    let location = info
        .location()
        .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
        .unwrap_or_else(|| "<unknown>".to_string());

    let report = crash_report(
        &Local::now().to_rfc3339(),
        thread.name().unwrap_or("<unnamed>"),
        &location,
        payload_message(info.payload()),
        &format!("{:?}", backtrace),
    );

    // 1. stderr is always available
    eprintln!("{}", report);

    // 2. tracing, if the writer thread is still alive
    tracing::error!("{}", report);

    // 3. Crash dump file
    let dump_filename = format!("honeycomb_crash_{}.txt", Local::now().format("%Y%m%d_%H%M%S"));
    let dump_path = std::env::temp_dir().join(dump_filename);

    match std::fs::write(&dump_path, &report) {
        Ok(()) => eprintln!("Crash report written to {}", dump_path.display()),
        Err(e) => eprintln!("Failed to write crash dump: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_message() {
        let static_str: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(payload_message(static_str.as_ref()), "boom");

        let owned: Box<dyn Any + Send> = Box::new(String::from("owned boom"));
        assert_eq!(payload_message(owned.as_ref()), "owned boom");

        let other: Box<dyn Any + Send> = Box::new(42_u32);
        assert_eq!(payload_message(other.as_ref()), "<unknown>");
    }

    #[test]
    fn test_crash_report_layout() {
        let report = crash_report("2026-10-19T10:00:00+00:00", "main", "src/main.rs:1:1", "boom", "bt");
        assert!(report.starts_with("=== CRITICAL PANIC ==="));
        assert!(report.contains("Thread: main"));
        assert!(report.contains("Payload: boom"));
        assert!(report.ends_with("Stack Trace:\nbt"));
    }
}
