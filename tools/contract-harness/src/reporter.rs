//! PASS/FAIL lines and the final summary.

use crate::{fixture::Fixture, runner::RunResult};

#[derive(Default)]
pub struct Reporter {
    passed: usize,
    failed: usize,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, fixture: &Fixture, result: &RunResult) {
        let label = format!("[{}/{}] {}", fixture.service, fixture.id, fixture.description);
        if result.passed() {
            self.passed += 1;
            println!("PASS  {label} ({} ms)", result.elapsed.as_millis());
            return;
        }

        self.failed += 1;
        println!("FAIL  {label}");
        if let Some(err) = &result.error {
            println!("        error: {err}");
            return;
        }
        if let Some(actual) = result.actual_status.filter(|s| *s != result.expected_status) {
            println!(
                "        {} {}: expected {}, got {actual}",
                fixture.request.method, fixture.request.path, result.expected_status
            );
        }
        for mismatch in &result.header_mismatches {
            println!("        header: {mismatch}");
        }
        if let Some(mismatch) = &result.body_mismatch {
            println!("        {mismatch}");
        }
        if let Some(id) = &result.request_id {
            println!("        x-request-id: {id}");
        }
    }

    pub fn print_summary(&self) {
        println!();
        println!("Results: {} passed, {} failed", self.passed, self.failed);
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}
