use flaky_sim::navigator::{Navigator, OfflineNavigator};
use flaky_sim::report;
use flaky_sim::{FlakySuite, NavigationError, SuiteConfig};
use flaky_test_utils::ScratchArtifacts;
use async_trait::async_trait;

/// Navigator that refuses one url
struct RefusingNavigator {
    refused: &'static str,
}

#[async_trait]
impl Navigator for RefusingNavigator {
    async fn navigate(&self, url: &str) -> Result<(), NavigationError> {
        if url == self.refused {
            return Err(NavigationError {
                url: url.to_string(),
                reason: "connection refused".to_string(),
            });
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_run_then_report() {
    let scratch = ScratchArtifacts::new(&["https://elverys.ie", "https://playwright.dev"]);
    let config: SuiteConfig = scratch.config.clone().with_repetitions(10);

    let mut suite = FlakySuite::new(config.clone(), OfflineNavigator).unwrap();
    let summary = suite.run().await.unwrap();
    assert_eq!(summary.executed, 20);

    let report = report::generate(&config).unwrap();
    assert_eq!(report.records, 20);
    let failed: u64 = report.counts.values().map(|c| c.failed).sum();
    assert_eq!(failed, summary.failures.len() as u64);
    assert_eq!(report.counts["https://elverys.ie"].total(), 10);
}

#[tokio::test]
async fn test_runs_accumulate_in_log() {
    let scratch = ScratchArtifacts::new(&["https://rte.ie"]);
    for run in 1..=3u64 {
        let mut suite = FlakySuite::new(scratch.config.clone(), OfflineNavigator).unwrap();
        suite.run().await.unwrap();
        assert_eq!(suite.log().len().unwrap() as u64, run * 5);
    }
}

#[tokio::test]
async fn test_navigation_failure_writes_no_record() {
    let scratch = ScratchArtifacts::new(&["https://ok.example", "https://down.example"]);
    let navigator = RefusingNavigator {
        refused: "https://down.example",
    };

    let mut suite = FlakySuite::new(scratch.config.clone(), navigator).unwrap();
    let summary = suite.run().await.unwrap();

    assert_eq!(summary.executed, 10);
    assert_eq!(summary.navigation_failures(), 5);
    assert!(summary
        .failures
        .iter()
        .filter(|f| !f.error.is_simulated())
        .all(|f| f.url == "https://down.example"));

    let records = suite.log().records().unwrap();
    assert_eq!(records.len(), 5);
    assert!(records.iter().all(|r| r.url == "https://ok.example"));
}
