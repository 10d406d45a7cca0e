use crate::core::TransferConfig;
use crate::strategy::PoolConfig;
use crate::workload::{
    PairwiseConfig, ProgramConfig, RandomMixConfig, SeededRandom, StressConfig,
    WithdrawalRaceConfig,
};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Run concurrent account workloads with deadlock-free transfers
#[derive(Parser, Debug)]
#[command(name = "concurrent-accounts")]
#[command(about = "Run concurrent account workloads with deadlock-free transfers", long_about = None)]
pub struct CliArgs {
    /// Scenario to run
    #[arg(
        long = "scenario",
        value_name = "SCENARIO",
        default_value = "program",
        help = "Scenario to run: program, mix, concurrency, synchronization, stress, listing or all"
    )]
    pub scenario: ScenarioType,

    /// Task runner used by the workload
    #[arg(
        long = "runner",
        value_name = "RUNNER",
        default_value = "threads",
        help = "Task runner: 'threads' for one thread per task or 'pool' for a bounded worker pool"
    )]
    pub runner: RunnerType,

    /// Seed for random account and operation choices
    #[arg(long = "seed", value_name = "SEED", help = "Seed for random choices (default: OS entropy)")]
    pub seed: Option<u64>,

    #[arg(
        long = "timeout-ms",
        value_name = "MS",
        help = "Transfer timeout in milliseconds (default: 1000)"
    )]
    pub timeout_ms: Option<u64>,

    #[arg(
        long = "backoff-ms",
        value_name = "MS",
        help = "Longest wait between transfer attempts in milliseconds (default: 1)"
    )]
    pub backoff_ms: Option<u64>,

    #[arg(
        long = "max-attempts",
        value_name = "COUNT",
        help = "Transfer attempts before giving up (default: 100000)"
    )]
    pub max_attempts: Option<u32>,

    /// Worker count for the pooled runner
    #[arg(
        long = "workers",
        value_name = "COUNT",
        help = "Maximum concurrent tasks for the pool runner (default: CPU cores)"
    )]
    pub workers: Option<usize>,

    #[arg(long = "accounts", value_name = "COUNT", help = "Number of accounts (mix, program, stress)")]
    pub accounts: Option<usize>,

    #[arg(long = "tasks", value_name = "COUNT", help = "Number of tasks (concurrency, stress)")]
    pub tasks: Option<usize>,

    #[arg(long = "rounds", value_name = "COUNT", help = "Operations per task")]
    pub rounds: Option<usize>,

    #[arg(
        long = "pause-ms",
        value_name = "MS",
        help = "Pause between a task's operations in milliseconds (default: per scenario)"
    )]
    pub pause_ms: Option<u64>,

    /// Audit trail destination
    #[arg(
        long = "audit-file",
        value_name = "PATH",
        help = "Write the audit trail to this file instead of stdout"
    )]
    pub audit_file: Option<PathBuf>,

    #[arg(
        long = "balances-csv",
        value_name = "PATH",
        help = "Write the final balances of the last workload run as CSV"
    )]
    pub balances_csv: Option<PathBuf>,

    #[arg(
        long = "listing-dir",
        value_name = "DIR",
        default_value = ".",
        help = "Directory listed by the listing scenario"
    )]
    pub listing_dir: PathBuf,
}

/// Scenarios the binary can run
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ScenarioType {
    /// Random mix on every account plus a forward transfer chain
    Program,
    /// Random deposits and withdrawals only
    Mix,
    /// Many tasks withdrawing from one account
    Concurrency,
    /// Two opposing transfers between two accounts
    Synchronization,
    /// Many tasks transferring between random accounts
    Stress,
    /// Consume a directory listing through a pipe
    Listing,
    /// Every scenario in turn
    All,
}

impl ScenarioType {
    /// Concrete scenarios `self` expands to, in run order
    pub fn expand(self) -> Vec<ScenarioType> {
        match self {
            ScenarioType::All => vec![
                ScenarioType::Program,
                ScenarioType::Concurrency,
                ScenarioType::Synchronization,
                ScenarioType::Stress,
                ScenarioType::Listing,
            ],
            single => vec![single],
        }
    }
}

/// Available task runners
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RunnerType {
    Threads,
    Pool,
}

impl CliArgs {
    fn pause(&self) -> Option<Duration> {
        self.pause_ms.map(Duration::from_millis)
    }

    /// Create a TransferConfig from CLI arguments
    ///
    /// Missing values take the defaults; zero values fall back to the defaults
    /// with a warning.
    pub fn to_transfer_config(&self) -> TransferConfig {
        let default = TransferConfig::default();
        TransferConfig::new(
            self.timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(default.timeout),
            self.backoff_ms
                .map(Duration::from_millis)
                .unwrap_or(default.backoff),
            self.max_attempts.unwrap_or(default.max_attempts),
        )
    }

    /// Create a PoolConfig from CLI arguments
    pub fn to_pool_config(&self) -> PoolConfig {
        match self.workers {
            Some(workers) => PoolConfig::new(workers),
            None => PoolConfig::default(),
        }
    }

    pub fn to_random(&self) -> SeededRandom {
        SeededRandom::new(self.seed)
    }

    pub fn to_mix_config(&self) -> RandomMixConfig {
        let default = RandomMixConfig::default();
        RandomMixConfig::new(
            self.accounts.unwrap_or(default.accounts),
            self.rounds.unwrap_or(default.rounds),
            self.pause().unwrap_or(default.pause),
        )
    }

    pub fn to_program_config(&self) -> ProgramConfig {
        ProgramConfig {
            mix: self.to_mix_config(),
            ..ProgramConfig::default()
        }
        .with_pause(self.pause())
    }

    pub fn to_pairwise_config(&self) -> PairwiseConfig {
        PairwiseConfig::default()
    }

    pub fn to_stress_config(&self) -> StressConfig {
        let default = StressConfig::default();
        StressConfig::new(
            self.accounts.unwrap_or(default.accounts),
            self.tasks.unwrap_or(default.tasks),
            self.rounds.unwrap_or(default.rounds),
            self.pause().unwrap_or(default.pause),
        )
    }

    pub fn to_race_config(&self) -> WithdrawalRaceConfig {
        let default = WithdrawalRaceConfig::default();
        WithdrawalRaceConfig {
            tasks: self.tasks.filter(|t| *t > 0).unwrap_or(default.tasks),
            rounds: self.rounds.filter(|r| *r > 0).unwrap_or(default.rounds),
            pause: self.pause().unwrap_or(default.pause),
            ..default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    // Scenario and runner parsing tests
    #[rstest]
    #[case::default_scenario(&["program"], ScenarioType::Program)]
    #[case::mix(&["program", "--scenario", "mix"], ScenarioType::Mix)]
    #[case::concurrency(&["program", "--scenario", "concurrency"], ScenarioType::Concurrency)]
    #[case::synchronization(&["program", "--scenario", "synchronization"], ScenarioType::Synchronization)]
    #[case::stress(&["program", "--scenario", "stress"], ScenarioType::Stress)]
    #[case::listing(&["program", "--scenario", "listing"], ScenarioType::Listing)]
    #[case::all(&["program", "--scenario", "all"], ScenarioType::All)]
    fn test_scenario_parsing(#[case] args: &[&str], #[case] expected: ScenarioType) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        assert_eq!(parsed.scenario, expected);
    }

    #[rstest]
    #[case::default_runner(&["program"], RunnerType::Threads)]
    #[case::explicit_threads(&["program", "--runner", "threads"], RunnerType::Threads)]
    #[case::explicit_pool(&["program", "--runner", "pool"], RunnerType::Pool)]
    fn test_runner_parsing(#[case] args: &[&str], #[case] expected: RunnerType) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        assert_eq!(parsed.runner, expected);
    }

    #[test]
    fn test_all_expands_to_every_scenario() {
        let expanded = ScenarioType::All.expand();

        assert_eq!(expanded.len(), 5);
        assert!(!expanded.contains(&ScenarioType::All));
        assert_eq!(ScenarioType::Stress.expand(), vec![ScenarioType::Stress]);
    }

    // TransferConfig conversion tests
    #[rstest]
    #[case::all_defaults(&["program"], 1000, 1, 100_000)]
    #[case::custom_timeout(&["program", "--timeout-ms", "250"], 250, 1, 100_000)]
    #[case::all_custom(
        &["program", "--timeout-ms", "50", "--backoff-ms", "5", "--max-attempts", "7"],
        50,
        5,
        7
    )]
    #[case::zero_values_fall_back(
        &["program", "--timeout-ms", "0", "--backoff-ms", "0", "--max-attempts", "0"],
        1000,
        1,
        100_000
    )]
    fn test_transfer_config_conversion(
        #[case] args: &[&str],
        #[case] timeout_ms: u64,
        #[case] backoff_ms: u64,
        #[case] max_attempts: u32,
    ) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        let config = parsed.to_transfer_config();

        assert_eq!(config.timeout, Duration::from_millis(timeout_ms));
        assert_eq!(config.backoff, Duration::from_millis(backoff_ms));
        assert_eq!(config.max_attempts, max_attempts);
    }

    #[rstest]
    #[case::default_workers(&["program"], num_cpus::get())]
    #[case::custom_workers(&["program", "--workers", "3"], 3)]
    #[case::zero_workers(&["program", "--workers", "0"], num_cpus::get())]
    fn test_pool_config_conversion(#[case] args: &[&str], #[case] expected: usize) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        assert_eq!(parsed.to_pool_config().workers, expected);
    }

    #[test]
    fn test_workload_overrides() {
        let parsed = CliArgs::try_parse_from([
            "program", "--accounts", "4", "--tasks", "8", "--rounds", "2", "--pause-ms", "0",
        ])
        .unwrap();

        let stress = parsed.to_stress_config();
        assert_eq!((stress.accounts, stress.tasks, stress.rounds), (4, 8, 2));
        assert_eq!(stress.pause, Duration::ZERO);

        let program = parsed.to_program_config();
        assert_eq!(program.mix.accounts, 4);
        assert_eq!(program.mix.rounds, 2);
        assert_eq!(program.transfer_pause, Duration::ZERO);

        let race = parsed.to_race_config();
        assert_eq!((race.tasks, race.rounds), (8, 2));
    }

    #[test]
    fn test_scenario_defaults_keep_their_pauses() {
        let parsed = CliArgs::try_parse_from(["program"]).unwrap();

        assert_eq!(parsed.to_mix_config().pause, Duration::from_millis(100));
        assert_eq!(parsed.to_program_config().transfer_pause, Duration::from_millis(50));
        assert_eq!(parsed.to_stress_config().pause, Duration::from_millis(10));
        assert_eq!(parsed.to_random().seed(), None);
    }

    #[test]
    fn test_paths() {
        let parsed = CliArgs::try_parse_from([
            "program",
            "--audit-file",
            "audit.log",
            "--balances-csv",
            "out.csv",
            "--listing-dir",
            "/tmp",
        ])
        .unwrap();

        assert_eq!(parsed.audit_file, Some(PathBuf::from("audit.log")));
        assert_eq!(parsed.balances_csv, Some(PathBuf::from("out.csv")));
        assert_eq!(parsed.listing_dir, PathBuf::from("/tmp"));
    }

    // Error handling tests
    #[rstest]
    #[case::invalid_scenario(&["program", "--scenario", "invalid"])]
    #[case::invalid_runner(&["program", "--runner", "fibers"])]
    #[case::negative_timeout(&["program", "--timeout-ms", "-1"])]
    #[case::unexpected_positional(&["program", "input.csv"])]
    fn test_parsing_errors(#[case] args: &[&str]) {
        let result = CliArgs::try_parse_from(args);
        assert!(result.is_err());
    }
}
