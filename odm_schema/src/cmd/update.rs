use crate::cmd::{CommandOutcome, Operation, UnsupportedOperationError};
use anyhow::{Context, Result};
use clap::Args;
use odm_schema_libs::{DocumentClassMap, SchemaManager, SchemaManagerError, SolrSchemaManager};
use std::{env, io, process::ExitCode};
use thiserror::Error;

const COMMAND: &str = "update";

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Document class to process (default: all classes)
    #[arg(short, long, num_args = 0..=1)]
    class: Option<Option<String>>,
    /// Timeout (ms) for acknowledged index creation
    #[arg(short, long, num_args = 0..=1)]
    timeout: Option<Option<String>>,
}

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error(transparent)]
    Operation(#[from] SchemaManagerError),
    #[error(transparent)]
    Unsupported(#[from] UnsupportedOperationError),
}

/// Coerce the `--timeout` flag into milliseconds the way a loose numeric cast does.
///
/// Leading whitespace is skipped and the longest numeric prefix is taken: an optional sign,
/// digits, an optional fraction and an optional exponent, so `1.5e3` gives 1500. A fraction or
/// exponent is truncated toward zero. Input without a numeric prefix, or a negative value, yields
/// 0. Values too large for `u64` saturate.
fn coerce_timeout(raw: &str) -> u64 {
    let trimmed =
        raw.trim_start_matches(|c: char| matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c'));
    let bytes = trimmed.as_bytes();
    let digits_end = |from: usize| {
        from + bytes[from..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let sign_len = match bytes.first() {
        Some(b'-') | Some(b'+') => 1,
        _ => 0,
    };
    let mut end = digits_end(sign_len);
    let mut mantissa_len = end - sign_len;
    let mut is_float = false;

    if bytes.get(end) == Some(&b'.') {
        let fraction_end = digits_end(end + 1);
        if mantissa_len > 0 || fraction_end > end + 1 {
            mantissa_len += fraction_end - end - 1;
            end = fraction_end;
            is_float = true;
        }
    }
    if mantissa_len == 0 {
        return 0;
    }

    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exponent = end + 1;
        if matches!(bytes.get(exponent), Some(b'-') | Some(b'+')) {
            exponent += 1;
        }
        let exponent_end = digits_end(exponent);
        if exponent_end > exponent {
            end = exponent_end;
            is_float = true;
        }
    }

    let numeric = &trimmed[..end];
    if numeric.starts_with('-') {
        return 0;
    }
    if is_float {
        // `as` truncates toward zero and saturates.
        return numeric.parse::<f64>().map(|value| value as u64).unwrap_or(0);
    }
    numeric
        .trim_start_matches('+')
        .parse::<u64>()
        .unwrap_or(u64::MAX)
}

/// Whether `raw` says something other than the `coerced` number of milliseconds.
fn is_lossy_timeout(raw: &str, coerced: u64) -> bool {
    raw.trim() != coerced.to_string()
}

pub struct UpdateCommand {
    class: Option<String>,
    timeout: Option<u64>,
}

impl UpdateCommand {
    pub fn new(args: UpdateArgs) -> Self {
        // A bare `--class` or `--timeout` counts as not given.
        let timeout = args.timeout.flatten().map(|raw| {
            let timeout = coerce_timeout(&raw);
            if is_lossy_timeout(&raw, timeout) {
                tracing::warn!(
                    "timeout `{}` is not a plain number of milliseconds, {} ms will be used",
                    raw,
                    timeout
                );
            }
            timeout
        });

        UpdateCommand {
            class: args.class.flatten(),
            timeout,
        }
    }

    fn operation(&self) -> Operation<'_> {
        match self.class.as_deref() {
            Some(class) if !class.is_empty() => Operation::DocumentIndex(class),
            _ => Operation::Index,
        }
    }

    pub async fn process<M: SchemaManager + ?Sized>(
        &self,
        sm: &M,
        operation: Operation<'_>,
    ) -> Result<(), UpdateError> {
        match operation {
            Operation::DocumentIndex(class) => {
                sm.update_document_indexes(class, self.timeout).await?
            }
            Operation::Index => sm.update_indexes(self.timeout).await?,
            Operation::DocumentCollection(_)
            | Operation::Collection
            | Operation::DocumentDb(_)
            | Operation::Db => {
                return Err(UnsupportedOperationError::new(COMMAND, operation).into());
            }
        }
        Ok(())
    }

    /// Run the update against `sm` and describe how it went.
    ///
    /// Failures of the schema manager become `CommandOutcome::Failure`. An unsupported operation
    /// is returned as an error since no user input can lead to it.
    pub async fn execute<M: SchemaManager + ?Sized>(
        &self,
        sm: &M,
    ) -> Result<CommandOutcome, UnsupportedOperationError> {
        let operation = self.operation();
        match self.process(sm, operation).await {
            Ok(()) => {
                let message = match operation {
                    Operation::DocumentIndex(class) => format!("Updated index(es) for {}", class),
                    _ => String::from("Updated indexes for all classes"),
                };
                Ok(CommandOutcome::Success(message))
            }
            Err(UpdateError::Operation(e)) => {
                tracing::error!("failed to update {}: {:?}", operation, e);
                Ok(CommandOutcome::Failure(e.to_string()))
            }
            Err(UpdateError::Unsupported(e)) => Err(e),
        }
    }
}

pub async fn run(args: UpdateArgs) -> Result<ExitCode> {
    let solr_host = env::var("SOLR_HOST").unwrap_or_else(|_| {
        tracing::info!("SOLR_HOST environment variable is not set. Default value `http://localhost:8983` will be used.");
        String::from("http://localhost:8983")
    });

    let classes = env::var("ODM_DOCUMENT_CLASSES").with_context(|| {
        let message = "ODM_DOCUMENT_CLASSES must be configured.";
        tracing::error!(message);
        message
    })?;
    let mapping = DocumentClassMap::parse(&classes).with_context(|| {
        let message = "Failed to parse ODM_DOCUMENT_CLASSES.";
        tracing::error!(message);
        message
    })?;

    let sm = SolrSchemaManager::connect(&mapping, &solr_host).with_context(|| {
        let message = "Failed to create Solr core clients";
        tracing::error!(message);
        message
    })?;

    let outcome = UpdateCommand::new(args).execute(&sm).await?;
    let code = outcome.conclude(&mut io::stdout().lock())?;

    Ok(ExitCode::from(code))
}

#[cfg(test)]
mod test {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Debug, PartialEq, Eq)]
    enum Call {
        DocumentIndexes(String, Option<u64>),
        Indexes(Option<u64>),
    }

    #[derive(Default)]
    struct RecordingSchemaManager {
        calls: Mutex<Vec<Call>>,
        error: Option<&'static str>,
    }

    impl RecordingSchemaManager {
        fn failing(message: &'static str) -> Self {
            RecordingSchemaManager {
                calls: Mutex::default(),
                error: Some(message),
            }
        }

        fn result(&self) -> odm_schema_libs::schema::manager::Result<()> {
            match self.error {
                Some(message) => Err(SchemaManagerError::UnexpectedError(String::from(message))),
                None => Ok(()),
            }
        }

        fn calls(&self) -> Vec<Call> {
            std::mem::take(&mut *self.calls.lock().unwrap())
        }
    }

    #[async_trait]
    impl SchemaManager for RecordingSchemaManager {
        async fn update_document_indexes(
            &self,
            document_class: &str,
            timeout_ms: Option<u64>,
        ) -> odm_schema_libs::schema::manager::Result<()> {
            self.calls.lock().unwrap().push(Call::DocumentIndexes(
                String::from(document_class),
                timeout_ms,
            ));
            self.result()
        }

        async fn update_indexes(
            &self,
            timeout_ms: Option<u64>,
        ) -> odm_schema_libs::schema::manager::Result<()> {
            self.calls.lock().unwrap().push(Call::Indexes(timeout_ms));
            self.result()
        }
    }

    fn command(class: Option<&str>, timeout: Option<&str>) -> UpdateCommand {
        UpdateCommand::new(UpdateArgs {
            class: class.map(|class| Some(String::from(class))),
            timeout: timeout.map(|timeout| Some(String::from(timeout))),
        })
    }

    #[tokio::test]
    async fn update_indexes_of_one_class() {
        let sm = RecordingSchemaManager::default();

        let outcome = command(Some(r"Acme\Document\User"), None)
            .execute(&sm)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            CommandOutcome::Success(String::from(r"Updated index(es) for Acme\Document\User"))
        );
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(
            sm.calls(),
            vec![Call::DocumentIndexes(String::from(r"Acme\Document\User"), None)]
        );
    }

    #[tokio::test]
    async fn update_indexes_of_all_classes() {
        let sm = RecordingSchemaManager::default();

        let outcome = command(None, Some("500")).execute(&sm).await.unwrap();

        assert_eq!(
            outcome,
            CommandOutcome::Success(String::from("Updated indexes for all classes"))
        );
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(sm.calls(), vec![Call::Indexes(Some(500))]);
    }

    #[tokio::test]
    async fn empty_class_means_all_classes() {
        let sm = RecordingSchemaManager::default();

        command(Some(""), None).execute(&sm).await.unwrap();

        assert_eq!(sm.calls(), vec![Call::Indexes(None)]);
    }

    #[tokio::test]
    async fn bare_flags_mean_all_classes_without_timeout() {
        let sm = RecordingSchemaManager::default();
        let command = UpdateCommand::new(UpdateArgs {
            class: Some(None),
            timeout: Some(None),
        });

        let outcome = command.execute(&sm).await.unwrap();

        assert_eq!(
            outcome,
            CommandOutcome::Success(String::from("Updated indexes for all classes"))
        );
        assert_eq!(sm.calls(), vec![Call::Indexes(None)]);
    }

    #[tokio::test]
    async fn exponent_timeout_is_expanded() {
        let sm = RecordingSchemaManager::default();

        command(None, Some("1.5e3")).execute(&sm).await.unwrap();

        assert_eq!(sm.calls(), vec![Call::Indexes(Some(1500))]);
    }

    #[tokio::test]
    async fn non_numeric_timeout_is_zero() {
        let sm = RecordingSchemaManager::default();

        let outcome = command(None, Some("abc")).execute(&sm).await.unwrap();

        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(sm.calls(), vec![Call::Indexes(Some(0))]);
    }

    #[tokio::test]
    async fn schema_manager_failure() {
        let sm = RecordingSchemaManager::failing("connection refused");

        let outcome = command(Some("User"), Some("100"))
            .execute(&sm)
            .await
            .unwrap();

        let mut out = Vec::new();
        outcome.report(&mut out).unwrap();
        let line = String::from_utf8(out).unwrap();

        assert!(line.contains("connection refused"));
        assert_eq!(line.lines().count(), 1);
        assert_eq!(outcome.exit_code(), 255);
        assert_eq!(
            sm.calls(),
            vec![Call::DocumentIndexes(String::from("User"), Some(100))]
        );
    }

    #[tokio::test]
    async fn unsupported_operations_never_reach_schema_manager() {
        let sm = RecordingSchemaManager::default();
        let command = command(None, None);

        let cases = [
            (
                Operation::DocumentCollection("User"),
                "cannot update a document collection",
            ),
            (Operation::Collection, "cannot update a collection"),
            (
                Operation::DocumentDb("User"),
                "cannot update a document database",
            ),
            (Operation::Db, "cannot update a database"),
        ];
        for (operation, expected) in cases {
            let result = command.process(&sm, operation).await;

            match result {
                Err(UpdateError::Unsupported(e)) => assert_eq!(e.to_string(), expected),
                other => panic!("unexpected result for {}: {:?}", operation, other),
            }
        }
        assert!(sm.calls().is_empty());
    }

    #[tokio::test]
    async fn works_through_trait_object() {
        let sm = RecordingSchemaManager::default();
        let dyn_sm: &dyn SchemaManager = &sm;

        command(Some("User"), None).execute(dyn_sm).await.unwrap();

        assert_eq!(sm.calls(), vec![Call::DocumentIndexes(String::from("User"), None)]);
    }

    #[test]
    fn coerce_timeout_like_integer_cast() {
        assert_eq!(coerce_timeout("500"), 500);
        assert_eq!(coerce_timeout("  42"), 42);
        assert_eq!(coerce_timeout("+7"), 7);
        assert_eq!(coerce_timeout("1500ms"), 1500);
        assert_eq!(coerce_timeout("abc"), 0);
        assert_eq!(coerce_timeout(""), 0);
        assert_eq!(coerce_timeout("-250"), 0);
        assert_eq!(coerce_timeout("99999999999999999999999"), u64::MAX);
    }

    #[test]
    fn lossy_timeouts_are_detected() {
        assert!(!is_lossy_timeout("500", coerce_timeout("500")));
        assert!(!is_lossy_timeout(" 500 ", coerce_timeout(" 500 ")));
        assert!(is_lossy_timeout("abc", coerce_timeout("abc")));
        assert!(is_lossy_timeout("1.5e3", coerce_timeout("1.5e3")));
        assert!(is_lossy_timeout("-250", coerce_timeout("-250")));
        assert!(is_lossy_timeout("1500ms", coerce_timeout("1500ms")));
    }

    #[test]
    fn coerce_timeout_with_fraction_or_exponent() {
        assert_eq!(coerce_timeout("1e3"), 1000);
        assert_eq!(coerce_timeout("1.5e3"), 1500);
        assert_eq!(coerce_timeout("2E+2ms"), 200);
        assert_eq!(coerce_timeout("1.9"), 1);
        assert_eq!(coerce_timeout("1."), 1);
        assert_eq!(coerce_timeout(".5"), 0);
        assert_eq!(coerce_timeout("5e"), 5);
        assert_eq!(coerce_timeout("5e-1"), 0);
        assert_eq!(coerce_timeout("-1e3"), 0);
        assert_eq!(coerce_timeout("."), 0);
        assert_eq!(coerce_timeout("1e400"), u64::MAX);
    }
}
