use std::sync::Arc;

use async_trait::async_trait;
use csv::{Reader, ReaderBuilder, StringRecord};

use crate::domain::logger::Logger;
use crate::domain::product::errors::ProductError;
use crate::domain::product::import::{
    DEFAULT_BATCH_SIZE, DEFAULT_ERROR_PREVIEW, ImportOutcome, RowError, stage_row,
};
use crate::domain::product::model::NewProduct;
use crate::domain::product::repository::ProductRepository;
use crate::domain::product::use_cases::import_csv::{
    ImportProductsCsvParams, ImportProductsCsvUseCase,
};

const UTF8_BOM: char = '\u{feff}';

/// A slice of the payload read by its own reader. Lines are numbered from
/// `first_line` so messages always point at the physical line in the upload.
struct Segment<'a> {
    reader: Reader<&'a [u8]>,
    text: &'a str,
    first_line: u64,
}

impl<'a> Segment<'a> {
    fn new(text: &'a str, first_line: u64, has_headers: bool) -> Self {
        let reader = ReaderBuilder::new()
            .has_headers(has_headers)
            .flexible(true)
            .from_reader(text.as_bytes());
        Self {
            reader,
            text,
            first_line,
        }
    }

    fn absolute_line(&self, line: u64) -> u64 {
        self.first_line + line.saturating_sub(1)
    }
}

/// Quotes may open a field and close it only right before a delimiter or the
/// end of the record. A quote inside an unquoted field is literal.
fn is_well_quoted(record: &str) -> bool {
    let mut chars = record.chars().peekable();
    let mut at_field_start = true;
    let mut in_quotes = false;

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                } else {
                    in_quotes = false;
                    if !matches!(chars.peek(), None | Some(',' | '\r' | '\n')) {
                        return false;
                    }
                }
            }
        } else if c == '"' && at_field_start {
            in_quotes = true;
        }
        at_field_start = !in_quotes && c == ',';
    }

    !in_quotes
}

/// A multi-line record with broken quoting has swallowed the rows after its
/// own first line. Returns those lines so they are read as rows of their own.
fn swallowed_lines(raw: &str) -> Option<&str> {
    let body = raw.trim_end_matches(['\r', '\n']);
    let (_, rest) = body.split_once('\n')?;
    (!is_well_quoted(body)).then_some(rest)
}

pub struct ImportProductsCsvUseCaseImpl {
    pub repository: Arc<dyn ProductRepository>,
    pub logger: Arc<dyn Logger>,
    /// Staged records flushed together.
    pub batch_size: usize,
    /// Error messages kept in the outcome.
    pub error_preview: usize,
}

impl ImportProductsCsvUseCaseImpl {
    pub fn new(repository: Arc<dyn ProductRepository>, logger: Arc<dyn Logger>) -> Self {
        Self {
            repository,
            logger,
            batch_size: DEFAULT_BATCH_SIZE,
            error_preview: DEFAULT_ERROR_PREVIEW,
        }
    }

    async fn flush(&self, staged: &mut Vec<NewProduct>) -> Result<(), ProductError> {
        let inserted = self
            .repository
            .insert_batch(staged)
            .await
            .inspect_err(|e| {
                self.logger.error(&format!(
                    "Import aborted, failed to flush {} staged products: {}",
                    staged.len(),
                    e
                ));
            })?;
        self.logger
            .debug(&format!("Flushed {} imported products", inserted));
        staged.clear();
        Ok(())
    }
}

#[async_trait]
impl ImportProductsCsvUseCase for ImportProductsCsvUseCaseImpl {
    async fn execute(
        &self,
        params: ImportProductsCsvParams,
    ) -> Result<ImportOutcome, ProductError> {
        let text = std::str::from_utf8(&params.payload).map_err(|e| {
            self.logger
                .error(&format!("Import payload is not valid UTF-8: {}", e));
            ProductError::ImportUnreadable
        })?;
        let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);

        self.logger
            .info(&format!("Importing products from {} bytes", text.len()));

        // The first record is always the header and is never inspected
        let mut segments = vec![Segment::new(text, 1, true)];
        let mut record = StringRecord::new();

        let batch_size = self.batch_size.max(1);
        let mut staged: Vec<NewProduct> = Vec::with_capacity(batch_size);
        let mut outcome = ImportOutcome::default();

        while let Some(segment) = segments.last_mut() {
            let mut tail = None;
            let row = match segment.reader.read_record(&mut record) {
                Ok(false) => {
                    segments.pop();
                    continue;
                }
                Ok(true) => {
                    let (line, start) = record
                        .position()
                        .map(|p| (p.line(), p.byte() as usize))
                        .unwrap_or((1, 0));
                    let end = segment.reader.position().byte() as usize;
                    let text = segment.text;
                    let raw = text.get(start..end).unwrap_or_default();
                    // Blank lines skipped before the record count toward its line
                    let body = raw.trim_start_matches(['\r', '\n']);
                    let skipped = raw[..raw.len() - body.len()].matches('\n').count() as u64;
                    let line = segment.absolute_line(line + skipped);

                    match swallowed_lines(body) {
                        Some(rest) => {
                            tail = Some(Segment::new(rest, line + 1, false));
                            Err(RowError::InvalidFormat { line })
                        }
                        None => {
                            let fields: Vec<&str> = record.iter().collect();
                            stage_row(line, &fields)
                        }
                    }
                }
                Err(e) => Err(RowError::InvalidFormat {
                    line: segment.absolute_line(e.position().map(|p| p.line()).unwrap_or(1)),
                }),
            };
            if let Some(tail) = tail {
                segments.push(tail);
            }

            match row {
                Ok(product) => {
                    staged.push(product);
                    outcome.record_success();
                    if staged.len() >= batch_size {
                        self.flush(&mut staged).await?;
                    }
                }
                Err(err) => {
                    self.logger.warn(&err.to_string());
                    outcome.record_failure(&err, self.error_preview);
                }
            }
        }

        if !staged.is_empty() {
            self.flush(&mut staged).await?;
        }

        self.logger.info(&format!(
            "Import finished: {} imported, {} failed",
            outcome.success_count, outcome.failure_count
        ));
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::product::export_csv::write_csv;
    use crate::application::product::mocks::{MockProductRepo, mock_logger};
    use crate::domain::errors::RepositoryError;
    use crate::domain::product::model::Product;
    use chrono::Utc;
    use proptest::prelude::*;
    use std::sync::Mutex;

    const HEADER: &str = "Name,Description,Price,Stock Quantity,Created Datetime\n";

    fn use_case(repo: MockProductRepo) -> ImportProductsCsvUseCaseImpl {
        ImportProductsCsvUseCaseImpl::new(Arc::new(repo), mock_logger())
    }

    fn accepting_repo() -> (MockProductRepo, Arc<Mutex<Vec<Vec<NewProduct>>>>) {
        let batches = Arc::new(Mutex::new(Vec::new()));
        let captured = batches.clone();
        let mut repo = MockProductRepo::new();
        repo.expect_insert_batch().returning(move |batch| {
            captured.lock().unwrap().push(batch.to_vec());
            Ok(batch.len() as u64)
        });
        (repo, batches)
    }

    fn payload(rows: &[&str]) -> Vec<u8> {
        let mut text = HEADER.to_string();
        for row in rows {
            text.push_str(row);
            text.push('\n');
        }
        text.into_bytes()
    }

    #[tokio::test]
    async fn should_import_valid_rows_and_report_each_bad_row() {
        let (repo, batches) = accepting_repo();

        let outcome = use_case(repo)
            .execute(ImportProductsCsvParams {
                payload: payload(&[
                    "Mug,Ceramic,9.50,20",
                    "Lamp,Desk lamp,abc,3",
                    "Rug,Wool,120,3.5",
                    "Broken row",
                    "Chair,,45,2",
                    "Stool,Pine,15.5,40,2024-01-01 10:00:00",
                ]),
            })
            .await
            .unwrap();

        assert_eq!(outcome.success_count, 2);
        assert_eq!(outcome.failure_count, 4);
        assert_eq!(
            outcome.errors,
            vec![
                "Row 3: invalid data in row \"Lamp,Desk lamp,abc,3\"".to_string(),
                "Row 4: invalid data in row \"Rug,Wool,120,3.5\"".to_string(),
                "Row 5: invalid row format".to_string(),
                "Row 6: validation failed for row \"Chair,,45,2\" (product.description_blank)"
                    .to_string(),
            ]
        );

        let batches = batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        let names: Vec<&str> = batches[0].iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Mug", "Stool"]);
    }

    #[test]
    fn should_accept_only_rfc4180_quoting() {
        assert!(is_well_quoted("Mug,\"Ceramic\nwhite\",9.5,20"));
        assert!(is_well_quoted("Lamp \"\"Arc\"\",Brass,1,1"));
        assert!(is_well_quoted("\"Lamp \"\"Arc\"\"\",Brass,1,1"));
        assert!(is_well_quoted("TV,32\" screen,100,1"));
        assert!(!is_well_quoted("Mug,\"Ceramic,9.5,20\nLamp,Desk,12,3"));
        assert!(!is_well_quoted("Mug,\"Ceramic,9.5,20\nCup,\"Glass,3,1"));
    }

    #[tokio::test]
    async fn should_read_rows_after_an_unclosed_quote_on_their_own() {
        let (repo, batches) = accepting_repo();

        let outcome = use_case(repo)
            .execute(ImportProductsCsvParams {
                payload: payload(&[
                    "Mug,\"Ceramic,9.5,20",
                    "Lamp,Desk,12,3",
                    "Rug,Wool,5,1",
                    "Stool,Pine,4,2",
                ]),
            })
            .await
            .unwrap();

        assert_eq!(outcome.success_count, 3);
        assert_eq!(outcome.failure_count, 1);
        assert_eq!(outcome.errors, vec!["Row 2: invalid row format".to_string()]);
        let names: Vec<String> = batches.lock().unwrap()[0]
            .iter()
            .map(|p| p.name.clone())
            .collect();
        assert_eq!(names, vec!["Lamp", "Rug", "Stool"]);
    }

    #[tokio::test]
    async fn should_number_rows_after_consecutive_unclosed_quotes() {
        let (repo, _batches) = accepting_repo();

        let outcome = use_case(repo)
            .execute(ImportProductsCsvParams {
                payload: payload(&[
                    "Mug,\"Ceramic,9.5,20",
                    "Cup,\"Glass,3,1",
                    "Lamp,Desk,abc,3",
                    "Rug,Wool,5,1",
                ]),
            })
            .await
            .unwrap();

        assert_eq!(outcome.success_count, 1);
        assert_eq!(
            outcome.errors,
            vec![
                "Row 2: invalid row format".to_string(),
                "Row 3: invalid row format".to_string(),
                "Row 4: invalid data in row \"Lamp,Desk,abc,3\"".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn should_number_rows_by_physical_line_across_blank_lines() {
        let (repo, _batches) = accepting_repo();

        let outcome = use_case(repo)
            .execute(ImportProductsCsvParams {
                payload: payload(&["Mug,Ceramic,9.50,20", "", "", "Lamp,Desk,abc,3"]),
            })
            .await
            .unwrap();

        assert_eq!(outcome.processed(), 2);
        assert_eq!(
            outcome.errors,
            vec!["Row 5: invalid data in row \"Lamp,Desk,abc,3\"".to_string()]
        );
    }

    #[tokio::test]
    async fn should_keep_quoted_line_breaks_inside_one_row() {
        let (repo, batches) = accepting_repo();

        let outcome = use_case(repo)
            .execute(ImportProductsCsvParams {
                payload: payload(&["Mug,\"Ceramic\nwhite\",9.5,20", "Lamp,Desk,12,3"]),
            })
            .await
            .unwrap();

        assert_eq!(outcome.success_count, 2);
        assert_eq!(outcome.failure_count, 0);
        assert_eq!(batches.lock().unwrap()[0][0].description, "Ceramic\nwhite");
    }

    #[tokio::test]
    async fn should_reject_sub_cent_price_without_losing_the_batch() {
        let (repo, batches) = accepting_repo();

        let outcome = use_case(repo)
            .execute(ImportProductsCsvParams {
                payload: payload(&["Mug,Ceramic,9.50,20", "Pin,Tiny,0.004,1", "Lamp,Desk,12,3"]),
            })
            .await
            .unwrap();

        assert_eq!(outcome.success_count, 2);
        assert_eq!(
            outcome.errors,
            vec![
                "Row 3: validation failed for row \"Pin,Tiny,0.004,1\" (product.price_not_positive)"
                    .to_string()
            ]
        );
        let batches = batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert!(batches[0].iter().all(|p| p.price >= 0.01));
    }

    #[tokio::test]
    async fn should_flush_every_hundred_rows_and_once_at_the_end() {
        let batches = Arc::new(Mutex::new(Vec::<Vec<NewProduct>>::new()));
        let captured = batches.clone();
        let mut repo = MockProductRepo::new();
        repo.expect_insert_batch().times(3).returning(move |batch| {
            captured.lock().unwrap().push(batch.to_vec());
            Ok(batch.len() as u64)
        });

        let rows: Vec<String> = (0..250)
            .map(|i| format!("Item {i},Bulk item,{}.99,{i}", i + 1))
            .collect();
        let rows: Vec<&str> = rows.iter().map(String::as_str).collect();

        let outcome = use_case(repo)
            .execute(ImportProductsCsvParams {
                payload: payload(&rows),
            })
            .await
            .unwrap();

        assert_eq!(outcome.success_count, 250);
        assert_eq!(outcome.failure_count, 0);
        let sizes: Vec<usize> = batches.lock().unwrap().iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![100, 100, 50]);
    }

    #[tokio::test]
    async fn should_skip_final_flush_when_nothing_is_staged() {
        let mut repo = MockProductRepo::new();
        repo.expect_insert_batch()
            .times(2)
            .returning(|batch| Ok(batch.len() as u64));

        let rows: Vec<String> = (0..200).map(|i| format!("Item {i},Bulk,1,{i}")).collect();
        let rows: Vec<&str> = rows.iter().map(String::as_str).collect();

        let outcome = use_case(repo)
            .execute(ImportProductsCsvParams {
                payload: payload(&rows),
            })
            .await
            .unwrap();

        assert_eq!(outcome.success_count, 200);
    }

    #[tokio::test]
    async fn should_cap_error_preview_at_five_but_count_every_failure() {
        let mut repo = MockProductRepo::new();
        repo.expect_insert_batch().never();

        let rows: Vec<String> = (0..40).map(|i| format!("Item {i},Bad,free,{i}")).collect();
        let rows: Vec<&str> = rows.iter().map(String::as_str).collect();

        let outcome = use_case(repo)
            .execute(ImportProductsCsvParams {
                payload: payload(&rows),
            })
            .await
            .unwrap();

        assert_eq!(outcome.failure_count, 40);
        assert_eq!(outcome.errors.len(), 5);
        assert!(outcome.errors[0].starts_with("Row 2:"));
    }

    #[tokio::test]
    async fn should_fail_whole_import_when_payload_is_not_utf8() {
        let mut repo = MockProductRepo::new();
        repo.expect_insert_batch().never();

        let result = use_case(repo)
            .execute(ImportProductsCsvParams {
                payload: vec![0x4e, 0x61, 0xff, 0xfe, 0x0a, 0x80],
            })
            .await;

        assert!(matches!(result, Err(ProductError::ImportUnreadable)));
    }

    #[tokio::test]
    async fn should_discard_header_without_checking_it() {
        let (repo, batches) = accepting_repo();

        let outcome = use_case(repo)
            .execute(ImportProductsCsvParams {
                payload: "\u{feff}Mug,Ceramic,9.50,20\nLamp,Desk lamp,12,3\n"
                    .as_bytes()
                    .to_vec(),
            })
            .await
            .unwrap();

        assert_eq!(outcome.success_count, 1);
        assert_eq!(outcome.failure_count, 0);
        assert_eq!(batches.lock().unwrap()[0][0].name, "Lamp");
    }

    #[tokio::test]
    async fn should_return_empty_outcome_for_header_only_payload() {
        let mut repo = MockProductRepo::new();
        repo.expect_insert_batch().never();

        let outcome = use_case(repo)
            .execute(ImportProductsCsvParams {
                payload: HEADER.as_bytes().to_vec(),
            })
            .await
            .unwrap();

        assert_eq!(outcome, ImportOutcome::default());
    }

    #[tokio::test]
    async fn should_abort_when_store_rejects_a_flush() {
        let mut repo = MockProductRepo::new();
        repo.expect_insert_batch()
            .times(1)
            .returning(|_| Err(RepositoryError::DatabaseError));

        let rows: Vec<String> = (0..150).map(|i| format!("Item {i},Bulk,1,{i}")).collect();
        let rows: Vec<&str> = rows.iter().map(String::as_str).collect();

        let result = use_case(repo)
            .execute(ImportProductsCsvParams {
                payload: payload(&rows),
            })
            .await;

        assert!(matches!(result, Err(ProductError::Repository(_))));
    }

    #[tokio::test]
    async fn should_stamp_creation_time_at_staging() {
        let (repo, batches) = accepting_repo();
        let before = Utc::now();

        use_case(repo)
            .execute(ImportProductsCsvParams {
                payload: payload(&["Mug,Ceramic,9.50,20"]),
            })
            .await
            .unwrap();

        let staged = &batches.lock().unwrap()[0][0];
        assert!(staged.created_datetime >= before);
        assert!(staged.created_datetime <= Utc::now());
    }

    #[tokio::test]
    async fn should_reproduce_exported_tuples_when_reimported() {
        let created = Utc::now() - chrono::Duration::days(30);
        let exported = vec![
            Product::from_repository(1, "Mug".into(), "Ceramic, 350ml".into(), 9.5, 20, created),
            Product::from_repository(2, "Lamp \"Arc\"".into(), "Brass".into(), 120.0, 0, created),
            Product::from_repository(3, "Rug".into(), "Wool".into(), 0.99, 7, created),
        ];
        let csv = write_csv(&exported).unwrap();
        let (repo, batches) = accepting_repo();

        let outcome = use_case(repo)
            .execute(ImportProductsCsvParams { payload: csv })
            .await
            .unwrap();

        assert_eq!(outcome.success_count, 3);
        let imported: Vec<(String, String, f64, i32)> = batches.lock().unwrap()[0]
            .iter()
            .map(|p| (p.name.clone(), p.description.clone(), p.price, p.stock_quantity))
            .collect();
        let original: Vec<(String, String, f64, i32)> = exported
            .into_iter()
            .map(|p| (p.name, p.description, p.price, p.stock_quantity))
            .collect();
        assert_eq!(imported, original);
    }

    fn row_strategy() -> impl Strategy<Value = (String, bool)> {
        let valid = ("[A-Za-z]{1,12}", 1.0f64..1000.0, 0i32..500)
            .prop_map(|(name, price, stock)| (format!("{name},Item,{price:.2},{stock}"), true));
        let bad_price = "[A-Za-z]{1,12}".prop_map(|name| (format!("{name},Item,abc,1"), false));
        let bad_stock = "[A-Za-z]{1,12}".prop_map(|name| (format!("{name},Item,2.00,3.5"), false));
        let short = "[A-Za-z]{1,12}".prop_map(|name| (format!("{name},Item"), false));
        let negative = "[A-Za-z]{1,12}".prop_map(|name| (format!("{name},Item,2.00,-1"), false));
        let unclosed =
            "[A-Za-z]{1,12}".prop_map(|name| (format!("{name},\"Item,2.00,1"), false));
        prop_oneof![valid, bad_price, bad_stock, short, negative, unclosed]
    }

    proptest! {
        #[test]
        fn should_account_for_every_data_row(rows in proptest::collection::vec(row_strategy(), 0..80)) {
            let mut repo = MockProductRepo::new();
            repo.expect_insert_batch().returning(|batch| Ok(batch.len() as u64));
            let mut pipeline = use_case(repo);
            pipeline.batch_size = 7;

            let lines: Vec<&str> = rows.iter().map(|(line, _)| line.as_str()).collect();
            let runtime = tokio::runtime::Runtime::new().unwrap();
            let outcome = runtime
                .block_on(pipeline.execute(ImportProductsCsvParams { payload: payload(&lines) }))
                .unwrap();

            let expected_valid = rows.iter().filter(|(_, valid)| *valid).count() as u64;
            prop_assert_eq!(outcome.processed(), rows.len() as u64);
            prop_assert_eq!(outcome.success_count, expected_valid);
            prop_assert!(outcome.errors.len() <= DEFAULT_ERROR_PREVIEW);
            prop_assert_eq!(
                outcome.errors.len() as u64,
                outcome.failure_count.min(DEFAULT_ERROR_PREVIEW as u64)
            );
        }
    }
}
