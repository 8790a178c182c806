use loghours_error::{ErrorKind, KindExt, LogError, Result};
use tracing::{debug, error, info, warn};

use crate::block::{Block, find_block, is_blank};
use crate::message::{NOT_FOUND_TEXT, SlashResponse};
use crate::month::Month;
use crate::notify::Notifier;
use crate::request::LogRequest;
use crate::sheet::{Spreadsheet, SpreadsheetConnector, Worksheet};

/// Where an entry was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedRow {
    pub worksheet: String,
    pub row: usize,
    pub month: Month,
    /// Label of the row above the name row. Empty if the name is in the first
    /// row.
    pub role: String,
}

/// Writes entries into the first open row of a person's block and reports
/// back through a notifier.
#[derive(Debug)]
pub struct SheetUpdater<C, N> {
    connector: C,
    notifier: N,
}

impl<C, N> SheetUpdater<C, N>
where
    C: SpreadsheetConnector,
    N: Notifier,
{
    pub fn new(connector: C, notifier: N) -> Self {
        SheetUpdater {
            connector,
            notifier,
        }
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Log the request and send exactly one message to `response_url`.
    ///
    /// The result is returned for the caller's benefit only, the outcome has
    /// already been reported when this returns.
    pub async fn process(&self, request: &LogRequest, response_url: &str) -> Result<LoggedRow> {
        let result = self.log_hours(request).await;
        match &result {
            Ok(logged) => info!(
                name = %request.name,
                worksheet = %logged.worksheet,
                row = logged.row,
                month = logged.month.capitalized(),
                "logged hours"
            ),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(name = %request.name, month = %request.month, "no open row found")
            }
            Err(e) => warn!(name = %request.name, kind = ?e.kind(), %e, "failed to log hours"),
        }

        let message = outcome_message(request, &result);
        if let Err(e) = self.notifier.notify(response_url, &message).await {
            error!(%e, "failed to deliver outcome notification");
        }

        result
    }

    /// Find the first open row for the request and write to it.
    pub async fn log_hours(&self, request: &LogRequest) -> Result<LoggedRow> {
        let month = Month::parse(&request.month)?;

        let spreadsheet = self.connector.open().await.or_kind(ErrorKind::Provider)?;
        let worksheets = spreadsheet
            .worksheets()
            .await
            .or_kind(ErrorKind::Provider)?;

        for worksheet in &worksheets {
            if let Some(logged) = log_into_worksheet(worksheet, request, month)
                .await
                .or_kind(ErrorKind::Provider)?
            {
                return Ok(logged);
            }
        }

        Err(LogError::new(NOT_FOUND_TEXT).with_kind(ErrorKind::NotFound))
    }
}

/// Try to write the entry into a single worksheet.
///
/// Returns `None` if the worksheet has no block for the name, or if every row
/// in the block is already filled for the month.
async fn log_into_worksheet<W: Worksheet>(
    worksheet: &W,
    request: &LogRequest,
    month: Month,
) -> Result<Option<LoggedRow>> {
    let labels = worksheet.col_values(1).await?;
    let block = match find_block(&labels, &request.name) {
        Some(block) => block,
        None => {
            debug!(worksheet = %worksheet.title(), "no block for name");
            return Ok(None);
        }
    };

    if block.is_crossed() {
        warn!(
            worksheet = %worksheet.title(),
            start = block.start,
            end = block.end,
            "total hours row comes before name row, skipping worksheet"
        );
        return Ok(None);
    }

    if block.has_duplicate_start {
        warn!(
            worksheet = %worksheet.title(),
            start = block.start,
            end = block.end,
            "name appears more than once before total hours row, skipping worksheet"
        );
        return Ok(None);
    }

    let role = if block.start > 1 {
        worksheet.cell(block.start - 1, 1).await?.unwrap_or_default()
    } else {
        String::new()
    };

    let row = match find_open_row(worksheet, block, month).await? {
        Some(row) => row,
        None => {
            debug!(worksheet = %worksheet.title(), ?block, "block is full");
            return Ok(None);
        }
    };

    let cols = month.columns();
    worksheet
        .update_cell(row, cols.description, &request.description)
        .await?;
    worksheet.update_cell(row, cols.hours, &request.hours).await?;

    Ok(Some(LoggedRow {
        worksheet: worksheet.title().to_string(),
        row,
        month,
        role,
    }))
}

async fn find_open_row<W: Worksheet>(
    worksheet: &W,
    block: Block,
    month: Month,
) -> Result<Option<usize>> {
    let cols = month.columns();
    for row in block.rows() {
        let desc = worksheet.cell(row, cols.description).await?;
        let hours = worksheet.cell(row, cols.hours).await?;
        if is_blank(desc.as_deref()) && is_blank(hours.as_deref()) {
            return Ok(Some(row));
        }
    }
    Ok(None)
}

/// Message reported to the user for an outcome.
pub fn outcome_message(request: &LogRequest, result: &Result<LoggedRow>) -> SlashResponse {
    match result {
        Ok(logged) if logged.role.trim().is_empty() => SlashResponse::in_channel(format!(
            "Logged hours for {} in department {}, month {}! :dog-roll:",
            request.name,
            logged.worksheet,
            logged.month.capitalized(),
        )),
        Ok(logged) => SlashResponse::in_channel(format!(
            "Logged hours for {} in department {}, month {}! You're such an amazing {}! :dog-roll:",
            request.name,
            logged.worksheet,
            logged.month.capitalized(),
            logged.role,
        )),
        Err(e) => match e.kind() {
            ErrorKind::NotFound => SlashResponse::ephemeral(NOT_FOUND_TEXT),
            ErrorKind::UnrecognizedMonth => SlashResponse::ephemeral(e.get_msg()),
            _ => SlashResponse::ephemeral(format!("Error: {e}")),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemorySpreadsheet, MemoryWorksheet, RecordingNotifier};
    use crate::message::ResponseType;

    const URL: &str = "https://hooks.example.com/commands/1";

    fn request(text: &str) -> LogRequest {
        LogRequest::parse(text).unwrap()
    }

    fn engineering() -> MemoryWorksheet {
        MemoryWorksheet::new("Engineering").with_column(1, &["Dev", "Brian", "", "Brian TOTAL HOURS"])
    }

    fn updater(
        spreadsheet: MemorySpreadsheet,
    ) -> SheetUpdater<MemorySpreadsheet, RecordingNotifier> {
        SheetUpdater::new(spreadsheet, RecordingNotifier::default())
    }

    #[tokio::test]
    async fn logs_into_first_open_row() {
        logutil::init_test();

        let sheet = engineering();
        let updater = updater(MemorySpreadsheet::new(vec![sheet.clone()]));

        let logged = updater
            .process(&request("Brian;May;Fixed bug;2"), URL)
            .await
            .unwrap();

        assert_eq!(
            LoggedRow {
                worksheet: "Engineering".to_string(),
                row: 2,
                month: Month::May,
                role: "Dev".to_string(),
            },
            logged
        );
        assert_eq!(Some("Fixed bug".to_string()), sheet.get(2, 4));
        assert_eq!(Some("2".to_string()), sheet.get(2, 5));

        let messages = updater.notifier().messages();
        assert_eq!(1, messages.len());
        assert_eq!(URL, messages[0].0);
        assert_eq!(ResponseType::InChannel, messages[0].1.response_type);
        assert_eq!(
            "Logged hours for Brian in department Engineering, month May! You're such an amazing Dev! :dog-roll:",
            messages[0].1.text
        );
    }

    #[tokio::test]
    async fn skips_filled_rows() {
        let sheet = engineering();
        sheet.set(2, 4, "Standup");
        sheet.set(2, 5, "1");
        // Only hours filled still counts as taken.
        sheet.set(3, 5, "3");
        sheet.set(3, 4, "   ");

        let sheet = sheet.with_column(1, &["Dev", "Brian", "", "", "Brian TOTAL HOURS"]);
        let updater = updater(MemorySpreadsheet::new(vec![sheet.clone()]));

        let logged = updater.log_hours(&request("brian;may;Review;1.5")).await.unwrap();
        assert_eq!(4, logged.row);
        assert_eq!(Some("Review".to_string()), sheet.get(4, 4));
        assert_eq!(Some("1.5".to_string()), sheet.get(4, 5));
    }

    #[tokio::test]
    async fn whitespace_cells_are_open() {
        let sheet = engineering();
        sheet.set(2, 20, " ");
        sheet.set(2, 21, "");
        let updater = updater(MemorySpreadsheet::new(vec![sheet.clone()]));

        let logged = updater.log_hours(&request("Brian;January;Planning;4")).await.unwrap();
        assert_eq!(2, logged.row);
        assert_eq!(Some("Planning".to_string()), sheet.get(2, 20));
    }

    #[tokio::test]
    async fn full_block_is_not_found() {
        let sheet = engineering();
        for row in 2..4 {
            sheet.set(row, 4, "busy");
            sheet.set(row, 5, "8");
        }
        let updater = updater(MemorySpreadsheet::new(vec![sheet.clone()]));
        let writes = sheet.write_count();

        let err = updater
            .process(&request("Brian;May;Fixed bug;2"), URL)
            .await
            .unwrap_err();
        assert_eq!(ErrorKind::NotFound, err.kind());
        assert_eq!(writes, sheet.write_count());

        let messages = updater.notifier().messages();
        assert_eq!(1, messages.len());
        assert_eq!(SlashResponse::ephemeral(NOT_FOUND_TEXT), messages[0].1);
    }

    #[tokio::test]
    async fn missing_name_reports_once() {
        let sheets = vec![
            engineering(),
            MemoryWorksheet::new("Design").with_column(1, &["Lead", "Alice", "Alice TOTAL HOURS"]),
            MemoryWorksheet::new("Empty"),
        ];
        let updater = updater(MemorySpreadsheet::new(sheets.clone()));

        let err = updater
            .process(&request("Charlie;May;Fixed bug;2"), URL)
            .await
            .unwrap_err();
        assert_eq!(ErrorKind::NotFound, err.kind());
        assert!(sheets.iter().all(|s| s.write_count() == 0));
        assert_eq!(1, updater.notifier().messages().len());
    }

    #[tokio::test]
    async fn falls_through_to_later_worksheet() {
        let full = engineering();
        full.set(2, 4, "a");
        full.set(3, 4, "b");
        let design = MemoryWorksheet::new("Design")
            .with_column(1, &["Designer", "Brian", "Brian TOTAL HOURS"]);
        let updater = updater(MemorySpreadsheet::new(vec![full.clone(), design.clone()]));

        let logged = updater.log_hours(&request("Brian;May;Mockups;3")).await.unwrap();
        assert_eq!("Design", logged.worksheet);
        assert_eq!("Designer", logged.role);
        assert_eq!(0, full.write_count());
        assert_eq!(Some("Mockups".to_string()), design.get(2, 4));
    }

    #[tokio::test]
    async fn crossed_block_is_skipped() {
        let crossed = MemoryWorksheet::new("Crossed")
            .with_column(1, &["Brian TOTAL HOURS", "Dev", "Brian", ""]);
        let updater = updater(MemorySpreadsheet::new(vec![crossed.clone()]));

        let err = updater.log_hours(&request("Brian;May;x;1")).await.unwrap_err();
        assert_eq!(ErrorKind::NotFound, err.kind());
        assert_eq!(0, crossed.write_count());
    }

    #[tokio::test]
    async fn repeated_name_before_total_is_skipped() {
        let sheet = MemoryWorksheet::new("Engineering").with_column(
            1,
            &["Dev", "Brian", "x", "QA", "Brian", "", "Brian TOTAL HOURS"],
        );
        for row in 2..4 {
            sheet.set(row, 4, "busy");
            sheet.set(row, 5, "8");
        }
        let writes = sheet.write_count();
        let updater = updater(MemorySpreadsheet::new(vec![sheet.clone()]));

        let err = updater
            .process(&request("Brian;May;Fixed bug;2"), URL)
            .await
            .unwrap_err();
        assert_eq!(ErrorKind::NotFound, err.kind());
        assert_eq!(writes, sheet.write_count());
        assert_eq!(None, sheet.get(4, 4));

        let messages = updater.notifier().messages();
        assert_eq!(1, messages.len());
        assert_eq!(SlashResponse::ephemeral(NOT_FOUND_TEXT), messages[0].1);
    }

    #[tokio::test]
    async fn name_above_role_label_logs_first_row_without_role() {
        let sheet = MemoryWorksheet::new("Engineering")
            .with_column(1, &["Brian", "Dev", "", "Brian TOTAL HOURS"]);
        let updater = updater(MemorySpreadsheet::new(vec![sheet.clone()]));

        let logged = updater
            .process(&request("Brian;May;Fixed bug;2"), URL)
            .await
            .unwrap();
        assert_eq!(1, logged.row);
        assert_eq!("", logged.role);
        assert_eq!(Some("Fixed bug".to_string()), sheet.get(1, 4));
        assert_eq!(Some("2".to_string()), sheet.get(1, 5));

        let messages = updater.notifier().messages();
        assert_eq!(1, messages.len());
        assert_eq!(
            SlashResponse::in_channel(
                "Logged hours for Brian in department Engineering, month May! :dog-roll:"
            ),
            messages[0].1
        );
    }

    #[tokio::test]
    async fn name_on_first_row_has_empty_role() {
        let sheet = MemoryWorksheet::new("Ops").with_column(1, &["Brian", "", "Brian TOTAL HOURS"]);
        let updater = updater(MemorySpreadsheet::new(vec![sheet]));

        let logged = updater.log_hours(&request("Brian;March;On call;6")).await.unwrap();
        assert_eq!(1, logged.row);
        assert_eq!("", logged.role);
    }

    #[tokio::test]
    async fn unrecognized_month_keeps_casing() {
        let sheet = engineering();
        let updater = updater(MemorySpreadsheet::new(vec![sheet.clone()]));

        let err = updater
            .process(&request("Brian;Mayy;Fixed bug;2"), URL)
            .await
            .unwrap_err();
        assert_eq!(ErrorKind::UnrecognizedMonth, err.kind());
        assert_eq!(0, sheet.write_count());

        let messages = updater.notifier().messages();
        assert_eq!(
            SlashResponse::ephemeral(
                "Month 'Mayy' not recognized. Please use a full month name, e.g. May."
            ),
            messages[0].1
        );
    }

    #[tokio::test]
    async fn provider_failure_reported_as_error() {
        let updater = updater(MemorySpreadsheet::failing("invalid_grant"));

        let err = updater
            .process(&request("Brian;May;Fixed bug;2"), URL)
            .await
            .unwrap_err();
        assert_eq!(ErrorKind::Provider, err.kind());

        let messages = updater.notifier().messages();
        assert_eq!(1, messages.len());
        assert_eq!(ResponseType::Ephemeral, messages[0].1.response_type);
        assert_eq!("Error: invalid_grant", messages[0].1.text);
    }

    #[tokio::test]
    async fn resubmitting_writes_next_row() {
        let sheet = engineering();
        let updater = updater(MemorySpreadsheet::new(vec![sheet.clone()]));
        let req = request("Brian;May;Fixed bug;2");

        assert_eq!(2, updater.log_hours(&req).await.unwrap().row);
        assert_eq!(3, updater.log_hours(&req).await.unwrap().row);
        assert_eq!(
            ErrorKind::NotFound,
            updater.log_hours(&req).await.unwrap_err().kind()
        );
        assert_eq!(4, sheet.write_count());
    }

    #[tokio::test]
    async fn failed_notification_does_not_change_result() {
        let updater = SheetUpdater::new(
            MemorySpreadsheet::new(vec![engineering()]),
            RecordingNotifier::failing(),
        );
        updater
            .process(&request("Brian;May;Fixed bug;2"), URL)
            .await
            .unwrap();
    }
}
