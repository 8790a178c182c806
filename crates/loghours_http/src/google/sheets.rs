use std::sync::Arc;

use loghours_core::sheet::{Spreadsheet, SpreadsheetConnector, Worksheet};
use loghours_error::{ErrorKind, KindExt, LogError, Result, ResultExt};
use reqwest::{Method, Request};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::credentials::{SHEETS_SCOPE, ServiceAccount};
use super::types::{MajorDimension, SheetProperties, SpreadsheetResource, ValueRange};
use crate::client::{
    HttpClient,
    HttpResponse,
    ensure_success,
    read_json_response,
    set_bearer_auth,
    set_json_body,
};

pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com/";

/// Opens a spreadsheet by id, authenticating with a service account.
#[derive(Debug, Clone)]
pub struct SheetsConnector<C: HttpClient> {
    client: C,
    account: Arc<ServiceAccount>,
    spreadsheet_id: String,
    api_base: Url,
}

impl<C> SheetsConnector<C>
where
    C: HttpClient,
{
    pub fn try_new(
        client: C,
        account: Arc<ServiceAccount>,
        spreadsheet_id: impl Into<String>,
    ) -> Result<Self> {
        let api_base = Url::parse(DEFAULT_API_BASE).context("Failed to parse sheets api url")?;
        Ok(SheetsConnector {
            client,
            account,
            spreadsheet_id: spreadsheet_id.into(),
            api_base,
        })
    }

    pub fn with_api_base(mut self, api_base: Url) -> Self {
        self.api_base = api_base;
        self
    }
}

impl<C> SpreadsheetConnector for SheetsConnector<C>
where
    C: HttpClient,
{
    type Spreadsheet = SheetsSpreadsheet<C>;

    async fn open(&self) -> Result<Self::Spreadsheet> {
        let token = self
            .account
            .fetch_access_token(&self.client, SHEETS_SCOPE)
            .await
            .or_kind(ErrorKind::Provider)?;

        let session = SheetsSession {
            client: self.client.clone(),
            access_token: token.access_token,
            api_base: self.api_base.clone(),
            spreadsheet_id: self.spreadsheet_id.clone(),
        };

        SheetsSpreadsheet::open(Arc::new(session)).await
    }
}

/// Authenticated access to a single spreadsheet.
#[derive(Debug)]
pub(crate) struct SheetsSession<C: HttpClient> {
    pub(crate) client: C,
    pub(crate) access_token: String,
    pub(crate) api_base: Url,
    pub(crate) spreadsheet_id: String,
}

impl<C> SheetsSession<C>
where
    C: HttpClient,
{
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| LogError::new("Sheets api base cannot be used as a base url"))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str()])
            .extend(segments);
        Ok(url)
    }

    fn values_url(&self, range: &str) -> Result<Url> {
        self.url(&["values", range])
    }

    async fn send_json<T, B>(&self, method: Method, url: Url, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + Sync,
    {
        debug!(%method, %url, "sheets request");

        let mut request = Request::new(method, url);
        set_bearer_auth(&mut request, &self.access_token)?;
        if let Some(body) = body {
            set_json_body(&mut request, body)?;
        }

        let resp = self.client.do_request(request).await?;
        let resp = ensure_success(resp).await?;
        read_json_response(resp.into_bytes_stream()).await
    }

    async fn get_json<T>(&self, url: Url) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.send_json::<T, ()>(Method::GET, url, None).await
    }
}

#[derive(Debug)]
pub struct SheetsSpreadsheet<C: HttpClient> {
    session: Arc<SheetsSession<C>>,
    sheets: Vec<SheetProperties>,
}

impl<C> SheetsSpreadsheet<C>
where
    C: HttpClient,
{
    /// Fetch sheet metadata, failing if the spreadsheet doesn't exist or isn't
    /// shared with the service account.
    pub(crate) async fn open(session: Arc<SheetsSession<C>>) -> Result<Self> {
        let mut url = session.url(&[])?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties");

        let resource: SpreadsheetResource = session
            .get_json(url)
            .await
            .or_kind(ErrorKind::Provider)?;

        let mut sheets: Vec<_> = resource.sheets.into_iter().map(|s| s.properties).collect();
        sheets.sort_by_key(|p| p.index);

        Ok(SheetsSpreadsheet { session, sheets })
    }
}

impl<C> Spreadsheet for SheetsSpreadsheet<C>
where
    C: HttpClient,
{
    type Worksheet = SheetsWorksheet<C>;

    async fn worksheets(&self) -> Result<Vec<Self::Worksheet>> {
        Ok(self
            .sheets
            .iter()
            .map(|props| SheetsWorksheet {
                session: self.session.clone(),
                title: props.title.clone(),
            })
            .collect())
    }
}

#[derive(Debug)]
pub struct SheetsWorksheet<C: HttpClient> {
    session: Arc<SheetsSession<C>>,
    title: String,
}

impl<C> Worksheet for SheetsWorksheet<C>
where
    C: HttpClient,
{
    fn title(&self) -> &str {
        &self.title
    }

    async fn col_values(&self, col: usize) -> Result<Vec<String>> {
        let letters = column_letters(col)?;
        let range = format!("{}!{letters}:{letters}", quote_title(&self.title));

        let mut url = self.session.values_url(&range)?;
        url.query_pairs_mut()
            .append_pair("majorDimension", "COLUMNS");

        let values: ValueRange = self.session.get_json(url).await?;
        Ok(values.values.into_iter().next().unwrap_or_default())
    }

    async fn cell(&self, row: usize, col: usize) -> Result<Option<String>> {
        let range = cell_range(&self.title, row, col)?;
        let url = self.session.values_url(&range)?;

        let values: ValueRange = self.session.get_json(url).await?;
        Ok(values
            .values
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next()))
    }

    async fn update_cell(&self, row: usize, col: usize, value: &str) -> Result<()> {
        let range = cell_range(&self.title, row, col)?;
        let mut url = self.session.values_url(&range)?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED");

        let body = ValueRange {
            range: Some(range),
            major_dimension: Some(MajorDimension::Rows),
            values: vec![vec![value.to_string()]],
        };

        let _: serde_json::Value = self
            .session
            .send_json(Method::PUT, url, Some(&body))
            .await?;

        Ok(())
    }
}

/// Convert a 1-based column index to its letters, e.g. 27 -> "AA".
pub fn column_letters(col: usize) -> Result<String> {
    if col == 0 {
        return Err(LogError::new("Columns start at 1"));
    }

    let mut letters = Vec::new();
    let mut n = col;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }

    Ok(letters.into_iter().rev().collect())
}

/// Quote a sheet title for use in A1 notation.
pub fn quote_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// A1 range for a single cell, e.g. `'Ops'!D2`.
pub fn cell_range(title: &str, row: usize, col: usize) -> Result<String> {
    if row == 0 {
        return Err(LogError::new("Rows start at 1").with_field("title", title));
    }
    let letters = column_letters(col).context_fn(|| format!("Invalid column for sheet '{title}'"));
    Ok(format!("{}!{}{row}", quote_title(title), letters?))
}
